/// Capabilities the sign-in form consumes from its collaborators.
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a successful sign-in lands.
pub const HOME_PATH: &str = "/";

/// The account an identity provider vouched for.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub provider_id: String,
}

/// Social identity providers offered on the form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FederatedProvider {
    Google,
    Apple,
    Microsoft,
}

impl FederatedProvider {
    pub const ALL: [FederatedProvider; 3] = [
        FederatedProvider::Google,
        FederatedProvider::Apple,
        FederatedProvider::Microsoft,
    ];

    /// Provider identifier understood by the identity provider.
    pub fn id(self) -> &'static str {
        match self {
            FederatedProvider::Google => "google.com",
            FederatedProvider::Apple => "apple.com",
            FederatedProvider::Microsoft => "microsoft.com",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FederatedProvider::Google => "Google",
            FederatedProvider::Apple => "Apple",
            FederatedProvider::Microsoft => "Microsoft",
        }
    }
}

impl fmt::Display for FederatedProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A failed authentication attempt.
///
/// The form never looks at the variant: whatever `Display` produces is what the user reads.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// The identity provider said no. The message is shown as-is.
    #[error("{0}")]
    Rejected(String),
    #[error("Couldn't reach the sign-in service: {0}")]
    Transport(String),
    #[error("The sign-in popup was blocked by the browser.")]
    PopupBlocked,
    #[error("The sign-in popup was closed before sign-in completed.")]
    PopupClosed,
    #[error("Sign-in with {0} isn't available here.")]
    Unavailable(FederatedProvider),
}

/// External identity provider.
///
/// Futures are not required to be `Send`; in the browser everything runs on the UI thread.
#[async_trait(?Send)]
pub trait IdentityProvider: Send + Sync {
    /// Runs synchronously inside the user's click, before the attempt awaits anything.
    ///
    /// Browsers only let a page open a popup while handling a user gesture.
    fn prepare_federated(&self, _provider: FederatedProvider) {}

    async fn sign_in_with_federated(
        &self,
        provider: FederatedProvider,
    ) -> Result<Identity, AuthError>;

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Identity, AuthError>;

    async fn create_account_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Identity, AuthError>;
}

/// Router hook used once an attempt succeeds. Fire-and-forget.
pub trait Navigator {
    fn navigate_to(&self, path: &str);
}

impl<F> Navigator for F
where
    F: Fn(&str),
{
    fn navigate_to(&self, path: &str) {
        self(path)
    }
}
