//! The identity provider as the browser sees it: server functions for the password and
//! federated paths, and the popup that collects a social provider's ID token.

use crate::auth::{AuthError, FederatedProvider, Identity, IdentityProvider};

use async_trait::async_trait;
use leptos::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub mod popup;

/// Where social providers send the popup back to.
pub const POPUP_PATH: &str = "/auth/popup";

/// Everything the browser needs to run a popup sign-in.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FederatedChallenge {
    pub authorize_url: String,
    /// Echoed back by the provider; replies carrying anything else are ignored.
    pub state: String,
    /// Bound into the ID token by the provider and checked again when the token is exchanged.
    pub nonce: String,
}

#[server]
pub async fn sign_in_with_password(
    email: String,
    password: String,
) -> Result<Identity, ServerFnError> {
    let app_state = crate::ssr::app_state::use_app_state()?;
    Ok(app_state
        .toolkit
        .sign_in_with_password(&email, &password)
        .await?)
}

#[server]
pub async fn create_account_with_password(
    email: String,
    password: String,
) -> Result<Identity, ServerFnError> {
    let app_state = crate::ssr::app_state::use_app_state()?;
    let identity = app_state.toolkit.sign_up(&email, &password).await?;
    log::info!("Created account {}", identity.uid);
    Ok(identity)
}

#[server]
pub async fn begin_federated_sign_in(
    provider: FederatedProvider,
    redirect_uri: String,
) -> Result<FederatedChallenge, ServerFnError> {
    let app_state = crate::ssr::app_state::use_app_state()?;
    Ok(crate::ssr::federated::challenge(
        &app_state.config,
        provider,
        &redirect_uri,
    )?)
}

#[server]
pub async fn complete_federated_sign_in(
    provider: FederatedProvider,
    id_token: String,
    nonce: String,
    request_uri: String,
) -> Result<Identity, ServerFnError> {
    let app_state = crate::ssr::app_state::use_app_state()?;
    Ok(app_state
        .toolkit
        .sign_in_with_idp(provider, &id_token, &nonce, &request_uri)
        .await?)
}

/// Errors raised on the server arrive as `ServerError` and are already phrased for the user.
fn auth_error(err: ServerFnError) -> AuthError {
    match err {
        ServerFnError::ServerError(message) => AuthError::Rejected(message),
        other => AuthError::Transport(other.to_string()),
    }
}

/// [`IdentityProvider`] backed by this app's server functions.
#[derive(Clone, Copy, Debug, Default)]
pub struct ServerIdentity;

#[async_trait(?Send)]
impl IdentityProvider for ServerIdentity {
    #[cfg(feature = "browser")]
    fn prepare_federated(&self, _provider: FederatedProvider) {
        popup::open_placeholder();
    }

    async fn sign_in_with_federated(
        &self,
        provider: FederatedProvider,
    ) -> Result<Identity, AuthError> {
        federated_sign_in(provider).await
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Identity, AuthError> {
        sign_in_with_password(email.to_string(), password.to_string())
            .await
            .map_err(auth_error)
    }

    async fn create_account_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Identity, AuthError> {
        create_account_with_password(email.to_string(), password.to_string())
            .await
            .map_err(auth_error)
    }
}

#[cfg(feature = "browser")]
async fn federated_sign_in(provider: FederatedProvider) -> Result<Identity, AuthError> {
    let Some(redirect_uri) = popup::redirect_uri() else {
        popup::discard();
        return Err(AuthError::Unavailable(provider));
    };
    let challenge = match begin_federated_sign_in(provider, redirect_uri.clone()).await {
        Ok(challenge) => challenge,
        Err(err) => {
            popup::discard();
            return Err(auth_error(err));
        }
    };
    let id_token = popup::run(&challenge.authorize_url, &challenge.state).await?;
    complete_federated_sign_in(provider, id_token, challenge.nonce, redirect_uri)
        .await
        .map_err(auth_error)
}

/// Without a browser there is no popup to collect a token with.
#[cfg(not(feature = "browser"))]
async fn federated_sign_in(provider: FederatedProvider) -> Result<Identity, AuthError> {
    Err(AuthError::Unavailable(provider))
}

/// Shared handle to the provider the sign-in form talks to.
pub type IdentityHandle = Arc<dyn IdentityProvider>;

/// The provider from context, or [`ServerIdentity`] when none was provided.
pub fn use_identity_provider() -> IdentityHandle {
    use_context::<IdentityHandle>().unwrap_or_else(|| Arc::new(ServerIdentity))
}
