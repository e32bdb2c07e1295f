/// Form state and the per-attempt state machine behind the sign-in view.
use crate::auth::provider::{AuthError, FederatedProvider, Identity};

/// Which email/password capability a submit goes to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AuthMode {
    #[default]
    SignIn,
    SignUp,
}

impl AuthMode {
    pub fn toggled(self) -> Self {
        match self {
            AuthMode::SignIn => AuthMode::SignUp,
            AuthMode::SignUp => AuthMode::SignIn,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            AuthMode::SignIn => "Welcome Back",
            AuthMode::SignUp => "Create Account",
        }
    }

    pub fn submit_label(self) -> &'static str {
        match self {
            AuthMode::SignIn => "Sign In",
            AuthMode::SignUp => "Sign Up",
        }
    }

    /// Prompt and link text for switching to the other mode.
    pub fn toggle_prompt(self) -> (&'static str, &'static str) {
        match self {
            AuthMode::SignIn => ("Not joined us yet?", "Register now!"),
            AuthMode::SignUp => ("Already have an account?", "Sign in!"),
        }
    }
}

/// A user action that starts an attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trigger {
    Federated(FederatedProvider),
    Submit,
}

/// The single provider call an attempt makes, captured when the attempt begins.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthRequest {
    Federated(FederatedProvider),
    SignIn { email: String, password: String },
    SignUp { email: String, password: String },
}

/// Everything the form holds while mounted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormState {
    email: String,
    password: String,
    mode: AuthMode,
    error: Option<String>,
    pending: bool,
}

impl FormState {
    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn mode(&self) -> AuthMode {
        self.mode
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn set_email(&mut self, email: impl Into<String>) {
        self.email = email.into();
    }

    pub fn set_password(&mut self, password: impl Into<String>) {
        self.password = password.into();
    }

    /// Flip between sign-in and sign-up. Text and error are left alone.
    pub fn toggle_mode(&mut self) {
        self.mode = self.mode.toggled();
    }

    /// Idle -> Pending.
    ///
    /// Returns `None` while another attempt is still in flight; that trigger is dropped.
    /// Otherwise the previous error is cleared and the request to send is returned.
    pub fn begin(&mut self, trigger: Trigger) -> Option<AuthRequest> {
        if self.pending {
            return None;
        }

        let request = match trigger {
            Trigger::Federated(provider) => AuthRequest::Federated(provider),
            Trigger::Submit => {
                let email = self.email.clone();
                let password = self.password.clone();
                match self.mode {
                    AuthMode::SignIn => AuthRequest::SignIn { email, password },
                    AuthMode::SignUp => AuthRequest::SignUp { email, password },
                }
            }
        };

        self.error = None;
        self.pending = true;
        Some(request)
    }

    /// Pending -> Idle.
    ///
    /// On success the identity is handed back so the caller can navigate; fields are untouched.
    /// On failure the error text replaces whatever was shown before.
    pub fn complete(&mut self, outcome: Result<Identity, AuthError>) -> Option<Identity> {
        self.pending = false;
        match outcome {
            Ok(identity) => Some(identity),
            Err(err) => {
                self.error = Some(err.to_string());
                None
            }
        }
    }
}
