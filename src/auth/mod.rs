//! Framework-independent core of the sign-in form.
//!
//! The view layer keeps a [`FormState`] in a signal, asks it to [`FormState::begin`] an attempt,
//! runs [`authenticate`] against whatever [`IdentityProvider`] it was given and feeds the result
//! back through [`FormState::complete`]. [`SignInFlow`] does the same without a view.

pub mod flow;
pub mod form;
pub mod provider;

pub use flow::{Outcome, SignInFlow, authenticate, prepare};
pub use form::{AuthMode, AuthRequest, FormState, Trigger};
pub use provider::{
    AuthError, FederatedProvider, HOME_PATH, Identity, IdentityProvider, Navigator,
};
