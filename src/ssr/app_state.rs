use crate::ssr::config::IdentityConfig;
use crate::ssr::toolkit::IdentityToolkit;

use leptos::prelude::*;
use std::sync::Arc;

/// Easily cloneable; everything shared sits behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<IdentityConfig>,
    pub toolkit: Arc<IdentityToolkit>,
}

impl AppState {
    pub fn new(config: IdentityConfig) -> Self {
        let toolkit = IdentityToolkit::new(&config);
        Self {
            config: Arc::new(config),
            toolkit: Arc::new(toolkit),
        }
    }
}

/// Wrapper to get AppState that's easily usable with the ? operator, for use in
/// server functions.
pub fn use_app_state() -> Result<AppState, ServerFnError> {
    match use_context::<AppState>() {
        Some(app_state) => Ok(app_state),
        None => Err(ServerFnError::new("Couldn't get AppState from context")),
    }
}
