//! Server-only pieces: configuration, the identity provider client and shared state.

pub mod app_state;
pub mod config;
pub mod federated;
pub mod toolkit;
