/// OAuth authorize URLs for the social sign-in popups.
use crate::auth::FederatedProvider;
use crate::identity::{FederatedChallenge, POPUP_PATH};
use crate::ssr::config::IdentityConfig;

use rand::{
    distributions::{Alphanumeric, DistString},
    thread_rng,
};
use reqwest::Url;

const STATE_LEN: usize = 32;
const NONCE_LEN: usize = 32;

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum FederatedError {
    #[error("Sign-in with {0} is not configured.")]
    NotConfigured(FederatedProvider),
    #[error("Sign-in can't return to {0}.")]
    BadRedirect(String),
}

pub fn authorize_endpoint(provider: FederatedProvider) -> &'static str {
    match provider {
        FederatedProvider::Google => "https://accounts.google.com/o/oauth2/v2/auth",
        FederatedProvider::Apple => "https://appleid.apple.com/auth/authorize",
        FederatedProvider::Microsoft => {
            "https://login.microsoftonline.com/common/oauth2/v2.0/authorize"
        }
    }
}

/// Only the popup landing page of an http(s) origin may receive the ID token.
pub fn check_redirect_uri(redirect_uri: &str) -> Result<(), FederatedError> {
    match Url::parse(redirect_uri) {
        Ok(url)
            if matches!(url.scheme(), "http" | "https")
                && url.path() == POPUP_PATH
                && url.query().is_none()
                && url.fragment().is_none() =>
        {
            Ok(())
        }
        _ => Err(FederatedError::BadRedirect(redirect_uri.to_string())),
    }
}

/// Implicit-flow request for an ID token delivered in the URL fragment.
///
/// Apple pairs the ID token with a code and only allows fragment delivery when no scope is asked for.
pub fn authorize_url(
    provider: FederatedProvider,
    client_id: &str,
    redirect_uri: &str,
    state: &str,
    nonce: &str,
) -> Url {
    let mut url = Url::parse(authorize_endpoint(provider))
        .expect("authorize endpoints are valid URLs");
    {
        let mut query = url.query_pairs_mut();
        query
            .append_pair("client_id", client_id)
            .append_pair("redirect_uri", redirect_uri);
        match provider {
            FederatedProvider::Apple => {
                query.append_pair("response_type", "code id_token");
            }
            FederatedProvider::Google | FederatedProvider::Microsoft => {
                query
                    .append_pair("response_type", "id_token")
                    .append_pair("scope", "openid email");
            }
        }
        query
            .append_pair("response_mode", "fragment")
            .append_pair("state", state)
            .append_pair("nonce", nonce);
        if provider == FederatedProvider::Google {
            query.append_pair("prompt", "select_account");
        }
    }
    url
}

/// Start a popup sign-in: fresh state and nonce, plus where to send the popup.
pub fn challenge(
    config: &IdentityConfig,
    provider: FederatedProvider,
    redirect_uri: &str,
) -> Result<FederatedChallenge, FederatedError> {
    let client_id = config
        .client_id(provider)
        .ok_or(FederatedError::NotConfigured(provider))?;
    check_redirect_uri(redirect_uri)?;

    let state = Alphanumeric.sample_string(&mut thread_rng(), STATE_LEN);
    let nonce = Alphanumeric.sample_string(&mut thread_rng(), NONCE_LEN);
    let url = authorize_url(provider, client_id, redirect_uri, &state, &nonce);

    Ok(FederatedChallenge {
        authorize_url: url.into(),
        state,
        nonce,
    })
}
