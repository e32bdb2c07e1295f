/// Client for the identity provider's REST account endpoints.
use crate::auth::{FederatedProvider, Identity};
use crate::ssr::config::IdentityConfig;

use serde::{Deserialize, Serialize};

const PASSWORD_PROVIDER_ID: &str = "password";

/// Display text ends up in front of the user, so it never carries the request URL or API key.
#[derive(Debug, thiserror::Error)]
pub enum ToolkitError {
    /// Already phrased for the user.
    #[error("{0}")]
    Rejected(String),
    #[error("Couldn't reach the identity provider. Try again later.")]
    Http(#[source] reqwest::Error),
    #[error("The identity provider sent an answer this app doesn't understand.")]
    Malformed(#[source] serde_json::Error),
}

impl From<reqwest::Error> for ToolkitError {
    fn from(err: reqwest::Error) -> Self {
        // The URL carries the API key.
        let err = err.without_url();
        log::warn!("Identity provider request failed: {err}");
        ToolkitError::Http(err)
    }
}

impl From<serde_json::Error> for ToolkitError {
    fn from(err: serde_json::Error) -> Self {
        log::warn!("Couldn't decode identity provider answer: {err}");
        ToolkitError::Malformed(err)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IdpRequest<'a> {
    post_body: String,
    request_uri: &'a str,
    return_secure_token: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
    email: Option<String>,
    display_name: Option<String>,
    provider_id: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

pub struct IdentityToolkit {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl IdentityToolkit {
    pub fn new(config: &IdentityConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.toolkit_url.clone(),
            api_key: config.api_key.clone(),
        }
    }

    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Identity, ToolkitError> {
        let body = PasswordRequest {
            email,
            password,
            return_secure_token: true,
        };
        self.call("accounts:signInWithPassword", &body, PASSWORD_PROVIDER_ID)
            .await
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> Result<Identity, ToolkitError> {
        let body = PasswordRequest {
            email,
            password,
            return_secure_token: true,
        };
        self.call("accounts:signUp", &body, PASSWORD_PROVIDER_ID).await
    }

    /// Exchange an OpenID Connect ID token from a social provider for an account.
    pub async fn sign_in_with_idp(
        &self,
        provider: FederatedProvider,
        id_token: &str,
        nonce: &str,
        request_uri: &str,
    ) -> Result<Identity, ToolkitError> {
        let body = IdpRequest {
            post_body: idp_post_body(provider, id_token, nonce),
            request_uri,
            return_secure_token: true,
        };
        self.call("accounts:signInWithIdp", &body, provider.id())
            .await
    }

    async fn call<B: Serialize>(
        &self,
        endpoint: &str,
        body: &B,
        fallback_provider_id: &str,
    ) -> Result<Identity, ToolkitError> {
        let response = self
            .client
            .post(format!("{}/{endpoint}", self.base_url))
            .query(&[("key", &self.api_key)])
            .json(body)
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = rejection_message(&text);
            log::info!("Identity provider rejected {endpoint} ({status}): {message}");
            return Err(ToolkitError::Rejected(message));
        }

        let account: AccountResponse = serde_json::from_str(&text)?;
        Ok(Identity {
            uid: account.local_id,
            email: account.email,
            display_name: account.display_name.filter(|name| !name.is_empty()),
            provider_id: account
                .provider_id
                .unwrap_or_else(|| fallback_provider_id.to_string()),
        })
    }
}

/// Credential blob for `accounts:signInWithIdp`. The nonce must match the one in the ID token.
pub fn idp_post_body(provider: FederatedProvider, id_token: &str, nonce: &str) -> String {
    format!("id_token={id_token}&providerId={}&nonce={nonce}", provider.id())
}

/// User-facing text for an error response body.
pub fn rejection_message(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(body) => describe_error_code(&body.error.message),
        Err(_) => "The identity provider rejected the request.".to_string(),
    }
}

/// Turn a provider error code, optionally followed by ` : detail`, into a short sentence.
pub fn describe_error_code(raw: &str) -> String {
    let (code, detail) = match raw.split_once(':') {
        Some((code, detail)) => (code.trim(), Some(detail.trim()).filter(|d| !d.is_empty())),
        None => (raw.trim(), None),
    };

    let known = match code {
        "INVALID_LOGIN_CREDENTIALS" | "INVALID_PASSWORD" | "EMAIL_NOT_FOUND" => {
            "Invalid credentials"
        }
        "EMAIL_EXISTS" => "An account with this email already exists.",
        "INVALID_EMAIL" => "That email address is badly formatted.",
        "MISSING_PASSWORD" => "Enter a password.",
        "USER_DISABLED" => "This account has been disabled.",
        "TOO_MANY_ATTEMPTS_TRY_LATER" => "Too many attempts. Try again later.",
        "OPERATION_NOT_ALLOWED" | "PASSWORD_LOGIN_DISABLED" => {
            "This sign-in method is turned off."
        }
        "INVALID_IDP_RESPONSE" => "The social sign-in response was rejected.",
        "WEAK_PASSWORD" => {
            return detail
                .unwrap_or("Password should be at least 6 characters")
                .to_string();
        }
        _ => return detail.unwrap_or(code).to_string(),
    };
    known.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes() {
        assert_eq!(describe_error_code("INVALID_PASSWORD"), "Invalid credentials");
        assert_eq!(
            describe_error_code("INVALID_LOGIN_CREDENTIALS"),
            "Invalid credentials"
        );
        assert_eq!(
            describe_error_code("EMAIL_EXISTS"),
            "An account with this email already exists."
        );
    }

    #[test]
    fn test_code_with_detail() {
        assert_eq!(
            describe_error_code("WEAK_PASSWORD : Password should be at least 6 characters"),
            "Password should be at least 6 characters"
        );
        assert_eq!(
            describe_error_code(
                "TOO_MANY_ATTEMPTS_TRY_LATER : Access to this account has been temporarily disabled"
            ),
            "Too many attempts. Try again later."
        );
        assert_eq!(
            describe_error_code("SOMETHING_NEW : Human readable detail"),
            "Human readable detail"
        );
    }

    #[test]
    fn test_unknown_code_without_detail_is_shown_as_is() {
        assert_eq!(describe_error_code("QUOTA_EXCEEDED"), "QUOTA_EXCEEDED");
    }

    #[test]
    fn test_rejection_message_from_body() {
        let body = r#"{"error":{"code":400,"message":"EMAIL_NOT_FOUND","errors":[]}}"#;
        assert_eq!(rejection_message(body), "Invalid credentials");
        assert_eq!(
            rejection_message("<html>bad gateway</html>"),
            "The identity provider rejected the request."
        );
    }

    #[test]
    fn test_account_response_shape() {
        let body = r#"{"kind":"identitytoolkit#VerifyPasswordResponse","localId":"abc","email":"a@b.com","displayName":"","idToken":"t","registered":true}"#;
        let account: AccountResponse = serde_json::from_str(body).unwrap();
        assert_eq!(account.local_id, "abc");
        assert_eq!(account.provider_id, None);
        assert_eq!(account.display_name.as_deref(), Some(""));
    }

    #[test]
    fn test_idp_request_serializes_camel_case() {
        let body = IdpRequest {
            post_body: "id_token=x&providerId=google.com".to_string(),
            request_uri: "http://localhost:3000/auth/popup",
            return_secure_token: true,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["postBody"], "id_token=x&providerId=google.com");
        assert_eq!(json["requestUri"], "http://localhost:3000/auth/popup");
        assert_eq!(json["returnSecureToken"], true);
    }

    #[test]
    fn test_idp_post_body_carries_nonce() {
        assert_eq!(
            idp_post_body(FederatedProvider::Apple, "eyJ.x.y", "n0nce"),
            "id_token=eyJ.x.y&providerId=apple.com&nonce=n0nce"
        );
    }

    #[tokio::test]
    async fn test_unreachable_provider_hides_key_and_url() {
        let toolkit = IdentityToolkit::new(&IdentityConfig {
            api_key: "SECRET-API-KEY".to_string(),
            toolkit_url: "http://127.0.0.1:1".to_string(),
            google_client_id: None,
            apple_client_id: None,
            microsoft_client_id: None,
        });

        let err = toolkit
            .sign_in_with_password("a@b.com", "secret")
            .await
            .unwrap_err();
        assert!(matches!(err, ToolkitError::Http(_)));

        let debug = format!("{err:?}");
        let shown = err.to_string();
        let sent: leptos::prelude::ServerFnError = err.into();
        let sent = sent.to_string();
        for text in [shown, sent, debug] {
            assert!(!text.contains("SECRET-API-KEY"), "{text}");
            assert!(!text.contains("127.0.0.1"), "{text}");
        }
    }

    #[test]
    fn test_malformed_answer_hides_details() {
        let err = ToolkitError::from(serde_json::from_str::<AccountResponse>("{}").unwrap_err());
        assert_eq!(
            err.to_string(),
            "The identity provider sent an answer this app doesn't understand."
        );
    }
}
