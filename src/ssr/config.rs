/// Identity provider settings read from the environment at startup.
use crate::auth::FederatedProvider;

pub const DEFAULT_TOOLKIT_URL: &str = "https://identitytoolkit.googleapis.com/v1";

const API_KEY_VAR: &str = "IDENTITY_API_KEY";
const TOOLKIT_URL_VAR: &str = "IDENTITY_TOOLKIT_URL";
const GOOGLE_CLIENT_ID_VAR: &str = "GOOGLE_CLIENT_ID";
const APPLE_CLIENT_ID_VAR: &str = "APPLE_CLIENT_ID";
const MICROSOFT_CLIENT_ID_VAR: &str = "MICROSOFT_CLIENT_ID";

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} should be set")]
    Missing(&'static str),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdentityConfig {
    pub api_key: String,
    /// Base URL of the account endpoints, without a trailing slash.
    pub toolkit_url: String,
    pub google_client_id: Option<String>,
    pub apple_client_id: Option<String>,
    pub microsoft_client_id: Option<String>,
}

impl IdentityConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key/value source. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let api_key = var(API_KEY_VAR).ok_or(ConfigError::Missing(API_KEY_VAR))?;
        let toolkit_url = var(TOOLKIT_URL_VAR)
            .unwrap_or_else(|| DEFAULT_TOOLKIT_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            api_key,
            toolkit_url,
            google_client_id: var(GOOGLE_CLIENT_ID_VAR),
            apple_client_id: var(APPLE_CLIENT_ID_VAR),
            microsoft_client_id: var(MICROSOFT_CLIENT_ID_VAR),
        })
    }

    /// OAuth client ID for a social provider, if that provider is set up.
    pub fn client_id(&self, provider: FederatedProvider) -> Option<&str> {
        match provider {
            FederatedProvider::Google => self.google_client_id.as_deref(),
            FederatedProvider::Apple => self.apple_client_id.as_deref(),
            FederatedProvider::Microsoft => self.microsoft_client_id.as_deref(),
        }
    }
}
