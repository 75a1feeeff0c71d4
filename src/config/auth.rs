//! Authentication configuration for the Planning Center API.
//!
//! Planning Center supports two credential styles: OAuth 2.0 bearer tokens
//! and personal access tokens (an application ID and secret pair sent as
//! HTTP Basic credentials). [`AuthConfig`] models them as a tagged union so
//! the `Authorization` header construction is exhaustively matched.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

use crate::error::ConfigError;

/// Authentication credentials for API requests.
///
/// # Example
///
/// ```rust
/// use pco_api::AuthConfig;
///
/// let oauth = AuthConfig::oauth("my-access-token").unwrap();
/// assert_eq!(oauth.authorization_header(), "Bearer my-access-token");
///
/// let pat = AuthConfig::personal_access_token("app-id", "secret").unwrap();
/// assert!(pat.authorization_header().starts_with("Basic "));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthConfig {
    /// OAuth 2.0 bearer token authentication.
    OAuth {
        /// The OAuth access token.
        access_token: String,
        /// The refresh token, if the OAuth grant issued one.
        refresh_token: Option<String>,
    },
    /// Personal access token authentication (application ID + secret).
    PersonalAccessToken {
        /// The application ID half of the token.
        app_id: String,
        /// The secret half of the token.
        secret: String,
    },
}

impl AuthConfig {
    /// Creates an OAuth auth configuration without a refresh token.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyCredential`] if the access token is empty.
    pub fn oauth(access_token: impl Into<String>) -> Result<Self, ConfigError> {
        let access_token = access_token.into();
        if access_token.is_empty() {
            return Err(ConfigError::EmptyCredential {
                field: "access_token",
            });
        }
        Ok(Self::OAuth {
            access_token,
            refresh_token: None,
        })
    }

    /// Creates an OAuth auth configuration with a refresh token.
    ///
    /// The refresh token is carried for callers that implement token refresh;
    /// the client itself never initiates a refresh.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyCredential`] if the access token is empty.
    pub fn oauth_with_refresh(
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let mut auth = Self::oauth(access_token)?;
        if let Self::OAuth { refresh_token: rt, .. } = &mut auth {
            *rt = Some(refresh_token.into());
        }
        Ok(auth)
    }

    /// Creates a personal access token auth configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyCredential`] if either half is empty.
    pub fn personal_access_token(
        app_id: impl Into<String>,
        secret: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let app_id = app_id.into();
        let secret = secret.into();
        if app_id.is_empty() {
            return Err(ConfigError::EmptyCredential { field: "app_id" });
        }
        if secret.is_empty() {
            return Err(ConfigError::EmptyCredential { field: "secret" });
        }
        Ok(Self::PersonalAccessToken { app_id, secret })
    }

    /// Builds the `Authorization` header value for this credential.
    ///
    /// OAuth tokens produce `Bearer <token>`; personal access tokens produce
    /// `Basic base64(app_id:secret)`.
    #[must_use]
    pub fn authorization_header(&self) -> String {
        match self {
            Self::OAuth { access_token, .. } => format!("Bearer {access_token}"),
            Self::PersonalAccessToken { app_id, secret } => {
                let encoded = BASE64.encode(format!("{app_id}:{secret}"));
                format!("Basic {encoded}")
            }
        }
    }

    /// Returns the refresh token, if one is configured.
    #[must_use]
    pub fn refresh_token(&self) -> Option<&str> {
        match self {
            Self::OAuth { refresh_token, .. } => refresh_token.as_deref(),
            Self::PersonalAccessToken { .. } => None,
        }
    }

    /// Returns a stable string identifying this credential for cache keys.
    ///
    /// The value is only used for hashing; it is never logged or sent.
    pub(crate) fn cache_key_part(&self) -> String {
        match self {
            Self::OAuth { access_token, .. } => format!("oauth:{access_token}"),
            Self::PersonalAccessToken { app_id, secret } => {
                format!("pat:{app_id}:{secret}")
            }
        }
    }
}
