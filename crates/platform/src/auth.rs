//! Request authentication for the remote platform.
//!
//! The platform accepts OAuth-style bearer tokens. Tokens come from the
//! credentials file its own authenticator writes, or from an
//! environment variable for service-style deployments. Obtaining a
//! token in the first place (interactive auth, token refresh) is the
//! authenticator's job, not this crate's.

use crate::error::{PlatformError, Result};

/// Environment variable holding a platform access token.
pub const TOKEN_ENV_VAR: &str = "EARTHENGINE_TOKEN";

/// Path of the stored credentials file, relative to the home directory.
pub const CREDENTIALS_PATH: &str = ".config/earthengine/credentials";

/// Trait for signing HTTP requests to the platform.
///
/// Implementations add authentication headers to outgoing requests
/// before they are sent.
pub trait RequestAuth: Send + Sync {
    /// Sign a request by adding authentication headers.
    fn sign_request(
        &self,
        url: &str,
        method: &str,
        headers: &mut Vec<(String, String)>,
    ) -> Result<()>;
}

/// No authentication, for local test endpoints.
pub struct NoAuth;

impl RequestAuth for NoAuth {
    fn sign_request(
        &self,
        _url: &str,
        _method: &str,
        _headers: &mut Vec<(String, String)>,
    ) -> Result<()> {
        Ok(())
    }
}

/// Bearer-token authentication.
pub struct TokenAuth {
    token: String,
}

impl TokenAuth {
    /// Create from an explicit token.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    /// Load the token from [`TOKEN_ENV_VAR`].
    pub fn from_env() -> Result<Self> {
        let token = std::env::var(TOKEN_ENV_VAR)
            .map_err(|_| PlatformError::Auth(format!("{} not set", TOKEN_ENV_VAR)))?;
        if token.is_empty() {
            return Err(PlatformError::Auth(format!("{} is empty", TOKEN_ENV_VAR)));
        }
        Ok(Self::new(token))
    }

    /// Load the token from the stored credentials file
    /// (`~/.config/earthengine/credentials`, a JSON mapping with an
    /// `access_token` field).
    pub fn from_stored_credentials() -> Result<Self> {
        let home = std::env::var("HOME")
            .map_err(|_| PlatformError::Auth("HOME not set; cannot locate credentials".into()))?;
        let path = std::path::Path::new(&home).join(CREDENTIALS_PATH);
        let raw = std::fs::read_to_string(&path).map_err(|e| {
            PlatformError::Auth(format!("reading {}: {}", path.display(), e))
        })?;
        let parsed: serde_json::Value = serde_json::from_str(&raw).map_err(|e| {
            PlatformError::Auth(format!("parsing {}: {}", path.display(), e))
        })?;
        let token = parsed
            .get("access_token")
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| {
                PlatformError::Auth(format!("{} has no access_token field", path.display()))
            })?;
        Ok(Self::new(token))
    }

    /// Default discovery order: stored credentials, then environment.
    pub fn discover() -> Result<Self> {
        Self::from_stored_credentials().or_else(|_| Self::from_env())
    }
}

impl RequestAuth for TokenAuth {
    fn sign_request(
        &self,
        _url: &str,
        _method: &str,
        headers: &mut Vec<(String, String)>,
    ) -> Result<()> {
        headers.push(("Authorization".to_string(), format!("Bearer {}", self.token)));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_auth_adds_bearer_header() {
        let auth = TokenAuth::new("abc123");
        let mut headers = Vec::new();
        auth.sign_request("https://example.com", "POST", &mut headers)
            .unwrap();
        assert_eq!(
            headers,
            vec![("Authorization".to_string(), "Bearer abc123".to_string())]
        );
    }

    #[test]
    fn no_auth_adds_nothing() {
        let mut headers = Vec::new();
        NoAuth
            .sign_request("https://example.com", "GET", &mut headers)
            .unwrap();
        assert!(headers.is_empty());
    }
}
