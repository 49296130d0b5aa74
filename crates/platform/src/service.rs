//! Blocking service seam over the async client.
//!
//! [`PlatformService`] is the surface the orchestration layer talks to;
//! [`RestPlatform`] implements it by wrapping [`PlatformClient`] with an
//! internal single-threaded Tokio runtime, so callers don't manage an
//! async runtime of their own. Tests implement the trait with scripted
//! fakes instead.

use serde_json::Value;
use tracing::{debug, warn};

use floodmap_core::{Expr, Image, VisParams};

use crate::auth::{RequestAuth, TokenAuth, TOKEN_ENV_VAR};
use crate::client::{ClientOptions, PlatformClient};
use crate::error::{PlatformError, Result};

/// Blocking view of the remote platform.
///
/// One session per service value; initialization is idempotent and
/// checked per call.
pub trait PlatformService {
    /// Try to initialize the session with the default credential
    /// discovery. Returns `false` (never an error) on failure so the
    /// caller can attempt a secondary strategy. Safe to call when
    /// already initialized.
    fn ensure_initialized(&mut self) -> bool;

    /// Secondary initialization strategy: environment credentials,
    /// surfacing the failure reason. Idempotent.
    fn initialize(&mut self) -> Result<()>;

    /// Force an expression to a concrete value.
    fn compute_value(&self, expression: &Expr) -> Result<Value>;

    /// Create a server-side map for an image and return its tile URL
    /// template.
    fn create_map(&self, image: &Image, visualization: Option<&VisParams>) -> Result<String>;
}

/// [`PlatformService`] implementation over the platform's REST API.
pub struct RestPlatform {
    rt: tokio::runtime::Runtime,
    options: ClientOptions,
    client: Option<PlatformClient>,
}

impl RestPlatform {
    /// Create an unconnected service. No credentials are read and no
    /// request is made until initialization.
    pub fn new(options: ClientOptions) -> Result<Self> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| PlatformError::Network(e.to_string()))?;

        Ok(Self {
            rt,
            options,
            client: None,
        })
    }

    /// Initialize with explicit credentials, bypassing discovery.
    pub fn initialize_with(&mut self, auth: Box<dyn RequestAuth>) -> Result<()> {
        let client = PlatformClient::new(auth, self.options.clone())?;
        self.rt.block_on(client.ping())?;
        self.client = Some(client);
        Ok(())
    }

    fn client(&self) -> Result<&PlatformClient> {
        self.client
            .as_ref()
            .ok_or_else(|| PlatformError::Auth("session not initialized".into()))
    }
}

impl PlatformService for RestPlatform {
    fn ensure_initialized(&mut self) -> bool {
        if self.client.is_some() {
            return true;
        }
        let auth = match TokenAuth::discover() {
            Ok(auth) => auth,
            Err(e) => {
                debug!(error = %e, "platform credential discovery failed");
                return false;
            }
        };
        match self.initialize_with(Box::new(auth)) {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "platform session check failed");
                false
            }
        }
    }

    fn initialize(&mut self) -> Result<()> {
        if self.client.is_some() {
            return Ok(());
        }
        let auth = TokenAuth::from_env()?;
        self.initialize_with(Box::new(auth))
    }

    fn compute_value(&self, expression: &Expr) -> Result<Value> {
        let client = self.client()?;
        self.rt.block_on(client.compute_value(expression))
    }

    fn create_map(&self, image: &Image, visualization: Option<&VisParams>) -> Result<String> {
        let client = self.client()?;
        let map = self
            .rt
            .block_on(client.create_map(image.expr(), visualization))?;
        Ok(map.tile_url_template(&self.options.base_url))
    }
}

/// Remediation guidance for a session that could not be initialized.
pub(crate) fn uninitialized_guidance(cause: &PlatformError) -> String {
    format!(
        "run the platform authenticator to store credentials, or export {} ({})",
        TOKEN_ENV_VAR, cause
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use floodmap_core::{Collection, ImageCollection};

    #[test]
    fn requests_before_initialization_fail_locally() {
        let service = RestPlatform::new(ClientOptions::default()).unwrap();
        let image = ImageCollection::load(&Collection::Sentinel2Sr).median();
        let err = service.compute_value(image.expr()).unwrap_err();
        assert!(matches!(err, PlatformError::Auth(_)));
    }
}
