//! Session provider trait and the concrete in-memory session.
//!
//! All session types implement custom Debug to redact the token.

use crate::error::{Error, ErrorKind, Result};

/// Trait for supplying an authenticated session to the bulk client.
///
/// The bulk crate never performs credential exchange; whatever login flow
/// produced the session id stays on the caller's side of this trait.
pub trait SessionProvider: Send + Sync {
    /// Get the session id sent in the `X-SFDC-Session` header.
    fn session_id(&self) -> &str;

    /// Get the instance host (e.g., "na1.my.salesforce.com").
    ///
    /// A full URL with scheme is also accepted; the transport normalizes it.
    fn instance_host(&self) -> &str;

    /// Get the API version (e.g., "62.0").
    fn api_version(&self) -> &str;

    /// Returns true if the session appears to be usable (non-empty).
    fn is_valid(&self) -> bool {
        !self.instance_host().is_empty() && !self.session_id().is_empty()
    }
}

/// Standard in-memory session.
///
/// The session id is redacted in Debug output to prevent accidental
/// exposure in logs.
#[derive(Clone)]
pub struct Session {
    instance_host: String,
    session_id: String,
    api_version: String,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("instance_host", &self.instance_host)
            .field("session_id", &"[REDACTED]")
            .field("api_version", &self.api_version)
            .finish()
    }
}

impl Session {
    /// Create a new session with the given instance host and session id.
    pub fn new(instance_host: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            instance_host: instance_host.into(),
            session_id: session_id.into(),
            api_version: hopper_sf_client::DEFAULT_API_VERSION.to_string(),
        }
    }

    /// Change the API version.
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    /// Load a session from environment variables.
    ///
    /// Required environment variables:
    /// - `SF_INSTANCE_URL` or `SALESFORCE_INSTANCE_URL`
    /// - `SF_SESSION_ID` or `SALESFORCE_SESSION_ID`
    ///
    /// Optional:
    /// - `SF_API_VERSION` or `SALESFORCE_API_VERSION` (default: "62.0")
    pub fn from_env() -> Result<Self> {
        let instance_host = std::env::var("SF_INSTANCE_URL")
            .or_else(|_| std::env::var("SALESFORCE_INSTANCE_URL"))
            .map_err(|_| Error::new(ErrorKind::EnvVar("SF_INSTANCE_URL".to_string())))?;
        if instance_host.is_empty() {
            return Err(Error::new(ErrorKind::InvalidInput(
                "SF_INSTANCE_URL is set but empty".to_string(),
            )));
        }

        let session_id = std::env::var("SF_SESSION_ID")
            .or_else(|_| std::env::var("SALESFORCE_SESSION_ID"))
            .map_err(|_| Error::new(ErrorKind::EnvVar("SF_SESSION_ID".to_string())))?;
        if session_id.is_empty() {
            return Err(Error::new(ErrorKind::InvalidInput(
                "SF_SESSION_ID is set but empty".to_string(),
            )));
        }

        let api_version = std::env::var("SF_API_VERSION")
            .or_else(|_| std::env::var("SALESFORCE_API_VERSION"))
            .unwrap_or_else(|_| hopper_sf_client::DEFAULT_API_VERSION.to_string());

        Ok(Self::new(instance_host, session_id).with_api_version(api_version))
    }
}

impl SessionProvider for Session {
    fn session_id(&self) -> &str {
        &self.session_id
    }

    fn instance_host(&self) -> &str {
        &self.instance_host
    }

    fn api_version(&self) -> &str {
        &self.api_version
    }
}
