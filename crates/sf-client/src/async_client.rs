//! High-level async-API client with endpoint builders.
//!
//! This module provides `AsyncApiClient`, which combines a session token with
//! an HTTP client and builds the `/services/async/<version>/...` endpoint
//! URLs used by the Bulk API control plane.
//!
//! ## Security
//!
//! - Session tokens are redacted in Debug output
//! - Sensitive parameters are skipped in tracing spans

use tracing::instrument;

use crate::client::SfHttpClient;
use crate::config::ClientConfig;
use crate::error::{Error, ErrorKind, Result};
use crate::request::RequestBuilder;
use crate::response::{Response, ResponseExt};
use crate::DEFAULT_API_VERSION;

/// High-level async-API client.
///
/// This client combines a session token with HTTP infrastructure and builds
/// the job and batch endpoint URLs. It's designed to be used by the
/// higher-level bulk crate.
///
/// ## Security
///
/// The session token is redacted in Debug output to prevent accidental
/// exposure in logs.
///
/// # Example
///
/// ```rust,ignore
/// use hopper_sf_client::AsyncApiClient;
///
/// let client = AsyncApiClient::new("na1.my.salesforce.com", "00Dxx...!AR8AQ...")?;
///
/// let job_info = client.get_text(&client.job_url("750xx000000000AAAA")).await?;
/// ```
#[derive(Clone)]
pub struct AsyncApiClient {
    http: SfHttpClient,
    instance_host: String,
    session_token: String,
    api_version: String,
}

impl std::fmt::Debug for AsyncApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncApiClient")
            .field("instance_host", &self.instance_host)
            .field("session_token", &"[REDACTED]")
            .field("api_version", &self.api_version)
            .finish_non_exhaustive()
    }
}

impl AsyncApiClient {
    /// Create a new async-API client for the given instance host and session token.
    ///
    /// The host may be given with or without a scheme; `https://` is assumed
    /// when none is present.
    pub fn new(
        instance_host: impl Into<String>,
        session_token: impl Into<String>,
    ) -> Result<Self> {
        Self::with_config(instance_host, session_token, ClientConfig::default())
    }

    /// Create a new async-API client with custom configuration.
    pub fn with_config(
        instance_host: impl Into<String>,
        session_token: impl Into<String>,
        config: ClientConfig,
    ) -> Result<Self> {
        let host = instance_host.into();
        let host = host.trim().trim_end_matches('/').to_string();
        if host.is_empty() {
            return Err(Error::new(ErrorKind::Config(
                "instance host must not be empty".to_string(),
            )));
        }
        let host = if host.contains("://") {
            host
        } else {
            format!("https://{host}")
        };
        url::Url::parse(&host)?;

        let token = session_token.into();
        if token.is_empty() {
            return Err(Error::new(ErrorKind::Config(
                "session token must not be empty".to_string(),
            )));
        }

        let http = SfHttpClient::new(config)?;
        Ok(Self {
            http,
            instance_host: host,
            session_token: token,
            api_version: DEFAULT_API_VERSION.to_string(),
        })
    }

    /// Set the API version (e.g., "62.0").
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    /// Get the instance host, normalized with a scheme and no trailing slash.
    pub fn instance_host(&self) -> &str {
        &self.instance_host
    }

    /// Get the session token.
    pub fn session_token(&self) -> &str {
        &self.session_token
    }

    /// Get the API version.
    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    // =========================================================================
    // Endpoint URLs
    // =========================================================================

    /// Base URL of the async API: `<host>/services/async/<version>`.
    ///
    /// Unlike the REST API, the async API takes the version without a `v`
    /// prefix.
    pub fn async_base(&self) -> String {
        format!("{}/services/async/{}", self.instance_host, self.api_version)
    }

    /// URL for creating jobs.
    pub fn jobs_url(&self) -> String {
        format!("{}/job", self.async_base())
    }

    /// URL for a single job.
    pub fn job_url(&self, job_id: &str) -> String {
        format!("{}/job/{}", self.async_base(), job_id)
    }

    /// URL for adding batches to a job and listing them.
    pub fn batch_list_url(&self, job_id: &str) -> String {
        format!("{}/batch", self.job_url(job_id))
    }

    /// URL for a single batch.
    pub fn batch_url(&self, job_id: &str, batch_id: &str) -> String {
        format!("{}/batch/{}", self.job_url(job_id), batch_id)
    }

    /// URL for a batch's result body (ingest) or result-id list (query).
    pub fn batch_result_url(&self, job_id: &str, batch_id: &str) -> String {
        format!("{}/result", self.batch_url(job_id, batch_id))
    }

    /// URL for one page of query results.
    pub fn page_url(&self, job_id: &str, batch_id: &str, result_id: &str) -> String {
        format!("{}/{}", self.batch_result_url(job_id, batch_id), result_id)
    }

    // =========================================================================
    // HTTP Methods (with session-header authentication)
    // =========================================================================

    /// Create a GET request builder with authentication.
    pub fn get(&self, url: &str) -> RequestBuilder {
        self.http.get(url).session_auth(&self.session_token)
    }

    /// Create a POST request builder with authentication.
    pub fn post(&self, url: &str) -> RequestBuilder {
        self.http.post(url).session_auth(&self.session_token)
    }

    /// Execute a request and return the raw response.
    pub async fn execute(&self, request: RequestBuilder) -> Result<Response> {
        self.http.execute(request).await
    }

    /// GET a URL and return the response body as text.
    ///
    /// Async-API error documents are converted to errors before the body is
    /// read.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn get_text(&self, url: &str) -> Result<String> {
        let response = self.http.execute(self.get(url)).await?;
        let response = response.check_async_api_error().await?;
        response.text().await
    }

    /// POST an XML control document and return the response body as text.
    #[instrument(skip(self, doc), fields(url = %url))]
    pub async fn post_xml(&self, url: &str, doc: &str) -> Result<String> {
        let response = self.http.execute(self.post(url).xml(doc)).await?;
        let response = response.check_async_api_error().await?;
        response.text().await
    }
}
