//! # sf-client
//!
//! HTTP transport for the Salesforce Bulk API 1.0 (the asynchronous
//! `/services/async` interface).
//!
//! This crate provides the foundational HTTP client with:
//! - Session-header authentication (`X-SFDC-Session`)
//! - Opt-in retry with exponential backoff and jitter
//! - Compression support (gzip, deflate)
//! - Rate limit detection and handling
//! - Connection pooling
//! - Request/response tracing
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Application Layer                        │
//! │                        (sf-bulk)                            │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    AsyncApiClient                           │
//! │  - Holds session + HTTP client                              │
//! │  - Builds /services/async/<version> URLs                    │
//! │  - Attaches the session header, checks error documents      │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    SfHttpClient                             │
//! │  - Raw HTTP with retry, compression, rate limiting          │
//! │  - Request building                                         │
//! │  - Response handling                                        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use hopper_sf_client::AsyncApiClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), hopper_sf_client::Error> {
//!     let client = AsyncApiClient::new("na1.my.salesforce.com", "00D...!AR8AQ...")?;
//!
//!     // Read a job's control document
//!     let job_info = client.get_text(&client.job_url("750xx000000001AAA")).await?;
//!
//!     // Submit a control document
//!     let doc = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>...";
//!     let created = client.post_xml(&client.jobs_url(), doc).await?;
//!
//!     Ok(())
//! }
//! ```

mod async_client;
mod client;
mod config;
mod error;
mod request;
mod response;
mod retry;
pub mod security;

pub use async_client::AsyncApiClient;
pub use client::SfHttpClient;
pub use config::{ClientConfig, ClientConfigBuilder, CompressionConfig};
pub use error::{Error, ErrorKind, Result};
pub use request::{RequestBody, RequestBuilder, RequestMethod};
pub use response::{Response, ResponseExt};
pub use retry::{BackoffStrategy, RetryConfig, RetryPolicy};

/// Default Salesforce API version
pub const DEFAULT_API_VERSION: &str = "62.0";

/// User-Agent string for the client
pub const USER_AGENT: &str = concat!("hopper-sf-api/", env!("CARGO_PKG_VERSION"));
