//! # hopper-sf-api
//!
//! A Salesforce Bulk API 1.0 client library for Rust.
//!
//! This library drives large-scale data loads and queries through the
//! asynchronous `/services/async` interface: XML control documents, chunked
//! batch submission, fixed-interval polling, and paginated result assembly.
//!
//! ## Security
//!
//! - Session tokens are redacted in Debug output
//! - Tracing skips credential parameters
//! - Error messages sanitize session identifiers before they can reach logs
//!
//! ## Crates
//!
//! - **hopper-sf-client** - HTTP transport: session-header auth, opt-in
//!   retry, compression, async-API error documents
//! - **hopper-sf-auth** - Session boundary: provider trait, concrete
//!   session, environment loading
//! - **hopper-sf-bulk** - Bulk API 1.0: jobs, batches, chunking, polling,
//!   result tables
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use hopper_sf_api::{BulkClient, JobSpec, Session, Table};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Session id and instance host come from outside, e.g. the
//!     // environment
//!     let session = Session::from_env()?;
//!     let client = BulkClient::new(&session)?;
//!
//!     let mut table = Table::new(vec!["Name".into()]);
//!     table.push_row(vec!["Acme Corp".into()]);
//!
//!     let outcome = client.run_load(&JobSpec::insert("Account"), &table).await?;
//!     for row in outcome.results.outcomes().unwrap_or_default() {
//!         println!("{:?} -> success: {}", row.id, row.success);
//!     }
//!
//!     Ok(())
//! }
//! ```

// Re-export the member crates for convenient access
#[cfg(feature = "auth")]
pub use hopper_sf_auth as auth;
#[cfg(feature = "bulk")]
pub use hopper_sf_bulk as bulk;
#[cfg(feature = "client")]
pub use hopper_sf_client as client;

// Re-export commonly used types at the top level
#[cfg(feature = "auth")]
pub use hopper_sf_auth::{Session, SessionProvider};
#[cfg(feature = "bulk")]
pub use hopper_sf_bulk::{
    BulkClient, ChunkPolicy, JobSpec, LoadOutcome, Operation, PollPolicy, SubmitPolicy, Table,
};
#[cfg(feature = "client")]
pub use hopper_sf_client::ClientConfig;
