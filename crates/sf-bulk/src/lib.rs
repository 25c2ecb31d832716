//! # hopper-sf-bulk
//!
//! Salesforce Bulk API 1.0 client for large-scale data loads and queries.
//!
//! ## Features
//!
//! - **Ingest Jobs** - Insert, Update, Upsert, Delete, Hard Delete
//! - **Query Jobs** - Single-call SOQL query with multi-page result merging
//! - **Chunked Submission** - Row-count and payload-size bounded batches
//! - **CSV, JSON, and XML** - Payloads and results in the job's content type
//! - **Honest Partial Failures** - Recovered rows are returned alongside
//!   the description of what is missing, never silently dropped
//!
//! ## Example - Bulk Insert
//!
//! ```rust,ignore
//! use hopper_sf_bulk::{BulkClient, JobSpec, Table};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), hopper_sf_bulk::Error> {
//!     let client = BulkClient::from_parts(
//!         "https://myorg.my.salesforce.com",
//!         "session_token",
//!     )?;
//!
//!     let mut table = Table::new(vec!["Name".into(), "Industry".into()]);
//!     table.push_row(vec!["Acme Corp".into(), "Technology".into()]);
//!     table.push_row(vec!["Global Inc".into(), "Finance".into()]);
//!
//!     let outcome = client.run_load(&JobSpec::insert("Account"), &table).await?;
//!     println!("Processed {} rows", outcome.results.row_count());
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Example - Bulk Query
//!
//! ```rust,ignore
//! use hopper_sf_bulk::BulkClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), hopper_sf_bulk::Error> {
//!     let client = BulkClient::from_parts(
//!         "https://myorg.my.salesforce.com",
//!         "session_token",
//!     )?;
//!
//!     let table = client
//!         .run_query("SELECT Id, Name FROM Account WHERE Industry = 'Technology'")
//!         .await?;
//!     println!("Retrieved {} records", table.row_count());
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Recovering from partial results
//!
//! ```rust,ignore
//! match client.fetch_results(&job, &batches).await {
//!     Ok(table) => process(table),
//!     Err(err) => match err.into_partial_result() {
//!         Ok(partial) => {
//!             process(partial.recovered);
//!             for gap in partial.gaps {
//!                 eprintln!("batch {} missing: {:?}", gap.batch_id, gap.state_message);
//!             }
//!         }
//!         Err(err) => return Err(err.into()),
//!     },
//! }
//! ```

mod chunk;
mod client;
mod codec;
mod error;
mod types;
mod xml;

pub use chunk::{ChunkPolicy, DEFAULT_MAX_BYTES, DEFAULT_MAX_ROWS};
pub use client::{
    BulkClient, LoadOutcome, PollPolicy, SubmitPolicy, DEFAULT_POLL_ATTEMPTS,
    DEFAULT_POLL_INTERVAL,
};
pub use error::{Error, ErrorKind, PartialResult, Result};
pub use types::{
    BatchGap, BatchInfo, BatchState, ConcurrencyMode, ContentType, Job, JobSpec, JobState,
    Operation, RowOutcome, Table,
};
