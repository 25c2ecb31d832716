//! # hopper-sf-auth
//!
//! Session boundary for the Bulk API client.
//!
//! The bulk crate consumes `(session token, instance host)` through the
//! [`SessionProvider`] trait; how those values are obtained is the caller's
//! business. A concrete [`Session`] is provided for the common cases of
//! handing over values directly or loading them from the environment.
//!
//! ## Security
//!
//! - Session tokens are redacted in Debug output
//! - Nothing is persisted; sessions live in memory only
//!
//! ## Example
//!
//! ```rust,ignore
//! use hopper_sf_auth::Session;
//!
//! // Directly
//! let session = Session::new("na1.my.salesforce.com", "00Dxx...!AR8AQ...");
//!
//! // From environment variables
//! let session = Session::from_env()?;
//! ```

mod error;
mod session;

pub use error::{Error, ErrorKind, Result};
pub use session::{Session, SessionProvider};
