//! Bulk API client: job lifecycle, batch submission, polling, and result
//! assembly.

use std::time::Duration;

use hopper_sf_auth::SessionProvider;
use hopper_sf_client::AsyncApiClient;

use crate::chunk::ChunkPolicy;
use crate::error::{Error, ErrorKind, Result};

mod batch;
mod flows;
mod job;
mod poll;
mod results;

pub use flows::LoadOutcome;

/// Default fixed delay between status polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Default number of status polls before giving up.
pub const DEFAULT_POLL_ATTEMPTS: u32 = 60;

/// Fixed-interval polling schedule.
///
/// At most `max_attempts` status reads are made, with `interval` between
/// consecutive reads. Running out of attempts is recoverable: the job keeps
/// processing server-side and can be polled again.
#[derive(Debug, Clone)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_attempts: DEFAULT_POLL_ATTEMPTS,
        }
    }
}

impl PollPolicy {
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
        }
    }
}

/// What to do with already-created batches when a later chunk submission
/// fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmitPolicy {
    /// Report the created batches in the error and leave the job untouched.
    #[default]
    Report,
    /// Best-effort abort of the job, then report.
    AbortJob,
}

/// Client for the Bulk API 1.0.
///
/// One client serves any number of jobs; independent jobs can be driven
/// concurrently from clones of the same client.
#[derive(Debug, Clone)]
pub struct BulkClient {
    client: AsyncApiClient,
    chunk_policy: ChunkPolicy,
    poll_policy: PollPolicy,
    submit_policy: SubmitPolicy,
}

impl BulkClient {
    /// Create a client from a session provider.
    pub fn new(provider: &dyn SessionProvider) -> Result<Self> {
        if !provider.is_valid() {
            return Err(Error::new(ErrorKind::Session(
                "Session provider returned an empty session".to_string(),
            )));
        }
        let client = AsyncApiClient::new(provider.instance_host(), provider.session_id())?
            .with_api_version(provider.api_version());
        Ok(Self::from_api_client(client))
    }

    /// Create a client directly from an instance host and session token.
    pub fn from_parts(
        instance_host: impl Into<String>,
        session_token: impl Into<String>,
    ) -> Result<Self> {
        let client = AsyncApiClient::new(instance_host, session_token)?;
        Ok(Self::from_api_client(client))
    }

    fn from_api_client(client: AsyncApiClient) -> Self {
        Self {
            client,
            chunk_policy: ChunkPolicy::default(),
            poll_policy: PollPolicy::default(),
            submit_policy: SubmitPolicy::default(),
        }
    }

    /// Override the async API version used in request paths.
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.client = self.client.with_api_version(version);
        self
    }

    /// Set the chunking bounds used by [`submit_table`](Self::submit_table).
    pub fn with_chunk_policy(mut self, policy: ChunkPolicy) -> Self {
        self.chunk_policy = policy;
        self
    }

    /// Set the polling schedule used by the await calls.
    pub fn with_poll_policy(mut self, policy: PollPolicy) -> Self {
        self.poll_policy = policy;
        self
    }

    /// Set the partial-submission behavior.
    pub fn with_submit_policy(mut self, policy: SubmitPolicy) -> Self {
        self.submit_policy = policy;
        self
    }

    /// The instance host requests are sent to.
    pub fn instance_host(&self) -> &str {
        self.client.instance_host()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticProvider {
        host: &'static str,
        session: &'static str,
    }

    impl SessionProvider for StaticProvider {
        fn session_id(&self) -> &str {
            self.session
        }

        fn instance_host(&self) -> &str {
            self.host
        }

        fn api_version(&self) -> &str {
            "62.0"
        }
    }

    #[test]
    fn test_new_from_provider() {
        let provider = StaticProvider {
            host: "na1.my.salesforce.com",
            session: "00Dxx!session",
        };
        let client = BulkClient::new(&provider).unwrap();
        assert_eq!(client.instance_host(), "https://na1.my.salesforce.com");
    }

    #[test]
    fn test_new_rejects_empty_session() {
        let provider = StaticProvider {
            host: "na1.my.salesforce.com",
            session: "",
        };
        let err = BulkClient::new(&provider).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Session(_)));
    }

    #[test]
    fn test_builders() {
        let client = BulkClient::from_parts("https://na1.my.salesforce.com", "token")
            .unwrap()
            .with_api_version("58.0")
            .with_chunk_policy(ChunkPolicy::new().with_max_rows(500))
            .with_poll_policy(PollPolicy::new(Duration::from_millis(10), 3))
            .with_submit_policy(SubmitPolicy::AbortJob);

        assert_eq!(client.client.api_version(), "58.0");
        assert_eq!(client.chunk_policy.max_rows, 500);
        assert_eq!(client.poll_policy.max_attempts, 3);
        assert_eq!(client.submit_policy, SubmitPolicy::AbortJob);
    }
}
