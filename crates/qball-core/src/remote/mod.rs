//! Remote quantum runtime backend.
//!
//! Running on a physical device takes five steps: connect with the
//! credential, pick the least-loaded operational device, lower the circuit to
//! that device's native gates, submit a batched job, and wait for its result.
//! Each step fails with its own [`RemoteError`] variant so callers can tell a
//! bad token from a queue that never drained.

mod client;
pub mod transpile;

use std::time::Duration;

pub use client::{BackendStatus, JobStatus, RuntimeClient, select_least_busy};

/// Default runtime REST endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.quantum-computing.ibm.com/runtime";

/// Default service channel sent with every request.
pub const DEFAULT_CHANNEL: &str = "ibm_quantum";

/// Failure of one step of the remote execution path.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    /// The service could not be reached or rejected the credential.
    #[error("failed to connect to runtime service: {0}")]
    Connection(String),

    /// No operational, non-simulator device is available.
    #[error("failed to find a backend: {0}")]
    BackendSelection(String),

    /// The circuit uses gates the selected device cannot express.
    #[error("failed to lower circuit for {backend}: {reason}")]
    Compilation { backend: String, reason: String },

    /// Submission failed, the job failed, or its result was unreadable.
    #[error("job failed to execute: {0}")]
    Execution(String),

    /// The job did not reach a final state in time.
    #[error("job {job_id} did not finish within {timeout:?}")]
    Timeout { job_id: String, timeout: Duration },
}

/// Connection settings for the runtime service.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Base URL; `/backends` and `/jobs` are resolved against it.
    pub endpoint: String,
    /// Value of the `Service-Channel` header.
    pub channel: String,
    /// Delay between job status polls.
    pub poll_interval: Duration,
    /// Upper bound on waiting for a submitted job.
    pub timeout: Duration,
    /// Per-request HTTP timeout.
    pub request_timeout: Duration,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            channel: DEFAULT_CHANNEL.to_string(),
            poll_interval: Duration::from_secs(2),
            timeout: Duration::from_secs(600),
            request_timeout: Duration::from_secs(30),
        }
    }
}
