//! Blocking REST client for the quantum runtime service.

use std::time::Instant;

use log::{debug, info, warn};
use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::{RemoteConfig, RemoteError, transpile};
use crate::circuit::Circuit;
use crate::source::{BackendInfo, BackendKind, QuantumBackend, RawSample, SampleBatch, SourceError};

static INFO: BackendInfo = BackendInfo {
    name: "runtime",
    description: "Physical device reached through the quantum runtime service",
    kind: BackendKind::Remote,
};

/// A device as reported by `GET /backends`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendStatus {
    pub name: String,
    #[serde(default)]
    pub simulator: bool,
    #[serde(default)]
    pub operational: bool,
    #[serde(default)]
    pub pending_jobs: u64,
    #[serde(default)]
    pub basis_gates: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct BackendList {
    backends: Vec<BackendStatus>,
}

#[derive(Debug, Serialize)]
struct JobRequest<'a> {
    program_id: &'a str,
    backend: &'a str,
    params: JobParams,
}

#[derive(Debug, Serialize)]
struct JobParams {
    pubs: Vec<Vec<String>>,
    shots: u32,
}

#[derive(Debug, Deserialize)]
struct JobCreated {
    id: String,
}

/// Lifecycle state of a submitted job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum JobStatus {
    Queued,
    Running,
    Completed,
    Failed,
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Queued => write!(f, "queued"),
            Self::Running => write!(f, "running"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct JobState {
    status: JobStatus,
    #[serde(default)]
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct JobResults {
    results: Vec<PubResult>,
}

#[derive(Debug, Deserialize)]
struct PubResult {
    data: PubData,
}

#[derive(Debug, Deserialize)]
struct PubData {
    meas: MeasData,
}

#[derive(Debug, Deserialize)]
struct MeasData {
    samples: Vec<String>,
}

/// Pick the operational, non-simulator device with the shortest queue.
///
/// Ties go to the alphabetically first name so selection is deterministic.
pub fn select_least_busy(backends: &[BackendStatus]) -> Option<&BackendStatus> {
    backends
        .iter()
        .filter(|b| b.operational && !b.simulator)
        .min_by(|a, b| {
            a.pending_jobs
                .cmp(&b.pending_jobs)
                .then_with(|| a.name.cmp(&b.name))
        })
}

/// Remote backend that runs circuits on a physical device.
pub struct RuntimeClient {
    http: Client,
    token: String,
    config: RemoteConfig,
}

impl RuntimeClient {
    /// Build a client. No request is made until the first [`QuantumBackend::run`].
    pub fn new(token: impl Into<String>, config: RemoteConfig) -> Result<Self, RemoteError> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("qball/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RemoteError::Connection(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            token: token.into(),
            config,
        })
    }

    pub fn config(&self) -> &RemoteConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.config.endpoint.trim_end_matches('/'))
    }

    fn authorized(&self, req: RequestBuilder) -> RequestBuilder {
        req.bearer_auth(&self.token)
            .header("Service-Channel", &self.config.channel)
    }

    /// List devices visible to the credential.
    pub fn list_backends(&self) -> Result<Vec<BackendStatus>, RemoteError> {
        let resp = self
            .authorized(self.http.get(self.url("backends")))
            .send()
            .map_err(|e| RemoteError::Connection(e.to_string()))?;
        match resp.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(RemoteError::Connection(format!(
                    "credential rejected ({})",
                    resp.status()
                )));
            }
            s if !s.is_success() => {
                return Err(RemoteError::Connection(format!("unexpected status {s}")));
            }
            _ => {}
        }
        let list: BackendList = resp
            .json()
            .map_err(|e| RemoteError::Connection(format!("malformed backend list: {e}")))?;
        Ok(list.backends)
    }

    /// Query the service and pick the least-loaded device.
    pub fn least_busy(&self) -> Result<BackendStatus, RemoteError> {
        let backends = self.list_backends()?;
        select_least_busy(&backends).cloned().ok_or_else(|| {
            RemoteError::BackendSelection(format!(
                "none of {} backends is an operational device",
                backends.len()
            ))
        })
    }

    /// Submit an already-lowered circuit. Returns the job id.
    pub fn submit(
        &self,
        backend: &BackendStatus,
        circuit: &Circuit,
        shots: u32,
    ) -> Result<String, RemoteError> {
        let request = JobRequest {
            program_id: "sampler",
            backend: &backend.name,
            params: JobParams {
                pubs: vec![vec![circuit.to_qasm()]],
                shots,
            },
        };
        let resp = self
            .authorized(self.http.post(self.url("jobs")))
            .json(&request)
            .send()
            .map_err(|e| RemoteError::Execution(format!("submission failed: {e}")))?;
        let created: JobCreated = decode(resp, "job submission")?;
        info!(
            "submitted job {} to {} ({shots} shots)",
            created.id, backend.name
        );
        Ok(created.id)
    }

    /// Poll until the job completes, then fetch and decode its samples.
    pub fn wait(&self, job_id: &str) -> Result<SampleBatch, RemoteError> {
        let deadline = Instant::now() + self.config.timeout;
        loop {
            let resp = self
                .authorized(self.http.get(self.url(&format!("jobs/{job_id}"))))
                .send()
                .map_err(|e| RemoteError::Execution(format!("status poll failed: {e}")))?;
            let state: JobState = decode(resp, "job status")?;
            debug!("job {job_id} is {}", state.status);
            match state.status {
                JobStatus::Completed => return self.results(job_id),
                JobStatus::Failed | JobStatus::Cancelled => {
                    return Err(RemoteError::Execution(format!(
                        "job {job_id} {}: {}",
                        state.status,
                        state.reason.as_deref().unwrap_or("no reason given")
                    )));
                }
                JobStatus::Unknown => warn!("job {job_id} reported an unrecognised status"),
                JobStatus::Queued | JobStatus::Running => {}
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(RemoteError::Timeout {
                    job_id: job_id.to_string(),
                    timeout: self.config.timeout,
                });
            }
            std::thread::sleep(self.config.poll_interval.min(remaining));
        }
    }

    fn results(&self, job_id: &str) -> Result<SampleBatch, RemoteError> {
        let resp = self
            .authorized(self.http.get(self.url(&format!("jobs/{job_id}/results"))))
            .send()
            .map_err(|e| RemoteError::Execution(format!("result fetch failed: {e}")))?;
        let results: JobResults = decode(resp, "job results")?;
        let first = results
            .results
            .into_iter()
            .next()
            .ok_or_else(|| RemoteError::Execution(format!("job {job_id} returned no results")))?;
        first
            .data
            .meas
            .samples
            .iter()
            .map(|hex| {
                RawSample::from_hex(hex).ok_or_else(|| {
                    RemoteError::Execution(format!("job {job_id} returned malformed sample {hex:?}"))
                })
            })
            .collect()
    }
}

fn decode<T: DeserializeOwned>(resp: Response, what: &str) -> Result<T, RemoteError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().unwrap_or_default();
        return Err(RemoteError::Execution(format!(
            "{what} returned {status}: {}",
            body.trim()
        )));
    }
    resp.json()
        .map_err(|e| RemoteError::Execution(format!("malformed {what}: {e}")))
}

impl QuantumBackend for RuntimeClient {
    fn info(&self) -> &BackendInfo {
        &INFO
    }

    fn run(&self, circuit: &Circuit, shots: u32) -> Result<SampleBatch, SourceError> {
        let backend = self.least_busy()?;
        debug!(
            "selected backend {} ({} pending jobs)",
            backend.name, backend.pending_jobs
        );
        let lowered = transpile::lower(circuit, &backend.basis_gates).map_err(|reason| {
            RemoteError::Compilation {
                backend: backend.name.clone(),
                reason,
            }
        })?;
        let job_id = self.submit(&backend, &lowered, shots)?;
        Ok(self.wait(&job_id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend(name: &str, simulator: bool, operational: bool, pending: u64) -> BackendStatus {
        BackendStatus {
            name: name.to_string(),
            simulator,
            operational,
            pending_jobs: pending,
            basis_gates: vec!["rz".into(), "sx".into()],
        }
    }

    #[test]
    fn least_busy_skips_simulators_and_offline_devices() {
        let backends = vec![
            backend("sim", true, true, 0),
            backend("offline", false, false, 0),
            backend("busy", false, true, 40),
            backend("quiet", false, true, 3),
        ];
        assert_eq!(select_least_busy(&backends).unwrap().name, "quiet");
    }

    #[test]
    fn least_busy_breaks_ties_by_name() {
        let backends = vec![backend("zeta", false, true, 1), backend("alpha", false, true, 1)];
        assert_eq!(select_least_busy(&backends).unwrap().name, "alpha");
    }

    #[test]
    fn least_busy_none_when_nothing_qualifies() {
        let backends = vec![backend("sim", true, true, 0)];
        assert!(select_least_busy(&backends).is_none());
        assert!(select_least_busy(&[]).is_none());
    }

    #[test]
    fn backend_status_defaults_missing_fields() {
        let b: BackendStatus = serde_json::from_str(r#"{"name":"dev"}"#).unwrap();
        assert!(!b.operational);
        assert!(b.basis_gates.is_empty());
    }

    #[test]
    fn job_status_tolerates_unknown_values() {
        let s: JobStatus = serde_json::from_str(r#""Validating""#).unwrap();
        assert_eq!(s, JobStatus::Unknown);
        let s: JobStatus = serde_json::from_str(r#""Completed""#).unwrap();
        assert_eq!(s, JobStatus::Completed);
    }

    #[test]
    fn url_joins_without_double_slash() {
        let config = RemoteConfig {
            endpoint: "http://localhost:9/runtime/".to_string(),
            ..RemoteConfig::default()
        };
        let client = RuntimeClient::new("t", config).unwrap();
        assert_eq!(client.url("jobs"), "http://localhost:9/runtime/jobs");
    }
}
