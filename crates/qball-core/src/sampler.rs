//! Bounded uniform sampler.
//!
//! A measured `k`-qubit uniform superposition yields integers uniform over
//! `[0, 2^k)`. To get a uniform integer in `[0, range)` for a `range` that is
//! not a power of two, out-of-range draws are rejected and redrawn:
//!
//! - **Local**: one shot per draw, at most `max_attempts + 1` draws, then
//!   [`SamplerError::ExhaustedRetries`].
//! - **Remote**: one batch of `shots` shots per request, scanned in order, at
//!   most `max_batches` requests, then [`SamplerError::ExhaustedBatch`].
//!
//! Since `k` is the smallest width with `2^k >= range`, fewer than two draws
//! are needed on average.

use log::{debug, trace};

use crate::circuit::Circuit;
use crate::remote::{RemoteConfig, RuntimeClient};
use crate::simulator::StatevectorSimulator;
use crate::source::{QuantumBackend, SourceError};

/// Default local retry budget per [`Sampler::sample`] call.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 1000;

/// Default shots requested per remote batch.
pub const DEFAULT_SHOTS: u32 = 1000;

/// Errors returned by the sampler.
#[derive(Debug, thiserror::Error)]
pub enum SamplerError {
    /// Bad constructor input or a mode the sampler was not configured for.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Every local draw in the budget was out of range.
    #[error(
        "too many out-of-range samples ({attempts} draws); check the circuit width matches the range"
    )]
    ExhaustedRetries { attempts: u32 },

    /// No shot in any fetched remote batch was in range.
    #[error("no in-range value in {batches} remote batch(es) of {shots} shots")]
    ExhaustedBatch { batches: u32, shots: u32 },

    /// The backend failed to produce samples.
    #[error(transparent)]
    Source(#[from] SourceError),
}

/// Which backend a draw should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SampleMode {
    /// In-process simulator with a retry budget.
    #[default]
    Local,
    /// Physical device, one batched job per request.
    Remote,
}

impl std::fmt::Display for SampleMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Remote => write!(f, "remote"),
        }
    }
}

impl std::str::FromStr for SampleMode {
    type Err = SamplerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" | "sim" => Ok(Self::Local),
            "remote" | "qpu" => Ok(Self::Remote),
            other => Err(SamplerError::InvalidArgument(format!(
                "unknown sample mode '{other}' (expected local or remote)"
            ))),
        }
    }
}

/// Parse a textual exclusive upper bound.
///
/// Only base-10 integers greater than 1 are accepted; `"2.5"` or `"abc"` fail
/// the same way as `"1"`.
pub fn parse_range(input: &str) -> Result<u64, SamplerError> {
    let trimmed = input.trim();
    let range: u64 = trimmed.parse().map_err(|_| {
        SamplerError::InvalidArgument(format!("range must be an integer, got '{trimmed}'"))
    })?;
    validate_range(range)?;
    Ok(range)
}

fn validate_range(range: u64) -> Result<(), SamplerError> {
    if range <= 1 {
        return Err(SamplerError::InvalidArgument(format!(
            "range must be greater than 1 for a meaningful distribution, got {range}"
        )));
    }
    Ok(())
}

fn nonzero(name: &str, value: u32) -> Result<u32, SamplerError> {
    if value == 0 {
        return Err(SamplerError::InvalidArgument(format!("{name} must be at least 1")));
    }
    Ok(value)
}

/// Smallest `k` with `2^k >= range`, i.e. `ceil(log2(range))`.
pub fn bit_width(range: u64) -> u32 {
    if range <= 1 {
        0
    } else {
        u64::BITS - (range - 1).leading_zeros()
    }
}

/// Immutable sampler settings, built once and held by the caller.
#[derive(Debug, Clone)]
pub struct SamplerConfig {
    range: u64,
    bit_width: u32,
    credential: Option<String>,
    shots: u32,
    max_batches: u32,
    remote: RemoteConfig,
}

impl SamplerConfig {
    /// Settings for sampling `[0, range)`. Fails if `range <= 1`.
    pub fn new(range: u64) -> Result<Self, SamplerError> {
        validate_range(range)?;
        Ok(Self {
            range,
            bit_width: bit_width(range),
            credential: None,
            shots: DEFAULT_SHOTS,
            max_batches: 1,
            remote: RemoteConfig::default(),
        })
    }

    /// Attach a remote credential. Empty or whitespace-only tokens count as absent.
    pub fn with_credential(mut self, credential: Option<String>) -> Self {
        self.credential = credential.filter(|c| !c.trim().is_empty());
        self
    }

    pub fn with_remote(mut self, remote: RemoteConfig) -> Self {
        self.remote = remote;
        self
    }

    /// Shots per remote batch. Fails if `shots` is 0.
    pub fn with_shots(mut self, shots: u32) -> Result<Self, SamplerError> {
        self.shots = nonzero("shots", shots)?;
        Ok(self)
    }

    /// Remote batches to fetch before giving up. Fails if `max_batches` is 0.
    pub fn with_max_batches(mut self, max_batches: u32) -> Result<Self, SamplerError> {
        self.max_batches = nonzero("max_batches", max_batches)?;
        Ok(self)
    }

    pub fn range(&self) -> u64 {
        self.range
    }

    pub fn bit_width(&self) -> u32 {
        self.bit_width
    }

    /// Credential for the remote runtime. Remote mode is unavailable without it.
    pub fn credential(&self) -> Option<&str> {
        self.credential.as_deref()
    }

    pub fn shots(&self) -> u32 {
        self.shots
    }

    pub fn max_batches(&self) -> u32 {
        self.max_batches
    }

    pub fn remote(&self) -> &RemoteConfig {
        &self.remote
    }
}

/// An accepted draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    /// Value in `[0, range)`.
    pub value: u64,
    /// Out-of-range draws discarded before `value`.
    pub rejected: u32,
}

/// Uniform sampler over `[0, range)` backed by a measured quantum circuit.
pub struct Sampler {
    config: SamplerConfig,
    circuit: Circuit,
    local: Box<dyn QuantumBackend>,
    remote: Option<Box<dyn QuantumBackend>>,
}

impl Sampler {
    /// Sampler with the statevector simulator, plus a runtime client when the
    /// config carries a credential.
    pub fn new(config: SamplerConfig) -> Result<Self, SamplerError> {
        let remote = match &config.credential {
            Some(token) => {
                let client = RuntimeClient::new(token.clone(), config.remote.clone())
                    .map_err(SourceError::from)?;
                Some(Box::new(client) as Box<dyn QuantumBackend>)
            }
            None => None,
        };
        Ok(Self::with_backends(
            config,
            Box::new(StatevectorSimulator::new()),
            remote,
        ))
    }

    /// Sampler with caller-supplied backends.
    pub fn with_backends(
        config: SamplerConfig,
        local: Box<dyn QuantumBackend>,
        remote: Option<Box<dyn QuantumBackend>>,
    ) -> Self {
        let circuit = Circuit::uniform(config.bit_width as usize);
        Self {
            config,
            circuit,
            local,
            remote,
        }
    }

    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    pub fn range(&self) -> u64 {
        self.config.range
    }

    pub fn bit_width(&self) -> u32 {
        self.config.bit_width
    }

    /// The circuit every draw executes.
    pub fn circuit(&self) -> &Circuit {
        &self.circuit
    }

    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    /// Uniform integer in `[0, range)` with the default retry budget.
    pub fn sample(&self, mode: SampleMode) -> Result<u64, SamplerError> {
        self.sample_with(mode, DEFAULT_MAX_ATTEMPTS)
            .map(|s| s.value)
    }

    /// Uniform integer in `[0, range)`.
    ///
    /// `max_attempts` bounds local redraws; remote mode is bounded by the
    /// configured batch count instead.
    pub fn sample_with(&self, mode: SampleMode, max_attempts: u32) -> Result<Sample, SamplerError> {
        match mode {
            SampleMode::Local => self.sample_local(max_attempts),
            SampleMode::Remote => {
                let remote = self.remote.as_deref().ok_or_else(|| {
                    SamplerError::InvalidArgument(
                        "remote sampling needs a credential; configure one or use local mode"
                            .to_string(),
                    )
                })?;
                self.sample_remote(remote)
            }
        }
    }

    fn sample_local(&self, max_attempts: u32) -> Result<Sample, SamplerError> {
        let draws = max_attempts.saturating_add(1);
        for rejected in 0..draws {
            let raw = self.local.draw(&self.circuit)?;
            if raw.value() < self.config.range {
                debug!(
                    "{} accepted {} after {rejected} rejection(s)",
                    self.local.name(),
                    raw
                );
                return Ok(Sample {
                    value: raw.value(),
                    rejected,
                });
            }
            trace!("rejected {raw} (range {})", self.config.range);
        }
        Err(SamplerError::ExhaustedRetries { attempts: draws })
    }

    fn sample_remote(&self, remote: &dyn QuantumBackend) -> Result<Sample, SamplerError> {
        let mut rejected = 0u32;
        for batch_no in 1..=self.config.max_batches {
            let batch = remote.run(&self.circuit, self.config.shots)?;
            debug!(
                "{} returned batch {batch_no} with {} shots",
                remote.name(),
                batch.len()
            );
            if let Some(pos) = batch.iter().position(|s| s.value() < self.config.range) {
                return Ok(Sample {
                    value: batch[pos].value(),
                    rejected: rejected.saturating_add(pos as u32),
                });
            }
            rejected = rejected.saturating_add(batch.len() as u32);
        }
        Err(SamplerError::ExhaustedBatch {
            batches: self.config.max_batches,
            shots: self.config.shots,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bit_width_is_ceil_log2() {
        assert_eq!(bit_width(2), 1);
        assert_eq!(bit_width(3), 2);
        assert_eq!(bit_width(4), 2);
        assert_eq!(bit_width(5), 3);
        assert_eq!(bit_width(16), 4);
        assert_eq!(bit_width(17), 5);
        assert_eq!(bit_width(20), 5);
        assert_eq!(bit_width(32), 5);
        assert_eq!(bit_width(u64::MAX), 64);
    }

    #[test]
    fn bit_width_brackets_range() {
        for n in 2u64..5000 {
            let k = bit_width(n);
            assert!(1u128 << k >= n as u128, "2^{k} < {n}");
            assert!(1u128 << (k - 1) < n as u128, "2^{} >= {n}", k - 1);
        }
    }

    #[test]
    fn config_rejects_degenerate_ranges() {
        assert!(matches!(
            SamplerConfig::new(0),
            Err(SamplerError::InvalidArgument(_))
        ));
        assert!(matches!(
            SamplerConfig::new(1),
            Err(SamplerError::InvalidArgument(_))
        ));
        assert_eq!(SamplerConfig::new(20).unwrap().bit_width(), 5);
    }

    #[test]
    fn parse_range_rejects_non_integers() {
        for bad in ["2.5", "abc", "", "-3", "1e3", "0", "1"] {
            assert!(
                matches!(parse_range(bad), Err(SamplerError::InvalidArgument(_))),
                "{bad:?} should be rejected"
            );
        }
        assert_eq!(parse_range(" 20 ").unwrap(), 20);
    }

    #[test]
    fn blank_credential_counts_as_absent() {
        let config = SamplerConfig::new(4)
            .unwrap()
            .with_credential(Some("   ".to_string()));
        assert!(config.credential().is_none());
    }

    #[test]
    fn zero_shots_or_batches_are_rejected() {
        let config = SamplerConfig::new(20).unwrap();
        assert!(matches!(
            config.clone().with_shots(0),
            Err(SamplerError::InvalidArgument(_))
        ));
        assert!(matches!(
            config.clone().with_max_batches(0),
            Err(SamplerError::InvalidArgument(_))
        ));

        let config = config.with_shots(250).unwrap().with_max_batches(3).unwrap();
        assert_eq!((config.shots(), config.max_batches()), (250, 3));
    }

    #[test]
    fn sample_mode_parses_aliases() {
        assert_eq!("sim".parse::<SampleMode>().unwrap(), SampleMode::Local);
        assert_eq!("LOCAL".parse::<SampleMode>().unwrap(), SampleMode::Local);
        assert_eq!("qpu".parse::<SampleMode>().unwrap(), SampleMode::Remote);
        assert_eq!("remote".parse::<SampleMode>().unwrap(), SampleMode::Remote);
        assert!("cloud".parse::<SampleMode>().is_err());
    }

    #[test]
    fn new_without_credential_has_no_remote() {
        let sampler = Sampler::new(SamplerConfig::new(20).unwrap()).unwrap();
        assert!(!sampler.has_remote());
        assert_eq!(sampler.circuit().num_qubits(), 5);
    }

    #[test]
    fn simulator_samples_stay_in_range() {
        let sampler = Sampler::new(SamplerConfig::new(20).unwrap()).unwrap();
        for _ in 0..500 {
            assert!(sampler.sample(SampleMode::Local).unwrap() < 20);
        }
    }
}
