//! Raw-sample capability and the values it produces.
//!
//! Every backend implements the [`QuantumBackend`] trait: it executes a
//! [`Circuit`] for a number of shots and returns one [`RawSample`] per shot.
//! The sampler never looks inside a backend; it only needs uniformly
//! distributed `bit_width`-bit integers.

use crate::circuit::Circuit;
use crate::remote::RemoteError;

/// Where a backend executes its circuits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// In-process simulation. Fast, unlimited draws.
    Local,
    /// Remote quantum device. Slow, batched, limited shots.
    Remote,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Remote => write!(f, "remote"),
        }
    }
}

/// Metadata about a backend.
#[derive(Debug, Clone)]
pub struct BackendInfo {
    /// Unique identifier (e.g. `"statevector"`).
    pub name: &'static str,
    /// One-line human-readable description.
    pub description: &'static str,
    /// Where the circuit runs.
    pub kind: BackendKind,
}

/// One measurement outcome, read as an unsigned integer.
///
/// Qubit `i` contributes bit `i`, so qubit 0 is the least significant bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RawSample(pub u64);

impl RawSample {
    pub fn value(self) -> u64 {
        self.0
    }

    /// Parse a measured bitstring, most significant bit first (`"10011"`).
    pub fn from_bitstring(bits: &str) -> Option<Self> {
        if bits.is_empty() || bits.len() > 64 {
            return None;
        }
        u64::from_str_radix(bits, 2).ok().map(Self)
    }

    /// Parse a hex-encoded sample (`"0x1f"`), the format returned by remote runtimes.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex
            .strip_prefix("0x")
            .or_else(|| hex.strip_prefix("0X"))
            .unwrap_or(hex);
        if digits.is_empty() {
            return None;
        }
        u64::from_str_radix(digits, 16).ok().map(Self)
    }

    /// Render as a fixed-width bitstring, most significant bit first.
    pub fn to_bitstring(self, width: u32) -> String {
        format!("{:0width$b}", self.0, width = width as usize)
    }
}

impl std::fmt::Display for RawSample {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ordered measurement outcomes of a single execution, one per shot.
pub type SampleBatch = Vec<RawSample>;

/// Failure of a backend to produce samples.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Fault inside the local simulator.
    #[error("simulator fault: {0}")]
    Simulator(String),

    /// The backend ran but returned no shots.
    #[error("{backend} returned no shots")]
    Empty { backend: &'static str },

    /// Any step of the remote execution path failed.
    #[error("remote source unavailable: {0}")]
    Remote(#[from] RemoteError),
}

/// Trait that every raw-sample backend must implement.
pub trait QuantumBackend: Send + Sync {
    /// Backend metadata.
    fn info(&self) -> &BackendInfo;

    /// Execute `circuit` for `shots` shots and return the measured values in order.
    fn run(&self, circuit: &Circuit, shots: u32) -> Result<SampleBatch, SourceError>;

    /// Execute one shot.
    fn draw(&self, circuit: &Circuit) -> Result<RawSample, SourceError> {
        self.run(circuit, 1)?
            .into_iter()
            .next()
            .ok_or(SourceError::Empty {
                backend: self.name(),
            })
    }

    /// Convenience: name from info.
    fn name(&self) -> &'static str {
        self.info().name
    }
}
