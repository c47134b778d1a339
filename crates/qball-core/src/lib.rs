//! # qball-core
//!
//! **A Magic 8-Ball that asks a quantum circuit for its answers.**
//!
//! `qball-core` turns the measurement of a uniform superposition into a
//! uniformly distributed integer in `[0, N)`. A circuit of `ceil(log2(N))`
//! qubits, each reset and put through a Hadamard, is measured; values that
//! land at or above `N` are rejected and redrawn.
//!
//! ## Quick Start
//!
//! ```no_run
//! use qball_core::{SampleMode, Sampler, SamplerConfig};
//!
//! let config = SamplerConfig::new(20)?;
//! assert_eq!(config.bit_width(), 5);
//!
//! let sampler = Sampler::new(config)?;
//! let value = sampler.sample(SampleMode::Local)?;
//! assert!(value < 20);
//! # Ok::<(), qball_core::SamplerError>(())
//! ```
//!
//! ## Architecture
//!
//! Circuit → Backend (local simulator | remote runtime) → rejection sampling → value
//!
//! Two backends implement [`QuantumBackend`]:
//! - **Local** ([`StatevectorSimulator`]): one shot per draw, retried up to a
//!   bounded budget.
//! - **Remote** ([`RuntimeClient`]): one batched job on a physical device,
//!   scanned for the first in-range shot. Needs a credential.

pub mod circuit;
pub mod eightball;
pub mod remote;
pub mod sampler;
pub mod simulator;
pub mod source;

pub use circuit::{Circuit, Gate};
pub use eightball::{ANSWERS, Answer, EightBall};
pub use remote::{RemoteConfig, RemoteError, RuntimeClient};
pub use sampler::{
    DEFAULT_MAX_ATTEMPTS, DEFAULT_SHOTS, Sample, SampleMode, Sampler, SamplerConfig, SamplerError,
    bit_width, parse_range,
};
pub use simulator::StatevectorSimulator;
pub use source::{BackendInfo, BackendKind, QuantumBackend, RawSample, SampleBatch, SourceError};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
