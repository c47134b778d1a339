//! Dense statevector simulator.
//!
//! Holds `2^n` complex amplitudes, applies each gate in order, and samples a
//! basis state from the Born probabilities for every shot. Circuits wider than
//! [`MAX_QUBITS`] are refused.

use std::f64::consts::FRAC_1_SQRT_2;
use std::sync::Mutex;

use num_complex::Complex64;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::circuit::{Circuit, Gate};
use crate::source::{BackendInfo, BackendKind, QuantumBackend, RawSample, SampleBatch, SourceError};

/// Widest circuit the simulator accepts (16 MiB of amplitudes).
pub const MAX_QUBITS: usize = 20;

static INFO: BackendInfo = BackendInfo {
    name: "statevector",
    description: "In-process statevector simulator",
    kind: BackendKind::Local,
};

/// Local simulator backend.
///
/// Uses the thread-local RNG unless built with [`StatevectorSimulator::seeded`].
pub struct StatevectorSimulator {
    seeded: Option<Mutex<StdRng>>,
}

impl StatevectorSimulator {
    pub fn new() -> Self {
        Self { seeded: None }
    }

    /// Reproducible simulator: the same seed yields the same shot sequence.
    pub fn seeded(seed: u64) -> Self {
        Self {
            seeded: Some(Mutex::new(StdRng::seed_from_u64(seed))),
        }
    }

    fn with_rng<T>(&self, f: impl FnOnce(&mut dyn rand::RngCore) -> T) -> T {
        match &self.seeded {
            Some(rng) => {
                let mut guard = rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
                f(&mut *guard)
            }
            None => f(&mut rand::rng()),
        }
    }
}

impl Default for StatevectorSimulator {
    fn default() -> Self {
        Self::new()
    }
}

impl QuantumBackend for StatevectorSimulator {
    fn info(&self) -> &BackendInfo {
        &INFO
    }

    fn run(&self, circuit: &Circuit, shots: u32) -> Result<SampleBatch, SourceError> {
        if circuit.num_qubits() > MAX_QUBITS {
            return Err(SourceError::Simulator(format!(
                "circuit has {} qubits but the simulator supports up to {MAX_QUBITS}",
                circuit.num_qubits()
            )));
        }
        self.with_rng(|rng| {
            (0..shots)
                .map(|_| {
                    let mut state = Statevector::zero(circuit.num_qubits());
                    for gate in circuit.ops() {
                        state.apply(*gate, rng);
                    }
                    Ok(RawSample(state.sample(rng) as u64))
                })
                .collect()
        })
    }
}

/// Amplitudes of an `n`-qubit register, indexed by basis state.
#[derive(Debug, Clone)]
pub struct Statevector {
    amps: Vec<Complex64>,
}

impl Statevector {
    /// The all-zero state `|0…0>`.
    pub fn zero(num_qubits: usize) -> Self {
        let mut amps = vec![Complex64::new(0.0, 0.0); 1 << num_qubits];
        amps[0] = Complex64::new(1.0, 0.0);
        Self { amps }
    }

    /// Born probability of each basis state.
    pub fn probabilities(&self) -> Vec<f64> {
        self.amps.iter().map(|a| a.norm_sqr()).collect()
    }

    /// Apply one operation. `Measure` is deferred to [`Statevector::sample`];
    /// measuring every qubit at the end is equivalent for these circuits.
    pub fn apply(&mut self, gate: Gate, rng: &mut dyn rand::RngCore) {
        let half = Complex64::new(0.5, 0.0);
        match gate {
            Gate::H(q) => {
                let s = Complex64::new(FRAC_1_SQRT_2, 0.0);
                self.apply_1q(q, [[s, s], [s, -s]]);
            }
            Gate::X(q) => {
                let (zero, one) = (Complex64::new(0.0, 0.0), Complex64::new(1.0, 0.0));
                self.apply_1q(q, [[zero, one], [one, zero]]);
            }
            Gate::Sx(q) => {
                let p = half * Complex64::new(1.0, 1.0);
                let m = half * Complex64::new(1.0, -1.0);
                self.apply_1q(q, [[p, m], [m, p]]);
            }
            Gate::Rz(q, theta) => {
                let zero = Complex64::new(0.0, 0.0);
                let a = Complex64::from_polar(1.0, -theta / 2.0);
                let b = Complex64::from_polar(1.0, theta / 2.0);
                self.apply_1q(q, [[a, zero], [zero, b]]);
            }
            Gate::Reset(q) => self.reset(q, rng),
            Gate::Measure(_) => {}
        }
    }

    fn apply_1q(&mut self, q: usize, m: [[Complex64; 2]; 2]) {
        let bit = 1usize << q;
        for i in 0..self.amps.len() {
            if i & bit == 0 {
                let a0 = self.amps[i];
                let a1 = self.amps[i | bit];
                self.amps[i] = m[0][0] * a0 + m[0][1] * a1;
                self.amps[i | bit] = m[1][0] * a0 + m[1][1] * a1;
            }
        }
    }

    /// Measure qubit `q`, collapse, and flip it back to `|0>` if it read 1.
    fn reset(&mut self, q: usize, rng: &mut dyn rand::RngCore) {
        let bit = 1usize << q;
        let p_one: f64 = self
            .amps
            .iter()
            .enumerate()
            .filter(|(i, _)| i & bit != 0)
            .map(|(_, a)| a.norm_sqr())
            .sum();
        let outcome_one = p_one > 0.0 && rng.random::<f64>() < p_one;
        let norm = if outcome_one { p_one } else { 1.0 - p_one }.sqrt();
        let zero = Complex64::new(0.0, 0.0);
        for i in 0..self.amps.len() {
            if (i & bit != 0) != outcome_one {
                self.amps[i] = zero;
            } else if norm > 0.0 {
                self.amps[i] /= norm;
            }
        }
        if outcome_one {
            for i in 0..self.amps.len() {
                if i & bit == 0 {
                    self.amps.swap(i, i | bit);
                }
            }
        }
    }

    /// Draw one basis state from the Born distribution.
    pub fn sample(&self, rng: &mut dyn rand::RngCore) -> usize {
        let r: f64 = rng.random();
        let mut cumulative = 0.0;
        for (i, a) in self.amps.iter().enumerate() {
            cumulative += a.norm_sqr();
            if r < cumulative {
                return i;
            }
        }
        // Rounding can leave the total just under 1.0.
        self.amps
            .iter()
            .rposition(|a| a.norm_sqr() > 0.0)
            .unwrap_or(0)
    }
}
