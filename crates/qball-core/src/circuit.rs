//! Minimal quantum circuit model.
//!
//! Only the operations the uniform sampler and its lowering pass need are
//! represented. [`Circuit::uniform`] builds the register the sampler measures:
//! every qubit is reset, put into equal superposition with a Hadamard, and
//! measured.

use std::fmt::Write as _;

/// A single circuit operation on one qubit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gate {
    /// Return the qubit to `|0>`.
    Reset(usize),
    /// Hadamard.
    H(usize),
    /// Pauli-X.
    X(usize),
    /// Square root of X.
    Sx(usize),
    /// Z rotation by `theta` radians.
    Rz(usize, f64),
    /// Measure into the classical bit with the same index.
    Measure(usize),
}

impl Gate {
    /// Target qubit.
    pub fn qubit(&self) -> usize {
        match *self {
            Self::Reset(q)
            | Self::H(q)
            | Self::X(q)
            | Self::Sx(q)
            | Self::Rz(q, _)
            | Self::Measure(q) => q,
        }
    }

    /// Lower-case mnemonic, matching OpenQASM 3 `stdgates.inc` names.
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Self::Reset(_) => "reset",
            Self::H(_) => "h",
            Self::X(_) => "x",
            Self::Sx(_) => "sx",
            Self::Rz(..) => "rz",
            Self::Measure(_) => "measure",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Circuit {
    num_qubits: usize,
    ops: Vec<Gate>,
}

impl Circuit {
    pub fn new(num_qubits: usize) -> Self {
        Self {
            num_qubits,
            ops: Vec::new(),
        }
    }

    /// Uniform superposition over `num_qubits` qubits followed by a full measurement.
    ///
    /// Measuring yields each integer in `[0, 2^num_qubits)` with equal probability.
    pub fn uniform(num_qubits: usize) -> Self {
        let mut circuit = Self::new(num_qubits);
        for q in 0..num_qubits {
            circuit.push(Gate::Reset(q));
            circuit.push(Gate::H(q));
        }
        circuit.measure_all();
        circuit
    }

    /// Append an operation. Panics if the target qubit is out of range.
    pub fn push(&mut self, gate: Gate) {
        assert!(
            gate.qubit() < self.num_qubits,
            "gate {} targets qubit {} but circuit has {} qubits",
            gate.mnemonic(),
            gate.qubit(),
            self.num_qubits
        );
        self.ops.push(gate);
    }

    pub fn measure_all(&mut self) {
        for q in 0..self.num_qubits {
            self.ops.push(Gate::Measure(q));
        }
    }

    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    pub fn ops(&self) -> &[Gate] {
        &self.ops
    }

    /// Serialize as an OpenQASM 3 program.
    pub fn to_qasm(&self) -> String {
        let mut out = String::from("OPENQASM 3.0;\ninclude \"stdgates.inc\";\n");
        let _ = writeln!(out, "bit[{}] meas;", self.num_qubits);
        let _ = writeln!(out, "qubit[{}] q;", self.num_qubits);
        for gate in &self.ops {
            let _ = match *gate {
                Gate::Rz(q, theta) => writeln!(out, "rz({theta}) q[{q}];"),
                Gate::Measure(q) => writeln!(out, "meas[{q}] = measure q[{q}];"),
                other => writeln!(out, "{} q[{}];", other.mnemonic(), other.qubit()),
            };
        }
        out
    }
}
