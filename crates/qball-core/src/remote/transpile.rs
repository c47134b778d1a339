//! Lowering of circuits to a device's native gate set.

use std::f64::consts::FRAC_PI_2;

use crate::circuit::{Circuit, Gate};

/// Rewrite `circuit` using only the gates named in `basis_gates`.
///
/// `reset` and `measure` are instructions every device accepts and pass
/// through unchanged. Hadamard becomes `rz(π/2) sx rz(π/2)` when `h` is not
/// native, which is exact up to a global phase.
pub fn lower(circuit: &Circuit, basis_gates: &[String]) -> Result<Circuit, String> {
    if basis_gates.is_empty() {
        return Err("backend reports no basis gates".to_string());
    }
    let has = |name: &str| basis_gates.iter().any(|g| g.eq_ignore_ascii_case(name));

    let mut lowered = Circuit::new(circuit.num_qubits());
    for gate in circuit.ops() {
        match *gate {
            Gate::Reset(_) | Gate::Measure(_) => lowered.push(*gate),
            Gate::H(_) if has("h") => lowered.push(*gate),
            Gate::H(q) if has("rz") && has("sx") => {
                lowered.push(Gate::Rz(q, FRAC_PI_2));
                lowered.push(Gate::Sx(q));
                lowered.push(Gate::Rz(q, FRAC_PI_2));
            }
            Gate::X(_) if has("x") => lowered.push(*gate),
            Gate::X(q) if has("sx") => {
                lowered.push(Gate::Sx(q));
                lowered.push(Gate::Sx(q));
            }
            Gate::Sx(_) if has("sx") => lowered.push(*gate),
            Gate::Rz(..) if has("rz") => lowered.push(*gate),
            other => {
                return Err(format!(
                    "gate `{}` has no decomposition into [{}]",
                    other.mnemonic(),
                    basis_gates.join(", ")
                ));
            }
        }
    }
    Ok(lowered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulator::Statevector;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn basis(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn keeps_native_hadamard() {
        let c = Circuit::uniform(2);
        let lowered = lower(&c, &basis(&["h", "cx"])).unwrap();
        assert_eq!(lowered, c);
    }

    #[test]
    fn decomposes_hadamard_into_rz_sx() {
        let lowered = lower(&Circuit::uniform(3), &basis(&["ecr", "rz", "sx", "x"])).unwrap();
        assert!(lowered.ops().iter().all(|g| !matches!(g, Gate::H(_))));
        let rz = lowered.ops().iter().filter(|g| matches!(g, Gate::Rz(..))).count();
        let sx = lowered.ops().iter().filter(|g| matches!(g, Gate::Sx(_))).count();
        assert_eq!((rz, sx), (6, 3));
    }

    #[test]
    fn lowered_uniform_circuit_stays_uniform() {
        let lowered = lower(&Circuit::uniform(3), &basis(&["rz", "sx"])).unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        let mut state = Statevector::zero(3);
        for gate in lowered.ops() {
            state.apply(*gate, &mut rng);
        }
        for p in state.probabilities() {
            assert!((p - 0.125).abs() < 1e-12);
        }
    }

    #[test]
    fn basis_names_are_case_insensitive() {
        assert!(lower(&Circuit::uniform(1), &basis(&["RZ", "SX"])).is_ok());
    }

    #[test]
    fn missing_decomposition_is_an_error() {
        let err = lower(&Circuit::uniform(1), &basis(&["cz", "rx"])).unwrap_err();
        assert!(err.contains("`h`"), "{err}");
    }

    #[test]
    fn empty_basis_is_an_error() {
        assert!(lower(&Circuit::uniform(1), &[]).is_err());
    }
}
