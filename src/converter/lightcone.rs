//! Backward lightcone pruning of a circuit's gate list.

use std::collections::BTreeSet;

use rustc_hash::FxHashSet;

use crate::circuit::{Circuit, GateOperation, Qubit};

/// The subset of a circuit that can influence a set of coned qubits.
///
/// Computed by walking the gate list backwards: a gate is kept if it touches
/// the cone, and its qubits join the cone. Qubits that never enter the cone
/// are excluded entirely; their ket and bra wires contract to an identity
/// factor and contribute nothing to the network.
#[derive(Debug)]
pub(crate) struct Lightcone {
    kept_gates: Vec<bool>,
    kept_qubits: Vec<Qubit>,
}

impl Lightcone {
    /// A cone that keeps the whole circuit.
    pub fn full(circuit: &Circuit) -> Self {
        Self {
            kept_gates: vec![true; circuit.operations().len()],
            kept_qubits: circuit.qubits().collect(),
        }
    }

    /// Backward reachability from `coned` through shared-qubit dependencies.
    pub fn compute(circuit: &Circuit, coned: &BTreeSet<Qubit>) -> Self {
        let n_qubits = circuit.num_qubits();
        let operations = circuit.operations();
        let mut cone: FxHashSet<Qubit> = coned.iter().copied().collect();
        let mut kept_gates = vec![false; operations.len()];

        for index in (0..operations.len()).rev() {
            if cone.len() == n_qubits {
                // Everything earlier is inside the cone.
                kept_gates[..=index].fill(true);
                break;
            }
            if operations[index].qubits().iter().any(|q| cone.contains(q)) {
                kept_gates[index] = true;
                cone.extend(operations[index].qubits().iter().copied());
            }
        }

        let mut kept_qubits: BTreeSet<Qubit> = coned.clone();
        for (index, operation) in operations.iter().enumerate() {
            if kept_gates[index] {
                kept_qubits.extend(operation.qubits().iter().copied());
            }
        }

        Self {
            kept_gates,
            kept_qubits: kept_qubits.into_iter().collect(),
        }
    }

    /// The qubits whose wires enter the cone, in ascending order.
    pub fn qubits(&self) -> &[Qubit] {
        &self.kept_qubits
    }

    /// The kept gate operations with their original circuit positions.
    pub fn gates<'c>(&self, circuit: &'c Circuit) -> Vec<(usize, &'c GateOperation)> {
        circuit
            .operations()
            .iter()
            .enumerate()
            .filter(|(index, _)| self.kept_gates[*index])
            .collect()
    }
}
