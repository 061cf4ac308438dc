//! Converting a quantum circuit into einsum contraction jobs.
//!
//! [`CircuitToEinsum`] derives symbolic einsum expressions, together with
//! their operand lists, from an immutable [`Circuit`]: the full state vector,
//! a single bitstring amplitude, a batch of amplitudes with some qubits
//! fixed, or a reduced density matrix with optional projections and optional
//! lightcone pruning. The jobs can be handed to any einsum-style contraction
//! engine; [`crate::contraction`] ships a reference evaluator.
//!
//! # Examples
//! ```
//! use cte::circuit::Circuit;
//! use cte::converter::CircuitToEinsum;
//! use num_complex::Complex64;
//!
//! let mut circuit = Circuit::default();
//! let qr = circuit.allocate_register(2);
//! circuit.append_gate("h", &[], &[qr.qubit(0)]);
//! circuit.append_gate("cx", &[], &[qr.qubit(0), qr.qubit(1)]);
//!
//! let converter = CircuitToEinsum::<Complex64>::new(&circuit).unwrap();
//! let job = converter.state_vector();
//! assert_eq!(job.expression, "a,b,ca,decb->de");
//! # assert_eq!(job.operands.len(), 4);
//! ```

mod lightcone;
mod symbols;

use std::collections::BTreeSet;
use std::marker::PhantomData;
use std::sync::{Arc, RwLock};

use itertools::Itertools;
use log::debug;
use ndarray::{ArrayD, IxDyn};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::circuit::{Bit, Circuit, GateOperation, Qubit};
use crate::contraction::contract_expression;
use crate::errors::{ConfigurationError, ContractionError, ValidationError};
use crate::types::ComplexScalar;

use self::lightcone::Lightcone;
use self::symbols::SymbolPool;

/// One contraction job: an einsum expression and its operands.
///
/// The i-th comma-separated label group of the expression belongs to the i-th
/// operand. Contracting the job with any einsum engine yields the quantity
/// the job was built for.
#[derive(Debug, Clone)]
pub struct EinsumJob<T> {
    /// The einsum expression, e.g. `"a,b,ca,decb->de"`.
    pub expression: String,
    /// The operand tensors, in label order.
    pub operands: Vec<ArrayD<T>>,
}

impl<T: ComplexScalar> EinsumJob<T> {
    /// Evaluates the job with the reference contractor in
    /// [`crate::contraction`].
    pub fn contract(&self) -> Result<ArrayD<T>, ContractionError> {
        contract_expression(&self.expression, &self.operands)
    }
}

/// Converts a circuit into einsum contraction jobs.
///
/// The circuit is borrowed for the converter's lifetime and never mutated.
/// `T` selects the operand precision ([`num_complex::Complex32`] or
/// [`num_complex::Complex64`]). Every query builds a fresh job; the only
/// internal state is a lock-guarded cache of lightcone computations, so a
/// converter can be shared across threads.
#[derive(Debug)]
pub struct CircuitToEinsum<'a, T: ComplexScalar> {
    circuit: &'a Circuit,
    cones: RwLock<FxHashMap<Vec<Qubit>, Arc<Lightcone>>>,
    precision: PhantomData<T>,
}

impl<'a, T: ComplexScalar> CircuitToEinsum<'a, T> {
    /// Creates a converter for the given circuit.
    ///
    /// # Errors
    /// [`ConfigurationError::EmptyCircuit`] if the circuit has no qubits.
    pub fn new(circuit: &'a Circuit) -> Result<Self, ConfigurationError> {
        if circuit.num_qubits() == 0 {
            return Err(ConfigurationError::EmptyCircuit);
        }
        Ok(Self {
            circuit,
            cones: RwLock::new(FxHashMap::default()),
            precision: PhantomData,
        })
    }

    /// The number of qubits of the underlying circuit.
    #[inline]
    #[must_use]
    pub fn num_qubits(&self) -> usize {
        self.circuit.num_qubits()
    }

    /// The qubits of the underlying circuit in ascending order.
    #[must_use]
    pub fn qubits(&self) -> Vec<Qubit> {
        self.circuit.qubits().collect()
    }

    /// Builds the job whose contraction is the full state vector, one tensor
    /// axis per qubit in ascending qubit order.
    ///
    /// Every qubit starts as a rank-1 |0> operand; each gate consumes the
    /// current wire symbols of its qubits and opens fresh ones. Qubits never
    /// touched by a gate keep their initial wire open.
    #[must_use]
    pub fn state_vector(&self) -> EinsumJob<T> {
        self.amplitudes_network(&[])
    }

    /// Builds the job whose contraction is the scalar amplitude of the given
    /// bitstring, one bit per qubit in ascending qubit order.
    ///
    /// # Errors
    /// [`ValidationError`] if the bitstring length doesn't match the qubit
    /// count or contains a symbol other than `'0'` or `'1'`. No operand is
    /// built in that case.
    pub fn amplitude(&self, bitstring: &str) -> Result<EinsumJob<T>, ValidationError> {
        let got = bitstring.chars().count();
        if got != self.num_qubits() {
            return Err(ValidationError::BitstringLength {
                expected: self.num_qubits(),
                got,
            });
        }
        let bits: Vec<Bit> = bitstring
            .chars()
            .map(Bit::try_from)
            .collect::<Result<_, _>>()?;
        let fixed: Vec<(Qubit, Bit)> = self.circuit.qubits().zip(bits).collect();
        Ok(self.amplitudes_network(&fixed))
    }

    /// Builds the job whose contraction is the state vector slice where the
    /// qubits in `fixed` are projected onto the given basis states. The open
    /// axes follow ascending qubit order; an empty map yields the full state
    /// vector.
    ///
    /// # Errors
    /// [`ValidationError::UnknownQubit`] if `fixed` names a qubit outside the
    /// circuit.
    pub fn batched_amplitudes(
        &self,
        fixed: &FxHashMap<Qubit, Bit>,
    ) -> Result<EinsumJob<T>, ValidationError> {
        let fixed = self.sorted_fixed(fixed)?;
        Ok(self.amplitudes_network(&fixed))
    }

    /// Builds the job whose contraction is the reduced density matrix over
    /// `targets`, with the qubits in `fixed` projected onto definite basis
    /// states and all remaining qubits traced out.
    ///
    /// The output has one ket and one bra axis per target, ket axes first,
    /// both in the order of `targets`. With a non-empty `fixed` map the
    /// result is unnormalized; dividing by the projection probability is the
    /// caller's responsibility.
    ///
    /// With `lightcone` enabled, gates outside the backward lightcone of
    /// `targets` and `fixed` are dropped before the network is built, along
    /// with every qubit whose wire never enters the cone. This is purely an
    /// optimization; the contracted result is unchanged.
    ///
    /// # Errors
    /// [`ValidationError`] if `targets` is empty, lists a qubit twice,
    /// overlaps `fixed`, or either set names a qubit outside the circuit.
    /// No operand is built in that case.
    pub fn reduced_density_matrix(
        &self,
        targets: &[Qubit],
        fixed: &FxHashMap<Qubit, Bit>,
        lightcone: bool,
    ) -> Result<EinsumJob<T>, ValidationError> {
        if targets.is_empty() {
            return Err(ValidationError::EmptyTargets);
        }
        for (position, qubit) in targets.iter().enumerate() {
            if targets[..position].contains(qubit) {
                return Err(ValidationError::DuplicateTarget(*qubit));
            }
            if !self.circuit.contains(*qubit) {
                return Err(ValidationError::UnknownQubit(*qubit));
            }
            if fixed.contains_key(qubit) {
                return Err(ValidationError::TargetFixedOverlap(*qubit));
            }
        }
        let fixed = self.sorted_fixed(fixed)?;

        let cone = if lightcone {
            let coned: BTreeSet<Qubit> = targets
                .iter()
                .chain(fixed.iter().map(|(q, _)| q))
                .copied()
                .collect();
            self.lightcone(&coned)
        } else {
            Arc::new(Lightcone::full(self.circuit))
        };
        let kept_qubits = cone.qubits();
        let gates = cone.gates(self.circuit);
        debug!(
            gates = gates.len(),
            qubits = kept_qubits.len(),
            lightcone;
            "Building reduced density matrix network"
        );

        let target_set: FxHashSet<Qubit> = targets.iter().copied().collect();
        let fixed_set: FxHashSet<Qubit> = fixed.iter().map(|(q, _)| *q).collect();

        let mut builder = NetworkBuilder::<T>::new();

        // Ket copy.
        let initial: FxHashMap<Qubit, char> = kept_qubits
            .iter()
            .map(|&q| (q, builder.initial_state()))
            .collect();
        let mut ket = initial.clone();
        builder.apply_gates(&gates, &mut ket, false, None);
        for &(qubit, bit) in &fixed {
            builder.close(ket[&qubit], bit);
        }

        // The last kept gate touching each qubit; used to pin the bra copy's
        // final wires onto the ket finals of traced qubits.
        let mut last_touch: FxHashMap<Qubit, usize> = FxHashMap::default();
        for &(index, operation) in &gates {
            for &qubit in operation.qubits() {
                last_touch.insert(qubit, index);
            }
        }
        let mut pinned: FxHashMap<Qubit, char> = FxHashMap::default();
        for &qubit in kept_qubits {
            if !target_set.contains(&qubit) && !fixed_set.contains(&qubit) {
                pinned.insert(qubit, ket[&qubit]);
            }
        }

        // Bra copy. Target and fixed qubits get their own |0> operand; traced
        // qubits share the ket copy's initial wire, which is exact because
        // |0> is one-hot.
        let mut bra: FxHashMap<Qubit, char> = FxHashMap::default();
        for &qubit in kept_qubits {
            if target_set.contains(&qubit) || fixed_set.contains(&qubit) {
                bra.insert(qubit, builder.initial_state());
            } else {
                bra.insert(qubit, initial[&qubit]);
            }
        }
        builder.apply_gates(&gates, &mut bra, true, Some((&last_touch, &pinned)));
        for &(qubit, bit) in &fixed {
            builder.close(bra[&qubit], bit);
        }

        let output: String = targets
            .iter()
            .map(|q| ket[q])
            .chain(targets.iter().map(|q| bra[q]))
            .collect();
        Ok(builder.finish(&output))
    }

    /// Threads the forward network and closes the wires listed in `fixed`
    /// (sorted, validated). Open wires become output axes in ascending qubit
    /// order.
    fn amplitudes_network(&self, fixed: &[(Qubit, Bit)]) -> EinsumJob<T> {
        debug!(
            gates = self.circuit.operations().len(),
            fixed = fixed.len();
            "Building amplitudes network"
        );
        let mut builder = NetworkBuilder::<T>::new();
        let mut frontier: FxHashMap<Qubit, char> = self
            .circuit
            .qubits()
            .map(|q| (q, builder.initial_state()))
            .collect();
        let gates: Vec<(usize, &GateOperation)> =
            self.circuit.operations().iter().enumerate().collect();
        builder.apply_gates(&gates, &mut frontier, false, None);

        let fixed_set: FxHashSet<Qubit> = fixed.iter().map(|(q, _)| *q).collect();
        for &(qubit, bit) in fixed {
            builder.close(frontier[&qubit], bit);
        }
        let output: String = self
            .circuit
            .qubits()
            .filter(|q| !fixed_set.contains(q))
            .map(|q| frontier[&q])
            .collect();
        builder.finish(&output)
    }

    /// Validates a fixed-qubit map and returns it sorted by qubit.
    fn sorted_fixed(
        &self,
        fixed: &FxHashMap<Qubit, Bit>,
    ) -> Result<Vec<(Qubit, Bit)>, ValidationError> {
        let mut sorted: Vec<(Qubit, Bit)> = fixed.iter().map(|(q, b)| (*q, *b)).collect();
        sorted.sort_unstable_by_key(|(q, _)| *q);
        for &(qubit, _) in &sorted {
            if !self.circuit.contains(qubit) {
                return Err(ValidationError::UnknownQubit(qubit));
            }
        }
        Ok(sorted)
    }

    /// Returns the memoized lightcone for a coned qubit set, computing it on
    /// first use.
    fn lightcone(&self, coned: &BTreeSet<Qubit>) -> Arc<Lightcone> {
        let key: Vec<Qubit> = coned.iter().copied().collect();
        if let Some(cone) = self.cones.read().unwrap().get(&key) {
            return Arc::clone(cone);
        }
        let cone = Arc::new(Lightcone::compute(self.circuit, coned));
        let mut cache = self.cones.write().unwrap();
        Arc::clone(cache.entry(key).or_insert(cone))
    }
}

/// Accumulates operands and their label groups while wires are threaded
/// through the network.
struct NetworkBuilder<T> {
    pool: SymbolPool,
    labels: Vec<String>,
    operands: Vec<ArrayD<T>>,
}

impl<T: ComplexScalar> NetworkBuilder<T> {
    fn new() -> Self {
        Self {
            pool: SymbolPool::new(),
            labels: Vec::new(),
            operands: Vec::new(),
        }
    }

    /// The rank-1 |0> state.
    fn ket0() -> ArrayD<T> {
        ArrayD::from_shape_vec(IxDyn(&[2]), vec![T::one(), T::zero()])
            .expect("shape matches data length")
    }

    /// The rank-1 basis state for a bit value. Real, so it is its own
    /// conjugate.
    fn basis(bit: Bit) -> ArrayD<T> {
        let data = match bit {
            Bit::Zero => vec![T::one(), T::zero()],
            Bit::One => vec![T::zero(), T::one()],
        };
        ArrayD::from_shape_vec(IxDyn(&[2]), data).expect("shape matches data length")
    }

    fn push(&mut self, label: String, operand: ArrayD<T>) {
        self.labels.push(label);
        self.operands.push(operand);
    }

    /// Opens a fresh wire bound to a |0> operand and returns its symbol.
    fn initial_state(&mut self) -> char {
        let symbol = self.pool.fresh();
        self.push(symbol.to_string(), Self::ket0());
        symbol
    }

    /// Appends one operand per gate, consuming the frontier symbols of its
    /// qubits and opening fresh output symbols. Labels list output wires
    /// first, then input wires, matching the gate tensor layout.
    ///
    /// With `conjugate` set, the element-wise conjugate of each gate tensor
    /// is pushed instead. `pinned` optionally maps qubits to a predetermined
    /// final symbol: the gate that touches such a qubit last (per the given
    /// last-touch map) emits that symbol instead of a fresh one, which is how
    /// the bra copy's finals are joined onto the ket finals for a partial
    /// trace.
    fn apply_gates(
        &mut self,
        gates: &[(usize, &GateOperation)],
        frontier: &mut FxHashMap<Qubit, char>,
        conjugate: bool,
        pinned: Option<(&FxHashMap<Qubit, usize>, &FxHashMap<Qubit, char>)>,
    ) {
        for &(index, operation) in gates {
            let outputs: Vec<char> = operation
                .qubits()
                .iter()
                .map(|qubit| {
                    let pin = pinned.and_then(|(last_touch, finals)| {
                        (last_touch.get(qubit) == Some(&index))
                            .then(|| finals.get(qubit).copied())
                            .flatten()
                    });
                    pin.unwrap_or_else(|| self.pool.fresh())
                })
                .collect();

            let mut label = String::with_capacity(2 * operation.arity());
            label.extend(&outputs);
            label.extend(operation.qubits().iter().map(|q| frontier[q]));
            for (&qubit, &symbol) in operation.qubits().iter().zip(&outputs) {
                frontier.insert(qubit, symbol);
            }

            let tensor = if conjugate {
                operation.tensor().mapv(|z| T::from_c64(z.conj()))
            } else {
                operation.tensor().mapv(T::from_c64)
            };
            self.push(label, tensor);
        }
    }

    /// Closes a wire against a computational basis state.
    fn close(&mut self, symbol: char, bit: Bit) {
        self.push(symbol.to_string(), Self::basis(bit));
    }

    fn finish(self, output: &str) -> EinsumJob<T> {
        let expression = format!("{}->{}", self.labels.iter().join(","), output);
        EinsumJob {
            expression,
            operands: self.operands,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::f64::consts::FRAC_1_SQRT_2;

    use float_cmp::assert_approx_eq;
    use num_complex::{Complex32, Complex64};

    fn bell_circuit() -> Circuit {
        let mut circuit = Circuit::default();
        let qr = circuit.allocate_register(2);
        circuit.append_gate("h", &[], &[qr.qubit(0)]);
        circuit.append_gate("cx", &[], &[qr.qubit(0), qr.qubit(1)]);
        circuit
    }

    fn qubit(circuit: &Circuit, index: usize) -> Qubit {
        circuit.qubits().nth(index).unwrap()
    }

    /// Counts how often each index symbol occurs in the expression, operands
    /// and output combined.
    fn symbol_counts(expression: &str) -> FxHashMap<char, usize> {
        let mut counts = FxHashMap::default();
        for symbol in expression.chars() {
            if symbol != ',' && symbol != '-' && symbol != '>' {
                *counts.entry(symbol).or_insert(0) += 1;
            }
        }
        counts
    }

    #[test]
    fn empty_circuit_rejected() {
        let circuit = Circuit::default();
        assert_eq!(
            CircuitToEinsum::<Complex64>::new(&circuit).err(),
            Some(ConfigurationError::EmptyCircuit)
        );
    }

    #[test]
    fn bell_state_vector_expression() {
        let circuit = bell_circuit();
        let converter = CircuitToEinsum::<Complex64>::new(&circuit).unwrap();
        let job = converter.state_vector();
        assert_eq!(job.expression, "a,b,ca,decb->de");
        assert_eq!(job.operands.len(), 4);
    }

    #[test]
    fn bell_state_vector_values() {
        let circuit = bell_circuit();
        let converter = CircuitToEinsum::<Complex64>::new(&circuit).unwrap();
        let state = converter.state_vector().contract().unwrap();
        assert_eq!(state.shape(), &[2, 2]);
        assert_approx_eq!(f64, state[[0, 0]].re, FRAC_1_SQRT_2, epsilon = 1e-12);
        assert_approx_eq!(f64, state[[1, 1]].re, FRAC_1_SQRT_2, epsilon = 1e-12);
        assert_approx_eq!(f64, state[[0, 1]].norm(), 0.0, epsilon = 1e-12);
        assert_approx_eq!(f64, state[[1, 0]].norm(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn bell_amplitudes() {
        let circuit = bell_circuit();
        let converter = CircuitToEinsum::<Complex64>::new(&circuit).unwrap();
        for (bitstring, expected) in [
            ("00", FRAC_1_SQRT_2),
            ("01", 0.0),
            ("10", 0.0),
            ("11", FRAC_1_SQRT_2),
        ] {
            let amplitude = converter.amplitude(bitstring).unwrap().contract().unwrap();
            assert_eq!(amplitude.ndim(), 0);
            assert_approx_eq!(f64, amplitude[IxDyn(&[])].re, expected, epsilon = 1e-12);
            assert_approx_eq!(f64, amplitude[IxDyn(&[])].im, 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn amplitude_validation() {
        let circuit = bell_circuit();
        let converter = CircuitToEinsum::<Complex64>::new(&circuit).unwrap();
        assert_eq!(
            converter.amplitude("0").err(),
            Some(ValidationError::BitstringLength {
                expected: 2,
                got: 1
            })
        );
        assert_eq!(
            converter.amplitude("0x").err(),
            Some(ValidationError::InvalidBit('x'))
        );
    }

    #[test]
    fn untouched_qubit_keeps_open_wire() {
        let mut circuit = Circuit::default();
        let qr = circuit.allocate_register(2);
        circuit.append_gate("x", &[], &[qr.qubit(0)]);
        let converter = CircuitToEinsum::<Complex64>::new(&circuit).unwrap();
        let job = converter.state_vector();
        // q1 has no gate: its |0> operand is bound directly to the output.
        assert_eq!(job.expression, "a,b,ca->cb");
        let state = job.contract().unwrap();
        assert_approx_eq!(f64, state[[1, 0]].re, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn batched_amplitudes_slices_state_vector() {
        let circuit = bell_circuit();
        let converter = CircuitToEinsum::<Complex64>::new(&circuit).unwrap();
        let fixed = FxHashMap::from_iter([(qubit(&circuit, 0), Bit::Zero)]);
        let batch = converter
            .batched_amplitudes(&fixed)
            .unwrap()
            .contract()
            .unwrap();
        assert_eq!(batch.shape(), &[2]);
        assert_approx_eq!(f64, batch[[0]].re, FRAC_1_SQRT_2, epsilon = 1e-12);
        assert_approx_eq!(f64, batch[[1]].norm(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn batched_amplitudes_unknown_qubit() {
        let circuit = bell_circuit();
        let mut other = Circuit::default();
        let foreign = other.allocate_register(3);
        let converter = CircuitToEinsum::<Complex64>::new(&circuit).unwrap();
        let fixed = FxHashMap::from_iter([(foreign.qubit(2), Bit::One)]);
        assert_eq!(
            converter.batched_amplitudes(&fixed).err(),
            Some(ValidationError::UnknownQubit(foreign.qubit(2)))
        );
    }

    #[test]
    fn bell_reduced_density_matrix_expression() {
        let circuit = bell_circuit();
        let converter = CircuitToEinsum::<Complex64>::new(&circuit).unwrap();
        let job = converter
            .reduced_density_matrix(&[qubit(&circuit, 0)], &FxHashMap::default(), false)
            .unwrap();
        assert_eq!(job.expression, "a,b,ca,decb,f,gf,hegb->dh");
        assert_eq!(job.operands.len(), 7);
    }

    #[test]
    fn bell_reduced_density_matrix_is_maximally_mixed() {
        let circuit = bell_circuit();
        let converter = CircuitToEinsum::<Complex64>::new(&circuit).unwrap();
        for lightcone in [false, true] {
            let rho = converter
                .reduced_density_matrix(&[qubit(&circuit, 0)], &FxHashMap::default(), lightcone)
                .unwrap()
                .contract()
                .unwrap();
            assert_eq!(rho.shape(), &[2, 2]);
            assert_approx_eq!(f64, rho[[0, 0]].re, 0.5, epsilon = 1e-12);
            assert_approx_eq!(f64, rho[[1, 1]].re, 0.5, epsilon = 1e-12);
            assert_approx_eq!(f64, rho[[0, 1]].norm(), 0.0, epsilon = 1e-12);
            assert_approx_eq!(f64, rho[[1, 0]].norm(), 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn fixed_qubit_projects_unnormalized() {
        let circuit = bell_circuit();
        let converter = CircuitToEinsum::<Complex64>::new(&circuit).unwrap();
        let fixed = FxHashMap::from_iter([(qubit(&circuit, 1), Bit::Zero)]);
        let rho = converter
            .reduced_density_matrix(&[qubit(&circuit, 0)], &fixed, false)
            .unwrap()
            .contract()
            .unwrap();
        // Projecting q1 onto |0> leaves the unnormalized |0><0| / 2 on q0.
        assert_approx_eq!(f64, rho[[0, 0]].re, 0.5, epsilon = 1e-12);
        assert_approx_eq!(f64, rho[[1, 1]].norm(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn reduced_density_matrix_validation() {
        let circuit = bell_circuit();
        let converter = CircuitToEinsum::<Complex64>::new(&circuit).unwrap();
        let q0 = qubit(&circuit, 0);
        let q1 = qubit(&circuit, 1);

        assert_eq!(
            converter
                .reduced_density_matrix(&[], &FxHashMap::default(), false)
                .err(),
            Some(ValidationError::EmptyTargets)
        );
        assert_eq!(
            converter
                .reduced_density_matrix(&[q0, q0], &FxHashMap::default(), false)
                .err(),
            Some(ValidationError::DuplicateTarget(q0))
        );
        let fixed = FxHashMap::from_iter([(q1, Bit::One)]);
        assert_eq!(
            converter.reduced_density_matrix(&[q1], &fixed, false).err(),
            Some(ValidationError::TargetFixedOverlap(q1))
        );
        let mut other = Circuit::default();
        let foreign = other.allocate_register(5);
        assert_eq!(
            converter
                .reduced_density_matrix(&[foreign.qubit(4)], &FxHashMap::default(), false)
                .err(),
            Some(ValidationError::UnknownQubit(foreign.qubit(4)))
        );
    }

    #[test]
    fn lightcone_drops_unrelated_gates() {
        let mut circuit = Circuit::default();
        let qr = circuit.allocate_register(3);
        circuit.append_gate("h", &[], &[qr.qubit(0)]);
        circuit.append_gate("cx", &[], &[qr.qubit(0), qr.qubit(1)]);
        circuit.append_gate("h", &[], &[qr.qubit(2)]);
        let converter = CircuitToEinsum::<Complex64>::new(&circuit).unwrap();

        let pruned = converter
            .reduced_density_matrix(&[qr.qubit(2)], &FxHashMap::default(), true)
            .unwrap();
        let complete = converter
            .reduced_density_matrix(&[qr.qubit(2)], &FxHashMap::default(), false)
            .unwrap();
        // Only q2's |0> and Hadamard survive in both copies.
        assert_eq!(pruned.operands.len(), 4);
        assert!(pruned.operands.len() < complete.operands.len());

        let lhs = pruned.contract().unwrap();
        let rhs = complete.contract().unwrap();
        for index in [[0, 0], [0, 1], [1, 0], [1, 1]] {
            assert_approx_eq!(
                f64,
                (lhs[&index[..]] - rhs[&index[..]]).norm(),
                0.0,
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn lightcone_cache_is_reused() {
        let circuit = bell_circuit();
        let converter = CircuitToEinsum::<Complex64>::new(&circuit).unwrap();
        let targets = [qubit(&circuit, 0)];
        let first = converter
            .reduced_density_matrix(&targets, &FxHashMap::default(), true)
            .unwrap();
        let second = converter
            .reduced_density_matrix(&targets, &FxHashMap::default(), true)
            .unwrap();
        assert_eq!(first.expression, second.expression);
        assert_eq!(converter.cones.read().unwrap().len(), 1);
    }

    #[test]
    fn deep_circuit_exhausts_ascii_alphabet() {
        let mut circuit = Circuit::default();
        let qr = circuit.allocate_register(1);
        for _ in 0..60 {
            circuit.append_gate("h", &[], &[qr.qubit(0)]);
        }
        let converter = CircuitToEinsum::<Complex64>::new(&circuit).unwrap();
        let job = converter.state_vector();

        // 61 wires need more symbols than the 52 ASCII letters; every symbol
        // must still be used for exactly one wire (two occurrences, counting
        // the output).
        let counts = symbol_counts(&job.expression);
        assert_eq!(counts.len(), 61);
        assert!(counts.values().all(|&count| count == 2));

        // An even number of Hadamards composes to the identity.
        let amplitude = converter.amplitude("0").unwrap().contract().unwrap();
        assert_approx_eq!(f64, amplitude[IxDyn(&[])].re, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn state_vector_expression_is_well_formed() {
        let circuit = bell_circuit();
        let converter = CircuitToEinsum::<Complex64>::new(&circuit).unwrap();
        let counts = symbol_counts(&converter.state_vector().expression);
        assert!(counts.values().all(|&count| count == 2));
    }

    #[test]
    fn single_precision_operands() {
        let circuit = bell_circuit();
        let converter = CircuitToEinsum::<Complex32>::new(&circuit).unwrap();
        let state = converter.state_vector().contract().unwrap();
        assert_approx_eq!(
            f32,
            state[[0, 0]].re,
            std::f32::consts::FRAC_1_SQRT_2,
            epsilon = 1e-6
        );
        assert_approx_eq!(f32, state[[0, 1]].norm(), 0.0, epsilon = 1e-6);
    }
}
