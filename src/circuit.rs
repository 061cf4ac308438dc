//! The quantum circuit model consumed by the converter.
//!
//! A [`Circuit`] is an ordered list of [`GateOperation`]s over a set of
//! qubits. Qubits are allocated in registers, similar to the Qiskit / QASM
//! idea, and are plain ordered identifiers so that tensor index positions can
//! be assigned deterministically.

use itertools::Itertools;
use ndarray::{ArrayD, IxDyn};
use num_complex::Complex64;

use crate::errors::ValidationError;
use crate::gates;

/// A single qubit, identified by its position in the circuit's allocation
/// order. The integer order is the total order used everywhere an output axis
/// order has to be chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Qubit(usize);

impl Qubit {
    /// Returns the position of this qubit in the circuit's qubit order.
    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// A computational basis value for a single qubit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bit {
    /// The |0> state.
    Zero,
    /// The |1> state.
    One,
}

impl TryFrom<char> for Bit {
    type Error = ValidationError;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        match value {
            '0' => Ok(Bit::Zero),
            '1' => Ok(Bit::One),
            other => Err(ValidationError::InvalidBit(other)),
        }
    }
}

/// A quantum register, i.e., an array of qubits. Registers group qubits (for
/// instance, one register for ancillas), and a circuit can act on multiple
/// registers.
#[derive(Debug)]
pub struct QuantumRegister {
    base: usize,
    size: usize,
}

impl QuantumRegister {
    /// Returns the qubit at a given index.
    #[must_use]
    pub fn qubit(&self, index: usize) -> Qubit {
        assert!(index < self.size);
        Qubit(self.base + index)
    }

    /// Returns an iterator over all qubits in this register.
    pub fn qubits(&self) -> impl Iterator<Item = Qubit> + '_ {
        (self.base..self.base + self.size).map(Qubit)
    }

    /// Returns the size of the register.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.size
    }

    /// Returns whether this register is empty, i.e., doesn't contain any qubits.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }
}

/// A gate application: a unitary tensor together with the ordered qubits it
/// acts on. Immutable once created.
///
/// The tensor of a k-qubit gate has shape `(2,) * 2k`: the first k axes are
/// the output wires, the last k axes the input wires, both in the order of
/// [`GateOperation::qubits`]. This is the row/column split of the usual
/// `2^k x 2^k` matrix.
#[derive(Debug, Clone)]
pub struct GateOperation {
    tensor: ArrayD<Complex64>,
    qubits: Vec<Qubit>,
}

impl GateOperation {
    /// Creates a gate operation from a `2^k x 2^k` unitary matrix given in
    /// row-major order.
    ///
    /// # Panics
    /// Panics if the qubit list is empty or contains duplicates, or if the
    /// matrix size doesn't match the number of qubits.
    #[must_use]
    pub fn from_matrix(matrix: Vec<Complex64>, qubits: Vec<Qubit>) -> Self {
        assert!(!qubits.is_empty(), "Gate must act on at least one qubit");
        assert!(
            qubits.iter().all_unique(),
            "Qubit arguments must be unique"
        );
        let dim = 1 << qubits.len();
        assert_eq!(
            matrix.len(),
            dim * dim,
            "Matrix size doesn't match qubit count"
        );
        let shape = vec![2; 2 * qubits.len()];
        let tensor = ArrayD::from_shape_vec(IxDyn(&shape), matrix)
            .expect("shape and data length agree");
        Self { tensor, qubits }
    }

    /// Creates a gate operation from an already reshaped `(2,) * 2k` tensor.
    pub(crate) fn from_tensor(tensor: ArrayD<Complex64>, qubits: Vec<Qubit>) -> Self {
        assert!(!qubits.is_empty(), "Gate must act on at least one qubit");
        assert!(
            qubits.iter().all_unique(),
            "Qubit arguments must be unique"
        );
        assert_eq!(tensor.ndim(), 2 * qubits.len());
        assert!(tensor.shape().iter().all(|&d| d == 2));
        Self { tensor, qubits }
    }

    /// The gate tensor, shaped `(2,) * 2k` with output axes first.
    #[inline]
    #[must_use]
    pub fn tensor(&self) -> &ArrayD<Complex64> {
        &self.tensor
    }

    /// The qubits the gate acts on, in matrix axis order.
    #[inline]
    #[must_use]
    pub fn qubits(&self) -> &[Qubit] {
        &self.qubits
    }

    /// The number of qubits the gate acts on.
    #[inline]
    #[must_use]
    pub fn arity(&self) -> usize {
        self.qubits.len()
    }
}

/// A quantum circuit: an ordered sequence of gate operations over a set of
/// allocated qubits, all initialized in the |0> state.
#[derive(Debug, Default)]
pub struct Circuit {
    num_qubits: usize,
    operations: Vec<GateOperation>,
}

impl Circuit {
    /// Returns the total number of qubits allocated in this circuit.
    ///
    /// # Examples
    /// ```
    /// # use cte::circuit::Circuit;
    /// let mut circuit = Circuit::default();
    /// let _data = circuit.allocate_register(2);
    /// let _ancillas = circuit.allocate_register(3);
    /// assert_eq!(circuit.num_qubits(), 5);
    /// ```
    #[inline]
    #[must_use]
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Returns all qubits of the circuit in ascending order.
    pub fn qubits(&self) -> impl Iterator<Item = Qubit> + '_ {
        (0..self.num_qubits).map(Qubit)
    }

    /// Returns whether the given qubit belongs to this circuit.
    #[inline]
    #[must_use]
    pub fn contains(&self, qubit: Qubit) -> bool {
        qubit.0 < self.num_qubits
    }

    /// The gate operations in application order.
    #[inline]
    #[must_use]
    pub fn operations(&self) -> &[GateOperation] {
        &self.operations
    }

    /// Allocates a new quantum register. The qubits are initialized in the
    /// |0> state.
    pub fn allocate_register(&mut self, size: usize) -> QuantumRegister {
        let base = self.num_qubits;
        self.num_qubits += size;
        QuantumRegister { base, size }
    }

    /// Appends a named gate from the registry to the circuit.
    ///
    /// # Panics
    /// Panics if the gate name is unknown, the angle count doesn't match the
    /// gate, or a qubit is repeated or not allocated in this circuit.
    pub fn append_gate(&mut self, gate: &str, angles: &[f64], qubits: &[Qubit]) {
        let tensor = gates::load_gate(gate, angles);
        assert_eq!(
            tensor.ndim(),
            2 * qubits.len(),
            "Gate '{gate}' acts on {} qubits, got {}",
            tensor.ndim() / 2,
            qubits.len()
        );
        self.append_operation(GateOperation::from_tensor(tensor, qubits.to_vec()));
    }

    /// Appends a prebuilt gate operation to the circuit.
    ///
    /// # Panics
    /// Panics if the operation references a qubit not allocated in this
    /// circuit.
    pub fn append_operation(&mut self, operation: GateOperation) {
        assert!(
            operation.qubits().iter().all(|q| self.contains(*q)),
            "Qubit arguments must be allocated in this circuit"
        );
        self.operations.push(operation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_allocation() {
        let mut circuit = Circuit::default();
        let a = circuit.allocate_register(2);
        let b = circuit.allocate_register(1);
        assert_eq!(circuit.num_qubits(), 3);
        assert_eq!(a.len(), 2);
        assert!(!a.is_empty());
        assert_eq!(a.qubit(1).index(), 1);
        assert_eq!(b.qubit(0).index(), 2);
        assert_eq!(a.qubits().collect::<Vec<_>>(), vec![a.qubit(0), a.qubit(1)]);
    }

    #[test]
    fn qubit_order_is_allocation_order() {
        let mut circuit = Circuit::default();
        let a = circuit.allocate_register(1);
        let b = circuit.allocate_register(1);
        assert!(a.qubit(0) < b.qubit(0));
    }

    #[test]
    fn gate_tensor_shape() {
        let mut circuit = Circuit::default();
        let qr = circuit.allocate_register(2);
        circuit.append_gate("cx", &[], &[qr.qubit(0), qr.qubit(1)]);
        let op = &circuit.operations()[0];
        assert_eq!(op.arity(), 2);
        assert_eq!(op.tensor().shape(), &[2, 2, 2, 2]);
    }

    #[test]
    fn bit_parsing() {
        assert_eq!(Bit::try_from('0'), Ok(Bit::Zero));
        assert_eq!(Bit::try_from('1'), Ok(Bit::One));
        assert_eq!(
            Bit::try_from('x'),
            Err(ValidationError::InvalidBit('x'))
        );
    }

    #[test]
    #[should_panic(expected = "Qubit arguments must be unique")]
    fn duplicate_qubit_arg() {
        let mut circuit = Circuit::default();
        let qr = circuit.allocate_register(2);
        circuit.append_gate("cx", &[], &[qr.qubit(1), qr.qubit(1)]);
    }

    #[test]
    #[should_panic(expected = "must be allocated")]
    fn unallocated_qubit_arg() {
        let mut circuit = Circuit::default();
        let _qr = circuit.allocate_register(1);
        let mut other = Circuit::default();
        let foreign = other.allocate_register(2);
        circuit.append_gate("cx", &[], &[foreign.qubit(0), foreign.qubit(1)]);
    }
}
