//! Error types for converter construction, query validation, and the
//! reference contraction evaluator.

use thiserror::Error;

use crate::circuit::Qubit;

/// Errors raised when constructing a [`CircuitToEinsum`](crate::converter::CircuitToEinsum).
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigurationError {
    /// The circuit has no qubits, so no tensor network can be derived from it.
    #[error("circuit has no qubits")]
    EmptyCircuit,
}

/// Errors raised by query operations before any operand is built.
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationError {
    /// A bitstring does not cover every qubit of the circuit.
    #[error("bitstring covers {got} qubits, but the circuit has {expected}")]
    BitstringLength {
        /// Number of qubits in the circuit.
        expected: usize,
        /// Number of symbols in the bitstring.
        got: usize,
    },

    /// A bitstring symbol other than `'0'` or `'1'`.
    #[error("invalid bit value {0:?}, expected '0' or '1'")]
    InvalidBit(char),

    /// A qubit that is not part of the circuit.
    #[error("qubit {0:?} is not part of the circuit")]
    UnknownQubit(Qubit),

    /// A reduced density matrix needs at least one target qubit.
    #[error("no target qubits given")]
    EmptyTargets,

    /// The same qubit was listed as a target more than once.
    #[error("qubit {0:?} listed as target more than once")]
    DuplicateTarget(Qubit),

    /// A qubit cannot be kept open and projected at the same time.
    #[error("qubit {0:?} is both a target and fixed")]
    TargetFixedOverlap(Qubit),
}

/// Errors raised by the reference einsum evaluator in [`crate::contraction`].
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ContractionError {
    /// The expression does not contain exactly one `->` separator.
    #[error("expression must contain exactly one '->'")]
    MissingArrow,

    /// The number of operand labels differs from the number of operands.
    #[error("expression names {expected} operands, but {got} were supplied")]
    OperandCount {
        /// Number of comma-separated label groups.
        expected: usize,
        /// Number of operands supplied.
        got: usize,
    },

    /// An operand's rank differs from the length of its label group.
    #[error("operand {operand} has rank {rank}, but its labels are {labels:?}")]
    RankMismatch {
        /// Position of the operand.
        operand: usize,
        /// The label group assigned to it.
        labels: String,
        /// The actual rank of the operand.
        rank: usize,
    },

    /// The same index symbol is used with two different dimensions.
    #[error("index {0:?} appears with inconsistent dimensions")]
    DimensionMismatch(char),

    /// An output index that never appears on any operand.
    #[error("output index {0:?} does not appear on any operand")]
    UnknownOutputIndex(char),

    /// An output index that is listed more than once.
    #[error("output index {0:?} is listed more than once")]
    DuplicateOutputIndex(char),
}
