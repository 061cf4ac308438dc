//! Converts quantum circuits into einsum-style tensor network contraction
//! jobs.
//!
//! A [`circuit::Circuit`] is an ordered list of gate operations over labeled
//! qubits. The [`converter::CircuitToEinsum`] translator turns such a circuit
//! into symbolic einsum expressions plus operand lists whose contraction
//! yields the full state vector, a single bitstring amplitude, a batch of
//! amplitudes with fixed qubits, or a reduced density matrix with optional
//! lightcone pruning. The jobs can be evaluated by any einsum engine;
//! [`contraction`] provides a reference evaluator for tests and small
//! networks.

pub mod circuit;
pub mod contraction;
pub mod converter;
pub mod errors;
pub mod gates;
pub mod types;
