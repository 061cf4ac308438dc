//! A reference einsum evaluator.
//!
//! Operands are folded left to right; an index is summed as soon as no later
//! operand and no output axis mentions it. This is the executor contact
//! surface used by the tests and the demo binary. It performs no path
//! optimization; production workloads should hand
//! [`EinsumJob`](crate::converter::EinsumJob)s to a dedicated contraction
//! engine instead.

use itertools::Itertools;
use log::debug;
use ndarray::{ArrayD, IxDyn};
use rustc_hash::FxHashMap;

use crate::errors::ContractionError;
use crate::types::ComplexScalar;

/// Contracts `operands` according to an einsum `expression`.
///
/// The expression must contain exactly one `->`; the comma-separated label
/// groups on the left belong to the operands in order. Indices may appear on
/// more than two operands (hyperedges), in which case all occurrences are
/// summed jointly.
///
/// # Errors
/// [`ContractionError`] if the expression is malformed or inconsistent with
/// the operands.
pub fn contract_expression<T: ComplexScalar>(
    expression: &str,
    operands: &[ArrayD<T>],
) -> Result<ArrayD<T>, ContractionError> {
    let (lhs, output) = expression
        .split_once("->")
        .ok_or(ContractionError::MissingArrow)?;
    if output.contains("->") {
        return Err(ContractionError::MissingArrow);
    }

    let labels: Vec<Vec<char>> = lhs.split(',').map(|group| group.chars().collect()).collect();
    if labels.len() != operands.len() {
        return Err(ContractionError::OperandCount {
            expected: labels.len(),
            got: operands.len(),
        });
    }

    // Consistent dimension per index symbol.
    let mut dims: FxHashMap<char, usize> = FxHashMap::default();
    for (position, (label, operand)) in labels.iter().zip(operands).enumerate() {
        if label.len() != operand.ndim() {
            return Err(ContractionError::RankMismatch {
                operand: position,
                labels: label.iter().collect(),
                rank: operand.ndim(),
            });
        }
        for (&symbol, &dim) in label.iter().zip(operand.shape()) {
            match dims.insert(symbol, dim) {
                Some(previous) if previous != dim => {
                    return Err(ContractionError::DimensionMismatch(symbol));
                }
                _ => {}
            }
        }
    }

    let output_symbols: Vec<char> = output.chars().collect();
    for (position, symbol) in output_symbols.iter().enumerate() {
        if !dims.contains_key(symbol) {
            return Err(ContractionError::UnknownOutputIndex(*symbol));
        }
        if output_symbols[..position].contains(symbol) {
            return Err(ContractionError::DuplicateOutputIndex(*symbol));
        }
    }
    debug!(
        operands = operands.len(),
        indices = dims.len();
        "Contracting einsum expression"
    );

    // How often each symbol still occurs on operands not folded in yet.
    let mut pending: FxHashMap<char, usize> = FxHashMap::default();
    for label in &labels {
        for &symbol in label {
            *pending.entry(symbol).or_insert(0) += 1;
        }
    }

    let mut acc_labels: Vec<char> = Vec::new();
    let mut acc: ArrayD<T> = ArrayD::from_elem(IxDyn(&[]), T::one());
    for (label, operand) in labels.iter().zip(operands) {
        for &symbol in label {
            *pending.get_mut(&symbol).expect("symbol was counted") -= 1;
        }
        let keep = |symbol: char| {
            pending.get(&symbol).copied().unwrap_or(0) > 0 || output_symbols.contains(&symbol)
        };
        let (next_labels, next) = pairwise(&acc_labels, &acc, label, operand, keep, &dims);
        acc_labels = next_labels;
        acc = next;
    }

    // All non-output indices are summed by now; reorder to the output order.
    let permutation: Vec<usize> = output_symbols
        .iter()
        .map(|symbol| {
            acc_labels
                .iter()
                .position(|l| l == symbol)
                .expect("output symbols survive the fold")
        })
        .collect();
    let result = acc.permuted_axes(IxDyn(&permutation));
    Ok(result.as_standard_layout().to_owned())
}

/// Contracts two labeled tensors, keeping only the indices selected by
/// `keep`. Every index not kept is summed out.
fn pairwise<T: ComplexScalar>(
    a_labels: &[char],
    a: &ArrayD<T>,
    b_labels: &[char],
    b: &ArrayD<T>,
    keep: impl Fn(char) -> bool,
    dims: &FxHashMap<char, usize>,
) -> (Vec<char>, ArrayD<T>) {
    let mut union: Vec<char> = a_labels.to_vec();
    for &symbol in b_labels {
        if !union.contains(&symbol) {
            union.push(symbol);
        }
    }
    let out_labels: Vec<char> = union.iter().copied().filter(|&s| keep(s)).collect();
    let out_shape: Vec<usize> = out_labels.iter().map(|s| dims[s]).collect();
    let mut out = ArrayD::from_elem(IxDyn(&out_shape), T::zero());

    if union.is_empty() {
        out[IxDyn(&[])] += a[IxDyn(&[])] * b[IxDyn(&[])];
        return (out_labels, out);
    }

    for assignment in union.iter().map(|s| 0..dims[s]).multi_cartesian_product() {
        let value: FxHashMap<char, usize> = union.iter().copied().zip(assignment).collect();
        let a_index: Vec<usize> = a_labels.iter().map(|s| value[s]).collect();
        let b_index: Vec<usize> = b_labels.iter().map(|s| value[s]).collect();
        let out_index: Vec<usize> = out_labels.iter().map(|s| value[s]).collect();
        out[&out_index[..]] += a[&a_index[..]] * b[&b_index[..]];
    }
    (out_labels, out)
}
