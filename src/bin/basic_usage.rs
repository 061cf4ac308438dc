use flexi_logger::Logger;
use log::info;
use ndarray::IxDyn;
use num_complex::Complex64;
use rustc_hash::FxHashMap;

use cte::circuit::{Bit, Circuit};
use cte::converter::CircuitToEinsum;

/// Builds a Bell pair circuit, converts it to einsum jobs, and evaluates them
/// with the reference contractor.
fn main() {
    let _logger = Logger::try_with_env_or_str("debug")
        .unwrap()
        .start()
        .unwrap();

    let mut circuit = Circuit::default();
    let qr = circuit.allocate_register(2);
    circuit.append_gate("h", &[], &[qr.qubit(0)]);
    circuit.append_gate("cx", &[], &[qr.qubit(0), qr.qubit(1)]);

    let converter = CircuitToEinsum::<Complex64>::new(&circuit).unwrap();

    let job = converter.state_vector();
    info!(expression = job.expression.as_str(); "State vector network");
    let state = job.contract().unwrap();
    println!("statevector:\n{state}");

    for bitstring in ["00", "01", "10", "11"] {
        let job = converter.amplitude(bitstring).unwrap();
        let amplitude = job.contract().unwrap();
        println!("amplitude({bitstring}) = {}", amplitude[IxDyn(&[])]);
    }

    let fixed = FxHashMap::from_iter([(qr.qubit(1), Bit::One)]);
    let job = converter.batched_amplitudes(&fixed).unwrap();
    println!("amplitudes with q1 = 1:\n{}", job.contract().unwrap());

    let job = converter
        .reduced_density_matrix(&[qr.qubit(0)], &FxHashMap::default(), true)
        .unwrap();
    info!(expression = job.expression.as_str(); "Reduced density matrix network");
    println!("rdm(q0):\n{}", job.contract().unwrap());
}
