use lazy_static::lazy_static;
use ndarray::{ArrayD, IxDyn};
use num_complex::Complex64;

use std::{
    borrow::Borrow,
    collections::HashSet,
    f64::consts::{FRAC_1_SQRT_2, FRAC_PI_4},
    hash::{Hash, Hasher},
    sync::RwLock,
};

lazy_static! {
    static ref GATES: RwLock<HashSet<Box<dyn Gate>>> = {
        let mut gates = HashSet::new();
        gates.insert(Box::new(X) as _);
        gates.insert(Box::new(Y) as _);
        gates.insert(Box::new(Z) as _);
        gates.insert(Box::new(H) as _);
        gates.insert(Box::new(S) as _);
        gates.insert(Box::new(T) as _);
        gates.insert(Box::new(Sx) as _);
        gates.insert(Box::new(Rx) as _);
        gates.insert(Box::new(Ry) as _);
        gates.insert(Box::new(Rz) as _);
        gates.insert(Box::new(U) as _);
        gates.insert(Box::new(Cx) as _);
        gates.insert(Box::new(Cz) as _);
        gates.insert(Box::new(Fsim) as _);
        RwLock::new(gates)
    };
}

/// Registers a gate definition to resolve a gate name to a gate implementation.
pub fn register_gate(gate: Box<dyn Gate>) {
    assert!(
        gate.name().to_ascii_lowercase() == gate.name(),
        "Gate name must be lowercase."
    );
    GATES.write().unwrap().insert(gate);
}

/// Computes the gate tensor for the given gate and angles, shaped `(2,) * 2k`
/// with output axes first.
#[must_use]
pub fn load_gate(gate: &str, angles: &[f64]) -> ArrayD<Complex64> {
    let gates = &GATES.read().unwrap();
    let gate = gates
        .get(gate)
        .unwrap_or_else(|| panic!("Gate '{}' not found.", gate));
    gate.compute(angles)
}

/// Returns whether the given gate is known.
#[must_use]
pub fn is_gate_known(gate: &str) -> bool {
    let gates = &GATES.read().unwrap();
    gates.contains(gate)
}

/// Helper to build a gate tensor of the given shape from row-major data.
fn tensor(shape: &[usize], data: Vec<Complex64>) -> ArrayD<Complex64> {
    ArrayD::from_shape_vec(IxDyn(shape), data).expect("shape matches data length")
}

/// A quantum gate.
pub trait Gate: Send + Sync {
    /// Returns the name of the gate.
    fn name(&self) -> &str;

    /// Computes the gate tensor with the given angles.
    fn compute(&self, angles: &[f64]) -> ArrayD<Complex64>;
}

impl PartialEq for dyn Gate {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
    }
}

impl Eq for dyn Gate {}

impl Hash for dyn Gate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name().hash(state);
    }
}

/// This allows us to use a `&str` as a key in a `HashSet` of gates.
impl Borrow<str> for Box<dyn Gate> {
    fn borrow(&self) -> &str {
        self.name()
    }
}

/// The Pauli-X gate.
struct X;
impl Gate for X {
    fn name(&self) -> &str {
        "x"
    }

    fn compute(&self, angles: &[f64]) -> ArrayD<Complex64> {
        assert!(angles.is_empty());
        let z = Complex64::ZERO;
        let o = Complex64::ONE;
        #[rustfmt::skip]
        let data = vec![
            z, o,
            o, z,
        ];
        tensor(&[2, 2], data)
    }
}

/// The Pauli-Y gate.
struct Y;
impl Gate for Y {
    fn name(&self) -> &str {
        "y"
    }

    fn compute(&self, angles: &[f64]) -> ArrayD<Complex64> {
        assert!(angles.is_empty());
        let z = Complex64::ZERO;
        let i = Complex64::I;
        #[rustfmt::skip]
        let data = vec![
            z, -i,
            i,  z,
        ];
        tensor(&[2, 2], data)
    }
}

/// The Pauli-Z gate.
struct Z;
impl Gate for Z {
    fn name(&self) -> &str {
        "z"
    }

    fn compute(&self, angles: &[f64]) -> ArrayD<Complex64> {
        assert!(angles.is_empty());
        let z = Complex64::ZERO;
        let o = Complex64::ONE;
        #[rustfmt::skip]
        let data = vec![
            o,  z,
            z, -o,
        ];
        tensor(&[2, 2], data)
    }
}

/// The Hadamard gate.
struct H;
impl Gate for H {
    fn name(&self) -> &str {
        "h"
    }

    fn compute(&self, angles: &[f64]) -> ArrayD<Complex64> {
        assert!(angles.is_empty());
        let h = Complex64::new(FRAC_1_SQRT_2, 0.0);
        #[rustfmt::skip]
        let data = vec![
            h,  h,
            h, -h,
        ];
        tensor(&[2, 2], data)
    }
}

/// The phase gate.
struct S;
impl Gate for S {
    fn name(&self) -> &str {
        "s"
    }

    fn compute(&self, angles: &[f64]) -> ArrayD<Complex64> {
        assert!(angles.is_empty());
        let z = Complex64::ZERO;
        let o = Complex64::ONE;
        let i = Complex64::I;
        #[rustfmt::skip]
        let data = vec![
            o, z,
            z, i,
        ];
        tensor(&[2, 2], data)
    }
}

/// The T gate, i.e., the fourth root of Z.
struct T;
impl Gate for T {
    fn name(&self) -> &str {
        "t"
    }

    fn compute(&self, angles: &[f64]) -> ArrayD<Complex64> {
        assert!(angles.is_empty());
        let z = Complex64::ZERO;
        let o = Complex64::ONE;
        #[rustfmt::skip]
        let data = vec![
            o, z,
            z, (Complex64::I * FRAC_PI_4).exp(),
        ];
        tensor(&[2, 2], data)
    }
}

/// The square-root of X gate.
struct Sx;
impl Gate for Sx {
    fn name(&self) -> &str {
        "sx"
    }

    fn compute(&self, angles: &[f64]) -> ArrayD<Complex64> {
        assert!(angles.is_empty());
        let a = Complex64::new(0.5, 0.5);
        let b = Complex64::new(0.5, -0.5);
        #[rustfmt::skip]
        let data = vec![
            a, b,
            b, a,
        ];
        tensor(&[2, 2], data)
    }
}

/// Rotation around the X axis.
struct Rx;
impl Gate for Rx {
    fn name(&self) -> &str {
        "rx"
    }

    fn compute(&self, angles: &[f64]) -> ArrayD<Complex64> {
        let [theta] = angles else {
            panic!("Expected 1 angle, got {}", angles.len())
        };
        let (sin, cos) = (theta / 2.0).sin_cos();
        let c = Complex64::new(cos, 0.0);
        let s = Complex64::new(0.0, -sin);
        #[rustfmt::skip]
        let data = vec![
            c, s,
            s, c,
        ];
        tensor(&[2, 2], data)
    }
}

/// Rotation around the Y axis.
struct Ry;
impl Gate for Ry {
    fn name(&self) -> &str {
        "ry"
    }

    fn compute(&self, angles: &[f64]) -> ArrayD<Complex64> {
        let [theta] = angles else {
            panic!("Expected 1 angle, got {}", angles.len())
        };
        let (sin, cos) = (theta / 2.0).sin_cos();
        let c = Complex64::new(cos, 0.0);
        let s = Complex64::new(sin, 0.0);
        #[rustfmt::skip]
        let data = vec![
            c, -s,
            s,  c,
        ];
        tensor(&[2, 2], data)
    }
}

/// Rotation around the Z axis.
struct Rz;
impl Gate for Rz {
    fn name(&self) -> &str {
        "rz"
    }

    fn compute(&self, angles: &[f64]) -> ArrayD<Complex64> {
        let [theta] = angles else {
            panic!("Expected 1 angle, got {}", angles.len())
        };
        let z = Complex64::ZERO;
        #[rustfmt::skip]
        let data = vec![
            (-Complex64::I * (theta / 2.0)).exp(), z,
            z, (Complex64::I * (theta / 2.0)).exp(),
        ];
        tensor(&[2, 2], data)
    }
}

/// The U gate with three parameters, following the [OpenQASM 3.0 specification](https://openqasm.com/language/gates.html#built-in-gates).
struct U;
impl Gate for U {
    fn name(&self) -> &str {
        "u"
    }

    fn compute(&self, angles: &[f64]) -> ArrayD<Complex64> {
        let [theta, phi, lambda] = angles else {
            panic!("Expected 3 angles, got {}", angles.len())
        };
        let (sin, cos) = (theta / 2.0).sin_cos();
        let data = vec![
            Complex64::new(cos, 0.0),
            -(Complex64::I * lambda).exp() * sin,
            (Complex64::I * phi).exp() * sin,
            (Complex64::I * (phi + lambda)).exp() * cos,
        ];
        tensor(&[2, 2], data)
    }
}

/// The controlled-X gate.
struct Cx;
impl Gate for Cx {
    fn name(&self) -> &str {
        "cx"
    }

    fn compute(&self, angles: &[f64]) -> ArrayD<Complex64> {
        assert!(angles.is_empty());
        let z = Complex64::ZERO;
        let o = Complex64::ONE;
        #[rustfmt::skip]
        let data = vec![
            o, z, z, z,
            z, o, z, z,
            z, z, z, o,
            z, z, o, z,
        ];
        tensor(&[2, 2, 2, 2], data)
    }
}

/// The controlled-Z gate.
struct Cz;
impl Gate for Cz {
    fn name(&self) -> &str {
        "cz"
    }

    fn compute(&self, angles: &[f64]) -> ArrayD<Complex64> {
        assert!(angles.is_empty());
        let z = Complex64::ZERO;
        let o = Complex64::ONE;
        #[rustfmt::skip]
        let data = vec![
            o, z, z, z,
            z, o, z, z,
            z, z, o, z,
            z, z, z, -o,
        ];
        tensor(&[2, 2, 2, 2], data)
    }
}

/// The FSIM gate, as described e.g. [here](https://quantumai.google/reference/python/cirq/FSimGate).
struct Fsim;
impl Gate for Fsim {
    fn name(&self) -> &str {
        "fsim"
    }

    fn compute(&self, angles: &[f64]) -> ArrayD<Complex64> {
        let [theta, phi] = angles else {
            panic!("Expected 2 angles, got {}", angles.len())
        };
        let z = Complex64::ZERO;
        let o = Complex64::ONE;
        let a = Complex64::new(theta.cos(), 0.0);
        let b = Complex64::new(0.0, -theta.sin());
        let c = Complex64::new(0.0, -phi).exp();
        #[rustfmt::skip]
        let data = vec![
            o, z, z, z,
            z, a, b, z,
            z, b, a, z,
            z, z, z, c,
        ];
        tensor(&[2, 2, 2, 2], data)
    }
}
