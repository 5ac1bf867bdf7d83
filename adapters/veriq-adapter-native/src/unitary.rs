//! 2x2 unitaries for single-qubit gate fusion.

use std::f64::consts::PI;

use num_complex::Complex64;
use veriq_ir::StandardGate;

const EPSILON: f64 = 1e-10;

/// A 2x2 matrix in row-major order.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Unitary2x2 {
    pub data: [Complex64; 4],
}

fn c(re: f64, im: f64) -> Complex64 {
    Complex64::new(re, im)
}

impl Unitary2x2 {
    pub fn new(a: Complex64, b: Complex64, c: Complex64, d: Complex64) -> Self {
        Self { data: [a, b, c, d] }
    }

    pub fn identity() -> Self {
        Self::new(c(1.0, 0.0), c(0.0, 0.0), c(0.0, 0.0), c(1.0, 0.0))
    }

    pub fn phase(lambda: f64) -> Self {
        Self::new(
            c(1.0, 0.0),
            c(0.0, 0.0),
            c(0.0, 0.0),
            Complex64::from_polar(1.0, lambda),
        )
    }

    pub fn rx(theta: f64) -> Self {
        let (s, co) = (theta / 2.0).sin_cos();
        Self::new(c(co, 0.0), c(0.0, -s), c(0.0, -s), c(co, 0.0))
    }

    pub fn ry(theta: f64) -> Self {
        let (s, co) = (theta / 2.0).sin_cos();
        Self::new(c(co, 0.0), c(-s, 0.0), c(s, 0.0), c(co, 0.0))
    }

    pub fn rz(theta: f64) -> Self {
        Self::new(
            Complex64::from_polar(1.0, -theta / 2.0),
            c(0.0, 0.0),
            c(0.0, 0.0),
            Complex64::from_polar(1.0, theta / 2.0),
        )
    }

    /// `U3(theta, phi, lambda)`.
    pub fn u(theta: f64, phi: f64, lambda: f64) -> Self {
        let (s, co) = (theta / 2.0).sin_cos();
        Self::new(
            c(co, 0.0),
            -Complex64::from_polar(s, lambda),
            Complex64::from_polar(s, phi),
            Complex64::from_polar(co, phi + lambda),
        )
    }

    /// Matrix of a single-qubit gate. `None` for multi-qubit gates.
    pub fn of(gate: &StandardGate) -> Option<Self> {
        let h = 1.0 / 2.0_f64.sqrt();
        let m = match *gate {
            StandardGate::I => Self::identity(),
            StandardGate::X => Self::new(c(0.0, 0.0), c(1.0, 0.0), c(1.0, 0.0), c(0.0, 0.0)),
            StandardGate::Y => Self::new(c(0.0, 0.0), c(0.0, -1.0), c(0.0, 1.0), c(0.0, 0.0)),
            StandardGate::Z => Self::phase(PI),
            StandardGate::H => Self::new(c(h, 0.0), c(h, 0.0), c(h, 0.0), c(-h, 0.0)),
            StandardGate::S => Self::phase(PI / 2.0),
            StandardGate::Sdg => Self::phase(-PI / 2.0),
            StandardGate::T => Self::phase(PI / 4.0),
            StandardGate::Tdg => Self::phase(-PI / 4.0),
            StandardGate::SX => Self::rx(PI / 2.0),
            StandardGate::SXdg => Self::rx(-PI / 2.0),
            StandardGate::Rx(t) => Self::rx(t),
            StandardGate::Ry(t) => Self::ry(t),
            StandardGate::Rz(t) => Self::rz(t),
            StandardGate::RzQ(q) => Self::rz(q.radians()),
            StandardGate::U1(l) | StandardGate::P(l) => Self::phase(l),
            StandardGate::U2(phi, lambda) => Self::u(PI / 2.0, phi, lambda),
            StandardGate::U3(theta, phi, lambda) => Self::u(theta, phi, lambda),
            _ => return None,
        };
        Some(m)
    }

    /// `self * other`, i.e. `other` applied first.
    pub fn mul(&self, other: &Self) -> Self {
        let [a, b, c, d] = self.data;
        let [e, f, g, h] = other.data;
        Self::new(a * e + b * g, a * f + b * h, c * e + d * g, c * f + d * h)
    }

    /// Identity up to global phase.
    pub fn is_identity(&self) -> bool {
        let [a, b, c, d] = self.data;
        b.norm() < EPSILON && c.norm() < EPSILON && (a - d).norm() < EPSILON
    }

    /// Euler angles `(theta, phi, lambda)` with `self ~ U3(theta, phi, lambda)`.
    pub fn zyz(&self) -> (f64, f64, f64) {
        let [a, b, c, d] = self.data;
        let det = a * d - b * c;
        let fix = Complex64::from_polar(1.0, -det.arg() / 2.0);
        let (a, c) = (a * fix, c * fix);

        let theta = 2.0 * c.norm().atan2(a.norm());
        let (sum, diff) = if c.norm() < EPSILON {
            (-2.0 * a.arg(), 0.0)
        } else if a.norm() < EPSILON {
            (0.0, 2.0 * c.arg())
        } else {
            (-2.0 * a.arg(), 2.0 * c.arg())
        };
        let phi = (sum + diff) / 2.0;
        let lambda = (sum - diff) / 2.0;
        (theta, normalize_angle(phi), normalize_angle(lambda))
    }
}

/// Reduce an angle into `(-pi, pi]`.
pub(crate) fn normalize_angle(angle: f64) -> f64 {
    if !angle.is_finite() {
        return 0.0;
    }
    let mut a = angle.rem_euclid(2.0 * PI);
    if a > PI {
        a -= 2.0 * PI;
    }
    a
}
