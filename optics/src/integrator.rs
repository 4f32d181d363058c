//! Stateless step rules for Hamilton's ray equations.
//!
//! dx/dτ = ∂H/∂k, dk/dτ = −∂H/∂x. A step is a pure function of (x, k, dτ)
//! so the marcher can recompute it at any rescaled dτ.

use std::fmt;
use std::str::FromStr;

use crate::field::TensorField;
use crate::math::Vec3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Integrator {
    /// Explicit Euler, first order.
    Euler,
    /// Classical fourth order Runge-Kutta.
    #[default]
    RungeKutta4,
}

impl Integrator {
    /// Increments (Δx, Δk) for one step of size `dtau` from (x, k).
    pub fn step<F: TensorField + ?Sized>(&self, field: &F, x: Vec3, k: Vec3, dtau: f64) -> (Vec3, Vec3) {
        match self {
            Integrator::Euler => (field.dx_dtau(x, k) * dtau, field.dk_dtau(x, k) * dtau),
            Integrator::RungeKutta4 => {
                let derivatives = |x: Vec3, k: Vec3| (field.dx_dtau(x, k), field.dk_dtau(x, k));

                let (x1, k1) = derivatives(x, k);
                let (x2, k2) = derivatives(x + x1 * (dtau * 0.5), k + k1 * (dtau * 0.5));
                let (x3, k3) = derivatives(x + x2 * (dtau * 0.5), k + k2 * (dtau * 0.5));
                let (x4, k4) = derivatives(x + x3 * dtau, k + k3 * dtau);

                // Combine derivatives for RK4
                let dx = (x1 + x2 * 2.0 + x3 * 2.0 + x4) * (dtau / 6.0);
                let dk = (k1 + k2 * 2.0 + k3 * 2.0 + k4) * (dtau / 6.0);
                (dx, dk)
            }
        }
    }
}

impl fmt::Display for Integrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Integrator::Euler => write!(f, "euler"),
            Integrator::RungeKutta4 => write!(f, "rk4"),
        }
    }
}

impl FromStr for Integrator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "euler" => Ok(Integrator::Euler),
            "rk4" | "runge-kutta" | "rungekutta4" => Ok(Integrator::RungeKutta4),
            other => Err(format!("unknown integrator '{other}', expected 'euler' or 'rk4'")),
        }
    }
}
