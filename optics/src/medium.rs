//! Physical models of metric media.
//!
//! Each variant is a closed-form tensor field together with its exact
//! partial derivatives. The shear variants are transformation-optics media:
//! a coordinate map uᵢ′ = uᵢ + a·g(uⱼ) with Jacobian J = I + s·eᵢeⱼᵗ,
//! s = a·g′(uⱼ), turned into the tensor n = J·Jᵗ / det J. Because det J = 1
//! for every shear, det n = 1 as well.

use cgmath::{InnerSpace, Matrix3, SquareMatrix, Zero};

use crate::field::TensorField;
use crate::math::{axis, outer, Tensor, Vec3};

/// Tagged set of the supported media.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Medium {
    /// n = I everywhere.
    Vacuum,
    /// Homogeneous isotropic medium with refractive index `index`.
    Isotropic { index: f64 },
    /// Isotropic medium whose index varies linearly: m(x) = base + gradient·x.
    GradedIndex { base: f64, gradient: Vec3 },
    /// Luneburg lens: m(r) = √(2 − r²/R²), matching vacuum on its surface.
    Luneburg { center: Vec3, radius: f64 },
    /// z′ = z + a·x.
    LinearShift { strength: f64 },
    /// z′ = z + a·x².
    QuadraticShift { strength: f64 },
    /// x′ = x + a·y².
    XShift { strength: f64 },
    /// y′ = y + a·z².
    YShift { strength: f64 },
}

/// Shear uᵢ′ = uᵢ + a·g(uⱼ), described by s = a·g′(uⱼ) and s′ = a·g″(uⱼ).
struct Shear {
    shifted: usize,
    along: usize,
    s: f64,
    ds: f64,
}

impl Shear {
    fn tensor(&self) -> Tensor {
        let (ei, ej) = (axis(self.shifted), axis(self.along));
        Matrix3::identity() + (outer(ei, ej) + outer(ej, ei)) * self.s + outer(ei, ei) * (self.s * self.s)
    }

    fn partials(&self) -> [Tensor; 3] {
        let (ei, ej) = (axis(self.shifted), axis(self.along));
        let mut partials = [Matrix3::zero(); 3];
        partials[self.along] =
            (outer(ei, ej) + outer(ej, ei)) * self.ds + outer(ei, ei) * (2.0 * self.s * self.ds);
        partials
    }
}

impl Medium {
    fn shear(&self, x: Vec3) -> Option<Shear> {
        match *self {
            Medium::LinearShift { strength } => Some(Shear { shifted: 2, along: 0, s: strength, ds: 0.0 }),
            Medium::QuadraticShift { strength } => Some(Shear {
                shifted: 2,
                along: 0,
                s: 2.0 * strength * x.x,
                ds: 2.0 * strength,
            }),
            Medium::XShift { strength } => Some(Shear {
                shifted: 0,
                along: 1,
                s: 2.0 * strength * x.y,
                ds: 2.0 * strength,
            }),
            Medium::YShift { strength } => Some(Shear {
                shifted: 1,
                along: 2,
                s: 2.0 * strength * x.z,
                ds: 2.0 * strength,
            }),
            _ => None,
        }
    }

    /// Scalar index m and its gradient for the isotropic variants.
    fn scalar_index(&self, x: Vec3) -> Option<(f64, Vec3)> {
        match *self {
            Medium::Vacuum => Some((1.0, Vec3::zero())),
            Medium::Isotropic { index } => Some((index, Vec3::zero())),
            Medium::GradedIndex { base, gradient } => Some((base + gradient.dot(x), gradient)),
            Medium::Luneburg { center, radius } => {
                let r = x - center;
                let m = (2.0 - r.magnitude2() / (radius * radius)).max(0.0).sqrt();
                let grad = if m > 0.0 { -r / (radius * radius * m) } else { Vec3::zero() };
                Some((m, grad))
            }
            _ => None,
        }
    }
}

impl TensorField for Medium {
    fn tensor_at(&self, x: Vec3) -> Tensor {
        if let Some((m, _)) = self.scalar_index(x) {
            return Matrix3::from_value(m);
        }
        match self.shear(x) {
            Some(shear) => shear.tensor(),
            None => Matrix3::identity(),
        }
    }

    fn tensor_partials(&self, x: Vec3) -> [Tensor; 3] {
        if let Some((_, g)) = self.scalar_index(x) {
            return [Matrix3::from_value(g.x), Matrix3::from_value(g.y), Matrix3::from_value(g.z)];
        }
        match self.shear(x) {
            Some(shear) => shear.partials(),
            None => [Matrix3::zero(); 3],
        }
    }

    fn determinant_at(&self, x: Vec3) -> f64 {
        match self.scalar_index(x) {
            Some((m, _)) => m * m * m,
            None => 1.0,
        }
    }

    fn determinant_gradient(&self, x: Vec3) -> Vec3 {
        match self.scalar_index(x) {
            Some((m, g)) => g * (3.0 * m * m),
            None => Vec3::zero(),
        }
    }

    fn dk_dtau(&self, x: Vec3, k: Vec3) -> Vec3 {
        match self.scalar_index(x) {
            // −(|k|²·∇m − 3m²·∇m)
            Some((m, g)) => g * (3.0 * m * m - k.magnitude2()),
            None => {
                let shear = match self.shear(x) {
                    Some(shear) => shear,
                    None => return Vec3::zero(),
                };
                // Only ∂n/∂uⱼ is non-zero: kᵗ·∂ⱼn·k = 2s′·kᵢkⱼ + 2s·s′·kᵢ²
                let (ki, kj) = (k[shear.shifted], k[shear.along]);
                let mut dk = Vec3::zero();
                dk[shear.along] = -2.0 * shear.ds * ki * (kj + shear.s * ki);
                dk
            }
        }
    }
}
