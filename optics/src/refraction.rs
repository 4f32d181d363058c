//! Generalised law of refraction at an interface with a tensor medium.
//!
//! The tangential part kT of the wavevector is conserved. The normal part kN
//! on the transmission side follows from H = 0:
//!
//! a·kN² + b·kN + c = 0 with a = n̂ᵗ·n·n̂, b = 2·n̂ᵗ·n·kT, c = kTᵗ·n·kT − det n.
//!
//! Of the two roots exactly one gives a group velocity crossing the interface
//! the required way.

use cgmath::{InnerSpace, SquareMatrix};

use crate::error::{GeometricInconsistency, RefractionError, RefractionResult};
use crate::hamiltonian::group_velocity;
use crate::math::{is_finite, quad_form, tangential, Tensor, Vec3};

/// Leading coefficients below this are treated as a ray running along the
/// interface.
const DEGENERATE_COEFFICIENT: f64 = 1e-12;

/// Required sign of v·n̂ on the transmission side, n̂ being the outward
/// normal of the volume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagation {
    /// Into the volume, v·n̂ < 0.
    Inward,
    /// Out of the volume, v·n̂ > 0.
    Outward,
}

impl Propagation {
    fn accepts(self, v_dot_n: f64) -> bool {
        match self {
            Propagation::Inward => v_dot_n < 0.0,
            Propagation::Outward => v_dot_n > 0.0,
        }
    }
}

/// Wavevector transmitted into the medium `tensor`, keeping the tangential
/// part of `k` relative to the unit `normal`.
///
/// Also used for internal reflection: passing the tensor of the medium the
/// ray is already in, with the propagation pointing back into it, selects the
/// reflected root.
pub fn refract(k: Vec3, normal: Vec3, tensor: &Tensor, propagation: Propagation) -> RefractionResult<Vec3> {
    let kt = tangential(k, normal);
    let a = quad_form(tensor, normal, normal);
    let b = 2.0 * quad_form(tensor, normal, kt);
    let c = quad_form(tensor, kt, kt) - tensor.determinant();

    if a.abs() < DEGENERATE_COEFFICIENT {
        return Err(RefractionError::Evanescent);
    }
    let discriminant = b * b - 4.0 * a * c;
    if discriminant.is_nan() {
        return Err(GeometricInconsistency::RootSelection {
            passing: 0,
            tangential: kt.into(),
        }
        .into());
    }
    // A double root leaves the wave running along the interface
    if discriminant <= 0.0 {
        return Err(RefractionError::Evanescent);
    }

    let sqrtd = discriminant.sqrt();
    let candidates = [(-b + sqrtd) / (2.0 * a), (-b - sqrtd) / (2.0 * a)]
        .map(|kn| kt + normal * kn);
    let passing: Vec<Vec3> = candidates
        .into_iter()
        .filter(|candidate| is_finite(*candidate))
        .filter(|candidate| propagation.accepts(group_velocity(tensor, *candidate).dot(normal)))
        .collect();

    match passing.as_slice() {
        [k] => Ok(*k),
        _ => Err(GeometricInconsistency::RootSelection {
            passing: passing.len(),
            tangential: kt.into(),
        }
        .into()),
    }
}

/// Transmission into vacuum (n = I) through the outward `normal`, where the
/// quadratic collapses to kN = √(1 − |kT|²).
pub fn refract_into_vacuum(k: Vec3, normal: Vec3) -> RefractionResult<Vec3> {
    let kt = tangential(k, normal);
    let kn2 = 1.0 - kt.magnitude2();
    if kn2 <= 0.0 {
        return Err(RefractionError::Evanescent);
    }
    Ok(kt + normal * kn2.sqrt())
}

/// Mirror image of `k` about the plane with unit `normal`, for vacuum.
pub fn reflect_in_vacuum(k: Vec3, normal: Vec3) -> Vec3 {
    k - normal * (2.0 * k.dot(normal))
}
