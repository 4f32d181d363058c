//! H(x,k) = kᵗ·n(x)·k − det n(x) and the quantities derived from it.
//!
//! Along a physical trajectory H stays at zero. At an interface the same
//! condition fixes the normal component of the transmitted wavevector.

use cgmath::{InnerSpace, SquareMatrix};

use crate::error::GeometricInconsistency;
use crate::field::TensorField;
use crate::math::{quad_form, Tensor, Vec3};

pub fn hamiltonian<F: TensorField + ?Sized>(field: &F, x: Vec3, k: Vec3) -> f64 {
    hamiltonian_for(&field.tensor_at(x), k)
}

/// H for an already sampled tensor.
pub fn hamiltonian_for(n: &Tensor, k: Vec3) -> f64 {
    quad_form(n, k, k) - n.determinant()
}

/// ∂H/∂k = 2·n·k, the direction energy travels for wavevector `k`.
pub fn group_velocity(n: &Tensor, k: Vec3) -> Vec3 {
    *n * k * 2.0
}

/// Wavevector at `x` pointing along `direction` with H(x,k) = 0.
///
/// With k = λ·d̂ the constraint reads λ²·d̂ᵗ·n·d̂ = det n, and the positive
/// root keeps k pointing along d̂.
pub fn calculate_k<F: TensorField + ?Sized>(
    field: &F,
    x: Vec3,
    direction: Vec3,
) -> Result<Vec3, GeometricInconsistency> {
    let d = direction.normalize();
    let n = field.tensor_at(x);
    let form = quad_form(&n, d, d);
    let det = field.determinant_at(x);
    let lambda2 = det / form;
    if !(form > 0.0) || !(lambda2 > 0.0) || !lambda2.is_finite() {
        return Err(GeometricInconsistency::NoWavevector {
            position: x.into(),
            direction: d.into(),
        });
    }
    Ok(d * lambda2.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::medium::Medium;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_vacuum_wavevector_is_unit() {
        let k = calculate_k(&Medium::Vacuum, Vec3::new(0.3, 0.0, 0.1), Vec3::new(0.0, 3.0, 4.0))
            .unwrap();
        assert_abs_diff_eq!(k.magnitude(), 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(k.y, 0.6, epsilon = 1e-12);
    }

    #[test]
    fn test_isotropic_wavevector_length_is_index() {
        let medium = Medium::Isotropic { index: 1.5 };
        let x = Vec3::new(0.0, 0.0, 0.0);
        let k = calculate_k(&medium, x, Vec3::new(1.0, 1.0, 0.0)).unwrap();
        assert_abs_diff_eq!(k.magnitude(), 1.5, epsilon = 1e-12);
        assert_abs_diff_eq!(hamiltonian(&medium, x, k), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_anisotropic_wavevector_satisfies_constraint() {
        let medium = Medium::QuadraticShift { strength: 0.4 };
        let x = Vec3::new(0.7, -0.2, 0.3);
        let k = calculate_k(&medium, x, Vec3::new(0.2, 0.1, 1.0)).unwrap();
        assert_abs_diff_eq!(hamiltonian(&medium, x, k), 0.0, epsilon = 1e-12);
        assert!(k.z > 0.0);
    }

    #[test]
    fn test_group_velocity_is_parallel_to_k_in_isotropic_media() {
        let n = Tensor::from_diagonal(Vec3::new(2.0, 2.0, 2.0));
        let v = group_velocity(&n, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(v, Vec3::new(4.0, 0.0, 0.0));
    }
}
