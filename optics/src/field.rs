//! Contract every physical model of a metric medium implements.

use cgmath::SquareMatrix;

use crate::math::{quad_form, Tensor, Vec3};

/// A spatially varying tensor n(x), used as both permittivity and
/// permeability of the medium.
///
/// Implementations supply closed-form partial derivatives. The ODE right-hand
/// side of Hamilton's equations for H(x,k) = kᵗ·n(x)·k − det n(x) is built
/// from them without any numerical differentiation. Models with a cheaper
/// closed form for `dx_dtau`/`dk_dtau` override the provided methods.
pub trait TensorField: Send + Sync {
    /// Symmetric tensor n at `x`.
    fn tensor_at(&self, x: Vec3) -> Tensor;

    /// ∂n/∂xᵢ for i = 0, 1, 2.
    fn tensor_partials(&self, x: Vec3) -> [Tensor; 3];

    /// ∇ det n.
    fn determinant_gradient(&self, x: Vec3) -> Vec3;

    fn determinant_at(&self, x: Vec3) -> f64 {
        self.tensor_at(x).determinant()
    }

    /// ∂H/∂k = 2·n·k.
    fn dx_dtau(&self, x: Vec3, k: Vec3) -> Vec3 {
        self.tensor_at(x) * k * 2.0
    }

    /// −∂H/∂x, component i being −(kᵗ·∂ᵢn·k − ∂ᵢ det n).
    fn dk_dtau(&self, x: Vec3, k: Vec3) -> Vec3 {
        let partials = self.tensor_partials(x);
        let det_grad = self.determinant_gradient(x);
        Vec3::new(
            det_grad.x - quad_form(&partials[0], k, k),
            det_grad.y - quad_form(&partials[1], k, k),
            det_grad.z - quad_form(&partials[2], k, k),
        )
    }
}
