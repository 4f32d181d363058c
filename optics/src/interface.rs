//! Flat boundary between two homogeneous anisotropic media.
//!
//! Solved algebraically rather than by marching: on each side the ray is a
//! straight line along the group velocity, and at the plane the wavevector is
//! matched with the same quadratic as a curved metric boundary.

use cgmath::InnerSpace;

use crate::error::{RefractionError, RefractionResult};
use crate::hamiltonian::group_velocity;
use crate::math::{Tensor, Vec3};
use crate::refraction::{refract, Propagation};

/// Whether the optical path accumulated on the far side of the interface
/// adds to or subtracts from the near side.
///
/// The tensors alone do not fix this; it is a modelling choice of the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PathConvention {
    #[default]
    Additive,
    Subtractive,
}

impl PathConvention {
    fn sign(self) -> f64 {
        match self {
            PathConvention::Additive => 1.0,
            PathConvention::Subtractive => -1.0,
        }
    }
}

/// What became of a wave meeting the interface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transition {
    /// Crossed into the far medium.
    Transmitted { wavevector: Vec3, direction: Vec3 },
    /// Total internal reflection back into the near medium.
    Reflected { wavevector: Vec3, direction: Vec3 },
}

impl Transition {
    pub fn wavevector(&self) -> Vec3 {
        match *self {
            Transition::Transmitted { wavevector, .. } | Transition::Reflected { wavevector, .. } => wavevector,
        }
    }

    /// Unit group-velocity direction.
    pub fn direction(&self) -> Vec3 {
        match *self {
            Transition::Transmitted { direction, .. } | Transition::Reflected { direction, .. } => direction,
        }
    }
}

/// Plane through `origin` with unit `normal` pointing from the `near`
/// medium into the `far` medium.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatInterface {
    pub origin: Vec3,
    pub normal: Vec3,
    pub near: Tensor,
    pub far: Tensor,
    pub convention: PathConvention,
}

impl FlatInterface {
    pub fn new(origin: Vec3, normal: Vec3, near: Tensor, far: Tensor) -> Self {
        Self {
            origin,
            normal: normal.normalize(),
            near,
            far,
            convention: PathConvention::default(),
        }
    }

    pub fn with_convention(mut self, convention: PathConvention) -> Self {
        self.convention = convention;
        self
    }

    /// Match a near-side wavevector across the plane.
    ///
    /// The plane normal points into the far medium, so in the vocabulary of
    /// [`refract`] the near medium is the "volume" and its outward normal is
    /// `self.normal`.
    pub fn refract(&self, k: Vec3) -> RefractionResult<Transition> {
        match refract(k, self.normal, &self.far, Propagation::Outward) {
            Ok(wavevector) => Ok(Transition::Transmitted {
                wavevector,
                direction: group_velocity(&self.far, wavevector).normalize(),
            }),
            Err(RefractionError::Evanescent) => {
                let wavevector = refract(k, self.normal, &self.near, Propagation::Inward)?;
                Ok(Transition::Reflected {
                    wavevector,
                    direction: group_velocity(&self.near, wavevector).normalize(),
                })
            }
            Err(err) => Err(err),
        }
    }

    /// Distance along the unit `direction` from `start` to the plane, if it
    /// lies ahead.
    pub fn intersect_plane(&self, start: Vec3, direction: Vec3) -> Option<f64> {
        let denom = direction.dot(self.normal);
        if denom.abs() < f64::EPSILON {
            return None;
        }
        let t = (self.origin - start).dot(self.normal) / denom;
        (t > 0.0).then_some(t)
    }

    /// Optical path k₁·Δx₁ ± k₂·Δx₂ for a ray travelling `near_path` with
    /// wavevector `k_near` and then `far_path` with `k_far`.
    pub fn optical_path_length(&self, k_near: Vec3, near_path: Vec3, k_far: Vec3, far_path: Vec3) -> f64 {
        k_near.dot(near_path) + self.convention.sign() * k_far.dot(far_path)
    }

    /// Straight-line trace from `start` (near side) along the near-side
    /// wavevector `k`, continuing `far_distance` past the plane.
    ///
    /// Returns the end point, the final transition and the optical path.
    pub fn trace(&self, start: Vec3, k: Vec3, far_distance: f64) -> RefractionResult<Option<(Vec3, Transition, f64)>> {
        let near_direction = group_velocity(&self.near, k).normalize();
        let t = match self.intersect_plane(start, near_direction) {
            Some(t) => t,
            None => return Ok(None),
        };
        let hit = start + near_direction * t;
        let transition = self.refract(k)?;
        let far_path = transition.direction() * far_distance;
        let length = self.optical_path_length(k, hit - start, transition.wavevector(), far_path);
        Ok(Some((hit + far_path, transition, length)))
    }
}
