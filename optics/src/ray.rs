//! Ray representation shared with the surrounding renderer.

use cgmath::InnerSpace;

use crate::math::Vec3;

/// A ray as seen by the scene: a position, a unit travel direction and the
/// wavevector that produced it.
///
/// Outside any metric volume the wavevector equals the direction. Inside one,
/// H(position, wavevector) ≈ 0 holds and the two generally differ.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub position: Vec3,
    pub direction: Vec3,
    pub wavevector: Vec3,
    /// Travel time accumulated so far.
    pub time: f64,
    /// Ask the marcher to record the path taken through a volume.
    pub record_trajectory: bool,
}

impl Ray {
    /// Vacuum ray; `direction` is normalised.
    pub fn new(position: Vec3, direction: Vec3) -> Self {
        let direction = direction.normalize();
        Self {
            position,
            direction,
            wavevector: direction,
            time: 0.0,
            record_trajectory: false,
        }
    }

    pub fn recording(mut self) -> Self {
        self.record_trajectory = true;
        self
    }

    /// Point `t` units along the direction.
    pub fn at(&self, t: f64) -> Vec3 {
        self.position + self.direction * t
    }

    /// Continue from `position` in vacuum along `wavevector`, keeping the time
    /// and recording flag of `self`.
    pub fn continued(&self, position: Vec3, wavevector: Vec3, time: f64) -> Self {
        let direction = wavevector.normalize();
        Self {
            position,
            direction,
            wavevector: direction,
            time,
            record_trajectory: self.record_trajectory,
        }
    }
}
