//! What the marcher needs from the scene it is embedded in.

use crate::boundary::BoundaryCrossing;
use crate::math::{Colour, Vec3};
use crate::ray::Ray;

/// Closest hit of a ray with a scene object.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    pub distance: f64,
    pub point: Vec3,
    /// Unit outward normal of the object that was hit.
    pub normal: Vec3,
    /// Index of the object in its scene.
    pub object: usize,
}

impl From<Intersection> for BoundaryCrossing {
    fn from(hit: Intersection) -> Self {
        BoundaryCrossing {
            point: hit.point,
            normal: hit.normal,
            distance: hit.distance,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub position: Vec3,
    pub colour: Colour,
}

impl Light {
    pub fn new(position: Vec3, colour: Colour) -> Self {
        Self { position, colour }
    }
}

/// External scene: closest-hit queries and recursive shading.
///
/// Must be Send + Sync so independent camera rays can be traced from
/// different threads.
pub trait Scene: Send + Sync {
    fn intersect(&self, ray: &Ray) -> Option<Intersection>;

    /// Colour seen along `ray`, which hits `hit`. `trace_level` is the
    /// remaining recursion budget.
    fn shade(&self, ray: &Ray, hit: &Intersection, lights: &[Light], trace_level: u32) -> Colour;

    /// Colour of rays that hit nothing.
    fn background(&self, _ray: &Ray) -> Colour {
        Colour::BLACK
    }
}
