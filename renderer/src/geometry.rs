//! Analytic primitives for the solid objects of a scene.

use cgmath::InnerSpace;
use optics::{BoundarySurface, Ray, SphereBoundary, Vec3};

/// Hits closer than this to the ray origin are ignored.
pub const HIT_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f64,
}

impl Sphere {
    pub fn new(center: Vec3, radius: f64) -> Self {
        Self { center, radius }
    }
}

/// Infinite plane through `point`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub point: Vec3,
    pub normal: Vec3,
}

impl Plane {
    pub fn new(point: Vec3, normal: Vec3) -> Self {
        Self {
            point,
            normal: normal.normalize(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Sphere(Sphere),
    Plane(Plane),
}

impl Shape {
    /// Distance and surface normal of the nearest hit beyond HIT_EPSILON.
    /// The normal faces the incoming ray.
    pub fn intersect(&self, ray: &Ray) -> Option<(f64, Vec3)> {
        let (t, normal) = match self {
            Shape::Sphere(sphere) => {
                let crossing = SphereBoundary::new(sphere.center, sphere.radius)
                    .intersect(ray.position, ray.direction)?;
                (crossing.distance, crossing.normal)
            }
            Shape::Plane(plane) => {
                let denom = ray.direction.dot(plane.normal);
                if denom.abs() < f64::EPSILON {
                    return None;
                }
                ((plane.point - ray.position).dot(plane.normal) / denom, plane.normal)
            }
        };
        if t <= HIT_EPSILON {
            return None;
        }
        let facing = if normal.dot(ray.direction) > 0.0 { -normal } else { normal };
        Some((t, facing))
    }
}
