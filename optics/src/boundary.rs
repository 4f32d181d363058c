//! Closed surfaces bounding a metric volume.

use cgmath::InnerSpace;

use crate::math::{axis, Vec3};

/// Crossings closer than this to the query origin are ignored, so a ray
/// sitting on the surface does not find itself.
pub const CROSSING_EPSILON: f64 = 1e-9;

/// How far behind the query origin an exit crossing may lie and still be
/// reported, for points that drifted onto or just past the surface.
pub const EXIT_TOLERANCE: f64 = 1e-7;

/// Point where a straight segment meets a boundary surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundaryCrossing {
    pub point: Vec3,
    /// Unit normal pointing out of the volume.
    pub normal: Vec3,
    /// Distance along the unit query direction.
    pub distance: f64,
}

/// Closed, outward-oriented geometry.
pub trait BoundarySurface: Send + Sync {
    /// Strict inside test.
    fn contains(&self, p: Vec3) -> bool;

    /// First crossing of the ray `origin + t·direction` with t > CROSSING_EPSILON.
    /// `direction` must be a unit vector.
    fn intersect(&self, origin: Vec3, direction: Vec3) -> Option<BoundaryCrossing>;

    /// Where the ray `origin + t·direction` leaves the volume, for an origin
    /// inside or on the surface. The distance is never negative.
    fn exit(&self, origin: Vec3, direction: Vec3) -> Option<BoundaryCrossing>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereBoundary {
    pub center: Vec3,
    pub radius: f64,
}

impl SphereBoundary {
    pub fn new(center: Vec3, radius: f64) -> Self {
        Self {
            center,
            radius: radius.max(0.0),
        }
    }

    fn crossing_at(&self, origin: Vec3, direction: Vec3, t: f64) -> BoundaryCrossing {
        let point = origin + direction * t;
        BoundaryCrossing {
            point,
            normal: (point - self.center) / self.radius,
            distance: t,
        }
    }
}

impl BoundarySurface for SphereBoundary {
    fn contains(&self, p: Vec3) -> bool {
        (p - self.center).magnitude2() < self.radius * self.radius
    }

    fn intersect(&self, origin: Vec3, direction: Vec3) -> Option<BoundaryCrossing> {
        let oc = self.center - origin;
        let h = direction.dot(oc);
        let c = oc.magnitude2() - self.radius * self.radius;
        let discriminant = h * h - c;
        if discriminant < 0.0 {
            return None;
        }
        let sqrtd = discriminant.sqrt();

        // Nearest root beyond the epsilon
        let mut t = h - sqrtd;
        if t <= CROSSING_EPSILON {
            t = h + sqrtd;
            if t <= CROSSING_EPSILON {
                return None;
            }
        }
        Some(self.crossing_at(origin, direction, t))
    }

    fn exit(&self, origin: Vec3, direction: Vec3) -> Option<BoundaryCrossing> {
        let oc = self.center - origin;
        let h = direction.dot(oc);
        let discriminant = h * h - (oc.magnitude2() - self.radius * self.radius);
        if discriminant < 0.0 {
            return None;
        }
        let t = h + discriminant.sqrt();
        (t >= -EXIT_TOLERANCE).then(|| self.crossing_at(origin, direction, t.max(0.0)))
    }
}

/// Axis-aligned box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxBoundary {
    pub center: Vec3,
    pub half_extents: Vec3,
}

impl BoxBoundary {
    pub fn new(center: Vec3, half_extents: Vec3) -> Self {
        Self { center, half_extents }
    }
}

impl BoundarySurface for BoxBoundary {
    fn contains(&self, p: Vec3) -> bool {
        let d = p - self.center;
        (0..3).all(|i| d[i].abs() < self.half_extents[i])
    }

    fn intersect(&self, origin: Vec3, direction: Vec3) -> Option<BoundaryCrossing> {
        let slabs = self.slabs(origin, direction)?;
        if slabs.t_near > CROSSING_EPSILON {
            Some(slabs.crossing(origin, direction, slabs.t_near, slabs.near_axis, -1.0))
        } else if slabs.t_far > CROSSING_EPSILON {
            Some(slabs.crossing(origin, direction, slabs.t_far, slabs.far_axis, 1.0))
        } else {
            None
        }
    }

    fn exit(&self, origin: Vec3, direction: Vec3) -> Option<BoundaryCrossing> {
        let slabs = self.slabs(origin, direction)?;
        (slabs.t_far >= -EXIT_TOLERANCE)
            .then(|| slabs.crossing(origin, direction, slabs.t_far.max(0.0), slabs.far_axis, 1.0))
    }
}

/// Parameter interval a ray spends inside a box, with the axes whose faces
/// bound it.
struct Slabs {
    t_near: f64,
    near_axis: usize,
    t_far: f64,
    far_axis: usize,
}

impl Slabs {
    /// Crossing on the face of `axis`; `side` is −1 entering and +1 leaving.
    fn crossing(&self, origin: Vec3, direction: Vec3, t: f64, axis_index: usize, side: f64) -> BoundaryCrossing {
        BoundaryCrossing {
            point: origin + direction * t,
            normal: axis(axis_index) * (side * direction[axis_index].signum()),
            distance: t,
        }
    }
}

impl BoxBoundary {
    fn slabs(&self, origin: Vec3, direction: Vec3) -> Option<Slabs> {
        let o = origin - self.center;
        let mut slabs = Slabs {
            t_near: f64::NEG_INFINITY,
            near_axis: 0,
            t_far: f64::INFINITY,
            far_axis: 0,
        };
        for i in 0..3 {
            if direction[i].abs() < f64::EPSILON {
                if o[i].abs() > self.half_extents[i] {
                    return None;
                }
                continue;
            }
            let t0 = (-self.half_extents[i] - o[i]) / direction[i];
            let t1 = (self.half_extents[i] - o[i]) / direction[i];
            let (lo, hi) = if t0 < t1 { (t0, t1) } else { (t1, t0) };
            if lo > slabs.t_near {
                slabs.t_near = lo;
                slabs.near_axis = i;
            }
            if hi < slabs.t_far {
                slabs.t_far = hi;
                slabs.far_axis = i;
            }
        }
        (slabs.t_near <= slabs.t_far).then_some(slabs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_sphere_crossing_from_outside_and_inside() {
        let sphere = SphereBoundary::new(Vec3::new(0.0, 0.0, 0.0), 1.0);
        let entry = sphere
            .intersect(Vec3::new(0.0, 0.0, -3.0), Vec3::new(0.0, 0.0, 1.0))
            .unwrap();
        assert_abs_diff_eq!(entry.distance, 2.0, epsilon = 1e-12);
        assert_eq!(entry.normal, Vec3::new(0.0, 0.0, -1.0));

        let exit = sphere
            .intersect(Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0))
            .unwrap();
        assert_abs_diff_eq!(exit.distance, 1.0, epsilon = 1e-12);
        assert_eq!(exit.normal, Vec3::new(1.0, 0.0, 0.0));

        assert!(sphere.contains(Vec3::new(0.5, 0.5, 0.5)));
        assert!(!sphere.contains(Vec3::new(0.0, 1.0, 0.0)));
        assert!(sphere
            .intersect(Vec3::new(0.0, 2.0, -3.0), Vec3::new(0.0, 0.0, 1.0))
            .is_none());
    }

    #[test]
    fn test_surface_point_does_not_find_itself() {
        let sphere = SphereBoundary::new(Vec3::new(0.0, 0.0, 0.0), 1.0);
        let crossing = sphere
            .intersect(Vec3::new(0.0, 0.0, -1.0), Vec3::new(0.0, 0.0, 1.0))
            .unwrap();
        assert_abs_diff_eq!(crossing.point.z, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_box_crossings_report_face_normals() {
        let cube = BoxBoundary::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 1.0, 3.0));
        let entry = cube
            .intersect(Vec3::new(-5.0, 0.2, 0.0), Vec3::new(1.0, 0.0, 0.0))
            .unwrap();
        assert_abs_diff_eq!(entry.distance, 4.0, epsilon = 1e-12);
        assert_eq!(entry.normal, Vec3::new(-1.0, 0.0, 0.0));

        let d = Vec3::new(0.6, 0.0, 0.8);
        let exit = cube.intersect(Vec3::new(0.0, 0.0, 0.0), d).unwrap();
        assert_abs_diff_eq!(exit.point.x, 1.0, epsilon = 1e-12);
        assert_eq!(exit.normal, Vec3::new(1.0, 0.0, 0.0));

        assert!(cube.contains(Vec3::new(0.9, -0.9, 2.9)));
        assert!(!cube.contains(Vec3::new(0.9, -0.9, 3.1)));
    }

    #[test]
    fn test_exit_tolerates_points_that_drifted_onto_the_surface() {
        let sphere = SphereBoundary::new(Vec3::new(0.0, 0.0, 0.0), 1.0);
        let up = Vec3::new(0.0, 0.0, 1.0);
        let exit = sphere.exit(Vec3::new(0.0, 0.0, 1.0 - 1e-14), up).unwrap();
        assert!(exit.distance >= 0.0 && exit.distance < 1e-12);
        assert_abs_diff_eq!(exit.normal.z, 1.0, epsilon = 1e-12);
        assert!(sphere.exit(Vec3::new(0.0, 0.0, 2.0), up).is_none());

        let cube = BoxBoundary::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 1.0, 1.0));
        let exit = cube.exit(Vec3::new(0.0, 0.0, 1.0 + 1e-12), up).unwrap();
        assert_eq!(exit.distance, 0.0);
        assert_eq!(exit.normal, up);
    }
}
