use approx::assert_abs_diff_eq;
use cgmath::{InnerSpace, Matrix3, SquareMatrix, Zero};

use optics::{
    BoundarySurface, BoxBoundary, Colour, GeometricInconsistency, Integrator, Intersection, Light, MarchConfig,
    Medium, MetricVolume, Ray, Scene, SphereBoundary, Tensor, TensorField, Termination, Vec3,
};

/// Scene outside the volume: a wall far away that shades with a flat colour.
struct Backdrop {
    colour: Colour,
}

impl Scene for Backdrop {
    fn intersect(&self, ray: &Ray) -> Option<Intersection> {
        Some(Intersection {
            distance: 100.0,
            point: ray.at(100.0),
            normal: -ray.direction,
            object: 0,
        })
    }

    fn shade(&self, _ray: &Ray, _hit: &Intersection, _lights: &[Light], _trace_level: u32) -> Colour {
        self.colour
    }
}

/// Small ball sitting inside a metric volume.
struct Ball {
    bounds: SphereBoundary,
}

impl Scene for Ball {
    fn intersect(&self, ray: &Ray) -> Option<Intersection> {
        self.bounds.intersect(ray.position, ray.direction).map(|crossing| Intersection {
            distance: crossing.distance,
            point: crossing.point,
            normal: crossing.normal,
            object: 7,
        })
    }

    fn shade(&self, _ray: &Ray, _hit: &Intersection, _lights: &[Light], _trace_level: u32) -> Colour {
        Colour::new(0.0, 1.0, 0.0)
    }
}

/// Medium whose tensor is not a number anywhere.
struct Broken;

impl TensorField for Broken {
    fn tensor_at(&self, _x: Vec3) -> Tensor {
        Matrix3::from_value(f64::NAN)
    }

    fn tensor_partials(&self, _x: Vec3) -> [Tensor; 3] {
        [Matrix3::zero(); 3]
    }

    fn determinant_gradient(&self, _x: Vec3) -> Vec3 {
        Vec3::zero()
    }
}

fn unit_sphere() -> SphereBoundary {
    SphereBoundary::new(Vec3::new(0.0, 0.0, 0.0), 1.0)
}

fn entry_hit(volume: &MetricVolume, ray: &Ray) -> Intersection {
    let crossing = volume.boundary().intersect(ray.position, ray.direction).unwrap();
    Intersection {
        distance: crossing.distance,
        point: crossing.point,
        normal: crossing.normal,
        object: 0,
    }
}

fn exited(termination: &Termination) -> Ray {
    match termination {
        Termination::Exited(ray) => *ray,
        other => panic!("expected the ray to exit, got {other:?}"),
    }
}

#[test]
fn test_vacuum_sphere_diameter_exits_at_antipode() {
    for integrator in [Integrator::Euler, Integrator::RungeKutta4] {
        let config = MarchConfig::default()
            .with_step_size(0.005)
            .with_max_spatial_step(0.05)
            .with_integrator(integrator);
        let volume = MetricVolume::new(unit_sphere(), Medium::Vacuum, config).unwrap();
        let ray = Ray::new(Vec3::new(0.0, 0.0, -3.0), Vec3::new(0.0, 0.0, 1.0));

        let traversal = volume.march(&ray, None, 5).unwrap();
        let out = exited(&traversal.termination);

        // |dx/dτ| = 2 in vacuum, so each step covers 0.01 of the diameter
        assert!((traversal.steps as i64 - 200).abs() <= 1, "took {} steps", traversal.steps);
        assert_abs_diff_eq!((out.position - Vec3::new(0.0, 0.0, 1.0)).magnitude(), 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!((out.direction - ray.direction).magnitude(), 0.0, epsilon = 1e-12);
        // Travel time accumulates −k·Δx / c: 2 units outside plus 2 inside
        assert_abs_diff_eq!(out.time, -4.0, epsilon = 1e-9);
    }
}

#[test]
fn test_vacuum_reduces_to_straight_lines() {
    let volume = MetricVolume::new(unit_sphere(), Medium::Vacuum, MarchConfig::default()).unwrap();
    let start = Vec3::new(-2.0, 0.3, -1.5);
    let direction = Vec3::new(2.0, -0.1, 1.2).normalize();
    let ray = Ray::new(start, direction).recording();

    let traversal = volume.march(&ray, None, 5).unwrap();
    let out = exited(&traversal.termination);

    assert!(traversal.trajectory.len() > 10);
    for point in &traversal.trajectory {
        let offset = point - start;
        assert_abs_diff_eq!(offset.cross(direction).magnitude(), 0.0, epsilon = 1e-9);
        assert!(offset.dot(direction) > 0.0);
    }
    assert_abs_diff_eq!((out.direction - direction).magnitude(), 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(traversal.max_constraint_error, 0.0, epsilon = 1e-12);
}

#[test]
fn test_homogeneous_anisotropic_slab_preserves_direction() {
    let slab = BoxBoundary::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(2.0, 2.0, 1.0));
    let volume = MetricVolume::new(
        slab,
        Medium::LinearShift { strength: 0.5 },
        MarchConfig::default().with_step_size(0.002),
    )
    .unwrap();
    let direction = Vec3::new(0.3, 0.0, 0.91f64.sqrt());
    let ray = Ray::new(Vec3::new(0.0, 0.0, -3.0), direction);

    let traversal = volume.march(&ray, None, 5).unwrap();
    let out = exited(&traversal.termination);

    assert_abs_diff_eq!(out.position.z, 1.0, epsilon = 1e-9);
    assert_abs_diff_eq!((out.direction - direction).magnitude(), 0.0, epsilon = 1e-9);
    // Energy runs along 2·n·k, not along k, so the ray is displaced sideways
    // further than a vacuum ray would be
    let entry_x = 0.3 / 0.91f64.sqrt() * 2.0;
    assert!(out.position.x > entry_x + 1.0);
}

#[test]
fn test_total_internal_reflection_inside_dense_box() {
    let cell = BoxBoundary::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 1.0, 3.0));
    let volume = MetricVolume::new(
        cell,
        Medium::Isotropic { index: 1.5 },
        MarchConfig::default().with_step_size(0.002),
    )
    .unwrap();
    // 53° from the x face normal, beyond the critical angle of 41.8°
    let ray = Ray::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(0.6, 0.0, 0.8)).recording();

    let traversal = volume.march(&ray, None, 5).unwrap();
    let out = exited(&traversal.termination);

    assert!(traversal
        .trajectory
        .iter()
        .any(|p| (p.x - 1.0).abs() < 1e-9 && (p.z - 4.0 / 3.0).abs() < 1e-6));
    assert_abs_diff_eq!(out.position.x, -0.25, epsilon = 1e-6);
    assert_abs_diff_eq!(out.position.z, 3.0, epsilon = 1e-9);
    let expected = Vec3::new(-0.9, 0.0, 0.19f64.sqrt());
    assert_abs_diff_eq!((out.direction - expected).magnitude(), 0.0, epsilon = 1e-6);
}

#[test]
fn test_luneburg_lens_focuses_on_far_surface() {
    let lens = Medium::Luneburg { center: Vec3::new(0.0, 0.0, 0.0), radius: 1.0 };
    let config = MarchConfig::default().with_step_size(0.0005).with_max_spatial_step(0.01);
    let volume = MetricVolume::new(unit_sphere(), lens, config).unwrap();

    for height in [0.2, 0.5, 0.8] {
        let ray = Ray::new(Vec3::new(height, 0.0, -3.0), Vec3::new(0.0, 0.0, 1.0));
        let traversal = volume.march(&ray, None, 5).unwrap();
        let out = exited(&traversal.termination);
        assert_abs_diff_eq!((out.position - Vec3::new(0.0, 0.0, 1.0)).magnitude(), 0.0, epsilon = 0.01);
        assert!(traversal.max_constraint_error < 1e-3);
    }
}

#[test]
fn test_constraint_preserved_through_graded_medium() {
    let medium = Medium::GradedIndex { base: 1.5, gradient: Vec3::new(0.05, 0.02, 0.0) };
    let config = MarchConfig::default().with_step_size(0.0004).with_max_steps(5000);
    let volume = MetricVolume::new(SphereBoundary::new(Vec3::new(0.0, 0.0, 0.0), 3.0), medium, config).unwrap();
    let ray = Ray::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(1.0, 0.2, 0.4));

    let traversal = volume.march(&ray, None, 5).unwrap();
    assert!(traversal.steps >= 1000, "took {} steps", traversal.steps);
    assert!(traversal.max_constraint_error < 1e-6);
}

#[test]
fn test_small_step_budget_returns_background() {
    let background = Colour::new(0.1, 0.2, 0.3);
    let config = MarchConfig::default()
        .with_step_size(1e-4)
        .with_max_steps(5)
        .with_background(background);
    let volume = MetricVolume::new(unit_sphere(), Medium::Vacuum, config).unwrap();
    let scene = Backdrop { colour: Colour::WHITE };
    let ray = Ray::new(Vec3::new(0.0, 0.0, -3.0), Vec3::new(0.0, 0.0, 1.0));
    let hit = entry_hit(&volume, &ray);

    assert_eq!(volume.shade(&ray, &hit, &scene, &[], 5), background);
    let traversal = volume.march(&ray, Some(hit.into()), 5).unwrap();
    assert_eq!(traversal.termination, Termination::BudgetExhausted);
    assert_eq!(traversal.steps, 5);

    // An exhausted recursion budget ends the same way
    assert_eq!(volume.shade(&ray, &hit, &scene, &[], 0), background);
}

#[test]
fn test_exit_applies_transmission_coefficient() {
    let config = MarchConfig::default().with_transmission(Colour::new(0.5, 1.0, 1.0));
    let volume = MetricVolume::new(unit_sphere(), Medium::Vacuum, config).unwrap();
    let scene = Backdrop { colour: Colour::grey(0.5) };
    let ray = Ray::new(Vec3::new(0.0, 0.0, -3.0), Vec3::new(0.0, 0.0, 1.0));
    let hit = entry_hit(&volume, &ray);

    assert_eq!(volume.shade(&ray, &hit, &scene, &[], 5), Colour::new(0.25, 0.5, 0.5));
}

#[test]
fn test_embedded_scene_takes_over_shading() {
    let ball = Ball { bounds: SphereBoundary::new(Vec3::new(0.0, 0.0, 0.0), 0.2) };
    let volume = MetricVolume::new(unit_sphere(), Medium::Vacuum, MarchConfig::default())
        .unwrap()
        .with_embedded(ball);
    let ray = Ray::new(Vec3::new(0.0, 0.0, -3.0), Vec3::new(0.0, 0.0, 1.0));

    let traversal = volume.march(&ray, None, 5).unwrap();
    match traversal.termination {
        Termination::Embedded { ray, hit } => {
            assert_eq!(hit.object, 7);
            assert!(hit.distance <= volume.config().max_spatial_step);
            assert!(ray.position.z < -0.2);
        }
        other => panic!("expected the embedded ball, got {other:?}"),
    }

    let scene = Backdrop { colour: Colour::WHITE };
    let hit = entry_hit(&volume, &ray);
    assert_eq!(volume.shade(&ray, &hit, &scene, &[], 5), Colour::new(0.0, 1.0, 0.0));
}

#[test]
fn test_inconsistent_medium_yields_sentinel_colour() {
    let volume = MetricVolume::new(unit_sphere(), Broken, MarchConfig::default()).unwrap();
    let ray = Ray::new(Vec3::new(0.0, 0.0, -3.0), Vec3::new(0.0, 0.0, 1.0));

    let result = volume.march(&ray, None, 5);
    assert!(matches!(result, Err(GeometricInconsistency::RootSelection { passing: 0, .. })));

    let scene = Backdrop { colour: Colour::WHITE };
    let hit = entry_hit(&volume, &ray);
    assert_eq!(volume.shade(&ray, &hit, &scene, &[], 5), Colour::SENTINEL);
}

#[test]
fn test_entry_reflection_skips_transmission() {
    // |kT| = 0.9 on entry exceeds the index 0.5 of the ball
    let config = MarchConfig::default().with_transmission(Colour::grey(0.5));
    let volume = MetricVolume::new(unit_sphere(), Medium::Isotropic { index: 0.5 }, config).unwrap();
    let ray = Ray::new(Vec3::new(0.9, 0.0, -3.0), Vec3::new(0.0, 0.0, 1.0));
    let hit = entry_hit(&volume, &ray);

    let traversal = volume.march(&ray, None, 5).unwrap();
    let reflected = match traversal.termination {
        Termination::Reflected(out) => out,
        other => panic!("expected a reflection off the surface, got {other:?}"),
    };
    let n = hit.normal;
    let mirrored = ray.direction - n * (2.0 * ray.direction.dot(n));
    assert_abs_diff_eq!((reflected.position - hit.point).magnitude(), 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!((reflected.direction - mirrored).magnitude(), 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(reflected.direction.x, 0.9 * 2.0 * 0.19f64.sqrt(), epsilon = 1e-12);
    assert_eq!(traversal.steps, 0);

    let scene = Backdrop { colour: Colour::grey(0.8) };
    assert_eq!(volume.shade(&ray, &hit, &scene, &[], 5), Colour::grey(0.8));
}

#[test]
fn test_constraint_drift_does_not_stop_the_march() {
    let lens = Medium::Luneburg { center: Vec3::new(0.0, 0.0, 0.0), radius: 1.0 };
    let config = MarchConfig::default()
        .with_integrator(Integrator::Euler)
        .with_step_size(0.05)
        .with_constraint_tolerance(1e-9);
    let volume = MetricVolume::new(unit_sphere(), lens, config).unwrap();
    let ray = Ray::new(Vec3::new(0.5, 0.0, -3.0), Vec3::new(0.0, 0.0, 1.0));

    let traversal = volume.march(&ray, None, 5).unwrap();
    exited(&traversal.termination);
    assert!(traversal.max_constraint_error > config.constraint_tolerance);
}
