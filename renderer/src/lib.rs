pub mod camera;
pub mod geometry;
pub mod profiler;
pub mod world;

use image::{Rgb, RgbImage};
use optics::{Colour, ConfigError, Light, MarchConfig, Medium, MetricVolume, SphereBoundary, Vec3};

use camera::Camera;
use geometry::{Plane, Shape, Sphere};
use profiler::Profiler;
use world::{Surface, World};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderSettings {
    pub width: u32,
    pub height: u32,
    /// Recursion budget handed to every primary ray.
    pub trace_level: u32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            width: 320,
            height: 240,
            trace_level: 5,
        }
    }
}

/// Trace one ray through the centre of every pixel.
pub fn render(world: &World, camera: &Camera, settings: &RenderSettings, profiler: &mut Profiler) -> RgbImage {
    let mut image = RgbImage::new(settings.width, settings.height);
    profiler.begin_frame();
    for y in 0..settings.height {
        profiler.begin_row(y);
        let v = (y as f64 + 0.5) / settings.height as f64;
        for x in 0..settings.width {
            let u = (x as f64 + 0.5) / settings.width as f64;
            let colour = world.trace(&camera.ray(u, v), settings.trace_level);
            image.put_pixel(x, y, Rgb(colour.to_rgb8()));
        }
        profiler.end_row();
    }
    profiler.end_frame();
    image
}

/// A metric sphere filled with `medium` sitting in front of a checkerboard,
/// flanked by a matte ball and a mirror ball.
pub fn demo_scene(medium: Medium, config: MarchConfig) -> Result<World, ConfigError> {
    let mut world = World::new();
    world.add_solid(
        Shape::Plane(Plane::new(Vec3::new(0.0, -1.0, 0.0), Vec3::new(0.0, 1.0, 0.0))),
        Surface::Checker {
            even: Colour::grey(0.9),
            odd: Colour::new(0.2, 0.25, 0.3),
            scale: 1.0,
        },
    );
    world.add_solid(
        Shape::Plane(Plane::new(Vec3::new(0.0, 0.0, 6.0), Vec3::new(0.0, 0.0, -1.0))),
        Surface::Checker {
            even: Colour::new(0.9, 0.8, 0.3),
            odd: Colour::new(0.3, 0.1, 0.1),
            scale: 0.5,
        },
    );
    world.add_solid(
        Shape::Sphere(Sphere::new(Vec3::new(-2.6, -0.4, 2.0), 0.6)),
        Surface::Matte {
            colour: Colour::new(0.8, 0.3, 0.2),
        },
    );
    world.add_solid(
        Shape::Sphere(Sphere::new(Vec3::new(2.6, -0.4, 2.0), 0.6)),
        Surface::Mirror {
            tint: Colour::grey(0.85),
        },
    );

    let volume = MetricVolume::new(SphereBoundary::new(Vec3::new(0.0, 0.2, 0.0), 1.2), medium, config)?;
    world.add_metric(volume);

    world.add_light(Light::new(Vec3::new(-4.0, 6.0, -4.0), Colour::grey(0.8)));
    world.add_light(Light::new(Vec3::new(5.0, 4.0, -2.0), Colour::grey(0.4)));
    Ok(world)
}

/// Camera framing [`demo_scene`].
pub fn demo_camera(aspect: f64) -> Camera {
    Camera::new((0.0, 1.0, -6.0), (0.0, 0.0, 0.0), cgmath::Vector3::unit_y(), aspect, 45.0)
}
