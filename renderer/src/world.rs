//! Scene graph for the renderer: solid primitives, metric volumes and point
//! lights.

use cgmath::InnerSpace;
use optics::{Colour, Intersection, Light, MetricVolume, Ray, Scene, Vec3};

use crate::geometry::{Shape, HIT_EPSILON};

/// How a solid primitive responds to light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Surface {
    Matte { colour: Colour },
    /// Alternating squares of side `scale` in the xz plane.
    Checker { even: Colour, odd: Colour, scale: f64 },
    Mirror { tint: Colour },
}

impl Surface {
    fn albedo(&self, point: Vec3) -> Colour {
        match *self {
            Surface::Matte { colour } => colour,
            Surface::Checker { even, odd, scale } => {
                let cell = (point.x / scale).floor() + (point.z / scale).floor();
                if cell.rem_euclid(2.0) < 1.0 {
                    even
                } else {
                    odd
                }
            }
            Surface::Mirror { tint } => tint,
        }
    }
}

enum Object {
    Solid { shape: Shape, surface: Surface },
    Metric(MetricVolume),
}

pub struct World {
    objects: Vec<Object>,
    lights: Vec<Light>,
    pub horizon: Colour,
    pub zenith: Colour,
    pub ambient: f64,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            lights: Vec::new(),
            horizon: Colour::new(0.8, 0.85, 0.9),
            zenith: Colour::new(0.25, 0.45, 0.8),
            ambient: 0.1,
        }
    }

    /// Returns the object index reported in intersections.
    pub fn add_solid(&mut self, shape: Shape, surface: Surface) -> usize {
        self.objects.push(Object::Solid { shape, surface });
        self.objects.len() - 1
    }

    pub fn add_metric(&mut self, volume: MetricVolume) -> usize {
        self.objects.push(Object::Metric(volume));
        self.objects.len() - 1
    }

    pub fn add_light(&mut self, light: Light) {
        self.lights.push(light);
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    /// Colour seen along a primary ray.
    pub fn trace(&self, ray: &Ray, trace_level: u32) -> Colour {
        match self.intersect(ray) {
            Some(hit) => self.shade(ray, &hit, &self.lights, trace_level),
            None => self.background(ray),
        }
    }

    fn hit_object(&self, index: usize, object: &Object, ray: &Ray) -> Option<Intersection> {
        let (distance, normal) = match object {
            Object::Solid { shape, .. } => shape.intersect(ray)?,
            Object::Metric(volume) => {
                let crossing = volume.boundary().intersect(ray.position, ray.direction)?;
                (crossing.distance, crossing.normal)
            }
        };
        Some(Intersection {
            distance,
            point: ray.at(distance),
            normal,
            object: index,
        })
    }

    /// Whether anything opaque lies between `point` and `target`.
    fn occluded(&self, point: Vec3, target: Vec3) -> bool {
        let offset = target - point;
        let distance = offset.magnitude();
        let ray = Ray::new(point, offset / distance);
        self.objects.iter().enumerate().any(|(index, object)| {
            let blocks = match object {
                Object::Solid { .. } => true,
                Object::Metric(volume) => volume.casts_shadow(),
            };
            blocks && self
                .hit_object(index, object, &ray)
                .map_or(false, |hit| hit.distance < distance)
        })
    }

    fn shade_solid(&self, ray: &Ray, hit: &Intersection, surface: &Surface, lights: &[Light], trace_level: u32) -> Colour {
        let origin = hit.point + hit.normal * HIT_EPSILON;
        if let Surface::Mirror { tint } = surface {
            if trace_level <= 1 {
                return self.background(ray) * *tint;
            }
            let d = ray.direction;
            let reflected = Ray::new(origin, d - hit.normal * (2.0 * d.dot(hit.normal)));
            return self.trace(&reflected, trace_level - 1) * *tint;
        }

        let albedo = surface.albedo(hit.point);
        let mut colour = albedo * self.ambient;
        for light in lights {
            let to_light = light.position - hit.point;
            let lambert = hit.normal.dot(to_light.normalize());
            if lambert <= 0.0 || self.occluded(origin, light.position) {
                continue;
            }
            colour = colour + albedo * light.colour * lambert;
        }
        colour
    }
}

impl Scene for World {
    fn intersect(&self, ray: &Ray) -> Option<Intersection> {
        self.objects
            .iter()
            .enumerate()
            .filter_map(|(index, object)| self.hit_object(index, object, ray))
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }

    fn shade(&self, ray: &Ray, hit: &Intersection, lights: &[Light], trace_level: u32) -> Colour {
        match self.objects.get(hit.object) {
            Some(Object::Solid { surface, .. }) => self.shade_solid(ray, hit, surface, lights, trace_level),
            Some(Object::Metric(volume)) => volume.shade(ray, hit, self, lights, trace_level),
            None => {
                log::warn!("Intersection refers to unknown object {}", hit.object);
                self.background(ray)
            }
        }
    }

    fn background(&self, ray: &Ray) -> Colour {
        let t = 0.5 * (ray.direction.y + 1.0);
        self.horizon * (1.0 - t) + self.zenith * t
    }
}
