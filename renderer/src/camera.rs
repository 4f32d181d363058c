use cgmath::*;
use optics::{Ray, Vec3};

/// Pinhole camera looking from `eye` towards `target`.
pub struct Camera {
    pub eye: Point3<f64>,
    pub target: Point3<f64>,
    pub up: Vector3<f64>,
    pub aspect: f64,
    /// Vertical field of view in degrees.
    pub fovy: f64,
}

impl Camera {
    pub fn new<V: Into<Point3<f64>>, Y: Into<Point3<f64>>, U: Into<Vector3<f64>>>(
        eye: V,
        target: Y,
        up: U,
        aspect: f64,
        fovy: f64,
    ) -> Self {
        Self {
            eye: eye.into(),
            target: target.into(),
            up: up.into(),
            aspect,
            fovy,
        }
    }

    /// Forward, right and up unit vectors of the view.
    pub fn basis(&self) -> (Vec3, Vec3, Vec3) {
        let forward = (self.target - self.eye).normalize();
        let right = forward.cross(self.up).normalize();
        let up = right.cross(forward);
        (forward, right, up)
    }

    /// Primary ray through normalised screen coordinates, (0, 0) being the
    /// top-left corner and (1, 1) the bottom-right.
    pub fn ray(&self, u: f64, v: f64) -> Ray {
        let (forward, right, up) = self.basis();
        let half_height = (Deg(self.fovy) / 2.0).tan();
        let half_width = half_height * self.aspect;

        let x = (2.0 * u - 1.0) * half_width;
        let y = (1.0 - 2.0 * v) * half_height;
        Ray::new(self.eye.to_vec(), forward + right * x + up * y)
    }
}
