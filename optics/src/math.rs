//! Vector and tensor helpers shared by the whole crate.

use cgmath::{InnerSpace, Matrix3, Vector3};
use std::ops::{Add, Mul};

/// Position, wavevector and direction type.
pub type Vec3 = Vector3<f64>;

/// 3x3 tensor. Every tensor produced by a medium is symmetric, so the
/// column-major layout of cgmath never matters for the physics.
pub type Tensor = Matrix3<f64>;

/// Outer product a·bᵗ.
pub fn outer(a: Vec3, b: Vec3) -> Tensor {
    Matrix3::from_cols(a * b.x, a * b.y, a * b.z)
}

/// Bilinear form aᵗ·n·b.
pub fn quad_form(n: &Tensor, a: Vec3, b: Vec3) -> f64 {
    a.dot(*n * b)
}

/// Component of `k` perpendicular to the unit normal.
pub fn tangential(k: Vec3, normal: Vec3) -> Vec3 {
    k - normal * k.dot(normal)
}

pub fn is_finite(v: Vec3) -> bool {
    v.x.is_finite() && v.y.is_finite() && v.z.is_finite()
}

/// Unit basis vector along axis `i` (0 = x, 1 = y, 2 = z).
pub fn axis(i: usize) -> Vec3 {
    let mut e = Vec3::new(0.0, 0.0, 0.0);
    e[i] = 1.0;
    e
}

/// Linear RGB colour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Colour {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Colour {
    pub const BLACK: Colour = Colour::new(0.0, 0.0, 0.0);
    pub const WHITE: Colour = Colour::new(1.0, 1.0, 1.0);
    /// Returned for rays the physics could not resolve, so they stand out in
    /// a finished image.
    pub const SENTINEL: Colour = Colour::new(1.0, 0.0, 1.0);

    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    pub const fn grey(v: f64) -> Self {
        Self::new(v, v, v)
    }

    /// Clamp to [0, 1], gamma-encode with gamma 2 and quantise to 8 bits.
    pub fn to_rgb8(self) -> [u8; 3] {
        let encode = |c: f64| (c.clamp(0.0, 1.0).sqrt() * 255.0).round() as u8;
        [encode(self.r), encode(self.g), encode(self.b)]
    }
}

impl Default for Colour {
    fn default() -> Self {
        Colour::BLACK
    }
}

impl Mul for Colour {
    type Output = Colour;

    fn mul(self, rhs: Colour) -> Colour {
        Colour::new(self.r * rhs.r, self.g * rhs.g, self.b * rhs.b)
    }
}

impl Mul<f64> for Colour {
    type Output = Colour;

    fn mul(self, rhs: f64) -> Colour {
        Colour::new(self.r * rhs, self.g * rhs, self.b * rhs)
    }
}

impl Add for Colour {
    type Output = Colour;

    fn add(self, rhs: Colour) -> Colour {
        Colour::new(self.r + rhs.r, self.g + rhs.g, self.b + rhs.b)
    }
}
