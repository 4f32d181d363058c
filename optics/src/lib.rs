//! The optics crate handles the heavy lifting of Hamiltonian optics,
//! marching light rays through anisotropic, spatially varying media bounded
//! by closed surfaces and refracting them at those surfaces.

pub mod boundary;
pub mod config;
pub mod error;
pub mod field;
pub mod hamiltonian;
pub mod integrator;
pub mod interface;
pub mod marcher;
pub mod math;
pub mod medium;
pub mod ray;
pub mod refraction;
pub mod scene;

pub use boundary::{BoundaryCrossing, BoundarySurface, BoxBoundary, SphereBoundary};
pub use config::MarchConfig;
pub use error::{ConfigError, GeometricInconsistency, RefractionError};
pub use field::TensorField;
pub use integrator::Integrator;
pub use interface::{FlatInterface, PathConvention, Transition};
pub use marcher::{IntegrationState, MetricVolume, Termination, Traversal};
pub use math::{Colour, Tensor, Vec3};
pub use medium::Medium;
pub use ray::Ray;
pub use scene::{Intersection, Light, Scene};
