//! Failure taxonomy of the marcher.
//!
//! Evanescent waves and exhausted budgets are ordinary outcomes and are
//! handled inside the marching loop. A [`GeometricInconsistency`] means the
//! physical model contradicted itself for one ray; it is reported and turned
//! into a sentinel colour, never propagated past that ray.

use thiserror::Error;

/// Result alias for refraction at an interface.
pub type RefractionResult<T> = Result<T, RefractionError>;

/// The physical model is self-contradictory at a point.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometricInconsistency {
    #[error("{passing} of 2 refraction roots cross the interface the required way (kT = {tangential:?})")]
    RootSelection { passing: usize, tangential: [f64; 3] },
    #[error("step from {from:?} leaves the volume but no boundary crossing was found")]
    MissingCrossing { from: [f64; 3] },
    #[error("no real wavevector along {direction:?} at {position:?}")]
    NoWavevector {
        position: [f64; 3],
        direction: [f64; 3],
    },
    #[error("integration produced a non-finite state at {position:?}")]
    NonFinite { position: [f64; 3] },
    #[error("step from {position:?} stays {length} long however far dτ is shrunk")]
    UncontrolledStep { position: [f64; 3], length: f64 },
}

/// Why a wavevector could not be transmitted through an interface.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RefractionError {
    /// No real transmitted wavevector exists: total internal reflection.
    #[error("transmitted wave is evanescent")]
    Evanescent,
    #[error(transparent)]
    Inconsistent(#[from] GeometricInconsistency),
}

/// Rejected marcher configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{name} must be finite and positive, got {value}")]
    NotPositive { name: &'static str, value: f64 },
    #[error("max_steps must be at least 1")]
    NoSteps,
}
