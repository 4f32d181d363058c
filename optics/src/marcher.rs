//! Ray marching through a metric volume.
//!
//! A ray handed to [`MetricVolume::shade`] is refracted into the volume,
//! integrated along Hamilton's equations until it reaches the boundary again,
//! and refracted out (or totally internally reflected and marched on). Every
//! iteration produces a fresh [`IntegrationState`]; nothing is mutated in
//! place, so the state machine runs without the rest of the renderer.

use cgmath::InnerSpace;

use crate::boundary::{BoundaryCrossing, BoundarySurface};
use crate::config::MarchConfig;
use crate::error::{ConfigError, GeometricInconsistency, RefractionError};
use crate::field::TensorField;
use crate::hamiltonian::{calculate_k, hamiltonian};
use crate::math::{is_finite, Colour, Vec3};
use crate::ray::Ray;
use crate::refraction::{reflect_in_vacuum, refract, refract_into_vacuum, Propagation};
use crate::scene::{Intersection, Light, Scene};

/// Attempts at shrinking dτ until a step fits the spatial limit.
const MAX_RESCALES: usize = 8;

/// Relative overshoot of `max_spatial_step` tolerated once rescaling stops.
const STEP_SLACK: f64 = 1e-6;

/// Slack allowed between the chord length and the distance to the boundary
/// crossing found along it.
const CROSSING_SLACK: f64 = 1e-6;

/// Position and wavevector of a ray inside the volume, with its budgets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntegrationState {
    pub position: Vec3,
    pub wavevector: Vec3,
    pub time: f64,
    pub steps_remaining: u32,
    /// Recursion budget the traversal was started with. The marcher checks it
    /// once on entry; it is carried along for callers inspecting the state.
    pub trace_level: u32,
}

impl IntegrationState {
    /// State after moving by `dx` and changing the wavevector by `dk`.
    ///
    /// Travel time advances by −k·Δx / c.
    pub fn advanced(&self, dx: Vec3, dk: Vec3, speed_of_light: f64) -> Self {
        Self {
            position: self.position + dx,
            wavevector: self.wavevector + dk,
            time: self.time - self.wavevector.dot(dx) / speed_of_light,
            steps_remaining: self.steps_remaining.saturating_sub(1),
            trace_level: self.trace_level,
        }
    }

    /// Same as [`advanced`](Self::advanced) but landing exactly on `point`.
    pub fn landed(&self, point: Vec3, dk: Vec3, speed_of_light: f64) -> Self {
        self.advanced(point - self.position, dk, speed_of_light)
    }

    /// Ray leaving this state along `direction` without leaving the medium.
    fn probe(&self, direction: Vec3, record_trajectory: bool) -> Ray {
        Ray {
            position: self.position,
            direction,
            wavevector: self.wavevector,
            time: self.time,
            record_trajectory,
        }
    }
}

/// How a traversal of the volume ended.
#[derive(Debug, Clone, PartialEq)]
pub enum Termination {
    /// Refracted out through the boundary.
    Exited(Ray),
    /// Totally reflected on the vacuum side while trying to enter.
    Reflected(Ray),
    /// Started outside and never met the boundary.
    Missed(Ray),
    /// About to hit an object of the embedded sub-scene.
    Embedded { ray: Ray, hit: Intersection },
    /// Ran out of steps or recursion levels.
    BudgetExhausted,
}

/// Result of one pass through the volume.
#[derive(Debug, Clone, PartialEq)]
pub struct Traversal {
    pub termination: Termination,
    /// Integration steps taken, including landings on the boundary.
    pub steps: u32,
    /// Positions visited, when the ray asked for them.
    pub trajectory: Vec<Vec3>,
    /// Largest |H(x,k)| seen along the way.
    pub max_constraint_error: f64,
}

enum MarchState {
    InsideVolume(IntegrationState),
    AtBoundary(IntegrationState, BoundaryCrossing),
    Terminated(Termination),
}

/// Bookkeeping shared by all iterations of one traversal.
struct Progress {
    record: bool,
    trajectory: Vec<Vec3>,
    steps: u32,
    max_error: f64,
    warned: bool,
}

/// A region of space filled with a tensor medium and bounded by a closed
/// surface.
pub struct MetricVolume {
    boundary: Box<dyn BoundarySurface>,
    field: Box<dyn TensorField>,
    embedded: Option<Box<dyn Scene>>,
    config: MarchConfig,
}

impl MetricVolume {
    pub fn new<B, F>(boundary: B, field: F, config: MarchConfig) -> Result<Self, ConfigError>
    where
        B: BoundarySurface + 'static,
        F: TensorField + 'static,
    {
        config.validate()?;
        Ok(Self {
            boundary: Box::new(boundary),
            field: Box::new(field),
            embedded: None,
            config,
        })
    }

    /// Place a sub-scene inside the volume. Rays about to hit it are handed
    /// over to it for shading.
    pub fn with_embedded<S: Scene + 'static>(mut self, scene: S) -> Self {
        self.embedded = Some(Box::new(scene));
        self
    }

    pub fn config(&self) -> &MarchConfig {
        &self.config
    }

    pub fn boundary(&self) -> &dyn BoundarySurface {
        self.boundary.as_ref()
    }

    pub fn casts_shadow(&self) -> bool {
        self.config.casts_shadow
    }

    /// Colour seen along `ray`, which hits the volume's boundary at `hit`.
    ///
    /// Never fails: budgets running out give the background colour, and a
    /// geometrically inconsistent ray gives [`Colour::SENTINEL`].
    pub fn shade(
        &self,
        ray: &Ray,
        hit: &Intersection,
        scene: &dyn Scene,
        lights: &[Light],
        trace_level: u32,
    ) -> Colour {
        let traversal = match self.march(ray, Some((*hit).into()), trace_level) {
            Ok(traversal) => traversal,
            Err(err) => {
                log::error!("Metric volume gave up on ray from {:?}: {}", ray.position, err);
                return Colour::SENTINEL;
            }
        };
        log::debug!(
            "Metric traversal: {} steps, max |H| = {:.3e}, {:?}",
            traversal.steps,
            traversal.max_constraint_error,
            traversal.termination
        );

        let next_level = trace_level.saturating_sub(1);
        match traversal.termination {
            Termination::Exited(out) => {
                self.continue_in(scene, &out, lights, next_level) * self.config.transmission
            }
            Termination::Reflected(out) | Termination::Missed(out) => {
                self.continue_in(scene, &out, lights, next_level)
            }
            Termination::Embedded { ray, hit } => match &self.embedded {
                Some(sub_scene) if next_level > 0 => sub_scene.shade(&ray, &hit, lights, next_level),
                _ => self.config.background,
            },
            Termination::BudgetExhausted => self.config.background,
        }
    }

    fn continue_in(&self, scene: &dyn Scene, ray: &Ray, lights: &[Light], trace_level: u32) -> Colour {
        if trace_level == 0 {
            return self.config.background;
        }
        match scene.intersect(ray) {
            Some(hit) => scene.shade(ray, &hit, lights, trace_level),
            None => scene.background(ray),
        }
    }

    /// Trace `ray` through the volume once.
    ///
    /// A ray starting outside enters at `entry` when given, otherwise at the
    /// first boundary crossing along its direction.
    pub fn march(
        &self,
        ray: &Ray,
        entry: Option<BoundaryCrossing>,
        trace_level: u32,
    ) -> Result<Traversal, GeometricInconsistency> {
        let mut progress = Progress {
            record: ray.record_trajectory,
            trajectory: Vec::new(),
            steps: 0,
            max_error: 0.0,
            warned: false,
        };

        let mut state = self.enter(ray, entry, trace_level, &mut progress)?;
        let termination = loop {
            state = match state {
                MarchState::InsideVolume(current) => self.step(current, ray, &mut progress)?,
                MarchState::AtBoundary(current, crossing) => self.cross(current, crossing, ray, &mut progress)?,
                MarchState::Terminated(termination) => break termination,
            };
        };

        Ok(Traversal {
            termination,
            steps: progress.steps,
            trajectory: progress.trajectory,
            max_constraint_error: progress.max_error,
        })
    }

    fn enter(
        &self,
        ray: &Ray,
        entry: Option<BoundaryCrossing>,
        trace_level: u32,
        progress: &mut Progress,
    ) -> Result<MarchState, GeometricInconsistency> {
        if trace_level == 0 {
            return Ok(MarchState::Terminated(Termination::BudgetExhausted));
        }
        let start = |position: Vec3, wavevector: Vec3, time: f64| IntegrationState {
            position,
            wavevector,
            time,
            steps_remaining: self.config.max_steps,
            trace_level,
        };

        if self.boundary.contains(ray.position) {
            let k = calculate_k(self.field.as_ref(), ray.position, ray.wavevector)?;
            let state = start(ray.position, k, ray.time);
            self.observe(&state, progress);
            return Ok(MarchState::InsideVolume(state));
        }

        let crossing = match entry.or_else(|| self.boundary.intersect(ray.position, ray.direction)) {
            Some(crossing) => crossing,
            None => return Ok(MarchState::Terminated(Termination::Missed(*ray))),
        };
        let incident = ray.direction;
        let time = ray.time - incident.dot(crossing.point - ray.position) / self.config.speed_of_light;
        let tensor = self.field.tensor_at(crossing.point);

        match refract(incident, crossing.normal, &tensor, Propagation::Inward) {
            Ok(k) => {
                let state = start(crossing.point, k, time);
                self.observe(&state, progress);
                Ok(MarchState::InsideVolume(state))
            }
            Err(RefractionError::Evanescent) => {
                log::trace!("Entry at {:?} is evanescent, reflecting", crossing.point);
                let reflected = reflect_in_vacuum(incident, crossing.normal);
                Ok(MarchState::Terminated(Termination::Reflected(ray.continued(
                    crossing.point,
                    reflected,
                    time,
                ))))
            }
            Err(RefractionError::Inconsistent(err)) => Err(err),
        }
    }

    fn step(&self, state: IntegrationState, ray: &Ray, progress: &mut Progress) -> Result<MarchState, GeometricInconsistency> {
        if state.steps_remaining == 0 {
            return Ok(MarchState::Terminated(Termination::BudgetExhausted));
        }
        let config = &self.config;
        let field = self.field.as_ref();
        let (x, k) = (state.position, state.wavevector);

        let mut dtau = config.step_size;
        let (mut dx, mut dk) = config.integrator.step(field, x, k, dtau);
        if !is_finite(dx) || !is_finite(dk) {
            return Err(GeometricInconsistency::NonFinite { position: x.into() });
        }

        if let Some(scene) = &self.embedded {
            let length = dx.magnitude();
            if length > 0.0 {
                let probe = state.probe(dx / length, ray.record_trajectory);
                if let Some(hit) = scene.intersect(&probe) {
                    if hit.distance <= config.max_spatial_step {
                        log::trace!("Embedded object {} hit from {:?}", hit.object, x);
                        return Ok(MarchState::Terminated(Termination::Embedded { ray: probe, hit }));
                    }
                }
            }
        }

        for _ in 0..MAX_RESCALES {
            let length = dx.magnitude();
            if length <= config.max_spatial_step {
                break;
            }
            dtau *= config.max_spatial_step / length;
            (dx, dk) = config.integrator.step(field, x, k, dtau);
        }

        let length = dx.magnitude();
        if !is_finite(dx) || !is_finite(dk) {
            return Err(GeometricInconsistency::NonFinite { position: x.into() });
        }
        if length > config.max_spatial_step * (1.0 + STEP_SLACK) {
            return Err(GeometricInconsistency::UncontrolledStep {
                position: x.into(),
                length,
            });
        }
        if length > 0.0 && !self.boundary.contains(x + dx) {
            let crossing = self
                .boundary
                .exit(x, dx / length)
                .filter(|crossing| crossing.distance <= length * (1.0 + CROSSING_SLACK))
                .ok_or(GeometricInconsistency::MissingCrossing { from: x.into() })?;

            // Shorten the step to land on the boundary
            let (_, dk) = config.integrator.step(field, x, k, dtau * crossing.distance / length);
            let landed = state.landed(crossing.point, dk, config.speed_of_light);
            progress.steps += 1;
            self.observe(&landed, progress);
            log::trace!("Reached boundary at {:?}", crossing.point);
            return Ok(MarchState::AtBoundary(landed, crossing));
        }

        let next = state.advanced(dx, dk, config.speed_of_light);
        progress.steps += 1;
        self.observe(&next, progress);
        log::trace!("Step {}: x = {:?}, k = {:?}", progress.steps, next.position, next.wavevector);
        Ok(MarchState::InsideVolume(next))
    }

    fn cross(
        &self,
        state: IntegrationState,
        crossing: BoundaryCrossing,
        ray: &Ray,
        progress: &mut Progress,
    ) -> Result<MarchState, GeometricInconsistency> {
        match refract_into_vacuum(state.wavevector, crossing.normal) {
            Ok(k_out) => Ok(MarchState::Terminated(Termination::Exited(ray.continued(
                crossing.point,
                k_out,
                state.time,
            )))),
            Err(RefractionError::Evanescent) => {
                if state.steps_remaining == 0 {
                    return Ok(MarchState::Terminated(Termination::BudgetExhausted));
                }
                let tensor = self.field.tensor_at(crossing.point);
                let wavevector = match refract(state.wavevector, crossing.normal, &tensor, Propagation::Inward) {
                    Ok(reflected) => reflected,
                    // A wave running along the surface keeps its wavevector
                    Err(RefractionError::Evanescent) => state.wavevector,
                    Err(RefractionError::Inconsistent(err)) => return Err(err),
                };
                log::trace!("Total internal reflection at {:?}", crossing.point);
                let reflected = IntegrationState {
                    wavevector,
                    steps_remaining: state.steps_remaining - 1,
                    ..state
                };
                self.observe(&reflected, progress);
                Ok(MarchState::InsideVolume(reflected))
            }
            Err(RefractionError::Inconsistent(err)) => Err(err),
        }
    }

    /// Record the state and check that H(x,k) stays near zero.
    ///
    /// Drift is reported once per traversal but never stops the march.
    fn observe(&self, state: &IntegrationState, progress: &mut Progress) {
        if progress.record {
            progress.trajectory.push(state.position);
        }
        let error = hamiltonian(self.field.as_ref(), state.position, state.wavevector).abs();
        progress.max_error = progress.max_error.max(error);
        if error > self.config.constraint_tolerance && !progress.warned {
            progress.warned = true;
            log::warn!(
                "Hamiltonian drifted to {:.3e} at {:?} (tolerance {})",
                error,
                state.position,
                self.config.constraint_tolerance
            );
        }
    }
}
