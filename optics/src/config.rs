//! Settings of a metric volume, fixed once the volume is built.

use crate::error::ConfigError;
use crate::integrator::Integrator;
use crate::math::Colour;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarchConfig {
    /// Integration step dτ.
    pub step_size: f64,
    /// Longest straight segment committed in one iteration.
    pub max_spatial_step: f64,
    pub max_steps: u32,
    pub integrator: Integrator,
    /// Applied to the colour of rays leaving through the boundary.
    pub transmission: Colour,
    pub casts_shadow: bool,
    /// Returned when the step or recursion budget runs out.
    pub background: Colour,
    /// |H| above which a drift warning is logged.
    pub constraint_tolerance: f64,
    pub speed_of_light: f64,
}

impl Default for MarchConfig {
    fn default() -> Self {
        Self {
            step_size: 0.005,
            max_spatial_step: 0.05,
            max_steps: 10_000,
            integrator: Integrator::RungeKutta4,
            transmission: Colour::WHITE,
            casts_shadow: false,
            background: Colour::BLACK,
            constraint_tolerance: 0.1,
            speed_of_light: 1.0,
        }
    }
}

impl MarchConfig {
    pub fn with_step_size(mut self, step_size: f64) -> Self {
        self.step_size = step_size;
        self
    }

    pub fn with_max_spatial_step(mut self, max_spatial_step: f64) -> Self {
        self.max_spatial_step = max_spatial_step;
        self
    }

    pub fn with_max_steps(mut self, max_steps: u32) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn with_integrator(mut self, integrator: Integrator) -> Self {
        self.integrator = integrator;
        self
    }

    pub fn with_transmission(mut self, transmission: Colour) -> Self {
        self.transmission = transmission;
        self
    }

    pub fn with_shadows(mut self, casts_shadow: bool) -> Self {
        self.casts_shadow = casts_shadow;
        self
    }

    pub fn with_background(mut self, background: Colour) -> Self {
        self.background = background;
        self
    }

    pub fn with_constraint_tolerance(mut self, tolerance: f64) -> Self {
        self.constraint_tolerance = tolerance;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("step_size", self.step_size),
            ("max_spatial_step", self.max_spatial_step),
            ("constraint_tolerance", self.constraint_tolerance),
            ("speed_of_light", self.speed_of_light),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::NotPositive { name, value });
            }
        }
        if self.max_steps == 0 {
            return Err(ConfigError::NoSteps);
        }
        Ok(())
    }
}
