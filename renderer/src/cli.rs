use clap::{Parser, ValueEnum};
use log::LevelFilter;
use optics::{Integrator, MarchConfig, Medium, Vec3};

/// Log levels selectable from the command line
#[derive(Debug, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Medium filling the metric sphere of the demo scene
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum MediumChoice {
    Vacuum,
    Glass,
    Graded,
    Luneburg,
    LinearShift,
    QuadraticShift,
    XShift,
    YShift,
}

impl MediumChoice {
    pub fn medium(self, strength: f64) -> Medium {
        match self {
            MediumChoice::Vacuum => Medium::Vacuum,
            MediumChoice::Glass => Medium::Isotropic { index: 1.0 + strength },
            MediumChoice::Graded => Medium::GradedIndex {
                base: 1.3,
                gradient: Vec3::new(0.0, strength, 0.0),
            },
            // Must match the sphere in the demo scene
            MediumChoice::Luneburg => Medium::Luneburg {
                center: Vec3::new(0.0, 0.2, 0.0),
                radius: 1.2,
            },
            MediumChoice::LinearShift => Medium::LinearShift { strength },
            MediumChoice::QuadraticShift => Medium::QuadraticShift { strength },
            MediumChoice::XShift => Medium::XShift { strength },
            MediumChoice::YShift => Medium::YShift { strength },
        }
    }
}

#[derive(Parser)]
#[command(name = "renderer")]
#[command(about = "Render a scene containing a metric volume")]
pub struct Args {
    /// Set the logging level (defaults to "info")
    #[arg(long, default_value = "info", help = "Set the logging level")]
    pub debug_level: LogLevel,

    /// Image width in pixels
    #[arg(long, default_value = "320")]
    pub width: u32,

    /// Image height in pixels
    #[arg(long, default_value = "240")]
    pub height: u32,

    #[arg(short, long, default_value = "metric.png")]
    pub output: String,

    #[arg(short, long, value_enum, default_value = "glass")]
    pub medium: MediumChoice,

    /// Shear strength or index excess, depending on the medium
    #[arg(long, default_value = "0.5")]
    pub strength: f64,

    /// euler or rk4
    #[arg(long, default_value = "rk4")]
    pub integrator: Integrator,

    /// Integration step dτ
    #[arg(long, default_value = "0.005")]
    pub step_size: f64,

    #[arg(long, default_value = "0.05")]
    pub max_spatial_step: f64,

    #[arg(long, default_value = "10000")]
    pub max_steps: u32,

    /// Recursion budget per primary ray
    #[arg(long, default_value = "5")]
    pub depth: u32,

    /// Let the metric volume block light
    #[arg(long)]
    pub shadows: bool,
}

impl Args {
    pub fn march_config(&self) -> MarchConfig {
        MarchConfig::default()
            .with_step_size(self.step_size)
            .with_max_spatial_step(self.max_spatial_step)
            .with_max_steps(self.max_steps)
            .with_integrator(self.integrator)
            .with_shadows(self.shadows)
    }
}
