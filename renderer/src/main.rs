use anyhow::Context;
use clap::Parser;
use log::info;

mod cli;

use cli::Args;
use renderer::profiler::Profiler;
use renderer::{demo_camera, demo_scene, render, RenderSettings};

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.debug_level.clone().into())
        .init();

    let config = args.march_config();
    let medium = args.medium.medium(args.strength);
    info!("Medium {:?}, {} integrator, dτ = {}", medium, config.integrator, config.step_size);

    let world = demo_scene(medium, config).context("invalid march configuration")?;
    let camera = demo_camera(args.width as f64 / args.height.max(1) as f64);
    let settings = RenderSettings {
        width: args.width,
        height: args.height,
        trace_level: args.depth,
    };

    let mut profiler = Profiler::new();
    let image = render(&world, &camera, &settings, &mut profiler);
    image
        .save(&args.output)
        .with_context(|| format!("failed to write {}", args.output))?;
    info!("Wrote {}", args.output);
    Ok(())
}
