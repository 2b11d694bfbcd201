//! Headless runner: load particles, step frames, log what happens.

use clap::Parser;
use collider::config::{self, ArenaConfig, SimConfig};
use collider::core::{Simulation, Tick, Unpaced, SPEED_MAX, SPEED_MIN};
use collider::error::Result;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "collider", version, about = "Event-driven elastic collision simulator")]
struct Args {
    /// Particle list (`x y vx vy mass radius r g b` per line) or a `.toml` config
    file: Option<PathBuf>,

    /// TOML file with an `[arena]` table, overriding the defaults
    #[arg(long)]
    arena: Option<PathBuf>,

    /// Number of frames to simulate
    #[arg(long, default_value_t = 600)]
    frames: u64,

    /// Speed multiplier
    #[arg(long, default_value_t = SPEED_MIN, value_parser = clap::value_parser!(u32).range(i64::from(SPEED_MIN)..=i64::from(SPEED_MAX)))]
    speed: u32,

    /// Sleep between events to match wall-clock pacing
    #[arg(long)]
    realtime: bool,

    /// Add this many random particles
    #[arg(long)]
    random: Option<usize>,

    /// Seed for `--random`
    #[arg(long)]
    seed: Option<u64>,

    /// Log every frame
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(if args.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            if matches!(e, collider::error::Error::Config { .. }) {
                tracing::error!("Format: {}", config::FORMAT);
            }
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let mut sim = build(args)?;
    if !args.realtime {
        sim = sim.with_pacer(Unpaced);
    }
    for _ in SPEED_MIN..args.speed {
        sim.inc_speed();
    }

    tracing::info!(
        particles = sim.num_particles(),
        width = sim.width(),
        height = sim.height(),
        speed = sim.speed(),
        "starting simulation"
    );
    let energy0 = sim.kinetic_energy();

    for _ in 0..args.frames {
        if let Tick::Frame { time } = sim.step()? {
            for (i, d) in sim.disks().enumerate() {
                tracing::trace!(time, particle = i, x = d.x, y = d.y, r = d.radius, "disk");
            }
        }
    }

    let stats = sim.stats();
    tracing::info!(
        time = sim.time(),
        frames = stats.frames,
        wall_collisions = stats.wall_collisions,
        particle_collisions = stats.particle_collisions,
        stale_discarded = stats.stale_discarded,
        "simulation finished"
    );
    tracing::info!(
        start = energy0,
        end = sim.kinetic_energy(),
        "kinetic energy"
    );
    Ok(())
}

fn build(args: &Args) -> Result<Simulation> {
    let mut cfg = match &args.file {
        Some(path) if is_toml(path) => SimConfig::load(path)?,
        Some(path) => SimConfig {
            particles: config::load_particles(path)?,
            ..SimConfig::default()
        },
        None => SimConfig::default(),
    };
    if let Some(path) = &args.arena {
        cfg.arena = ArenaConfig::load(path)?;
    }
    tracing::info!("Loaded {} particles", cfg.particles.len());

    let mut sim = cfg.build()?;
    if let Some(n) = args.random {
        sim.add_random_particles(n, args.seed)?;
    }
    Ok(sim)
}

fn is_toml(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "toml")
}
