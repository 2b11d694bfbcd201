//! Loading particle lists and arena settings.
//!
//! Two sources are supported:
//! - the plain particle list, one particle per line:
//!   `<x> <y> <vx> <vy> <mass> <radius> <r> <g> <b>`, `#` starts a comment line and
//!   the first blank line ends the list;
//! - a TOML file with an optional `[arena]` table and `[[particles]]` entries.
//!
//! Both are range-checked here so the engine only ever sees validated values.

use crate::core::particle::{Color, ParticleSpec};
use crate::core::Simulation;
use crate::error::{Error, Result};
use serde::Deserialize;
use std::fmt::Display;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// Human-readable layout of one particle line.
pub const FORMAT: &str = "<x> <y> <vx> <vy> <mass> <radius> <r> <g> <b>";

/// Arena size and refresh rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            width: 400,
            height: 400,
            fps: 100,
        }
    }
}

impl ArenaConfig {
    /// Load an arena table from a TOML file holding `[arena]`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(SimConfig::from_toml_str(&text)?.arena)
    }
}

/// Full simulation setup as read from TOML.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub arena: ArenaConfig,
    pub particles: Vec<ParticleSpec>,
}

impl SimConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let cfg: SimConfig = toml::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "loading TOML config");
        Self::from_toml_str(&fs::read_to_string(path)?)
    }

    /// Apply the particle list ranges to every `[[particles]]` entry.
    pub fn validate(&self) -> Result<()> {
        for (k, spec) in self.particles.iter().enumerate() {
            validate_spec(spec)
                .map_err(|msg| Error::InvalidParam(format!("particle {}: {msg}", k + 1)))?;
        }
        Ok(())
    }

    /// Create a simulation for the arena and add every particle in order.
    pub fn build(&self) -> Result<Simulation> {
        let mut sim = Simulation::new(self.arena.width, self.arena.height, self.arena.fps)?;
        for spec in &self.particles {
            sim.add_particle(spec)?;
        }
        Ok(sim)
    }
}

/// Read a particle list file.
pub fn load_particles(path: impl AsRef<Path>) -> Result<Vec<ParticleSpec>> {
    let path = path.as_ref();
    debug!(path = %path.display(), "loading particle list");
    parse_particles(&fs::read_to_string(path)?)
}

/// Parse particle list text.
pub fn parse_particles(text: &str) -> Result<Vec<ParticleSpec>> {
    let mut specs = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if line.starts_with('#') {
            continue;
        }
        specs.push(parse_line(line, idx + 1)?);
    }
    Ok(specs)
}

fn parse_line(line: &str, line_no: usize) -> Result<ParticleSpec> {
    let mut tokens = line.split_whitespace();
    let mut next = |name: &str| tokens.next().map(str::to_owned).ok_or_else(|| name.to_owned());
    let err = |msg: String| Error::Config { line: line_no, msg };

    let x = read_value(next("X coordinate"), "X coordinate", 0.0, 1.0).map_err(err)?;
    let y = read_value(next("Y coordinate"), "Y coordinate", 0.0, 1.0).map_err(err)?;
    let vx = read_value(next("X velocity"), "X velocity", -1.0, 1.0).map_err(err)?;
    let vy = read_value(next("Y velocity"), "Y velocity", -1.0, 1.0).map_err(err)?;
    let mass = read_value(next("Mass"), "Mass", 1u32, 100).map_err(err)?;
    let radius = read_value(next("Radius"), "Radius", 0.0, 1.0).map_err(err)?;
    let r = read_value(next("Red value"), "Red value", 0u8, 255).map_err(err)?;
    let g = read_value(next("Green value"), "Green value", 0u8, 255).map_err(err)?;
    let b = read_value(next("Blue value"), "Blue value", 0u8, 255).map_err(err)?;

    Ok(ParticleSpec {
        x,
        y,
        vx,
        vy,
        mass,
        radius,
        color: Color { r, g, b },
    })
}

fn read_value<T>(
    token: std::result::Result<String, String>,
    name: &str,
    floor: T,
    ceil: T,
) -> std::result::Result<T, String>
where
    T: FromStr + PartialOrd + Display + Copy,
{
    let token = token.map_err(|name| format!("{name} was expected next, but got nothing"))?;
    let value: T = token
        .parse()
        .map_err(|_| format!("{name} was expected next, but got '{token}'"))?;
    check_range(value, name, floor, ceil)
}

fn check_range<T>(value: T, name: &str, floor: T, ceil: T) -> std::result::Result<T, String>
where
    T: PartialOrd + Display + Copy,
{
    // NaN fails both comparisons, so test for "inside" rather than "outside".
    if !(value >= floor) {
        return Err(format!("{name} can not be less than {floor}"));
    }
    if !(value <= ceil) {
        return Err(format!("{name} can not be greater than {ceil}"));
    }
    Ok(value)
}

fn validate_spec(spec: &ParticleSpec) -> std::result::Result<(), String> {
    check_range(spec.x, "X coordinate", 0.0, 1.0)?;
    check_range(spec.y, "Y coordinate", 0.0, 1.0)?;
    check_range(spec.vx, "X velocity", -1.0, 1.0)?;
    check_range(spec.vy, "Y velocity", -1.0, 1.0)?;
    check_range(spec.mass, "Mass", 1, 100)?;
    check_range(spec.radius, "Radius", 0.0, 1.0)?;
    Ok(())
}
