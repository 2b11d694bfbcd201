//! Event-driven simulation of elastic collisions between discs in a rectangular arena.
//!
//! The engine advances state exactly at collision instants: every possible collision
//! is predicted in closed form, kept in a time-ordered queue, and invalidated lazily
//! when a particle's trajectory changes. A periodic refresh event marks frame
//! boundaries for the host.
//!
//! ```no_run
//! use collider::core::{Color, ParticleSpec, Simulation, Tick, Unpaced};
//!
//! # fn main() -> collider::error::Result<()> {
//! let mut sim = Simulation::new(400, 400, 100)?.with_pacer(Unpaced);
//! sim.add_particle(&ParticleSpec {
//!     x: 0.5,
//!     y: 0.5,
//!     vx: 0.3,
//!     vy: -0.1,
//!     mass: 10,
//!     radius: 0.03,
//!     color: Color { r: 200, g: 40, b: 40 },
//! })?;
//! if let Tick::Frame { time } = sim.step()? {
//!     for disk in sim.disks() {
//!         println!("{time}: ({}, {}) r={}", disk.x, disk.y, disk.radius);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod core;
pub mod error;

#[cfg(feature = "python")]
mod python;
