//! Event-driven collision engine.
//!
//! Particles move on straight lines between events; every collision is predicted
//! in closed form and queued by absolute time. Predictions are cancelled lazily via
//! per-particle revision counters.

pub mod event;
pub mod pacing;
pub mod particle;
pub mod predict;
pub mod queue;
pub mod sim;

pub use event::{Event, EventKind};
pub use pacing::{Pacer, RealTime, Unpaced};
pub use particle::{Color, Disk, Particle, ParticleSpec, Wall};
pub use queue::EventQueue;
pub use sim::{SimStats, Simulation, Tick, SPEED_MAX, SPEED_MIN};
