//! Conversion between simulated time and wall-clock milliseconds.
//!
//! The engine itself never looks at a clock; it hands real-time delays to a `Pacer`
//! chosen by the host.

use std::fmt;
use std::thread;
use std::time::Duration;

/// Simulated time units per real millisecond at speed 1, inverted.
const MS_PER_SIM_UNIT: u32 = 60;

/// Real milliseconds to wait for `dt` units of simulated time at `speed`.
///
/// `60 / speed` is integer division and the result truncates toward zero.
#[inline]
pub fn sim_to_ms(dt: f64, speed: u32) -> u64 {
    let per_unit = MS_PER_SIM_UNIT / speed.max(1);
    let ms = f64::from(per_unit) * dt;
    if ms.is_finite() && ms > 0.0 {
        ms as u64
    } else {
        0
    }
}

/// Simulated time covered by `ms` real milliseconds at `speed`.
#[inline]
pub fn ms_to_sim(ms: u64, speed: u32) -> f64 {
    ms as f64 / f64::from(MS_PER_SIM_UNIT) * f64::from(speed)
}

/// Blocking delay provider used by `Simulation::step`.
pub trait Pacer: Send + Sync + fmt::Debug {
    /// Block for `ms` real milliseconds.
    fn pause(&mut self, ms: u64);
}

/// Sleeps the calling thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealTime;

impl Pacer for RealTime {
    fn pause(&mut self, ms: u64) {
        if ms > 0 {
            thread::sleep(Duration::from_millis(ms));
        }
    }
}

/// Never waits; the simulation runs as fast as the host calls `step`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Unpaced;

impl Pacer for Unpaced {
    fn pause(&mut self, _ms: u64) {}
}
