//! Collision prediction: turns the current kinematic state of one particle into
//! future events on the queue.

use crate::core::event::Event;
use crate::core::particle::{Particle, Wall};
use crate::core::queue::EventQueue;
use crate::error::Result;

/// Schedule every future collision of particle `i` as seen from time `now`.
///
/// Pairs are scheduled against every other particle in the arena, walls against both
/// axes. Only finite `dt >= 0` is scheduled, so `now` never moves backwards and the
/// call cannot fail on physical input. Times are stored as absolute `now + dt`.
/// Returns the number of events pushed.
pub fn predict_collisions(
    particles: &[Particle],
    i: usize,
    now: f64,
    queue: &mut EventQueue,
) -> Result<usize> {
    let p = &particles[i];
    let mut scheduled = 0usize;

    for (j, other) in particles.iter().enumerate() {
        if j == i {
            continue;
        }
        if let Some(t) = absolute(now, p.collides_particle(other)) {
            queue.push(Event::pair(t, particles, i, j)?);
            scheduled += 1;
        }
    }

    for wall in Wall::ALL {
        if let Some(t) = absolute(now, p.collides_wall(wall)) {
            queue.push(Event::wall(t, particles, i, wall)?);
            scheduled += 1;
        }
    }

    Ok(scheduled)
}

/// `now + dt` for a non-negative `dt`, or `None` if the sum is not a usable time.
#[inline]
fn absolute(now: f64, dt: Option<f64>) -> Option<f64> {
    dt.filter(|&dt| dt >= 0.0)
        .map(|dt| now + dt)
        .filter(|t| t.is_finite())
}
