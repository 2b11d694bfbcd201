use crate::core::particle::{Particle, Wall};
use crate::error::{Error, Result};
use ordered_float::NotNan;
use std::cmp::Ordering;

/// Kinds of events the engine schedules.
///
/// Particles are referred to by their index in the engine's particle arena together
/// with the revision they had when the event was predicted.
/// Tie-breaking for deterministic ordering is `Refresh` < `Pair` < `Wall` at equal times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Frame boundary; never stale.
    Refresh,
    /// Particle `i` reaches `wall`.
    Wall { i: usize, wall: Wall, rev: u64 },
    /// Particles `i` and `j` touch.
    Pair {
        i: usize,
        j: usize,
        rev_i: u64,
        rev_j: u64,
    },
}

impl EventKind {
    #[inline]
    fn order_key(&self) -> (u8, usize, usize, u64, u64) {
        match *self {
            EventKind::Refresh => (0, 0, 0, 0, 0),
            EventKind::Pair { i, j, rev_i, rev_j } => (1, i, j, rev_i, rev_j),
            EventKind::Wall { i, wall, rev } => (2, i, wall.axis(), rev, 0),
        }
    }
}

/// A scheduled event with an absolute simulation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub time: NotNan<f64>,
    pub kind: EventKind,
}

impl Event {
    /// Create a new event, validating that time is finite and non-NaN.
    pub fn new(time: f64, kind: EventKind) -> Result<Self> {
        if !time.is_finite() {
            return Err(Error::InvalidParam(format!(
                "event time must be finite, got {time}"
            )));
        }
        let time = NotNan::new(time)
            .map_err(|_| Error::InvalidParam("event time cannot be NaN".into()))?;
        Ok(Self { time, kind })
    }

    /// Refresh marker at `time`.
    pub fn refresh(time: f64) -> Result<Self> {
        Self::new(time, EventKind::Refresh)
    }

    /// Wall collision for particle `i`, snapshotting its current revision.
    pub fn wall(time: f64, particles: &[Particle], i: usize, wall: Wall) -> Result<Self> {
        let rev = particles[i].revision();
        Self::new(time, EventKind::Wall { i, wall, rev })
    }

    /// Collision between particles `i` and `j`, snapshotting both revisions.
    pub fn pair(time: f64, particles: &[Particle], i: usize, j: usize) -> Result<Self> {
        Self::new(
            time,
            EventKind::Pair {
                i,
                j,
                rev_i: particles[i].revision(),
                rev_j: particles[j].revision(),
            },
        )
    }

    /// Returns the raw f64 event time.
    #[inline]
    pub fn time_f64(&self) -> f64 {
        self.time.into_inner()
    }

    /// True once any referenced particle has collided since this event was predicted.
    #[inline]
    pub fn is_stale(&self, particles: &[Particle]) -> bool {
        match self.kind {
            EventKind::Refresh => false,
            EventKind::Wall { i, rev, .. } => particles[i].revision() != rev,
            EventKind::Pair { i, j, rev_i, rev_j } => {
                particles[i].revision() != rev_i || particles[j].revision() != rev_j
            }
        }
    }
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.time.cmp(&other.time) {
            Ordering::Equal => self.kind.order_key().cmp(&other.kind.order_key()),
            o => o,
        }
    }
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::particle::{Color, ParticleSpec};

    fn particles(n: usize) -> Result<Vec<Particle>> {
        (0..n)
            .map(|k| {
                let spec = ParticleSpec {
                    x: 0.1 + 0.2 * k as f64,
                    y: 0.5,
                    vx: 0.1,
                    vy: 0.0,
                    mass: 1,
                    radius: 0.02,
                    color: Color::default(),
                };
                Particle::new(&spec, 400, 400)
            })
            .collect()
    }

    #[test]
    fn new_event_rejects_nan_and_infinite_time() {
        let err = Event::refresh(f64::NAN).unwrap_err();
        assert!(err.to_string().contains("finite"));
        assert!(Event::refresh(f64::INFINITY).is_err());
    }

    #[test]
    fn ordering_by_time() -> Result<()> {
        let ps = particles(2)?;
        let e1 = Event::pair(1.0, &ps, 0, 1)?;
        let e2 = Event::wall(2.0, &ps, 0, Wall::Vertical)?;
        let e3 = Event::refresh(3.0)?;
        assert!(e1 < e2);
        assert!(e2 < e3);
        Ok(())
    }

    #[test]
    fn tie_breaker_prefers_refresh_then_pair() -> Result<()> {
        let ps = particles(2)?;
        let r = Event::refresh(5.0)?;
        let p = Event::pair(5.0, &ps, 0, 1)?;
        let w = Event::wall(5.0, &ps, 0, Wall::Horizontal)?;
        assert!(r < p);
        assert!(p < w);
        Ok(())
    }

    #[test]
    fn refresh_is_never_stale() -> Result<()> {
        let mut ps = particles(1)?;
        let e = Event::refresh(0.0)?;
        ps[0].bounce_wall(Wall::Vertical);
        assert!(!e.is_stale(&ps));
        Ok(())
    }

    #[test]
    fn wall_event_goes_stale_after_any_collision() -> Result<()> {
        let mut ps = particles(2)?;
        let e = Event::wall(1.0, &ps, 0, Wall::Vertical)?;
        assert!(!e.is_stale(&ps));
        // Unrelated particle changing does not matter.
        ps[1].bounce_wall(Wall::Horizontal);
        assert!(!e.is_stale(&ps));
        ps[0].bounce_wall(Wall::Horizontal);
        assert!(e.is_stale(&ps));
        // Stays stale at every later query.
        ps[0].bounce_wall(Wall::Horizontal);
        assert!(e.is_stale(&ps));
        Ok(())
    }

    #[test]
    fn pair_event_goes_stale_when_either_side_changes() -> Result<()> {
        let mut ps = particles(3)?;
        let e = Event::pair(1.0, &ps, 0, 1)?;
        ps[2].bounce_wall(Wall::Vertical);
        assert!(!e.is_stale(&ps));
        ps[1].bounce_wall(Wall::Vertical);
        assert!(e.is_stale(&ps));

        let e = Event::pair(2.0, &ps, 0, 1)?;
        assert!(!e.is_stale(&ps));
        ps[0].bounce_wall(Wall::Vertical);
        assert!(e.is_stale(&ps));
        Ok(())
    }
}
