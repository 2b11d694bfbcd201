use crate::core::event::{Event, EventKind};
use crate::core::pacing::{self, Pacer, RealTime};
use crate::core::particle::{Color, Disk, Particle, ParticleSpec, DIM};
use crate::core::predict::predict_collisions;
use crate::core::queue::EventQueue;
use crate::error::{Error, Result};
use rand::{rng, rngs::StdRng, Rng, SeedableRng};
use tracing::{debug, info, trace};

/// Slowest speed multiplier.
pub const SPEED_MIN: u32 = 1;
/// Fastest speed multiplier.
pub const SPEED_MAX: u32 = 3;

/// Placement attempts per particle in `add_random_particles`.
const MAX_PLACEMENT_ATTEMPTS: usize = 10_000;

/// Outcome of one `Simulation::step` call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tick {
    /// Paused: no physics ran, only the frame delay elapsed.
    Paused,
    /// A refresh event fired at simulation time `time`; the host should redraw.
    Frame { time: f64 },
}

/// Counters accumulated over the simulation's lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimStats {
    pub frames: u64,
    pub wall_collisions: u64,
    pub particle_collisions: u64,
    pub stale_discarded: u64,
}

/// Event-driven disc simulation in a static rectangular arena.
///
/// The arena spans `[0, width] x [0, height]`. Particles live in an owned `Vec` and
/// events refer to them by index, so handles stay valid for the whole run.
///
/// Access is single-threaded: every mutation happens inside `step` or the control
/// methods, which must not run concurrently.
#[derive(Debug)]
pub struct Simulation {
    width: u32,
    height: u32,
    frame_ms: u64,
    speed: u32,
    paused: bool,
    time_now: f64,
    particles: Vec<Particle>,
    queue: EventQueue,
    pacer: Box<dyn Pacer>,
    stats: SimStats,
}

impl Simulation {
    /// Create an empty simulation for a `width` x `height` arena refreshed `fps`
    /// times per real second.
    ///
    /// Errors: `Error::InvalidParam` on a zero dimension or an fps outside `1..=1000`.
    pub fn new(width: u32, height: u32, fps: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidParam(
                "arena width and height must be > 0".into(),
            ));
        }
        if fps == 0 || fps > 1000 {
            return Err(Error::InvalidParam(format!(
                "fps must be in 1..=1000, got {fps}"
            )));
        }

        Ok(Self {
            width,
            height,
            frame_ms: u64::from(1000 / fps),
            speed: SPEED_MIN,
            paused: false,
            time_now: 0.0,
            particles: Vec::new(),
            queue: EventQueue::new(),
            pacer: Box::new(RealTime),
            stats: SimStats::default(),
        })
    }

    /// Replace the real-time pacer.
    pub fn with_pacer(mut self, pacer: impl Pacer + 'static) -> Self {
        self.pacer = Box::new(pacer);
        self
    }

    /// Add a particle given in normalized coordinates.
    ///
    /// Returns the index of the new particle. Fails with `Error::Overlap` if it would
    /// start in contact with an existing particle, and with `Error::AlreadyRunning`
    /// once stepping has begun. On failure the particle set is unchanged.
    pub fn add_particle(&mut self, spec: &ParticleSpec) -> Result<usize> {
        if !self.queue.is_empty() {
            return Err(Error::AlreadyRunning);
        }
        let particle = Particle::new(spec, self.width, self.height)?;
        if let Some(existing) = self.particles.iter().find(|p| particle.overlaps(p)) {
            return Err(Error::Overlap {
                particle: particle.to_string(),
                existing: existing.to_string(),
            });
        }

        self.particles.push(particle);
        let idx = self.particles.len() - 1;
        debug!(index = idx, "particle added");
        Ok(idx)
    }

    /// Add `n` particles with random placement, size, mass, velocity and color.
    ///
    /// Placement uses rejection sampling against the particles already present. On
    /// failure none of the new particles are kept.
    pub fn add_random_particles(&mut self, n: usize, seed: Option<u64>) -> Result<()> {
        let mut rng: StdRng = match seed {
            Some(s) => SeedableRng::seed_from_u64(s),
            None => SeedableRng::seed_from_u64(rng().random()),
        };

        let start = self.particles.len();
        let placed = self.place_random(n, &mut rng);
        if placed.is_err() {
            self.particles.truncate(start);
        }
        placed
    }

    /// Run until the next refresh event.
    ///
    /// The first call seeds the event queue and fails with `Error::EmptySimulation`
    /// when there is nothing to simulate. While paused, only waits one frame.
    pub fn step(&mut self) -> Result<Tick> {
        if self.queue.is_empty() {
            self.bootstrap()?;
        }
        if self.paused {
            self.pacer.pause(self.frame_ms);
            return Ok(Tick::Paused);
        }

        while let Some(ev) = self.queue.pop() {
            if ev.is_stale(&self.particles) {
                self.stats.stale_discarded += 1;
                trace!(time = ev.time_f64(), kind = ?ev.kind, "stale event discarded");
                continue;
            }

            let t_ev = ev.time_f64();
            let dt = t_ev - self.time_now;
            self.drift_all(dt);
            self.pacer.pause(pacing::sim_to_ms(dt, self.speed));
            self.time_now = t_ev;

            match ev.kind {
                EventKind::Wall { i, wall, .. } => {
                    trace!(time = t_ev, particle = i, ?wall, "wall collision");
                    self.particles[i].bounce_wall(wall);
                    self.stats.wall_collisions += 1;
                    predict_collisions(&self.particles, i, self.time_now, &mut self.queue)?;
                }
                EventKind::Pair { i, j, .. } => {
                    trace!(time = t_ev, i, j, "particle collision");
                    let (a, b) = pair_mut(&mut self.particles, i, j)?;
                    a.bounce_particle(b);
                    self.stats.particle_collisions += 1;
                    predict_collisions(&self.particles, i, self.time_now, &mut self.queue)?;
                    predict_collisions(&self.particles, j, self.time_now, &mut self.queue)?;
                }
                EventKind::Refresh => {
                    self.stats.frames += 1;
                    let next = self.time_now + pacing::ms_to_sim(self.frame_ms, self.speed);
                    self.queue.push(Event::refresh(next)?);
                    debug!(
                        time = self.time_now,
                        frame = self.stats.frames,
                        queued = self.queue.len(),
                        "frame"
                    );
                    return Ok(Tick::Frame {
                        time: self.time_now,
                    });
                }
            }
        }

        Err(Error::QueueDrained)
    }

    /// Returns current simulation time.
    pub fn time(&self) -> f64 {
        self.time_now
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Real milliseconds per frame, `1000 / fps`.
    pub fn frame_ms(&self) -> u64 {
        self.frame_ms
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// Flip between paused and running; returns the new paused state.
    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        self.paused
    }

    pub fn speed(&self) -> u32 {
        self.speed
    }

    /// Raise the speed multiplier, saturating at `SPEED_MAX`.
    pub fn inc_speed(&mut self) {
        if self.speed < SPEED_MAX {
            self.speed += 1;
            debug!(speed = self.speed, "speed increased");
        }
    }

    /// Lower the speed multiplier, saturating at `SPEED_MIN`.
    pub fn dec_speed(&mut self) {
        if self.speed > SPEED_MIN {
            self.speed -= 1;
            debug!(speed = self.speed, "speed decreased");
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Number of particles.
    pub fn num_particles(&self) -> usize {
        self.particles.len()
    }

    /// Drawable view of every particle, in insertion order.
    pub fn disks(&self) -> impl Iterator<Item = Disk> + '_ {
        self.particles.iter().map(Particle::disk)
    }

    /// Positions as a Vec of fixed-size arrays.
    pub fn positions(&self) -> Vec<[f64; DIM]> {
        self.particles.iter().map(|p| p.r).collect()
    }

    /// Velocities as a Vec of fixed-size arrays.
    pub fn velocities(&self) -> Vec<[f64; DIM]> {
        self.particles.iter().map(|p| p.v).collect()
    }

    pub fn stats(&self) -> SimStats {
        self.stats
    }

    /// Events currently queued, stale ones included.
    pub fn pending_events(&self) -> usize {
        self.queue.len()
    }

    /// Compute total kinetic energy (diagnostic).
    pub fn kinetic_energy(&self) -> f64 {
        self.particles.iter().map(|p| p.kinetic_energy()).sum()
    }

    /// Total linear momentum (diagnostic).
    pub fn momentum(&self) -> [f64; DIM] {
        self.particles.iter().fold([0.0; DIM], |acc, p| {
            let m = p.momentum();
            [acc[0] + m[0], acc[1] + m[1]]
        })
    }

    // ============ Internal helpers ============

    fn place_random(&mut self, n: usize, rng: &mut StdRng) -> Result<()> {
        let (w, h) = (f64::from(self.width), f64::from(self.height));
        let mid = (w + h) / 2.0;

        for k in 0..n {
            let mut attempts = 0usize;
            loop {
                if attempts >= MAX_PLACEMENT_ATTEMPTS {
                    return Err(Error::InvalidParam(format!(
                        "failed to place random particle {k} without overlap; try fewer particles or a larger arena"
                    )));
                }
                attempts += 1;

                let radius = (rng.random_range(0.01..=0.03) * mid).round().max(1.0);
                if 2.0 * radius > w || 2.0 * radius > h {
                    return Err(Error::InvalidParam(format!(
                        "a {}x{} arena is too small for random particles",
                        self.width, self.height
                    )));
                }
                let spec = ParticleSpec {
                    x: rng.random_range(radius..=w - radius) / w,
                    y: rng.random_range(radius..=h - radius) / h,
                    vx: rng.random_range(-1.0..=1.0),
                    vy: rng.random_range(-1.0..=1.0),
                    mass: rng.random_range(1..=10),
                    radius: radius / mid,
                    color: Color {
                        r: rng.random(),
                        g: rng.random(),
                        b: rng.random(),
                    },
                };

                match self.add_particle(&spec) {
                    Ok(_) => break,
                    Err(Error::Overlap { .. }) => continue,
                    Err(e) => return Err(e),
                }
            }
        }
        Ok(())
    }

    fn bootstrap(&mut self) -> Result<()> {
        if self.particles.is_empty() {
            return Err(Error::EmptySimulation);
        }
        let seeded = self.schedule_initial_events();
        if seeded.is_err() {
            self.queue.clear();
        }
        seeded?;
        info!(
            particles = self.particles.len(),
            events = self.queue.len(),
            "simulation bootstrapped"
        );
        Ok(())
    }

    fn schedule_initial_events(&mut self) -> Result<()> {
        for i in 0..self.particles.len() {
            predict_collisions(&self.particles, i, self.time_now, &mut self.queue)?;
        }
        self.queue.push(Event::refresh(self.time_now)?);
        Ok(())
    }

    fn drift_all(&mut self, dt: f64) {
        for p in &mut self.particles {
            p.advance(dt);
        }
    }
}

/// Two distinct mutable particles out of the arena.
fn pair_mut(particles: &mut [Particle], i: usize, j: usize) -> Result<(&mut Particle, &mut Particle)> {
    if i == j || i >= particles.len() || j >= particles.len() {
        return Err(Error::InvalidParam(format!(
            "invalid particle pair ({i}, {j})"
        )));
    }
    if i < j {
        let (lo, hi) = particles.split_at_mut(j);
        Ok((&mut lo[i], &mut hi[0]))
    } else {
        let (lo, hi) = particles.split_at_mut(i);
        Ok((&mut hi[0], &mut lo[j]))
    }
}
