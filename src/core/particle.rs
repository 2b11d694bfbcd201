use crate::error::{Error, Result};
use serde::Deserialize;
use std::fmt;

/// Fixed spatial dimension (2D arena).
pub const DIM: usize = 2;

/// Decimal digits kept when comparing distances for overlap.
const OVERLAP_PRECISION: i32 = 4;
/// Decimal digits kept on velocities after a particle-particle bounce.
const VELOCITY_PRECISION: i32 = 8;

/// One of the two wall orientations of the arena.
///
/// A `Vertical` wall stops motion along x, a `Horizontal` wall stops motion along y.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Wall {
    Vertical,
    Horizontal,
}

impl Wall {
    pub const ALL: [Wall; 2] = [Wall::Vertical, Wall::Horizontal];

    /// Coordinate index this wall constrains.
    #[inline]
    pub fn axis(self) -> usize {
        match self {
            Wall::Vertical => 0,
            Wall::Horizontal => 1,
        }
    }
}

/// RGB fill color of a particle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Normalized particle description, as read from a particle list.
///
/// Positions are fractions of the arena size, velocities and radius are fractions of
/// the mean arena dimension.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ParticleSpec {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub mass: u32,
    pub radius: f64,
    #[serde(flatten)]
    pub color: Color,
}

/// What a renderer needs to draw one particle as a filled disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Disk {
    pub x: i64,
    pub y: i64,
    pub radius: u32,
    pub color: Color,
}

/// A hard disc moving freely inside the arena.
///
/// Fields:
/// - `r`: absolute position [x, y]
/// - `v`: absolute velocity [vx, vy]
/// - `radius`, `mass`: positive integers
/// - `revision`: bumped once per collision the particle takes part in
/// - `bounds`: arena [width, height], used for wall predictions
#[derive(Debug, Clone)]
pub struct Particle {
    /// Position (x, y).
    pub r: [f64; DIM],
    /// Velocity (vx, vy).
    pub v: [f64; DIM],
    /// Radius in arena units (> 0).
    pub radius: u32,
    /// Mass (> 0).
    pub mass: u32,
    /// Fill color.
    pub color: Color,
    revision: u64,
    bounds: [f64; DIM],
    spec: ParticleSpec,
}

impl Particle {
    /// Build an absolute particle from a normalized spec and the arena size.
    ///
    /// Errors:
    /// - `Error::InvalidParam` if the radius rounds to zero, the mass is zero, or any
    ///   input is NaN/inf.
    pub fn new(spec: &ParticleSpec, width: u32, height: u32) -> Result<Self> {
        let values = [spec.x, spec.y, spec.vx, spec.vy, spec.radius];
        if !values.iter().all(|x| x.is_finite()) {
            return Err(Error::InvalidParam(
                "particle coordinates must be finite".into(),
            ));
        }
        if spec.mass == 0 {
            return Err(Error::InvalidParam("mass must be > 0".into()));
        }

        let (w, h) = (f64::from(width), f64::from(height));
        let mid = (w + h) / 2.0;
        let radius = (mid * spec.radius).round();
        if radius < 1.0 {
            return Err(Error::InvalidParam(format!(
                "radius {} rounds to zero in a {}x{} arena",
                spec.radius, width, height
            )));
        }

        Ok(Self {
            r: [w * spec.x, h * spec.y],
            v: [mid * spec.vx, mid * spec.vy],
            radius: radius as u32,
            mass: spec.mass,
            color: spec.color,
            revision: 0,
            bounds: [w, h],
            spec: *spec,
        })
    }

    /// Number of collisions this particle has taken part in.
    #[inline]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// True if the two discs intersect, comparing at 4 decimal digits.
    pub fn overlaps(&self, other: &Particle) -> bool {
        let dx = (self.r[0] - other.r[0]).abs();
        let dy = (self.r[1] - other.r[1]).abs();
        let sum = f64::from(self.radius + other.radius);

        let dist = round_half_up(dx.hypot(dy), OVERLAP_PRECISION);
        dist < round_half_up(sum, OVERLAP_PRECISION)
    }

    /// Linear drift over `dt`. No clamping: callers only drift up to the next event.
    #[inline]
    pub fn advance(&mut self, dt: f64) {
        for (rk, vk) in self.r.iter_mut().zip(self.v.iter()) {
            *rk += vk * dt;
        }
    }

    /// Specular reflection off a wall.
    pub fn bounce_wall(&mut self, wall: Wall) {
        let k = wall.axis();
        self.v[k] = -self.v[k];
        self.revision += 1;
    }

    /// Elastic collision response along the line of centers.
    ///
    /// Both particles are assumed to be in contact.
    pub fn bounce_particle(&mut self, other: &mut Particle) {
        let dx = other.r[0] - self.r[0];
        let dy = other.r[1] - self.r[1];
        let dvx = other.v[0] - self.v[0];
        let dvy = other.v[1] - self.v[1];
        let dvdr = dvx * dx + dvy * dy;
        let distance = f64::from(self.radius + other.radius);

        let (m1, m2) = (f64::from(self.mass), f64::from(other.mass));
        let j = 2.0 * m1 * m2 * dvdr / (distance * (m1 + m2));
        let jx = j * dx / distance;
        let jy = j * dy / distance;

        self.v[0] = round_half_up(self.v[0] + jx / m1, VELOCITY_PRECISION);
        self.v[1] = round_half_up(self.v[1] + jy / m1, VELOCITY_PRECISION);
        other.v[0] = round_half_up(other.v[0] - jx / m2, VELOCITY_PRECISION);
        other.v[1] = round_half_up(other.v[1] - jy / m2, VELOCITY_PRECISION);

        self.revision += 1;
        other.revision += 1;
    }

    /// Time until the particle's edge reaches `wall`, or `None` if it never does.
    ///
    /// Velocities so small that the time overflows count as never.
    pub fn collides_wall(&self, wall: Wall) -> Option<f64> {
        let k = wall.axis();
        let (coord, velocity) = (self.r[k], self.v[k]);
        let radius = f64::from(self.radius);

        let dt = if velocity > 0.0 {
            (self.bounds[k] - radius - coord) / velocity
        } else if velocity < 0.0 {
            (radius - coord) / velocity
        } else {
            return None;
        };
        (dt >= 0.0 && dt.is_finite()).then_some(dt)
    }

    /// Time until the two discs touch, or `None` if they never do on current courses.
    pub fn collides_particle(&self, other: &Particle) -> Option<f64> {
        if std::ptr::eq(self, other) {
            return None;
        }

        let distance = f64::from(self.radius + other.radius);
        let dx = other.r[0] - self.r[0];
        let dy = other.r[1] - self.r[1];
        let dvx = other.v[0] - self.v[0];
        let dvy = other.v[1] - self.v[1];
        let drdr = dx * dx + dy * dy;
        let dvdv = dvx * dvx + dvy * dvy;
        let dvdr = dvx * dx + dvy * dy;
        let d = dvdr * dvdr - dvdv * (drdr - distance * distance);

        if dvdr >= 0.0 || d < 0.0 {
            return None;
        }
        let dt = -(dvdr + d.sqrt()) / dvdv;
        dt.is_finite().then_some(dt)
    }

    /// Integer view for drawing.
    pub fn disk(&self) -> Disk {
        Disk {
            x: self.r[0].round() as i64,
            y: self.r[1].round() as i64,
            radius: self.radius,
            color: self.color,
        }
    }

    /// Returns the particle's kinetic energy: 1/2 m |v|^2.
    #[inline]
    pub fn kinetic_energy(&self) -> f64 {
        let vsq: f64 = self.v.iter().map(|&c| c * c).sum();
        0.5 * f64::from(self.mass) * vsq
    }

    /// Linear momentum m v.
    #[inline]
    pub fn momentum(&self) -> [f64; DIM] {
        let m = f64::from(self.mass);
        [m * self.v[0], m * self.v[1]]
    }
}

impl fmt::Display for Particle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(x: {} ({}), y: {} ({}), vx: {} ({}), vy: {} ({}), mass: {}, radius: {} ({}), rgb: [{}, {}, {}], rev: {})",
            self.spec.x,
            self.r[0],
            self.spec.y,
            self.r[1],
            self.spec.vx,
            self.v[0],
            self.spec.vy,
            self.v[1],
            self.mass,
            self.spec.radius,
            self.radius,
            self.color.r,
            self.color.g,
            self.color.b,
            self.revision
        )
    }
}

/// Round half-up at `digits` decimal places.
#[inline]
pub(crate) fn round_half_up(num: f64, digits: i32) -> f64 {
    let mult = 10f64.powi(digits);
    (num * mult + 0.5).floor() / mult
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(x: f64, y: f64, vx: f64, vy: f64, radius: f64, mass: u32) -> ParticleSpec {
        ParticleSpec {
            x,
            y,
            vx,
            vy,
            mass,
            radius,
            color: Color { r: 1, g: 2, b: 3 },
        }
    }

    #[test]
    fn new_particle_scales_to_arena() -> Result<()> {
        let p = Particle::new(&spec(0.25, 0.5, 0.5, -1.0, 0.05, 10), 400, 200)?;
        assert_eq!(p.r, [100.0, 100.0]);
        // mid = (400 + 200) / 2 = 300
        assert_eq!(p.v, [150.0, -300.0]);
        assert_eq!(p.radius, 15);
        assert_eq!(p.mass, 10);
        assert_eq!(p.revision(), 0);
        assert_eq!(p.color, Color { r: 1, g: 2, b: 3 });
        Ok(())
    }

    #[test]
    fn zero_radius_rejected() {
        let err = Particle::new(&spec(0.5, 0.5, 0.0, 0.0, 0.0, 1), 400, 400).unwrap_err();
        assert!(err.to_string().contains("radius"));
    }

    #[test]
    fn zero_mass_rejected() {
        let err = Particle::new(&spec(0.5, 0.5, 0.0, 0.0, 0.1, 0), 400, 400).unwrap_err();
        assert!(err.to_string().contains("mass"));
    }

    #[test]
    fn round_half_up_at_precision() {
        assert_eq!(round_half_up(1.23456, 4), 1.2346);
        assert_eq!(round_half_up(2.5, 0), 3.0);
        assert_eq!(round_half_up(-2.5, 0), -2.0);
        assert_eq!(round_half_up(0.123456789, 8), 0.12345679);
    }

    #[test]
    fn overlap_is_strict_and_symmetric() -> Result<()> {
        // radius = round(0.025 * 400) = 10 each, so contact distance is 20
        let a = Particle::new(&spec(0.50, 0.5, 0.0, 0.0, 0.025, 1), 400, 400)?;
        let touching = Particle::new(&spec(0.55, 0.5, 0.0, 0.0, 0.025, 1), 400, 400)?;
        let close = Particle::new(&spec(0.54, 0.5, 0.0, 0.0, 0.025, 1), 400, 400)?;
        assert!(!a.overlaps(&touching));
        assert!(!touching.overlaps(&a));
        assert!(a.overlaps(&close));
        assert!(close.overlaps(&a));
        Ok(())
    }

    #[test]
    fn bounce_wall_flips_axis_and_bumps_revision() -> Result<()> {
        let mut p = Particle::new(&spec(0.5, 0.5, 0.1, 0.2, 0.01, 1), 400, 400)?;
        let v = p.v;
        p.bounce_wall(Wall::Vertical);
        assert_eq!(p.v, [-v[0], v[1]]);
        assert_eq!(p.revision(), 1);
        p.bounce_wall(Wall::Horizontal);
        assert_eq!(p.v, [-v[0], -v[1]]);
        assert_eq!(p.revision(), 2);
        Ok(())
    }

    #[test]
    fn collides_wall_both_directions() -> Result<()> {
        let mut p = Particle::new(&spec(0.25, 0.5, 0.0, 0.0, 0.0125, 1), 400, 400)?;
        p.v = [2.0, -4.0];
        // radius 5: (400 - 5 - 100) / 2
        assert_eq!(p.collides_wall(Wall::Vertical), Some(147.5));
        // (5 - 200) / -4
        assert_eq!(p.collides_wall(Wall::Horizontal), Some(48.75));
        Ok(())
    }

    #[test]
    fn collides_wall_none_without_motion() -> Result<()> {
        let p = Particle::new(&spec(0.25, 0.5, 0.0, 0.0, 0.0125, 1), 400, 400)?;
        assert_eq!(p.collides_wall(Wall::Vertical), None);
        assert_eq!(p.collides_wall(Wall::Horizontal), None);
        Ok(())
    }

    #[test]
    fn collides_wall_none_when_time_overflows() -> Result<()> {
        let p = Particle::new(&spec(0.25, 0.5, 1e-320, -1e-320, 0.0125, 1), 400, 400)?;
        assert!(p.v[0] > 0.0);
        assert_eq!(p.collides_wall(Wall::Vertical), None);
        assert_eq!(p.collides_wall(Wall::Horizontal), None);
        Ok(())
    }

    #[test]
    fn collides_particle_self_is_none() -> Result<()> {
        let p = Particle::new(&spec(0.25, 0.5, 0.5, 0.5, 0.0125, 1), 400, 400)?;
        assert_eq!(p.collides_particle(&p), None);
        Ok(())
    }

    #[test]
    fn collides_particle_head_on() -> Result<()> {
        let mut a = Particle::new(&spec(0.25, 0.5, 0.0, 0.0, 0.0125, 10), 400, 400)?;
        let mut b = Particle::new(&spec(0.30, 0.5, 0.0, 0.0, 0.0125, 10), 400, 400)?;
        b.r = [120.0, 200.0];
        a.v = [1.0, 0.0];
        b.v = [-1.0, 0.0];
        // gap of 20 - 10 closes at relative speed 2
        assert_eq!(a.collides_particle(&b), Some(5.0));
        assert_eq!(b.collides_particle(&a), Some(5.0));
        Ok(())
    }

    #[test]
    fn collides_particle_none_when_separating_or_missing() -> Result<()> {
        let mut a = Particle::new(&spec(0.25, 0.5, 0.0, 0.0, 0.0125, 10), 400, 400)?;
        let mut b = Particle::new(&spec(0.30, 0.5, 0.0, 0.0, 0.0125, 10), 400, 400)?;
        b.r = [120.0, 200.0];
        a.v = [-1.0, 0.0];
        b.v = [1.0, 0.0];
        assert_eq!(a.collides_particle(&b), None);

        // Approaching along x but offset by 50 in y: discriminant < 0
        b.r = [120.0, 250.0];
        a.v = [1.0, 0.0];
        b.v = [-1.0, 0.0];
        assert_eq!(a.collides_particle(&b), None);
        Ok(())
    }

    #[test]
    fn bounce_particle_swaps_equal_mass_velocities() -> Result<()> {
        let mut a = Particle::new(&spec(0.25, 0.5, 0.0, 0.0, 0.0125, 10), 400, 400)?;
        let mut b = Particle::new(&spec(0.275, 0.5, 0.0, 0.0, 0.0125, 10), 400, 400)?;
        b.r = [110.0, 200.0];
        a.v = [1.0, 0.0];
        b.v = [-1.0, 0.0];
        a.bounce_particle(&mut b);
        assert_eq!(a.v, [-1.0, 0.0]);
        assert_eq!(b.v, [1.0, 0.0]);
        assert_eq!(a.revision(), 1);
        assert_eq!(b.revision(), 1);
        Ok(())
    }

    #[test]
    fn disk_rounds_position() -> Result<()> {
        let mut p = Particle::new(&spec(0.25, 0.5, 0.0, 0.0, 0.0125, 1), 400, 400)?;
        p.r = [10.4, 10.6];
        let d = p.disk();
        assert_eq!((d.x, d.y, d.radius), (10, 11, 5));
        Ok(())
    }

    #[test]
    fn display_shows_normalized_and_absolute() -> Result<()> {
        let p = Particle::new(&spec(0.25, 0.5, 0.0, 0.0, 0.0125, 7), 400, 400)?;
        let s = p.to_string();
        assert!(s.contains("x: 0.25 (100)"));
        assert!(s.contains("mass: 7"));
        Ok(())
    }
}
