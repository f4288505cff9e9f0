//! Dissolve particles.
//!
//! Each simulation step:
//!
//! ```text
//! pos   += vel
//! vel.y += gravity
//! vel.x *= drag
//! life  -= decay
//! size  *= shrink
//! ```
//!
//! Opacity is `life` clamped to `[0, 1]`.  A particle whose life reaches zero
//! is removed at the end of that step, so it is never drawn at zero opacity.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;

use hand_pose::{Point, World};

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    pub gravity: f32,
    /// Horizontal velocity multiplier per step (< 1).
    pub drag:    f32,
    pub decay:   f32,
    /// Size multiplier per step (< 1).
    pub shrink:  f32,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        ParticleConfig {
            gravity: 0.15,
            drag:    0.98,
            decay:   0.02,
            shrink:  0.97,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub pos:   Point<World>,
    pub vx:    f32,
    pub vy:    f32,
    /// Packed ARGB.
    pub color: u32,
    pub size:  f32,
    pub life:  f32,
}

impl Particle {
    pub fn opacity(&self) -> f32 {
        self.life.clamp(0.0, 1.0)
    }
}

/// The live particle set plus the generator used to scatter new ones.
#[derive(Debug)]
pub struct ParticleField {
    particles: Vec<Particle>,
    config:    ParticleConfig,
    rng:       StdRng,
}

impl ParticleField {
    /// A fixed `seed` makes every burst reproducible; `None` seeds from the OS.
    pub fn new(config: ParticleConfig, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None       => StdRng::from_entropy(),
        };
        ParticleField { particles: Vec::new(), config, rng }
    }

    pub fn particles(&self) -> &[Particle] { &self.particles }
    pub fn len(&self) -> usize { self.particles.len() }
    pub fn is_empty(&self) -> bool { self.particles.is_empty() }

    /// Spawn one particle at `pos` with randomized upward/outward velocity,
    /// a size drawn from `width`, and life slightly above 1.
    pub fn burst(&mut self, pos: Point<World>, color: u32, width: f32) {
        let r = &mut self.rng;
        self.particles.push(Particle {
            pos,
            vx:    r.gen_range(-2.5..2.5),
            vy:    r.gen_range(-4.0..-1.0),
            color,
            size:  width * r.gen_range(0.5..=1.0),
            life:  1.0 + r.gen_range(0.05..0.25),
        });
    }

    /// Advance every particle one step and drop the spent ones.
    pub fn step(&mut self) {
        let c = &self.config;
        for p in &mut self.particles {
            p.pos   = Point::new(p.pos.x + p.vx, p.pos.y + p.vy);
            p.vy   += c.gravity;
            p.vx   *= c.drag;
            p.life -= c.decay;
            p.size *= c.shrink;
        }
        self.particles.retain(|p| p.life > 0.0);
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn field() -> ParticleField {
        ParticleField::new(ParticleConfig::default(), Some(1))
    }

    #[test]
    fn same_seed_same_scatter() {
        let mut a = ParticleField::new(ParticleConfig::default(), Some(42));
        let mut b = ParticleField::new(ParticleConfig::default(), Some(42));
        for i in 0..8 {
            a.burst(Point::new(i as f32, 0.0), 0xFF0000FF, 4.0);
            b.burst(Point::new(i as f32, 0.0), 0xFF0000FF, 4.0);
        }
        assert_eq!(a.particles(), b.particles());
    }

    #[test]
    fn unseeded_burst_stays_in_range() {
        let mut f = ParticleField::new(ParticleConfig::default(), None);
        for _ in 0..200 {
            f.burst(Point::new(0.0, 0.0), 0xFFFFFFFF, 8.0);
        }
        assert!(f.particles().iter().all(|p| (-2.5..2.5).contains(&p.vx)));
        assert!(f.particles().iter().all(|p| (-4.0..-1.0).contains(&p.vy)));
        assert!(f.particles().iter().all(|p| p.life > 1.0 && p.life <= 1.25));
    }

    #[test]
    fn burst_life_starts_above_one() {
        let mut f = field();
        for i in 0..50 {
            f.burst(Point::new(i as f32, 0.0), 0xFFFF0000, 6.0);
        }
        assert!(f.particles().iter().all(|p| p.life > 1.0));
        assert!(f.particles().iter().all(|p| p.vy < 0.0));
        assert!(f.particles().iter().all(|p| p.size >= 3.0 && p.size <= 6.0));
    }

    #[test]
    fn step_applies_physics() {
        let mut f = field();
        f.burst(Point::new(0.0, 0.0), 0xFF00FF00, 4.0);
        let before = f.particles()[0].clone();
        f.step();
        let after = &f.particles()[0];
        assert!((after.pos.x - before.vx).abs() < 1e-6);
        assert!((after.pos.y - before.vy).abs() < 1e-6);
        assert!((after.vy - (before.vy + 0.15)).abs() < 1e-6);
        assert!((after.vx - before.vx * 0.98).abs() < 1e-6);
        assert!((after.life - (before.life - 0.02)).abs() < 1e-6);
        assert!(after.size < before.size);
    }

    #[test]
    fn all_particles_expire_within_bound() {
        let mut f = field();
        for _ in 0..100 {
            f.burst(Point::new(0.0, 0.0), 0xFFFFFFFF, 5.0);
        }
        // Max life 1.25, decay 0.02 → gone within 63 steps.
        let bound = (1.25_f32 / 0.02).ceil() as usize + 1;
        for _ in 0..bound { f.step(); }
        assert!(f.is_empty());
    }

    #[test]
    fn opacity_is_clamped_life() {
        let p = Particle {
            pos: Point::new(0.0, 0.0), vx: 0.0, vy: 0.0,
            color: 0, size: 1.0, life: 1.1,
        };
        assert_eq!(p.opacity(), 1.0);
    }
}
