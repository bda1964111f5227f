//! Cosmetic particles
//!
//! Purely visual. Particles never participate in collision, scoring or
//! spawn-overlap checks.

use glam::Vec2;

use crate::render::{Color, DrawTarget};

/// Life drains at this rate per second (~0.8 s default lifetime)
const LIFE_DECAY: f32 = 1.2;

#[derive(Debug, Clone, Copy)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
    pub color: Color,
    /// 1.0 at spawn, dead at 0.0; doubles as draw alpha
    pub life: f32,
    /// Downward acceleration, px/s^2 (0 for floaty sparkles)
    pub gravity: f32,
}

impl Particle {
    pub fn update(&mut self, dt: f32) {
        self.pos += self.vel * dt;
        self.vel.y += self.gravity * dt;
        self.life -= LIFE_DECAY * dt;
    }

    #[inline]
    pub fn alive(&self) -> bool {
        self.life > 0.0
    }
}

/// Advance all particles and drop the dead ones
pub fn update_particles(particles: &mut Vec<Particle>, dt: f32) {
    for p in particles.iter_mut() {
        p.update(dt);
    }
    particles.retain(Particle::alive);
}

pub fn draw_particles(particles: &[Particle], target: &mut dyn DrawTarget) {
    for p in particles {
        target.fill_circle(p.pos, p.size, p.color.with_alpha(p.life.min(1.0)));
    }
}
