//! Player character
//!
//! Physics (gravity, jump, double jump), health/damage/invincibility,
//! timed buffs and the per-character special ability. The player is created
//! once per session and reset between runs, never recreated.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::geom::Rect;
use crate::render::{Color, DrawTarget};

use super::particles::{self, Particle};
use super::timer::Timer;

/// Playable roster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Character {
    Akira,
    Ryu,
    Hana,
    Kenji,
}

/// Character special abilities
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ability {
    /// Flickering after-images around the runner
    ShadowClone,
    /// Stream of flame projectles ahead of the runner
    Fireball,
    /// Restores health on activation
    Healing,
    /// Crackling arcs around the runner
    Lightning,
}

/// Static per-character tuning
#[derive(Debug, Clone, Copy)]
pub struct CharacterSpec {
    pub name: &'static str,
    pub color: Color,
    pub accent: Color,
    pub jump_multiplier: f32,
    pub speed_multiplier: f32,
    pub ability: Ability,
    /// Cooldown starts counting the moment the ability activates
    pub ability_cooldown: f32,
    pub ability_duration: f32,
    /// Scrolls required to unlock; 0 = available from the start
    pub unlock_scrolls: u64,
}

static AKIRA: CharacterSpec = CharacterSpec {
    name: "Akira",
    color: Color::rgb(0xff, 0x6b, 0x00),
    accent: Color::rgb(0xff, 0x95, 0x00),
    jump_multiplier: 1.0,
    speed_multiplier: 1.0,
    ability: Ability::ShadowClone,
    ability_cooldown: 10.0,
    ability_duration: 5.0,
    unlock_scrolls: 0,
};

static RYU: CharacterSpec = CharacterSpec {
    name: "Ryu",
    color: Color::rgb(0x94, 0x00, 0xd3),
    accent: Color::rgb(0x4b, 0x00, 0x82),
    jump_multiplier: 1.1,
    speed_multiplier: 1.2,
    ability: Ability::Fireball,
    ability_cooldown: 8.0,
    ability_duration: 3.0,
    unlock_scrolls: 100,
};

static HANA: CharacterSpec = CharacterSpec {
    name: "Hana",
    color: Color::rgb(0xff, 0x14, 0x93),
    accent: Color::rgb(0xff, 0x69, 0xb4),
    jump_multiplier: 0.9,
    speed_multiplier: 0.8,
    ability: Ability::Healing,
    ability_cooldown: 15.0,
    ability_duration: 4.0,
    unlock_scrolls: 500,
};

static KENJI: CharacterSpec = CharacterSpec {
    name: "Kenji",
    color: Color::rgb(0x80, 0x80, 0x80),
    accent: Color::rgb(0xa0, 0xa0, 0xa0),
    jump_multiplier: 1.0,
    speed_multiplier: 1.1,
    ability: Ability::Lightning,
    ability_cooldown: 12.0,
    ability_duration: 4.0,
    unlock_scrolls: 1000,
};

impl Character {
    pub const ALL: [Character; 4] = [
        Character::Akira,
        Character::Ryu,
        Character::Hana,
        Character::Kenji,
    ];

    pub fn spec(self) -> &'static CharacterSpec {
        match self {
            Character::Akira => &AKIRA,
            Character::Ryu => &RYU,
            Character::Hana => &HANA,
            Character::Kenji => &KENJI,
        }
    }

    /// Unknown names fall back to the default character
    pub fn from_name(name: &str) -> Character {
        match name.to_ascii_lowercase().as_str() {
            "ryu" => Character::Ryu,
            "hana" => Character::Hana,
            "kenji" => Character::Kenji,
            _ => Character::Akira,
        }
    }
}

/// Healing ability restores this much health
const HEALING_AMOUNT: f32 = 30.0;
/// Dust trail cadence while running (seconds)
const TRAIL_INTERVAL: f32 = 0.05;
const MAX_TRAIL_PARTICLES: usize = 10;

#[derive(Debug)]
pub struct Player {
    pub character: Character,
    /// Top-left corner of the body
    pub pos: Vec2,
    pub velocity_y: f32,
    pub health: f32,

    jumping: bool,
    can_double_jump: bool,
    double_jumps_used: u32,

    invincibility: Timer,
    speed_boost: Timer,
    boost_multiplier: f32,
    ability_active: Timer,
    ability_cooldown: Timer,

    run_phase: f32,
    time: f32,
    trail_clock: f32,
    ability_clock: f32,
    pub particles: Vec<Particle>,
}

impl Player {
    pub fn new(character: Character) -> Self {
        Self {
            character,
            pos: Vec2::new(PLAYER_X, Self::base_y()),
            velocity_y: 0.0,
            health: MAX_HEALTH,
            jumping: false,
            can_double_jump: false,
            double_jumps_used: 0,
            invincibility: Timer::new(),
            speed_boost: Timer::new(),
            boost_multiplier: 1.0,
            ability_active: Timer::new(),
            ability_cooldown: Timer::new(),
            run_phase: 0.0,
            time: 0.0,
            trail_clock: 0.0,
            ability_clock: 0.0,
            particles: Vec::new(),
        }
    }

    /// Resting y of the body's top edge (feet on the ground line)
    fn base_y() -> f32 {
        GROUND_Y - PLAYER_HEIGHT
    }

    /// First press jumps from the ground and arms one double jump; a second
    /// press in the air spends that charge at reduced power. Returns false
    /// when neither applies.
    pub fn jump(&mut self) -> bool {
        let spec = self.character.spec();
        if !self.jumping {
            self.velocity_y = -JUMP_IMPULSE * spec.jump_multiplier;
            self.jumping = true;
            self.can_double_jump = true;
            self.spawn_jump_burst();
            true
        } else if self.can_double_jump && self.double_jumps_used < MAX_DOUBLE_JUMPS {
            self.velocity_y = -JUMP_IMPULSE * spec.jump_multiplier * DOUBLE_JUMP_FACTOR;
            self.double_jumps_used += 1;
            self.can_double_jump = false;
            self.spawn_double_jump_ring();
            true
        } else {
            false
        }
    }

    /// Apply damage. A no-op while invincible. A survivable hit grants the
    /// post-hit grace window. Returns true when health reached zero.
    pub fn take_damage(&mut self, amount: f32) -> bool {
        if self.is_invincible() {
            return false;
        }
        self.health = (self.health - amount).max(0.0);
        self.spawn_damage_spray();
        if self.health > 0.0 {
            self.invincibility.start(INVINCIBILITY_DURATION);
        }
        self.health <= 0.0
    }

    pub fn heal(&mut self, amount: f32) {
        self.health = (self.health + amount).min(MAX_HEALTH);
        self.spawn_heal_sparkles();
    }

    /// Reapplication overwrites the multiplier and restarts the window
    pub fn apply_speed_boost(&mut self, multiplier: f32, duration: f32) {
        self.boost_multiplier = multiplier;
        self.speed_boost.start(duration);
    }

    /// Grace window granted by pickups (kunai) rather than damage
    pub fn grant_invincibility(&mut self, duration: f32) {
        self.invincibility.start(duration);
    }

    /// Activate the character ability. Duration and cooldown timers start
    /// together, so availability is gated purely by cooldown expiry.
    pub fn activate_special_ability(&mut self) -> bool {
        if self.ability_cooldown.active() || self.ability_active.active() {
            return false;
        }
        let spec = self.character.spec();
        self.ability_active.start(spec.ability_duration);
        self.ability_cooldown.start(spec.ability_cooldown);
        if spec.ability == Ability::Healing {
            self.heal(HEALING_AMOUNT);
        }
        true
    }

    #[inline]
    pub fn is_invincible(&self) -> bool {
        self.invincibility.active()
    }

    #[inline]
    pub fn is_grounded(&self) -> bool {
        !self.jumping
    }

    pub fn ability_active(&self) -> bool {
        self.ability_active.active()
    }

    pub fn ability_ready(&self) -> bool {
        self.ability_cooldown.expired() && self.ability_active.expired()
    }

    /// Effective scroll contribution: character trait times any live boost
    pub fn speed_multiplier(&self) -> f32 {
        let boost = if self.speed_boost.active() {
            self.boost_multiplier
        } else {
            1.0
        };
        self.character.spec().speed_multiplier * boost
    }

    /// Collision rectangle, smaller than the visual body
    pub fn hitbox(&self) -> Rect {
        Rect::new(
            self.pos.x + 5.0,
            self.pos.y + 10.0,
            PLAYER_WIDTH - 10.0,
            PLAYER_HEIGHT - 15.0,
        )
    }

    /// Swap the selected character. Unlock gating is the engine's job.
    pub fn set_character(&mut self, character: Character) {
        self.character = character;
    }

    pub fn update<R: Rng + ?Sized>(&mut self, dt: f32, game_speed: f32, rng: &mut R) {
        self.time += dt;

        self.velocity_y += GRAVITY * dt;
        self.pos.y += self.velocity_y * dt;

        // Ground contact resets the jump chain
        if self.pos.y >= Self::base_y() {
            self.pos.y = Self::base_y();
            self.velocity_y = 0.0;
            self.jumping = false;
            self.can_double_jump = false;
            self.double_jumps_used = 0;
        }

        self.run_phase = (self.run_phase + 0.15 * game_speed * dt * 60.0) % 4.0;

        self.invincibility.tick(dt);
        if self.speed_boost.tick(dt) {
            self.boost_multiplier = 1.0;
        }
        self.ability_cooldown.tick(dt);
        if self.ability_active.tick(dt) {
            // Ability wound down; its aura goes with it
            self.particles.clear();
        }

        if self.ability_active.active() {
            self.ability_clock += dt;
            self.spawn_ability_particles(rng);
        }

        self.trail_clock += dt;
        if self.trail_clock > TRAIL_INTERVAL && self.is_grounded() {
            self.trail_clock = 0.0;
            self.spawn_trail_particle(rng, game_speed);
        }

        particles::update_particles(&mut self.particles, dt);
    }

    pub fn reset(&mut self) {
        self.pos = Vec2::new(PLAYER_X, Self::base_y());
        self.velocity_y = 0.0;
        self.health = MAX_HEALTH;
        self.jumping = false;
        self.can_double_jump = false;
        self.double_jumps_used = 0;
        self.invincibility.clear();
        self.speed_boost.clear();
        self.boost_multiplier = 1.0;
        self.ability_active.clear();
        self.ability_cooldown.clear();
        self.run_phase = 0.0;
        self.trail_clock = 0.0;
        self.ability_clock = 0.0;
        self.particles.clear();
    }

    // === Particle effects ===

    fn spawn_jump_burst(&mut self) {
        let spec = self.character.spec();
        let feet = Vec2::new(self.pos.x + PLAYER_WIDTH / 2.0, self.pos.y + PLAYER_HEIGHT);
        for i in 0..8 {
            let angle = std::f32::consts::TAU * (i as f32 / 8.0);
            self.particles.push(Particle {
                pos: feet,
                vel: Vec2::new(angle.cos() * 120.0, -angle.sin().abs() * 120.0 - 60.0),
                size: 3.0,
                color: spec.accent,
                life: 1.0,
                gravity: 360.0,
            });
        }
    }

    fn spawn_double_jump_ring(&mut self) {
        let center = self.pos + Vec2::new(PLAYER_WIDTH / 2.0, PLAYER_HEIGHT / 2.0);
        for i in 0..12 {
            let angle = std::f32::consts::TAU * (i as f32 / 12.0);
            self.particles.push(Particle {
                pos: center,
                vel: Vec2::new(angle.cos(), angle.sin()) * 180.0,
                size: 4.0,
                color: Color::WHITE,
                life: 1.0,
                gravity: 0.0,
            });
        }
    }

    fn spawn_damage_spray(&mut self) {
        let center = self.pos + Vec2::new(PLAYER_WIDTH / 2.0, PLAYER_HEIGHT / 2.0);
        for i in 0..15 {
            let angle = std::f32::consts::TAU * (i as f32 / 15.0);
            self.particles.push(Particle {
                pos: center,
                vel: Vec2::new(angle.cos(), angle.sin()) * 240.0,
                size: 2.5,
                color: Color::RED,
                life: 1.0,
                gravity: 120.0,
            });
        }
    }

    fn spawn_heal_sparkles(&mut self) {
        let center = self.pos + Vec2::new(PLAYER_WIDTH / 2.0, PLAYER_HEIGHT / 2.0);
        for i in 0..10 {
            let angle = std::f32::consts::TAU * (i as f32 / 10.0);
            self.particles.push(Particle {
                pos: center,
                vel: Vec2::new(angle.cos(), angle.sin()) * 90.0,
                size: 3.0,
                color: Color::rgb(0x4c, 0xaf, 0x50),
                life: 1.0,
                gravity: -60.0,
            });
        }
    }

    fn spawn_ability_particles<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let spec = self.character.spec();
        match spec.ability {
            Ability::ShadowClone => {
                if self.ability_clock > 0.1 {
                    self.ability_clock = 0.0;
                    self.particles.push(Particle {
                        pos: self.pos
                            + Vec2::new(
                                rng.random_range(0.0..PLAYER_WIDTH),
                                rng.random_range(0.0..PLAYER_HEIGHT),
                            ),
                        vel: Vec2::new(-90.0, 0.0),
                        size: rng.random_range(5.0..15.0),
                        color: spec.accent.with_alpha(0.5),
                        life: 0.5,
                        gravity: 0.0,
                    });
                }
            }
            Ability::Fireball => {
                if self.ability_clock > 0.05 {
                    self.ability_clock = 0.0;
                    self.particles.push(Particle {
                        pos: self.pos + Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT / 2.0),
                        vel: Vec2::new(180.0, rng.random_range(-60.0..60.0)),
                        size: rng.random_range(4.0..10.0),
                        color: Color::rgb(0xff, 0x45, 0x00),
                        life: 1.0,
                        gravity: 0.0,
                    });
                }
            }
            Ability::Lightning => {
                if self.ability_clock > 0.08 {
                    self.ability_clock = 0.0;
                    let center = self.pos + Vec2::new(PLAYER_WIDTH / 2.0, PLAYER_HEIGHT / 2.0);
                    let angle = rng.random_range(0.0..std::f32::consts::TAU);
                    self.particles.push(Particle {
                        pos: center + Vec2::new(angle.cos(), angle.sin()) * 30.0,
                        vel: Vec2::new(angle.cos(), angle.sin()) * 60.0,
                        size: 2.0,
                        color: Color::CYAN,
                        life: 0.4,
                        gravity: 0.0,
                    });
                }
            }
            Ability::Healing => {}
        }
    }

    fn spawn_trail_particle<R: Rng + ?Sized>(&mut self, rng: &mut R, game_speed: f32) {
        if self.particles.len() >= MAX_TRAIL_PARTICLES {
            return;
        }
        let spec = self.character.spec();
        self.particles.push(Particle {
            pos: Vec2::new(
                self.pos.x + rng.random_range(0.0..PLAYER_WIDTH),
                self.pos.y + PLAYER_HEIGHT - 5.0,
            ),
            vel: Vec2::new(-game_speed * PX_PER_SPEED * 0.5, rng.random_range(-60.0..60.0)),
            size: rng.random_range(1.0..3.0),
            color: spec.color,
            life: rng.random_range(0.5..1.0),
            gravity: 0.0,
        });
    }

    // === Rendering ===

    pub fn draw(&self, target: &mut dyn DrawTarget) {
        particles::draw_particles(&self.particles, target);

        let spec = self.character.spec();

        // Flicker while the grace window runs
        let alpha = if self.is_invincible() {
            ((self.time * 20.0).sin() + 1.0) / 2.0
        } else {
            1.0
        };

        // Body, with a slight crouch on alternate run frames
        let crouch = if self.jumping {
            0.0
        } else {
            match self.run_phase as u32 {
                1 => 5.0,
                3 => 8.0,
                _ => 0.0,
            }
        };
        let body = Rect::new(
            self.pos.x,
            self.pos.y + crouch,
            PLAYER_WIDTH,
            PLAYER_HEIGHT - crouch,
        );
        target.fill_rect(body, spec.color.with_alpha(alpha));

        // Headband and emblem
        target.fill_rect(
            Rect::new(self.pos.x + 10.0, body.y, 20.0, 8.0),
            Color::WHITE.with_alpha(alpha),
        );
        target.fill_circle(
            Vec2::new(self.pos.x + 20.0, body.y + 4.0),
            3.0,
            Color::RED.with_alpha(alpha),
        );

        // Eyes
        target.fill_rect(
            Rect::new(self.pos.x + 15.0, body.y + 20.0, 5.0, 8.0),
            Color::WHITE.with_alpha(alpha),
        );
        target.fill_rect(
            Rect::new(self.pos.x + 30.0, body.y + 20.0, 5.0, 8.0),
            Color::WHITE.with_alpha(alpha),
        );

        // Sash
        target.fill_rect(
            Rect::new(self.pos.x + 5.0, body.bottom() - 15.0, PLAYER_WIDTH - 10.0, 10.0),
            spec.accent.with_alpha(alpha),
        );

        self.draw_health_bar(target);
    }

    fn draw_health_bar(&self, target: &mut dyn DrawTarget) {
        let bar = Rect::new(self.pos.x - 5.0, self.pos.y - 15.0, 50.0, 6.0);
        target.fill_rect(bar, Color::BLACK.with_alpha(0.5));

        let fraction = self.health / MAX_HEALTH;
        let color = if fraction > 0.5 {
            Color::rgb(0x4c, 0xaf, 0x50)
        } else if fraction > 0.25 {
            Color::rgb(0xff, 0xc1, 0x07)
        } else {
            Color::rgb(0xf4, 0x43, 0x36)
        };
        target.fill_rect(Rect::new(bar.x, bar.y, bar.w * fraction, bar.h), color);
    }
}
