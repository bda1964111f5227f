//! Obstacles and their manager
//!
//! Spawn pacing and weighted type selection scale with difficulty, which in
//! turn tracks scrolled distance. The manager owns a pooled entity set, the
//! pattern ("combo") spawner, and the collision query against the player.

use glam::Vec2;
use rand::Rng;

use crate::consts::*;
use crate::geom::{self, Rect};
use crate::render::{Color, DrawTarget};

use super::particles::{self, Particle};
use super::player::Player;
use super::pool::{Pool, PoolEntity};
use super::timer::Timer;

/// Obstacle variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObstacleKind {
    Rock,
    Gap,
    Moving,
    Spike,
    Shuriken,
}

/// Hit-shape selector used by the collision query
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HitShape {
    Rect,
    Circle { radius: f32 },
    /// Fall-through zone anchored at the ground line
    GroundGap,
}

/// Static per-kind tuning
#[derive(Debug, Clone, Copy)]
pub struct ObstacleSpec {
    pub width: f32,
    pub height: f32,
    pub color: Color,
    pub damage: f32,
    /// Scales the world scroll speed for this kind
    pub speed_modifier: f32,
    pub hit_shape: HitShape,
    /// Mobile kinds get a movement pattern assigned at spawn
    pub mobile: bool,
}

static ROCK: ObstacleSpec = ObstacleSpec {
    width: 40.0,
    height: 50.0,
    color: Color::rgb(0x8b, 0x45, 0x13),
    damage: 10.0,
    speed_modifier: 1.0,
    hit_shape: HitShape::Rect,
    mobile: false,
};

static GAP: ObstacleSpec = ObstacleSpec {
    width: 80.0,
    height: 0.0,
    color: Color::rgb(0x2a, 0x1b, 0x3a),
    damage: 0.0,
    speed_modifier: 1.0,
    hit_shape: HitShape::GroundGap,
    mobile: false,
};

static MOVING: ObstacleSpec = ObstacleSpec {
    width: 50.0,
    height: 40.0,
    color: Color::rgb(0xa0, 0x52, 0x2d),
    damage: 15.0,
    speed_modifier: 1.2,
    hit_shape: HitShape::Rect,
    mobile: true,
};

static SPIKE: ObstacleSpec = ObstacleSpec {
    width: 60.0,
    height: 30.0,
    color: Color::rgb(0xdc, 0x14, 0x3c),
    damage: 20.0,
    speed_modifier: 1.0,
    hit_shape: HitShape::Rect,
    mobile: false,
};

static SHURIKEN: ObstacleSpec = ObstacleSpec {
    width: 30.0,
    height: 30.0,
    color: Color::rgb(0xb0, 0xc4, 0xde),
    damage: 15.0,
    speed_modifier: 1.5,
    hit_shape: HitShape::Circle { radius: 15.0 },
    mobile: true,
};

impl ObstacleKind {
    pub const ALL: [ObstacleKind; 5] = [
        ObstacleKind::Rock,
        ObstacleKind::Gap,
        ObstacleKind::Moving,
        ObstacleKind::Spike,
        ObstacleKind::Shuriken,
    ];

    pub fn spec(self) -> &'static ObstacleSpec {
        match self {
            ObstacleKind::Rock => &ROCK,
            ObstacleKind::Gap => &GAP,
            ObstacleKind::Moving => &MOVING,
            ObstacleKind::Spike => &SPIKE,
            ObstacleKind::Shuriken => &SHURIKEN,
        }
    }

    /// Unknown names fall back to the default kind
    pub fn from_name(name: &str) -> ObstacleKind {
        match name.to_ascii_lowercase().as_str() {
            "gap" => ObstacleKind::Gap,
            "moving" => ObstacleKind::Moving,
            "spike" => ObstacleKind::Spike,
            "shuriken" => ObstacleKind::Shuriken,
            _ => ObstacleKind::Rock,
        }
    }
}

/// Movement patterns for mobile obstacles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovePattern {
    Horizontal,
    Vertical,
    Zigzag,
    Circular,
}

const MOVE_PATTERNS: [MovePattern; 4] = [
    MovePattern::Horizontal,
    MovePattern::Vertical,
    MovePattern::Zigzag,
    MovePattern::Circular,
];

const SPIKE_COUNT: usize = 5;
const SHURIKEN_SPIN: f32 = 6.0; // rad/s
const HIT_FLASH_DURATION: f32 = 0.3;

/// A pooled obstacle entity. Inactive slots take no part in collision,
/// spawn spacing or drawing.
#[derive(Debug)]
pub struct Obstacle {
    pub kind: ObstacleKind,
    /// Top-left corner, pattern offset included
    pub pos: Vec2,
    pub active: bool,

    /// Scrolling anchor the movement pattern offsets from
    origin: Vec2,
    move_pattern: Option<MovePattern>,
    move_range: f32,
    move_speed: f32,
    move_timer: f32,
    zigzag_offset: f32,
    zigzag_direction: f32,

    pub rotation: f32,
    spike_heights: [f32; SPIKE_COUNT],
    hit_flash: Timer,
    particles: Vec<Particle>,
}

impl Obstacle {
    fn new(kind: ObstacleKind) -> Self {
        Self {
            kind,
            pos: Vec2::ZERO,
            active: false,
            origin: Vec2::ZERO,
            move_pattern: None,
            move_range: 0.0,
            move_speed: 0.0,
            move_timer: 0.0,
            zigzag_offset: 0.0,
            zigzag_direction: 1.0,
            rotation: 0.0,
            spike_heights: [20.0; SPIKE_COUNT],
            hit_flash: Timer::new(),
            particles: Vec::new(),
        }
    }

    /// Reconfigure a pool slot in place: per-kind fields reset, transient
    /// state cleared, position set.
    fn configure<R: Rng + ?Sized>(&mut self, kind: ObstacleKind, x: f32, rng: &mut R) {
        let spec = kind.spec();
        self.kind = kind;
        let y = if spec.hit_shape == HitShape::GroundGap {
            GROUND_Y
        } else {
            GROUND_Y - spec.height
        };
        self.origin = Vec2::new(x, y);
        self.pos = self.origin;
        self.active = true;
        self.move_pattern = None;
        self.move_range = 0.0;
        self.move_speed = 0.0;
        self.move_timer = 0.0;
        self.zigzag_offset = 0.0;
        self.zigzag_direction = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
        self.rotation = 0.0;
        if kind == ObstacleKind::Spike {
            for h in self.spike_heights.iter_mut() {
                *h = rng.random_range(20.0..30.0);
            }
        }
        self.hit_flash.clear();
        self.particles.clear();
    }

    fn set_move_pattern(&mut self, pattern: MovePattern, range: f32, speed: f32) {
        self.move_pattern = Some(pattern);
        self.move_range = range;
        self.move_speed = speed;
    }

    fn update(&mut self, dt: f32, game_speed: f32) {
        if !self.active {
            return;
        }
        let spec = self.kind.spec();
        self.origin.x -= game_speed * spec.speed_modifier * PX_PER_SPEED * dt;
        self.move_timer += dt;

        let offset = match self.move_pattern {
            None => Vec2::ZERO,
            Some(MovePattern::Horizontal) => {
                Vec2::new((self.move_timer * 5.0).sin() * self.move_speed * 12.0, 0.0)
            }
            Some(MovePattern::Vertical) => {
                Vec2::new(0.0, (self.move_timer * 5.0).sin() * self.move_range)
            }
            Some(MovePattern::Zigzag) => {
                self.zigzag_offset +=
                    self.move_speed * PX_PER_SPEED * self.zigzag_direction * dt;
                if self.zigzag_offset.abs() > self.move_range {
                    self.zigzag_direction = -self.zigzag_direction;
                    self.zigzag_offset =
                        self.zigzag_offset.clamp(-self.move_range, self.move_range);
                }
                Vec2::new(self.zigzag_offset, (self.move_timer * 10.0).sin() * 30.0)
            }
            Some(MovePattern::Circular) => {
                let angle = self.move_timer * 5.0;
                Vec2::new(angle.cos(), angle.sin()) * self.move_range
            }
        };
        self.pos = self.origin + offset;

        if self.kind == ObstacleKind::Shuriken {
            self.rotation += SHURIKEN_SPIN * dt;
        }

        self.hit_flash.tick(dt);
        particles::update_particles(&mut self.particles, dt);

        if self.pos.x + spec.width < -OFFSCREEN_MARGIN {
            self.active = false;
        }
    }

    /// The geometric region used for collision, distinct from the visual
    /// bounds
    fn hit_rect(&self) -> Rect {
        let spec = self.kind.spec();
        match spec.hit_shape {
            HitShape::GroundGap => Rect::new(self.pos.x, GROUND_Y, spec.width, 100.0),
            _ => Rect::new(self.pos.x, self.pos.y, spec.width, spec.height),
        }
    }

    fn collides_with(&self, player_box: &Rect) -> bool {
        let spec = self.kind.spec();
        match spec.hit_shape {
            HitShape::Rect => self.hit_rect().overlaps(player_box),
            HitShape::Circle { radius } => {
                let center = Vec2::new(
                    self.pos.x + spec.width / 2.0,
                    self.pos.y + spec.height / 2.0,
                );
                geom::circle_overlaps_rect(center, radius, player_box)
            }
            HitShape::GroundGap => {
                let gap = self.hit_rect();
                player_box.bottom() > gap.y
                    && player_box.right() > gap.x
                    && player_box.x < gap.right()
            }
        }
    }

    /// Transient hit feedback; the obstacle stays active until it scrolls
    /// off screen.
    fn mark_hit<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.hit_flash.start(HIT_FLASH_DURATION);
        let spec = self.kind.spec();
        for _ in 0..8 {
            self.particles.push(Particle {
                pos: Vec2::new(
                    self.pos.x + rng.random_range(0.0..spec.width.max(1.0)),
                    self.pos.y + rng.random_range(0.0..spec.height.max(1.0)),
                ),
                vel: Vec2::new(rng.random_range(-300.0..300.0), rng.random_range(-300.0..300.0)),
                size: rng.random_range(2.0..6.0),
                color: Color::RED,
                life: rng.random_range(0.5..1.0),
                gravity: 0.0,
            });
        }
    }

    fn draw(&self, target: &mut dyn DrawTarget) {
        if !self.active {
            return;
        }
        let spec = self.kind.spec();

        if self.hit_flash.active() {
            target.fill_rect(
                Rect::new(
                    self.pos.x - 5.0,
                    self.pos.y - 5.0,
                    spec.width + 10.0,
                    spec.height + 10.0,
                ),
                Color::RED.with_alpha(0.5),
            );
        }

        match self.kind {
            ObstacleKind::Rock | ObstacleKind::Moving => {
                target.fill_rect(
                    Rect::new(self.pos.x, self.pos.y, spec.width, spec.height),
                    spec.color,
                );
                target.fill_rect(
                    Rect::new(self.pos.x + 5.0, self.pos.y + 5.0, spec.width - 10.0, 10.0),
                    Color::WHITE.with_alpha(0.2),
                );
                if self.kind == ObstacleKind::Moving {
                    target.draw_text(
                        Vec2::new(self.pos.x + spec.width / 2.0, self.pos.y + spec.height / 2.0),
                        "!",
                        16.0,
                        Color::WHITE,
                    );
                }
            }
            ObstacleKind::Gap => {
                target.fill_rect(Rect::new(self.pos.x, GROUND_Y, spec.width, 50.0), spec.color);
                target.draw_text(
                    Vec2::new(self.pos.x + spec.width / 2.0, GROUND_Y + 25.0),
                    "!",
                    20.0,
                    Color::RED,
                );
            }
            ObstacleKind::Spike => {
                let base_y = self.pos.y + spec.height - 10.0;
                target.fill_rect(
                    Rect::new(self.pos.x, base_y, spec.width, 10.0),
                    Color::rgb(0x8b, 0x45, 0x13),
                );
                for (i, height) in self.spike_heights.iter().enumerate() {
                    let x = self.pos.x + (i as f32 / (SPIKE_COUNT - 1) as f32) * spec.width;
                    target.fill_triangle(
                        Vec2::new(x, base_y),
                        Vec2::new(x - 5.0, base_y - height),
                        Vec2::new(x + 5.0, base_y - height),
                        spec.color,
                    );
                }
            }
            ObstacleKind::Shuriken => {
                let center = Vec2::new(
                    self.pos.x + spec.width / 2.0,
                    self.pos.y + spec.height / 2.0,
                );
                for i in 0..4 {
                    let angle = self.rotation + std::f32::consts::FRAC_PI_2 * i as f32;
                    let tip = geom::rotate_about(
                        center + Vec2::new(0.0, -spec.height / 2.0),
                        center,
                        angle,
                    );
                    let left = geom::rotate_about(
                        center + Vec2::new(-spec.width / 3.0, 0.0),
                        center,
                        angle,
                    );
                    let right = geom::rotate_about(
                        center + Vec2::new(spec.width / 3.0, 0.0),
                        center,
                        angle,
                    );
                    target.fill_triangle(tip, left, right, spec.color);
                }
                target.fill_circle(center, spec.width / 4.0, Color::rgb(0x2a, 0x1b, 0x3a));
            }
        }

        particles::draw_particles(&self.particles, target);
    }
}

impl PoolEntity for Obstacle {
    type Kind = ObstacleKind;

    fn kind(&self) -> ObstacleKind {
        self.kind
    }

    fn in_use(&self) -> bool {
        self.active
    }
}

/// Collision report handed to the engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionHit {
    pub kind: ObstacleKind,
    pub damage: f32,
}

const BASE_SPAWN_INTERVAL: f32 = 1.5;
const MIN_SPAWN_INTERVAL: f32 = 0.5;
const MAX_DIFFICULTY: f32 = 10.0;
const MAX_ACTIVE: usize = 20;
/// Guaranteed passable spacing between consecutive spawns
const MIN_SPACING: f32 = 200.0;
const GAP_EXTRA_SPACING: f32 = 100.0;
const PATTERN_CHANCE: f64 = 0.3;
const PATTERN_MIN_DIFFICULTY: f32 = 4.0;
const PATTERN_CLOCK_INTERVAL: f32 = 10.0;
const PATTERN_CLOCK_MIN_DIFFICULTY: f32 = 5.0;
const PATTERN_SPACING: f32 = 150.0;

const PATTERNS: [&[ObstacleKind]; 4] = [
    &[ObstacleKind::Rock, ObstacleKind::Gap, ObstacleKind::Rock],
    &[ObstacleKind::Moving, ObstacleKind::Moving],
    &[ObstacleKind::Spike, ObstacleKind::Gap, ObstacleKind::Spike],
    &[
        ObstacleKind::Shuriken,
        ObstacleKind::Shuriken,
        ObstacleKind::Shuriken,
    ],
];

#[derive(Debug)]
pub struct ObstacleManager {
    pool: Pool<Obstacle>,
    /// Active pool indices in spawn order; collision iterates this order
    active: Vec<usize>,
    /// Members of the latest spawned pattern still alive
    combo_set: Vec<usize>,
    spawn_timer: f32,
    spawn_interval: f32,
    pattern_clock: f32,
    difficulty: f32,
    distance: f64,
    weights: [f32; 5],
}

impl Default for ObstacleManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ObstacleManager {
    pub fn new() -> Self {
        let mut mgr = Self {
            pool: Pool::new(),
            active: Vec::new(),
            combo_set: Vec::new(),
            spawn_timer: 0.0,
            spawn_interval: BASE_SPAWN_INTERVAL,
            pattern_clock: 0.0,
            difficulty: 1.0,
            distance: 0.0,
            weights: [0.0; 5],
        };
        mgr.update_weights();
        mgr
    }

    pub fn update<R: Rng + ?Sized>(&mut self, dt: f32, game_speed: f32, rng: &mut R) {
        self.distance += (game_speed * dt * METERS_PER_SPEED) as f64;
        self.update_difficulty();

        self.spawn_timer += dt;
        if self.spawn_timer >= self.spawn_interval {
            self.spawn_timer = 0.0;
            self.spawn(rng);
            if self.difficulty > PATTERN_MIN_DIFFICULTY - 1.0 && rng.random_bool(PATTERN_CHANCE)
            {
                self.spawn_pattern(rng);
            }
        }

        self.pattern_clock += dt;
        if self.pattern_clock >= PATTERN_CLOCK_INTERVAL
            && self.difficulty > PATTERN_CLOCK_MIN_DIFFICULTY
        {
            self.pattern_clock = 0.0;
            self.spawn_pattern(rng);
        }

        for &idx in &self.active {
            self.pool.get_mut(idx).update(dt, game_speed);
        }
        self.recycle();
    }

    /// Difficulty tracks distance monotonically; the spawn interval shrinks
    /// with it down to a floor, and the weight table shifts toward the
    /// harder kinds.
    fn update_difficulty(&mut self) {
        self.difficulty = (1.0 + self.distance as f32 * 0.0001).min(MAX_DIFFICULTY);
        self.spawn_interval =
            (BASE_SPAWN_INTERVAL - (self.difficulty - 1.0) * 0.1).max(MIN_SPAWN_INTERVAL);
        self.update_weights();
    }

    fn update_weights(&mut self) {
        let f = self.difficulty / MAX_DIFFICULTY;
        // Order matches ObstacleKind::ALL
        self.weights = [
            (40.0 - f * 30.0).max(10.0), // rock
            25.0 + f * 10.0,             // gap
            20.0 + f * 15.0,             // moving
            10.0 + f * 10.0,             // spike
            5.0 + f * 20.0,              // shuriken
        ];
    }

    fn spawn<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if self.active.len() >= MAX_ACTIVE {
            return;
        }
        let kind = ObstacleKind::ALL[geom::weighted_index(rng, &self.weights)];

        let mut x = VIEW_WIDTH;
        if let Some(&last_idx) = self.active.last() {
            let last = self.pool.get(last_idx);
            let spacing = MIN_SPACING
                + if kind == ObstacleKind::Gap {
                    GAP_EXTRA_SPACING
                } else {
                    0.0
                };
            x = x.max(last.pos.x + last.kind.spec().width + spacing);
        }

        let idx = self.acquire(kind, x, rng);
        if kind.spec().mobile {
            let pattern = MOVE_PATTERNS[rng.random_range(0..MOVE_PATTERNS.len())];
            let range = rng.random_range(50.0..150.0);
            let speed = rng.random_range(1.0..3.0);
            self.pool.get_mut(idx).set_move_pattern(pattern, range, speed);
        }
        self.active.push(idx);
    }

    /// Pattern spawns place a short fixed sequence beyond the right edge.
    /// Members share the combo set so the warning indicator can track them
    /// as a unit.
    fn spawn_pattern<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if self.difficulty < PATTERN_MIN_DIFFICULTY {
            return;
        }
        let pattern = PATTERNS[rng.random_range(0..PATTERNS.len())];
        self.combo_set.clear();
        for (i, &kind) in pattern.iter().enumerate() {
            if self.active.len() >= MAX_ACTIVE {
                break;
            }
            let x = VIEW_WIDTH + i as f32 * PATTERN_SPACING;
            let idx = self.acquire(kind, x, rng);
            if kind == ObstacleKind::Shuriken {
                self.pool
                    .get_mut(idx)
                    .set_move_pattern(MovePattern::Circular, 30.0 + i as f32 * 20.0, 1.0);
            }
            self.active.push(idx);
            self.combo_set.push(idx);
        }
    }

    fn acquire<R: Rng + ?Sized>(&mut self, kind: ObstacleKind, x: f32, rng: &mut R) -> usize {
        let idx = self.pool.acquire(kind, || Obstacle::new(kind));
        self.pool.get_mut(idx).configure(kind, x, rng);
        idx
    }

    /// Drop offscreen entities from the active list and park their slots
    fn recycle(&mut self) {
        let pool = &mut self.pool;
        self.active.retain(|&idx| {
            if pool.get(idx).active {
                true
            } else {
                pool.release(idx);
                false
            }
        });
        let pool = &self.pool;
        self.combo_set.retain(|&idx| pool.get(idx).active);
    }

    /// First colliding active obstacle in spawn order, if any. The obstacle
    /// is flagged "hit" but stays in play until it scrolls off screen.
    pub fn check_collision<R: Rng + ?Sized>(
        &mut self,
        player: &Player,
        rng: &mut R,
    ) -> Option<CollisionHit> {
        let player_box = player.hitbox();
        for &idx in &self.active {
            let obstacle = self.pool.get_mut(idx);
            if !obstacle.active {
                continue;
            }
            if obstacle.collides_with(&player_box) {
                obstacle.mark_hit(rng);
                return Some(CollisionHit {
                    kind: obstacle.kind,
                    damage: obstacle.kind.spec().damage,
                });
            }
        }
        None
    }

    /// Distance from `x` to the leading edge of the nearest obstacle ahead
    pub fn nearest_ahead(&self, x: f32) -> Option<f32> {
        self.active
            .iter()
            .map(|&idx| self.pool.get(idx))
            .filter(|o| o.active && o.pos.x > x)
            .map(|o| o.pos.x - x)
            .min_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn pool_size(&self) -> usize {
        self.pool.len()
    }

    pub fn difficulty(&self) -> f32 {
        self.difficulty
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// Live members of the current pattern (0 = no pattern on screen)
    pub fn pattern_remaining(&self) -> usize {
        self.combo_set.len()
    }

    pub fn reset(&mut self) {
        for &idx in &self.active {
            self.pool.get_mut(idx).active = false;
        }
        self.recycle();
        self.combo_set.clear();
        self.spawn_timer = 0.0;
        self.pattern_clock = 0.0;
        self.distance = 0.0;
        self.difficulty = 1.0;
        self.update_difficulty();
    }

    pub fn draw(&self, target: &mut dyn DrawTarget) {
        for &idx in &self.active {
            self.pool.get(idx).draw(target);
        }
        // Shared warning indicator while a pattern is alive
        if !self.combo_set.is_empty() {
            target.draw_text(
                Vec2::new(VIEW_WIDTH / 2.0, 50.0),
                &format!("! PATTERN x{} !", self.combo_set.len()),
                24.0,
                Color::RED.with_alpha(0.7),
            );
        }
    }

    #[cfg(test)]
    pub(crate) fn spawn_at(&mut self, kind: ObstacleKind, x: f32) -> usize {
        use rand::SeedableRng;
        let mut rng = rand_pcg::Pcg32::seed_from_u64(0);
        let idx = self.acquire(kind, x, &mut rng);
        self.active.push(idx);
        idx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::RecordingTarget;
    use crate::sim::player::Character;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn rng() -> Pcg32 {
        Pcg32::seed_from_u64(4242)
    }

    #[test]
    fn test_spawn_respects_active_cap() {
        let mut mgr = ObstacleManager::new();
        let mut r = rng();
        // Zero speed keeps everything on screen while the timer fires
        for _ in 0..10_000 {
            mgr.update(BASE_SPAWN_INTERVAL, 0.0, &mut r);
        }
        assert!(mgr.active_count() <= MAX_ACTIVE);
    }

    #[test]
    fn test_difficulty_monotonic_and_clamped() {
        let mut mgr = ObstacleManager::new();
        let mut r = rng();
        let mut last = mgr.difficulty();
        for _ in 0..2_000 {
            mgr.update(1.0, MAX_GAME_SPEED, &mut r);
            assert!(mgr.difficulty() >= last);
            last = mgr.difficulty();
        }
        assert_eq!(mgr.difficulty(), MAX_DIFFICULTY);
        assert!(mgr.spawn_interval >= MIN_SPAWN_INTERVAL);
    }

    #[test]
    fn test_weights_stay_positive() {
        let mut mgr = ObstacleManager::new();
        mgr.difficulty = MAX_DIFFICULTY;
        mgr.update_weights();
        for w in mgr.weights {
            assert!(w > 0.0);
        }
    }

    #[test]
    fn test_rock_collision_reports_damage() {
        let mut mgr = ObstacleManager::new();
        let player = Player::new(Character::Akira);
        let mut r = rng();

        // Far away: no hit
        mgr.spawn_at(ObstacleKind::Rock, 800.0);
        assert!(mgr.check_collision(&player, &mut r).is_none());

        // On top of the player
        let idx = mgr.spawn_at(ObstacleKind::Rock, player.pos.x);
        let hit = mgr.check_collision(&player, &mut r).expect("overlap");
        assert_eq!(hit.kind, ObstacleKind::Rock);
        assert_eq!(hit.damage, 10.0);
        assert!(mgr.pool.get(idx).hit_flash.active());
        // Hit obstacles stay active
        assert!(mgr.pool.get(idx).active);
    }

    #[test]
    fn test_gap_only_triggers_below_ground() {
        let mut mgr = ObstacleManager::new();
        let mut player = Player::new(Character::Akira);
        let mut r = rng();
        mgr.spawn_at(ObstacleKind::Gap, player.pos.x);

        // Standing on the ground the hitbox bottom sits above the gap lip
        assert!(mgr.check_collision(&player, &mut r).is_none());

        // Sunk below the ground line: falling in
        player.pos.y += 20.0;
        let hit = mgr.check_collision(&player, &mut r).expect("fall");
        assert_eq!(hit.kind, ObstacleKind::Gap);
        assert_eq!(hit.damage, 0.0);
    }

    #[test]
    fn test_shuriken_uses_circular_hitbox() {
        let mut mgr = ObstacleManager::new();
        let player = Player::new(Character::Akira);
        let mut r = rng();
        // Corner-adjacent placement: bounding boxes touch but the disc misses
        let idx = mgr.spawn_at(ObstacleKind::Shuriken, player.hitbox().right() - 2.0);
        mgr.pool.get_mut(idx).pos.y = player.hitbox().y - 28.0;
        mgr.pool.get_mut(idx).origin = mgr.pool.get(idx).pos;
        assert!(mgr.check_collision(&player, &mut r).is_none());
    }

    #[test]
    fn test_offscreen_entities_are_recycled() {
        let mut mgr = ObstacleManager::new();
        let mut r = rng();
        mgr.spawn_at(ObstacleKind::Rock, 10.0);
        assert_eq!(mgr.active_count(), 1);
        // Scroll it far off the left edge
        for _ in 0..120 {
            mgr.update(1.0 / 60.0, MAX_GAME_SPEED, &mut r);
        }
        assert_eq!(
            mgr.active
                .iter()
                .filter(|&&i| mgr.pool.get(i).pos.x < 0.0)
                .count(),
            0
        );
        assert!(mgr.pool_size() >= 1);
    }

    #[test]
    fn test_inactive_excluded_from_draw() {
        let mut mgr = ObstacleManager::new();
        let idx = mgr.spawn_at(ObstacleKind::Rock, 400.0);
        let mut drawn = RecordingTarget::new();
        mgr.draw(&mut drawn);
        assert!(drawn.shape_count() > 0);

        mgr.pool.get_mut(idx).active = false;
        mgr.recycle();
        let mut empty = RecordingTarget::new();
        mgr.draw(&mut empty);
        assert_eq!(empty.shape_count(), 0);
    }

    #[test]
    fn test_spawn_spacing_enforced() {
        let mut mgr = ObstacleManager::new();
        let mut r = rng();
        // Force back-to-back spawns with no scrolling
        mgr.spawn(&mut r);
        mgr.spawn(&mut r);
        assert_eq!(mgr.active_count(), 2);
        let first = mgr.pool.get(mgr.active[0]);
        let second = mgr.pool.get(mgr.active[1]);
        let gap = second.pos.x - (first.pos.x + first.kind.spec().width);
        assert!(gap >= MIN_SPACING - f32::EPSILON);
    }

    #[test]
    fn test_pattern_spawn_fills_combo_set() {
        let mut mgr = ObstacleManager::new();
        let mut r = rng();
        mgr.difficulty = 6.0;
        mgr.spawn_pattern(&mut r);
        assert!(mgr.pattern_remaining() >= 2);
        // Below the gate nothing spawns
        let mut cold = ObstacleManager::new();
        cold.spawn_pattern(&mut r);
        assert_eq!(cold.pattern_remaining(), 0);
    }

    #[test]
    fn test_kind_fallback() {
        assert_eq!(ObstacleKind::from_name("spike"), ObstacleKind::Spike);
        assert_eq!(ObstacleKind::from_name("boulder"), ObstacleKind::Rock);
    }
}
