//! Game orchestration
//!
//! The top-level state machine. Each playing frame it wires the background,
//! player and both managers together, reads back collision/collection
//! results, and applies the scoring, combo and damage rules. Storage and
//! audio collaborators are only touched at defined hook points and their
//! failures never reach the simulation.
//!
//! Pausing freezes gameplay updates without tearing anything down; every
//! effect is a duration timer fed by frame time, so a run resumes exactly
//! where it stopped.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::audio::{AudioManager, AudioSink, Sound};
use crate::background::Background;
use crate::consts::*;
use crate::geom::Rect;
use crate::highscores::HighScores;
use crate::persistence::{self, Progress, Storage, KEY_HIGH_SCORE, KEY_PROGRESS};
use crate::render::{Color, DrawTarget};
use crate::settings::Settings;

use super::item::{Collected, ItemEffect, ItemManager, MAGNET_DURATION};
use super::obstacle::{CollisionHit, ObstacleManager};
use super::player::{Character, Player};
use super::timer::Timer;

/// Top-level game state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    Loading,
    Menu,
    Playing,
    Paused,
    GameOver,
}

/// Abstract commands produced by the host input layer. The core knows
/// nothing about key codes or touch coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameCommand {
    Jump,
    Start,
    Restart,
    /// Toggles Playing <-> Paused
    Pause,
    /// Resumes only from Paused
    Resume,
    /// Back to the menu from Paused or GameOver
    Menu,
    SelectCharacter(Character),
    ToggleSound,
}

/// Grace window granted by weapon pickups
const WEAPON_INVINCIBILITY: f32 = 1.0;
/// Progress autosave cadence during play (seconds)
const AUTOSAVE_INTERVAL: f32 = 10.0;
/// Score penalty per point of collision damage
const COLLISION_SCORE_PENALTY: f64 = 10.0;

pub struct GameEngine {
    phase: GamePhase,
    rng: Pcg32,

    player: Player,
    obstacles: ObstacleManager,
    items: ItemManager,
    background: Background,

    score: f64,
    high_score: f64,
    distance: f64,
    base_speed: f32,
    game_speed: f32,
    combo: u32,
    max_combo: u32,
    combo_multiplier: f32,
    combo_timer: Timer,
    game_time: f32,
    autosave_clock: f32,

    shake_intensity: f32,
    shake: Timer,
    flash_color: Color,
    flash: Timer,

    storage: Box<dyn Storage>,
    audio: AudioManager,
    settings: Settings,
    progress: Progress,
    highscores: HighScores,
    selected: Character,
}

impl GameEngine {
    /// Build the engine in the Loading phase. Call `init` to load persisted
    /// state and enter the menu.
    pub fn new(storage: Box<dyn Storage>, audio: Box<dyn AudioSink>, seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let background = Background::new(&mut rng);
        Self {
            phase: GamePhase::Loading,
            rng,
            player: Player::new(Character::Akira),
            obstacles: ObstacleManager::new(),
            items: ItemManager::new(),
            background,
            score: 0.0,
            high_score: 0.0,
            distance: 0.0,
            base_speed: BASE_GAME_SPEED,
            game_speed: BASE_GAME_SPEED,
            combo: 0,
            max_combo: 0,
            combo_multiplier: 1.0,
            combo_timer: Timer::new(),
            game_time: 0.0,
            autosave_clock: 0.0,
            shake_intensity: 0.0,
            shake: Timer::new(),
            flash_color: Color::WHITE,
            flash: Timer::new(),
            storage,
            audio: AudioManager::new(audio),
            settings: Settings::default(),
            progress: Progress::default(),
            highscores: HighScores::new(),
            selected: Character::Akira,
        }
    }

    /// Load persisted state and enter the menu
    pub fn init(&mut self) {
        self.settings = Settings::load(&*self.storage);
        self.audio.set_muted(!self.settings.sound_enabled);
        self.audio.set_volume(self.settings.volume);
        self.progress = persistence::load_json(&*self.storage, KEY_PROGRESS, Progress::default());
        self.highscores = HighScores::load(&*self.storage);
        self.high_score = persistence::load_json(&*self.storage, KEY_HIGH_SCORE, 0.0);
        self.phase = GamePhase::Menu;
        log::info!(
            "ready: high score {}, {} games played",
            self.high_score as u64,
            self.progress.total_games
        );
    }

    pub fn handle(&mut self, cmd: GameCommand) {
        match cmd {
            GameCommand::Jump => match self.phase {
                GamePhase::Playing => {
                    if self.player.jump() {
                        self.audio.play(Sound::Jump);
                    }
                }
                GamePhase::Menu | GamePhase::GameOver => self.start_run(),
                _ => {}
            },
            GameCommand::Start => {
                if matches!(self.phase, GamePhase::Menu | GamePhase::GameOver) {
                    self.start_run();
                }
            }
            GameCommand::Restart => {
                if matches!(
                    self.phase,
                    GamePhase::Playing | GamePhase::Paused | GamePhase::GameOver
                ) {
                    self.start_run();
                }
            }
            GameCommand::Pause => match self.phase {
                GamePhase::Playing => {
                    self.phase = GamePhase::Paused;
                    self.audio.play(Sound::Select);
                }
                GamePhase::Paused => {
                    self.phase = GamePhase::Playing;
                    self.audio.play(Sound::Select);
                }
                _ => {}
            },
            GameCommand::Resume => {
                if self.phase == GamePhase::Paused {
                    self.phase = GamePhase::Playing;
                    self.audio.play(Sound::Select);
                }
            }
            GameCommand::Menu => {
                if matches!(self.phase, GamePhase::Paused | GamePhase::GameOver) {
                    self.phase = GamePhase::Menu;
                    self.audio.play(Sound::Select);
                }
            }
            GameCommand::SelectCharacter(character) => self.select_character(character),
            GameCommand::ToggleSound => self.toggle_sound(),
        }
    }

    /// Advance by one display frame. A stalled frame is replaced by a
    /// single 60 Hz step so physics never takes an enormous leap.
    pub fn update(&mut self, mut dt: f32) {
        if dt > MAX_FRAME_DT {
            dt = FALLBACK_FRAME_DT;
        }
        if dt <= 0.0 {
            return;
        }

        // Cosmetic timers keep running in every phase
        self.shake.tick(dt);
        self.flash.tick(dt);

        if self.phase == GamePhase::Playing {
            self.update_gameplay(dt);
        }
    }

    fn update_gameplay(&mut self, dt: f32) {
        self.game_time += dt;
        self.autosave_clock += dt;

        // Combo window: expiring with no new pickup resets the streak
        if self.combo > 0 && self.combo_timer.tick(dt) {
            self.reset_combo();
        }

        self.base_speed = (self.base_speed + GAME_SPEED_ACCEL * dt).min(MAX_GAME_SPEED);
        self.game_speed =
            (self.base_speed * self.player.speed_multiplier()).clamp(0.0, MAX_GAME_SPEED);
        self.distance += (self.game_speed * dt * METERS_PER_SPEED) as f64;

        self.background.update(dt, self.game_speed, &mut self.rng);
        self.player.update(dt, self.game_speed, &mut self.rng);
        self.obstacles.update(dt, self.game_speed, &mut self.rng);
        self.items
            .update(dt, self.game_speed, &self.player, &mut self.rng);

        if let Some(hit) = self.obstacles.check_collision(&self.player, &mut self.rng) {
            self.handle_collision(hit);
            if self.phase != GamePhase::Playing {
                return;
            }
        }

        if self.player.pos.y > FALL_LIMIT {
            self.game_over("fell out of the world");
            return;
        }

        let collected = self.items.check_collection(&self.player);
        if !collected.is_empty() {
            self.audio.play(Sound::Collect);
            for record in &collected {
                self.apply_item(*record);
            }
            self.register_combo(collected.len() as u32);
        }

        if self.autosave_clock >= AUTOSAVE_INTERVAL {
            self.autosave_clock = 0.0;
            self.save_progress();
        }

        if self.player.health <= 0.0 {
            self.game_over("out of health");
        }
    }

    fn handle_collision(&mut self, hit: CollisionHit) {
        let died = self.player.take_damage(hit.damage);
        self.audio.play(Sound::Hit);
        self.start_shake(10.0, 0.3);
        self.start_flash(Color::RED, 0.2);
        self.reset_combo();
        self.score = (self.score - hit.damage as f64 * COLLISION_SCORE_PENALTY).max(0.0);
        if died {
            self.game_over("taken down by an obstacle");
        }
    }

    fn apply_item(&mut self, record: Collected) {
        match record.effect {
            ItemEffect::Score => {
                self.add_score(record.points as f64);
                self.progress.total_scrolls += record.value as u64;
                self.check_unlocks();
            }
            ItemEffect::Coin => self.add_score(record.points as f64),
            ItemEffect::Speed => {
                self.player.apply_speed_boost(record.value, record.duration);
                self.start_flash(Color::YELLOW, 0.5);
            }
            ItemEffect::Heal => {
                self.player.heal(record.value);
                self.start_flash(Color::GREEN, 0.3);
            }
            ItemEffect::Ability => {
                if self.player.activate_special_ability() {
                    self.start_flash(Color::rgb(0x93, 0x70, 0xdb), 0.5);
                }
            }
            ItemEffect::Weapon => {
                self.player.grant_invincibility(WEAPON_INVINCIBILITY);
                self.start_flash(Color::rgb(0x87, 0xce, 0xeb), 0.3);
            }
        }
    }

    /// Points are scaled by the current combo multiplier exactly once
    fn add_score(&mut self, points: f64) {
        self.score += points * self.combo_multiplier as f64;
    }

    fn register_combo(&mut self, picked_up: u32) {
        self.combo += picked_up;
        self.combo_timer.start(COMBO_WINDOW);
        self.max_combo = self.max_combo.max(self.combo);
        self.combo_multiplier = 1.0
            + (self.combo / COMBO_MULTIPLIER_CHUNK) as f32 * COMBO_MULTIPLIER_STEP;
        if self.combo % COMBO_MULTIPLIER_CHUNK == 0 {
            self.start_shake(5.0, 0.2);
            self.start_flash(Color::CYAN, 0.1);
        }
    }

    fn reset_combo(&mut self) {
        self.combo = 0;
        self.combo_multiplier = 1.0;
        self.combo_timer.clear();
    }

    fn check_unlocks(&mut self) {
        let mut unlocked_new = false;
        for character in Character::ALL {
            let spec = character.spec();
            if spec.unlock_scrolls == 0 || self.progress.is_unlocked(character) {
                continue;
            }
            if self.progress.total_scrolls >= spec.unlock_scrolls {
                self.progress.unlock(character);
                unlocked_new = true;
                self.start_shake(15.0, 0.5);
                self.start_flash(Color::GREEN, 0.5);
                log::info!("{} unlocked", spec.name);
            }
        }
        if unlocked_new {
            self.save_progress();
        }
    }

    fn game_over(&mut self, reason: &str) {
        self.phase = GamePhase::GameOver;
        self.audio.stop(Sound::Background);
        self.audio.play(Sound::GameOver);

        if self.score > self.high_score {
            self.high_score = self.score;
            persistence::save_json(&mut *self.storage, KEY_HIGH_SCORE, &self.high_score);
            self.start_shake(20.0, 1.0);
            self.start_flash(Color::YELLOW, 1.0);
        }
        self.highscores
            .add_score(self.score as u64, self.distance as u64, self.max_combo);
        self.highscores.save(&mut *self.storage);

        self.progress.total_distance += self.distance;
        self.save_progress();

        log::info!(
            "game over ({reason}): score {}, {}m, max combo {}",
            self.score as u64,
            self.distance as u64,
            self.max_combo
        );
    }

    fn start_run(&mut self) {
        self.reset_run();
        self.phase = GamePhase::Playing;
        self.progress.total_games += 1;
        self.save_progress();
        self.audio.play(Sound::Select);
        self.audio.play_looped(Sound::Background);
        log::info!(
            "run {} started as {}",
            self.progress.total_games,
            self.selected.spec().name
        );
    }

    fn reset_run(&mut self) {
        self.score = 0.0;
        self.distance = 0.0;
        self.base_speed = BASE_GAME_SPEED;
        self.game_speed = BASE_GAME_SPEED;
        self.combo = 0;
        self.max_combo = 0;
        self.combo_multiplier = 1.0;
        self.combo_timer.clear();
        self.game_time = 0.0;
        self.autosave_clock = 0.0;
        self.shake.clear();
        self.flash.clear();
        self.player.reset();
        self.obstacles.reset();
        self.items.reset();
        self.background.reset();
    }

    fn select_character(&mut self, character: Character) {
        if self.selected == character {
            return;
        }
        let spec = character.spec();
        if !self.progress.is_unlocked(character) {
            log::info!("{} is locked ({} scrolls required)", spec.name, spec.unlock_scrolls);
            return;
        }
        self.selected = character;
        self.player.set_character(character);
        self.audio.play(Sound::Select);
        log::info!("selected {}", spec.name);
    }

    fn toggle_sound(&mut self) {
        self.settings.sound_enabled = !self.settings.sound_enabled;
        self.audio.set_muted(!self.settings.sound_enabled);
        if self.settings.sound_enabled {
            if self.phase == GamePhase::Playing {
                self.audio.play_looped(Sound::Background);
            }
        } else {
            self.audio.stop(Sound::Background);
        }
        self.settings.save(&mut *self.storage);
    }

    fn save_progress(&mut self) {
        persistence::save_json(&mut *self.storage, KEY_PROGRESS, &self.progress);
    }

    fn start_shake(&mut self, intensity: f32, duration: f32) {
        self.shake_intensity = intensity;
        self.shake.start(duration);
    }

    fn start_flash(&mut self, color: Color, duration: f32) {
        self.flash_color = color;
        self.flash.start(duration);
    }

    // === Host-facing state ===

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn high_score(&self) -> f64 {
        self.high_score
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn game_speed(&self) -> f32 {
        self.game_speed
    }

    /// Seconds of active play this run (pauses excluded)
    pub fn play_time(&self) -> f32 {
        self.game_time
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }

    pub fn combo_multiplier(&self) -> f32 {
        self.combo_multiplier
    }

    pub fn max_combo(&self) -> u32 {
        self.max_combo
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn obstacles(&self) -> &ObstacleManager {
        &self.obstacles
    }

    pub fn items(&self) -> &ItemManager {
        &self.items
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    pub fn leaderboard(&self) -> &HighScores {
        &self.highscores
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn selected_character(&self) -> Character {
        self.selected
    }

    /// Current shake amplitude for the host camera (0 when idle)
    pub fn screen_shake(&self) -> f32 {
        if self.shake.active() {
            self.shake_intensity * self.shake.fraction()
        } else {
            0.0
        }
    }

    /// Pull items toward the player for a while. Not bound to a pickup;
    /// hosts may wire it to a power-up of their own or a debug key.
    pub fn activate_magnet(&mut self) {
        self.items.activate_magnet(MAGNET_DURATION);
    }

    // === Rendering ===

    /// Composite the frame into the host draw target. Inactive entities
    /// contribute nothing.
    pub fn draw(&self, target: &mut dyn DrawTarget) {
        match self.phase {
            GamePhase::Loading => {
                target.fill_rect(
                    Rect::new(0.0, 0.0, VIEW_WIDTH, VIEW_HEIGHT),
                    Color::rgb(0x1a, 0x1a, 0x2e),
                );
                target.draw_text(
                    Vec2::new(VIEW_WIDTH / 2.0, VIEW_HEIGHT / 2.0),
                    "Loading...",
                    32.0,
                    Color::rgb(0xff, 0x6b, 0x00),
                );
            }
            GamePhase::Menu => {
                self.background.draw(target);
                target.draw_text(
                    Vec2::new(VIEW_WIDTH / 2.0, 180.0),
                    "SHINOBI DASH",
                    48.0,
                    Color::rgb(0xff, 0x6b, 0x00),
                );
                target.draw_text(
                    Vec2::new(VIEW_WIDTH / 2.0, 240.0),
                    &format!("High score: {}", self.high_score as u64),
                    20.0,
                    Color::WHITE,
                );
            }
            GamePhase::Playing | GamePhase::Paused | GamePhase::GameOver => {
                self.background.draw(target);
                self.items.draw(target);
                self.obstacles.draw(target);
                self.player.draw(target);
                self.draw_hud(target);

                if self.flash.active() {
                    target.fill_rect(
                        Rect::new(0.0, 0.0, VIEW_WIDTH, VIEW_HEIGHT),
                        self.flash_color.with_alpha(self.flash.fraction() * 0.5),
                    );
                }
                match self.phase {
                    GamePhase::Paused => self.draw_pause_overlay(target),
                    GamePhase::GameOver => self.draw_game_over_overlay(target),
                    _ => {}
                }
            }
        }
    }

    fn draw_hud(&self, target: &mut dyn DrawTarget) {
        target.fill_rect(Rect::new(10.0, 10.0, 200.0, 80.0), Color::BLACK.with_alpha(0.5));
        target.draw_text(
            Vec2::new(20.0, 30.0),
            &format!("Score: {}", self.score as u64),
            16.0,
            Color::WHITE,
        );
        target.draw_text(
            Vec2::new(20.0, 50.0),
            &format!("Distance: {}m", self.distance as u64),
            16.0,
            Color::WHITE,
        );
        target.draw_text(
            Vec2::new(20.0, 70.0),
            &format!("Speed: x{:.1}", self.game_speed),
            16.0,
            Color::WHITE,
        );

        if self.combo > 0 {
            target.draw_text(
                Vec2::new(VIEW_WIDTH / 2.0, 40.0),
                &format!("Combo x{}", self.combo),
                24.0,
                Color::YELLOW,
            );
            if self.combo_multiplier > 1.0 {
                target.draw_text(
                    Vec2::new(VIEW_WIDTH / 2.0, 65.0),
                    &format!("x{:.1}", self.combo_multiplier),
                    18.0,
                    Color::YELLOW,
                );
            }
        }
    }

    fn draw_pause_overlay(&self, target: &mut dyn DrawTarget) {
        target.fill_rect(
            Rect::new(0.0, 0.0, VIEW_WIDTH, VIEW_HEIGHT),
            Color::BLACK.with_alpha(0.7),
        );
        target.draw_text(
            Vec2::new(VIEW_WIDTH / 2.0, VIEW_HEIGHT / 2.0 - 50.0),
            "PAUSED",
            48.0,
            Color::WHITE,
        );
    }

    fn draw_game_over_overlay(&self, target: &mut dyn DrawTarget) {
        target.fill_rect(
            Rect::new(0.0, 0.0, VIEW_WIDTH, VIEW_HEIGHT),
            Color::BLACK.with_alpha(0.8),
        );
        target.draw_text(
            Vec2::new(VIEW_WIDTH / 2.0, VIEW_HEIGHT / 2.0 - 100.0),
            "GAME OVER",
            48.0,
            Color::rgb(0xff, 0x6b, 0x00),
        );
        target.draw_text(
            Vec2::new(VIEW_WIDTH / 2.0, VIEW_HEIGHT / 2.0 - 40.0),
            &format!("Score: {}", self.score as u64),
            24.0,
            Color::WHITE,
        );
        target.draw_text(
            Vec2::new(VIEW_WIDTH / 2.0, VIEW_HEIGHT / 2.0 - 10.0),
            &format!("Distance: {}m", self.distance as u64),
            24.0,
            Color::WHITE,
        );
        target.draw_text(
            Vec2::new(VIEW_WIDTH / 2.0, VIEW_HEIGHT / 2.0 + 20.0),
            &format!("Best combo: {}", self.max_combo),
            24.0,
            Color::WHITE,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::NullAudio;
    use crate::persistence::MemoryStorage;
    use crate::render::RecordingTarget;
    use crate::sim::item::ItemKind;
    use crate::sim::obstacle::ObstacleKind;

    const DT: f32 = 1.0 / 60.0;

    fn engine() -> GameEngine {
        let mut engine = GameEngine::new(Box::new(MemoryStorage::new()), Box::new(NullAudio), 77);
        engine.init();
        engine
    }

    fn playing_engine() -> GameEngine {
        let mut engine = engine();
        engine.handle(GameCommand::Start);
        engine
    }

    #[test]
    fn test_phase_transitions() {
        let mut engine = engine();
        assert_eq!(engine.phase(), GamePhase::Menu);

        engine.handle(GameCommand::Start);
        assert_eq!(engine.phase(), GamePhase::Playing);

        engine.handle(GameCommand::Pause);
        assert_eq!(engine.phase(), GamePhase::Paused);
        engine.handle(GameCommand::Resume);
        assert_eq!(engine.phase(), GamePhase::Playing);

        // Health reaching zero ends the run
        engine.player.health = 5.0;
        engine.obstacles.spawn_at(ObstacleKind::Spike, engine.player.pos.x);
        engine.update(DT);
        assert_eq!(engine.phase(), GamePhase::GameOver);

        engine.handle(GameCommand::Menu);
        assert_eq!(engine.phase(), GamePhase::Menu);
    }

    #[test]
    fn test_rock_collision_end_to_end() {
        let mut engine = playing_engine();
        engine.obstacles.spawn_at(ObstacleKind::Rock, engine.player.pos.x);
        engine.update(DT);
        assert_eq!(engine.player.health, 90.0);
        assert!(engine.player.is_invincible());
        assert_eq!(engine.combo(), 0);
    }

    #[test]
    fn test_scroll_scored_with_multiplier() {
        let mut engine = playing_engine();
        engine.combo_multiplier = 1.2;
        let center = engine.player.hitbox().center();
        let spec = ItemKind::Scroll.spec();
        engine.items.spawn_at(
            ItemKind::Scroll,
            center - glam::Vec2::new(spec.width / 2.0, spec.height / 2.0),
        );

        let before = engine.score();
        let collected = engine.items.check_collection(&engine.player);
        assert_eq!(collected.len(), 1);
        for record in &collected {
            engine.apply_item(*record);
        }
        assert!((engine.score() - before - 60.0).abs() < 1e-3);
        assert_eq!(engine.progress().total_scrolls, 10);
    }

    #[test]
    fn test_combo_expires_to_baseline() {
        let mut engine = playing_engine();
        engine.combo = 7;
        engine.combo_multiplier = 1.4;
        engine.combo_timer.start(COMBO_WINDOW);

        // Run just past the window with nothing collected
        let frames = (2.1 / DT) as u32;
        for _ in 0..frames {
            engine.update(DT);
        }
        assert_eq!(engine.combo(), 0);
        assert_eq!(engine.combo_multiplier(), 1.0);
    }

    #[test]
    fn test_combo_multiplier_progression() {
        let mut engine = playing_engine();
        engine.register_combo(4);
        assert_eq!(engine.combo_multiplier(), 1.0);
        engine.register_combo(1);
        assert!((engine.combo_multiplier() - 1.2).abs() < 1e-6);
        engine.register_combo(5);
        assert!((engine.combo_multiplier() - 1.4).abs() < 1e-6);
        assert_eq!(engine.max_combo(), 10);
    }

    #[test]
    fn test_pause_freezes_simulation() {
        let mut engine = playing_engine();
        for _ in 0..30 {
            engine.update(DT);
        }
        engine.handle(GameCommand::Pause);

        let distance = engine.distance();
        let health = engine.player.health;
        let active = engine.obstacles.active_count();
        for _ in 0..300 {
            engine.update(DT);
        }
        assert_eq!(engine.distance(), distance);
        assert_eq!(engine.player.health, health);
        assert_eq!(engine.obstacles.active_count(), active);
    }

    #[test]
    fn test_fall_below_play_area_ends_run() {
        let mut engine = playing_engine();
        engine.player.pos.y = FALL_LIMIT + 10.0;
        engine.update(DT);
        assert_eq!(engine.phase(), GamePhase::GameOver);
    }

    #[test]
    fn test_stalled_frame_is_clamped() {
        let mut engine = playing_engine();
        engine.update(5.0);
        // One fallback step's worth of distance, not five seconds
        let expected = (BASE_GAME_SPEED * FALLBACK_FRAME_DT * METERS_PER_SPEED) as f64;
        assert!(engine.distance() <= expected * 1.1);
    }

    #[test]
    fn test_game_speed_clamped_under_boost() {
        let mut engine = playing_engine();
        engine.base_speed = MAX_GAME_SPEED;
        engine.player.apply_speed_boost(2.0, 10.0);
        engine.update(DT);
        assert!(engine.game_speed() <= MAX_GAME_SPEED);
        assert!(engine.game_speed() >= 0.0);
    }

    #[test]
    fn test_high_score_persists_across_sessions() {
        use std::cell::RefCell;
        use std::rc::Rc;

        #[derive(Clone, Default)]
        struct SharedStorage(Rc<RefCell<MemoryStorage>>);

        impl Storage for SharedStorage {
            fn load(&self, key: &str) -> Option<String> {
                self.0.borrow().load(key)
            }

            fn save(&mut self, key: &str, value: &str) -> bool {
                self.0.borrow_mut().save(key, value)
            }
        }

        let storage = SharedStorage::default();
        {
            let mut engine =
                GameEngine::new(Box::new(storage.clone()), Box::new(NullAudio), 3);
            engine.init();
            engine.handle(GameCommand::Start);
            engine.score = 4321.0;
            engine.game_over("test");
        }
        let mut engine = GameEngine::new(Box::new(storage), Box::new(NullAudio), 4);
        engine.init();
        assert_eq!(engine.high_score(), 4321.0);
        assert_eq!(engine.leaderboard().top_score(), Some(4321));
    }

    #[test]
    fn test_character_unlock_and_selection() {
        let mut engine = playing_engine();
        // Locked characters cannot be selected
        engine.handle(GameCommand::SelectCharacter(Character::Ryu));
        assert_eq!(engine.selected_character(), Character::Akira);

        // Crossing the scroll threshold unlocks
        engine.progress.total_scrolls = 95;
        engine.apply_item(Collected {
            kind: ItemKind::Scroll,
            points: 50,
            value: 10.0,
            effect: ItemEffect::Score,
            duration: 0.0,
            damage: 0.0,
        });
        assert!(engine.progress().is_unlocked(Character::Ryu));
        assert!(!engine.progress().is_unlocked(Character::Kenji));

        engine.handle(GameCommand::SelectCharacter(Character::Ryu));
        assert_eq!(engine.selected_character(), Character::Ryu);
    }

    #[test]
    fn test_restart_resets_run_state() {
        let mut engine = playing_engine();
        for _ in 0..120 {
            engine.update(DT);
        }
        engine.score = 500.0;
        engine.player.health = 20.0;
        engine.handle(GameCommand::Restart);
        assert_eq!(engine.phase(), GamePhase::Playing);
        assert_eq!(engine.score(), 0.0);
        assert_eq!(engine.distance(), 0.0);
        assert_eq!(engine.player.health, MAX_HEALTH);
        assert_eq!(engine.obstacles.active_count(), 0);
        assert_eq!(engine.progress().total_games, 2);
    }

    #[test]
    fn test_toggle_sound_persists_mute_flag() {
        let mut engine = engine();
        assert!(engine.settings().sound_enabled);
        engine.handle(GameCommand::ToggleSound);
        assert!(!engine.settings().sound_enabled);
        let muted: bool =
            persistence::load_json(&*engine.storage, crate::persistence::KEY_MUTED, false);
        assert!(muted);
    }

    #[test]
    fn test_draw_composites_scene() {
        let engine = playing_engine();
        let mut target = RecordingTarget::new();
        engine.draw(&mut target);
        assert!(target.shape_count() > 0);
        assert!(target.texts.iter().any(|t| t.starts_with("Score:")));
    }

    #[test]
    fn test_magnet_passthrough() {
        let mut engine = playing_engine();
        engine.activate_magnet();
        assert!(engine.items().magnet_active());
    }

    #[test]
    fn test_same_seed_same_run() {
        let mut a = GameEngine::new(Box::new(MemoryStorage::new()), Box::new(NullAudio), 2024);
        let mut b = GameEngine::new(Box::new(MemoryStorage::new()), Box::new(NullAudio), 2024);
        a.init();
        b.init();
        a.handle(GameCommand::Start);
        b.handle(GameCommand::Start);

        for frame in 0..600 {
            if frame % 90 == 0 {
                a.handle(GameCommand::Jump);
                b.handle(GameCommand::Jump);
            }
            a.update(DT);
            b.update(DT);
        }

        assert_eq!(a.phase(), b.phase());
        assert_eq!(a.score(), b.score());
        assert_eq!(a.distance(), b.distance());
        assert_eq!(a.obstacles.active_count(), b.obstacles.active_count());
        assert_eq!(a.player.pos, b.player.pos);
    }
}
