//! Shinobi Dash - a side-scrolling ninja runner
//!
//! Core modules:
//! - `sim`: Deterministic gameplay core (player, spawning, collision, scoring)
//! - `geom`: Collision primitives and the weighted random draw
//! - `background`: Parallax scenery (decoration only)
//! - `render`: Draw-primitive seam implemented by the host renderer
//! - `audio`: Sound trigger seam
//! - `persistence`: Key/value save seam and cross-run progress
//! - `settings` / `highscores`: Persisted preferences and leaderboard

pub mod audio;
pub mod background;
pub mod geom;
pub mod highscores;
pub mod persistence;
pub mod render;
pub mod settings;
pub mod sim;

pub use highscores::HighScores;
pub use settings::Settings;
pub use sim::{GameCommand, GameEngine, GamePhase};

/// Game configuration constants
pub mod consts {
    /// Logical viewport in pixels; the renderer scales to the real surface
    pub const VIEW_WIDTH: f32 = 800.0;
    pub const VIEW_HEIGHT: f32 = 600.0;
    /// Height of the ground band above the bottom edge
    pub const GROUND_OFFSET: f32 = 120.0;
    /// Top of the ground band
    pub const GROUND_Y: f32 = VIEW_HEIGHT - GROUND_OFFSET;

    /// Player body
    pub const PLAYER_X: f32 = 100.0;
    pub const PLAYER_WIDTH: f32 = 40.0;
    pub const PLAYER_HEIGHT: f32 = 60.0;
    pub const MAX_HEALTH: f32 = 100.0;

    /// Player physics (px/s, px/s^2)
    pub const GRAVITY: f32 = 2880.0;
    pub const JUMP_IMPULSE: f32 = 900.0;
    /// Second jump launches at a fraction of the first
    pub const DOUBLE_JUMP_FACTOR: f32 = 0.8;
    pub const MAX_DOUBLE_JUMPS: u32 = 1;
    /// Post-hit grace window (seconds)
    pub const INVINCIBILITY_DURATION: f32 = 1.0;

    /// World scroll speed is a unitless scalar; one unit scrolls 60 px/s
    pub const BASE_GAME_SPEED: f32 = 5.0;
    pub const MAX_GAME_SPEED: f32 = 15.0;
    /// Base speed gained per second of play
    pub const GAME_SPEED_ACCEL: f32 = 0.01;
    /// Pixel velocity per speed unit
    pub const PX_PER_SPEED: f32 = 60.0;
    /// Distance (meters) accrued per second per speed unit
    pub const METERS_PER_SPEED: f32 = 10.0;

    /// A stalled frame (tab hidden, debugger) is replaced by one 60 Hz step
    pub const MAX_FRAME_DT: f32 = 0.1;
    pub const FALLBACK_FRAME_DT: f32 = 1.0 / 60.0;

    /// Entities are recycled once fully past the left edge
    pub const OFFSCREEN_MARGIN: f32 = 100.0;
    /// Falling below this line ends the run
    pub const FALL_LIMIT: f32 = VIEW_HEIGHT + 100.0;

    /// Combo window and multiplier step
    pub const COMBO_WINDOW: f32 = 2.0;
    pub const COMBO_MULTIPLIER_STEP: f32 = 0.2;
    pub const COMBO_MULTIPLIER_CHUNK: u32 = 5;
}
