//! Deterministic gameplay core
//!
//! All gameplay logic lives here and must stay pure:
//! - Seeded RNG only, threaded explicitly through update calls
//! - Stable iteration order (active lists in spawn order)
//! - No rendering, audio or storage beyond the collaborator seams

pub mod engine;
pub mod item;
pub mod obstacle;
pub mod particles;
pub mod player;
pub mod pool;
pub mod timer;

pub use engine::{GameCommand, GameEngine, GamePhase};
pub use item::{Collected, CollectionStats, Item, ItemEffect, ItemKind, ItemManager};
pub use obstacle::{CollisionHit, Obstacle, ObstacleKind, ObstacleManager};
pub use player::{Ability, Character, CharacterSpec, Player};
pub use pool::{Pool, PoolEntity};
pub use timer::Timer;
