//! Headless demo run
//!
//! Plays a seeded run with a simple autopilot (jump when the nearest hazard
//! closes in) and prints the outcome. Useful for sanity-checking balance
//! changes without a renderer attached.

use shinobi_dash::audio::NullAudio;
use shinobi_dash::persistence::MemoryStorage;
use shinobi_dash::sim::{Character, GameCommand, GameEngine, GamePhase};

/// Start jumping when the next obstacle is this close
const REACT_DISTANCE: f32 = 140.0;
const MAX_FRAMES: u32 = 60 * 120;

fn main() {
    env_logger::init();

    let seed = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(0x5eed);

    let mut engine = GameEngine::new(Box::new(MemoryStorage::new()), Box::new(NullAudio), seed);
    engine.init();
    if let Some(name) = std::env::args().nth(2) {
        // Unknown names fall back to the default character
        engine.handle(GameCommand::SelectCharacter(Character::from_name(&name)));
    }
    engine.handle(GameCommand::Start);
    log::info!("autopilot run, seed {seed}");

    let dt = 1.0 / 60.0;
    let mut frames = 0;
    while engine.phase() == GamePhase::Playing && frames < MAX_FRAMES {
        let player_front = engine.player().hitbox().right();
        if let Some(distance) = engine.obstacles().nearest_ahead(player_front) {
            if distance < REACT_DISTANCE && engine.player().is_grounded() {
                engine.handle(GameCommand::Jump);
            }
        }
        engine.update(dt);
        frames += 1;
    }

    let stats = engine.items().stats();
    println!("seed:          {seed}");
    println!("frames:        {frames}");
    println!("score:         {}", engine.score() as u64);
    println!("distance:      {}m", engine.distance() as u64);
    println!("max combo:     {}", engine.max_combo());
    println!("items:         {}", stats.total_collected);
    println!("difficulty:    {:.2}", engine.obstacles().difficulty());
    println!(
        "outcome:       {}",
        if engine.phase() == GamePhase::GameOver {
            "game over"
        } else {
            "survived"
        }
    );
}
