//! Minos Tower headless runner
//!
//! Plays the game with the autopilot for a fixed number of frames and prints
//! a JSON summary of the last run. Set `MINOS_SEED` for a reproducible
//! session and `MINOS_SETTINGS` to a settings JSON file.

use minos_tower::audio::{AudioManager, LogSink};
use minos_tower::consts::*;
use minos_tower::sim::autopilot::suggest_input;
use minos_tower::sim::{DeathCause, GameEvent, GamePhase};
use minos_tower::{Game, Settings};
use serde::Serialize;

/// Frames simulated per session (two minutes at 60 fps)
const FRAMES: u32 = 60 * 120;
/// Slightly over one tick so every frame runs at least one
const FRAME_DT: f32 = SIM_DT * 1.01;

#[derive(Debug, Serialize)]
struct Summary {
    seed: u64,
    runs: u32,
    score: i32,
    best_score: i32,
    jumps: u32,
    landed_blocks: usize,
    ticks: u64,
    death: Option<DeathCause>,
}

fn load_settings() -> Settings {
    let Ok(path) = std::env::var("MINOS_SETTINGS") else {
        return Settings::default();
    };
    let parsed = std::fs::read_to_string(&path)
        .map_err(|e| e.to_string())
        .and_then(|json| Settings::from_json(&json).map_err(|e| e.to_string()));
    match parsed {
        Ok(settings) => {
            log::info!("Loaded settings from {}", path);
            settings
        }
        Err(e) => {
            log::warn!("Ignoring settings file {}: {}", path, e);
            Settings::default()
        }
    }
}

fn session_seed() -> u64 {
    if let Ok(value) = std::env::var("MINOS_SEED") {
        match value.parse() {
            Ok(seed) => return seed,
            Err(e) => log::warn!("Bad MINOS_SEED {:?}: {}", value, e),
        }
    }
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

fn main() {
    #[cfg(not(target_arch = "wasm32"))]
    env_logger::init();

    let settings = load_settings();
    let seed = session_seed();
    log::info!("Minos Tower (headless) starting with seed {}", seed);

    let mut game = Game::new(seed);
    let mut audio = AudioManager::new(LogSink, &settings);

    let mut runs = 0;
    let mut run_start = None;
    let mut best_score = 0;
    let mut death = None;

    for _ in 0..FRAMES {
        game.input = suggest_input(&game.state);
        game.update(FRAME_DT);

        let events = game.drain_events();
        audio.handle_events(&events);
        if let Some(cause) = events.iter().find_map(|event| match event {
            GameEvent::Death { cause } => Some(*cause),
            _ => None,
        }) {
            death = Some(cause);
        }

        let state = &game.state;
        if state.phase != GamePhase::Title && run_start != Some(state.start_tick) {
            run_start = Some(state.start_tick);
            runs += 1;
            if state.phase != GamePhase::GameOver {
                death = None;
            }
        }
        best_score = best_score.max(state.score);
    }

    let state = &game.state;
    let summary = Summary {
        seed,
        runs,
        score: state.score,
        best_score,
        jumps: state.player.jumps,
        landed_blocks: state.well.landed().len().saturating_sub(WELL_WIDTH as usize),
        ticks: state.time_ticks,
        death,
    };
    match serde_json::to_string_pretty(&summary) {
        Ok(json) => println!("{}", json),
        Err(e) => log::error!("Failed to write summary: {}", e),
    }
}
