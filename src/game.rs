//! Fixed timestep driver
//!
//! Owns the session state and the current frame's input, and turns variable
//! frame times into whole simulation ticks.

use crate::consts::*;
use crate::sim::{GameEvent, GameState, TickInput, tick};
use crate::tuning::Tuning;

/// A running session plus its frame accumulator
pub struct Game {
    pub state: GameState,
    /// Input for the next sub-steps; held keys persist, presses clear
    pub input: TickInput,
    accumulator: f32,
    events: Vec<GameEvent>,
}

impl Game {
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, Tuning::default())
    }

    pub fn with_tuning(seed: u64, tuning: Tuning) -> Self {
        Self {
            state: GameState::with_tuning(seed, tuning),
            input: TickInput::default(),
            accumulator: 0.0,
            events: Vec::new(),
        }
    }

    /// Run simulation ticks for a frame of `frame_dt` seconds
    ///
    /// Returns the number of ticks run. Leftover time carries into the next
    /// frame; time beyond the sub-step cap is dropped. Negative or NaN frame
    /// times count as zero.
    pub fn update(&mut self, frame_dt: f32) -> u32 {
        self.accumulator += frame_dt.max(0.0).min(MAX_FRAME_DT);

        let mut substeps = 0;
        while self.accumulator > SIM_DT && substeps < MAX_SUBSTEPS {
            tick(&mut self.state, &self.input, SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;

            // Clear one-shot inputs after processing
            self.input.clear_presses();
            self.events.append(&mut self.state.events);
        }

        if substeps == MAX_SUBSTEPS && self.accumulator > SIM_DT {
            log::debug!("Dropping {:.3}s of frame time", self.accumulator);
            self.accumulator = 0.0;
        }
        substeps
    }

    /// Take the events produced by the ticks run so far
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Seconds of unsimulated time waiting for the next frame
    pub fn pending_time(&self) -> f32 {
        self.accumulator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::GamePhase;

    #[test]
    fn test_update_runs_whole_ticks() {
        let mut game = Game::new(1);
        assert_eq!(game.update(SIM_DT * 3.5), 3);
        assert!(game.pending_time() > 0.0 && game.pending_time() < SIM_DT);
        assert_eq!(game.state.time_ticks, 3);
    }

    #[test]
    fn test_leftover_time_carries() {
        let mut game = Game::new(1);
        assert_eq!(game.update(SIM_DT * 0.75), 0);
        assert_eq!(game.update(SIM_DT * 0.75), 1);
    }

    #[test]
    fn test_long_frame_is_capped() {
        let mut game = Game::new(1);
        let steps = game.update(5.0);
        assert!((14..=15).contains(&steps));
        assert_eq!(game.state.time_ticks, steps as u64);
        assert!(game.pending_time() <= SIM_DT);
    }

    #[test]
    fn test_bad_frame_time_is_ignored() {
        let mut game = Game::new(1);
        assert_eq!(game.update(f32::NAN), 0);
        assert_eq!(game.update(-1.0), 0);
        assert_eq!(game.pending_time(), 0.0);
        assert_eq!(game.update(SIM_DT * 1.5), 1);
        assert_eq!(game.state.time_ticks, 1);
    }

    #[test]
    fn test_presses_clear_after_one_tick() {
        let mut game = Game::new(1);
        game.input.confirm = true;
        game.input.right = true;
        game.update(SIM_DT * 2.5);
        assert_eq!(game.state.phase, GamePhase::Intro);
        assert!(!game.input.confirm);
        assert!(game.input.right);
        assert_eq!(
            game.drain_events(),
            vec![GameEvent::MusicVolume(MUSIC_VOLUME_PLAYING)]
        );
        assert!(game.drain_events().is_empty());
    }
}
