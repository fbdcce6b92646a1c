//! Game state and core simulation types
//!
//! Everything a session mutates lives in `GameState`; there is no other
//! process-wide state. Renderers and audio read it between ticks.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use super::player::Player;
use super::well::Well;
use crate::consts::*;
use crate::ticks_to_ms;
use crate::tuning::Tuning;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen, waiting for confirm
    Title,
    /// Zoom-in after a run starts; input and physics are held
    Intro,
    /// Active climbing
    Playing,
    /// Player died, waiting for confirm to restart
    GameOver,
}

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    /// Engulfed by a block while standing on the stack
    Crushed,
    /// Dropped below the camera
    FellBehind,
    /// No legal piece could be placed for too long
    Stuck,
}

/// Side effects produced by a tick, drained by the driver
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Jump,
    Death { cause: DeathCause },
    PieceSpawned { cells: usize },
    PieceLanded { cells: usize, top_row: i32 },
    LevelUp { jumps: u32 },
    /// Background music volume in percent
    MusicVolume(u8),
    QuitRequested,
}

/// A single cell of a piece
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Column
    pub x: i32,
    /// Vertical position of the bottom edge
    pub y: f32,
    /// Integer row as of the last tick
    pub prev_y: i32,
    /// Tile variant (visual only)
    pub shape: u8,
    /// Palette index
    pub color: u8,
}

impl Block {
    pub fn new(x: i32, y: f32, shape: u8, color: u8) -> Self {
        Self {
            x,
            y,
            prev_y: y.floor() as i32,
            shape,
            color,
        }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x as f32 + 0.5, self.y + 0.5)
    }

    pub fn rect(&self) -> Rect {
        Rect::from_center(self.center(), Vec2::splat(0.5))
    }
}

/// Complete session state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Seed the session RNG was created from
    pub seed: u64,
    /// Session RNG, shared by every run of the session
    pub rng: Pcg32,
    pub phase: GamePhase,
    /// Simulation tick counter (never reset)
    pub time_ticks: u64,
    /// Tick the current run started
    pub start_tick: u64,
    /// Landed terrain
    pub well: Well,
    /// Blocks of the piece currently falling (empty between pieces)
    pub falling: Vec<Block>,
    /// Shared fall velocity of the falling piece
    pub fall_vel: f32,
    pub player: Player,
    /// Highest row the player has stood on
    pub score: i32,
    /// Camera anchor, never decreases within a run
    pub scroll: f32,
    /// Camera shake magnitude for renderers
    pub shake: f32,
    /// Tick the generator first failed to place a piece, if it is failing
    pub stuck_since: Option<u64>,
    /// Tick of the last jump upgrade (drives the upgrade animation)
    pub upgrade_tick: u64,
    /// Tick the player died
    pub dead_tick: Option<u64>,
    pub tuning: Tuning,
    /// Events produced since the last drain
    #[serde(skip)]
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Create a session on the title screen
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, Tuning::default())
    }

    pub fn with_tuning(seed: u64, tuning: Tuning) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::Title,
            time_ticks: 0,
            start_tick: 0,
            well: Well::new(),
            falling: Vec::new(),
            fall_vel: 0.0,
            player: Player::spawn(0),
            score: 0,
            scroll: VIEW_HALF as f32,
            shake: 0.0,
            stuck_since: None,
            upgrade_tick: 0,
            dead_tick: None,
            tuning,
            events: Vec::new(),
        }
    }

    /// Reset every per-run field and start the intro
    ///
    /// The RNG, tick counter and tuning carry over.
    pub fn reset_run(&mut self) {
        self.clear_run();
        self.phase = GamePhase::Intro;
        log::info!("Run started at tick {}", self.start_tick);
    }

    /// Reset the run and go back to the title screen
    pub fn return_to_title(&mut self) {
        self.clear_run();
        self.phase = GamePhase::Title;
        self.emit(GameEvent::MusicVolume(MUSIC_VOLUME_TITLE));
        log::info!("Returned to title at tick {}", self.time_ticks);
    }

    fn clear_run(&mut self) {
        let now = self.time_ticks;
        self.start_tick = now;
        self.well = Well::new();
        self.falling.clear();
        self.fall_vel = 0.0;
        self.player = Player::spawn(now);
        self.score = 0;
        self.scroll = VIEW_HALF as f32;
        self.shake = 0.0;
        self.stuck_since = None;
        self.upgrade_tick = now;
        self.dead_tick = None;
    }

    /// Simulation milliseconds elapsed since `tick`
    pub fn since_ms(&self, tick: u64) -> u64 {
        ticks_to_ms(self.time_ticks.saturating_sub(tick))
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take all events produced since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Kill the player; later calls in the same run are ignored
    pub fn kill(&mut self, cause: DeathCause) {
        if self.player.dead {
            return;
        }
        self.player.dead = true;
        self.dead_tick = Some(self.time_ticks);
        self.phase = GamePhase::GameOver;
        self.emit(GameEvent::Death { cause });
        log::info!(
            "Player died ({:?}) with score {} after {} ms",
            cause,
            self.score,
            self.since_ms(self.start_tick)
        );
    }

    /// Whether the upgrade animation is still playing
    pub fn upgrade_animating(&self) -> bool {
        self.since_ms(self.upgrade_tick) < UPGRADE_ANIM_MS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_on_title() {
        let state = GameState::new(1);
        assert_eq!(state.phase, GamePhase::Title);
        assert_eq!(state.scroll, VIEW_HALF as f32);
        assert!(state.falling.is_empty());
        assert_eq!(state.well.landed().len(), WELL_WIDTH as usize);
    }

    #[test]
    fn test_kill_once() {
        let mut state = GameState::new(1);
        state.reset_run();
        state.kill(DeathCause::Crushed);
        state.kill(DeathCause::FellBehind);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(
            state.drain_events(),
            vec![GameEvent::Death {
                cause: DeathCause::Crushed
            }]
        );
    }

    #[test]
    fn test_reset_run_clears_session() {
        let mut state = GameState::new(1);
        state.reset_run();
        state.score = 17;
        state.scroll = 30.0;
        state.player.jumps = 2;
        state.stuck_since = Some(3);
        state.falling.push(Block::new(1, 40.0, 0, 2));
        state.time_ticks = 99;
        state.kill(DeathCause::Stuck);

        state.reset_run();
        assert_eq!(state.phase, GamePhase::Intro);
        assert_eq!(state.score, 0);
        assert_eq!(state.scroll, VIEW_HALF as f32);
        assert_eq!(state.player.jumps, 1);
        assert!(!state.player.dead);
        assert!(state.falling.is_empty());
        assert_eq!(state.stuck_since, None);
        assert_eq!(state.start_tick, 99);
    }

    #[test]
    fn test_return_to_title_resets_run() {
        let mut state = GameState::new(1);
        state.reset_run();
        state.score = 12;
        state.time_ticks = 40;
        state.kill(DeathCause::FellBehind);
        state.drain_events();

        state.return_to_title();
        assert_eq!(state.phase, GamePhase::Title);
        assert_eq!(state.score, 0);
        assert!(!state.player.dead);
        assert_eq!(state.start_tick, 40);
        assert_eq!(
            state.drain_events(),
            vec![GameEvent::MusicVolume(MUSIC_VOLUME_TITLE)]
        );
    }

    #[test]
    fn test_since_ms() {
        let mut state = GameState::new(1);
        state.time_ticks = 90;
        assert_eq!(state.since_ms(30), 1000);
        assert_eq!(state.since_ms(200), 0);
    }
}
