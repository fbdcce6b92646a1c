//! Minos Tower - climb an endless tower of falling blocks
//!
//! Core modules:
//! - `sim`: Deterministic simulation (piece generation, physics, player state)
//! - `game`: Fixed timestep driver wrapping the simulation
//! - `audio`: Sound boundary fed by simulation events
//! - `settings`: Player preferences
//! - `tuning`: Contact tolerances for collision feel

pub mod audio;
pub mod game;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use game::Game;
pub use settings::Settings;
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Simulation ticks per second
    pub const TICKS_PER_SECOND: u64 = 60;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 16;
    /// Longest frame the driver will try to catch up on (seconds)
    pub const MAX_FRAME_DT: f32 = 0.25;

    /// Visible rows of the well
    pub const VIEW_HEIGHT: i32 = 20;
    pub const VIEW_HALF: i32 = 10;
    /// Well dimensions (columns)
    pub const WELL_WIDTH: i32 = 10;
    pub const WELL_HALF: i32 = 5;

    /// Player half extents
    pub const PLAYER_WIDTH: f32 = 0.3;
    pub const PLAYER_HEIGHT: f32 = 0.45;

    /// Fall velocity gained by the falling piece per second
    pub const PIECE_GRAVITY: f32 = 6.0;
    /// Scale from piece fall velocity to rows per second
    pub const PIECE_SPEED: f32 = 3.0;
    /// Vertical velocity lost by an airborne player per second
    pub const PLAYER_GRAVITY: f32 = 8.0;
    /// Scale from player vertical velocity to rows per second
    pub const PLAYER_SPEED: f32 = 4.0;
    /// Horizontal walking speed (columns per second)
    pub const WALK_SPEED: f32 = 6.0;
    /// Vertical velocity set by a jump
    pub const JUMP_VELOCITY: f32 = 3.0;

    /// Outer attempts the piece generator makes before giving up
    pub const SPAWN_ATTEMPTS: u32 = 10;
    /// Pieces must leave at least this many columns free
    pub const SPAWN_WIDTH_MARGIN: i32 = 4;
    /// Distinct block shapes (visual only)
    pub const SHAPE_COUNT: u8 = 4;
    /// Block palette size, index 0 is reserved for the floor
    pub const COLOR_COUNT: u8 = 8;

    /// Score thresholds for double and triple jump
    pub const DOUBLE_JUMP_SCORE: i32 = 10;
    pub const TRIPLE_JUMP_SCORE: i32 = 30;

    /// Timing windows in simulation milliseconds
    pub const INTRO_MS: u64 = 500;
    pub const COYOTE_MS: u64 = 120;
    pub const DEATH_DELAY_MS: u64 = 500;
    pub const STUCK_TIMEOUT_MS: u64 = 1000;
    pub const UPGRADE_ANIM_MS: u64 = 500;

    /// How far below the camera the player may drop before dying
    pub const FALL_BEHIND_MARGIN: f32 = 0.5;

    /// Camera shake pulse on landing and its per-tick decay
    pub const LAND_SHAKE: f32 = 0.5;
    pub const SHAKE_DECAY: f32 = 0.9;
    pub const SHAKE_CUTOFF: f32 = 0.1;

    /// Background music volume on the title screen and during a run
    pub const MUSIC_VOLUME_TITLE: u8 = 40;
    pub const MUSIC_VOLUME_PLAYING: u8 = 20;
}

/// Convert a duration in simulation milliseconds to whole ticks (rounded up)
#[inline]
pub fn ms_to_ticks(ms: u64) -> u64 {
    (ms * consts::TICKS_PER_SECOND).div_ceil(1000)
}

/// Convert a tick count to simulation milliseconds
#[inline]
pub fn ticks_to_ms(ticks: u64) -> u64 {
    ticks * 1000 / consts::TICKS_PER_SECOND
}
