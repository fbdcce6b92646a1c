//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (landing order, sorted occupancy)
//! - No rendering or platform dependencies

pub mod autopilot;
pub mod collision;
pub mod piece;
pub mod player;
pub mod state;
pub mod tick;
pub mod well;

pub use collision::{ContactReport, Rect, resolve_player};
pub use piece::{Cluster, Piece, PieceStyle, generate_piece, place_cluster};
pub use player::{JumpTier, Player, PlayerState, Support};
pub use state::{Block, DeathCause, GameEvent, GamePhase, GameState};
pub use tick::{TickInput, advance_falling, spawn_piece, tick};
pub use well::Well;
