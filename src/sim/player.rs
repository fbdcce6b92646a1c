//! Player body, supporting surface and jump progression

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use crate::consts::*;

/// What the player is standing on
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum Support {
    /// Nothing underfoot
    #[default]
    None,
    /// Resting on landed terrain
    Landed,
    /// Riding the falling piece, moving at its shared fall velocity
    Falling { vel: f32 },
}

impl Support {
    pub fn is_standing(&self) -> bool {
        !matches!(self, Support::None)
    }
}

/// Coarse player state derived from the body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerState {
    Airborne,
    StandingOnLanded,
    StandingOnFalling,
    Dead,
}

/// Jump upgrade tier earned by score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum JumpTier {
    Single,
    Double,
    Triple,
}

impl JumpTier {
    pub fn for_score(score: i32) -> Self {
        if score >= TRIPLE_JUMP_SCORE {
            JumpTier::Triple
        } else if score >= DOUBLE_JUMP_SCORE {
            JumpTier::Double
        } else {
            JumpTier::Single
        }
    }

    /// Jumps allowed per airtime
    pub fn jumps(&self) -> u32 {
        match self {
            JumpTier::Single => 1,
            JumpTier::Double => 2,
            JumpTier::Triple => 3,
        }
    }

    /// Score needed for the next tier, if any
    pub fn next_threshold(&self) -> Option<i32> {
        match self {
            JumpTier::Single => Some(DOUBLE_JUMP_SCORE),
            JumpTier::Double => Some(TRIPLE_JUMP_SCORE),
            JumpTier::Triple => None,
        }
    }
}

/// The climbing player
///
/// `pos` is the bottom-left corner of the body; the body spans
/// `2 * PLAYER_WIDTH` by `2 * PLAYER_HEIGHT`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub vel: Vec2,
    pub support: Support,
    pub dead: bool,
    /// Jumps used this airtime
    pub jump: u32,
    /// Jumps allowed per airtime
    pub jumps: u32,
    /// Tick of the last standing contact
    pub stand_tick: u64,
}

impl Player {
    /// A fresh player standing on the floor in the middle of the well
    pub fn spawn(tick: u64) -> Self {
        Self {
            pos: Vec2::new(WELL_HALF as f32, 1.0),
            vel: Vec2::ZERO,
            support: Support::Landed,
            dead: false,
            jump: 0,
            jumps: 1,
            stand_tick: tick,
        }
    }

    pub fn center(&self) -> Vec2 {
        self.pos + Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT)
    }

    pub fn rect(&self) -> Rect {
        Rect::from_center(self.center(), Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT))
    }

    /// Integer row the player's feet are in
    pub fn row(&self) -> i32 {
        self.pos.y.floor() as i32
    }

    pub fn state(&self) -> PlayerState {
        if self.dead {
            return PlayerState::Dead;
        }
        match self.support {
            Support::None => PlayerState::Airborne,
            Support::Landed => PlayerState::StandingOnLanded,
            Support::Falling { .. } => PlayerState::StandingOnFalling,
        }
    }

    pub fn tier(&self) -> JumpTier {
        match self.jumps {
            0 | 1 => JumpTier::Single,
            2 => JumpTier::Double,
            _ => JumpTier::Triple,
        }
    }

    /// Whether a jump pressed now would be honored
    ///
    /// The first jump needs a surface underfoot or a recent one (coyote
    /// time). Further jumps spend the remaining multi-jump budget.
    pub fn can_jump(&self, since_stand_ms: u64) -> bool {
        if self.dead || self.jump >= self.jumps {
            return false;
        }
        if self.jump > 0 {
            return true;
        }
        self.support.is_standing() || since_stand_ms < COYOTE_MS
    }

    /// Leave the ground with jump velocity
    pub fn jump(&mut self) {
        self.support = Support::None;
        self.vel.y = JUMP_VELOCITY;
        self.jump += 1;
    }

    /// Keep the body inside the well horizontally
    pub fn clamp_to_well(&mut self) {
        self.pos.x = self.pos.x.clamp(0.0, WELL_WIDTH as f32 - PLAYER_WIDTH * 2.0);
    }

    /// Move to the tier earned by `score`
    ///
    /// Returns the new jump count when the tier went up. Jumps never go down.
    pub fn apply_score(&mut self, score: i32) -> Option<u32> {
        let jumps = JumpTier::for_score(score).jumps();
        if jumps > self.jumps {
            self.jumps = jumps;
            Some(jumps)
        } else {
            None
        }
    }
}
