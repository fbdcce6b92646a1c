//! Player versus block collision
//!
//! Blocks are unit squares, the player an axis-aligned box. Contacts are
//! decided by rectangle overlap with small tolerances that separate resting
//! contact from passing through. Resolution runs in two passes per tick:
//! a horizontal-only pass after walking, then a full pass after vertical
//! integration.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::player::{Player, Support};
use super::state::Block;
use crate::consts::*;
use crate::tuning::Tuning;

/// Axis-aligned rectangle (y grows upward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn from_center(center: Vec2, half: Vec2) -> Self {
        Self {
            min: center - half,
            max: center + half,
        }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.min.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.max.x
    }

    #[inline]
    pub fn low(&self) -> f32 {
        self.min.y
    }

    #[inline]
    pub fn high(&self) -> f32 {
        self.max.y
    }

    /// Horizontal overlap, shrunk by `inset` on both sides
    #[inline]
    pub fn overlaps_x(&self, other: &Rect, inset: f32) -> bool {
        self.left() + inset < other.right() && self.right() - inset > other.left()
    }

    /// Vertical overlap, shrunk by `inset` on both sides
    #[inline]
    pub fn overlaps_y(&self, other: &Rect, inset: f32) -> bool {
        self.low() + inset < other.high() && self.high() - inset > other.low()
    }

    /// Whether `self` lies within `other` grown by `tolerance` on every side
    pub fn within(&self, other: &Rect, tolerance: f32) -> bool {
        self.left() > other.left() - tolerance
            && self.right() < other.right() + tolerance
            && self.low() > other.low() - tolerance
            && self.high() < other.high() + tolerance
    }
}

/// What a resolution pass found
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContactReport {
    /// Came to rest on landed terrain
    pub on_landed: bool,
    /// Came to rest on the falling piece
    pub on_falling: bool,
    /// Engulfed by a block while standing on landed terrain
    pub crushed: bool,
    /// Horizontal motion was blocked
    pub blocked_x: bool,
}

/// Which collection a block belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Surface {
    Landed,
    Falling,
}

/// Resolve the player against landed terrain and the falling piece
///
/// With `check_y` false only side contacts are resolved. With `check_y`
/// true landing, head bumps and crushing are resolved as well; the caller
/// clears the player's support beforehand so it is re-established here.
/// The player is clamped to the well afterwards.
pub fn resolve_player(
    player: &mut Player,
    landed: &[Block],
    falling: &[Block],
    fall_vel: f32,
    tuning: &Tuning,
    check_y: bool,
    now: u64,
) -> ContactReport {
    let mut report = ContactReport::default();
    let check_dist = PLAYER_HEIGHT + 0.5 + tuning.cull_margin;
    let check_dist_sq = check_dist * check_dist * 2.0;

    for (surface, blocks) in [(Surface::Landed, landed), (Surface::Falling, falling)] {
        let vel_vs_block = match surface {
            Surface::Landed => player.vel.y,
            Surface::Falling => player.vel.y - fall_vel,
        };

        for block in blocks {
            let block_center = block.center();
            if player.center().distance_squared(block_center) > check_dist_sq {
                continue;
            }
            let block_rect = block.rect();

            if check_y {
                let rect = player.rect();
                if vel_vs_block <= tuning.contact_velocity
                    && rect.low() - tuning.contact_snap < block_rect.high()
                    && rect.high() > block_rect.high()
                    && rect.overlaps_x(&block_rect, tuning.edge_inset)
                {
                    player.vel.y = 0.0;
                    player.jump = 0;
                    player.pos.y = block_rect.high();
                    player.stand_tick = now;
                    match surface {
                        Surface::Landed => {
                            player.support = Support::Landed;
                            report.on_landed = true;
                        }
                        Surface::Falling => {
                            player.support = Support::Falling { vel: fall_vel };
                            report.on_falling = true;
                        }
                    }
                } else if report.on_landed && rect.within(&block_rect, tuning.crush_tolerance) {
                    report.crushed = true;
                }

                let rect = player.rect();
                if vel_vs_block >= -tuning.contact_velocity
                    && rect.high() + tuning.contact_snap > block_rect.low()
                    && rect.low() < block_rect.low()
                    && rect.overlaps_x(&block_rect, tuning.edge_inset)
                {
                    if player.vel.y > 0.0 {
                        player.vel.y = 0.0;
                    }
                    player.pos.y = block_rect.low() - PLAYER_HEIGHT * 2.0;
                }
            }

            let rect = player.rect();
            if rect.right() > block_rect.left()
                && rect.left() < block_rect.left()
                && rect.overlaps_y(&block_rect, tuning.edge_inset)
            {
                player.vel.x = 0.0;
                player.pos.x = block_rect.left() - PLAYER_WIDTH * 2.0;
                report.blocked_x = true;
            }

            let rect = player.rect();
            if rect.left() < block_rect.right()
                && rect.right() > block_rect.right()
                && rect.overlaps_y(&block_rect, tuning.edge_inset)
            {
                player.vel.x = 0.0;
                player.pos.x = block_rect.right();
                report.blocked_x = true;
            }
        }
    }

    player.clamp_to_well();
    report
}
