//! Demo autopilot
//!
//! A simple heuristic player used for attract mode and the headless runner.
//! It reads the state and produces the input a player would give this tick;
//! it never touches the RNG so sessions stay reproducible.

use super::state::{GamePhase, GameState};
use super::tick::TickInput;
use crate::consts::*;

/// Falling blocks closer than this (in rows) above the player are dodged
const DANGER_ROWS: f32 = 6.0;

/// Input the autopilot would give for the current tick
pub fn suggest_input(state: &GameState) -> TickInput {
    let mut input = TickInput::default();
    match state.phase {
        GamePhase::Title => input.confirm = true,
        GamePhase::Intro => {}
        GamePhase::GameOver => {
            input.confirm = state
                .dead_tick
                .is_some_and(|tick| state.since_ms(tick) > DEATH_DELAY_MS);
        }
        GamePhase::Playing => steer(state, &mut input),
    }
    input
}

/// Column the player's center is in
fn player_column(state: &GameState) -> i32 {
    (state.player.center().x.floor() as i32).clamp(0, WELL_WIDTH - 1)
}

fn steer(state: &GameState, input: &mut TickInput) {
    let column = player_column(state);

    if let Some(dir) = dodge(state, column) {
        input.left = dir < 0;
        input.right = dir > 0;
        return;
    }

    let target = best_column(state, column);
    let dir = if target != column {
        (target - column).signum()
    } else {
        // Drift toward the middle of the target column
        let offset = state.player.center().x - (column as f32 + 0.5);
        if offset > 0.2 {
            -1
        } else if offset < -0.2 {
            1
        } else {
            0
        }
    };
    input.left = dir < 0;
    input.right = dir > 0;

    if dir != 0 {
        let next_top = state.well.top_of_column(column + dir);
        let player = &state.player;
        let below_ledge = player.pos.y < next_top as f32;
        let standing = player.support.is_standing();
        let sinking = player.vel.y < 0.0;
        input.jump = below_ledge && (standing || sinking);
    }
}

/// Direction to step out from under a falling piece, if one is close overhead
fn dodge(state: &GameState, column: i32) -> Option<i32> {
    let head = state.player.pos.y + PLAYER_HEIGHT * 2.0;
    let threatened = |x: i32| {
        state
            .falling
            .iter()
            .any(|b| b.x == x && b.y >= head - 0.5 && b.y - head < DANGER_ROWS)
    };
    if !threatened(column) {
        return None;
    }
    // Prefer the side with more room, as long as it is clear
    let toward_middle = if column < WELL_HALF { 1 } else { -1 };
    [toward_middle, -toward_middle]
        .into_iter()
        .find(|&dir| {
            let x = column + dir;
            (0..WELL_WIDTH).contains(&x) && !threatened(x)
        })
}

/// Highest column reachable by walking and jumping from `column`
///
/// Walks outward in both directions while each step up is within jump
/// height; ties go to the closer column.
fn best_column(state: &GameState, column: i32) -> i32 {
    let climb = 2 * state.player.jumps as i32;
    let mut best = column;
    let mut best_top = state.well.top_of_column(column);

    for dir in [-1, 1] {
        let mut x = column;
        let mut top = state.well.top_of_column(column);
        loop {
            let next = x + dir;
            if !(0..WELL_WIDTH).contains(&next) {
                break;
            }
            let next_top = state.well.top_of_column(next);
            if next_top - top > climb {
                break;
            }
            x = next;
            top = next_top;
            let closer = (x - column).abs() < (best - column).abs();
            if top > best_top || (top == best_top && closer) {
                best = x;
                best_top = top;
            }
        }
    }
    best
}
