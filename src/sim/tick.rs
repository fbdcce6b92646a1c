//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically.

use super::collision::resolve_player;
use super::piece::generate_piece;
use super::player::Support;
use super::state::{DeathCause, GameEvent, GamePhase, GameState};
use crate::consts::*;

/// Input commands for a single tick (deterministic)
///
/// `left`/`right` are held keys. `jump`, `confirm` and `restart` are
/// edge-triggered and should be cleared once a tick has seen them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    /// Start a run from the title, or restart after game over
    pub confirm: bool,
    /// Abandon the run and return to the title (quit when on the title)
    pub restart: bool,
}

impl TickInput {
    /// Clear the edge-triggered presses after a tick consumed them
    pub fn clear_presses(&mut self) {
        self.jump = false;
        self.confirm = false;
        self.restart = false;
    }

    /// Horizontal intent: -1, 0 or 1
    pub fn walk_dir(&self) -> f32 {
        (if self.left { -1.0 } else { 0.0 }) + (if self.right { 1.0 } else { 0.0 })
    }
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    state.time_ticks += 1;

    // Decay camera shake
    if state.shake > SHAKE_CUTOFF {
        state.shake *= SHAKE_DECAY;
    } else {
        state.shake = 0.0;
    }

    match state.phase {
        GamePhase::Title => {
            if input.restart {
                state.emit(GameEvent::QuitRequested);
            } else if input.confirm {
                state.reset_run();
                state.emit(GameEvent::MusicVolume(MUSIC_VOLUME_PLAYING));
            }
            return;
        }
        GamePhase::Intro => {
            if state.since_ms(state.start_tick) < INTRO_MS {
                return;
            }
            state.phase = GamePhase::Playing;
        }
        GamePhase::Playing | GamePhase::GameOver => {}
    }

    if input.restart {
        log::info!("Run abandoned at score {}", state.score);
        state.return_to_title();
        return;
    }

    if state.phase == GamePhase::GameOver {
        let can_restart = state
            .dead_tick
            .is_some_and(|tick| state.since_ms(tick) > DEATH_DELAY_MS);
        if !(can_restart && input.confirm) {
            return;
        }
        // The fresh run starts playing this very tick
        state.reset_run();
    }

    step_player_input(state, input);

    state.fall_vel -= PIECE_GRAVITY * dt;
    let fall_step = state.fall_vel * PIECE_SPEED * dt;

    if state.falling.is_empty() {
        spawn_piece(state);
    }
    advance_falling(state, fall_step);
    move_player(state, dt, fall_step);
    check_deaths(state);
}

/// Walk intent and jump
fn step_player_input(state: &mut GameState, input: &TickInput) {
    state.player.vel.x = input.walk_dir();

    let since_stand = state.since_ms(state.player.stand_tick);
    if input.jump && state.player.can_jump(since_stand) {
        state.player.jump();
        state.emit(GameEvent::Jump);
    }
}

/// Spawn a new falling piece, or keep the stuck timer running
pub fn spawn_piece(state: &mut GameState) {
    state.fall_vel = 0.0;
    let jumps = state.player.jumps;
    match generate_piece(&mut state.rng, &state.well, state.score, jumps, state.scroll) {
        Some(piece) => {
            log::debug!(
                "Spawned {} cell piece at column {} (width {}, height {}, max_y {})",
                piece.blocks.len(),
                piece.column,
                piece.width,
                piece.height,
                piece.max_y
            );
            let cells = piece.blocks.len();
            state.falling = piece.blocks;
            state.stuck_since = None;
            state.emit(GameEvent::PieceSpawned { cells });
        }
        None => {
            if state.stuck_since.is_none() {
                log::warn!(
                    "No legal piece placement (score {}, tops {:?})",
                    state.score,
                    state.well.tops()
                );
                state.stuck_since = Some(state.time_ticks);
            }
        }
    }
}

/// Move the falling piece down and land it as a whole if any cell crossed
/// into an occupied row
pub fn advance_falling(state: &mut GameState, fall_step: f32) {
    let mut rise = 0;
    for block in &mut state.falling {
        block.y += fall_step;
        let row = block.y.floor() as i32;
        if row < block.prev_y {
            rise = rise.max(state.well.landing_depth(block.x, block.prev_y, row));
            block.prev_y = row;
        }
    }

    if rise > 0 {
        let piece = std::mem::take(&mut state.falling);
        let cells = piece.len();
        let top_row = state.well.merge(piece, rise);
        log::debug!("Piece of {} cells landed, top row {}", cells, top_row);
        state.emit(GameEvent::PieceLanded { cells, top_row });
        state.shake = LAND_SHAKE;
    }
}

/// Ride, walk, fall and resolve contacts
fn move_player(state: &mut GameState, dt: f32, fall_step: f32) {
    let now = state.time_ticks;

    if let Support::Falling { vel } = &mut state.player.support {
        *vel = state.fall_vel;
        state.player.vel.y = state.fall_vel;
        state.player.pos.y += fall_step;
    }

    if state.player.vel.x != 0.0 {
        state.player.pos.x += state.player.vel.x * WALK_SPEED * dt;
        resolve_player(
            &mut state.player,
            state.well.landed(),
            &state.falling,
            state.fall_vel,
            &state.tuning,
            false,
            now,
        );
    }

    if !state.player.support.is_standing() {
        state.player.vel.y -= PLAYER_GRAVITY * dt;
        state.player.pos.y += state.player.vel.y * PLAYER_SPEED * dt;
    }

    state.player.support = Support::None;
    let contact = resolve_player(
        &mut state.player,
        state.well.landed(),
        &state.falling,
        state.fall_vel,
        &state.tuning,
        true,
        now,
    );

    if contact.crushed {
        state.kill(DeathCause::Crushed);
    }

    if state.player.pos.y > state.scroll {
        state.scroll = state.player.pos.y;
    }

    if contact.on_landed {
        let row = state.player.row();
        if row > state.score {
            state.score = row;
            if let Some(jumps) = state.player.apply_score(row) {
                state.upgrade_tick = now;
                log::info!("Reached row {}: {} jumps unlocked", row, jumps);
                state.emit(GameEvent::LevelUp { jumps });
            }
        }
    }
}

/// Death by falling behind the camera or by an unplaceable stack
fn check_deaths(state: &mut GameState) {
    let floor = state.scroll - VIEW_HALF as f32 - FALL_BEHIND_MARGIN;
    if state.player.pos.y < floor {
        state.kill(DeathCause::FellBehind);
    }

    if let Some(since) = state.stuck_since {
        if state.since_ms(since) > STUCK_TIMEOUT_MS {
            state.kill(DeathCause::Stuck);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ms_to_ticks;
    use crate::sim::state::Block;

    fn press_confirm() -> TickInput {
        TickInput {
            confirm: true,
            ..Default::default()
        }
    }

    /// A session past its intro, ready to play
    fn playing_state(seed: u64) -> GameState {
        let mut state = GameState::new(seed);
        tick(&mut state, &press_confirm(), SIM_DT);
        state.drain_events();
        for _ in 0..ms_to_ticks(INTRO_MS) {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        state
    }

    #[test]
    fn test_title_to_intro_to_playing() {
        let mut state = GameState::new(12345);
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.phase, GamePhase::Title);

        tick(&mut state, &press_confirm(), SIM_DT);
        assert_eq!(state.phase, GamePhase::Intro);
        assert_eq!(
            state.drain_events(),
            vec![GameEvent::MusicVolume(MUSIC_VOLUME_PLAYING)]
        );

        // Held during the intro
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.phase, GamePhase::Intro);
        assert!(state.falling.is_empty());

        for _ in 0..ms_to_ticks(INTRO_MS) {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_restart_on_title_requests_quit() {
        let mut state = GameState::new(1);
        let input = TickInput {
            restart: true,
            ..Default::default()
        };
        tick(&mut state, &input, SIM_DT);
        assert_eq!(state.drain_events(), vec![GameEvent::QuitRequested]);
        assert_eq!(state.phase, GamePhase::Title);
    }

    #[test]
    fn test_first_ticks_score_floor_and_spawn() {
        let mut state = playing_state(9);
        // Standing on the floor registers row 1, which lets pieces spawn
        assert_eq!(state.score, 1);
        // Nothing could spawn before the floor was scored
        assert!(state.falling.is_empty());
        assert!(state.stuck_since.is_some());

        let mut spawned = false;
        for _ in 0..30 {
            tick(&mut state, &TickInput::default(), SIM_DT);
            if state
                .drain_events()
                .iter()
                .any(|e| matches!(e, GameEvent::PieceSpawned { .. }))
            {
                spawned = true;
                break;
            }
        }
        assert!(spawned);
        assert_eq!(state.stuck_since, None);
        assert!(!state.player.dead);
    }

    #[test]
    fn test_jump_leaves_ground() {
        let mut state = playing_state(2);
        let input = TickInput {
            jump: true,
            ..Default::default()
        };
        tick(&mut state, &input, SIM_DT);
        assert!(state.drain_events().contains(&GameEvent::Jump));
        assert!(state.player.pos.y > 1.0);
        assert_eq!(state.player.jump, 1);
        assert_eq!(state.player.support, Support::None);
    }

    #[test]
    fn test_walk_right() {
        let mut state = playing_state(2);
        let x0 = state.player.pos.x;
        let input = TickInput {
            right: true,
            ..Default::default()
        };
        tick(&mut state, &input, SIM_DT);
        assert!((state.player.pos.x - (x0 + WALK_SPEED * SIM_DT)).abs() < 1e-5);
        assert_eq!(state.player.pos.y, 1.0);
    }

    #[test]
    fn test_piece_lands_atomically() {
        let mut state = playing_state(4);
        state.falling = vec![Block::new(2, 1.05, 1, 3), Block::new(3, 1.05, 1, 3)];
        state.fall_vel = -2.0;

        advance_falling(&mut state, -0.1);

        assert!(state.falling.is_empty());
        assert_eq!(state.well.top_of_column(2), 2);
        assert_eq!(state.well.top_of_column(3), 2);
        assert_eq!(state.shake, LAND_SHAKE);
        assert!(
            state
                .drain_events()
                .contains(&GameEvent::PieceLanded { cells: 2, top_row: 1 })
        );
    }

    #[test]
    fn test_piece_over_gap_lands_with_supported_cell() {
        let mut state = playing_state(4);
        // Column 6 is raised to row 2; the piece straddles columns 5 and 6
        let mut pillar = Block::new(6, 1.0, 0, 1);
        pillar.prev_y = 1;
        state.well.merge([pillar], 0);
        state.falling = vec![Block::new(5, 2.02, 0, 2), Block::new(6, 2.02, 0, 2)];

        advance_falling(&mut state, -0.05);

        assert!(state.falling.is_empty());
        // Both cells rest at row 2, the cell over column 5 hangs over a gap
        assert_eq!(state.well.top_of_column(5), 3);
        assert_eq!(state.well.top_of_column(6), 3);
        assert!(!state.well.is_occupied(5, 1));
    }

    #[test]
    fn test_stuck_timer_kills() {
        let mut state = playing_state(8);
        state.falling.clear();
        // Fill the stack far above anything reachable
        for x in 0..WELL_WIDTH {
            let mut block = Block::new(x, 40.0, 0, 1);
            block.prev_y = 40;
            state.well.merge([block], 0);
        }
        // The player stays on the floor, far below anything placeable
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert!(state.stuck_since.is_some());
        assert!(!state.player.dead);

        for _ in 0..ms_to_ticks(STUCK_TIMEOUT_MS) + 1 {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        assert!(state.player.dead);
        assert!(
            state
                .drain_events()
                .contains(&GameEvent::Death { cause: DeathCause::Stuck })
        );
    }

    #[test]
    fn test_block_landing_on_player_crushes() {
        let mut state = playing_state(6);
        state.stuck_since = None;
        state.player.pos.x = 5.2;
        state.falling = vec![Block::new(5, 4.3, 0, 2)];
        state.fall_vel = -2.0;

        let mut deaths = Vec::new();
        for _ in 0..120 {
            tick(&mut state, &TickInput::default(), SIM_DT);
            deaths.extend(
                state
                    .drain_events()
                    .into_iter()
                    .filter(|e| matches!(e, GameEvent::Death { .. })),
            );
            if state.player.dead {
                break;
            }
        }

        assert_eq!(
            deaths,
            vec![GameEvent::Death {
                cause: DeathCause::Crushed
            }]
        );
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.dead_tick, Some(state.time_ticks));
    }

    #[test]
    fn test_reaching_row_ten_unlocks_double_jump_once() {
        let mut state = playing_state(7);
        state.stuck_since = None;
        // A pillar in column 5 whose top is row 10
        for row in 1..10 {
            state.well.merge([Block::new(5, row as f32, 0, 1)], 0);
        }
        state.player.pos = glam::Vec2::new(5.2, 10.3);
        state.player.vel = glam::Vec2::ZERO;
        state.player.support = Support::None;

        let mut level_ups = Vec::new();
        let mut unlock_tick = None;
        for _ in 0..20 {
            tick(&mut state, &TickInput::default(), SIM_DT);
            for event in state.drain_events() {
                if let GameEvent::LevelUp { .. } = event {
                    level_ups.push(event);
                    unlock_tick = Some(state.time_ticks);
                }
            }
        }
        assert_eq!(state.score, 10);
        assert_eq!(state.player.jumps, 2);
        assert_eq!(level_ups, vec![GameEvent::LevelUp { jumps: 2 }]);
        assert_eq!(Some(state.upgrade_tick), unlock_tick);

        // Jump off the pillar and land on it again
        let jump = TickInput {
            jump: true,
            ..Default::default()
        };
        tick(&mut state, &jump, SIM_DT);
        for _ in 0..60 {
            tick(&mut state, &TickInput::default(), SIM_DT);
            assert!(
                !state
                    .drain_events()
                    .iter()
                    .any(|e| matches!(e, GameEvent::LevelUp { .. }))
            );
        }
        assert_eq!(state.player.support, Support::Landed);
        assert_eq!(state.player.pos.y, 10.0);
        assert_eq!(Some(state.upgrade_tick), unlock_tick);
        assert!(!state.upgrade_animating());
        assert_eq!(state.player.jumps, 2);
    }

    #[test]
    fn test_fall_behind_kills() {
        let mut state = playing_state(5);
        state.scroll = 40.0;
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert!(state.player.dead);
        assert_eq!(state.phase, GamePhase::GameOver);
    }

    #[test]
    fn test_restart_after_death_delay() {
        let mut state = playing_state(5);
        state.scroll = 40.0;
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert!(state.player.dead);

        // Too early
        tick(&mut state, &press_confirm(), SIM_DT);
        assert!(state.player.dead);

        for _ in 0..ms_to_ticks(DEATH_DELAY_MS) + 1 {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        tick(&mut state, &press_confirm(), SIM_DT);
        assert!(!state.player.dead);
        assert_eq!(state.score, 1);
        assert_eq!(state.scroll, VIEW_HALF as f32);
    }

    #[test]
    fn test_restart_returns_to_title() {
        let mut state = playing_state(5);
        let input = TickInput {
            restart: true,
            ..Default::default()
        };
        tick(&mut state, &input, SIM_DT);
        assert_eq!(state.phase, GamePhase::Title);
        assert!(
            state
                .drain_events()
                .contains(&GameEvent::MusicVolume(MUSIC_VOLUME_TITLE))
        );
    }

    #[test]
    fn test_determinism() {
        // Two states with same seed should produce identical results
        let mut state1 = GameState::new(99999);
        let mut state2 = GameState::new(99999);

        let mut inputs = vec![press_confirm()];
        for i in 0..400 {
            inputs.push(TickInput {
                left: i % 90 < 30,
                right: i % 90 > 60,
                jump: i % 37 == 0,
                ..Default::default()
            });
        }

        for input in &inputs {
            tick(&mut state1, input, SIM_DT);
            tick(&mut state2, input, SIM_DT);
        }

        assert_eq!(state1.time_ticks, state2.time_ticks);
        assert_eq!(
            serde_json::to_string(&state1).unwrap(),
            serde_json::to_string(&state2).unwrap()
        );
    }
}
