//! Fixed timestep simulation tick
//!
//! Core game loop that advances the mansion by one step.

use glam::Vec2;

use super::collision::{land_on_platforms, offset_to};
use super::level::Facing;
use super::state::{GameEvent, GamePhase, GameState};
use crate::consts::*;

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Held: accelerate left
    pub left: bool,
    /// Held: accelerate right
    pub right: bool,
    /// Held: jump whenever grounded
    pub jump: bool,
    /// Held: sprint multiplier
    pub sprint: bool,
    /// One-shot: try to scare nearby kids
    pub scare: bool,
    /// One-shot: pause toggle
    pub pause: bool,
}

/// Advance the game state by one fixed timestep (`dt` in seconds)
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    // Handle pause toggle
    if input.pause {
        match state.phase {
            GamePhase::Playing => {
                state.phase = GamePhase::Paused;
                return;
            }
            GamePhase::Paused => state.phase = GamePhase::Playing,
            _ => {}
        }
    }

    if state.phase != GamePhase::Playing {
        return;
    }

    state.time_ticks += 1;
    let frames = dt * FRAME_RATE;

    // Scares resolve against where everyone stood at the end of the last step
    if input.scare {
        attempt_scare(state);
    }

    let previous_bottom = move_player(state, input, frames);
    let entered = cross_level_edges(state);

    state.player.on_ground = false;
    let body = state.player.body();
    if let Some(top) = land_on_platforms(&body, previous_bottom, &state.current_level().platforms)
    {
        state.player.land(top);
    }

    // Pages have floors at different heights; never arrive inside the new one
    if entered {
        let floor = state.current_level().ground().top();
        if state.player.bottom() > floor {
            state.player.land(floor);
        }
    }

    if state.player.pos.y > state.camera.fall_limit() {
        let ground = state.current_level().ground();
        state.player.pos.y = ground.top() - PLAYER_HEIGHT;
        state.player.vel = Vec2::ZERO;
        log::debug!("Ghost fell out of {}, recovered", state.current_level().name);
    }

    state.camera.follow(state.player.pos.x, LEVEL_WIDTH);

    update_kids(state, frames);

    if state.player.scare_cooldown > 0.0 {
        state.player.scare_cooldown = (state.player.scare_cooldown - frames).max(0.0);
    }

    check_outcome(state);
}

/// Apply input, gravity and friction. Returns the feet height before the
/// vertical move (for one-way landing).
fn move_player(state: &mut GameState, input: &TickInput, frames: f32) -> f32 {
    let tuning = &state.tuning;
    let player = &mut state.player;

    let accel = tuning.run_accel_for(input.sprint);
    if input.left {
        player.vel.x -= accel;
        player.facing = Facing::Left;
    }
    if input.right {
        player.vel.x += accel;
        player.facing = Facing::Right;
    }

    if input.jump && player.on_ground {
        player.vel.y = -tuning.jump_strength;
        player.on_ground = false;
    }

    let previous_bottom = player.bottom();
    player.vel.y += tuning.gravity * frames;
    player.pos += player.vel * frames;

    // Grounded state is from the previous step's landing
    if player.on_ground {
        player.vel.x *= tuning.ground_friction;
    } else {
        player.vel.x *= tuning.air_friction;
    }

    previous_bottom
}

/// Walking off either side of a page moves to the neighbouring level; the
/// mansion's outer walls clamp instead. Returns true on a level change.
fn cross_level_edges(state: &mut GameState) -> bool {
    let last = state.levels.len().saturating_sub(1);
    let from = state.level_index;

    if state.player.pos.x > LEVEL_WIDTH - RIGHT_EDGE_MARGIN {
        if state.level_index < last {
            state.level_index += 1;
            state.player.pos.x = LEFT_ENTRY_X;
        } else {
            state.player.pos.x = LEVEL_WIDTH - RIGHT_EDGE_MARGIN;
            state.player.vel.x = 0.0;
        }
    }
    if state.player.pos.x < 0.0 {
        if state.level_index > 0 {
            state.level_index -= 1;
            state.player.pos.x = RIGHT_ENTRY_X;
        } else {
            state.player.pos.x = 0.0;
            state.player.vel.x = 0.0;
        }
    }

    if state.level_index == from {
        return false;
    }

    log::info!(
        "Entered level {} ({})",
        state.level_index + 1,
        state.current_level().name
    );
    state.events.push(GameEvent::LevelChanged {
        from,
        to: state.level_index,
    });
    true
}

/// Scared kids tumble; alert kids watch for a ghost in front of them.
fn update_kids(state: &mut GameState, frames: f32) {
    let gravity = state.tuning.gravity;
    let sight_range = state.tuning.detection_radius;
    let sight_height = state.tuning.detection_height;
    let fall_limit = state.camera.fall_limit();
    let ghost = state.player.center();
    let level_index = state.level_index;

    let mut spotted = Vec::new();
    for (i, kid) in state.levels[level_index].kids.iter_mut().enumerate() {
        if kid.scared {
            if kid.falling {
                kid.vy += gravity * frames;
                kid.pos.y += kid.vy * frames;
                if kid.pos.y > fall_limit {
                    kid.falling = false;
                }
            }
            continue;
        }
        if kid.seen {
            continue;
        }

        let d = offset_to(kid.pos + Vec2::new(0.0, KID_SIGHT_OFFSET), ghost);
        if kid.facing.faces(d.x) && d.y.abs() < sight_height && d.x.abs() < sight_range {
            kid.seen = true;
            spotted.push(i);
        }
    }

    for kid in spotted {
        state.lose_point();
        log::debug!("Kid {kid} on level {} spotted the ghost", level_index + 1);
        state.events.push(GameEvent::KidSpotted {
            level: level_index,
            kid,
        });
    }
}

/// Try to scare every kid within reach on the current level.
///
/// Kids that already spotted the ghost can't be scared; they cost nothing
/// extra here since the penalty was taken when they spotted it.
pub fn attempt_scare(state: &mut GameState) {
    if state.player.scare_cooldown > 0.0 {
        return;
    }
    state.player.scare_cooldown = state.tuning.scare_cooldown;

    let radius = state.tuning.scare_radius;
    let startle = state.tuning.kid_startle_velocity;
    let ghost = state.player.center();
    let level_index = state.level_index;

    let mut scared = Vec::new();
    for (i, kid) in state.levels[level_index].kids.iter_mut().enumerate() {
        if kid.scared || kid.seen {
            continue;
        }
        let d = offset_to(kid.pos + Vec2::new(0.0, KID_SCARE_OFFSET), ghost);
        if d.length() < radius {
            kid.scared = true;
            kid.falling = true;
            kid.vy = -startle;
            scared.push(i);
        }
    }

    if scared.is_empty() {
        state.events.push(GameEvent::ScareMissed);
        return;
    }
    for kid in scared {
        state.add_point();
        log::debug!("Scared kid {kid} on level {}", level_index + 1);
        state.events.push(GameEvent::KidScared {
            level: level_index,
            kid,
        });
    }
}

fn check_outcome(state: &mut GameState) {
    if state.score >= state.win_target() {
        state.phase = GamePhase::Won;
        state.events.push(GameEvent::Victory);
        log::info!("Victory with {} scares", state.score);
    } else if state.all_kids_resolved() {
        state.phase = GamePhase::Lost;
        state.events.push(GameEvent::Defeat);
        log::info!("Defeat: {} of {} scares", state.score, state.win_target());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// A state that has settled onto the Foyer floor
    fn grounded() -> GameState {
        let mut state = GameState::default();
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert!(state.player.on_ground);
        state.drain_events();
        state
    }

    /// Put the ghost's center at `center` with no motion
    fn place_ghost(state: &mut GameState, center: Vec2) {
        state.player.pos = center - Vec2::new(PLAYER_WIDTH / 2.0, PLAYER_HEIGHT / 2.0);
        state.player.vel = Vec2::ZERO;
        state.player.on_ground = false;
    }

    fn scare() -> TickInput {
        TickInput {
            scare: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_first_tick_lands_on_ground() {
        let state = grounded();
        assert_eq!(state.player.bottom(), 450.0);
        assert_eq!(state.player.vel.y, 0.0);
    }

    #[test]
    fn test_walk_right_applies_ground_friction() {
        let mut state = grounded();
        let x0 = state.player.pos.x;
        let input = TickInput {
            right: true,
            ..Default::default()
        };
        tick(&mut state, &input, SIM_DT);
        assert!((state.player.pos.x - (x0 + 0.6)).abs() < 1e-4);
        assert!((state.player.vel.x - 0.6 * 0.86).abs() < 1e-5);
        assert_eq!(state.player.facing, Facing::Right);

        let input = TickInput {
            left: true,
            sprint: true,
            ..Default::default()
        };
        tick(&mut state, &input, SIM_DT);
        assert_eq!(state.player.facing, Facing::Left);
        assert!(state.player.vel.x < 0.0);
    }

    #[test]
    fn test_jump_only_from_ground() {
        let mut state = grounded();
        let input = TickInput {
            jump: true,
            ..Default::default()
        };
        tick(&mut state, &input, SIM_DT);
        assert!(!state.player.on_ground);
        assert!((state.player.vel.y - (-15.0 + 0.9)).abs() < 1e-5);

        // Holding jump in the air does nothing more
        tick(&mut state, &input, SIM_DT);
        assert!((state.player.vel.y - (-15.0 + 1.8)).abs() < 1e-5);

        // Eventually comes back down onto the floor
        for _ in 0..60 {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        assert!(state.player.on_ground);
        assert_eq!(state.player.bottom(), 450.0);
    }

    #[test]
    fn test_right_edge_advances_level() {
        let mut state = grounded();
        state.player.pos.x = LEVEL_WIDTH - RIGHT_EDGE_MARGIN - 0.1;
        state.player.vel.x = 2.0;
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.level_index, 1);
        assert_eq!(state.player.pos.x, LEFT_ENTRY_X);
        assert!(
            state
                .drain_events()
                .contains(&GameEvent::LevelChanged { from: 0, to: 1 })
        );
    }

    #[test]
    fn test_last_level_clamps_right() {
        let mut state = grounded();
        state.level_index = 2;
        state.player.pos.x = LEVEL_WIDTH - RIGHT_EDGE_MARGIN;
        state.player.vel.x = 5.0;
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.level_index, 2);
        assert_eq!(state.player.pos.x, LEVEL_WIDTH - RIGHT_EDGE_MARGIN);
        assert_eq!(state.player.vel.x, 0.0);
    }

    #[test]
    fn test_left_edge_goes_back_or_clamps() {
        let mut state = grounded();
        state.player.pos.x = 0.5;
        state.player.vel.x = -2.0;
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.level_index, 0);
        assert_eq!(state.player.pos.x, 0.0);

        state.level_index = 1;
        state.player.pos.x = 0.5;
        state.player.vel.x = -2.0;
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.level_index, 0);
        assert_eq!(state.player.pos.x, RIGHT_ENTRY_X);
    }

    #[test]
    fn test_entering_higher_floor_lands_on_it() {
        let mut state = grounded();
        // Ballroom floor (top 460) sits lower than the Library's (top 450)
        state.level_index = 2;
        state.player.land(460.0);
        state.player.pos.x = 0.5;
        state.player.vel.x = -2.0;
        tick(&mut state, &TickInput::default(), SIM_DT);

        assert_eq!(state.level_index, 1);
        assert_eq!(state.player.bottom(), 450.0);
        assert!(state.player.on_ground);
        assert_eq!(state.player.vel.y, 0.0);

        for _ in 0..30 {
            tick(&mut state, &TickInput::default(), SIM_DT);
            assert_eq!(state.player.bottom(), 450.0);
        }
    }

    #[test]
    fn test_scare_uses_positions_before_the_move() {
        let mut state = grounded();
        // Just outside Foyer kid 0's reach (anchor 260, 340), closing at 5 px a frame
        place_ghost(&mut state, Vec2::new(179.0, 340.0));
        state.player.vel.x = 5.0;
        tick(&mut state, &scare(), SIM_DT);

        let anchor = Vec2::new(260.0, 340.0);
        assert!(state.player.center().distance(anchor) < state.tuning.scare_radius);
        assert!(!state.levels[0].kids[0].scared);
        assert_eq!(state.score, 0);
        assert_eq!(state.drain_events(), vec![GameEvent::ScareMissed]);
    }

    #[test]
    fn test_scare_lands_before_kid_can_spot() {
        let mut state = grounded();
        // In front of Foyer kid 0 and inside scare range
        place_ghost(&mut state, Vec2::new(300.0, 340.0));
        tick(&mut state, &scare(), SIM_DT);

        let kid = &state.levels[0].kids[0];
        assert!(kid.scared);
        assert!(!kid.seen);
        assert_eq!(state.score, 1);
        let events = state.drain_events();
        assert!(events.contains(&GameEvent::KidScared { level: 0, kid: 0 }));
        assert!(
            !events
                .iter()
                .any(|e| matches!(e, GameEvent::KidSpotted { .. }))
        );
    }

    #[test]
    fn test_kid_spots_ghost_in_front() {
        let mut state = grounded();
        state.score = 1;
        // Foyer kid 0 stands at (260, 330) facing right
        place_ghost(&mut state, Vec2::new(300.0, 335.0));
        tick(&mut state, &TickInput::default(), SIM_DT);

        assert!(state.levels[0].kids[0].seen);
        assert_eq!(state.score, 0);
        assert!(
            state
                .drain_events()
                .contains(&GameEvent::KidSpotted { level: 0, kid: 0 })
        );

        // Staying in view costs nothing more, and the score stays at zero
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.score, 0);
        assert!(state.drain_events().is_empty());
    }

    #[test]
    fn test_kid_does_not_see_behind() {
        let mut state = grounded();
        place_ghost(&mut state, Vec2::new(220.0, 335.0));
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert!(!state.levels[0].kids[0].seen);
    }

    #[test]
    fn test_scare_from_behind_scores() {
        let mut state = grounded();
        place_ghost(&mut state, Vec2::new(220.0, 340.0));
        tick(&mut state, &scare(), SIM_DT);

        let kid = &state.levels[0].kids[0];
        assert!(kid.scared && kid.falling);
        assert!(kid.vy > -6.0 && kid.vy < 0.0);
        assert_eq!(state.score, 1);
        assert!((state.player.scare_cooldown - 17.0).abs() < 1e-4);
        assert!(
            state
                .drain_events()
                .contains(&GameEvent::KidScared { level: 0, kid: 0 })
        );
    }

    #[test]
    fn test_cooldown_blocks_repeat_scare() {
        let mut state = grounded();
        place_ghost(&mut state, Vec2::new(220.0, 340.0));
        tick(&mut state, &scare(), SIM_DT);
        state.drain_events();

        // Behind Foyer kid 1, well inside scare range
        place_ghost(&mut state, Vec2::new(1000.0, 300.0));
        tick(&mut state, &scare(), SIM_DT);
        assert!(!state.levels[0].kids[1].scared);
        assert!(state.drain_events().is_empty());
        assert!((state.player.scare_cooldown - 16.0).abs() < 1e-4);
    }

    #[test]
    fn test_scare_with_nobody_near_misses() {
        let mut state = grounded();
        tick(&mut state, &scare(), SIM_DT);
        assert_eq!(state.score, 0);
        assert_eq!(state.drain_events(), vec![GameEvent::ScareMissed]);
        assert!(state.player.scare_cooldown > 0.0);
    }

    #[test]
    fn test_seen_kid_cannot_be_scared() {
        let mut state = grounded();
        state.levels[0].kids[0].seen = true;
        place_ghost(&mut state, Vec2::new(220.0, 340.0));
        tick(&mut state, &scare(), SIM_DT);
        assert!(!state.levels[0].kids[0].scared);
        assert_eq!(state.score, 0);
        assert!(state.drain_events().contains(&GameEvent::ScareMissed));
    }

    #[test]
    fn test_scared_kid_falls_and_never_spots() {
        let mut state = grounded();
        place_ghost(&mut state, Vec2::new(220.0, 340.0));
        tick(&mut state, &scare(), SIM_DT);
        let y0 = state.levels[0].kids[0].pos.y;

        // Walk in front of the scared kid
        place_ghost(&mut state, Vec2::new(300.0, 335.0));
        for _ in 0..30 {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        let kid = &state.levels[0].kids[0];
        assert!(!kid.seen);
        assert!(kid.pos.y > y0);
        assert_eq!(state.score, 1);
    }

    #[test]
    fn test_reaching_target_wins_and_freezes() {
        let mut state = grounded();
        state.tuning.required_score_to_win = 1;
        place_ghost(&mut state, Vec2::new(220.0, 340.0));
        tick(&mut state, &scare(), SIM_DT);
        assert_eq!(state.phase, GamePhase::Won);
        assert!(state.drain_events().contains(&GameEvent::Victory));

        let ticks = state.time_ticks;
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.time_ticks, ticks);
    }

    #[test]
    fn test_all_kids_resolved_short_of_target_loses() {
        let mut state = grounded();
        for kid in state.levels.iter_mut().flat_map(|l| l.kids.iter_mut()) {
            kid.seen = true;
        }
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.phase, GamePhase::Lost);
        assert!(state.drain_events().contains(&GameEvent::Defeat));
    }

    #[test]
    fn test_fall_recovery_snaps_to_ground() {
        let mut state = grounded();
        state.set_viewport(800.0, 600.0);
        state.player.pos.y = 900.0;
        state.player.vel = Vec2::new(3.0, 10.0);
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.player.bottom(), 450.0);
        assert_eq!(state.player.vel, Vec2::ZERO);
    }

    #[test]
    fn test_pause_toggle() {
        let mut state = grounded();
        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut state, &pause, SIM_DT);
        assert_eq!(state.phase, GamePhase::Paused);

        let ticks = state.time_ticks;
        tick(&mut state, &TickInput::default(), SIM_DT);
        assert_eq!(state.time_ticks, ticks);

        tick(&mut state, &pause, SIM_DT);
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_determinism() {
        let mut state1 = GameState::default();
        let mut state2 = GameState::default();

        let inputs = [
            TickInput {
                right: true,
                sprint: true,
                ..Default::default()
            },
            TickInput {
                jump: true,
                right: true,
                ..Default::default()
            },
            scare(),
            TickInput::default(),
        ];

        for _ in 0..50 {
            for input in &inputs {
                tick(&mut state1, input, SIM_DT);
                tick(&mut state2, input, SIM_DT);
            }
        }

        assert_eq!(state1.time_ticks, state2.time_ticks);
        assert_eq!(state1.player, state2.player);
        assert_eq!(state1.score, state2.score);
    }

    fn arb_input() -> impl Strategy<Value = TickInput> {
        (
            any::<bool>(),
            any::<bool>(),
            any::<bool>(),
            any::<bool>(),
            any::<bool>(),
        )
            .prop_map(|(left, right, jump, sprint, scare)| TickInput {
                left,
                right,
                jump,
                sprint,
                scare,
                pause: false,
            })
    }

    proptest! {
        #[test]
        fn score_bounded_by_scared_kids(inputs in prop::collection::vec(arb_input(), 1..400)) {
            let mut state = GameState::default();
            for input in &inputs {
                tick(&mut state, input, SIM_DT);
                let scared = state
                    .levels
                    .iter()
                    .flat_map(|l| l.kids.iter())
                    .filter(|k| k.scared)
                    .count() as u32;
                prop_assert!(state.score <= scared);
                prop_assert!(state.player.pos.x >= 0.0);
                prop_assert!(state.player.pos.x <= LEVEL_WIDTH - RIGHT_EDGE_MARGIN);
                prop_assert!(state.level_index < state.levels.len());
            }
        }
    }
}
