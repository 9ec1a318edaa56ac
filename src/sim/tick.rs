//! Fixed timestep simulation tick
//!
//! One tick = friction, pocket attraction, two half-step integrations with
//! pocket capture and rail resolution after each, and a ball-ball resolver
//! pass after each integration. Velocities are per tick, not per second.

use glam::Vec2;

use super::collision::{resolve_collisions, resolve_rails};
use super::state::{Ball, BallState, CueState, GameState, SimEvent, StepReport};
use super::table::Table;
use crate::consts::*;
use crate::tuning::Tuning;

/// Advance the simulation by one tick
pub fn step(state: &mut GameState) -> StepReport {
    let mut report = StepReport::default();
    let GameState {
        table,
        tuning,
        balls,
        cue,
        time_ticks,
    } = state;
    *time_ticks += 1;

    // Balls left resting at a pocket mouth trickle in
    for ball in balls.iter_mut() {
        if ball.state == BallState::Resting && table.is_in_attraction_zone(ball.pos) {
            ball.wake();
        }
    }

    for i in 0..balls.len() {
        let ball = &mut balls[i];
        if !ball.is_moving() {
            continue;
        }

        ball.vel *= tuning.friction;
        if ball.speed() < tuning.min_velocity {
            if table.is_in_attraction_zone(ball.pos) {
                ball.vel *= 0.5;
            } else {
                ball.stop();
                continue;
            }
        }

        attract(ball, table, tuning);
        advance(i, ball, table, tuning, cue, &mut report.events);
    }

    let mut contacts = Vec::new();
    report.collided = resolve_collisions(balls, table, tuning, &mut contacts);

    // Remaining movement: catches fast balls crossing a boundary mid-tick
    for i in 0..balls.len() {
        let ball = &mut balls[i];
        if ball.is_moving() {
            advance(i, ball, table, tuning, cue, &mut report.events);
        }
    }

    let first_pass = contacts.len();
    resolve_collisions(balls, table, tuning, &mut contacts);
    let (first, second) = contacts.split_at(first_pass);
    for &(a, b) in first
        .iter()
        .chain(second.iter().filter(|pair| !first.contains(pair)))
    {
        report.events.push(SimEvent::Collision { a, b });
    }

    if !cue.is_aiming && !balls.iter().any(Ball::is_moving) {
        cue.is_aiming = true;
        report.events.push(SimEvent::TableSettled);
        log::info!(
            "Table settled at tick {}, {} balls left",
            time_ticks,
            balls.iter().filter(|b| b.on_table()).count()
        );
    }

    report
}

/// Pull a ball inside an attraction zone toward that pocket's center
///
/// Returns true if the ball was in a zone.
fn attract(ball: &mut Ball, table: &Table, tuning: &Tuning) -> bool {
    let Some(pocket) = table.attracting_pocket(ball.pos) else {
        return false;
    };
    let toward = (pocket.center - ball.pos).normalize_or_zero();
    if toward != Vec2::ZERO {
        ball.vel += toward * tuning.pocket_attraction;
    }
    ball.state = BallState::Moving;
    true
}

/// Integrate one half-step, then capture or collide with the rails
fn advance(
    index: usize,
    ball: &mut Ball,
    table: &Table,
    tuning: &Tuning,
    cue: &mut CueState,
    events: &mut Vec<SimEvent>,
) {
    ball.pos += ball.vel * tuning.sub_step;

    // Capture takes priority over any rail bounce
    if let Some(pocket) = table.capturing_pocket(ball.pos) {
        capture(index, ball, pocket, cue, events);
        return;
    }

    if !attract(ball, table, tuning) {
        resolve_rails(ball, table, tuning);
    }
}

/// Drop a ball into a pocket; the cue ball goes back on its spot
fn capture(
    index: usize,
    ball: &mut Ball,
    pocket: usize,
    cue: &mut CueState,
    events: &mut Vec<SimEvent>,
) {
    ball.vel = Vec2::ZERO;
    if ball.is_cue() {
        ball.pos = CUE_START;
        ball.state = BallState::Resting;
        cue.is_aiming = true;
        cue.is_charging = false;
        cue.power = 0.0;
        events.push(SimEvent::CueBallRespawned { pocket });
        log::info!("Cue ball pocketed in pocket {}, respawning", pocket);
    } else {
        ball.state = BallState::Captured;
        events.push(SimEvent::Pocketed {
            ball: index,
            pocket,
        });
        log::info!("Ball {} pocketed in pocket {}!", ball.number, pocket);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// A table with only the cue ball and ball 1 in play
    fn two_ball_state(object_pos: Vec2) -> GameState {
        let mut state = GameState::new(Tuning::default());
        for ball in state.balls.iter_mut().skip(2) {
            ball.state = BallState::Captured;
        }
        state.balls[1].pos = object_pos;
        state
    }

    #[test]
    fn test_resting_ball_on_attraction_boundary_is_pulled() {
        let layout = GameState::new(Tuning::default());
        let pocket = layout.table.pockets()[4].clone();
        let start = pocket.center + Vec2::new(0.0, pocket.attraction_radius);
        let mut state = two_ball_state(start);

        step(&mut state);

        let ball = &state.balls[1];
        assert_eq!(ball.state, BallState::Moving);
        assert!(ball.vel.length() > 0.0);
        assert!(ball.vel.dot(pocket.center - ball.pos) > 0.0);
    }

    #[test]
    fn test_ball_at_pocket_center_is_captured() {
        let layout = GameState::new(Tuning::default());
        let center = layout.table.pockets()[1].center;
        let mut state = two_ball_state(center);

        let report = step(&mut state);

        assert_eq!(state.balls[1].state, BallState::Captured);
        assert!(report.events.contains(&SimEvent::Pocketed { ball: 1, pocket: 1 }));
        assert_eq!(state.count_on_table(), 1);
    }

    #[test]
    fn test_cue_ball_respawns_after_capture() {
        let mut state = two_ball_state(Vec2::new(150.0, 120.0));
        let pocket = state.table.pockets()[0].center;
        state.cue.is_aiming = false;
        let cue_ball = state.cue_ball_mut();
        cue_ball.pos = pocket + Vec2::new(3.0, 3.0);
        cue_ball.vel = Vec2::new(-1.0, -1.0);
        cue_ball.state = BallState::Moving;

        let report = step(&mut state);

        let cue_ball = state.cue_ball();
        assert_eq!(cue_ball.pos, CUE_START);
        assert_eq!(cue_ball.vel, Vec2::ZERO);
        assert_eq!(cue_ball.state, BallState::Resting);
        assert!(state.cue.is_aiming);
        assert!(report.events.contains(&SimEvent::CueBallRespawned { pocket: 0 }));
    }

    #[test]
    fn test_captured_ball_never_moves_again() {
        let mut state = GameState::new(Tuning::default());
        state.balls[5].state = BallState::Captured;
        let frozen = state.balls[5].pos;
        // Fire a hard shot straight into the rack
        state.aim_at_nearest_ball();
        state.charge_start();
        state.cue.power = 100.0;
        state.charge_release();

        for _ in 0..600 {
            step(&mut state);
            assert_eq!(state.balls[5].state, BallState::Captured);
            assert_eq!(state.balls[5].pos, frozen);
            assert_eq!(state.balls[5].vel, Vec2::ZERO);
        }
    }

    #[test]
    fn test_slow_ball_comes_to_rest() {
        let mut state = two_ball_state(Vec2::new(150.0, 120.0));
        let ball = &mut state.balls[1];
        ball.vel = Vec2::new(0.2, 0.0);
        ball.state = BallState::Moving;

        step(&mut state);

        assert_eq!(state.balls[1].state, BallState::Resting);
        assert_eq!(state.balls[1].vel, Vec2::ZERO);
    }

    #[test]
    fn test_head_on_collision_reported() {
        let mut state = two_ball_state(Vec2::new(160.0, 120.0));
        let cue_ball = state.cue_ball_mut();
        cue_ball.pos = Vec2::new(149.0, 120.0);
        cue_ball.vel = Vec2::new(3.0, 0.0);
        cue_ball.state = BallState::Moving;
        state.cue.is_aiming = false;

        let report = step(&mut state);

        assert!(report.collided);
        assert!(report.events.contains(&SimEvent::Collision { a: 0, b: 1 }));
        assert_eq!(state.balls[1].state, BallState::Moving);
        assert!(state.balls[1].vel.x > 0.0);
    }

    #[test]
    fn test_ball_stays_inside_after_rail_hit() {
        let mut state = two_ball_state(Vec2::new(80.0, 120.0));
        let ball = &mut state.balls[1];
        ball.vel = Vec2::new(0.0, 12.0);
        ball.state = BallState::Moving;

        for _ in 0..20 {
            step(&mut state);
            let ball = &state.balls[1];
            assert!(ball.pos.y <= state.table.top() - BALL_RADIUS);
        }
        assert!(state.balls[1].vel.y <= 0.0);
    }

    #[test]
    fn test_corner_jam_bounces_off_rail() {
        let layout = GameState::new(Tuning::default());
        let corner = layout.table.pockets()[0].center;
        let mut state = two_ball_state(corner + Vec2::new(7.0, 17.0));
        let ball = &mut state.balls[1];
        ball.vel = Vec2::new(-1.0, 1.6);
        ball.state = BallState::Moving;

        step(&mut state);

        let ball = &state.balls[1];
        assert!(ball.vel.x > 0.0);
        assert!(ball.pos.x - state.table.left() >= BALL_RADIUS + 1.0);
        assert_eq!(ball.state, BallState::Moving);
    }

    #[test]
    fn test_break_shot_settles() {
        let mut state = GameState::new(Tuning::default());
        state.aim_at_nearest_ball();
        state.charge_start();
        state.cue.power = 100.0;
        state.charge_release();
        assert!(!state.cue.is_aiming);

        let mut settled = false;
        for _ in 0..10_000 {
            let report = step(&mut state);
            if report.events.contains(&SimEvent::TableSettled) {
                settled = true;
                break;
            }
        }
        assert!(settled);
        assert!(state.cue.is_aiming);
        assert!(!state.any_moving());
        assert!(state.cue_ball().on_table());
    }

    proptest! {
        #[test]
        fn prop_energy_decreases_without_forcing(
            x in 80.0f32..240.0,
            y in 70.0f32..170.0,
            angle in 0.0f32..std::f32::consts::TAU,
            speed in 0.5f32..5.0,
        ) {
            let mut state = GameState::new(Tuning::default());
            for ball in state.balls.iter_mut().skip(1) {
                ball.state = BallState::Captured;
            }
            let cue_ball = state.cue_ball_mut();
            cue_ball.pos = Vec2::new(x, y);
            cue_ball.vel = crate::direction(angle) * speed;
            cue_ball.state = BallState::Moving;

            let before = state.kinetic_energy();
            let report = step(&mut state);
            let after = state.kinetic_energy();

            prop_assert!(!report.collided);
            prop_assert!(after < before);
        }
    }
}
