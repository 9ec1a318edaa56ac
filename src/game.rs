//! Frame orchestrator
//!
//! Ties the simulation to the renderer. An outer loop calls [`BilliardGame::frame`]
//! (or `update` and `draw` itself) and forwards player commands in between.

use glam::Vec2;

use crate::consts::*;
use crate::renderer::{DamageRenderer, Display};
use crate::sim::{GameState, Heading, SimEvent, StepReport, step};
use crate::tuning::Tuning;

/// Fixed timestep accumulator
///
/// Turns variable wall-clock frame times into a whole number of physics
/// ticks so the simulated speed does not depend on the frame rate.
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    accumulator: f32,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `elapsed` seconds and return how many ticks are due
    pub fn advance(&mut self, elapsed: f32) -> u32 {
        if !elapsed.is_finite() || elapsed <= 0.0 {
            return 0;
        }
        // Long stalls (debugger, suspended tab) are not caught up on
        self.accumulator += elapsed.min(0.1);

        let mut ticks = 0;
        while self.accumulator >= SIM_DT && ticks < MAX_SUBSTEPS {
            self.accumulator -= SIM_DT;
            ticks += 1;
        }
        ticks
    }

    /// Time banked toward the next tick, in seconds
    pub fn pending(&self) -> f32 {
        self.accumulator
    }
}

/// A billiard table drawn on a display
pub struct BilliardGame<D: Display> {
    state: GameState,
    renderer: DamageRenderer,
    display: D,
    clock: FrameClock,
    shots: u32,
}

impl<D: Display> BilliardGame<D> {
    pub fn new(display: D, tuning: Tuning) -> Self {
        Self {
            state: GameState::new(tuning),
            renderer: DamageRenderer::new(),
            display,
            clock: FrameClock::new(),
            shots: 0,
        }
    }

    /// Rack the balls and paint the whole table
    pub fn init(&mut self) {
        let (w, h) = self.display.size();
        if (w, h) != (SCREEN_WIDTH, SCREEN_HEIGHT) {
            log::warn!(
                "Display is {}x{}, table layout assumes {}x{}",
                w,
                h,
                SCREEN_WIDTH,
                SCREEN_HEIGHT
            );
        }
        self.reset_game();
        self.draw();
    }

    /// Rack the balls; the next draw repaints everything
    pub fn reset_game(&mut self) {
        self.state.rack();
        self.renderer.invalidate();
        self.clock = FrameClock::new();
        self.shots = 0;
        log::info!("Table racked with {} balls", self.state.balls.len());
    }

    /// One physics tick plus the automatic power charge
    pub fn update(&mut self) -> StepReport {
        self.state.charge_tick();
        let report = step(&mut self.state);
        if report.collided {
            self.renderer.note_collision();
        }
        for event in &report.events {
            match event {
                SimEvent::Collision { a, b } => {
                    log::trace!("Contact between balls {} and {}", a, b);
                }
                SimEvent::CueBallRespawned { .. } => self.renderer.note_teleport(CUE_BALL),
                _ => {}
            }
        }
        report
    }

    /// Bring the display up to date
    pub fn draw(&mut self) {
        self.renderer.render(&mut self.display, &self.state);
    }

    /// Run whatever ticks `elapsed` seconds are worth, then draw once
    ///
    /// Returns the number of physics ticks run.
    pub fn frame(&mut self, elapsed: f32) -> u32 {
        let ticks = self.clock.advance(elapsed);
        for _ in 0..ticks {
            self.update();
        }
        self.draw();
        ticks
    }

    // Commands

    pub fn aim_left(&mut self) -> bool {
        self.state.aim_left()
    }

    pub fn aim_right(&mut self) -> bool {
        self.state.aim_right()
    }

    pub fn aim_to_angle(&mut self, angle: f32) -> bool {
        self.state.aim_to(angle)
    }

    pub fn aim_rotate_by(&mut self, delta: f32) -> bool {
        self.state.aim_by(delta)
    }

    pub fn aim_heading(&mut self, heading: Heading) -> bool {
        self.state.aim_heading(heading)
    }

    pub fn aim_at_nearest_ball(&mut self) -> bool {
        self.state.aim_at_nearest_ball()
    }

    pub fn aim_at_nearest_pocket(&mut self) -> bool {
        self.state.aim_at_nearest_pocket()
    }

    pub fn charge_start(&mut self) -> bool {
        self.state.charge_start()
    }

    /// Take the shot; returns the cue ball's launch velocity
    pub fn charge_release(&mut self) -> Option<Vec2> {
        let launched = self.state.charge_release();
        if launched.is_some() {
            self.shots += 1;
        }
        launched
    }

    pub fn power_up(&mut self) -> bool {
        self.state.power_up()
    }

    pub fn power_down(&mut self) -> bool {
        self.state.power_down()
    }

    // Accessors

    pub fn is_aiming(&self) -> bool {
        self.state.cue.is_aiming
    }

    pub fn is_charging(&self) -> bool {
        self.state.cue.is_charging
    }

    pub fn cue_angle(&self) -> f32 {
        self.state.cue.angle
    }

    pub fn cue_power(&self) -> f32 {
        self.state.cue.power
    }

    /// Balls still on the table, cue ball included
    pub fn count_active_balls(&self) -> usize {
        self.state.count_on_table()
    }

    /// Shots taken since the last rack
    pub fn shots_taken(&self) -> u32 {
        self.shots
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }

    pub fn into_display(self) -> D {
        self.display
    }
}
