//! Deterministic simulation module
//!
//! All table physics lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Stable iteration order (by ball index)
//! - No rendering or platform dependencies

pub mod collision;
pub mod cue;
pub mod state;
pub mod table;
pub mod tick;

pub use collision::{Contact, RailOutcome, resolve_collisions, resolve_pair, resolve_rails};
pub use cue::Heading;
pub use state::{Ball, BallState, CueState, GameState, SimEvent, StepReport, rack_positions};
pub use table::{Edge, Pocket, PocketKind, Table};
pub use tick::step;
