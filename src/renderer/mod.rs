//! Incremental pixel rendering module
//!
//! Draws the table onto any [`Display`], repainting only what changed
//! between frames.

pub mod damage;
pub mod display;
pub mod framebuffer;
pub mod palette;

pub use damage::{Damage, DamageRect, DamageRenderer, RenderCache, StickPose};
pub use display::{Display, Rgb565};
pub use framebuffer::{DrawStats, FrameBuffer};
