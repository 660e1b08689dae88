//! Animated entity fields.
//!
//! A field is a fixed pool of entities (floating outlines or glowing
//! particles) that drift, pulse, get pulled toward the pointer and wrap
//! around the edges of their surface. Each frame a [`FrameScheduler`] steps
//! every mounted field and redraws it onto its [`CellSurface`], which the
//! host then composites into the terminal as a ratatui widget.

mod chars;
mod driver;
mod entity;
mod error;
mod field;
mod pointer;
pub mod pool;
pub mod renderer;
pub mod stepper;
mod surface;

pub use driver::{Animate, FrameClock, FrameHandle, FrameScheduler};
pub use entity::{Entity, Life, Silhouette, Spin};
pub use error::FieldError;
pub use field::{Field, Host, MountedField};
pub use pointer::PointerTracker;
pub use renderer::connection_alpha;
pub use surface::{CellSurface, Paint, Surface};
