//! Core types for flourish animated entity fields.
//!
//! Everything here is plain data shared by the field engine, the
//! configuration loader and the terminal host: surface bounds, colors,
//! sampling ranges and the per-field tuning parameters.

mod color;
mod geometry;
mod params;

pub use color::{AMBIENT_PALETTE, DEFAULT_PALETTE, Rgb};
pub use geometry::Bounds;
pub use params::{Attraction, Connection, FieldKind, FieldParams, ShapeKind, Span};
