//! Error types for the field engine.

use thiserror::Error;

/// Reasons a field cannot be mounted.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FieldError {
    /// The host has no container with this name.
    #[error("host container not found: {0}")]
    ContainerMissing(String),

    /// Some settings are out of range or not finite.
    #[error("invalid field parameters: {}", .0.join(", "))]
    InvalidParams(Vec<&'static str>),
}
