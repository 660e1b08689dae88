//! Latest pointer position for a field.

use std::{cell::Cell, rc::Rc};

use glam::Vec2;

/// Shared handle to the most recent pointer coordinate, in surface units.
///
/// Clones observe the same value. Every [`record`](Self::record)
/// overwrites the previous coordinate; no history is kept.
#[derive(Debug, Clone, Default)]
pub struct PointerTracker(Rc<Cell<Option<Vec2>>>);

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, position: Vec2) {
        self.0.set(Some(position));
    }

    /// Most recent coordinate, `None` until the pointer has moved once.
    pub fn latest(&self) -> Option<Vec2> {
        self.0.get()
    }

    /// Forget the pointer, e.g. when it leaves the terminal.
    pub fn forget(&self) {
        self.0.set(None);
    }
}
