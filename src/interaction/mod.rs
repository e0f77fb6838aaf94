//! Per-entity interaction state machines
//!
//! Drag and resize sessions are scoped to an [`InteractionToken`]: starting a
//! session hands out a fresh token and supersedes whatever session the same
//! controller had open, so a stale token can never move or resize anything.

pub mod orientation;
pub mod resize;

pub use orientation::Facing;
pub use resize::{resized_side, ResizeController};

use std::fmt;

/// Handle for one drag or resize session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InteractionToken(u64);

impl InteractionToken {
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for InteractionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Monotonic token generator, one per controller
#[derive(Debug, Clone, Default)]
pub(crate) struct TokenSource {
    last: u64,
}

impl TokenSource {
    pub(crate) fn issue(&mut self) -> InteractionToken {
        self.last += 1;
        InteractionToken(self.last)
    }
}
