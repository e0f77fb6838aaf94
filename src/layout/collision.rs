//! Greedy overlap avoidance for dropped entities
//!
//! The search is greedy: starting from the clamped drop target it
//! steps diagonally by a fixed nudge until the candidate no longer overlaps any
//! other entity, or the iteration budget runs out. It is not a packing
//! algorithm; crowded canvases can exhaust the budget and the last candidate
//! is accepted as-is.
//!
//! ## Overlap test
//!
//! Two anchors overlap when both axis distances are below the side of the
//! *moved* entity's bounding square. The stationary entity's own size is not
//! consulted, so a small entity may sit closer to a large one than the reverse.

use tracing::{debug, warn};

use super::config::CollisionConfig;
use super::space::CoordinateSpace;
use super::types::{Point, Size};

/// Outcome of a collision search
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    /// Final, in-bounds top-left anchor
    pub position: Point,
    /// Number of nudges applied
    pub iterations: usize,
    /// Whether the final position still overlaps another entity
    pub overlapping: bool,
}

/// Fixed-step diagonal search for a free spot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionResolver {
    nudge_step: f64,
    max_iterations: usize,
}

impl Default for CollisionResolver {
    fn default() -> Self {
        Self::from_config(&CollisionConfig::default())
    }
}

impl CollisionResolver {
    pub fn new(nudge_step: f64, max_iterations: usize) -> Self {
        Self {
            nudge_step,
            max_iterations,
        }
    }

    pub fn from_config(config: &CollisionConfig) -> Self {
        Self::new(config.nudge_step, config.max_iterations)
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Same-size box test between a candidate anchor and another anchor
    pub fn overlaps(candidate: Point, side: f64, other: Point) -> bool {
        (other.x - candidate.x).abs() < side && (other.y - candidate.y).abs() < side
    }

    /// Nudge `candidate` until it clears every anchor in `obstacles`.
    ///
    /// `obstacles` must not include the moved entity itself. The candidate is
    /// clamped before the first test and after every nudge, so the result is
    /// always in bounds.
    pub fn resolve(
        &self,
        candidate: Point,
        size: Size,
        obstacles: &[Point],
        space: &CoordinateSpace,
    ) -> Resolution {
        let side = size.side();
        let hits = |p: Point| obstacles.iter().any(|o| Self::overlaps(p, side, *o));

        let mut position = space.clamp(candidate, size);
        let mut iterations = 0;
        while iterations < self.max_iterations && hits(position) {
            position = space.clamp(position.nudged(self.nudge_step), size);
            iterations += 1;
        }

        let overlapping = hits(position);
        if overlapping {
            warn!(
                x = position.x,
                y = position.y,
                iterations,
                "collision budget exhausted, accepting overlapping position"
            );
        } else if iterations > 0 {
            debug!(x = position.x, y = position.y, iterations, "nudged clear of overlap");
        }

        Resolution {
            position,
            iterations,
            overlapping,
        }
    }
}
