//! Square-preserving interactive resize

use tracing::{debug, warn};

use super::{InteractionToken, TokenSource};
use crate::entity::EntityId;
use crate::layout::{Point, Size};

/// Side length after dragging the resize handle by `(dx, dy)` from where the
/// session started.
///
/// The larger axis drives the change; any negative component shrinks.
/// A move that would give a non-finite side keeps the base side.
pub fn resized_side(base: Size, dx: f64, dy: f64, min_size: f64) -> f64 {
    let sign = if dx < 0.0 || dy < 0.0 { -1.0 } else { 1.0 };
    let delta = dx.abs().max(dy.abs()) * sign;
    let side = base.side() + delta;
    if side.is_finite() {
        side.max(min_size)
    } else {
        base.side().max(min_size)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ResizeSession {
    token: InteractionToken,
    entity: EntityId,
    origin: Point,
    base: Size,
}

/// Tracks the single active resize session
///
/// Dropping the controller releases any session it still holds.
#[derive(Debug, Clone)]
pub struct ResizeController {
    min_size: f64,
    active: Option<ResizeSession>,
    tokens: TokenSource,
}

impl ResizeController {
    pub fn new(min_size: f64) -> Self {
        Self {
            min_size,
            active: None,
            tokens: TokenSource::default(),
        }
    }

    /// Start resizing `entity`, superseding any session already in flight
    pub fn begin(&mut self, entity: EntityId, pointer: Point, base: Size) -> InteractionToken {
        if let Some(previous) = self.active.take() {
            debug!(
                entity = %previous.entity,
                token = %previous.token,
                "resize superseded by a new session"
            );
        }
        let token = self.tokens.issue();
        self.active = Some(ResizeSession {
            token,
            entity,
            origin: pointer,
            base,
        });
        debug!(%entity, %token, side = base.side(), "resize started");
        token
    }

    /// New side for the session behind `token` given the current pointer.
    ///
    /// Returns `None` for a stale token. Every update is computed from the
    /// captured base, so skipped intermediate moves change nothing.
    pub fn update(&self, token: InteractionToken, pointer: Point) -> Option<(EntityId, f64)> {
        let session = self.session(token)?;
        let dx = pointer.x - session.origin.x;
        let dy = pointer.y - session.origin.y;
        Some((
            session.entity,
            resized_side(session.base, dx, dy, self.min_size),
        ))
    }

    /// Finish the session behind `token`; false if it was no longer active
    pub fn end(&mut self, token: InteractionToken) -> bool {
        if self.session(token).is_some() {
            self.active = None;
            debug!(%token, "resize ended");
            true
        } else {
            false
        }
    }

    /// Drop whatever session is active, returning the entity it targeted
    pub fn cancel(&mut self) -> Option<EntityId> {
        self.active.take().map(|s| s.entity)
    }

    /// Entity currently being resized
    pub fn active_entity(&self) -> Option<EntityId> {
        self.active.map(|s| s.entity)
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn min_size(&self) -> f64 {
        self.min_size
    }

    fn session(&self, token: InteractionToken) -> Option<&ResizeSession> {
        match &self.active {
            Some(session) if session.token == token => Some(session),
            _ => {
                warn!(%token, "ignoring resize event for an inactive session");
                None
            }
        }
    }
}
