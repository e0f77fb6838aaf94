//! Turning a pointer release into a committed position
//!
//! A drag captures one grab offset when it starts: the vector from the
//! entity's top-left corner to the pointer. On release the entity's anchor is
//! the pointer minus that offset, clamped to the canvas and then nudged clear
//! of other entities. Without a captured offset the entity is centered on the
//! pointer.

use tracing::{debug, warn};

use super::collision::{CollisionResolver, Resolution};
use super::space::CoordinateSpace;
use super::types::{Point, Size};
use crate::entity::EntityId;
use crate::interaction::{InteractionToken, TokenSource};

/// Compute where an entity of `size` lands when released at `pointer`
pub fn resolve_drop(
    pointer: Point,
    grab_offset: Option<Point>,
    size: Size,
    obstacles: &[Point],
    space: &CoordinateSpace,
    resolver: &CollisionResolver,
) -> Resolution {
    let offset = grab_offset.unwrap_or_else(|| size.half());
    let target = space.clamp(pointer - offset, size);
    resolver.resolve(target, size, obstacles, space)
}

/// The drag currently in flight
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    pub token: InteractionToken,
    pub entity: EntityId,
    pub grab_offset: Option<Point>,
}

/// Tracks the single active drag
#[derive(Debug, Clone, Default)]
pub struct DragController {
    active: Option<DragSession>,
    tokens: TokenSource,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start dragging `entity`, superseding any drag already in flight
    pub fn begin(&mut self, entity: EntityId, grab_offset: Option<Point>) -> InteractionToken {
        if let Some(previous) = self.active.take() {
            debug!(entity = %previous.entity, token = %previous.token, "drag superseded");
        }
        let token = self.tokens.issue();
        self.active = Some(DragSession {
            token,
            entity,
            grab_offset,
        });
        debug!(%entity, %token, "drag started");
        token
    }

    /// Close the drag behind `token` and hand back what the drop needs.
    ///
    /// A stale token leaves the active drag untouched and yields `None`.
    pub fn finish(&mut self, token: InteractionToken) -> Option<DragSession> {
        match self.active {
            Some(session) if session.token == token => self.active.take(),
            _ => {
                warn!(%token, "ignoring drop for an inactive drag");
                None
            }
        }
    }

    /// Abandon the active drag without committing anything
    pub fn cancel(&mut self) -> Option<EntityId> {
        self.active.take().map(|s| s.entity)
    }

    pub fn active(&self) -> Option<&DragSession> {
        self.active.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canvas() -> CoordinateSpace {
        CoordinateSpace::new(1200.0, 500.0)
    }

    #[test]
    fn test_grab_offset_is_subtracted() {
        let r = resolve_drop(
            Point::new(520.0, 210.0),
            Some(Point::new(20.0, 10.0)),
            Size::square(72.0),
            &[],
            &canvas(),
            &CollisionResolver::default(),
        );
        assert_eq!(r.position, Point::new(500.0, 200.0));
    }

    #[test]
    fn test_missing_offset_centers_on_pointer() {
        let r = resolve_drop(
            Point::new(536.0, 236.0),
            None,
            Size::square(72.0),
            &[],
            &canvas(),
            &CollisionResolver::default(),
        );
        assert_eq!(r.position, Point::new(500.0, 200.0));
    }

    #[test]
    fn test_drop_past_edge_is_clamped() {
        let r = resolve_drop(
            Point::new(1250.0, 100.0),
            Some(Point::origin()),
            Size::square(72.0),
            &[],
            &canvas(),
            &CollisionResolver::default(),
        );
        assert_eq!(r.position, Point::new(1128.0, 100.0));
    }

    #[test]
    fn test_drop_onto_neighbour_is_nudged() {
        let r = resolve_drop(
            Point::new(136.0, 136.0),
            None,
            Size::square(72.0),
            &[Point::new(100.0, 100.0)],
            &canvas(),
            &CollisionResolver::default(),
        );
        assert_eq!(r.position, Point::new(175.0, 175.0));
    }

    #[test]
    fn test_drag_controller_single_session() {
        let mut drag = DragController::new();
        let first = drag.begin(EntityId(1), None);
        let second = drag.begin(EntityId(2), Some(Point::new(3.0, 4.0)));

        assert_eq!(drag.finish(first), None);
        assert_eq!(drag.active().map(|s| s.entity), Some(EntityId(2)));

        let session = drag.finish(second).expect("active drag");
        assert_eq!(session.entity, EntityId(2));
        assert_eq!(session.grab_offset, Some(Point::new(3.0, 4.0)));
        assert!(drag.active().is_none());
        assert_eq!(drag.finish(second), None);
    }

    #[test]
    fn test_cancel_drops_session() {
        let mut drag = DragController::new();
        let token = drag.begin(EntityId(9), None);
        assert_eq!(drag.cancel(), Some(EntityId(9)));
        assert_eq!(drag.finish(token), None);
    }
}
