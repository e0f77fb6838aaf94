//! An editing session over one stored arrangement
//!
//! [`Session`] is what a presentation layer talks to. It owns the
//! [`ArrangementState`], the storage adapter and the drag and resize
//! controllers, and writes the entity list back to storage after every
//! mutation. Reads (export, description, snapshot) never touch storage.
//!
//! Each mutation is applied in full or not at all: when the save fails, the
//! arrangement and both interaction controllers are put back as they were
//! and the caller gets [`SessionError::Persist`].

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::arrangement::{ArrangementError, ArrangementState, CreationError};
use crate::entity::{Entity, EntityId, NewEntity};
use crate::interaction::{Facing, InteractionToken, ResizeController};
use crate::layout::{ArrangementConfig, DragController, Point, Resolution, Size};
use crate::ports::{
    export_json, AnalysisGateway, AnalysisOutcome, ExportError, ExportSink, Payload, Persistence,
    PersistenceError,
};
use crate::renderer::{render_svg, snapshot_data_url, SvgConfig};
use crate::roles::RoleCatalog;

/// Errors returned by session operations
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Arrangement(#[from] ArrangementError),

    #[error("could not load stored arrangement: {0}")]
    Load(#[source] PersistenceError),

    #[error("could not save arrangement, change was reverted: {0}")]
    Persist(#[source] PersistenceError),
}

impl From<CreationError> for SessionError {
    fn from(err: CreationError) -> Self {
        SessionError::Arrangement(err.into())
    }
}

pub type SessionResult<T> = Result<T, SessionError>;

/// State to put back when a mutation cannot be saved
struct Checkpoint {
    state: ArrangementState,
    drag: DragController,
    resize: ResizeController,
}

/// Arrangement, storage and the interaction controllers
#[derive(Debug)]
pub struct Session<P: Persistence> {
    state: ArrangementState,
    store: P,
    drag: DragController,
    resize: ResizeController,
}

impl<P: Persistence> Session<P> {
    /// Load the stored list and start editing it
    pub fn open(store: P, config: ArrangementConfig, catalog: RoleCatalog) -> SessionResult<Self> {
        let entities = store.load().map_err(SessionError::Load)?;
        let min_size = config.sizing.min_size;
        let state = ArrangementState::with_entities(config, catalog, entities);
        info!(count = state.len(), "session opened");
        Ok(Self {
            state,
            store,
            drag: DragController::new(),
            resize: ResizeController::new(min_size),
        })
    }

    pub fn state(&self) -> &ArrangementState {
        &self.state
    }

    pub fn entities(&self) -> &[Entity] {
        self.state.entities()
    }

    pub fn store(&self) -> &P {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut P {
        &mut self.store
    }

    pub fn into_store(self) -> P {
        self.store
    }

    /// Create an entity at the staging point
    pub fn add(&mut self, input: NewEntity) -> SessionResult<EntityId> {
        self.transact(|s| Ok(s.state.create(input)?))
    }

    /// Remove an entity, abandoning any drag or resize aimed at it
    pub fn delete(&mut self, id: EntityId) -> SessionResult<Entity> {
        self.transact(|s| {
            let removed = s.state.delete(id)?;
            if s.drag.active().map(|d| d.entity) == Some(id) {
                s.drag.cancel();
            }
            if s.resize.active_entity() == Some(id) {
                s.resize.cancel();
            }
            Ok(removed)
        })
    }

    /// Remove every entity
    pub fn clear(&mut self) -> SessionResult<usize> {
        self.transact(|s| {
            s.drag.cancel();
            s.resize.cancel();
            Ok(s.state.clear())
        })
    }

    pub fn toggle_deceased(&mut self, id: EntityId) -> SessionResult<bool> {
        self.transact(|s| Ok(s.state.toggle_deceased(id)?))
    }

    /// Advance the facing by one step
    pub fn rotate(&mut self, id: EntityId) -> SessionResult<Facing> {
        self.transact(|s| Ok(s.state.rotate(id)?))
    }

    /// Put an entity at an exact (clamped) position, skipping overlap avoidance
    pub fn move_to(&mut self, id: EntityId, position: Point) -> SessionResult<Point> {
        self.transact(|s| Ok(s.state.commit_position(id, position)?))
    }

    /// Start dragging `id`.
    ///
    /// With a pointer, the grab offset is the pointer's distance from the
    /// entity's top-left corner; without one the drop centers the entity.
    pub fn begin_drag(
        &mut self,
        id: EntityId,
        pointer: Option<Point>,
    ) -> SessionResult<InteractionToken> {
        let entity = self.state.get(id).ok_or(ArrangementError::NotFound(id))?;
        let grab_offset = pointer.map(|p| p - entity.position());
        Ok(self.drag.begin(id, grab_offset))
    }

    /// Release the drag behind `token` at `pointer`.
    ///
    /// A stale token commits nothing and yields `Ok(None)`. If the drop
    /// cannot be saved the drag stays active, so it can be dropped again.
    pub fn drop_at(
        &mut self,
        token: InteractionToken,
        pointer: Point,
    ) -> SessionResult<Option<Resolution>> {
        let checkpoint = self.checkpoint();
        let Some(drag) = self.drag.finish(token) else {
            return Ok(None);
        };
        self.commit(checkpoint, |s| {
            Ok(s.state.place(drag.entity, pointer, drag.grab_offset)?)
        })
        .map(Some)
    }

    /// Abandon the active drag; nothing is written
    pub fn cancel_drag(&mut self) -> Option<EntityId> {
        self.drag.cancel()
    }

    /// Start resizing `id` from `pointer`
    pub fn begin_resize(&mut self, id: EntityId, pointer: Point) -> SessionResult<InteractionToken> {
        let base = self
            .state
            .get(id)
            .map(Entity::size)
            .ok_or(ArrangementError::NotFound(id))?;
        Ok(self.resize.begin(id, pointer, base))
    }

    /// Apply a resize pointer move; each move is committed and saved.
    ///
    /// A stale token changes nothing and yields `Ok(None)`.
    pub fn resize_to(
        &mut self,
        token: InteractionToken,
        pointer: Point,
    ) -> SessionResult<Option<Size>> {
        let Some((id, side)) = self.resize.update(token, pointer) else {
            return Ok(None);
        };
        self.transact(|s| Ok(s.state.commit_size(id, side)?))
            .map(Some)
    }

    /// Finish the resize behind `token`; false for a stale token
    pub fn end_resize(&mut self, token: InteractionToken) -> bool {
        self.resize.end(token)
    }

    /// Change the canvas dimensions, re-clamping every entity
    pub fn resize_canvas(&mut self, width: f64, height: f64) -> SessionResult<()> {
        self.transact(|s| {
            s.state.resize_canvas(width, height);
            Ok(())
        })
    }

    pub fn export_json(&self) -> Result<String, ExportError> {
        export_json(self.state.entities())
    }

    /// Serialize the arrangement into `sink`
    pub fn export_to<S: ExportSink + ?Sized>(&self, sink: &mut S) -> Result<(), ExportError> {
        sink.write_export(&self.export_json()?)
    }

    /// The arrangement payload: entities, description and analyst prompt
    pub fn payload(&self) -> Payload {
        Payload::arrangement(self.state.entities())
    }

    /// Render the canvas as SVG
    pub fn render(&self, config: &SvgConfig) -> String {
        render_svg(
            self.state.entities(),
            self.state.config().canvas_size(),
            config,
        )
    }

    /// The snapshot payload: the rendered canvas as a `data:` URL
    pub fn snapshot(&self, config: &SvgConfig) -> Payload {
        Payload::Snapshot {
            image: snapshot_data_url(&self.render(config)),
        }
    }

    /// Submit `payload` for analysis; failures come back inside the outcome
    pub fn analyze<G: AnalysisGateway + ?Sized>(&self, gateway: &G, payload: &Payload) -> AnalysisOutcome {
        AnalysisOutcome::request(gateway, payload)
    }

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            state: self.state.clone(),
            drag: self.drag.clone(),
            resize: self.resize.clone(),
        }
    }

    fn restore(&mut self, checkpoint: Checkpoint) {
        self.state = checkpoint.state;
        self.drag = checkpoint.drag;
        self.resize = checkpoint.resize;
    }

    fn transact<T>(
        &mut self,
        apply: impl FnOnce(&mut Self) -> SessionResult<T>,
    ) -> SessionResult<T> {
        let checkpoint = self.checkpoint();
        self.commit(checkpoint, apply)
    }

    /// Apply and save, restoring `checkpoint` if either step fails
    fn commit<T>(
        &mut self,
        checkpoint: Checkpoint,
        apply: impl FnOnce(&mut Self) -> SessionResult<T>,
    ) -> SessionResult<T> {
        let value = match apply(self) {
            Ok(value) => value,
            Err(err) => {
                self.restore(checkpoint);
                return Err(err);
            }
        };
        if let Err(err) = self.store.save(self.state.entities()) {
            warn!(error = %err, "save failed, reverting change");
            self.restore(checkpoint);
            return Err(SessionError::Persist(err));
        }
        debug!(count = self.state.len(), "arrangement persisted");
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::MemoryStore;
    use pretty_assertions::assert_eq;

    fn session() -> Session<MemoryStore> {
        Session::open(
            MemoryStore::new(),
            ArrangementConfig::default(),
            RoleCatalog::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_open_loads_stored_entities() {
        let mut first = session();
        first.add(NewEntity::new("Li", "父亲")).unwrap();
        let store = first.into_store();

        let reopened = Session::open(store, ArrangementConfig::default(), RoleCatalog::default())
            .unwrap();
        assert_eq!(reopened.entities().len(), 1);
        assert_eq!(reopened.entities()[0].name(), "Li");
    }

    #[test]
    fn test_every_mutation_is_saved() {
        let mut s = session();
        let id = s.add(NewEntity::new("Li", "父亲")).unwrap();
        s.rotate(id).unwrap();
        s.toggle_deceased(id).unwrap();
        s.move_to(id, Point::new(300.0, 200.0)).unwrap();
        assert_eq!(s.store().saves(), 4);
        assert_eq!(s.store().entities(), s.entities());
    }

    #[test]
    fn test_rejected_creation_is_not_saved() {
        let mut s = session();
        let err = s.add(NewEntity::new("Max", "朋友")).unwrap_err();
        assert!(matches!(
            err,
            SessionError::Arrangement(ArrangementError::Creation(
                CreationError::ImmediateFamilyRequired { .. }
            ))
        ));
        assert_eq!(s.store().saves(), 0);
        assert!(s.entities().is_empty());
    }

    #[test]
    fn test_drag_keeps_grab_offset() {
        let mut s = session();
        let id = s.add(NewEntity::new("Li", "父亲")).unwrap();
        // grabbed 10 right and 20 below the top-left corner
        let token = s.begin_drag(id, Some(Point::new(110.0, 120.0))).unwrap();
        let r = s.drop_at(token, Point::new(510.0, 320.0)).unwrap().unwrap();
        assert_eq!(r.position, Point::new(500.0, 300.0));
        assert_eq!(s.state().get(id).unwrap().position(), Point::new(500.0, 300.0));
    }

    #[test]
    fn test_drop_without_grab_centers_on_pointer() {
        let mut s = session();
        let id = s.add(NewEntity::new("Li", "父亲")).unwrap();
        let token = s.begin_drag(id, None).unwrap();
        let r = s.drop_at(token, Point::new(600.0, 250.0)).unwrap().unwrap();
        assert_eq!(r.position, Point::new(560.0, 210.0));
    }

    #[test]
    fn test_drop_avoids_overlap() {
        let mut s = session();
        s.add(NewEntity::new("Li", "父亲")).unwrap();
        let mum = s.add(NewEntity::new("Wang", "母亲")).unwrap();
        let token = s.begin_drag(mum, Some(Point::new(100.0, 100.0))).unwrap();
        let r = s.drop_at(token, Point::new(100.0, 100.0)).unwrap().unwrap();
        // side 80, step 15: six nudges to clear (100, 100)
        assert_eq!(r.position, Point::new(190.0, 190.0));
        assert_eq!(r.iterations, 6);
        assert!(!r.overlapping);
    }

    #[test]
    fn test_stale_drag_token_is_ignored() {
        let mut s = session();
        let id = s.add(NewEntity::new("Li", "父亲")).unwrap();
        let stale = s.begin_drag(id, None).unwrap();
        let fresh = s.begin_drag(id, None).unwrap();
        assert_eq!(s.drop_at(stale, Point::new(600.0, 250.0)).unwrap(), None);
        assert_eq!(s.state().get(id).unwrap().position(), Point::new(100.0, 100.0));
        assert!(s.drop_at(fresh, Point::new(600.0, 250.0)).unwrap().is_some());
    }

    #[test]
    fn test_cancelled_drag_writes_nothing() {
        let mut s = session();
        let id = s.add(NewEntity::new("Li", "父亲")).unwrap();
        let token = s.begin_drag(id, None).unwrap();
        assert_eq!(s.cancel_drag(), Some(id));
        assert_eq!(s.drop_at(token, Point::new(600.0, 250.0)).unwrap(), None);
        assert_eq!(s.store().saves(), 1);
    }

    #[test]
    fn test_resize_commits_every_move() {
        let mut s = session();
        let id = s.add(NewEntity::new("Li", "父亲")).unwrap();
        let token = s.begin_resize(id, Point::new(180.0, 180.0)).unwrap();
        assert_eq!(
            s.resize_to(token, Point::new(200.0, 190.0)).unwrap(),
            Some(Size::square(100.0))
        );
        assert_eq!(
            s.resize_to(token, Point::new(100.0, 190.0)).unwrap(),
            Some(Size::square(40.0))
        );
        assert!(s.end_resize(token));
        assert_eq!(s.resize_to(token, Point::new(400.0, 400.0)).unwrap(), None);
        assert_eq!(s.state().get(id).unwrap().size(), Size::square(40.0));
        assert_eq!(s.store().saves(), 3);
    }

    #[test]
    fn test_new_resize_supersedes_previous() {
        let mut s = session();
        let a = s.add(NewEntity::new("Li", "父亲")).unwrap();
        let b = s.add(NewEntity::new("Wang", "母亲")).unwrap();
        let first = s.begin_resize(a, Point::origin()).unwrap();
        let second = s.begin_resize(b, Point::origin()).unwrap();
        assert_eq!(s.resize_to(first, Point::new(30.0, 30.0)).unwrap(), None);
        assert_eq!(
            s.resize_to(second, Point::new(30.0, 30.0)).unwrap(),
            Some(Size::square(110.0))
        );
        assert_eq!(s.state().get(a).unwrap().size(), Size::square(80.0));
    }

    #[test]
    fn test_delete_cancels_sessions_on_entity() {
        let mut s = session();
        let id = s.add(NewEntity::new("Li", "父亲")).unwrap();
        let token = s.begin_resize(id, Point::origin()).unwrap();
        s.delete(id).unwrap();
        assert_eq!(s.resize_to(token, Point::new(10.0, 10.0)).unwrap(), None);
        assert!(matches!(
            s.rotate(id),
            Err(SessionError::Arrangement(ArrangementError::NotFound(_)))
        ));
    }

    #[test]
    fn test_failed_save_rejects_add() {
        let mut s = session();
        s.store_mut().set_failing(true);
        let err = s.add(NewEntity::new("Li", "父亲")).unwrap_err();
        assert!(matches!(err, SessionError::Persist(_)));
        assert!(s.entities().is_empty());

        s.store_mut().set_failing(false);
        let id = s.add(NewEntity::new("Li", "父亲")).unwrap();
        assert_eq!(id, EntityId(1));
        assert_eq!(s.store().entities(), s.entities());
    }

    #[test]
    fn test_failed_save_reverts_rotation() {
        let mut s = session();
        let id = s.add(NewEntity::new("Li", "父亲")).unwrap();
        s.store_mut().set_failing(true);
        assert!(matches!(s.rotate(id), Err(SessionError::Persist(_))));
        assert_eq!(s.state().get(id).unwrap().facing(), Facing::North);
        assert_eq!(s.store().entities(), s.entities());
    }

    #[test]
    fn test_failed_drop_keeps_drag_active() {
        let mut s = session();
        let id = s.add(NewEntity::new("Li", "父亲")).unwrap();
        let token = s.begin_drag(id, None).unwrap();

        s.store_mut().set_failing(true);
        assert!(matches!(
            s.drop_at(token, Point::new(600.0, 250.0)),
            Err(SessionError::Persist(_))
        ));
        assert_eq!(s.state().get(id).unwrap().position(), Point::new(100.0, 100.0));

        s.store_mut().set_failing(false);
        let r = s.drop_at(token, Point::new(600.0, 250.0)).unwrap();
        assert_eq!(r.map(|r| r.position), Some(Point::new(560.0, 210.0)));
    }

    #[test]
    fn test_failed_delete_keeps_entity_and_resize() {
        let mut s = session();
        let id = s.add(NewEntity::new("Li", "父亲")).unwrap();
        let token = s.begin_resize(id, Point::origin()).unwrap();

        s.store_mut().set_failing(true);
        assert!(s.delete(id).is_err());
        assert!(s.state().get(id).is_some());

        s.store_mut().set_failing(false);
        assert_eq!(
            s.resize_to(token, Point::new(10.0, 0.0)).unwrap(),
            Some(Size::square(90.0))
        );
    }

    #[test]
    fn test_load_failure_is_reported_as_load() {
        #[derive(Debug)]
        struct Broken;
        impl Persistence for Broken {
            fn load(&self) -> crate::ports::persistence::PersistenceResult<Vec<Entity>> {
                Err(PersistenceError::Backend("disk gone".to_string()))
            }
            fn save(&mut self, _: &[Entity]) -> crate::ports::persistence::PersistenceResult<()> {
                Ok(())
            }
        }

        let err = Session::open(Broken, ArrangementConfig::default(), RoleCatalog::default())
            .unwrap_err();
        assert!(matches!(err, SessionError::Load(_)));
        assert_eq!(
            err.to_string(),
            "could not load stored arrangement: storage backend error: disk gone"
        );
    }

    #[test]
    fn test_infinite_resize_keeps_store_loadable() {
        let mut s = session();
        let id = s.add(NewEntity::new("Li", "父亲")).unwrap();
        let token = s.begin_resize(id, Point::origin()).unwrap();
        assert_eq!(
            s.resize_to(token, Point::new(f64::INFINITY, 0.0)).unwrap(),
            Some(Size::square(80.0))
        );
        let json = serde_json::to_string(s.store().entities()).unwrap();
        assert!(!json.contains("null"));
    }

    #[test]
    fn test_reads_do_not_save() {
        let mut s = session();
        s.add(NewEntity::new("Li", "父亲")).unwrap();
        let _ = s.export_json().unwrap();
        let _ = s.payload();
        let _ = s.snapshot(&SvgConfig::default());
        assert_eq!(s.store().saves(), 1);
    }

    #[test]
    fn test_snapshot_is_svg_data_url() {
        let s = session();
        match s.snapshot(&SvgConfig::default()) {
            Payload::Snapshot { image } => {
                assert!(image.starts_with("data:image/svg+xml;base64,"))
            }
            Payload::Arrangement { .. } => panic!("expected snapshot payload"),
        }
    }
}
