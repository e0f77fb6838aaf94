//! The authoritative entity collection
//!
//! [`ArrangementState`] owns every entity and is the only place their
//! position, size and facing are written. Each operation either applies in
//! full or returns an error without touching the collection.
//!
//! # Creation gating
//!
//! The first entity outside the immediate family can only be added once at
//! least one immediate-family entity exists. The rule is checked at creation
//! time only; deleting the last immediate-family entity later is allowed.

pub mod error;

pub use error::{ArrangementError, CreationError};

use tracing::{debug, info, warn};

use crate::entity::{Entity, EntityId, NewEntity, ResolvedEntity, ShapeClass, DEFAULT_ICON};
use crate::interaction::Facing;
use crate::layout::{
    resolve_drop, ArrangementConfig, CollisionResolver, CoordinateSpace, Point, Resolution, Size,
};
use crate::roles::RoleCatalog;

/// The entity collection plus the rules that govern it
#[derive(Debug, Clone)]
pub struct ArrangementState {
    entities: Vec<Entity>,
    space: CoordinateSpace,
    resolver: CollisionResolver,
    config: ArrangementConfig,
    catalog: RoleCatalog,
    /// Highest id ever issued or loaded, so deleted ids are not reused
    last_id: u64,
}

impl Default for ArrangementState {
    fn default() -> Self {
        Self::new(ArrangementConfig::default(), RoleCatalog::default())
    }
}

impl ArrangementState {
    /// Create an empty arrangement
    pub fn new(config: ArrangementConfig, catalog: RoleCatalog) -> Self {
        Self {
            entities: Vec::new(),
            space: CoordinateSpace::from_size(config.canvas_size()),
            resolver: CollisionResolver::from_config(&config.collision),
            config,
            catalog,
            last_id: 0,
        }
    }

    /// Rebuild an arrangement from a persisted list.
    ///
    /// Records are repaired rather than rejected: duplicate ids get fresh ones,
    /// missing sizes take the role's default, undersized ones are floored,
    /// and positions are clamped to the current canvas.
    pub fn with_entities(
        config: ArrangementConfig,
        catalog: RoleCatalog,
        entities: Vec<Entity>,
    ) -> Self {
        let mut state = Self::new(config, catalog);
        for mut entity in entities {
            if state.get(entity.id()).is_some() {
                let fresh = state.next_id();
                warn!(old = %entity.id(), new = %fresh, "duplicate entity id in loaded list");
                entity.set_id(fresh);
            }
            state.last_id = state.last_id.max(entity.id().0);

            let size = entity.size();
            let size = if size.width > 0.0 && size.height > 0.0 {
                Size::new(
                    size.width.max(state.config.sizing.min_size),
                    size.height.max(state.config.sizing.min_size),
                )
            } else {
                state.default_size_for(entity.role())
            };
            entity.set_size(size);
            entity.set_position(state.space.clamp(entity.position(), size));
            state.entities.push(entity);
        }
        state
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id() == id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn space(&self) -> &CoordinateSpace {
        &self.space
    }

    pub fn config(&self) -> &ArrangementConfig {
        &self.config
    }

    pub fn catalog(&self) -> &RoleCatalog {
        &self.catalog
    }

    /// Topmost entity under `point` (later entities are drawn above earlier ones)
    pub fn entity_at(&self, point: Point) -> Option<&Entity> {
        self.entities.iter().rev().find(|e| e.bounds().contains(point))
    }

    /// Whether any entity currently has an immediate-family relation
    pub fn has_immediate_family(&self) -> bool {
        self.entities
            .iter()
            .any(|e| self.catalog.is_immediate(e.role()))
    }

    /// Default side for a new entity with relation `role`
    pub fn default_size_for(&self, role: &str) -> Size {
        if self.catalog.is_child(role) {
            Size::square(self.config.sizing.child_size)
        } else {
            Size::square(self.config.sizing.adult_size)
        }
    }

    /// Validate `input` and append a new entity at the staging point
    pub fn create(&mut self, input: NewEntity) -> Result<EntityId, CreationError> {
        let resolved = self.resolve_new(input)?;

        let size = self.default_size_for(&resolved.role);
        let position = self.space.clamp(self.config.staging, size);
        let id = self.next_id();

        info!(%id, name = %resolved.name, role = %resolved.role, "entity created");
        self.entities.push(Entity::new(id, resolved, position, size));
        Ok(id)
    }

    fn resolve_new(&self, input: NewEntity) -> Result<ResolvedEntity, CreationError> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(CreationError::empty("name"));
        }
        let role = input.role.trim();
        if role.is_empty() {
            return Err(CreationError::empty("relation"));
        }
        if !self.has_immediate_family() && !self.catalog.is_immediate(role) {
            return Err(CreationError::gate(role));
        }

        let gender = input.gender.or_else(|| self.catalog.gender_of(role));
        let shape = input
            .shape
            .or_else(|| gender.map(ShapeClass::from_gender))
            .unwrap_or(ShapeClass::Triangle);
        let icon = input
            .icon
            .filter(|icon| !icon.trim().is_empty())
            .or_else(|| self.catalog.icon_for(role).map(str::to_string))
            .unwrap_or_else(|| DEFAULT_ICON.to_string());

        Ok(ResolvedEntity {
            name: name.to_string(),
            role: role.to_string(),
            icon,
            gender,
            shape,
            deceased: input.deceased,
        })
    }

    /// Remove an entity; the immediate-family rule is not re-checked
    pub fn delete(&mut self, id: EntityId) -> Result<Entity, ArrangementError> {
        let index = self.index_of(id)?;
        let removed = self.entities.remove(index);
        info!(%id, "entity deleted");
        Ok(removed)
    }

    /// Remove every entity, returning how many were removed
    pub fn clear(&mut self) -> usize {
        let count = self.entities.len();
        self.entities.clear();
        info!(count, "arrangement cleared");
        count
    }

    /// Commit a drop: offset, clamp, avoid overlaps, then write once
    pub fn place(
        &mut self,
        id: EntityId,
        pointer: Point,
        grab_offset: Option<Point>,
    ) -> Result<Resolution, ArrangementError> {
        let index = self.index_of(id)?;
        let size = self.entities[index].size();
        let obstacles: Vec<Point> = self
            .entities
            .iter()
            .filter(|e| e.id() != id)
            .map(Entity::position)
            .collect();

        let resolution = resolve_drop(
            pointer,
            grab_offset,
            size,
            &obstacles,
            &self.space,
            &self.resolver,
        );
        self.entities[index].set_position(resolution.position);
        debug!(
            %id,
            x = resolution.position.x,
            y = resolution.position.y,
            nudges = resolution.iterations,
            "entity placed"
        );
        Ok(resolution)
    }

    /// Write a position directly, clamped but without overlap avoidance
    pub fn commit_position(&mut self, id: EntityId, position: Point) -> Result<Point, ArrangementError> {
        let index = self.index_of(id)?;
        let clamped = self.space.clamp(position, self.entities[index].size());
        self.entities[index].set_position(clamped);
        Ok(clamped)
    }

    /// Write a square size, floored at the minimum side.
    ///
    /// A non-finite side leaves the current size in place.
    pub fn commit_size(&mut self, id: EntityId, side: f64) -> Result<Size, ArrangementError> {
        let index = self.index_of(id)?;
        if !side.is_finite() {
            warn!(%id, side, "ignoring non-finite size");
            return Ok(self.entities[index].size());
        }
        let size = Size::square(side.max(self.config.sizing.min_size));
        self.entities[index].set_size(size);
        debug!(%id, side = size.width, "entity resized");
        Ok(size)
    }

    /// Advance an entity's facing to the next direction
    pub fn rotate(&mut self, id: EntityId) -> Result<Facing, ArrangementError> {
        let index = self.index_of(id)?;
        let facing = self.entities[index].facing().next();
        self.entities[index].set_facing(facing);
        debug!(%id, %facing, "entity rotated");
        Ok(facing)
    }

    /// Flip the deceased marker, returning the new value
    pub fn toggle_deceased(&mut self, id: EntityId) -> Result<bool, ArrangementError> {
        let index = self.index_of(id)?;
        let deceased = !self.entities[index].is_deceased();
        self.entities[index].set_deceased(deceased);
        Ok(deceased)
    }

    /// Change the canvas and re-clamp every entity into it.
    ///
    /// Non-finite dimensions are ignored.
    pub fn resize_canvas(&mut self, width: f64, height: f64) {
        if !(width.is_finite() && height.is_finite()) {
            warn!(width, height, "ignoring non-finite canvas size");
            return;
        }
        self.space = CoordinateSpace::new(width, height);
        self.config.canvas.width = self.space.width();
        self.config.canvas.height = self.space.height();
        for entity in &mut self.entities {
            let clamped = self.space.clamp(entity.position(), entity.size());
            entity.set_position(clamped);
        }
        debug!(width, height, "canvas resized");
    }

    fn index_of(&self, id: EntityId) -> Result<usize, ArrangementError> {
        self.entities
            .iter()
            .position(|e| e.id() == id)
            .ok_or(ArrangementError::NotFound(id))
    }

    fn next_id(&mut self) -> EntityId {
        self.last_id += 1;
        EntityId(self.last_id)
    }
}
