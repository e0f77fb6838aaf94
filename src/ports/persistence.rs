//! # Persistence Port
//!
//! Load the entity list once at startup and write it back after every
//! mutation. The stored form is the JSON array of entity records.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::entity::Entity;

/// Errors that can occur while loading or saving
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("storage I/O failed for '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("stored arrangement is not valid JSON: {0}")]
    Format(#[from] serde_json::Error),

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Result type for persistence operations
pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Key-value style storage for the entity list
pub trait Persistence {
    /// Read the stored list; an empty store yields an empty list
    fn load(&self) -> PersistenceResult<Vec<Entity>>;

    /// Replace the stored list
    fn save(&mut self, entities: &[Entity]) -> PersistenceResult<()>;
}

/// Stores the list as pretty-printed JSON in a single file
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> PersistenceError {
        PersistenceError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl Persistence for JsonFileStore {
    fn load(&self) -> PersistenceResult<Vec<Entity>> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no stored arrangement, starting empty");
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path).map_err(|e| self.io_error(e))?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        let entities: Vec<Entity> = serde_json::from_str(&content)?;
        debug!(path = %self.path.display(), count = entities.len(), "arrangement loaded");
        Ok(entities)
    }

    fn save(&mut self, entities: &[Entity]) -> PersistenceResult<()> {
        let json = serde_json::to_string_pretty(entities)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        // Write beside the target and rename so a failed write keeps the old file
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|e| self.io_error(e))?;
        fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))?;
        debug!(path = %self.path.display(), count = entities.len(), "arrangement saved");
        Ok(())
    }
}

/// In-process store, used for embedding and tests
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entities: Vec<Entity>,
    saves: usize,
    failing: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an already-stored list
    pub fn with_entities(entities: Vec<Entity>) -> Self {
        Self {
            entities,
            ..Self::default()
        }
    }

    /// Make every subsequent save fail (to exercise error paths)
    pub fn set_failing(&mut self, failing: bool) {
        self.failing = failing;
    }

    /// Number of successful saves
    pub fn saves(&self) -> usize {
        self.saves
    }

    /// Last saved list
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }
}

impl Persistence for MemoryStore {
    fn load(&self) -> PersistenceResult<Vec<Entity>> {
        Ok(self.entities.clone())
    }

    fn save(&mut self, entities: &[Entity]) -> PersistenceResult<()> {
        if self.failing {
            return Err(PersistenceError::Backend("store is unavailable".to_string()));
        }
        self.entities = entities.to_vec();
        self.saves += 1;
        Ok(())
    }
}
