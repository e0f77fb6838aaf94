//! # Export Port
//!
//! Serialize the entity list for the user to download. Exporting never
//! touches the arrangement.

use std::io::Write;
use std::path::PathBuf;

use thiserror::Error;
use tracing::info;

use crate::entity::Entity;

/// Default file name offered for downloads
pub const DEFAULT_EXPORT_FILE: &str = "family-arrangement.json";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to serialize arrangement: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write export: {0}")]
    Io(#[from] std::io::Error),
}

/// Pretty-printed JSON array of every entity record
pub fn export_json(entities: &[Entity]) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(entities)?)
}

/// Destination for an exported arrangement
pub trait ExportSink {
    fn write_export(&mut self, json: &str) -> Result<(), ExportError>;
}

/// Writes the export to a file, replacing it
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Default for FileSink {
    fn default() -> Self {
        Self::new(DEFAULT_EXPORT_FILE)
    }
}

impl ExportSink for FileSink {
    fn write_export(&mut self, json: &str) -> Result<(), ExportError> {
        std::fs::write(&self.path, json)?;
        info!(path = %self.path.display(), bytes = json.len(), "arrangement exported");
        Ok(())
    }
}

/// Writes the export to any `io::Write` (stdout, buffers)
#[derive(Debug)]
pub struct WriterSink<W: Write> {
    writer: W,
}

impl<W: Write> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ExportSink for WriterSink<W> {
    fn write_export(&mut self, json: &str) -> Result<(), ExportError> {
        self.writer.write_all(json.as_bytes())?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}
