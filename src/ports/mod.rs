//! # Ports
//!
//! Boundaries to the collaborators around the arrangement engine.
//!
//! - Persistence: load the entity list at startup, save it after every mutation
//! - Analysis: submit the arrangement (or a rendered snapshot), receive text
//! - Export: serialize the entity list for download
//!
//! The core never interprets what crosses these boundaries beyond the
//! entity records themselves.

pub mod analysis;
pub mod export;
pub mod persistence;

pub use analysis::{
    build_prompt, describe, strip_reasoning, AnalysisGateway, AnalysisOutcome, GatewayError,
    Payload,
};
pub use export::{
    export_json, ExportError, ExportSink, FileSink, WriterSink, DEFAULT_EXPORT_FILE,
};
pub use persistence::{JsonFileStore, MemoryStore, Persistence, PersistenceError};
