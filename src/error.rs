//! Crate-level error type
//!
//! Each module owns its error enum; [`Error`] gathers them for callers that
//! drive the whole pipeline (the CLI, embedding hosts).

use thiserror::Error;

use crate::layout::ConfigError;
use crate::ports::{ExportError, GatewayError, PersistenceError};
use crate::roles::CatalogError;
use crate::session::SessionError;

/// Any failure surfaced by the library
#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("role catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Analysis(#[from] GatewayError),
}

pub type Result<T> = std::result::Result<T, Error>;
