//! Family Constellation - spatial arrangement of family members on a canvas
//!
//! This library keeps an ordered collection of family-member entities on a
//! bounded canvas: it clamps positions, resolves overlaps when an entity is
//! dropped, applies square-preserving resizes and 8-way facing, gates
//! creation on the immediate family, and hands the result to storage, export
//! and an analysis service.
//!
//! # Example
//!
//! ```rust
//! use family_constellation::{ArrangementConfig, MemoryStore, NewEntity, Point, RoleCatalog, Session};
//!
//! let mut session = Session::open(
//!     MemoryStore::new(),
//!     ArrangementConfig::default(),
//!     RoleCatalog::default(),
//! )
//! .unwrap();
//!
//! let dad = session.add(NewEntity::new("Li", "父亲")).unwrap();
//! let drag = session.begin_drag(dad, None).unwrap();
//! let landed = session.drop_at(drag, Point::new(600.0, 250.0)).unwrap().unwrap();
//! assert_eq!(landed.position, Point::new(560.0, 210.0));
//! ```

pub mod arrangement;
pub mod entity;
pub mod error;
pub mod interaction;
pub mod layout;
pub mod ports;
pub mod renderer;
pub mod roles;
pub mod session;

pub use arrangement::{ArrangementError, ArrangementState, CreationError};
pub use entity::{Entity, EntityId, Gender, NewEntity, ShapeClass};
pub use error::{Error, Result};
pub use interaction::{Facing, InteractionToken};
pub use layout::{ArrangementConfig, BoundingBox, Point, Resolution, Size};
pub use ports::{
    AnalysisGateway, AnalysisOutcome, ExportSink, FileSink, JsonFileStore, MemoryStore, Payload,
    Persistence,
};
pub use renderer::{render_svg, SvgConfig};
pub use roles::RoleCatalog;
pub use session::{Session, SessionError};
