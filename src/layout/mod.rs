//! Spatial engine: canvas bounds, overlap avoidance, and drop placement
//!
//! Every position the engine produces has gone through
//! [`CoordinateSpace::clamp`], so committed anchors are always on the canvas.

pub mod collision;
pub mod config;
pub mod placement;
pub mod space;
pub mod types;

pub use collision::{CollisionResolver, Resolution};
pub use config::{ArrangementConfig, CanvasConfig, CollisionConfig, ConfigError, SizingConfig};
pub use placement::{resolve_drop, DragController, DragSession};
pub use space::CoordinateSpace;
pub use types::*;
