//! SVG snapshot renderer
//!
//! Draws the canvas outline and every entity (outline by shape class, a cross
//! when deceased, a facing arrow and labels). The output doubles as the image
//! sent in a snapshot analysis payload.

pub mod config;
pub mod svg;

pub use config::SvgConfig;
pub use svg::{render_svg, snapshot_data_url, SvgBuilder};
