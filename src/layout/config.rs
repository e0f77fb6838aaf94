//! Configuration for the arrangement engine

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use super::types::{Point, Size};

/// Errors that can occur when loading a configuration file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Canvas dimensions
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub width: f64,
    pub height: f64,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 500.0,
        }
    }
}

/// Entity sizing rules
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct SizingConfig {
    /// Floor for width and height after creation
    pub min_size: f64,
    /// Default side for newly created adults
    pub adult_size: f64,
    /// Default side for newly created child roles
    pub child_size: f64,
}

impl Default for SizingConfig {
    fn default() -> Self {
        Self {
            min_size: 40.0,
            adult_size: 80.0,
            child_size: 60.0,
        }
    }
}

/// Overlap-avoidance search parameters
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct CollisionConfig {
    /// Diagonal offset applied per nudge
    pub nudge_step: f64,
    /// Upper bound on nudges per placement
    pub max_iterations: usize,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            nudge_step: 15.0,
            max_iterations: 30,
        }
    }
}

/// Configuration options for the arrangement engine
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ArrangementConfig {
    pub canvas: CanvasConfig,
    pub sizing: SizingConfig,
    pub collision: CollisionConfig,

    /// Pre-placement point for new entities
    pub staging: Point,
}

impl Default for ArrangementConfig {
    fn default() -> Self {
        Self {
            canvas: CanvasConfig::default(),
            sizing: SizingConfig::default(),
            collision: CollisionConfig::default(),
            staging: Point::new(100.0, 100.0),
        }
    }
}

impl ArrangementConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load configuration from a TOML string; missing keys keep their defaults
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: ArrangementConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the engine cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let values = [
            self.canvas.width,
            self.canvas.height,
            self.sizing.min_size,
            self.sizing.adult_size,
            self.sizing.child_size,
            self.collision.nudge_step,
            self.staging.x,
            self.staging.y,
        ];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(ConfigError::Invalid("values must be finite numbers".to_string()));
        }
        if !(self.canvas.width >= 0.0 && self.canvas.height >= 0.0) {
            return Err(ConfigError::Invalid(
                "canvas dimensions must be non-negative".to_string(),
            ));
        }
        if !(self.sizing.min_size > 0.0) {
            return Err(ConfigError::Invalid("min_size must be positive".to_string()));
        }
        if self.sizing.adult_size < self.sizing.min_size
            || self.sizing.child_size < self.sizing.min_size
        {
            return Err(ConfigError::Invalid(format!(
                "default sizes must be at least min_size ({})",
                self.sizing.min_size
            )));
        }
        if !(self.collision.nudge_step > 0.0) {
            return Err(ConfigError::Invalid("nudge_step must be positive".to_string()));
        }
        Ok(())
    }

    /// Canvas dimensions as a size
    pub fn canvas_size(&self) -> Size {
        Size::new(self.canvas.width, self.canvas.height)
    }

    /// Set the canvas dimensions
    pub fn with_canvas(mut self, width: f64, height: f64) -> Self {
        self.canvas = CanvasConfig { width, height };
        self
    }

    /// Set the default sides for adults and children
    pub fn with_default_sizes(mut self, adult: f64, child: f64) -> Self {
        self.sizing.adult_size = adult;
        self.sizing.child_size = child;
        self
    }

    /// Set the minimum entity side
    pub fn with_min_size(mut self, min_size: f64) -> Self {
        self.sizing.min_size = min_size;
        self
    }

    /// Set the nudge step and iteration budget of the collision search
    pub fn with_collision(mut self, nudge_step: f64, max_iterations: usize) -> Self {
        self.collision = CollisionConfig {
            nudge_step,
            max_iterations,
        };
        self
    }

    /// Set the staging point for new entities
    pub fn with_staging(mut self, x: f64, y: f64) -> Self {
        self.staging = Point::new(x, y);
        self
    }
}
