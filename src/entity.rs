//! Entity model: a labeled, positioned family member on the canvas
//!
//! The serialized form is the record shared with persistence, export and the
//! analysis payload:
//!
//! ```json
//! { "id": 1, "name": "Li", "role": "父亲", "icon": "👨", "gender": "male",
//!   "shape": "square", "isDeceased": false, "x": 100, "y": 100,
//!   "direction": "north", "width": 80, "height": 80 }
//! ```
//!
//! Older lists that only carried `id`, `name`, `role`, `icon`, `x` and `y`
//! still deserialize; the missing fields take their defaults and sizes are
//! floored when the list is loaded into an arrangement.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::interaction::Facing;
use crate::layout::{BoundingBox, Point, Size};

/// Icon used when neither the caller nor the role catalog provides one
pub const DEFAULT_ICON: &str = "🧑";

/// Stable identifier of an entity within one arrangement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EntityId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(EntityId)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Unknown,
}

impl Gender {
    pub fn name(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Unknown => "unknown",
        }
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" | "m" => Ok(Gender::Male),
            "female" | "f" => Ok(Gender::Female),
            "unknown" | "u" => Ok(Gender::Unknown),
            other => Err(format!("unknown gender '{}'", other)),
        }
    }
}

/// Outline the presentation layer draws around an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeClass {
    Square,
    Circle,
    #[default]
    Triangle,
}

impl ShapeClass {
    /// Genogram convention: square for male, circle for female
    pub fn from_gender(gender: Gender) -> Self {
        match gender {
            Gender::Male => ShapeClass::Square,
            Gender::Female => ShapeClass::Circle,
            Gender::Unknown => ShapeClass::Triangle,
        }
    }

    /// Gender a shape stands for when no gender was recorded
    pub fn implied_gender(self) -> Gender {
        match self {
            ShapeClass::Square => Gender::Male,
            ShapeClass::Circle => Gender::Female,
            ShapeClass::Triangle => Gender::Unknown,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ShapeClass::Square => "square",
            ShapeClass::Circle => "circle",
            ShapeClass::Triangle => "triangle",
        }
    }
}

impl FromStr for ShapeClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "square" => Ok(ShapeClass::Square),
            "circle" => Ok(ShapeClass::Circle),
            "triangle" => Ok(ShapeClass::Triangle),
            other => Err(format!("unknown shape '{}'", other)),
        }
    }
}

fn default_icon() -> String {
    DEFAULT_ICON.to_string()
}

/// A placed family member
///
/// Position, size and facing are only written through
/// [`ArrangementState`](crate::arrangement::ArrangementState), which keeps
/// them clamped and floored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    id: EntityId,
    name: String,
    role: String,
    #[serde(default = "default_icon")]
    icon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    gender: Option<Gender>,
    #[serde(default)]
    shape: ShapeClass,
    #[serde(default)]
    is_deceased: bool,
    x: f64,
    y: f64,
    #[serde(default)]
    direction: Facing,
    #[serde(default)]
    width: f64,
    #[serde(default)]
    height: f64,
}

impl Entity {
    pub(crate) fn new(
        id: EntityId,
        spec: ResolvedEntity,
        position: Point,
        size: Size,
    ) -> Self {
        Self {
            id,
            name: spec.name,
            role: spec.role,
            icon: spec.icon,
            gender: spec.gender,
            shape: spec.shape,
            is_deceased: spec.deceased,
            x: position.x,
            y: position.y,
            direction: Facing::default(),
            width: size.width,
            height: size.height,
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Relation label, e.g. `父亲` or `friend`
    pub fn role(&self) -> &str {
        &self.role
    }

    pub fn icon(&self) -> &str {
        &self.icon
    }

    /// Recorded gender, if any
    pub fn gender(&self) -> Option<Gender> {
        self.gender
    }

    /// Recorded gender, or the one implied by the shape
    pub fn effective_gender(&self) -> Gender {
        self.gender.unwrap_or_else(|| self.shape.implied_gender())
    }

    pub fn shape(&self) -> ShapeClass {
        self.shape
    }

    pub fn is_deceased(&self) -> bool {
        self.is_deceased
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::from_parts(self.position(), self.size())
    }

    pub fn facing(&self) -> Facing {
        self.direction
    }

    pub(crate) fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }

    pub(crate) fn set_position(&mut self, position: Point) {
        self.x = position.x;
        self.y = position.y;
    }

    pub(crate) fn set_size(&mut self, size: Size) {
        self.width = size.width;
        self.height = size.height;
    }

    pub(crate) fn set_facing(&mut self, facing: Facing) {
        self.direction = facing;
    }

    pub(crate) fn set_deceased(&mut self, deceased: bool) {
        self.is_deceased = deceased;
    }
}

/// Caller-supplied fields for creating an entity
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewEntity {
    pub name: String,
    pub role: String,
    pub gender: Option<Gender>,
    pub shape: Option<ShapeClass>,
    pub deceased: bool,
    pub icon: Option<String>,
}

impl NewEntity {
    pub fn new(name: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            role: role.into(),
            ..Self::default()
        }
    }

    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.gender = Some(gender);
        self
    }

    /// Explicit outline; wins over anything derived from gender
    pub fn with_shape(mut self, shape: ShapeClass) -> Self {
        self.shape = Some(shape);
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn deceased(mut self, deceased: bool) -> Self {
        self.deceased = deceased;
        self
    }
}

/// Validated creation fields with shape and icon settled
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ResolvedEntity {
    pub name: String,
    pub role: String,
    pub icon: String,
    pub gender: Option<Gender>,
    pub shape: ShapeClass,
    pub deceased: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> Entity {
        Entity::new(
            EntityId(7),
            ResolvedEntity {
                name: "Li".to_string(),
                role: "父亲".to_string(),
                icon: "👨".to_string(),
                gender: Some(Gender::Male),
                shape: ShapeClass::Square,
                deceased: false,
            },
            Point::new(100.0, 120.0),
            Size::square(80.0),
        )
    }

    #[test]
    fn test_shape_from_gender() {
        assert_eq!(ShapeClass::from_gender(Gender::Male), ShapeClass::Square);
        assert_eq!(ShapeClass::from_gender(Gender::Female), ShapeClass::Circle);
        assert_eq!(ShapeClass::from_gender(Gender::Unknown), ShapeClass::Triangle);
    }

    #[test]
    fn test_effective_gender_falls_back_to_shape() {
        let mut entity = sample();
        assert_eq!(entity.effective_gender(), Gender::Male);
        entity.gender = None;
        entity.shape = ShapeClass::Circle;
        assert_eq!(entity.effective_gender(), Gender::Female);
    }

    #[test]
    fn test_serialized_field_names() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "id": 7,
                "name": "Li",
                "role": "父亲",
                "icon": "👨",
                "gender": "male",
                "shape": "square",
                "isDeceased": false,
                "x": 100.0,
                "y": 120.0,
                "direction": "north",
                "width": 80.0,
                "height": 80.0
            })
        );
    }

    #[test]
    fn test_legacy_record_loads_with_defaults() {
        let entity: Entity = serde_json::from_str(
            r#"{"id": 1718000000000, "name": "Wang", "role": "母亲", "icon": "👩", "x": 40, "y": 60}"#,
        )
        .unwrap();
        assert_eq!(entity.id(), EntityId(1718000000000));
        assert_eq!(entity.position(), Point::new(40.0, 60.0));
        assert_eq!(entity.facing(), Facing::North);
        assert_eq!(entity.shape(), ShapeClass::Triangle);
        assert!(!entity.is_deceased());
        assert_eq!(entity.size(), Size::new(0.0, 0.0));
    }

    #[test]
    fn test_new_entity_builder() {
        let input = NewEntity::new("Ann", "妹妹")
            .with_gender(Gender::Female)
            .with_icon("👧")
            .deceased(true);
        assert_eq!(input.name, "Ann");
        assert_eq!(input.gender, Some(Gender::Female));
        assert_eq!(input.icon.as_deref(), Some("👧"));
        assert!(input.deceased);
        assert_eq!(input.shape, None);
    }

    #[test]
    fn test_parse_helpers() {
        assert_eq!("42".parse::<EntityId>().unwrap(), EntityId(42));
        assert_eq!("Female".parse::<Gender>(), Ok(Gender::Female));
        assert_eq!("circle".parse::<ShapeClass>(), Ok(ShapeClass::Circle));
        assert!("hexagon".parse::<ShapeClass>().is_err());
    }
}
