//! Role catalog: what a relation label means to the arrangement
//!
//! Relation labels are free text, but a few of them carry rules: whether the
//! role belongs to the immediate family (creation gating), whether it is a
//! child role (smaller default size), which gender it implies (outline shape)
//! and which icon it gets by default. The catalog is loaded from TOML; the
//! built-in one mirrors the preset role buttons of the application.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::entity::Gender;

/// Errors that can occur when loading or parsing a role catalog
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read role catalog file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse role catalog TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Duplicate role label or alias '{0}'")]
    Duplicate(String),
}

/// One relation label and its rules
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RoleDefinition {
    pub label: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub gender: Option<Gender>,
    /// Satisfies the immediate-family creation precondition
    #[serde(default)]
    pub immediate: bool,
    /// Gets the smaller default size
    #[serde(default)]
    pub child: bool,
    /// Alternative spellings, matched case-insensitively
    #[serde(default)]
    pub aliases: Vec<String>,
}

impl RoleDefinition {
    fn matches(&self, label: &str) -> bool {
        self.label == label || self.aliases.iter().any(|a| a.to_lowercase() == label.to_lowercase())
    }
}

/// A set of role definitions
#[derive(Debug, Clone, PartialEq)]
pub struct RoleCatalog {
    /// Optional name for the catalog
    pub name: Option<String>,
    /// Optional description
    pub description: Option<String>,
    roles: Vec<RoleDefinition>,
}

/// TOML structure for deserializing catalogs
#[derive(Deserialize)]
struct TomlCatalog {
    metadata: Option<TomlMetadata>,
    #[serde(default)]
    roles: Vec<RoleDefinition>,
}

#[derive(Deserialize)]
struct TomlMetadata {
    name: Option<String>,
    description: Option<String>,
}

/// Built-in roles: self, parents (including step and adoptive), spouse,
/// siblings and children are immediate family
const DEFAULT_CATALOG: &str = r#"
[metadata]
name = "family"
description = "Preset family roles"

[[roles]]
label = "自己"
icon = "🧑"
immediate = true
aliases = ["self", "me"]

[[roles]]
label = "父亲"
icon = "👨"
gender = "male"
immediate = true
aliases = ["father", "dad"]

[[roles]]
label = "母亲"
icon = "👩"
gender = "female"
immediate = true
aliases = ["mother", "mom"]

[[roles]]
label = "孩子"
icon = "🧒"
immediate = true
child = true
aliases = ["child", "kid"]

[[roles]]
label = "祖父"
icon = "👴"
gender = "male"
aliases = ["grandfather", "grandpa"]

[[roles]]
label = "祖母"
icon = "👵"
gender = "female"
aliases = ["grandmother", "grandma"]

[[roles]]
label = "配偶"
icon = "💑"
immediate = true
aliases = ["spouse", "partner"]

[[roles]]
label = "哥哥"
icon = "🧑‍🦱"
gender = "male"
immediate = true
aliases = ["older brother"]

[[roles]]
label = "姐姐"
icon = "👩‍🦰"
gender = "female"
immediate = true
aliases = ["older sister"]

[[roles]]
label = "弟弟"
icon = "🧑‍🎓"
gender = "male"
immediate = true
aliases = ["younger brother"]

[[roles]]
label = "妹妹"
icon = "👧"
gender = "female"
immediate = true
aliases = ["younger sister"]

[[roles]]
label = "儿子"
icon = "👦"
gender = "male"
immediate = true
child = true
aliases = ["son"]

[[roles]]
label = "女儿"
icon = "👧"
gender = "female"
immediate = true
child = true
aliases = ["daughter"]

[[roles]]
label = "继父"
icon = "🧔"
gender = "male"
immediate = true
aliases = ["stepfather"]

[[roles]]
label = "继母"
icon = "👩‍🦳"
gender = "female"
immediate = true
aliases = ["stepmother"]

[[roles]]
label = "养父"
icon = "🧓"
gender = "male"
immediate = true
aliases = ["adoptive father"]

[[roles]]
label = "养母"
icon = "👵"
gender = "female"
immediate = true
aliases = ["adoptive mother"]

[[roles]]
label = "朋友"
icon = "🤝"
aliases = ["friend"]

[[roles]]
label = "宠物"
icon = "🐶"
aliases = ["pet"]
"#;

impl RoleCatalog {
    /// Load a catalog from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load a catalog from a TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, CatalogError> {
        let parsed: TomlCatalog = toml::from_str(content)?;

        let mut seen: Vec<String> = Vec::new();
        for role in &parsed.roles {
            for key in std::iter::once(&role.label).chain(role.aliases.iter()) {
                let key = key.to_lowercase();
                if seen.contains(&key) {
                    return Err(CatalogError::Duplicate(key));
                }
                seen.push(key);
            }
        }

        Ok(RoleCatalog {
            name: parsed.metadata.as_ref().and_then(|m| m.name.clone()),
            description: parsed.metadata.as_ref().and_then(|m| m.description.clone()),
            roles: parsed.roles,
        })
    }

    /// Look up a relation label by exact label or alias
    pub fn lookup(&self, label: &str) -> Option<&RoleDefinition> {
        let label = label.trim();
        self.roles.iter().find(|r| r.matches(label))
    }

    /// Whether the label satisfies the immediate-family precondition
    pub fn is_immediate(&self, label: &str) -> bool {
        self.lookup(label).is_some_and(|r| r.immediate)
    }

    /// Whether the label denotes a child role
    pub fn is_child(&self, label: &str) -> bool {
        self.lookup(label).is_some_and(|r| r.child)
    }

    /// Gender implied by the label, if the catalog records one
    pub fn gender_of(&self, label: &str) -> Option<Gender> {
        self.lookup(label).and_then(|r| r.gender)
    }

    /// Default icon for the label
    pub fn icon_for(&self, label: &str) -> Option<&str> {
        self.lookup(label).and_then(|r| r.icon.as_deref())
    }

    /// All roles in catalog order
    pub fn roles(&self) -> &[RoleDefinition] {
        &self.roles
    }
}

impl Default for RoleCatalog {
    fn default() -> Self {
        Self::from_str(DEFAULT_CATALOG).expect("Default role catalog should be valid TOML")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog() {
        let catalog = RoleCatalog::default();
        assert_eq!(catalog.name.as_deref(), Some("family"));
        assert_eq!(catalog.roles().len(), 19);
        assert_eq!(catalog.roles()[0].label, "自己");
    }

    #[test]
    fn test_immediate_family() {
        let catalog = RoleCatalog::default();
        for label in ["自己", "父亲", "母亲", "配偶", "哥哥", "女儿", "养母"] {
            assert!(catalog.is_immediate(label), "{} should be immediate", label);
        }
        for label in ["朋友", "宠物", "祖父", "祖母", "邻居"] {
            assert!(!catalog.is_immediate(label), "{} should not be immediate", label);
        }
    }

    #[test]
    fn test_child_roles() {
        let catalog = RoleCatalog::default();
        assert!(catalog.is_child("孩子"));
        assert!(catalog.is_child("son"));
        assert!(!catalog.is_child("父亲"));
    }

    #[test]
    fn test_alias_lookup_is_case_insensitive() {
        let catalog = RoleCatalog::default();
        assert_eq!(catalog.lookup("Father").map(|r| r.label.as_str()), Some("父亲"));
        assert_eq!(catalog.lookup("  friend ").map(|r| r.label.as_str()), Some("朋友"));
        assert!(catalog.lookup("stranger").is_none());
    }

    #[test]
    fn test_gender_and_icon() {
        let catalog = RoleCatalog::default();
        assert_eq!(catalog.gender_of("母亲"), Some(Gender::Female));
        assert_eq!(catalog.gender_of("配偶"), None);
        assert_eq!(catalog.icon_for("宠物"), Some("🐶"));
        assert_eq!(catalog.icon_for("unknown"), None);
    }

    #[test]
    fn test_parse_custom_catalog() {
        let toml_str = r#"
[metadata]
name = "Test Roles"

[[roles]]
label = "captain"
immediate = true
gender = "female"

[[roles]]
label = "cadet"
child = true
"#;
        let catalog = RoleCatalog::from_str(toml_str).expect("Should parse");
        assert_eq!(catalog.name, Some("Test Roles".to_string()));
        assert_eq!(catalog.description, None);
        assert!(catalog.is_immediate("captain"));
        assert!(catalog.is_child("cadet"));
        assert!(!catalog.is_immediate("cadet"));
    }

    #[test]
    fn test_duplicate_alias_rejected() {
        let toml_str = r#"
[[roles]]
label = "a"
aliases = ["x"]

[[roles]]
label = "b"
aliases = ["X"]
"#;
        let result = RoleCatalog::from_str(toml_str);
        assert!(matches!(result, Err(CatalogError::Duplicate(_))));
    }

    #[test]
    fn test_invalid_toml_error() {
        let invalid = "this is not valid toml {{{{";
        assert!(RoleCatalog::from_str(invalid).is_err());
    }
}
