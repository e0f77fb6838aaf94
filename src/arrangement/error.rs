//! Error types for the arrangement state

use thiserror::Error;

use crate::entity::EntityId;

/// Rejected creation input; the arrangement is left untouched
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CreationError {
    /// A required text field is empty or whitespace
    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },

    /// No immediate-family member exists yet and the candidate is not one
    #[error("add an immediate family member before adding '{role}'")]
    ImmediateFamilyRequired { role: String },
}

/// Errors that can occur when mutating the arrangement
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArrangementError {
    #[error(transparent)]
    Creation(#[from] CreationError),

    #[error("no entity with id {0}")]
    NotFound(EntityId),
}

impl CreationError {
    /// Create an empty-field error
    pub fn empty(field: &'static str) -> Self {
        Self::EmptyField { field }
    }

    /// Create an immediate-family gate error
    pub fn gate(role: impl Into<String>) -> Self {
        Self::ImmediateFamilyRequired { role: role.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_field_display() {
        assert_eq!(CreationError::empty("name").to_string(), "name must not be empty");
    }

    #[test]
    fn test_gate_display() {
        let err = CreationError::gate("朋友");
        assert!(err.to_string().contains("朋友"));
        assert!(err.to_string().contains("immediate family"));
    }

    #[test]
    fn test_not_found_display() {
        assert_eq!(
            ArrangementError::NotFound(EntityId(3)).to_string(),
            "no entity with id 3"
        );
    }
}
