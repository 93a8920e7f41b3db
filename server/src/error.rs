//! Error types for TidyList operations.
//!
//! This module defines the domain errors shared by the list/todo manager
//! and the HTTP handlers.
//!
//! # Error Types
//!
//! - [`TodoError`] - validation and lookup failures for list/todo operations
//!
//! Validation errors (`InvalidLength`, `DuplicateName`) are recovered
//! locally by re-rendering the originating form; `NotFound` maps to a 404
//! response. None of these are fatal to the process.

use thiserror::Error;

/// Errors produced by list and todo operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TodoError {
    /// A name or todo text is outside the allowed 1-100 character range.
    #[error("{subject} must be between 1 and 100 characters.")]
    InvalidLength {
        /// What was being validated, e.g. "List name" or "Todo".
        subject: &'static str,
    },

    /// A list name collides with another list in the same session.
    #[error("List name must be unique.")]
    DuplicateName,

    /// An index did not resolve to an existing list or todo.
    #[error("The requested {entity} was not found.")]
    NotFound {
        /// What was being looked up, e.g. "list" or "todo".
        entity: &'static str,
    },
}

impl TodoError {
    /// Creates an invalid-length error for a list name.
    pub fn invalid_list_name() -> Self {
        Self::InvalidLength {
            subject: "List name",
        }
    }

    /// Creates an invalid-length error for a todo text.
    pub fn invalid_todo_text() -> Self {
        Self::InvalidLength { subject: "Todo" }
    }

    /// Creates a not-found error for a list position.
    pub fn list_not_found() -> Self {
        Self::NotFound { entity: "list" }
    }

    /// Creates a not-found error for a todo index.
    pub fn todo_not_found() -> Self {
        Self::NotFound { entity: "todo" }
    }

    /// Returns true if the error should re-render a form rather than 404.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::InvalidLength { .. } | Self::DuplicateName)
    }

    /// Returns true if the error should map to a 404 response.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// A specialized Result type for list/todo operations.
pub type Result<T> = std::result::Result<T, TodoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_list_name_displays_correctly() {
        let err = TodoError::invalid_list_name();
        assert_eq!(
            err.to_string(),
            "List name must be between 1 and 100 characters."
        );
    }

    #[test]
    fn invalid_todo_text_displays_correctly() {
        let err = TodoError::invalid_todo_text();
        assert_eq!(err.to_string(), "Todo must be between 1 and 100 characters.");
    }

    #[test]
    fn duplicate_name_displays_correctly() {
        let err = TodoError::DuplicateName;
        assert_eq!(err.to_string(), "List name must be unique.");
    }

    #[test]
    fn not_found_displays_entity() {
        assert_eq!(
            TodoError::list_not_found().to_string(),
            "The requested list was not found."
        );
        assert_eq!(
            TodoError::todo_not_found().to_string(),
            "The requested todo was not found."
        );
    }

    #[test]
    fn is_validation_classifies_errors() {
        assert!(TodoError::invalid_list_name().is_validation());
        assert!(TodoError::DuplicateName.is_validation());
        assert!(!TodoError::list_not_found().is_validation());
    }

    #[test]
    fn is_not_found_classifies_errors() {
        assert!(TodoError::list_not_found().is_not_found());
        assert!(TodoError::todo_not_found().is_not_found());
        assert!(!TodoError::DuplicateName.is_not_found());
    }
}
