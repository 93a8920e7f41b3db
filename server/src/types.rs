//! Core data types for TidyList.
//!
//! This module defines the structured records held in each browser
//! session: todo lists, their items, and the transient flash messages
//! shown after a redirect.
//!
//! # Invariants
//!
//! - A list's [`TodoList::position`] always equals its live index in the
//!   owning collection. Deleting a list renumbers all remaining lists so
//!   positions stay dense `0..N-1`.
//! - [`TodoList::all_complete`] is derived state: true iff the list is
//!   non-empty and every todo is completed. It is recomputed after every
//!   mutation and once per request as a normalization pass.

use serde::{Deserialize, Serialize};

/// A single task entry with text and a completed flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    /// The todo text (1-100 characters after trimming).
    pub name: String,

    /// Whether the todo has been completed.
    pub completed: bool,
}

impl Todo {
    /// Creates a new, not-yet-completed todo.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            completed: false,
        }
    }
}

/// A named, ordered collection of todos, uniquely named within a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoList {
    /// Dense zero-based index of this list in the session's collection.
    pub position: usize,

    /// The list name (1-100 characters, unique within the session).
    pub name: String,

    /// The todos in this list, in insertion order.
    pub todos: Vec<Todo>,

    /// Derived flag: true iff the list is non-empty and every todo is
    /// completed. Cached here and refreshed by
    /// [`crate::lists::recompute_completion`].
    pub all_complete: bool,
}

impl TodoList {
    /// Creates an empty list at the given position.
    pub fn new(position: usize, name: impl Into<String>) -> Self {
        Self {
            position,
            name: name.into(),
            todos: Vec::new(),
            all_complete: false,
        }
    }
}

/// Everything stored for one browser session.
///
/// The flash fields are single-use: they are taken out of the session the
/// next time a page renders and never shown again.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    /// The session's todo lists, positions dense `0..N-1`.
    pub lists: Vec<TodoList>,

    /// Transient success message, shown on the next render.
    pub success: Option<String>,

    /// Transient error message, shown on the next render.
    pub error: Option<String>,
}

/// Flash messages taken from a session for a single render.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Flash {
    /// Success message, if one was pending.
    pub success: Option<String>,

    /// Error message, if one was pending.
    pub error: Option<String>,
}

impl SessionData {
    /// Removes and returns the pending flash messages.
    ///
    /// After this call the session carries no messages; callers are
    /// expected to persist the cleared session so a message survives
    /// exactly one render.
    pub fn take_flash(&mut self) -> Flash {
        Flash {
            success: self.success.take(),
            error: self.error.take(),
        }
    }

    /// Returns true if a flash message is pending.
    pub fn has_flash(&self) -> bool {
        self.success.is_some() || self.error.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn todo_new_starts_incomplete() {
        let todo = Todo::new("Milk");
        assert_eq!(todo.name, "Milk");
        assert!(!todo.completed);
    }

    #[test]
    fn todo_list_new_is_empty_and_incomplete() {
        let list = TodoList::new(3, "Groceries");
        assert_eq!(list.position, 3);
        assert_eq!(list.name, "Groceries");
        assert!(list.todos.is_empty());
        assert!(!list.all_complete);
    }

    #[test]
    fn take_flash_clears_messages() {
        let mut data = SessionData {
            success: Some("created".to_string()),
            error: Some("oops".to_string()),
            ..SessionData::default()
        };

        assert!(data.has_flash());

        let flash = data.take_flash();
        assert_eq!(flash.success.as_deref(), Some("created"));
        assert_eq!(flash.error.as_deref(), Some("oops"));

        assert!(!data.has_flash());
        let flash = data.take_flash();
        assert!(flash.success.is_none());
        assert!(flash.error.is_none());
    }

    #[test]
    fn session_data_serializes_round_trip() {
        let mut data = SessionData::default();
        data.lists.push(TodoList::new(0, "A"));
        data.lists[0].todos.push(Todo::new("x"));

        let json = serde_json::to_string(&data).unwrap();
        let back: SessionData = serde_json::from_str(&json).unwrap();
        assert_eq!(data, back);
    }
}
