//! Pure list/todo manager.
//!
//! Every operation here works directly on a session's `Vec<TodoList>` (or
//! a single [`TodoList`]) with no I/O, so the whole module is unit-testable
//! without a running server.
//!
//! # Conventions
//!
//! - Names and todo texts are trimmed before validation; length limits are
//!   measured in Unicode scalar values.
//! - Operations that can fail return [`Result`] with a [`TodoError`];
//!   nothing panics on user input.
//! - Mutations that can change a list's completion state call
//!   [`recompute_completion`] themselves. Handlers additionally run
//!   [`recompute_all`] once per request as a normalization pass, since
//!   `all_complete` is cached derived state, not authoritative.

use crate::error::{Result, TodoError};
use crate::types::{Todo, TodoList};

/// Minimum allowed length for list names and todo texts.
const MIN_NAME_CHARS: usize = 1;

/// Maximum allowed length for list names and todo texts.
const MAX_NAME_CHARS: usize = 100;

// ============================================================================
// Validation
// ============================================================================

/// Validates a prospective list name against the session's lists.
///
/// The name must be 1-100 characters (after the caller has trimmed it) and
/// must not match any other list's name exactly. When renaming, pass the
/// renamed list's position as `exclude` so the list's own current name does
/// not count as a duplicate.
///
/// # Errors
///
/// - [`TodoError::InvalidLength`] if the length is out of range
/// - [`TodoError::DuplicateName`] if another list already has this name
pub fn validate_list_name(name: &str, lists: &[TodoList], exclude: Option<usize>) -> Result<()> {
    let len = name.chars().count();
    if !(MIN_NAME_CHARS..=MAX_NAME_CHARS).contains(&len) {
        return Err(TodoError::invalid_list_name());
    }

    let duplicate = lists
        .iter()
        .any(|list| Some(list.position) != exclude && list.name == name);
    if duplicate {
        return Err(TodoError::DuplicateName);
    }

    Ok(())
}

/// Validates a todo text: 1-100 characters after trimming.
///
/// # Errors
///
/// Returns [`TodoError::InvalidLength`] if the length is out of range.
pub fn validate_todo_text(text: &str) -> Result<()> {
    let len = text.chars().count();
    if !(MIN_NAME_CHARS..=MAX_NAME_CHARS).contains(&len) {
        return Err(TodoError::invalid_todo_text());
    }
    Ok(())
}

// ============================================================================
// List operations
// ============================================================================

/// Creates a new list at the end of the collection.
///
/// The name is trimmed before validation. On success the new list gets
/// position = prior count, no todos, and `all_complete = false`.
///
/// # Errors
///
/// Propagates validation failures from [`validate_list_name`].
pub fn create_list(lists: &mut Vec<TodoList>, name: &str) -> Result<()> {
    let name = name.trim();
    validate_list_name(name, lists, None)?;

    let position = lists.len();
    lists.push(TodoList::new(position, name));
    Ok(())
}

/// Renames the list at `position` in place.
///
/// The new name is trimmed, then validated against all *other* lists;
/// renaming a list to its own current name succeeds.
///
/// # Errors
///
/// - [`TodoError::NotFound`] if `position` is out of range
/// - validation failures from [`validate_list_name`]
pub fn rename_list(lists: &mut [TodoList], position: usize, new_name: &str) -> Result<()> {
    if position >= lists.len() {
        return Err(TodoError::list_not_found());
    }

    let new_name = new_name.trim();
    validate_list_name(new_name, lists, Some(position))?;

    lists[position].name = new_name.to_string();
    Ok(())
}

/// Deletes the list at `position` and renumbers the remaining lists.
///
/// After removal every remaining list's position is reassigned to its new
/// index, keeping positions dense `0..N-1`.
///
/// # Errors
///
/// Returns [`TodoError::NotFound`] if `position` is out of range.
pub fn delete_list(lists: &mut Vec<TodoList>, position: usize) -> Result<TodoList> {
    if position >= lists.len() {
        return Err(TodoError::list_not_found());
    }

    let removed = lists.remove(position);
    for (index, list) in lists.iter_mut().enumerate() {
        list.position = index;
    }
    Ok(removed)
}

/// Returns a shared reference to the list at `position`.
pub fn get_list(lists: &[TodoList], position: usize) -> Result<&TodoList> {
    lists.get(position).ok_or_else(TodoError::list_not_found)
}

/// Returns a mutable reference to the list at `position`.
pub fn get_list_mut(lists: &mut [TodoList], position: usize) -> Result<&mut TodoList> {
    lists
        .get_mut(position)
        .ok_or_else(TodoError::list_not_found)
}

// ============================================================================
// Derived state
// ============================================================================

/// Refreshes a list's cached `all_complete` flag.
///
/// True iff the list is non-empty and every todo is completed; an empty
/// list is never all-complete.
pub fn recompute_completion(list: &mut TodoList) {
    list.all_complete = !list.todos.is_empty() && list.todos.iter().all(|todo| todo.completed);
}

/// Normalization pass over every list in a session.
///
/// Run once per request before rendering, mirroring the fact that
/// `all_complete` is cached rather than authoritative.
pub fn recompute_all(lists: &mut [TodoList]) {
    for list in lists.iter_mut() {
        recompute_completion(list);
    }
}

/// Number of todos in the list that are not yet completed.
pub fn remaining_todos(list: &TodoList) -> usize {
    list.todos.iter().filter(|todo| !todo.completed).count()
}

// ============================================================================
// Todo operations
// ============================================================================

/// Appends a new todo to the list.
///
/// The text is trimmed before validation; the new todo starts incomplete.
///
/// # Errors
///
/// Propagates validation failures from [`validate_todo_text`].
pub fn add_todo(list: &mut TodoList, text: &str) -> Result<()> {
    let text = text.trim();
    validate_todo_text(text)?;

    list.todos.push(Todo::new(text));
    recompute_completion(list);
    Ok(())
}

/// Removes the todo at `index`.
///
/// Todos have no externally visible position field, only array order, so
/// no renumbering is needed.
///
/// # Errors
///
/// Returns [`TodoError::NotFound`] if `index` is out of range.
pub fn delete_todo(list: &mut TodoList, index: usize) -> Result<Todo> {
    if index >= list.todos.len() {
        return Err(TodoError::todo_not_found());
    }

    let removed = list.todos.remove(index);
    recompute_completion(list);
    Ok(removed)
}

/// Sets the completed flag of the todo at `index`.
///
/// # Errors
///
/// Returns [`TodoError::NotFound`] if `index` is out of range.
pub fn toggle_todo(list: &mut TodoList, index: usize, completed: bool) -> Result<()> {
    let todo = list
        .todos
        .get_mut(index)
        .ok_or_else(TodoError::todo_not_found)?;
    todo.completed = completed;
    recompute_completion(list);
    Ok(())
}

/// Marks every todo in the list as completed.
pub fn complete_all(list: &mut TodoList) {
    for todo in &mut list.todos {
        todo.completed = true;
    }
    recompute_completion(list);
}

// ============================================================================
// Display ordering
// ============================================================================

/// Stable display partition of lists: incomplete first, complete last.
///
/// Both partitions preserve the original relative order, and every list is
/// paired with its true underlying position so links and forms still
/// target the right index. Storage order is never mutated.
pub fn sort_lists(lists: &[TodoList]) -> Vec<(usize, &TodoList)> {
    let mut ordered = Vec::with_capacity(lists.len());
    ordered.extend(
        lists
            .iter()
            .enumerate()
            .filter(|(_, list)| !list.all_complete),
    );
    ordered.extend(
        lists
            .iter()
            .enumerate()
            .filter(|(_, list)| list.all_complete),
    );
    ordered
}

/// Stable display partition of todos: incomplete first, complete last.
///
/// Each todo is paired with its original index for delete/toggle
/// targeting.
pub fn sort_todos(todos: &[Todo]) -> Vec<(usize, &Todo)> {
    let mut ordered = Vec::with_capacity(todos.len());
    ordered.extend(todos.iter().enumerate().filter(|(_, todo)| !todo.completed));
    ordered.extend(todos.iter().enumerate().filter(|(_, todo)| todo.completed));
    ordered
}
