//! HTTP route handlers for the TidyList server.
//!
//! This module provides the browser-facing endpoints:
//!
//! - `GET /lists` - list-of-lists page
//! - `GET /lists/new`, `POST /lists` - list creation
//! - `GET /lists/{num}`, `GET /lists/{num}/edit`, `POST /lists/{num}` - view/rename
//! - `POST /lists/{num}/delete` - delete a list
//! - `POST /lists/{num}/todos` - add a todo
//! - `POST /lists/{num}/{todo_num}/delete|toggle` - todo mutations
//! - `POST /lists/{num}/complete_all` - mark every todo done
//! - `GET /health` - health check endpoint
//!
//! # Architecture
//!
//! All routes share application state through [`AppState`]: configuration
//! and the session store. Each handler opens a session context from the
//! request's cookie, runs the pure operations from [`crate::lists`] on a
//! snapshot, and commits the snapshot back before responding. Validation
//! failures re-render the originating form; unresolvable indices return
//! 404 rather than crashing the process.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::TodoError;
use crate::lists;
use crate::render;
use crate::session::SessionStore;
use crate::types::SessionData;

// ============================================================================
// Constants
// ============================================================================

/// Name of the session cookie.
const SESSION_COOKIE: &str = "tidylist_session";

/// Flash messages shown after successful mutations.
const MSG_LIST_CREATED: &str = "The list has been created.";
const MSG_LIST_RENAMED: &str = "The list name has been updated.";
const MSG_LIST_DELETED: &str = "The list has been deleted.";
const MSG_TODO_ADDED: &str = "The todo was added.";
const MSG_TODO_DELETED: &str = "The todo item has been deleted.";
const MSG_TODO_UPDATED: &str = "The todo item has been updated.";
const MSG_ALL_COMPLETED: &str = "All the todo items have been updated.";

// ============================================================================
// Application State
// ============================================================================

/// Shared application state for all route handlers.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<Config>,

    /// Session store holding each browser's lists.
    pub sessions: SessionStore,

    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    /// Creates application state with the given configuration and a
    /// session store sized from it.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let sessions = SessionStore::new(crate::session::SessionStoreConfig::new(
            config.max_sessions,
            config.session_ttl,
        ));
        Self {
            config: Arc::new(config),
            sessions,
            start_time: Instant::now(),
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &"<Config>")
            .field("sessions", &self.sessions)
            .field("start_time", &self.start_time)
            .finish()
    }
}

// ============================================================================
// Router
// ============================================================================

/// Creates the application router with all routes configured.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(get_root))
        .route("/lists", get(get_lists).post(post_lists))
        .route("/lists/new", get(get_new_list))
        .route("/lists/{num}", get(get_list).post(post_rename_list))
        .route("/lists/{num}/edit", get(get_edit_list))
        .route("/lists/{num}/delete", post(post_delete_list))
        .route("/lists/{num}/todos", post(post_add_todo))
        .route("/lists/{num}/complete_all", post(post_complete_all))
        .route("/lists/{num}/{todo_num}/delete", post(post_delete_todo))
        .route("/lists/{num}/{todo_num}/toggle", post(post_toggle_todo))
        .route("/health", get(get_health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ============================================================================
// Session plumbing
// ============================================================================

/// Per-request session context: the token, a mutable snapshot of the
/// session's data, and whether a cookie still needs to be issued.
struct SessionContext {
    token: String,
    data: SessionData,
    is_new: bool,
}

/// Extracts the session token from the request's `Cookie` header.
fn session_token(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    for pair in cookies.split(';') {
        if let Some((name, value)) = pair.trim().split_once('=') {
            if name == SESSION_COOKIE && !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }
    None
}

/// Opens the session named by the request cookie, or creates a fresh one.
///
/// A missing, malformed, or expired token silently gets a new empty
/// session; the only failure is the store being at capacity, which maps
/// to a 503 response.
fn open_session(state: &AppState, headers: &HeaderMap) -> Result<SessionContext, Response> {
    if let Some(token) = session_token(headers) {
        if let Some(mut data) = state.sessions.load(&token) {
            // Normalization pass: all_complete is cached derived state.
            lists::recompute_all(&mut data.lists);
            return Ok(SessionContext {
                token,
                data,
                is_new: false,
            });
        }
        debug!("Session cookie did not resolve, issuing a new session");
    }

    match state.sessions.create() {
        Ok(token) => Ok(SessionContext {
            token,
            data: SessionData::default(),
            is_new: true,
        }),
        Err(err) => {
            debug!(error = %err, "Failed to create session");
            Err((
                StatusCode::SERVICE_UNAVAILABLE,
                html_body("<p>Too many active sessions, try again later.</p>".to_string()),
            )
                .into_response())
        }
    }
}

/// Persists the session snapshot and finalizes the response, attaching a
/// `Set-Cookie` header when the session was created by this request.
fn finish(state: &AppState, ctx: SessionContext, mut response: Response) -> Response {
    let is_new = ctx.is_new;
    let cookie = format!(
        "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax{secure}",
        token = ctx.token,
        secure = if state.config.secure_cookies {
            "; Secure"
        } else {
            ""
        },
    );

    state.sessions.store(&ctx.token, ctx.data);

    if is_new {
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
    }
    response
}

// ============================================================================
// Response helpers
// ============================================================================

/// An HTML body with the right content type.
fn html_body(body: String) -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/html; charset=utf-8")], body)
}

/// 200 page.
fn page(body: String) -> Response {
    (StatusCode::OK, html_body(body)).into_response()
}

/// 404 page for unresolvable list/todo indices.
fn not_found() -> Response {
    (StatusCode::NOT_FOUND, html_body(render::not_found_page())).into_response()
}

/// 303 redirect after a successful mutation.
fn see_other(location: &str) -> Response {
    (
        StatusCode::SEE_OTHER,
        [(header::LOCATION, location.to_string())],
    )
        .into_response()
}

/// Parses a path segment as a non-negative index; `None` becomes 404 at
/// the call site.
fn parse_index(raw: &str) -> Option<usize> {
    raw.parse::<usize>().ok()
}

// ============================================================================
// Form payloads
// ============================================================================

/// Body of list create/rename forms. Missing fields validate as empty
/// rather than rejecting the request.
#[derive(Debug, Deserialize)]
struct ListNameForm {
    #[serde(default)]
    list_name: String,
}

/// Body of the add-todo form.
#[derive(Debug, Deserialize)]
struct TodoForm {
    #[serde(default)]
    todo: String,
}

/// Body of the toggle form; compared against the literal `"true"`.
#[derive(Debug, Deserialize)]
struct ToggleForm {
    #[serde(default)]
    completed: String,
}

// ============================================================================
// Page handlers
// ============================================================================

/// GET / - redirect to the list-of-lists page.
async fn get_root() -> Response {
    see_other("/lists")
}

/// GET /lists - render the list-of-lists page.
async fn get_lists(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let mut ctx = match open_session(&state, &headers) {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };

    let flash = ctx.data.take_flash();
    let body = render::lists_page(&ctx.data.lists, &flash);
    finish(&state, ctx, page(body))
}

/// GET /lists/new - render the list creation form.
async fn get_new_list(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let mut ctx = match open_session(&state, &headers) {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };

    let flash = ctx.data.take_flash();
    let body = render::new_list_page(&flash, "");
    finish(&state, ctx, page(body))
}

/// POST /lists - create a list, or re-render the form with the error and
/// the submitted input preserved.
async fn post_lists(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<ListNameForm>,
) -> Response {
    let mut ctx = match open_session(&state, &headers) {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };

    match lists::create_list(&mut ctx.data.lists, &form.list_name) {
        Ok(()) => {
            info!(list_count = ctx.data.lists.len(), "List created");
            ctx.data.success = Some(MSG_LIST_CREATED.to_string());
            finish(&state, ctx, see_other("/lists"))
        }
        Err(err) => {
            debug!(error = %err, "List creation rejected");
            let mut flash = ctx.data.take_flash();
            flash.error = Some(err.to_string());
            let body = render::new_list_page(&flash, form.list_name.trim());
            finish(&state, ctx, page(body))
        }
    }
}

/// GET /lists/{num} - render one list's todos.
async fn get_list(
    State(state): State<AppState>,
    Path(num): Path<String>,
    headers: HeaderMap,
) -> Response {
    let mut ctx = match open_session(&state, &headers) {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };

    let Some(position) = parse_index(&num) else {
        return finish(&state, ctx, not_found());
    };
    if lists::get_list(&ctx.data.lists, position).is_err() {
        return finish(&state, ctx, not_found());
    }

    let flash = ctx.data.take_flash();
    let body = render::list_page(&ctx.data.lists[position], &flash);
    finish(&state, ctx, page(body))
}

/// GET /lists/{num}/edit - render the rename form.
async fn get_edit_list(
    State(state): State<AppState>,
    Path(num): Path<String>,
    headers: HeaderMap,
) -> Response {
    let mut ctx = match open_session(&state, &headers) {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };

    let Some(position) = parse_index(&num) else {
        return finish(&state, ctx, not_found());
    };
    if lists::get_list(&ctx.data.lists, position).is_err() {
        return finish(&state, ctx, not_found());
    }

    let flash = ctx.data.take_flash();
    let body = render::edit_list_page(&ctx.data.lists[position], &flash);
    finish(&state, ctx, page(body))
}

/// POST /lists/{num} - rename a list; validation failures re-render the
/// edit form with the old name still in place.
async fn post_rename_list(
    State(state): State<AppState>,
    Path(num): Path<String>,
    headers: HeaderMap,
    Form(form): Form<ListNameForm>,
) -> Response {
    let mut ctx = match open_session(&state, &headers) {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };

    let Some(position) = parse_index(&num) else {
        return finish(&state, ctx, not_found());
    };

    match lists::rename_list(&mut ctx.data.lists, position, &form.list_name) {
        Ok(()) => {
            info!(position, "List renamed");
            ctx.data.success = Some(MSG_LIST_RENAMED.to_string());
            finish(&state, ctx, see_other(&format!("/lists/{position}")))
        }
        Err(err) if err.is_not_found() => finish(&state, ctx, not_found()),
        Err(err) => {
            debug!(position, error = %err, "List rename rejected");
            let mut flash = ctx.data.take_flash();
            flash.error = Some(err.to_string());
            let body = render::edit_list_page(&ctx.data.lists[position], &flash);
            finish(&state, ctx, page(body))
        }
    }
}

/// POST /lists/{num}/delete - delete a list and renumber the rest.
async fn post_delete_list(
    State(state): State<AppState>,
    Path(num): Path<String>,
    headers: HeaderMap,
) -> Response {
    let mut ctx = match open_session(&state, &headers) {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };

    let Some(position) = parse_index(&num) else {
        return finish(&state, ctx, not_found());
    };

    match lists::delete_list(&mut ctx.data.lists, position) {
        Ok(removed) => {
            info!(position, name = %removed.name, "List deleted");
            ctx.data.success = Some(MSG_LIST_DELETED.to_string());
            finish(&state, ctx, see_other("/lists"))
        }
        Err(_) => finish(&state, ctx, not_found()),
    }
}

// ============================================================================
// Todo handlers
// ============================================================================

/// POST /lists/{num}/todos - add a todo; validation failures re-render
/// the list page with the error.
async fn post_add_todo(
    State(state): State<AppState>,
    Path(num): Path<String>,
    headers: HeaderMap,
    Form(form): Form<TodoForm>,
) -> Response {
    let mut ctx = match open_session(&state, &headers) {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };

    let Some(position) = parse_index(&num) else {
        return finish(&state, ctx, not_found());
    };
    if lists::get_list(&ctx.data.lists, position).is_err() {
        return finish(&state, ctx, not_found());
    }

    match lists::add_todo(&mut ctx.data.lists[position], &form.todo) {
        Ok(()) => {
            ctx.data.success = Some(MSG_TODO_ADDED.to_string());
            finish(&state, ctx, see_other(&format!("/lists/{position}")))
        }
        Err(err) => {
            debug!(position, error = %err, "Todo rejected");
            let mut flash = ctx.data.take_flash();
            flash.error = Some(err.to_string());
            let body = render::list_page(&ctx.data.lists[position], &flash);
            finish(&state, ctx, page(body))
        }
    }
}

/// Looks up both indices for todo-level routes, mapping any failure to
/// `NotFound`.
fn todo_indices(num: &str, todo_num: &str) -> Result<(usize, usize), TodoError> {
    let position = parse_index(num).ok_or_else(TodoError::list_not_found)?;
    let index = parse_index(todo_num).ok_or_else(TodoError::todo_not_found)?;
    Ok((position, index))
}

/// POST /lists/{num}/{todo_num}/delete - remove one todo.
async fn post_delete_todo(
    State(state): State<AppState>,
    Path((num, todo_num)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    let mut ctx = match open_session(&state, &headers) {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };

    let result = todo_indices(&num, &todo_num).and_then(|(position, index)| {
        let list = lists::get_list_mut(&mut ctx.data.lists, position)?;
        lists::delete_todo(list, index)?;
        Ok(position)
    });

    match result {
        Ok(position) => {
            ctx.data.success = Some(MSG_TODO_DELETED.to_string());
            finish(&state, ctx, see_other(&format!("/lists/{position}")))
        }
        Err(_) => finish(&state, ctx, not_found()),
    }
}

/// POST /lists/{num}/{todo_num}/toggle - set one todo's completed flag.
async fn post_toggle_todo(
    State(state): State<AppState>,
    Path((num, todo_num)): Path<(String, String)>,
    headers: HeaderMap,
    Form(form): Form<ToggleForm>,
) -> Response {
    let mut ctx = match open_session(&state, &headers) {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };

    let completed = form.completed == "true";
    let result = todo_indices(&num, &todo_num).and_then(|(position, index)| {
        let list = lists::get_list_mut(&mut ctx.data.lists, position)?;
        lists::toggle_todo(list, index, completed)?;
        Ok(position)
    });

    match result {
        Ok(position) => {
            ctx.data.success = Some(MSG_TODO_UPDATED.to_string());
            finish(&state, ctx, see_other(&format!("/lists/{position}")))
        }
        Err(_) => finish(&state, ctx, not_found()),
    }
}

/// POST /lists/{num}/complete_all - mark every todo in a list completed.
async fn post_complete_all(
    State(state): State<AppState>,
    Path(num): Path<String>,
    headers: HeaderMap,
) -> Response {
    let mut ctx = match open_session(&state, &headers) {
        Ok(ctx) => ctx,
        Err(response) => return response,
    };

    let Some(position) = parse_index(&num) else {
        return finish(&state, ctx, not_found());
    };
    if lists::get_list(&ctx.data.lists, position).is_err() {
        return finish(&state, ctx, not_found());
    }

    lists::complete_all(&mut ctx.data.lists[position]);
    ctx.data.success = Some(MSG_ALL_COMPLETED.to_string());
    finish(&state, ctx, see_other(&format!("/lists/{position}")))
}

// ============================================================================
// GET /health - Health Check
// ============================================================================

/// Response body for the health check endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Server status (always "ok" if responding).
    pub status: String,

    /// Number of active sessions.
    pub sessions: usize,

    /// Server uptime in seconds.
    pub uptime_seconds: u64,
}

/// GET /health - health check, no session required.
async fn get_health(State(state): State<AppState>) -> Json<HealthResponse> {
    let uptime = state.start_time.elapsed();

    Json(HealthResponse {
        status: "ok".to_string(),
        sessions: state.sessions.len(),
        uptime_seconds: uptime.as_secs(),
    })
}

// ============================================================================
// Tests
// ============================================================================
