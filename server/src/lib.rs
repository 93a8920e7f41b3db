//! TidyList Server - session-scoped todo list manager.
//!
//! This crate provides a small HTTP application for managing named todo
//! lists. All state lives in a server-side session keyed by a browser
//! cookie; nothing is persisted.
//!
//! # Architecture
//!
//! Each request loads a snapshot of its session's lists, runs the pure
//! list/todo operations from [`lists`], recomputes derived completion
//! flags, stores the snapshot back, and redirects or re-renders.

pub mod config;
pub mod error;
pub mod lists;
pub mod render;
pub mod routes;
pub mod session;
pub mod types;
