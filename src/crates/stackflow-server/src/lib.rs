//! # stackflow-server - HTTP plumbing around the workflow engine
//!
//! Persists stack definitions in SQLite, exposes CRUD plus a run endpoint,
//! and accepts uploads into the knowledge base. All control flow lives in
//! `stackflow-core`; this crate routes requests to it.

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod repository;
pub mod routes;

pub use config::ServerOptions;
pub use db::Database;
pub use error::{Result, ServerError};
pub use repository::{Stack, StackRepository, StackUpsert};
pub use routes::{create_router, AppState};
