//! API route definitions.

use crate::handlers;
use crate::repository::StackRepository;
use axum::routing::{get, post};
use axum::Router;
use collaborators::ChromaStore;
use stackflow_core::WorkflowEngine;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Stack persistence.
    pub stacks: StackRepository,
    /// The workflow engine, constructed once with its collaborators.
    pub engine: Arc<WorkflowEngine>,
    /// Document store, used directly by the upload endpoint.
    pub documents: Arc<ChromaStore>,
    /// Where uploaded files are kept.
    pub upload_dir: PathBuf,
}

/// Build the complete API router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/stacks",
            post(handlers::create_stack).get(handlers::list_stacks),
        )
        .route(
            "/stacks/:id",
            get(handlers::get_stack)
                .put(handlers::update_stack)
                .delete(handlers::delete_stack),
        )
        .route("/stacks/:id/run", post(handlers::run_stack))
        .route("/uploadfile", post(handlers::upload_file))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
