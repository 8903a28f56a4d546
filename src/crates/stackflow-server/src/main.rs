//! Server binary: wire configuration, database, collaborators, and routes.

use clap::Parser;
use stackflow_core::WorkflowEngine;
use stackflow_server::{create_router, AppState, Database, ServerOptions, StackRepository};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let options = ServerOptions::parse();

    let db = Arc::new(Database::connect(&options.database_url).await?);
    let stacks = StackRepository::new(db);

    // Collaborators are constructed once and shared for the process lifetime.
    let gemini = collaborators::GeminiConfig::from_env();
    let embedder = collaborators::GeminiEmbedder::new(gemini.clone());
    let documents = Arc::new(collaborators::ChromaStore::new(
        collaborators::ChromaConfig::from_env(),
        embedder,
    ));

    let services = stackflow_core::Collaborators {
        documents: documents.clone(),
        web: Arc::new(collaborators::SerpApiClient::new(
            collaborators::SerpApiConfig::from_env(),
        )),
        repos: Arc::new(collaborators::GitIngestor::new(
            collaborators::GitConfig::default(),
        )),
        inference: Arc::new(collaborators::GeminiClient::new(gemini)),
        reports: Arc::new(collaborators::PdfRenderer::new(
            collaborators::ReportConfig::default(),
        )),
    };
    let engine = Arc::new(WorkflowEngine::new(services));

    let state = AppState {
        stacks,
        engine,
        documents,
        upload_dir: options.upload_dir.clone(),
    };
    let app = create_router(state);

    let addr = format!("{}:{}", options.host, options.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr = %addr, "stackflow server listening");
    axum::serve(listener, app).await?;

    Ok(())
}
