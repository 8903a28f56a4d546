//! Request handlers.
//!
//! Thin by design: parse, delegate to the repository or the engine, shape
//! the response. The only control flow here is translating engine
//! preconditions into HTTP statuses.

use crate::error::{Result, ServerError};
use crate::repository::{Stack, StackUpsert};
use crate::routes::AppState;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use stackflow_core::{Graph, StackflowError, WorkflowDef};
use tracing::info;

/// Pagination parameters for stack listings.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    /// Rows to skip.
    #[serde(default)]
    pub skip: i64,
    /// Maximum rows to return.
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    100
}

/// A query to run a stack against.
#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    /// The user's question.
    pub query: String,
}

/// The single result a run produces.
#[derive(Debug, Serialize)]
pub struct RunResponse {
    /// Final result text.
    pub result: String,
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn create_stack(
    State(state): State<AppState>,
    Json(payload): Json<StackUpsert>,
) -> Result<(StatusCode, Json<Stack>)> {
    let stack = state.stacks.create(payload).await?;
    info!(id = stack.id, name = %stack.name, "stack created");
    Ok((StatusCode::CREATED, Json(stack)))
}

pub async fn list_stacks(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Stack>>> {
    Ok(Json(state.stacks.list(params.skip, params.limit).await?))
}

pub async fn get_stack(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Stack>> {
    Ok(Json(state.stacks.find_by_id(id).await?))
}

pub async fn update_stack(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<StackUpsert>,
) -> Result<Json<Stack>> {
    Ok(Json(state.stacks.update(id, payload).await?))
}

pub async fn delete_stack(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>> {
    state.stacks.delete(id).await?;
    Ok(Json(json!({ "message": format!("Stack {id} deleted successfully") })))
}

pub async fn run_stack(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<RunResponse>> {
    let stack = state.stacks.find_by_id(id).await?;
    let def = WorkflowDef::from_json(&stack.workflow_definition)
        .map_err(|e| ServerError::BadRequest(format!("invalid workflow definition: {e}")))?;
    let graph = Graph::from_def(&def);

    let result = state
        .engine
        .execute(&graph, &request.query)
        .await
        .map_err(|e| match e {
            StackflowError::MissingEntryNode => {
                ServerError::BadRequest("Workflow must have a query intake node".to_string())
            }
            StackflowError::StepLimitExceeded { .. } => {
                ServerError::BadRequest(format!("Workflow did not terminate: {e}"))
            }
            other => ServerError::Engine(other),
        })?;

    info!(stack = id, "stack executed");
    Ok(Json(RunResponse { result }))
}

pub async fn upload_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Value>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::BadRequest(format!("invalid multipart body: {e}")))?
    {
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        let data = field
            .bytes()
            .await
            .map_err(|e| ServerError::BadRequest(format!("failed to read upload: {e}")))?;

        tokio::fs::create_dir_all(&state.upload_dir).await?;
        let path = state.upload_dir.join(&filename);
        tokio::fs::write(&path, &data).await?;

        let text = String::from_utf8_lossy(&data);
        state
            .documents
            .ingest(&text, &filename)
            .await
            .map_err(|e| ServerError::Upload(e.to_string()))?;

        info!(file = %filename, "file uploaded and ingested");
        return Ok(Json(json!({ "filename": filename })));
    }

    Err(ServerError::BadRequest("no file in upload".to_string()))
}
