//! Stack persistence.

use crate::db::Database;
use crate::error::{Result, ServerError};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::sync::Arc;

/// A persisted stack: a name plus the workflow definition the builder saved.
#[derive(Debug, Clone, Serialize)]
pub struct Stack {
    /// Database identifier.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Optional free-text description.
    pub description: Option<String>,
    /// The builder's node/edge definition, stored verbatim.
    pub workflow_definition: serde_json::Value,
    /// Creation time (unix seconds).
    pub created_at: i64,
    /// Last update time (unix seconds).
    pub updated_at: i64,
}

/// Payload for creating or updating a stack.
#[derive(Debug, Clone, Deserialize)]
pub struct StackUpsert {
    /// Display name.
    pub name: String,
    /// Optional free-text description.
    #[serde(default)]
    pub description: Option<String>,
    /// Workflow definition; on update, `None` keeps the stored one.
    #[serde(default)]
    pub workflow_definition: Option<serde_json::Value>,
}

/// Repository for stack database operations.
#[derive(Clone, Debug)]
pub struct StackRepository {
    db: Arc<Database>,
}

impl StackRepository {
    /// Create a new stack repository.
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Persist a new stack; a missing definition becomes the empty graph.
    pub async fn create(&self, payload: StackUpsert) -> Result<Stack> {
        let definition = payload
            .workflow_definition
            .unwrap_or_else(|| json!({ "nodes": [], "edges": [] }));
        let definition_text = definition.to_string();
        let now = Utc::now().timestamp();

        let result = sqlx::query(
            "INSERT INTO stacks (name, description, workflow_definition, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&payload.name)
        .bind(&payload.description)
        .bind(&definition_text)
        .bind(now)
        .bind(now)
        .execute(self.db.pool())
        .await
        .map_err(|e| ServerError::Database(format!("failed to create stack: {e}")))?;

        self.find_by_id(result.last_insert_rowid()).await
    }

    /// Load a stack by id.
    pub async fn find_by_id(&self, id: i64) -> Result<Stack> {
        let row = sqlx::query(
            "SELECT id, name, description, workflow_definition, created_at, updated_at
             FROM stacks WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.db.pool())
        .await
        .map_err(|e| ServerError::Database(format!("failed to load stack: {e}")))?
        .ok_or_else(|| ServerError::NotFound(format!("Stack {id} not found")))?;

        Ok(stack_from_row(&row))
    }

    /// List stacks in creation order.
    pub async fn list(&self, skip: i64, limit: i64) -> Result<Vec<Stack>> {
        let rows = sqlx::query(
            "SELECT id, name, description, workflow_definition, created_at, updated_at
             FROM stacks ORDER BY id ASC LIMIT ? OFFSET ?",
        )
        .bind(limit)
        .bind(skip)
        .fetch_all(self.db.pool())
        .await
        .map_err(|e| ServerError::Database(format!("failed to list stacks: {e}")))?;

        Ok(rows.iter().map(stack_from_row).collect())
    }

    /// Update a stack; `None` for the definition keeps the stored one.
    pub async fn update(&self, id: i64, payload: StackUpsert) -> Result<Stack> {
        let definition_text = payload.workflow_definition.map(|d| d.to_string());
        let now = Utc::now().timestamp();

        let result = sqlx::query(
            "UPDATE stacks
             SET name = ?, description = ?,
                 workflow_definition = COALESCE(?, workflow_definition),
                 updated_at = ?
             WHERE id = ?",
        )
        .bind(&payload.name)
        .bind(&payload.description)
        .bind(&definition_text)
        .bind(now)
        .bind(id)
        .execute(self.db.pool())
        .await
        .map_err(|e| ServerError::Database(format!("failed to update stack: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(ServerError::NotFound(format!("Stack {id} not found")));
        }
        self.find_by_id(id).await
    }

    /// Delete a stack by id.
    pub async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM stacks WHERE id = ?")
            .bind(id)
            .execute(self.db.pool())
            .await
            .map_err(|e| ServerError::Database(format!("failed to delete stack: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(ServerError::NotFound(format!("Stack {id} not found")));
        }
        Ok(())
    }
}

fn stack_from_row(row: &SqliteRow) -> Stack {
    let definition_text: String = row.get("workflow_definition");
    let workflow_definition =
        serde_json::from_str(&definition_text).unwrap_or_else(|_| json!({ "nodes": [], "edges": [] }));

    Stack {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
        workflow_definition,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}
