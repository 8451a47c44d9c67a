use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::{postgres::PgPoolOptions, postgres::PgRow, PgPool, Row};
use std::time::Duration;
use tracing::info;

use super::models::task::{NewTask, Task, TaskChanges};
use super::store::{StoreError, StoreResult, TaskStore};

const CREATE_TASKS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS tasks (
        id          BIGSERIAL PRIMARY KEY,
        description TEXT NOT NULL,
        data        JSONB NOT NULL DEFAULT '{}'::jsonb
    )
"#;

/// Task store backed by a PostgreSQL `tasks` table. Pass-through fields live
/// in the `data` JSONB column.
pub struct PgTaskStore {
    pool: PgPool,
}

impl PgTaskStore {
    pub async fn connect(url: &str, max_connections: u32, timeout_secs: u64) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(timeout_secs))
            .connect(url)
            .await?;
        info!("Connected task store to PostgreSQL (max_connections={})", max_connections);
        Ok(Self::from_pool(pool))
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the tasks table when it does not exist yet
    pub async fn ensure_schema(&self) -> StoreResult<()> {
        sqlx::query(CREATE_TASKS_TABLE).execute(&self.pool).await?;
        Ok(())
    }
}

fn row_to_task(row: &PgRow) -> StoreResult<Task> {
    let id: i64 = row.try_get("id")?;
    let description: String = row.try_get("description")?;
    let data: Value = row.try_get("data")?;

    let fields = match data {
        Value::Object(map) => map,
        _ => Map::new(),
    };

    Ok(Task { id, description, fields })
}

#[async_trait]
impl TaskStore for PgTaskStore {
    async fn select(&self, limit: i64) -> StoreResult<Vec<Task>> {
        let rows = sqlx::query("SELECT id, description, data FROM tasks ORDER BY id LIMIT $1")
            .bind(limit.max(0))
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_task).collect()
    }

    async fn insert(&self, record: NewTask) -> StoreResult<Task> {
        let row = sqlx::query(
            "INSERT INTO tasks (description, data) VALUES ($1, $2) RETURNING id, description, data",
        )
        .bind(&record.description)
        .bind(Value::Object(record.fields))
        .fetch_one(&self.pool)
        .await?;

        row_to_task(&row)
    }

    async fn update(&self, id: i64, changes: TaskChanges) -> StoreResult<Task> {
        let row = sqlx::query(
            r#"
            UPDATE tasks
            SET description = COALESCE($2, description),
                data = data || $3
            WHERE id = $1
            RETURNING id, description, data
            "#,
        )
        .bind(id)
        .bind(changes.description)
        .bind(Value::Object(changes.fields))
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => row_to_task(&row),
            None => Err(StoreError::NotFound(format!("task {} not found", id))),
        }
    }

    async fn delete(&self, id: i64) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("task {} not found", id)));
        }
        Ok(())
    }

    async fn health_check(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "postgres"
    }
}
