use async_trait::async_trait;
use thiserror::Error;

use super::models::task::{NewTask, Task, TaskChanges};

/// Errors reported by a task store. They are values, never panics.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    NotFound(String),

    /// The store refused the operation (constraint violation, bad input)
    #[error("{0}")]
    Rejected(String),

    /// The store could not be reached
    #[error("{0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound("Record not found".to_string()),
            sqlx::Error::Database(db) => StoreError::Rejected(db.message().to_string()),
            unavailable @ (sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_)) => {
                StoreError::Unavailable(format!("database unavailable: {}", unavailable))
            }
            other => StoreError::Rejected(other.to_string()),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Table-scoped data access for tasks
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Up to `limit` tasks, in id order
    async fn select(&self, limit: i64) -> StoreResult<Vec<Task>>;

    /// Insert a row and return it with its assigned id
    async fn insert(&self, record: NewTask) -> StoreResult<Task>;

    /// Update the row matching `id`; `NotFound` when there is none
    async fn update(&self, id: i64, changes: TaskChanges) -> StoreResult<Task>;

    /// Delete the row matching `id`; `NotFound` when there is none
    async fn delete(&self, id: i64) -> StoreResult<()>;

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }

    fn name(&self) -> &'static str;
}
