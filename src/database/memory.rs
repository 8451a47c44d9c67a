use async_trait::async_trait;
use tokio::sync::RwLock;

use super::models::task::{NewTask, Task, TaskChanges};
use super::store::{StoreError, StoreResult, TaskStore};

/// In-process task table. Each instance is independent, so tests can build
/// one per case.
pub struct MemoryTaskStore {
    table: RwLock<Table>,
}

struct Table {
    rows: Vec<Task>,
    next_id: i64,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self {
            table: RwLock::new(Table { rows: Vec::new(), next_id: 1 }),
        }
    }
}

impl Default for MemoryTaskStore {
    fn default() -> Self {
        Self::new()
    }
}

fn not_found(id: i64) -> StoreError {
    StoreError::NotFound(format!("task {} not found", id))
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn select(&self, limit: i64) -> StoreResult<Vec<Task>> {
        let table = self.table.read().await;
        let limit = usize::try_from(limit.max(0)).unwrap_or(usize::MAX);
        Ok(table.rows.iter().take(limit).cloned().collect())
    }

    async fn insert(&self, record: NewTask) -> StoreResult<Task> {
        let mut table = self.table.write().await;
        let task = Task {
            id: table.next_id,
            description: record.description,
            fields: record.fields,
        };
        table.next_id += 1;
        table.rows.push(task.clone());
        Ok(task)
    }

    async fn update(&self, id: i64, changes: TaskChanges) -> StoreResult<Task> {
        let mut table = self.table.write().await;
        let task = table
            .rows
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| not_found(id))?;
        task.apply(changes);
        Ok(task.clone())
    }

    async fn delete(&self, id: i64) -> StoreResult<()> {
        let mut table = self.table.write().await;
        let index = table
            .rows
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| not_found(id))?;
        table.rows.remove(index);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map};

    fn new_task(description: &str) -> NewTask {
        NewTask { description: description.to_string(), fields: Map::new() }
    }

    #[tokio::test]
    async fn assigns_increasing_ids() {
        let store = MemoryTaskStore::new();
        let a = store.insert(new_task("a")).await.unwrap();
        let b = store.insert(new_task("b")).await.unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_delete() {
        let store = MemoryTaskStore::new();
        let a = store.insert(new_task("a")).await.unwrap();
        store.delete(a.id).await.unwrap();
        let b = store.insert(new_task("b")).await.unwrap();
        assert_eq!(b.id, 2);
    }

    #[tokio::test]
    async fn select_respects_limit() {
        let store = MemoryTaskStore::new();
        for i in 0..5 {
            store.insert(new_task(&format!("task {}", i))).await.unwrap();
        }
        assert_eq!(store.select(3).await.unwrap().len(), 3);
        assert_eq!(store.select(10).await.unwrap().len(), 5);
        assert!(store.select(0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_merges_fields() {
        let store = MemoryTaskStore::new();
        let mut fields = Map::new();
        fields.insert("status".into(), json!("open"));
        let created = store
            .insert(NewTask { description: "a".into(), fields })
            .await
            .unwrap();

        let updated = store
            .update(created.id, TaskChanges { description: Some("b".into()), fields: Map::new() })
            .await
            .unwrap();
        assert_eq!(updated.description, "b");
        assert_eq!(updated.fields["status"], json!("open"));
    }

    #[tokio::test]
    async fn missing_rows_are_not_found() {
        let store = MemoryTaskStore::new();
        assert!(matches!(store.delete(42).await, Err(StoreError::NotFound(_))));
        assert!(matches!(
            store.update(42, TaskChanges::default()).await,
            Err(StoreError::NotFound(_))
        ));
    }
}
