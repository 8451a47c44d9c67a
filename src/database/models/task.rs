use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A stored task. Fields other than `id` and `description` are opaque and
/// serialized flat alongside them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub description: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// Record handed to `TaskStore::insert`; the store assigns the id
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NewTask {
    pub description: String,
    pub fields: Map<String, Value>,
}

/// Partial update handed to `TaskStore::update`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TaskChanges {
    pub description: Option<String>,
    pub fields: Map<String, Value>,
}

impl TaskChanges {
    pub fn is_empty(&self) -> bool {
        self.description.is_none() && self.fields.is_empty()
    }
}

impl Task {
    /// Apply a partial update in place. Pass-through fields are merged, not replaced.
    pub fn apply(&mut self, changes: TaskChanges) {
        if let Some(description) = changes.description {
            self.description = description;
        }
        self.fields.extend(changes.fields);
    }
}

/// Split a JSON object into the keys the API interprets and the pass-through rest.
/// `id` and `description` never end up in the returned map.
pub fn passthrough_fields(body: &Map<String, Value>) -> Map<String, Value> {
    body.iter()
        .filter(|(k, _)| k.as_str() != "id" && k.as_str() != "description")
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}
