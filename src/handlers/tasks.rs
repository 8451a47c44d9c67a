// handlers/tasks.rs - /api/tasks
//
// One request in, at most one store call, one response out. Authentication
// runs first, then method dispatch, then validation of the whole payload.

use axum::extract::State;
use serde_json::{json, Map, Value};
use tracing::{debug, error, warn};

use crate::api::{ApiResponse, TaskRequest};
use crate::app::AppState;
use crate::auth::{extract_bearer_token, Identity, IdentityVerifier};
use crate::database::models::task::passthrough_fields;
use crate::database::{NewTask, StoreError, Task, TaskChanges, TaskStore};
use crate::error::ApiError;
use crate::types::TaskMethod;

pub const DESCRIPTION_REQUIRED: &str = "description required";
pub const DESCRIPTION_INVALID: &str = "description must be a non-empty string";
pub const ID_REQUIRED: &str = "id required";
pub const ID_INVALID: &str = "id must be an integer";
pub const BODY_NOT_OBJECT: &str = "body must be a JSON object";
pub const BODY_INVALID_JSON: &str = "body must be valid JSON";
pub const NOTHING_TO_UPDATE: &str = "no fields to update";
pub const METHOD_NOT_ALLOWED: &str = "method not allowed";

/// Per-deployment knobs the handler needs, passed in rather than read from globals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandlerOptions {
    /// Skip the bearer-token check. Test and internal use only.
    pub auth_disabled: bool,
    /// Maximum number of tasks returned by GET
    pub list_limit: i64,
}

impl Default for HandlerOptions {
    fn default() -> Self {
        Self {
            auth_disabled: false,
            list_limit: 100,
        }
    }
}

/// Axum entry point for every method on `/api/tasks`
pub async fn tasks_endpoint(State(state): State<AppState>, request: TaskRequest) -> ApiResponse {
    handle_tasks_request(request, state.store.as_ref(), state.verifier.as_ref(), state.options).await
}

/// Translate one task request into a single store call and a response.
/// Never fails: every error becomes a response value.
pub async fn handle_tasks_request(
    request: TaskRequest,
    store: &dyn TaskStore,
    verifier: &dyn IdentityVerifier,
    options: HandlerOptions,
) -> ApiResponse {
    let method = request.method.clone();
    match dispatch(request, store, verifier, options).await {
        Ok(response) => response,
        Err(err) => {
            debug!("{} /api/tasks -> {} {:?}", method, err.status_code(), err.messages());
            ApiResponse::from(err)
        }
    }
}

async fn dispatch(
    request: TaskRequest,
    store: &dyn TaskStore,
    verifier: &dyn IdentityVerifier,
    options: HandlerOptions,
) -> Result<ApiResponse, ApiError> {
    let identity = authenticate(&request, verifier, options)?;
    debug!(
        "{} /api/tasks as {} -> {:?} on {} store",
        request.method,
        identity.subject.as_deref().unwrap_or("anonymous"),
        request.method.operation(),
        store.name()
    );

    match request.method {
        TaskMethod::Get => list_tasks(store, options.list_limit).await,
        TaskMethod::Post => {
            let record = validate_create(&request).map_err(rejected)?;
            create_task(store, record).await
        }
        TaskMethod::Patch => {
            let (id, changes) = validate_update(&request).map_err(rejected)?;
            update_task(store, id, changes).await
        }
        TaskMethod::Delete => {
            let id = validate_delete(&request).map_err(rejected)?;
            delete_task(store, id).await
        }
        TaskMethod::Other(ref method) => {
            warn!("Unsupported method {} on /api/tasks", method);
            Err(ApiError::method_not_allowed(METHOD_NOT_ALLOWED))
        }
    }
}

fn authenticate(
    request: &TaskRequest,
    verifier: &dyn IdentityVerifier,
    options: HandlerOptions,
) -> Result<Identity, ApiError> {
    if options.auth_disabled {
        return Ok(Identity::anonymous());
    }

    extract_bearer_token(&request.headers)
        .and_then(|token| verifier.verify(token))
        .map_err(|e| {
            warn!("Rejected {} /api/tasks: {} ({} verifier)", request.method, e, verifier.name());
            ApiError::from(e)
        })
}

fn rejected(errors: Vec<String>) -> ApiError {
    warn!("Task validation failed: {:?}", errors);
    ApiError::validation(errors)
}

// Handlers

async fn list_tasks(store: &dyn TaskStore, limit: i64) -> Result<ApiResponse, ApiError> {
    let tasks = store.select(limit).await.map_err(store_failure)?;
    Ok(ApiResponse::ok(json!({ "tasks": tasks })))
}

async fn create_task(store: &dyn TaskStore, record: NewTask) -> Result<ApiResponse, ApiError> {
    let task = store.insert(record).await.map_err(store_failure)?;
    Ok(ApiResponse::created(task_body(&task)?))
}

async fn update_task(store: &dyn TaskStore, id: i64, changes: TaskChanges) -> Result<ApiResponse, ApiError> {
    let task = store.update(id, changes).await.map_err(store_failure)?;
    Ok(ApiResponse::ok(task_body(&task)?))
}

async fn delete_task(store: &dyn TaskStore, id: i64) -> Result<ApiResponse, ApiError> {
    store.delete(id).await.map_err(store_failure)?;
    Ok(ApiResponse::success())
}

fn store_failure(err: StoreError) -> ApiError {
    if !matches!(err, StoreError::NotFound(_)) {
        error!("Task store error: {}", err);
    }
    ApiError::from(err)
}

fn task_body(task: &Task) -> Result<Value, ApiError> {
    serde_json::to_value(task).map_err(|e| {
        error!("Failed to serialize task {}: {}", task.id, e);
        ApiError::internal_server_error("Failed to format response")
    })
}

// Validation. Each rule appends its fixed message; nothing short-circuits.

fn body_object(request: &TaskRequest, errors: &mut Vec<String>) -> Map<String, Value> {
    if request.body_error.is_some() {
        errors.push(BODY_INVALID_JSON.to_string());
        return Map::new();
    }
    match &request.body {
        Value::Null => Map::new(),
        Value::Object(map) => map.clone(),
        _ => {
            errors.push(BODY_NOT_OBJECT.to_string());
            Map::new()
        }
    }
}

fn non_empty_string(value: &Value) -> Option<&str> {
    value.as_str().filter(|s| !s.trim().is_empty())
}

fn parse_id(body: &Map<String, Value>, errors: &mut Vec<String>) -> Option<i64> {
    let id = match body.get("id") {
        None | Some(Value::Null) => {
            errors.push(ID_REQUIRED.to_string());
            return None;
        }
        Some(Value::Number(n)) => n.as_i64(),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        Some(_) => None,
    };
    if id.is_none() {
        errors.push(ID_INVALID.to_string());
    }
    id
}

fn finish<T>(value: Option<T>, errors: Vec<String>) -> Result<T, Vec<String>> {
    match value {
        Some(v) if errors.is_empty() => Ok(v),
        _ => Err(errors),
    }
}

fn validate_create(request: &TaskRequest) -> Result<NewTask, Vec<String>> {
    let mut errors = Vec::new();
    let body = body_object(request, &mut errors);

    let description = body.get("description").and_then(non_empty_string);
    if description.is_none() {
        errors.push(DESCRIPTION_REQUIRED.to_string());
    }

    // A client-supplied id is dropped; the store assigns ids
    let record = description.map(|d| NewTask {
        description: d.to_string(),
        fields: passthrough_fields(&body),
    });
    finish(record, errors)
}

fn validate_update(request: &TaskRequest) -> Result<(i64, TaskChanges), Vec<String>> {
    let mut errors = Vec::new();
    let body = body_object(request, &mut errors);
    let id = parse_id(&body, &mut errors);

    let description = match body.get("description") {
        None => None,
        Some(value) => match non_empty_string(value) {
            Some(d) => Some(d.to_string()),
            None => {
                errors.push(DESCRIPTION_INVALID.to_string());
                None
            }
        },
    };

    let changes = TaskChanges {
        description,
        fields: passthrough_fields(&body),
    };
    if changes.is_empty() && !body.contains_key("description") {
        errors.push(NOTHING_TO_UPDATE.to_string());
    }

    finish(id.map(|id| (id, changes)), errors)
}

fn validate_delete(request: &TaskRequest) -> Result<i64, Vec<String>> {
    let mut errors = Vec::new();
    let body = body_object(request, &mut errors);
    let id = parse_id(&body, &mut errors);
    finish(id, errors)
}
