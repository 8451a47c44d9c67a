use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::{json, Value};

use crate::error::ApiError;

/// Transport-neutral response: a status code and a JSON object body
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl ApiResponse {
    /// Create a 200 OK response
    pub fn ok(body: Value) -> Self {
        Self { status: StatusCode::OK, body }
    }

    /// Create a 201 Created response
    pub fn created(body: Value) -> Self {
        Self { status: StatusCode::CREATED, body }
    }

    /// `{ "success": true }`
    pub fn success() -> Self {
        Self::ok(json!({ "success": true }))
    }

    /// Messages from the `errors` array, empty on success bodies
    pub fn errors(&self) -> Vec<&str> {
        self.body
            .get("errors")
            .and_then(Value::as_array)
            .map(|errs| errs.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }
}

impl From<ApiError> for ApiResponse {
    fn from(err: ApiError) -> Self {
        let status = StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self { status, body: err.to_json() }
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
