use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use serde_json::Value;

use crate::types::TaskMethod;

/// Transport-neutral view of an inbound task request
#[derive(Debug, Clone)]
pub struct TaskRequest {
    pub method: TaskMethod,
    pub headers: HeaderMap,
    /// Parsed JSON body, `Null` when the request had none
    pub body: Value,
    /// Parser message when the body was present but not valid JSON
    pub body_error: Option<String>,
}

impl TaskRequest {
    pub fn new(method: TaskMethod, headers: HeaderMap, body: Value) -> Self {
        Self {
            method,
            headers,
            body,
            body_error: None,
        }
    }

    /// Build from raw body bytes; whitespace-only bodies count as absent
    pub fn from_raw(method: TaskMethod, headers: HeaderMap, raw: &[u8]) -> Self {
        if raw.iter().all(u8::is_ascii_whitespace) {
            return Self::new(method, headers, Value::Null);
        }

        match serde_json::from_slice::<Value>(raw) {
            Ok(body) => Self::new(method, headers, body),
            Err(e) => Self {
                method,
                headers,
                body: Value::Null,
                body_error: Some(e.to_string()),
            },
        }
    }
}

#[async_trait]
impl<S> FromRequest<S> for TaskRequest
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let method = TaskMethod::from(req.method());
        let headers = req.headers().clone();
        let raw = Bytes::from_request(req, state)
            .await
            .map_err(IntoResponse::into_response)?;

        Ok(TaskRequest::from_raw(method, headers, &raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_body_is_null() {
        let req = TaskRequest::from_raw(TaskMethod::Get, HeaderMap::new(), b"  \n");
        assert_eq!(req.body, Value::Null);
        assert!(req.body_error.is_none());
    }

    #[test]
    fn parses_json_body() {
        let req = TaskRequest::from_raw(TaskMethod::Post, HeaderMap::new(), br#"{"description":"Task A"}"#);
        assert_eq!(req.body, json!({"description": "Task A"}));
    }

    #[test]
    fn records_parse_errors() {
        let req = TaskRequest::from_raw(TaskMethod::Post, HeaderMap::new(), b"{not json");
        assert_eq!(req.body, Value::Null);
        assert!(req.body_error.is_some());
    }
}
