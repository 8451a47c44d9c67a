/// Shared types used across the codebase

use axum::http::Method;

/// Methods the task endpoint understands. Anything else is carried through as
/// `Other` so the handler can answer with 405 instead of failing to route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskMethod {
    Get,
    Post,
    Patch,
    Delete,
    Other(String),
}

impl TaskMethod {
    /// Store operation this method maps to, if any
    pub fn operation(&self) -> Option<Operation> {
        match self {
            TaskMethod::Get => Some(Operation::Select),
            TaskMethod::Post => Some(Operation::Insert),
            TaskMethod::Patch => Some(Operation::Update),
            TaskMethod::Delete => Some(Operation::Delete),
            TaskMethod::Other(_) => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            TaskMethod::Get => "GET",
            TaskMethod::Post => "POST",
            TaskMethod::Patch => "PATCH",
            TaskMethod::Delete => "DELETE",
            TaskMethod::Other(m) => m.as_str(),
        }
    }
}

impl From<&Method> for TaskMethod {
    fn from(method: &Method) -> Self {
        match *method {
            Method::GET => TaskMethod::Get,
            Method::POST => TaskMethod::Post,
            Method::PATCH => TaskMethod::Patch,
            Method::DELETE => TaskMethod::Delete,
            ref other => TaskMethod::Other(other.as_str().to_string()),
        }
    }
}

impl std::fmt::Display for TaskMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Data-access operations issued against the task table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Select,
    Insert,
    Update,
    Delete,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_http_methods() {
        assert_eq!(TaskMethod::from(&Method::GET), TaskMethod::Get);
        assert_eq!(TaskMethod::from(&Method::PATCH), TaskMethod::Patch);
        assert_eq!(
            TaskMethod::from(&Method::PUT),
            TaskMethod::Other("PUT".to_string())
        );
    }

    #[test]
    fn unsupported_method_has_no_operation() {
        assert_eq!(TaskMethod::Post.operation(), Some(Operation::Insert));
        assert_eq!(TaskMethod::Other("OPTIONS".into()).operation(), None);
    }
}
