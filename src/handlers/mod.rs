// handlers/mod.rs
//
// Public: / and /health
// Bearer token: /api/tasks (checked inside the task handler, not by middleware)
pub mod health;
pub mod tasks;

pub use health::{health, root};
pub use tasks::{handle_tasks_request, tasks_endpoint, HandlerOptions};
