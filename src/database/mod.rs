pub mod memory;
pub mod models;
pub mod postgres;
pub mod store;

pub use memory::MemoryTaskStore;
pub use models::task::{NewTask, Task, TaskChanges};
pub use postgres::PgTaskStore;
pub use store::{StoreError, StoreResult, TaskStore};
