pub mod request;
pub mod response;

pub use request::TaskRequest;
pub use response::ApiResponse;
