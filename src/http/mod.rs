pub mod client;
pub mod retry_policy;

pub use client::{HttpResponse, RetryingClient};
pub use retry_policy::RetryPolicy;
