pub mod clock;
pub mod retry;
pub mod telemetry;

pub use clock::*;
pub use retry::{retry_with_backoff, RetryPolicy};
pub use telemetry::*;
