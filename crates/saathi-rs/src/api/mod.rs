//! Transport helpers shared by every generation service.
//!
//! - [`retry`]: transient failure detection (429, 5xx, network errors) with
//!   configurable exponential backoff and jitter. Never retries 4xx client
//!   errors or schema failures.

pub mod retry;

pub use retry::{RetryConfig, retry_transient};
