//! Retry and request pacing.
//!
//! Two small composable pieces used by every network-facing component:
//!
//! - [`with_retry`] runs an async operation under a [`ferry_core::RetryPolicy`],
//!   retrying only errors that classify themselves as transient through
//!   [`ferry_error::RetryableError`].
//! - [`RequestLimiter`] paces requests to a store with a GCRA quota.

mod limiter;
mod retry;

pub use limiter::RequestLimiter;
pub use retry::{with_retry, with_retry_until};
