//! Timeout utilities for page operations
//!
//! Wraps renderer calls so a stuck page load or a missing element aborts
//! that one operation instead of hanging the worker.

use std::future::Future;
use std::time::Duration;

use super::{RenderError, RenderResult};

/// Run `operation` with a hard deadline.
///
/// # Returns
/// * `Ok(T)` - Operation completed in time
/// * `Err(RenderError::Timeout)` - Deadline reached first
/// * `Err(_)` - Operation itself failed
pub async fn with_page_timeout<F, T>(
    operation: F,
    timeout: Duration,
    operation_name: &str,
) -> RenderResult<T>
where
    F: Future<Output = RenderResult<T>>,
{
    match tokio::time::timeout(timeout, operation).await {
        Ok(result) => result,
        Err(_) => Err(RenderError::Timeout {
            operation: operation_name.to_string(),
            timeout,
        }),
    }
}
