//! Bounded polling for asynchronously generated node content.
//!
//! DESIGN
//! ======
//! Content for a new node is generated server-side after creation. This loop
//! re-fetches the node at a fixed interval until `contentHTML` is non-blank
//! or the attempt budget runs out. Fixed interval, fixed ceiling, first
//! success wins. There is no cancellation hook: dropping the future is the
//! only way to stop early.

#[cfg(test)]
#[path = "poll_test.rs"]
mod poll_test;

use std::time::Duration;

use tracing::debug;

use super::api::ApiClient;
use super::error::ApiError;
use super::types::Node;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 30;
pub const DEFAULT_INTERVAL_MS: u64 = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOptions {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self { max_attempts: DEFAULT_MAX_ATTEMPTS, interval: Duration::from_millis(DEFAULT_INTERVAL_MS) }
    }
}

/// Fetch `node_id` until its generated HTML appears.
///
/// Performs at most `options.max_attempts` fetches, sleeping `options.interval`
/// between them. A failed fetch ends the loop immediately.
///
/// # Errors
///
/// Returns the first fetch error unchanged, or [`ApiError::ContentTimeout`]
/// once the attempt budget is exhausted.
pub async fn poll_for_content(
    api: &ApiClient,
    space_id: &str,
    node_id: &str,
    options: PollOptions,
) -> Result<Node, ApiError> {
    poll_with(options, || api.get_node(space_id, node_id)).await
}

/// Polling loop over an arbitrary fetch, shared by [`poll_for_content`] and tests.
pub(crate) async fn poll_with<F, Fut>(options: PollOptions, mut fetch: F) -> Result<Node, ApiError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Node, ApiError>>,
{
    for attempt in 1..=options.max_attempts {
        let node = fetch().await?;
        if node.generated_html().is_some() {
            debug!(node_id = %node.node_id, attempt, "content ready");
            return Ok(node);
        }
        debug!(node_id = %node.node_id, attempt, max = options.max_attempts, "content pending");
        if attempt < options.max_attempts {
            tokio::time::sleep(options.interval).await;
        }
    }
    Err(ApiError::ContentTimeout { attempts: options.max_attempts })
}
