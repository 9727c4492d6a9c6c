//! Status provider trait.

use anyhow::Result;
use async_trait::async_trait;

use crate::resource::{PollResult, WatchedResource};

/// Source of truth for a watched resource's state.
///
/// This is the only integration point with external systems (AWS CLI,
/// Kubernetes API). Implementations must be read-only: a status query
/// never mutates the resource it describes.
///
/// An `Err` from `query_status` is treated by the waiter as a transient
/// query failure (one [`Unknown`] poll), not a terminal state. Explicit
/// failure states reported by the provider (a `CREATE_FAILED` node group,
/// a rollout past its progress deadline) must come back as
/// `Ok(PollResult::failed(..))` so the watch ends immediately.
///
/// [`Unknown`]: crate::resource::PollState::Unknown
#[async_trait]
pub trait StatusProvider: Send + Sync {
    /// Query the current state of the resource.
    async fn query_status(&self, resource: &WatchedResource) -> Result<PollResult>;
}
