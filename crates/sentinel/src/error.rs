//! Watch configuration errors.

use std::time::Duration;

use thiserror::Error;

/// Errors for invalid watch configuration.
///
/// These are the only conditions under which a wait returns `Err`:
/// terminal states (failed, timed out) are ordinary [`WaitOutcome`]
/// values, never errors.
///
/// [`WaitOutcome`]: crate::resource::WaitOutcome
#[derive(Error, Debug)]
pub enum WatchError {
    /// The resource identifier is empty.
    #[error("resource identifier must not be empty")]
    EmptyIdentifier,

    /// The poll interval is zero.
    #[error("poll interval must be greater than zero")]
    ZeroInterval,

    /// The maximum wait does not allow at least one full interval.
    #[error("max wait ({max_wait:?}) must exceed the poll interval ({interval:?})")]
    MaxWaitTooShort {
        /// Configured poll interval.
        interval: Duration,
        /// Configured maximum wait.
        max_wait: Duration,
    },
}
