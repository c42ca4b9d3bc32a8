//! Cooperative cancellation for analysis passes.
//!
//! Hosts hand a pass a [`CancellationToken`] and cancel it when the result is
//! no longer wanted (the user kept typing, the file was closed, ...). Polling
//! is non-blocking; a pass observes cancellation only at its own checkpoints.

pub use tokio_util::sync::CancellationToken;

/// The analysis was abandoned at a cancellation checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("analysis cancelled")]
pub struct Cancelled;

/// Cancellation checkpoint: `Err(Cancelled)` once `token` (or a parent token)
/// was cancelled.
#[inline]
pub fn check_cancelled(token: &CancellationToken) -> Result<(), Cancelled> {
    if token.is_cancelled() {
        Err(Cancelled)
    } else {
        Ok(())
    }
}
