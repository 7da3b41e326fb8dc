//! Cooperative cancellation shared by the orchestrator and every fetch task.
//!
//! A single [`CancellationController`] wraps a `CancellationToken`. The
//! signal is write-once-effective: `signal()` may be called any number of
//! times, from any thread, and the state never resets within the process
//! lifetime. Child controllers observe their parent's signal but can also
//! be signaled independently, which is how the orchestrator aborts sibling
//! tasks on failure without marking the run as interrupted.

use tokio_util::sync::CancellationToken;

/// Shared cancellation signal
#[derive(Clone, Debug, Default)]
pub struct CancellationController {
    token: CancellationToken,
}

impl CancellationController {
    /// Create a fresh, unsignaled controller
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the cancellation signal. Idempotent and safe to call concurrently.
    pub fn signal(&self) {
        self.token.cancel();
    }

    /// Cheap, non-blocking read of the signal state
    pub fn is_signaled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolve when the signal is set. Usable in `select!` for
    /// cancellation-aware waits on child processes.
    pub async fn cancelled(&self) {
        self.token.cancelled().await;
    }

    /// Derive a child controller: signaled when this controller is
    /// signaled, but signaling the child leaves the parent untouched.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
        }
    }
}
