//! Per-call cancellation and deadline signal.
//!
//! # Responsibility
//! - Let callers abort an in-flight store operation from another thread.
//! - Bound an operation by a wall-clock deadline.
//!
//! # Invariants
//! - Cancellation is sticky: once cancelled, a token stays cancelled.
//! - Cancellation wins over deadline when both have fired.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Shareable cancellation flag. Clones observe the same state.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Why an operation context stopped admitting work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextDone {
    Cancelled,
    DeadlineExceeded,
}

/// Ambient signal passed to every `NoteStore` operation.
#[derive(Debug, Clone, Default)]
pub struct OpContext {
    cancel: CancelToken,
    deadline: Option<Instant>,
}

impl OpContext {
    /// Context that never fires unless its token is cancelled.
    pub fn background() -> Self {
        Self::default()
    }

    /// Context bound to an existing token.
    pub fn with_cancel(token: CancelToken) -> Self {
        Self {
            cancel: token,
            deadline: None,
        }
    }

    /// Returns a copy that also expires at `deadline`.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(current) if current < deadline => current,
            _ => deadline,
        });
        self
    }

    /// Returns a copy that expires `timeout` from now.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        let deadline = Instant::now()
            .checked_add(timeout)
            .unwrap_or_else(far_future);
        self.with_deadline(deadline)
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Reports whether the context has fired, and why.
    pub fn done(&self) -> Option<ContextDone> {
        if self.cancel.is_cancelled() {
            return Some(ContextDone::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(ContextDone::DeadlineExceeded),
            _ => None,
        }
    }
}

fn far_future() -> Instant {
    // ~30 years; only reached when `timeout` overflows `Instant`.
    Instant::now() + Duration::from_secs(60 * 60 * 24 * 365 * 30)
}
