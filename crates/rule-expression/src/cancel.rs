//! Cancellation signal observed by collection iteration.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// A cloneable cancellation signal.
///
/// Clones share the same flag, so a host can keep one handle and call
/// [`Cancellation::cancel`] while an evaluation holding another clone runs.
/// An optional deadline makes the signal fire on its own once it passes.
#[derive(Debug, Clone, Default)]
pub struct Cancellation {
    flag: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl Cancellation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Derives a signal sharing this flag that also fires at `deadline`.
    ///
    /// An earlier deadline already present is kept.
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let deadline = match self.deadline {
            Some(existing) if existing <= deadline => existing,
            _ => deadline,
        };
        Cancellation {
            flag: Arc::clone(&self.flag),
            deadline: Some(deadline),
        }
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        if self.flag.load(Ordering::Acquire) {
            return true;
        }
        matches!(self.deadline, Some(deadline) if Instant::now() >= deadline)
    }
}
