//! Cancellation flag: a monotonic false->true signal, checked between
//! stages and at batch boundaries. Cheap to clone and share with callers
//! holding a [`crate::handle::PipelineHandle`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared, idempotent cancellation signal for one run.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// A fresh, unset flag.
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    /// Sets the flag. Idempotent: calling this more than once has no
    /// additional effect.
    pub fn request(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been requested.
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
