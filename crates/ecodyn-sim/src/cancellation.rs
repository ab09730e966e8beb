//! A cooperative cancellation handle for a running simulation (§ 5
//! "Cancellation", § C supplemented feature). The integrator checks it
//! between trial steps; it never interrupts mid-step.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A clonable handle that can request cancellation of the simulation it was
/// passed to. Cheap to clone (an `Arc` underneath) so a caller can hand a
/// copy to another thread and trigger it there.
#[derive(Debug, Clone, Default)]
pub struct CancellationSignal(Arc<AtomicBool>);

impl CancellationSignal {
    #[must_use]
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    /// Requests cancellation. Idempotent.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_uncancelled_and_latches_once_triggered() {
        let signal = CancellationSignal::new();
        assert!(!signal.is_cancelled());
        let clone = signal.clone();
        clone.cancel();
        assert!(signal.is_cancelled());
    }
}
