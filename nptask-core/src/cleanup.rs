//! Exactly-once teardown.

/// Runs a closure exactly once: either when explicitly
/// [disposed](CleanupGuard::dispose), or when dropped.
///
/// The owner of a [PromiseSignal](crate::signal::PromiseSignal) keeps one of
/// these next to the signal so teardown of the owner cancels the signal
/// before any in-flight completion can be applied.
pub struct CleanupGuard {
    cleanup: Option<Box<dyn FnOnce() + Send>>,
}

impl CleanupGuard {
    /// Creates a guard around the given teardown closure.
    pub fn new(cleanup: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cleanup: Some(Box::new(cleanup)),
        }
    }

    /// Runs the teardown closure now instead of at drop time.
    pub fn dispose(mut self) {
        self.run();
    }

    fn run(&mut self) {
        if let Some(cleanup) = self.cleanup.take() {
            cleanup();
        }
    }
}

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        self.run();
    }
}

impl std::fmt::Debug for CleanupGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CleanupGuard")
            .field("disposed", &self.cleanup.is_none())
            .finish()
    }
}
