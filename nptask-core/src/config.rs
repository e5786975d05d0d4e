//! Configuration for the background task runner.

use std::num::NonZeroUsize;

/// Configuration of the task runner thread pool.
#[derive(Clone, Debug)]
pub struct TasksConfig {
    /// The stack size of each thread of the task runner thread pool. Defaults to 1 MB.
    pub stack_size: usize,
    /// The amount of worker threads of the task runner thread pool. Defaults
    /// to half of the available threads (at least one).
    pub workers: NonZeroUsize,
}

impl Default for TasksConfig {
    fn default() -> Self {
        let available = std::thread::available_parallelism()
            .map(NonZeroUsize::get)
            .unwrap_or(2);

        Self {
            stack_size: 1024 * 1024, // 1 MB
            workers: NonZeroUsize::new((available / 2).max(1)).unwrap(),
        }
    }
}
