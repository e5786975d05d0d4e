//! Task runner implementations.
#[cfg(feature = "tokio-runner")]
use self::tokio_runner::TokioRunner;
use std::future::Future;

/// An abstraction over a task runner.
#[derive(Debug)]
pub enum TaskRunner {
    /// The tokio task runner.
    #[cfg(feature = "tokio-runner")]
    Tokio(TokioRunner),
    /// No task runner selected.
    None,
}

impl TaskRunner {
    /// Blocks on the given future.
    pub fn block_on<F>(&self, fut: F) -> F::Output
    where
        F: Future,
    {
        match self {
            #[cfg(feature = "tokio-runner")]
            TaskRunner::Tokio(runner) => runner.block_on(fut),
            TaskRunner::None => {
                // Since there is no runtime, we can just block on the future using pollster.
                pollster::block_on(fut)
            }
        }
    }

    /// Spawns the given future (fire-and-forget).
    pub fn spawn_detached<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        match self {
            #[cfg(feature = "tokio-runner")]
            TaskRunner::Tokio(runner) => runner.spawn_detached(fut),
            TaskRunner::None => {
                // smol's global executor needs no initialization.
                smol::spawn(fut).detach();
            }
        }
    }

    /// Shuts down the runner, waiting briefly for running tasks.
    pub fn shutdown(self) {
        match self {
            #[cfg(feature = "tokio-runner")]
            TaskRunner::Tokio(runner) => runner.shutdown(),
            TaskRunner::None => {}
        }
    }
}
#[cfg(feature = "tokio-runner")]
pub mod tokio_runner;
