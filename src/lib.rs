#![warn(missing_docs)]

//! Drive asynchronous operations from UI code without hand-rolled status bookkeeping.

pub use nptask_core as core;

/// A "prelude" for users of the nptask library.
///
/// Importing this module brings into scope the most common types
/// needed to wire an asynchronous operation into a UI component.
///
/// ```rust
/// use nptask::prelude::*;
/// ```
pub mod prelude {
    pub use crate::core::cleanup::CleanupGuard;
    pub use crate::core::config::TasksConfig;
    pub use crate::core::machine::{PromiseEvent, PromiseState, PromiseStatus};
    pub use crate::core::signal::{InvokeOptions, PromiseSignal};
    pub use crate::core::tasks;
}
