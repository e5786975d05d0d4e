//! The invocable signal wrapping a promise-returning executor.

use crate::cleanup::CleanupGuard;
use crate::edge::EdgeCell;
use crate::machine::{PromiseEvent, PromiseState, PromiseStatus};
use crate::tasks;
use futures::future::BoxFuture;
use futures::FutureExt;
use std::future::Future;
use std::sync::{Arc, Mutex, RwLock};

/// Listener invoked with a snapshot of the state after every applied transition.
pub type Listener<T, E> = Box<dyn Fn(&PromiseState<T, E>) + Send + Sync>;

type SharedCallback<V> = Arc<dyn Fn(&V) + Send + Sync>;
type OneShotCallback<V> = Box<dyn FnOnce(&V) + Send>;
type Executor<T, E, A> = Arc<dyn Fn(A) -> BoxFuture<'static, Result<T, E>> + Send + Sync>;

/// Per-call configuration for [PromiseSignal::invoke_with]: the executor
/// argument plus optional callbacks scoped to this single invocation.
pub struct InvokeOptions<T, E, A = ()> {
    args: A,
    on_fulfilled: Option<OneShotCallback<T>>,
    on_rejected: Option<OneShotCallback<E>>,
}

impl<T, E, A> InvokeOptions<T, E, A> {
    /// Creates options carrying the given executor argument.
    pub fn new(args: A) -> Self {
        Self {
            args,
            on_fulfilled: None,
            on_rejected: None,
        }
    }

    /// Calls `callback` with the success value if this invocation fulfills.
    pub fn on_fulfilled(mut self, callback: impl FnOnce(&T) + Send + 'static) -> Self {
        self.on_fulfilled = Some(Box::new(callback));
        self
    }

    /// Calls `callback` with the failure value if this invocation rejects.
    pub fn on_rejected(mut self, callback: impl FnOnce(&E) + Send + 'static) -> Self {
        self.on_rejected = Some(Box::new(callback));
        self
    }
}

impl<T, E> Default for InvokeOptions<T, E, ()> {
    fn default() -> Self {
        Self::new(())
    }
}

/// The machine state together with the edge cells that drive callback
/// dispatch. Guarded by one mutex so transitions are strictly serialized.
struct Dispatch<T, E> {
    state: PromiseState<T, E>,
    fulfilled_edge: EdgeCell<bool>,
    rejected_edge: EdgeCell<bool>,
}

/// What a single dispatched event did, captured while the lock was held.
struct Applied<T, E> {
    changed: bool,
    snapshot: PromiseState<T, E>,
    fulfilled_rise: bool,
    rejected_rise: bool,
}

impl<T: Clone, E: Clone> Dispatch<T, E> {
    fn apply(&mut self, event: PromiseEvent<T, E>) -> Applied<T, E> {
        let before = self.state.status();
        self.state = std::mem::take(&mut self.state).transition(event);

        let is_fulfilled = self.state.is_fulfilled();
        let is_rejected = self.state.is_rejected();

        Applied {
            changed: before != self.state.status(),
            snapshot: self.state.clone(),
            fulfilled_rise: self.fulfilled_edge.observe(is_fulfilled) && is_fulfilled,
            rejected_rise: self.rejected_edge.observe(is_rejected) && is_rejected,
        }
    }
}

struct Inner<T: Send + Sync + 'static, E: Send + Sync + 'static, A: 'static> {
    dispatch: Mutex<Dispatch<T, E>>,
    executor: Executor<T, E, A>,
    on_fulfilled: RwLock<Option<SharedCallback<T>>>,
    on_rejected: RwLock<Option<SharedCallback<E>>>,
    listeners: RwLock<Vec<Listener<T, E>>>,
    settle_listeners: RwLock<Vec<Box<dyn Fn() + Send + Sync>>>,
}

/// A signal that wraps a promise-returning executor and exposes its lifecycle
/// as a state machine: idling, pending, fulfilled, rejected or cancelled.
///
/// ### Async + UI
/// A component constructs the signal once, renders from the status flags on
/// every pass and triggers [invoke](PromiseSignal::invoke) (or its detached
/// variant) from input events. Completion moves the state to fulfilled or
/// rejected; [listen](PromiseSignal::listen) and
/// [on_settle](PromiseSignal::on_settle) are the hooks a UI host uses to
/// schedule a redraw. Teardown goes through [cancel](PromiseSignal::cancel)
/// (usually via [cancel_guard](PromiseSignal::cancel_guard)), after which any
/// still-running executor settles into the void.
///
/// Overlapping invocations are not deduplicated: every executor call runs,
/// and the first completion applied while the signal is still pending wins.
/// Later completions of the same generation are discarded by the machine.
pub struct PromiseSignal<T: Send + Sync + 'static, E: Send + Sync + 'static, A: 'static = ()> {
    inner: Arc<Inner<T, E, A>>,
}

impl<T, E> PromiseSignal<T, E, ()>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    /// Creates a signal around an executor that takes no argument.
    pub fn new<F, Fut>(executor: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        Self::with_args(move |()| executor())
    }
}

impl<T, E, A> PromiseSignal<T, E, A>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
    A: 'static,
{
    /// Creates a signal around an executor taking one argument of type `A`.
    ///
    /// The argument shape is fixed at compile time through the signal's type;
    /// there is no runtime arity branching.
    pub fn with_args<F, Fut>(executor: F) -> Self
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        Self {
            inner: Arc::new(Inner {
                dispatch: Mutex::new(Dispatch {
                    state: PromiseState::new(),
                    fulfilled_edge: EdgeCell::new(false),
                    rejected_edge: EdgeCell::new(false),
                }),
                executor: Arc::new(move |args| executor(args).boxed()),
                on_fulfilled: RwLock::new(None),
                on_rejected: RwLock::new(None),
                listeners: RwLock::new(Vec::new()),
                settle_listeners: RwLock::new(Vec::new()),
            }),
        }
    }

    /// Calls `callback` once per transition into the fulfilled state.
    ///
    /// Dispatch is edge-triggered: the callback fires when the fulfilled flag
    /// changes to `true`, never for repeated reads of an already fulfilled
    /// signal and never for the initial state.
    pub fn with_on_fulfilled(self, callback: impl Fn(&T) + Send + Sync + 'static) -> Self {
        *self.inner.on_fulfilled.write().unwrap() = Some(Arc::new(callback));
        self
    }

    /// Calls `callback` once per transition into the rejected state.
    ///
    /// See [with_on_fulfilled](PromiseSignal::with_on_fulfilled) for the
    /// edge-triggered dispatch rules.
    pub fn with_on_rejected(self, callback: impl Fn(&E) + Send + Sync + 'static) -> Self {
        *self.inner.on_rejected.write().unwrap() = Some(Arc::new(callback));
        self
    }

    /// Invokes the executor with the given argument and applies the result.
    ///
    /// Raises the pending transition immediately, awaits the executor, then
    /// applies fulfilled or rejected from its [Result] - unless the signal
    /// observed a cancellation in the meantime, in which case the settled
    /// result is discarded. Completes with no value and never panics on
    /// executor failure; failures only surface in-band.
    ///
    /// Executors without an argument take `()`.
    pub async fn invoke(&self, args: A) {
        self.send(PromiseEvent::Invoked);
        self.drive(args, None, None).await;
    }

    /// Like [invoke](PromiseSignal::invoke), with callbacks scoped to this
    /// single call.
    ///
    /// The per-call callback fires with the result payload whenever the
    /// completion was not suppressed by cancellation, independent of the
    /// construction-time callbacks.
    pub async fn invoke_with(&self, options: InvokeOptions<T, E, A>) {
        let InvokeOptions {
            args,
            on_fulfilled,
            on_rejected,
        } = options;

        self.send(PromiseEvent::Invoked);
        self.drive(args, on_fulfilled, on_rejected).await;
    }

    /// Fire-and-forget [invoke](PromiseSignal::invoke) for UI event handlers.
    ///
    /// The pending transition is raised synchronously, so the signal reads as
    /// pending on the very next observation; the executor runs on the
    /// background task runner.
    pub fn invoke_detached(&self, args: A)
    where
        A: Send,
    {
        self.send(PromiseEvent::Invoked);

        let this = self.clone();
        tasks::spawn(async move {
            this.drive(args, None, None).await;
        });
    }

    /// Fire-and-forget [invoke_with](PromiseSignal::invoke_with).
    pub fn invoke_with_detached(&self, options: InvokeOptions<T, E, A>)
    where
        A: Send,
    {
        let InvokeOptions {
            args,
            on_fulfilled,
            on_rejected,
        } = options;

        self.send(PromiseEvent::Invoked);

        let this = self.clone();
        tasks::spawn(async move {
            this.drive(args, on_fulfilled, on_rejected).await;
        });
    }

    /// Returns a fulfilled signal to its initial idling state.
    ///
    /// No effect from any other status: a pending invocation keeps running
    /// and a rejected state keeps its error.
    pub fn reset(&self) {
        self.send(PromiseEvent::Reset);
    }

    /// Cancels the signal. Terminal.
    ///
    /// In-flight executors are not aborted; their results are discarded when
    /// they settle.
    pub fn cancel(&self) {
        self.send(PromiseEvent::Cancelled);
    }

    /// Returns a guard that [cancels](PromiseSignal::cancel) this signal
    /// exactly once when dropped or disposed.
    ///
    /// The owning component keeps the guard alongside the signal so its own
    /// teardown cancels the signal before a late completion can be applied.
    pub fn cancel_guard(&self) -> CleanupGuard {
        let this = self.clone();

        CleanupGuard::new(move || this.cancel())
    }

    /// The current lifecycle phase.
    pub fn status(&self) -> PromiseStatus {
        self.inner.dispatch.lock().unwrap().state.status()
    }

    /// Whether no invocation has been applied since creation or reset.
    pub fn is_idling(&self) -> bool {
        self.status() == PromiseStatus::Idling
    }

    /// Whether an invocation is in flight.
    pub fn is_pending(&self) -> bool {
        self.status() == PromiseStatus::Pending
    }

    /// Whether the last applied completion was a success.
    pub fn is_fulfilled(&self) -> bool {
        self.status() == PromiseStatus::Fulfilled
    }

    /// Whether the last applied completion was a failure.
    pub fn is_rejected(&self) -> bool {
        self.status() == PromiseStatus::Rejected
    }

    /// The success value. `Some` if and only if the signal is fulfilled.
    pub fn data(&self) -> Option<T> {
        self.inner.dispatch.lock().unwrap().state.data().cloned()
    }

    /// The failure value. `Some` if and only if the signal is rejected.
    pub fn error(&self) -> Option<E> {
        self.inner.dispatch.lock().unwrap().state.error().cloned()
    }

    /// An owned copy of the current state.
    pub fn snapshot(&self) -> PromiseState<T, E> {
        self.inner.dispatch.lock().unwrap().state.clone()
    }

    /// Registers a listener notified with a snapshot after every applied
    /// (state-changing) transition. Discarded events do not notify.
    pub fn listen(&self, listener: Listener<T, E>) {
        self.inner.listeners.write().unwrap().push(listener);
    }

    /// Registers a callback fired whenever an invocation settles, i.e. on
    /// every transition into fulfilled or rejected. UI hosts use this to
    /// request a repaint.
    pub fn on_settle(&self, callback: impl Fn() + Send + Sync + 'static) {
        self.inner
            .settle_listeners
            .write()
            .unwrap()
            .push(Box::new(callback));
    }

    /// Awaits the executor and applies its result.
    async fn drive(
        &self,
        args: A,
        on_fulfilled: Option<OneShotCallback<T>>,
        on_rejected: Option<OneShotCallback<E>>,
    ) {
        let result = (self.inner.executor)(args).await;
        self.complete(result, on_fulfilled, on_rejected);
    }

    /// Applies a settled executor result, honoring the stale-result guard.
    ///
    /// The cancellation check and the transition happen under the same lock
    /// acquisition, so a cancellation can never slip between them.
    fn complete(
        &self,
        result: Result<T, E>,
        on_fulfilled: Option<OneShotCallback<T>>,
        on_rejected: Option<OneShotCallback<E>>,
    ) {
        let applied = {
            let mut dispatch = self.inner.dispatch.lock().unwrap();

            if dispatch.state.status() == PromiseStatus::Cancelled {
                log::debug!("discarding a result that settled after cancellation");
                return;
            }

            let event = match &result {
                Ok(data) => PromiseEvent::Fulfilled(data.clone()),
                Err(error) => PromiseEvent::Rejected(error.clone()),
            };

            dispatch.apply(event)
        };

        self.after_dispatch(&applied);

        match result {
            Ok(data) => {
                if let Some(callback) = on_fulfilled {
                    callback(&data);
                }
            }
            Err(error) => {
                if let Some(callback) = on_rejected {
                    callback(&error);
                }
            }
        }
    }

    /// Applies an event and runs the callbacks it triggered.
    fn send(&self, event: PromiseEvent<T, E>) {
        let applied = self.inner.dispatch.lock().unwrap().apply(event);
        self.after_dispatch(&applied);
    }

    /// Runs listeners and construction-time callbacks for an applied event.
    /// Called with the dispatch lock released, so callbacks may re-enter the
    /// signal (e.g. re-invoke it) without deadlocking.
    fn after_dispatch(&self, applied: &Applied<T, E>) {
        if applied.changed {
            for listener in self.inner.listeners.read().unwrap().iter() {
                listener(&applied.snapshot);
            }
        }

        if applied.fulfilled_rise {
            let callback = self.inner.on_fulfilled.read().unwrap().clone();

            if let (Some(callback), Some(data)) = (callback, applied.snapshot.data()) {
                callback(data);
            }
        }

        if applied.rejected_rise {
            let callback = self.inner.on_rejected.read().unwrap().clone();

            if let (Some(callback), Some(error)) = (callback, applied.snapshot.error()) {
                callback(error);
            }
        }

        if applied.fulfilled_rise || applied.rejected_rise {
            for callback in self.inner.settle_listeners.read().unwrap().iter() {
                callback();
            }
        }
    }
}

impl<T: Send + Sync + 'static, E: Send + Sync + 'static, A: 'static> Clone
    for PromiseSignal<T, E, A>
{
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}
