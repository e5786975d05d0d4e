//! The pure state machine behind a [PromiseSignal](crate::signal::PromiseSignal).
//!
//! State only ever changes by feeding a [PromiseEvent] to
//! [PromiseState::transition]. Every (state, event) pair is defined; events
//! that are not legal in the current status leave the state untouched.

/// Lifecycle phase of an asynchronous operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PromiseStatus {
    /// Nothing has been invoked yet, or a fulfilled run was reset.
    Idling,
    /// An invocation is in flight.
    Pending,
    /// The last applied completion was a success.
    Fulfilled,
    /// The last applied completion was a failure.
    Rejected,
    /// The owning component was torn down. Terminal.
    Cancelled,
}

/// An event fed to [PromiseState::transition].
#[derive(Debug)]
pub enum PromiseEvent<T, E> {
    /// An invocation started.
    Invoked,
    /// The executor settled successfully.
    Fulfilled(T),
    /// The executor settled with a failure.
    Rejected(E),
    /// Return a fulfilled state to its initial shape.
    Reset,
    /// The owning component was torn down.
    Cancelled,
}

/// Lifecycle state of an asynchronous operation: a status plus the data or
/// error of the last applied completion.
///
/// The raw fields may retain stale values across transitions (an `Invoked`
/// event keeps old data around, `Cancelled` keeps everything), so the
/// accessors gate on status: [data](PromiseState::data) is `Some` only while
/// fulfilled and [error](PromiseState::error) only while rejected.
#[derive(Clone, Debug, PartialEq)]
pub struct PromiseState<T, E> {
    status: PromiseStatus,
    data: Option<T>,
    error: Option<E>,
}

impl<T, E> Default for PromiseState<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> PromiseState<T, E> {
    /// Creates the initial state: idling, no data, no error.
    pub fn new() -> Self {
        Self {
            status: PromiseStatus::Idling,
            data: None,
            error: None,
        }
    }

    /// The current lifecycle phase.
    pub fn status(&self) -> PromiseStatus {
        self.status
    }

    /// Whether no invocation has been applied since creation or reset.
    pub fn is_idling(&self) -> bool {
        matches!(self.status, PromiseStatus::Idling)
    }

    /// Whether an invocation is in flight.
    pub fn is_pending(&self) -> bool {
        matches!(self.status, PromiseStatus::Pending)
    }

    /// Whether the last applied completion was a success.
    pub fn is_fulfilled(&self) -> bool {
        matches!(self.status, PromiseStatus::Fulfilled)
    }

    /// Whether the last applied completion was a failure.
    pub fn is_rejected(&self) -> bool {
        matches!(self.status, PromiseStatus::Rejected)
    }

    /// The success value. `Some` if and only if the state is fulfilled.
    pub fn data(&self) -> Option<&T> {
        if self.is_fulfilled() {
            self.data.as_ref()
        } else {
            None
        }
    }

    /// The failure value. `Some` if and only if the state is rejected.
    pub fn error(&self) -> Option<&E> {
        if self.is_rejected() {
            self.error.as_ref()
        } else {
            None
        }
    }

    /// Applies an event and returns the next state.
    ///
    /// Total and pure: illegal (state, event) pairs return the state
    /// unchanged, nothing panics.
    pub fn transition(self, event: PromiseEvent<T, E>) -> Self {
        match event {
            PromiseEvent::Invoked => {
                // A duplicate start from the same synchronous event is ignored.
                if self.is_pending() {
                    return self;
                }

                Self {
                    status: PromiseStatus::Pending,
                    error: None,
                    ..self
                }
            }

            PromiseEvent::Fulfilled(data) => {
                // Late completions after a reset or cancellation are stale.
                if !self.is_pending() {
                    return self;
                }

                Self {
                    status: PromiseStatus::Fulfilled,
                    data: Some(data),
                    ..self
                }
            }

            PromiseEvent::Rejected(error) => {
                if !self.is_pending() {
                    return self;
                }

                Self {
                    status: PromiseStatus::Rejected,
                    error: Some(error),
                    ..self
                }
            }

            PromiseEvent::Reset => {
                if !self.is_fulfilled() {
                    return self;
                }

                Self::new()
            }

            PromiseEvent::Cancelled => Self {
                status: PromiseStatus::Cancelled,
                ..self
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending() -> PromiseState<u32, String> {
        PromiseState::new().transition(PromiseEvent::Invoked)
    }

    #[test]
    fn test_initial_state() {
        let state = PromiseState::<u32, String>::new();
        assert!(state.is_idling());
        assert_eq!(state.data(), None);
        assert_eq!(state.error(), None);
    }

    #[test]
    fn test_invoked_moves_to_pending() {
        let state = pending();
        assert!(state.is_pending());
        assert_eq!(state.data(), None);
    }

    #[test]
    fn test_invoked_is_idempotent_while_pending() {
        let state = pending().transition(PromiseEvent::Invoked);
        assert!(state.is_pending());
    }

    #[test]
    fn test_fulfilled_only_applies_from_pending() {
        let state = pending().transition(PromiseEvent::Fulfilled(7));
        assert!(state.is_fulfilled());
        assert_eq!(state.data(), Some(&7));

        for stale in [
            PromiseState::new(),
            pending().transition(PromiseEvent::Rejected("nope".into())),
            pending().transition(PromiseEvent::Cancelled),
        ] {
            let before = stale.clone();
            assert_eq!(stale.transition(PromiseEvent::Fulfilled(7)), before);
        }
    }

    #[test]
    fn test_rejected_only_applies_from_pending() {
        let state = pending().transition(PromiseEvent::Rejected("nope".into()));
        assert!(state.is_rejected());
        assert_eq!(state.error(), Some(&"nope".to_string()));

        let idle = PromiseState::<u32, String>::new();
        let same = idle.clone().transition(PromiseEvent::Rejected("late".into()));
        assert_eq!(same, idle);
    }

    #[test]
    fn test_reset_only_applies_from_fulfilled() {
        let fulfilled = pending().transition(PromiseEvent::Fulfilled(7));
        let reset = fulfilled.transition(PromiseEvent::Reset);
        assert!(reset.is_idling());
        assert_eq!(reset.data(), None);
        assert_eq!(reset.error(), None);

        for other in [
            PromiseState::new(),
            pending(),
            pending().transition(PromiseEvent::Rejected("nope".into())),
            pending().transition(PromiseEvent::Cancelled),
        ] {
            let before = other.clone();
            assert_eq!(other.transition(PromiseEvent::Reset), before);
        }
    }

    #[test]
    fn test_cancelled_applies_from_any_state_and_is_terminal() {
        for state in [
            PromiseState::new(),
            pending(),
            pending().transition(PromiseEvent::Fulfilled(7)),
            pending().transition(PromiseEvent::Rejected("nope".into())),
        ] {
            let cancelled = state.transition(PromiseEvent::Cancelled);
            assert_eq!(cancelled.status(), PromiseStatus::Cancelled);

            // No event moves a cancelled state anywhere else.
            let still = cancelled
                .transition(PromiseEvent::Invoked)
                .transition(PromiseEvent::Fulfilled(9))
                .transition(PromiseEvent::Rejected("late".into()))
                .transition(PromiseEvent::Reset);
            assert_eq!(still.status(), PromiseStatus::Cancelled);
        }
    }

    #[test]
    fn test_cancelled_exposes_neither_data_nor_error() {
        let cancelled = pending()
            .transition(PromiseEvent::Fulfilled(7))
            .transition(PromiseEvent::Cancelled);
        assert_eq!(cancelled.data(), None);
        assert_eq!(cancelled.error(), None);
        assert!(!cancelled.is_idling());
        assert!(!cancelled.is_pending());
        assert!(!cancelled.is_fulfilled());
        assert!(!cancelled.is_rejected());
    }

    #[test]
    fn test_reinvoke_clears_error_and_hides_stale_data() {
        let rejected = pending().transition(PromiseEvent::Rejected("nope".into()));
        let again = rejected.transition(PromiseEvent::Invoked);
        assert!(again.is_pending());
        assert_eq!(again.error(), None);

        let fulfilled = pending().transition(PromiseEvent::Fulfilled(7));
        let again = fulfilled.transition(PromiseEvent::Invoked);
        assert!(again.is_pending());
        // The old value is retained internally but must not be observable.
        assert_eq!(again.data(), None);
    }

    #[test]
    fn test_data_and_error_are_never_both_observable() {
        // Walk a long, adversarial event sequence and check the invariant
        // after every step.
        let events = || {
            vec![
                PromiseEvent::Invoked,
                PromiseEvent::Rejected("a".to_string()),
                PromiseEvent::Invoked,
                PromiseEvent::Fulfilled(1),
                PromiseEvent::Rejected("b".to_string()),
                PromiseEvent::Reset,
                PromiseEvent::Invoked,
                PromiseEvent::Invoked,
                PromiseEvent::Fulfilled(2),
                PromiseEvent::Reset,
                PromiseEvent::Cancelled,
                PromiseEvent::Fulfilled(3),
            ]
        };

        let mut state = PromiseState::<u32, String>::new();
        for event in events() {
            state = state.transition(event);
            assert!(
                state.data().is_none() || state.error().is_none(),
                "data and error observable at once in {state:?}"
            );
        }
    }
}
