//! Edge detection for values observed over time.

/// A previous-value cell: remembers the last observed value and reports
/// whether a newly observed one differs.
///
/// Used to fire completion callbacks only on the update where a tracked flag
/// changes, never on repeats of the same value and never on the initial
/// observation (the cell is seeded with the initial value).
#[derive(Debug)]
pub struct EdgeCell<T> {
    last: T,
}

impl<T: PartialEq> EdgeCell<T> {
    /// Creates a cell seeded with the initial value.
    pub fn new(initial: T) -> Self {
        Self { last: initial }
    }

    /// Records `current` and returns whether it differs from the previous
    /// observation.
    pub fn observe(&mut self, current: T) -> bool {
        let changed = self.last != current;
        self.last = current;
        changed
    }

    /// The most recently observed value.
    pub fn last(&self) -> &T {
        &self.last
    }
}
