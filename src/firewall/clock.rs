//! Second-resolution clock, injectable so window boundaries are testable.

use std::time::{SystemTime, UNIX_EPOCH};

/// Source of the engine's notion of "now", in whole seconds.
///
/// The engine reads the clock exactly once at the top of each operation and
/// threads that snapshot through every comparison, so all checks within one
/// call agree on a single instant.
pub trait Clock {
    /// Current time in seconds. Must be non-decreasing across calls.
    fn now(&self) -> u64;
}

/// Wall clock backed by [`SystemTime`].
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

#[cfg(test)]
pub mod testing {
    use super::Clock;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Manually advanced clock. Clones share the same underlying cell, so a
    /// test can hand one handle to the engine and keep another to move time.
    #[derive(Clone, Default)]
    pub struct ManualClock(Rc<Cell<u64>>);

    impl ManualClock {
        pub fn at(start: u64) -> Self {
            let clock = ManualClock::default();
            clock.set(start);
            clock
        }

        pub fn set(&self, secs: u64) {
            self.0.set(secs);
        }

        pub fn advance(&self, secs: u64) {
            self.0.set(self.0.get() + secs);
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> u64 {
            self.0.get()
        }
    }
}
