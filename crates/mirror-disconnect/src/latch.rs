//! One-way flag with a deadline-bounded wait.

use std::time::Instant;

use parking_lot::{Condvar, Mutex};

/// How a [`TimedLatch::wait_until`] call resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The latch was set before the deadline.
    Signaled,

    /// The deadline passed with the latch still unset.
    TimedOut,
}

/// A boolean flag that only ever goes from `false` to `true`, plus a
/// condition variable to wait for that transition.
///
/// `set` takes the same lock the waiter holds while re-checking the flag,
/// so a `set` can never slip in between the check and the wait.
#[derive(Debug, Default)]
pub struct TimedLatch {
    flag: Mutex<bool>,
    wakeable: Condvar,
}

impl TimedLatch {
    /// Create an unset latch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the flag and wake every waiter. Idempotent.
    pub fn set(&self) {
        *self.flag.lock() = true;
        self.wakeable.notify_all();
    }

    /// Returns true once the flag has been set.
    pub fn is_set(&self) -> bool {
        *self.flag.lock()
    }

    /// Block until the flag is set or `deadline` passes.
    ///
    /// With no deadline this only returns once the flag is set.
    pub fn wait_until(&self, deadline: Option<Instant>) -> WaitOutcome {
        let mut flag = self.flag.lock();

        let Some(deadline) = deadline else {
            while !*flag {
                self.wakeable.wait(&mut flag);
            }
            return WaitOutcome::Signaled;
        };

        // Spurious wakeups and early returns land back here.
        loop {
            if *flag {
                return WaitOutcome::Signaled;
            }
            if Instant::now() >= deadline {
                return WaitOutcome::TimedOut;
            }
            self.wakeable.wait_until(&mut flag, deadline);
        }
    }
}
