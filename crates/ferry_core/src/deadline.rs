//! Execution budget tracking.
//!
//! A [`Deadline`] is created once per invocation and handed to every
//! component that loops. Components ask it whether the budget is spent
//! before starting the next unit of work; nothing reads ambient wall-clock
//! state directly, so budget checks can be driven by a [`ManualClock`].

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Monotonic time source measured from an arbitrary origin.
pub trait Clock: Send + Sync + fmt::Debug {
    /// Time elapsed since the clock's origin.
    fn now(&self) -> Duration;
}

/// Clock backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Create a clock whose origin is the current instant.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Clock that only moves when told to.
///
/// Clones share the same reading, so a test can hold one handle while the
/// component under test observes another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    nanos: Arc<AtomicU64>,
}

impl ManualClock {
    /// Create a clock reading zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        let nanos = u64::try_from(by.as_nanos()).unwrap_or(u64::MAX);
        self.nanos.fetch_add(nanos, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.nanos.load(Ordering::SeqCst))
    }
}

/// Wall-clock budget for one invocation.
///
/// # Examples
///
/// ```
/// use ferry_core::{Deadline, ManualClock};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// let clock = ManualClock::new();
/// let deadline = Deadline::with_clock(Arc::new(clock.clone()), Duration::from_secs(35));
/// assert!(!deadline.is_exhausted());
///
/// clock.advance(Duration::from_secs(36));
/// assert!(deadline.is_exhausted());
/// ```
#[derive(Debug, Clone)]
pub struct Deadline {
    clock: Arc<dyn Clock>,
    started: Duration,
    budget: Duration,
}

impl Deadline {
    /// Start a budget on the system clock.
    pub fn new(budget: Duration) -> Self {
        Self::with_clock(Arc::new(SystemClock::new()), budget)
    }

    /// Start a budget on the given clock.
    pub fn with_clock(clock: Arc<dyn Clock>, budget: Duration) -> Self {
        let started = clock.now();
        Self {
            clock,
            started,
            budget,
        }
    }

    /// Budget this deadline was created with.
    pub fn budget(&self) -> Duration {
        self.budget
    }

    /// Time spent since the deadline started.
    pub fn elapsed(&self) -> Duration {
        self.clock.now().saturating_sub(self.started)
    }

    /// Elapsed time in whole milliseconds.
    pub fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    /// Budget left, zero once exhausted.
    pub fn remaining(&self) -> Duration {
        self.budget.saturating_sub(self.elapsed())
    }

    /// True once no new unit of work may start.
    pub fn is_exhausted(&self) -> bool {
        self.elapsed() >= self.budget
    }
}
