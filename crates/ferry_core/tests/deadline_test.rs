//! Tests for execution budget tracking.

use ferry_core::{Deadline, ManualClock};
use std::sync::Arc;
use std::time::Duration;

#[test]
fn fresh_deadline_has_full_budget() {
    let clock = ManualClock::new();
    let deadline = Deadline::with_clock(Arc::new(clock), Duration::from_secs(35));

    assert!(!deadline.is_exhausted());
    assert_eq!(deadline.remaining(), Duration::from_secs(35));
    assert_eq!(deadline.elapsed_ms(), 0);
}

#[test]
fn deadline_counts_from_creation_not_clock_origin() {
    let clock = ManualClock::new();
    clock.advance(Duration::from_secs(100));

    let deadline = Deadline::with_clock(Arc::new(clock.clone()), Duration::from_secs(10));
    assert!(!deadline.is_exhausted());

    clock.advance(Duration::from_secs(4));
    assert_eq!(deadline.elapsed(), Duration::from_secs(4));
    assert_eq!(deadline.remaining(), Duration::from_secs(6));
}

#[test]
fn deadline_exhausts_exactly_at_budget() {
    let clock = ManualClock::new();
    let deadline = Deadline::with_clock(Arc::new(clock.clone()), Duration::from_millis(50));

    clock.advance(Duration::from_millis(49));
    assert!(!deadline.is_exhausted());

    clock.advance(Duration::from_millis(1));
    assert!(deadline.is_exhausted());
    assert_eq!(deadline.remaining(), Duration::ZERO);
}

#[test]
fn zero_budget_is_exhausted_immediately() {
    let deadline = Deadline::new(Duration::ZERO);
    assert!(deadline.is_exhausted());
}
