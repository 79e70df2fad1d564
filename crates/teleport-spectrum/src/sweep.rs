//! Sweep-rate gating.
//!
//! The analyzer display refreshes no faster than its configured sweep
//! interval; ticks arriving sooner are skipped. This is a rate-limiting
//! policy over the shared tick clock, not a concurrency mechanism.

use serde::{Deserialize, Serialize};

use teleport_core::sim::Ticks;

/// Gates sweeps to at most one per `interval_ticks`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepTimer {
    interval_ticks: Ticks,
    last_sweep: Option<Ticks>,
}

impl SweepTimer {
    /// A timer that allows one sweep every `interval_ticks` (minimum 1).
    pub fn new(interval_ticks: Ticks) -> Self {
        Self {
            interval_ticks: interval_ticks.max(1),
            last_sweep: None,
        }
    }

    pub fn interval_ticks(&self) -> Ticks {
        self.interval_ticks
    }

    /// Whether a sweep is due at `tick`. Records the sweep when it is.
    pub fn try_sweep(&mut self, tick: Ticks) -> bool {
        let due = match self.last_sweep {
            None => true,
            Some(last) => tick.saturating_sub(last) >= self.interval_ticks,
        };
        if due {
            self.last_sweep = Some(tick);
        }
        due
    }

    /// Forget the last sweep so the next tick sweeps immediately.
    pub fn reset(&mut self) {
        self.last_sweep = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_tick_always_sweeps() {
        let mut timer = SweepTimer::new(4);
        assert!(timer.try_sweep(0));
    }

    #[test]
    fn gates_to_the_interval() {
        let mut timer = SweepTimer::new(4);
        assert!(timer.try_sweep(0));
        assert!(!timer.try_sweep(1));
        assert!(!timer.try_sweep(3));
        assert!(timer.try_sweep(4));
        assert!(!timer.try_sweep(7));
        assert!(timer.try_sweep(8));
    }

    #[test]
    fn slow_ticks_always_pass() {
        let mut timer = SweepTimer::new(2);
        assert!(timer.try_sweep(0));
        assert!(timer.try_sweep(10));
        assert!(timer.try_sweep(25));
    }

    #[test]
    fn interval_floor_is_one() {
        let mut timer = SweepTimer::new(0);
        assert_eq!(timer.interval_ticks(), 1);
        assert!(timer.try_sweep(0));
        assert!(timer.try_sweep(1));
    }

    #[test]
    fn reset_rearms_immediately() {
        let mut timer = SweepTimer::new(10);
        assert!(timer.try_sweep(0));
        assert!(!timer.try_sweep(1));
        timer.reset();
        assert!(timer.try_sweep(2));
    }
}
