//! Power sequencing and external-reference lock state machines.
//!
//! Each frequency converter (BUC, LNB) runs the same four-state machine:
//! `Off -> Powering -> Locked / Unlocked`. Reference loss unlocks
//! immediately; regaining the reference re-locks only after a settle
//! delay, counted in ticks by the engine. Transitions are reported so the
//! engine can emit events exactly once; steady states are silent.

use serde::{Deserialize, Serialize};

/// Ticks a converter spends in `Powering` before it can report a lock
/// state.
pub const POWER_UP_SETTLE_TICKS: u64 = 3;

/// Ticks between the reference reappearing and the lock flag going true.
pub const REF_SETTLE_TICKS: u64 = 5;

// ---------------------------------------------------------------------------
// Lock state
// ---------------------------------------------------------------------------

/// Where a converter is in its power/lock sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LockState {
    /// Unpowered.
    Off,
    /// Powered, oscillator still settling.
    Powering,
    /// Locked to the external reference.
    Locked,
    /// Powered and settled but no usable reference.
    Unlocked,
}

/// A lock transition worth reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockTransition {
    Acquired,
    Lost,
}

// ---------------------------------------------------------------------------
// Converter lock machine
// ---------------------------------------------------------------------------

/// The per-converter state machine. The engine drives one of these per
/// converter, once per tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConverterLock {
    state: LockState,
    settle_remaining: u64,
}

impl ConverterLock {
    pub fn new() -> Self {
        Self {
            state: LockState::Off,
            settle_remaining: 0,
        }
    }

    pub fn state(&self) -> LockState {
        self.state
    }

    /// Whether the converter currently reports a reference lock.
    pub fn is_locked(&self) -> bool {
        self.state == LockState::Locked
    }

    /// Advance one tick. Returns a transition when the lock flag changed.
    pub fn update(&mut self, is_powered: bool, ref_present: bool) -> Option<LockTransition> {
        let was_locked = self.is_locked();

        self.state = match self.state {
            _ if !is_powered => {
                self.settle_remaining = 0;
                LockState::Off
            }
            LockState::Off => {
                self.settle_remaining = POWER_UP_SETTLE_TICKS;
                LockState::Powering
            }
            LockState::Powering => {
                self.settle_remaining = self.settle_remaining.saturating_sub(1);
                if self.settle_remaining > 0 {
                    LockState::Powering
                } else if ref_present {
                    LockState::Locked
                } else {
                    self.settle_remaining = REF_SETTLE_TICKS;
                    LockState::Unlocked
                }
            }
            LockState::Locked => {
                if ref_present {
                    LockState::Locked
                } else {
                    // Reference loss unlocks immediately.
                    self.settle_remaining = REF_SETTLE_TICKS;
                    LockState::Unlocked
                }
            }
            LockState::Unlocked => {
                if ref_present {
                    self.settle_remaining = self.settle_remaining.saturating_sub(1);
                    if self.settle_remaining == 0 {
                        LockState::Locked
                    } else {
                        LockState::Unlocked
                    }
                } else {
                    self.settle_remaining = REF_SETTLE_TICKS;
                    LockState::Unlocked
                }
            }
        };

        match (was_locked, self.is_locked()) {
            (false, true) => Some(LockTransition::Acquired),
            (true, false) => Some(LockTransition::Lost),
            _ => None,
        }
    }
}

impl Default for ConverterLock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(lock: &mut ConverterLock, powered: bool, ref_present: bool, ticks: u64) {
        for _ in 0..ticks {
            lock.update(powered, ref_present);
        }
    }

    #[test]
    fn powers_up_and_locks_with_reference() {
        let mut lock = ConverterLock::new();
        assert_eq!(lock.state(), LockState::Off);

        lock.update(true, true);
        assert_eq!(lock.state(), LockState::Powering);

        run(&mut lock, true, true, POWER_UP_SETTLE_TICKS - 1);
        assert_eq!(lock.state(), LockState::Powering);

        let t = lock.update(true, true);
        assert_eq!(lock.state(), LockState::Locked);
        assert_eq!(t, Some(LockTransition::Acquired));
    }

    #[test]
    fn powers_up_unlocked_without_reference() {
        let mut lock = ConverterLock::new();
        run(&mut lock, true, false, POWER_UP_SETTLE_TICKS + 1);
        assert_eq!(lock.state(), LockState::Unlocked);
        assert!(!lock.is_locked());
    }

    #[test]
    fn reference_loss_unlocks_immediately() {
        let mut lock = ConverterLock::new();
        run(&mut lock, true, true, POWER_UP_SETTLE_TICKS + 2);
        assert!(lock.is_locked());

        let t = lock.update(true, false);
        assert_eq!(t, Some(LockTransition::Lost));
        assert_eq!(lock.state(), LockState::Unlocked);
    }

    #[test]
    fn relock_waits_for_settle_delay() {
        let mut lock = ConverterLock::new();
        run(&mut lock, true, true, POWER_UP_SETTLE_TICKS + 2);
        lock.update(true, false);
        assert!(!lock.is_locked());

        // Reference returns: stays unlocked through the settle window.
        run(&mut lock, true, true, REF_SETTLE_TICKS - 1);
        assert_eq!(lock.state(), LockState::Unlocked);

        let t = lock.update(true, true);
        assert!(lock.is_locked());
        assert_eq!(t, Some(LockTransition::Acquired));
    }

    #[test]
    fn reference_flicker_restarts_settle() {
        let mut lock = ConverterLock::new();
        run(&mut lock, true, true, POWER_UP_SETTLE_TICKS + 2);
        lock.update(true, false);

        // Partial settle, then the reference drops again.
        run(&mut lock, true, true, REF_SETTLE_TICKS - 2);
        lock.update(true, false);
        // Needs the full window again.
        run(&mut lock, true, true, REF_SETTLE_TICKS - 1);
        assert!(!lock.is_locked());
        lock.update(true, true);
        assert!(lock.is_locked());
    }

    #[test]
    fn power_off_from_any_state_goes_off() {
        let mut lock = ConverterLock::new();
        run(&mut lock, true, true, POWER_UP_SETTLE_TICKS + 2);
        assert!(lock.is_locked());
        let t = lock.update(false, true);
        assert_eq!(lock.state(), LockState::Off);
        assert_eq!(t, Some(LockTransition::Lost));
    }

    #[test]
    fn no_transition_reported_in_steady_state() {
        let mut lock = ConverterLock::new();
        run(&mut lock, true, true, POWER_UP_SETTLE_TICKS + 1);
        assert!(lock.is_locked());
        for _ in 0..10 {
            assert_eq!(lock.update(true, true), None);
        }
    }
}
