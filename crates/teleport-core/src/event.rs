//! Typed chain events with buffered delivery.
//!
//! Events are emitted during the sequencing and derive phases of a tick
//! and drained by the caller after `step()` returns. Transitions emit
//! exactly once; steady states are silent. The only consumer is the tick
//! driver (fault LEDs, alarms, trainee scoring), so there is no
//! subscription machinery, just a per-tick buffer.

use crate::sim::Ticks;
use crate::tap::Stage;

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

/// A chain event. All events carry the tick at which they occurred.
#[derive(Debug, Clone, PartialEq)]
pub enum ChainEvent {
    /// Main power dropped; downstream modules were forced off.
    MainPowerLost { tick: Ticks },
    /// A module was forced off by the power cascade.
    ModulePoweredDown { stage: Stage, tick: Ticks },
    /// An HPA enable request was refused because the BUC is unpowered.
    HpaEnableRefused { tick: Ticks },
    /// A converter lost its external reference lock.
    RefLockLost { stage: Stage, tick: Ticks },
    /// A converter finished settling and locked to the reference.
    RefLockAcquired { stage: Stage, tick: Ticks },
    /// The HPA entered overdrive (back-off below threshold).
    HpaOverdriven { back_off_db: f64, tick: Ticks },
    /// The HPA left overdrive.
    HpaRecovered { tick: Ticks },
    /// OMT cross-pol isolation degraded below the fault threshold.
    OmtFaulted { isolation_db: f64, tick: Ticks },
    /// OMT isolation recovered above the fault threshold.
    OmtRecovered { tick: Ticks },
}

/// Discriminant tag for event types, used for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChainEventKind {
    MainPowerLost,
    ModulePoweredDown,
    HpaEnableRefused,
    RefLockLost,
    RefLockAcquired,
    HpaOverdriven,
    HpaRecovered,
    OmtFaulted,
    OmtRecovered,
}

impl ChainEvent {
    /// Get the discriminant kind for this event.
    pub fn kind(&self) -> ChainEventKind {
        match self {
            ChainEvent::MainPowerLost { .. } => ChainEventKind::MainPowerLost,
            ChainEvent::ModulePoweredDown { .. } => ChainEventKind::ModulePoweredDown,
            ChainEvent::HpaEnableRefused { .. } => ChainEventKind::HpaEnableRefused,
            ChainEvent::RefLockLost { .. } => ChainEventKind::RefLockLost,
            ChainEvent::RefLockAcquired { .. } => ChainEventKind::RefLockAcquired,
            ChainEvent::HpaOverdriven { .. } => ChainEventKind::HpaOverdriven,
            ChainEvent::HpaRecovered { .. } => ChainEventKind::HpaRecovered,
            ChainEvent::OmtFaulted { .. } => ChainEventKind::OmtFaulted,
            ChainEvent::OmtRecovered { .. } => ChainEventKind::OmtRecovered,
        }
    }

    /// The tick at which this event occurred.
    pub fn tick(&self) -> Ticks {
        match self {
            ChainEvent::MainPowerLost { tick }
            | ChainEvent::ModulePoweredDown { tick, .. }
            | ChainEvent::HpaEnableRefused { tick }
            | ChainEvent::RefLockLost { tick, .. }
            | ChainEvent::RefLockAcquired { tick, .. }
            | ChainEvent::HpaOverdriven { tick, .. }
            | ChainEvent::HpaRecovered { tick }
            | ChainEvent::OmtFaulted { tick, .. }
            | ChainEvent::OmtRecovered { tick } => *tick,
        }
    }
}

// ---------------------------------------------------------------------------
// Event bus
// ---------------------------------------------------------------------------

/// Buffered event delivery. Emitted during a step, drained by the caller
/// afterwards. Undrained events from previous ticks are retained until
/// `drain` or `clear`.
#[derive(Debug, Default)]
pub struct EventBus {
    buffer: Vec<ChainEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an event.
    pub fn emit(&mut self, event: ChainEvent) {
        self.buffer.push(event);
    }

    /// Take all buffered events, leaving the bus empty.
    pub fn drain(&mut self) -> Vec<ChainEvent> {
        std::mem::take(&mut self.buffer)
    }

    /// Read buffered events without consuming them.
    pub fn pending(&self) -> &[ChainEvent] {
        &self.buffer
    }

    /// Whether any buffered event matches `kind`.
    pub fn has(&self, kind: ChainEventKind) -> bool {
        self.buffer.iter().any(|e| e.kind() == kind)
    }

    /// Discard all buffered events.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emit_and_drain() {
        let mut bus = EventBus::new();
        bus.emit(ChainEvent::MainPowerLost { tick: 3 });
        bus.emit(ChainEvent::HpaRecovered { tick: 3 });
        assert_eq!(bus.pending().len(), 2);

        let events = bus.drain();
        assert_eq!(events.len(), 2);
        assert!(bus.pending().is_empty());
    }

    #[test]
    fn kind_filter() {
        let mut bus = EventBus::new();
        bus.emit(ChainEvent::RefLockLost {
            stage: Stage::Buc,
            tick: 1,
        });
        assert!(bus.has(ChainEventKind::RefLockLost));
        assert!(!bus.has(ChainEventKind::RefLockAcquired));
    }

    #[test]
    fn events_carry_their_tick() {
        let e = ChainEvent::OmtFaulted {
            isolation_db: 15.0,
            tick: 42,
        };
        assert_eq!(e.tick(), 42);
        assert_eq!(e.kind(), ChainEventKind::OmtFaulted);
    }
}
