//! Hold-mode traces over the combined spectrum array.
//!
//! Each display owns up to three independent traces. Every tick the
//! engine folds the current combined array into each visible, updating
//! trace according to its hold mode; resets are explicit user actions,
//! never implicit. Callers read amplitude slices or cloned snapshots and
//! never mutate trace storage directly.

use serde::{Deserialize, Serialize};

/// Number of traces per display.
pub const TRACE_COUNT: usize = 3;

/// Exponential moving average weights for [`TraceMode::Average`]:
/// `trace = KEEP * trace + BLEND * current`.
pub const AVERAGE_KEEP: f32 = 0.8;
pub const AVERAGE_BLEND: f32 = 0.2;

// ---------------------------------------------------------------------------
// Trace mode
// ---------------------------------------------------------------------------

/// Trace accumulation policy, analogous to a real analyzer's trace math.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TraceMode {
    /// Replace with the current sweep.
    ClearWrite,
    /// Per-bin running maximum.
    MaxHold,
    /// Per-bin running minimum.
    MinHold,
    /// Exponential moving average.
    Average,
    /// Frozen; no mutation.
    Hold,
}

impl TraceMode {
    /// The fill value a fresh or reset trace starts from. Hold modes use
    /// the identity of their fold; the rest start from zero and are
    /// replaced on the first sweep.
    fn sentinel_fill(self) -> f32 {
        match self {
            TraceMode::MaxHold => f32::NEG_INFINITY,
            TraceMode::MinHold => f32::INFINITY,
            TraceMode::ClearWrite | TraceMode::Average | TraceMode::Hold => 0.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Trace
// ---------------------------------------------------------------------------

/// One trace buffer and its accumulation policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    amplitude: Vec<f32>,
    mode: TraceMode,
    pub is_visible: bool,
    pub is_updating: bool,
}

impl Trace {
    /// Create a trace with the sentinel fill for its mode.
    pub fn new(width: usize, mode: TraceMode) -> Self {
        Self {
            amplitude: vec![mode.sentinel_fill(); width],
            mode,
            is_visible: false,
            is_updating: true,
        }
    }

    pub fn mode(&self) -> TraceMode {
        self.mode
    }

    /// The trace's amplitude array. Read-only view.
    pub fn amplitude(&self) -> &[f32] {
        &self.amplitude
    }

    /// An owned copy for renderers that outlive the tick.
    pub fn snapshot(&self) -> Vec<f32> {
        self.amplitude.clone()
    }

    /// Switch accumulation mode. Switching into `Hold` freezes the data
    /// in place; every other switch restarts from the new mode's fill.
    pub fn set_mode(&mut self, mode: TraceMode) {
        self.mode = mode;
        if mode != TraceMode::Hold {
            self.reset();
        }
    }

    /// Refill with the mode's sentinel, discarding accumulated history.
    pub fn reset(&mut self) {
        self.amplitude.fill(self.mode.sentinel_fill());
    }

    /// Fold one sweep into the trace according to its mode.
    pub fn update(&mut self, current: &[f32]) {
        debug_assert_eq!(current.len(), self.amplitude.len());
        match self.mode {
            TraceMode::ClearWrite => {
                self.amplitude.copy_from_slice(current);
            }
            TraceMode::MaxHold => {
                for (t, &c) in self.amplitude.iter_mut().zip(current) {
                    if c > *t {
                        *t = c;
                    }
                }
            }
            TraceMode::MinHold => {
                for (t, &c) in self.amplitude.iter_mut().zip(current) {
                    if c < *t {
                        *t = c;
                    }
                }
            }
            TraceMode::Average => {
                for (t, &c) in self.amplitude.iter_mut().zip(current) {
                    *t = AVERAGE_KEEP * *t + AVERAGE_BLEND * c;
                }
            }
            TraceMode::Hold => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Trace engine
// ---------------------------------------------------------------------------

/// The per-display trace set. Trace 0 starts visible in clear-write; the
/// other two start hidden in max/min hold, ready to be switched on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEngine {
    traces: [Trace; TRACE_COUNT],
}

impl TraceEngine {
    pub fn new(width: usize) -> Self {
        let mut live = Trace::new(width, TraceMode::ClearWrite);
        live.is_visible = true;
        Self {
            traces: [
                live,
                Trace::new(width, TraceMode::MaxHold),
                Trace::new(width, TraceMode::MinHold),
            ],
        }
    }

    pub fn trace(&self, idx: usize) -> &Trace {
        &self.traces[idx]
    }

    pub fn trace_mut(&mut self, idx: usize) -> &mut Trace {
        &mut self.traces[idx]
    }

    /// Fold the current sweep into every visible, updating trace.
    pub fn update(&mut self, current: &[f32]) {
        for trace in &mut self.traces {
            if trace.is_visible && trace.is_updating {
                trace.update(current);
            }
        }
    }

    /// Reset one trace, discarding its accumulated history.
    pub fn reset(&mut self, idx: usize) {
        self.traces[idx].reset();
    }
}

// ===========================================================================
// Tests
// ===========================================================================
