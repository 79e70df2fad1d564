//! Read-only snapshot types for chain queries.
//!
//! All types are owned copies -- no references into engine storage -- so
//! the renderer and demod evaluator can hold them across a tick boundary
//! without observing a half-updated chain.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Path report
// ---------------------------------------------------------------------------

/// Transmit chain totals for the current tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TxPathState {
    /// IF input frequency, MHz.
    pub if_frequency_mhz: f64,
    /// IF input power, dBm.
    pub if_power_dbm: f64,
    /// RF output frequency after up-conversion, MHz.
    pub rf_frequency_mhz: f64,
    /// RF output power at the antenna feed, dBm. Sentinel when the chain
    /// is dead or muted.
    pub rf_power_dbm: f64,
    /// Accumulated gain, final minus initial power. Zero when dead.
    pub total_gain_db: f64,
}

/// Receive chain totals for the current tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RxPathState {
    /// RF input frequency, MHz.
    pub rf_frequency_mhz: f64,
    /// RF input power at the feed, dBm.
    pub rf_power_dbm: f64,
    /// IF output frequency after down-conversion, MHz.
    pub if_frequency_mhz: f64,
    /// IF output power, dBm. Sentinel when the chain is dead.
    pub if_power_dbm: f64,
    /// Accumulated gain, final minus initial power. Zero when dead.
    pub total_gain_db: f64,
    /// Cascaded noise figure of the receive chain, dB. Sentinel when dead.
    pub noise_figure_db: f64,
    /// High-side LO injection flips the spectrum at IF.
    pub is_spectrum_inverted: bool,
}

/// Both chain totals, recomputed once per tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathReport {
    pub tx: TxPathState,
    pub rx: RxPathState,
}

// ---------------------------------------------------------------------------
// Noise floor query
// ---------------------------------------------------------------------------

/// Answer to "what is the noise floor at tap X".
///
/// When the externally referred (antenna-injected) floor dominates, the
/// returned value still needs `total_gain_to(tap)` added by the caller and
/// `should_apply_gain` is true. When the receiver's own thermal floor
/// dominates, the value is final as-is: it already reflects every stage up
/// to the tap through the cascaded noise figure, and adding gain again
/// would double-count it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoiseFloorQuery {
    pub noise_floor_no_gain_dbm: f64,
    pub should_apply_gain: bool,
}

impl NoiseFloorQuery {
    /// The display-ready floor: gain applied exactly once.
    pub fn resolved_dbm(&self, gain_db: f64) -> f64 {
        if self.should_apply_gain {
            self.noise_floor_no_gain_dbm + gain_db
        } else {
            self.noise_floor_no_gain_dbm
        }
    }
}

// ---------------------------------------------------------------------------
// Coupler output
// ---------------------------------------------------------------------------

/// What a spectrum analyzer connected to a coupler port sees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CouplerOutput {
    pub frequency_hz: f64,
    pub power_dbm: f64,
}
