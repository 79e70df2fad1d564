//! Per-module state records for the front-end equipment.
//!
//! One plain struct per module, discriminated by identity. The set of
//! module kinds is closed, so derived quantities are inherent methods on
//! the records rather than trait dispatch. Module state is mutated only by
//! its owning equipment object between ticks; the signal-path manager
//! reads it immutably.

use serde::{Deserialize, Serialize};

use crate::signal::Polarization;
use crate::tap::TapPoint;
use crate::units::{SENTINEL_POWER_DBM, noise_temperature_k};

// ---------------------------------------------------------------------------
// Chain constants
// ---------------------------------------------------------------------------

/// HPA 1 dB compression point, dBm.
pub const HPA_P1DB_DBM: f64 = 50.0;

/// Nominal HPA drive gain ahead of the soft limiter, dB.
pub const HPA_DRIVE_GAIN_DB: f64 = 30.0;

/// Back-off below this is overdrive territory.
pub const HPA_OVERDRIVE_THRESHOLD_DB: f64 = 3.0;

/// Fixed DC-to-RF efficiency for the HPA thermal proxy.
pub const HPA_EFFICIENCY: f64 = 0.5;

/// Ambient temperature for the HPA thermal proxy, Celsius.
pub const AMBIENT_TEMP_C: f64 = 25.0;

/// Cross-pol isolation below this marks the OMT as faulted.
pub const OMT_FAULT_THRESHOLD_DB: f64 = 20.0;

// ---------------------------------------------------------------------------
// BUC
// ---------------------------------------------------------------------------

/// Block up-converter: translates IF to RF and supplies transmit gain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucState {
    pub is_powered: bool,
    pub lo_frequency_mhz: f64,
    pub gain_db: f64,
    pub is_muted: bool,
    pub is_ext_ref_locked: bool,
    /// Measured output power, refreshed by the engine each tick.
    pub output_power_dbm: f64,
}

impl Default for BucState {
    fn default() -> Self {
        Self {
            is_powered: false,
            lo_frequency_mhz: 4200.0,
            gain_db: 58.0,
            is_muted: false,
            is_ext_ref_locked: false,
            output_power_dbm: SENTINEL_POWER_DBM,
        }
    }
}

// ---------------------------------------------------------------------------
// HPA
// ---------------------------------------------------------------------------

/// High-power amplifier: final transmit stage, modeled as a soft limiter
/// backed off from P1dB.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HpaState {
    pub is_powered: bool,
    /// Back-off from P1dB, clamped to [0, 10] dB.
    pub back_off_db: f64,
    /// Rated output, refreshed by the engine each tick.
    pub output_power_dbw: f64,
    /// Intermodulation level, refreshed by the engine each tick.
    pub imd_level_dbc: f64,
    /// Case temperature, refreshed by the engine each tick.
    pub temperature_c: f64,
}

impl HpaState {
    /// Overdriven when back-off shrinks below the threshold.
    pub fn is_overdriven(&self) -> bool {
        self.back_off_db < HPA_OVERDRIVE_THRESHOLD_DB
    }

    /// Set back-off, clamping to the legal [0, 10] dB range.
    pub fn set_back_off_db(&mut self, back_off_db: f64) {
        self.back_off_db = back_off_db.clamp(0.0, 10.0);
    }

    /// Rated output power for the current back-off.
    pub fn rated_output_dbw(&self) -> f64 {
        (HPA_P1DB_DBM - self.back_off_db) / 10.0
    }

    /// Intermodulation distortion level: worsens linearly as back-off
    /// shrinks.
    pub fn imd_level_for_back_off(&self) -> f64 {
        -30.0 - 2.0 * self.back_off_db
    }

    /// Case temperature proxy: ambient plus dissipation at the fixed
    /// DC-to-RF efficiency. Not a thermal ODE; training fidelity only.
    pub fn temperature_for_output(&self) -> f64 {
        if !self.is_powered {
            return AMBIENT_TEMP_C;
        }
        let output_watts = 10.0_f64.powf(self.rated_output_dbw() / 10.0);
        let dissipated_watts = output_watts * (1.0 - HPA_EFFICIENCY) / HPA_EFFICIENCY;
        AMBIENT_TEMP_C + dissipated_watts * 10.0
    }
}

impl Default for HpaState {
    fn default() -> Self {
        Self {
            is_powered: false,
            back_off_db: 7.0,
            output_power_dbw: 0.0,
            imd_level_dbc: -44.0,
            temperature_c: AMBIENT_TEMP_C,
        }
    }
}

// ---------------------------------------------------------------------------
// LNB
// ---------------------------------------------------------------------------

/// Low-noise block down-converter: translates RF to IF and dominates the
/// receiver noise figure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LnbState {
    pub is_powered: bool,
    pub lo_frequency_mhz: f64,
    pub gain_db: f64,
    pub noise_figure_db: f64,
    pub is_ext_ref_locked: bool,
}

impl LnbState {
    /// Equivalent noise temperature in Kelvin.
    pub fn noise_temperature_k(&self) -> f64 {
        noise_temperature_k(self.noise_figure_db)
    }

    /// High-side injection inverts the spectrum.
    pub fn is_spectrum_inverted(&self, rf_mhz: f64) -> bool {
        self.lo_frequency_mhz > rf_mhz
    }
}

impl Default for LnbState {
    fn default() -> Self {
        Self {
            is_powered: false,
            lo_frequency_mhz: 5150.0,
            gain_db: 60.0,
            noise_figure_db: 0.6,
            is_ext_ref_locked: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Filter
// ---------------------------------------------------------------------------

/// Bandpass filter: pure insertion loss on the through path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    pub bandwidth_mhz: f64,
    pub insertion_loss_db: f64,
    pub center_frequency_hz: f64,
}

impl FilterState {
    pub fn bandwidth_hz(&self) -> f64 {
        self.bandwidth_mhz * 1.0e6
    }
}

// ---------------------------------------------------------------------------
// OMT
// ---------------------------------------------------------------------------

/// Ortho-mode transducer / duplexer. The through path is lossless; only
/// cross-pol leakage is modeled via the isolation figure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OmtState {
    pub tx_polarization: Polarization,
    pub rx_polarization: Polarization,
    pub cross_pol_isolation_db: f64,
}

impl OmtState {
    /// Faulted when isolation degrades below the threshold.
    pub fn is_faulted(&self) -> bool {
        self.cross_pol_isolation_db < OMT_FAULT_THRESHOLD_DB
    }
}

impl Default for OmtState {
    fn default() -> Self {
        Self {
            tx_polarization: Polarization::Vertical,
            rx_polarization: Polarization::Horizontal,
            cross_pol_isolation_db: 30.0,
        }
    }
}

// ---------------------------------------------------------------------------
// Coupler
// ---------------------------------------------------------------------------

/// Dual-directional coupler bleeding the chain off to the spectrum
/// analyzer. Coupling factors are clamped non-positive: a tap always
/// attenuates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CouplerState {
    pub tap_a: TapPoint,
    pub tap_b: TapPoint,
    pub coupling_factor_a_db: f64,
    pub coupling_factor_b_db: f64,
    pub is_active_a: bool,
    pub is_active_b: bool,
}

impl CouplerState {
    pub fn new(
        tap_a: TapPoint,
        coupling_factor_a_db: f64,
        tap_b: TapPoint,
        coupling_factor_b_db: f64,
    ) -> Self {
        Self {
            tap_a,
            tap_b,
            coupling_factor_a_db: coupling_factor_a_db.min(0.0),
            coupling_factor_b_db: coupling_factor_b_db.min(0.0),
            is_active_a: true,
            is_active_b: true,
        }
    }

    /// The coupling factor and active flag for `tap`, if a port is wired
    /// there.
    pub fn port_at(&self, tap: TapPoint) -> Option<(f64, bool)> {
        if tap == self.tap_a {
            Some((self.coupling_factor_a_db, self.is_active_a))
        } else if tap == self.tap_b {
            Some((self.coupling_factor_b_db, self.is_active_b))
        } else {
            None
        }
    }
}

impl Default for CouplerState {
    fn default() -> Self {
        Self::new(TapPoint::TxRfPostHpa, -20.0, TapPoint::RxRfPostLna, -20.0)
    }
}

// ---------------------------------------------------------------------------
// Chain references
// ---------------------------------------------------------------------------

/// Fixed reference injected at a chain's physical input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathReference {
    pub frequency_mhz: f64,
    pub power_dbm: f64,
}

// ---------------------------------------------------------------------------
// Station state
// ---------------------------------------------------------------------------

/// The complete mutable state of the front end. Owned by the engine;
/// external equipment objects mutate it between ticks via
/// `StationEngine::state_mut`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationState {
    pub main_power: bool,
    /// Whether the external 10 MHz reference is present at the rack.
    pub ext_ref_present: bool,
    pub buc: BucState,
    pub hpa: HpaState,
    pub lnb: LnbState,
    pub tx_filter: FilterState,
    pub rx_filter: FilterState,
    pub omt: OmtState,
    pub coupler: CouplerState,
    /// TX IF input reference.
    pub tx_if_reference: PathReference,
    /// RX RF input reference (antenna-referred carrier).
    pub rx_rf_reference: PathReference,
    /// Antenna-injected noise density at the RX chain input, dBm/Hz.
    pub antenna_noise_density_dbm_hz: f64,
}

impl Default for StationState {
    fn default() -> Self {
        Self {
            main_power: false,
            ext_ref_present: true,
            buc: BucState::default(),
            hpa: HpaState::default(),
            lnb: LnbState::default(),
            tx_filter: FilterState {
                bandwidth_mhz: 36.0,
                insertion_loss_db: 2.0,
                center_frequency_hz: 5.8e9,
            },
            rx_filter: FilterState {
                bandwidth_mhz: 36.0,
                insertion_loss_db: 2.0,
                center_frequency_hz: 3.95e9,
            },
            omt: OmtState::default(),
            coupler: CouplerState::default(),
            tx_if_reference: PathReference {
                frequency_mhz: 1600.0,
                power_dbm: -10.0,
            },
            rx_rf_reference: PathReference {
                frequency_mhz: 3950.0,
                power_dbm: -100.0,
            },
            antenna_noise_density_dbm_hz: -172.0,
        }
    }
}
