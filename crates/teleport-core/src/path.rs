//! The signal-path manager: gain accumulation, cascaded noise figure, and
//! per-chain power/frequency totals.
//!
//! Everything here is pure computation over an immutable [`StationState`]
//! and the static [`ChainGraph`]; the engine calls in once per tick and
//! callers read the resulting snapshots. Chain arithmetic stays in dB;
//! only the Friis cascade drops to the linear domain.

use crate::error::ChainError;
use crate::modules::{HPA_DRIVE_GAIN_DB, HPA_P1DB_DBM, StationState};
use crate::query::{CouplerOutput, NoiseFloorQuery, PathReport, RxPathState, TxPathState};
use crate::tap::{ChainGraph, Direction, Stage, TapPoint};
use crate::units::{
    LINEAR_EPSILON, SENTINEL_NF_DB, SENTINEL_POWER_DBM, db_to_linear, linear_to_db,
    thermal_noise_floor_dbm,
};

// ---------------------------------------------------------------------------
// Per-stage gain
// ---------------------------------------------------------------------------

/// Net gain of one stage in dB, given the power driving its input.
///
/// Amplifier and converter gain is positive, filter insertion loss is
/// negative, the OMT through path is lossless. Unpowered or muted active
/// stages contribute nothing. The HPA's contribution depends on drive:
/// it is a soft limiter, so its effective gain is whatever takes the
/// input to at most `P1dB - back_off`.
pub fn stage_gain_db(stage: Stage, state: &StationState, input_power_dbm: f64) -> f64 {
    match stage {
        Stage::Buc => {
            if state.main_power && state.buc.is_powered && !state.buc.is_muted {
                state.buc.gain_db
            } else {
                0.0
            }
        }
        Stage::Hpa => {
            if state.main_power && state.hpa.is_powered {
                let ceiling = HPA_P1DB_DBM - state.hpa.back_off_db;
                (input_power_dbm + HPA_DRIVE_GAIN_DB).min(ceiling) - input_power_dbm
            } else {
                0.0
            }
        }
        Stage::TxFilter => -state.tx_filter.insertion_loss_db,
        Stage::RxFilter => -state.rx_filter.insertion_loss_db,
        Stage::Omt => 0.0,
        Stage::Lnb => {
            if state.main_power && state.lnb.is_powered {
                state.lnb.gain_db
            } else {
                0.0
            }
        }
    }
}

/// Accumulated gain from the chain's physical input to `tap`, in dB.
///
/// Walks the stages in signal order so drive-dependent stages (the HPA
/// limiter) see the power that actually reaches them.
pub fn total_gain_to(chain: &ChainGraph, state: &StationState, tap: TapPoint) -> f64 {
    let reference = match tap.direction() {
        Direction::Tx => state.tx_if_reference,
        Direction::Rx => state.rx_rf_reference,
    };
    let mut power = reference.power_dbm;
    let mut gain = 0.0;
    for &stage in chain.path_to(tap) {
        let g = stage_gain_db(stage, state, power);
        gain += g;
        power += g;
    }
    gain
}

/// Path power at `tap`: the chain reference plus accumulated gain, or the
/// dead-chain sentinel when the driving converter is off or muted.
pub fn path_power_at(chain: &ChainGraph, state: &StationState, tap: TapPoint) -> f64 {
    match tap.direction() {
        Direction::Tx => {
            if !state.main_power || !state.buc.is_powered || state.buc.is_muted {
                if tap == TapPoint::TxIf {
                    // The IF reference is upstream of the BUC and stays live.
                    return state.tx_if_reference.power_dbm;
                }
                return SENTINEL_POWER_DBM;
            }
            state.tx_if_reference.power_dbm + total_gain_to(chain, state, tap)
        }
        Direction::Rx => {
            // Taps ahead of the LNB are passive and stay live; anything
            // that needs the LNB dies with it.
            let needs_lnb = chain.path_to(tap).contains(&Stage::Lnb);
            if needs_lnb && (!state.main_power || !state.lnb.is_powered) {
                return SENTINEL_POWER_DBM;
            }
            state.rx_rf_reference.power_dbm + total_gain_to(chain, state, tap)
        }
    }
}

// ---------------------------------------------------------------------------
// Cascaded noise figure
// ---------------------------------------------------------------------------

/// Per-stage noise figure and gain pair for the Friis walk, in dB.
fn stage_noise_db(stage: Stage, state: &StationState, input_power_dbm: f64) -> (f64, f64) {
    let gain = stage_gain_db(stage, state, input_power_dbm);
    let nf = match stage {
        // Passive stages: NF equals insertion loss.
        Stage::TxFilter => state.tx_filter.insertion_loss_db,
        Stage::RxFilter => state.rx_filter.insertion_loss_db,
        Stage::Omt => 0.0,
        // The LNB dominates the receive noise figure. The up-conversion
        // stages carry no NF of their own in this model.
        Stage::Lnb => state.lnb.noise_figure_db,
        Stage::Buc | Stage::Hpa => 0.0,
    };
    (nf, gain)
}

/// Cascaded noise figure from the chain input to `tap` via the Friis
/// formula: `F = F1 + (F2 - 1)/G1 + (F3 - 1)/(G1 G2) + ...`.
///
/// A dead receive chain reports the sentinel instead of a stale cascade.
pub fn cascaded_noise_figure_to(chain: &ChainGraph, state: &StationState, tap: TapPoint) -> f64 {
    let path = chain.path_to(tap);
    if tap.direction() == Direction::Rx
        && path.contains(&Stage::Lnb)
        && (!state.main_power || !state.lnb.is_powered)
    {
        return SENTINEL_NF_DB;
    }

    let reference = match tap.direction() {
        Direction::Tx => state.tx_if_reference,
        Direction::Rx => state.rx_rf_reference,
    };
    let mut power = reference.power_dbm;
    let mut f_total = 1.0;
    let mut g_product: f64 = 1.0;
    for &stage in path {
        let (nf_db, gain_db) = stage_noise_db(stage, state, power);
        let f = db_to_linear(nf_db);
        f_total += (f - 1.0) / g_product.max(LINEAR_EPSILON);
        g_product *= db_to_linear(gain_db);
        power += gain_db;
    }
    linear_to_db(f_total)
}

// ---------------------------------------------------------------------------
// Noise floor
// ---------------------------------------------------------------------------

/// The noise floor visible at `tap` over `bandwidth_hz`.
///
/// Two candidates compete:
/// - the externally referred floor: antenna-injected noise at the chain
///   input, with the chain's gain still to be applied by the caller;
/// - the internally generated floor: the receiver's own thermal floor,
///   `-174 + 10 log10(B) + NF_cascaded`, already local to the tap.
///
/// Dominance is decided after mentally applying gain to the external
/// candidate; the internal floor is never gain-corrected a second time.
pub fn noise_floor_at(
    chain: &ChainGraph,
    state: &StationState,
    tap: TapPoint,
    bandwidth_hz: f64,
) -> NoiseFloorQuery {
    let external =
        state.antenna_noise_density_dbm_hz + 10.0 * bandwidth_hz.max(LINEAR_EPSILON).log10();
    let nf = cascaded_noise_figure_to(chain, state, tap);
    let internal = thermal_noise_floor_dbm(bandwidth_hz, nf);
    let gain = total_gain_to(chain, state, tap);

    if external + gain >= internal {
        NoiseFloorQuery {
            noise_floor_no_gain_dbm: external,
            should_apply_gain: true,
        }
    } else {
        NoiseFloorQuery {
            noise_floor_no_gain_dbm: internal,
            should_apply_gain: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Chain totals
// ---------------------------------------------------------------------------

/// Recompute both chain totals from the current module states.
pub fn calculate_signal_path(chain: &ChainGraph, state: &StationState) -> PathReport {
    PathReport {
        tx: calculate_tx_path(state),
        rx: calculate_rx_path(state),
    }
}

fn calculate_tx_path(state: &StationState) -> TxPathState {
    let reference = state.tx_if_reference;
    let rf_frequency_mhz = reference.frequency_mhz + state.buc.lo_frequency_mhz;

    if !state.main_power || !state.buc.is_powered {
        return TxPathState {
            if_frequency_mhz: reference.frequency_mhz,
            if_power_dbm: reference.power_dbm,
            rf_frequency_mhz,
            rf_power_dbm: SENTINEL_POWER_DBM,
            total_gain_db: 0.0,
        };
    }

    let mut power = reference.power_dbm;
    if state.buc.is_muted {
        // A muted BUC kills the carrier; nothing downstream recovers it.
        return TxPathState {
            if_frequency_mhz: reference.frequency_mhz,
            if_power_dbm: reference.power_dbm,
            rf_frequency_mhz,
            rf_power_dbm: SENTINEL_POWER_DBM,
            total_gain_db: 0.0,
        };
    }
    power += state.buc.gain_db;

    if state.hpa.is_powered {
        // Soft limiter: output never exceeds P1dB minus back-off.
        let ceiling = HPA_P1DB_DBM - state.hpa.back_off_db;
        power = (power + HPA_DRIVE_GAIN_DB).min(ceiling);
    }

    power -= state.tx_filter.insertion_loss_db;

    TxPathState {
        if_frequency_mhz: reference.frequency_mhz,
        if_power_dbm: reference.power_dbm,
        rf_frequency_mhz,
        rf_power_dbm: power,
        total_gain_db: power - reference.power_dbm,
    }
}

fn calculate_rx_path(state: &StationState) -> RxPathState {
    let reference = state.rx_rf_reference;
    let if_frequency_mhz = (reference.frequency_mhz - state.lnb.lo_frequency_mhz).abs();
    let is_spectrum_inverted = state.lnb.is_spectrum_inverted(reference.frequency_mhz);

    if !state.main_power || !state.lnb.is_powered {
        return RxPathState {
            rf_frequency_mhz: reference.frequency_mhz,
            rf_power_dbm: reference.power_dbm,
            if_frequency_mhz,
            if_power_dbm: SENTINEL_POWER_DBM,
            total_gain_db: 0.0,
            noise_figure_db: SENTINEL_NF_DB,
            is_spectrum_inverted: false,
        };
    }

    let mut power = reference.power_dbm;
    power -= state.rx_filter.insertion_loss_db;
    power += state.lnb.gain_db;

    // Friis with the filter as a lossy passive stage ahead of the LNB:
    // F = F_filter + (F_lnb - 1) / G_filter.
    let f_filter = db_to_linear(state.rx_filter.insertion_loss_db);
    let g_filter = db_to_linear(-state.rx_filter.insertion_loss_db);
    let f_lnb = db_to_linear(state.lnb.noise_figure_db);
    let f_total = f_filter + (f_lnb - 1.0) / g_filter.max(LINEAR_EPSILON);

    RxPathState {
        rf_frequency_mhz: reference.frequency_mhz,
        rf_power_dbm: reference.power_dbm,
        if_frequency_mhz,
        if_power_dbm: power,
        total_gain_db: power - reference.power_dbm,
        noise_figure_db: linear_to_db(f_total),
        is_spectrum_inverted,
    }
}

// ---------------------------------------------------------------------------
// Coupler output
// ---------------------------------------------------------------------------

/// What a spectrum analyzer on the coupler port at `tap` sees: the path
/// power there plus the port's coupling factor.
///
/// Asking for a tap with no coupler port is a caller bug and fails fast.
/// An inactive port is a valid switched-off state and reads as the dead
/// sentinel.
pub fn coupler_output(
    chain: &ChainGraph,
    state: &StationState,
    tap: TapPoint,
) -> Result<CouplerOutput, ChainError> {
    let (factor_db, active) = state
        .coupler
        .port_at(tap)
        .ok_or(ChainError::NoCouplerAt(tap))?;

    let frequency_mhz = match tap.direction() {
        Direction::Tx => {
            if chain.is_translated(tap) {
                state.tx_if_reference.frequency_mhz + state.buc.lo_frequency_mhz
            } else {
                state.tx_if_reference.frequency_mhz
            }
        }
        Direction::Rx => {
            if chain.is_translated(tap) {
                (state.rx_rf_reference.frequency_mhz - state.lnb.lo_frequency_mhz).abs()
            } else {
                state.rx_rf_reference.frequency_mhz
            }
        }
    };

    let power_dbm = if active {
        let path_power = path_power_at(chain, state, tap);
        if path_power <= SENTINEL_POWER_DBM {
            SENTINEL_POWER_DBM
        } else {
            path_power + factor_db
        }
    } else {
        SENTINEL_POWER_DBM
    };

    Ok(CouplerOutput {
        frequency_hz: frequency_mhz * 1.0e6,
        power_dbm,
    })
}

// ===========================================================================
// Tests
// ===========================================================================
