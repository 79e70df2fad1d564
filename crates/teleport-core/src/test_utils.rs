//! Shared test helpers for integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these
//! helpers are available in unit tests, integration tests, and benchmarks
//! (via the `test-utils` feature).

use crate::engine::StationEngine;
use crate::modules::StationState;
use crate::sequencer::POWER_UP_SETTLE_TICKS;
use crate::signal::{FecRate, Modulation, Polarization, Signal};
use crate::tap::TapPoint;

// ===========================================================================
// Station constructors
// ===========================================================================

/// A station with main power on and both converters powered.
pub fn powered_station() -> StationState {
    let mut state = StationState::default();
    state.main_power = true;
    state.buc.is_powered = true;
    state.lnb.is_powered = true;
    state
}

/// A powered station with the HPA enabled at the given back-off.
pub fn transmitting_station(back_off_db: f64) -> StationState {
    let mut state = powered_station();
    state.hpa.is_powered = true;
    state.hpa.set_back_off_db(back_off_db);
    state
}

/// An engine stepped past the power-up settle window, with the transient
/// events drained.
pub fn settled_engine(state: StationState) -> StationEngine {
    let mut engine = StationEngine::new(state);
    engine.advance(POWER_UP_SETTLE_TICKS + 2);
    engine.drain_events();
    engine
}

// ===========================================================================
// Carrier constructors
// ===========================================================================

/// A QPSK carrier of the given power at the RX feed.
pub fn rx_carrier(frequency_hz: f64, power_dbm: f64) -> Signal {
    Signal {
        frequency_hz,
        bandwidth_hz: 36.0e6,
        power_dbm,
        modulation: Modulation::Qpsk,
        fec_rate: FecRate::R3_4,
        polarization: Polarization::Horizontal,
        origin: TapPoint::RxRfPreOmt,
        is_degraded: false,
    }
}

/// A narrowband carrier, handy for marker tests.
pub fn narrow_carrier(frequency_hz: f64, bandwidth_hz: f64, power_dbm: f64) -> Signal {
    Signal {
        bandwidth_hz,
        ..rx_carrier(frequency_hz, power_dbm)
    }
}
