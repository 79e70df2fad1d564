//! Carrier descriptions and demod-quality classification.
//!
//! [`Signal`] is a value type produced by external equipment (antenna or
//! transmitter simulation) once per tick and consumed read-only by the
//! spectrum synthesizer. Carrier-to-noise classification lives here so
//! downstream demodulator evaluation and the spectrum display agree on
//! what "degraded" means.

use serde::{Deserialize, Serialize};

use crate::tap::TapPoint;

// ---------------------------------------------------------------------------
// Modulation and coding
// ---------------------------------------------------------------------------

/// Carrier modulation scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Modulation {
    Bpsk,
    Qpsk,
    Qam8,
    Qam16,
}

impl Modulation {
    /// Minimum C/N in dB for a decodable carrier. Below this the signal
    /// is classified as degraded.
    pub fn cn_threshold_db(self) -> f64 {
        match self {
            Modulation::Bpsk => 7.0,
            Modulation::Qpsk => 10.0,
            Modulation::Qam8 => 13.0,
            Modulation::Qam16 => 16.0,
        }
    }
}

/// Forward error correction rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FecRate {
    R1_2,
    R2_3,
    R3_4,
    R5_6,
    R7_8,
}

impl FecRate {
    /// The code rate as a ratio in (0, 1).
    pub fn as_ratio(self) -> f64 {
        match self {
            FecRate::R1_2 => 1.0 / 2.0,
            FecRate::R2_3 => 2.0 / 3.0,
            FecRate::R3_4 => 3.0 / 4.0,
            FecRate::R5_6 => 5.0 / 6.0,
            FecRate::R7_8 => 7.0 / 8.0,
        }
    }
}

/// Antenna feed polarization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Polarization {
    Horizontal,
    Vertical,
    Lhcp,
    Rhcp,
}

// ---------------------------------------------------------------------------
// Signal
// ---------------------------------------------------------------------------

/// A carrier visible somewhere in the chain. Immutable for the duration of
/// a tick; the origin tap point records where external equipment injected
/// it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub frequency_hz: f64,
    pub bandwidth_hz: f64,
    pub power_dbm: f64,
    pub modulation: Modulation,
    pub fec_rate: FecRate,
    pub polarization: Polarization,
    pub origin: TapPoint,
    pub is_degraded: bool,
}

// ---------------------------------------------------------------------------
// C/N classification
// ---------------------------------------------------------------------------

/// Result of classifying a carrier against the noise floor at its tap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalQuality {
    /// Carrier-to-noise ratio in dB.
    pub cn_db: f64,
    /// True when C/N is below the modulation's decode threshold.
    pub is_degraded: bool,
}

/// Classify a carrier: `C/N = power - noise floor`, compared against the
/// modulation-specific decode threshold.
pub fn classify_signal(signal: &Signal, noise_floor_dbm: f64) -> SignalQuality {
    let cn_db = signal.power_dbm - noise_floor_dbm;
    SignalQuality {
        cn_db,
        is_degraded: cn_db < signal.modulation.cn_threshold_db(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn carrier(power_dbm: f64, modulation: Modulation) -> Signal {
        Signal {
            frequency_hz: 1_550_000_000.0,
            bandwidth_hz: 36_000_000.0,
            power_dbm,
            modulation,
            fec_rate: FecRate::R3_4,
            polarization: Polarization::Horizontal,
            origin: TapPoint::RxRfPreOmt,
            is_degraded: false,
        }
    }

    #[test]
    fn thresholds_increase_with_order() {
        assert!(Modulation::Bpsk.cn_threshold_db() < Modulation::Qpsk.cn_threshold_db());
        assert!(Modulation::Qpsk.cn_threshold_db() < Modulation::Qam8.cn_threshold_db());
        assert!(Modulation::Qam8.cn_threshold_db() < Modulation::Qam16.cn_threshold_db());
    }

    #[test]
    fn qpsk_above_threshold_is_clean() {
        let sig = carrier(-70.0, Modulation::Qpsk);
        let q = classify_signal(&sig, -85.0);
        assert!((q.cn_db - 15.0).abs() < 1e-9);
        assert!(!q.is_degraded);
    }

    #[test]
    fn qpsk_below_threshold_is_degraded() {
        let sig = carrier(-80.0, Modulation::Qpsk);
        let q = classify_signal(&sig, -85.0);
        assert!((q.cn_db - 5.0).abs() < 1e-9);
        assert!(q.is_degraded);
    }

    #[test]
    fn same_cn_different_modulation() {
        // 12 dB C/N decodes QPSK but not 8QAM.
        let floor = -82.0;
        let qpsk = classify_signal(&carrier(-70.0, Modulation::Qpsk), floor);
        let qam8 = classify_signal(&carrier(-70.0, Modulation::Qam8), floor);
        assert!(!qpsk.is_degraded);
        assert!(qam8.is_degraded);
    }

    #[test]
    fn exactly_at_threshold_is_not_degraded() {
        let sig = carrier(-75.0, Modulation::Bpsk);
        let q = classify_signal(&sig, -82.0);
        assert!((q.cn_db - 7.0).abs() < 1e-9);
        assert!(!q.is_degraded);
    }

    #[test]
    fn fec_ratios_ascend() {
        let rates = [
            FecRate::R1_2,
            FecRate::R2_3,
            FecRate::R3_4,
            FecRate::R5_6,
            FecRate::R7_8,
        ];
        for pair in rates.windows(2) {
            assert!(pair[0].as_ratio() < pair[1].as_ratio());
        }
    }
}
