//! dB-domain math helpers shared by the signal path and spectrum crates.
//!
//! All chain arithmetic happens in decibels; conversions to the linear
//! domain only occur inside the Friis cascade. Logarithms are guarded so
//! they never see a non-positive argument.

/// Thermal noise density at 290 K, in dBm/Hz.
pub const THERMAL_NOISE_DBM_HZ: f64 = -174.0;

/// Reference temperature for noise figure / noise temperature conversion.
pub const REFERENCE_TEMP_K: f64 = 290.0;

/// Power reported for a dead or muted path. Low enough to render as
/// "no signal" on any realistic display scale.
pub const SENTINEL_POWER_DBM: f64 = -120.0;

/// Noise figure reported for a dead receive path.
pub const SENTINEL_NF_DB: f64 = 99.0;

/// Smallest linear value fed to `log10`. Anything at or below this is
/// treated as this floor instead of producing -inf or NaN.
pub const LINEAR_EPSILON: f64 = 1e-12;

/// Convert decibels to a linear ratio.
pub fn db_to_linear(db: f64) -> f64 {
    10.0_f64.powf(db / 10.0)
}

/// Convert a linear ratio to decibels. Non-positive inputs are clamped to
/// [`LINEAR_EPSILON`] first.
pub fn linear_to_db(linear: f64) -> f64 {
    10.0 * linear.max(LINEAR_EPSILON).log10()
}

/// Thermal noise floor in dBm for the given bandwidth and noise figure:
/// `-174 + 10*log10(B) + NF`.
pub fn thermal_noise_floor_dbm(bandwidth_hz: f64, nf_db: f64) -> f64 {
    THERMAL_NOISE_DBM_HZ + 10.0 * bandwidth_hz.max(LINEAR_EPSILON).log10() + nf_db
}

/// Equivalent noise temperature in Kelvin for a noise figure in dB:
/// `T = 290 * (F - 1)`.
pub fn noise_temperature_k(nf_db: f64) -> f64 {
    REFERENCE_TEMP_K * (db_to_linear(nf_db) - 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_linear_round_trip() {
        for db in [-30.0, -3.0, 0.0, 2.0, 10.0, 58.0] {
            let back = linear_to_db(db_to_linear(db));
            assert!((back - db).abs() < 1e-9, "round trip failed for {db}");
        }
    }

    #[test]
    fn linear_to_db_guards_non_positive() {
        assert!(linear_to_db(0.0).is_finite());
        assert!(linear_to_db(-5.0).is_finite());
        assert_eq!(linear_to_db(0.0), linear_to_db(LINEAR_EPSILON));
    }

    #[test]
    fn thermal_floor_one_megahertz() {
        // -174 + 60 + 3 = -111 dBm.
        let floor = thermal_noise_floor_dbm(1_000_000.0, 3.0);
        assert!((floor - (-111.0)).abs() < 1e-9);
    }

    #[test]
    fn thermal_floor_zero_bandwidth_is_finite() {
        assert!(thermal_noise_floor_dbm(0.0, 3.0).is_finite());
    }

    #[test]
    fn noise_temperature_typical_lnb() {
        // 0.6 dB NF is roughly 43 K.
        let t = noise_temperature_k(0.6);
        assert!(t > 40.0 && t < 46.0, "got {t}");
    }

    #[test]
    fn noise_temperature_zero_nf_is_zero() {
        assert!(noise_temperature_k(0.0).abs() < 1e-9);
    }
}
