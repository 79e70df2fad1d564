//! Data-driven station loading from JSON.
//!
//! Feature-gated behind `data-loader`. Provides JSON deserialization into
//! [`StationState`] for station definitions kept in data files, with
//! per-module blocks that default to the built-in nominal equipment when
//! omitted.

use crate::modules::{
    BucState, CouplerState, FilterState, HpaState, LnbState, OmtState, PathReference, StationState,
};
use crate::signal::Polarization;
use crate::tap::TapPoint;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur during station loading.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
    #[error("invalid station definition: {0}")]
    Validation(String),
}

// ---------------------------------------------------------------------------
// JSON data structures
// ---------------------------------------------------------------------------

/// Top-level station definition for JSON deserialization. Every block is
/// optional; omitted blocks fall back to the nominal defaults.
#[derive(Debug, serde::Deserialize)]
pub struct StationData {
    #[serde(default)]
    pub main_power: bool,
    #[serde(default = "default_true")]
    pub ext_ref_present: bool,
    #[serde(default)]
    pub buc: Option<BucData>,
    #[serde(default)]
    pub hpa: Option<HpaData>,
    #[serde(default)]
    pub lnb: Option<LnbData>,
    #[serde(default)]
    pub tx_filter: Option<FilterData>,
    #[serde(default)]
    pub rx_filter: Option<FilterData>,
    #[serde(default)]
    pub omt: Option<OmtData>,
    #[serde(default)]
    pub coupler: Option<CouplerData>,
    #[serde(default)]
    pub tx_if_reference: Option<ReferenceData>,
    #[serde(default)]
    pub rx_rf_reference: Option<ReferenceData>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, serde::Deserialize)]
pub struct BucData {
    pub lo_frequency_mhz: f64,
    pub gain_db: f64,
    #[serde(default)]
    pub is_powered: bool,
    #[serde(default)]
    pub is_muted: bool,
}

#[derive(Debug, serde::Deserialize)]
pub struct HpaData {
    pub back_off_db: f64,
    #[serde(default)]
    pub is_powered: bool,
}

#[derive(Debug, serde::Deserialize)]
pub struct LnbData {
    pub lo_frequency_mhz: f64,
    pub gain_db: f64,
    pub noise_figure_db: f64,
    #[serde(default)]
    pub is_powered: bool,
}

#[derive(Debug, serde::Deserialize)]
pub struct FilterData {
    pub bandwidth_mhz: f64,
    pub insertion_loss_db: f64,
    pub center_frequency_hz: f64,
}

#[derive(Debug, serde::Deserialize)]
pub struct OmtData {
    pub tx_polarization: Polarization,
    pub rx_polarization: Polarization,
    pub cross_pol_isolation_db: f64,
}

#[derive(Debug, serde::Deserialize)]
pub struct CouplerData {
    pub tap_a: TapPoint,
    pub tap_b: TapPoint,
    pub coupling_factor_a_db: f64,
    pub coupling_factor_b_db: f64,
}

#[derive(Debug, serde::Deserialize)]
pub struct ReferenceData {
    pub frequency_mhz: f64,
    pub power_dbm: f64,
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Parse a JSON station definition and build a [`StationState`].
pub fn load_station(json: &str) -> Result<StationState, DataLoadError> {
    let data: StationData = serde_json::from_str(json)?;
    build_station(data)
}

/// Build a [`StationState`] from parsed data, validating parameter ranges.
pub fn build_station(data: StationData) -> Result<StationState, DataLoadError> {
    let mut state = StationState {
        main_power: data.main_power,
        ext_ref_present: data.ext_ref_present,
        ..StationState::default()
    };

    if let Some(buc) = data.buc {
        if buc.gain_db < 0.0 {
            return Err(DataLoadError::Validation(format!(
                "BUC gain must be non-negative, got {}",
                buc.gain_db
            )));
        }
        state.buc = BucState {
            is_powered: buc.is_powered,
            lo_frequency_mhz: buc.lo_frequency_mhz,
            gain_db: buc.gain_db,
            is_muted: buc.is_muted,
            ..BucState::default()
        };
    }

    if let Some(hpa) = data.hpa {
        if !(0.0..=10.0).contains(&hpa.back_off_db) {
            return Err(DataLoadError::Validation(format!(
                "HPA back-off must be in [0, 10] dB, got {}",
                hpa.back_off_db
            )));
        }
        state.hpa = HpaState {
            is_powered: hpa.is_powered,
            back_off_db: hpa.back_off_db,
            ..HpaState::default()
        };
    }

    if let Some(lnb) = data.lnb {
        if lnb.noise_figure_db < 0.0 {
            return Err(DataLoadError::Validation(format!(
                "LNB noise figure must be non-negative, got {}",
                lnb.noise_figure_db
            )));
        }
        state.lnb = LnbState {
            is_powered: lnb.is_powered,
            lo_frequency_mhz: lnb.lo_frequency_mhz,
            gain_db: lnb.gain_db,
            noise_figure_db: lnb.noise_figure_db,
            ..LnbState::default()
        };
    }

    if let Some(f) = data.tx_filter {
        state.tx_filter = validate_filter(f, "TX")?;
    }
    if let Some(f) = data.rx_filter {
        state.rx_filter = validate_filter(f, "RX")?;
    }

    if let Some(omt) = data.omt {
        state.omt = OmtState {
            tx_polarization: omt.tx_polarization,
            rx_polarization: omt.rx_polarization,
            cross_pol_isolation_db: omt.cross_pol_isolation_db,
        };
    }

    if let Some(c) = data.coupler {
        if c.tap_a == c.tap_b {
            return Err(DataLoadError::Validation(
                "coupler ports must tap distinct points".to_string(),
            ));
        }
        state.coupler = CouplerState::new(
            c.tap_a,
            c.coupling_factor_a_db,
            c.tap_b,
            c.coupling_factor_b_db,
        );
    }

    if let Some(r) = data.tx_if_reference {
        state.tx_if_reference = PathReference {
            frequency_mhz: r.frequency_mhz,
            power_dbm: r.power_dbm,
        };
    }
    if let Some(r) = data.rx_rf_reference {
        state.rx_rf_reference = PathReference {
            frequency_mhz: r.frequency_mhz,
            power_dbm: r.power_dbm,
        };
    }

    Ok(state)
}

fn validate_filter(f: FilterData, side: &str) -> Result<FilterState, DataLoadError> {
    if f.insertion_loss_db < 0.0 {
        return Err(DataLoadError::Validation(format!(
            "{side} filter insertion loss must be non-negative, got {}",
            f.insertion_loss_db
        )));
    }
    if f.bandwidth_mhz <= 0.0 {
        return Err(DataLoadError::Validation(format!(
            "{side} filter bandwidth must be positive, got {}",
            f.bandwidth_mhz
        )));
    }
    Ok(FilterState {
        bandwidth_mhz: f.bandwidth_mhz,
        insertion_loss_db: f.insertion_loss_db,
        center_frequency_hz: f.center_frequency_hz,
    })
}
