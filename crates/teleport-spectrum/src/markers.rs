//! Peak/marker detection over a selected trace.
//!
//! Scans a trace for local maxima standing clear of the noise floor,
//! ranks them by amplitude, and reports up to ten in stable ascending bin
//! order so markers do not shuffle on screen between sweeps.

use serde::{Deserialize, Serialize};

/// Markers must stand this far above the noise floor.
pub const MARKER_THRESHOLD_OFFSET_DB: f32 = 3.0;

/// At most this many markers per trace.
pub const MAX_MARKERS: usize = 10;

// ---------------------------------------------------------------------------
// Marker types
// ---------------------------------------------------------------------------

/// One detected peak.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    /// Display bin index.
    pub bin: usize,
    /// Trace amplitude at the bin, dB.
    pub amplitude_db: f32,
}

/// The marker list for one trace, sorted ascending by bin.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MarkerSet {
    pub markers: Vec<Marker>,
    /// Index into `markers` of the globally strongest marker.
    pub strongest_index: Option<usize>,
}

// ---------------------------------------------------------------------------
// Detection
// ---------------------------------------------------------------------------

/// Find up to [`MAX_MARKERS`] peaks strictly above
/// `noise_floor_db + MARKER_THRESHOLD_OFFSET_DB`.
///
/// Local maxima rank first; if fewer than the cap qualify, the strongest
/// remaining non-maximal bins above the threshold fill in. The result is
/// sorted ascending by bin for stable rendering.
pub fn find_peaks(amplitude: &[f32], noise_floor_db: f32) -> MarkerSet {
    let threshold = noise_floor_db + MARKER_THRESHOLD_OFFSET_DB;

    let mut maxima: Vec<Marker> = Vec::new();
    let mut flanks: Vec<Marker> = Vec::new();

    for (i, &v) in amplitude.iter().enumerate() {
        if !(v > threshold) {
            continue;
        }
        let left_ok = i == 0 || amplitude[i - 1] < v;
        let right_ok = i + 1 == amplitude.len() || amplitude[i + 1] < v;
        let marker = Marker {
            bin: i,
            amplitude_db: v,
        };
        if left_ok && right_ok {
            maxima.push(marker);
        } else {
            flanks.push(marker);
        }
    }

    maxima.sort_by(|a, b| b.amplitude_db.total_cmp(&a.amplitude_db));
    maxima.truncate(MAX_MARKERS);

    // Short of the cap: pad with the strongest non-maximal bins.
    if maxima.len() < MAX_MARKERS {
        flanks.sort_by(|a, b| b.amplitude_db.total_cmp(&a.amplitude_db));
        maxima.extend(flanks.into_iter().take(MAX_MARKERS - maxima.len()));
    }

    maxima.sort_by_key(|m| m.bin);

    let strongest_index = maxima
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.amplitude_db.total_cmp(&b.amplitude_db))
        .map(|(i, _)| i);

    MarkerSet {
        markers: maxima,
        strongest_index,
    }
}

// ===========================================================================
// Tests
// ===========================================================================
