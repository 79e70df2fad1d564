//! The spectrum data processor: per-bin noise and carrier synthesis.
//!
//! Noise is layered: broadband jitter, a slow sinusoidal drift whose
//! phase and depth re-randomize every sweep (so consecutive sweeps never
//! show a coherent standing wave), fine high-frequency jitter, a weak
//! interference hump in the middle of the span, and rare impulse spikes
//! and dropouts that escape the clamp. Carriers get a Gaussian main lobe
//! in dB space with zone-dependent ripple and an exponential skirt.
//! Overlapping carriers combine by per-bin maximum, matching how the
//! strongest emitter visually dominates a real display near the floor.

use serde::{Deserialize, Serialize};

use teleport_core::query::NoiseFloorQuery;
use teleport_core::rng::SimRng;
use teleport_core::signal::Signal;

// ---------------------------------------------------------------------------
// Synthesis constants
// ---------------------------------------------------------------------------

/// Broadband noise jitter, +/- dB per bin.
const NOISE_JITTER_DB: f64 = 1.0;

/// Fine high-frequency jitter, +/- dB per bin.
const NOISE_FINE_JITTER_DB: f64 = 0.3;

/// Noise excursion clamp around the base floor, dB.
const NOISE_CLAMP_DB: f64 = 2.0;

/// Peak of the band-limited interference hump, dB.
const HUMP_PEAK_DB: f64 = 0.8;

/// Probability of an impulse spike per bin.
const SPIKE_PROBABILITY: f64 = 1.0e-4;

/// Probability of a dropout per bin.
const DROPOUT_PROBABILITY: f64 = 2.0e-4;

/// Out-of-band half-width as a multiple of the in-band half-width.
const OUT_OF_BAND_FACTOR: f64 = 2.0;

/// Gaussian skirt scale: dB down per (d^2 / 2 sigma^2) unit.
const LOBE_ROLLOFF_DB: f64 = 6.0;

/// Extra attenuation the exponential skirt tapers toward, dB.
const SKIRT_TAPER_DB: f64 = 20.0;

/// Probability of a deep null per carrier bin.
const NULL_PROBABILITY: f64 = 1.0e-3;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Display span and resolution, supplied by the analyzer UI.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpectrumConfig {
    /// Number of display bins.
    pub width: usize,
    /// Left edge of the span, Hz.
    pub min_freq_hz: f64,
    /// Right edge of the span, Hz.
    pub max_freq_hz: f64,
}

impl SpectrumConfig {
    pub fn span_hz(&self) -> f64 {
        self.max_freq_hz - self.min_freq_hz
    }

    /// Fractional bin index for a frequency, linear over the span.
    pub fn bin_of(&self, freq_hz: f64) -> f64 {
        (freq_hz - self.min_freq_hz) / self.span_hz() * self.width as f64
    }

    /// Fractional bin count covering a bandwidth.
    pub fn bins_for(&self, bandwidth_hz: f64) -> f64 {
        bandwidth_hz / self.span_hz() * self.width as f64
    }

    /// Resolution bandwidth of one display bin, Hz.
    pub fn bin_bandwidth_hz(&self) -> f64 {
        self.span_hz() / self.width as f64
    }
}

// ---------------------------------------------------------------------------
// Processor
// ---------------------------------------------------------------------------

/// Synthesizes the per-bin amplitude arrays for one tap point.
#[derive(Debug, Clone)]
pub struct SpectrumProcessor {
    config: SpectrumConfig,
    rng: SimRng,
}

impl SpectrumProcessor {
    /// Create a processor over the given span with a seeded RNG.
    pub fn new(config: SpectrumConfig, seed: u64) -> Self {
        Self {
            config,
            rng: SimRng::new(seed),
        }
    }

    pub fn config(&self) -> &SpectrumConfig {
        &self.config
    }

    /// Change the display span (analyzer retune). The RNG carries on.
    pub fn set_config(&mut self, config: SpectrumConfig) {
        self.config = config;
    }

    // -----------------------------------------------------------------------
    // Noise synthesis
    // -----------------------------------------------------------------------

    /// Generate one sweep of noise around `base_floor_dbm`.
    ///
    /// `gain_db` is added per bin when the floor is externally referred
    /// (the caller passes `Some` exactly when the core's noise-floor
    /// query said `should_apply_gain`).
    pub fn generate_noise(&mut self, base_floor_dbm: f64, gain_db: Option<f64>) -> Vec<f32> {
        let width = self.config.width;
        let mut out = vec![0.0f32; width];
        if width == 0 {
            return out;
        }

        // Drift re-randomizes per sweep so ticks never cohere.
        let drift_cycles = self.rng.range(2.0, 5.0);
        let drift_phase = self.rng.range(0.0, std::f64::consts::TAU);
        let drift_depth = self.rng.range(0.2, 0.7);

        // The interference hump is confined to the middle 20% of bins.
        let hump_lo = (width as f64 * 0.4) as usize;
        let hump_hi = (width as f64 * 0.6) as usize;

        for (i, bin) in out.iter_mut().enumerate() {
            let x = i as f64 / width as f64;
            let mut v = base_floor_dbm + self.rng.jitter(NOISE_JITTER_DB);
            v += drift_depth * (std::f64::consts::TAU * drift_cycles * x + drift_phase).sin();
            v += self.rng.jitter(NOISE_FINE_JITTER_DB);

            if (hump_lo..hump_hi).contains(&i) && hump_hi > hump_lo {
                // Raised-cosine bump across the hump zone.
                let t = (i - hump_lo) as f64 / (hump_hi - hump_lo) as f64;
                v += HUMP_PEAK_DB * 0.5 * (1.0 - (std::f64::consts::TAU * t).cos());
            }

            v = v.clamp(base_floor_dbm - NOISE_CLAMP_DB, base_floor_dbm + NOISE_CLAMP_DB);

            // Impulses and dropouts escape the clamp.
            if self.rng.chance(SPIKE_PROBABILITY) {
                v += self.rng.range(8.0, 20.0);
            } else if self.rng.chance(DROPOUT_PROBABILITY) {
                v -= self.rng.range(6.0, 12.0);
            }

            if let Some(g) = gain_db {
                v += g;
            }
            *bin = v as f32;
        }
        out
    }

    // -----------------------------------------------------------------------
    // Carrier synthesis
    // -----------------------------------------------------------------------

    /// Generate one sweep of carrier lobes. Bins no carrier reaches stay
    /// at `f32::NEG_INFINITY` so [`combine`] is a pure per-bin maximum.
    ///
    /// `tap_gain_db` shifts every carrier from its injected power to the
    /// level seen at the tap.
    pub fn generate_signals(&mut self, signals: &[Signal], tap_gain_db: f64) -> Vec<f32> {
        let width = self.config.width;
        let mut out = vec![f32::NEG_INFINITY; width];
        if width == 0 {
            return out;
        }

        for signal in signals {
            let center = self.config.bin_of(signal.frequency_hz);
            // Half-widths in bins; floor at one bin so narrow carriers
            // still render and the skirt math stays finite.
            let in_band = (self.config.bins_for(signal.bandwidth_hz) / 2.0).max(1.0);
            let out_of_band = in_band * OUT_OF_BAND_FACTOR;
            let sigma = out_of_band / 3.0;
            let peak = signal.power_dbm + tap_gain_db;

            // Synthesis reach: past twice the out-of-band width the skirt
            // has given up its full taper and the lobe is long gone.
            let reach = (out_of_band * 2.0).ceil() as i64;
            let center_i = center.round() as i64;

            for b in (center_i - reach)..=(center_i + reach) {
                if b < 0 || b >= width as i64 {
                    continue;
                }
                let d = (b as f64 - center).abs();
                let mut amp = peak - (d * d) / (2.0 * sigma * sigma) * LOBE_ROLLOFF_DB;

                if d <= in_band {
                    amp += self.rng.jitter(0.2);
                } else if d <= 0.7 * out_of_band {
                    let ripple = (std::f64::consts::TAU * 4.0 * d / out_of_band).sin();
                    amp += ripple + self.rng.jitter(0.5);
                } else if d <= out_of_band {
                    let ripple = 1.5 * (std::f64::consts::TAU * 6.0 * d / out_of_band).sin();
                    amp += ripple + self.rng.jitter(0.8);
                } else {
                    let excess = d - out_of_band;
                    let taper = 1.0 - (-excess / (0.3 * out_of_band)).exp();
                    amp -= SKIRT_TAPER_DB * taper;
                    amp += self.rng.jitter(0.8);
                }

                if self.rng.chance(NULL_PROBABILITY) {
                    amp -= self.rng.range(10.0, 14.0);
                }

                let amp = amp as f32;
                let bin = &mut out[b as usize];
                // Strongest emitter wins; lobes never sum.
                if amp > *bin {
                    *bin = amp;
                }
            }
        }
        out
    }

    // -----------------------------------------------------------------------
    // Combination
    // -----------------------------------------------------------------------

    /// Per-bin maximum of the noise and carrier arrays.
    pub fn combine(noise: &[f32], signals: &[f32]) -> Vec<f32> {
        noise
            .iter()
            .zip(signals)
            .map(|(&n, &s)| n.max(s))
            .collect()
    }

    /// The per-tick entry point: noise plus carriers for one tap.
    ///
    /// `floor` comes from the core's noise-floor query; `tap_gain_db` is
    /// `total_gain_to` for the same tap and is applied to the noise floor
    /// only when the query asks for it, and to every carrier always.
    pub fn generate_data(
        &mut self,
        signals: &[Signal],
        floor: NoiseFloorQuery,
        tap_gain_db: f64,
    ) -> Vec<f32> {
        let gain = floor.should_apply_gain.then_some(tap_gain_db);
        let noise = self.generate_noise(floor.noise_floor_no_gain_dbm, gain);
        let carriers = self.generate_signals(signals, tap_gain_db);
        Self::combine(&noise, &carriers)
    }
}

// ===========================================================================
// Tests
// ===========================================================================
