//! Spectrum synthesis and trace math for the ground-station analyzer.
//!
//! Consumes the chain totals computed by `teleport-core` (noise floor,
//! gain to a tap point) plus the externally supplied carrier list, and
//! procedurally generates the per-bin amplitude array a trainee would see
//! on a real spectrum analyzer. Hold-mode traces and peak markers sit on
//! top of the combined array.
//!
//! Amplitude synthesis is a stylized approximation, not an FFT: shapes
//! and jitter are tuned to look right on a training display. A seeded
//! [`teleport_core::rng::SimRng`] makes every array reproducible in
//! tests.
//!
//! # Per-tick flow
//!
//! ```ignore
//! engine.step();
//! let floor = engine.noise_floor_at(tap, rbw);
//! let gain = engine.total_gain_to(tap);
//! let combined = processor.generate_data(&signals, floor, gain);
//! traces.update(&combined);
//! let markers = find_peaks(traces.trace(0).amplitude(), floor_db);
//! ```

pub mod markers;
pub mod processor;
pub mod sweep;
pub mod trace;
