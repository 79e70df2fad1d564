//! Analyzer sweep demo: renders an ASCII spectrum of a QPSK carrier over
//! the synthesized noise floor at the RX IF tap.
//!
//! Run with: `cargo run -p teleport-spectrum --example analyzer_sweep`

use teleport_core::engine::StationEngine;
use teleport_core::modules::StationState;
use teleport_core::signal::{FecRate, Modulation, Polarization, Signal};
use teleport_core::tap::TapPoint;
use teleport_spectrum::markers::find_peaks;
use teleport_spectrum::processor::{SpectrumConfig, SpectrumProcessor};
use teleport_spectrum::trace::TraceEngine;

fn main() {
    let mut state = StationState::default();
    state.main_power = true;
    state.buc.is_powered = true;
    state.lnb.is_powered = true;
    let mut engine = StationEngine::new(state);
    engine.advance(6);

    let config = SpectrumConfig {
        width: 72,
        min_freq_hz: 1.0e9,
        max_freq_hz: 1.4e9,
    };
    let mut processor = SpectrumProcessor::new(config, 42);
    let mut traces = TraceEngine::new(72);

    let carrier = Signal {
        frequency_hz: 1.2e9,
        bandwidth_hz: 36.0e6,
        power_dbm: -70.0,
        modulation: Modulation::Qpsk,
        fec_rate: FecRate::R3_4,
        polarization: Polarization::Horizontal,
        origin: TapPoint::RxRfPreOmt,
        is_degraded: false,
    };

    let rbw = processor.config().bin_bandwidth_hz();
    for _ in 0..10 {
        engine.step();
        let floor = engine.noise_floor_at(TapPoint::RxIf, rbw);
        let gain = engine.total_gain_to(TapPoint::RxIf);
        let combined = processor.generate_data(std::slice::from_ref(&carrier), floor, gain);
        traces.update(&combined);
    }

    let amps = traces.trace(0).amplitude();
    let floor = engine.noise_floor_at(TapPoint::RxIf, rbw);
    let resolved = floor.resolved_dbm(engine.total_gain_to(TapPoint::RxIf));

    // 16-row ASCII waterfall column chart.
    let top = resolved + 60.0;
    for row in 0..16 {
        let level = top - (row as f64) * (top - (resolved - 4.0)) / 16.0;
        let line: String = amps
            .iter()
            .map(|&v| if v as f64 >= level { '#' } else { ' ' })
            .collect();
        println!("{level:>7.1} |{line}");
    }
    println!("        +{}", "-".repeat(72));

    let set = find_peaks(amps, resolved as f32);
    for marker in &set.markers {
        println!("marker: bin {:>3} at {:.1} dBm", marker.bin, marker.amplitude_db);
    }
}
