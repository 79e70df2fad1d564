//! Integration tests wiring the chain engine to the spectrum synthesizer,
//! the trace engine, and the markers, the way the analyzer display does
//! it each tick.

use teleport_core::tap::TapPoint;
use teleport_core::test_utils::*;
use teleport_spectrum::markers::find_peaks;
use teleport_spectrum::processor::{SpectrumConfig, SpectrumProcessor};
use teleport_spectrum::sweep::SweepTimer;
use teleport_spectrum::trace::TraceEngine;

fn rx_if_config() -> SpectrumConfig {
    SpectrumConfig {
        width: 512,
        min_freq_hz: 950.0e6,
        max_freq_hz: 1450.0e6,
    }
}

#[test]
fn full_tick_loop_renders_a_carrier() {
    let mut engine = settled_engine(powered_station());
    let mut processor = SpectrumProcessor::new(rx_if_config(), 4242);
    let mut traces = TraceEngine::new(512);

    // A -40 dBm carrier at the 1200 MHz IF center.
    let carrier = rx_carrier(1.2e9, -40.0);
    let rbw = processor.config().bin_bandwidth_hz();

    for _ in 0..20 {
        engine.step();
        let floor = engine.noise_floor_at(TapPoint::RxIf, rbw);
        let gain = engine.total_gain_to(TapPoint::RxIf);
        let combined =
            processor.generate_data(std::slice::from_ref(&carrier), floor, gain);
        traces.update(&combined);
    }

    let live = traces.trace(0).amplitude();
    let center = processor.config().bin_of(1.2e9).round() as usize;
    assert!(live[center] > -45.0, "carrier bin at {}", live[center]);

    // The floor far from the carrier sits where the core said it would
    // (averaged over a quiet window so a stray impulse cannot skew it).
    let floor = engine.noise_floor_at(TapPoint::RxIf, rbw);
    let resolved = floor.resolved_dbm(engine.total_gain_to(TapPoint::RxIf));
    let quiet: f64 = live[..30].iter().map(|&v| v as f64).sum::<f64>() / 30.0;
    assert!((quiet - resolved).abs() < 3.0, "floor at {quiet}, want {resolved}");
}

#[test]
fn maxhold_accumulates_across_sweeps() {
    let mut engine = settled_engine(powered_station());
    let mut processor = SpectrumProcessor::new(rx_if_config(), 99);
    let mut traces = TraceEngine::new(512);
    traces.trace_mut(1).is_visible = true;

    let rbw = processor.config().bin_bandwidth_hz();
    let mut prev = traces.trace(1).snapshot();
    for _ in 0..30 {
        engine.step();
        let floor = engine.noise_floor_at(TapPoint::RxIf, rbw);
        let gain = engine.total_gain_to(TapPoint::RxIf);
        let combined = processor.generate_data(&[], floor, gain);
        traces.update(&combined);

        for (p, n) in prev.iter().zip(traces.trace(1).amplitude()) {
            assert!(n >= p, "maxhold decreased");
        }
        prev = traces.trace(1).snapshot();
    }

    // After 30 noisy sweeps the max-hold envelope rides above the live
    // trace almost everywhere.
    let above = traces
        .trace(1)
        .amplitude()
        .iter()
        .zip(traces.trace(0).amplitude())
        .filter(|(h, l)| h >= l)
        .count();
    assert!(above > 500);
}

#[test]
fn markers_find_the_strongest_carriers() {
    let mut engine = settled_engine(powered_station());
    let mut processor = SpectrumProcessor::new(rx_if_config(), 7);
    let rbw = processor.config().bin_bandwidth_hz();

    engine.step();
    let floor = engine.noise_floor_at(TapPoint::RxIf, rbw);
    let gain = engine.total_gain_to(TapPoint::RxIf);
    let resolved = floor.resolved_dbm(gain) as f32;

    let carriers = [
        narrow_carrier(1.05e9, 4.0e6, -60.0),
        narrow_carrier(1.20e9, 4.0e6, -45.0),
        narrow_carrier(1.35e9, 4.0e6, -52.0),
    ];
    let combined = processor.generate_data(&carriers, floor, gain);
    let set = find_peaks(&combined, resolved);

    assert!(!set.markers.is_empty());
    // The strongest marker lands on the -45 dBm carrier at 1200 MHz.
    let strongest = set.markers[set.strongest_index.unwrap()];
    let expected_bin = processor.config().bin_of(1.20e9).round() as usize;
    assert!(
        strongest.bin.abs_diff(expected_bin) <= 2,
        "strongest at bin {}, expected near {}",
        strongest.bin,
        expected_bin
    );
    // Markers come back in display order.
    for pair in set.markers.windows(2) {
        assert!(pair[0].bin < pair[1].bin);
    }
}

#[test]
fn sweep_timer_limits_refresh_rate() {
    let mut engine = settled_engine(powered_station());
    let mut processor = SpectrumProcessor::new(rx_if_config(), 55);
    let mut traces = TraceEngine::new(512);
    let mut timer = SweepTimer::new(4);
    let rbw = processor.config().bin_bandwidth_hz();

    let mut sweeps = 0;
    for _ in 0..40 {
        engine.step();
        if timer.try_sweep(engine.tick()) {
            let floor = engine.noise_floor_at(TapPoint::RxIf, rbw);
            let gain = engine.total_gain_to(TapPoint::RxIf);
            let combined = processor.generate_data(&[], floor, gain);
            traces.update(&combined);
            sweeps += 1;
        }
    }
    assert_eq!(sweeps, 10);
}

#[test]
fn seeded_pipeline_is_fully_deterministic() {
    let run = || {
        let mut engine = settled_engine(powered_station());
        let mut processor = SpectrumProcessor::new(rx_if_config(), 1234);
        let mut traces = TraceEngine::new(512);
        traces.trace_mut(1).is_visible = true;
        let carrier = rx_carrier(1.2e9, -40.0);
        let rbw = processor.config().bin_bandwidth_hz();
        for _ in 0..15 {
            engine.step();
            let floor = engine.noise_floor_at(TapPoint::RxIf, rbw);
            let gain = engine.total_gain_to(TapPoint::RxIf);
            let combined =
                processor.generate_data(std::slice::from_ref(&carrier), floor, gain);
            traces.update(&combined);
        }
        (engine.state_hash(), traces.trace(1).snapshot())
    };

    let (hash_a, trace_a) = run();
    let (hash_b, trace_b) = run();
    assert_eq!(hash_a, hash_b);
    assert_eq!(trace_a, trace_b);
}
