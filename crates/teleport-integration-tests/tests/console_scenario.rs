//! End-to-end trainee-console scenario across every workspace crate.
//!
//! Walks the whole exercise a trainee would run: load a station
//! definition, power the rack, watch the locks settle, key the uplink,
//! break things (reference loss, OMT fault, overdrive), and read the
//! spectrum display at the coupler taps throughout.

use teleport_core::engine::StationEngine;
use teleport_core::event::ChainEventKind;
use teleport_core::sequencer::POWER_UP_SETTLE_TICKS;
use teleport_core::signal::{classify_signal, Modulation};
use teleport_core::tap::TapPoint;
use teleport_core::test_utils::*;
use teleport_spectrum::markers::find_peaks;
use teleport_spectrum::processor::{SpectrumConfig, SpectrumProcessor};
use teleport_spectrum::trace::{TraceEngine, TraceMode};

const STATION_JSON: &str = r#"{
    "main_power": true,
    "ext_ref_present": true,
    "buc": { "lo_frequency_mhz": 4200.0, "gain_db": 58.0, "is_powered": true },
    "hpa": { "back_off_db": 7.0 },
    "lnb": { "lo_frequency_mhz": 5150.0, "gain_db": 60.0,
             "noise_figure_db": 0.6, "is_powered": true },
    "tx_filter": { "bandwidth_mhz": 36.0, "insertion_loss_db": 2.0,
                   "center_frequency_hz": 5.8e9 },
    "rx_filter": { "bandwidth_mhz": 36.0, "insertion_loss_db": 2.0,
                   "center_frequency_hz": 3.95e9 }
}"#;

#[test]
fn trainee_console_exercise() {
    // --- Boot from the data-driven station definition ---
    let state = teleport_core::data_loader::load_station(STATION_JSON).unwrap();
    let mut engine = StationEngine::new(state);
    engine.advance(POWER_UP_SETTLE_TICKS + 1);
    assert!(engine.state().buc.is_ext_ref_locked);
    assert!(engine.state().lnb.is_ext_ref_locked);
    engine.drain_events();

    // --- Uplink totals with the HPA still cold ---
    let report = engine.path_report();
    assert!((report.tx.rf_frequency_mhz - 5800.0).abs() < 1e-9);
    assert!((report.tx.rf_power_dbm - 46.0).abs() < 1e-9);

    // --- Key the HPA and drive into the limiter ---
    engine.state_mut().hpa.is_powered = true;
    engine.state_mut().hpa.set_back_off_db(2.0);
    engine.step();
    let report = engine.path_report();
    // 48 dBm drive clamps to 48 dBm ceiling minus the 2 dB filter.
    assert!((report.tx.rf_power_dbm - 46.0).abs() < 1e-9);
    assert!(engine
        .drain_events()
        .iter()
        .any(|e| e.kind() == ChainEventKind::HpaOverdriven));

    // --- Spectrum display on the RX IF tap ---
    let config = SpectrumConfig {
        width: 400,
        min_freq_hz: 1000.0e6,
        max_freq_hz: 1400.0e6,
    };
    let mut processor = SpectrumProcessor::new(config, 2026);
    let mut traces = TraceEngine::new(400);
    traces.trace_mut(1).is_visible = true;
    traces.trace_mut(1).set_mode(TraceMode::Average);

    let carrier = rx_carrier(1.2e9, -62.0);
    let rbw = processor.config().bin_bandwidth_hz();

    for _ in 0..25 {
        engine.step();
        let floor = engine.noise_floor_at(TapPoint::RxIf, rbw);
        let gain = engine.total_gain_to(TapPoint::RxIf);
        let combined = processor.generate_data(std::slice::from_ref(&carrier), floor, gain);
        traces.update(&combined);
    }

    let floor = engine.noise_floor_at(TapPoint::RxIf, rbw);
    let gain = engine.total_gain_to(TapPoint::RxIf);
    let resolved = floor.resolved_dbm(gain);

    // The averaged trace settles onto the resolved floor away from the
    // carrier, and the marker search finds the carrier.
    let avg = traces.trace(1).amplitude();
    let quiet: f64 = avg[..30].iter().map(|&v| v as f64).sum::<f64>() / 30.0;
    assert!((quiet - resolved).abs() < 3.0, "floor at {quiet}, want {resolved}");

    let set = find_peaks(traces.trace(0).amplitude(), resolved as f32);
    let expected_bin = processor.config().bin_of(1.2e9).round() as usize;
    let strongest = set.markers[set.strongest_index.unwrap()];
    assert!(strongest.bin.abs_diff(expected_bin) <= 2);

    // --- Demod quality at the tap ---
    let quality = classify_signal(&carrier, resolved - gain);
    assert_eq!(carrier.modulation, Modulation::Qpsk);
    assert!(!quality.is_degraded, "C/N {}", quality.cn_db);

    // --- Reference loss drops both locks, spectrum keeps running ---
    engine.state_mut().ext_ref_present = false;
    engine.step();
    assert!(!engine.state().buc.is_ext_ref_locked);
    assert!(!engine.state().lnb.is_ext_ref_locked);

    // --- Rack power off: sentinels, and the coupler tap goes dark ---
    engine.state_mut().main_power = false;
    engine.step();
    let report = engine.path_report();
    assert_eq!(report.tx.rf_power_dbm, -120.0);
    assert_eq!(report.rx.noise_figure_db, 99.0);

    let tap = engine.state().coupler.tap_a;
    let out = engine.coupler_output(tap).unwrap();
    assert_eq!(out.power_dbm, -120.0);
}

#[test]
fn friis_budget_matches_hand_calculation() {
    // 2 dB filter ahead of a 0.6 dB LNB: the classic two-stage budget.
    let engine = settled_engine(powered_station());
    let nf = engine.path_report().rx.noise_figure_db;

    // F = 10^(2/10) + (10^(0.6/10) - 1) / 10^(-2/10)
    let f = 10f64.powf(0.2) + (10f64.powf(0.06) - 1.0) / 10f64.powf(-0.2);
    let expected = 10.0 * f.log10();
    assert!((nf - expected).abs() < 1e-6, "got {nf}, want {expected}");
    // Sanity: the filter loss dominates the front of the budget.
    assert!(nf > 2.0 && nf < 3.5);
}

#[test]
fn degraded_uplink_is_visible_end_to_end() {
    // Mute the BUC mid-run: the TX coupler tap reads dead and the
    // spectrum synthesizer shows floor only.
    let mut engine = settled_engine(transmitting_station(7.0));
    engine.state_mut().buc.is_muted = true;
    engine.step();

    let tx_tap = engine.state().coupler.tap_a;
    assert_eq!(engine.coupler_output(tx_tap).unwrap().power_dbm, -120.0);

    let config = SpectrumConfig {
        width: 256,
        min_freq_hz: 5.78e9,
        max_freq_hz: 5.82e9,
    };
    let mut processor = SpectrumProcessor::new(config, 7);
    let floor = engine.noise_floor_at(tx_tap, processor.config().bin_bandwidth_hz());
    let gain = engine.total_gain_to(tx_tap);
    // No carriers reach the tap; the display is floor everywhere.
    let combined = processor.generate_data(&[], floor, gain);
    let resolved = floor.resolved_dbm(gain);
    for &v in &combined {
        assert!((v as f64 - resolved).abs() < 25.0);
    }
}
