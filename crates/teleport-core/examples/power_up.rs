//! Power-up walkthrough: cold rack to a transmitting chain.
//!
//! Powers the rack, waits for the converters to lock, keys the HPA, and
//! prints the chain totals and coupler tap after each phase.
//!
//! Run with: `cargo run -p teleport-core --example power_up`

use teleport_core::engine::StationEngine;
use teleport_core::modules::StationState;
use teleport_core::sequencer::POWER_UP_SETTLE_TICKS;
use teleport_core::tap::TapPoint;

fn main() {
    let mut engine = StationEngine::new(StationState::default());

    // --- Step 1: everything cold ---
    engine.step();
    print_chain("cold", &engine);

    // --- Step 2: rack power and converters on ---
    {
        let state = engine.state_mut();
        state.main_power = true;
        state.buc.is_powered = true;
        state.lnb.is_powered = true;
    }
    engine.advance(POWER_UP_SETTLE_TICKS + 1);
    for event in engine.drain_events() {
        println!("event: {event:?}");
    }
    print_chain("locked", &engine);

    // --- Step 3: key the HPA at 7 dB back-off ---
    engine.state_mut().hpa.is_powered = true;
    engine.step();
    print_chain("transmitting", &engine);

    // --- Step 4: read the coupler taps ---
    for tap in [TapPoint::TxRfPostHpa, TapPoint::RxRfPostLna] {
        match engine.coupler_output(tap) {
            Ok(out) => println!(
                "coupler at {tap:?}: {:.1} MHz, {:.1} dBm",
                out.frequency_hz / 1.0e6,
                out.power_dbm
            ),
            Err(err) => println!("coupler at {tap:?}: {err}"),
        }
    }
}

fn print_chain(label: &str, engine: &StationEngine) {
    let report = engine.path_report();
    println!("--- {label} (tick {}) ---", engine.tick());
    println!(
        "  TX: {:.0} MHz, {:.1} dBm, gain {:.1} dB",
        report.tx.rf_frequency_mhz, report.tx.rf_power_dbm, report.tx.total_gain_db
    );
    println!(
        "  RX: IF {:.0} MHz, {:.1} dBm, NF {:.2} dB",
        report.rx.if_frequency_mhz, report.rx.if_power_dbm, report.rx.noise_figure_db
    );
}
