//! Headless console runner: drives a full station through the tick loop
//! and prints end-of-run chain and trace statistics.
//!
//! Run with: `cargo run -p teleport-console -- run --ticks 200 --seed 42`

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use teleport_core::engine::StationEngine;
use teleport_core::modules::StationState;
use teleport_core::signal::{FecRate, Modulation, Polarization, Signal};
use teleport_core::tap::TapPoint;
use teleport_spectrum::markers::find_peaks;
use teleport_spectrum::processor::{SpectrumConfig, SpectrumProcessor};
use teleport_spectrum::sweep::SweepTimer;
use teleport_spectrum::trace::TraceEngine;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            ticks,
            seed,
            width,
            station,
            sweep_interval,
        } => run(ticks, seed, width, station.as_deref(), sweep_interval),
    }
}

fn run(
    ticks: u64,
    seed: u64,
    width: usize,
    station: Option<&std::path::Path>,
    sweep_interval: u64,
) -> Result<(), Box<dyn std::error::Error>> {
    let state = match station {
        Some(path) => {
            tracing::info!(?path, "loading station definition");
            let json = std::fs::read_to_string(path)?;
            teleport_core::data_loader::load_station(&json)?
        }
        None => default_station(),
    };

    let mut engine = StationEngine::new(state);
    let mut processor = SpectrumProcessor::new(
        SpectrumConfig {
            width,
            min_freq_hz: 950.0e6,
            max_freq_hz: 1450.0e6,
        },
        seed,
    );
    let mut traces = TraceEngine::new(width);
    traces.trace_mut(1).is_visible = true;
    let mut timer = SweepTimer::new(sweep_interval);

    let carriers: Vec<Signal> = vec![Signal {
        frequency_hz: 1.2e9,
        bandwidth_hz: 36.0e6,
        power_dbm: -60.0,
        modulation: Modulation::Qpsk,
        fec_rate: FecRate::R3_4,
        polarization: Polarization::Horizontal,
        origin: TapPoint::RxRfPreOmt,
        is_degraded: false,
    }];
    let rbw = processor.config().bin_bandwidth_hz();
    let tap = TapPoint::RxIf;

    tracing::info!(ticks, seed, width, "starting run");
    for _ in 0..ticks {
        engine.step();
        for event in engine.drain_events() {
            tracing::info!(?event, "chain event");
        }
        if timer.try_sweep(engine.tick()) {
            let floor = engine.noise_floor_at(tap, rbw);
            let gain = engine.total_gain_to(tap);
            let combined = processor.generate_data(&carriers, floor, gain);
            traces.update(&combined);
        }
    }

    let report = engine.path_report();
    println!("=== chain after {ticks} ticks ===");
    println!(
        "TX: {:.1} MHz at {:.1} dBm (gain {:.1} dB)",
        report.tx.rf_frequency_mhz, report.tx.rf_power_dbm, report.tx.total_gain_db
    );
    println!(
        "RX: IF {:.1} MHz at {:.1} dBm, NF {:.2} dB{}",
        report.rx.if_frequency_mhz,
        report.rx.if_power_dbm,
        report.rx.noise_figure_db,
        if report.rx.is_spectrum_inverted {
            " (inverted)"
        } else {
            ""
        }
    );

    let floor = engine.noise_floor_at(tap, rbw);
    let resolved = floor.resolved_dbm(engine.total_gain_to(tap));
    println!("noise floor at {tap:?}: {resolved:.1} dBm/bin");

    for idx in [0usize, 1] {
        let trace = traces.trace(idx);
        let amps = trace.amplitude();
        let finite: Vec<f64> = amps
            .iter()
            .map(|&v| v as f64)
            .filter(|v| v.is_finite())
            .collect();
        if finite.is_empty() {
            continue;
        }
        let mean = finite.iter().sum::<f64>() / finite.len() as f64;
        let max = finite.iter().cloned().fold(f64::MIN, f64::max);
        println!(
            "trace {idx} ({:?}): mean {mean:.1} dB, max {max:.1} dB",
            trace.mode()
        );
    }

    let set = find_peaks(traces.trace(0).amplitude(), resolved as f32);
    for marker in &set.markers {
        println!("marker: bin {} at {:.1} dB", marker.bin, marker.amplitude_db);
    }
    println!("state hash: {:#018x}", engine.state_hash());

    Ok(())
}

/// A transmitting station with nominal C-band equipment.
fn default_station() -> StationState {
    let mut state = StationState::default();
    state.main_power = true;
    state.buc.is_powered = true;
    state.lnb.is_powered = true;
    state.hpa.is_powered = true;
    state.hpa.set_back_off_db(7.0);
    state
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless ground-station chain runner", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the tick loop and print chain and trace statistics.
    Run {
        /// Number of simulation ticks to run.
        #[arg(long, default_value_t = 200)]
        ticks: u64,
        /// RNG seed for the spectrum synthesizer.
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// Display width in bins.
        #[arg(long, default_value_t = 512)]
        width: usize,
        /// Optional JSON station definition.
        #[arg(long)]
        station: Option<PathBuf>,
        /// Minimum ticks between display sweeps.
        #[arg(long, default_value_t = 2)]
        sweep_interval: u64,
    },
}
