//! The station engine: owns the module states and orchestrates the
//! four-phase tick pipeline.
//!
//! # Architecture
//!
//! The `StationEngine` owns:
//! - A [`StationState`] (all module state records)
//! - The static [`ChainGraph`] topology
//! - Per-converter [`ConverterLock`] state machines
//! - A [`SimState`] (tick counter) and an [`EventBus`]
//!
//! # Four-Phase Pipeline
//!
//! Each `step()` runs:
//! 1. **Sequence** -- power cascade (main power forces downstream modules
//!    off, HPA interlock against an unpowered BUC) and reference-lock
//!    machines; transition events are emitted here.
//! 2. **Path** -- recompute both chain totals from the module states.
//! 3. **Derive** -- refresh derived module readings (BUC output power,
//!    HPA rating/IMD/temperature) and fault transition events.
//! 4. **Bookkeeping** -- bump the tick counter, refresh the state hash.
//!
//! Callers mutate module state between ticks via [`StationEngine::state_mut`]
//! and read results through owned snapshots only.

use crate::error::ChainError;
use crate::event::{ChainEvent, EventBus};
use crate::modules::StationState;
use crate::path;
use crate::query::{CouplerOutput, NoiseFloorQuery, PathReport};
use crate::sequencer::ConverterLock;
use crate::sim::{SimState, StateHash, Ticks};
use crate::tap::{ChainGraph, Stage, TapPoint};

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// The front-end simulation engine. Orchestrates module state through the
/// four-phase tick pipeline.
#[derive(Debug)]
pub struct StationEngine {
    /// All module state records.
    state: StationState,

    /// Static chain topology.
    chain: ChainGraph,

    /// Simulation state (tick counter).
    sim: SimState,

    /// Buffered chain events, drained by the caller.
    event_bus: EventBus,

    /// Reference-lock machines for the two converters.
    buc_lock: ConverterLock,
    lnb_lock: ConverterLock,

    // -- Transition tracking for once-per-edge events --
    was_main_power: bool,
    was_overdriven: bool,
    was_omt_faulted: bool,

    /// Chain totals from the most recent step.
    last_report: PathReport,

    /// State hash from the most recent step.
    last_hash: u64,
}

impl StationEngine {
    /// Create a new engine around an initial station state.
    pub fn new(state: StationState) -> Self {
        let chain = ChainGraph::new();
        let last_report = path::calculate_signal_path(&chain, &state);
        let was_main_power = state.main_power;
        let was_omt_faulted = state.omt.is_faulted();
        Self {
            state,
            chain,
            sim: SimState::new(),
            event_bus: EventBus::new(),
            buc_lock: ConverterLock::new(),
            lnb_lock: ConverterLock::new(),
            was_main_power,
            was_overdriven: false,
            was_omt_faulted,
            last_report,
            last_hash: 0,
        }
    }

    // -----------------------------------------------------------------------
    // State access
    // -----------------------------------------------------------------------

    /// Read the module states.
    pub fn state(&self) -> &StationState {
        &self.state
    }

    /// Mutate the module states. Call between ticks only; the next
    /// `step()` re-sequences and recomputes everything derived.
    pub fn state_mut(&mut self) -> &mut StationState {
        &mut self.state
    }

    /// The static chain topology.
    pub fn chain(&self) -> &ChainGraph {
        &self.chain
    }

    /// Current tick.
    pub fn tick(&self) -> Ticks {
        self.sim.tick
    }

    // -----------------------------------------------------------------------
    // Tick pipeline
    // -----------------------------------------------------------------------

    /// Advance the simulation by one tick.
    pub fn step(&mut self) {
        self.sequence_power();
        self.last_report = path::calculate_signal_path(&self.chain, &self.state);
        self.derive_readings();
        self.sim.tick += 1;
        self.last_hash = self.compute_hash();
    }

    /// Advance the simulation by `n` ticks.
    pub fn advance(&mut self, n: u64) {
        for _ in 0..n {
            self.step();
        }
    }

    /// Phase 1: power cascade and lock machines.
    fn sequence_power(&mut self) {
        let tick = self.sim.tick;

        if !self.state.main_power {
            if self.was_main_power {
                self.event_bus.emit(ChainEvent::MainPowerLost { tick });
            }
            for (powered, stage) in [
                (&mut self.state.buc.is_powered, Stage::Buc),
                (&mut self.state.hpa.is_powered, Stage::Hpa),
                (&mut self.state.lnb.is_powered, Stage::Lnb),
            ] {
                if *powered {
                    *powered = false;
                    self.event_bus
                        .emit(ChainEvent::ModulePoweredDown { stage, tick });
                }
            }
        } else if self.state.hpa.is_powered && !self.state.buc.is_powered {
            // HPA interlock: never amplify an unpowered up-converter.
            self.state.hpa.is_powered = false;
            self.event_bus.emit(ChainEvent::HpaEnableRefused { tick });
        }
        self.was_main_power = self.state.main_power;

        let ref_present = self.state.ext_ref_present;
        if let Some(t) = self.buc_lock.update(self.state.buc.is_powered, ref_present) {
            self.event_bus.emit(lock_event(Stage::Buc, t, tick));
        }
        self.state.buc.is_ext_ref_locked = self.buc_lock.is_locked();

        if let Some(t) = self.lnb_lock.update(self.state.lnb.is_powered, ref_present) {
            self.event_bus.emit(lock_event(Stage::Lnb, t, tick));
        }
        self.state.lnb.is_ext_ref_locked = self.lnb_lock.is_locked();
    }

    /// Phase 3: derived module readings and fault transitions.
    fn derive_readings(&mut self) {
        let tick = self.sim.tick;

        self.state.buc.output_power_dbm =
            path::path_power_at(&self.chain, &self.state, TapPoint::TxRfPostBuc);

        let hpa = &mut self.state.hpa;
        hpa.output_power_dbw = if hpa.is_powered {
            hpa.rated_output_dbw()
        } else {
            0.0
        };
        hpa.imd_level_dbc = hpa.imd_level_for_back_off();
        hpa.temperature_c = hpa.temperature_for_output();

        let overdriven = hpa.is_powered && hpa.is_overdriven();
        if overdriven && !self.was_overdriven {
            self.event_bus.emit(ChainEvent::HpaOverdriven {
                back_off_db: hpa.back_off_db,
                tick,
            });
        } else if !overdriven && self.was_overdriven {
            self.event_bus.emit(ChainEvent::HpaRecovered { tick });
        }
        self.was_overdriven = overdriven;

        let faulted = self.state.omt.is_faulted();
        if faulted && !self.was_omt_faulted {
            self.event_bus.emit(ChainEvent::OmtFaulted {
                isolation_db: self.state.omt.cross_pol_isolation_db,
                tick,
            });
        } else if !faulted && self.was_omt_faulted {
            self.event_bus.emit(ChainEvent::OmtRecovered { tick });
        }
        self.was_omt_faulted = faulted;
    }

    fn compute_hash(&self) -> u64 {
        let mut h = StateHash::new();
        h.write_u64(self.sim.tick);
        let tx = &self.last_report.tx;
        h.write_f64(tx.rf_frequency_mhz);
        h.write_f64(tx.rf_power_dbm);
        h.write_f64(tx.total_gain_db);
        let rx = &self.last_report.rx;
        h.write_f64(rx.if_frequency_mhz);
        h.write_f64(rx.if_power_dbm);
        h.write_f64(rx.noise_figure_db);
        h.write_bool(rx.is_spectrum_inverted);
        h.write_bool(self.state.buc.is_ext_ref_locked);
        h.write_bool(self.state.lnb.is_ext_ref_locked);
        h.finish()
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Accumulated gain from the chain input to `tap`.
    pub fn total_gain_to(&self, tap: TapPoint) -> f64 {
        path::total_gain_to(&self.chain, &self.state, tap)
    }

    /// The noise floor visible at `tap` over `bandwidth_hz`.
    pub fn noise_floor_at(&self, tap: TapPoint, bandwidth_hz: f64) -> NoiseFloorQuery {
        path::noise_floor_at(&self.chain, &self.state, tap, bandwidth_hz)
    }

    /// Chain totals from the most recent step (owned copy).
    pub fn path_report(&self) -> PathReport {
        self.last_report
    }

    /// What the coupler port at `tap` sees.
    pub fn coupler_output(&self, tap: TapPoint) -> Result<CouplerOutput, ChainError> {
        path::coupler_output(&self.chain, &self.state, tap)
    }

    /// Take all buffered events.
    pub fn drain_events(&mut self) -> Vec<ChainEvent> {
        self.event_bus.drain()
    }

    /// Buffered events without consuming them.
    pub fn pending_events(&self) -> &[ChainEvent] {
        self.event_bus.pending()
    }

    /// Deterministic hash of the most recent step's outputs.
    pub fn state_hash(&self) -> u64 {
        self.last_hash
    }
}

fn lock_event(stage: Stage, t: crate::sequencer::LockTransition, tick: Ticks) -> ChainEvent {
    match t {
        crate::sequencer::LockTransition::Acquired => ChainEvent::RefLockAcquired { stage, tick },
        crate::sequencer::LockTransition::Lost => ChainEvent::RefLockLost { stage, tick },
    }
}

// ===========================================================================
// Tests
// ===========================================================================
