//! Tap points and the static chain topology.
//!
//! The front end is two directed chains (transmit and receive) over a
//! fixed set of tap points. Each stage occupies the span between two
//! adjacent tap points, so "what is the state of the signal at tap X"
//! reduces to walking the stages between the chain's physical input and X.
//! The set of tap points and stages is closed and known at compile time,
//! so the topology is a table, not a mutable node arena.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

/// Which directed chain a tap point belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Uplink: IF input through BUC/HPA out to the antenna feed.
    Tx,
    /// Downlink: antenna feed through LNB down to IF.
    Rx,
}

// ---------------------------------------------------------------------------
// Tap points
// ---------------------------------------------------------------------------

/// A named location in the signal chain where power and frequency can be
/// queried or physically sampled by a coupler.
///
/// Ordered along the two chains: `TxIf` and `RxRfPreOmt` are the physical
/// inputs of their respective chains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TapPoint {
    /// Transmit IF input, ahead of the up-converter.
    TxIf,
    /// Transmit RF after the block up-converter.
    TxRfPostBuc,
    /// Transmit RF after the high-power amplifier.
    TxRfPostHpa,
    /// Transmit RF after the TX filter and duplexer, at the antenna feed.
    TxRfPostOmt,
    /// Receive RF at the antenna feed, ahead of the duplexer.
    RxRfPreOmt,
    /// Receive RF after the duplexer.
    RxRfPostOmt,
    /// Receive RF after the low-noise block's amplifier stage.
    RxRfPostLna,
    /// Receive IF output, after down-conversion.
    RxIf,
}

impl TapPoint {
    /// All tap points, chain order within each direction.
    pub const ALL: [TapPoint; 8] = [
        TapPoint::TxIf,
        TapPoint::TxRfPostBuc,
        TapPoint::TxRfPostHpa,
        TapPoint::TxRfPostOmt,
        TapPoint::RxRfPreOmt,
        TapPoint::RxRfPostOmt,
        TapPoint::RxRfPostLna,
        TapPoint::RxIf,
    ];

    /// Which chain this tap point sits on.
    pub fn direction(self) -> Direction {
        match self {
            TapPoint::TxIf
            | TapPoint::TxRfPostBuc
            | TapPoint::TxRfPostHpa
            | TapPoint::TxRfPostOmt => Direction::Tx,
            TapPoint::RxRfPreOmt
            | TapPoint::RxRfPostOmt
            | TapPoint::RxRfPostLna
            | TapPoint::RxIf => Direction::Rx,
        }
    }

    /// Whether this tap point carries IF (true) or RF (false).
    pub fn is_if_domain(self) -> bool {
        matches!(self, TapPoint::TxIf | TapPoint::RxIf)
    }
}

// ---------------------------------------------------------------------------
// Stages
// ---------------------------------------------------------------------------

/// A stage of the chain. Each stage occupies the span between two adjacent
/// tap points; the OMT appears on both chains (its through path is
/// lossless, only cross-pol leakage is modeled).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    Buc,
    Hpa,
    TxFilter,
    Omt,
    RxFilter,
    Lnb,
}

// ---------------------------------------------------------------------------
// Chain topology
// ---------------------------------------------------------------------------

/// The static topology of the front end.
///
/// `path_to` answers "which stages sit strictly between the chain's
/// physical input and this tap point", which is all the signal-path
/// manager needs for gain and noise accumulation.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChainGraph;

impl ChainGraph {
    pub fn new() -> Self {
        Self
    }

    /// Stages strictly between the chain origin and `tap`, in signal order.
    ///
    /// Origin tap points (`TxIf`, `RxRfPreOmt`) have empty paths.
    pub fn path_to(&self, tap: TapPoint) -> &'static [Stage] {
        match tap {
            TapPoint::TxIf => &[],
            TapPoint::TxRfPostBuc => &[Stage::Buc],
            TapPoint::TxRfPostHpa => &[Stage::Buc, Stage::Hpa],
            TapPoint::TxRfPostOmt => &[Stage::Buc, Stage::Hpa, Stage::TxFilter, Stage::Omt],
            TapPoint::RxRfPreOmt => &[],
            TapPoint::RxRfPostOmt => &[Stage::Omt],
            TapPoint::RxRfPostLna => &[Stage::Omt, Stage::RxFilter, Stage::Lnb],
            // The IF run from the LNB output carries no further stages.
            TapPoint::RxIf => &[Stage::Omt, Stage::RxFilter, Stage::Lnb],
        }
    }

    /// Whether the signal at `tap` has already passed through the
    /// frequency-translating stage of its chain.
    ///
    /// On receive, the LNB's gain is applied at its amplifier stage
    /// (`RxRfPostLna` is still RF) but the mixer only translates on the
    /// way to `RxIf`.
    pub fn is_translated(&self, tap: TapPoint) -> bool {
        match tap.direction() {
            Direction::Tx => self.path_to(tap).contains(&Stage::Buc),
            Direction::Rx => tap == TapPoint::RxIf,
        }
    }
}
