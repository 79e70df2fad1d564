//! Error types for chain queries.
//!
//! Only configuration mistakes are errors: asking for a coupler port that
//! does not exist, or loading an invalid station definition. Degraded
//! physical states (powered-off chain, unlocked reference, muted BUC,
//! overdriven HPA) are represented as sentinel or derived values in the
//! data model and never raise errors.

use crate::tap::TapPoint;

/// Errors raised by chain queries. These indicate a programming mistake in
/// the caller, not a runtime condition to recover from.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChainError {
    /// The requested tap point has no coupler port wired to it.
    #[error("no coupler port at tap point {0:?}")]
    NoCouplerAt(TapPoint),
}
