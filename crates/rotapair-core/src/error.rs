//! Error types for the rotation engine.

use thiserror::Error;

/// The explicit no-solution marker: the board is structurally impossible
/// to arrange, because the non-locked lanes demand more survivors than the
/// available entities can supply.
///
/// Callers must distinguish this from an empty move list, which means the
/// board is already optimally arranged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no valid arrangement: {lanes} non-locked lanes cannot be staffed by {people} entities")]
pub struct Infeasible {
    /// Number of non-locked lanes demanding occupants.
    pub lanes: usize,
    /// Number of entities available for placement.
    pub people: usize,
}
