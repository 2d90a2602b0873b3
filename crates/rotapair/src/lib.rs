//! Rotapair - history-aware pairing board recommendations
//!
//! Hand the engine a board snapshot and the recent history, get back the
//! minimal-repetition set of moves.
//!
//! # Example
//!
//! ```rust
//! use rotapair::prelude::*;
//!
//! let board = Board::new(
//!     vec![
//!         Entity::new("ada", EntityKind::Person, Location::Unassigned),
//!         Entity::new("lin", EntityKind::Person, Location::Unassigned),
//!         Entity::new("mel", EntityKind::Person, Location::Unassigned),
//!     ],
//!     vec![],
//! );
//!
//! // Three unassigned people split across two fresh lanes.
//! let moves = best_pairing(&board, &[]).unwrap();
//! assert_eq!(moves.len(), 2);
//! assert!(moves.iter().all(|m| m.lane.is_new_lane()));
//! ```

// Board and history snapshot types
pub use rotapair_core::{
    Affinities, Board, BucketId, Entity, EntityId, EntityKind, HistoryEntry, Lane, LaneId,
    Location, Move, MoveTarget, RotationScore,
};

// The explicit no-solution marker
pub use rotapair_core::Infeasible;

// Engine entry points
pub use rotapair_engine::{
    best_assignment, best_pairing, candidate_assignments, moves_from_grouping,
    CandidateAssignments, Group, Grouping, Recommender,
};

// Tuning
pub use rotapair_config::{ConfigError, EngineConfig};

pub mod prelude {
    pub use super::{
        best_assignment, best_pairing, Board, BucketId, Entity, EntityKind, HistoryEntry,
        Infeasible, Lane, Location, Move, MoveTarget, Recommender,
    };
    pub use super::EngineConfig;
}
