//! Rotapair Core - Board snapshot types for the lane rotation engine
//!
//! This crate provides the data model shared by every algorithm:
//! - Board snapshot types (entities, lanes, locations)
//! - History entries keyed by time bucket, and the bounded history window
//! - The `Move` output contract
//! - `RotationScore`, the two-level cost of a candidate arrangement
//!
//! Everything here is pure data plus derived views. Nothing in this crate
//! performs I/O or mutates an input snapshot.

pub mod board;
pub mod error;
pub mod history;
pub mod moves;
pub mod score;

pub use board::{Affinities, Board, Entity, EntityId, EntityKind, Lane, LaneId, Location};
pub use error::Infeasible;
pub use history::{window, BucketId, HistoryEntry};
pub use moves::{Move, MoveTarget};
pub use score::RotationScore;
