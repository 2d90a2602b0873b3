//! The engine's output contract.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::board::{EntityId, LaneId};

const NEW_LANE: &str = "new-lane";

/// Where a move sends its entities: an existing lane, or a fresh lane the
/// caller must materialize. The engine never invents concrete lane ids;
/// every `NewLane` in one result means a distinct lane to be created.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum MoveTarget {
    Lane(LaneId),
    NewLane,
}

impl MoveTarget {
    pub fn lane(id: impl Into<LaneId>) -> Self {
        MoveTarget::Lane(id.into())
    }

    pub fn is_new_lane(&self) -> bool {
        matches!(self, MoveTarget::NewLane)
    }

    pub fn as_lane(&self) -> Option<&LaneId> {
        match self {
            MoveTarget::Lane(id) => Some(id),
            MoveTarget::NewLane => None,
        }
    }
}

impl fmt::Display for MoveTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveTarget::Lane(id) => f.write_str(id.as_str()),
            MoveTarget::NewLane => f.write_str(NEW_LANE),
        }
    }
}

impl Serialize for MoveTarget {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MoveTarget {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(if s == NEW_LANE {
            MoveTarget::NewLane
        } else {
            MoveTarget::Lane(LaneId::new(s))
        })
    }
}

/// One recommended relocation: send `entities` to `lane`. Entity sets of
/// distinct moves in one result are always disjoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub lane: MoveTarget,
    pub entities: Vec<EntityId>,
}

impl Move {
    pub fn new(lane: MoveTarget, entities: Vec<EntityId>) -> Self {
        Move { lane, entities }
    }
}
