//! Board snapshot types.
//!
//! A [`Board`] is a read-only snapshot of the current arrangement: entities
//! with a location each, and lanes that may be locked. Lane occupancy is
//! derived from entity locations, never stored. Malformed input is tolerated
//! by defaulting: missing tags and affinities behave as empty, a missing
//! locked flag as unlocked, a missing location as unassigned.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Identifier of an entity. Identity, equality and ordering are by the id
/// string everywhere in the engine.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        EntityId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        EntityId(id.to_owned())
    }
}

impl From<String> for EntityId {
    fn from(id: String) -> Self {
        EntityId(id)
    }
}

/// Identifier of a lane.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LaneId(String);

impl LaneId {
    pub fn new(id: impl Into<String>) -> Self {
        LaneId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LaneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LaneId {
    fn from(id: &str) -> Self {
        LaneId(id.to_owned())
    }
}

impl From<String> for LaneId {
    fn from(id: String) -> Self {
        LaneId(id)
    }
}

/// The kind of an entity. Pairing operates on one kind symmetrically;
/// assignment matches one kind onto lanes occupied by another.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    #[default]
    Person,
    Role,
    Track,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Person => f.write_str("person"),
            EntityKind::Role => f.write_str("role"),
            EntityKind::Track => f.write_str("track"),
        }
    }
}

/// Where an entity currently is: a lane, the unassigned pool, or out
/// (absent, invisible to the engine).
///
/// Serialized as a bare string: the sentinels `"unassigned"` / `"out"`, or
/// a lane id.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum Location {
    #[default]
    Unassigned,
    Out,
    Lane(LaneId),
}

const UNASSIGNED: &str = "unassigned";
const OUT: &str = "out";

impl Location {
    pub fn lane(id: impl Into<LaneId>) -> Self {
        Location::Lane(id.into())
    }

    /// Returns the lane id if this location is a lane.
    pub fn as_lane(&self) -> Option<&LaneId> {
        match self {
            Location::Lane(id) => Some(id),
            _ => None,
        }
    }

    pub fn is_unassigned(&self) -> bool {
        matches!(self, Location::Unassigned)
    }

    pub fn is_out(&self) -> bool {
        matches!(self, Location::Out)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Unassigned => f.write_str(UNASSIGNED),
            Location::Out => f.write_str(OUT),
            Location::Lane(id) => f.write_str(id.as_str()),
        }
    }
}

impl Serialize for Location {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Location {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(match s.as_str() {
            UNASSIGNED => Location::Unassigned,
            OUT => Location::Out,
            _ => Location::Lane(LaneId::new(s)),
        })
    }
}

/// Co-location constraints an entity declares against tags of others.
///
/// `none` lists tags this entity must never share a lane with. The check is
/// applied in both directions by the scorer.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Affinities {
    #[serde(default)]
    pub none: BTreeSet<String>,
}

impl Affinities {
    pub fn is_empty(&self) -> bool {
        self.none.is_empty()
    }
}

/// An immutable entity record. The engine only ever describes where an
/// entity should move; it never mutates the input.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    #[serde(default)]
    pub kind: EntityKind,
    #[serde(default)]
    pub location: Location,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub affinities: Affinities,
}

impl Entity {
    pub fn new(id: impl Into<EntityId>, kind: EntityKind, location: Location) -> Self {
        Entity {
            id: id.into(),
            kind,
            location,
            tags: BTreeSet::new(),
            affinities: Affinities::default(),
        }
    }

    /// True when the two entities must not share a lane, in either
    /// direction of the tag/affinity relation.
    pub fn conflicts_with(&self, other: &Entity) -> bool {
        self.affinities.none.iter().any(|t| other.tags.contains(t))
            || other.affinities.none.iter().any(|t| self.tags.contains(t))
    }
}

/// A grouping slot on the board. Locked lanes are completely excluded from
/// the engine: their occupants never move and they are never targets.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lane {
    pub id: LaneId,
    #[serde(default)]
    pub locked: bool,
}

impl Lane {
    pub fn new(id: impl Into<LaneId>) -> Self {
        Lane {
            id: id.into(),
            locked: false,
        }
    }

    pub fn locked(id: impl Into<LaneId>) -> Self {
        Lane {
            id: id.into(),
            locked: true,
        }
    }

    pub fn is_eligible(&self) -> bool {
        !self.locked
    }
}

/// The current state passed to every engine call.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    #[serde(default)]
    pub entities: Vec<Entity>,
    #[serde(default)]
    pub lanes: Vec<Lane>,
}

impl Board {
    pub fn new(entities: Vec<Entity>, lanes: Vec<Lane>) -> Self {
        Board { entities, lanes }
    }

    /// Looks up an entity by id.
    pub fn entity(&self, id: &EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| &e.id == id)
    }

    /// All entities of the given kind.
    pub fn entities_of(&self, kind: EntityKind) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(move |e| e.kind == kind)
    }

    /// Entities of the given kind currently located in the given lane.
    /// Occupancy is derived, not stored.
    pub fn occupants_of<'a>(
        &'a self,
        lane: &'a LaneId,
        kind: EntityKind,
    ) -> impl Iterator<Item = &'a Entity> {
        self.entities_of(kind)
            .filter(move |e| e.location.as_lane() == Some(lane))
    }

    /// Non-locked lanes, in board order.
    pub fn eligible_lanes(&self) -> impl Iterator<Item = &Lane> {
        self.lanes.iter().filter(|l| l.is_eligible())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_roundtrip() {
        assert_eq!(Location::Unassigned.to_string(), "unassigned");
        assert_eq!(Location::Out.to_string(), "out");
        assert_eq!(Location::lane("l1").to_string(), "l1");
    }

    #[test]
    fn test_location_deserialize_sentinels() {
        #[derive(Deserialize)]
        struct Holder {
            location: Location,
        }

        let h: Holder = toml::from_str(r#"location = "unassigned""#).unwrap();
        assert_eq!(h.location, Location::Unassigned);
        let h: Holder = toml::from_str(r#"location = "out""#).unwrap();
        assert_eq!(h.location, Location::Out);
        let h: Holder = toml::from_str(r#"location = "l7""#).unwrap();
        assert_eq!(h.location, Location::lane("l7"));
    }

    #[test]
    fn test_entity_defaults_tolerate_partial_input() {
        let entity: Entity = toml::from_str(r#"id = "p1""#).unwrap();
        assert_eq!(entity.kind, EntityKind::Person);
        assert_eq!(entity.location, Location::Unassigned);
        assert!(entity.tags.is_empty());
        assert!(entity.affinities.is_empty());
    }

    #[test]
    fn test_lane_locked_defaults_false() {
        let lane: Lane = toml::from_str(r#"id = "l1""#).unwrap();
        assert!(lane.is_eligible());
        assert!(Lane::locked("l2").locked);
    }

    #[test]
    fn test_occupants_are_derived() {
        let board = Board::new(
            vec![
                Entity::new("p1", EntityKind::Person, Location::lane("l1")),
                Entity::new("p2", EntityKind::Person, Location::lane("l1")),
                Entity::new("r1", EntityKind::Role, Location::lane("l1")),
                Entity::new("p3", EntityKind::Person, Location::Unassigned),
            ],
            vec![Lane::new("l1")],
        );

        let lane = LaneId::new("l1");
        let people: Vec<_> = board
            .occupants_of(&lane, EntityKind::Person)
            .map(|e| e.id.as_str())
            .collect();
        assert_eq!(people, vec!["p1", "p2"]);

        let roles: Vec<_> = board
            .occupants_of(&lane, EntityKind::Role)
            .map(|e| e.id.as_str())
            .collect();
        assert_eq!(roles, vec!["r1"]);
    }

    #[test]
    fn test_conflicts_with_is_symmetric() {
        let mut a = Entity::new("a", EntityKind::Person, Location::Unassigned);
        a.affinities.none.insert("remote".to_owned());
        let mut b = Entity::new("b", EntityKind::Person, Location::Unassigned);
        b.tags.insert("remote".to_owned());

        assert!(a.conflicts_with(&b));
        assert!(b.conflicts_with(&a));

        let c = Entity::new("c", EntityKind::Person, Location::Unassigned);
        assert!(!a.conflicts_with(&c));
    }
}
