//! Shared fixtures for rotapair tests.
//!
//! Builders for boards, entities and history snapshots, plus a seeded
//! random board generator for property-style tests. Test-only; not part of
//! the engine's public surface.

use rand::Rng;

use rotapair_core::{Board, Entity, EntityKind, HistoryEntry, Lane, Location};

pub fn person(id: &str, location: Location) -> Entity {
    Entity::new(id, EntityKind::Person, location)
}

/// A person carrying tags and `affinities.none` entries.
pub fn person_with(id: &str, location: Location, tags: &[&str], none: &[&str]) -> Entity {
    let mut entity = person(id, location);
    entity.tags = tags.iter().map(|t| (*t).to_owned()).collect();
    entity.affinities.none = none.iter().map(|t| (*t).to_owned()).collect();
    entity
}

pub fn role(id: &str, location: Location) -> Entity {
    Entity::new(id, EntityKind::Role, location)
}

pub fn track(id: &str, location: Location) -> Entity {
    Entity::new(id, EntityKind::Track, location)
}

pub fn lane(id: &str) -> Lane {
    Lane::new(id)
}

pub fn locked_lane(id: &str) -> Lane {
    Lane::locked(id)
}

pub fn board(entities: Vec<Entity>, lanes: Vec<Lane>) -> Board {
    Board::new(entities, lanes)
}

/// A history entry at the given bucket.
pub fn snapshot(bucket: i64, entities: Vec<Entity>) -> HistoryEntry {
    HistoryEntry::new(bucket, entities)
}

/// A person-only history entry described as lanes with member ids.
pub fn lane_snapshot(bucket: i64, lanes: &[(&str, &[&str])]) -> HistoryEntry {
    let entities = lanes
        .iter()
        .flat_map(|(lane, ids)| ids.iter().map(|id| person(id, Location::lane(*lane))))
        .collect();
    snapshot(bucket, entities)
}

/// A random board for property tests: `people` persons spread over `lanes`
/// lanes, the unassigned pool and absence, with an occasional locked lane.
/// Boards produced this way may be infeasible; callers decide how to treat
/// that outcome.
pub fn generate_board(rng: &mut impl Rng, people: usize, lanes: usize) -> Board {
    let lanes: Vec<Lane> = (1..=lanes)
        .map(|i| {
            let id = format!("l{i}");
            if rng.random_ratio(1, 5) {
                Lane::locked(id)
            } else {
                Lane::new(id)
            }
        })
        .collect();

    let entities = (1..=people)
        .map(|i| {
            let location = match rng.random_range(0..10) {
                0 | 1 => Location::Unassigned,
                2 => Location::Out,
                _ if lanes.is_empty() => Location::Unassigned,
                _ => Location::lane(lanes[rng.random_range(0..lanes.len())].id.clone()),
            };
            person(&format!("p{i}"), location)
        })
        .collect();

    Board::new(entities, lanes)
}
