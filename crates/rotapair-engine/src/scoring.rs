//! History-based cost of putting two entities together.
//!
//! The scorer reduces the history window to a recency table: for every pair
//! of entities that ever shared a lane, the most recent bucket in which they
//! did. The cost of a candidate pair then decays exponentially with the age
//! of that bucket relative to a reference point, so a pairing from long ago
//! costs almost nothing next to one from the last rotation. Entities that
//! never shared a lane cost nothing at all.
//!
//! Hard exclusions (conflicting affinities) are scored on a separate,
//! dominant level of [`RotationScore`], so a violating candidate only wins
//! when every candidate violates.

use std::collections::HashMap;

use rotapair_core::{BucketId, Entity, EntityId, HistoryEntry, RotationScore};

/// Weight of a co-location `age` buckets before the reference point.
///
/// Halves per bucket of age and saturates to 1 at the horizon, so any
/// recorded co-location always outweighs none at all.
pub(crate) fn recency_weight(age: i64, horizon: u32) -> i64 {
    if age >= i64::from(horizon) {
        1
    } else {
        1i64 << (i64::from(horizon) - age)
    }
}

fn pair_key(a: &EntityId, b: &EntityId) -> (EntityId, EntityId) {
    if a <= b {
        (a.clone(), b.clone())
    } else {
        (b.clone(), a.clone())
    }
}

/// Most recent co-location bucket per entity pair, plus the reference
/// bucket ages are measured from.
#[derive(Debug, Default)]
pub(crate) struct RecencyTable {
    last_together: HashMap<(EntityId, EntityId), BucketId>,
    reference: Option<BucketId>,
}

impl RecencyTable {
    /// Builds the table from an already-windowed slice of history.
    ///
    /// The reference point is `as_of` when given, otherwise the most recent
    /// bucket present in the window. Co-location only counts inside a lane;
    /// the unassigned pool and absence never form a record.
    pub fn from_entries(entries: &[&HistoryEntry], as_of: Option<BucketId>) -> Self {
        let mut last_together = HashMap::new();
        let mut latest = None;

        for entry in entries {
            latest = latest.max(Some(entry.id));

            let mut by_lane: HashMap<&str, Vec<&EntityId>> = HashMap::new();
            for entity in &entry.entities {
                if let Some(lane) = entity.location.as_lane() {
                    by_lane.entry(lane.as_str()).or_default().push(&entity.id);
                }
            }

            for members in by_lane.values() {
                for (i, a) in members.iter().enumerate() {
                    for b in &members[i + 1..] {
                        let slot = last_together.entry(pair_key(a, b)).or_insert(entry.id);
                        *slot = (*slot).max(entry.id);
                    }
                }
            }
        }

        RecencyTable {
            last_together,
            reference: as_of.or(latest),
        }
    }

    /// Buckets since `a` and `b` last shared a lane, or `None` if they
    /// never did within the window.
    pub fn age(&self, a: &EntityId, b: &EntityId) -> Option<i64> {
        let now = self.reference?;
        self.last_together
            .get(&pair_key(a, b))
            .map(|&bucket| now.age_since(bucket))
    }
}

/// Scores entity pairs against a board's affinities and a history window.
pub(crate) struct PairScorer<'a> {
    entities: HashMap<&'a EntityId, &'a Entity>,
    recency: RecencyTable,
    horizon: u32,
}

impl<'a> PairScorer<'a> {
    pub fn new(
        entities: impl IntoIterator<Item = &'a Entity>,
        window: &[&HistoryEntry],
        as_of: Option<BucketId>,
        horizon: u32,
    ) -> Self {
        PairScorer {
            entities: entities.into_iter().map(|e| (&e.id, e)).collect(),
            recency: RecencyTable::from_entries(window, as_of),
            horizon,
        }
    }

    /// The cost of placing `a` and `b` in the same lane.
    pub fn pair_score(&self, a: &EntityId, b: &EntityId) -> RotationScore {
        let conflict = match (self.entities.get(a), self.entities.get(b)) {
            (Some(ea), Some(eb)) => ea.conflicts_with(eb),
            _ => false,
        };
        let exclusions = if conflict { -1 } else { 0 };

        let repetition = self
            .recency
            .age(a, b)
            .map(|age| -recency_weight(age, self.horizon))
            .unwrap_or(0);

        RotationScore::of(exclusions, repetition)
    }
}

#[cfg(test)]
mod tests {
    use rotapair_core::{EntityKind, Location};

    use super::*;

    fn person(id: &str) -> Entity {
        Entity::new(id, EntityKind::Person, Location::Unassigned)
    }

    fn snapshot(bucket: i64, lanes: &[(&str, &[&str])]) -> HistoryEntry {
        let entities = lanes
            .iter()
            .flat_map(|(lane, ids)| {
                ids.iter()
                    .map(|id| Entity::new(*id, EntityKind::Person, Location::lane(*lane)))
            })
            .collect();
        HistoryEntry::new(bucket, entities)
    }

    #[test]
    fn test_recency_weight_decay() {
        assert_eq!(recency_weight(0, 40), 1 << 40);
        assert_eq!(recency_weight(1, 40), 1 << 39);
        assert_eq!(recency_weight(39, 40), 2);
        assert_eq!(recency_weight(40, 40), 1);
        assert_eq!(recency_weight(500, 40), 1);
    }

    #[test]
    fn test_most_recent_co_location_wins() {
        let entries = vec![
            snapshot(1, &[("l1", &["a", "b"])]),
            snapshot(5, &[("l2", &["a", "b"])]),
            snapshot(3, &[("l1", &["a", "b"])]),
        ];
        let refs: Vec<&HistoryEntry> = entries.iter().collect();
        let table = RecencyTable::from_entries(&refs, None);

        assert_eq!(table.age(&"a".into(), &"b".into()), Some(0));
        assert_eq!(table.age(&"b".into(), &"a".into()), Some(0));
    }

    #[test]
    fn test_never_paired_has_no_age() {
        let entries = vec![snapshot(1, &[("l1", &["a", "b"]), ("l2", &["c"])])];
        let refs: Vec<&HistoryEntry> = entries.iter().collect();
        let table = RecencyTable::from_entries(&refs, None);

        assert_eq!(table.age(&"a".into(), &"c".into()), None);
        assert_eq!(table.age(&"x".into(), &"y".into()), None);
    }

    #[test]
    fn test_unassigned_and_out_do_not_co_locate() {
        let mut entities = vec![person("a"), person("b")];
        entities.push(Entity::new("c", EntityKind::Person, Location::Out));
        let entries = vec![HistoryEntry::new(2, entities)];
        let refs: Vec<&HistoryEntry> = entries.iter().collect();
        let table = RecencyTable::from_entries(&refs, None);

        assert_eq!(table.age(&"a".into(), &"b".into()), None);
        assert_eq!(table.age(&"a".into(), &"c".into()), None);
    }

    #[test]
    fn test_as_of_shifts_ages() {
        let entries = vec![snapshot(10, &[("l1", &["a", "b"])])];
        let refs: Vec<&HistoryEntry> = entries.iter().collect();

        let table = RecencyTable::from_entries(&refs, Some(BucketId(13)));
        assert_eq!(table.age(&"a".into(), &"b".into()), Some(3));
    }

    #[test]
    fn test_pair_score_orders_by_recency() {
        let people = vec![person("a"), person("b"), person("c")];
        let entries = vec![
            snapshot(1, &[("l1", &["a", "c"])]),
            snapshot(2, &[("l1", &["a", "b"])]),
        ];
        let refs: Vec<&HistoryEntry> = entries.iter().collect();
        let scorer = PairScorer::new(&people, &refs, None, 40);

        let recent = scorer.pair_score(&"a".into(), &"b".into());
        let older = scorer.pair_score(&"a".into(), &"c".into());
        let never = scorer.pair_score(&"b".into(), &"c".into());

        assert_eq!(recent, RotationScore::of_repetition(-(1 << 40)));
        assert_eq!(older, RotationScore::of_repetition(-(1 << 39)));
        assert_eq!(never, RotationScore::ZERO);
        assert!(never > older && older > recent);
    }

    #[test]
    fn test_conflicting_pair_scores_an_exclusion() {
        let mut a = person("a");
        a.affinities.none.insert("night".to_owned());
        let mut b = person("b");
        b.tags.insert("night".to_owned());
        let people = vec![a, b];

        let scorer = PairScorer::new(&people, &[], None, 40);
        let score = scorer.pair_score(&"a".into(), &"b".into());
        assert_eq!(score, RotationScore::ONE_EXCLUSION);
        assert!(!score.is_feasible());
    }
}
