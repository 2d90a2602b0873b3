//! Historical board states and the bounded scoring window.
//!
//! History entries are keyed by a time bucket: a decimal timestamp key that
//! orders the same way lexically and numerically. The persistence layer
//! records at most one entry per bucket and supplies the most recent ~100
//! entries; retention and trimming are its responsibility, not the
//! engine's. The engine further narrows what it looks at via [`window`].

use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::board::Entity;

/// A discretized time bucket key. Treated as an opaque ordered integer;
/// the engine only ever subtracts bucket ids to obtain ages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct BucketId(pub i64);

impl BucketId {
    pub fn value(&self) -> i64 {
        self.0
    }

    /// Buckets elapsed since `earlier`, clamped at zero.
    pub fn age_since(&self, earlier: BucketId) -> i64 {
        (self.0 - earlier.0).max(0)
    }
}

impl fmt::Display for BucketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for BucketId {
    fn from(v: i64) -> Self {
        BucketId(v)
    }
}

impl Serialize for BucketId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // Document ids are decimal strings in the store.
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for BucketId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct BucketVisitor;

        impl Visitor<'_> for BucketVisitor {
            type Value = BucketId;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a decimal bucket key as a string or integer")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<BucketId, E> {
                Ok(BucketId(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<BucketId, E> {
                Ok(BucketId(v as i64))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<BucketId, E> {
                v.trim().parse::<i64>().map(BucketId).map_err(de::Error::custom)
            }
        }

        deserializer.deserialize_any(BucketVisitor)
    }
}

/// A past board state captured at one time bucket.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: BucketId,
    #[serde(default)]
    pub entities: Vec<Entity>,
}

impl HistoryEntry {
    pub fn new(id: impl Into<BucketId>, entities: Vec<Entity>) -> Self {
        HistoryEntry {
            id: id.into(),
            entities,
        }
    }
}

/// Selects the slice of history the scorer is allowed to see.
///
/// Keeps the `max_entries` most recent entries by bucket id. When `as_of`
/// is supplied, entries more than `lookback` buckets older than it are
/// dropped as well, mirroring the store view that disregards stale
/// buckets relative to the current time.
///
/// Entries are returned oldest first regardless of input order.
pub fn window<'a>(
    entries: &'a [HistoryEntry],
    max_entries: usize,
    as_of: Option<BucketId>,
    lookback: i64,
) -> Vec<&'a HistoryEntry> {
    let mut selected: Vec<&HistoryEntry> = entries.iter().collect();
    selected.sort_by_key(|e| e.id);

    if selected.len() > max_entries {
        selected.drain(..selected.len() - max_entries);
    }

    if let Some(now) = as_of {
        selected.retain(|e| now.age_since(e.id) <= lookback);
    }

    selected
}
