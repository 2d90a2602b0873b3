//! Exhaustive best-candidate search with uniform tie-breaking.
//!
//! Walks the same placement tree as the candidate enumeration, but scores
//! incrementally and bounds: pair costs only ever subtract, so a partial
//! arrangement already scoring strictly below the best complete one cannot
//! recover and its subtree is skipped. Partials that merely tie are always
//! explored, which keeps the tie set intact for the random draw.
//!
//! Ties are resolved by reservoir sampling: the k-th candidate to match the
//! best score replaces the current pick with probability 1/k, so every
//! optimal candidate is returned with equal probability from a single pass.

use rand::Rng;
use tracing::trace;

use rotapair_core::RotationScore;

use crate::candidate::{Arrangement, Choice, Grouping, PairingSpace};
use crate::scoring::PairScorer;

/// The winning candidate of one search.
#[derive(Debug)]
pub(crate) struct BestPick {
    pub grouping: Grouping,
    pub score: RotationScore,
    /// Number of candidates that achieved the winning score.
    pub ties: usize,
}

/// Finds an optimal candidate, drawn uniformly from the optimal set.
/// Returns `None` when the space admits no candidate at all.
pub(crate) fn select_best(
    space: &PairingSpace,
    scorer: &PairScorer<'_>,
    rng: &mut impl Rng,
) -> Option<BestPick> {
    if !space.is_feasible() {
        return None;
    }
    if space.pool.is_empty() {
        return Some(BestPick {
            grouping: Grouping { groups: Vec::new() },
            score: RotationScore::ZERO,
            ties: 1,
        });
    }

    let mut best: Option<BestPick> = None;
    let mut arr = Arrangement::default();
    descend(space, scorer, rng, 0, &mut arr, RotationScore::ZERO, &mut best);
    best
}

fn descend(
    space: &PairingSpace,
    scorer: &PairScorer<'_>,
    rng: &mut impl Rng,
    depth: usize,
    arr: &mut Arrangement,
    acc: RotationScore,
    best: &mut Option<BestPick>,
) {
    for choice in space.choices(arr, depth) {
        let acc = match choice {
            Choice::Join(block) => {
                let partner = &space.pool[arr.blocks[block].members[0]];
                acc + scorer.pair_score(partner, &space.pool[depth])
            }
            Choice::OpenLane(_) | Choice::OpenNew => acc,
        };

        // A worse partial can only get worse; an equal one may still tie.
        if best.as_ref().is_some_and(|b| acc < b.score) {
            trace!(depth, "pruned dominated subtree");
            continue;
        }

        space.apply(arr, depth, choice);

        if depth + 1 == space.pool.len() {
            if space.is_complete(arr) {
                record(space, rng, arr, acc, best);
            }
        } else {
            descend(space, scorer, rng, depth + 1, arr, acc, best);
        }

        space.unapply(arr, choice);
    }
}

fn record(
    space: &PairingSpace,
    rng: &mut impl Rng,
    arr: &Arrangement,
    score: RotationScore,
    best: &mut Option<BestPick>,
) {
    match best {
        Some(b) if score < b.score => {}
        Some(b) if score == b.score => {
            b.ties += 1;
            if rng.random_range(0..b.ties) == 0 {
                b.grouping = space.grouping(arr);
            }
        }
        _ => {
            *best = Some(BestPick {
                grouping: space.grouping(arr),
                score,
                ties: 1,
            });
        }
    }
}
