//! The recommendation engine: candidate generation, history scoring and
//! random tie-broken selection over a pairing board.
//!
//! Every call is a pure function of the board and history snapshots handed
//! in. Nothing is persisted and no state survives between calls; the only
//! nondeterminism is the tie-breaking draw, which can be pinned through
//! [`EngineConfig::random_seed`] or a caller-supplied generator.
//!
//! # Examples
//!
//! ```
//! use rotapair_core::{Board, Entity, EntityKind, Lane, Location};
//! use rotapair_engine::Recommender;
//!
//! let board = Board::new(
//!     vec![
//!         Entity::new("ada", EntityKind::Person, Location::Unassigned),
//!         Entity::new("lin", EntityKind::Person, Location::Unassigned),
//!     ],
//!     vec![Lane::new("l1")],
//! );
//!
//! let moves = Recommender::default().best_pairing(&board, &[]).unwrap();
//! assert_eq!(moves.len(), 1);
//! assert_eq!(moves[0].lane.to_string(), "l1");
//! assert_eq!(moves[0].entities.len(), 2);
//! ```

pub mod candidate;
pub mod moves;

mod assignment;
mod scoring;
mod selector;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use rotapair_config::EngineConfig;
use rotapair_core::{window, Board, BucketId, EntityKind, HistoryEntry, Infeasible, Move};

use crate::assignment::{matching_moves, select_assignment, AssignmentSpace};
use crate::candidate::PairingSpace;
use crate::scoring::PairScorer;
use crate::selector::select_best;

pub use crate::candidate::{CandidateAssignments, Group, Grouping};
pub use crate::moves::moves_from_grouping;

/// The engine's entry point, carrying the tuning configuration.
#[derive(Debug, Clone, Default)]
pub struct Recommender {
    config: EngineConfig,
}

impl Recommender {
    pub fn new(config: EngineConfig) -> Self {
        Recommender { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn draw_rng(&self) -> StdRng {
        match self.config.random_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }

    /// Recommends a full regrouping of the person entities.
    ///
    /// Returns the moves that turn the board into a minimal-cost
    /// arrangement; an empty list means the board already is one.
    ///
    /// # Errors
    ///
    /// [`Infeasible`] when the non-locked lanes cannot all be staffed.
    pub fn best_pairing(
        &self,
        board: &Board,
        history: &[HistoryEntry],
    ) -> Result<Vec<Move>, Infeasible> {
        self.best_pairing_with_rng(board, history, None, &mut self.draw_rng())
    }

    /// Like [`Recommender::best_pairing`], scoring relative to the given
    /// current bucket: history older than the configured lookback is
    /// disregarded and ages are measured from `as_of`.
    pub fn best_pairing_as_of(
        &self,
        board: &Board,
        history: &[HistoryEntry],
        as_of: BucketId,
    ) -> Result<Vec<Move>, Infeasible> {
        self.best_pairing_with_rng(board, history, Some(as_of), &mut self.draw_rng())
    }

    /// The fully explicit pairing call: the tie-break draw comes from the
    /// caller's generator.
    pub fn best_pairing_with_rng(
        &self,
        board: &Board,
        history: &[HistoryEntry],
        as_of: Option<BucketId>,
        rng: &mut impl Rng,
    ) -> Result<Vec<Move>, Infeasible> {
        let space = PairingSpace::new(board, EntityKind::Person, rng);
        debug!(
            pool = space.pool.len(),
            lanes = space.lanes.len(),
            "searching pairings"
        );

        let Some(best) = self.search(board, history, as_of, &space, rng) else {
            return Err(Infeasible {
                lanes: space.lanes.len(),
                people: space.pool.len(),
            });
        };

        debug!(score = %best.score, ties = best.ties, "pairing selected");
        Ok(moves_from_grouping(&best.grouping, board))
    }

    fn search(
        &self,
        board: &Board,
        history: &[HistoryEntry],
        as_of: Option<BucketId>,
        space: &PairingSpace,
        rng: &mut impl Rng,
    ) -> Option<selector::BestPick> {
        let window = window(
            history,
            self.config.max_history_entries,
            as_of,
            self.config.bucket_lookback,
        );
        let scorer = PairScorer::new(
            &board.entities,
            &window,
            as_of,
            self.config.decay_horizon,
        );
        select_best(space, &scorer, rng)
    }

    /// Recommends lanes for the unassigned `secondary` entities, matching
    /// them onto lanes hosting `primary` entities.
    ///
    /// # Errors
    ///
    /// Carries the same contract as [`Recommender::best_pairing`]; the
    /// matching itself has no structural failure mode, so the current
    /// implementation always succeeds.
    pub fn best_assignment(
        &self,
        primary: EntityKind,
        secondary: EntityKind,
        board: &Board,
        history: &[HistoryEntry],
    ) -> Result<Vec<Move>, Infeasible> {
        self.best_assignment_with_rng(primary, secondary, board, history, None, &mut self.draw_rng())
    }

    /// Like [`Recommender::best_assignment`], scoring relative to `as_of`.
    pub fn best_assignment_as_of(
        &self,
        primary: EntityKind,
        secondary: EntityKind,
        board: &Board,
        history: &[HistoryEntry],
        as_of: BucketId,
    ) -> Result<Vec<Move>, Infeasible> {
        self.best_assignment_with_rng(
            primary,
            secondary,
            board,
            history,
            Some(as_of),
            &mut self.draw_rng(),
        )
    }

    /// The fully explicit assignment call.
    pub fn best_assignment_with_rng(
        &self,
        primary: EntityKind,
        secondary: EntityKind,
        board: &Board,
        history: &[HistoryEntry],
        as_of: Option<BucketId>,
        rng: &mut impl Rng,
    ) -> Result<Vec<Move>, Infeasible> {
        let space = AssignmentSpace::new(board, primary, secondary, rng);
        let window = window(
            history,
            self.config.max_history_entries,
            as_of,
            self.config.bucket_lookback,
        );
        let scorer = PairScorer::new(
            &board.entities,
            &window,
            as_of,
            self.config.decay_horizon,
        );

        let matched = select_assignment(&space, &scorer, rng);
        debug!(score = %matched.score, ties = matched.ties, "assignment selected");
        Ok(matching_moves(&space, &matched))
    }
}

/// One-shot pairing with the default configuration.
///
/// # Errors
///
/// [`Infeasible`] when the non-locked lanes cannot all be staffed.
pub fn best_pairing(board: &Board, history: &[HistoryEntry]) -> Result<Vec<Move>, Infeasible> {
    Recommender::default().best_pairing(board, history)
}

/// One-shot assignment with the default configuration.
///
/// # Errors
///
/// See [`Recommender::best_assignment`].
pub fn best_assignment(
    primary: EntityKind,
    secondary: EntityKind,
    board: &Board,
    history: &[HistoryEntry],
) -> Result<Vec<Move>, Infeasible> {
    Recommender::default().best_assignment(primary, secondary, board, history)
}

/// The raw candidate enumeration for person pairing, exposed for
/// composition and tests. Iteration order is deliberately unstable; use
/// [`CandidateAssignments::for_board`] to control kind and randomness.
pub fn candidate_assignments(board: &Board) -> CandidateAssignments {
    let mut rng = StdRng::from_os_rng();
    CandidateAssignments::for_board(board, EntityKind::Person, &mut rng)
}

#[cfg(test)]
mod tests {
    use rotapair_core::{Entity, Lane, Location};

    use super::*;

    #[test]
    fn test_seeded_config_reproduces_the_draw() {
        let board = Board::new(
            vec![
                Entity::new("p1", EntityKind::Person, Location::Unassigned),
                Entity::new("p2", EntityKind::Person, Location::Unassigned),
                Entity::new("p3", EntityKind::Person, Location::Unassigned),
                Entity::new("p4", EntityKind::Person, Location::Unassigned),
            ],
            vec![],
        );

        let engine = Recommender::new(EngineConfig {
            random_seed: Some(7),
            ..EngineConfig::default()
        });

        let first = engine.best_pairing(&board, &[]).unwrap();
        for _ in 0..5 {
            assert_eq!(engine.best_pairing(&board, &[]).unwrap(), first);
        }
    }

    #[test]
    fn test_infeasible_reports_counts() {
        let board = Board::new(
            vec![Entity::new("p1", EntityKind::Person, Location::Unassigned)],
            vec![Lane::new("l1"), Lane::new("l2"), Lane::new("l3")],
        );

        let err = best_pairing(&board, &[]).unwrap_err();
        assert_eq!(err, Infeasible { lanes: 3, people: 1 });
    }

    #[test]
    fn test_candidate_enumeration_is_exposed() {
        let board = Board::new(
            vec![
                Entity::new("p1", EntityKind::Person, Location::Unassigned),
                Entity::new("p2", EntityKind::Person, Location::Unassigned),
                Entity::new("p3", EntityKind::Person, Location::Unassigned),
            ],
            vec![],
        );

        // Three people split 2 + 1 over two fresh lanes, three ways.
        assert_eq!(candidate_assignments(&board).count(), 3);
    }
}
