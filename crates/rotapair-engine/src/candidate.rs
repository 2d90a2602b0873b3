//! Candidate generation: every legal redistribution of the movable set.
//!
//! A candidate partitions the pool (entities of the primary kind that are
//! unassigned or sit in a non-locked lane) into groups of at most two and
//! places one group on every eligible lane, spilling surplus groups onto
//! the virtual new-lane slot. A group placed on a currently occupied lane
//! must retain at least one of that lane's occupants, so an already-paired
//! lane never loses all of its context at once.
//!
//! Enumeration is an explicit-stack depth-first walk over per-entity
//! placement choices. The pool and lane orders are shuffled when a walk is
//! constructed, so iteration order is unstable across constructions while
//! each construction still produces the complete, duplicate-free set.

use rand::seq::SliceRandom;
use rand::Rng;
use smallvec::SmallVec;

use rotapair_core::{Board, EntityId, EntityKind, LaneId, Location, MoveTarget};

/// A group of entities recommended to share one slot.
pub type Group = SmallVec<[EntityId; 2]>;

/// One candidate arrangement: each group together with its target slot.
/// Several groups may target [`MoveTarget::NewLane`]; each means a distinct
/// fresh lane.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grouping {
    pub groups: Vec<(Group, MoveTarget)>,
}

impl Grouping {
    /// All entity ids placed by this candidate.
    pub fn members(&self) -> impl Iterator<Item = &EntityId> {
        self.groups.iter().flat_map(|(group, _)| group.iter())
    }
}

/// Slot targeted by a block during the search, by lane index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Slot {
    Lane(usize),
    New,
}

#[derive(Clone, Debug)]
pub(crate) struct Block {
    pub slot: Slot,
    /// Pool indices, in placement order.
    pub members: SmallVec<[usize; 2]>,
}

/// A partial (or complete) partition of the pool.
#[derive(Clone, Debug, Default)]
pub(crate) struct Arrangement {
    pub blocks: Vec<Block>,
    pub lanes_open: usize,
    pub new_open: usize,
}

impl Arrangement {
    fn lane_used(&self, lane: usize) -> bool {
        self.blocks
            .iter()
            .any(|b| matches!(b.slot, Slot::Lane(l) if l == lane))
    }
}

/// Placement choice for one pool entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Choice {
    /// Join the block at this index, completing it as a pair.
    Join(usize),
    /// Open the block of this eligible lane.
    OpenLane(usize),
    /// Open a fresh new-lane block.
    OpenNew,
}

#[derive(Clone, Debug)]
pub(crate) struct LaneSlot {
    pub id: LaneId,
    /// Pool indices of the lane's current occupants.
    pub occupants: Vec<usize>,
}

impl LaneSlot {
    fn is_occupied(&self) -> bool {
        !self.occupants.is_empty()
    }
}

/// The search space derived from one board snapshot.
#[derive(Clone, Debug)]
pub(crate) struct PairingSpace {
    pub pool: Vec<EntityId>,
    pub lanes: Vec<LaneSlot>,
    /// Exact number of groups every complete candidate has.
    pub block_count: usize,
    /// Groups beyond the eligible lanes, placed on the new-lane slot.
    pub new_blocks: usize,
}

impl PairingSpace {
    pub fn new(board: &Board, kind: EntityKind, rng: &mut impl Rng) -> Self {
        let mut lane_ids: Vec<LaneId> = board.eligible_lanes().map(|l| l.id.clone()).collect();
        lane_ids.shuffle(rng);

        let mut pool: Vec<&EntityId> = board
            .entities_of(kind)
            .filter(|e| match &e.location {
                Location::Unassigned => true,
                Location::Out => false,
                Location::Lane(lane) => lane_ids.contains(lane),
            })
            .map(|e| &e.id)
            .collect();
        pool.shuffle(rng);
        let pool: Vec<EntityId> = pool.into_iter().cloned().collect();

        let lanes: Vec<LaneSlot> = lane_ids
            .into_iter()
            .map(|id| {
                let occupants = pool
                    .iter()
                    .enumerate()
                    .filter(|(_, pid)| {
                        board
                            .entity(pid)
                            .is_some_and(|e| e.location.as_lane() == Some(&id))
                    })
                    .map(|(i, _)| i)
                    .collect();
                LaneSlot { id, occupants }
            })
            .collect();

        let block_count = pool.len().div_ceil(2);
        let new_blocks = block_count.saturating_sub(lanes.len());

        PairingSpace {
            pool,
            lanes,
            block_count,
            new_blocks,
        }
    }

    /// A board is structurally impossible when the eligible lanes demand
    /// more survivors than the pool can ever supply.
    pub fn is_feasible(&self) -> bool {
        2 * self.lanes.len() <= self.pool.len() + 1
    }

    fn is_occupant(&self, person: usize, lane: usize) -> bool {
        self.lanes[lane].occupants.contains(&person)
    }

    /// Legal placements for the entity at `depth`, given all earlier
    /// entities are already placed.
    pub fn choices(&self, arr: &Arrangement, depth: usize) -> Vec<Choice> {
        let person = depth;
        let remaining_after = self.pool.len() - depth - 1;
        let unopened =
            (self.lanes.len() - arr.lanes_open) + (self.new_blocks - arr.new_open);
        let mut out = Vec::new();

        for (i, block) in arr.blocks.iter().enumerate() {
            if block.members.len() != 1 {
                continue;
            }
            // Completing an occupied lane's pair without any of its
            // occupants can never become valid later.
            if let Slot::Lane(l) = block.slot {
                if self.lanes[l].is_occupied()
                    && !self.is_occupant(block.members[0], l)
                    && !self.is_occupant(person, l)
                {
                    continue;
                }
            }
            if remaining_after >= unopened {
                out.push(Choice::Join(i));
            }
        }

        if arr.blocks.len() < self.block_count && remaining_after + 1 >= unopened {
            for l in 0..self.lanes.len() {
                if !arr.lane_used(l) {
                    out.push(Choice::OpenLane(l));
                }
            }
            if arr.new_open < self.new_blocks {
                out.push(Choice::OpenNew);
            }
        }

        out
    }

    pub fn apply(&self, arr: &mut Arrangement, person: usize, choice: Choice) {
        match choice {
            Choice::Join(block) => arr.blocks[block].members.push(person),
            Choice::OpenLane(lane) => {
                arr.blocks.push(Block {
                    slot: Slot::Lane(lane),
                    members: SmallVec::from_slice(&[person]),
                });
                arr.lanes_open += 1;
            }
            Choice::OpenNew => {
                arr.blocks.push(Block {
                    slot: Slot::New,
                    members: SmallVec::from_slice(&[person]),
                });
                arr.new_open += 1;
            }
        }
    }

    /// Reverts the matching [`PairingSpace::apply`]. Used by depth-first
    /// searches that mutate one arrangement in place.
    pub fn unapply(&self, arr: &mut Arrangement, choice: Choice) {
        match choice {
            Choice::Join(block) => {
                arr.blocks[block].members.pop();
            }
            Choice::OpenLane(_) => {
                arr.blocks.pop();
                arr.lanes_open -= 1;
            }
            Choice::OpenNew => {
                arr.blocks.pop();
                arr.new_open -= 1;
            }
        }
    }

    /// Validity of a complete arrangement: every eligible lane received a
    /// group, and every occupied lane retained one of its occupants.
    pub fn is_complete(&self, arr: &Arrangement) -> bool {
        if arr.lanes_open != self.lanes.len() {
            return false;
        }
        arr.blocks.iter().all(|block| match block.slot {
            Slot::Lane(l) if self.lanes[l].is_occupied() => block
                .members
                .iter()
                .any(|&m| self.is_occupant(m, l)),
            _ => true,
        })
    }

    pub fn grouping(&self, arr: &Arrangement) -> Grouping {
        let groups = arr
            .blocks
            .iter()
            .map(|block| {
                let members: Group = block
                    .members
                    .iter()
                    .map(|&i| self.pool[i].clone())
                    .collect();
                let target = match block.slot {
                    Slot::Lane(l) => MoveTarget::Lane(self.lanes[l].id.clone()),
                    Slot::New => MoveTarget::NewLane,
                };
                (members, target)
            })
            .collect();
        Grouping { groups }
    }
}

/// Lazy, restartable enumeration of every candidate arrangement.
///
/// Constructing the iterator again re-produces the full candidate set,
/// possibly in a different order. No candidate is produced twice: new-lane
/// groups are opened in canonical order, and lane slots are distinct.
pub struct CandidateAssignments {
    space: PairingSpace,
    stack: Vec<Frame>,
    emit_empty: bool,
}

struct Frame {
    arrangement: Arrangement,
    choices: Vec<Choice>,
    next: usize,
}

impl CandidateAssignments {
    pub(crate) fn new(space: PairingSpace) -> Self {
        let mut stack = Vec::new();
        let mut emit_empty = false;

        if !space.is_feasible() {
            // Nothing can be enumerated; the selector reports this case.
        } else if space.pool.is_empty() {
            emit_empty = space.lanes.is_empty();
        } else {
            let root = Arrangement::default();
            let choices = space.choices(&root, 0);
            stack.push(Frame {
                arrangement: root,
                choices,
                next: 0,
            });
        }

        CandidateAssignments {
            space,
            stack,
            emit_empty,
        }
    }

    /// Creates an enumeration for the given board and primary kind, with a
    /// caller-supplied source of ordering randomness.
    pub fn for_board(board: &Board, kind: EntityKind, rng: &mut impl Rng) -> Self {
        CandidateAssignments::new(PairingSpace::new(board, kind, rng))
    }
}

impl Iterator for CandidateAssignments {
    type Item = Grouping;

    fn next(&mut self) -> Option<Grouping> {
        if self.emit_empty {
            self.emit_empty = false;
            return Some(Grouping { groups: Vec::new() });
        }

        loop {
            let person = self.stack.len().checked_sub(1)?;
            let frame = self.stack.last_mut()?;
            let Some(&choice) = frame.choices.get(frame.next) else {
                self.stack.pop();
                continue;
            };
            frame.next += 1;

            let mut arr = frame.arrangement.clone();
            self.space.apply(&mut arr, person, choice);

            if person + 1 == self.space.pool.len() {
                if self.space.is_complete(&arr) {
                    return Some(self.space.grouping(&arr));
                }
            } else {
                let choices = self.space.choices(&arr, person + 1);
                self.stack.push(Frame {
                    arrangement: arr,
                    choices,
                    next: 0,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use rotapair_core::{Board, Entity, EntityKind, Lane, Location};

    use super::*;

    fn collect(board: &Board, seed: u64) -> Vec<Grouping> {
        let mut rng = StdRng::seed_from_u64(seed);
        CandidateAssignments::for_board(board, EntityKind::Person, &mut rng).collect()
    }

    fn canonical(grouping: &Grouping) -> BTreeSet<(Vec<String>, String)> {
        grouping
            .groups
            .iter()
            .map(|(group, target)| {
                let mut ids: Vec<String> =
                    group.iter().map(|id| id.as_str().to_owned()).collect();
                ids.sort();
                (ids, target.to_string())
            })
            .collect()
    }

    #[test]
    fn test_single_unassigned_person_goes_to_new_lane() {
        let board = Board::new(
            vec![Entity::new("p1", EntityKind::Person, Location::Unassigned)],
            vec![],
        );
        let candidates = collect(&board, 1);
        assert_eq!(candidates.len(), 1);
        assert_eq!(
            canonical(&candidates[0]),
            BTreeSet::from([(vec!["p1".to_owned()], "new-lane".to_owned())])
        );
    }

    #[test]
    fn test_existing_lane_reused_before_new_lane() {
        let board = Board::new(
            vec![Entity::new("p1", EntityKind::Person, Location::Unassigned)],
            vec![Lane::new("l1")],
        );
        let candidates = collect(&board, 2);
        assert_eq!(candidates.len(), 1);
        assert_eq!(
            canonical(&candidates[0]),
            BTreeSet::from([(vec!["p1".to_owned()], "l1".to_owned())])
        );
    }

    #[test]
    fn test_locked_lanes_are_invisible() {
        let board = Board::new(
            vec![
                Entity::new("p1", EntityKind::Person, Location::lane("l1")),
                Entity::new("p2", EntityKind::Person, Location::Unassigned),
            ],
            vec![Lane::locked("l1")],
        );
        let candidates = collect(&board, 3);
        assert_eq!(candidates.len(), 1);
        assert_eq!(
            canonical(&candidates[0]),
            BTreeSet::from([(vec!["p2".to_owned()], "new-lane".to_owned())])
        );
    }

    #[test]
    fn test_all_partitions_of_unassigned_people_over_lanes() {
        let board = Board::new(
            vec![
                Entity::new("p1", EntityKind::Person, Location::Unassigned),
                Entity::new("p2", EntityKind::Person, Location::Unassigned),
                Entity::new("p3", EntityKind::Person, Location::Unassigned),
            ],
            vec![Lane::new("l1"), Lane::new("l2")],
        );
        let candidates = collect(&board, 4);

        // Two lanes absorb three people as a pair plus a solo, both ways
        // around, for every choice of pair: six candidates, no new-lane.
        assert_eq!(candidates.len(), 6);
        for lane in ["l1", "l2"] {
            let mut groups: Vec<Vec<String>> = candidates
                .iter()
                .map(|c| {
                    let (group, _) = c
                        .groups
                        .iter()
                        .find(|(_, t)| t.to_string() == lane)
                        .unwrap();
                    let mut ids: Vec<String> =
                        group.iter().map(|id| id.as_str().to_owned()).collect();
                    ids.sort();
                    ids
                })
                .collect();
            groups.sort();
            assert_eq!(
                groups,
                vec![
                    vec!["p1".to_owned()],
                    vec!["p1".to_owned(), "p2".to_owned()],
                    vec!["p1".to_owned(), "p3".to_owned()],
                    vec!["p2".to_owned()],
                    vec!["p2".to_owned(), "p3".to_owned()],
                    vec!["p3".to_owned()],
                ]
            );
        }
    }

    #[test]
    fn test_context_preserving_rotation() {
        let board = Board::new(
            vec![
                Entity::new("p1", EntityKind::Person, Location::lane("l1")),
                Entity::new("p2", EntityKind::Person, Location::lane("l1")),
                Entity::new("p3", EntityKind::Person, Location::lane("l2")),
                Entity::new("p4", EntityKind::Person, Location::lane("l2")),
                Entity::new("p5", EntityKind::Person, Location::Unassigned),
            ],
            vec![Lane::new("l1"), Lane::new("l2")],
        );
        let candidates = collect(&board, 5);
        assert!(!candidates.is_empty());

        let mut seen = BTreeSet::new();
        for candidate in &candidates {
            let mut slots: Vec<String> =
                candidate.groups.iter().map(|(_, t)| t.to_string()).collect();
            slots.sort();
            assert_eq!(slots, vec!["l1", "l2", "new-lane"]);

            let mut members: Vec<&str> =
                candidate.members().map(|id| id.as_str()).collect();
            members.sort();
            assert_eq!(members, vec!["p1", "p2", "p3", "p4", "p5"]);

            for (lane, occupants) in [("l1", ["p1", "p2"]), ("l2", ["p3", "p4"])] {
                let (group, _) = candidate
                    .groups
                    .iter()
                    .find(|(_, t)| t.to_string() == lane)
                    .unwrap();
                assert!(
                    group.iter().any(|id| occupants.contains(&id.as_str())),
                    "lane {lane} lost all its occupants in {candidate:?}"
                );
            }

            assert!(seen.insert(canonical(candidate)), "duplicate candidate");
        }

        // A displaced occupant may land on the new lane with the floater.
        assert!(candidates.iter().any(|c| {
            c.groups.iter().any(|(group, t)| {
                t.is_new_lane()
                    && group.len() == 2
                    && group.iter().any(|id| id.as_str() == "p5")
                    && group
                        .iter()
                        .any(|id| ["p1", "p2", "p3", "p4"].contains(&id.as_str()))
            })
        }));
    }

    #[test]
    fn test_restartable_and_order_unstable() {
        let board = Board::new(
            vec![
                Entity::new("p1", EntityKind::Person, Location::lane("l1")),
                Entity::new("p2", EntityKind::Person, Location::lane("l1")),
                Entity::new("p3", EntityKind::Person, Location::lane("l2")),
                Entity::new("p4", EntityKind::Person, Location::lane("l2")),
            ],
            vec![Lane::new("l1"), Lane::new("l2")],
        );

        let reference: BTreeSet<_> = collect(&board, 7).iter().map(canonical).collect();
        assert!(!reference.is_empty());
        let mut first_yields = BTreeSet::new();
        for seed in 0..32 {
            let run: Vec<_> = collect(&board, seed);
            let as_sets: BTreeSet<_> = run.iter().map(canonical).collect();
            assert_eq!(as_sets, reference, "restart produced a different set");
            first_yields.insert(canonical(&run[0]));
        }
        assert!(first_yields.len() > 1, "iteration order never varied");
    }

    #[test]
    fn test_empty_board_yields_single_empty_candidate() {
        let board = Board::default();
        let candidates = collect(&board, 8);
        assert_eq!(candidates.len(), 1);
        assert!(candidates[0].groups.is_empty());
    }

    #[test]
    fn test_too_many_lanes_yield_nothing() {
        let board = Board::new(
            vec![Entity::new("p1", EntityKind::Person, Location::lane("l1"))],
            vec![Lane::new("l1"), Lane::new("l2"), Lane::new("l3")],
        );
        assert!(collect(&board, 9).is_empty());
    }
}
