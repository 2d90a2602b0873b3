//! Matching one kind of entity onto lanes occupied by another.
//!
//! Unassigned entities of the secondary kind are distributed over the
//! eligible lanes that currently host at least one primary-kind entity.
//! Lanes are filled evenly: no lane takes more than its share of the
//! entities being placed. The cost of sending a secondary entity to a lane
//! is the summed pair cost against each of the lane's primary occupants, so
//! the least recently associated entity wins each lane. Ties are drawn
//! uniformly, the same way the pairing selector draws them.
//!
//! Secondary entities already sitting in a lane stay where they are, and a
//! board with nothing to place or no hosting lane resolves to no moves.

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::trace;

use rotapair_core::{Board, EntityId, EntityKind, LaneId, Location, Move, MoveTarget, RotationScore};

use crate::scoring::PairScorer;

struct HostLane {
    id: LaneId,
    occupants: Vec<EntityId>,
}

/// The search space of one assignment call.
pub(crate) struct AssignmentSpace {
    movers: Vec<EntityId>,
    lanes: Vec<HostLane>,
    /// Per-lane ceiling keeping the distribution even.
    capacity: usize,
}

impl AssignmentSpace {
    pub fn new(
        board: &Board,
        primary: EntityKind,
        secondary: EntityKind,
        rng: &mut impl Rng,
    ) -> Self {
        let lanes: Vec<HostLane> = board
            .eligible_lanes()
            .map(|lane| HostLane {
                id: lane.id.clone(),
                occupants: board
                    .occupants_of(&lane.id, primary)
                    .map(|e| e.id.clone())
                    .collect(),
            })
            .filter(|lane| !lane.occupants.is_empty())
            .collect();

        let mut movers: Vec<EntityId> = board
            .entities_of(secondary)
            .filter(|e| e.location == Location::Unassigned)
            .map(|e| e.id.clone())
            .collect();
        movers.shuffle(rng);

        let capacity = if lanes.is_empty() {
            0
        } else {
            movers.len().div_ceil(lanes.len())
        };

        AssignmentSpace {
            movers,
            lanes,
            capacity,
        }
    }

    fn lane_cost(&self, scorer: &PairScorer<'_>, mover: &EntityId, lane: usize) -> RotationScore {
        self.lanes[lane]
            .occupants
            .iter()
            .fold(RotationScore::ZERO, |acc, occupant| {
                acc + scorer.pair_score(mover, occupant)
            })
    }
}

#[derive(Debug)]
pub(crate) struct BestMatch {
    /// Lane index per mover, parallel to the space's mover order.
    placements: Vec<usize>,
    pub score: RotationScore,
    pub ties: usize,
}

/// Finds an even, minimal-cost distribution of the movers over the host
/// lanes. Unlike pairing there is no structural failure mode: with nothing
/// to place or nowhere to put it, the match is simply empty.
pub(crate) fn select_assignment(
    space: &AssignmentSpace,
    scorer: &PairScorer<'_>,
    rng: &mut impl Rng,
) -> BestMatch {
    let mut best: Option<BestMatch> = None;
    if !space.movers.is_empty() && !space.lanes.is_empty() {
        let mut placements = Vec::with_capacity(space.movers.len());
        let mut loads = vec![0usize; space.lanes.len()];
        descend(
            space,
            scorer,
            rng,
            &mut placements,
            &mut loads,
            RotationScore::ZERO,
            &mut best,
        );
    }
    best.unwrap_or(BestMatch {
        placements: Vec::new(),
        score: RotationScore::ZERO,
        ties: 1,
    })
}

fn descend(
    space: &AssignmentSpace,
    scorer: &PairScorer<'_>,
    rng: &mut impl Rng,
    placements: &mut Vec<usize>,
    loads: &mut [usize],
    acc: RotationScore,
    best: &mut Option<BestMatch>,
) {
    let depth = placements.len();
    if depth == space.movers.len() {
        match best {
            Some(b) if acc < b.score => {}
            Some(b) if acc == b.score => {
                b.ties += 1;
                if rng.random_range(0..b.ties) == 0 {
                    b.placements.clone_from(placements);
                }
            }
            _ => {
                *best = Some(BestMatch {
                    placements: placements.clone(),
                    score: acc,
                    ties: 1,
                });
            }
        }
        return;
    }

    for lane in 0..space.lanes.len() {
        if loads[lane] >= space.capacity {
            continue;
        }
        let acc = acc + space.lane_cost(scorer, &space.movers[depth], lane);
        if best.as_ref().is_some_and(|b| acc < b.score) {
            trace!(depth, "pruned dominated placement");
            continue;
        }
        placements.push(lane);
        loads[lane] += 1;
        descend(space, scorer, rng, placements, loads, acc, best);
        loads[lane] -= 1;
        placements.pop();
    }
}

/// Renders the match as the external move list, one move per lane that
/// receives anything, in the space's lane order.
pub(crate) fn matching_moves(space: &AssignmentSpace, matched: &BestMatch) -> Vec<Move> {
    let mut per_lane: Vec<Vec<EntityId>> = vec![Vec::new(); space.lanes.len()];
    for (mover, &lane) in space.movers.iter().zip(&matched.placements) {
        per_lane[lane].push(mover.clone());
    }

    space
        .lanes
        .iter()
        .zip(per_lane)
        .filter(|(_, entities)| !entities.is_empty())
        .map(|(lane, entities)| Move::new(MoveTarget::Lane(lane.id.clone()), entities))
        .collect()
}
