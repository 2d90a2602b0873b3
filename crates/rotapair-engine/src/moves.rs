//! Turning a chosen grouping into the external move list.

use rotapair_core::{Board, Move, MoveTarget};

use crate::candidate::Grouping;

/// Renders a grouping as moves, dropping every entity that already stands
/// where the grouping puts it. A group left with no movers is omitted
/// entirely, so a board already in its chosen arrangement yields no moves.
///
/// Members of a `new-lane` group always move: the lane does not exist yet.
pub fn moves_from_grouping(grouping: &Grouping, board: &Board) -> Vec<Move> {
    grouping
        .groups
        .iter()
        .filter_map(|(group, target)| {
            let movers: Vec<_> = group
                .iter()
                .filter(|id| {
                    let current = board.entity(id).map(|e| e.location.as_lane());
                    match target {
                        MoveTarget::NewLane => true,
                        MoveTarget::Lane(lane) => current != Some(Some(lane)),
                    }
                })
                .cloned()
                .collect();
            (!movers.is_empty()).then(|| Move::new(target.clone(), movers))
        })
        .collect()
}
