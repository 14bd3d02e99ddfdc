//! Board invariants.
//!
//! Invariants are properties that hold across every board transition.
//! They are checked in debug builds after each write and exercised by tests.

use super::types::{Board, Square};
use tracing::instrument;

/// A property relating the board before and after one transition.
pub trait Invariant {
    /// Checks if the invariant holds for `before` → `after`.
    fn holds(before: &Board, after: &Board) -> bool;

    /// Human-readable description.
    fn description() -> &'static str;
}

/// Invariant: no transition adds pieces, and at most one is removed.
pub struct PieceCountInvariant;

impl Invariant for PieceCountInvariant {
    fn holds(before: &Board, after: &Board) -> bool {
        let before = before.pieces().count();
        let after = after.pieces().count();
        after <= before && before - after <= 1
    }

    fn description() -> &'static str {
        "Piece count never grows and drops by at most one per move"
    }
}

/// Invariant: a transition touches at most the source and destination squares.
pub struct SingleMoveInvariant;

impl Invariant for SingleMoveInvariant {
    fn holds(before: &Board, after: &Board) -> bool {
        Square::all()
            .filter(|sq| before.piece_at(*sq) != after.piece_at(*sq))
            .count()
            <= 2
    }

    fn description() -> &'static str {
        "Exactly one move is applied at a time"
    }
}

/// A collection of invariants checked together.
pub trait InvariantSet {
    /// Checks all invariants, returning the description of the first that fails.
    fn check_transition(before: &Board, after: &Board) -> Result<(), &'static str>;
}

/// Every board invariant.
pub struct ChessInvariants;

impl InvariantSet for ChessInvariants {
    #[instrument(skip_all)]
    fn check_transition(before: &Board, after: &Board) -> Result<(), &'static str> {
        if !PieceCountInvariant::holds(before, after) {
            return Err(PieceCountInvariant::description());
        }
        if !SingleMoveInvariant::holds(before, after) {
            return Err(SingleMoveInvariant::description());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::chess::types::{Color, Piece, PieceKind};

    fn sq(rank: u8, file: u8) -> Square {
        Square::new(rank, file).unwrap()
    }

    #[test]
    fn test_unchanged_board_holds() {
        let board = Board::standard();
        assert!(ChessInvariants::check_transition(&board, &board).is_ok());
    }

    #[test]
    fn test_added_piece_violates_count() {
        let before = Board::standard();
        let mut after = before.clone();
        after.place(sq(4, 4), Piece::new(PieceKind::Queen, Color::White));
        assert!(!PieceCountInvariant::holds(&before, &after));
    }

    #[test]
    fn test_two_moves_at_once_violates() {
        let before = Board::standard();
        let mut after = before.clone();
        let pawn = after.clear(sq(6, 4)).unwrap();
        after.place(sq(4, 4), pawn);
        let pawn = after.clear(sq(1, 4)).unwrap();
        after.place(sq(3, 4), pawn);
        assert_eq!(
            ChessInvariants::check_transition(&before, &after),
            Err(SingleMoveInvariant::description())
        );
    }
}
