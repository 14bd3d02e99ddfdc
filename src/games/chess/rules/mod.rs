//! Move legality rules for chess.
//!
//! Pure functions over a board snapshot. The checks are pseudo-legal:
//! a move that leaves the mover's own king attacked is accepted, and
//! there is no castling or en passant.

pub mod king;
pub mod knight;
pub mod pawn;
pub mod sliding;

use super::action::{IllegalMove, Legality, Move};
use super::types::{Board, Color, PieceKind};
use tracing::{instrument, trace};

/// Decides whether `mover` may play `mv` on `board`.
///
/// Checks run in a fixed order and the first failure is reported:
/// same square, empty source, ownership, friendly capture, then the
/// piece's own movement rule.
#[instrument(skip_all, fields(mv = %mv, mover = %mover))]
pub fn is_legal(board: &Board, mv: Move, mover: Color) -> Result<Legality, IllegalMove> {
    let Move { from, to } = mv;

    if from == to {
        return Err(IllegalMove::SameSquare);
    }

    let piece = board.piece_at(from).ok_or(IllegalMove::EmptySource)?;

    if piece.color != mover {
        return Err(IllegalMove::NotYourPiece);
    }

    if board.is_own_piece(to, mover) {
        return Err(IllegalMove::FriendlyCapture);
    }

    let shape_ok = match piece.kind {
        PieceKind::Pawn => pawn::is_valid(board, from, to, mover),
        PieceKind::Knight => knight::is_valid(from, to),
        PieceKind::Bishop => sliding::is_valid_bishop(board, from, to),
        PieceKind::Rook => sliding::is_valid_rook(board, from, to),
        PieceKind::Queen => sliding::is_valid_queen(board, from, to),
        PieceKind::King => king::is_valid(from, to),
    };

    if !shape_ok {
        return Err(IllegalMove::InvalidShape(piece.kind));
    }

    if piece.kind == PieceKind::Pawn && to.rank() == pawn::promotion_rank(mover) {
        trace!("pawn reaches promotion rank");
        return Ok(Legality::Promotion);
    }

    Ok(Legality::Standard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::chess::types::{Piece, Square};

    fn sq(rank: u8, file: u8) -> Square {
        Square::new(rank, file).unwrap()
    }

    fn mv(from: (u8, u8), to: (u8, u8)) -> Move {
        Move::from_coords(from, to).unwrap()
    }

    #[test]
    fn test_same_square_rejected_everywhere() {
        let board = Board::standard();
        for square in Square::all() {
            for color in [Color::White, Color::Black] {
                assert_eq!(
                    is_legal(&board, Move::new(square, square), color),
                    Err(IllegalMove::SameSquare)
                );
            }
        }
    }

    #[test]
    fn test_empty_source_rejected() {
        let board = Board::standard();
        assert_eq!(
            is_legal(&board, mv((4, 4), (3, 4)), Color::White),
            Err(IllegalMove::EmptySource)
        );
    }

    #[test]
    fn test_moving_opponent_piece_rejected() {
        let board = Board::standard();
        assert_eq!(
            is_legal(&board, mv((6, 4), (4, 4)), Color::Black),
            Err(IllegalMove::NotYourPiece)
        );
    }

    #[test]
    fn test_friendly_capture_rejected() {
        let board = Board::standard();
        assert_eq!(
            is_legal(&board, mv((7, 0), (6, 0)), Color::White),
            Err(IllegalMove::FriendlyCapture)
        );
    }

    #[test]
    fn test_shape_failure_names_piece() {
        let board = Board::standard();
        assert_eq!(
            is_legal(&board, mv((7, 1), (5, 1)), Color::White),
            Err(IllegalMove::InvalidShape(PieceKind::Knight))
        );
        assert_eq!(
            IllegalMove::InvalidShape(PieceKind::Knight).to_string(),
            "Invalid knight move."
        );
    }

    #[test]
    fn test_promotion_detected() {
        let mut board = Board::empty();
        board.place(sq(1, 3), Piece::new(PieceKind::Pawn, Color::White));
        assert_eq!(
            is_legal(&board, mv((1, 3), (0, 3)), Color::White),
            Ok(Legality::Promotion)
        );

        board.place(sq(6, 2), Piece::new(PieceKind::Pawn, Color::Black));
        board.place(sq(7, 1), Piece::new(PieceKind::Knight, Color::White));
        assert_eq!(
            is_legal(&board, mv((6, 2), (7, 1)), Color::Black),
            Ok(Legality::Promotion)
        );
    }

    #[test]
    fn test_king_may_walk_into_attack() {
        let mut board = Board::empty();
        board.place(sq(7, 4), Piece::new(PieceKind::King, Color::White));
        board.place(sq(0, 3), Piece::new(PieceKind::Rook, Color::Black));
        assert_eq!(
            is_legal(&board, mv((7, 4), (7, 3)), Color::White),
            Ok(Legality::Standard)
        );
    }
}
