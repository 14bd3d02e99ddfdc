//! Pawn movement.

use super::super::types::{Board, Color, Square};

/// Rank step a pawn of `color` takes when moving forward.
///
/// White advances toward rank 0.
pub fn direction(color: Color) -> i8 {
    match color {
        Color::White => -1,
        Color::Black => 1,
    }
}

/// Rank a pawn of `color` starts on.
pub fn start_rank(color: Color) -> u8 {
    match color {
        Color::White => 6,
        Color::Black => 1,
    }
}

/// Rank on which a pawn of `color` promotes.
pub fn promotion_rank(color: Color) -> u8 {
    match color {
        Color::White => 0,
        Color::Black => 7,
    }
}

/// Checks the pawn movement rule for a pawn of `color` going `from` → `to`.
///
/// Forward one onto an empty square, forward two from the start rank
/// with both squares empty, or one diagonal step onto an enemy piece.
pub fn is_valid(board: &Board, from: Square, to: Square, color: Color) -> bool {
    let dir = direction(color);
    let (d_rank, d_file) = from.delta(to);

    if d_file == 0 && d_rank == dir {
        return board.is_empty(to);
    }

    if d_file == 0 && d_rank == 2 * dir && from.rank() == start_rank(color) {
        return from
            .offset(dir, 0)
            .is_some_and(|between| board.is_empty(between))
            && board.is_empty(to);
    }

    if d_file.abs() == 1 && d_rank == dir {
        return board.is_occupied_by_color(to, color.opponent());
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::chess::types::{Piece, PieceKind};

    fn sq(rank: u8, file: u8) -> Square {
        Square::new(rank, file).unwrap()
    }

    #[test]
    fn test_single_and_double_push() {
        let board = Board::standard();
        assert!(is_valid(&board, sq(6, 4), sq(5, 4), Color::White));
        assert!(is_valid(&board, sq(6, 4), sq(4, 4), Color::White));
        assert!(is_valid(&board, sq(1, 2), sq(3, 2), Color::Black));
        assert!(!is_valid(&board, sq(6, 4), sq(3, 4), Color::White));
    }

    #[test]
    fn test_no_backward_move() {
        let mut board = Board::empty();
        board.place(sq(4, 4), Piece::new(PieceKind::Pawn, Color::White));
        assert!(!is_valid(&board, sq(4, 4), sq(5, 4), Color::White));
    }

    #[test]
    fn test_double_push_only_from_start_rank() {
        let mut board = Board::empty();
        board.place(sq(5, 4), Piece::new(PieceKind::Pawn, Color::White));
        assert!(!is_valid(&board, sq(5, 4), sq(3, 4), Color::White));
    }

    #[test]
    fn test_double_push_blocked() {
        let mut board = Board::standard();
        board.place(sq(5, 4), Piece::new(PieceKind::Knight, Color::Black));
        assert!(!is_valid(&board, sq(6, 4), sq(4, 4), Color::White));

        let mut board = Board::standard();
        board.place(sq(4, 4), Piece::new(PieceKind::Knight, Color::Black));
        assert!(!is_valid(&board, sq(6, 4), sq(4, 4), Color::White));
    }

    #[test]
    fn test_forward_capture_not_allowed() {
        let mut board = Board::standard();
        board.place(sq(5, 4), Piece::new(PieceKind::Pawn, Color::Black));
        assert!(!is_valid(&board, sq(6, 4), sq(5, 4), Color::White));
    }

    #[test]
    fn test_diagonal_needs_enemy() {
        let mut board = Board::standard();
        assert!(!is_valid(&board, sq(6, 4), sq(5, 5), Color::White));
        board.place(sq(5, 5), Piece::new(PieceKind::Bishop, Color::Black));
        assert!(is_valid(&board, sq(6, 4), sq(5, 5), Color::White));
    }
}
