//! Rook, bishop and queen movement.
//!
//! Sliding pieces travel in a straight line and may not pass through
//! occupied squares. The destination itself is checked elsewhere.

use super::super::types::{Board, Square};

/// Checks that every square strictly between `from` and `to` is empty.
///
/// Only meaningful when the two squares share a rank, file or diagonal.
pub fn path_is_clear(board: &Board, from: Square, to: Square) -> bool {
    let (d_rank, d_file) = from.delta(to);
    let step = (d_rank.signum(), d_file.signum());

    let mut current = from;
    loop {
        current = match current.offset(step.0, step.1) {
            Some(next) => next,
            None => return false,
        };
        if current == to {
            return true;
        }
        if !board.is_empty(current) {
            return false;
        }
    }
}

/// Same rank or same file, with a clear path.
pub fn is_valid_rook(board: &Board, from: Square, to: Square) -> bool {
    let (d_rank, d_file) = from.delta(to);
    (d_rank == 0 || d_file == 0) && path_is_clear(board, from, to)
}

/// Equal rank and file distance, with a clear path.
pub fn is_valid_bishop(board: &Board, from: Square, to: Square) -> bool {
    let (d_rank, d_file) = from.delta(to);
    d_rank.abs() == d_file.abs() && path_is_clear(board, from, to)
}

/// Either a rook move or a bishop move.
pub fn is_valid_queen(board: &Board, from: Square, to: Square) -> bool {
    is_valid_rook(board, from, to) || is_valid_bishop(board, from, to)
}
