//! King movement. No castling.

use super::super::types::Square;

/// A king steps at most one square along each axis.
pub fn is_valid(from: Square, to: Square) -> bool {
    let (d_rank, d_file) = from.delta(to);
    d_rank.abs() <= 1 && d_file.abs() <= 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_king_steps() {
        let from = Square::new(7, 4).unwrap();
        assert!(is_valid(from, Square::new(6, 5).unwrap()));
        assert!(is_valid(from, Square::new(7, 3).unwrap()));
        assert!(!is_valid(from, Square::new(7, 6).unwrap()));
        assert!(!is_valid(from, Square::new(5, 4).unwrap()));
    }
}
