//! Knight movement.

use super::super::types::Square;

/// A knight jumps (1,2) or (2,1) in any direction, ignoring what lies between.
pub fn is_valid(from: Square, to: Square) -> bool {
    let (d_rank, d_file) = from.delta(to);
    matches!((d_rank.abs(), d_file.abs()), (1, 2) | (2, 1))
}
