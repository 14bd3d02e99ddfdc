//! First-class action types for chess.
//!
//! A move is the player's intent; it is validated against a board
//! snapshot before anything is written.

use super::types::{PieceKind, Square};
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// A proposed move from one square to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_new::new)]
pub struct Move {
    /// Square the piece leaves.
    pub from: Square,
    /// Square the piece lands on.
    pub to: Square,
}

impl Move {
    /// Builds a move from raw `(rank, file)` pairs, or `None` if either is off the board.
    #[instrument]
    pub fn from_coords(from: (u8, u8), to: (u8, u8)) -> Option<Self> {
        Some(Self {
            from: Square::new(from.0, from.1)?,
            to: Square::new(to.0, to.1)?,
        })
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

/// What kind of move passed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Legality {
    /// An ordinary move that can be written to the board immediately.
    Standard,
    /// A pawn reaching the far rank; completes only once a piece is chosen.
    Promotion,
}

/// Why a proposed move was rejected.
///
/// The display text is what the requesting player sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum IllegalMove {
    /// Source and destination are the same square.
    #[display("Cannot move to the same square.")]
    SameSquare,

    /// Nothing stands on the source square.
    #[display("No piece at from.")]
    EmptySource,

    /// The piece on the source square belongs to the other side.
    #[display("That piece is not yours.")]
    NotYourPiece,

    /// The destination holds a piece of the mover's own color.
    #[display("Cannot capture your own piece.")]
    FriendlyCapture,

    /// The piece cannot reach the destination under its movement rule.
    #[display("Invalid {_0} move.")]
    InvalidShape(#[error(not(source))] PieceKind),
}
