//! Pawn promotion handshake.
//!
//! When a pawn reaches the far rank the move is parked in a
//! [`PendingPromotion`] instead of being written to the board. The board
//! stays untouched until the promoting side picks a piece.

use super::action::Move;
use super::types::{Color, Piece, PieceKind, Square};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// A pawn move waiting for the promoting player's piece choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingPromotion {
    mv: Move,
    color: Color,
}

impl PendingPromotion {
    /// Parks `mv` for `color`.
    pub fn new(mv: Move, color: Color) -> Self {
        Self { mv, color }
    }

    /// The move that reached the far rank.
    pub fn mv(&self) -> Move {
        self.mv
    }

    /// Side that owns the promoting pawn.
    pub fn color(&self) -> Color {
        self.color
    }

    /// Square the pawn leaves.
    pub fn source(&self) -> Square {
        self.mv.from
    }

    /// Square the promoted piece lands on.
    pub fn destination(&self) -> Square {
        self.mv.to
    }
}

/// Piece a pawn can become.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, strum::EnumIter)]
pub enum PromotionChoice {
    /// Queen, also the fallback for anything unrecognised.
    #[default]
    Queen,
    /// Rook.
    Rook,
    /// Bishop.
    Bishop,
    /// Knight.
    Knight,
}

impl PromotionChoice {
    /// Reads a requested piece letter.
    ///
    /// `q`, `r`, `b` and `n` (either case) select that piece. Anything else,
    /// including no letter at all, resolves to a queen; a choice request is
    /// never rejected for its content.
    #[instrument]
    pub fn from_letter(letter: Option<&str>) -> Self {
        let choice = match letter.map(str::to_ascii_lowercase).as_deref() {
            Some("q") => Self::Queen,
            Some("r") => Self::Rook,
            Some("b") => Self::Bishop,
            Some("n") => Self::Knight,
            _ => Self::Queen,
        };
        debug!(?choice, "Resolved promotion choice");
        choice
    }

    /// The piece kind this choice produces.
    pub fn kind(self) -> PieceKind {
        match self {
            Self::Queen => PieceKind::Queen,
            Self::Rook => PieceKind::Rook,
            Self::Bishop => PieceKind::Bishop,
            Self::Knight => PieceKind::Knight,
        }
    }

    /// The piece this choice produces for `color`.
    pub fn piece(self, color: Color) -> Piece {
        Piece::new(self.kind(), color)
    }
}
