//! Chess rules and game state.
//!
//! Everything here is pure: no I/O, no locking. Sessions and the
//! network layer build on top of [`Game`].

mod action;
mod game;
mod invariants;
mod promotion;
mod types;

pub mod rules;

pub use action::{IllegalMove, Legality, Move};
pub use game::{Game, GameError, MoveOutcome};
pub use invariants::{ChessInvariants, Invariant, InvariantSet, PieceCountInvariant, SingleMoveInvariant};
pub use promotion::{PendingPromotion, PromotionChoice};
pub use rules::is_legal;
pub use types::{Board, Color, Piece, PieceKind, Square};
