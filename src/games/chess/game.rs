//! Turn-ordered chess game: board, turn owner and the promotion handshake.

use super::action::{IllegalMove, Legality, Move};
use super::invariants::{ChessInvariants, InvariantSet};
use super::promotion::{PendingPromotion, PromotionChoice};
use super::rules;
use super::types::{Board, Color, Piece};
use derive_more::{Display, Error};
use tracing::{debug, info, instrument, warn};

/// Result of a move that passed every check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The move was written and the turn passed to the opponent.
    Applied {
        /// Piece removed from the destination, if any. Not kept anywhere else.
        captured: Option<Piece>,
    },
    /// A pawn reached the far rank; nothing was written yet.
    AwaitingPromotion(PendingPromotion),
}

/// Why the game refused a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum GameError {
    /// A promotion is pending, so no ordinary move is accepted from either side.
    #[display("Awaiting promotion choice.")]
    AwaitingPromotion,

    /// The requester does not own the turn.
    #[display("Not your turn.")]
    NotYourTurn,

    /// A promotion choice arrived with nothing pending.
    #[display("No pending promotion.")]
    NoPendingPromotion,

    /// The opponent tried to resolve someone else's promotion.
    #[display("Not your promotion.")]
    NotYourPromotion,

    /// The move broke a movement rule.
    #[display("{_0}")]
    Illegal(IllegalMove),
}

impl From<IllegalMove> for GameError {
    fn from(err: IllegalMove) -> Self {
        Self::Illegal(err)
    }
}

/// Chess game engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    board: Board,
    turn: Color,
    pending: Option<PendingPromotion>,
}

impl Game {
    /// Creates a game in the standard starting position with white to move.
    #[instrument]
    pub fn new() -> Self {
        Self::from_position(Board::standard(), Color::White)
    }

    /// Creates a game from an arbitrary position.
    pub fn from_position(board: Board, turn: Color) -> Self {
        Self {
            board,
            turn,
            pending: None,
        }
    }

    /// Returns the board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Returns the color allowed to move.
    pub fn turn(&self) -> Color {
        self.turn
    }

    /// Returns the pending promotion, if the game is suspended on one.
    pub fn pending(&self) -> Option<&PendingPromotion> {
        self.pending.as_ref()
    }

    /// Plays `mv` for `mover`.
    ///
    /// A pawn reaching the far rank is parked as a pending promotion and
    /// leaves both board and turn untouched. Any other legal move is written
    /// and the turn flips.
    #[instrument(skip(self), fields(turn = %self.turn))]
    pub fn make_move(&mut self, mover: Color, mv: Move) -> Result<MoveOutcome, GameError> {
        if self.pending.is_some() {
            warn!("Move attempted while promotion pending");
            return Err(GameError::AwaitingPromotion);
        }

        if mover != self.turn {
            warn!("Player tried to move out of turn");
            return Err(GameError::NotYourTurn);
        }

        match rules::is_legal(&self.board, mv, mover)? {
            Legality::Promotion => {
                let pending = PendingPromotion::new(mv, mover);
                self.pending = Some(pending);
                info!(square = %mv.to, "Pawn reached promotion rank");
                Ok(MoveOutcome::AwaitingPromotion(pending))
            }
            Legality::Standard => {
                let captured = self.write_move(mv, None);
                self.turn = self.turn.opponent();
                info!(next = %self.turn, ?captured, "Move applied");
                Ok(MoveOutcome::Applied { captured })
            }
        }
    }

    /// Resolves the pending promotion for `requester` with `choice`.
    ///
    /// Returns the piece placed on the destination square.
    #[instrument(skip(self))]
    pub fn choose_promotion(
        &mut self,
        requester: Color,
        choice: PromotionChoice,
    ) -> Result<Piece, GameError> {
        let pending = self.pending.ok_or_else(|| {
            warn!("Promotion choice with nothing pending");
            GameError::NoPendingPromotion
        })?;

        if pending.color() != requester {
            warn!(owner = %pending.color(), "Promotion choice from wrong side");
            return Err(GameError::NotYourPromotion);
        }

        let piece = choice.piece(pending.color());
        self.write_move(pending.mv(), Some(piece));
        self.pending = None;
        self.turn = self.turn.opponent();
        info!(%piece, square = %pending.destination(), next = %self.turn, "Promotion resolved");
        Ok(piece)
    }

    /// Vacates the source and overwrites the destination, returning the captured piece.
    fn write_move(&mut self, mv: Move, replacement: Option<Piece>) -> Option<Piece> {
        let before = self.board.clone();
        let moving = self.board.clear(mv.from);
        let captured = self.board.clear(mv.to);
        if let Some(piece) = replacement.or(moving) {
            self.board.place(mv.to, piece);
        }
        debug_assert!(
            ChessInvariants::check_transition(&before, &self.board).is_ok(),
            "board transition broke an invariant"
        );
        debug!(%mv, "Board updated");
        captured
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}
