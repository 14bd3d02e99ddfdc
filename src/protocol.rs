//! Wire protocol: JSON records shaped `{ "type": TAG, "payload": {...} }`.
//!
//! Pieces travel as single letters (upper case = white, empty string =
//! no piece). That encoding lives here and nowhere else; the rules work
//! on [`Piece`] values.

use crate::games::chess::{Board, Color, Piece, PieceKind, Square};
use derive_more::{Display, Error};
use serde::{Deserialize, Deserializer, Serialize};

/// A square as sent by clients: `[rank, file]`.
///
/// Kept signed and unchecked so that out-of-range coordinates decode and
/// can be answered with an error rather than silently dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireSquare(pub [i64; 2]);

impl From<Square> for WireSquare {
    fn from(square: Square) -> Self {
        Self([i64::from(square.rank()), i64::from(square.file())])
    }
}

impl TryFrom<WireSquare> for Square {
    type Error = WireError;

    fn try_from(wire: WireSquare) -> Result<Self, Self::Error> {
        let [rank, file] = wire.0;
        let rank = u8::try_from(rank).map_err(|_| WireError::SquareOutOfRange)?;
        let file = u8::try_from(file).map_err(|_| WireError::SquareOutOfRange)?;
        Square::new(rank, file).ok_or(WireError::SquareOutOfRange)
    }
}

/// The full board as letters, `[rank][file]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireBoard(pub [[String; 8]; 8]);

impl From<&Board> for WireBoard {
    fn from(board: &Board) -> Self {
        Self((*board.rows()).map(|row| row.map(encode_piece)))
    }
}

/// Problems turning wire values into domain values.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum WireError {
    /// A coordinate was outside 0-7.
    #[display("Square out of range.")]
    SquareOutOfRange,
}

/// Encodes a board cell.
pub fn encode_piece(cell: Option<Piece>) -> String {
    let Some(piece) = cell else {
        return String::new();
    };
    let letter = match piece.kind {
        PieceKind::Pawn => 'p',
        PieceKind::Knight => 'n',
        PieceKind::Bishop => 'b',
        PieceKind::Rook => 'r',
        PieceKind::Queen => 'q',
        PieceKind::King => 'k',
    };
    match piece.color {
        Color::White => letter.to_ascii_uppercase().to_string(),
        Color::Black => letter.to_string(),
    }
}

/// Client → server messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "payload",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum ClientMessage {
    /// Create a game, or take an open seat in an existing one.
    CreateGame {
        /// Client-chosen game identifier.
        game_id: String,
    },
    /// Take an open seat in an existing game.
    JoinGame {
        /// Identifier of the game to join.
        game_id: String,
    },
    /// Move a piece in the game the connection is seated in.
    MakeMove {
        /// Source square.
        from: WireSquare,
        /// Destination square.
        to: WireSquare,
    },
    /// Pick the piece for a pending promotion.
    ChoosePromotion {
        /// One of `q`, `r`, `b`, `n`; anything else means queen.
        #[serde(default, deserialize_with = "letter_or_none")]
        piece: Option<String>,
    },
}

impl ClientMessage {
    /// Decodes one text frame.
    pub fn decode(frame: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(frame)
    }

    /// Protocol tag, for logging.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::CreateGame { .. } => "CREATE_GAME",
            Self::JoinGame { .. } => "JOIN_GAME",
            Self::MakeMove { .. } => "MAKE_MOVE",
            Self::ChoosePromotion { .. } => "CHOOSE_PROMOTION",
        }
    }
}

/// Keeps a string `piece` and treats any other JSON value as absent, so a
/// promotion choice always decodes.
fn letter_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        Some(serde_json::Value::String(letter)) => Ok(Some(letter)),
        _ => Ok(None),
    }
}

/// Server → client messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "payload",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum ServerMessage {
    /// Reply to `CREATE_GAME`.
    GameCreated {
        /// The game the connection is now seated in.
        game_id: String,
        /// Seat color.
        color: Color,
        /// Current board.
        board: WireBoard,
    },
    /// Reply to `JOIN_GAME`.
    GameJoined {
        /// The game the connection is now seated in.
        game_id: String,
        /// Seat color.
        color: Color,
        /// Current board.
        board: WireBoard,
    },
    /// Full board after any change, sent to every seat.
    GameUpdated {
        /// Current board.
        board: WireBoard,
        /// Color to move.
        current_player: Color,
    },
    /// The requester's pawn reached the far rank and needs a piece choice.
    AwaitPromotionChoice {
        /// Destination square of the promoting pawn.
        square: WireSquare,
    },
    /// The other seat's connection went away.
    OpponentDisconnected {},
    /// A request was refused.
    Error {
        /// Reason shown to the player.
        message: String,
    },
}

impl ServerMessage {
    /// Builds a `GAME_UPDATED` snapshot.
    pub fn updated(board: &Board, current_player: Color) -> Self {
        Self::GameUpdated {
            board: board.into(),
            current_player,
        }
    }

    /// Builds an `ERROR` reply from anything displayable.
    pub fn error(message: impl std::fmt::Display) -> Self {
        Self::Error {
            message: message.to_string(),
        }
    }

    /// Encodes the message as one text frame.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
