//! Strictly Chess library - authoritative server for two-player chess
//!
//! The server owns game identity, seat assignment, turn order, move
//! legality and the pawn promotion handshake. Clients only render what
//! they are sent.
//!
//! # Architecture
//!
//! - **Games**: pure chess rules and game state (board, validator, promotion)
//! - **Session**: two-seat game sessions and the process-wide registry
//! - **Protocol**: JSON wire records and the single-letter piece encoding
//! - **Gateway**: per-connection dispatch into the registry
//! - **Server**: axum WebSocket endpoint plus static file fallback
//!
//! # Example
//!
//! ```no_run
//! use strictly_chess::{GameServer, ServerConfig};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let server = GameServer::new(ServerConfig::default());
//! server.serve().await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod config;
mod gateway;
mod games;
mod protocol;
mod server;
mod session;

// Crate-level exports - Configuration
pub use config::{ConfigError, ServerConfig};

// Crate-level exports - Server types
pub use gateway::{Connection, Gateway, RequestError};
pub use server::GameServer;

// Crate-level exports - Session management
pub use session::{
    ConnectionId, GameId, GameSession, Outbox, Seat, SeatAssignment, SessionError,
    SessionManager, SessionPhase, SharedSession,
};

// Crate-level exports - Wire protocol
pub use protocol::{
    ClientMessage, ServerMessage, WireBoard, WireError, WireSquare, encode_piece,
};

// Crate-level exports - Chess types
pub use games::chess::{
    Board, ChessInvariants, Color, Game, GameError, IllegalMove, Invariant, InvariantSet,
    Legality, Move, MoveOutcome, PendingPromotion, Piece, PieceCountInvariant, PieceKind,
    PromotionChoice, SingleMoveInvariant, Square, is_legal,
};

/// Per-piece movement rules.
pub use games::chess::rules;
