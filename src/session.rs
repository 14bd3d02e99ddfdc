//! Game session management for networked two-player chess.
//!
//! [`SessionManager`] is the registry: it owns every [`GameSession`] for
//! the life of the process. Each session sits behind its own lock, so
//! requests against one game are applied one at a time while different
//! games never wait on each other.

use crate::games::chess::{Color, Game, GameError, IllegalMove, Move, MoveOutcome, Piece, PromotionChoice};
use crate::protocol::ServerMessage;
use derive_more::{Display, Error};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

/// Client-chosen identifier for a game.
pub type GameId = String;

/// Process-unique identifier for a connection.
pub type ConnectionId = u64;

/// Channel feeding one connection's writer.
pub type Outbox = mpsc::UnboundedSender<ServerMessage>;

/// A session shared between connections.
pub type SharedSession = Arc<tokio::sync::Mutex<GameSession>>;

/// Why a session refused a request.
///
/// The display text is what the requesting player sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum SessionError {
    /// No game with that id has been created.
    #[display("Game not found.")]
    GameNotFound,

    /// Both seats are taken.
    #[display("Game already full.")]
    GameFull,

    /// The connection already holds a seat somewhere.
    #[display("Already seated in a game.")]
    AlreadySeated,

    /// The connection holds no seat in the game it addressed.
    #[display("Not in this game.")]
    NotSeated,

    /// The game itself refused the request.
    #[display("{_0}")]
    Game(GameError),
}

impl From<GameError> for SessionError {
    fn from(err: GameError) -> Self {
        Self::Game(err)
    }
}

impl From<IllegalMove> for SessionError {
    fn from(err: IllegalMove) -> Self {
        Self::Game(GameError::Illegal(err))
    }
}

/// Where a connection sits. Returned to the boundary layer and handed back
/// on every later request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeatAssignment {
    /// Game the seat belongs to.
    pub game_id: GameId,
    /// Color of the seat.
    pub color: Color,
}

/// A filled seat.
#[derive(Debug, Clone)]
pub struct Seat {
    connection: ConnectionId,
    outbox: Outbox,
}

impl Seat {
    /// Connection occupying the seat.
    pub fn connection(&self) -> ConnectionId {
        self.connection
    }
}

/// Coarse lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Fewer than two seats are filled.
    WaitingForSeats,
    /// Both seats filled, moves are accepted.
    InProgress,
    /// Both seats filled, a promotion choice is outstanding.
    SuspendedForPromotion,
}

/// A game with two seats.
#[derive(Debug)]
pub struct GameSession {
    id: GameId,
    game: Game,
    /// Index 0 is white, index 1 is black.
    seats: [Option<Seat>; 2],
}

fn seat_index(color: Color) -> usize {
    match color {
        Color::White => 0,
        Color::Black => 1,
    }
}

const SEAT_COLORS: [Color; 2] = [Color::White, Color::Black];

impl GameSession {
    /// Creates a session with the standard position, white to move, no seats filled.
    #[instrument]
    pub fn new(id: GameId) -> Self {
        info!(game_id = %id, "Creating new game session");
        Self::with_game(id, Game::new())
    }

    /// Creates a session around an existing game.
    pub fn with_game(id: GameId, game: Game) -> Self {
        Self {
            id,
            game,
            seats: [None, None],
        }
    }

    /// Session id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The game being played.
    pub fn game(&self) -> &Game {
        &self.game
    }

    /// Seat of the given color, if filled.
    pub fn seat(&self, color: Color) -> Option<&Seat> {
        self.seats[seat_index(color)].as_ref()
    }

    /// Number of filled seats.
    pub fn occupied_seats(&self) -> usize {
        self.seats.iter().flatten().count()
    }

    /// Checks if both seats are filled.
    pub fn is_full(&self) -> bool {
        self.occupied_seats() == SEAT_COLORS.len()
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> SessionPhase {
        if !self.is_full() {
            SessionPhase::WaitingForSeats
        } else if self.game.pending().is_some() {
            SessionPhase::SuspendedForPromotion
        } else {
            SessionPhase::InProgress
        }
    }

    /// Color of the seat held by `connection`, if any.
    pub fn color_of(&self, connection: ConnectionId) -> Option<Color> {
        SEAT_COLORS
            .into_iter()
            .find(|c| self.seat(*c).is_some_and(|s| s.connection == connection))
    }

    /// Puts `connection` in the first open seat, white before black.
    #[instrument(skip(self, outbox), fields(game_id = %self.id))]
    pub fn take_seat(
        &mut self,
        connection: ConnectionId,
        outbox: Outbox,
    ) -> Result<Color, SessionError> {
        let color = SEAT_COLORS
            .into_iter()
            .find(|c| self.seat(*c).is_none())
            .ok_or_else(|| {
                warn!(connection, "Session already has 2 players");
                SessionError::GameFull
            })?;

        self.seats[seat_index(color)] = Some(Seat { connection, outbox });
        info!(connection, %color, "Seat filled");
        Ok(color)
    }

    /// Empties the seat held by `connection` and tells whoever remains.
    ///
    /// Board, turn and any pending promotion are left as they are.
    #[instrument(skip(self), fields(game_id = %self.id))]
    pub fn vacate(&mut self, connection: ConnectionId) -> Option<Color> {
        let color = self.color_of(connection)?;
        self.seats[seat_index(color)] = None;
        info!(connection, %color, "Seat vacated");
        self.broadcast(ServerMessage::OpponentDisconnected {});
        Some(color)
    }

    /// Plays `mv` for the seat `color`, which `connection` must hold.
    ///
    /// On success every seat receives the new board, except when the move
    /// is a promotion: then only the mover is asked for a piece choice and
    /// nothing else changes.
    #[instrument(skip(self), fields(game_id = %self.id))]
    pub fn apply_move(
        &mut self,
        connection: ConnectionId,
        color: Color,
        mv: Move,
    ) -> Result<MoveOutcome, SessionError> {
        self.check_seat(connection, color)?;

        let outcome = self.game.make_move(color, mv)?;
        match outcome {
            MoveOutcome::Applied { .. } => self.broadcast_update(),
            MoveOutcome::AwaitingPromotion(pending) => self.send_to(
                color,
                ServerMessage::AwaitPromotionChoice {
                    square: pending.destination().into(),
                },
            ),
        }
        Ok(outcome)
    }

    /// Resolves the pending promotion for the seat `color`.
    #[instrument(skip(self), fields(game_id = %self.id))]
    pub fn choose_promotion(
        &mut self,
        connection: ConnectionId,
        color: Color,
        choice: PromotionChoice,
    ) -> Result<Piece, SessionError> {
        self.check_seat(connection, color)?;
        let piece = self.game.choose_promotion(color, choice)?;
        self.broadcast_update();
        Ok(piece)
    }

    /// Current board and turn as a `GAME_UPDATED` message.
    pub fn snapshot(&self) -> ServerMessage {
        ServerMessage::updated(self.game.board(), self.game.turn())
    }

    /// Sends the current board and turn to every seat.
    pub fn broadcast_update(&self) {
        self.broadcast(self.snapshot());
    }

    /// Best-effort send to every filled seat. A failed send is logged and skipped.
    pub fn broadcast(&self, message: ServerMessage) {
        for color in SEAT_COLORS {
            self.send_to(color, message.clone());
        }
    }

    /// Best-effort send to one seat.
    pub fn send_to(&self, color: Color, message: ServerMessage) {
        if let Some(seat) = self.seat(color)
            && seat.outbox.send(message).is_err()
        {
            debug!(game_id = %self.id, %color, connection = seat.connection, "Seat outbox closed, dropping message");
        }
    }

    fn check_seat(&self, connection: ConnectionId, color: Color) -> Result<(), SessionError> {
        if self.seat(color).is_some_and(|s| s.connection == connection) {
            Ok(())
        } else {
            warn!(game_id = %self.id, connection, %color, "Request from connection without that seat");
            Err(SessionError::NotSeated)
        }
    }
}

/// Process-wide registry of game sessions.
///
/// Sessions are never removed: a game whose seats have both emptied can
/// be rejoined with its board as it was.
#[derive(Debug, Clone, Default)]
pub struct SessionManager {
    sessions: Arc<Mutex<HashMap<GameId, SharedSession>>>,
}

impl SessionManager {
    /// Creates an empty registry.
    #[instrument]
    pub fn new() -> Self {
        info!("Creating session manager");
        Self::default()
    }

    fn table(&self) -> MutexGuard<'_, HashMap<GameId, SharedSession>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the session for `id`, creating it if unseen.
    #[instrument(skip(self))]
    pub fn get_or_create(&self, id: &str) -> SharedSession {
        self.table()
            .entry(id.to_string())
            .or_insert_with(|| {
                Arc::new(tokio::sync::Mutex::new(GameSession::new(id.to_string())))
            })
            .clone()
    }

    /// Returns the session for `id`, if it exists.
    #[instrument(skip(self))]
    pub fn get(&self, id: &str) -> Option<SharedSession> {
        let session = self.table().get(id).cloned();
        if session.is_none() {
            debug!(game_id = id, "Session not found");
        }
        session
    }

    /// Lists all session ids.
    #[instrument(skip(self))]
    pub fn list_sessions(&self) -> Vec<GameId> {
        let ids: Vec<_> = self.table().keys().cloned().collect();
        debug!(count = ids.len(), "Listed sessions");
        ids
    }

    /// Handles `CREATE_GAME`: creates the game if unseen, then seats the requester.
    ///
    /// A full game is refused even for a returning player; seats are only
    /// ever reclaimed by joining an open one.
    #[instrument(skip(self, outbox))]
    pub async fn create_or_attach(
        &self,
        game_id: &str,
        connection: ConnectionId,
        outbox: Outbox,
    ) -> Result<SeatAssignment, SessionError> {
        let shared = self.get_or_create(game_id);
        let mut session = shared.lock().await;

        let color = session.take_seat(connection, outbox)?;
        session.send_to(
            color,
            ServerMessage::GameCreated {
                game_id: game_id.to_string(),
                color,
                board: session.game().board().into(),
            },
        );

        Ok(SeatAssignment {
            game_id: game_id.to_string(),
            color,
        })
    }

    /// Handles `JOIN_GAME`: seats the requester in an existing game and
    /// sends the current board to both seats.
    #[instrument(skip(self, outbox))]
    pub async fn join(
        &self,
        game_id: &str,
        connection: ConnectionId,
        outbox: Outbox,
    ) -> Result<SeatAssignment, SessionError> {
        let shared = self.get(game_id).ok_or_else(|| {
            warn!(game_id, "Join for unknown game");
            SessionError::GameNotFound
        })?;
        let mut session = shared.lock().await;

        let color = session.take_seat(connection, outbox)?;
        session.send_to(
            color,
            ServerMessage::GameJoined {
                game_id: game_id.to_string(),
                color,
                board: session.game().board().into(),
            },
        );
        session.broadcast_update();

        Ok(SeatAssignment {
            game_id: game_id.to_string(),
            color,
        })
    }

    /// Handles `MAKE_MOVE` for a seated connection.
    #[instrument(skip(self), fields(game_id = %seat.game_id, color = %seat.color))]
    pub async fn make_move(
        &self,
        seat: &SeatAssignment,
        connection: ConnectionId,
        mv: Move,
    ) -> Result<MoveOutcome, SessionError> {
        let shared = self.get(&seat.game_id).ok_or(SessionError::GameNotFound)?;
        let mut session = shared.lock().await;
        session.apply_move(connection, seat.color, mv)
    }

    /// Handles `CHOOSE_PROMOTION` for a seated connection.
    #[instrument(skip(self), fields(game_id = %seat.game_id, color = %seat.color))]
    pub async fn choose_promotion(
        &self,
        seat: &SeatAssignment,
        connection: ConnectionId,
        choice: PromotionChoice,
    ) -> Result<Piece, SessionError> {
        let shared = self.get(&seat.game_id).ok_or(SessionError::GameNotFound)?;
        let mut session = shared.lock().await;
        session.choose_promotion(connection, seat.color, choice)
    }

    /// Releases the seat held by `connection` after its transport closed.
    #[instrument(skip(self), fields(game_id = %seat.game_id))]
    pub async fn disconnect(&self, seat: &SeatAssignment, connection: ConnectionId) {
        let Some(shared) = self.get(&seat.game_id) else {
            return;
        };
        shared.lock().await.vacate(connection);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::chess::{Board, PieceKind, Square};
    use tokio::sync::mpsc::UnboundedReceiver;

    fn outbox() -> (Outbox, UnboundedReceiver<ServerMessage>) {
        mpsc::unbounded_channel()
    }

    fn mv(from: (u8, u8), to: (u8, u8)) -> Move {
        Move::from_coords(from, to).unwrap()
    }

    #[test]
    fn test_seats_fill_white_then_black() {
        let mut session = GameSession::new("g".to_string());
        assert_eq!(session.phase(), SessionPhase::WaitingForSeats);
        assert_eq!(session.take_seat(1, outbox().0), Ok(Color::White));
        assert_eq!(session.take_seat(2, outbox().0), Ok(Color::Black));
        assert_eq!(session.take_seat(3, outbox().0), Err(SessionError::GameFull));
        assert_eq!(session.phase(), SessionPhase::InProgress);
        assert_eq!(session.color_of(2), Some(Color::Black));
        assert_eq!(session.color_of(3), None);
    }

    #[test]
    fn test_vacated_seat_reused() {
        let mut session = GameSession::new("g".to_string());
        session.take_seat(1, outbox().0).unwrap();
        let (tx, mut rx) = outbox();
        session.take_seat(2, tx).unwrap();

        assert_eq!(session.vacate(1), Some(Color::White));
        assert_eq!(rx.try_recv().unwrap(), ServerMessage::OpponentDisconnected {});
        assert_eq!(session.take_seat(3, outbox().0), Ok(Color::White));
    }

    #[test]
    fn test_move_requires_matching_seat() {
        let mut session = GameSession::new("g".to_string());
        session.take_seat(1, outbox().0).unwrap();
        session.take_seat(2, outbox().0).unwrap();
        assert_eq!(
            session.apply_move(2, Color::White, mv((6, 4), (4, 4))),
            Err(SessionError::NotSeated)
        );
    }

    #[test]
    fn test_promotion_only_notifies_mover() {
        let mut board = Board::empty();
        board.place(Square::new(1, 0).unwrap(), Piece::new(PieceKind::Pawn, Color::White));
        let mut session = GameSession::with_game("g".to_string(), Game::from_position(board, Color::White));
        let (white_tx, mut white_rx) = outbox();
        let (black_tx, mut black_rx) = outbox();
        session.take_seat(1, white_tx).unwrap();
        session.take_seat(2, black_tx).unwrap();

        session.apply_move(1, Color::White, mv((1, 0), (0, 0))).unwrap();
        assert_eq!(session.phase(), SessionPhase::SuspendedForPromotion);
        assert_eq!(
            white_rx.try_recv().unwrap(),
            ServerMessage::AwaitPromotionChoice {
                square: crate::protocol::WireSquare([0, 0])
            }
        );
        assert!(black_rx.try_recv().is_err());
    }

    #[test]
    fn test_closed_outbox_does_not_block_other_seat() {
        let mut session = GameSession::new("g".to_string());
        let (white_tx, white_rx) = outbox();
        let (black_tx, mut black_rx) = outbox();
        session.take_seat(1, white_tx).unwrap();
        session.take_seat(2, black_tx).unwrap();
        drop(white_rx);

        session.apply_move(1, Color::White, mv((6, 4), (4, 4))).unwrap();
        assert!(matches!(
            black_rx.try_recv().unwrap(),
            ServerMessage::GameUpdated { current_player: Color::Black, .. }
        ));
    }

    #[tokio::test]
    async fn test_registry_get_or_create_is_idempotent() {
        let manager = SessionManager::new();
        let a = manager.get_or_create("g1");
        let b = manager.get_or_create("g1");
        assert!(Arc::ptr_eq(&a, &b));
        assert!(manager.get("g2").is_none());
        assert_eq!(manager.list_sessions(), vec!["g1".to_string()]);
    }

    #[tokio::test]
    async fn test_join_unknown_game() {
        let manager = SessionManager::new();
        assert_eq!(
            manager.join("nope", 1, outbox().0).await,
            Err(SessionError::GameNotFound)
        );
        assert!(manager.get("nope").is_none());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(SessionError::GameFull.to_string(), "Game already full.");
        assert_eq!(
            SessionError::from(GameError::NotYourTurn).to_string(),
            "Not your turn."
        );
        assert_eq!(
            SessionError::from(IllegalMove::SameSquare).to_string(),
            "Cannot move to the same square."
        );
    }
}
