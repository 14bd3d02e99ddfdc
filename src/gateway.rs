//! Per-connection message dispatch.
//!
//! The gateway turns decoded frames into registry calls. It remembers a
//! connection's seat as an explicit [`SeatAssignment`] and passes it back
//! on every request; the session itself stays in the registry.

use crate::games::chess::{Move, PromotionChoice, Square};
use crate::protocol::{ClientMessage, ServerMessage, WireError, WireSquare};
use crate::session::{ConnectionId, Outbox, SeatAssignment, SessionError, SessionManager};
use derive_more::{Display, Error, From};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info, instrument, warn};

/// Why a request from a connection was refused.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error, From)]
pub enum RequestError {
    /// The session refused it.
    #[display("{_0}")]
    Session(SessionError),
    /// A value in the payload could not be used.
    #[display("{_0}")]
    Wire(WireError),
}

/// State kept for one open connection.
#[derive(Debug)]
pub struct Connection {
    id: ConnectionId,
    outbox: Outbox,
    seat: Option<SeatAssignment>,
}

impl Connection {
    /// Connection id.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Seat held by this connection, if any.
    pub fn seat(&self) -> Option<&SeatAssignment> {
        self.seat.as_ref()
    }

    fn reply(&self, message: ServerMessage) {
        if self.outbox.send(message).is_err() {
            debug!(connection = self.id, "Outbox closed, dropping reply");
        }
    }
}

/// Dispatches protocol messages into the session registry.
#[derive(Debug, Clone)]
pub struct Gateway {
    sessions: SessionManager,
    next_id: Arc<AtomicU64>,
}

impl Gateway {
    /// Creates a gateway over `sessions`.
    #[instrument(skip(sessions))]
    pub fn new(sessions: SessionManager) -> Self {
        info!("Creating connection gateway");
        Self {
            sessions,
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// The registry behind this gateway.
    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// Registers a new connection whose outbound messages go to `outbox`.
    #[instrument(skip(self, outbox))]
    pub fn connect(&self, outbox: Outbox) -> Connection {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        info!(connection = id, "Connection opened");
        Connection {
            id,
            outbox,
            seat: None,
        }
    }

    /// Handles one inbound text frame.
    ///
    /// Frames that do not decode are dropped without a reply.
    #[instrument(skip(self, connection, frame), fields(connection = connection.id))]
    pub async fn handle_frame(&self, connection: &mut Connection, frame: &str) {
        match ClientMessage::decode(frame) {
            Ok(message) => self.dispatch(connection, message).await,
            Err(e) => debug!(error = %e, "Dropping malformed frame"),
        }
    }

    /// Handles one decoded message. Failures are reported to this connection only.
    #[instrument(skip(self, connection, message), fields(connection = connection.id, kind = message.tag()))]
    pub async fn dispatch(&self, connection: &mut Connection, message: ClientMessage) {
        let result = match message {
            ClientMessage::CreateGame { game_id } => self.create_game(connection, &game_id).await,
            ClientMessage::JoinGame { game_id } => self.join_game(connection, &game_id).await,
            ClientMessage::MakeMove { from, to } => self.make_move(connection, from, to).await,
            ClientMessage::ChoosePromotion { piece } => {
                self.choose_promotion(connection, piece.as_deref()).await
            }
        };

        if let Err(err) = result {
            warn!(error = %err, "Request rejected");
            connection.reply(ServerMessage::error(err));
        }
    }

    /// Releases the connection's seat, if it holds one.
    #[instrument(skip(self, connection), fields(connection = connection.id))]
    pub async fn disconnect(&self, connection: Connection) {
        info!("Connection closed");
        if let Some(seat) = &connection.seat {
            self.sessions.disconnect(seat, connection.id).await;
        }
    }

    async fn create_game(
        &self,
        connection: &mut Connection,
        game_id: &str,
    ) -> Result<(), RequestError> {
        if connection.seat.is_some() {
            return Err(SessionError::AlreadySeated.into());
        }
        let seat = self
            .sessions
            .create_or_attach(game_id, connection.id, connection.outbox.clone())
            .await?;
        connection.seat = Some(seat);
        Ok(())
    }

    async fn join_game(
        &self,
        connection: &mut Connection,
        game_id: &str,
    ) -> Result<(), RequestError> {
        if connection.seat.is_some() {
            return Err(SessionError::AlreadySeated.into());
        }
        let seat = self
            .sessions
            .join(game_id, connection.id, connection.outbox.clone())
            .await?;
        connection.seat = Some(seat);
        Ok(())
    }

    async fn make_move(
        &self,
        connection: &Connection,
        from: WireSquare,
        to: WireSquare,
    ) -> Result<(), RequestError> {
        let seat = connection.seat.as_ref().ok_or(SessionError::NotSeated)?;
        let from = Square::try_from(from)?;
        let to = Square::try_from(to)?;

        self.sessions
            .make_move(seat, connection.id, Move::new(from, to))
            .await?;
        Ok(())
    }

    async fn choose_promotion(
        &self,
        connection: &Connection,
        piece: Option<&str>,
    ) -> Result<(), RequestError> {
        let seat = connection.seat.as_ref().ok_or(SessionError::NotSeated)?;

        self.sessions
            .choose_promotion(seat, connection.id, PromotionChoice::from_letter(piece))
            .await?;
        Ok(())
    }
}
