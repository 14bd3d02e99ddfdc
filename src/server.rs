//! HTTP and WebSocket server setup.
//!
//! `GET /ws` upgrades to the game protocol. Everything else is answered
//! from the configured public directory.

use crate::config::ServerConfig;
use crate::gateway::Gateway;
use crate::protocol::ServerMessage;
use crate::session::SessionManager;
use anyhow::Result;
use axum::Router;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::handler::HandlerWithoutStateExt;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, instrument};

/// Game server: owns the session registry and the HTTP surface.
#[derive(Debug, Clone)]
pub struct GameServer {
    gateway: Gateway,
    config: ServerConfig,
}

impl GameServer {
    /// Creates a server with a fresh session registry.
    pub fn new(config: ServerConfig) -> Self {
        Self::with_sessions(config, SessionManager::new())
    }

    /// Creates a server over an existing session registry.
    #[instrument(skip(sessions))]
    pub fn with_sessions(config: ServerConfig, sessions: SessionManager) -> Self {
        info!("Creating game server with shared session manager");
        Self {
            gateway: Gateway::new(sessions),
            config,
        }
    }

    /// Builds the router.
    pub fn router(&self) -> Router {
        let static_files = ServeDir::new(self.config.public_dir())
            .not_found_service(not_found.into_service());

        Router::new()
            .route("/ws", get(ws_handler))
            .fallback_service(static_files)
            .layer(TraceLayer::new_for_http())
            .with_state(self.gateway.clone())
    }

    /// Binds the configured address and serves until Ctrl+C.
    #[instrument(skip(self), fields(host = %self.config.host(), port = self.config.port()))]
    pub async fn serve(self) -> Result<()> {
        let listener =
            tokio::net::TcpListener::bind((self.config.host().as_str(), *self.config.port()))
                .await?;
        info!(
            "Server ready at http://{}:{}/ (WebSocket on /ws)",
            self.config.host(),
            self.config.port()
        );

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Server stopped");
        Ok(())
    }
}

async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not found")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}

async fn ws_handler(ws: WebSocketUpgrade, State(gateway): State<Gateway>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, gateway))
}

/// Runs one connection: a reader loop feeding the gateway and a writer
/// task draining the connection's outbox.
async fn handle_socket(socket: WebSocket, gateway: Gateway) {
    let (mut sender, mut receiver) = socket.split();
    let (outbox, mut inbox) = mpsc::unbounded_channel::<ServerMessage>();
    let mut connection = gateway.connect(outbox);
    let connection_id = connection.id();

    let writer = tokio::spawn(async move {
        while let Some(message) = inbox.recv().await {
            let frame = match message.encode() {
                Ok(frame) => frame,
                Err(e) => {
                    error!(error = %e, "Failed to encode outbound message");
                    continue;
                }
            };
            if sender.send(Message::Text(frame.into())).await.is_err() {
                debug!(connection = connection_id, "Socket closed while sending");
                break;
            }
        }
    });

    while let Some(frame) = receiver.next().await {
        match frame {
            Ok(Message::Text(text)) => gateway.handle_frame(&mut connection, text.as_str()).await,
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                debug!(connection = connection_id, error = %e, "Socket read failed");
                break;
            }
        }
    }

    gateway.disconnect(connection).await;
    writer.abort();
}
