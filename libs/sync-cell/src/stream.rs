use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use crate::error::SyncError;
use crate::events::{decode_event, encode_event, LiveEvent, OutboundEvent};

/// The live half of the remote client: one bidirectional event connection per
/// active session. Implementations are only considered subscribed after the
/// per-user room join has been emitted; an unsubscribed stream is silent and
/// the controller leans on polling instead.
#[async_trait]
pub trait EventStream: Send {
    /// Connect and perform the join-room handshake for this user.
    async fn connect(&mut self, user_id: &str) -> Result<(), SyncError>;

    async fn send(&mut self, event: &OutboundEvent) -> Result<(), SyncError>;

    /// Next inbound event; `None` means the stream disconnected. Decode
    /// failures surface as errors so the caller can log and move on without
    /// tearing the connection down.
    async fn next_event(&mut self) -> Option<Result<LiveEvent, SyncError>>;

    async fn close(&mut self);

    fn is_subscribed(&self) -> bool;
}

type WsConnection = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub struct WebSocketEventStream {
    url: String,
    connection: Option<WsConnection>,
    subscribed: bool,
}

impl WebSocketEventStream {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            connection: None,
            subscribed: false,
        }
    }
}

#[async_trait]
impl EventStream for WebSocketEventStream {
    async fn connect(&mut self, user_id: &str) -> Result<(), SyncError> {
        self.subscribed = false;

        let (connection, _) = connect_async(&self.url)
            .await
            .map_err(|e| SyncError::Stream(format!("connect failed: {}", e)))?;
        self.connection = Some(connection);
        debug!("Event stream connected to {}", self.url);

        // Events are not trusted until the room join has gone out.
        self.send(&OutboundEvent::JoinRoom {
            user_id: user_id.to_string(),
        })
        .await?;
        self.subscribed = true;

        info!("Joined room for user {}", user_id);
        Ok(())
    }

    async fn send(&mut self, event: &OutboundEvent) -> Result<(), SyncError> {
        let payload = encode_event(event)?;
        let result = match self.connection.as_mut() {
            Some(connection) => connection.send(Message::Text(payload.into())).await,
            None => return Err(SyncError::StreamUnavailable),
        };

        if let Err(e) = result {
            self.subscribed = false;
            return Err(SyncError::Stream(format!("send failed: {}", e)));
        }
        Ok(())
    }

    async fn next_event(&mut self) -> Option<Result<LiveEvent, SyncError>> {
        loop {
            let inbound = match self.connection.as_mut() {
                Some(connection) => connection.next().await,
                None => return None,
            };

            match inbound {
                Some(Ok(Message::Text(text))) => return Some(decode_event(&text)),
                Some(Ok(Message::Close(_))) | None => {
                    warn!("Event stream closed by server");
                    self.connection = None;
                    self.subscribed = false;
                    return None;
                }
                Some(Ok(_)) => continue, // ping/pong/binary frames
                Some(Err(e)) => {
                    self.connection = None;
                    self.subscribed = false;
                    return Some(Err(SyncError::Stream(e.to_string())));
                }
            }
        }
    }

    async fn close(&mut self) {
        if let Some(mut connection) = self.connection.take() {
            let _ = connection.close(None).await;
        }
        self.subscribed = false;
        debug!("Event stream closed");
    }

    fn is_subscribed(&self) -> bool {
        self.subscribed && self.connection.is_some()
    }
}
