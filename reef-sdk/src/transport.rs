//! The raw message-socket abstraction the listener runs on.
//!
//! The listener only needs four capabilities: connect, send a text frame,
//! receive text frames, close. Keeping that surface behind a trait pair
//! means one listener implementation serves any socket library, and tests
//! can drive the full state machine with a scripted in-memory transport.

use async_trait::async_trait;
use futures::stream::{SplitSink, StreamExt};
use futures::SinkExt;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::config::SdkConfig;
use crate::error::SocketError;

/// The write half of an established connection.
#[async_trait]
pub trait MessageSink: Send {
    async fn send(&mut self, text: String) -> Result<(), SocketError>;

    async fn close(&mut self) -> Result<(), SocketError>;
}

/// An established bidirectional connection: a sink for outbound frames and
/// a channel of inbound text frames. The channel closing means the remote
/// side went away.
pub struct Connection {
    pub sink: Box<dyn MessageSink>,
    pub inbound: mpsc::Receiver<Result<String, SocketError>>,
}

/// Something that can establish a [`Connection`].
#[async_trait]
pub trait MessageTransport: Send + Sync {
    async fn connect(&self) -> Result<Connection, SocketError>;
}

/// The production transport over a WebSocket endpoint.
pub struct WebSocketTransport {
    url: String,
    inbound_buffer: usize,
}

impl WebSocketTransport {
    pub fn new(url: impl Into<String>, inbound_buffer: usize) -> Self {
        Self {
            url: url.into(),
            inbound_buffer,
        }
    }

    pub fn from_config(config: &SdkConfig) -> Self {
        Self::new(&config.socket.ws_url, config.channels.inbound_buffer)
    }
}

#[async_trait]
impl MessageTransport for WebSocketTransport {
    async fn connect(&self) -> Result<Connection, SocketError> {
        let (socket, _response) = connect_async(self.url.as_str())
            .await
            .map_err(|e| SocketError::Transport(e.to_string()))?;
        let (write, mut read) = socket.split();
        let (inbound_tx, inbound_rx) = mpsc::channel(self.inbound_buffer);

        // Read pump: forwards text frames until the socket or the receiver
        // goes away. Ping/pong is handled inside tungstenite.
        tokio::spawn(async move {
            while let Some(frame) = read.next().await {
                let forwarded = match frame {
                    Ok(Message::Text(text)) => inbound_tx.send(Ok(text)).await,
                    Ok(Message::Close(_)) => break,
                    Ok(_) => continue,
                    Err(e) => {
                        let _ = inbound_tx
                            .send(Err(SocketError::Transport(e.to_string())))
                            .await;
                        break;
                    }
                };
                if forwarded.is_err() {
                    break;
                }
            }
            tracing::debug!("socket read pump finished");
        });

        Ok(Connection {
            sink: Box::new(WebSocketSink { write }),
            inbound: inbound_rx,
        })
    }
}

struct WebSocketSink {
    write: SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>,
}

#[async_trait]
impl MessageSink for WebSocketSink {
    async fn send(&mut self, text: String) -> Result<(), SocketError> {
        self.write
            .send(Message::Text(text))
            .await
            .map_err(|e| SocketError::Transport(e.to_string()))
    }

    async fn close(&mut self) -> Result<(), SocketError> {
        self.write
            .send(Message::Close(None))
            .await
            .map_err(|e| SocketError::Transport(e.to_string()))?;
        self.write
            .close()
            .await
            .map_err(|e| SocketError::Transport(e.to_string()))
    }
}
