//! Transport abstraction
//!
//! A transport is a pair of channels carrying text frames. The WebSocket
//! implementation bridges them to a socket from a single background task;
//! tests substitute an in-memory connector.

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, tungstenite};

/// Transport error type
#[derive(Debug, Error)]
pub enum TransportError {
    /// Could not establish the connection
    #[error("Connect failed: {0}")]
    Connect(String),

    /// WebSocket protocol or I/O error
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),
}

/// An open transport
///
/// Dropping `outbound` asks the transport to close. `inbound` yields `None`
/// once the transport is closed, cleanly or not.
#[derive(Debug)]
pub struct TransportLink {
    pub outbound: mpsc::UnboundedSender<String>,
    pub inbound: mpsc::UnboundedReceiver<String>,
}

/// Opens transports to an endpoint
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    /// Open a transport; resolves once it is ready to carry frames
    async fn connect(&self, endpoint: &str) -> Result<TransportLink, TransportError>;
}

/// WebSocket connector backed by tokio-tungstenite
#[derive(Debug, Clone, Copy, Default)]
pub struct WebSocketConnector;

#[async_trait]
impl Connector for WebSocketConnector {
    async fn connect(&self, endpoint: &str) -> Result<TransportLink, TransportError> {
        let (ws, _response) = connect_async(endpoint).await?;

        let (outbound, out_rx) = mpsc::unbounded_channel();
        let (in_tx, inbound) = mpsc::unbounded_channel();

        tokio::spawn(pump(ws, out_rx, in_tx, endpoint.to_string()));

        Ok(TransportLink { outbound, inbound })
    }
}

/// Move frames between the socket and the link channels until either side closes
async fn pump<S>(
    mut ws: tokio_tungstenite::WebSocketStream<S>,
    mut out_rx: mpsc::UnboundedReceiver<String>,
    in_tx: mpsc::UnboundedSender<String>,
    endpoint: String,
) where
    S: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin,
{
    loop {
        tokio::select! {
            outgoing = out_rx.recv() => match outgoing {
                Some(text) => {
                    if let Err(e) = ws.send(Message::Text(text)).await {
                        tracing::warn!(endpoint = %endpoint, error = %e, "Failed to write frame");
                        break;
                    }
                }
                None => {
                    tracing::debug!(endpoint = %endpoint, "Closing transport");
                    let _ = ws.close(None).await;
                    break;
                }
            },
            incoming = ws.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    if in_tx.send(text).is_err() {
                        let _ = ws.close(None).await;
                        break;
                    }
                }
                Some(Ok(Message::Binary(_))) => {
                    tracing::debug!(endpoint = %endpoint, "Binary frames not supported, ignoring");
                }
                Some(Ok(Message::Close(frame))) => {
                    tracing::info!(endpoint = %endpoint, frame = ?frame, "Relay closed connection");
                    break;
                }
                // Control frames are answered by tungstenite itself
                Some(Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_))) => {}
                Some(Err(e)) => {
                    tracing::warn!(endpoint = %endpoint, error = %e, "WebSocket error");
                    break;
                }
                None => {
                    tracing::debug!(endpoint = %endpoint, "WebSocket stream ended");
                    break;
                }
            },
        }
    }
    // Dropping in_tx here is what tells the connection manager the link is gone
}
