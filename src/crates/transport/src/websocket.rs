//! WebSocket transport
//!
//! Opens a client connection with tokio-tungstenite and pumps text frames
//! between the socket and a `TransportChannel` in two background tasks.

use crate::channel::TransportChannel;
use crate::error::{TransportError, TransportResult};
use futures_util::{SinkExt, StreamExt};
use log::{debug, warn};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_tungstenite::{connect_async, tungstenite::Message};

/// Connects to `url` and returns the frame channel for the open socket.
///
/// Pings are answered by tungstenite itself while the reader task polls the
/// stream. Binary frames are accepted when they hold UTF-8 text.
pub async fn connect_websocket(
    url: &str,
    connect_timeout: Duration,
) -> TransportResult<TransportChannel> {
    let (ws_stream, response) = timeout(connect_timeout, connect_async(url))
        .await
        .map_err(|_| TransportError::Timeout(format!("WebSocket connect timeout: url={}", url)))?
        .map_err(|e| {
            TransportError::ConnectionFailed(format!(
                "WebSocket connect failed: url={}, error={}",
                url, e
            ))
        })?;

    debug!(
        "WebSocket connected: url={}, status={}",
        url,
        response.status()
    );

    let (mut sink, mut stream) = ws_stream.split();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<String>();
    let (inbound_tx, inbound_rx) = mpsc::unbounded_channel::<String>();

    let writer_url = url.to_string();
    tokio::spawn(async move {
        while let Some(frame) = outbound_rx.recv().await {
            if let Err(e) = sink.send(Message::Text(frame)).await {
                warn!(
                    "WebSocket send failed: url={}, error={}",
                    writer_url, e
                );
                break;
            }
        }
        if let Err(e) = sink.close().await {
            debug!("WebSocket close failed: url={}, error={}", writer_url, e);
        }
    });

    let reader_url = url.to_string();
    tokio::spawn(async move {
        while let Some(message) = stream.next().await {
            match message {
                Ok(Message::Text(text)) => {
                    if inbound_tx.send(text).is_err() {
                        break;
                    }
                }
                Ok(Message::Binary(data)) => match String::from_utf8(data) {
                    Ok(text) => {
                        if inbound_tx.send(text).is_err() {
                            break;
                        }
                    }
                    Err(_) => warn!("Dropping non UTF-8 binary frame: url={}", reader_url),
                },
                Ok(Message::Close(frame)) => {
                    debug!("WebSocket closed by peer: url={}, frame={:?}", reader_url, frame);
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    warn!("WebSocket receive failed: url={}, error={}", reader_url, e);
                    break;
                }
            }
        }
        debug!("WebSocket reader finished: url={}", reader_url);
    });

    Ok(TransportChannel::new(outbound_tx, inbound_rx, url))
}
