//! Connection to the core
//!
//! Handles request/response correlation and inbound call routing over one
//! transport channel.

use super::protocol::{RpcErrorBody, RpcMessage};
use crate::util::errors::{IntentLinkError, IntentLinkResult};
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use intentlink_transport::{FrameReceiver, FrameSender, TransportChannel};
use log::{debug, warn};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, watch, Mutex};
use tokio::task::JoinHandle;

/// Request/response waiter.
type ResponseWaiter = oneshot::Sender<Result<Value, RpcErrorBody>>;

/// Answers inbound calls for one method name.
#[async_trait]
pub trait CallHandler: Send + Sync {
    async fn handle(&self, payload: Value) -> IntentLinkResult<Value>;
}

/// What a session needs from a live connection.
#[async_trait]
pub trait CallRouter: Send + Sync {
    /// Sends a call and waits for its reply.
    async fn call(&self, method: &str, payload: Value) -> IntentLinkResult<Value>;

    /// Routes inbound calls for `name` to `handler`. A name can be bound once.
    fn register_handler(
        &self,
        name: &str,
        handler: Arc<dyn CallHandler>,
    ) -> IntentLinkResult<()>;

    /// Releases the transport. Calling it again is a no-op.
    async fn close(&self);

    /// Resolves once the connection is gone, whether the peer dropped it or
    /// `close()` released it.
    async fn closed(&self);
}

struct Shared {
    peer: String,
    /// `None` once the connection is closed.
    outbound: Mutex<Option<FrameSender>>,
    pending_requests: DashMap<u64, ResponseWaiter>,
    handlers: DashMap<String, Arc<dyn CallHandler>>,
    closed_tx: watch::Sender<bool>,
}

impl Shared {
    async fn send_frame(&self, message: &RpcMessage) -> IntentLinkResult<()> {
        let frame = message.encode()?;
        let guard = self.outbound.lock().await;
        let Some(outbound) = guard.as_ref() else {
            return Err(IntentLinkError::Connection(format!(
                "Connection closed: peer={}",
                self.peer
            )));
        };
        outbound.send(frame).map_err(|_| {
            IntentLinkError::Connection(format!("Transport closed: peer={}", self.peer))
        })
    }

    async fn answer_call(&self, id: u64, method: String, payload: Value) {
        let handler = self
            .handlers
            .get(&method)
            .map(|entry| Arc::clone(entry.value()));

        let reply = match handler {
            Some(handler) => match handler.handle(payload).await {
                Ok(result) => RpcMessage::success(id, result),
                Err(e) => {
                    warn!("Call handler failed: method={}, error={}", method, e);
                    RpcMessage::failure(id, e.to_string())
                }
            },
            None => {
                warn!("Received call for unknown method: {}", method);
                RpcMessage::failure(id, format!("No handler registered for '{}'", method))
            }
        };

        if let Err(e) = self.send_frame(&reply).await {
            warn!(
                "Failed to send reply: method={}, id={}, error={}",
                method,
                reply.id(),
                e
            );
        }
    }

    /// Drops the outbound sender and fails every pending call.
    async fn shutdown(&self) {
        if self.outbound.lock().await.take().is_some() {
            debug!("Connection shut down: peer={}", self.peer);
        }
        self.pending_requests.clear();
        self.closed_tx.send_replace(true);
    }
}

/// Connection to the core over one transport channel.
pub struct RpcConnection {
    shared: Arc<Shared>,
    next_id: AtomicU64,
    request_timeout: Duration,
    reader: Mutex<Option<JoinHandle<()>>>,
}

impl RpcConnection {
    /// Wraps `channel` and starts routing its inbound frames.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(channel: TransportChannel, request_timeout: Duration) -> Arc<Self> {
        let peer = channel.peer.clone();
        let (outbound, inbound) = channel.into_parts();
        let (closed_tx, _closed_rx) = watch::channel(false);
        let shared = Arc::new(Shared {
            peer,
            outbound: Mutex::new(Some(outbound)),
            pending_requests: DashMap::new(),
            handlers: DashMap::new(),
            closed_tx,
        });

        let reader_shared = Arc::clone(&shared);
        let reader = tokio::spawn(async move {
            Self::handle_messages(inbound, reader_shared).await;
        });

        Arc::new(Self {
            shared,
            next_id: AtomicU64::new(1),
            request_timeout,
            reader: Mutex::new(Some(reader)),
        })
    }

    pub fn peer(&self) -> &str {
        &self.shared.peer
    }

    pub async fn is_closed(&self) -> bool {
        self.shared.outbound.lock().await.is_none()
    }

    pub fn handler_names(&self) -> Vec<String> {
        self.shared
            .handlers
            .iter()
            .map(|entry| entry.key().clone())
            .collect()
    }

    /// Handles received frames until the peer goes away.
    async fn handle_messages(mut inbound: FrameReceiver, shared: Arc<Shared>) {
        while let Some(frame) = inbound.recv().await {
            match RpcMessage::decode(&frame) {
                Ok(RpcMessage::Reply { id, result }) => {
                    if let Some((_, waiter)) = shared.pending_requests.remove(&id) {
                        let _ = waiter.send(result);
                    } else {
                        warn!("Received reply for unknown request ID: {}", id);
                    }
                }
                Ok(RpcMessage::Call {
                    id,
                    method,
                    payload,
                }) => {
                    debug!("Received call: method={}, id={}", method, id);
                    let shared = Arc::clone(&shared);
                    tokio::spawn(async move {
                        shared.answer_call(id, method, payload).await;
                    });
                }
                Err(e) => {
                    warn!("Dropping malformed frame: peer={}, error={}", shared.peer, e);
                }
            }
        }

        warn!("Connection to core closed: peer={}", shared.peer);
        shared.shutdown().await;
    }
}

impl Drop for RpcConnection {
    fn drop(&mut self) {
        if let Some(reader) = self.reader.get_mut().take() {
            reader.abort();
        }
    }
}

#[async_trait]
impl CallRouter for RpcConnection {
    async fn call(&self, method: &str, payload: Value) -> IntentLinkResult<Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        self.shared.pending_requests.insert(id, tx);

        if let Err(e) = self
            .shared
            .send_frame(&RpcMessage::call(id, method, payload))
            .await
        {
            self.shared.pending_requests.remove(&id);
            return Err(e);
        }

        match tokio::time::timeout(self.request_timeout, rx).await {
            Ok(Ok(Ok(result))) => Ok(result),
            Ok(Ok(Err(error))) => Err(IntentLinkError::protocol(format!(
                "Call rejected: method={}, error={}",
                method, error.message
            ))),
            Ok(Err(_)) => Err(IntentLinkError::Connection(format!(
                "Connection closed while waiting for reply: method={}",
                method
            ))),
            Err(_) => {
                self.shared.pending_requests.remove(&id);
                Err(IntentLinkError::Timeout(format!(
                    "Request timeout for method: {}",
                    method
                )))
            }
        }
    }

    fn register_handler(
        &self,
        name: &str,
        handler: Arc<dyn CallHandler>,
    ) -> IntentLinkResult<()> {
        match self.shared.handlers.entry(name.to_string()) {
            Entry::Occupied(_) => Err(IntentLinkError::precondition(format!(
                "Handler already registered: {}",
                name
            ))),
            Entry::Vacant(entry) => {
                entry.insert(handler);
                debug!("Registered call handler: name={}", name);
                Ok(())
            }
        }
    }

    async fn close(&self) {
        self.shared.shutdown().await;
        if let Some(reader) = self.reader.lock().await.take() {
            reader.abort();
        }
    }

    async fn closed(&self) {
        let mut closed_rx = self.shared.closed_tx.subscribe();
        loop {
            if *closed_rx.borrow() {
                return;
            }
            if closed_rx.changed().await.is_err() {
                return;
            }
        }
    }
}
