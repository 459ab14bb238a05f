//! Frame channels
//!
//! A `TransportChannel` is the only thing the RPC layer sees of a connection:
//! text frames go out through `outbound` and arrive on `inbound`. Dropping the
//! outbound sender closes the underlying connection; the inbound receiver
//! yields `None` once the peer is gone.

use tokio::sync::mpsc;

pub type FrameSender = mpsc::UnboundedSender<String>;
pub type FrameReceiver = mpsc::UnboundedReceiver<String>;

#[derive(Debug)]
pub struct TransportChannel {
    pub outbound: FrameSender,
    pub inbound: FrameReceiver,
    /// Human readable peer description, used in logs.
    pub peer: String,
}

impl TransportChannel {
    pub fn new(outbound: FrameSender, inbound: FrameReceiver, peer: impl Into<String>) -> Self {
        Self {
            outbound,
            inbound,
            peer: peer.into(),
        }
    }

    pub fn into_parts(self) -> (FrameSender, FrameReceiver) {
        (self.outbound, self.inbound)
    }
}

/// Creates two in-process channels wired to each other.
pub fn memory_pair() -> (TransportChannel, TransportChannel) {
    let (left_tx, right_rx) = mpsc::unbounded_channel();
    let (right_tx, left_rx) = mpsc::unbounded_channel();
    (
        TransportChannel::new(left_tx, left_rx, "memory:left"),
        TransportChannel::new(right_tx, right_rx, "memory:right"),
    )
}
