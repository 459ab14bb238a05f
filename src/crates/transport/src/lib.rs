/// IntentLink Transport Layer
///
/// Raw text-frame channels between a voice application host and the core, supports:
/// - In-process memory pairs (tokio mpsc)
/// - WebSocket (tokio-tungstenite)
pub mod channel;
pub mod error;
pub mod websocket;

pub use channel::{memory_pair, FrameReceiver, FrameSender, TransportChannel};
pub use error::{TransportError, TransportResult};
pub use websocket::connect_websocket;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
