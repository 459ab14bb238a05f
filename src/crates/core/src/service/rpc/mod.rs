//! Call router
//!
//! Request/response multiplexing over one transport channel: outbound calls
//! are correlated with their replies by id, inbound calls are routed to the
//! handler registered under their method name.

pub mod connection;
pub mod connector;
pub mod protocol;

pub use connection::{CallHandler, CallRouter, RpcConnection};
pub use connector::{Connector, WebSocketConnector};
pub use protocol::{RpcErrorBody, RpcMessage, REGISTER_APP_METHOD};
