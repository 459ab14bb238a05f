use super::connection::{CallRouter, RpcConnection};
use crate::service::config::CoreConfig;
use crate::util::errors::IntentLinkResult;
use async_trait::async_trait;
use intentlink_transport::connect_websocket;
use log::info;
use std::sync::Arc;

/// Opens the session's connection to the core.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, config: &CoreConfig) -> IntentLinkResult<Arc<dyn CallRouter>>;
}

/// Connects over WebSocket to `config.core_url`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebSocketConnector;

#[async_trait]
impl Connector for WebSocketConnector {
    async fn connect(&self, config: &CoreConfig) -> IntentLinkResult<Arc<dyn CallRouter>> {
        let channel = connect_websocket(&config.core_url, config.connect_timeout()).await?;
        info!("Connected to core: url={}", config.core_url);
        let connection: Arc<dyn CallRouter> = RpcConnection::new(channel, config.request_timeout());
        Ok(connection)
    }
}
