use super::dispatcher::IntentDispatcher;
use super::types::SessionState;
use crate::model::{Application, ClientApi, DEFAULT_LANG};
use crate::service::config::CoreConfig;
use crate::service::rpc::{CallRouter, Connector, WebSocketConnector, REGISTER_APP_METHOD};
use crate::service::schema::build_registration_document;
use crate::util::errors::{IntentLinkError, IntentLinkResult};
use log::{debug, error, info};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;

/// One logical connection to the core and the applications served over it.
///
/// Lifecycle: `Idle -> Connecting -> Registering -> Serving`. Any startup
/// failure, or losing the connection while serving, ends in `Failed` without
/// retry; `stop()` ends in `Stopped`.
pub struct Session {
    id: String,
    apps: Vec<Arc<Application>>,
    config: CoreConfig,
    connector: Arc<dyn Connector>,
    state: Arc<watch::Sender<SessionState>>,
    /// Written only while `state` is checked, see `install_router`.
    router: Mutex<Option<Arc<dyn CallRouter>>>,
    handler_keys: Arc<Mutex<Vec<String>>>,
    monitor: Mutex<Option<JoinHandle<()>>>,
}

impl Session {
    /// Session that connects over WebSocket to `config.core_url`.
    pub fn new(apps: Vec<Arc<Application>>, config: CoreConfig) -> Self {
        Self::with_connector(apps, config, Arc::new(WebSocketConnector))
    }

    pub fn with_connector(
        apps: Vec<Arc<Application>>,
        config: CoreConfig,
        connector: Arc<dyn Connector>,
    ) -> Self {
        let (state, _state_rx) = watch::channel(SessionState::Idle);
        Self {
            id: format!("session-{}", uuid::Uuid::new_v4()),
            apps,
            config,
            connector,
            state: Arc::new(state),
            router: Mutex::new(None),
            handler_keys: Arc::new(Mutex::new(Vec::new())),
            monitor: Mutex::new(None),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn applications(&self) -> &[Arc<Application>] {
        &self.apps
    }

    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    pub async fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    /// Keys of the installed intent handlers, in installation order. Empty
    /// once the session failed.
    pub async fn handler_keys(&self) -> Vec<String> {
        self.handler_keys.lock().await.clone()
    }

    /// Resolves once the session is `Failed` or `Stopped` and returns that
    /// state.
    pub async fn finished(&self) -> SessionState {
        let mut state_rx = self.state.subscribe();
        loop {
            let state = *state_rx.borrow_and_update();
            if state.is_finished() {
                return state;
            }
            if state_rx.changed().await.is_err() {
                return *self.state.borrow();
            }
        }
    }

    /// Connects, registers every application in order and installs the
    /// intent handlers. Returns once the session is serving.
    pub async fn start(&self) -> IntentLinkResult<()> {
        let mut previous = SessionState::Idle;
        let began = self.state.send_if_modified(|state| {
            previous = *state;
            if *state == SessionState::Idle {
                *state = SessionState::Connecting;
                true
            } else {
                false
            }
        });
        if !began {
            return Err(IntentLinkError::precondition(format!(
                "Session cannot start: session_id={}, state={:?}",
                self.id, previous
            )));
        }

        let outcome = match self.run_startup().await {
            Ok(router) => self.begin_serving(router).await,
            Err(e) => Err(e),
        };

        match outcome {
            Ok(()) => {
                info!(
                    "Started and registered: session_id={}, apps={}",
                    self.id,
                    self.apps.len()
                );
                Ok(())
            }
            Err(e) => {
                if matches!(e, IntentLinkError::Stopped(_)) {
                    info!("Session startup interrupted: session_id={}", self.id);
                } else {
                    error!(
                        "Session startup failed: session_id={}, phase={}, error={}",
                        self.id,
                        e.phase(),
                        e
                    );
                }
                self.release_router().await;
                self.handler_keys.lock().await.clear();
                self.set_state(SessionState::Failed);
                Err(e)
            }
        }
    }

    /// Releases the connection. Safe to call in any state and more than once.
    pub async fn stop(&self) {
        let mut previous = SessionState::Stopped;
        self.state.send_if_modified(|state| {
            previous = *state;
            if *state == SessionState::Stopped {
                return false;
            }
            *state = SessionState::Stopped;
            true
        });
        if previous != SessionState::Stopped {
            info!(
                "Session stopped: session_id={}, previous_state={:?}",
                self.id, previous
            );
        }

        if let Some(monitor) = self.monitor.lock().await.take() {
            monitor.abort();
        }
        self.release_router().await;
    }

    async fn run_startup(&self) -> IntentLinkResult<Arc<dyn CallRouter>> {
        self.validate_apps()?;
        let api = Arc::new(ClientApi::new(self.apps.clone(), DEFAULT_LANG));

        debug!(
            "Connecting to core: session_id={}, url={}",
            self.id, self.config.core_url
        );
        let router = self
            .connector
            .connect(&self.config)
            .await
            .map_err(|e| match e {
                IntentLinkError::Connection(_) => e,
                other => IntentLinkError::Connection(other.to_string()),
            })?;
        self.install_router(&router).await?;
        self.set_state(SessionState::Registering);

        for app in &self.apps {
            self.ensure_running()?;
            self.register_app(router.as_ref(), app, &api).await?;
        }
        Ok(router)
    }

    /// Stores a fresh connection, or closes it if `stop()` already ran.
    ///
    /// `stop()` marks the session stopped before it takes the router slot,
    /// so checking the state while holding the slot leaves no window where a
    /// connection is stored after `stop()` released the slot.
    async fn install_router(&self, router: &Arc<dyn CallRouter>) -> IntentLinkResult<()> {
        let mut slot = self.router.lock().await;
        if let Err(e) = self.ensure_running() {
            drop(slot);
            router.close().await;
            return Err(e);
        }
        *slot = Some(Arc::clone(router));
        Ok(())
    }

    /// Moves to `Serving` and starts watching the connection.
    async fn begin_serving(&self, router: Arc<dyn CallRouter>) -> IntentLinkResult<()> {
        let mut monitor = self.monitor.lock().await;
        let serving = self.state.send_if_modified(|state| {
            if state.is_finished() {
                return false;
            }
            *state = SessionState::Serving;
            true
        });
        if !serving {
            return Err(self.stopped_error());
        }

        let id = self.id.clone();
        let state = Arc::clone(&self.state);
        let handler_keys = Arc::clone(&self.handler_keys);
        *monitor = Some(tokio::spawn(async move {
            router.closed().await;
            let mut keys = handler_keys.lock().await;
            let lost = state.send_if_modified(|state| {
                if *state != SessionState::Serving {
                    return false;
                }
                *state = SessionState::Failed;
                true
            });
            if lost {
                keys.clear();
                error!("Connection to core lost: session_id={}, phase=serve", id);
            }
        }));
        Ok(())
    }

    fn ensure_running(&self) -> IntentLinkResult<()> {
        if *self.state.borrow() == SessionState::Stopped {
            return Err(self.stopped_error());
        }
        Ok(())
    }

    fn stopped_error(&self) -> IntentLinkError {
        IntentLinkError::Stopped(format!(
            "stop() called during startup: session_id={}",
            self.id
        ))
    }

    fn validate_apps(&self) -> IntentLinkResult<()> {
        if self.apps.is_empty() {
            return Err(IntentLinkError::precondition("Session needs at least one app"));
        }
        let mut seen = HashSet::new();
        for app in &self.apps {
            app.validate()?;
            if !seen.insert(app.id()) {
                return Err(IntentLinkError::precondition(format!(
                    "Duplicate app id: {}",
                    app.id()
                )));
            }
        }
        Ok(())
    }

    /// Registers one app and, once the core acknowledged it, installs its
    /// intent handlers.
    async fn register_app(
        &self,
        router: &dyn CallRouter,
        app: &Arc<Application>,
        api: &Arc<ClientApi>,
    ) -> IntentLinkResult<()> {
        let document = build_registration_document(app)?;
        let payload = serde_json::to_value(&document)?;

        router
            .call(REGISTER_APP_METHOD, payload)
            .await
            .map_err(|e| IntentLinkError::registration(app.id(), e.to_string()))?;
        self.ensure_running()?;

        for intent in app.intents() {
            let dispatcher = IntentDispatcher::new(app.id(), Arc::clone(intent), Arc::clone(api));
            let key = dispatcher.handler_key().to_string();
            router
                .register_handler(&key, Arc::new(dispatcher))
                .map_err(|e| IntentLinkError::registration(app.id(), e.to_string()))?;
            self.handler_keys.lock().await.push(key);
        }

        info!(
            "Registered app with core: session_id={}, app_id={}, intents={}",
            self.id,
            app.id(),
            app.intent_count()
        );
        Ok(())
    }

    /// `Stopped` is final; a concurrent `stop()` wins over startup.
    fn set_state(&self, next: SessionState) {
        self.state.send_if_modified(|state| {
            if *state == SessionState::Stopped || *state == next {
                return false;
            }
            *state = next;
            true
        });
    }

    async fn release_router(&self) {
        let router = self.router.lock().await.take();
        if let Some(router) = router {
            router.close().await;
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Some(monitor) = self.monitor.get_mut().take() {
            monitor.abort();
        }
    }
}
