use super::application::Application;
use std::sync::Arc;

pub const DEFAULT_LANG: &str = "en";

/// API surface handed to intent behaviors.
///
/// Built once when a session starts and never mutated afterwards, so every
/// invocation can hold it without locking.
#[derive(Debug)]
pub struct ClientApi {
    apps: Vec<Arc<Application>>,
    default_lang: String,
}

impl ClientApi {
    pub fn new(apps: Vec<Arc<Application>>, default_lang: impl Into<String>) -> Self {
        Self {
            apps,
            default_lang: default_lang.into(),
        }
    }

    pub fn applications(&self) -> &[Arc<Application>] {
        &self.apps
    }

    pub fn application(&self, id: &str) -> Option<&Arc<Application>> {
        self.apps.iter().find(|app| app.id() == id)
    }

    pub fn default_lang(&self) -> &str {
        &self.default_lang
    }
}

/// Per-invocation view of the client: the caller's language plus the shared API.
#[derive(Debug, Clone)]
pub struct InvocationContext {
    lang: String,
    api: Arc<ClientApi>,
}

impl InvocationContext {
    /// A missing or empty language falls back to the API's default.
    pub fn new(lang: Option<&str>, api: Arc<ClientApi>) -> Self {
        let lang = match lang.map(str::trim) {
            Some(lang) if !lang.is_empty() => lang.to_string(),
            _ => api.default_lang().to_string(),
        };
        Self { lang, api }
    }

    pub fn lang(&self) -> &str {
        &self.lang
    }

    pub fn api(&self) -> &Arc<ClientApi> {
        &self.api
    }
}
