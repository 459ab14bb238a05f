use super::intent::Intent;
use crate::util::errors::{IntentLinkError, IntentLinkResult};
use indexmap::IndexMap;
use std::sync::Arc;

/// Separator between application id and intent id in handler keys.
const KEY_SEPARATOR: char = '/';

/// Address under which the core invokes an intent.
pub fn handler_key(app_id: &str, intent_id: &str) -> String {
    format!("{}{}{}", app_id, KEY_SEPARATOR, intent_id)
}

/// A voice application: an invocation name plus its intents in declaration order.
#[derive(Debug)]
pub struct Application {
    id: String,
    intents: IndexMap<String, Arc<Intent>>,
}

impl Application {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            intents: IndexMap::new(),
        }
    }

    pub fn with_intent(mut self, intent: Intent) -> Self {
        self.add_intent(intent);
        self
    }

    /// Adds an intent keyed by its id. Replacing an intent keeps its position.
    pub fn add_intent(&mut self, intent: Intent) {
        self.intents
            .insert(intent.id().to_string(), Arc::new(intent));
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn intents(&self) -> impl Iterator<Item = &Arc<Intent>> {
        self.intents.values()
    }

    pub fn intent(&self, id: &str) -> Option<&Arc<Intent>> {
        self.intents.get(id)
    }

    pub fn intent_count(&self) -> usize {
        self.intents.len()
    }

    /// Checks the shape the registration protocol depends on: ids usable as
    /// names and as handler key segments.
    pub fn validate(&self) -> IntentLinkResult<()> {
        check_segment("Application id", &self.id, &self.id)?;
        for (key, intent) in &self.intents {
            check_segment("Intent id", intent.id(), &self.id)?;
            if key != intent.id() {
                return Err(IntentLinkError::precondition(format!(
                    "Intent keyed as '{}' has id '{}' in app '{}'",
                    key,
                    intent.id(),
                    self.id
                )));
            }
        }
        Ok(())
    }
}

fn check_segment(what: &str, value: &str, app_id: &str) -> IntentLinkResult<()> {
    if value.trim().is_empty() {
        return Err(IntentLinkError::precondition(format!(
            "{} is empty in app '{}'",
            what, app_id
        )));
    }
    if value.contains(KEY_SEPARATOR) {
        return Err(IntentLinkError::precondition(format!(
            "{} '{}' contains '{}' in app '{}'",
            what, value, KEY_SEPARATOR, app_id
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{handler_key, Application};
    use crate::model::Intent;
    use crate::util::errors::IntentLinkError;

    fn noop(id: &str) -> Intent {
        Intent::builder(id).run_with(|_, _| async { Ok(String::new()) })
    }

    #[test]
    fn handler_key_joins_with_slash() {
        assert_eq!(handler_key("weather", "forecast"), "weather/forecast");
    }

    #[test]
    fn intents_keep_insertion_order() {
        let app = Application::new("demo")
            .with_intent(noop("b"))
            .with_intent(noop("a"))
            .with_intent(noop("c"));
        let ids: Vec<&str> = app.intents().map(|i| i.id()).collect();
        assert_eq!(ids, vec!["b", "a", "c"]);
    }

    #[test]
    fn validate_accepts_well_formed_app() {
        let app = Application::new("demo").with_intent(noop("hello"));
        assert!(app.validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_app_id() {
        let err = Application::new(" ").validate().unwrap_err();
        assert!(matches!(err, IntentLinkError::Precondition(_)));
    }

    #[test]
    fn validate_rejects_separator_in_intent_id() {
        let app = Application::new("demo").with_intent(noop("a/b"));
        let err = app.validate().unwrap_err();
        assert!(err.to_string().contains("a/b"));
    }
}
