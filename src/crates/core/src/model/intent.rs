use super::context::InvocationContext;
use super::data_type::DataType;
use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Slot name -> argument value, as sent by the core.
pub type IntentArgs = Map<String, Value>;

/// Application logic behind an intent.
///
/// The returned text is spoken back to the user. Errors are reported to the
/// core as a failed invocation; they never affect other invocations.
#[async_trait]
pub trait IntentBehavior: Send + Sync {
    async fn run(&self, args: IntentArgs, context: InvocationContext) -> anyhow::Result<String>;
}

/// Adapts an async closure into an `IntentBehavior`.
pub struct FnBehavior<F>(F);

impl<F> FnBehavior<F> {
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

#[async_trait]
impl<F, Fut> IntentBehavior for FnBehavior<F>
where
    F: Fn(IntentArgs, InvocationContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<String>> + Send + 'static,
{
    async fn run(&self, args: IntentArgs, context: InvocationContext) -> anyhow::Result<String> {
        (self.0)(args, context).await
    }
}

#[derive(Debug, Clone)]
pub struct Parameter {
    name: String,
    data_type: Arc<DataType>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, data_type: Arc<DataType>) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_type(&self) -> &Arc<DataType> {
        &self.data_type
    }
}

pub struct Intent {
    id: String,
    commands: Vec<String>,
    parameters: IndexMap<String, Parameter>,
    behavior: Arc<dyn IntentBehavior>,
}

impl Intent {
    pub fn builder(id: impl Into<String>) -> IntentBuilder {
        IntentBuilder {
            id: id.into(),
            commands: Vec::new(),
            parameters: IndexMap::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Sample phrases, already expanded.
    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    pub fn parameters(&self) -> &IndexMap<String, Parameter> {
        &self.parameters
    }

    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.get(name)
    }

    pub async fn run(
        &self,
        args: IntentArgs,
        context: InvocationContext,
    ) -> anyhow::Result<String> {
        self.behavior.run(args, context).await
    }
}

impl fmt::Debug for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Intent")
            .field("id", &self.id)
            .field("commands", &self.commands)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

pub struct IntentBuilder {
    id: String,
    commands: Vec<String>,
    parameters: IndexMap<String, Parameter>,
}

impl IntentBuilder {
    pub fn command(mut self, command: impl Into<String>) -> Self {
        self.commands.push(command.into());
        self
    }

    pub fn commands<I, S>(mut self, commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.commands.extend(commands.into_iter().map(Into::into));
        self
    }

    /// Adds a slot. Re-adding a slot name replaces its type but keeps its position.
    pub fn parameter(mut self, name: impl Into<String>, data_type: &Arc<DataType>) -> Self {
        let name = name.into();
        self.parameters
            .insert(name.clone(), Parameter::new(name, Arc::clone(data_type)));
        self
    }

    pub fn behavior(self, behavior: Arc<dyn IntentBehavior>) -> Intent {
        Intent {
            id: self.id,
            commands: self.commands,
            parameters: self.parameters,
            behavior,
        }
    }

    pub fn run_with<F, Fut>(self, f: F) -> Intent
    where
        F: Fn(IntentArgs, InvocationContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<String>> + Send + 'static,
    {
        self.behavior(Arc::new(FnBehavior::new(f)))
    }
}
