use super::types::{InvocationRequest, InvocationResponse};
use crate::model::{handler_key, ClientApi, Intent, IntentArgs, InvocationContext};
use crate::service::rpc::CallHandler;
use crate::util::errors::{IntentLinkError, IntentLinkResult};
use async_trait::async_trait;
use log::{debug, info, warn};
use serde_json::Value;
use std::sync::Arc;

/// Runs one intent for inbound invocations.
///
/// Every invocation gets its own `InvocationContext`, so concurrent calls in
/// different languages never see each other's setting.
pub struct IntentDispatcher {
    handler_key: String,
    intent: Arc<Intent>,
    api: Arc<ClientApi>,
}

impl IntentDispatcher {
    pub fn new(app_id: &str, intent: Arc<Intent>, api: Arc<ClientApi>) -> Self {
        Self {
            handler_key: handler_key(app_id, intent.id()),
            intent,
            api,
        }
    }

    pub fn handler_key(&self) -> &str {
        &self.handler_key
    }

    pub async fn dispatch(
        &self,
        request: InvocationRequest,
    ) -> IntentLinkResult<InvocationResponse> {
        let context = InvocationContext::new(request.lang.as_deref(), Arc::clone(&self.api));
        let args = self.prepare_args(request.args);
        info!(
            "Intent called: handler={}, lang={}, args={}",
            self.handler_key,
            context.lang(),
            Value::Object(args.clone())
        );

        let response_text = self
            .intent
            .run(args, context)
            .await
            .map_err(|e| IntentLinkError::Invocation {
                handler: self.handler_key.clone(),
                message: format!("{:#}", e),
            })?;

        debug!("Intent finished: handler={}", self.handler_key);
        Ok(InvocationResponse { response_text })
    }

    /// Drops arguments for undeclared slots and maps named-value terms back
    /// to their values.
    fn prepare_args(&self, args: IntentArgs) -> IntentArgs {
        args.into_iter()
            .filter_map(|(slot, value)| {
                let Some(parameter) = self.intent.parameter(&slot) else {
                    warn!(
                        "Dropping argument for undeclared slot: handler={}, slot={}",
                        self.handler_key, slot
                    );
                    return None;
                };
                let mapped = value
                    .as_str()
                    .and_then(|term| parameter.data_type().value_for_term(term))
                    .cloned();
                Some((slot, mapped.unwrap_or(value)))
            })
            .collect()
    }
}

#[async_trait]
impl CallHandler for IntentDispatcher {
    async fn handle(&self, payload: Value) -> IntentLinkResult<Value> {
        let request: InvocationRequest = if payload.is_null() {
            InvocationRequest::default()
        } else {
            serde_json::from_value(payload).map_err(|e| {
                IntentLinkError::protocol(format!(
                    "Invalid invocation request: handler={}, error={}",
                    self.handler_key, e
                ))
            })?
        };
        let response = self.dispatch(request).await?;
        Ok(serde_json::to_value(response)?)
    }
}
