use crate::model::IntentArgs;
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    Connecting,
    Registering,
    Serving,
    Failed,
    Stopped,
}

impl SessionState {
    /// `Failed` and `Stopped` are never left again.
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Failed | Self::Stopped)
    }
}

/// Inbound call for one intent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationRequest {
    /// 2 letter ISO language code
    #[serde(default)]
    pub lang: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty_args")]
    pub args: IntentArgs,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationResponse {
    pub response_text: String,
}

fn null_as_empty_args<'de, D>(deserializer: D) -> Result<IntentArgs, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<IntentArgs>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::{InvocationRequest, InvocationResponse, SessionState};
    use serde_json::json;

    #[test]
    fn only_failed_and_stopped_are_finished() {
        assert!(SessionState::Failed.is_finished());
        assert!(SessionState::Stopped.is_finished());
        assert!(!SessionState::Serving.is_finished());
        assert!(!SessionState::Idle.is_finished());
    }

    #[test]
    fn request_fields_are_optional() {
        let request: InvocationRequest = serde_json::from_value(json!({})).unwrap();
        assert!(request.lang.is_none());
        assert!(request.args.is_empty());

        let request: InvocationRequest =
            serde_json::from_value(json!({"lang": "de", "args": null})).unwrap();
        assert_eq!(request.lang.as_deref(), Some("de"));
        assert!(request.args.is_empty());
    }

    #[test]
    fn response_uses_camel_case() {
        let response = InvocationResponse {
            response_text: "done".to_string(),
        };
        assert_eq!(
            serde_json::to_value(response).unwrap(),
            json!({"responseText": "done"})
        );
    }
}
