use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationDocument {
    pub interaction_model: InteractionModel,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionModel {
    pub language_model: LanguageModel,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageModel {
    /// Application id
    pub invocation_name: String,
    pub intents: Vec<IntentDescriptor>,
    pub types: Vec<TypeDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentDescriptor {
    pub name: String,
    pub samples: Vec<String>,
    pub slots: Vec<SlotDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotDescriptor {
    pub name: String,
    /// Data type id
    #[serde(rename = "type")]
    pub slot_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeDescriptor {
    pub name: String,
    pub values: Vec<TypeValue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeValue {
    pub id: String,
    pub name: TypeValueName,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeValueName {
    pub value: String,
}

impl TypeValue {
    pub fn from_term(term: &str) -> Self {
        Self {
            id: term.to_string(),
            name: TypeValueName {
                value: term.to_string(),
            },
        }
    }
}

impl RegistrationDocument {
    pub fn language_model(&self) -> &LanguageModel {
        &self.interaction_model.language_model
    }
}
