use super::types::{
    IntentDescriptor, InteractionModel, LanguageModel, RegistrationDocument, SlotDescriptor,
    TypeDescriptor, TypeValue,
};
use crate::model::{Application, DataType, Intent};
use crate::util::errors::IntentLinkResult;
use log::debug;
use std::collections::HashSet;
use std::sync::Arc;

/// Builds the registration document for `app`.
///
/// Intents, samples and slots keep the app's declaration order. Data types
/// are listed once per distinct `Arc` in first-use order; types without a
/// finite term set are left out.
pub fn build_registration_document(app: &Application) -> IntentLinkResult<RegistrationDocument> {
    app.validate()?;

    let intents = app.intents().map(|intent| describe_intent(intent)).collect();

    let types = distinct_data_types(app)
        .into_iter()
        .filter_map(|data_type| describe_type(app.id(), data_type))
        .collect();

    Ok(RegistrationDocument {
        interaction_model: InteractionModel {
            language_model: LanguageModel {
                invocation_name: app.id().to_string(),
                intents,
                types,
            },
        },
    })
}

fn describe_intent(intent: &Intent) -> IntentDescriptor {
    IntentDescriptor {
        name: intent.id().to_string(),
        samples: intent.commands().to_vec(),
        slots: intent
            .parameters()
            .iter()
            .map(|(name, parameter)| SlotDescriptor {
                name: name.clone(),
                slot_type: parameter.data_type().id().to_string(),
            })
            .collect(),
    }
}

fn distinct_data_types(app: &Application) -> Vec<&Arc<DataType>> {
    let mut seen: HashSet<*const DataType> = HashSet::new();
    let mut data_types = Vec::new();
    for intent in app.intents() {
        for parameter in intent.parameters().values() {
            let data_type = parameter.data_type();
            if seen.insert(Arc::as_ptr(data_type)) {
                data_types.push(data_type);
            }
        }
    }
    data_types
}

fn describe_type(app_id: &str, data_type: &DataType) -> Option<TypeDescriptor> {
    let Some(terms) = data_type.terms_if_finite() else {
        debug!(
            "Skipping data type without terms: app_id={}, type={}",
            app_id,
            data_type.id()
        );
        return None;
    };

    Some(TypeDescriptor {
        name: data_type.id().to_string(),
        values: terms.into_iter().map(TypeValue::from_term).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::build_registration_document;
    use crate::model::{Application, DataType, Intent};
    use crate::util::errors::IntentLinkError;
    use serde_json::json;

    fn intent(id: &str) -> crate::model::IntentBuilder {
        Intent::builder(id)
    }

    fn reply(builder: crate::model::IntentBuilder) -> Intent {
        builder.run_with(|_, _| async { Ok("ok".to_string()) })
    }

    #[test]
    fn document_has_expected_wire_shape() {
        let color = DataType::finite("color", ["red", "green"]);
        let app = Application::new("paint").with_intent(reply(
            intent("pick")
                .command("paint it {color}")
                .parameter("color", &color),
        ));

        let document = build_registration_document(&app).unwrap();

        assert_eq!(
            serde_json::to_value(&document).unwrap(),
            json!({
                "interactionModel": {
                    "languageModel": {
                        "invocationName": "paint",
                        "intents": [{
                            "name": "pick",
                            "samples": ["paint it {color}"],
                            "slots": [{ "name": "color", "type": "color" }]
                        }],
                        "types": [{
                            "name": "color",
                            "values": [
                                { "id": "red", "name": { "value": "red" } },
                                { "id": "green", "name": { "value": "green" } }
                            ]
                        }]
                    }
                }
            })
        );
    }

    #[test]
    fn shared_data_type_is_listed_once() {
        let city = DataType::list("city", ["Paris", "Rome"]);
        let app = Application::new("travel")
            .with_intent(reply(intent("from").parameter("origin", &city)))
            .with_intent(reply(
                intent("route")
                    .parameter("origin", &city)
                    .parameter("destination", &city),
            ));

        let document = build_registration_document(&app).unwrap();
        let types = &document.language_model().types;
        assert_eq!(types.len(), 1);
        assert_eq!(types[0].name, "city");
    }

    #[test]
    fn equal_but_distinct_data_types_are_listed_separately() {
        let first = DataType::finite("answer", ["yes", "no"]);
        let second = DataType::finite("answer", ["yes", "no"]);
        let app = Application::new("quiz")
            .with_intent(reply(intent("one").parameter("a", &first)))
            .with_intent(reply(intent("two").parameter("b", &second)));

        let document = build_registration_document(&app).unwrap();
        assert_eq!(document.language_model().types.len(), 2);
    }

    #[test]
    fn open_data_types_are_omitted() {
        let message = DataType::free_text("message");
        let amount = DataType::number("amount");
        let contact = DataType::enumeration("contact", ["mom", "dad"]);
        let app = Application::new("messenger").with_intent(reply(
            intent("send")
                .parameter("message", &message)
                .parameter("amount", &amount)
                .parameter("to", &contact),
        ));

        let document = build_registration_document(&app).unwrap();
        let model = document.language_model();
        let type_names: Vec<&str> = model.types.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(type_names, vec!["contact"]);
        // Slots still reference the omitted types.
        assert_eq!(model.intents[0].slots.len(), 3);
        assert_eq!(model.intents[0].slots[0].slot_type, "message");
    }

    #[test]
    fn named_values_are_listed_by_term() {
        let digit = DataType::named_values("digit", [("one", json!(1)), ("two", json!(2))]);
        let app = Application::new("calc").with_intent(reply(intent("add").parameter("x", &digit)));

        let document = build_registration_document(&app).unwrap();
        let ids: Vec<&str> = document.language_model().types[0]
            .values
            .iter()
            .map(|v| v.id.as_str())
            .collect();
        assert_eq!(ids, vec!["one", "two"]);
    }

    #[test]
    fn intent_sample_and_slot_order_is_preserved() {
        let a = DataType::free_text("a");
        let b = DataType::free_text("b");
        let app = Application::new("order")
            .with_intent(reply(intent("second").commands(["z", "y", "x"])))
            .with_intent(reply(
                intent("first")
                    .parameter("zeta", &a)
                    .parameter("alpha", &b),
            ));

        let document = build_registration_document(&app).unwrap();
        let model = document.language_model();
        assert_eq!(model.intents[0].name, "second");
        assert_eq!(model.intents[0].samples, vec!["z", "y", "x"]);
        assert_eq!(model.intents[1].name, "first");
        let slots: Vec<&str> = model.intents[1].slots.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(slots, vec!["zeta", "alpha"]);
    }

    #[test]
    fn generating_twice_yields_equal_documents() {
        let size = DataType::finite("size", ["s", "m", "l"]);
        let app = Application::new("shop")
            .with_intent(reply(intent("buy").command("buy {size}").parameter("size", &size)));

        let first = build_registration_document(&app).unwrap();
        let second = build_registration_document(&app).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn malformed_app_is_rejected() {
        let app = Application::new("bad/app");
        let err = build_registration_document(&app).unwrap_err();
        assert!(matches!(err, IntentLinkError::Precondition(_)));
    }
}
