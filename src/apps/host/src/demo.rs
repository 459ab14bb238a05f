//! Bundled demo application.

use intentlink_core::{Application, DataType, Intent, InvocationContext};
use serde_json::{json, Value};

pub fn greeter_app() -> Application {
    let name = DataType::free_text("name");
    let number = DataType::named_values(
        "number",
        [
            ("one", json!(1)),
            ("two", json!(2)),
            ("three", json!(3)),
            ("four", json!(4)),
            ("five", json!(5)),
        ],
    );

    Application::new("greeter")
        .with_intent(
            Intent::builder("hello")
                .commands(["say hello", "say hello to {name}", "greet {name}"])
                .parameter("name", &name)
                .run_with(|args, context| async move {
                    let name = args.get("name").and_then(Value::as_str);
                    Ok(greeting(&context, name))
                }),
        )
        .with_intent(
            Intent::builder("count")
                .commands(["count to {number}"])
                .parameter("number", &number)
                .run_with(|args, _| async move {
                    let Some(limit) = args.get("number").and_then(Value::as_u64) else {
                        anyhow::bail!("missing number to count to");
                    };
                    Ok((1..=limit)
                        .map(|n| n.to_string())
                        .collect::<Vec<_>>()
                        .join(", "))
                }),
        )
}

fn greeting(context: &InvocationContext, name: Option<&str>) -> String {
    let hello = match context.lang() {
        "fr" => "Bonjour",
        "de" => "Hallo",
        "es" => "Hola",
        _ => "Hello",
    };
    match name {
        Some(name) if !name.is_empty() => format!("{} {}", hello, name),
        _ => hello.to_string(),
    }
}
