use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use futures_util::{SinkExt, StreamExt};
use intentlink_core::{
    Application, CoreConfig, DataType, Intent, IntentLinkError, Session, SessionState,
};
use serde_json::{json, Value};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{accept_async, WebSocketStream};

/// Plays the core's side of one connection.
struct FakeCore {
    ws: WebSocketStream<TcpStream>,
}

impl FakeCore {
    async fn recv_json(&mut self) -> Value {
        loop {
            let message = tokio::time::timeout(Duration::from_secs(5), self.ws.next())
                .await
                .expect("frame should arrive")
                .expect("socket open")
                .expect("valid frame");
            if let Message::Text(text) = message {
                return serde_json::from_str(&text).expect("frame is JSON");
            }
        }
    }

    async fn send_json(&mut self, value: Value) {
        self.ws
            .send(Message::Text(value.to_string()))
            .await
            .expect("send should succeed");
    }
}

async fn listen() -> (String, JoinHandle<FakeCore>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let accept = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        FakeCore {
            ws: accept_async(stream).await.unwrap(),
        }
    });
    (format!("ws://{addr}"), accept)
}

fn greeter_app() -> Arc<Application> {
    let city = DataType::list("city", ["Paris", "Berlin"]);
    Arc::new(
        Application::new("greeter")
            .with_intent(
                Intent::builder("hello")
                    .command("say hello to {city}")
                    .parameter("city", &city)
                    .run_with(|args, context| async move {
                        let city = args.get("city").and_then(Value::as_str).unwrap_or("world");
                        let greeting = match context.lang() {
                            "fr" => "Bonjour",
                            "de" => "Hallo",
                            _ => "Hello",
                        };
                        Ok(format!("{} {}", greeting, city))
                    }),
            )
            .with_intent(
                Intent::builder("broken")
                    .command("break")
                    .run_with(|_, _| async { Err(anyhow!("backend unavailable")) }),
            ),
    )
}

fn config(url: &str) -> CoreConfig {
    let mut config = CoreConfig::default().with_core_url(url);
    config.connect_timeout_secs = 2;
    config.request_timeout_secs = 5;
    config
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn session_registers_and_answers_invocations_over_websocket() {
    let (url, accept) = listen().await;
    let session = Arc::new(Session::new(vec![greeter_app()], config(&url)));

    let starting = {
        let session = Arc::clone(&session);
        tokio::spawn(async move { session.start().await })
    };

    let mut core = accept.await.unwrap();
    let register = core.recv_json().await;
    assert_eq!(register["method"], "registerApp");
    assert_eq!(
        register["payload"]["interactionModel"]["languageModel"],
        json!({
            "invocationName": "greeter",
            "intents": [
                {
                    "name": "hello",
                    "samples": ["say hello to {city}"],
                    "slots": [{ "name": "city", "type": "city" }]
                },
                { "name": "broken", "samples": ["break"], "slots": [] }
            ],
            "types": [{
                "name": "city",
                "values": [
                    { "id": "Paris", "name": { "value": "Paris" } },
                    { "id": "Berlin", "name": { "value": "Berlin" } }
                ]
            }]
        })
    );
    core.send_json(json!({ "id": register["id"], "result": { "ok": true } }))
        .await;

    starting.await.unwrap().expect("start should succeed");
    assert_eq!(session.state().await, SessionState::Serving);

    core.send_json(json!({
        "id": 100,
        "method": "greeter/hello",
        "payload": { "lang": "fr", "args": { "city": "Paris" } }
    }))
    .await;
    assert_eq!(
        core.recv_json().await,
        json!({ "id": 100, "result": { "responseText": "Bonjour Paris" } })
    );

    core.send_json(json!({ "id": 101, "method": "greeter/broken", "payload": {} }))
        .await;
    let failed = core.recv_json().await;
    assert_eq!(failed["id"], 101);
    assert!(failed["error"]["message"]
        .as_str()
        .unwrap()
        .contains("backend unavailable"));

    // A failed invocation leaves the session serving.
    core.send_json(json!({
        "id": 102,
        "method": "greeter/hello",
        "payload": { "args": {} }
    }))
    .await;
    assert_eq!(
        core.recv_json().await,
        json!({ "id": 102, "result": { "responseText": "Hello world" } })
    );
    assert_eq!(session.state().await, SessionState::Serving);

    session.stop().await;
    assert_eq!(session.state().await, SessionState::Stopped);
    let closed = tokio::time::timeout(Duration::from_secs(5), core.ws.next())
        .await
        .expect("close should arrive");
    assert!(matches!(closed, None | Some(Ok(Message::Close(_))) | Some(Err(_))));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn rejected_registration_fails_startup() {
    let (url, accept) = listen().await;
    let session = Arc::new(Session::new(vec![greeter_app()], config(&url)));

    let starting = {
        let session = Arc::clone(&session);
        tokio::spawn(async move { session.start().await })
    };

    let mut core = accept.await.unwrap();
    let register = core.recv_json().await;
    core.send_json(json!({
        "id": register["id"],
        "error": { "message": "invocation name taken" }
    }))
    .await;

    let err = starting.await.unwrap().unwrap_err();
    match err {
        IntentLinkError::Registration { app_id, message } => {
            assert_eq!(app_id, "greeter");
            assert!(message.contains("invocation name taken"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(session.state().await, SessionState::Failed);
    assert!(session.handler_keys().await.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn core_closing_the_socket_fails_the_session() {
    let (url, accept) = listen().await;
    let session = Arc::new(Session::new(vec![greeter_app()], config(&url)));

    let starting = {
        let session = Arc::clone(&session);
        tokio::spawn(async move { session.start().await })
    };

    let mut core = accept.await.unwrap();
    let register = core.recv_json().await;
    core.send_json(json!({ "id": register["id"], "result": null }))
        .await;
    starting.await.unwrap().expect("start should succeed");
    assert_eq!(session.state().await, SessionState::Serving);

    let _ = core.ws.close(None).await;
    drop(core);

    let finished = tokio::time::timeout(Duration::from_secs(5), session.finished())
        .await
        .expect("session should notice the closed socket");
    assert_eq!(finished, SessionState::Failed);
    assert!(session.handler_keys().await.is_empty());
}

#[tokio::test]
async fn unreachable_core_is_a_connection_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}", listener.local_addr().unwrap());
    drop(listener);

    let session = Session::new(vec![greeter_app()], config(&url));
    let err = session.start().await.unwrap_err();

    assert!(matches!(err, IntentLinkError::Connection(_)));
    assert_eq!(session.state().await, SessionState::Failed);
}
