//! Full relay path: artscore server -> OpenAiBackend -> fake chat-completions endpoint.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use artscore_core::analysis::openai::OpenAiBackend;
use artscore_core::config::Config;
use artscore_core::models::ScoreLabel;
use artscore_server::AppState;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{Value, json};
use tempfile::TempDir;
use tokio::net::TcpListener;

/// What the fake upstream should answer, and what it received.
#[derive(Clone)]
struct Upstream {
    status: StatusCode,
    body: Value,
    received: Arc<Mutex<Vec<(Option<String>, Value)>>>,
}

async fn completions(
    State(upstream): State<Upstream>,
    headers: HeaderMap,
    Json(payload): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    upstream.received.lock().unwrap().push((auth, payload));
    (upstream.status, Json(upstream.body.clone()))
}

async fn spawn_upstream(upstream: Upstream) -> Result<SocketAddr> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let app = Router::new()
        .route("/v1/chat/completions", post(completions))
        .with_state(upstream);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(addr)
}

/// Starts the relay against `upstream_addr`. The returned `TempDir` is the
/// relay's public directory and must outlive the test.
async fn spawn_relay(
    label: ScoreLabel,
    upstream_addr: SocketAddr,
) -> Result<(SocketAddr, TempDir)> {
    let dir = tempfile::tempdir()?;
    let mut config = Config::default();
    config.server.variant = label;
    config.server.public_dir = dir.path().display().to_string();
    config.upstream.endpoint = format!("http://{upstream_addr}/v1/chat/completions");
    config.upstream.api_key = Some("sk-test-key".to_string());
    config.upstream.timeout_secs = Some(10);

    let backend = Arc::new(OpenAiBackend::new(&config.upstream)?);
    let state = AppState::from_config(&config, backend, dir.path());

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(artscore_server::serve(listener, state, std::future::pending()));
    Ok((addr, dir))
}

fn completion_body(content: &str) -> Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [{"index": 0, "message": {"role": "assistant", "content": content}, "finish_reason": "stop"}],
        "usage": {"prompt_tokens": 900, "completion_tokens": 120, "total_tokens": 1020}
    })
}

#[tokio::test]
async fn relays_to_upstream_and_extracts_ri() -> Result<()> {
    let received = Arc::new(Mutex::new(Vec::new()));
    let upstream_addr = spawn_upstream(Upstream {
        status: StatusCode::OK,
        body: completion_body(
            "The portrait is detailed.\n\nRepresentational Index (RI) = 4.8\nA faithful likeness of the sitter.",
        ),
        received: received.clone(),
    })
    .await?;
    let (relay, _dir) = spawn_relay(ScoreLabel::Ri, upstream_addr).await?;

    let resp = reqwest::Client::new()
        .post(format!("http://{relay}/analyze"))
        .json(&json!({"prompt": "Rate it.", "image": "aGVsbG8=", "artTitle": "Mona Lisa", "artistName": "Leonardo"}))
        .send()
        .await?;
    assert_eq!(resp.status(), reqwest::StatusCode::OK);
    let body: Value = resp.json().await?;
    assert_eq!(body["ri"], "4.80");
    assert_eq!(body["explanation"], "A faithful likeness of the sitter.");

    let received = received.lock().unwrap();
    assert_eq!(received.len(), 1);
    let (auth, payload) = &received[0];
    assert_eq!(auth.as_deref(), Some("Bearer sk-test-key"));
    assert_eq!(payload["model"], "gpt-4-turbo-preview");
    assert_eq!(payload["max_tokens"], 1000);
    assert_eq!(payload["messages"][0]["role"], "system");
    let user_text = payload["messages"][1]["content"][0]["text"].as_str().unwrap_or_default();
    assert!(user_text.starts_with("Title: Mona Lisa\nArtist: Leonardo\n\nRate it."));
    assert!(user_text.contains("Representational Index (RI) = X.XX"));
    assert_eq!(
        payload["messages"][1]["content"][1]["image_url"]["url"],
        "data:image/jpeg;base64,aGVsbG8="
    );
    Ok(())
}

#[tokio::test]
async fn upstream_error_message_is_forwarded_and_scrubbed() -> Result<()> {
    let upstream_addr = spawn_upstream(Upstream {
        status: StatusCode::UNAUTHORIZED,
        body: json!({"error": {
            "message": "Incorrect API key provided: sk-test*****-key. You can find your API key at https://platform.openai.com/account/api-keys.",
            "type": "invalid_request_error",
            "code": "invalid_api_key"
        }}),
        received: Arc::new(Mutex::new(Vec::new())),
    })
    .await?;
    let (relay, _dir) = spawn_relay(ScoreLabel::Smi, upstream_addr).await?;

    let resp = reqwest::Client::new()
        .post(format!("http://{relay}/analyze"))
        .json(&json!({"prompt": "Rate it.", "image": "aGVsbG8="}))
        .send()
        .await?;
    assert_eq!(resp.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = resp.json().await?;
    let message = body["error"]["message"].as_str().unwrap_or_default();
    assert!(message.starts_with("Incorrect API key provided"));
    assert!(!message.contains("sk-test"));
    assert_eq!(body["error"]["details"]["error"]["code"], "invalid_api_key");
    Ok(())
}

#[tokio::test]
async fn malformed_upstream_body_is_500() -> Result<()> {
    let upstream_addr = spawn_upstream(Upstream {
        status: StatusCode::OK,
        body: json!({"choices": []}),
        received: Arc::new(Mutex::new(Vec::new())),
    })
    .await?;
    let (relay, _dir) = spawn_relay(ScoreLabel::Smi, upstream_addr).await?;

    let resp = reqwest::Client::new()
        .post(format!("http://{relay}/analyze"))
        .json(&json!({"prompt": "Rate it.", "image": "aGVsbG8="}))
        .send()
        .await?;
    assert_eq!(resp.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = resp.json().await?;
    assert!(
        body["error"]["message"]
            .as_str()
            .unwrap_or_default()
            .contains("malformed")
    );
    Ok(())
}

#[tokio::test]
async fn unreachable_upstream_is_500() -> Result<()> {
    // Bind then drop to get a port with nothing listening.
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        listener.local_addr()?
    };
    let (relay, _dir) = spawn_relay(ScoreLabel::Ri, addr).await?;

    let resp = reqwest::Client::new()
        .post(format!("http://{relay}/analyze"))
        .json(&json!({"prompt": "Rate it.", "image": "aGVsbG8="}))
        .send()
        .await?;
    assert_eq!(resp.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = resp.json().await?;
    assert_eq!(body["error"]["message"], "OpenAI request failed");
    Ok(())
}

#[tokio::test]
async fn relay_public_dir_outlives_startup() -> Result<()> {
    let upstream_addr = spawn_upstream(Upstream {
        status: StatusCode::OK,
        body: completion_body("SMI = 2.0"),
        received: Arc::new(Mutex::new(Vec::new())),
    })
    .await?;
    let (relay, dir) = spawn_relay(ScoreLabel::Ri, upstream_addr).await?;
    assert!(dir.path().is_dir());
    std::fs::write(dir.path().join("PromptCalcRI.txt"), "Deployed RI instructions.")?;

    let resp = reqwest::get(format!("http://{relay}/PromptCalcRI.txt")).await?;
    assert_eq!(resp.status(), reqwest::StatusCode::OK);
    assert_eq!(resp.text().await?, "Deployed RI instructions.");
    Ok(())
}
