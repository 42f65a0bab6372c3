//! End-to-end tests: gateway + RagSession against a fake Ollama server

use axum::{
    body::Body,
    extract::State,
    http::{header, Method, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use help_rag::{build_router, AppState, DataType, GatewayConfig, RagSession, RetrievalSession};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

const SWARM_TEXT: &str = "Swarm robotics studies decentralized groups of simple robots. \
    A swarm is a decentralized group of robots that cooperate without a leader.";

/// Requests received by the fake Ollama, keyed by API path
#[derive(Clone, Default)]
struct FakeOllama {
    requests: Arc<Mutex<Vec<(&'static str, Value)>>>,
}

impl FakeOllama {
    fn requests_to(&self, path: &str) -> Vec<Value> {
        self.requests
            .lock()
            .iter()
            .filter(|(p, _)| *p == path)
            .map(|(_, body)| body.clone())
            .collect()
    }
}

fn word_hash_embedding(text: &str) -> Vec<f32> {
    let mut v = vec![0.0f32; 32];
    for word in text.split_whitespace() {
        let word = word.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase();
        let bucket = word
            .bytes()
            .fold(0usize, |acc, b| acc.wrapping_mul(31).wrapping_add(b as usize));
        v[bucket % 32] += 1.0;
    }
    v
}

fn ndjson(lines: &[Value]) -> Response {
    let mut body = String::new();
    for line in lines {
        body.push_str(&line.to_string());
        body.push('\n');
    }
    ([(header::CONTENT_TYPE, "application/x-ndjson")], body).into_response()
}

async fn tags() -> Json<Value> {
    Json(json!({"models": [{"name": "tinyllama:latest"}]}))
}

async fn embeddings(State(fake): State<FakeOllama>, Json(body): Json<Value>) -> Json<Value> {
    let prompt = body["prompt"].as_str().unwrap_or_default().to_string();
    fake.requests.lock().push(("/api/embeddings", body));
    Json(json!({"embedding": word_hash_embedding(&prompt)}))
}

async fn generate(State(fake): State<FakeOllama>, Json(body): Json<Value>) -> Response {
    let grounded = body["prompt"].as_str().unwrap_or_default().contains("decentralized group");
    let streaming = body["stream"] == json!(true);
    fake.requests.lock().push(("/api/generate", body));

    let answer = if grounded {
        "A swarm is a decentralized group of robots."
    } else {
        "I don't know."
    };

    if streaming {
        let (head, tail) = answer.split_at(8);
        ndjson(&[
            json!({"response": head, "done": false}),
            json!({"response": tail, "done": false}),
            json!({"response": "", "done": true}),
        ])
    } else {
        Json(json!({"response": answer, "done": true})).into_response()
    }
}

async fn chat(State(fake): State<FakeOllama>, Json(body): Json<Value>) -> Response {
    let count = body["messages"].as_array().map(|m| m.len()).unwrap_or(0);
    let streaming = body["stream"] == json!(true);
    fake.requests.lock().push(("/api/chat", body));

    let tail = format!("{} messages. ", count);
    if streaming {
        ndjson(&[
            json!({"message": {"role": "assistant", "content": "I saw "}, "done": false}),
            json!({"message": {"role": "assistant", "content": tail}, "done": false}),
            json!({"message": {"role": "assistant", "content": ""}, "done": true}),
        ])
    } else {
        let content = format!("I saw {}", tail);
        Json(json!({"message": {"role": "assistant", "content": content}, "done": true}))
            .into_response()
    }
}

/// Start the fake Ollama on an ephemeral port and return its base URL
async fn spawn_fake_ollama(fake: FakeOllama) -> String {
    let router = Router::new()
        .route("/api/tags", get(tags))
        .route("/api/embeddings", post(embeddings))
        .route("/api/generate", post(generate))
        .route("/api/chat", post(chat))
        .with_state(fake);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    format!("http://{}/", addr)
}

fn config_for(base_url: &str) -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.llm.base_url = base_url.to_string();
    config.llm.timeout_secs = 10;
    config.embedder.base_url = base_url.to_string();
    config
}

async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_query_answers_from_ingested_text() {
    let fake = FakeOllama::default();
    let base_url = spawn_fake_ollama(fake.clone()).await;

    let session = Arc::new(RagSession::from_config(&config_for(&base_url)).unwrap());
    session.add(SWARM_TEXT, DataType::Text).await.unwrap();

    let app = build_router(AppState::new(session.clone()));
    let (status, body) = post_json(app, "/query", json!({"query": "What is a swarm?"})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"response": "A swarm is a decentralized group of robots."}));

    let generated = fake.requests_to("/api/generate");
    assert_eq!(generated.len(), 1);
    let request = &generated[0];
    assert_eq!(request["model"], "tinyllama:latest");
    assert_eq!(request["stream"], true);
    assert_eq!(request["options"]["num_predict"], 250);
    assert_eq!(request["options"]["temperature"], 0.5);
    assert!(request["prompt"].as_str().unwrap().contains("What is a swarm?"));

    let embedded = fake.requests_to("/api/embeddings");
    assert!(embedded.iter().all(|r| r["model"] == "tinyllama:latest"));
    assert_eq!(embedded.last().unwrap()["prompt"], "What is a swarm?");
}

#[tokio::test]
async fn test_pdf_added_over_http_grounds_the_answer() {
    let fake = FakeOllama::default();
    let base_url = spawn_fake_ollama(fake.clone()).await;

    let session = Arc::new(RagSession::from_config(&config_for(&base_url)).unwrap());
    let app = build_router(AppState::new(session.clone()));

    let fixture = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/swarm.pdf");
    let (status, body) =
        post_json(app.clone(), "/add", json!({"data": {"file_path": fixture}})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Data added successfully"}));

    let documents = session.documents();
    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0].data_type, DataType::PdfFile);
    assert_eq!(documents[0].total_chunks, 1);

    let embedded = fake.requests_to("/api/embeddings");
    assert_eq!(embedded.len(), 1);
    assert!(embedded[0]["prompt"].as_str().unwrap().contains("decentralized group"));

    let (status, body) = post_json(app, "/query", json!({"query": "What is a swarm?"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"response": "A swarm is a decentralized group of robots."}));

    let prompt = fake.requests_to("/api/generate")[0]["prompt"].as_str().unwrap().to_string();
    assert!(prompt.contains("[1] swarm.pdf"), "{}", prompt);
}

#[tokio::test]
async fn test_non_streaming_query_and_chat() {
    let fake = FakeOllama::default();
    let base_url = spawn_fake_ollama(fake.clone()).await;

    let mut config = config_for(&base_url);
    config.llm.stream = false;
    let session = Arc::new(RagSession::from_config(&config).unwrap());
    session.add(SWARM_TEXT, DataType::Text).await.unwrap();
    let app = build_router(AppState::new(session));

    let (status, body) =
        post_json(app.clone(), "/query", json!({"query": "What is a swarm?"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"response": "A swarm is a decentralized group of robots."}));

    let (status, body) = post_json(app, "/chat", json!({"chat": "Hello"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"response": "I saw 2 messages."}));

    assert_eq!(fake.requests_to("/api/generate")[0]["stream"], false);
    assert_eq!(fake.requests_to("/api/chat")[0]["stream"], false);
}

#[tokio::test]
async fn test_duplicate_text_is_embedded_once() {
    let fake = FakeOllama::default();
    let base_url = spawn_fake_ollama(fake.clone()).await;
    let session = RagSession::from_config(&config_for(&base_url)).unwrap();

    session.add(SWARM_TEXT, DataType::Text).await.unwrap();
    let after_first = fake.requests_to("/api/embeddings").len();
    session.add(SWARM_TEXT, DataType::Text).await.unwrap();

    assert_eq!(fake.requests_to("/api/embeddings").len(), after_first);
    assert_eq!(session.documents().len(), 1);
}

#[tokio::test]
async fn test_chat_carries_history_between_requests() {
    let fake = FakeOllama::default();
    let base_url = spawn_fake_ollama(fake.clone()).await;

    let session = Arc::new(RagSession::from_config(&config_for(&base_url)).unwrap());
    let app = build_router(AppState::new(session.clone()));

    let (status, body) = post_json(app.clone(), "/chat", json!({"chat": "Hi, I'm Ana"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"response": "I saw 2 messages."}));

    let (status, body) = post_json(app, "/chat", json!({"chat": "What's my name?"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"response": "I saw 4 messages."}));

    let chats = fake.requests_to("/api/chat");
    assert_eq!(chats.len(), 2);

    let second = chats[1]["messages"].as_array().unwrap();
    assert_eq!(second[0]["role"], "system");
    assert_eq!(second[1], json!({"role": "user", "content": "Hi, I'm Ana"}));
    assert_eq!(second[2], json!({"role": "assistant", "content": "I saw 2 messages."}));
    assert_eq!(second[3], json!({"role": "user", "content": "What's my name?"}));

    assert_eq!(session.memory().turn_count("developer"), 2);
}

#[tokio::test]
async fn test_add_missing_pdf_is_500() {
    let fake = FakeOllama::default();
    let base_url = spawn_fake_ollama(fake.clone()).await;

    let session = Arc::new(RagSession::from_config(&config_for(&base_url)).unwrap());
    let app = build_router(AppState::new(session));

    let (status, body) = post_json(
        app,
        "/add",
        json!({"data": {"file_path": "/no/such/dir/swarm.pdf"}}),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("Failed to parse '/no/such/dir/swarm.pdf'"));
    assert!(fake.requests_to("/api/embeddings").is_empty());
}

#[tokio::test]
async fn test_health_check_sees_fake_ollama() {
    let base_url = spawn_fake_ollama(FakeOllama::default()).await;
    let session = RagSession::from_config(&config_for(&base_url)).unwrap();

    assert_eq!(session.health_check().await, (true, true, true));
}

#[tokio::test]
async fn test_unreachable_ollama_is_500() {
    // Nothing listens on port 1
    let session = Arc::new(RagSession::from_config(&config_for("http://127.0.0.1:1")).unwrap());
    let app = build_router(AppState::new(session));

    let (status, body) = post_json(app, "/query", json!({"query": "anyone there?"})).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .starts_with("LLM error: Generation request failed"));
}
