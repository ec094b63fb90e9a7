//! Integration tests for the FreshKing storefront.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p freshking-integration-tests
//! ```
//!
//! No network access or API keys are needed. Each test starts the storefront
//! router on an ephemeral port with either a [`ScriptedProvider`] or a real
//! provider pointed at a [`MockCompletionApi`].
//!
//! # Test Categories
//!
//! - `storefront_pages` - Pages, cart and checkout over HTTP
//! - `storefront_chat` - Chat API, directives, busy handling and the typing stream
//! - `completion_providers` - OpenAI and Gemini adapters against mock endpoints

#![allow(clippy::missing_panics_doc, clippy::expect_used)]

use std::collections::VecDeque;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
};
use futures::future::BoxFuture;
use secrecy::SecretString;
use serde_json::{Value, json};

use freshking_core::Message;
use freshking_storefront::config::{ChatConfig, ChatProvider, StorefrontConfig};
use freshking_storefront::llm::{CompletionError, CompletionProvider};
use freshking_storefront::state::AppState;

// =============================================================================
// Configuration
// =============================================================================

/// Chat settings for tests: no typing delay, short timeout.
#[must_use]
pub fn chat_config(provider: ChatProvider, base_url: &str) -> ChatConfig {
    ChatConfig {
        provider,
        api_key: SecretString::from("sk-test-9f8e7d6c5b4a3210".to_string()),
        model: match provider {
            ChatProvider::OpenAi => "gpt-4".to_string(),
            ChatProvider::Gemini => "gemini-1.5-flash".to_string(),
        },
        base_url: base_url.to_string(),
        temperature: 0.7,
        max_tokens: 500,
        timeout: Duration::from_secs(5),
        typing_base: Duration::ZERO,
        typing_start: Duration::ZERO,
    }
}

/// Storefront settings for tests.
#[must_use]
pub fn test_config(chat: ChatConfig) -> StorefrontConfig {
    StorefrontConfig {
        host: Ipv4Addr::LOCALHOST.into(),
        port: 0,
        base_url: "http://localhost".to_string(),
        chat,
        checkout_processing: Duration::from_millis(10),
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 0.0,
        sentry_traces_sample_rate: 0.0,
    }
}

// =============================================================================
// Scripted provider
// =============================================================================

/// Canned outcome for one completion call.
pub enum Reply {
    Text(&'static str),
    Fail(CompletionError),
    /// Never resolves until cancelled.
    Hang,
}

/// Provider that plays back a fixed script and records each history it saw.
#[derive(Default)]
pub struct ScriptedProvider {
    script: Mutex<VecDeque<Reply>>,
    histories: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedProvider {
    pub fn new(script: impl IntoIterator<Item = Reply>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into_iter().collect()),
            histories: Mutex::default(),
        })
    }

    /// Histories passed to each call, in order.
    pub fn histories(&self) -> Vec<Vec<Message>> {
        self.histories.lock().expect("histories lock").clone()
    }
}

impl CompletionProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn complete<'a>(
        &'a self,
        history: &'a [Message],
    ) -> BoxFuture<'a, Result<String, CompletionError>> {
        self.histories
            .lock()
            .expect("histories lock")
            .push(history.to_vec());
        let next = self.script.lock().expect("script lock").pop_front();

        Box::pin(async move {
            match next {
                Some(Reply::Text(text)) => Ok(text.to_string()),
                Some(Reply::Fail(err)) => Err(err),
                Some(Reply::Hang) => futures::future::pending().await,
                None => Err(CompletionError::Unknown("script exhausted".to_string())),
            }
        })
    }
}

// =============================================================================
// Test server
// =============================================================================

/// Serve a router on an ephemeral localhost port.
pub async fn serve(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind((Ipv4Addr::LOCALHOST, 0))
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("local addr");

    tokio::spawn(async move {
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .expect("test server");
    });

    addr
}

/// A running storefront and a cookie-keeping client for one visitor.
pub struct TestContext {
    pub client: reqwest::Client,
    pub base_url: String,
}

impl TestContext {
    /// Start a storefront backed by a scripted provider.
    pub async fn scripted(script: impl IntoIterator<Item = Reply>) -> (Self, Arc<ScriptedProvider>) {
        let provider = ScriptedProvider::new(script);
        let ctx = Self::with_provider(provider.clone()).await;
        (ctx, provider)
    }

    /// Start a storefront around any provider.
    pub async fn with_provider(provider: Arc<dyn CompletionProvider>) -> Self {
        let config = test_config(chat_config(ChatProvider::OpenAi, "http://unused.invalid"));
        let state = AppState::with_provider(config, provider);
        let addr = serve(freshking_storefront::app(state)).await;

        Self {
            client: Self::visitor(),
            base_url: format!("http://{addr}"),
        }
    }

    /// A fresh client with its own cookie jar (a second visitor).
    #[must_use]
    pub fn visitor() -> reqwest::Client {
        reqwest::Client::builder()
            .cookie_store(true)
            .build()
            .expect("test client")
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub async fn get_text(&self, path: &str) -> (StatusCode, String) {
        let response = self.client.get(self.url(path)).send().await.expect("GET");
        let status = StatusCode::from_u16(response.status().as_u16()).expect("status");
        (status, response.text().await.expect("body"))
    }

    /// Post a form, following the redirect.
    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> (StatusCode, String) {
        let response = self
            .client
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .expect("POST form");
        let status = StatusCode::from_u16(response.status().as_u16()).expect("status");
        (status, response.text().await.expect("body"))
    }

    /// Send a chat message and return the status and JSON body.
    pub async fn chat(&self, text: &str) -> (StatusCode, Value) {
        let response = self
            .client
            .post(self.url("/chat/messages"))
            .json(&json!({ "text": text }))
            .send()
            .await
            .expect("POST /chat/messages");
        let status = StatusCode::from_u16(response.status().as_u16()).expect("status");
        let body = response.text().await.expect("body");
        (status, serde_json::from_str(&body).unwrap_or(Value::String(body)))
    }

    pub async fn cart_count(&self) -> String {
        self.get_text("/cart/count").await.1
    }
}

/// One server-sent event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    pub event: String,
    pub data: String,
}

/// Split an SSE body into events, skipping keep-alive comments.
#[must_use]
pub fn parse_sse(body: &str) -> Vec<SseEvent> {
    body.split("\n\n")
        .filter_map(|block| {
            let mut event = None;
            let mut data = Vec::new();
            for line in block.lines() {
                if let Some(name) = line.strip_prefix("event:") {
                    event = Some(name.trim().to_string());
                } else if let Some(value) = line.strip_prefix("data:") {
                    data.push(value.strip_prefix(' ').unwrap_or(value));
                }
            }
            event.map(|event| SseEvent {
                event,
                data: data.join("\n"),
            })
        })
        .collect()
}

// =============================================================================
// Mock completion API
// =============================================================================

/// What the mock API answers with.
#[derive(Debug, Clone)]
pub enum MockReply {
    Text(String),
    Status(u16, Value),
    RateLimited { retry_after: Option<u64> },
}

/// A request the mock API received.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub headers: HeaderMap,
    pub body: Value,
}

#[derive(Clone)]
struct MockState {
    reply: MockReply,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

/// Local stand-in for the OpenAI and Gemini HTTP APIs.
pub struct MockCompletionApi {
    pub base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockCompletionApi {
    /// Start a mock that answers every call with `reply`.
    pub async fn start(reply: MockReply) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = MockState {
            reply,
            requests: requests.clone(),
        };

        let router = Router::new()
            .route("/chat/completions", post(openai_completions))
            .route("/models/{call}", post(gemini_generate))
            .with_state(state);
        let addr = serve(router).await;

        Self {
            base_url: format!("http://{addr}"),
            requests,
        }
    }

    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().expect("requests lock").clone()
    }
}

fn record(state: &MockState, path: String, headers: HeaderMap, body: Value) {
    state
        .requests
        .lock()
        .expect("requests lock")
        .push(RecordedRequest {
            path,
            headers,
            body,
        });
}

fn failure_response(reply: &MockReply) -> Response {
    match reply {
        MockReply::Status(status, body) => (
            StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            Json(body.clone()),
        )
            .into_response(),
        MockReply::RateLimited { retry_after } => {
            let mut response = (
                StatusCode::TOO_MANY_REQUESTS,
                Json(json!({ "error": { "message": "Rate limit reached" } })),
            )
                .into_response();
            if let Some(seconds) = retry_after {
                response.headers_mut().insert(
                    "retry-after",
                    seconds.to_string().parse().expect("header value"),
                );
            }
            response
        }
        MockReply::Text(_) => StatusCode::OK.into_response(),
    }
}

async fn openai_completions(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    record(&state, "/chat/completions".to_string(), headers, body);
    let text = match &state.reply {
        MockReply::Text(text) => text,
        other => return failure_response(other),
    };

    Json(json!({
        "id": "chatcmpl-test",
        "choices": [{ "index": 0, "message": { "role": "assistant", "content": text } }]
    }))
    .into_response()
}

async fn gemini_generate(
    State(state): State<MockState>,
    Path(call): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    record(&state, format!("/models/{call}"), headers, body);
    let text = match &state.reply {
        MockReply::Text(text) => text,
        other => return failure_response(other),
    };

    Json(json!({
        "candidates": [{ "content": { "role": "model", "parts": [{ "text": text }] } }]
    }))
    .into_response()
}
