//! Shared fixtures for integration tests.

#![allow(dead_code)]

use chrono::{DateTime, Utc};
use llm_api_interface::cache::{CacheConfig, CacheStore, Fingerprint};
use llm_api_interface::transport::{HttpTransport, Provider};
use llm_api_interface::Message;
use mockito::{Mock, Server, ServerGuard};
use serde_json::{json, Value};
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;

pub const ANTHROPIC_PATH: &str = "/v1/messages";
pub const OPENAI_PATH: &str = "/v1/chat/completions";
pub const TEST_KEY: &str = "test-key";

/// Mock provider endpoints for both providers on one server.
pub struct MockServerFixture {
    pub server: ServerGuard,
}

impl MockServerFixture {
    pub async fn new() -> Self {
        Self {
            server: Server::new_async().await,
        }
    }

    /// Transport pointed at the mock server, with test keys for both providers.
    pub fn transport(&self) -> HttpTransport {
        HttpTransport::builder()
            .timeout(Duration::from_secs(5))
            .endpoint(
                Provider::Anthropic,
                format!("{}{}", self.server.url(), ANTHROPIC_PATH),
            )
            .endpoint(
                Provider::OpenAi,
                format!("{}{}", self.server.url(), OPENAI_PATH),
            )
            .api_key(Provider::Anthropic, TEST_KEY)
            .api_key(Provider::OpenAi, TEST_KEY)
            .build()
            .expect("transport")
    }

    pub async fn mock_json_response(&mut self, path: &str, status: usize, body: &str) -> Mock {
        self.server
            .mock("POST", path)
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await
    }

    /// SSE body from already-framed `data:` payloads.
    pub async fn mock_sse_stream(&mut self, path: &str, chunks: &[&str]) -> Mock {
        let body = chunks
            .iter()
            .map(|chunk| {
                if chunk.starts_with("data: ") || chunk.starts_with("event: ") {
                    format!("{}\n\n", chunk)
                } else {
                    format!("data: {}\n\n", chunk)
                }
            })
            .collect::<Vec<_>>()
            .join("");

        self.server
            .mock("POST", path)
            .with_status(200)
            .with_header("content-type", "text/event-stream")
            .with_body(body)
            .create_async()
            .await
    }
}

pub fn openai_completion(text: &str) -> Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "model": "gpt-4o",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": text},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
    })
}

pub fn anthropic_completion(text: &str) -> Value {
    json!({
        "id": "msg_1",
        "type": "message",
        "role": "assistant",
        "model": "claude-3-5-sonnet-20241022",
        "content": [{"type": "text", "text": text}],
        "stop_reason": "end_turn",
        "usage": {"input_tokens": 12, "output_tokens": 4}
    })
}

/// Enabled store in a fresh temporary directory. Keep the `TempDir` alive
/// for as long as the store is used.
pub async fn temp_store(ttl: Duration) -> (TempDir, CacheStore) {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = CacheConfig::new().with_directory(dir.path()).with_ttl(ttl);
    let store = CacheStore::open(config).await.expect("open store");
    (dir, store)
}

/// Write an entry file directly, with a chosen `cached_at`.
pub fn write_entry_at(
    store: &CacheStore,
    model: &str,
    messages: &[Message],
    response: &Value,
    cached_at: DateTime<Utc>,
) -> Fingerprint {
    let key = Fingerprint::of(model, messages);
    let entry = json!({
        "cached_at": cached_at.to_rfc3339(),
        "model": model,
        "messages": messages,
        "response": response,
    });
    let path = store.entry_path(&key);
    std::fs::write(&path, serde_json::to_vec_pretty(&entry).expect("encode")).expect("write");
    key
}

pub fn json_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .map(|rd| {
            rd.filter_map(|e| e.ok())
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .filter(|n| n.ends_with(".json"))
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}
