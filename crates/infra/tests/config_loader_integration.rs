//! End-to-end tests: config file to router to provider HTTP calls.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

use cadence_core::CallContext;
use cadence_domain::{CadenceError, ChatMessage, ChatRequest};
use cadence_infra::{build_router, config};
use once_cell::sync::Lazy;
use serde_json::json;
use tempfile::NamedTempFile;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

static ENV_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

fn write_config(contents: &str, extension: &str) -> PathBuf {
    let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
    temp_file.write_all(contents.as_bytes()).expect("Failed to write to temp file");
    let path = temp_file.path().with_extension(extension);
    std::fs::copy(temp_file.path(), &path).expect("Failed to copy file");
    path
}

#[tokio::test]
async fn routed_chat_falls_back_from_config_file() {
    let ollama = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"models": []})))
        .mount(&ollama)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(500).set_body_string("model crashed"))
        .expect(3)
        .mount(&ollama)
        .await;

    let openai = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-from-file"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "gpt-4o-mini",
            "choices": [{"message": {"role": "assistant", "content": "Tuesday 10:00 works."}}],
            "usage": {"prompt_tokens": 12, "completion_tokens": 6, "total_tokens": 18}
        })))
        .expect(1)
        .mount(&openai)
        .await;

    let toml = format!(
        r#"
default_provider = "ollama"

[fallback]
enabled = true
providers = ["ollama", "claude", "openai"]

[ollama]
host = "{}"
model = "llama3.1"
timeout_secs = 5

[openai]
api_key = "sk-from-file"
base_url = "{}/v1"
timeout_secs = 5
"#,
        ollama.uri(),
        openai.uri()
    );
    let path = write_config(&toml, "toml");
    let loaded = config::load_from_file(Some(path.clone()));
    std::fs::remove_file(path).ok();

    let config = loaded.expect("config");
    let router = build_router(Some(&config)).expect("router");
    let request = ChatRequest::new(vec![ChatMessage::user("When can we meet?")]);

    let response = router.chat(&CallContext::new(), &request).await.expect("routed reply");

    assert_eq!(response.provider, "openai");
    assert_eq!(response.content, "Tuesday 10:00 works.");
    assert_eq!(response.usage.total_tokens, 18);
}

#[tokio::test]
async fn named_provider_errors_are_not_retried_elsewhere() {
    let claude = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"type": "error", "error": {"message": "invalid x-api-key"}})),
        )
        .expect(1)
        .mount(&claude)
        .await;

    let json = json!({
        "default_provider": "claude",
        "fallback": {"enabled": true, "providers": ["claude", "groq"]},
        "claude": {"api_key": "sk-bad", "base_url": claude.uri()},
        "groq": {"api_key": "gsk"}
    })
    .to_string();
    let path = write_config(&json, "json");
    let config = config::load_from_file(Some(path.clone())).expect("config");
    std::fs::remove_file(path).ok();

    let router = build_router(Some(&config)).expect("router");
    let request = ChatRequest::new(vec![ChatMessage::user("hi")]);

    let err = router.chat_with_provider(&CallContext::new(), "claude", &request).await.unwrap_err();
    assert_eq!(err, CadenceError::Auth("invalid x-api-key".into()));
}

#[test]
fn file_keys_resolve_from_environment() {
    let _guard = ENV_LOCK.lock().expect("env mutex poisoned");
    std::env::set_var("CADENCE_IT_GROQ_KEY", "gsk-resolved");

    let path = write_config(
        r#"
default_provider = "groq"

[groq]
api_key = "${CADENCE_IT_GROQ_KEY}"
"#,
        "toml",
    );
    let mut config = config::load_from_file(Some(path.clone())).expect("config");
    std::fs::remove_file(path).ok();
    config::resolve_api_keys(&mut config);
    std::env::remove_var("CADENCE_IT_GROQ_KEY");

    assert!(config.validate().is_ok());
    let groq = config.groq.expect("groq section");
    assert_eq!(groq.api_key, "gsk-resolved");
    assert_eq!(groq.model, "");
}

#[test]
fn unknown_default_provider_fails_validation() {
    let path = write_config(r#"{"default_provider": "gemini"}"#, "json");
    let config = config::load_from_file(Some(path.clone())).expect("config parses");
    std::fs::remove_file(path).ok();

    assert!(matches!(build_router(Some(&config)), Err(CadenceError::Config(_))));
}
