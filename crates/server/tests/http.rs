//! Drives a bound server over HTTP with offline providers.

use finqa_figures::PostProcessor;
use finqa_knowledge::embeddings::providers::TrigramProvider;
use finqa_knowledge::{Capabilities, ChunkerConfig, PipelineSettings, RagPipeline};
use finqa_llm::{DecodingConfig, MockClient};
use finqa_prompt::{ContextBudget, PromptDefinition};
use finqa_server::{routes::HealthResponse, routes::QueryResponse, routes::WelcomeResponse, AppState};
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

struct TestServer {
    base: String,
    _uploads: TempDir,
}

async fn start() -> TestServer {
    let uploads = TempDir::new().unwrap();

    let capabilities = Capabilities::new(
        Arc::new(TrigramProvider::new(384)),
        Arc::new(MockClient::with_response("I am not sure.")),
        ContextBudget::new(480).unwrap(),
        PromptDefinition::default_answer(),
        PostProcessor::default(),
    );
    let settings = PipelineSettings {
        chunker: ChunkerConfig::default(),
        top_k: 4,
        model: "google/flan-t5-large".to_string(),
        decoding: DecodingConfig::default(),
        generation_timeout: Duration::from_secs(5),
        upload_dir: uploads.path().to_path_buf(),
    };
    let state = AppState::new(RagPipeline::new(capabilities, settings));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        finqa_server::serve(listener, state).await.unwrap();
    });

    TestServer {
        base: format!("http://{}", addr),
        _uploads: uploads,
    }
}

fn query_form(file_name: &str, bytes: &[u8], query: &str) -> Form {
    Form::new()
        .part("file", Part::bytes(bytes.to_vec()).file_name(file_name.to_string()))
        .text("query", query.to_string())
}

#[tokio::test]
async fn test_root_welcome() {
    let server = start().await;
    let body: WelcomeResponse = reqwest::get(format!("{}/", server.base))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body.message, "Welcome to the Finance QA Agent API");
}

#[tokio::test]
async fn test_query_total_net_sales() {
    let server = start().await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/query/", server.base))
        .multipart(query_form(
            "report.txt",
            b"Total net sales $ 1,000 $ 2,000",
            "What is the total net sales YoY change?",
        ))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: QueryResponse = response.json().await.unwrap();
    assert!(body.response.contains("$1,000"), "{}", body.response);
    assert!(body.response.contains("$2,000"), "{}", body.response);
    assert!(body.response.contains("-50.0%"), "{}", body.response);
}

#[tokio::test]
async fn test_query_without_trailing_slash_and_health_count() {
    let server = start().await;
    let client = reqwest::Client::new();

    let health: HealthResponse = client
        .get(format!("{}/health", server.base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health.status, "ok");
    assert_eq!(health.cached_documents, 0);

    let response = client
        .post(format!("{}/query", server.base))
        .multipart(query_form("notes.txt", b"Gross margin improved.", "How did margin move?"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: QueryResponse = response.json().await.unwrap();
    assert_eq!(body.response, "I am not sure.");

    let health: HealthResponse = client
        .get(format!("{}/health", server.base))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health.cached_documents, 1);
}

#[tokio::test]
async fn test_missing_query_is_bad_request() {
    let server = start().await;
    let form = Form::new().part("file", Part::bytes(b"text".to_vec()).file_name("a.txt"));

    let response = reqwest::Client::new()
        .post(format!("{}/query/", server.base))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"]["code"], "bad_request");
}

#[tokio::test]
async fn test_missing_file_is_bad_request() {
    let server = start().await;
    let form = Form::new().text("query", "What changed?");

    let response = reqwest::Client::new()
        .post(format!("{}/query/", server.base))
        .multipart(form)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"]["message"], "missing file");
}

#[tokio::test]
async fn test_unreadable_pdf_is_unprocessable() {
    let server = start().await;

    let response = reqwest::Client::new()
        .post(format!("{}/query/", server.base))
        .multipart(query_form("broken.pdf", b"definitely not a pdf", "Revenue?"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"]["code"], "ingest_error");
}
