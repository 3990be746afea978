//! Pipeline tests with offline trigram embeddings and mock generators.

use crate::embeddings::providers::TrigramProvider;
use crate::ingest::FILE_NOT_FOUND;
use crate::rag::{Capabilities, PipelineSettings, RagPipeline};
use crate::types::DocumentId;
use crate::ChunkerConfig;
use finqa_core::{AppError, AppResult};
use finqa_figures::{AnswerOrigin, PostProcessor};
use finqa_llm::{DecodingConfig, LlmClient, LlmRequest, LlmResponse, MockClient};
use finqa_prompt::{ContextBudget, PromptDefinition};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

const YOY_QUERY: &str = "What is the total net sales YoY change?";

fn settings(upload_dir: &Path) -> PipelineSettings {
    PipelineSettings {
        chunker: ChunkerConfig::default(),
        top_k: 4,
        model: "google/flan-t5-large".to_string(),
        decoding: DecodingConfig::default(),
        generation_timeout: Duration::from_secs(5),
        upload_dir: upload_dir.to_path_buf(),
    }
}

fn pipeline_with(generator: Arc<dyn LlmClient>, upload_dir: &Path) -> RagPipeline {
    let capabilities = Capabilities::new(
        Arc::new(TrigramProvider::new(384)),
        generator,
        ContextBudget::new(480).unwrap(),
        PromptDefinition::default_answer(),
        PostProcessor::default(),
    );
    RagPipeline::new(capabilities, settings(upload_dir))
}

#[derive(Debug)]
struct SlowClient(Duration);

#[async_trait::async_trait]
impl LlmClient for SlowClient {
    fn provider_name(&self) -> &str {
        "slow"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        tokio::time::sleep(self.0).await;
        MockClient::echo().complete(request).await
    }
}

#[tokio::test]
async fn test_total_net_sales_comparison() {
    let temp = TempDir::new().unwrap();
    let pipeline = pipeline_with(Arc::new(MockClient::with_response("no idea")), temp.path());

    let answer = pipeline
        .answer_upload("report.txt", b"Total net sales $ 1,000 $ 2,000".to_vec(), YOY_QUERY)
        .await
        .unwrap();

    assert_eq!(answer.origin, AnswerOrigin::Formatted);
    assert!(answer.response.contains("$1,000"), "{}", answer.response);
    assert!(answer.response.contains("$2,000"), "{}", answer.response);
    assert!(answer.response.contains("-50.0%"), "{}", answer.response);
    assert_eq!(answer.generated, "no idea");
    assert!(!answer.cache_hit);
    assert_eq!(answer.sources.len(), 1);
}

#[tokio::test]
async fn test_upload_is_persisted_under_content_hash() {
    let temp = TempDir::new().unwrap();
    let pipeline = pipeline_with(Arc::new(MockClient::echo()), temp.path());

    let answer = pipeline
        .answer_upload("q3 report.txt", b"Services net sales $ 2,000 $ 1,800".to_vec(), "Services?")
        .await
        .unwrap();

    let expected = temp
        .path()
        .join(format!("{}-q3_report.txt", &answer.document_id[..16]));
    assert_eq!(
        std::fs::read(expected).unwrap(),
        b"Services net sales $ 2,000 $ 1,800"
    );
}

#[tokio::test]
async fn test_identical_upload_hits_cache() {
    let temp = TempDir::new().unwrap();
    let generator = Arc::new(MockClient::with_response("ok"));
    let pipeline = pipeline_with(generator.clone(), temp.path());
    let bytes = b"iPhone net sales $ 5,000 $ 4,000".to_vec();
    let id = DocumentId::from_bytes(&bytes);

    let first = pipeline
        .answer_upload("a.txt", bytes.clone(), "iPhone sales?")
        .await
        .unwrap();
    let second = pipeline
        .answer_upload("b.txt", bytes, "iPhone sales?")
        .await
        .unwrap();

    assert!(!first.cache_hit);
    assert!(second.cache_hit);
    assert_eq!(first.document_id, second.document_id);
    assert_eq!(pipeline.cache().len(), 1);
    assert_eq!(generator.calls(), 2);

    // The cached index keeps its embedding model and build time
    let cached = pipeline
        .cache()
        .get_or_build(&id, || async {
            Err(AppError::Knowledge("index should already be cached".to_string()))
        })
        .await
        .unwrap();
    assert_eq!(cached.model(), "trigram-v1");
    assert!(cached.built_at() <= chrono::Utc::now());
}

#[tokio::test]
async fn test_prompt_carries_context_and_question() {
    let temp = TempDir::new().unwrap();
    let pipeline = pipeline_with(Arc::new(MockClient::echo()), temp.path());

    let answer = pipeline
        .answer_upload("notes.txt", b"Gross Margin improved.".to_vec(), "How did margin move?")
        .await
        .unwrap();

    assert_eq!(
        answer.generated,
        "Context: gross margin improved.\nQuestion: How did margin move?\nAnswer:"
    );
    assert_eq!(answer.origin, AnswerOrigin::Raw);
    assert_eq!(answer.response, answer.generated);
    assert!(!answer.context_truncated);
}

#[tokio::test]
async fn test_raw_generation_when_no_figures() {
    let temp = TempDir::new().unwrap();
    let pipeline = pipeline_with(
        Arc::new(MockClient::with_response("The outlook is stable.")),
        temp.path(),
    );

    let answer = pipeline
        .answer_upload("outlook.txt", b"Management expects stable demand.".to_vec(), "What is the outlook?")
        .await
        .unwrap();

    assert_eq!(answer.origin, AnswerOrigin::Raw);
    assert_eq!(answer.response, "The outlook is stable.");
}

#[tokio::test]
async fn test_missing_file_short_circuits() {
    let temp = TempDir::new().unwrap();
    let generator = Arc::new(MockClient::echo());
    let pipeline = pipeline_with(generator.clone(), temp.path());

    let err = pipeline
        .answer_path(&temp.path().join("missing.pdf"), YOY_QUERY)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Ingest(ref m) if m == FILE_NOT_FOUND));
    assert_eq!(generator.calls(), 0);
    assert!(pipeline.cache().is_empty());
}

#[tokio::test]
async fn test_unparseable_pdf_is_ingest_error() {
    let temp = TempDir::new().unwrap();
    let pipeline = pipeline_with(Arc::new(MockClient::echo()), temp.path());

    let err = pipeline
        .answer_upload("broken.pdf", b"not a pdf at all".to_vec(), YOY_QUERY)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Ingest(_)));
}

#[tokio::test]
async fn test_generation_timeout() {
    let temp = TempDir::new().unwrap();
    let mut settings = settings(temp.path());
    settings.generation_timeout = Duration::from_millis(20);

    let capabilities = Capabilities::new(
        Arc::new(TrigramProvider::new(384)),
        Arc::new(SlowClient(Duration::from_secs(2))),
        ContextBudget::new(480).unwrap(),
        PromptDefinition::default_answer(),
        PostProcessor::default(),
    );
    let pipeline = RagPipeline::new(capabilities, settings);

    let err = pipeline
        .answer_upload("report.txt", b"Total net sales $ 1,000 $ 2,000".to_vec(), YOY_QUERY)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Timeout(_)));
}

#[tokio::test]
async fn test_long_document_context_is_budgeted() {
    let temp = TempDir::new().unwrap();
    let pipeline = pipeline_with(Arc::new(MockClient::with_response("ok")), temp.path());

    let mut text = String::new();
    for i in 0..400 {
        text.push_str(&format!("Segment {} revenue grew in the americas region.\n", i));
    }

    let answer = pipeline
        .answer_upload("long.txt", text.into_bytes(), "How did revenue grow?")
        .await
        .unwrap();

    assert!(answer.context_truncated);
    assert_eq!(answer.context_tokens, 480);
    assert_eq!(answer.sources.len(), 4);
}
