//! RAG answering orchestration.
//!
//! One request runs:
//! 1. Content-hash the document and look up (or build) its index
//! 2. Retrieve the top-k chunks for the question
//! 3. Build the prompt within the context token budget
//! 4. Generate under a timeout
//! 5. Post-process figures against the untruncated context

use crate::cache::IndexCache;
use crate::chunker::{chunk_text, ChunkerConfig};
use crate::embeddings::{create_provider, embed_chunks, EmbeddingConfig, EmbeddingProvider};
use crate::index::DocumentIndex;
use crate::ingest::{self, Document};
use crate::normalize::normalize;
use crate::rag::types::{RagAnswer, RagSourceRef};
use crate::retriever::Retriever;
use crate::vector_index::VectorIndex;
use finqa_core::{AppConfig, AppError, AppResult};
use finqa_figures::{ExtractionStrategy, PostProcessor};
use finqa_llm::{DecodingConfig, LlmClient, LlmRequest};
use finqa_prompt::{build_prompt, resolve_prompt, BuiltPrompt, ContextBudget, PromptDefinition};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Long-lived handles created once at startup and shared by every request.
#[derive(Clone)]
pub struct Capabilities {
    pub embedder: Arc<dyn EmbeddingProvider>,
    pub generator: Arc<dyn LlmClient>,
    pub budget: ContextBudget,
    pub prompt: Arc<PromptDefinition>,
    pub post_processor: Arc<PostProcessor>,
}

impl std::fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Capabilities")
            .field("embedder", &self.embedder)
            .field("generator", &self.generator.provider_name())
            .field("budget", &self.budget)
            .field("prompt", &self.prompt.id)
            .field("post_processor", &self.post_processor)
            .finish()
    }
}

impl Capabilities {
    /// Create providers, load the tokenizer and resolve the prompt template.
    ///
    /// Any failure here is a configuration problem and should stop startup.
    pub fn init(config: &AppConfig) -> AppResult<Self> {
        let embedder = create_provider(
            &EmbeddingConfig::from_app_config(config),
            config.api_key.as_deref(),
        )?;

        let generator = finqa_llm::create_client(
            &config.provider,
            config.endpoint.as_deref(),
            config.api_key.as_deref(),
        )
        .map_err(AppError::Config)?;

        let budget = ContextBudget::new(config.rag.context_budget)?;
        let prompt = resolve_prompt(config.prompt_file.as_deref())?;
        let strategy: ExtractionStrategy = config.extraction_strategy.parse()?;

        tracing::info!(
            generator = generator.provider_name(),
            embedder = embedder.provider_name(),
            embedding_model = embedder.model_name(),
            prompt = %prompt.id,
            strategy = %strategy,
            "Capabilities initialized"
        );

        Ok(Self::new(
            embedder,
            generator,
            budget,
            prompt,
            PostProcessor::new(strategy),
        ))
    }

    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        generator: Arc<dyn LlmClient>,
        budget: ContextBudget,
        prompt: PromptDefinition,
        post_processor: PostProcessor,
    ) -> Self {
        Self {
            embedder,
            generator,
            budget,
            prompt: Arc::new(prompt),
            post_processor: Arc::new(post_processor),
        }
    }
}

/// Per-request pipeline parameters.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub chunker: ChunkerConfig,
    pub top_k: usize,
    pub model: String,
    pub decoding: DecodingConfig,
    pub generation_timeout: Duration,
    pub upload_dir: PathBuf,
}

impl PipelineSettings {
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        Ok(Self {
            chunker: ChunkerConfig::new(config.rag.chunk_size, config.rag.chunk_overlap)?,
            top_k: config.rag.top_k,
            model: config.model.clone(),
            decoding: DecodingConfig::new(
                config.decoding.max_length,
                config.decoding.num_beams,
                config.decoding.no_repeat_ngram_size,
            ),
            generation_timeout: Duration::from_secs(config.rag.generation_timeout_secs),
            upload_dir: config.upload_dir.clone(),
        })
    }
}

/// Answers questions about uploaded documents.
///
/// Cheap to clone; clones share capabilities and the index cache.
#[derive(Debug, Clone)]
pub struct RagPipeline {
    capabilities: Arc<Capabilities>,
    settings: Arc<PipelineSettings>,
    cache: Arc<IndexCache>,
    retriever: Retriever,
}

impl RagPipeline {
    pub fn new(capabilities: Capabilities, settings: PipelineSettings) -> Self {
        Self::with_cache(capabilities, settings, Arc::new(IndexCache::new()))
    }

    pub fn with_cache(capabilities: Capabilities, settings: PipelineSettings, cache: Arc<IndexCache>) -> Self {
        let retriever = Retriever::new(Arc::clone(&capabilities.embedder), settings.top_k);
        Self {
            capabilities: Arc::new(capabilities),
            settings: Arc::new(settings),
            cache,
            retriever,
        }
    }

    /// Initialize everything from configuration.
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        let settings = PipelineSettings::from_config(config)?;
        let capabilities = Capabilities::init(config)?;
        Ok(Self::new(capabilities, settings))
    }

    pub fn cache(&self) -> &IndexCache {
        &self.cache
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Persist an uploaded file, then answer `query` about it.
    pub async fn answer_upload(&self, file_name: &str, bytes: Vec<u8>, query: &str) -> AppResult<RagAnswer> {
        let document = Document::new(sanitize_file_name(file_name), bytes);
        self.persist_upload(&document).await?;
        self.answer_document(&document, query).await
    }

    /// Answer `query` about a file on disk.
    pub async fn answer_path(&self, path: &Path, query: &str) -> AppResult<RagAnswer> {
        let document = Document::read(path).await?;
        self.answer_document(&document, query).await
    }

    /// Answer `query` about an in-memory document.
    pub async fn answer_document(&self, document: &Document, query: &str) -> AppResult<RagAnswer> {
        tracing::info!(
            document = %document.id.short(),
            name = %document.name,
            "Answering query: {}",
            query
        );

        let cache_hit = self.cache.contains(&document.id);
        if !cache_hit {
            tracing::info!(document = %document.id.short(), "Index cache miss");
        }

        let index = self
            .cache
            .get_or_build(&document.id, || self.build_index(document))
            .await?;

        if cache_hit {
            tracing::info!(
                document = %document.id.short(),
                model = index.model(),
                built_at = %index.built_at(),
                chunks = index.len(),
                "Index cache hit"
            );
        }

        let retrieved = self.retriever.retrieve(index.as_ref(), query).await?;
        let built = self.build_prompt(query, retrieved.texts()).await?;
        tracing::debug!("Prompt: {}", built.text);

        let request = LlmRequest::new(built.text, self.settings.model.clone())
            .with_decoding(self.settings.decoding);

        let response = tokio::time::timeout(
            self.settings.generation_timeout,
            self.capabilities.generator.complete(&request),
        )
        .await
        .map_err(|_| {
            AppError::Timeout(format!(
                "Generation exceeded {}s",
                self.settings.generation_timeout.as_secs()
            ))
        })??;

        tracing::debug!("Generated: {}", response.content);

        let answer = self.capabilities.post_processor.process(
            query,
            &response.content,
            &retrieved.joined_lines(),
        );

        Ok(RagAnswer {
            response: answer.text,
            origin: answer.origin,
            generated: response.content,
            document_id: document.id.to_string(),
            cache_hit,
            context_tokens: built.metadata.context_tokens,
            context_truncated: built.metadata.truncated,
            decoding: response.decoding,
            sources: retrieved.chunks.iter().map(RagSourceRef::from).collect(),
        })
    }

    /// Write the upload to `<upload_dir>/<id[..16]>-<name>`.
    pub async fn persist_upload(&self, document: &Document) -> AppResult<PathBuf> {
        let dir = &self.settings.upload_dir;
        tokio::fs::create_dir_all(dir).await?;

        let path = dir.join(format!("{}-{}", document.id.short(), document.name));
        tokio::fs::write(&path, &document.bytes).await?;

        tracing::debug!("Saved upload to {:?}", path);
        Ok(path)
    }

    async fn build_index(&self, document: &Document) -> AppResult<DocumentIndex> {
        let text = ingest::extract(document).await?;

        let id = document.id.clone();
        let chunker = self.settings.chunker;
        let chunks = tokio::task::spawn_blocking(move || chunk_text(&id, &normalize(&text), &chunker))
            .await
            .map_err(|e| AppError::Knowledge(format!("Chunking task failed: {}", e)))??;

        let embedder = &self.capabilities.embedder;
        if chunks.is_empty() {
            tracing::warn!(document = %document.id.short(), "Document has no extractable text");
            return Ok(DocumentIndex::empty(
                document.id.clone(),
                embedder.dimensions(),
                embedder.model_name(),
            ));
        }

        let vectors = embed_chunks(embedder.as_ref(), &chunks).await?;
        let index = DocumentIndex::build(
            document.id.clone(),
            chunks,
            vectors,
            embedder.dimensions(),
            embedder.model_name(),
        )?;

        tracing::info!(
            document = %document.id.short(),
            chunks = index.len(),
            "Built document index"
        );

        Ok(index)
    }

    async fn build_prompt(&self, query: &str, chunks: Vec<String>) -> AppResult<BuiltPrompt> {
        let prompt = Arc::clone(&self.capabilities.prompt);
        let budget = self.capabilities.budget.clone();
        let query = query.to_string();

        tokio::task::spawn_blocking(move || build_prompt(&prompt, &query, &chunks, &budget))
            .await
            .map_err(|e| AppError::Prompt(format!("Prompt task failed: {}", e)))?
    }
}

/// Reduce an uploaded file name to a safe single path component.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');

    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}
