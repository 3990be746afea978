//! Configuration management for FinQA.
//!
//! This module handles loading and merging configuration from multiple sources:
//! - Built-in defaults
//! - A YAML config file (`finqa.yaml` or `FINQA_CONFIG`)
//! - Environment variables
//! - Command-line flags
//!
//! Configuration problems are fatal: [`AppConfig::validate`] runs before the
//! server binds, so a misconfigured process never serves requests.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Environment variable holding the hosted inference token.
pub const API_TOKEN_ENV: &str = "HUGGINGFACEHUB_API_TOKEN";

/// Default config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "finqa.yaml";

/// Generation providers understood by the LLM factory.
pub const KNOWN_PROVIDERS: [&str; 3] = ["huggingface", "ollama", "mock"];

/// Embedding providers understood by the embedding factory.
pub const KNOWN_EMBEDDING_PROVIDERS: [&str; 3] = ["huggingface", "trigram", "mock"];

/// Numeric post-processing strategies.
pub const KNOWN_STRATEGIES: [&str; 3] = ["generic-four-number", "keyword-routed", "ratio-aware"];

/// Resolve a generation provider name or alias (case-insensitive) to its canonical name.
pub fn canonical_provider(name: &str) -> Option<&'static str> {
    match name.trim().to_lowercase().as_str() {
        "huggingface" | "hf" => Some("huggingface"),
        "ollama" => Some("ollama"),
        "mock" => Some("mock"),
        _ => None,
    }
}

/// Resolve an embedding provider name or alias. `mock` is the trigram provider.
pub fn canonical_embedding_provider(name: &str) -> Option<&'static str> {
    match name.trim().to_lowercase().as_str() {
        "huggingface" | "hf" => Some("huggingface"),
        "trigram" | "mock" => Some("trigram"),
        _ => None,
    }
}

/// Resolve an extraction strategy name or short alias.
pub fn canonical_strategy(name: &str) -> Option<&'static str> {
    match name.trim().to_lowercase().as_str() {
        "generic-four-number" | "generic" => Some("generic-four-number"),
        "keyword-routed" | "keyword" => Some("keyword-routed"),
        "ratio-aware" | "ratio" => Some("ratio-aware"),
        _ => None,
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Generation provider ("huggingface", "ollama", "mock")
    pub provider: String,

    /// Generation model identifier
    pub model: String,

    /// Optional custom endpoint for the generation provider
    pub endpoint: Option<String>,

    /// Embedding provider ("huggingface", "trigram", "mock")
    pub embedding_provider: String,

    /// Embedding model identifier
    pub embedding_model: String,

    /// Embedding vector dimension
    pub embedding_dim: usize,

    /// Custom endpoint for the hosted embedding pipeline
    pub embedding_endpoint: Option<String>,

    /// Token for the hosted inference backend
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// HTTP bind address
    pub bind: String,

    /// Directory uploaded documents are written to
    pub upload_dir: PathBuf,

    /// Retrieval and context settings
    pub rag: RagSettings,

    /// Decoding parameters passed to the generator
    pub decoding: DecodingSettings,

    /// Numeric post-processing strategy name
    pub extraction_strategy: String,

    /// Optional YAML prompt definition replacing the built-in template
    pub prompt_file: Option<PathBuf>,

    /// Log level override
    pub log_level: Option<String>,

    /// Log format ("text" or "json")
    pub log_format: String,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,
}

/// Retrieval pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RagSettings {
    /// Maximum chunk length in characters
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Maximum overlap between neighbouring chunks in characters
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    /// Number of chunks retrieved per query
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Token budget for the context section of the prompt
    #[serde(default = "default_context_budget")]
    pub context_budget: usize,

    /// Upper bound on a single generation call
    #[serde(default = "default_generation_timeout")]
    pub generation_timeout_secs: u64,
}

fn default_chunk_size() -> usize {
    1500
}

fn default_chunk_overlap() -> usize {
    300
}

fn default_top_k() -> usize {
    4
}

fn default_context_budget() -> usize {
    480
}

fn default_generation_timeout() -> u64 {
    60
}

impl Default for RagSettings {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            top_k: default_top_k(),
            context_budget: default_context_budget(),
            generation_timeout_secs: default_generation_timeout(),
        }
    }
}

/// Beam-search decoding settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DecodingSettings {
    /// Maximum generated length
    #[serde(default = "default_max_length")]
    pub max_length: u32,

    /// Beam width (1 = greedy)
    #[serde(default = "default_num_beams")]
    pub num_beams: u32,

    /// Forbid repeating any n-gram of this size (0 disables)
    #[serde(default = "default_no_repeat_ngram_size")]
    pub no_repeat_ngram_size: u32,
}

fn default_max_length() -> u32 {
    512
}

fn default_num_beams() -> u32 {
    4
}

fn default_no_repeat_ngram_size() -> u32 {
    3
}

impl Default for DecodingSettings {
    fn default() -> Self {
        Self {
            max_length: default_max_length(),
            num_beams: default_num_beams(),
            no_repeat_ngram_size: default_no_repeat_ngram_size(),
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    llm: Option<LlmSection>,
    rag: Option<RagSettings>,
    decoding: Option<DecodingSettings>,
    extraction: Option<ExtractionSection>,
    server: Option<ServerSection>,
    prompt: Option<PromptSection>,
    logging: Option<LoggingSection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LlmSection {
    provider: Option<String>,
    model: Option<String>,
    endpoint: Option<String>,
    embedding_provider: Option<String>,
    embedding_model: Option<String>,
    embedding_dimensions: Option<usize>,
    embedding_endpoint: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ExtractionSection {
    strategy: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServerSection {
    bind: Option<String>,
    upload_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PromptSection {
    file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingSection {
    level: Option<String>,
    format: Option<String>,
    color: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_file: None,
            provider: "huggingface".to_string(),
            model: "google/flan-t5-large".to_string(),
            endpoint: None,
            embedding_provider: "huggingface".to_string(),
            embedding_model: "sentence-transformers/all-MiniLM-L6-v2".to_string(),
            embedding_dim: 384,
            embedding_endpoint: None,
            api_key: None,
            bind: "127.0.0.1:8000".to_string(),
            upload_dir: PathBuf::from("uploads"),
            rag: RagSettings::default(),
            decoding: DecodingSettings::default(),
            extraction_strategy: "ratio-aware".to_string(),
            prompt_file: None,
            log_level: None,
            log_format: "text".to_string(),
            verbose: false,
            no_color: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, the config file and the process environment.
    ///
    /// Environment variables:
    /// - `FINQA_CONFIG`: Path to config file (default `./finqa.yaml` if present)
    /// - `FINQA_PROVIDER`, `FINQA_MODEL`, `FINQA_ENDPOINT`: Generation backend
    /// - `FINQA_EMBEDDING_PROVIDER`, `FINQA_EMBEDDING_ENDPOINT`: Embedding backend
    /// - `FINQA_BIND`, `FINQA_UPLOAD_DIR`: Server settings
    /// - `FINQA_EXTRACTION_STRATEGY`: Numeric post-processing strategy
    /// - `HUGGINGFACEHUB_API_TOKEN`: Hosted inference token
    /// - `RUST_LOG`, `NO_COLOR`: Logging
    ///
    /// # Example
    /// ```no_run
    /// use finqa_core::config::AppConfig;
    ///
    /// let config = AppConfig::load(None).expect("Failed to load config");
    /// println!("Bind: {}", config.bind);
    /// ```
    pub fn load(config_file: Option<PathBuf>) -> AppResult<Self> {
        Self::load_with(config_file, |key| std::env::var(key).ok())
    }

    /// Load configuration using a custom environment lookup.
    pub fn load_with<F>(config_file: Option<PathBuf>, env: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        let explicit = config_file.or_else(|| env("FINQA_CONFIG").map(PathBuf::from));
        let config_path = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(AppError::Config(format!(
                        "Config file does not exist: {:?}",
                        path
                    )));
                }
                Some(path)
            }
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                default.exists().then_some(default)
            }
        };

        if let Some(path) = config_path {
            config = config.merge_yaml(&path)?;
            config.config_file = Some(path);
        }

        // Environment variables override YAML config
        config.apply_env(env);
        config.canonicalize_names();

        Ok(config)
    }

    /// Merge YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(llm) = config_file.llm {
            if let Some(provider) = llm.provider {
                result.provider = provider;
            }
            if let Some(model) = llm.model {
                result.model = model;
            }
            if llm.endpoint.is_some() {
                result.endpoint = llm.endpoint;
            }
            if let Some(provider) = llm.embedding_provider {
                result.embedding_provider = provider;
            }
            if let Some(model) = llm.embedding_model {
                result.embedding_model = model;
            }
            if let Some(dim) = llm.embedding_dimensions {
                result.embedding_dim = dim;
            }
            if llm.embedding_endpoint.is_some() {
                result.embedding_endpoint = llm.embedding_endpoint;
            }
        }

        if let Some(rag) = config_file.rag {
            result.rag = rag;
        }

        if let Some(decoding) = config_file.decoding {
            result.decoding = decoding;
        }

        if let Some(strategy) = config_file.extraction.and_then(|e| e.strategy) {
            result.extraction_strategy = strategy;
        }

        if let Some(server) = config_file.server {
            if let Some(bind) = server.bind {
                result.bind = bind;
            }
            if let Some(dir) = server.upload_dir {
                result.upload_dir = dir;
            }
        }

        if let Some(file) = config_file.prompt.and_then(|p| p.file) {
            // Relative prompt paths resolve against the config file's directory
            result.prompt_file = Some(match path.parent() {
                Some(parent) if file.is_relative() => parent.join(file),
                _ => file,
            });
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(format) = logging.format {
                result.log_format = format;
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
        }

        Ok(result)
    }

    /// Apply environment overrides.
    fn apply_env<F>(&mut self, env: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(provider) = env("FINQA_PROVIDER") {
            self.provider = provider;
        }
        if let Some(model) = env("FINQA_MODEL") {
            self.model = model;
        }
        if let Some(endpoint) = env("FINQA_ENDPOINT") {
            self.endpoint = Some(endpoint);
        }
        if let Some(provider) = env("FINQA_EMBEDDING_PROVIDER") {
            self.embedding_provider = provider;
        }
        if let Some(endpoint) = env("FINQA_EMBEDDING_ENDPOINT") {
            self.embedding_endpoint = Some(endpoint);
        }
        if let Some(bind) = env("FINQA_BIND") {
            self.bind = bind;
        }
        if let Some(dir) = env("FINQA_UPLOAD_DIR") {
            self.upload_dir = PathBuf::from(dir);
        }
        if let Some(strategy) = env("FINQA_EXTRACTION_STRATEGY") {
            self.extraction_strategy = strategy;
        }

        self.api_key = env(API_TOKEN_ENV).filter(|key| !key.trim().is_empty());

        if let Some(level) = env("RUST_LOG") {
            self.log_level = Some(level);
        }

        if env("NO_COLOR").is_some() {
            self.no_color = true;
        }
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// CLI flags take precedence over the environment and the config file.
    pub fn with_overrides(
        mut self,
        provider: Option<String>,
        model: Option<String>,
        bind: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(provider) = provider {
            self.provider = provider;
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(bind) = bind {
            self.bind = bind;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self.canonicalize_names();
        self
    }

    /// Rewrite recognised aliases to canonical names. Unknown names are left
    /// for [`AppConfig::validate`] to reject.
    fn canonicalize_names(&mut self) {
        if let Some(name) = canonical_provider(&self.provider) {
            self.provider = name.to_string();
        }
        if let Some(name) = canonical_embedding_provider(&self.embedding_provider) {
            self.embedding_provider = name.to_string();
        }
        if let Some(name) = canonical_strategy(&self.extraction_strategy) {
            self.extraction_strategy = name.to_string();
        }
    }

    /// Whether any configured backend is the hosted inference API.
    pub fn requires_api_key(&self) -> bool {
        canonical_provider(&self.provider) == Some("huggingface")
            || canonical_embedding_provider(&self.embedding_provider) == Some("huggingface")
    }

    /// Ensure the upload directory exists.
    pub fn ensure_upload_dir(&self) -> AppResult<()> {
        if !self.upload_dir.exists() {
            std::fs::create_dir_all(&self.upload_dir).map_err(|e| {
                AppError::Config(format!(
                    "Failed to create upload directory {:?}: {}",
                    self.upload_dir, e
                ))
            })?;
        }
        Ok(())
    }

    /// Validate the configuration before anything is served.
    pub fn validate(&self) -> AppResult<()> {
        if canonical_provider(&self.provider).is_none() {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                self.provider,
                KNOWN_PROVIDERS.join(", ")
            )));
        }

        if canonical_embedding_provider(&self.embedding_provider).is_none() {
            return Err(AppError::Config(format!(
                "Unknown embedding provider: {}. Supported: {}",
                self.embedding_provider,
                KNOWN_EMBEDDING_PROVIDERS.join(", ")
            )));
        }

        if canonical_strategy(&self.extraction_strategy).is_none() {
            return Err(AppError::Config(format!(
                "Unknown extraction strategy: {}. Supported: {}",
                self.extraction_strategy,
                KNOWN_STRATEGIES.join(", ")
            )));
        }

        if self.requires_api_key() && self.api_key.is_none() {
            return Err(AppError::Config(format!(
                "{} environment variable is required for the huggingface provider",
                API_TOKEN_ENV
            )));
        }

        if self.rag.chunk_size == 0 {
            return Err(AppError::Config("rag.chunkSize must be positive".to_string()));
        }

        if self.rag.chunk_overlap >= self.rag.chunk_size {
            return Err(AppError::Config(format!(
                "rag.chunkOverlap ({}) must be smaller than rag.chunkSize ({})",
                self.rag.chunk_overlap, self.rag.chunk_size
            )));
        }

        if self.rag.top_k == 0 || self.rag.context_budget == 0 {
            return Err(AppError::Config(
                "rag.topK and rag.contextBudget must be positive".to_string(),
            ));
        }

        if self.embedding_dim == 0 {
            return Err(AppError::Config(
                "Embedding dimensions must be positive".to_string(),
            ));
        }

        if self.decoding.num_beams == 0 || self.decoding.max_length == 0 {
            return Err(AppError::Config(
                "decoding.numBeams and decoding.maxLength must be positive".to_string(),
            ));
        }

        Ok(())
    }
}
