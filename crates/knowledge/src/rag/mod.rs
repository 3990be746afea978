//! Retrieval-augmented answering over a single uploaded document.

pub mod pipeline;
pub mod types;

pub use pipeline::{sanitize_file_name, Capabilities, PipelineSettings, RagPipeline};
pub use types::{RagAnswer, RagSourceRef};
