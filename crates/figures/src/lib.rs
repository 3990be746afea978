//! Numeric post-processing for FinQA answers.
//!
//! Detects year-over-year figures in a generation or in the retrieved
//! context and rewrites them as one canonical comparison sentence:
//!
//! ```text
//! iPhone net sales were $5,000, compared with $4,000 in the same quarter last year — a 25.0% change.
//! ```
//!
//! Three strategies are available (see [`ExtractionStrategy`]); all of them
//! fall back to the generated text when nothing can be extracted.

pub mod figure;
pub mod generic;
pub mod keyword;
pub mod labels;
pub mod numbers;
pub mod strategy;

pub use figure::{format_dollars, format_percent, percent_change, FinancialFigure, Period};
pub use labels::{LabelRule, LabelTable};
pub use numbers::{scan_numbers, NumericToken};
pub use strategy::{Answer, AnswerOrigin, ExtractionStrategy, PostProcessor};
