//! Post-processing strategies and the processor that applies them.

use finqa_core::{config::canonical_strategy, AppError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::generic::four_number;
use crate::keyword;
use crate::labels::LabelTable;

/// How numbers are pulled out of a generation and its context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtractionStrategy {
    /// 3rd/4th numeric tokens of the generated text, fixed label
    GenericFourNumber,
    /// Label table lookup in the retrieved context
    KeywordRouted,
    /// Keyword routing plus six-month share of net sales
    #[default]
    RatioAware,
}

impl ExtractionStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GenericFourNumber => "generic-four-number",
            Self::KeywordRouted => "keyword-routed",
            Self::RatioAware => "ratio-aware",
        }
    }
}

impl fmt::Display for ExtractionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExtractionStrategy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match canonical_strategy(s) {
            Some("generic-four-number") => Ok(Self::GenericFourNumber),
            Some("keyword-routed") => Ok(Self::KeywordRouted),
            Some("ratio-aware") => Ok(Self::RatioAware),
            _ => Err(AppError::Config(format!("Unknown extraction strategy: {}", s))),
        }
    }
}

/// Where the final answer text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerOrigin {
    /// Canonical comparison sentence built from extracted figures
    Formatted,
    /// Generator output returned verbatim
    Raw,
}

/// The final answer returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub text: String,
    pub origin: AnswerOrigin,
}

impl Answer {
    pub fn formatted(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            origin: AnswerOrigin::Formatted,
        }
    }

    pub fn raw(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            origin: AnswerOrigin::Raw,
        }
    }
}

/// Turns raw generations into comparison sentences.
///
/// Processing never fails: when the configured strategy finds no figures the
/// generated text is returned unchanged.
#[derive(Debug, Clone)]
pub struct PostProcessor {
    strategy: ExtractionStrategy,
    labels: LabelTable,
}

impl PostProcessor {
    pub fn new(strategy: ExtractionStrategy) -> Self {
        Self::with_labels(strategy, LabelTable::financial())
    }

    pub fn with_labels(strategy: ExtractionStrategy, labels: LabelTable) -> Self {
        Self { strategy, labels }
    }

    pub fn strategy(&self) -> ExtractionStrategy {
        self.strategy
    }

    /// Build the answer for `query` from the generated text and the
    /// untruncated retrieved context.
    pub fn process(&self, query: &str, raw: &str, context: &str) -> Answer {
        let formatted = match self.strategy {
            ExtractionStrategy::GenericFourNumber => four_number(raw).map(|f| f.sentence()),
            ExtractionStrategy::KeywordRouted => {
                keyword::answer(&self.labels, query, raw, context, false)
            }
            ExtractionStrategy::RatioAware => keyword::answer(&self.labels, query, raw, context, true),
        };

        match formatted {
            Some(text) => {
                tracing::info!(strategy = %self.strategy, "Formatted numeric answer");
                Answer::formatted(text)
            }
            None => {
                tracing::info!(strategy = %self.strategy, "No figures found; returning generated text");
                Answer::raw(raw)
            }
        }
    }
}

impl Default for PostProcessor {
    fn default() -> Self {
        Self::new(ExtractionStrategy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_parsing() {
        assert_eq!(
            "generic-four-number".parse::<ExtractionStrategy>().unwrap(),
            ExtractionStrategy::GenericFourNumber
        );
        assert_eq!(
            "Keyword-Routed".parse::<ExtractionStrategy>().unwrap(),
            ExtractionStrategy::KeywordRouted
        );
        assert_eq!(
            "generic".parse::<ExtractionStrategy>().unwrap(),
            ExtractionStrategy::GenericFourNumber
        );
        assert_eq!(
            "RATIO".parse::<ExtractionStrategy>().unwrap(),
            ExtractionStrategy::RatioAware
        );
        assert!("magic".parse::<ExtractionStrategy>().is_err());
        assert_eq!(ExtractionStrategy::default(), ExtractionStrategy::RatioAware);
    }

    #[test]
    fn test_strategy_serde_names() {
        let json = serde_json::to_string(&ExtractionStrategy::RatioAware).unwrap();
        assert_eq!(json, "\"ratio-aware\"");
        let answer = serde_json::to_value(Answer::raw("x")).unwrap();
        assert_eq!(answer["origin"], "raw");
    }

    #[test]
    fn test_generic_strategy() {
        let processor = PostProcessor::new(ExtractionStrategy::GenericFourNumber);
        let answer = processor.process("anything", "1000 2000 123456 100000", "");
        assert_eq!(answer.origin, AnswerOrigin::Formatted);
        assert!(answer.text.contains("$123,456"));
        assert!(answer.text.contains("$100,000"));
        assert!(answer.text.contains("23.5%"));
    }

    #[test]
    fn test_raw_text_when_nothing_found() {
        for strategy in [
            ExtractionStrategy::GenericFourNumber,
            ExtractionStrategy::KeywordRouted,
            ExtractionStrategy::RatioAware,
        ] {
            let answer = PostProcessor::new(strategy).process("What changed?", "Sales grew.", "");
            assert_eq!(answer, Answer::raw("Sales grew."));
        }
    }

    #[test]
    fn test_zero_prior_never_fails() {
        let answer = PostProcessor::default().process(
            "What is the total net sales YoY change?",
            "",
            "total net sales $ 1,000 $ 0000",
        );
        assert_eq!(answer.origin, AnswerOrigin::Formatted);
        assert!(answer.text.contains("0.0%"));
    }

    #[test]
    fn test_total_net_sales_from_context() {
        let answer = PostProcessor::default().process(
            "What is the total net sales YoY change?",
            "unrelated generation",
            "quarterly report\ntotal net sales $ 1,000 $ 2,000",
        );
        assert!(answer.text.contains("$1,000"));
        assert!(answer.text.contains("$2,000"));
        assert!(answer.text.contains("-50.0%"));
    }
}
