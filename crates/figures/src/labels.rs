//! Label table: query keywords mapped to financial statement lines.
//!
//! Each rule pairs a query matcher with the line label to look for in the
//! (lowercased) document context and the label shown in answers.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::numbers::scan_numbers;

/// Key of the rule for the total net sales line.
pub const TOTAL_NET_SALES: &str = "total-net-sales";

static FINANCIAL_LABELS: Lazy<LabelTable> = Lazy::new(|| {
    let rule = |key: &str, query: &str, line: &str, display: &str| {
        LabelRule::new(key, query, line, display).expect("valid label pattern")
    };

    // Segment rules come before the total so "r&d as a percentage of total
    // net sales" routes to r&d.
    LabelTable::new(vec![
        rule("iphone", r"\biphone\b", "iphone", "iPhone net sales"),
        rule("mac", r"\bmac\b", "mac", "Mac net sales"),
        rule("ipad", r"\bipad\b", "ipad", "iPad net sales"),
        rule(
            "wearables",
            r"\bwearables\b",
            "wearables, home and accessories",
            "Wearables, Home and Accessories net sales",
        ),
        rule("services", r"\bservices\b", "services", "Services net sales"),
        rule(
            "research-and-development",
            r"\br&d\b|\bresearch\b",
            "research and development",
            "Research and development expense",
        ),
        rule(TOTAL_NET_SALES, r"\btotal net sales\b", "total net sales", "Total net sales"),
    ])
});

/// One keyword → line mapping.
#[derive(Debug, Clone)]
pub struct LabelRule {
    key: String,
    query: Regex,
    line: Regex,
    display: String,
}

impl LabelRule {
    /// Build a rule. `query_pattern` is matched case-insensitively against the
    /// question; `line_label` is matched as whole words against context lines.
    pub fn new(
        key: impl Into<String>,
        query_pattern: &str,
        line_label: &str,
        display: impl Into<String>,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            key: key.into(),
            query: Regex::new(&format!("(?i){}", query_pattern))?,
            line: Regex::new(&format!(r"(?i)\b{}\b", regex::escape(line_label)))?,
            display: display.into(),
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn display(&self) -> &str {
        &self.display
    }

    /// Whether the question mentions this rule's keywords.
    pub fn matches_query(&self, query: &str) -> bool {
        self.query.is_match(query)
    }

    /// Numbers following the label on the first context line that carries
    /// the label and at least `min_numbers` numeric tokens after it.
    pub fn find_line_values(&self, context: &str, min_numbers: usize) -> Option<Vec<u64>> {
        context.lines().find_map(|line| {
            let label = self.line.find(line)?;
            let values: Vec<u64> = scan_numbers(&line[label.end()..])
                .into_iter()
                .map(|t| t.value)
                .collect();
            (values.len() >= min_numbers).then_some(values)
        })
    }
}

/// Ordered set of label rules; the first matching rule wins.
#[derive(Debug, Clone)]
pub struct LabelTable {
    rules: Vec<LabelRule>,
}

impl LabelTable {
    pub fn new(rules: Vec<LabelRule>) -> Self {
        Self { rules }
    }

    /// The built-in table for product segments, R&D and total net sales.
    pub fn financial() -> Self {
        FINANCIAL_LABELS.clone()
    }

    /// First rule whose keywords appear in the question.
    pub fn match_query(&self, query: &str) -> Option<&LabelRule> {
        self.rules.iter().find(|rule| rule.matches_query(query))
    }

    /// Rule by key.
    pub fn rule(&self, key: &str) -> Option<&LabelRule> {
        self.rules.iter().find(|rule| rule.key == key)
    }
}

impl Default for LabelTable {
    fn default() -> Self {
        Self::financial()
    }
}
