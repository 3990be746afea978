//! Financial figures and their canonical formatting.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Reporting period the prior value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Period {
    /// Same quarter of the previous year
    Quarter,
    /// First six months of the previous year
    SixMonths,
    /// Previous fiscal year
    PriorYear,
    /// Unspecified earlier period
    PriorPeriod,
}

impl Period {
    /// Phrase used after "compared with $X in".
    pub fn comparison_phrase(&self) -> &'static str {
        match self {
            Self::Quarter => "the same quarter last year",
            Self::SixMonths => "the first six months of last year",
            Self::PriorYear => "the prior year",
            Self::PriorPeriod => "the prior period",
        }
    }
}

/// An extracted year-over-year comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialFigure {
    pub label: String,
    pub current: u64,
    pub prior: u64,
    pub period: Period,
}

impl FinancialFigure {
    pub fn new(label: impl Into<String>, current: u64, prior: u64, period: Period) -> Self {
        Self {
            label: label.into(),
            current,
            prior,
            period,
        }
    }

    /// Percent change from prior to current; 0 when prior is 0.
    pub fn percent_change(&self) -> f64 {
        percent_change(self.current, self.prior)
    }

    /// The canonical comparison sentence.
    pub fn sentence(&self) -> String {
        format!(
            "{} were {}, compared with {} in {} — a {} change.",
            self.label,
            format_dollars(self.current),
            format_dollars(self.prior),
            self.period.comparison_phrase(),
            format_percent(self.percent_change())
        )
    }
}

impl fmt::Display for FinancialFigure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sentence())
    }
}

/// `(current - prior) / prior * 100`, with a zero prior yielding 0.
pub fn percent_change(current: u64, prior: u64) -> f64 {
    if prior == 0 {
        return 0.0;
    }
    (current as f64 - prior as f64) / prior as f64 * 100.0
}

/// `part / whole * 100`, with a zero whole yielding 0.
pub fn ratio_percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 / whole as f64 * 100.0
}

/// One decimal place with a `%` suffix.
pub fn format_percent(value: f64) -> String {
    // Avoid "-0.0%" for tiny negative changes
    let rounded = (value * 10.0).round() / 10.0;
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    format!("{:.1}%", rounded)
}

/// `$` followed by the thousands-separated integer.
pub fn format_dollars(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    out.push('$');
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
