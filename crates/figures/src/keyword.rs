//! Keyword-routed context scan, optionally with the net-sales ratio.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::figure::{format_dollars, format_percent, ratio_percent, FinancialFigure, Period};
use crate::generic::two_number;
use crate::labels::{LabelTable, TOTAL_NET_SALES};

/// Label for the fallback scan when no keyword matched.
pub const FALLBACK_LABEL: &str = "Revenue";

static SIX_MONTH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bsix\b|\bfirst\b|\bfy\s?\d{2,4}\b").expect("valid regex")
});

static RATIO_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:\bpercentage|\bpercent|%)\s+of\s+(?:total\s+)?net\s+sales\b")
        .expect("valid regex")
});

/// Which columns of a statement line the question is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reading {
    /// Columns 1 and 2: this quarter vs the same quarter last year
    Quarter,
    /// Columns 3 and 4: first six months vs the same months last year
    SixMonths,
}

impl Reading {
    pub fn of(query: &str) -> Self {
        if SIX_MONTH_RE.is_match(query) {
            Self::SixMonths
        } else {
            Self::Quarter
        }
    }

    /// Numeric tokens a line needs for this reading.
    pub fn min_numbers(&self) -> usize {
        match self {
            Self::Quarter => 2,
            Self::SixMonths => 4,
        }
    }
}

/// Whether the question asks for a figure relative to net sales.
pub fn asks_for_ratio(query: &str) -> bool {
    RATIO_RE.is_match(query)
}

/// Answer sentence from the context line matching the question's keyword.
///
/// Falls through to a two-number scan of `raw` when no qualifying line is
/// found. Returns `None` only if that scan also finds nothing.
pub fn answer(
    table: &LabelTable,
    query: &str,
    raw: &str,
    context: &str,
    with_ratio: bool,
) -> Option<String> {
    let rule = table.match_query(query);
    let reading = Reading::of(query);

    if let Some(rule) = rule {
        if let Some(values) = rule.find_line_values(context, reading.min_numbers()) {
            tracing::debug!(
                "Matched '{}' line with {} numbers ({:?} reading)",
                rule.key(),
                values.len(),
                reading
            );

            return Some(match reading {
                Reading::Quarter => {
                    FinancialFigure::new(rule.display(), values[0], values[1], Period::Quarter)
                        .sentence()
                }
                Reading::SixMonths => {
                    let ratio = (with_ratio && asks_for_ratio(query) && rule.key() != TOTAL_NET_SALES)
                        .then(|| ratio_sentence(table, rule.display(), &values, context))
                        .flatten();

                    ratio.unwrap_or_else(|| {
                        FinancialFigure::new(rule.display(), values[2], values[3], Period::SixMonths)
                            .sentence()
                    })
                }
            });
        }

        tracing::debug!(
            "No '{}' line with {} numbers in context; scanning generated text",
            rule.key(),
            reading.min_numbers()
        );
    }

    let label = rule.map(|r| r.display()).unwrap_or(FALLBACK_LABEL);
    two_number(raw, label).map(|figure| figure.sentence())
}

/// Quarterly comparison plus the six-month figure as a share of net sales.
fn ratio_sentence(table: &LabelTable, display: &str, values: &[u64], context: &str) -> Option<String> {
    let totals = table.rule(TOTAL_NET_SALES)?.find_line_values(context, 3)?;
    let six_month = values[2];
    let ratio = ratio_percent(six_month, totals[2]);

    let quarterly = FinancialFigure::new(display, values[0], values[1], Period::Quarter);
    Some(format!(
        "{} For the first six months, {} were {}, or {} of total net sales.",
        quarterly.sentence(),
        display,
        format_dollars(six_month),
        format_percent(ratio)
    ))
}
