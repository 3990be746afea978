//! Label-agnostic scans of the generated text.

use crate::figure::{FinancialFigure, Period};
use crate::numbers::scan_values;

/// Label used by the four-number scan.
pub const GENERIC_LABEL: &str = "Total net sales";

/// Third and fourth numeric tokens of the generated text as (current, prior).
pub fn four_number(raw: &str) -> Option<FinancialFigure> {
    match scan_values(raw).as_slice() {
        [_, _, current, prior, ..] => Some(FinancialFigure::new(
            GENERIC_LABEL,
            *current,
            *prior,
            Period::PriorYear,
        )),
        _ => None,
    }
}

/// First two numeric tokens of the generated text as (current, prior).
pub fn two_number(raw: &str, label: &str) -> Option<FinancialFigure> {
    match scan_values(raw).as_slice() {
        [current, prior, ..] => Some(FinancialFigure::new(
            label,
            *current,
            *prior,
            Period::PriorPeriod,
        )),
        _ => None,
    }
}
