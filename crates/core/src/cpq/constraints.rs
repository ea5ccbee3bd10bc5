use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use rust_decimal::Decimal;

use crate::domain::money::Money;
use crate::domain::quote::{DiscountSpec, QuoteInput};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Blocks pricing at the input boundary.
    Error,
    /// Reported alongside the totals.
    Warning,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintViolation {
    pub code: String,
    pub severity: Severity,
    pub message: String,
    pub suggestion: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintResult {
    pub valid: bool,
    pub violations: Vec<ConstraintViolation>,
}

impl Default for ConstraintResult {
    fn default() -> Self {
        Self { valid: true, violations: Vec::new() }
    }
}

impl ConstraintResult {
    fn error(&mut self, code: &str, message: String, suggestion: &str) {
        self.push(code, Severity::Error, message, suggestion);
    }

    fn warning(&mut self, code: &str, message: String, suggestion: &str) {
        self.push(code, Severity::Warning, message, suggestion);
    }

    fn push(&mut self, code: &str, severity: Severity, message: String, suggestion: &str) {
        self.violations.push(ConstraintViolation {
            code: code.to_string(),
            severity,
            message,
            suggestion: Some(suggestion.to_string()),
        });
    }

    pub fn errors(&self) -> impl Iterator<Item = &ConstraintViolation> {
        self.violations.iter().filter(|violation| violation.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ConstraintViolation> {
        self.violations.iter().filter(|violation| violation.severity == Severity::Warning)
    }
}

pub trait ConstraintEngine: Send + Sync {
    fn validate(&self, input: &QuoteInput) -> ConstraintResult;
}

#[derive(Default)]
pub struct DeterministicConstraintEngine;

impl ConstraintEngine for DeterministicConstraintEngine {
    fn validate(&self, input: &QuoteInput) -> ConstraintResult {
        validate_quote_input(input)
    }
}

/// Checks a quote snapshot the way the quote form does before pricing. The
/// calculator itself accepts anything; this is where bad input is caught.
pub fn validate_quote_input(input: &QuoteInput) -> ConstraintResult {
    let mut result = ConstraintResult::default();

    if input.line_items.is_empty() {
        result.warning(
            "EMPTY_QUOTE",
            "Quote has no line items; all totals are zero".to_string(),
            "Add at least one service line",
        );
    }

    let mut seen_ids: HashSet<String> = HashSet::new();
    for line in &input.line_items {
        let trimmed_id = line.id.0.trim().to_owned();
        if trimmed_id.is_empty() {
            result.error(
                "MISSING_LINE_ID",
                "Line item is missing an id".to_string(),
                "Give every line a unique id",
            );
        } else if !seen_ids.insert(trimmed_id.clone()) {
            result.error(
                "DUPLICATE_LINE_ID",
                format!("Duplicate line id in quote: {trimmed_id}"),
                "Line ids must be unique within a quote",
            );
        }

        let label = if trimmed_id.is_empty() { "<unnamed>" } else { trimmed_id.as_str() };

        if line.description.trim().is_empty() {
            result.error(
                "MISSING_DESCRIPTION",
                format!("Line {label} has no description"),
                "Describe the service the customer is buying",
            );
        }

        if line.quantity == 0 {
            result.error(
                "ZERO_QUANTITY",
                format!("Line {label} has zero quantity"),
                "Use a positive integer quantity or remove the line",
            );
        }

        if line.unit_price.is_negative() {
            result.error(
                "NEGATIVE_UNIT_PRICE",
                format!("Line {label} has negative unit price {}", line.unit_price),
                "Use the discount field for price reductions",
            );
        }
    }

    match &input.discount {
        DiscountSpec::Percentage(pct) if pct.is_sign_negative() && !pct.is_zero() => {
            result.error(
                "NEGATIVE_DISCOUNT",
                format!("Discount percentage {} is negative", pct.normalize()),
                "Use a discount between 0 and 100 percent",
            );
        }
        DiscountSpec::Percentage(pct) if *pct > Decimal::ONE_HUNDRED => {
            result.warning(
                "PERCENTAGE_OVER_100",
                format!("Discount percentage {} exceeds 100", pct.normalize()),
                "A discount over 100% produces a negative total",
            );
        }
        DiscountSpec::Fixed(amount) if amount.is_negative() => {
            result.error(
                "NEGATIVE_DISCOUNT",
                format!("Fixed discount {amount} is negative"),
                "Use a non-negative discount amount",
            );
        }
        DiscountSpec::Fixed(amount) => {
            let subtotal = input.totals().subtotal;
            if *amount > subtotal && *amount > Money::ZERO {
                result.warning(
                    "DISCOUNT_EXCEEDS_SUBTOTAL",
                    format!("Fixed discount {amount} exceeds subtotal {subtotal}"),
                    "Totals and tax will be negative; confirm this is intended",
                );
            }
        }
        DiscountSpec::Percentage(_) => {}
    }

    let tax = input.tax_rate_pct;
    if (tax.is_sign_negative() && !tax.is_zero()) || tax > Decimal::ONE_HUNDRED {
        result.error(
            "TAX_RATE_OUT_OF_RANGE",
            format!("Tax rate {}% is outside 0..=100", tax.normalize()),
            "Use the jurisdiction's sales tax percentage",
        );
    }

    let valid = result.errors().next().is_none();
    result.valid = valid;
    result
}
