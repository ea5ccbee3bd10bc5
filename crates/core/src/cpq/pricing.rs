use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::money::{round_to_minor, Money};
use crate::domain::quote::{DiscountSpec, LineItem, QuoteInput};

/// Totals derived from a [`QuoteInput`]. Never stored on their own; recompute
/// from the inputs after every edit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteTotals {
    pub subtotal: Money,
    pub discount_amount: Money,
    /// `subtotal - discount_amount`; negative when the discount exceeds the
    /// subtotal.
    pub after_discount: Money,
    pub tax_amount: Money,
    pub grand_total: Money,
    pub annual_value: Money,
    /// Annual value of included recurring items only.
    pub recurring_annual_value: Money,
    /// Subtotal of included one-time items.
    pub one_time_total: Money,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingTraceStep {
    pub stage: String,
    pub detail: String,
    pub amount: Money,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingTrace {
    pub steps: Vec<PricingTraceStep>,
}

impl PricingTrace {
    fn push(&mut self, stage: &str, detail: impl Into<String>, amount: Money) {
        self.steps.push(PricingTraceStep {
            stage: stage.to_string(),
            detail: detail.into(),
            amount,
        });
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingResult {
    pub totals: QuoteTotals,
    pub included_lines: usize,
    pub excluded_lines: usize,
    pub trace: PricingTrace,
}

pub trait QuoteCalculator: Send + Sync {
    fn price(&self, input: &QuoteInput) -> PricingResult;
}

#[derive(Default)]
pub struct DeterministicQuoteCalculator;

impl QuoteCalculator for DeterministicQuoteCalculator {
    fn price(&self, input: &QuoteInput) -> PricingResult {
        compute_totals_with_trace(input)
    }
}

/// Derives quote totals from line items, a discount and a tax rate.
///
/// Only included items count: required items always, optional items when
/// selected. All money is integer minor units. The discount and tax steps
/// each round to a whole minor unit with ties away from zero, in that order,
/// so the grand total can differ by a unit from a single combined rounding.
/// The discounted base is not clamped at zero: an oversized discount yields a
/// negative base and a negative tax.
///
/// Out-of-range inputs are not rejected here; callers validate first (see
/// [`crate::cpq::constraints`]).
pub fn compute_totals(
    line_items: &[LineItem],
    discount: &DiscountSpec,
    tax_rate_pct: Decimal,
) -> QuoteTotals {
    let mut subtotal = Money::ZERO;
    let mut annual_value = Money::ZERO;
    let mut recurring_annual_value = Money::ZERO;
    let mut one_time_total = Money::ZERO;

    for line in line_items.iter().filter(|line| line.is_included()) {
        let total = line.total();
        let annualized = line.annualized_total();
        subtotal = subtotal + total;
        annual_value = annual_value + annualized;
        if line.frequency.is_recurring() {
            recurring_annual_value = recurring_annual_value + annualized;
        } else {
            one_time_total = one_time_total + total;
        }
    }

    let discount_amount = discount_amount(subtotal, discount);
    let after_discount = subtotal - discount_amount;
    let tax_amount = percent_of(after_discount, tax_rate_pct);
    let grand_total = after_discount + tax_amount;

    QuoteTotals {
        subtotal,
        discount_amount,
        after_discount,
        tax_amount,
        grand_total,
        annual_value,
        recurring_annual_value,
        one_time_total,
    }
}

fn discount_amount(subtotal: Money, discount: &DiscountSpec) -> Money {
    match discount {
        DiscountSpec::Percentage(pct) => percent_of(subtotal, *pct),
        DiscountSpec::Fixed(amount) => *amount,
    }
}

fn percent_of(base: Money, pct: Decimal) -> Money {
    match Decimal::from(base.minor()).checked_mul(pct) {
        Some(scaled) => Money(round_to_minor(scaled / Decimal::ONE_HUNDRED)),
        // Decimal overflow: saturate in the direction of the product.
        None if base.is_negative() != pct.is_sign_negative() => Money(i64::MIN),
        None => Money(i64::MAX),
    }
}

pub fn compute_totals_with_trace(input: &QuoteInput) -> PricingResult {
    let totals = input.totals();
    let included_lines = input.line_items.iter().filter(|line| line.is_included()).count();
    let excluded_lines = input.line_items.len() - included_lines;

    let mut trace = PricingTrace::default();
    trace.push(
        "subtotal",
        format!("sum(quantity * unit_price) over {included_lines} included line(s)"),
        totals.subtotal,
    );
    trace.push("discount", input.discount.describe(), totals.discount_amount);
    trace.push("after_discount", "subtotal - discount", totals.after_discount);
    trace.push(
        "tax",
        format!("{}% of after_discount", input.tax_rate_pct.normalize()),
        totals.tax_amount,
    );
    trace.push("grand_total", "after_discount + tax", totals.grand_total);
    trace.push(
        "annual_value",
        "sum(quantity * unit_price * times_per_year) over included line(s)",
        totals.annual_value,
    );

    PricingResult { totals, included_lines, excluded_lines, trace }
}
