use std::path::Path;

use chrono::Utc;
use fieldquote_core::cpq::constraints::DeterministicConstraintEngine;
use fieldquote_core::cpq::pricing::{DeterministicQuoteCalculator, PricingTraceStep};
use fieldquote_core::document::status_label;
use fieldquote_core::{
    ApplicationError, ConstraintViolation, DeterministicQuoteRuntime, Quote, QuoteEvaluation,
    QuoteRuntime, QuoteTotals,
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use super::{load_quote, serialize_pretty, CommandResult};

#[derive(Debug, Serialize)]
struct PriceReport {
    command: &'static str,
    status: &'static str,
    correlation_id: String,
    quote_id: String,
    quote_status: String,
    customer: String,
    currency: String,
    valid_until: String,
    past_validity: bool,
    included_lines: usize,
    excluded_lines: usize,
    /// Minor units.
    totals: QuoteTotals,
    formatted: FormattedTotals,
    trace: Vec<PricingTraceStep>,
    warnings: Vec<ConstraintViolation>,
}

#[derive(Debug, Serialize)]
struct FormattedTotals {
    subtotal: String,
    discount_amount: String,
    after_discount: String,
    tax_amount: String,
    grand_total: String,
    annual_value: String,
}

impl From<&QuoteTotals> for FormattedTotals {
    fn from(totals: &QuoteTotals) -> Self {
        Self {
            subtotal: totals.subtotal.to_string(),
            discount_amount: totals.discount_amount.to_string(),
            after_discount: totals.after_discount.to_string(),
            tax_amount: totals.tax_amount.to_string(),
            grand_total: totals.grand_total.to_string(),
            annual_value: totals.annual_value.to_string(),
        }
    }
}

pub fn run(file: &Path, json_output: bool) -> CommandResult {
    let correlation_id = Uuid::new_v4().to_string();

    let priced = load_quote(file).and_then(|(config, quote)| {
        let evaluation = evaluate(&quote, &correlation_id)?;
        Ok((config.quote.currency, quote, evaluation))
    });

    let (currency, quote, evaluation) = match priced {
        Ok(priced) => priced,
        Err(error) => {
            warn!(
                event_name = "quote.price.failed",
                correlation_id = %correlation_id,
                error_class = error.error_class(),
                "quote could not be priced: {error}"
            );
            return CommandResult::from_application_error("price", error, &correlation_id);
        }
    };

    let report = PriceReport {
        command: "price",
        status: "ok",
        quote_id: quote.id.0.clone(),
        quote_status: status_label(&quote.status).to_string(),
        customer: quote.customer.name.clone(),
        currency,
        valid_until: quote.valid_until.to_string(),
        past_validity: quote.is_past_validity(Utc::now().date_naive()),
        included_lines: evaluation.pricing.included_lines,
        excluded_lines: evaluation.pricing.excluded_lines,
        totals: evaluation.pricing.totals,
        formatted: FormattedTotals::from(&evaluation.pricing.totals),
        trace: evaluation.pricing.trace.steps,
        warnings: evaluation.constraints.warnings().cloned().collect(),
        correlation_id,
    };

    let output =
        if json_output { serialize_pretty("price", &report) } else { render_human(&report) };
    CommandResult { exit_code: 0, output }
}

/// Runs validation and pricing. Error-level violations reject the quote;
/// warnings are logged and left on the evaluation.
pub(crate) fn evaluate(
    quote: &Quote,
    correlation_id: &str,
) -> Result<QuoteEvaluation, ApplicationError> {
    let runtime =
        DeterministicQuoteRuntime::new(DeterministicConstraintEngine, DeterministicQuoteCalculator);
    let evaluation = runtime.evaluate_quote(&quote.input);

    let blocking: Vec<String> = evaluation
        .constraints
        .errors()
        .map(|violation| format!("{}: {}", violation.code, violation.message))
        .collect();
    if !blocking.is_empty() {
        return Err(ApplicationError::Input(blocking.join("; ")));
    }

    for violation in evaluation.constraints.warnings() {
        warn!(
            event_name = "quote.price.warning",
            correlation_id = %correlation_id,
            quote_id = %quote.id.0,
            code = %violation.code,
            "{}",
            violation.message
        );
    }

    info!(
        event_name = "quote.price.computed",
        correlation_id = %correlation_id,
        quote_id = %quote.id.0,
        grand_total_minor = evaluation.pricing.totals.grand_total.minor(),
        included_lines = evaluation.pricing.included_lines,
        "quote priced"
    );

    Ok(evaluation)
}

fn render_human(report: &PriceReport) -> String {
    let mut lines = vec![format!(
        "quote {} ({}) for {} - valid until {}{}",
        report.quote_id,
        report.quote_status,
        if report.customer.is_empty() { "<no customer>" } else { report.customer.as_str() },
        report.valid_until,
        if report.past_validity { " (past validity)" } else { "" }
    )];
    lines.push(format!(
        "{} included line(s), {} excluded; amounts in {}",
        report.included_lines, report.excluded_lines, report.currency
    ));

    for step in &report.trace {
        lines.push(format!("  {:<16}{:>14}  {}", step.stage, step.amount.to_string(), step.detail));
    }

    if !report.warnings.is_empty() {
        lines.push("warnings:".to_string());
        for warning in &report.warnings {
            lines.push(format!("- [{}] {}", warning.code, warning.message));
        }
    }

    lines.join("\n")
}
