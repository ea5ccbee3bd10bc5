use std::collections::HashSet;

use chrono::Utc;
use fieldquote_core::config::{AppConfig, LoadOptions};
use fieldquote_core::{
    build_document, compute_totals, Catalog, CustomerInfo, DiscountSpec, Frequency, LineItem,
    Money, Quote, QuoteId, QuoteInput,
};
use rust_decimal::Decimal;
use serde::Serialize;

use super::{serialize_pretty, CommandResult, EXIT_CONFIG, EXIT_INPUT, EXIT_RENDER};
use crate::render::{QuoteRenderer, TemplateKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
    #[serde(skip)]
    exit_code: u8,
}

impl DoctorCheck {
    fn pass(name: &'static str, details: impl Into<String>) -> Self {
        Self { name, status: CheckStatus::Pass, details: details.into(), exit_code: 0 }
    }

    fn fail(name: &'static str, details: impl Into<String>, exit_code: u8) -> Self {
        Self { name, status: CheckStatus::Fail, details: details.into(), exit_code }
    }

    fn skipped(name: &'static str) -> Self {
        Self {
            name,
            status: CheckStatus::Skipped,
            details: "skipped because configuration did not load".to_string(),
            exit_code: 0,
        }
    }
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

/// Exit code is that of the first failing check.
pub fn run(json_output: bool) -> CommandResult {
    let report = build_report();
    let exit_code = report
        .checks
        .iter()
        .find(|check| check.status == CheckStatus::Fail)
        .map_or(0, |check| check.exit_code);

    let output =
        if json_output { serialize_pretty("doctor", &report) } else { render_human(&report) };
    CommandResult { exit_code, output }
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck::pass(
                "config_validation",
                "configuration loaded and validated",
            ));
            checks.push(check_catalog_integrity());
            checks.push(check_pricing());
            checks.push(check_template_rendering(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck::fail("config_validation", error.to_string(), EXIT_CONFIG));
            checks.push(check_catalog_integrity());
            checks.push(check_pricing());
            checks.push(DoctorCheck::skipped("template_rendering"));
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_catalog_integrity() -> DoctorCheck {
    let catalog = Catalog::pest_control_defaults();
    let mut seen = HashSet::new();
    let mut problems = Vec::new();

    for service in catalog.services() {
        if !seen.insert(service.id.0.as_str()) {
            problems.push(format!("duplicate service id `{}`", service.id.0));
        }
        if service.name.trim().is_empty() {
            problems.push(format!("service `{}` has no name", service.id.0));
        }
        if service.unit_price.is_negative() {
            problems.push(format!("service `{}` has a negative price", service.id.0));
        }
    }

    if problems.is_empty() {
        DoctorCheck::pass(
            "catalog_integrity",
            format!("{} services with unique ids and valid prices", catalog.services().len()),
        )
    } else {
        DoctorCheck::fail("catalog_integrity", problems.join("; "), EXIT_INPUT)
    }
}

/// One monthly $75.00 service, 10% off, 8% tax must come to $72.90 with an
/// annual value of $900.00.
fn check_pricing() -> DoctorCheck {
    let input = reference_input();
    let totals = compute_totals(&input.line_items, &input.discount, input.tax_rate_pct);

    if totals.grand_total == Money(7_290) && totals.annual_value == Money(90_000) {
        DoctorCheck::pass(
            "pricing_selfcheck",
            format!(
                "reference quote totals {} (annual {})",
                totals.grand_total, totals.annual_value
            ),
        )
    } else {
        DoctorCheck::fail(
            "pricing_selfcheck",
            format!(
                "reference quote totals {} (annual {}), expected 72.90 (annual 900.00)",
                totals.grand_total, totals.annual_value
            ),
            EXIT_INPUT,
        )
    }
}

fn check_template_rendering(config: &AppConfig) -> DoctorCheck {
    let quote = Quote::draft(
        QuoteId("doctor-selfcheck".to_string()),
        CustomerInfo::named("Doctor Self-check"),
        reference_input(),
        Utc::now(),
        config.quote.validity_days,
    );
    let document = build_document(&quote, &quote.totals(), config);

    let renderer = match QuoteRenderer::embedded() {
        Ok(renderer) => renderer,
        Err(error) => {
            return DoctorCheck::fail("template_rendering", error.to_string(), EXIT_RENDER)
        }
    };

    for kind in TemplateKind::ALL {
        if let Err(error) = renderer.render(&document, kind) {
            return DoctorCheck::fail(
                "template_rendering",
                format!("{}: {error}", kind.template_name()),
                EXIT_RENDER,
            );
        }
    }

    DoctorCheck::pass(
        "template_rendering",
        format!("{} templates rendered", TemplateKind::ALL.len()),
    )
}

fn reference_input() -> QuoteInput {
    QuoteInput::new(
        vec![LineItem::new(
            "selfcheck-1",
            "General pest control",
            1,
            Money(7_500),
            Frequency::Monthly,
        )],
        DiscountSpec::Percentage(Decimal::from(10)),
        Decimal::from(8),
    )
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}
