//! The plain data structure handed to a document renderer. Every amount is
//! preformatted so templates never do currency math.

use serde::Serialize;

use crate::config::{AppConfig, CompanyConfig};
use crate::cpq::pricing::QuoteTotals;
use crate::domain::money::Money;
use crate::domain::quote::{DiscountSpec, Quote, QuoteStatus};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct QuoteDocument {
    pub quote_id: String,
    pub status: String,
    pub is_draft: bool,
    pub currency: String,
    pub issued_on: String,
    pub valid_until: String,
    pub company: CompanyBlock,
    pub customer: CustomerBlock,
    pub rows: Vec<DocumentRow>,
    pub totals: DocumentTotals,
    pub notes: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CompanyBlock {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub license_number: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CustomerBlock {
    pub name: String,
    pub contact_lines: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DocumentRow {
    pub line_id: String,
    pub description: String,
    pub frequency: String,
    pub quantity: u32,
    pub unit_price: String,
    pub line_total: String,
    pub optional: bool,
    pub included: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DocumentTotals {
    pub subtotal: String,
    pub discount_label: String,
    pub discount_amount: String,
    pub has_discount: bool,
    pub tax_label: String,
    pub tax_amount: String,
    pub grand_total: String,
    pub annual_value: String,
    pub has_recurring: bool,
    /// Minor-unit grand total for consumers that need the raw figure.
    pub grand_total_minor: i64,
}

impl From<&CompanyConfig> for CompanyBlock {
    fn from(company: &CompanyConfig) -> Self {
        Self {
            name: company.name.clone(),
            phone: company.phone.clone(),
            email: company.email.clone(),
            license_number: company.license_number.clone(),
        }
    }
}

pub fn status_label(status: &QuoteStatus) -> &'static str {
    match status {
        QuoteStatus::Draft => "Draft",
        QuoteStatus::Sent => "Sent",
        QuoteStatus::Accepted => "Accepted",
        QuoteStatus::Declined => "Declined",
        QuoteStatus::Expired => "Expired",
        QuoteStatus::Revised => "Revised",
    }
}

/// Assembles the renderer payload from a quote and its freshly computed
/// totals.
pub fn build_document(quote: &Quote, totals: &QuoteTotals, config: &AppConfig) -> QuoteDocument {
    let rows = quote
        .input
        .line_items
        .iter()
        .map(|line| DocumentRow {
            line_id: line.id.0.clone(),
            description: line.description.clone(),
            frequency: line.frequency.label().to_string(),
            quantity: line.quantity,
            unit_price: line.unit_price.to_string(),
            line_total: line.total().to_string(),
            optional: line.optional,
            included: line.is_included(),
        })
        .collect();

    let discount_label = match &quote.input.discount {
        DiscountSpec::Percentage(pct) => format!("Discount ({}%)", pct.normalize()),
        DiscountSpec::Fixed(_) => "Discount".to_string(),
    };

    let has_recurring = quote
        .input
        .line_items
        .iter()
        .any(|line| line.is_included() && line.frequency.is_recurring());

    QuoteDocument {
        quote_id: quote.id.0.clone(),
        status: status_label(&quote.status).to_string(),
        is_draft: matches!(quote.status, QuoteStatus::Draft | QuoteStatus::Revised),
        currency: config.quote.currency.clone(),
        issued_on: quote.created_at.format("%B %-d, %Y").to_string(),
        valid_until: quote.valid_until.format("%B %-d, %Y").to_string(),
        company: CompanyBlock::from(&config.company),
        customer: CustomerBlock {
            name: quote.customer.name.clone(),
            contact_lines: quote
                .customer
                .contact_lines()
                .into_iter()
                .map(str::to_string)
                .collect(),
        },
        rows,
        totals: DocumentTotals {
            subtotal: totals.subtotal.to_string(),
            discount_label,
            discount_amount: (-totals.discount_amount).to_string(),
            has_discount: totals.discount_amount != Money::ZERO,
            tax_label: format!("Tax ({}%)", quote.input.tax_rate_pct.normalize()),
            tax_amount: totals.tax_amount.to_string(),
            grand_total: totals.grand_total.to_string(),
            annual_value: totals.annual_value.to_string(),
            has_recurring,
            grand_total_minor: totals.grand_total.minor(),
        },
        notes: quote.notes.clone(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    use super::build_document;
    use crate::config::AppConfig;
    use crate::domain::customer::CustomerInfo;
    use crate::domain::money::Money;
    use crate::domain::quote::{
        DiscountSpec, Frequency, LineItem, Quote, QuoteId, QuoteInput, QuoteStatus,
    };

    fn quote() -> Quote {
        let created_at = Utc.with_ymd_and_hms(2026, 5, 4, 15, 0, 0).single().expect("timestamp");
        let mut customer = CustomerInfo::named("Dana Whitfield");
        customer.phone = Some("559-555-0142".to_string());
        Quote::draft(
            QuoteId("Q-2026-0042".to_string()),
            customer,
            QuoteInput::new(
                vec![
                    LineItem::new(
                        "svc",
                        "General pest control",
                        1,
                        Money(7_500),
                        Frequency::Monthly,
                    ),
                    LineItem::new("attic", "Attic exclusion", 1, Money(45_000), Frequency::OneTime)
                        .as_optional(false),
                ],
                DiscountSpec::Percentage(Decimal::from(10)),
                Decimal::from(8),
            ),
            created_at,
            30,
        )
    }

    #[test]
    fn document_carries_formatted_totals_and_rows() {
        let quote = quote();
        let document = build_document(&quote, &quote.totals(), &AppConfig::default());

        assert_eq!(document.quote_id, "Q-2026-0042");
        assert_eq!(document.status, "Draft");
        assert!(document.is_draft);
        assert_eq!(document.issued_on, "May 4, 2026");
        assert_eq!(document.valid_until, "June 3, 2026");
        assert_eq!(document.customer.contact_lines, vec!["559-555-0142".to_string()]);

        assert_eq!(document.rows.len(), 2);
        assert_eq!(document.rows[0].frequency, "Monthly");
        assert_eq!(document.rows[0].line_total, "75.00");
        assert!(!document.rows[1].included);

        assert_eq!(document.totals.subtotal, "75.00");
        assert_eq!(document.totals.discount_label, "Discount (10%)");
        assert_eq!(document.totals.discount_amount, "-7.50");
        assert_eq!(document.totals.tax_label, "Tax (8%)");
        assert_eq!(document.totals.tax_amount, "5.40");
        assert_eq!(document.totals.grand_total, "72.90");
        assert_eq!(document.totals.annual_value, "900.00");
        assert_eq!(document.totals.grand_total_minor, 7_290);
        assert!(document.totals.has_recurring);
    }

    #[test]
    fn sent_quotes_are_not_marked_draft() {
        let mut quote = quote();
        quote.transition_to(QuoteStatus::Sent).expect("draft -> sent");

        let document = build_document(&quote, &quote.totals(), &AppConfig::default());
        assert_eq!(document.status, "Sent");
        assert!(!document.is_draft);
    }
}
