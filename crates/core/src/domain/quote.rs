use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cpq::pricing::{compute_totals, QuoteTotals};
use crate::domain::customer::CustomerInfo;
use crate::domain::edit::QuoteEdit;
use crate::domain::money::Money;
use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuoteId(pub String);

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LineItemId(pub String);

impl std::fmt::Display for LineItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// How often a line item bills.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Frequency {
    #[default]
    #[serde(alias = "one_time", alias = "onetime")]
    OneTime,
    Monthly,
    Quarterly,
    #[serde(alias = "bi_annual", alias = "biannual", alias = "semi-annual")]
    BiAnnual,
    Annual,
}

impl Frequency {
    pub const ALL: [Frequency; 5] = [
        Frequency::OneTime,
        Frequency::Monthly,
        Frequency::Quarterly,
        Frequency::BiAnnual,
        Frequency::Annual,
    ];

    /// Billing occurrences per year. One-time work counts once.
    pub const fn times_per_year(self) -> i64 {
        match self {
            Frequency::OneTime => 1,
            Frequency::Monthly => 12,
            Frequency::Quarterly => 4,
            Frequency::BiAnnual => 2,
            Frequency::Annual => 1,
        }
    }

    pub const fn is_recurring(self) -> bool {
        !matches!(self, Frequency::OneTime)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Frequency::OneTime => "One-time",
            Frequency::Monthly => "Monthly",
            Frequency::Quarterly => "Quarterly",
            Frequency::BiAnnual => "Bi-annual",
            Frequency::Annual => "Annual",
        }
    }
}

fn default_selected() -> bool {
    true
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: LineItemId,
    pub description: String,
    pub quantity: u32,
    pub unit_price: Money,
    #[serde(default)]
    pub frequency: Frequency,
    #[serde(default)]
    pub optional: bool,
    /// Only consulted for optional items.
    #[serde(default = "default_selected")]
    pub selected: bool,
}

impl LineItem {
    pub fn new(
        id: impl Into<String>,
        description: impl Into<String>,
        quantity: u32,
        unit_price: Money,
        frequency: Frequency,
    ) -> Self {
        Self {
            id: LineItemId(id.into()),
            description: description.into(),
            quantity,
            unit_price,
            frequency,
            optional: false,
            selected: true,
        }
    }

    pub fn as_optional(mut self, selected: bool) -> Self {
        self.optional = true;
        self.selected = selected;
        self
    }

    pub fn total(&self) -> Money {
        self.unit_price.times(i64::from(self.quantity))
    }

    pub fn is_included(&self) -> bool {
        !self.optional || self.selected
    }

    pub fn annualized_total(&self) -> Money {
        self.total().times(self.frequency.times_per_year())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum DiscountSpec {
    /// Percent of the subtotal. Not clamped to 0..=100.
    Percentage(Decimal),
    /// Amount in minor units.
    Fixed(Money),
}

impl Default for DiscountSpec {
    fn default() -> Self {
        Self::Fixed(Money::ZERO)
    }
}

impl DiscountSpec {
    pub fn describe(&self) -> String {
        match self {
            Self::Percentage(pct) => format!("{}%", pct.normalize()),
            Self::Fixed(amount) => format!("fixed {amount}"),
        }
    }
}

/// Immutable snapshot of everything the calculator reads.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteInput {
    pub line_items: Vec<LineItem>,
    #[serde(default)]
    pub discount: DiscountSpec,
    #[serde(default)]
    pub tax_rate_pct: Decimal,
}

impl QuoteInput {
    pub fn new(line_items: Vec<LineItem>, discount: DiscountSpec, tax_rate_pct: Decimal) -> Self {
        Self { line_items, discount, tax_rate_pct }
    }

    pub fn totals(&self) -> QuoteTotals {
        compute_totals(&self.line_items, &self.discount, self.tax_rate_pct)
    }

    pub fn line(&self, id: &LineItemId) -> Option<&LineItem> {
        self.line_items.iter().find(|line| &line.id == id)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStatus {
    Draft,
    Sent,
    Accepted,
    Declined,
    Expired,
    Revised,
}

impl QuoteStatus {
    pub fn is_editable(&self) -> bool {
        matches!(self, QuoteStatus::Draft | QuoteStatus::Revised)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub id: QuoteId,
    pub status: QuoteStatus,
    pub customer: CustomerInfo,
    pub input: QuoteInput,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub valid_until: NaiveDate,
}

impl Quote {
    pub fn draft(
        id: QuoteId,
        customer: CustomerInfo,
        input: QuoteInput,
        created_at: DateTime<Utc>,
        validity_days: u32,
    ) -> Self {
        let valid_until = (created_at + Duration::days(i64::from(validity_days))).date_naive();
        Self {
            id,
            status: QuoteStatus::Draft,
            customer,
            input,
            notes: None,
            created_at,
            valid_until,
        }
    }

    pub fn totals(&self) -> QuoteTotals {
        self.input.totals()
    }

    pub fn is_past_validity(&self, today: NaiveDate) -> bool {
        today > self.valid_until
    }

    pub fn apply_edit(&mut self, edit: QuoteEdit) -> Result<(), DomainError> {
        if !self.status.is_editable() {
            return Err(DomainError::QuoteLocked { status: self.status.clone() });
        }

        self.input = self.input.clone().apply(edit)?;
        Ok(())
    }

    pub fn can_transition_to(&self, next: QuoteStatus) -> bool {
        matches!(
            (&self.status, next),
            (QuoteStatus::Draft, QuoteStatus::Sent)
                | (QuoteStatus::Draft, QuoteStatus::Expired)
                | (QuoteStatus::Sent, QuoteStatus::Accepted)
                | (QuoteStatus::Sent, QuoteStatus::Declined)
                | (QuoteStatus::Sent, QuoteStatus::Expired)
                | (QuoteStatus::Sent, QuoteStatus::Revised)
                | (QuoteStatus::Declined, QuoteStatus::Revised)
                | (QuoteStatus::Expired, QuoteStatus::Revised)
                | (QuoteStatus::Revised, QuoteStatus::Sent)
                | (QuoteStatus::Revised, QuoteStatus::Expired)
        )
    }

    pub fn transition_to(&mut self, next: QuoteStatus) -> Result<(), DomainError> {
        if self.can_transition_to(next.clone()) {
            self.status = next;
            return Ok(());
        }

        Err(DomainError::InvalidQuoteTransition { from: self.status.clone(), to: next })
    }
}
