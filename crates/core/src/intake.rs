//! Quote request files: the input boundary where office-entered values
//! (prices in dollars, catalog references, missing fields) become a typed
//! [`Quote`] in minor units.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::QuoteDefaults;
use crate::cpq::catalog::Catalog;
use crate::domain::customer::CustomerInfo;
use crate::domain::money::Money;
use crate::domain::quote::{
    DiscountSpec, Frequency, LineItem, LineItemId, Quote, QuoteId, QuoteInput, QuoteStatus,
};

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("could not read quote file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse quote TOML: {0}")]
    ParseToml(#[from] toml::de::Error),
    #[error("could not parse quote JSON: {0}")]
    ParseJson(#[from] serde_json::Error),
    #[error("line {line} references unknown service `{service}`")]
    UnknownService { line: String, service: String },
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct QuoteRequest {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub status: Option<QuoteStatus>,
    #[serde(default)]
    pub customer: CustomerInfo,
    #[serde(default)]
    pub notes: Option<String>,
    /// Falls back to the configured default when absent.
    #[serde(default)]
    pub tax_rate_pct: Option<Decimal>,
    #[serde(default)]
    pub discount: Option<DiscountRequest>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub validity_days: Option<u32>,
    #[serde(default)]
    pub line_items: Vec<LineItemRequest>,
}

/// Discount as typed by the office. Fixed amounts are in major units.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum DiscountRequest {
    Percentage(Decimal),
    Fixed(Decimal),
}

impl From<DiscountRequest> for DiscountSpec {
    fn from(value: DiscountRequest) -> Self {
        match value {
            DiscountRequest::Percentage(pct) => DiscountSpec::Percentage(pct),
            DiscountRequest::Fixed(major) => DiscountSpec::Fixed(Money::from_major(major)),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LineItemRequest {
    #[serde(default)]
    pub id: Option<String>,
    /// Catalog service id; explicit fields below override the catalog values.
    #[serde(default)]
    pub service: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub quantity: Option<u32>,
    /// Major units (dollars).
    #[serde(default)]
    pub unit_price: Option<Decimal>,
    #[serde(default)]
    pub frequency: Option<Frequency>,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub selected: Option<bool>,
}

impl QuoteRequest {
    pub fn from_toml_str(raw: &str) -> Result<Self, IntakeError> {
        Ok(toml::from_str(raw)?)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, IntakeError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Reads a `.json` file as JSON and anything else as TOML.
    pub fn load(path: &Path) -> Result<Self, IntakeError> {
        let raw = fs::read_to_string(path)
            .map_err(|source| IntakeError::ReadFile { path: path.to_path_buf(), source })?;

        let is_json = path
            .extension()
            .and_then(|extension| extension.to_str())
            .is_some_and(|extension| extension.eq_ignore_ascii_case("json"));

        if is_json {
            Self::from_json_str(&raw)
        } else {
            Self::from_toml_str(&raw)
        }
    }

    pub fn into_quote(
        self,
        catalog: &Catalog,
        defaults: &QuoteDefaults,
    ) -> Result<Quote, IntakeError> {
        let line_items = self
            .line_items
            .into_iter()
            .enumerate()
            .map(|(index, line)| line.into_line_item(index, catalog))
            .collect::<Result<Vec<_>, _>>()?;

        let input = QuoteInput::new(
            line_items,
            self.discount.map(DiscountSpec::from).unwrap_or_default(),
            self.tax_rate_pct.unwrap_or(defaults.tax_rate_pct),
        );

        let id = self
            .id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| format!("Q-{}", Uuid::new_v4()));

        let mut quote = Quote::draft(
            QuoteId(id),
            self.customer,
            input,
            self.created_at.unwrap_or_else(Utc::now),
            self.validity_days.unwrap_or(defaults.validity_days),
        );
        quote.notes = self.notes.filter(|notes| !notes.trim().is_empty());
        if let Some(status) = self.status {
            quote.status = status;
        }

        Ok(quote)
    }
}

impl LineItemRequest {
    fn into_line_item(self, index: usize, catalog: &Catalog) -> Result<LineItem, IntakeError> {
        let id = self
            .id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| format!("line-{}", index + 1));

        let service = match self.service.as_deref() {
            Some(service_id) => Some(catalog.find(service_id).ok_or_else(|| {
                IntakeError::UnknownService { line: id.clone(), service: service_id.to_string() }
            })?),
            None => None,
        };

        let unit_price = match (self.unit_price, service) {
            (Some(major), _) => Money::from_major(major),
            (None, Some(service)) => service.unit_price,
            // Missing price with nothing to fall back on is priced at zero.
            (None, None) => Money::ZERO,
        };

        let description = self
            .description
            .or_else(|| service.map(|service| service.name.clone()))
            .unwrap_or_default();
        let frequency = self
            .frequency
            .or_else(|| service.map(|service| service.frequency))
            .unwrap_or_default();

        Ok(LineItem {
            id: LineItemId(id),
            description,
            quantity: self.quantity.unwrap_or(1),
            unit_price,
            frequency,
            optional: self.optional,
            selected: self.selected.unwrap_or(!self.optional),
        })
    }
}
