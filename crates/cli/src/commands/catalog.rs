use fieldquote_core::{Catalog, ServiceOffering};
use serde::Serialize;

use super::serialize_pretty;

#[derive(Debug, Serialize)]
struct CatalogEntry<'a> {
    id: &'a str,
    name: &'a str,
    unit_price_minor: i64,
    unit_price: String,
    frequency: &'static str,
    annual_value: String,
}

impl<'a> From<&'a ServiceOffering> for CatalogEntry<'a> {
    fn from(service: &'a ServiceOffering) -> Self {
        Self {
            id: &service.id.0,
            name: &service.name,
            unit_price_minor: service.unit_price.minor(),
            unit_price: service.unit_price.to_string(),
            frequency: service.frequency.label(),
            annual_value: service.unit_price.times(service.frequency.times_per_year()).to_string(),
        }
    }
}

pub fn run(json_output: bool) -> String {
    let catalog = Catalog::pest_control_defaults();
    let entries: Vec<CatalogEntry<'_>> =
        catalog.services().iter().map(CatalogEntry::from).collect();

    if json_output {
        return serialize_pretty("catalog", &entries);
    }

    let mut lines = vec![format!("{} standard services:", entries.len())];
    for entry in &entries {
        lines.push(format!(
            "- {:<24} {:>10}  {:<10} {}",
            entry.id, entry.unit_price, entry.frequency, entry.name
        ));
    }
    lines.join("\n")
}
