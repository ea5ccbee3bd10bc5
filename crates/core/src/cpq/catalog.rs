use serde::{Deserialize, Serialize};

use crate::domain::money::Money;
use crate::domain::quote::{Frequency, LineItem};

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServiceId(pub String);

/// A standard service the office quotes from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceOffering {
    pub id: ServiceId,
    pub name: String,
    pub unit_price: Money,
    pub frequency: Frequency,
}

impl ServiceOffering {
    fn new(id: &str, name: &str, unit_price: i64, frequency: Frequency) -> Self {
        Self {
            id: ServiceId(id.to_string()),
            name: name.to_string(),
            unit_price: Money(unit_price),
            frequency,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Catalog {
    services: Vec<ServiceOffering>,
}

impl Catalog {
    pub fn new(services: Vec<ServiceOffering>) -> Self {
        Self { services }
    }

    pub fn pest_control_defaults() -> Self {
        Self::new(vec![
            ServiceOffering::new(
                "general-pest-quarterly",
                "General pest control (quarterly)",
                12_900,
                Frequency::Quarterly,
            ),
            ServiceOffering::new(
                "general-pest-monthly",
                "General pest control (monthly)",
                7_500,
                Frequency::Monthly,
            ),
            ServiceOffering::new(
                "initial-service",
                "Initial clean-out service",
                19_900,
                Frequency::OneTime,
            ),
            ServiceOffering::new(
                "termite-inspection",
                "Termite (WDI) inspection",
                9_500,
                Frequency::Annual,
            ),
            ServiceOffering::new(
                "rodent-exclusion",
                "Rodent exclusion and sealing",
                45_000,
                Frequency::OneTime,
            ),
            ServiceOffering::new(
                "rodent-bait-stations",
                "Rodent bait station monitoring",
                3_500,
                Frequency::Monthly,
            ),
            ServiceOffering::new(
                "mosquito-treatment",
                "Mosquito barrier treatment",
                6_900,
                Frequency::Monthly,
            ),
            ServiceOffering::new(
                "bed-bug-heat",
                "Bed bug heat treatment (per room)",
                65_000,
                Frequency::OneTime,
            ),
            ServiceOffering::new(
                "wildlife-removal",
                "Wildlife trapping and removal",
                32_500,
                Frequency::OneTime,
            ),
            ServiceOffering::new(
                "crawlspace-moisture",
                "Crawlspace moisture control check",
                14_900,
                Frequency::BiAnnual,
            ),
        ])
    }

    pub fn services(&self) -> &[ServiceOffering] {
        &self.services
    }

    pub fn find(&self, service_id: &str) -> Option<&ServiceOffering> {
        self.services.iter().find(|service| service.id.0 == service_id)
    }

    /// Builds a required line from a catalog service at its list price.
    pub fn line_item(&self, service_id: &str, line_id: &str, quantity: u32) -> Option<LineItem> {
        self.find(service_id).map(|service| {
            LineItem::new(line_id, &service.name, quantity, service.unit_price, service.frequency)
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::Catalog;
    use crate::domain::money::Money;
    use crate::domain::quote::Frequency;

    #[test]
    fn default_catalog_has_unique_ids_and_positive_prices() {
        let catalog = Catalog::pest_control_defaults();
        let ids: HashSet<&str> = catalog.services().iter().map(|s| s.id.0.as_str()).collect();

        assert_eq!(ids.len(), catalog.services().len());
        assert!(catalog.services().iter().all(|service| service.unit_price > Money::ZERO));
    }

    #[test]
    fn line_item_copies_list_price_and_cadence() {
        let catalog = Catalog::pest_control_defaults();
        let line = catalog
            .line_item("general-pest-monthly", "line-1", 1)
            .expect("service should exist");

        assert_eq!(line.id.0, "line-1");
        assert_eq!(line.unit_price, Money(7_500));
        assert_eq!(line.frequency, Frequency::Monthly);
        assert_eq!(line.annualized_total(), Money(90_000));
        assert!(!line.optional);
    }

    #[test]
    fn unknown_service_yields_none() {
        assert!(Catalog::pest_control_defaults().line_item("fogging", "x", 1).is_none());
        assert!(Catalog::default().find("general-pest-monthly").is_none());
    }
}
