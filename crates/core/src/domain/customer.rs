use serde::{Deserialize, Serialize};

/// Contact details printed on a quote. The CRM owns the full contact record;
/// a quote only carries what the customer sees.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_address: Option<String>,
}

impl CustomerInfo {
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }

    /// Non-empty contact lines in display order.
    pub fn contact_lines(&self) -> Vec<&str> {
        [self.service_address.as_deref(), self.phone.as_deref(), self.email.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect()
    }
}
