use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::money::Money;
use crate::domain::quote::{DiscountSpec, Frequency, LineItem, LineItemId, QuoteInput};
use crate::errors::DomainError;

/// A single change made in the quote builder. Applying an edit yields a new
/// [`QuoteInput`]; totals are then derived from that snapshot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum QuoteEdit {
    AddLine { line: LineItem },
    RemoveLine { id: LineItemId },
    SetQuantity { id: LineItemId, quantity: u32 },
    SetUnitPrice { id: LineItemId, unit_price: Money },
    SetFrequency { id: LineItemId, frequency: Frequency },
    SetDescription { id: LineItemId, description: String },
    SetOptional { id: LineItemId, optional: bool },
    SetSelected { id: LineItemId, selected: bool },
    SetDiscount { discount: DiscountSpec },
    SetTaxRate { tax_rate_pct: Decimal },
}

impl QuoteInput {
    pub fn apply(mut self, edit: QuoteEdit) -> Result<QuoteInput, DomainError> {
        match edit {
            QuoteEdit::AddLine { line } => {
                if self.line(&line.id).is_some() {
                    return Err(DomainError::DuplicateLineItem(line.id));
                }
                self.line_items.push(line);
            }
            QuoteEdit::RemoveLine { id } => {
                let before = self.line_items.len();
                self.line_items.retain(|line| line.id != id);
                if self.line_items.len() == before {
                    return Err(DomainError::UnknownLineItem(id));
                }
            }
            QuoteEdit::SetQuantity { id, quantity } => self.line_mut(&id)?.quantity = quantity,
            QuoteEdit::SetUnitPrice { id, unit_price } => {
                self.line_mut(&id)?.unit_price = unit_price
            }
            QuoteEdit::SetFrequency { id, frequency } => self.line_mut(&id)?.frequency = frequency,
            QuoteEdit::SetDescription { id, description } => {
                self.line_mut(&id)?.description = description
            }
            QuoteEdit::SetOptional { id, optional } => self.line_mut(&id)?.optional = optional,
            QuoteEdit::SetSelected { id, selected } => self.line_mut(&id)?.selected = selected,
            QuoteEdit::SetDiscount { discount } => self.discount = discount,
            QuoteEdit::SetTaxRate { tax_rate_pct } => self.tax_rate_pct = tax_rate_pct,
        }

        Ok(self)
    }

    fn line_mut(&mut self, id: &LineItemId) -> Result<&mut LineItem, DomainError> {
        self.line_items
            .iter_mut()
            .find(|line| &line.id == id)
            .ok_or_else(|| DomainError::UnknownLineItem(id.clone()))
    }
}
