pub mod config;
pub mod cpq;
pub mod document;
pub mod domain;
pub mod errors;
pub mod intake;

pub use cpq::catalog::{Catalog, ServiceId, ServiceOffering};
pub use cpq::constraints::{ConstraintResult, ConstraintViolation, Severity};
pub use cpq::pricing::{compute_totals, PricingResult, QuoteCalculator, QuoteTotals};
pub use cpq::{DeterministicQuoteRuntime, QuoteEvaluation, QuoteRuntime};
pub use document::{build_document, QuoteDocument};
pub use domain::customer::CustomerInfo;
pub use domain::edit::QuoteEdit;
pub use domain::money::Money;
pub use domain::quote::{
    DiscountSpec, Frequency, LineItem, LineItemId, Quote, QuoteId, QuoteInput, QuoteStatus,
};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use intake::{IntakeError, QuoteRequest};
