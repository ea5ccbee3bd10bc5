pub mod catalog;
pub mod constraints;
pub mod pricing;

use crate::domain::quote::QuoteInput;
use serde::{Deserialize, Serialize};

use self::{
    constraints::{ConstraintEngine, ConstraintResult, DeterministicConstraintEngine},
    pricing::{DeterministicQuoteCalculator, PricingResult, QuoteCalculator},
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteEvaluation {
    pub constraints: ConstraintResult,
    pub pricing: PricingResult,
}

pub trait QuoteRuntime: Send + Sync {
    fn evaluate_quote(&self, input: &QuoteInput) -> QuoteEvaluation;
}

pub struct DeterministicQuoteRuntime<C, P> {
    constraint_engine: C,
    calculator: P,
}

impl<C, P> DeterministicQuoteRuntime<C, P> {
    pub fn new(constraint_engine: C, calculator: P) -> Self {
        Self { constraint_engine, calculator }
    }
}

impl Default
    for DeterministicQuoteRuntime<DeterministicConstraintEngine, DeterministicQuoteCalculator>
{
    fn default() -> Self {
        Self::new(DeterministicConstraintEngine, DeterministicQuoteCalculator)
    }
}

impl<C, P> QuoteRuntime for DeterministicQuoteRuntime<C, P>
where
    C: ConstraintEngine,
    P: QuoteCalculator,
{
    /// Validation never gates pricing here; callers decide what to do with
    /// error-level violations.
    fn evaluate_quote(&self, input: &QuoteInput) -> QuoteEvaluation {
        let constraints = self.constraint_engine.validate(input);
        let pricing = self.calculator.price(input);

        QuoteEvaluation { constraints, pricing }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use crate::{
        cpq::{
            constraints::{ConstraintEngine, ConstraintResult},
            pricing::{compute_totals_with_trace, PricingResult, QuoteCalculator},
            DeterministicQuoteRuntime, QuoteRuntime,
        },
        domain::{
            money::Money,
            quote::{DiscountSpec, Frequency, LineItem, QuoteInput},
        },
    };

    #[test]
    fn deterministic_runtime_returns_constraints_and_pricing() {
        let runtime = DeterministicQuoteRuntime::default();

        let result = runtime.evaluate_quote(&input_fixture());

        assert!(result.constraints.valid);
        assert_eq!(result.pricing.totals.subtotal, Money(12_900));
        assert_eq!(result.pricing.totals.grand_total, Money(12_900));
    }

    #[test]
    fn runtime_supports_explicit_engine_interfaces() {
        #[derive(Default)]
        struct RejectEverything;

        impl ConstraintEngine for RejectEverything {
            fn validate(&self, _input: &QuoteInput) -> ConstraintResult {
                ConstraintResult { valid: false, violations: Vec::new() }
            }
        }

        #[derive(Default)]
        struct TracingCalculator;

        impl QuoteCalculator for TracingCalculator {
            fn price(&self, input: &QuoteInput) -> PricingResult {
                compute_totals_with_trace(input)
            }
        }

        let runtime = DeterministicQuoteRuntime::new(RejectEverything, TracingCalculator);
        let result = runtime.evaluate_quote(&input_fixture());

        assert!(!result.constraints.valid);
        assert_eq!(result.pricing.totals.annual_value, Money(51_600));
    }

    fn input_fixture() -> QuoteInput {
        QuoteInput::new(
            vec![LineItem::new(
                "line-1",
                "General pest control (quarterly)",
                1,
                Money(12_900),
                Frequency::Quarterly,
            )],
            DiscountSpec::default(),
            Decimal::ZERO,
        )
    }
}
