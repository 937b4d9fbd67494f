//! Cost computation (spec §4.9: "cost in fractional currency units
//! computed by model-specific per-token rates").

use aide_core::TierPricing;
use aide_llm::TokenUsage;
use rust_decimal::Decimal;

/// Cost in fractional currency units for one usage sample at one
/// tier's pricing.
pub fn compute_cost_usd(usage: &TokenUsage, pricing: &TierPricing) -> Decimal {
    let million = Decimal::from(1_000_000u32);
    let input = Decimal::from(usage.input_tokens) / million * pricing.price_in_per_mtok;
    let output = Decimal::from(usage.output_tokens) / million * pricing.price_out_per_mtok;
    let cache_read =
        Decimal::from(usage.cache_read_tokens) / million * pricing.price_cache_read_per_mtok;
    let cache_write =
        Decimal::from(usage.cache_write_tokens) / million * pricing.price_cache_write_per_mtok;
    input + output + cache_read + cache_write
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::prelude::FromPrimitive;

    fn pricing() -> TierPricing {
        TierPricing {
            price_in_per_mtok: Decimal::from_f64(3.0).unwrap(),
            price_out_per_mtok: Decimal::from_f64(15.0).unwrap(),
            price_cache_read_per_mtok: Decimal::from_f64(0.3).unwrap(),
            price_cache_write_per_mtok: Decimal::from_f64(3.75).unwrap(),
        }
    }

    #[test]
    fn zero_usage_is_zero_cost() {
        let usage = TokenUsage::default();
        assert_eq!(compute_cost_usd(&usage, &pricing()), Decimal::ZERO);
    }

    #[test]
    fn scales_linearly_with_tokens() {
        let usage = TokenUsage {
            input_tokens: 1_000_000,
            output_tokens: 0,
            cache_read_tokens: 0,
            cache_write_tokens: 0,
        };
        assert_eq!(compute_cost_usd(&usage, &pricing()), Decimal::from_f64(3.0).unwrap());
    }

    #[test]
    fn sums_all_four_components() {
        let usage = TokenUsage {
            input_tokens: 1_000_000,
            output_tokens: 1_000_000,
            cache_read_tokens: 1_000_000,
            cache_write_tokens: 1_000_000,
        };
        let expected = Decimal::from_f64(3.0 + 15.0 + 0.3 + 3.75).unwrap();
        assert_eq!(compute_cost_usd(&usage, &pricing()), expected);
    }
}
