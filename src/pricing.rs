//! Pricing engine: pure, stateless transforms over a cart line.
//!
//! The effective unit price layers a session-scoped observed price
//! over the durable base price. Deviation from the baseline is
//! expressed as a percentage and classified for display.

use crate::models::{PriceOverride, ShoppingListItem};

/// Deviations beyond this percentage (either direction) are
/// significant.
const SIGNIFICANT_CHANGE_PCT: f64 = 10.0;

/// Deviations at or below this magnitude are floating-point noise, not
/// a real change.
const NOISE_GUARD_PCT: f64 = 0.01;

/// How a line's effective price relates to its baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceShift {
    Unchanged,
    Increase,
    Decrease,
    SignificantIncrease,
    SignificantDecrease,
}

impl PriceShift {
    pub fn is_significant(&self) -> bool {
        matches!(
            self,
            PriceShift::SignificantIncrease | PriceShift::SignificantDecrease
        )
    }
}

/// The unit price actually in effect: the observed override when one
/// is set, the base price otherwise.
pub fn effective_price(line: &ShoppingListItem) -> f64 {
    match line.manual_price {
        PriceOverride::Observed(p) => p,
        PriceOverride::Unset => line.base_price,
    }
}

/// Percent deviation of the effective price from the baseline.
/// A zero baseline yields 0 rather than a division by zero.
pub fn percent_change(line: &ShoppingListItem) -> f64 {
    if line.base_price == 0.0 {
        return 0.0;
    }
    (effective_price(line) - line.base_price) / line.base_price * 100.0
}

/// Classify the deviation for display.
pub fn classify(line: &ShoppingListItem) -> PriceShift {
    let change = percent_change(line);
    if change.abs() <= NOISE_GUARD_PCT {
        PriceShift::Unchanged
    } else if change > SIGNIFICANT_CHANGE_PCT {
        PriceShift::SignificantIncrease
    } else if change < -SIGNIFICANT_CHANGE_PCT {
        PriceShift::SignificantDecrease
    } else if change > 0.0 {
        PriceShift::Increase
    } else {
        PriceShift::Decrease
    }
}

/// Total cost for one line at its effective unit price.
pub fn line_total(line: &ShoppingListItem) -> f64 {
    effective_price(line) * line.quantity as f64
}

/// Total cost across the whole cart.
pub fn cart_total(lines: &[ShoppingListItem]) -> f64 {
    lines.iter().map(line_total).sum()
}

/// Commit rule for a user-entered observed price.
///
/// Non-finite or negative entries clear any existing override, as does
/// an entry exactly equal to the baseline (no override needed when the
/// price matches). The base price is never modified by this path.
pub fn commit_observed_price(entered: f64, base_price: f64) -> PriceOverride {
    if !entered.is_finite() || entered < 0.0 {
        return PriceOverride::Unset;
    }
    if entered == base_price {
        return PriceOverride::Unset;
    }
    PriceOverride::Observed(entered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, InventoryItem};

    fn line(base: f64, manual: PriceOverride, quantity: i64) -> ShoppingListItem {
        let item = InventoryItem {
            id: "i".to_string(),
            name: "Rice".to_string(),
            category: Category::Grocery,
            base_price: base,
            created_at: chrono::Utc::now(),
            extra: serde_json::Map::new(),
        };
        let mut l = ShoppingListItem::for_item("l".to_string(), &item);
        l.manual_price = manual;
        l.quantity = quantity;
        l
    }

    #[test]
    fn test_effective_price_falls_back_to_base() {
        assert_eq!(effective_price(&line(60.0, PriceOverride::Unset, 1)), 60.0);
        assert_eq!(
            effective_price(&line(60.0, PriceOverride::Observed(55.0), 1)),
            55.0
        );
    }

    #[test]
    fn test_percent_change_and_classification() {
        let up = line(100.0, PriceOverride::Observed(115.0), 1);
        assert_eq!(percent_change(&up), 15.0);
        assert_eq!(classify(&up), PriceShift::SignificantIncrease);
        assert!(classify(&up).is_significant());

        let down = line(100.0, PriceOverride::Observed(85.0), 1);
        assert_eq!(percent_change(&down), -15.0);
        assert_eq!(classify(&down), PriceShift::SignificantDecrease);

        let mild_up = line(100.0, PriceOverride::Observed(105.0), 1);
        assert_eq!(classify(&mild_up), PriceShift::Increase);

        let mild_down = line(100.0, PriceOverride::Observed(98.0), 1);
        assert_eq!(classify(&mild_down), PriceShift::Decrease);
    }

    #[test]
    fn test_noise_guard_counts_as_unchanged() {
        let noisy = line(100.0, PriceOverride::Observed(100.005), 1);
        assert_eq!(classify(&noisy), PriceShift::Unchanged);

        let flat = line(100.0, PriceOverride::Unset, 1);
        assert_eq!(classify(&flat), PriceShift::Unchanged);
    }

    #[test]
    fn test_zero_base_price_yields_zero_change() {
        let l = line(0.0, PriceOverride::Observed(5.0), 1);
        assert_eq!(percent_change(&l), 0.0);
        assert_eq!(classify(&l), PriceShift::Unchanged);
    }

    #[test]
    fn test_line_and_cart_totals() {
        let a = line(60.0, PriceOverride::Unset, 2);
        assert_eq!(line_total(&a), 120.0);

        let b = line(10.0, PriceOverride::Observed(8.0), 3);
        assert_eq!(line_total(&b), 24.0);

        assert_eq!(cart_total(&[a, b]), 144.0);
        assert_eq!(cart_total(&[]), 0.0);
    }

    #[test]
    fn test_commit_rule() {
        // A genuine deviation persists
        assert_eq!(
            commit_observed_price(55.0, 60.0),
            PriceOverride::Observed(55.0)
        );
        // Matching the baseline exactly clears the override
        assert_eq!(commit_observed_price(60.0, 60.0), PriceOverride::Unset);
        // Invalid entries clear the override
        assert_eq!(commit_observed_price(-1.0, 60.0), PriceOverride::Unset);
        assert_eq!(commit_observed_price(f64::NAN, 60.0), PriceOverride::Unset);
        assert_eq!(
            commit_observed_price(f64::INFINITY, 60.0),
            PriceOverride::Unset
        );
        // Zero is a valid observed price when the baseline is not zero
        assert_eq!(
            commit_observed_price(0.0, 60.0),
            PriceOverride::Observed(0.0)
        );
    }
}
