use crate::ledger::OrderLedger;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Percentages applied on top of the order subtotal
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TotalsPolicy {
    /// IVA, applied to the subtotal
    pub tax_percent: Decimal,
    /// Expected profit margin, reported but not charged
    pub profit_percent: Decimal,
}

impl Default for TotalsPolicy {
    fn default() -> Self {
        Self {
            tax_percent: Decimal::from(16),
            profit_percent: Decimal::from(30),
        }
    }
}

/// Figures shown under the line items
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OrderTotals {
    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub profit: Decimal,
}

impl OrderTotals {
    /// Derive the order figures from a subtotal. Nothing is rounded here, and
    /// products saturate rather than overflow.
    pub fn compute(subtotal: Decimal, policy: &TotalsPolicy) -> Self {
        let hundred = Decimal::ONE_HUNDRED;
        let tax = if policy.tax_percent > Decimal::ZERO {
            subtotal.saturating_mul(policy.tax_percent) / hundred
        } else {
            Decimal::ZERO
        };

        OrderTotals {
            subtotal,
            tax,
            total: subtotal.saturating_add(tax),
            profit: subtotal.saturating_mul(policy.profit_percent) / hundred,
        }
    }
}

impl OrderLedger {
    /// Subtotal, tax, total and profit for the current rows
    pub fn totals(&self, policy: &TotalsPolicy) -> OrderTotals {
        OrderTotals::compute(self.current_grand_total(), policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_policy() {
        let totals = OrderTotals::compute(dec!(41.00), &TotalsPolicy::default());

        assert_eq!(totals.subtotal, dec!(41.00));
        assert_eq!(totals.tax, dec!(6.56));
        assert_eq!(totals.total, dec!(47.56));
        assert_eq!(totals.profit, dec!(12.30));
    }

    #[test]
    fn test_no_tax() {
        let policy = TotalsPolicy {
            tax_percent: dec!(-5),
            profit_percent: Decimal::ZERO,
        };
        let totals = OrderTotals::compute(dec!(100), &policy);

        assert_eq!(totals.tax, Decimal::ZERO);
        assert_eq!(totals.total, dec!(100));
        assert_eq!(totals.profit, Decimal::ZERO);
    }

    #[test]
    fn test_ledger_totals_follow_rows() {
        let mut ledger = OrderLedger::new();
        let row = ledger.add_item().unwrap();
        ledger.set_quantity(row, 2).unwrap();
        ledger.set_unit_price(row, "50").unwrap();

        let totals = ledger.totals(&TotalsPolicy::default());
        assert_eq!(totals.subtotal, dec!(100));
        assert_eq!(totals.total, dec!(116));

        ledger.remove_item(row).unwrap();
        assert_eq!(ledger.totals(&TotalsPolicy::default()).total, Decimal::ZERO);
    }

    #[test]
    fn test_huge_subtotal_does_not_overflow() {
        let totals = OrderTotals::compute(Decimal::MAX, &TotalsPolicy::default());
        assert_eq!(totals.subtotal, Decimal::MAX);
        assert_eq!(totals.total, Decimal::MAX);
        assert!(totals.tax > Decimal::ZERO);
    }
}
