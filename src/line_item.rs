use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a visible order row
///
/// Ids come from a per-ledger counter and are never reused, so an id that was
/// removed can not accidentally address a newer row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowId(pub u64);

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Identity of one catalog lookup issued for a row
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Where a row stands with respect to its product details
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ProductState {
    /// No product chosen yet
    Unselected,
    /// Waiting for the catalog to answer `request`
    Pending { request: RequestId },
    /// Options arrived
    Resolved,
    /// The lookup failed; no options are offered
    Failed,
}

/// One row of the order being entered
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub row_id: RowId,
    pub product_id: Option<String>,
    pub size: Option<String>,
    pub color: Option<String>,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub available_sizes: Vec<String>,
    pub available_colors: Vec<String>,
    pub product_state: ProductState,
}

impl LineItem {
    /// Empty row: no product, quantity 0, price 0
    pub fn create(row_id: RowId) -> Self {
        LineItem {
            row_id,
            product_id: None,
            size: None,
            color: None,
            quantity: 0,
            unit_price: Decimal::ZERO,
            available_sizes: Vec::new(),
            available_colors: Vec::new(),
            product_state: ProductState::Unselected,
        }
    }

    /// quantity × unit price, recomputed on every call
    ///
    /// Saturates at `Decimal::MAX`; normalized prices never get there.
    pub fn line_total(&self) -> Decimal {
        Decimal::from(self.quantity).saturating_mul(self.unit_price)
    }

    pub fn pending_request(&self) -> Option<RequestId> {
        match self.product_state {
            ProductState::Pending { request } => Some(request),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending_request().is_some()
    }

    /// Drop the chosen size/color and the offered options.
    /// Both depend on the product, so any product change invalidates them.
    pub fn reset_options(&mut self) {
        self.size = None;
        self.color = None;
        self.available_sizes.clear();
        self.available_colors.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_line_item_creation() {
        let item = LineItem::create(RowId(4));

        assert_eq!(item.row_id, RowId(4));
        assert_eq!(item.product_id, None);
        assert_eq!(item.quantity, 0);
        assert_eq!(item.unit_price, Decimal::ZERO);
        assert_eq!(item.line_total(), Decimal::ZERO);
        assert_eq!(item.product_state, ProductState::Unselected);
        assert!(!item.is_pending());
    }

    #[test]
    fn test_line_total_follows_fields() {
        let mut item = LineItem::create(RowId(1));
        item.quantity = 3;
        item.unit_price = dec!(10.00);
        assert_eq!(item.line_total(), dec!(30.00));

        item.quantity = 0;
        assert_eq!(item.line_total(), Decimal::ZERO);
    }

    #[test]
    fn test_line_total_saturates() {
        let mut item = LineItem::create(RowId(1));
        item.quantity = u32::MAX;
        item.unit_price = Decimal::MAX;
        assert_eq!(item.line_total(), Decimal::MAX);
    }

    #[test]
    fn test_reset_options() {
        let mut item = LineItem::create(RowId(1));
        item.size = Some("M".to_string());
        item.color = Some("Negro".to_string());
        item.available_sizes = vec!["S".to_string(), "M".to_string()];
        item.available_colors = vec!["Negro".to_string()];

        item.reset_options();

        assert_eq!(item.size, None);
        assert_eq!(item.color, None);
        assert!(item.available_sizes.is_empty());
        assert!(item.available_colors.is_empty());
    }

    #[test]
    fn test_pending_request() {
        let mut item = LineItem::create(RowId(1));
        item.product_state = ProductState::Pending {
            request: RequestId(9),
        };
        assert_eq!(item.pending_request(), Some(RequestId(9)));
        assert!(item.is_pending());
    }
}
