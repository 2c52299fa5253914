use crate::catalog::ProductOptions;
use crate::error::{CatalogError, LedgerError};
use crate::events::{LedgerEvent, LedgerObserver};
use crate::line_item::{LineItem, ProductState, RequestId, RowId};
use crate::numeric::{MAX_UNIT_PRICE, RawInput, normalize_price, normalize_quantity};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

/// A catalog lookup the ledger is waiting on
///
/// Handed out by [`OrderLedger::select_product`]; the caller runs the lookup and
/// returns the result together with this request to
/// [`OrderLedger::apply_catalog_response`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CatalogRequest {
    pub row_id: RowId,
    pub product_id: String,
    pub request_id: RequestId,
}

/// What happened to a catalog response handed back to the ledger
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Options were stored on the row
    Applied { price_prefilled: bool },
    /// The lookup failed; the row keeps its product but offers no options
    Failed,
    /// The row has since moved on to another product or another lookup
    Superseded,
    /// The row was removed while the lookup was running
    RowGone,
}

/// One row as the presentation layer sees it
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RowView {
    pub row_id: RowId,
    pub product_id: Option<String>,
    pub size: Option<String>,
    pub color: Option<String>,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
    pub available_sizes: Vec<String>,
    pub available_colors: Vec<String>,
    pub pending: bool,
    pub options_failed: bool,
}

/// Everything needed to render the order: rows in display order and the grand total
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LedgerSnapshot {
    pub rows: Vec<RowView>,
    pub grand_total: Decimal,
}

/// Line items of the order being entered
///
/// Line totals and the grand total are never stored. They are derived from the
/// current quantities and prices whenever they are read, so the grand total
/// always equals the sum of `quantity * unit_price` over the visible rows.
pub struct OrderLedger {
    items: Vec<LineItem>,
    next_row: u64,
    next_request: u64,
    max_rows: Option<usize>,
    observers: Vec<Box<dyn LedgerObserver>>,
}

impl Default for OrderLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for OrderLedger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderLedger")
            .field("items", &self.items)
            .field("max_rows", &self.max_rows)
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl OrderLedger {
    pub fn new() -> Self {
        OrderLedger {
            items: Vec::new(),
            next_row: 1,
            next_request: 1,
            max_rows: None,
            observers: Vec::new(),
        }
    }

    /// Ledger that refuses to grow past `max` rows
    pub fn with_max_rows(max: usize) -> Self {
        OrderLedger {
            max_rows: Some(max),
            ..Self::new()
        }
    }

    pub fn max_rows(&self) -> Option<usize> {
        self.max_rows
    }

    /// Register a presentation-layer observer.
    /// Observers run synchronously, after each mutation has completed.
    pub fn subscribe(&mut self, observer: impl LedgerObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    fn emit(&mut self, event: LedgerEvent) {
        for observer in self.observers.iter_mut() {
            observer.on_event(&event);
        }
    }

    fn index_of(&self, row_id: RowId) -> Result<usize, LedgerError> {
        self.items
            .iter()
            .position(|item| item.row_id == row_id)
            .ok_or_else(|| {
                log::error!("row {} not found; view and ledger are out of sync", row_id);
                LedgerError::NotFound(row_id)
            })
    }

    fn recomputed_event(&self, index: usize) -> LedgerEvent {
        let item = &self.items[index];
        LedgerEvent::ItemRecomputed {
            row_id: item.row_id,
            quantity: item.quantity,
            unit_price: item.unit_price,
            line_total: item.line_total(),
            grand_total: self.current_grand_total(),
        }
    }

    /// Append an empty row
    ///
    /// # Returns
    /// * `Result<RowId, LedgerError>` - Id of the new row, or `CapacityReached`
    ///   when a row cap is configured and already met
    pub fn add_item(&mut self) -> Result<RowId, LedgerError> {
        self.add_item_at(self.items.len())
    }

    /// Insert an empty row at `position` (clamped to the end of the order)
    pub fn add_item_at(&mut self, position: usize) -> Result<RowId, LedgerError> {
        if let Some(max) = self.max_rows {
            if self.items.len() >= max {
                log::warn!("refusing to add row: order already has {} rows", max);
                return Err(LedgerError::CapacityReached { max });
            }
        }

        let row_id = RowId(self.next_row);
        self.next_row += 1;

        let position = position.min(self.items.len());
        self.items.insert(position, LineItem::create(row_id));
        log::debug!("added row {} at position {}", row_id, position);

        let grand_total = self.current_grand_total();
        self.emit(LedgerEvent::ItemAdded {
            row_id,
            position,
            grand_total,
        });
        Ok(row_id)
    }

    /// Remove a row and return it
    ///
    /// A catalog lookup still running for the row becomes orphaned: its result
    /// is discarded by [`apply_catalog_response`](Self::apply_catalog_response).
    pub fn remove_item(&mut self, row_id: RowId) -> Result<LineItem, LedgerError> {
        let index = self.index_of(row_id)?;
        let removed = self.items.remove(index);
        log::debug!("removed row {}", row_id);

        let grand_total = self.current_grand_total();
        self.emit(LedgerEvent::ItemRemoved {
            row_id,
            grand_total,
        });
        Ok(removed)
    }

    /// Set a row's quantity
    ///
    /// # Arguments
    /// * `row_id` - Row to update
    /// * `quantity` - Raw input; anything that is not a non-negative whole
    ///   number counts as 0
    ///
    /// # Returns
    /// * `Result<Decimal, LedgerError>` - The row's recomputed line total
    ///
    /// # Examples
    /// ```
    /// use order_ledger::OrderLedger;
    ///
    /// let mut ledger = OrderLedger::new();
    /// let row = ledger.add_item().unwrap();
    /// ledger.set_unit_price(row, "2.50").unwrap();
    /// ledger.set_quantity(row, "4").unwrap();
    /// assert_eq!(ledger.current_grand_total().to_string(), "10.00");
    /// ```
    pub fn set_quantity<'a>(
        &mut self,
        row_id: RowId,
        quantity: impl Into<RawInput<'a>>,
    ) -> Result<Decimal, LedgerError> {
        let index = self.index_of(row_id)?;
        let quantity = normalize_quantity(quantity.into());
        self.items[index].quantity = quantity;
        log::debug!("row {} quantity = {}", row_id, quantity);

        let event = self.recomputed_event(index);
        self.emit(event);
        Ok(self.items[index].line_total())
    }

    /// Set a row's unit price. Malformed or negative input counts as 0.
    pub fn set_unit_price<'a>(
        &mut self,
        row_id: RowId,
        price: impl Into<RawInput<'a>>,
    ) -> Result<Decimal, LedgerError> {
        let index = self.index_of(row_id)?;
        let price = normalize_price(price.into());
        self.items[index].unit_price = price;
        log::debug!("row {} unit price = {}", row_id, price);

        let event = self.recomputed_event(index);
        self.emit(event);
        Ok(self.items[index].line_total())
    }

    /// Choose the product for a row
    ///
    /// Clears the row's size/color choices and offered options, and marks the
    /// row as waiting on a catalog lookup. The unit price is left alone.
    /// A blank `product_id` clears the product instead.
    ///
    /// # Returns
    /// * `Result<Option<CatalogRequest>, LedgerError>` - The lookup the caller
    ///   must run, or `None` when the product was cleared
    pub fn select_product(
        &mut self,
        row_id: RowId,
        product_id: &str,
    ) -> Result<Option<CatalogRequest>, LedgerError> {
        let product_id = product_id.trim();
        if product_id.is_empty() {
            self.clear_product(row_id)?;
            return Ok(None);
        }

        let index = self.index_of(row_id)?;
        let request_id = RequestId(self.next_request);
        self.next_request += 1;

        let item = &mut self.items[index];
        item.product_id = Some(product_id.to_string());
        item.reset_options();
        item.product_state = ProductState::Pending {
            request: request_id,
        };
        log::debug!(
            "row {} product = {} (lookup {})",
            row_id,
            product_id,
            request_id
        );

        self.emit(LedgerEvent::ProductPending {
            row_id,
            product_id: product_id.to_string(),
        });

        Ok(Some(CatalogRequest {
            row_id,
            product_id: product_id.to_string(),
            request_id,
        }))
    }

    /// Unset a row's product, its choices and options.
    /// Any lookup still running for the row is invalidated.
    pub fn clear_product(&mut self, row_id: RowId) -> Result<(), LedgerError> {
        let index = self.index_of(row_id)?;
        let item = &mut self.items[index];
        item.product_id = None;
        item.reset_options();
        item.product_state = ProductState::Unselected;

        self.emit(LedgerEvent::ProductCleared { row_id });
        Ok(())
    }

    /// Record the size picked for a row.
    /// Returns false, leaving the choice unchanged, if the label is not offered.
    pub fn select_size(&mut self, row_id: RowId, size: &str) -> Result<bool, LedgerError> {
        let index = self.index_of(row_id)?;
        let item = &mut self.items[index];
        if !item.available_sizes.iter().any(|s| s == size) {
            log::debug!("row {}: size {} is not offered", row_id, size);
            return Ok(false);
        }
        item.size = Some(size.to_string());

        let event = self.selection_event(index);
        self.emit(event);
        Ok(true)
    }

    /// Record the color picked for a row.
    /// Returns false, leaving the choice unchanged, if the label is not offered.
    pub fn select_color(&mut self, row_id: RowId, color: &str) -> Result<bool, LedgerError> {
        let index = self.index_of(row_id)?;
        let item = &mut self.items[index];
        if !item.available_colors.iter().any(|c| c == color) {
            log::debug!("row {}: color {} is not offered", row_id, color);
            return Ok(false);
        }
        item.color = Some(color.to_string());

        let event = self.selection_event(index);
        self.emit(event);
        Ok(true)
    }

    fn selection_event(&self, index: usize) -> LedgerEvent {
        let item = &self.items[index];
        LedgerEvent::SelectionChanged {
            row_id: item.row_id,
            size: item.size.clone(),
            color: item.color.clone(),
        }
    }

    /// Hand back the result of a catalog lookup
    ///
    /// The result is applied only if the row still exists and is still waiting
    /// on exactly this request; otherwise it is dropped without touching any
    /// row. On success the offered sizes and colors are stored, and a row whose
    /// unit price is still 0 takes the suggested base price.
    ///
    /// # Arguments
    /// * `request` - The request returned by `select_product`
    /// * `result` - What the catalog answered
    ///
    /// # Returns
    /// * `FetchOutcome` - Whether the response was applied, failed or discarded
    pub fn apply_catalog_response(
        &mut self,
        request: &CatalogRequest,
        result: Result<ProductOptions, CatalogError>,
    ) -> FetchOutcome {
        let Some(index) = self
            .items
            .iter()
            .position(|item| item.row_id == request.row_id)
        else {
            log::warn!(
                "discarding lookup {} for removed row {}",
                request.request_id,
                request.row_id
            );
            return FetchOutcome::RowGone;
        };

        let item = &self.items[index];
        if item.product_id.as_deref() != Some(request.product_id.as_str())
            || item.pending_request() != Some(request.request_id)
        {
            log::warn!(
                "discarding superseded lookup {} for row {} (product {})",
                request.request_id,
                request.row_id,
                request.product_id
            );
            return FetchOutcome::Superseded;
        }

        match result {
            Ok(options) => {
                let item = &mut self.items[index];
                item.available_sizes = options.sizes;
                item.available_colors = options.colors;
                item.product_state = ProductState::Resolved;

                let mut price_prefilled = false;
                if item.unit_price.is_zero() {
                    let suggested = options
                        .base_price
                        .filter(|p| *p > Decimal::ZERO && *p <= MAX_UNIT_PRICE);
                    if let Some(price) = suggested {
                        item.unit_price = price;
                        price_prefilled = true;
                    }
                }

                let updated = LedgerEvent::ProductOptionsUpdated {
                    row_id: request.row_id,
                    product_id: request.product_id.clone(),
                    sizes: item.available_sizes.clone(),
                    colors: item.available_colors.clone(),
                };
                self.emit(updated);

                if price_prefilled {
                    log::debug!(
                        "row {} unit price prefilled from catalog",
                        request.row_id
                    );
                    let event = self.recomputed_event(index);
                    self.emit(event);
                }
                FetchOutcome::Applied { price_prefilled }
            }
            Err(error) => {
                let item = &mut self.items[index];
                item.reset_options();
                item.product_state = ProductState::Failed;
                log::warn!(
                    "product lookup for row {} ({}) failed: {}",
                    request.row_id,
                    request.product_id,
                    error
                );

                self.emit(LedgerEvent::options_failed(
                    request.row_id,
                    &request.product_id,
                    &error,
                ));
                FetchOutcome::Failed
            }
        }
    }

    /// Sum of every row's line total, computed on each call.
    /// Saturates at `Decimal::MAX` instead of overflowing.
    pub fn current_grand_total(&self) -> Decimal {
        self.items
            .iter()
            .map(LineItem::line_total)
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }

    pub fn line_total(&self, row_id: RowId) -> Result<Decimal, LedgerError> {
        let index = self.index_of(row_id)?;
        Ok(self.items[index].line_total())
    }

    /// Sum of quantities across all rows
    pub fn total_units(&self) -> u64 {
        self.items.iter().map(|item| item.quantity as u64).sum()
    }

    pub fn get(&self, row_id: RowId) -> Option<&LineItem> {
        self.items.iter().find(|item| item.row_id == row_id)
    }

    pub fn contains(&self, row_id: RowId) -> bool {
        self.get(row_id).is_some()
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Row ids in display order
    pub fn row_ids(&self) -> Vec<RowId> {
        self.items.iter().map(|item| item.row_id).collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Lookups the ledger is still waiting on
    pub fn pending_requests(&self) -> Vec<CatalogRequest> {
        self.items
            .iter()
            .filter_map(|item| {
                let request_id = item.pending_request()?;
                Some(CatalogRequest {
                    row_id: item.row_id,
                    product_id: item.product_id.clone()?,
                    request_id,
                })
            })
            .collect()
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        let rows = self
            .items
            .iter()
            .map(|item| RowView {
                row_id: item.row_id,
                product_id: item.product_id.clone(),
                size: item.size.clone(),
                color: item.color.clone(),
                quantity: item.quantity,
                unit_price: item.unit_price,
                line_total: item.line_total(),
                available_sizes: item.available_sizes.clone(),
                available_colors: item.available_colors.clone(),
                pending: item.is_pending(),
                options_failed: item.product_state == ProductState::Failed,
            })
            .collect();

        LedgerSnapshot {
            rows,
            grand_total: self.current_grand_total(),
        }
    }
}
