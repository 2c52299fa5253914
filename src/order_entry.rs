//! Order-entry controller
//!
//! Owns the [`OrderLedger`] for one order page and runs its catalog lookups.
//! Lookups run as tokio tasks; their replies come back over a channel and are
//! only ever applied by the owner, so the ledger is mutated from one logical
//! thread while any number of lookups are outstanding.

use crate::catalog::{CatalogService, ProductOptions};
use crate::error::{CatalogError, LedgerError};
use crate::events::LedgerObserver;
use crate::ledger::{CatalogRequest, FetchOutcome, OrderLedger};
use crate::line_item::{LineItem, RowId};
use crate::numeric::RawInput;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// A catalog reply that has been handed to the ledger
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolution {
    pub request: CatalogRequest,
    pub outcome: FetchOutcome,
}

struct CatalogReply {
    request: CatalogRequest,
    result: Result<ProductOptions, CatalogError>,
}

// Sends a cancellation reply if the lookup task is dropped before answering
// (aborted or panicked), so every spawned lookup yields exactly one reply.
struct ReplyGuard {
    replies: mpsc::UnboundedSender<CatalogReply>,
    request: Option<CatalogRequest>,
}

impl ReplyGuard {
    fn send(mut self, result: Result<ProductOptions, CatalogError>) {
        if let Some(request) = self.request.take() {
            let _ = self.replies.send(CatalogReply { request, result });
        }
    }
}

impl Drop for ReplyGuard {
    fn drop(&mut self) {
        if let Some(request) = self.request.take() {
            let _ = self.replies.send(CatalogReply {
                request,
                result: Err(CatalogError::Transport("lookup cancelled".to_string())),
            });
        }
    }
}

pub struct OrderEntry {
    ledger: OrderLedger,
    catalog: Arc<dyn CatalogService>,
    replies_tx: mpsc::UnboundedSender<CatalogReply>,
    replies_rx: mpsc::UnboundedReceiver<CatalogReply>,
    in_flight: HashMap<RowId, JoinHandle<()>>,
    outstanding: usize,
}

impl OrderEntry {
    pub fn new(ledger: OrderLedger, catalog: Arc<dyn CatalogService>) -> Self {
        let (replies_tx, replies_rx) = mpsc::unbounded_channel();
        OrderEntry {
            ledger,
            catalog,
            replies_tx,
            replies_rx,
            in_flight: HashMap::new(),
            outstanding: 0,
        }
    }

    pub fn ledger(&self) -> &OrderLedger {
        &self.ledger
    }

    pub fn subscribe(&mut self, observer: impl LedgerObserver + 'static) {
        self.ledger.subscribe(observer);
    }

    pub fn add_item(&mut self) -> Result<RowId, LedgerError> {
        self.ledger.add_item()
    }

    pub fn add_item_at(&mut self, position: usize) -> Result<RowId, LedgerError> {
        self.ledger.add_item_at(position)
    }

    /// Remove a row, cancelling its lookup if one is running
    pub fn remove_item(&mut self, row_id: RowId) -> Result<LineItem, LedgerError> {
        let removed = self.ledger.remove_item(row_id)?;
        self.cancel_lookup(row_id);
        Ok(removed)
    }

    pub fn set_quantity<'a>(
        &mut self,
        row_id: RowId,
        quantity: impl Into<RawInput<'a>>,
    ) -> Result<Decimal, LedgerError> {
        self.ledger.set_quantity(row_id, quantity)
    }

    pub fn set_unit_price<'a>(
        &mut self,
        row_id: RowId,
        price: impl Into<RawInput<'a>>,
    ) -> Result<Decimal, LedgerError> {
        self.ledger.set_unit_price(row_id, price)
    }

    /// Choose a row's product and start looking it up
    ///
    /// Any lookup already running for the row is cancelled. Must be called from
    /// within a tokio runtime.
    ///
    /// # Returns
    /// * `Result<Option<CatalogRequest>, LedgerError>` - The lookup that was
    ///   started, or `None` when a blank id cleared the product
    pub fn select_product(
        &mut self,
        row_id: RowId,
        product_id: &str,
    ) -> Result<Option<CatalogRequest>, LedgerError> {
        let request = self.ledger.select_product(row_id, product_id)?;
        self.cancel_lookup(row_id);
        if let Some(request) = &request {
            self.spawn_lookup(request.clone());
        }
        Ok(request)
    }

    pub fn clear_product(&mut self, row_id: RowId) -> Result<(), LedgerError> {
        self.ledger.clear_product(row_id)?;
        self.cancel_lookup(row_id);
        Ok(())
    }

    pub fn select_size(&mut self, row_id: RowId, size: &str) -> Result<bool, LedgerError> {
        self.ledger.select_size(row_id, size)
    }

    pub fn select_color(&mut self, row_id: RowId, color: &str) -> Result<bool, LedgerError> {
        self.ledger.select_color(row_id, color)
    }

    /// Rows whose current lookup has not been applied yet
    ///
    /// Counts lookups that are still running as well as those whose reply is
    /// queued but not yet handed to the ledger by `next_resolution`,
    /// `apply_ready` or `settle`.
    pub fn pending_fetches(&self) -> usize {
        self.in_flight.len()
    }

    fn spawn_lookup(&mut self, request: CatalogRequest) {
        let catalog = Arc::clone(&self.catalog);
        let row_id = request.row_id;
        let product_id = request.product_id.clone();
        let guard = ReplyGuard {
            replies: self.replies_tx.clone(),
            request: Some(request),
        };

        let handle = tokio::spawn(async move {
            let result = catalog.product_options(&product_id).await;
            guard.send(result);
        });
        self.in_flight.insert(row_id, handle);
        self.outstanding += 1;
    }

    fn cancel_lookup(&mut self, row_id: RowId) {
        if let Some(handle) = self.in_flight.remove(&row_id) {
            log::debug!("cancelling catalog lookup for row {}", row_id);
            handle.abort();
        }
    }

    fn resolve(&mut self, reply: CatalogReply) -> Resolution {
        self.outstanding = self.outstanding.saturating_sub(1);
        let outcome = self
            .ledger
            .apply_catalog_response(&reply.request, reply.result);

        // Only the row's current lookup can be applied or fail; its task is done.
        if matches!(outcome, FetchOutcome::Applied { .. } | FetchOutcome::Failed) {
            self.in_flight.remove(&reply.request.row_id);
        }

        Resolution {
            request: reply.request,
            outcome,
        }
    }

    /// Wait for the next catalog reply and apply it
    ///
    /// # Returns
    /// * `Option<Resolution>` - What happened to the reply, or `None` when no
    ///   lookup is outstanding
    pub async fn next_resolution(&mut self) -> Option<Resolution> {
        if self.outstanding == 0 {
            return None;
        }
        let reply = self.replies_rx.recv().await?;
        Some(self.resolve(reply))
    }

    /// Apply every reply that has already arrived, without waiting
    pub fn apply_ready(&mut self) -> Vec<Resolution> {
        let mut resolutions = Vec::new();
        while let Ok(reply) = self.replies_rx.try_recv() {
            resolutions.push(self.resolve(reply));
        }
        resolutions
    }

    /// Wait until every outstanding lookup has been answered and applied
    pub async fn settle(&mut self) -> Vec<Resolution> {
        let mut resolutions = Vec::new();
        while let Some(resolution) = self.next_resolution().await {
            resolutions.push(resolution);
        }
        resolutions
    }
}

impl Drop for OrderEntry {
    fn drop(&mut self) {
        for (_, handle) in self.in_flight.drain() {
            handle.abort();
        }
    }
}
