use crate::error::CatalogError;
use crate::line_item::RowId;
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Notification raised by the ledger after a mutation has completed
///
/// Every amount carried by an event is already consistent with the state the
/// ledger holds when observers run.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LedgerEvent {
    ItemAdded {
        row_id: RowId,
        position: usize,
        grand_total: Decimal,
    },
    ItemRemoved {
        row_id: RowId,
        grand_total: Decimal,
    },
    ItemRecomputed {
        row_id: RowId,
        quantity: u32,
        unit_price: Decimal,
        line_total: Decimal,
        grand_total: Decimal,
    },
    ProductPending {
        row_id: RowId,
        product_id: String,
    },
    ProductCleared {
        row_id: RowId,
    },
    ProductOptionsUpdated {
        row_id: RowId,
        product_id: String,
        sizes: Vec<String>,
        colors: Vec<String>,
    },
    ProductOptionsFailed {
        row_id: RowId,
        product_id: String,
        reason: String,
    },
    SelectionChanged {
        row_id: RowId,
        size: Option<String>,
        color: Option<String>,
    },
}

impl LedgerEvent {
    pub fn row_id(&self) -> RowId {
        match self {
            LedgerEvent::ItemAdded { row_id, .. }
            | LedgerEvent::ItemRemoved { row_id, .. }
            | LedgerEvent::ItemRecomputed { row_id, .. }
            | LedgerEvent::ProductPending { row_id, .. }
            | LedgerEvent::ProductCleared { row_id }
            | LedgerEvent::ProductOptionsUpdated { row_id, .. }
            | LedgerEvent::ProductOptionsFailed { row_id, .. }
            | LedgerEvent::SelectionChanged { row_id, .. } => *row_id,
        }
    }

    pub(crate) fn options_failed(row_id: RowId, product_id: &str, error: &CatalogError) -> Self {
        LedgerEvent::ProductOptionsFailed {
            row_id,
            product_id: product_id.to_string(),
            reason: error.to_string(),
        }
    }
}

/// Passive subscriber to ledger changes (the presentation layer)
pub trait LedgerObserver: Send {
    fn on_event(&mut self, event: &LedgerEvent);
}

impl<F> LedgerObserver for F
where
    F: FnMut(&LedgerEvent) + Send,
{
    fn on_event(&mut self, event: &LedgerEvent) {
        self(event)
    }
}

/// Observer that keeps every event it sees
///
/// Clones share the same log, so one handle can be subscribed while another is
/// kept for reading.
#[derive(Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<LedgerEvent>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    // A panicking reader must not make the log drop later events.
    fn lock(&self) -> MutexGuard<'_, Vec<LedgerEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn events(&self) -> Vec<LedgerEvent> {
        self.lock().clone()
    }

    /// Remove and return everything recorded so far
    pub fn drain(&self) -> Vec<LedgerEvent> {
        std::mem::take(&mut *self.lock())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LedgerObserver for EventLog {
    fn on_event(&mut self, event: &LedgerEvent) {
        self.lock().push(event.clone());
    }
}
