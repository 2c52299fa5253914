//! Error types for the order ledger

use crate::line_item::RowId;
use thiserror::Error;

/// Errors raised by ledger operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// The row is not (or no longer) part of the order.
    /// Means the presentation layer and the ledger disagree about the visible rows.
    #[error("row {0} not found")]
    NotFound(RowId),

    /// The configured row cap was reached
    #[error("order already holds the maximum of {max} rows")]
    CapacityReached { max: usize },
}

/// Failure while resolving a product against the catalog service
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// The service does not know the product
    #[error("product {0} not found in catalog")]
    NotFound(String),

    /// Any other non-success HTTP status
    #[error("catalog service answered with status {0}")]
    Status(u16),

    /// Connection failure or timeout
    #[error("catalog transport error: {0}")]
    Transport(String),

    /// The service answered but flagged the request as unsuccessful
    #[error("catalog rejected request: {0}")]
    Rejected(String),

    /// The response body could not be understood
    #[error("malformed catalog response: {0}")]
    Malformed(String),
}

/// Errors while loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),
}
