/*!
# Order Ledger

Line-item engine for the order-entry page of a textile workshop's management
application.

## Overview

While an order is being typed in, every row holds a product, its size and
color, a quantity and a unit price. The ledger keeps those rows and guarantees
that each row's line total (`quantity × unit price`) and the order's grand total
are always derived from the current values: nothing is cached, so nothing can
go stale.

Choosing a product is the one asynchronous step. The product catalog is asked
for the sizes and colors the product comes in and for a suggested base price.
Lookups are keyed by row and request, so a reply that arrives after the row
moved on to another product, or after the row was removed, is dropped.

## Architecture

### Engine
- **line_item**: Row data and identifiers
- **ledger**: Row operations, derived totals, catalog reply guard
- **totals**: Tax / total / profit figures derived from the grand total
- **numeric**: Normalization of typed quantities and prices (bad input counts as 0)
- **events**: Notifications for the presentation layer

### Collaborators
- **catalog**: Catalog service trait with in-memory and HTTP implementations
- **order_entry**: Runs catalog lookups on tokio and feeds replies back to the ledger

### Front end
- **command**, **render**: Grammar and text output of the terminal front end
- **money**: Currency formatting; amounts are rounded only when displayed
- **config**: JSON configuration with environment overrides

## Design Highlights

- Decimal arithmetic for every amount (`rust_decimal`)
- Observer-style events raised after each mutation completes
- Row ids are never reused within a ledger
*/

pub mod catalog;
pub mod command;
pub mod config;
pub mod error;
pub mod events;
pub mod ledger;
pub mod line_item;
pub mod money;
pub mod numeric;
pub mod order_entry;
pub mod render;
pub mod totals;

/// Re-export everything from these modules to make it easier to use
pub use catalog::*;
pub use config::*;
pub use error::*;
pub use events::*;
pub use ledger::*;
pub use line_item::*;
pub use money::*;
pub use numeric::*;
pub use order_entry::*;
pub use totals::*;
