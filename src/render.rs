//! Plain-text rendering of the order for the terminal front end

use crate::events::LedgerEvent;
use crate::ledger::{LedgerSnapshot, RowView};
use crate::money::{CurrencyFormat, format_currency};
use crate::totals::OrderTotals;

fn product_cell(row: &RowView) -> String {
    match (&row.product_id, row.pending, row.options_failed) {
        (None, _, _) => "-".to_string(),
        (Some(id), true, _) => format!("{} (loading)", id),
        (Some(id), false, true) => format!("{} (no options)", id),
        (Some(id), false, false) => id.clone(),
    }
}

/// Render the rows and grand total as a table
///
/// Amounts are rounded here and nowhere else.
pub fn render_table(snapshot: &LedgerSnapshot, currency: &CurrencyFormat) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{:<4}{:<6}{:<24}{:<8}{:<12}{:>6}{:>18}{:>18}\n",
        "#", "ROW", "PRODUCT", "SIZE", "COLOR", "QTY", "UNIT PRICE", "LINE TOTAL"
    ));

    if snapshot.rows.is_empty() {
        out.push_str("    (no items)\n");
    }

    for (position, row) in snapshot.rows.iter().enumerate() {
        out.push_str(&format!(
            "{:<4}{:<6}{:<24}{:<8}{:<12}{:>6}{:>18}{:>18}\n",
            position + 1,
            row.row_id,
            product_cell(row),
            row.size.as_deref().unwrap_or("-"),
            row.color.as_deref().unwrap_or("-"),
            row.quantity,
            format_currency(row.unit_price, currency),
            format_currency(row.line_total, currency),
        ));

        if row.size.is_none() && !row.available_sizes.is_empty() {
            out.push_str(&format!("          sizes: {}\n", row.available_sizes.join(", ")));
        }
        if row.color.is_none() && !row.available_colors.is_empty() {
            out.push_str(&format!("          colors: {}\n", row.available_colors.join(", ")));
        }
    }

    out.push_str(&format!(
        "{:>78}{:>18}\n",
        "TOTAL",
        format_currency(snapshot.grand_total, currency)
    ));
    out
}

pub fn render_totals(totals: &OrderTotals, units: u64, currency: &CurrencyFormat) -> String {
    format!(
        "Units:    {}\nSubtotal: {}\nIVA:      {}\nTotal:    {}\nProfit:   {}\n",
        units,
        format_currency(totals.subtotal, currency),
        format_currency(totals.tax, currency),
        format_currency(totals.total, currency),
        format_currency(totals.profit, currency),
    )
}

/// One-line notice for an event, as printed while the prompt is waiting
pub fn render_event(event: &LedgerEvent, currency: &CurrencyFormat) -> String {
    match event {
        LedgerEvent::ItemAdded { row_id, position, .. } => {
            format!("row {} added at position {}", row_id, position + 1)
        }
        LedgerEvent::ItemRemoved {
            row_id,
            grand_total,
        } => format!(
            "row {} removed, total {}",
            row_id,
            format_currency(*grand_total, currency)
        ),
        LedgerEvent::ItemRecomputed {
            row_id,
            line_total,
            grand_total,
            ..
        } => format!(
            "row {}: {} (total {})",
            row_id,
            format_currency(*line_total, currency),
            format_currency(*grand_total, currency)
        ),
        LedgerEvent::ProductPending { row_id, product_id } => {
            format!("row {}: looking up {}", row_id, product_id)
        }
        LedgerEvent::ProductCleared { row_id } => format!("row {}: product cleared", row_id),
        LedgerEvent::ProductOptionsUpdated {
            row_id,
            sizes,
            colors,
            ..
        } => format!(
            "row {}: sizes [{}] colors [{}]",
            row_id,
            sizes.join(", "),
            colors.join(", ")
        ),
        LedgerEvent::ProductOptionsFailed {
            row_id,
            product_id,
            reason,
        } => format!(
            "row {}: could not load {} ({})",
            row_id, product_id, reason
        ),
        LedgerEvent::SelectionChanged {
            row_id,
            size,
            color,
        } => format!(
            "row {}: size {} color {}",
            row_id,
            size.as_deref().unwrap_or("-"),
            color.as_deref().unwrap_or("-")
        ),
    }
}
