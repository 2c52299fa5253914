use order_ledger::{
    EventLog, LedgerError, LedgerEvent, MAX_UNIT_PRICE, OrderLedger, RowId, TotalsPolicy,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// Grand total recomputed independently of the ledger
fn expected_total(ledger: &OrderLedger) -> Decimal {
    ledger
        .items()
        .iter()
        .map(|item| Decimal::from(item.quantity) * item.unit_price)
        .sum()
}

fn assert_invariant(ledger: &OrderLedger) {
    assert_eq!(ledger.current_grand_total(), expected_total(ledger));
    assert_eq!(ledger.snapshot().grand_total, expected_total(ledger));
}

#[test]
fn test_concrete_order_scenario() {
    let mut ledger = OrderLedger::new();
    assert_eq!(ledger.current_grand_total(), Decimal::ZERO);

    let row1 = ledger.add_item().unwrap();
    ledger.set_quantity(row1, 3).unwrap();
    ledger.set_unit_price(row1, dec!(10.00)).unwrap();
    assert_eq!(ledger.line_total(row1).unwrap(), dec!(30.00));
    assert_eq!(ledger.current_grand_total(), dec!(30.00));

    let row2 = ledger.add_item().unwrap();
    ledger.set_quantity(row2, 2).unwrap();
    ledger.set_unit_price(row2, "5.50").unwrap();
    assert_eq!(ledger.line_total(row2).unwrap(), dec!(11.00));
    assert_eq!(ledger.current_grand_total(), dec!(41.00));

    ledger.remove_item(row1).unwrap();
    assert_eq!(ledger.current_grand_total(), dec!(11.00));
    assert_eq!(ledger.row_ids(), vec![row2]);
}

#[test]
fn test_malformed_quantity_counts_as_zero() {
    let mut ledger = OrderLedger::new();
    let row1 = ledger.add_item().unwrap();
    ledger.set_unit_price(row1, "10").unwrap();
    ledger.set_quantity(row1, 4).unwrap();
    assert_eq!(ledger.current_grand_total(), dec!(40));

    let line_total = ledger.set_quantity(row1, "abc").unwrap();
    assert_eq!(line_total, Decimal::ZERO);
    assert_eq!(ledger.line_total(row1).unwrap(), Decimal::ZERO);
    assert_eq!(ledger.get(row1).unwrap().quantity, 0);
    assert_eq!(ledger.current_grand_total(), Decimal::ZERO);
}

#[test]
fn test_malformed_price_counts_as_zero() {
    let mut ledger = OrderLedger::new();
    let row = ledger.add_item().unwrap();
    ledger.set_quantity(row, 2).unwrap();

    ledger.set_unit_price(row, "-4.00").unwrap();
    assert_eq!(ledger.get(row).unwrap().unit_price, Decimal::ZERO);

    ledger.set_unit_price(row, "doce").unwrap();
    assert_eq!(ledger.current_grand_total(), Decimal::ZERO);

    ledger.set_unit_price(row, 7.25).unwrap();
    assert_eq!(ledger.current_grand_total(), dec!(14.50));
}

#[test]
fn test_recompute_is_idempotent() {
    let mut ledger = OrderLedger::new();
    let row = ledger.add_item().unwrap();
    ledger.set_unit_price(row, "3.33").unwrap();

    let once = ledger.set_quantity(row, "7").unwrap();
    let total_once = ledger.current_grand_total();
    let twice = ledger.set_quantity(row, "7").unwrap();

    assert_eq!(once, twice);
    assert_eq!(total_once, ledger.current_grand_total());
    assert_eq!(twice, dec!(23.31));
}

#[test]
fn test_total_is_order_independent() {
    let values = [
        (3u32, dec!(10.00)),
        (2, dec!(5.50)),
        (12, dec!(0.10)),
        (1, dec!(999.99)),
    ];

    let mut ledger = OrderLedger::new();
    let mut rows = Vec::new();
    for (quantity, price) in values {
        let row = ledger.add_item().unwrap();
        ledger.set_quantity(row, quantity).unwrap();
        ledger.set_unit_price(row, price).unwrap();
        rows.push(row);
    }
    let first_total = ledger.current_grand_total();
    assert_eq!(first_total, dec!(1042.19));

    // remove in a scrambled order
    for index in [2, 0, 3, 1] {
        ledger.remove_item(rows[index]).unwrap();
        assert_invariant(&ledger);
    }
    assert!(ledger.is_empty());
    assert_eq!(ledger.current_grand_total(), Decimal::ZERO);

    // re-add equivalent rows, reversed and at the front
    for (quantity, price) in values.iter().rev() {
        let row = ledger.add_item_at(0).unwrap();
        ledger.set_quantity(row, *quantity).unwrap();
        ledger.set_unit_price(row, *price).unwrap();
    }
    assert_eq!(ledger.current_grand_total(), first_total);
}

#[test]
fn test_invariant_over_mixed_operations() {
    let mut ledger = OrderLedger::new();
    let mut seed: u64 = 0x5eed;
    let mut next = || {
        seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (seed >> 33) as usize
    };
    let inputs = ["1", "4", "abc", "", "2.5", "-3", "10", "0.99", "12.345"];

    for _ in 0..500 {
        let choice = next() % 5;
        if choice == 0 || ledger.is_empty() {
            ledger.add_item_at(next() % (ledger.len() + 1)).unwrap();
        } else {
            let row = ledger.row_ids()[next() % ledger.len()];
            let input = inputs[next() % inputs.len()];
            match choice {
                1 => {
                    ledger.remove_item(row).unwrap();
                }
                2 => {
                    ledger.set_quantity(row, input).unwrap();
                }
                _ => {
                    ledger.set_unit_price(row, input).unwrap();
                }
            }
        }
        assert_invariant(&ledger);
    }
}

#[test]
fn test_missing_row_is_reported() {
    let mut ledger = OrderLedger::new();
    let row = ledger.add_item().unwrap();
    ledger.remove_item(row).unwrap();

    assert_eq!(ledger.remove_item(row), Err(LedgerError::NotFound(row)));
    assert_eq!(ledger.set_quantity(row, 1), Err(LedgerError::NotFound(row)));
    assert_eq!(ledger.set_unit_price(row, 1), Err(LedgerError::NotFound(row)));
    assert_eq!(ledger.line_total(row), Err(LedgerError::NotFound(row)));
    assert_eq!(
        ledger.select_product(row, "p1"),
        Err(LedgerError::NotFound(row))
    );
    assert_eq!(ledger.clear_product(row), Err(LedgerError::NotFound(row)));
    assert_eq!(ledger.select_size(row, "M"), Err(LedgerError::NotFound(row)));
    assert_eq!(
        ledger.remove_item(RowId(999)),
        Err(LedgerError::NotFound(RowId(999)))
    );
}

#[test]
fn test_row_ids_are_never_reused() {
    let mut ledger = OrderLedger::new();
    let first = ledger.add_item().unwrap();
    ledger.remove_item(first).unwrap();
    let second = ledger.add_item().unwrap();

    assert_ne!(first, second);
    assert!(!ledger.contains(first));
    assert!(ledger.contains(second));
}

#[test]
fn test_insert_positions() {
    let mut ledger = OrderLedger::new();
    let a = ledger.add_item().unwrap();
    let b = ledger.add_item().unwrap();
    let c = ledger.add_item_at(0).unwrap();
    let d = ledger.add_item_at(1).unwrap();
    let e = ledger.add_item_at(100).unwrap();

    assert_eq!(ledger.row_ids(), vec![c, d, a, b, e]);
}

#[test]
fn test_row_cap() {
    let mut ledger = OrderLedger::with_max_rows(2);
    let first = ledger.add_item().unwrap();
    ledger.add_item().unwrap();

    assert_eq!(
        ledger.add_item(),
        Err(LedgerError::CapacityReached { max: 2 })
    );
    assert_eq!(ledger.len(), 2);

    ledger.remove_item(first).unwrap();
    assert!(ledger.add_item().is_ok());
}

#[test]
fn test_new_row_is_empty() {
    let mut ledger = OrderLedger::new();
    let row = ledger.add_item().unwrap();
    let item = ledger.get(row).unwrap();

    assert_eq!(item.quantity, 0);
    assert_eq!(item.unit_price, Decimal::ZERO);
    assert_eq!(item.product_id, None);
    assert_eq!(item.size, None);
    assert_eq!(item.color, None);
    assert_eq!(ledger.total_units(), 0);
}

#[test]
fn test_events_carry_post_mutation_totals() {
    let mut ledger = OrderLedger::new();
    let log = EventLog::new();
    ledger.subscribe(log.clone());

    let row = ledger.add_item().unwrap();
    ledger.set_unit_price(row, "2.50").unwrap();
    ledger.set_quantity(row, 4).unwrap();
    ledger.remove_item(row).unwrap();

    let events = log.events();
    assert_eq!(events.len(), 4);
    assert_eq!(
        events[0],
        LedgerEvent::ItemAdded {
            row_id: row,
            position: 0,
            grand_total: Decimal::ZERO,
        }
    );
    assert_eq!(
        events[2],
        LedgerEvent::ItemRecomputed {
            row_id: row,
            quantity: 4,
            unit_price: dec!(2.50),
            line_total: dec!(10.00),
            grand_total: dec!(10.00),
        }
    );
    assert_eq!(
        events[3],
        LedgerEvent::ItemRemoved {
            row_id: row,
            grand_total: Decimal::ZERO,
        }
    );
}

#[test]
fn test_closure_observer() {
    use std::sync::{Arc, Mutex};

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);

    let mut ledger = OrderLedger::new();
    ledger.subscribe(move |event: &LedgerEvent| {
        sink.lock().unwrap().push(event.row_id());
    });

    let a = ledger.add_item().unwrap();
    let b = ledger.add_item().unwrap();
    ledger.set_quantity(b, 1).unwrap();

    assert_eq!(*seen.lock().unwrap(), vec![a, b, b]);
}

#[test]
fn test_failed_operation_emits_nothing() {
    let mut ledger = OrderLedger::new();
    let log = EventLog::new();
    ledger.subscribe(log.clone());

    assert!(ledger.set_quantity(RowId(42), 3).is_err());
    assert!(log.is_empty());
}

#[test]
fn test_snapshot_lists_rows_in_display_order() {
    let mut ledger = OrderLedger::new();
    let a = ledger.add_item().unwrap();
    let b = ledger.add_item_at(0).unwrap();
    ledger.set_quantity(a, 2).unwrap();
    ledger.set_unit_price(a, "1.25").unwrap();

    let snapshot = ledger.snapshot();
    let ids: Vec<RowId> = snapshot.rows.iter().map(|row| row.row_id).collect();
    assert_eq!(ids, vec![b, a]);
    assert_eq!(snapshot.rows[1].line_total, dec!(2.50));
    assert_eq!(snapshot.grand_total, dec!(2.50));

    let json = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(json["rows"][1]["line_total"], "2.50");
}

#[test]
fn test_extreme_amounts_do_not_panic() {
    let mut ledger = OrderLedger::new();

    // a price past the accepted range counts as 0 instead of overflowing later
    let row = ledger.add_item().unwrap();
    ledger
        .set_unit_price(row, "10000000000000000000000000000")
        .unwrap();
    assert_eq!(ledger.set_quantity(row, "10").unwrap(), Decimal::ZERO);
    assert_eq!(ledger.current_grand_total(), Decimal::ZERO);

    ledger.set_unit_price(row, "1000000000000.01").unwrap();
    assert_eq!(ledger.get(row).unwrap().unit_price, Decimal::ZERO);

    // the largest accepted price times the largest quantity, on many rows
    let quantity = u32::MAX.to_string();
    for _ in 0..200 {
        let row = ledger.add_item().unwrap();
        ledger.set_unit_price(row, "1000000000000").unwrap();
        ledger.set_quantity(row, quantity.as_str()).unwrap();
        assert_eq!(
            ledger.line_total(row).unwrap(),
            Decimal::from(u32::MAX) * MAX_UNIT_PRICE
        );
    }
    assert_invariant(&ledger);
    assert_eq!(
        ledger.current_grand_total(),
        Decimal::from(200) * Decimal::from(u32::MAX) * MAX_UNIT_PRICE
    );
    assert_eq!(ledger.total_units(), 200 * u32::MAX as u64);

    let totals = ledger.totals(&TotalsPolicy::default());
    assert_eq!(totals.subtotal, ledger.current_grand_total());
    assert!(totals.total > totals.subtotal);

    let snapshot = ledger.snapshot();
    assert_eq!(snapshot.rows.len(), 201);
    assert_eq!(snapshot.grand_total, ledger.current_grand_total());
}
