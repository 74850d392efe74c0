use std::collections::HashMap;

use crate::types::{ItemName, SummaryRow, Transaction, TransactionType};

/// Items whose remaining stock is at or below this level get a restock warning
pub const LOW_STOCK_THRESHOLD: i64 = 5;

/// Derives the per-item stock position from a full pass over the ledger.
///
/// Quantities are summed per `(item, type)` group; an item with only one
/// transaction type gets an implicit zero for the other. `remaining` is
/// `bought - sold` and goes negative when more stock was sold than bought.
///
/// Row order is not part of the contract and may differ between calls over
/// the same input; callers that need a stable order sort the result.
#[must_use]
pub fn summarize<'a, I>(records: I) -> Vec<SummaryRow>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut totals: HashMap<&ItemName, (u64, u64)> = HashMap::new();
    for record in records {
        let entry = totals.entry(record.item()).or_insert((0, 0));
        let units = u64::from(record.quantity().get());
        match record.transaction_type() {
            TransactionType::Bought => entry.0 += units,
            TransactionType::Sold => entry.1 += units,
        }
    }
    totals
        .into_iter()
        .map(|(item, (bought, sold))| SummaryRow {
            item: item.clone(),
            bought,
            sold,
            remaining: bought as i64 - sold as i64,
        })
        .collect()
}

/// Filters a summary down to the rows needing a restock warning.
///
/// The boundary is inclusive: an item with exactly `threshold` units
/// remaining is flagged. An empty summary yields an empty warning list,
/// which the dashboard reports as fully stocked.
#[must_use]
pub fn low_stock(summary: &[SummaryRow], threshold: i64) -> Vec<SummaryRow> {
    summary
        .iter()
        .filter(|row| row.is_low_stock(threshold))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use crate::types::{ItemName, Quantity};

    use super::*;

    fn record(item: &str, quantity: u32, transaction_type: TransactionType) -> Transaction {
        Transaction::new(
            ItemName::new(item).unwrap(),
            Quantity::new(quantity).unwrap(),
            transaction_type,
        )
    }

    fn row_for<'a>(summary: &'a [SummaryRow], item: &str) -> &'a SummaryRow {
        summary
            .iter()
            .find(|row| row.item().as_str() == item)
            .unwrap_or_else(|| panic!("No summary row for {item}"))
    }

    #[test]
    fn test_empty_ledger_yields_empty_summary_and_warnings() {
        let ledger: Vec<Transaction> = vec![];
        let summary = summarize(&ledger);
        assert!(summary.is_empty());
        assert!(low_stock(&summary, LOW_STOCK_THRESHOLD).is_empty());
    }

    #[test]
    fn test_bought_and_sold_net_out() {
        let ledger = vec![
            record("Widget", 10, TransactionType::Bought),
            record("Widget", 3, TransactionType::Sold),
        ];
        let summary = summarize(&ledger);
        assert_eq!(summary.len(), 1);
        let widget = row_for(&summary, "Widget");
        assert_eq!(widget.bought(), 10);
        assert_eq!(widget.sold(), 3);
        assert_eq!(widget.remaining(), 7);
        assert!(low_stock(&summary, LOW_STOCK_THRESHOLD).is_empty());
    }

    #[test]
    fn test_single_sided_item_gets_implicit_zero() {
        let ledger = vec![record("Gadget", 4, TransactionType::Bought)];
        let summary = summarize(&ledger);
        let gadget = row_for(&summary, "Gadget");
        assert_eq!(gadget.bought(), 4);
        assert_eq!(gadget.sold(), 0);
        assert_eq!(gadget.remaining(), 4);
        let warnings = low_stock(&summary, LOW_STOCK_THRESHOLD);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].item().as_str(), "Gadget");
    }

    #[test]
    fn test_same_type_rows_sum() {
        let ledger = vec![
            record("Bolt", 5, TransactionType::Bought),
            record("Bolt", 2, TransactionType::Bought),
        ];
        let summary = summarize(&ledger);
        assert_eq!(row_for(&summary, "Bolt").bought(), 7);
    }

    #[test]
    fn test_remaining_goes_negative_without_clamping() {
        let ledger = vec![
            record("Nut", 2, TransactionType::Bought),
            record("Nut", 9, TransactionType::Sold),
        ];
        let summary = summarize(&ledger);
        assert_eq!(row_for(&summary, "Nut").remaining(), -7);
    }

    #[test]
    fn test_low_stock_boundary_is_inclusive() {
        let ledger = vec![
            record("AtLimit", 5, TransactionType::Bought),
            record("AboveLimit", 6, TransactionType::Bought),
        ];
        let summary = summarize(&ledger);
        let warnings = low_stock(&summary, LOW_STOCK_THRESHOLD);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].item().as_str(), "AtLimit");
    }

    #[test]
    fn test_items_aggregate_independently() {
        let ledger = vec![
            record("Widget", 10, TransactionType::Bought),
            record("Gadget", 4, TransactionType::Bought),
            record("Widget", 3, TransactionType::Sold),
        ];
        let summary = summarize(&ledger);
        assert_eq!(summary.len(), 2);
        assert_eq!(row_for(&summary, "Widget").remaining(), 7);
        assert_eq!(row_for(&summary, "Gadget").remaining(), 4);
    }

    proptest! {
        // remaining = sum(Bought) - sum(Sold), exactly, for any movement history
        #[test]
        fn test_remaining_matches_signed_sum(
            moves in prop::collection::vec((1u32..=1_000, any::<bool>()), 0..64)
        ) {
            let ledger: Vec<Transaction> = moves
                .iter()
                .map(|&(quantity, bought)| {
                    let transaction_type = if bought {
                        TransactionType::Bought
                    } else {
                        TransactionType::Sold
                    };
                    record("Widget", quantity, transaction_type)
                })
                .collect();
            let summary = summarize(&ledger);
            if moves.is_empty() {
                prop_assert!(summary.is_empty());
            } else {
                let expected: i64 = moves
                    .iter()
                    .map(|&(quantity, bought)| {
                        let signed = i64::from(quantity);
                        if bought { signed } else { -signed }
                    })
                    .sum();
                prop_assert_eq!(summary.len(), 1);
                prop_assert_eq!(summary[0].remaining(), expected);
            }
        }
    }
}
