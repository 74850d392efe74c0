//! Common datatypes supporting functions throughout stockflow

use std::fmt::Display;

use crate::errors::RowError;

/// Name of a stocked item.
///
/// Names are trimmed of surrounding whitespace and must be non-empty. No
/// further normalization is applied: names differing in case or inner spacing
/// are distinct items.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemName(String);

impl ItemName {
    /// Creates an [`ItemName`] from free text.
    /// # Errors
    /// [`RowError::EmptyItem`] if the trimmed input is empty
    pub fn new(name: &str) -> Result<Self, RowError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(RowError::EmptyItem);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the name as a string slice
    #[must_use]
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ItemName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Number of units moved by a single transaction; always at least 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Quantity(u32);

impl Quantity {
    /// Creates a [`Quantity`] from a unit count.
    /// # Errors
    /// [`RowError::NonPositiveQuantity`] if `units` is zero
    pub fn new(units: u32) -> Result<Self, RowError> {
        if units == 0 {
            return Err(RowError::NonPositiveQuantity);
        }
        Ok(Self(units))
    }

    /// Returns the unit count as a plain integer
    #[must_use]
    #[inline]
    pub fn get(self) -> u32 {
        self.0
    }
}

impl Display for Quantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Direction of a stock movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionType {
    /// Units received into stock
    Bought,
    /// Units shipped out of stock
    Sold,
}

impl TransactionType {
    /// Parses a type cell from an import file. Matching is case-insensitive,
    /// so `bought` and `BOUGHT` both load.
    /// # Errors
    /// [`RowError::UnknownType`] for any value other than `Bought`/`Sold`
    pub fn parse(value: &str) -> Result<Self, RowError> {
        let trimmed = value.trim();
        if trimmed.eq_ignore_ascii_case("bought") {
            Ok(Self::Bought)
        } else if trimmed.eq_ignore_ascii_case("sold") {
            Ok(Self::Sold)
        } else {
            Err(RowError::UnknownType(trimmed.to_string()))
        }
    }

    /// Human-readable label for display
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Bought => "Bought",
            Self::Sold => "Sold",
        }
    }

    /// The other direction; used by the entry form's type selector
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Bought => Self::Sold,
            Self::Sold => Self::Bought,
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One stock movement event.
///
/// Records are immutable once appended to the ledger. There is no unique
/// identifier: duplicate records are legal and each counts independently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    /// The item the stock moved for
    pub(crate) item: ItemName,
    /// How many units moved
    pub(crate) quantity: Quantity,
    /// Whether the units came into stock or went out
    pub(crate) transaction_type: TransactionType,
}

impl Transaction {
    /// Creates a new stock movement record
    #[must_use]
    pub fn new(item: ItemName, quantity: Quantity, transaction_type: TransactionType) -> Self {
        Self {
            item,
            quantity,
            transaction_type,
        }
    }

    /// Returns the item the stock moved for
    #[must_use]
    #[inline]
    pub fn item(&self) -> &ItemName {
        &self.item
    }

    /// Returns how many units moved
    #[must_use]
    #[inline]
    pub fn quantity(&self) -> Quantity {
        self.quantity
    }

    /// Returns the direction of the movement
    #[must_use]
    #[inline]
    pub fn transaction_type(&self) -> TransactionType {
        self.transaction_type
    }
}

/// Per-item stock position derived from a full pass over the ledger.
///
/// Summary rows are never stored; they are recomputed from the ledger on
/// every display cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRow {
    /// The item this row aggregates
    pub(crate) item: ItemName,
    /// Total units bought across the ledger
    pub(crate) bought: u64,
    /// Total units sold across the ledger
    pub(crate) sold: u64,
    /// `bought - sold`; goes negative when more stock was sold than bought
    pub(crate) remaining: i64,
}

impl SummaryRow {
    /// Returns the item this row aggregates
    #[must_use]
    #[inline]
    pub fn item(&self) -> &ItemName {
        &self.item
    }

    /// Returns the total units bought
    #[must_use]
    #[inline]
    pub fn bought(&self) -> u64 {
        self.bought
    }

    /// Returns the total units sold
    #[must_use]
    #[inline]
    pub fn sold(&self) -> u64 {
        self.sold
    }

    /// Returns the remaining stock; may be negative
    #[must_use]
    #[inline]
    pub fn remaining(&self) -> i64 {
        self.remaining
    }

    /// Whether this row should carry a restock warning. The boundary is
    /// inclusive: remaining stock exactly at `threshold` is flagged.
    #[must_use]
    #[inline]
    pub fn is_low_stock(&self, threshold: i64) -> bool {
        self.remaining <= threshold
    }
}

/// An interface to the session's transaction ledger
pub trait Ledger {
    /// Appends one record to the end of the ledger. Never fails.
    fn append(&mut self, transaction: Transaction);

    /// Returns the full ledger contents in insertion order
    fn records(&self) -> &[Transaction];

    /// Number of records appended so far
    fn len(&self) -> usize {
        self.records().len()
    }

    /// Whether the ledger holds no records
    fn is_empty(&self) -> bool {
        self.records().is_empty()
    }

    /// Discards every record, returning the ledger to its session-start state
    fn reset(&mut self);
}

/// Holds the ledger in memory, in insertion order.
///
/// # Limitations
/// No persistence: contents last only as long as the owning session.
///
/// Only a single operation is allowed on the entire ledger at any given time.
#[derive(Default, Debug)]
pub struct MemoryLedger {
    /// Storage for appended records
    pub(crate) transactions: Vec<Transaction>,
}

impl MemoryLedger {
    /// Creates a new, empty [`MemoryLedger`]
    #[must_use]
    pub fn new() -> Self {
        MemoryLedger::default()
    }
}

impl Ledger for MemoryLedger {
    fn append(&mut self, transaction: Transaction) {
        self.transactions.push(transaction);
    }

    fn records(&self) -> &[Transaction] {
        &self.transactions
    }

    fn reset(&mut self) {
        self.transactions.clear();
    }
}

impl<'a> IntoIterator for &'a MemoryLedger {
    type Item = &'a Transaction;

    type IntoIter = std::slice::Iter<'a, Transaction>;

    fn into_iter(self) -> Self::IntoIter {
        self.transactions.iter()
    }
}

impl IntoIterator for MemoryLedger {
    type Item = Transaction;
    type IntoIter = std::vec::IntoIter<Transaction>;

    fn into_iter(self) -> Self::IntoIter {
        self.transactions.into_iter()
    }
}
