//! Ingestion of stock-movement files into the ledger

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use calamine::{open_workbook, Data, Reader, Xlsx};
use csv::Trim;
use serde::Deserialize;

use crate::{
    errors::{Error, RowError},
    types::{ItemName, Ledger, Quantity, Transaction, TransactionType},
};

/// Column header carrying item names
const COLUMN_ITEM: &str = "Item";
/// Column header carrying unit counts
const COLUMN_QUANTITY: &str = "Quantity";
/// Column header carrying the movement direction
const COLUMN_TYPE: &str = "Type";

/// The column headers every import must provide
const REQUIRED_COLUMNS: [&str; 3] = [COLUMN_ITEM, COLUMN_QUANTITY, COLUMN_TYPE];

/// One row of an import file before validation.
///
/// All fields are kept as raw text so that a bad value rejects the single row
/// rather than aborting the whole file.
#[derive(Debug, Clone, Deserialize)]
pub struct RawRecord {
    /// Raw contents of the `Item` cell
    #[serde(rename = "Item")]
    pub item: String,
    /// Raw contents of the `Quantity` cell
    #[serde(rename = "Quantity")]
    pub quantity: String,
    /// Raw contents of the `Type` cell
    #[serde(rename = "Type")]
    pub transaction_type: String,
}

impl RawRecord {
    /// Validates a raw row into a ledger-ready [`Transaction`].
    /// # Errors
    /// A [`RowError`] naming the first field that failed validation
    pub fn validate(&self) -> Result<Transaction, RowError> {
        let item = ItemName::new(&self.item)?;
        let quantity = parse_quantity(&self.quantity)?;
        let transaction_type = TransactionType::parse(&self.transaction_type)?;
        Ok(Transaction::new(item, quantity, transaction_type))
    }
}

/// Parses a quantity cell. Accepts plain integers and spreadsheet-style
/// floats holding an exact whole value (`"3"` and `"3.0"` both load).
fn parse_quantity(raw: &str) -> Result<Quantity, RowError> {
    let trimmed = raw.trim();
    let value: f64 = trimmed
        .parse()
        .map_err(|_| RowError::BadQuantity(trimmed.to_string()))?;
    if value.fract() != 0.0 {
        return Err(RowError::BadQuantity(trimmed.to_string()));
    }
    if value < 1.0 {
        return Err(RowError::NonPositiveQuantity);
    }
    if value > f64::from(u32::MAX) {
        return Err(RowError::BadQuantity(trimmed.to_string()));
    }
    Quantity::new(value as u32)
}

/// Outcome of one bulk import
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IngestReport {
    /// How many validated records were appended to the ledger
    pub appended: usize,
    /// Rows that failed validation, in file order
    pub rejected: Vec<RejectedRow>,
}

/// One import row that failed validation and was skipped
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedRow {
    /// 1-based position of the row among the file's data rows
    pub line: usize,
    /// Why the row was refused
    pub reason: RowError,
}

/// Loads stock movements from a file, dispatching on its extension.
///
/// `.csv` files are read as delimited text and `.xlsx` files as the first
/// worksheet of the workbook; both must carry `Item`, `Quantity` and `Type`
/// columns. Valid rows are appended to `ledger` in file order; rows that fail
/// validation are collected in the returned report instead of aborting the
/// import.
///
/// # Errors
/// [`Error::UnsupportedExtension`] for any other extension, and file-level
/// errors for unreadable or structurally broken input. A file-level error
/// leaves the ledger untouched.
pub fn load_transactions<L>(path: &Path, ledger: &mut L) -> Result<IngestReport, Error>
where
    L: Ledger,
{
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("csv") => {
            let mut reader = BufReader::new(File::open(path)?);
            load_transactions_from_csv(&mut reader, ledger)
        }
        Some(ext) if ext.eq_ignore_ascii_case("xlsx") => load_transactions_from_xlsx(path, ledger),
        other => Err(Error::UnsupportedExtension(
            other.unwrap_or_default().to_string(),
        )),
    }
}

/// Loads stock movements from a CSV-formatted stream.
///
/// Expects input data in this format (including header):
/// ```csv
/// Item,    Quantity,  Type
/// Widget,        10,  Bought
/// Widget,         3,  Sold
/// Gadget,         4,  Bought
/// ```
///
/// Valid rows are appended to `ledger`; rows failing validation land in the
/// report with their 1-based data-row line numbers.
///
/// # Errors
/// [`Error::MissingColumn`] when a required header is absent, and
/// [`Error::Csv`] for structurally broken input.
pub fn load_transactions_from_csv<R, L>(
    reader: &mut R,
    ledger: &mut L,
) -> Result<IngestReport, Error>
where
    R: Read,
    L: Ledger,
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|header| header == column) {
            return Err(Error::MissingColumn(column));
        }
    }

    // Rows are staged before any append so a structurally broken file leaves
    // the ledger untouched
    let mut raw_records = Vec::new();
    for result in csv_reader.deserialize() {
        raw_records.push(result?);
    }
    Ok(ingest_rows(&raw_records, ledger))
}

/// Loads stock movements from the first worksheet of an XLSX workbook.
///
/// The worksheet's first row must contain `Item`, `Quantity` and `Type`
/// header cells; every following row is validated and ingested exactly like
/// a CSV data row.
///
/// # Errors
/// [`Error::EmptyWorkbook`] when the workbook has no worksheets,
/// [`Error::MissingColumn`] when a header cell is absent, and
/// [`Error::Spreadsheet`] for unreadable workbooks.
pub fn load_transactions_from_xlsx<L>(path: &Path, ledger: &mut L) -> Result<IngestReport, Error>
where
    L: Ledger,
{
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(Error::EmptyWorkbook)??;

    let mut rows = range.rows();
    let header = rows.next().ok_or(Error::MissingColumn(COLUMN_ITEM))?;
    let column_of = |name: &'static str| -> Result<usize, Error> {
        header
            .iter()
            .position(|cell| cell.to_string().trim() == name)
            .ok_or(Error::MissingColumn(name))
    };
    let item_column = column_of(COLUMN_ITEM)?;
    let quantity_column = column_of(COLUMN_QUANTITY)?;
    let type_column = column_of(COLUMN_TYPE)?;

    let raw_records: Vec<RawRecord> = rows
        .map(|row| RawRecord {
            item: cell_text(row, item_column),
            quantity: cell_text(row, quantity_column),
            transaction_type: cell_text(row, type_column),
        })
        .collect();
    Ok(ingest_rows(&raw_records, ledger))
}

/// Validates staged rows and appends the valid ones to the ledger in file
/// order, recording each rejection with its 1-based data-row line number
fn ingest_rows<L>(rows: &[RawRecord], ledger: &mut L) -> IngestReport
where
    L: Ledger,
{
    let mut report = IngestReport::default();
    for (index, raw) in rows.iter().enumerate() {
        match raw.validate() {
            Ok(transaction) => {
                ledger.append(transaction);
                report.appended += 1;
            }
            Err(reason) => report.rejected.push(RejectedRow {
                line: index + 1,
                reason,
            }),
        }
    }
    report
}

/// Renders a worksheet cell as the raw text validation expects; absent and
/// empty cells become empty strings
fn cell_text(row: &[Data], column: usize) -> String {
    match row.get(column) {
        None | Some(Data::Empty) => String::new(),
        Some(cell) => cell.to_string(),
    }
}
