/// Error type that can be returned by fallible operations in this crate
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Error reading or parsing a delimited-text import; could wrap IO or parsing errors
    #[error("Error processing CSV")]
    Csv(#[from] csv::Error),
    /// Error reading or parsing a spreadsheet import
    #[error("Error processing spreadsheet")]
    Spreadsheet(#[from] calamine::XlsxError),
    /// Error opening the import file
    #[error("Error reading import file")]
    Io(#[from] std::io::Error),
    /// Imports are only accepted from `.csv` and `.xlsx` files
    #[error("Unsupported file extension {0:?}, expected .csv or .xlsx")]
    UnsupportedExtension(String),
    /// The import did not carry one of the required `Item`/`Quantity`/`Type` columns
    #[error("Missing required column {0:?}")]
    MissingColumn(&'static str),
    /// The spreadsheet workbook contained no worksheets to read
    #[error("Workbook contains no worksheets")]
    EmptyWorkbook,
}

/// Reason a single row was refused during ingestion validation.
///
/// A [`RowError`] never aborts an import; the row is skipped and the error is
/// reported alongside the rows that did load.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RowError {
    /// Item names must be non-empty after trimming surrounding whitespace
    #[error("item name is empty")]
    EmptyItem,
    /// The quantity cell did not hold a whole number
    #[error("quantity {0:?} is not a whole number")]
    BadQuantity(String),
    /// Quantities must be at least 1
    #[error("quantity must be at least 1")]
    NonPositiveQuantity,
    /// The type cell held something other than `Bought` or `Sold`
    #[error("unrecognized transaction type {0:?}")]
    UnknownType(String),
}
