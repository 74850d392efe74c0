#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]
#![warn(missing_docs)]
/// Error handling and custom [`Error`](std::error::Error) types
pub mod errors;
/// Reading stock-movement files into the ledger
pub mod io;
/// Aggregation of the ledger into stock summaries and restock warnings
pub mod ops;
/// Data types used throughout stockflow
pub mod types;
/// Interactive terminal dashboard
pub mod ui;
