//! Export module for SplitShare
//!
//! - CSV: expenses and settlements (spreadsheet-compatible)
//! - JSON: the full ledger, machine-readable

pub mod csv;
pub mod json;

pub use self::csv::{export_expenses_csv, export_settlements_csv};
pub use self::json::{export_full_json, FullExport, EXPORT_SCHEMA_VERSION};
