#![warn(clippy::missing_docs_in_private_items)]

//! Storage layer of the kasa prepaid-tab ledger.
//!
//! Owns the SQLite schema, its version marker and upgrade chain, and
//! the raw repository operations over payments, order line items and
//! customer profiles. Balance projections and order assembly live in
//! `kasa-ledger`.

/// Storage errors.
pub mod errors;
/// Ledger repository operations.
pub mod ledger;
/// Schema versioning and migrations.
pub mod schema;
/// Sqlite constants.
mod sqlite;
#[cfg(test)]
mod tests;
/// Storage row and input types.
pub mod types;

pub use ledger::LedgerStorage;
