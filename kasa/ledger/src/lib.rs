#![warn(clippy::missing_docs_in_private_items)]

//! Business layer of the kasa prepaid-tab ledger.
//!
//! Derives balances and running-total payment histories from the
//! stored ledger and turns in-memory carts into atomic order
//! payments. The GUI collaborator calls in here and into
//! `kasa-storage` directly; nothing in this crate keeps state between
//! calls.

/// Balance and history projections.
pub mod balance;
/// Ledger errors.
pub mod errors;
/// Cart handling and atomic order placement.
pub mod order;
#[cfg(test)]
mod tests;

pub use balance::{
	balance,
	history_with_running_total,
	PaymentHistoryEntry,
};
pub use errors::LedgerError;
pub use order::{
	Cart,
	CartItem,
	OrderCoordinator,
};
