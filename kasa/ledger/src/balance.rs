use chrono::NaiveDateTime;
use kasa_storage::{
	types::{
		LineItemRecord,
		PaymentKind,
		PaymentRecord,
	},
	LedgerStorage,
};
use serde::{
	Deserialize,
	Serialize,
};

use crate::errors::Result;

/// One ledger entry as displayed: its own delta plus the cumulative
/// balance after it applied.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PaymentHistoryEntry {
	/// Stored payment id.
	pub payment_id: i64,
	/// Which kind of balance change this was.
	pub kind: PaymentKind,
	/// Creation timestamp of the payment.
	pub timestamp: NaiveDateTime,
	/// The payment's own balance change.
	pub delta: i64,
	/// Cumulative balance after this payment applied.
	pub running_total: i64,
	/// Line items for order payments; empty otherwise.
	pub line_items: Vec<LineItemRecord>,
}

/// Current balance for a customer; zero when the customer has no
/// payments.
pub fn balance(storage: &LedgerStorage, customer_id: u32) -> Result<i64> {
	Ok(storage.balance(customer_id)?)
}

/// Chronological payment history with a running cumulative total. The
/// total after the last entry equals the current balance.
pub fn history_with_running_total(
	storage: &LedgerStorage,
	customer_id: u32,
) -> Result<Vec<PaymentHistoryEntry>> {
	Ok(with_running_totals(storage.payments_for(customer_id)?))
}

/// Pure fold of an ordered payment list into running totals.
/// Recomputing from the same sequence always yields the same result.
pub fn with_running_totals(payments: Vec<PaymentRecord>) -> Vec<PaymentHistoryEntry> {
	let mut running_total = 0;
	payments
		.into_iter()
		.map(|payment| {
			running_total += payment.balance_change;
			PaymentHistoryEntry {
				payment_id: payment.payment_id,
				kind: payment.kind,
				timestamp: payment.stamp,
				delta: payment.balance_change,
				running_total,
				line_items: payment.line_items,
			}
		})
		.collect()
}
