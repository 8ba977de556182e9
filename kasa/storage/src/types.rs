use chrono::NaiveDateTime;
use serde::{
	Deserialize,
	Serialize,
};

use crate::errors::StorageError;

/// Storage result type.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Closed set of payment descriptions stored in the ledger.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum PaymentKind {
	/// Net cost of one placed order.
	OrderPayment,
	/// Manual credit by staff.
	AddFunds,
	/// Manual debit by staff.
	RemoveFunds,
}

impl PaymentKind {
	/// Tag stored in the payments `description` column.
	pub fn tag(&self) -> &'static str {
		match self {
			PaymentKind::OrderPayment => "ORDER_PAYMENT",
			PaymentKind::AddFunds => "ADD_FUNDS",
			PaymentKind::RemoveFunds => "REMOVE_FUNDS",
		}
	}

	/// Parse a stored tag back into a kind.
	pub fn from_tag(tag: &str) -> Option<Self> {
		match tag {
			"ORDER_PAYMENT" => Some(PaymentKind::OrderPayment),
			"ADD_FUNDS" => Some(PaymentKind::AddFunds),
			"REMOVE_FUNDS" => Some(PaymentKind::RemoveFunds),
			_ => None,
		}
	}
}

/// Direction of a manual balance adjustment. The caller always passes
/// a non-negative amount; the sign convention is applied in storage.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AdjustmentKind {
	/// Credit the customer.
	AddFunds,
	/// Debit the customer.
	RemoveFunds,
}

impl AdjustmentKind {
	/// The payment kind recorded for this adjustment.
	pub(crate) fn payment_kind(&self) -> PaymentKind {
		match self {
			AdjustmentKind::AddFunds => PaymentKind::AddFunds,
			AdjustmentKind::RemoveFunds => PaymentKind::RemoveFunds,
		}
	}
}

/// One stored payment with its line items resolved.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PaymentRecord {
	/// Row id, monotonically assigned at insert.
	pub payment_id: i64,
	/// Owning customer.
	pub customer_id: u32,
	/// Creation timestamp, the sole ordering key. Second resolution,
	/// so ties are broken by `payment_id`.
	pub stamp: NaiveDateTime,
	/// Which kind of balance change this is.
	pub kind: PaymentKind,
	/// Signed delta applied to the customer's balance.
	pub balance_change: i64,
	/// Line items for order payments; empty for adjustments.
	pub line_items: Vec<LineItemRecord>,
}

/// One stored order line item with its derived total.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct LineItemRecord {
	/// Item name as priced at order time.
	pub item_name: String,
	/// Units ordered.
	pub count: u32,
	/// Derived `item_cost * count`, read back from the generated
	/// column.
	pub line_total: i64,
}

/// Input for one order line as handed to `save_order`.
#[derive(Clone, Debug)]
pub struct OrderLine {
	/// Item name.
	pub item_name: String,
	/// Price per unit at order time.
	pub unit_cost: i64,
	/// Units ordered, at least one.
	pub count: u32,
}

/// A customer's stored profile fields joined with the derived balance.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct CustomerProfile {
	/// Caller-chosen identifier, typically a tab number.
	pub customer_id: u32,
	/// Optional first name.
	pub first_name: Option<String>,
	/// Optional last name.
	pub last_name: Option<String>,
	/// Optional nickname.
	pub nickname: Option<String>,
	/// Sum of all balance changes; zero when the customer has none.
	pub balance: i64,
}

/// One row of the all-customers export; same shape as a profile.
pub type ExportRow = CustomerProfile;
