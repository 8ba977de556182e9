use std::{
	collections::BTreeMap,
	sync::Arc,
};

use kasa_storage::{
	types::OrderLine,
	LedgerStorage,
};
use tracing::debug;

use crate::errors::{
	LedgerError,
	Result,
};

/// One priced cart selection: item name and unit cost. Two buttons
/// with the same name but different prices stay distinct entries.
#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub struct CartItem {
	/// Item name as shown on the button.
	pub name: String,
	/// Price per unit.
	pub unit_cost: i64,
}

/// In-memory order under assembly. Owned by the caller and passed in
/// full on every placement; never accumulated inside the coordinator.
#[derive(Clone, Debug, Default)]
pub struct Cart {
	/// Count per priced selection; counts are always at least one.
	items: BTreeMap<CartItem, u32>,
}

impl Cart {
	/// Create an empty cart.
	pub fn new() -> Self {
		Self::default()
	}

	/// Add one unit of a priced selection.
	pub fn add(&mut self, name: impl Into<String>, unit_cost: i64) {
		self.add_many(name, unit_cost, 1);
	}

	/// Add several units of a priced selection at once. Adding zero
	/// units leaves the cart untouched.
	pub fn add_many(&mut self, name: impl Into<String>, unit_cost: i64, count: u32) {
		if count == 0 {
			return
		}
		let key = CartItem { name: name.into(), unit_cost };
		*self.items.entry(key).or_insert(0) += count;
	}

	/// Drop a selection entirely.
	pub fn remove(&mut self, name: &str, unit_cost: i64) {
		self.items.remove(&CartItem { name: name.to_owned(), unit_cost });
	}

	/// Whether the cart has no entries.
	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}

	/// Total cost as displayed before placement. The stored order
	/// delta is recomputed from the stored rows instead of this value.
	pub fn total(&self) -> i64 {
		self.items.iter().map(|(item, count)| item.unit_cost * i64::from(*count)).sum()
	}

	/// Iterate over the selections and their counts.
	pub fn iter(&self) -> impl Iterator<Item = (&CartItem, u32)> {
		self.items.iter().map(|(item, count)| (item, *count))
	}

	/// The cart as storage order lines.
	fn to_lines(&self) -> Vec<OrderLine> {
		self.items
			.iter()
			.map(|(item, count)| OrderLine {
				item_name: item.name.clone(),
				unit_cost: item.unit_cost,
				count: *count,
			})
			.collect()
	}
}

/// Turns a cart into one atomic ledger mutation. Stateless between
/// calls and performs no balance check; overspend confirmation is the
/// caller's decision, taken against an independent balance read.
pub struct OrderCoordinator {
	/// The underlying ledger storage.
	storage: Arc<LedgerStorage>,
}

impl OrderCoordinator {
	/// Create an instance of `OrderCoordinator`.
	pub fn new(storage: Arc<LedgerStorage>) -> Self {
		Self { storage }
	}

	/// Store the cart as one order payment plus its line items, all or
	/// nothing, and return the new payment id.
	pub fn place_order(&self, customer_id: u32, cart: &Cart) -> Result<i64> {
		if cart.is_empty() {
			return Err(LedgerError::EmptyOrder)
		}
		let payment_id = self.storage.save_order(customer_id, &cart.to_lines())?;
		debug!(
			message = "Order placed",
			customer_id = customer_id,
			payment_id = payment_id
		);
		Ok(payment_id)
	}
}
