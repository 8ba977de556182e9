#![warn(clippy::missing_docs_in_private_items)]

use std::{
	path::Path,
	sync::{
		Mutex,
		MutexGuard,
	},
};

use rusqlite::{
	params,
	Connection,
	OptionalExtension,
};

use crate::{
	errors::StorageError,
	types::{
		AdjustmentKind,
		CustomerProfile,
		ExportRow,
		LineItemRecord,
		OrderLine,
		PaymentKind,
		PaymentRecord,
		Result,
	},
};

/// Storage interface for the prepaid-tab ledger.
pub struct LedgerStorage {
	/// The rusqlite connection.
	pub(crate) conn: Mutex<Connection>,
}

impl LedgerStorage {
	/// Wrap an open connection. Foreign key enforcement is switched on
	/// so cascade deletes fire.
	pub fn new(conn: Connection) -> Result<Self> {
		conn.execute_batch("PRAGMA foreign_keys=on;").map_err(StorageError::Sql)?;
		Ok(Self { conn: Mutex::new(conn) })
	}

	/// Open or create the backing database file.
	pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
		let conn = Connection::open(path).map_err(StorageError::Sql)?;
		Self::new(conn)
	}

	/// Take the connection lock.
	pub(crate) fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
		self.conn.lock().map_err(|_| StorageError::CannotLock)
	}

	/// Insert one manual balance adjustment and return its payment id.
	/// The sign convention is applied here: `AddFunds` stores the
	/// amount, `RemoveFunds` stores its negation.
	pub fn record_adjustment(
		&self,
		customer_id: u32,
		amount: i64,
		kind: AdjustmentKind,
	) -> Result<i64> {
		if amount < 0 {
			return Err(StorageError::InvalidAmount(amount))
		}
		let balance_change = match kind {
			AdjustmentKind::AddFunds => amount,
			AdjustmentKind::RemoveFunds => -amount,
		};
		let conn = self.lock()?;
		conn.execute(
			"INSERT INTO payments(customer_id, description, balance_change) VALUES(?1, ?2, ?3)",
			params![customer_id, kind.payment_kind().tag(), balance_change],
		)
		.map_err(StorageError::Sql)?;
		Ok(conn.last_insert_rowid())
	}

	/// Delete a payment and, via cascade, all of its line items.
	/// Deleting an unknown id is a no-op.
	pub fn delete_payment(&self, payment_id: i64) -> Result<()> {
		let conn = self.lock()?;
		conn.execute("DELETE FROM payments WHERE payment_id = ?1", params![payment_id])
			.map_err(StorageError::Sql)?;
		Ok(())
	}

	/// All payments for a customer, oldest first, with line items
	/// eagerly resolved. The stamp has second resolution, so ties are
	/// broken by payment id.
	pub fn payments_for(&self, customer_id: u32) -> Result<Vec<PaymentRecord>> {
		let conn = self.lock()?;
		let mut stmt = conn
			.prepare(
				"SELECT payment_id, customer_id, stamp, description, balance_change
				FROM payments
				WHERE customer_id = ?1
				ORDER BY stamp ASC, payment_id ASC",
			)
			.map_err(StorageError::Sql)?;

		let mut rows = stmt.query(params![customer_id]).map_err(StorageError::Sql)?;

		let mut payments = vec![];
		while let Some(row) = rows.next().map_err(StorageError::Sql)? {
			let tag: String = row.get(3).map_err(StorageError::Sql)?;
			let kind = PaymentKind::from_tag(&tag)
				.ok_or(StorageError::Other("unknown payment description tag"))?;
			payments.push(PaymentRecord {
				payment_id: row.get(0).map_err(StorageError::Sql)?,
				customer_id: row.get(1).map_err(StorageError::Sql)?,
				stamp: row.get(2).map_err(StorageError::Sql)?,
				kind,
				balance_change: row.get(4).map_err(StorageError::Sql)?,
				line_items: vec![],
			});
		}

		for payment in payments.iter_mut() {
			payment.line_items = Self::line_items_on(&conn, payment.payment_id)?;
		}

		Ok(payments)
	}

	/// Line items for one payment in the fixed display order.
	fn line_items_on(conn: &Connection, payment_id: i64) -> Result<Vec<LineItemRecord>> {
		let mut stmt = conn
			.prepare(
				"SELECT item_name, count, cost_total FROM order_items
				WHERE payment_id = ?1
				ORDER BY item_name DESC",
			)
			.map_err(StorageError::Sql)?;

		let mut rows = stmt.query(params![payment_id]).map_err(StorageError::Sql)?;

		let mut items = vec![];
		while let Some(row) = rows.next().map_err(StorageError::Sql)? {
			items.push(LineItemRecord {
				item_name: row.get(0).map_err(StorageError::Sql)?,
				count: row.get(1).map_err(StorageError::Sql)?,
				line_total: row.get(2).map_err(StorageError::Sql)?,
			});
		}

		Ok(items)
	}

	/// Derived balance: the sum of all balance changes, zero when the
	/// customer has no payments.
	pub fn balance(&self, customer_id: u32) -> Result<i64> {
		let conn = self.lock()?;
		Self::balance_on(&conn, customer_id)
	}

	/// `balance` against an already-locked connection.
	fn balance_on(conn: &Connection, customer_id: u32) -> Result<i64> {
		let sum: Option<i64> = conn
			.query_row(
				"SELECT SUM(balance_change) FROM payments WHERE customer_id = ?1",
				params![customer_id],
				|r| r.get(0),
			)
			.map_err(StorageError::Sql)?;
		Ok(sum.unwrap_or(0))
	}

	/// Stored profile fields joined with the derived balance. A
	/// customer never stored still echoes back with empty fields and
	/// a zero balance.
	pub fn customer_profile(&self, customer_id: u32) -> Result<CustomerProfile> {
		let conn = self.lock()?;
		let profile = conn
			.query_row(
				"SELECT first_name, last_name, nickname FROM customers WHERE customer_id = ?1",
				params![customer_id],
				|r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
			)
			.optional()
			.map_err(StorageError::Sql)?;
		let (first_name, last_name, nickname) = profile.unwrap_or((None, None, None));
		let balance = Self::balance_on(&conn, customer_id)?;
		Ok(CustomerProfile { customer_id, first_name, last_name, nickname, balance })
	}

	/// Insert or fully replace a customer's profile fields in one
	/// atomic step, last write wins. Empty strings are stored as NULL;
	/// "no name" and "" are the same state.
	pub fn upsert_profile(
		&self,
		customer_id: u32,
		first_name: Option<&str>,
		last_name: Option<&str>,
		nickname: Option<&str>,
	) -> Result<()> {
		let conn = self.lock()?;
		conn.execute(
			"INSERT INTO customers(customer_id, first_name, last_name, nickname)
			VALUES(?1, ?2, ?3, ?4)
			ON CONFLICT(customer_id) DO UPDATE SET
				first_name = excluded.first_name,
				last_name = excluded.last_name,
				nickname = excluded.nickname",
			params![
				customer_id,
				normalize(first_name),
				normalize(last_name),
				normalize(nickname)
			],
		)
		.map_err(StorageError::Sql)?;
		Ok(())
	}

	/// One row per customer that is visible at all: any non-zero
	/// balance or any stored profile field. Customers with a zero
	/// balance and a fully empty profile are indistinguishable from
	/// "never existed" and are omitted.
	pub fn export_rows(&self) -> Result<Vec<ExportRow>> {
		let conn = self.lock()?;
		let mut stmt = conn
			.prepare(
				"SELECT customer_id, first_name, last_name, nickname, balance FROM (
					SELECT
						ids.customer_id AS customer_id,
						c.first_name AS first_name,
						c.last_name AS last_name,
						c.nickname AS nickname,
						COALESCE((SELECT SUM(balance_change)
							FROM payments p
							WHERE p.customer_id = ids.customer_id), 0) AS balance
					FROM (
						SELECT customer_id FROM customers
						UNION
						SELECT customer_id FROM payments
					) ids
					LEFT JOIN customers c ON c.customer_id = ids.customer_id
				)
				WHERE balance != 0
					OR first_name IS NOT NULL
					OR last_name IS NOT NULL
					OR nickname IS NOT NULL
				ORDER BY customer_id ASC",
			)
			.map_err(StorageError::Sql)?;

		let mut rows = stmt.query([]).map_err(StorageError::Sql)?;

		let mut export = vec![];
		while let Some(row) = rows.next().map_err(StorageError::Sql)? {
			export.push(ExportRow {
				customer_id: row.get(0).map_err(StorageError::Sql)?,
				first_name: row.get(1).map_err(StorageError::Sql)?,
				last_name: row.get(2).map_err(StorageError::Sql)?,
				nickname: row.get(3).map_err(StorageError::Sql)?,
				balance: row.get(4).map_err(StorageError::Sql)?,
			});
		}

		Ok(export)
	}

	/// Atomically store one order: a provisional zero payment, its
	/// line items, then the payment's balance change recomputed from
	/// the stored line totals. Commits or rolls back as one unit,
	/// leaving no partial payment and no orphan line items.
	pub fn save_order(&self, customer_id: u32, lines: &[OrderLine]) -> Result<i64> {
		let mut conn = self.lock()?;
		let tx = conn.transaction().map_err(StorageError::Sql)?;

		tx.execute(
			"INSERT INTO payments(customer_id, description, balance_change) VALUES(?1, ?2, 0)",
			params![customer_id, PaymentKind::OrderPayment.tag()],
		)
		.map_err(StorageError::Sql)?;
		let payment_id = tx.last_insert_rowid();

		for line in lines {
			tx.execute(
				"INSERT INTO order_items(payment_id, item_name, item_cost, count)
				VALUES(?1, ?2, ?3, ?4)",
				params![payment_id, line.item_name, line.unit_cost, line.count],
			)
			.map_err(StorageError::Sql)?;
		}

		// The stored delta is derived from the stored rows, never from
		// the caller's totals.
		tx.execute(
			"UPDATE payments
			SET balance_change = -1 * (SELECT SUM(cost_total) FROM order_items WHERE payment_id = ?1)
			WHERE payment_id = ?1",
			params![payment_id],
		)
		.map_err(StorageError::Sql)?;

		tx.commit().map_err(StorageError::Sql)?;
		Ok(payment_id)
	}
}

/// Empty profile strings are the same state as "never set".
fn normalize(field: Option<&str>) -> Option<&str> {
	field.filter(|f| !f.is_empty())
}
