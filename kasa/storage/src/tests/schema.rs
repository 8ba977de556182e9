use rusqlite::Connection;

use super::empty_storage;
use crate::{
	errors::StorageError,
	schema::{
		StoreVersion,
		DB_VERSION,
	},
	LedgerStorage,
};

/// The customers table as it looked before first and last names were
/// added, with the marker to match.
const V1_STORE: &str = "
CREATE TABLE settings (
    name VARCHAR[24] UNIQUE PRIMARY KEY NOT NULL,
    value TEXT
);
CREATE TABLE customers (
    customer_id INTEGER PRIMARY KEY NOT NULL,
    nickname TEXT
);
CREATE TABLE payments (
    payment_id INTEGER PRIMARY KEY NOT NULL,
    customer_id INTEGER NOT NULL,
    stamp TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
    description TEXT NOT NULL,
    balance_change INTEGER NOT NULL
);
CREATE TABLE order_items (
    order_id INTEGER PRIMARY KEY NOT NULL,
    payment_id INTEGER NOT NULL,
    item_name TEXT,
    item_cost INTEGER NOT NULL,
    count INTEGER NOT NULL CHECK (count >= 1),
    cost_total INTEGER GENERATED ALWAYS AS (item_cost * count),
    FOREIGN KEY (payment_id) REFERENCES payments(payment_id) ON DELETE CASCADE
);
INSERT INTO settings(name, value) VALUES('app_name', 'kasa');
INSERT INTO settings(name, value) VALUES('version', '1');
";

#[test]
fn fresh_store_initializes_at_current_version() {
	let storage = empty_storage();
	let version = storage.detect_version().expect("Detection should succeed");
	assert_eq!(version, StoreVersion::Version(DB_VERSION));
}

#[test]
fn empty_database_is_detected_as_fresh() {
	let conn = Connection::open_in_memory().expect("In-memory database should open");
	let storage = LedgerStorage::new(conn).expect("Storage should wrap the connection");
	let version = storage.detect_version().expect("Detection should succeed");
	assert_eq!(version, StoreVersion::Fresh);
}

#[test]
fn foreign_store_is_rejected() {
	let conn = Connection::open_in_memory().expect("In-memory database should open");
	conn.execute_batch("CREATE TABLE unrelated (x INTEGER);")
		.expect("Table creation should succeed");
	let storage = LedgerStorage::new(conn).expect("Storage should wrap the connection");

	let version = storage.detect_version().expect("Detection should succeed");
	assert_eq!(version, StoreVersion::NotOurs);
	assert!(matches!(storage.setup(), Err(StorageError::IncompatibleStore(_))));
}

#[test]
fn mismatched_app_name_is_not_ours() {
	let storage = empty_storage();
	storage
		.conn
		.lock()
		.expect("Lock should not be poisoned")
		.execute("UPDATE settings SET value = 'other-program' WHERE name = 'app_name'", [])
		.expect("Update should succeed");
	let version = storage.detect_version().expect("Detection should succeed");
	assert_eq!(version, StoreVersion::NotOurs);
}

#[test]
fn upgrade_at_current_version_is_a_noop() {
	let storage = empty_storage();
	let version = storage.upgrade(DB_VERSION).expect("Upgrade should be a no-op");
	assert_eq!(version, DB_VERSION);
	let detected = storage.detect_version().expect("Detection should succeed");
	assert_eq!(detected, StoreVersion::Version(DB_VERSION));
}

#[test]
fn future_version_is_rejected_without_changes() {
	let storage = empty_storage();
	storage
		.conn
		.lock()
		.expect("Lock should not be poisoned")
		.execute("UPDATE settings SET value = '99' WHERE name = 'version'", [])
		.expect("Update should succeed");

	let objects_before: u32 = storage
		.conn
		.lock()
		.expect("Lock should not be poisoned")
		.query_row("SELECT COUNT(*) FROM sqlite_master", [], |r| r.get(0))
		.expect("Count should succeed");

	assert!(matches!(
		storage.setup(),
		Err(StorageError::FutureVersion { stored: 99, supported: DB_VERSION })
	));

	let objects_after: u32 = storage
		.conn
		.lock()
		.expect("Lock should not be poisoned")
		.query_row("SELECT COUNT(*) FROM sqlite_master", [], |r| r.get(0))
		.expect("Count should succeed");
	assert_eq!(objects_before, objects_after);
}

#[test]
fn unknown_migration_step_is_fatal() {
	let storage = empty_storage();
	storage
		.conn
		.lock()
		.expect("Lock should not be poisoned")
		.execute("UPDATE settings SET value = '0' WHERE name = 'version'", [])
		.expect("Update should succeed");
	assert!(matches!(storage.setup(), Err(StorageError::UnknownMigrationStep(0))));
}

#[test]
fn initialize_on_nonempty_store_is_refused() {
	let storage = empty_storage();
	assert!(storage.initialize().is_err());
}

#[test]
fn v1_store_upgrades_and_keeps_data() {
	let conn = Connection::open_in_memory().expect("In-memory database should open");
	conn.execute_batch(V1_STORE).expect("V1 layout should apply");
	conn.execute(
		"INSERT INTO customers(customer_id, nickname) VALUES(12, 'Pepa')",
		[],
	)
	.expect("Insert should succeed");
	conn.execute(
		"INSERT INTO payments(customer_id, description, balance_change) VALUES(12, 'ADD_FUNDS', 200)",
		[],
	)
	.expect("Insert should succeed");

	let storage = LedgerStorage::new(conn).expect("Storage should wrap the connection");
	storage.setup().expect("Upgrade from v1 should succeed");

	let version = storage.detect_version().expect("Detection should succeed");
	assert_eq!(version, StoreVersion::Version(DB_VERSION));

	let profile = storage.customer_profile(12).expect("Profile should load");
	assert_eq!(profile.nickname.as_deref(), Some("Pepa"));
	assert_eq!(profile.first_name, None);
	assert_eq!(profile.last_name, None);
	assert_eq!(profile.balance, 200);
}
