
use std::sync::Arc;

use kasa_storage::LedgerStorage;
use rusqlite::Connection;

/// Fresh, fully initialized in-memory storage.
pub fn empty_storage() -> Arc<LedgerStorage> {
	let conn = Connection::open_in_memory().expect("In-memory database should open");
	let storage = LedgerStorage::new(conn).expect("Storage should wrap the connection");
	storage.setup().expect("Setup should succeed on a fresh store");
	Arc::new(storage)
}
