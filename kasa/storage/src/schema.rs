#![warn(clippy::missing_docs_in_private_items)]

use rusqlite::{
	params,
	Connection,
	OptionalExtension,
	Transaction,
};

use crate::{
	errors::StorageError,
	ledger::LedgerStorage,
	sqlite,
	types::Result,
};

/// Product tag stored in the settings table. A store carrying any
/// other tag belongs to a different program.
pub const APP_NAME: &str = "kasa";

/// Schema version produced by this build.
pub const DB_VERSION: u32 = 2;

/// Outcome of probing an opened store for the version marker.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StoreVersion {
	/// Zero objects of any kind; safe to initialize.
	Fresh,
	/// Existing content without a recognizable version marker.
	NotOurs,
	/// Recognized marker at the given version.
	Version(u32),
}

/// One registered migration step: applies to a store at a given
/// version and returns the version it produces.
type MigrationStep = fn(&Transaction) -> Result<u32>;

/// Migration table keyed by the version a store is currently at.
/// Steps are looked up one at a time so point releases can add jump
/// migrations without renumbering.
fn migration_from(version: u32) -> Option<MigrationStep> {
	match version {
		1 => Some(migrate_v1_to_v2),
		_ => None,
	}
}

/// v1 -> v2: the customers table gains first and last name columns.
fn migrate_v1_to_v2(tx: &Transaction) -> Result<u32> {
	tx.execute_batch(
		"ALTER TABLE customers ADD COLUMN first_name TEXT;
		ALTER TABLE customers ADD COLUMN last_name TEXT;",
	)
	.map_err(StorageError::Sql)?;
	Ok(2)
}

impl LedgerStorage {
	/// Probe the store for the version marker.
	pub fn detect_version(&self) -> Result<StoreVersion> {
		let conn = self.lock()?;
		Self::detect_version_on(&conn)
	}

	/// `detect_version` against an already-locked connection.
	fn detect_version_on(conn: &Connection) -> Result<StoreVersion> {
		let objects: u32 = conn
			.query_row("SELECT COUNT(*) FROM sqlite_master", [], |r| r.get(0))
			.map_err(StorageError::Sql)?;
		if objects == 0 {
			return Ok(StoreVersion::Fresh)
		}

		let has_settings: u32 = conn
			.query_row(
				"SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'settings'",
				[],
				|r| r.get(0),
			)
			.map_err(StorageError::Sql)?;
		if has_settings == 0 {
			return Ok(StoreVersion::NotOurs)
		}

		let app_name: Option<String> = conn
			.query_row("SELECT value FROM settings WHERE name = 'app_name'", [], |r| r.get(0))
			.optional()
			.map_err(StorageError::Sql)?;
		if app_name.as_deref() != Some(APP_NAME) {
			return Ok(StoreVersion::NotOurs)
		}

		let version: Option<String> = conn
			.query_row("SELECT value FROM settings WHERE name = 'version'", [], |r| r.get(0))
			.optional()
			.map_err(StorageError::Sql)?;
		match version.and_then(|v| v.parse::<u32>().ok()) {
			Some(version) => Ok(StoreVersion::Version(version)),
			None => Ok(StoreVersion::NotOurs),
		}
	}

	/// Create all tables plus the version marker, in one batch
	/// transaction. Only legal on a fresh store.
	pub fn initialize(&self) -> Result<()> {
		let conn = self.lock()?;
		if Self::detect_version_on(&conn)? != StoreVersion::Fresh {
			return Err(StorageError::Other("initialize called on a non-empty store"))
		}
		let setup_db_sql = format!(
			"
			PRAGMA foreign_keys=off;
			BEGIN TRANSACTION;
			{}{}{}{}
			INSERT INTO settings(name, value) VALUES('app_name', '{}');
			INSERT INTO settings(name, value) VALUES('version', '{}');
			COMMIT;
			PRAGMA foreign_keys=on;
			",
			sqlite::DB_CREATE_SETTINGS,
			sqlite::DB_CREATE_CUSTOMERS,
			sqlite::DB_CREATE_PAYMENTS,
			sqlite::DB_CREATE_ORDER_ITEMS,
			APP_NAME,
			DB_VERSION,
		);
		conn.execute_batch(&setup_db_sql).map_err(StorageError::Sql)?;
		Ok(())
	}

	/// Walk the migration chain until the store reaches the current
	/// version. Each step commits its schema change together with the
	/// updated marker, so a crash mid-chain resumes from the last
	/// completed step.
	pub fn upgrade(&self, from_version: u32) -> Result<u32> {
		let mut conn = self.lock()?;
		let mut version = from_version;
		while version != DB_VERSION {
			if version > DB_VERSION {
				return Err(StorageError::FutureVersion {
					stored: version,
					supported: DB_VERSION,
				})
			}
			let step =
				migration_from(version).ok_or(StorageError::UnknownMigrationStep(version))?;
			let tx = conn.transaction().map_err(StorageError::Sql)?;
			let next = step(&tx)?;
			tx.execute(
				"UPDATE settings SET value = ?1 WHERE name = 'version'",
				params![next.to_string()],
			)
			.map_err(StorageError::Sql)?;
			tx.commit().map_err(StorageError::Sql)?;
			version = next;
		}
		Ok(version)
	}

	/// Bring an opened store to a usable state: initialize a fresh
	/// store, upgrade an old one, refuse anything unrecognizable or
	/// newer than this build.
	pub fn setup(&self) -> Result<()> {
		match self.detect_version()? {
			StoreVersion::Fresh => self.initialize(),
			StoreVersion::NotOurs => Err(StorageError::IncompatibleStore(
				"no version marker found".to_owned(),
			)),
			StoreVersion::Version(version) => self.upgrade(version).map(|_| ()),
		}
	}
}
