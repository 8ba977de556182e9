use derive_more::Display;

/// Errors produced by the storage layer.
#[derive(Display, Debug)]
pub enum StorageError {
	#[display(fmt = "Storage lock poisoned")]
	CannotLock,
	#[display(fmt = "Store has existing content without a recognizable version marker: {}", _0)]
	IncompatibleStore(String),
	#[display(fmt = "Store is at version {} but this build supports up to {}", stored, supported)]
	FutureVersion {
		/// Version found in the store's marker.
		stored: u32,
		/// Newest version this build knows how to produce.
		supported: u32,
	},
	#[display(fmt = "No migration step registered for version {}", _0)]
	UnknownMigrationStep(u32),
	#[display(fmt = "Amount must be non-negative, got {}", _0)]
	InvalidAmount(i64),
	#[display(fmt = "SQL Error: {}", _0)]
	Sql(rusqlite::Error),
	#[display(fmt = "Error: {}", _0)]
	Other(&'static str),
}
