use kasa_storage::errors::StorageError;
use thiserror::Error;

/// Ledger result type.
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Errors surfaced by the operations above storage.
#[derive(Error, Debug)]
pub enum LedgerError {
	#[error("Order contains no items")]
	EmptyOrder,
	#[error("Amount must be non-negative, got `{0}`")]
	InvalidAmount(i64),
	#[error("Storage error: {0}")]
	Storage(StorageError),
}

impl From<StorageError> for LedgerError {
	fn from(e: StorageError) -> Self {
		match e {
			StorageError::InvalidAmount(amount) => LedgerError::InvalidAmount(amount),
			e => LedgerError::Storage(e),
		}
	}
}
