/* src/store/mod.rs */

//!
//! Persistence of the last known-good configuration.
//!
//! The record is the application configuration alone, encoded with postcard.
//! There is no versioning: a record either exists or it does not, and every
//! save replaces it wholesale.

mod error;
mod file;
mod memory;

pub use error::StoreError;
pub use file::{DEFAULT_PATH, FileStore};
pub use memory::MemoryStore;

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Result of reading the persisted record.
#[derive(Debug)]
pub enum LoadResult<T> {
	/// A record was found and decoded.
	Found(T),
	/// Nothing has been persisted yet.
	NotFound,
	/// A record exists but could not be read or decoded.
	Invalid(StoreError),
}

/// Durable storage for a single configuration record.
///
/// Callers guarantee at most one reader or writer at a time.
#[async_trait]
pub trait ConfigStore<T>: Send + Sync {
	/// Reads the persisted record.
	async fn load(&self) -> LoadResult<T>;

	/// Replaces the persisted record with `value`.
	///
	/// A reader never observes a partially written record.
	async fn save(&self, value: &T) -> Result<(), StoreError>;

	/// Human-readable location of the record, used in error messages.
	fn location(&self) -> String;
}

pub(crate) fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, StoreError> {
	postcard::to_allocvec(value).map_err(|e| StoreError::Encode(e.to_string()))
}

pub(crate) fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, StoreError> {
	postcard::from_bytes(bytes).map_err(|e| StoreError::Decode(e.to_string()))
}
