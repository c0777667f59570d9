/* src/store/memory.rs */

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;

use super::{ConfigStore, LoadResult, StoreError, decode, encode};

/// An in-memory store holding the encoded record.
///
/// Uses the same codec as [`super::FileStore`], so shape mismatches surface the
/// same way.
#[derive(Debug, Default)]
pub struct MemoryStore {
	record: RwLock<Option<Vec<u8>>>,
}

impl MemoryStore {
	/// Creates an empty store.
	pub fn new() -> Self {
		Self::default()
	}

	/// Creates a store holding raw record bytes.
	pub fn with_bytes(bytes: Vec<u8>) -> Self {
		Self {
			record: RwLock::new(Some(bytes)),
		}
	}

	/// Returns a copy of the raw record bytes.
	pub async fn bytes(&self) -> Option<Vec<u8>> {
		self.record.read().await.clone()
	}
}

#[async_trait]
impl<T> ConfigStore<T> for MemoryStore
where
	T: Serialize + DeserializeOwned + Send + Sync,
{
	async fn load(&self) -> LoadResult<T> {
		match self.record.read().await.as_deref() {
			None => LoadResult::NotFound,
			Some(bytes) => match decode(bytes) {
				Ok(value) => LoadResult::Found(value),
				Err(e) => LoadResult::Invalid(e),
			},
		}
	}

	async fn save(&self, value: &T) -> Result<(), StoreError> {
		let bytes = encode(value)?;
		*self.record.write().await = Some(bytes);
		Ok(())
	}

	fn location(&self) -> String {
		"memory".to_string()
	}
}
