/* src/store/file.rs */

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use super::{ConfigStore, LoadResult, StoreError, decode, encode};

/// Default location of the persisted record, relative to the working directory.
pub const DEFAULT_PATH: &str = "last_known_good_config";

/// A file-backed store built on `tokio::fs`.
///
/// Saves go to a sibling `.tmp` file that is synced and then renamed over the
/// target, so a crash mid-write leaves the previous record intact.
#[derive(Debug, Clone)]
pub struct FileStore {
	path: PathBuf,
}

impl FileStore {
	/// Creates a store persisting to `path`.
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	/// Path of the persisted record.
	pub fn path(&self) -> &Path {
		&self.path
	}

	fn temp_path(&self) -> Result<PathBuf, StoreError> {
		let name = self
			.path
			.file_name()
			.ok_or_else(|| StoreError::InvalidPath(self.path.clone()))?;
		let mut tmp = OsString::from(name);
		tmp.push(".tmp");
		Ok(self.path.with_file_name(tmp))
	}
}

impl Default for FileStore {
	fn default() -> Self {
		Self::new(DEFAULT_PATH)
	}
}

#[async_trait]
impl<T> ConfigStore<T> for FileStore
where
	T: Serialize + DeserializeOwned + Send + Sync,
{
	async fn load(&self) -> LoadResult<T> {
		let bytes = match fs::read(&self.path).await {
			Ok(b) => b,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => return LoadResult::NotFound,
			Err(e) => return LoadResult::Invalid(StoreError::Io(e)),
		};

		match decode(&bytes) {
			Ok(value) => LoadResult::Found(value),
			Err(e) => LoadResult::Invalid(e),
		}
	}

	async fn save(&self, value: &T) -> Result<(), StoreError> {
		let bytes = encode(value)?;
		let tmp = self.temp_path()?;

		let mut file = fs::File::create(&tmp).await?;
		let written = async {
			file.write_all(&bytes).await?;
			file.sync_all().await
		}
		.await;
		drop(file);

		if let Err(e) = written {
			let _ = fs::remove_file(&tmp).await;
			return Err(StoreError::Io(e));
		}

		if let Err(e) = fs::rename(&tmp, &self.path).await {
			let _ = fs::remove_file(&tmp).await;
			return Err(StoreError::Io(e));
		}
		Ok(())
	}

	fn location(&self) -> String {
		self.path.display().to_string()
	}
}
