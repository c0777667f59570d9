/* src/store/error.rs */

use std::path::PathBuf;

/// Errors raised while reading or writing the persisted configuration.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
	/// No record has been persisted yet.
	#[error("last known good config does not exist: {}", .path.display())]
	NotFound { path: PathBuf },

	/// IO error from the backing file.
	#[error("io error: {0}")]
	Io(#[from] std::io::Error),

	/// The value could not be serialized.
	#[error("encode error: {0}")]
	Encode(String),

	/// The record exists but does not decode into the requested shape.
	#[error("decode error: {0}")]
	Decode(String),

	/// The store path has no file name to write next to.
	#[error("invalid store path: {}", .0.display())]
	InvalidPath(PathBuf),
}
