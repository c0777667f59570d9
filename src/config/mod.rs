/* src/config/mod.rs */

//!
//! The composite configuration snapshot and its accessor.

mod loader;

pub use loader::{DEFAULT_START_TIMEOUT, DEFAULT_STOP_TIMEOUT, LOADER_PREFIX, LoaderConfig};

use std::sync::Arc;

use arc_swap::ArcSwap;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::resolver::FromEnv;

/// Bound for application configuration types.
///
/// The value is read from the environment, persisted with a binary codec and
/// shared across tasks, so it must round-trip losslessly through serde.
pub trait AppConfig: FromEnv + Serialize + DeserializeOwned + Clone + Send + Sync + 'static {}

impl<T> AppConfig for T where T: FromEnv + Serialize + DeserializeOwned + Clone + Send + Sync + 'static {}

/// Loader settings plus the application configuration they apply to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Config<T> {
	#[serde(flatten)]
	pub loader: LoaderConfig,
	#[serde(rename = "app_config")]
	pub app: T,
}

impl<T> Config<T> {
	pub fn new(loader: LoaderConfig, app: T) -> Self {
		Self { loader, app }
	}
}

#[cfg(feature = "json")]
impl<T: Serialize> Config<T> {
	/// Serializes the snapshot for diagnostic surfaces.
	pub fn to_json(&self) -> Result<String, serde_json::Error> {
		serde_json::to_string(self)
	}
}

/// Read accessor for the current [`Config`] snapshot.
///
/// Snapshots are immutable; a rollback publishes a new one. Components must
/// keep the handle and call [`ConfigHandle::get`] on every use. A snapshot held
/// across a rollback keeps reporting the stale loader state.
pub struct ConfigHandle<T> {
	inner: Arc<ArcSwap<Config<T>>>,
}

impl<T> Clone for ConfigHandle<T> {
	fn clone(&self) -> Self {
		Self {
			inner: self.inner.clone(),
		}
	}
}

impl<T> ConfigHandle<T> {
	pub(crate) fn new(config: Config<T>) -> Self {
		Self {
			inner: Arc::new(ArcSwap::from_pointee(config)),
		}
	}

	/// Returns the current snapshot. This is a wait-free operation.
	pub fn get(&self) -> Arc<Config<T>> {
		self.inner.load_full()
	}

	/// Replaces the current snapshot.
	pub(crate) fn publish(&self, config: Config<T>) {
		self.inner.store(Arc::new(config));
	}
}

#[cfg(feature = "json")]
impl<T: Serialize> ConfigHandle<T> {
	/// Serializes the current snapshot.
	pub fn to_json(&self) -> Result<String, serde_json::Error> {
		self.get().to_json()
	}
}

impl<T: std::fmt::Debug> std::fmt::Debug for ConfigHandle<T> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_tuple("ConfigHandle").field(&self.get()).finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_publish_replaces_without_mutating() {
		let handle = ConfigHandle::new(Config::new(LoaderConfig::default(), 1u32));
		let shared = handle.clone();
		let before = handle.get();

		let mut loader = LoaderConfig::default();
		loader.uses_fallback = true;
		loader.config_error = Some("bad port".into());
		handle.publish(Config::new(loader, 2u32));

		assert_eq!(before.app, 1);
		assert!(!before.loader.uses_fallback);

		let after = shared.get();
		assert_eq!(after.app, 2);
		assert!(after.loader.uses_fallback);
		assert_eq!(after.loader.config_error.as_deref(), Some("bad port"));
	}

	#[cfg(feature = "json")]
	#[test]
	fn test_json_field_names() {
		let mut loader = LoaderConfig::default();
		let handle = ConfigHandle::new(Config::new(loader.clone(), "payload"));
		let json: serde_json::Value = serde_json::from_str(&handle.to_json().unwrap()).unwrap();
		assert_eq!(json["loader_uses_fallback_config"], false);
		assert_eq!(json["loader_ignore_fallback_config"], false);
		assert_eq!(json["app_config"], "payload");
		assert!(json.get("loader_config_error").is_none());
		assert_eq!(json["loader_start_timeout"], 60_000_000_000u64);
		assert_eq!(json["loader_stop_timeout"], 60_000_000_000u64);

		loader.config_error = Some("port out of range".into());
		handle.publish(Config::new(loader, "payload"));
		let json: serde_json::Value = serde_json::from_str(&handle.to_json().unwrap()).unwrap();
		assert_eq!(json["loader_config_error"], "port out of range");
	}
}
