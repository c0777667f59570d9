/* src/resolver/source.rs */

use std::collections::BTreeMap;

/// Abstract environment that yields raw string values by key.
pub trait EnvSource: Send + Sync {
	/// Returns the value of `key`, or `None` when unset.
	fn var(&self, key: &str) -> Option<String>;
}

/// The environment of the current process.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
	fn var(&self, key: &str) -> Option<String> {
		// Non-unicode values are treated as unset.
		std::env::var(key).ok()
	}
}

/// A fixed in-memory environment, useful for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemoryEnv {
	vars: BTreeMap<String, String>,
}

impl MemoryEnv {
	/// Creates a new empty environment.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets a variable.
	pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
		self.vars.insert(key.into(), value.into());
	}

	/// Builder-style variant of [`MemoryEnv::set`].
	pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.set(key, value);
		self
	}
}

impl<K, V> FromIterator<(K, V)> for MemoryEnv
where
	K: Into<String>,
	V: Into<String>,
{
	fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
		Self {
			vars: iter
				.into_iter()
				.map(|(k, v)| (k.into(), v.into()))
				.collect(),
		}
	}
}

impl EnvSource for MemoryEnv {
	fn var(&self, key: &str) -> Option<String> {
		self.vars.get(key).cloned()
	}
}

impl<S: EnvSource + ?Sized> EnvSource for &S {
	fn var(&self, key: &str) -> Option<String> {
		(**self).var(key)
	}
}
