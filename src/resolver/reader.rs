/* src/resolver/reader.rs */

use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use super::{EnvSource, FromEnv, ParseError, duration::parse_duration};

/// A scoped, read-only view of an [`EnvSource`] under a key prefix.
///
/// Keys are built by joining the prefix and each field path segment with `_`
/// and upper-casing the result: prefix `APP`, scope `server`, field `port`
/// reads `APP_SERVER_PORT`.
#[derive(Clone, Copy)]
pub struct EnvReader<'a> {
	source: &'a dyn EnvSource,
	prefix: &'a str,
	path: Option<&'a EnvReader<'a>>,
	segment: &'a str,
}

impl<'a> EnvReader<'a> {
	/// Creates a reader rooted at `prefix`. An empty prefix reads bare keys.
	pub fn new(source: &'a dyn EnvSource, prefix: &'a str) -> Self {
		Self {
			source,
			prefix,
			path: None,
			segment: "",
		}
	}

	/// Returns a reader for a nested field path.
	pub fn scope(&'a self, segment: &'a str) -> EnvReader<'a> {
		EnvReader {
			source: self.source,
			prefix: self.prefix,
			path: Some(self),
			segment,
		}
	}

	fn push_path<'s>(&'s self, out: &mut Vec<&'s str>) {
		match self.path {
			Some(parent) => {
				parent.push_path(out);
				out.push(self.segment);
			}
			None => {
				if !self.prefix.is_empty() {
					out.push(self.prefix);
				}
			}
		}
	}

	/// Full environment key for `name` under this reader.
	pub fn key(&self, name: &str) -> String {
		let mut parts = Vec::new();
		self.push_path(&mut parts);
		parts.push(name);
		parts
			.into_iter()
			.filter(|p| !p.is_empty())
			.collect::<Vec<_>>()
			.join("_")
			.to_uppercase()
	}

	/// Raw string value, `None` when unset.
	pub fn string(&self, name: &str) -> Option<String> {
		self.source.var(&self.key(name))
	}

	/// Parses a value through its [`FromStr`] implementation (integers, floats, addresses).
	pub fn parse<V>(&self, name: &str) -> Result<Option<V>, ParseError>
	where
		V: FromStr,
		V::Err: Display,
	{
		let key = self.key(name);
		match self.source.var(&key) {
			None => Ok(None),
			Some(raw) => raw
				.trim()
				.parse::<V>()
				.map(Some)
				.map_err(|e| ParseError::new(key, raw, std::any::type_name::<V>(), e)),
		}
	}

	/// Parses a boolean. Accepts `1 t T TRUE true True` and `0 f F FALSE false False`.
	pub fn bool(&self, name: &str) -> Result<Option<bool>, ParseError> {
		let key = self.key(name);
		let Some(raw) = self.source.var(&key) else {
			return Ok(None);
		};
		match raw.trim() {
			"1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(Some(true)),
			"0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(Some(false)),
			_ => Err(ParseError::new(key, raw, "bool", "invalid syntax")),
		}
	}

	/// Parses a duration such as `300ms` or `1h30m`.
	pub fn duration(&self, name: &str) -> Result<Option<Duration>, ParseError> {
		let key = self.key(name);
		match self.source.var(&key) {
			None => Ok(None),
			Some(raw) => parse_duration(raw.trim())
				.map(Some)
				.map_err(|e| ParseError::new(key, raw, "duration", e)),
		}
	}

	/// Reads a nested structure whose fields live under `segment`.
	pub fn nested<V: FromEnv>(&self, segment: &str) -> Result<V, ParseError> {
		V::from_env(&self.scope(segment))
	}
}

impl std::fmt::Debug for EnvReader<'_> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("EnvReader")
			.field("scope", &self.key(""))
			.finish_non_exhaustive()
	}
}
