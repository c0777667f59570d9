/* src/config/loader.rs */

use std::time::Duration;

use serde::{Serialize, Serializer};

use crate::resolver::{EnvReader, EnvSource, FromEnv, ParseError, resolve};

/// Environment prefix of the controller's own settings.
pub const LOADER_PREFIX: &str = "LOADER";

pub const DEFAULT_START_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_STOP_TIMEOUT: Duration = Duration::from_secs(60);

/// Settings of the bootstrap controller itself.
///
/// Read once from `LOADER_*` variables. Afterwards only the controller changes
/// `uses_fallback` and `config_error`, by publishing a new [`super::Config`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoaderConfig {
	/// The running configuration came from the fallback store.
	#[serde(rename = "loader_uses_fallback_config")]
	pub uses_fallback: bool,
	/// Operator override that disables rollback.
	#[serde(rename = "loader_ignore_fallback_config")]
	pub ignore_fallback: bool,
	/// Cause of the rejection that triggered the rollback.
	#[serde(rename = "loader_config_error", skip_serializing_if = "Option::is_none")]
	pub config_error: Option<String>,
	#[serde(rename = "loader_start_timeout", serialize_with = "as_nanos")]
	pub start_timeout: Duration,
	#[serde(rename = "loader_stop_timeout", serialize_with = "as_nanos")]
	pub stop_timeout: Duration,
}

/// Timeouts appear as integer nanoseconds in diagnostics.
fn as_nanos<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
	serializer.serialize_u64(u64::try_from(value.as_nanos()).unwrap_or(u64::MAX))
}

impl LoaderConfig {
	/// Reads the settings under [`LOADER_PREFIX`], applying timeout defaults.
	pub fn load(source: &dyn EnvSource) -> Result<Self, ParseError> {
		resolve(LOADER_PREFIX, source)
	}
}

impl Default for LoaderConfig {
	fn default() -> Self {
		Self {
			uses_fallback: false,
			ignore_fallback: false,
			config_error: None,
			start_timeout: DEFAULT_START_TIMEOUT,
			stop_timeout: DEFAULT_STOP_TIMEOUT,
		}
	}
}

impl FromEnv for LoaderConfig {
	fn from_env(env: &EnvReader<'_>) -> Result<Self, ParseError> {
		// A zero timeout counts as unset.
		let timeout = |name: &str, default: Duration| -> Result<Duration, ParseError> {
			Ok(env
				.duration(name)?
				.filter(|d| !d.is_zero())
				.unwrap_or(default))
		};

		Ok(Self {
			uses_fallback: false,
			ignore_fallback: env.bool("ignore_fallback_config")?.unwrap_or(false),
			config_error: None,
			start_timeout: timeout("start_timeout", DEFAULT_START_TIMEOUT)?,
			stop_timeout: timeout("stop_timeout", DEFAULT_STOP_TIMEOUT)?,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::resolver::MemoryEnv;

	#[test]
	fn test_defaults_when_unset() {
		let config = LoaderConfig::load(&MemoryEnv::new()).unwrap();
		assert_eq!(config, LoaderConfig::default());
		assert_eq!(config.start_timeout, Duration::from_secs(60));
	}

	#[test]
	fn test_reads_loader_namespace() {
		let env = MemoryEnv::new()
			.with("LOADER_IGNORE_FALLBACK_CONFIG", "true")
			.with("LOADER_START_TIMEOUT", "5s")
			.with("LOADER_STOP_TIMEOUT", "0");

		let config = LoaderConfig::load(&env).unwrap();
		assert!(config.ignore_fallback);
		assert!(!config.uses_fallback);
		assert_eq!(config.start_timeout, Duration::from_secs(5));
		assert_eq!(config.stop_timeout, DEFAULT_STOP_TIMEOUT);
	}

	#[test]
	fn test_malformed_timeout_is_parse_error() {
		let env = MemoryEnv::new().with("LOADER_START_TIMEOUT", "soon");
		let err = LoaderConfig::load(&env).unwrap_err();
		assert_eq!(err.key, "LOADER_START_TIMEOUT");
	}
}
