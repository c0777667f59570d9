/* src/resolver/mod.rs */

//!
//! Typed configuration from environment variables.
//!
//! A configuration type implements [`FromEnv`] by reading its fields through an
//! [`EnvReader`]. Coercion failures surface as [`ParseError`]; range and other
//! semantic checks belong to whoever consumes the value.

mod duration;
mod error;
mod reader;
mod source;

pub use duration::parse_duration;
pub use error::ParseError;
pub use reader::EnvReader;
pub use source::{EnvSource, MemoryEnv, ProcessEnv};

/// A configuration shape that can be read from an environment.
pub trait FromEnv: Sized {
	/// Reads every recognized field. Unset fields take the type's default.
	fn from_env(env: &EnvReader<'_>) -> Result<Self, ParseError>;
}

/// Resolves `T` from all variables under `prefix`.
///
/// This is a pure function of `source`.
pub fn resolve<T: FromEnv>(prefix: &str, source: &dyn EnvSource) -> Result<T, ParseError> {
	T::from_env(&EnvReader::new(source, prefix))
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::time::Duration;

	#[derive(Debug, Default, PartialEq)]
	struct Server {
		host: String,
		port: u16,
	}

	#[derive(Debug, Default, PartialEq)]
	struct Settings {
		server: Server,
		grace: Duration,
	}

	impl FromEnv for Server {
		fn from_env(env: &EnvReader<'_>) -> Result<Self, ParseError> {
			Ok(Self {
				host: env.string("host").unwrap_or_default(),
				port: env.parse("port")?.unwrap_or_default(),
			})
		}
	}

	impl FromEnv for Settings {
		fn from_env(env: &EnvReader<'_>) -> Result<Self, ParseError> {
			Ok(Self {
				server: env.nested("server")?,
				grace: env.duration("grace")?.unwrap_or_default(),
			})
		}
	}

	#[test]
	fn test_resolve_nested() {
		let env = MemoryEnv::from_iter([
			("APP_SERVER_HOST", "0.0.0.0"),
			("APP_SERVER_PORT", "8001"),
			("APP_GRACE", "2s"),
			("OTHER_SERVER_PORT", "1"),
		]);

		let settings: Settings = resolve("APP", &env).unwrap();
		assert_eq!(
			settings,
			Settings {
				server: Server {
					host: "0.0.0.0".into(),
					port: 8001,
				},
				grace: Duration::from_secs(2),
			}
		);
	}

	#[test]
	fn test_resolve_empty_env_uses_defaults() {
		let settings: Settings = resolve("APP", &MemoryEnv::new()).unwrap();
		assert_eq!(settings, Settings::default());
	}

	#[test]
	fn test_resolve_reports_first_malformed_field() {
		let env = MemoryEnv::from_iter([("APP_SERVER_PORT", "99999")]);
		let err = resolve::<Settings>("APP", &env).unwrap_err();
		assert_eq!(err.key, "APP_SERVER_PORT");
	}
}
