/* src/controller/error.rs */

use std::error::Error as StdError;
use std::fmt;

use thiserror::Error;

use crate::resolver::ParseError;
use crate::store::StoreError;

type BoxError = Box<dyn StdError + Send + Sync>;

/// Semantic rejection of a configuration by the application builder.
///
/// Return this when a value parses fine but is unusable, e.g. a port outside
/// the allowed range. It is the only builder error that triggers a rollback.
#[derive(Debug, Error)]
#[error("bad config: {cause}")]
pub struct BadConfig {
	#[source]
	cause: BoxError,
}

impl BadConfig {
	pub fn new(message: impl Into<String>) -> Self {
		Self {
			cause: message.into().into(),
		}
	}

	pub fn from_error(cause: impl Into<BoxError>) -> Self {
		Self {
			cause: cause.into(),
		}
	}

	/// The underlying reason, without the `bad config:` prefix.
	pub fn cause(&self) -> &(dyn StdError + Send + Sync + 'static) {
		&*self.cause
	}
}

/// Classified failure of an [`crate::controller::AppBuilder`].
#[derive(Debug, Error)]
pub enum BuildError {
	/// The configuration was rejected; a rollback may recover.
	#[error(transparent)]
	BadConfig(#[from] BadConfig),

	/// Any other construction failure; never recovered.
	#[error(transparent)]
	Other(BoxError),
}

impl BuildError {
	pub fn bad_config(message: impl Into<String>) -> Self {
		Self::BadConfig(BadConfig::new(message))
	}

	pub fn other(cause: impl Into<BoxError>) -> Self {
		Self::Other(cause.into())
	}
}

impl From<std::io::Error> for BuildError {
	fn from(e: std::io::Error) -> Self {
		Self::Other(Box::new(e))
	}
}

#[cfg(feature = "validate")]
impl From<validator::ValidationErrors> for BadConfig {
	fn from(errors: validator::ValidationErrors) -> Self {
		Self::from_error(errors)
	}
}

#[cfg(feature = "validate")]
impl From<validator::ValidationErrors> for BuildError {
	fn from(errors: validator::ValidationErrors) -> Self {
		Self::BadConfig(errors.into())
	}
}

/// The rejection that sent the controller into rollback.
#[derive(Debug)]
pub enum Rejection {
	/// The current configuration did not parse.
	Parse(ParseError),
	/// The builder rejected the current configuration.
	BadConfig(BadConfig),
}

impl fmt::Display for Rejection {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Parse(e) => write!(f, "{e}"),
			Self::BadConfig(e) => write!(f, "{e}"),
		}
	}
}

impl StdError for Rejection {
	fn source(&self) -> Option<&(dyn StdError + 'static)> {
		match self {
			Self::Parse(e) => Some(e),
			Self::BadConfig(e) => Some(e),
		}
	}
}

impl From<Rejection> for BootError {
	fn from(rejection: Rejection) -> Self {
		match rejection {
			Rejection::Parse(e) => Self::Parse(e),
			Rejection::BadConfig(e) => Self::BadConfig(e),
		}
	}
}

/// Terminal failure of a bootstrap attempt.
///
/// Each variant names the phase that failed.
#[derive(Debug, Error)]
pub enum BootError {
	#[error("failed to init loader config: {0}")]
	LoaderInit(#[source] ParseError),

	#[error("failed to load current config from env: {0}")]
	Parse(#[source] ParseError),

	#[error("failed to create app with current config: {0}")]
	BadConfig(#[source] BadConfig),

	#[error("failed to create app: {0}")]
	Build(#[source] BoxError),

	#[error("failed to load fallback config after {rejection}: {source}")]
	StoreUnavailable {
		rejection: Rejection,
		#[source]
		source: StoreError,
	},

	#[error("failed to create app with last known good config: {0}")]
	FallbackRejected(#[source] BadConfig),

	#[error("failed to save current config: {0}")]
	Persist(#[source] StoreError),
}

impl BootError {
	/// Returns true if the failure was caused by the configuration itself.
	pub fn is_config_error(&self) -> bool {
		matches!(
			self,
			Self::LoaderInit(_)
				| Self::Parse(_)
				| Self::BadConfig(_)
				| Self::StoreUnavailable { .. }
				| Self::FallbackRejected(_)
		)
	}
}
