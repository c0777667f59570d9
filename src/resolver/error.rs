/* src/resolver/error.rs */

/// A recognized environment variable could not be coerced into its field type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("failed to parse {key}={value:?} as {expected}: {reason}")]
pub struct ParseError {
	/// Full environment key, e.g. `APP_SERVER_PORT`.
	pub key: String,
	/// Raw value found in the environment.
	pub value: String,
	/// Name of the target type.
	pub expected: &'static str,
	/// Underlying coercion failure.
	pub reason: String,
}

impl ParseError {
	pub fn new(
		key: impl Into<String>,
		value: impl Into<String>,
		expected: &'static str,
		reason: impl ToString,
	) -> Self {
		Self {
			key: key.into(),
			value: value.into(),
			expected,
			reason: reason.to_string(),
		}
	}
}
