/* src/lifecycle/error.rs */

use std::time::Duration;

/// Error returned by a start or stop hook.
pub type HookError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised while starting or stopping an application.
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
	#[error("start hook '{name}' failed: {source}")]
	Start { name: String, source: HookError },

	#[error("stop hook '{name}' failed: {source}")]
	Stop { name: String, source: HookError },

	#[error("application start timed out after {0:?}")]
	StartTimeout(Duration),

	#[error("application stop timed out after {0:?}")]
	StopTimeout(Duration),

	#[error("application already started")]
	AlreadyStarted,

	#[error("start routine aborted: {0}")]
	Join(#[from] tokio::task::JoinError),
}
