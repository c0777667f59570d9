/* src/controller/mod.rs */

//!
//! The bootstrap controller.
//!
//! - [`Bootstrap`] - resolves, builds and persists, rolling back on rejection
//! - [`AppBuilder`] - the application's construction step
//! - [`AppLoader`] - a successfully bootstrapped application

mod bootstrap;
mod error;

pub use bootstrap::{AppLoader, Bootstrap, load_app};
pub use error::{BadConfig, BootError, BuildError, Rejection};

use crate::config::ConfigHandle;
use crate::lifecycle::Lifecycle;

/// Constructs an application from a resolved configuration.
///
/// Implementations validate the fields they understand, returning
/// [`BuildError::BadConfig`] for unusable values and [`BuildError::Other`] for
/// anything else, and register their start/stop hooks on `lifecycle`.
/// Components that need configuration later should keep a clone of `config`
/// and call [`ConfigHandle::get`] at use time.
///
/// A build may run twice in one bootstrap. Resources acquired by a rejected
/// build are dropped with its `Lifecycle` before the retry.
pub trait AppBuilder<T>: Send + Sync {
	fn build(&self, config: &ConfigHandle<T>, lifecycle: &mut Lifecycle) -> Result<(), BuildError>;
}

impl<T, F> AppBuilder<T> for F
where
	F: Fn(&ConfigHandle<T>, &mut Lifecycle) -> Result<(), BuildError> + Send + Sync,
{
	fn build(&self, config: &ConfigHandle<T>, lifecycle: &mut Lifecycle) -> Result<(), BuildError> {
		self(config, lifecycle)
	}
}
