/* src/lifecycle/mod.rs */

//!
//! Start/stop plumbing for a built application.
//!
//! A [`Lifecycle`] collects ordered [`Hook`]s while the application is being
//! constructed. It then becomes an [`Application`], whose start routine runs
//! the start hooks in order under a timeout and whose stop routine unwinds the
//! started hooks in reverse order under another.

mod app;
mod error;
mod signal;

pub use app::Application;
pub use error::{HookError, LifecycleError};
pub use signal::Signal;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

/// Boxed future returned by hooks.
pub type HookFuture = Pin<Box<dyn Future<Output = Result<(), HookError>> + Send>>;

type StartFn = Arc<dyn Fn(Signal) -> HookFuture + Send + Sync>;
type StopFn = Arc<dyn Fn() -> HookFuture + Send + Sync>;

/// A named pair of optional start and stop callbacks.
///
/// Start callbacks receive the application's cancellation [`Signal`], which
/// fires if any start hook fails. They should return once the component is
/// running; long-lived work belongs in a spawned task.
pub struct Hook {
	name: String,
	on_start: Option<StartFn>,
	on_stop: Option<StopFn>,
}

impl Hook {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			on_start: None,
			on_stop: None,
		}
	}

	pub fn on_start<F, Fut>(mut self, f: F) -> Self
	where
		F: Fn(Signal) -> Fut + Send + Sync + 'static,
		Fut: Future<Output = Result<(), HookError>> + Send + 'static,
	{
		self.on_start = Some(Arc::new(move |cancel: Signal| -> HookFuture { Box::pin(f(cancel)) }));
		self
	}

	pub fn on_stop<F, Fut>(mut self, f: F) -> Self
	where
		F: Fn() -> Fut + Send + Sync + 'static,
		Fut: Future<Output = Result<(), HookError>> + Send + 'static,
	{
		self.on_stop = Some(Arc::new(move || -> HookFuture { Box::pin(f()) }));
		self
	}

	pub fn name(&self) -> &str {
		&self.name
	}
}

impl std::fmt::Debug for Hook {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Hook")
			.field("name", &self.name)
			.field("on_start", &self.on_start.is_some())
			.field("on_stop", &self.on_stop.is_some())
			.finish()
	}
}

/// Ordered hook registry filled in by an application builder.
#[derive(Debug, Default)]
pub struct Lifecycle {
	hooks: Vec<Hook>,
}

impl Lifecycle {
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends a hook. Hooks start in insertion order and stop in reverse.
	pub fn append(&mut self, hook: Hook) {
		self.hooks.push(hook);
	}

	pub fn len(&self) -> usize {
		self.hooks.len()
	}

	pub fn is_empty(&self) -> bool {
		self.hooks.is_empty()
	}

	/// Freezes the hooks into a startable application.
	pub fn into_application(self, start_timeout: Duration, stop_timeout: Duration) -> Application {
		Application::new(self.hooks, start_timeout, stop_timeout)
	}
}
