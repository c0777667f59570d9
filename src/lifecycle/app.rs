/* src/lifecycle/app.rs */

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

#[cfg(feature = "logging")]
use log::{error, info, warn};

use super::{Hook, LifecycleError, Signal};

/// A constructed application ready to be started.
///
/// Two signals drive it: `done` marks the application as finished (external
/// shutdown), `cancel` is fired when the start routine fails so that running
/// components can wind down.
pub struct Application {
	hooks: Arc<[Hook]>,
	started: Arc<AtomicUsize>,
	launched: AtomicBool,
	done: Signal,
	cancel: Signal,
	start_timeout: Duration,
	stop_timeout: Duration,
}

impl Application {
	pub(crate) fn new(hooks: Vec<Hook>, start_timeout: Duration, stop_timeout: Duration) -> Self {
		Self {
			hooks: hooks.into(),
			started: Arc::new(AtomicUsize::new(0)),
			launched: AtomicBool::new(false),
			done: Signal::new(),
			cancel: Signal::new(),
			start_timeout,
			stop_timeout,
		}
	}

	/// Runs the start hooks on a separate task and races them against the done signal.
	///
	/// Returns the start routine's error if it fails first, firing the
	/// cancellation signal. Returns `Ok` if the routine completes or if the
	/// application is marked done before it does; in that case the routine is
	/// aborted and any hook still starting is dropped. An application starts
	/// at most once.
	pub async fn start(&self) -> Result<(), LifecycleError> {
		if self.launched.swap(true, Ordering::SeqCst) {
			return Err(LifecycleError::AlreadyStarted);
		}

		let mut routine = tokio::spawn(run_start_hooks(
			self.hooks.clone(),
			self.started.clone(),
			self.cancel.clone(),
			self.start_timeout,
		));

		tokio::select! {
			joined = &mut routine => {
				let result = match joined {
					Ok(result) => result,
					Err(e) => Err(LifecycleError::Join(e)),
				};
				if let Err(_e) = &result {
					#[cfg(feature = "logging")]
					error!("Application start failed: {}", _e);
					self.cancel.trigger();
				}
				result
			}
			_ = self.done.wait() => {
				#[cfg(feature = "logging")]
				info!("Application finished before start completed");
				// Settle the started count before a stop reads it.
				routine.abort();
				let _ = routine.await;
				Ok(())
			}
		}
	}

	/// Runs the stop hooks of every started hook in reverse order, bounded by the stop timeout.
	///
	/// A timeout is reported as [`LifecycleError::StopTimeout`] instead of
	/// blocking. Every hook is attempted; the first hook failure is returned.
	pub async fn stop(&self) -> Result<(), LifecycleError> {
		let count = self.started.swap(0, Ordering::SeqCst);
		let hooks = &self.hooks[..count];

		let sequence = async {
			let mut first_error = None;
			for hook in hooks.iter().rev() {
				let Some(on_stop) = &hook.on_stop else {
					continue;
				};
				if let Err(source) = on_stop().await {
					#[cfg(feature = "logging")]
					warn!("Stop hook '{}' failed: {}", hook.name, source);
					if first_error.is_none() {
						first_error = Some(LifecycleError::Stop {
							name: hook.name.clone(),
							source,
						});
					}
				}
			}
			first_error.map_or(Ok(()), Err)
		};

		let result = match tokio::time::timeout(self.stop_timeout, sequence).await {
			Ok(result) => result,
			Err(_) => {
				#[cfg(feature = "logging")]
				error!("Application stop timed out after {:?}", self.stop_timeout);
				Err(LifecycleError::StopTimeout(self.stop_timeout))
			}
		};
		self.done.trigger();
		result
	}

	/// Starts the application, waits until it is marked done, then stops it.
	pub async fn run(&self) -> Result<(), LifecycleError> {
		match self.start().await {
			Ok(()) => {}
			Err(LifecycleError::AlreadyStarted) => return Err(LifecycleError::AlreadyStarted),
			Err(e) => {
				let _ = self.stop().await;
				return Err(e);
			}
		}
		self.done.wait().await;
		self.stop().await
	}

	/// Handle that marks the application as done when triggered.
	pub fn shutdown(&self) -> Signal {
		self.done.clone()
	}

	/// Signal fired when the start routine fails.
	pub fn cancellation(&self) -> Signal {
		self.cancel.clone()
	}

	/// Resolves once the application is marked done.
	pub async fn done(&self) {
		self.done.wait().await
	}

	pub fn start_timeout(&self) -> Duration {
		self.start_timeout
	}

	pub fn stop_timeout(&self) -> Duration {
		self.stop_timeout
	}
}

impl std::fmt::Debug for Application {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Application")
			.field("hooks", &self.hooks)
			.field("launched", &self.launched.load(Ordering::SeqCst))
			.field("started", &self.started.load(Ordering::SeqCst))
			.field("start_timeout", &self.start_timeout)
			.field("stop_timeout", &self.stop_timeout)
			.finish_non_exhaustive()
	}
}

async fn run_start_hooks(
	hooks: Arc<[Hook]>,
	started: Arc<AtomicUsize>,
	cancel: Signal,
	timeout: Duration,
) -> Result<(), LifecycleError> {
	let sequence = async {
		for hook in hooks.iter() {
			if let Some(on_start) = &hook.on_start {
				on_start(cancel.clone())
					.await
					.map_err(|source| LifecycleError::Start {
						name: hook.name.clone(),
						source,
					})?;
			}
			started.fetch_add(1, Ordering::SeqCst);
		}
		Ok::<(), LifecycleError>(())
	};

	match tokio::time::timeout(timeout, sequence).await {
		Ok(result) => result,
		Err(_) => Err(LifecycleError::StartTimeout(timeout)),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::lifecycle::{HookError, Lifecycle};
	use std::sync::Mutex;

	const SECOND: Duration = Duration::from_secs(1);

	fn recording_hook(name: &'static str, log: &Arc<Mutex<Vec<String>>>) -> Hook {
		let on_start = log.clone();
		let on_stop = log.clone();
		Hook::new(name)
			.on_start(move |_| {
				let log = on_start.clone();
				async move {
					log.lock().unwrap().push(format!("start {name}"));
					Ok(())
				}
			})
			.on_stop(move || {
				let log = on_stop.clone();
				async move {
					log.lock().unwrap().push(format!("stop {name}"));
					Ok(())
				}
			})
	}

	#[tokio::test]
	async fn test_hooks_start_in_order_and_stop_in_reverse() {
		let log = Arc::new(Mutex::new(Vec::new()));
		let mut lifecycle = Lifecycle::new();
		lifecycle.append(recording_hook("db", &log));
		lifecycle.append(recording_hook("server", &log));

		let app = lifecycle.into_application(SECOND, SECOND);
		app.start().await.unwrap();
		app.stop().await.unwrap();

		assert_eq!(
			*log.lock().unwrap(),
			vec!["start db", "start server", "stop server", "stop db"]
		);
	}

	#[tokio::test]
	async fn test_failing_start_cancels_and_reports() {
		let log = Arc::new(Mutex::new(Vec::new()));
		let mut lifecycle = Lifecycle::new();
		lifecycle.append(recording_hook("db", &log));
		lifecycle.append(
			Hook::new("server").on_start(|_| async { Err::<(), HookError>("address in use".into()) }),
		);
		lifecycle.append(recording_hook("never", &log));

		let app = lifecycle.into_application(SECOND, SECOND);
		let cancel = app.cancellation();
		let err = app.start().await.unwrap_err();

		assert!(matches!(&err, LifecycleError::Start { name, .. } if name == "server"));
		assert!(err.to_string().contains("address in use"));
		assert!(cancel.is_triggered());

		// Only the hook that actually started is unwound.
		app.stop().await.unwrap();
		assert_eq!(*log.lock().unwrap(), vec!["start db", "stop db"]);
	}

	#[tokio::test]
	async fn test_done_signal_wins_the_race() {
		let mut lifecycle = Lifecycle::new();
		lifecycle.append(Hook::new("slow").on_start(|_| async {
			tokio::time::sleep(Duration::from_secs(30)).await;
			Ok(())
		}));

		let app = lifecycle.into_application(Duration::from_secs(60), SECOND);
		let shutdown = app.shutdown();
		tokio::spawn(async move {
			tokio::time::sleep(Duration::from_millis(20)).await;
			shutdown.trigger();
		});

		tokio::time::timeout(SECOND, app.start())
			.await
			.unwrap()
			.unwrap();
		assert!(!app.cancellation().is_triggered());
	}

	#[tokio::test]
	async fn test_start_timeout() {
		let mut lifecycle = Lifecycle::new();
		lifecycle.append(Hook::new("stuck").on_start(|_| std::future::pending()));

		let app = lifecycle.into_application(Duration::from_millis(20), SECOND);
		let err = app.start().await.unwrap_err();
		assert!(matches!(err, LifecycleError::StartTimeout(_)));
		assert!(app.cancellation().is_triggered());
	}

	#[tokio::test]
	async fn test_stop_timeout_does_not_block() {
		let mut lifecycle = Lifecycle::new();
		lifecycle.append(Hook::new("stuck").on_stop(|| std::future::pending()));

		let app = lifecycle.into_application(SECOND, Duration::from_millis(20));
		app.start().await.unwrap();

		let err = tokio::time::timeout(SECOND, app.stop())
			.await
			.unwrap()
			.unwrap_err();
		assert!(matches!(err, LifecycleError::StopTimeout(_)));
	}

	#[tokio::test]
	async fn test_stop_runs_every_hook_and_returns_first_error() {
		let log = Arc::new(Mutex::new(Vec::new()));
		let mut lifecycle = Lifecycle::new();
		lifecycle.append(recording_hook("db", &log));
		lifecycle.append(
			Hook::new("cache").on_stop(|| async { Err::<(), HookError>("flush failed".into()) }),
		);

		let app = lifecycle.into_application(SECOND, SECOND);
		app.start().await.unwrap();
		let err = app.stop().await.unwrap_err();

		assert!(matches!(&err, LifecycleError::Stop { name, .. } if name == "cache"));
		assert_eq!(*log.lock().unwrap(), vec!["start db", "stop db"]);
	}

	#[tokio::test]
	async fn test_run_returns_after_shutdown() {
		let log = Arc::new(Mutex::new(Vec::new()));
		let mut lifecycle = Lifecycle::new();
		lifecycle.append(recording_hook("server", &log));

		let app = lifecycle.into_application(SECOND, SECOND);
		let shutdown = app.shutdown();
		tokio::spawn(async move {
			tokio::time::sleep(Duration::from_millis(20)).await;
			shutdown.trigger();
		});

		tokio::time::timeout(SECOND, app.run())
			.await
			.unwrap()
			.unwrap();
		assert_eq!(*log.lock().unwrap(), vec!["start server", "stop server"]);
	}

	#[tokio::test]
	async fn test_done_before_start_completes_drops_pending_hook() {
		let log = Arc::new(Mutex::new(Vec::new()));
		let on_start = log.clone();
		let on_stop = log.clone();
		let mut lifecycle = Lifecycle::new();
		lifecycle.append(
			Hook::new("slow")
				.on_start(move |_| {
					let log = on_start.clone();
					async move {
						tokio::time::sleep(Duration::from_millis(100)).await;
						log.lock().unwrap().push("start");
						Ok(())
					}
				})
				.on_stop(move || {
					let log = on_stop.clone();
					async move {
						log.lock().unwrap().push("stop");
						Ok(())
					}
				}),
		);

		let app = lifecycle.into_application(SECOND, SECOND);
		let shutdown = app.shutdown();
		tokio::spawn(async move {
			tokio::time::sleep(Duration::from_millis(10)).await;
			shutdown.trigger();
		});

		tokio::time::timeout(SECOND, app.run())
			.await
			.unwrap()
			.unwrap();
		tokio::time::sleep(Duration::from_millis(300)).await;

		// The hook never finished starting, so there is nothing to stop.
		assert!(log.lock().unwrap().is_empty());
		assert_eq!(app.started.load(Ordering::SeqCst), 0);
	}

	#[tokio::test]
	async fn test_second_start_is_rejected() {
		let log = Arc::new(Mutex::new(Vec::new()));
		let mut lifecycle = Lifecycle::new();
		lifecycle.append(recording_hook("db", &log));
		assert_eq!(lifecycle.len(), 1);

		let app = lifecycle.into_application(SECOND, SECOND);
		app.start().await.unwrap();
		assert!(matches!(app.start().await, Err(LifecycleError::AlreadyStarted)));
		assert!(matches!(app.run().await, Err(LifecycleError::AlreadyStarted)));

		app.stop().await.unwrap();
		assert_eq!(*log.lock().unwrap(), vec!["start db", "stop db"]);
	}

	#[tokio::test]
	async fn test_empty_lifecycle_starts_and_stops() {
		let lifecycle = Lifecycle::new();
		assert!(lifecycle.is_empty());

		let app = lifecycle.into_application(SECOND, SECOND);
		app.start().await.unwrap();
		app.stop().await.unwrap();
		assert!(app.shutdown().is_triggered());
	}
}
