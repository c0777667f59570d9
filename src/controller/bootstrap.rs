/* src/controller/bootstrap.rs */

use std::sync::Arc;

#[cfg(feature = "logging")]
use log::{info, warn};

use super::{AppBuilder, BootError, BuildError, Rejection};
use crate::config::{AppConfig, Config, ConfigHandle, LoaderConfig};
use crate::lifecycle::{Application, Lifecycle, LifecycleError, Signal};
use crate::resolver::{EnvSource, ProcessEnv, resolve};
use crate::store::{ConfigStore, FileStore, LoadResult, StoreError};

/// Bootstrap controller for one application.
///
/// Reads the application configuration under `prefix`, builds the application
/// and records the configuration as last known-good. If the configuration does
/// not parse or the builder rejects it, the persisted record is loaded and the
/// build is retried once with it.
#[derive(Debug, Clone)]
pub struct Bootstrap<S = FileStore, E = ProcessEnv> {
	prefix: String,
	store: S,
	env: E,
}

impl Bootstrap {
	/// A controller over the process environment and the default file store.
	pub fn new(prefix: impl Into<String>) -> Self {
		Self {
			prefix: prefix.into(),
			store: FileStore::default(),
			env: ProcessEnv,
		}
	}
}

impl<S, E> Bootstrap<S, E> {
	pub fn with_store<S2>(self, store: S2) -> Bootstrap<S2, E> {
		Bootstrap {
			prefix: self.prefix,
			store,
			env: self.env,
		}
	}

	pub fn with_env<E2: EnvSource>(self, env: E2) -> Bootstrap<S, E2> {
		Bootstrap {
			prefix: self.prefix,
			store: self.store,
			env,
		}
	}

	pub fn prefix(&self) -> &str {
		&self.prefix
	}

	pub fn store(&self) -> &S {
		&self.store
	}
}

impl<S, E: EnvSource> Bootstrap<S, E> {
	/// Runs one bootstrap attempt.
	///
	/// A parse failure goes straight to rollback without reaching the builder.
	/// Rollback happens at most once and never when `LOADER_IGNORE_FALLBACK_CONFIG`
	/// is set. A configuration is persisted only when it is not the fallback.
	pub async fn load<T, B>(&self, builder: &B) -> Result<AppLoader<T>, BootError>
	where
		T: AppConfig,
		S: ConfigStore<T>,
		B: AppBuilder<T> + ?Sized,
	{
		let loader = LoaderConfig::load(&self.env).map_err(BootError::LoaderInit)?;

		let current = match resolve::<T>(&self.prefix, &self.env) {
			Ok(app) => Config::new(loader, app),
			Err(e) => {
				#[cfg(feature = "logging")]
				warn!("Current config under '{}' is malformed: {}", self.prefix, e);
				self.rollback(loader, Rejection::Parse(e)).await?
			}
		};

		let handle = ConfigHandle::new(current);
		let lifecycle = match construct(builder, &handle) {
			Ok(lifecycle) => lifecycle,
			Err(BuildError::Other(e)) => return Err(BootError::Build(e)),
			Err(BuildError::BadConfig(e)) => {
				let rejected = handle.get();
				if rejected.loader.uses_fallback {
					return Err(BootError::FallbackRejected(e));
				}

				#[cfg(feature = "logging")]
				warn!("Current config rejected: {}", e);
				let fallback = self
					.rollback(rejected.loader.clone(), Rejection::BadConfig(e))
					.await?;
				handle.publish(fallback);

				match construct(builder, &handle) {
					Ok(lifecycle) => lifecycle,
					Err(BuildError::BadConfig(e)) => return Err(BootError::FallbackRejected(e)),
					Err(BuildError::Other(e)) => return Err(BootError::Build(e)),
				}
			}
		};

		self.persist(&handle).await?;

		let snapshot = handle.get();
		let app = lifecycle.into_application(snapshot.loader.start_timeout, snapshot.loader.stop_timeout);

		#[cfg(feature = "logging")]
		info!(
			"Application built with {} config",
			if snapshot.loader.uses_fallback {
				"fallback"
			} else {
				"current"
			}
		);

		Ok(AppLoader { config: handle, app })
	}

	async fn rollback<T>(
		&self,
		mut loader: LoaderConfig,
		rejection: Rejection,
	) -> Result<Config<T>, BootError>
	where
		S: ConfigStore<T>,
	{
		if loader.ignore_fallback {
			#[cfg(feature = "logging")]
			warn!("Fallback config is ignored");
			return Err(rejection.into());
		}
		if loader.uses_fallback {
			return Err(rejection.into());
		}

		let app = match self.store.load().await {
			LoadResult::Found(app) => app,
			LoadResult::NotFound => {
				return Err(BootError::StoreUnavailable {
					rejection,
					source: StoreError::NotFound {
						path: self.store.location().into(),
					},
				});
			}
			LoadResult::Invalid(source) => {
				return Err(BootError::StoreUnavailable { rejection, source });
			}
		};

		#[cfg(feature = "logging")]
		warn!(
			"Falling back to last known good config from {}",
			self.store.location()
		);

		loader.uses_fallback = true;
		loader.config_error = Some(rejection.to_string());
		Ok(Config::new(loader, app))
	}

	async fn persist<T>(&self, handle: &ConfigHandle<T>) -> Result<(), BootError>
	where
		S: ConfigStore<T>,
	{
		let snapshot = handle.get();
		if snapshot.loader.uses_fallback {
			return Ok(());
		}

		self.store
			.save(&snapshot.app)
			.await
			.map_err(BootError::Persist)?;

		#[cfg(feature = "logging")]
		info!("Saved last known good config to {}", self.store.location());
		Ok(())
	}
}

fn construct<T, B>(builder: &B, handle: &ConfigHandle<T>) -> Result<Lifecycle, BuildError>
where
	B: AppBuilder<T> + ?Sized,
{
	let mut lifecycle = Lifecycle::new();
	builder.build(handle, &mut lifecycle)?;
	Ok(lifecycle)
}

/// Bootstraps with the process environment and the default file store.
pub async fn load_app<T, B>(prefix: &str, builder: &B) -> Result<AppLoader<T>, BootError>
where
	T: AppConfig,
	B: AppBuilder<T> + ?Sized,
{
	Bootstrap::new(prefix).load(builder).await
}

/// A bootstrapped application together with its configuration accessor.
#[derive(Debug)]
pub struct AppLoader<T> {
	config: ConfigHandle<T>,
	app: Application,
}

impl<T> AppLoader<T> {
	/// The current configuration snapshot.
	pub fn config(&self) -> Arc<Config<T>> {
		self.config.get()
	}

	/// The accessor shared with the application's components.
	pub fn handle(&self) -> ConfigHandle<T> {
		self.config.clone()
	}

	pub fn application(&self) -> &Application {
		&self.app
	}

	/// See [`Application::start`].
	pub async fn start(&self) -> Result<(), LifecycleError> {
		self.app.start().await
	}

	/// See [`Application::stop`].
	pub async fn stop(&self) -> Result<(), LifecycleError> {
		self.app.stop().await
	}

	/// See [`Application::run`].
	pub async fn run(&self) -> Result<(), LifecycleError> {
		self.app.run().await
	}

	/// Handle that marks the application as done.
	pub fn shutdown(&self) -> Signal {
		self.app.shutdown()
	}
}
