/* demos/echo.rs */

//! Echo server bootstrapped from `APP_*` variables.
//!
//! ```text
//! APP_SERVER_HOST=127.0.0.1 APP_SERVER_PORT=8080 \
//! APP_ECHO_HANDLER_RESPONSE_TIMEOUT=100ms cargo run --example echo --features full
//! ```
//!
//! Every request is answered with the current configuration as JSON. Restart
//! with `APP_SERVER_PORT=9999` to see the server come up on the previous port
//! with `loader_uses_fallback_config: true`.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use bootguard::config::ConfigHandle;
use bootguard::controller::{BuildError, load_app};
use bootguard::lifecycle::{Hook, HookError, Lifecycle, Signal};
use bootguard::resolver::{EnvReader, FromEnv, ParseError};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use validator::Validate;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct EchoHandlerConfig {
	response_timeout: Duration,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
struct ServerConfig {
	#[validate(length(min = 1, message = "server host can't be empty"))]
	host: String,
	#[validate(range(min = 8000, max = 8999, message = "server port should be between 8000 and 8999"))]
	port: u16,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct EchoConfig {
	echo_handler: EchoHandlerConfig,
	server: ServerConfig,
}

impl FromEnv for EchoConfig {
	fn from_env(env: &EnvReader<'_>) -> Result<Self, ParseError> {
		let handler = env.scope("echo_handler");
		let server = env.scope("server");
		Ok(Self {
			echo_handler: EchoHandlerConfig {
				response_timeout: handler.duration("response_timeout")?.unwrap_or_default(),
			},
			server: ServerConfig {
				host: server.string("host").unwrap_or_default(),
				port: server.parse("port")?.unwrap_or_default(),
			},
		})
	}
}

struct EchoServer {
	listener: Mutex<Option<std::net::TcpListener>>,
	task: Mutex<Option<JoinHandle<std::io::Result<()>>>>,
	config: ConfigHandle<EchoConfig>,
	stopped: Signal,
}

impl EchoServer {
	async fn start(&self, cancel: Signal) -> Result<(), HookError> {
		let listener = self
			.listener
			.lock()
			.await
			.take()
			.ok_or("echo server already started")?;
		let listener = tokio::net::TcpListener::from_std(listener)?;
		println!("Listening on {}", listener.local_addr()?);

		let router = Router::new().fallback(echo).with_state(self.config.clone());
		let stopped = self.stopped.clone();
		let task = tokio::spawn(async move {
			axum::serve(listener, router)
				.with_graceful_shutdown(async move {
					tokio::select! {
						_ = stopped.wait() => {}
						_ = cancel.wait() => {}
					}
				})
				.await
		});
		*self.task.lock().await = Some(task);
		Ok(())
	}

	async fn stop(&self) -> Result<(), HookError> {
		self.stopped.trigger();
		if let Some(task) = self.task.lock().await.take() {
			task.await??;
		}
		Ok(())
	}
}

async fn echo(State(config): State<ConfigHandle<EchoConfig>>) -> Response {
	let delay = config.get().app.echo_handler.response_timeout;
	tokio::time::sleep(delay).await;

	match config.to_json() {
		Ok(body) => ([(header::CONTENT_TYPE, "application/json")], body).into_response(),
		Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
	}
}

fn build_echo(config: &ConfigHandle<EchoConfig>, lifecycle: &mut Lifecycle) -> Result<(), BuildError> {
	let snapshot = config.get();
	snapshot.app.server.validate()?;

	let addr = format!("{}:{}", snapshot.app.server.host, snapshot.app.server.port);
	let listener = std::net::TcpListener::bind(&addr)?;
	listener.set_nonblocking(true)?;

	let server = Arc::new(EchoServer {
		listener: Mutex::new(Some(listener)),
		task: Mutex::new(None),
		config: config.clone(),
		stopped: Signal::new(),
	});

	let on_start = server.clone();
	lifecycle.append(
		Hook::new("echo-server")
			.on_start(move |cancel| {
				let server = on_start.clone();
				async move { server.start(cancel).await }
			})
			.on_stop(move || {
				let server = server.clone();
				async move { server.stop().await }
			}),
	);
	Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let loader = load_app::<EchoConfig, _>("APP", &build_echo).await?;

	let config = loader.config();
	if config.loader.uses_fallback {
		println!(
			"Running on last known good config: {}",
			config.loader.config_error.as_deref().unwrap_or("unknown cause")
		);
	}

	let shutdown = loader.shutdown();
	tokio::spawn(async move {
		if tokio::signal::ctrl_c().await.is_ok() {
			shutdown.trigger();
		}
	});

	loader.run().await?;
	println!("Done.");
	Ok(())
}
