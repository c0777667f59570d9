/* src/lifecycle/signal.rs */

use std::sync::Arc;

use tokio::sync::watch;

/// A cloneable one-shot flag that tasks can wait on.
///
/// Once triggered it stays triggered; clones share the same state.
#[derive(Debug, Clone)]
pub struct Signal {
	tx: Arc<watch::Sender<bool>>,
}

impl Signal {
	pub fn new() -> Self {
		let (tx, _) = watch::channel(false);
		Self { tx: Arc::new(tx) }
	}

	/// Fires the signal, waking every waiter.
	pub fn trigger(&self) {
		self.tx.send_replace(true);
	}

	pub fn is_triggered(&self) -> bool {
		*self.tx.borrow()
	}

	/// Resolves once the signal has fired. Returns immediately if it already has.
	pub async fn wait(&self) {
		let mut rx = self.tx.subscribe();
		// The sender lives in `self`, so the channel cannot close while we wait.
		let _ = rx.wait_for(|fired| *fired).await;
	}
}

impl Default for Signal {
	fn default() -> Self {
		Self::new()
	}
}
