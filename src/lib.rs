/* src/lib.rs */

//!
//! Bootstrap an application from environment configuration, rolling back to
//! the last known-good configuration when the current one is rejected.
//!
//! The crate integrates four components:
//!
//! - **resolver**: Typed configuration from environment variables.
//! - **store**: Persistence of the last known-good configuration.
//! - **lifecycle**: Ordered, timeout-bounded start/stop hooks.
//! - **controller**: The bootstrap and rollback algorithm (`Bootstrap`).
//!
//! ## Feature Flags
//!
//! - `full`: Enables all features.
//! - `resolver`, `store`, `lifecycle`: Enable the respective module on its own.
//! - `controller`: Enables `config` and `controller` (requires the three above).
//! - `validate`: Converts `validator` errors into `BadConfig`.
//! - `json`: JSON rendering of the configuration snapshot.
//! - `logging`: Emits `log` records.
//!
//! ## Basic Usage
//!
//! See `demos/echo.rs` for a complete example.

#[cfg(feature = "resolver")]
pub mod resolver;

#[cfg(feature = "store")]
pub mod store;

#[cfg(feature = "lifecycle")]
pub mod lifecycle;

#[cfg(feature = "controller")]
pub mod config;

#[cfg(feature = "controller")]
pub mod controller;
