//! Client for the control API of a local file synchronization daemon.
//!
//! # Overview
//! The daemon answers `GET http://<listen>/api?method=<op>&...` with JSON.
//! This crate loads the listen address from the daemon's config, builds the
//! query for each operation, performs the request, and returns the decoded
//! body as `serde_json::Value`.
//!
//! # Design
//! - `SyncClient` is sans-IO: `build_*` produces an `HttpRequest`,
//!   `parse_response` consumes an `HttpResponse`.
//! - `Transport` executes requests; `UreqTransport` is the blocking default.
//! - `SyncApi` pairs the two and exposes one method per operation.
//! - No global state: the endpoint lives in a `ClientConfig` value.
//!
//! ```no_run
//! use sync_core::{ClientConfig, SyncApi};
//!
//! let config = ClientConfig::load("/etc/sync.conf")?;
//! let api = SyncApi::from_config(&config);
//! let folders = api.get_folders(None)?;
//! println!("{folders}");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod query;
pub mod transport;
pub mod types;

pub use api::SyncApi;
pub use client::SyncClient;
pub use config::{ClientConfig, Credentials, DEFAULT_TIMEOUT};
pub use error::{check_daemon_status, ApiError, ConfigError, DaemonError};
pub use http::{HttpRequest, HttpResponse};
pub use query::{Preferences, Query};
pub use transport::{Transport, UreqTransport};
