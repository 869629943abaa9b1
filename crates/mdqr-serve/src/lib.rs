//! mdqr - serve one markdown document to your local network.
//!
//! A session renders a single markdown file to sanitized HTML, serves it over
//! HTTP behind a per-session token, and tells open pages to reload when the
//! file changes on disk.
//!
//! # Architecture
//!
//! - [`auth`] - Session tokens: issue, extract from a request, verify
//! - [`server`] - Content cache, file watch, live reload, router and lifecycle
//! - [`config`] - Layered configuration (defaults, file, environment, CLI)
//! - [`error`] - Error types with actionable messages
//! - [`logger`] - Structured logging with tracing
//! - [`ui`] - Terminal status lines
//! - `cli` / `commands` - The `mdqr` binary's arguments and subcommands
//!
//! Rendering itself lives in the `mdqr_render` crate.
//!
//! # Example
//!
//! ```rust,no_run
//! use mdqr_serve::{ServeConfig, ServerManager};
//!
//! # async fn run() -> mdqr_serve::Result<()> {
//! let manager = ServerManager::new(ServeConfig::default());
//! let info = manager.start("README.md", None).await?;
//! println!("open {}", info.url);
//! manager.stop().await;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logger;
pub mod server;
pub mod ui;

pub use config::ServeConfig;
pub use error::{AuthFailure, BindError, ConfigError, InputError, Result, ResultExt, ServeError};
pub use server::{ServerManager, SessionInfo};
