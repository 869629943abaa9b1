//! Error handling for the mdqr server.
//!
//! Errors are grouped by where they surface:
//! - **Top-level errors** (`ServeError`) are what the lifecycle manager and
//!   commands return
//! - **Domain-specific errors** (`InputError`, `BindError`, `ConfigError`)
//!   carry the detail and a hint for the user
//! - **Request-level outcomes** (`AuthFailure`) never leave the router; they
//!   become a `403` and a log line
//!
//! # Example
//!
//! ```rust,no_run
//! use mdqr_serve::error::{Result, ResultExt};
//! use std::path::Path;
//!
//! fn read_source(path: &Path) -> Result<String> {
//!     std::fs::read_to_string(path).with_path(path)
//! }
//! ```

mod report;

use std::path::PathBuf;
use thiserror::Error;

pub use report::serve_error_to_miette;

/// Top-level server error type.
#[derive(Debug, Error)]
pub enum ServeError {
    /// The requested document was rejected before any state changed
    #[error("Invalid input: {0}")]
    Input(#[from] InputError),

    /// No listening socket could be opened
    #[error("Failed to start server: {0}")]
    Bind(#[from] BindError),

    /// Markdown could not be rendered
    #[error("Render error: {0}")]
    Render(#[from] mdqr_render::RenderError),

    /// Configuration-related errors (file not found, invalid values)
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The source document could not be read
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File or directory not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// File watching errors
    #[error("File watcher error: {0}")]
    Watch(#[from] notify::Error),

    /// The OS random source failed while issuing a session token
    #[error("Failed to generate session token: {0}")]
    Token(String),

    /// I/O errors from file system operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Server task errors
    #[error("Server error: {0}")]
    Server(String),

    /// The content cache was read with no document bound
    #[error("No document is bound to the server")]
    NoDocument,

    /// Generic errors with custom messages
    #[error("{0}")]
    Custom(String),
}

/// Reasons a document path is refused by `start`.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("No file path given\n\nHint: Pass the markdown file to serve, e.g. 'mdqr serve notes.md'")]
    EmptyPath,

    #[error("Not a markdown file: {}\n\nHint: Only files with a .md extension can be served", .0.display())]
    NotMarkdown(PathBuf),

    #[error("Not a regular file: {}\n\nHint: Point mdqr at a single markdown file, not a directory", .0.display())]
    NotAFile(PathBuf),

    #[error("Cannot access {}: {source}", .path.display())]
    Stat {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Listen socket errors.
#[derive(Debug, Error)]
pub enum BindError {
    /// Every port in the attempted range was already taken
    #[error("No free port between {first} and {last}\n\nHint: Stop whatever holds these ports or pass --port")]
    PortsExhausted { first: u16, last: u16 },

    /// Binding failed for a reason other than the port being in use
    #[error("Failed to bind port {port}: {source}")]
    Io {
        port: u16,
        #[source]
        source: std::io::Error,
    },
}

/// Configuration-specific errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file doesn't exist at the given location
    #[error("Config file not found: {}\n\nHint: Create a mdqr.config.json file or drop --config", .0.display())]
    NotFound(PathBuf),

    /// Invalid value for a configuration option
    #[error("Invalid value for '{field}': {value}\n\nHint: {hint}")]
    InvalidValue {
        /// Name of the field with invalid value
        field: String,
        /// The invalid value
        value: String,
        /// Helpful hint for correct values
        hint: String,
    },
}

/// Why a request was refused by token authorization.
///
/// The reason is logged; the client only ever sees `403 Forbidden`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthFailure {
    /// No token (or an empty one) was supplied
    #[error("missing")]
    Missing,
    /// A token was supplied but does not match the session token
    #[error("invalid")]
    Invalid,
}

impl AuthFailure {
    /// Short reason code for log fields.
    pub fn reason(self) -> &'static str {
        match self {
            AuthFailure::Missing => "missing",
            AuthFailure::Invalid => "invalid",
        }
    }
}

/// Result type alias using `ServeError` as the default error type.
pub type Result<T, E = ServeError> = std::result::Result<T, E>;

/// Extension trait for adding context to `Result` types.
pub trait ResultExt<T> {
    /// Turn a not-found I/O error into [`ServeError::FileNotFound`] for `path`.
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T>;

    /// Prefix the error message.
    fn context(self, msg: impl std::fmt::Display) -> Result<T>;
}

impl<T, E: Into<ServeError>> ResultExt<T> for std::result::Result<T, E> {
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T> {
        self.map_err(|e| {
            let err: ServeError = e.into();
            match err {
                ServeError::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound => {
                    ServeError::FileNotFound(path.as_ref().to_path_buf())
                }
                ServeError::Io(source) => ServeError::Read {
                    path: path.as_ref().to_path_buf(),
                    source,
                },
                other => other,
            }
        })
    }

    fn context(self, msg: impl std::fmt::Display) -> Result<T> {
        self.map_err(|e| {
            let err: ServeError = e.into();
            ServeError::Custom(format!("{}: {}", msg, err))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_error_not_markdown() {
        let err = InputError::NotMarkdown(PathBuf::from("notes.txt"));
        let msg = err.to_string();
        assert!(msg.contains("Not a markdown file"));
        assert!(msg.contains("notes.txt"));
        assert!(msg.contains("Hint:"));
    }

    #[test]
    fn test_bind_error_ports_exhausted() {
        let err = BindError::PortsExhausted {
            first: 13579,
            last: 13588,
        };
        let msg = err.to_string();
        assert!(msg.contains("13579"));
        assert!(msg.contains("13588"));
        assert!(msg.contains("--port"));
    }

    #[test]
    fn test_serve_error_from_input_error() {
        let err: ServeError = InputError::EmptyPath.into();
        assert!(matches!(err, ServeError::Input(InputError::EmptyPath)));
    }

    #[test]
    fn test_serve_error_from_bind_error() {
        let err: ServeError = BindError::PortsExhausted { first: 1, last: 2 }.into();
        assert!(matches!(err, ServeError::Bind(_)));
    }

    #[test]
    fn test_auth_failure_reason() {
        assert_eq!(AuthFailure::Missing.reason(), "missing");
        assert_eq!(AuthFailure::Invalid.reason(), "invalid");
        assert_eq!(AuthFailure::Invalid.to_string(), "invalid");
    }

    #[test]
    fn test_result_ext_with_path_not_found() {
        let result: std::io::Result<()> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "file not found",
        ));

        let err = result.with_path("/docs/notes.md").unwrap_err();
        assert!(matches!(err, ServeError::FileNotFound(_)));
    }

    #[test]
    fn test_result_ext_with_path_other_io() {
        let result: std::io::Result<()> = Err(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));

        let err = result.with_path("/docs/notes.md").unwrap_err();
        assert!(matches!(err, ServeError::Read { .. }));
        assert!(err.to_string().contains("/docs/notes.md"));
    }

    #[test]
    fn test_result_ext_context() {
        let result: std::result::Result<(), InputError> = Err(InputError::EmptyPath);

        let err = result.context("Failed to start session").unwrap_err();
        assert!(err.to_string().starts_with("Failed to start session: "));
    }

    #[test]
    fn test_config_error_invalid_value() {
        let err = ConfigError::InvalidValue {
            field: "keepAliveSecs".to_string(),
            value: "0".to_string(),
            hint: "Must be at least 1".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Invalid value for 'keepAliveSecs'"));
        assert!(msg.contains("Must be at least 1"));
    }
}
