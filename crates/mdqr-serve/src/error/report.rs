//! Miette diagnostic conversion for server errors.

use miette::Report;

use crate::error::{InputError, ServeError};

/// Convert ServeError to miette Report
pub fn serve_error_to_miette(err: ServeError) -> Report {
    match err {
        ServeError::Input(e) => input_error_to_miette(e),
        ServeError::Config(e) => miette::miette!("Configuration error: {}", e),
        ServeError::Bind(e) => miette::miette!("Failed to start server: {}", e),
        _ => miette::miette!("{}", err),
    }
}

fn input_error_to_miette(err: InputError) -> Report {
    match err {
        InputError::Stat { path, source } if source.kind() == std::io::ErrorKind::NotFound => {
            miette::miette!(
                "File not found: {}\n\nHint: Check the path and try again",
                path.display()
            )
        }
        _ => miette::miette!("{}", err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_missing_file_gets_hint() {
        let err = ServeError::Input(InputError::Stat {
            path: PathBuf::from("gone.md"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        });
        let report = serve_error_to_miette(err);
        assert!(report.to_string().contains("File not found: gone.md"));
    }

    #[test]
    fn test_other_errors_keep_message() {
        let report = serve_error_to_miette(ServeError::NoDocument);
        assert_eq!(report.to_string(), "No document is bound to the server");
    }
}
