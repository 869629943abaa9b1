//! `mdqr serve`: run a session until Ctrl+C.

use crate::cli::ServeArgs;
use crate::config::{CliOverrides, ServeConfig};
use crate::error::Result;
use crate::server::ServerManager;
use crate::ui;
use tokio::signal;

/// Execute the serve command.
///
/// Loads configuration, starts the session, prints its URL and waits for
/// Ctrl+C (or for the server task to die) before stopping cleanly.
pub async fn execute(args: ServeArgs) -> Result<()> {
    let overrides = CliOverrides {
        host: args.host,
        port: args.port,
    };
    let config = ServeConfig::load(&overrides, args.config.as_deref())?;

    let manager = ServerManager::new(config);
    let info = manager.start(&args.file, None).await?;

    if let Some(document) = manager.document_path() {
        ui::success(&format!("Serving {}", document.display()));
    }
    ui::url("Open on your network:", &info.url);
    ui::info("Press Ctrl+C to stop");

    let mut health = tokio::time::interval(std::time::Duration::from_secs(1));
    loop {
        tokio::select! {
            result = signal::ctrl_c() => {
                if let Err(e) = result {
                    ui::warning(&format!("Could not listen for Ctrl+C: {e}"));
                }
                ui::info("Shutting down...");
                break;
            }

            _ = health.tick() => {
                if !manager.is_running() {
                    ui::warning("Server stopped unexpectedly");
                    break;
                }
            }
        }
    }

    manager.stop().await;
    Ok(())
}
