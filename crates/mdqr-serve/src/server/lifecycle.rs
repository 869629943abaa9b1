//! Owns the server context and moves it between stopped and serving.
//!
//! `start` and `stop` are serialized; a restart tears the old session down
//! completely before the new one is built. Teardown runs in a fixed order:
//! live-reload subscribers, listening socket, file watch, cache, session.

use crate::auth;
use crate::config::ServeConfig;
use crate::error::{InputError, Result, ServeError};
use crate::server::cache::DocumentSource;
use crate::server::net::{self, MAX_PORT_ATTEMPTS};
use crate::server::router::{RouterState, build_router};
use crate::server::state::{ServerContext, Session, SessionInfo, SharedContext};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

struct RunningServer {
    info: SessionInfo,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

/// Serves at most one document at a time.
pub struct ServerManager {
    config: ServeConfig,
    ctx: SharedContext,
    transition: tokio::sync::Mutex<()>,
    running: parking_lot::Mutex<Option<RunningServer>>,
}

impl ServerManager {
    pub fn new(config: ServeConfig) -> Self {
        Self {
            config,
            ctx: Arc::new(ServerContext::default()),
            transition: tokio::sync::Mutex::new(()),
            running: parking_lot::Mutex::new(None),
        }
    }

    /// Start serving `path`, replacing the active session if there is one.
    ///
    /// The path is validated before anything changes. Binding starts at
    /// `preferred_port` (or the configured port) and moves up on conflicts.
    ///
    /// # Errors
    ///
    /// [`InputError`] for an unusable path, a render error if the document
    /// cannot be rendered, [`BindError`](crate::error::BindError) when no port
    /// can be bound. On error no session remains active.
    pub async fn start(&self, path: impl AsRef<Path>, preferred_port: Option<u16>) -> Result<SessionInfo> {
        let document = validate_document(path.as_ref())?;

        let _transition = self.transition.lock().await;
        self.teardown().await;

        match self.launch(document, preferred_port).await {
            Ok(info) => Ok(info),
            Err(e) => {
                self.teardown().await;
                Err(e)
            }
        }
    }

    /// Stop serving. Does nothing when already stopped.
    pub async fn stop(&self) {
        let _transition = self.transition.lock().await;
        self.teardown().await;
    }

    /// Whether a listener is bound and its server task is still alive.
    pub fn is_running(&self) -> bool {
        self.running
            .lock()
            .as_ref()
            .is_some_and(|running| !running.task.is_finished())
    }

    pub fn session(&self) -> Option<SessionInfo> {
        self.running.lock().as_ref().map(|running| running.info.clone())
    }

    pub fn document_path(&self) -> Option<PathBuf> {
        self.ctx.session().map(|session| session.document.clone())
    }

    pub fn context(&self) -> &SharedContext {
        &self.ctx
    }

    async fn launch(&self, document: PathBuf, preferred_port: Option<u16>) -> Result<SessionInfo> {
        let token: Arc<str> = Arc::from(auth::issue()?);

        self.ctx.subscribers.reopen();
        self.ctx.cache.bind(DocumentSource {
            path: document.clone(),
            token: Arc::clone(&token),
        });

        // Render once up front so a broken document fails `start`.
        let ctx = Arc::clone(&self.ctx);
        tokio::task::spawn_blocking(move || ctx.cache.get())
            .await
            .map_err(|e| ServeError::Server(e.to_string()))??;

        let weak_ctx = Arc::downgrade(&self.ctx);
        self.ctx.watch.watch(&document, self.config.debounce(), move || {
            let Some(ctx) = weak_ctx.upgrade() else {
                return;
            };
            ctx.cache.invalidate();
            let notified = ctx.subscribers.broadcast_reload();
            tracing::info!(notified, "document changed, reload sent");
        })?;

        let first_port = preferred_port.unwrap_or(self.config.port);
        let (listener, port) = net::bind_with_retry(self.config.host, first_port, MAX_PORT_ATTEMPTS).await?;

        let lan_ip = if self.config.host.is_unspecified() {
            net::lan_ip(&self.config.preferred_interfaces)
        } else {
            self.config.host
        };

        let session = Session {
            token: Arc::clone(&token),
            document: document.clone(),
        };
        self.ctx.set_session(session.clone());

        let app = build_router(RouterState {
            ctx: Arc::clone(&self.ctx),
            session: Arc::new(session),
            keep_alive: self.config.keep_alive(),
        });

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(async move {
            let server = axum::serve(listener, app).with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            });
            if let Err(e) = server.await {
                tracing::error!(error = %e, "server stopped with error");
            }
        });

        let info = SessionInfo {
            url: format!("http://{}/?token={}", SocketAddr::new(lan_ip, port), token),
            port,
            lan_ip,
            token: token.to_string(),
        };

        tracing::info!(port, %lan_ip, document = %document.display(), "serving document");
        *self.running.lock() = Some(RunningServer {
            info: info.clone(),
            shutdown: shutdown_tx,
            task,
        });

        Ok(info)
    }

    async fn teardown(&self) {
        let disconnected = self.ctx.subscribers.close_all();

        let running = self.running.lock().take();
        if let Some(mut running) = running {
            let _ = running.shutdown.send(());

            if tokio::time::timeout(self.config.shutdown_timeout(), &mut running.task)
                .await
                .is_err()
            {
                tracing::warn!(
                    port = running.info.port,
                    "connections still open after grace period, aborting server"
                );
                running.task.abort();
                let _ = running.task.await;
            }

            tracing::info!(port = running.info.port, disconnected, "server stopped");
        }

        self.ctx.watch.unwatch();
        self.ctx.cache.reset();
        self.ctx.clear_session();
    }
}

impl Drop for ServerManager {
    fn drop(&mut self) {
        if let Some(running) = self.running.get_mut().take() {
            running.task.abort();
        }
        self.ctx.subscribers.close_all();
        self.ctx.watch.unwatch();
    }
}

/// Check that `path` names an existing markdown file and canonicalize it.
pub fn validate_document(path: &Path) -> std::result::Result<PathBuf, InputError> {
    if path.to_str().is_some_and(|s| s.trim().is_empty()) {
        return Err(InputError::EmptyPath);
    }

    let is_markdown = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("md"));
    if !is_markdown {
        return Err(InputError::NotMarkdown(path.to_path_buf()));
    }

    let stat_error = |source| InputError::Stat {
        path: path.to_path_buf(),
        source,
    };

    let metadata = std::fs::metadata(path).map_err(stat_error)?;
    if !metadata.is_file() {
        return Err(InputError::NotAFile(path.to_path_buf()));
    }

    path.canonicalize().map_err(stat_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_validate_accepts_markdown_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("Notes.MD");
        std::fs::write(&path, "# hi").unwrap();

        let canonical = validate_document(&path).unwrap();
        assert!(canonical.is_absolute());
        assert_eq!(canonical, path.canonicalize().unwrap());
    }

    #[test]
    fn test_validate_rejects_empty_path() {
        assert!(matches!(validate_document(Path::new("")), Err(InputError::EmptyPath)));
        assert!(matches!(validate_document(Path::new("  ")), Err(InputError::EmptyPath)));
    }

    #[test]
    fn test_validate_rejects_other_extensions() {
        let temp = TempDir::new().unwrap();
        for name in ["notes.txt", "notes.markdown", "notes"] {
            let path = temp.path().join(name);
            std::fs::write(&path, "# hi").unwrap();
            assert!(matches!(validate_document(&path), Err(InputError::NotMarkdown(_))), "{name}");
        }
    }

    #[test]
    fn test_validate_rejects_missing_file() {
        let temp = TempDir::new().unwrap();
        let err = validate_document(&temp.path().join("missing.md")).unwrap_err();
        assert!(matches!(err, InputError::Stat { .. }));
    }

    #[test]
    fn test_validate_rejects_directory() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("folder.md");
        std::fs::create_dir(&dir).unwrap();
        assert!(matches!(validate_document(&dir), Err(InputError::NotAFile(_))));
    }

    #[tokio::test]
    async fn test_stop_without_start() {
        let manager = ServerManager::new(ServeConfig::default());
        manager.stop().await;
        manager.stop().await;
        assert!(!manager.is_running());
        assert!(manager.session().is_none());
        assert!(manager.document_path().is_none());
    }
}
