//! Shared server context: the active session plus the components that live
//! and die with it.

use crate::server::cache::ContentCache;
use crate::server::sse::SubscriberSet;
use crate::server::watcher::WatchBridge;
use mdqr_render::RenderOptions;
use parking_lot::RwLock;
use serde::Serialize;
use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// The token and document a running router answers for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: Arc<str>,
    /// Canonical absolute path of the served document
    pub document: PathBuf,
}

impl Session {
    /// Whether this session still serves `document` under `token`.
    pub fn matches(&self, document: &Path, token: &str) -> bool {
        self.document == document && &*self.token == token
    }
}

/// What `start` reports back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInfo {
    /// Full URL including the token, e.g. `http://192.168.1.5:13579/?token=..`
    pub url: String,
    pub port: u16,
    pub lan_ip: IpAddr,
    pub token: String,
}

/// State shared between the lifecycle manager, the router and the watch pump.
pub struct ServerContext {
    session: RwLock<Option<Arc<Session>>>,

    /// Rendered page for the bound document
    pub cache: ContentCache,

    /// Open live-reload connections
    pub subscribers: SubscriberSet,

    /// Filesystem watch on the bound document
    pub watch: WatchBridge,
}

/// Shared server context handle.
pub type SharedContext = Arc<ServerContext>;

impl ServerContext {
    pub fn new(render_options: RenderOptions) -> Self {
        Self {
            session: RwLock::new(None),
            cache: ContentCache::new(render_options),
            subscribers: SubscriberSet::new(),
            watch: WatchBridge::new(),
        }
    }

    /// Currently active session, if any.
    pub fn session(&self) -> Option<Arc<Session>> {
        self.session.read().clone()
    }

    pub fn set_session(&self, session: Session) {
        *self.session.write() = Some(Arc::new(session));
    }

    pub fn clear_session(&self) {
        self.session.write().take();
    }
}

impl Default for ServerContext {
    fn default() -> Self {
        Self::new(RenderOptions::default())
    }
}
