//! The document server: cache, file watch, live reload, routing and lifecycle.

pub mod cache;
pub mod lifecycle;
pub mod net;
pub mod page;
pub mod router;
pub mod sse;
pub mod state;
pub mod watcher;

pub use cache::{ContentCache, DocumentSource};
pub use lifecycle::{ServerManager, validate_document};
pub use router::{RouterState, build_router};
pub use sse::{ReloadEvent, SubscriberSet, Subscription};
pub use state::{ServerContext, Session, SessionInfo, SharedContext};
pub use watcher::{FileChange, FileWatcher, WatchBridge};
