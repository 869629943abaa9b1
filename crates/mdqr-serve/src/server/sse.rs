//! Live-reload channel over Server-Sent Events.
//!
//! Every open `/sse` connection owns a [`Subscription`]. The subscription's
//! sender half sits in the [`SubscriberSet`] until the connection's stream is
//! dropped, at which point it removes itself.

use axum::response::sse::Event;
use indexmap::IndexMap;
use parking_lot::Mutex;
use std::convert::Infallible;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio_stream::Stream;

/// Events buffered per subscriber. One pending reload is enough, the rest is slack.
const SUBSCRIBER_BUFFER: usize = 4;

/// Messages pushed to subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadEvent {
    /// The document changed on disk
    Reload,
}

#[derive(Default)]
struct Registry {
    handles: IndexMap<u64, mpsc::Sender<ReloadEvent>>,
    closed: bool,
}

/// Registry of open live-reload connections.
pub struct SubscriberSet {
    registry: Arc<Mutex<Registry>>,
    next_id: AtomicU64,
}

/// One subscriber's end of the channel. Dropping it unregisters the subscriber.
pub struct Subscription {
    id: u64,
    receiver: mpsc::Receiver<ReloadEvent>,
    registry: Weak<Mutex<Registry>>,
}

impl SubscriberSet {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry::default())),
            next_id: AtomicU64::new(0),
        }
    }

    /// Register a new subscriber, or `None` while the set is closed.
    pub fn subscribe(&self) -> Option<Subscription> {
        let mut registry = self.registry.lock();
        if registry.closed {
            return None;
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(SUBSCRIBER_BUFFER);
        registry.handles.insert(id, tx);
        tracing::debug!(id, open = registry.handles.len(), "live-reload subscriber connected");

        Some(Subscription {
            id,
            receiver: rx,
            registry: Arc::downgrade(&self.registry),
        })
    }

    /// Queue a reload for every open subscriber without waiting.
    ///
    /// Subscribers whose connection is gone are pruned. A subscriber with a
    /// full buffer already has a reload pending and is skipped. Returns how
    /// many subscribers were sent the event.
    pub fn broadcast_reload(&self) -> usize {
        let mut registry = self.registry.lock();
        let mut notified = 0;

        registry
            .handles
            .retain(|id, tx| match tx.try_send(ReloadEvent::Reload) {
                Ok(()) => {
                    notified += 1;
                    true
                }
                Err(TrySendError::Full(_)) => true,
                Err(TrySendError::Closed(_)) => {
                    tracing::debug!(id, "pruned closed live-reload subscriber");
                    false
                }
            });

        notified
    }

    /// End every open stream and refuse new subscribers until [`reopen`](Self::reopen).
    ///
    /// Returns the number of subscribers that were disconnected.
    pub fn close_all(&self) -> usize {
        let mut registry = self.registry.lock();
        registry.closed = true;
        let closed = registry.handles.len();
        registry.handles.clear();
        closed
    }

    /// Accept subscribers again after [`close_all`](Self::close_all).
    pub fn reopen(&self) {
        self.registry.lock().closed = false;
    }

    pub fn is_closed(&self) -> bool {
        self.registry.lock().closed
    }

    pub fn len(&self) -> usize {
        self.registry.lock().handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SubscriberSet {
    fn default() -> Self {
        Self::new()
    }
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Wait for the next event. `None` once the set has dropped this subscriber.
    pub async fn recv(&mut self) -> Option<ReloadEvent> {
        self.receiver.recv().await
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            if registry.lock().handles.shift_remove(&self.id).is_some() {
                tracing::debug!(id = self.id, "live-reload subscriber disconnected");
            }
        }
    }
}

/// SSE events for one subscriber: a `connected` comment, then one `reload`
/// event per broadcast. Ends when the subscriber is closed.
pub fn event_stream(mut subscription: Subscription) -> impl Stream<Item = Result<Event, Infallible>> {
    async_stream::stream! {
        yield Ok::<_, Infallible>(Event::default().comment("connected"));

        while let Some(event) = subscription.recv().await {
            match event {
                ReloadEvent::Reload => {
                    yield Ok(Event::default().event("reload").data("changed"));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_stream::StreamExt;

    #[test]
    fn test_subscribe_and_drop() {
        let set = SubscriberSet::new();
        let a = set.subscribe().unwrap();
        let b = set.subscribe().unwrap();
        assert_ne!(a.id(), b.id());
        assert_eq!(set.len(), 2);

        drop(a);
        assert_eq!(set.len(), 1);
        drop(b);
        assert!(set.is_empty());
    }

    #[tokio::test]
    async fn test_broadcast_reaches_every_subscriber() {
        let set = SubscriberSet::new();
        let mut a = set.subscribe().unwrap();
        let mut b = set.subscribe().unwrap();

        assert_eq!(set.broadcast_reload(), 2);
        assert_eq!(a.recv().await, Some(ReloadEvent::Reload));
        assert_eq!(b.recv().await, Some(ReloadEvent::Reload));
    }

    #[tokio::test]
    async fn test_full_subscriber_does_not_block_others() {
        let set = SubscriberSet::new();
        let _slow = set.subscribe().unwrap();
        let mut fast = set.subscribe().unwrap();

        for _ in 0..SUBSCRIBER_BUFFER {
            set.broadcast_reload();
            fast.recv().await.unwrap();
        }

        // `_slow` is full now; `fast` still gets the event.
        assert_eq!(set.broadcast_reload(), 1);
        assert_eq!(fast.recv().await, Some(ReloadEvent::Reload));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_close_all_refuses_until_reopen() {
        let set = SubscriberSet::new();
        let _a = set.subscribe().unwrap();
        let _b = set.subscribe().unwrap();

        assert_eq!(set.close_all(), 2);
        assert!(set.is_empty());
        assert!(set.is_closed());
        assert!(set.subscribe().is_none());
        assert_eq!(set.broadcast_reload(), 0);

        set.reopen();
        assert!(set.subscribe().is_some());
    }

    #[test]
    fn test_stale_drop_after_reopen_keeps_new_subscriber() {
        let set = SubscriberSet::new();
        let old = set.subscribe().unwrap();
        set.close_all();
        set.reopen();

        let _new = set.subscribe().unwrap();
        drop(old);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_drop_after_set_is_gone() {
        let set = SubscriberSet::new();
        let sub = set.subscribe().unwrap();
        drop(set);
        drop(sub);
    }

    #[tokio::test]
    async fn test_event_stream_ends_on_close() {
        let set = SubscriberSet::new();
        let stream = event_stream(set.subscribe().unwrap());
        tokio::pin!(stream);

        // connected comment
        assert!(stream.next().await.is_some());

        set.broadcast_reload();
        assert!(stream.next().await.is_some());

        set.close_all();
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_dropping_stream_unregisters() {
        let set = SubscriberSet::new();
        let stream = event_stream(set.subscribe().unwrap());
        assert_eq!(set.len(), 1);
        drop(stream);
        assert!(set.is_empty());
    }
}
