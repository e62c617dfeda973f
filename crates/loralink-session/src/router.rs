//! Inbound event fan-out.
//!
//! The session's event loop is the single consumer of the bridge's
//! inbound stream; every decoded frame is handed to [`EventRouter::dispatch`],
//! which fans it out to:
//!
//! - **persistent handlers** -- a kind-keyed table of callbacks invoked
//!   synchronously in registration order, for long-lived consumers like
//!   the telemetry and chat logs;
//! - **one-shot waiters** -- completion slots registered for the next
//!   event of a kind, drained on the first match. Multiple waiters for
//!   the same kind all resolve from one event (broadcast, not
//!   single-consumer).
//!
//! Dispatch takes a snapshot of the handler list and drains the waiter
//! list before invoking anything, so handlers may register or remove
//! subscriptions from inside a callback without deadlocking, and a
//! registration made during dispatch only sees subsequent events.
//!
//! On connectivity loss the pending waiter set is dropped wholesale;
//! awaiting sides observe the closed channel as [`Error::LinkLost`]
//! (see [`EventRouter::once`]). Persistent handlers survive.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::oneshot;
use tracing::trace;

use loralink_core::error::{Error, Result};
use loralink_core::events::{RecvEvent, RecvKind};

type Handler = Arc<dyn Fn(&RecvEvent) + Send + Sync + 'static>;

/// Token returned by [`EventRouter::on`], used to deregister the handler
/// when its owning scope is torn down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

/// Kind-keyed dispatch table for decoded inbound events.
pub struct EventRouter {
    handlers: Mutex<HashMap<RecvKind, Vec<(u64, Handler)>>>,
    waiters: Mutex<HashMap<RecvKind, Vec<oneshot::Sender<RecvEvent>>>>,
    next_id: AtomicU64,
}

impl EventRouter {
    /// Create an empty router.
    pub fn new() -> Self {
        EventRouter {
            handlers: Mutex::new(HashMap::new()),
            waiters: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register a persistent handler for events of `kind`.
    ///
    /// Handlers for the same kind run in registration order. The handler
    /// stays registered until [`off`](EventRouter::off) is called with
    /// the returned id.
    pub fn on(
        &self,
        kind: RecvKind,
        handler: impl Fn(&RecvEvent) + Send + Sync + 'static,
    ) -> HandlerId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut handlers = self.handlers.lock().expect("handler table poisoned");
        handlers
            .entry(kind)
            .or_default()
            .push((id, Arc::new(handler)));
        HandlerId(id)
    }

    /// Deregister a persistent handler.
    ///
    /// Returns `false` if the id was already removed.
    pub fn off(&self, id: HandlerId) -> bool {
        let mut handlers = self.handlers.lock().expect("handler table poisoned");
        for entries in handlers.values_mut() {
            if let Some(index) = entries.iter().position(|(entry_id, _)| *entry_id == id.0) {
                entries.remove(index);
                return true;
            }
        }
        false
    }

    /// Register a one-shot waiter for the next event of `kind`.
    ///
    /// The returned receiver resolves with a clone of the first matching
    /// event. If the link drops first, the slot is discarded and the
    /// receiver observes a closed channel. Dropping the receiver cancels
    /// the waiter; its slot is cleaned up on the next dispatch of that
    /// kind.
    pub fn next_of(&self, kind: RecvKind) -> oneshot::Receiver<RecvEvent> {
        let (tx, rx) = oneshot::channel();
        let mut waiters = self.waiters.lock().expect("waiter table poisoned");
        waiters.entry(kind).or_default().push(tx);
        rx
    }

    /// Await the next event of `kind`.
    ///
    /// Convenience over [`next_of`](EventRouter::next_of) for callers
    /// that do not need to register before triggering a request. Fails
    /// with [`Error::LinkLost`] if connectivity drops first.
    pub async fn once(&self, kind: RecvKind) -> Result<RecvEvent> {
        self.next_of(kind).await.map_err(|_| Error::LinkLost)
    }

    /// Number of pending one-shot waiters across all kinds.
    pub fn pending_waiters(&self) -> usize {
        let waiters = self.waiters.lock().expect("waiter table poisoned");
        waiters.values().map(Vec::len).sum()
    }

    /// Fan an event out to persistent handlers and pending waiters.
    pub(crate) fn dispatch(&self, event: &RecvEvent) {
        let kind = event.kind();

        // Snapshot the handler list so callbacks can re-enter the router.
        let snapshot: Vec<Handler> = {
            let handlers = self.handlers.lock().expect("handler table poisoned");
            handlers
                .get(&kind)
                .map(|entries| entries.iter().map(|(_, h)| Arc::clone(h)).collect())
                .unwrap_or_default()
        };

        // Drain every waiter for this kind; each slot gets its own clone.
        let pending = {
            let mut waiters = self.waiters.lock().expect("waiter table poisoned");
            waiters.remove(&kind).unwrap_or_default()
        };

        trace!(
            kind = %kind,
            handlers = snapshot.len(),
            waiters = pending.len(),
            "dispatching inbound event"
        );

        for handler in &snapshot {
            handler(event);
        }

        for slot in pending {
            // A dropped receiver just means the waiter was cancelled.
            let _ = slot.send(event.clone());
        }
    }

    /// Discard every pending one-shot waiter.
    ///
    /// Called on connectivity loss: the dropped senders close the
    /// waiters' channels, which [`once`](EventRouter::once) surfaces as
    /// [`Error::LinkLost`]. Persistent handlers are not touched.
    pub(crate) fn reject_all_waiters(&self) {
        let mut waiters = self.waiters.lock().expect("waiter table poisoned");
        let dropped: usize = waiters.values().map(Vec::len).sum();
        if dropped > 0 {
            trace!(dropped, "discarding pending waiters after link loss");
        }
        waiters.clear();
    }
}

impl Default for EventRouter {
    fn default() -> Self {
        Self::new()
    }
}
