//! Connection-state machine for the radio link.
//!
//! [`StateMachine`] is the single owner of the [`LinkState`] value; the
//! session facade drives user-initiated transitions and the event loop
//! applies connectivity updates pushed by the bridge. Everyone else
//! observes through [`subscribe`](StateMachine::subscribe).
//!
//! Connect/disconnect mutual exclusion is a condition wait: `connect()`
//! parks on the watch channel until no disconnect is outstanding,
//! instead of polling a flag at an interval. The ordering guarantee is
//! the same -- no connect request reaches the bridge while a disconnect
//! is in flight -- but waiters wake exactly when the state changes, and
//! an optional timeout can bound the wait.

use std::time::Duration;

use tokio::sync::watch;
use tracing::debug;

use loralink_core::error::{Error, Result};
use loralink_core::types::LinkState;

/// Owner of the link's [`LinkState`], with broadcast of every transition.
#[derive(Debug)]
pub struct StateMachine {
    tx: watch::Sender<LinkState>,
}

impl StateMachine {
    /// Create a state machine in [`LinkState::Disconnected`].
    pub fn new() -> Self {
        let (tx, _) = watch::channel(LinkState::Disconnected);
        StateMachine { tx }
    }

    /// The current state.
    pub fn current(&self) -> LinkState {
        *self.tx.borrow()
    }

    /// Subscribe to state transitions.
    pub fn subscribe(&self) -> watch::Receiver<LinkState> {
        self.tx.subscribe()
    }

    /// Whether a disconnect is currently outstanding.
    pub fn is_disconnecting(&self) -> bool {
        self.current() == LinkState::Disconnecting
    }

    /// Enter [`LinkState::Connecting`]. A connect request is about to be
    /// handed to the bridge.
    pub(crate) fn begin_connect(&self) {
        self.transition(LinkState::Connecting);
    }

    /// The bridge rejected the connect request; fall back to
    /// [`LinkState::Disconnected`].
    pub(crate) fn connect_failed(&self) {
        self.transition(LinkState::Disconnected);
    }

    /// Enter [`LinkState::Disconnecting`]. A disconnect request is about
    /// to be handed to the bridge.
    pub(crate) fn begin_disconnect(&self) {
        self.transition(LinkState::Disconnecting);
    }

    /// Restore a previous state after a rejected bridge invocation.
    pub(crate) fn restore(&self, state: LinkState) {
        self.transition(state);
    }

    /// Apply a connectivity update pushed by the bridge.
    ///
    /// `true` confirms the link is up; `false` means the link is down --
    /// whether because a requested disconnect completed or because the
    /// transport dropped it (forced disconnect). Both land in
    /// [`LinkState::Disconnected`], from any state.
    pub(crate) fn apply_connectivity(&self, up: bool) {
        if up {
            self.transition(LinkState::Connected);
        } else {
            self.transition(LinkState::Disconnected);
        }
    }

    /// Wait until no disconnect is outstanding.
    ///
    /// Returns immediately when the current state is anything other than
    /// [`LinkState::Disconnecting`]. With `timeout == None` the wait is
    /// unbounded: a disconnect that never completes blocks all future
    /// connects, and surfacing that is the caller's responsibility.
    pub(crate) async fn wait_until_idle(&self, timeout: Option<Duration>) -> Result<()> {
        let mut rx = self.tx.subscribe();
        let wait = rx.wait_for(|state| *state != LinkState::Disconnecting);

        match timeout {
            None => {
                // The sender lives in `self`, so the channel cannot close
                // while we are borrowing it.
                wait.await
                    .map_err(|_| Error::Transport("state channel closed".into()))?;
                Ok(())
            }
            Some(limit) => match tokio::time::timeout(limit, wait).await {
                Ok(Ok(_)) => Ok(()),
                Ok(Err(_)) => Err(Error::Transport("state channel closed".into())),
                Err(_) => Err(Error::Timeout),
            },
        }
    }

    fn transition(&self, next: LinkState) {
        self.tx.send_if_modified(|state| {
            if *state == next {
                return false;
            }
            debug!(from = %state, to = %next, "link state transition");
            *state = next;
            true
        });
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}
