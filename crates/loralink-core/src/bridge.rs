//! Bridge trait for the radio peripheral controller.
//!
//! The [`LinkBridge`] trait abstracts over the named-command channel to
//! the process that actually drives the LoRa hardware. A production
//! implementation forwards each method to the platform's invoke
//! primitive and surfaces the controller's two push events through
//! [`subscribe`](LinkBridge::subscribe); `MockBridge` from the
//! `loralink-test-harness` crate scripts both directions for
//! deterministic engine tests.
//!
//! Every command is a fire-and-forget request: a returned `Ok` means the
//! controller accepted the invocation, not that the link operation
//! succeeded. Actual link status arrives asynchronously as
//! [`BridgeEvent::ConnectionUpdate`].

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::error::Result;

/// Command name for establishing a connection to a named peripheral.
pub const CMD_CONNECT: &str = "lora_connect";

/// Command name for tearing down the connection.
pub const CMD_DISCONNECT: &str = "lora_disconnect";

/// Command name for querying whether a disconnect is still in progress.
pub const CMD_IS_DISCONNECTING: &str = "lora_is_disconnecting";

/// Command name for transmitting a serialized wire frame.
pub const CMD_SEND: &str = "lora_send";

/// Push-event name carrying connectivity booleans.
pub const EVENT_CONNECTION_UPDATE: &str = "lora_connection_update";

/// Push-event name carrying serialized inbound wire frames.
pub const EVENT_RECV: &str = "lora_recv";

/// An event pushed by the peripheral controller.
#[derive(Debug, Clone, PartialEq)]
pub enum BridgeEvent {
    /// The link came up (`true`) or went down (`false`). A `false` may
    /// arrive at any time, whether or not a disconnect was requested.
    ConnectionUpdate(bool),

    /// A serialized inbound wire frame, to be decoded by the codec.
    Recv(String),
}

/// Asynchronous command channel to the radio peripheral controller.
///
/// Implementations handle invocation plumbing and event delivery; the
/// engine layers protocol semantics (state machine, codec, dispatch) on
/// top of this trait.
#[async_trait]
pub trait LinkBridge: Send + Sync {
    /// Request a connection to the peripheral with the given device name.
    ///
    /// Returns once the controller accepts the request. Link
    /// confirmation arrives later as `ConnectionUpdate(true)`.
    async fn connect(&self, device: &str) -> Result<()>;

    /// Request a disconnect.
    ///
    /// Completion is confirmed by a subsequent `ConnectionUpdate(false)`.
    async fn disconnect(&self) -> Result<()>;

    /// Query whether a disconnect is currently in progress on the
    /// controller side.
    async fn is_disconnecting(&self) -> Result<bool>;

    /// Hand a serialized wire frame to the controller for transmission.
    async fn send(&self, payload: &str) -> Result<()>;

    /// Subscribe to the controller's push events.
    ///
    /// Every subscriber receives an independent copy of each event, in
    /// the order the controller emitted them.
    fn subscribe(&self) -> broadcast::Receiver<BridgeEvent>;
}
