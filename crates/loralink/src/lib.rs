//! # loralink -- Session Engine for LoRa Chat & Telemetry Links
//!
//! `loralink` is an asynchronous Rust library for operating a LoRa radio
//! peripheral behind a named-command bridge: connection lifecycle,
//! structured commands over a JSON wire protocol, demultiplexing of
//! asynchronous inbound events, and derived link telemetry (time-on-air,
//! signal quality, distance to a reference point).
//!
//! ## Quick Start
//!
//! Add `loralink` to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! loralink = "0.1"
//! tokio = { version = "1", features = ["full"] }
//! ```
//!
//! Connect to a peripheral and read its configuration:
//!
//! ```
//! use std::sync::Arc;
//! use loralink::{LinkSession, SessionOptions};
//! use loralink_test_harness::MockBridge;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> loralink::Result<()> {
//! // A real application passes its platform bridge here; the mock
//! // stands in for the peripheral controller.
//! let bridge = Arc::new(MockBridge::new());
//! let session = LinkSession::new(bridge.clone(), SessionOptions::default());
//!
//! session.connect("field-radio").await?;
//! // Link confirmation arrives asynchronously:
//! bridge.push_connection_update(true);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! The library is organized as a workspace of focused crates:
//!
//! | Crate                    | Purpose                                       |
//! |--------------------------|-----------------------------------------------|
//! | `loralink-core`          | [`LinkBridge`] trait, wire events, types, errors, link physics |
//! | `loralink-session`       | Codec, event router, state machine, [`LinkSession`] facade |
//! | `loralink-test-harness`  | `MockBridge` for deterministic engine tests   |
//! | **`loralink`**           | This facade crate -- re-exports everything    |
//!
//! ## The Session
//!
//! [`LinkSession`] is the central type. It owns the single subscription
//! to the bridge's inbound stream and exposes the link operations:
//!
//! - **Lifecycle**: [`connect`](LinkSession::connect) (gated against
//!   in-flight disconnects), [`disconnect`](LinkSession::disconnect)
//!   (idempotent)
//! - **Configuration**: [`get_config`](LinkSession::get_config),
//!   [`set_config`](LinkSession::set_config)
//! - **Traffic**: [`send_text`](LinkSession::send_text),
//!   [`ping`](LinkSession::ping)
//! - **Telemetry**: [`telemetry`](LinkSession::telemetry),
//!   [`estimate_airtime`](LinkSession::estimate_airtime),
//!   [`distance_to_home`](LinkSession::distance_to_home)
//!
//! ## Event Subscription
//!
//! Inbound frames fan out through the session's [`EventRouter`]:
//! persistent handlers observe every event of a kind, one-shot waiters
//! resolve on the next one:
//!
//! ```no_run
//! use loralink::{LinkSession, RecvEvent, RecvKind};
//! # async fn example(session: &LinkSession) -> loralink::Result<()> {
//! let handler = session.router().on(RecvKind::Message, |event| {
//!     if let RecvEvent::Message { source, text } = event {
//!         println!("{source}: {text}");
//!     }
//! });
//!
//! let echo = session.router().once(RecvKind::Config).await?;
//! println!("{echo:?}");
//!
//! // Deregister when the owning scope goes away.
//! session.router().off(handler);
//! # Ok(())
//! # }
//! ```

pub use loralink_core::*;
pub use loralink_session::{
    ChatLog, EventRouter, HandlerId, LinkSession, SessionOptions, StateMachine, TelemetryLog,
};

/// Wire frame encoding and decoding.
///
/// Re-exported for tools that work with raw bridge payloads (frame
/// inspectors, protocol loggers).
pub mod codec {
    pub use loralink_session::codec::{decode, encode};
}
