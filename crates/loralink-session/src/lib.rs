//! loralink-session: the radio-link session engine.
//!
//! This crate composes the pieces that turn a raw command bridge into a
//! usable radio session:
//!
//! - [`codec`] -- JSON wire frame encoding/decoding
//! - [`state`] -- the connection-state machine with its connect gate
//! - [`router`] -- kind-keyed fan-out of inbound events
//! - [`log`] -- append-only telemetry and chat logs
//! - [`session`] -- the [`LinkSession`] facade tying it all together
//!
//! Most applications only need [`LinkSession`] and [`SessionOptions`];
//! the submodules are public for tools that want to reuse a single
//! piece (e.g. the codec in a frame inspector).

pub mod codec;
pub mod log;
pub mod router;
pub mod session;
pub mod state;

pub use log::{ChatLog, TelemetryLog};
pub use router::{EventRouter, HandlerId};
pub use session::{LinkSession, SessionOptions};
pub use state::StateMachine;
