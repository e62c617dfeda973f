//! loralink-core: Core traits, types, and error definitions for loralink.
//!
//! This crate defines the bridge-agnostic abstractions of the LoRa link
//! engine. Frontends and tools depend on these types without pulling in
//! the session machinery.
//!
//! # Key types
//!
//! - [`LinkBridge`] -- command channel to the peripheral controller
//! - [`SendEvent`] / [`RecvEvent`] -- the JSON-tagged wire protocol
//! - [`Modulation`] -- validated LoRa physical-layer parameters
//! - [`LinkState`] -- connection lifecycle states
//! - [`Error`] / [`Result`] -- error handling
//! - [`airtime`] / [`geo`] -- pure link-physics calculations

pub mod airtime;
pub mod bridge;
pub mod error;
pub mod events;
pub mod geo;
pub mod heading;
pub mod types;

// Re-export key types at crate root for ergonomic `use loralink_core::*`.
pub use airtime::{time_on_air, Airtime, DEFAULT_PREAMBLE_SYMBOLS};
pub use bridge::{BridgeEvent, LinkBridge};
pub use error::{Error, Result};
pub use events::{RecvEvent, RecvKind, SendEvent};
pub use geo::{bearing_degrees, distance_meters, Coordinates};
pub use types::*;
