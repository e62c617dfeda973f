//! Wire frame encoding and decoding.
//!
//! The peripheral controller carries wire frames as JSON strings with a
//! `type` discriminant (see `loralink_core::events`). This module is the
//! single place where those strings are produced and consumed; all
//! encoding/decoding is pure -- no I/O is performed.
//!
//! A frame with an unrecognized tag, missing fields, or an out-of-domain
//! modulation value decodes to [`Error::MalformedEvent`]. The event loop
//! drops such frames after logging them; they must never take down the
//! dispatch path.

use loralink_core::error::{Error, Result};
use loralink_core::events::{RecvEvent, SendEvent};

/// Serialize an outbound event to its wire payload.
pub fn encode(event: &SendEvent) -> Result<String> {
    serde_json::to_string(event).map_err(|e| Error::MalformedEvent(e.to_string()))
}

/// Decode an inbound wire payload.
pub fn decode(payload: &str) -> Result<RecvEvent> {
    serde_json::from_str(payload).map_err(|e| Error::MalformedEvent(e.to_string()))
}
