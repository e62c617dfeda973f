//! Wire event types for the LoRa command link.
//!
//! The peripheral speaks a JSON tagged union with a `type` discriminant.
//! Outbound frames ([`SendEvent`]) carry commands to the radio; inbound
//! frames ([`RecvEvent`]) carry acknowledgements, link-quality reports,
//! configuration echoes, and chat messages back.
//!
//! Field shapes are fixed per tag. Deserialization goes through the
//! validated modulation types, so an out-of-domain `bw`/`sf`/`cr` from
//! the wire is a decode error, not a silently accepted value.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{Modulation, SignalQuality};

/// An outbound frame, serialized and handed to the bridge's send command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SendEvent {
    /// Bare frame with no payload; wakes the peripheral without side
    /// effects.
    #[serde(rename = "")]
    Empty,

    /// Request an over-the-air round trip; the peer answers with a
    /// `signal` report.
    #[serde(rename = "signal")]
    Signal,

    /// Ask the peripheral to echo its current configuration.
    #[serde(rename = "get-config")]
    GetConfig,

    /// Apply a new modulation configuration.
    #[serde(rename = "set-config")]
    SetConfig {
        /// Modulation to apply, flattened to `bw`/`sf`/`cr`.
        #[serde(flatten)]
        modulation: Modulation,
    },

    /// Transmit a chat message.
    #[serde(rename = "message")]
    Message {
        /// Message body.
        text: String,
    },

    /// Toggle the peripheral's display.
    #[serde(rename = "toggle-screen")]
    ToggleScreen,
}

/// An inbound frame, decoded from the bridge's receive event stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RecvEvent {
    /// The peripheral finished transmitting the last outbound frame.
    #[serde(rename = "sent")]
    Sent,

    /// A preamble was detected; a reception is starting.
    #[serde(rename = "preamble")]
    Preamble,

    /// Link-quality report for a completed round trip.
    #[serde(rename = "signal")]
    Signal {
        /// Quality measured at the receiving end.
        rx: SignalQuality,
        /// Quality measured at the transmitting end.
        tx: SignalQuality,
    },

    /// Configuration echo, sent in response to `get-config` and after a
    /// `set-config` is applied.
    #[serde(rename = "config")]
    Config {
        /// Modulation currently in effect, flattened to `bw`/`sf`/`cr`.
        #[serde(flatten)]
        modulation: Modulation,
        /// Battery level in percent (0-100).
        battery: f64,
        /// Whether the display is on.
        #[serde(rename = "screenOn")]
        screen_on: bool,
    },

    /// A chat message from a peer.
    #[serde(rename = "message")]
    Message {
        /// Sender label.
        source: String,
        /// Message body.
        text: String,
    },
}

impl RecvEvent {
    /// The kind tag of this event, used to key handler dispatch.
    pub fn kind(&self) -> RecvKind {
        match self {
            RecvEvent::Sent => RecvKind::Sent,
            RecvEvent::Preamble => RecvKind::Preamble,
            RecvEvent::Signal { .. } => RecvKind::Signal,
            RecvEvent::Config { .. } => RecvKind::Config,
            RecvEvent::Message { .. } => RecvKind::Message,
        }
    }
}

/// The kind of an inbound frame, without its payload.
///
/// Used as the key of the router's dispatch table and of one-shot
/// waiter registrations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecvKind {
    /// `sent` acknowledgement.
    Sent,
    /// `preamble` detection.
    Preamble,
    /// `signal` link-quality report.
    Signal,
    /// `config` echo.
    Config,
    /// `message` chat payload.
    Message,
}

impl fmt::Display for RecvKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RecvKind::Sent => "sent",
            RecvKind::Preamble => "preamble",
            RecvKind::Signal => "signal",
            RecvKind::Config => "config",
            RecvKind::Message => "message",
        };
        write!(f, "{s}")
    }
}
