//! Core types used throughout loralink.
//!
//! Modulation parameters are modeled as validated types drawn from the
//! LoRa physical-layer domains. Nothing here accepts a free-form value:
//! wire payloads deserialize through the same `TryFrom` validation that
//! the constructors use, so an out-of-domain bandwidth or spreading
//! factor never makes it past the codec.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// LoRa channel bandwidth, one of the eight values the radio supports.
///
/// The wire format carries the bandwidth as a kHz float (`20.8`); values
/// are matched against the enumerated set with a small tolerance because
/// they originate from decimal literals on both ends of the link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub enum Bandwidth {
    /// 7.8 kHz.
    Khz7_8,
    /// 10.4 kHz.
    Khz10_4,
    /// 15.6 kHz.
    Khz15_6,
    /// 20.8 kHz.
    Khz20_8,
    /// 31.25 kHz.
    Khz31_25,
    /// 41.7 kHz.
    Khz41_7,
    /// 62.5 kHz.
    Khz62_5,
    /// 125 kHz.
    Khz125,
}

impl Bandwidth {
    /// All supported bandwidths, narrowest first.
    pub const ALL: [Bandwidth; 8] = [
        Bandwidth::Khz7_8,
        Bandwidth::Khz10_4,
        Bandwidth::Khz15_6,
        Bandwidth::Khz20_8,
        Bandwidth::Khz31_25,
        Bandwidth::Khz41_7,
        Bandwidth::Khz62_5,
        Bandwidth::Khz125,
    ];

    /// The bandwidth in kHz.
    pub fn khz(&self) -> f64 {
        match self {
            Bandwidth::Khz7_8 => 7.8,
            Bandwidth::Khz10_4 => 10.4,
            Bandwidth::Khz15_6 => 15.6,
            Bandwidth::Khz20_8 => 20.8,
            Bandwidth::Khz31_25 => 31.25,
            Bandwidth::Khz41_7 => 41.7,
            Bandwidth::Khz62_5 => 62.5,
            Bandwidth::Khz125 => 125.0,
        }
    }
}

impl TryFrom<f64> for Bandwidth {
    type Error = Error;

    fn try_from(khz: f64) -> Result<Self, Self::Error> {
        // Tolerance covers float drift in decimal literals (20.8 vs 20.800001).
        Bandwidth::ALL
            .into_iter()
            .find(|bw| (bw.khz() - khz).abs() < 1e-5)
            .ok_or_else(|| Error::InvalidParameter(format!("unsupported bandwidth: {khz} kHz")))
    }
}

impl From<Bandwidth> for f64 {
    fn from(bw: Bandwidth) -> f64 {
        bw.khz()
    }
}

impl fmt::Display for Bandwidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} kHz", self.khz())
    }
}

/// LoRa spreading factor, an integer in 5..=12.
///
/// Higher factors trade throughput for range: each step doubles the
/// symbol duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct SpreadingFactor(u8);

impl SpreadingFactor {
    /// The lowest supported spreading factor.
    pub const MIN: SpreadingFactor = SpreadingFactor(5);

    /// The highest supported spreading factor.
    pub const MAX: SpreadingFactor = SpreadingFactor(12);

    /// Create a spreading factor, validating the 5..=12 domain.
    pub fn new(sf: u8) -> crate::error::Result<Self> {
        SpreadingFactor::try_from(sf)
    }

    /// The raw spreading factor value.
    pub fn value(&self) -> u8 {
        self.0
    }

    /// All supported spreading factors, lowest first.
    pub fn all() -> impl Iterator<Item = SpreadingFactor> {
        (Self::MIN.0..=Self::MAX.0).map(SpreadingFactor)
    }
}

impl TryFrom<u8> for SpreadingFactor {
    type Error = Error;

    fn try_from(sf: u8) -> Result<Self, Self::Error> {
        if (Self::MIN.0..=Self::MAX.0).contains(&sf) {
            Ok(SpreadingFactor(sf))
        } else {
            Err(Error::InvalidParameter(format!(
                "spreading factor {sf} out of range 5..=12"
            )))
        }
    }
}

impl From<SpreadingFactor> for u8 {
    fn from(sf: SpreadingFactor) -> u8 {
        sf.0
    }
}

impl fmt::Display for SpreadingFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SF{}", self.0)
    }
}

/// LoRa coding rate, stored as the denominator of the 4/x ratio.
///
/// The radio accepts 4/5 through 4/8; the wire format carries just the
/// denominator (`5`..`8`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct CodingRate(u8);

impl CodingRate {
    /// Create a coding rate from its denominator, validating 5..=8.
    pub fn new(denominator: u8) -> crate::error::Result<Self> {
        CodingRate::try_from(denominator)
    }

    /// The denominator of the 4/x coding rate.
    pub fn denominator(&self) -> u8 {
        self.0
    }

    /// All supported coding rates, lowest denominator first.
    pub fn all() -> impl Iterator<Item = CodingRate> {
        (5..=8).map(CodingRate)
    }
}

impl TryFrom<u8> for CodingRate {
    type Error = Error;

    fn try_from(denominator: u8) -> Result<Self, Self::Error> {
        if (5..=8).contains(&denominator) {
            Ok(CodingRate(denominator))
        } else {
            Err(Error::InvalidParameter(format!(
                "coding rate denominator {denominator} out of range 5..=8"
            )))
        }
    }
}

impl From<CodingRate> for u8 {
    fn from(cr: CodingRate) -> u8 {
        cr.0
    }
}

impl fmt::Display for CodingRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "4/{}", self.0)
    }
}

/// A complete LoRa modulation configuration.
///
/// Serialized with the wire field names (`bw`, `sf`, `cr`) so it can be
/// flattened directly into `set-config` and `config` payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modulation {
    /// Channel bandwidth.
    #[serde(rename = "bw")]
    pub bandwidth: Bandwidth,
    /// Spreading factor.
    #[serde(rename = "sf")]
    pub spreading_factor: SpreadingFactor,
    /// Coding rate.
    #[serde(rename = "cr")]
    pub coding_rate: CodingRate,
}

impl Default for Modulation {
    /// The power-on configuration of the peripheral: 20.8 kHz, SF10, 4/6.
    fn default() -> Self {
        Modulation {
            bandwidth: Bandwidth::Khz20_8,
            spreading_factor: SpreadingFactor(10),
            coding_rate: CodingRate(6),
        }
    }
}

impl fmt::Display for Modulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.bandwidth, self.spreading_factor, self.coding_rate
        )
    }
}

/// Connection status of the radio link.
///
/// Owned exclusively by the session's state machine; everyone else
/// observes transitions through a `watch` subscription. Created in
/// [`Disconnected`](LinkState::Disconnected) at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkState {
    /// No link and no request in flight.
    #[default]
    Disconnected,
    /// A connect request has been handed to the bridge; confirmation is
    /// pending.
    Connecting,
    /// The bridge reported the link up.
    Connected,
    /// A disconnect request is outstanding.
    Disconnecting,
}

impl fmt::Display for LinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LinkState::Disconnected => "disconnected",
            LinkState::Connecting => "connecting",
            LinkState::Connected => "connected",
            LinkState::Disconnecting => "disconnecting",
        };
        write!(f, "{s}")
    }
}

/// Link-quality metrics reported for one reception.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SignalQuality {
    /// Received signal strength in dBm.
    pub rssi: f64,
    /// Signal-to-noise ratio in dB.
    pub snr: f64,
    /// Frequency error in Hz.
    pub ferr: f64,
}

/// One entry of the telemetry log: the signal quality of a completed
/// over-the-air round trip, correlated with the modulation in effect
/// and the distance to the home reference at capture time.
///
/// Immutable once appended. Serializes to the export-file record shape
/// (modulation flattened to `bw`/`sf`/`cr`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalSample {
    /// Quality measured at the transmitting end.
    pub tx: SignalQuality,
    /// Quality measured at the receiving end.
    pub rx: SignalQuality,
    /// Modulation in effect when the sample was captured.
    #[serde(flatten)]
    pub modulation: Modulation,
    /// Distance to the home reference in meters, or `-1.0` when either
    /// coordinate was unavailable.
    #[serde(rename = "distance")]
    pub distance_meters: f64,
    /// Capture timestamp.
    #[serde(rename = "capturedAt")]
    pub captured_at: DateTime<Utc>,
}

/// One entry of the chat log.
///
/// Entries are append-only; ordering is arrival order (send-call order
/// for outbound, event-arrival order for inbound).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// When the entry was appended.
    pub timestamp: DateTime<Utc>,
    /// Sender label; `"you"` for outbound entries.
    pub source: String,
    /// Message body.
    pub text: String,
    /// `true` if this host sent the message.
    pub outbound: bool,
}

/// Cached peripheral status, assembled from `config` event echoes.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DeviceStatus {
    /// Modulation the peripheral last reported.
    pub modulation: Modulation,
    /// Battery level in percent (0-100).
    pub battery: f64,
    /// Whether the peripheral's display is on.
    pub screen_on: bool,
}
