//! LoRa time-on-air and throughput calculation.
//!
//! Pure functions over the modulation parameters. The formula follows
//! the peripheral firmware's accounting: the only rounding step is the
//! `ceil` on the payload symbol count; everything else stays in `f64`
//! until the caller formats it.

use crate::types::Modulation;

/// Symbols the radio prepends to every transmission.
pub const DEFAULT_PREAMBLE_SYMBOLS: u32 = 8;

/// The result of a time-on-air calculation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Airtime {
    /// Total channel occupancy in milliseconds (preamble + payload).
    pub total_ms: f64,
    /// Effective throughput in bits per second.
    pub throughput_bps: f64,
}

/// Duration of a single symbol in milliseconds.
///
/// `2^sf / bw` -- each spreading-factor step doubles it, wider
/// bandwidth shrinks it.
pub fn symbol_time_ms(modulation: &Modulation) -> f64 {
    let sf = modulation.spreading_factor.value() as f64;
    2f64.powf(sf) / modulation.bandwidth.khz()
}

/// Compute the time-on-air and throughput of a transmission.
///
/// `payload_bytes` is the application payload length;
/// `preamble_symbols` is normally [`DEFAULT_PREAMBLE_SYMBOLS`].
///
/// # Example
///
/// ```
/// use loralink_core::airtime::time_on_air;
/// use loralink_core::types::Modulation;
///
/// let airtime = time_on_air(&Modulation::default(), 42, 8);
/// assert!((airtime.total_ms - 3360.0).abs() < 1e-9);
/// assert!((airtime.throughput_bps - 100.0).abs() < 1e-9);
/// ```
pub fn time_on_air(modulation: &Modulation, payload_bytes: usize, preamble_symbols: u32) -> Airtime {
    let sf = modulation.spreading_factor.value() as f64;
    let cr = modulation.coding_rate.denominator() as f64;

    let symbol_time = symbol_time_ms(modulation);
    let preamble_time = (preamble_symbols as f64 + 4.25) * symbol_time;

    let payload_bits = (payload_bytes as f64) * 8.0 - 4.0 * sf + 8.0;
    let symbols = (payload_bits / 4.0 / sf).ceil() * cr + 8.0;
    let payload_time = symbols * symbol_time;

    let total_ms = preamble_time + payload_time;
    let throughput_bps = (8.0 * payload_bytes as f64 / total_ms) * 1000.0;

    Airtime {
        total_ms,
        throughput_bps,
    }
}
