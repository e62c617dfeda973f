//! Error types for loralink.
//!
//! All fallible operations across the library return [`Result<T>`], which
//! uses [`Error`] as the error type. Bridge-layer, wire-layer, and
//! link-layer errors are all captured here.

/// The error type for all loralink operations.
///
/// Variants cover the failure modes encountered when driving a LoRa
/// peripheral through a command bridge: rejected bridge invocations,
/// undecodable wire frames, link drops while a response is pending, and
/// out-of-domain modulation parameters.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A bridge invocation was rejected (serial port gone, peripheral
    /// controller unavailable, OS-level failure).
    ///
    /// Surfaced verbatim to the caller of the operation that triggered
    /// it; the engine never retries on its own.
    #[error("transport error: {0}")]
    Transport(String),

    /// A wire payload could not be decoded (unknown tag, missing fields,
    /// value outside its enumerated domain) or encoded.
    ///
    /// Inbound decode failures are logged and the frame dropped; they
    /// never fail a pending waiter or crash the event loop.
    #[error("malformed event: {0}")]
    MalformedEvent(String),

    /// The link dropped while a response was still pending.
    ///
    /// Raised only for the specific waiters that were outstanding when
    /// the connectivity loss was reported.
    #[error("link lost while awaiting response")]
    LinkLost,

    /// An invalid parameter was passed to an engine operation
    /// (e.g. a spreading factor outside 5..=12).
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Timed out waiting for an in-flight disconnect to settle.
    ///
    /// Only raised when a gate timeout is configured; the default wait
    /// is unbounded.
    #[error("timeout waiting for disconnect to settle")]
    Timeout,
}

/// A convenience `Result` alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_transport() {
        let e = Error::Transport("controller unavailable".into());
        assert_eq!(e.to_string(), "transport error: controller unavailable");
    }

    #[test]
    fn error_display_malformed_event() {
        let e = Error::MalformedEvent("unknown tag `boop`".into());
        assert_eq!(e.to_string(), "malformed event: unknown tag `boop`");
    }

    #[test]
    fn error_display_link_lost() {
        let e = Error::LinkLost;
        assert_eq!(e.to_string(), "link lost while awaiting response");
    }

    #[test]
    fn error_display_invalid_parameter() {
        let e = Error::InvalidParameter("spreading factor 13 out of range".into());
        assert_eq!(
            e.to_string(),
            "invalid parameter: spreading factor 13 out of range"
        );
    }

    #[test]
    fn error_display_timeout() {
        let e = Error::Timeout;
        assert_eq!(e.to_string(), "timeout waiting for disconnect to settle");
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}
        assert_send::<Error>();
        assert_sync::<Error>();
    }

    #[test]
    fn error_implements_std_error() {
        fn assert_std_error<T: std::error::Error>() {}
        assert_std_error::<Error>();
    }

    #[test]
    fn result_alias_works() {
        let ok: Result<u32> = Ok(42);
        assert!(matches!(ok, Ok(42)));

        let err: Result<u32> = Err(Error::LinkLost);
        assert!(err.is_err());
    }
}
