//! Append-only telemetry and chat logs.
//!
//! Both logs are mutated solely by the session's event-loop dispatch
//! (`signal` events append telemetry, `message` events and successful
//! sends append chat entries). Readers take immutable snapshots;
//! already-appended entries are never modified, so append atomicity is
//! the only synchronization required.

use std::sync::Mutex;

use loralink_core::error::{Error, Result};
use loralink_core::types::{ChatMessage, SignalSample};

/// Time-ordered log of captured [`SignalSample`]s.
#[derive(Debug, Default)]
pub struct TelemetryLog {
    samples: Mutex<Vec<SignalSample>>,
}

impl TelemetryLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sample. Samples are immutable once appended.
    pub fn append(&self, sample: SignalSample) {
        self.samples.lock().expect("telemetry log poisoned").push(sample);
    }

    /// An immutable snapshot of the log at this instant.
    pub fn snapshot(&self) -> Vec<SignalSample> {
        self.samples.lock().expect("telemetry log poisoned").clone()
    }

    /// Number of samples currently held.
    pub fn len(&self) -> usize {
        self.samples.lock().expect("telemetry log poisoned").len()
    }

    /// Whether the log is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Take every sample out of the log, leaving it empty.
    ///
    /// Used by the export path, which clears captured data once it has
    /// been written out.
    pub fn drain(&self) -> Vec<SignalSample> {
        std::mem::take(&mut *self.samples.lock().expect("telemetry log poisoned"))
    }

    /// Serialize a snapshot to the export-file shape: a JSON array of
    /// sample records.
    ///
    /// Writing the file is the caller's concern; this only produces the
    /// content.
    pub fn export_json(&self) -> Result<String> {
        serde_json::to_string(&self.snapshot()).map_err(|e| Error::MalformedEvent(e.to_string()))
    }
}

/// Append-only chat history.
#[derive(Debug, Default)]
pub struct ChatLog {
    messages: Mutex<Vec<ChatMessage>>,
}

impl ChatLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry in arrival order.
    pub fn append(&self, message: ChatMessage) {
        self.messages.lock().expect("chat log poisoned").push(message);
    }

    /// An immutable snapshot of the history at this instant.
    pub fn snapshot(&self) -> Vec<ChatMessage> {
        self.messages.lock().expect("chat log poisoned").clone()
    }

    /// Number of entries currently held.
    pub fn len(&self) -> usize {
        self.messages.lock().expect("chat log poisoned").len()
    }

    /// Whether the history is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
