//! Process-scoped device-heading state.
//!
//! The compass heading is sampled by an orientation collaborator outside
//! the engine and read by anything that wants to render or log it. The
//! single-writer rule is enforced by construction: [`channel`] hands out
//! exactly one [`HeadingWriter`]; readers are cheap to clone and only
//! ever observe.

use tokio::sync::watch;

/// Create a heading channel. The reading starts as `None` until the
/// first sample arrives.
pub fn channel() -> (HeadingWriter, HeadingReader) {
    let (tx, rx) = watch::channel(None);
    (HeadingWriter { tx }, HeadingReader { rx })
}

/// The single writing end of a heading channel, owned by the
/// orientation sampler.
#[derive(Debug)]
pub struct HeadingWriter {
    tx: watch::Sender<Option<f64>>,
}

impl HeadingWriter {
    /// Publish a new heading sample in degrees.
    ///
    /// The value is normalized into `[0, 360)` before publication.
    pub fn update(&self, heading_degrees: f64) {
        let normalized = heading_degrees - (heading_degrees / 360.0).floor() * 360.0;
        let _ = self.tx.send(Some(normalized));
    }

    /// Obtain an additional reader for this channel.
    pub fn reader(&self) -> HeadingReader {
        HeadingReader {
            rx: self.tx.subscribe(),
        }
    }
}

/// A read-only view of the heading state.
#[derive(Debug, Clone)]
pub struct HeadingReader {
    rx: watch::Receiver<Option<f64>>,
}

impl HeadingReader {
    /// The most recent heading in degrees, or `None` if no sample has
    /// been published yet.
    pub fn current(&self) -> Option<f64> {
        *self.rx.borrow()
    }

    /// Wait until the heading changes.
    ///
    /// Returns `Err` once the writer has been dropped.
    pub async fn changed(&mut self) -> Result<(), watch::error::RecvError> {
        self.rx.changed().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_without_a_sample() {
        let (_writer, reader) = channel();
        assert_eq!(reader.current(), None);
    }

    #[test]
    fn update_normalizes_into_range() {
        let (writer, reader) = channel();

        writer.update(90.0);
        assert_eq!(reader.current(), Some(90.0));

        writer.update(370.0);
        assert_eq!(reader.current(), Some(10.0));

        writer.update(-45.0);
        assert_eq!(reader.current(), Some(315.0));

        writer.update(-720.0);
        assert_eq!(reader.current(), Some(0.0));
    }

    #[test]
    fn multiple_readers_observe_the_same_writer() {
        let (writer, reader_a) = channel();
        let reader_b = writer.reader();

        writer.update(123.0);
        assert_eq!(reader_a.current(), Some(123.0));
        assert_eq!(reader_b.current(), Some(123.0));
    }

    #[tokio::test]
    async fn changed_wakes_on_update() {
        let (writer, mut reader) = channel();

        let waiter = tokio::spawn(async move {
            reader.changed().await.unwrap();
            reader.current()
        });

        writer.update(42.0);
        assert_eq!(waiter.await.unwrap(), Some(42.0));
    }
}
