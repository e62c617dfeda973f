//! Exchange chat messages over a scripted link.
//!
//! Shows the chat flow end to end: outbound messages via
//! `send_text`, inbound messages from the event stream, and the
//! resulting append-only chat history.
//!
//! # Usage
//!
//! ```sh
//! cargo run -p loralink --example chat_session
//! ```

use std::sync::Arc;
use std::time::Duration;

use loralink::{LinkSession, SessionOptions};
use loralink_test_harness::MockBridge;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let bridge = Arc::new(MockBridge::new());
    let session = LinkSession::new(bridge.clone(), SessionOptions::default());

    session.connect("field-radio").await?;
    bridge.push_connection_update(true);
    tokio::time::sleep(Duration::from_millis(50)).await;

    session.send_text("anyone out there?").await?;

    // The peer answers.
    bridge.push_recv(r#"{"type":"message","source":"field-node","text":"loud and clear"}"#);
    tokio::time::sleep(Duration::from_millis(50)).await;

    session.send_text("heading home, see you at the ridge").await?;
    tokio::time::sleep(Duration::from_millis(50)).await;

    println!("chat history:");
    for message in session.chat().snapshot() {
        let direction = if message.outbound { ">>" } else { "<<" };
        println!(
            "  {} [{}] {}: {}",
            direction,
            message.timestamp.format("%H:%M:%S"),
            message.source,
            message.text
        );
    }

    session.disconnect().await?;
    bridge.push_connection_update(false);
    Ok(())
}
