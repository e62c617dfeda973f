//! Monitor link-state transitions and inbound events.
//!
//! Demonstrates subscribing to the session's state channel and event
//! router while a scripted mock bridge plays a short link session:
//! connect, config echo, a ping round trip, and an inbound chat message.
//!
//! Swap the mock for a real platform bridge to monitor live traffic.
//!
//! # Usage
//!
//! ```sh
//! cargo run -p loralink --example monitor_link
//! ```

use std::sync::Arc;
use std::time::Duration;

use loralink::{LinkSession, RecvEvent, RecvKind, SessionOptions};
use loralink_test_harness::MockBridge;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let bridge = Arc::new(MockBridge::new());
    let session = LinkSession::new(bridge.clone(), SessionOptions::default());

    // Print every state transition.
    let mut states = session.subscribe_state();
    tokio::spawn(async move {
        while states.changed().await.is_ok() {
            println!("link state -> {}", *states.borrow());
        }
    });

    // Print every inbound event kind we care about.
    for kind in [RecvKind::Sent, RecvKind::Preamble, RecvKind::Signal] {
        session.router().on(kind, move |event| {
            println!("event: {event:?}");
        });
    }
    session.router().on(RecvKind::Message, |event| {
        if let RecvEvent::Message { source, text } = event {
            println!("chat: {source}: {text}");
        }
    });

    println!("connecting...");
    session.connect("field-radio").await?;

    // -- Scripted peripheral behavior from here on. --
    bridge.push_connection_update(true);
    tokio::time::sleep(Duration::from_millis(50)).await;

    bridge.push_recv(r#"{"type":"config","bw":20.8,"sf":10,"cr":6,"battery":92,"screenOn":true}"#);
    tokio::time::sleep(Duration::from_millis(50)).await;

    let status = session.device_status();
    println!(
        "peripheral: {} battery {}%",
        status.modulation, status.battery
    );

    let airtime = session.estimate_airtime(42);
    println!(
        "42 B time-on-air: {:.0} ms ({:.0} bit/s)",
        airtime.total_ms, airtime.throughput_bps
    );

    println!("pinging...");
    session.ping().await?;
    bridge.push_recv(r#"{"type":"sent"}"#);
    bridge.push_recv(
        r#"{"type":"signal","rx":{"rssi":-118,"snr":-9,"ferr":-280},"tx":{"rssi":-120,"snr":-11.5,"ferr":320}}"#,
    );
    bridge.push_recv(r#"{"type":"message","source":"field-node","text":"good copy"}"#);
    tokio::time::sleep(Duration::from_millis(50)).await;

    for sample in session.telemetry().snapshot() {
        println!(
            "sample: rx {:.0} dBm / tx {:.0} dBm at {}",
            sample.rx.rssi, sample.tx.rssi, sample.modulation
        );
    }

    session.disconnect().await?;
    bridge.push_connection_update(false);
    tokio::time::sleep(Duration::from_millis(50)).await;

    Ok(())
}
