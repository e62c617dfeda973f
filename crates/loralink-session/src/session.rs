//! The session facade: high-level operations over the radio link.
//!
//! [`LinkSession`] owns the connection lifecycle, the single
//! subscription to the bridge's inbound stream, and the background task
//! that decodes and dispatches every frame. Callers get request/response
//! semantics (`get_config`), fire-and-forget commands (`set_config`,
//! `ping`, `send_text`), and connectivity gating (`connect` waits for
//! any outstanding disconnect before touching the bridge).
//!
//! The session registers three built-in persistent handlers at
//! construction: `config` echoes refresh the cached [`DeviceStatus`],
//! `signal` reports append a [`SignalSample`] correlated with the
//! distance to the home reference, and `message` frames append to the
//! chat log. Additional handlers and one-shot waiters can be registered
//! through [`router`](LinkSession::router).

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use loralink_core::airtime::{self, Airtime, DEFAULT_PREAMBLE_SYMBOLS};
use loralink_core::bridge::{BridgeEvent, LinkBridge};
use loralink_core::error::{Error, Result};
use loralink_core::events::{RecvEvent, RecvKind, SendEvent};
use loralink_core::geo::{self, Coordinates};
use loralink_core::types::{ChatMessage, DeviceStatus, LinkState, Modulation, SignalSample};

use crate::codec;
use crate::log::{ChatLog, TelemetryLog};
use crate::router::EventRouter;
use crate::state::StateMachine;

/// Source label used for outbound chat entries.
const OUTBOUND_SOURCE: &str = "you";

/// Options for configuring a [`LinkSession`].
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Bound on how long `connect` waits for an outstanding disconnect
    /// to settle. `None` (the default) waits indefinitely, mirroring the
    /// peripheral protocol's lack of a disconnect deadline.
    pub disconnect_wait_timeout: Option<Duration>,

    /// Automatically request the peripheral's configuration whenever the
    /// link comes up.
    pub auto_get_config: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        SessionOptions {
            disconnect_wait_timeout: None,
            auto_get_config: true,
        }
    }
}

/// High-level session over a [`LinkBridge`].
///
/// Safe to share across tasks; operations may race each other and are
/// serialized only where the protocol demands it (the connect gate).
pub struct LinkSession {
    bridge: Arc<dyn LinkBridge>,
    state: Arc<StateMachine>,
    router: Arc<EventRouter>,
    telemetry: Arc<TelemetryLog>,
    chat: Arc<ChatLog>,
    status: Arc<Mutex<DeviceStatus>>,
    home: Arc<Mutex<Option<Coordinates>>>,
    location: Arc<Mutex<Option<Coordinates>>>,
    options: SessionOptions,
    event_task: JoinHandle<()>,
}

impl LinkSession {
    /// Create a session over the given bridge and start its event loop.
    pub fn new(bridge: Arc<dyn LinkBridge>, options: SessionOptions) -> Self {
        let state = Arc::new(StateMachine::new());
        let router = Arc::new(EventRouter::new());
        let telemetry = Arc::new(TelemetryLog::new());
        let chat = Arc::new(ChatLog::new());
        let status = Arc::new(Mutex::new(DeviceStatus::default()));
        let home: Arc<Mutex<Option<Coordinates>>> = Arc::new(Mutex::new(None));
        let location: Arc<Mutex<Option<Coordinates>>> = Arc::new(Mutex::new(None));

        // Built-in handler: config echoes refresh the cached status.
        {
            let status = Arc::clone(&status);
            router.on(RecvKind::Config, move |event| {
                if let RecvEvent::Config {
                    modulation,
                    battery,
                    screen_on,
                } = event
                {
                    let mut cached = status.lock().expect("status poisoned");
                    *cached = DeviceStatus {
                        modulation: *modulation,
                        battery: *battery,
                        screen_on: *screen_on,
                    };
                    debug!(modulation = %cached.modulation, battery = cached.battery, "config echo");
                }
            });
        }

        // Built-in handler: signal reports become telemetry samples,
        // correlated with the modulation and position known right now.
        {
            let telemetry = Arc::clone(&telemetry);
            let status = Arc::clone(&status);
            let home = Arc::clone(&home);
            let location = Arc::clone(&location);
            router.on(RecvKind::Signal, move |event| {
                if let RecvEvent::Signal { rx, tx } = event {
                    let modulation = status.lock().expect("status poisoned").modulation;
                    let distance = geo::distance_meters(
                        *location.lock().expect("location poisoned"),
                        *home.lock().expect("home poisoned"),
                    );
                    telemetry.append(SignalSample {
                        tx: *tx,
                        rx: *rx,
                        modulation,
                        distance_meters: distance,
                        captured_at: Utc::now(),
                    });
                }
            });
        }

        // Built-in handler: inbound chat messages.
        {
            let chat = Arc::clone(&chat);
            router.on(RecvKind::Message, move |event| {
                if let RecvEvent::Message { source, text } = event {
                    chat.append(ChatMessage {
                        timestamp: Utc::now(),
                        source: source.clone(),
                        text: text.clone(),
                        outbound: false,
                    });
                }
            });
        }

        let event_task = tokio::spawn(event_loop(
            bridge.subscribe(),
            Arc::clone(&bridge),
            Arc::clone(&state),
            Arc::clone(&router),
            options.auto_get_config,
        ));

        LinkSession {
            bridge,
            state,
            router,
            telemetry,
            chat,
            status,
            home,
            location,
            options,
            event_task,
        }
    }

    // -------------------------------------------------------------------
    // Link lifecycle
    // -------------------------------------------------------------------

    /// Connect to the named peripheral.
    ///
    /// Waits for any outstanding disconnect to settle first (bounded by
    /// [`SessionOptions::disconnect_wait_timeout`] when one is set), so
    /// no connect request ever reaches the bridge while a disconnect is
    /// in flight. Returns once the bridge accepts the request; link
    /// confirmation arrives later as a connectivity update.
    pub async fn connect(&self, device: &str) -> Result<()> {
        // Sync with a disconnect initiated outside this session.
        if self.bridge.is_disconnecting().await? {
            self.state.begin_disconnect();
        }

        self.state
            .wait_until_idle(self.options.disconnect_wait_timeout)
            .await?;

        self.state.begin_connect();
        debug!(device, "issuing connect");
        match self.bridge.connect(device).await {
            Ok(()) => Ok(()),
            Err(e) => {
                self.state.connect_failed();
                Err(e)
            }
        }
    }

    /// Disconnect from the peripheral.
    ///
    /// Idempotent: calling while already disconnected is a no-op
    /// success. Completion is confirmed by the bridge's connectivity
    /// update, not by this method returning.
    pub async fn disconnect(&self) -> Result<()> {
        let previous = self.state.current();
        if previous == LinkState::Disconnected {
            return Ok(());
        }

        self.state.begin_disconnect();
        debug!("issuing disconnect");
        match self.bridge.disconnect().await {
            Ok(()) => Ok(()),
            Err(e) => {
                self.state.restore(previous);
                Err(e)
            }
        }
    }

    /// The current link state.
    pub fn state(&self) -> LinkState {
        self.state.current()
    }

    /// Subscribe to link-state transitions.
    pub fn subscribe_state(&self) -> watch::Receiver<LinkState> {
        self.state.subscribe()
    }

    // -------------------------------------------------------------------
    // Commands
    // -------------------------------------------------------------------

    /// Encode and transmit an outbound event.
    ///
    /// Resolves once the frame is handed to the bridge; over-the-air
    /// confirmations (`sent`, `preamble`) arrive as separate events.
    pub async fn send_event(&self, event: &SendEvent) -> Result<()> {
        let payload = codec::encode(event)?;
        self.bridge.send(&payload).await
    }

    /// Request the peripheral's configuration and await the echo.
    ///
    /// The waiter is registered before the request is sent, so an echo
    /// cannot slip through the gap. Fails with [`Error::LinkLost`] if
    /// connectivity drops first. There is no engine-imposed deadline;
    /// bound the call with a caller-side timeout if needed.
    pub async fn get_config(&self) -> Result<DeviceStatus> {
        let waiter = self.router.next_of(RecvKind::Config);
        self.send_event(&SendEvent::GetConfig).await?;

        match waiter.await {
            Ok(RecvEvent::Config {
                modulation,
                battery,
                screen_on,
            }) => Ok(DeviceStatus {
                modulation,
                battery,
                screen_on,
            }),
            Ok(other) => Err(Error::MalformedEvent(format!(
                "expected config echo, got {other:?}"
            ))),
            Err(_) => Err(Error::LinkLost),
        }
    }

    /// Apply a new modulation configuration.
    ///
    /// Fire-and-forget: the peripheral echoes the applied configuration
    /// as a `config` event, which refreshes the cached status.
    pub async fn set_config(&self, modulation: Modulation) -> Result<()> {
        self.send_event(&SendEvent::SetConfig { modulation }).await
    }

    /// Transmit a chat message and append it to the chat log.
    pub async fn send_text(&self, text: &str) -> Result<()> {
        self.send_event(&SendEvent::Message {
            text: text.to_string(),
        })
        .await?;

        self.chat.append(ChatMessage {
            timestamp: Utc::now(),
            source: OUTBOUND_SOURCE.to_string(),
            text: text.to_string(),
            outbound: true,
        });
        Ok(())
    }

    /// Trigger an over-the-air round trip.
    ///
    /// The peer answers with a `signal` report, which the session turns
    /// into a telemetry sample. Update the current location first if the
    /// sample should carry a fresh distance.
    pub async fn ping(&self) -> Result<()> {
        self.send_event(&SendEvent::Signal).await
    }

    /// Toggle the peripheral's display.
    pub async fn toggle_screen(&self) -> Result<()> {
        self.send_event(&SendEvent::ToggleScreen).await
    }

    // -------------------------------------------------------------------
    // Observation
    // -------------------------------------------------------------------

    /// The event router, for registering additional persistent handlers
    /// or one-shot waiters.
    pub fn router(&self) -> &EventRouter {
        &self.router
    }

    /// The cached peripheral status from the most recent config echo.
    pub fn device_status(&self) -> DeviceStatus {
        *self.status.lock().expect("status poisoned")
    }

    /// The telemetry log.
    pub fn telemetry(&self) -> &TelemetryLog {
        &self.telemetry
    }

    /// The chat log.
    pub fn chat(&self) -> &ChatLog {
        &self.chat
    }

    /// Set the home reference point used for distance correlation.
    ///
    /// Owned by the surrounding geolocation collaborator; the session
    /// only reads it.
    pub fn set_home(&self, home: Option<Coordinates>) {
        *self.home.lock().expect("home poisoned") = home;
    }

    /// Set the current position used for distance correlation.
    pub fn set_location(&self, location: Option<Coordinates>) {
        *self.location.lock().expect("location poisoned") = location;
    }

    /// Distance from the current position to the home reference in
    /// meters, or `-1.0` when either is unset.
    pub fn distance_to_home(&self) -> f64 {
        geo::distance_meters(
            *self.location.lock().expect("location poisoned"),
            *self.home.lock().expect("home poisoned"),
        )
    }

    /// Initial bearing from the current position to the home reference
    /// in degrees `[0, 360)`, or `-1.0` when either is unset.
    pub fn bearing_to_home(&self) -> f64 {
        geo::bearing_degrees(
            *self.location.lock().expect("location poisoned"),
            *self.home.lock().expect("home poisoned"),
        )
    }

    /// Estimate the channel occupancy of a payload under the currently
    /// cached modulation.
    pub fn estimate_airtime(&self, payload_bytes: usize) -> Airtime {
        let modulation = self.status.lock().expect("status poisoned").modulation;
        airtime::time_on_air(&modulation, payload_bytes, DEFAULT_PREAMBLE_SYMBOLS)
    }
}

impl Drop for LinkSession {
    fn drop(&mut self) {
        self.event_task.abort();
    }
}

// ---------------------------------------------------------------------------
// Event loop
// ---------------------------------------------------------------------------

/// Background task: the sole consumer of the bridge's inbound stream.
///
/// Frames are processed strictly in arrival order; dispatch is
/// synchronous, so there is no reordering and no parallel handling of
/// frames. Malformed frames are logged and dropped without disturbing
/// pending waiters.
async fn event_loop(
    mut events: broadcast::Receiver<BridgeEvent>,
    bridge: Arc<dyn LinkBridge>,
    state: Arc<StateMachine>,
    router: Arc<EventRouter>,
    auto_get_config: bool,
) {
    loop {
        match events.recv().await {
            Ok(BridgeEvent::ConnectionUpdate(up)) => {
                debug!(up, "connectivity update");
                state.apply_connectivity(up);

                if up {
                    if auto_get_config {
                        request_config(&bridge).await;
                    }
                } else {
                    // Link is gone; nothing pending can complete.
                    router.reject_all_waiters();
                }
            }
            Ok(BridgeEvent::Recv(payload)) => match codec::decode(&payload) {
                Ok(event) => router.dispatch(&event),
                Err(e) => {
                    warn!(error = %e, payload = %payload, "dropping malformed frame");
                }
            },
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(skipped, "event loop lagged behind the bridge stream");
            }
            Err(broadcast::error::RecvError::Closed) => {
                debug!("bridge event stream closed, exiting event loop");
                break;
            }
        }
    }
}

/// Request a config echo after the link comes up.
async fn request_config(bridge: &Arc<dyn LinkBridge>) {
    match codec::encode(&SendEvent::GetConfig) {
        Ok(payload) => {
            if let Err(e) = bridge.send(&payload).await {
                warn!(error = %e, "failed to request config after connect");
            }
        }
        Err(e) => warn!(error = %e, "failed to encode config request"),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use loralink_core::types::{Bandwidth, CodingRate, SpreadingFactor};
    use loralink_test_harness::{BridgeInvocation, MockBridge};

    fn session() -> (Arc<MockBridge>, LinkSession) {
        let bridge = Arc::new(MockBridge::new());
        let session = LinkSession::new(bridge.clone(), SessionOptions::default());
        (bridge, session)
    }

    /// Give the event loop a moment to process pushed events.
    async fn settle() {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    fn config_payload() -> &'static str {
        r#"{"type":"config","bw":31.25,"sf":7,"cr":5,"battery":80,"screenOn":true}"#
    }

    #[tokio::test]
    async fn connect_issues_bridge_request() {
        let (bridge, session) = session();

        session.connect("field-radio").await.unwrap();

        assert_eq!(session.state(), LinkState::Connecting);
        assert!(bridge
            .invocations()
            .contains(&BridgeInvocation::Connect("field-radio".into())));

        // Confirmation arrives asynchronously.
        bridge.push_connection_update(true);
        settle().await;
        assert_eq!(session.state(), LinkState::Connected);
    }

    #[tokio::test]
    async fn connect_waits_for_outstanding_disconnect() {
        let (bridge, session) = session();
        let session = Arc::new(session);
        bridge.set_disconnecting(true);

        let handle = {
            let session = Arc::clone(&session);
            tokio::spawn(async move { session.connect("field-radio").await })
        };

        // Simulate a disconnect that stays in progress for a while: the
        // connect request must not reach the bridge during that window.
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(!handle.is_finished());
        assert!(!bridge
            .invocations()
            .iter()
            .any(|inv| matches!(inv, BridgeInvocation::Connect(_))));

        // The disconnect completes.
        bridge.set_disconnecting(false);
        bridge.push_connection_update(false);

        handle.await.unwrap().unwrap();
        assert!(bridge
            .invocations()
            .contains(&BridgeInvocation::Connect("field-radio".into())));

        // A follow-up connect is no longer gated.
        session.connect("field-radio").await.unwrap();
    }

    #[tokio::test]
    async fn connect_gate_timeout_is_honored_when_configured() {
        let bridge = Arc::new(MockBridge::new());
        let session = LinkSession::new(
            bridge.clone(),
            SessionOptions {
                disconnect_wait_timeout: Some(Duration::from_millis(100)),
                ..SessionOptions::default()
            },
        );
        bridge.set_disconnecting(true);

        let result = session.connect("field-radio").await;
        assert!(matches!(result, Err(Error::Timeout)));
        assert!(!bridge
            .invocations()
            .iter()
            .any(|inv| matches!(inv, BridgeInvocation::Connect(_))));
    }

    #[tokio::test]
    async fn connect_failure_falls_back_to_disconnected() {
        let (bridge, session) = session();
        bridge.fail_next_invoke("controller unavailable");

        let result = session.connect("field-radio").await;
        assert!(matches!(result, Err(Error::Transport(_))));
        assert_eq!(session.state(), LinkState::Disconnected);
    }

    #[tokio::test]
    async fn disconnect_is_idempotent_when_already_disconnected() {
        let (bridge, session) = session();

        session.disconnect().await.unwrap();

        assert!(!bridge
            .invocations()
            .contains(&BridgeInvocation::Disconnect));
        assert_eq!(session.state(), LinkState::Disconnected);
    }

    #[tokio::test]
    async fn disconnect_completes_via_connectivity_update() {
        let (bridge, session) = session();
        session.connect("field-radio").await.unwrap();
        bridge.push_connection_update(true);
        settle().await;

        session.disconnect().await.unwrap();
        assert_eq!(session.state(), LinkState::Disconnecting);
        assert!(bridge.invocations().contains(&BridgeInvocation::Disconnect));

        bridge.push_connection_update(false);
        settle().await;
        assert_eq!(session.state(), LinkState::Disconnected);
    }

    #[tokio::test]
    async fn link_up_requests_config_automatically() {
        let (bridge, _session) = session();

        bridge.push_connection_update(true);
        settle().await;

        assert!(bridge
            .sent_payloads()
            .contains(&r#"{"type":"get-config"}"#.to_string()));
    }

    #[tokio::test]
    async fn get_config_resolves_with_the_echo() {
        let (bridge, session) = session();
        let session = Arc::new(session);

        // A persistent handler registered before the call must fire
        // exactly once for the single echo.
        let config_handler_calls = Arc::new(AtomicUsize::new(0));
        {
            let calls = Arc::clone(&config_handler_calls);
            session.router().on(RecvKind::Config, move |_| {
                calls.fetch_add(1, Ordering::SeqCst);
            });
        }

        let call = {
            let session = Arc::clone(&session);
            tokio::spawn(async move { session.get_config().await })
        };

        settle().await;
        bridge.push_recv(config_payload());

        let status = call.await.unwrap().unwrap();
        assert_eq!(status.modulation.bandwidth, Bandwidth::Khz31_25);
        assert_eq!(status.modulation.spreading_factor, SpreadingFactor::new(7).unwrap());
        assert_eq!(status.modulation.coding_rate, CodingRate::new(5).unwrap());
        assert_eq!(status.battery, 80.0);
        assert!(status.screen_on);

        settle().await;
        assert_eq!(config_handler_calls.load(Ordering::SeqCst), 1);

        // The cached status was refreshed by the built-in handler.
        assert_eq!(session.device_status(), status);
    }

    #[tokio::test]
    async fn get_config_fails_with_link_lost_on_forced_disconnect() {
        let (bridge, session) = session();
        let session = Arc::new(session);

        let call = {
            let session = Arc::clone(&session);
            tokio::spawn(async move { session.get_config().await })
        };

        settle().await;
        bridge.push_connection_update(false);

        let result = call.await.unwrap();
        assert!(matches!(result, Err(Error::LinkLost)));
    }

    #[tokio::test]
    async fn forced_disconnect_rejects_every_pending_waiter() {
        let (bridge, session) = session();

        let waiters = [
            session.router().next_of(RecvKind::Config),
            session.router().next_of(RecvKind::Signal),
            session.router().next_of(RecvKind::Config),
        ];
        assert_eq!(session.router().pending_waiters(), 3);

        bridge.push_connection_update(false);
        settle().await;

        assert_eq!(session.router().pending_waiters(), 0);
        for rx in waiters {
            assert!(rx.await.is_err());
        }
    }

    #[tokio::test]
    async fn signal_report_becomes_a_telemetry_sample() {
        let (bridge, session) = session();

        session.set_home(Some(Coordinates::new(0.0, 0.0)));
        session.set_location(Some(Coordinates::new(1.0, 0.0)));

        // Establish the modulation the sample should carry.
        bridge.push_recv(config_payload());
        settle().await;

        bridge.push_recv(
            r#"{"type":"signal","rx":{"rssi":-118.0,"snr":-9.0,"ferr":-280.0},"tx":{"rssi":-120.0,"snr":-11.5,"ferr":320.0}}"#,
        );
        settle().await;

        let samples = session.telemetry().snapshot();
        assert_eq!(samples.len(), 1);
        let sample = &samples[0];
        assert_eq!(sample.rx.rssi, -118.0);
        assert_eq!(sample.tx.ferr, 320.0);
        assert_eq!(sample.modulation.bandwidth, Bandwidth::Khz31_25);

        let expected =
            loralink_core::geo::EARTH_RADIUS_METERS * std::f64::consts::PI / 180.0;
        assert!((sample.distance_meters - expected).abs() < 1e-6);
    }

    #[tokio::test]
    async fn signal_report_without_position_uses_the_sentinel() {
        let (bridge, session) = session();

        bridge.push_recv(
            r#"{"type":"signal","rx":{"rssi":-100.0,"snr":0.0,"ferr":0.0},"tx":{"rssi":-100.0,"snr":0.0,"ferr":0.0}}"#,
        );
        settle().await;

        let samples = session.telemetry().snapshot();
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].distance_meters, -1.0);
    }

    #[tokio::test]
    async fn inbound_message_appends_to_chat() {
        let (bridge, session) = session();

        bridge.push_recv(r#"{"type":"message","source":"field-node","text":"checking in"}"#);
        settle().await;

        let chat = session.chat().snapshot();
        assert_eq!(chat.len(), 1);
        assert_eq!(chat[0].source, "field-node");
        assert_eq!(chat[0].text, "checking in");
        assert!(!chat[0].outbound);
    }

    #[tokio::test]
    async fn send_text_transmits_and_appends_outbound_entry() {
        let (bridge, session) = session();

        session.send_text("anyone out there?").await.unwrap();

        let sent = bridge.sent_payloads();
        assert_eq!(sent.len(), 1);
        let value: serde_json::Value = serde_json::from_str(&sent[0]).unwrap();
        assert_eq!(value["type"], "message");
        assert_eq!(value["text"], "anyone out there?");

        let chat = session.chat().snapshot();
        assert_eq!(chat.len(), 1);
        assert_eq!(chat[0].source, "you");
        assert!(chat[0].outbound);
    }

    #[tokio::test]
    async fn send_text_does_not_append_when_the_bridge_rejects() {
        let (bridge, session) = session();
        bridge.fail_next_invoke("controller unavailable");

        let result = session.send_text("lost words").await;
        assert!(matches!(result, Err(Error::Transport(_))));
        assert!(session.chat().is_empty());
    }

    #[tokio::test]
    async fn ping_sends_a_bare_signal_frame() {
        let (bridge, session) = session();

        session.ping().await.unwrap();

        assert_eq!(bridge.sent_payloads(), vec![r#"{"type":"signal"}"#.to_string()]);
    }

    #[tokio::test]
    async fn toggle_screen_sends_the_toggle_frame() {
        let (bridge, session) = session();

        session.toggle_screen().await.unwrap();

        assert_eq!(
            bridge.sent_payloads(),
            vec![r#"{"type":"toggle-screen"}"#.to_string()]
        );
    }

    #[tokio::test]
    async fn malformed_frames_are_dropped_without_killing_the_loop() {
        let (bridge, session) = session();

        bridge.push_recv("definitely not json");
        bridge.push_recv(r#"{"type":"no-such-kind"}"#);
        bridge.push_recv(r#"{"type":"message","source":"peer","text":"still alive"}"#);
        settle().await;

        let chat = session.chat().snapshot();
        assert_eq!(chat.len(), 1);
        assert_eq!(chat[0].text, "still alive");
    }

    #[tokio::test]
    async fn estimate_airtime_uses_the_cached_modulation() {
        let (bridge, session) = session();

        // Default modulation: the 42-byte reference comes out at 3360 ms.
        let airtime = session.estimate_airtime(42);
        assert!((airtime.total_ms - 3360.0).abs() < 1e-9);

        // After a config echo the estimate follows the new modulation.
        bridge.push_recv(config_payload());
        settle().await;
        let updated = session.estimate_airtime(42);
        assert!(updated.total_ms < airtime.total_ms);
    }

    #[tokio::test]
    async fn set_config_is_fire_and_forget() {
        let (bridge, session) = session();

        session
            .set_config(Modulation {
                bandwidth: Bandwidth::Khz62_5,
                spreading_factor: SpreadingFactor::new(8).unwrap(),
                coding_rate: CodingRate::new(7).unwrap(),
            })
            .await
            .unwrap();

        let sent = bridge.sent_payloads();
        assert_eq!(sent.len(), 1);
        let value: serde_json::Value = serde_json::from_str(&sent[0]).unwrap();
        assert_eq!(value["type"], "set-config");
        assert_eq!(value["bw"], 62.5);
        assert_eq!(value["sf"], 8);
        assert_eq!(value["cr"], 7);
    }

    #[tokio::test]
    async fn bearing_and_distance_use_the_sentinel_when_unset() {
        let (_bridge, session) = session();
        assert_eq!(session.distance_to_home(), -1.0);
        assert_eq!(session.bearing_to_home(), -1.0);

        session.set_home(Some(Coordinates::new(0.0, 0.0)));
        session.set_location(Some(Coordinates::new(0.0, 1.0)));
        assert!(session.distance_to_home() > 0.0);
        let bearing = session.bearing_to_home();
        assert!((0.0..360.0).contains(&bearing));
    }

    #[tokio::test]
    async fn a_signal_waiter_observes_the_ping_round_trip() {
        let (bridge, session) = session();
        let session = Arc::new(session);

        let waiter = {
            let session = Arc::clone(&session);
            tokio::spawn(async move { session.router().once(RecvKind::Signal).await })
        };

        settle().await;
        session.ping().await.unwrap();
        bridge.push_recv(
            r#"{"type":"signal","rx":{"rssi":-90.0,"snr":3.0,"ferr":5.0},"tx":{"rssi":-92.0,"snr":2.0,"ferr":-5.0}}"#,
        );

        let event = waiter.await.unwrap().unwrap();
        match event {
            RecvEvent::Signal { rx, .. } => assert_eq!(rx.rssi, -90.0),
            other => panic!("expected Signal, got {other:?}"),
        }

        // The same event also fed the telemetry log.
        settle().await;
        assert_eq!(session.telemetry().len(), 1);
    }

    #[tokio::test]
    async fn unrelated_waiters_survive_a_config_echo() {
        let (bridge, session) = session();

        let mut signal_waiter = session.router().next_of(RecvKind::Signal);
        bridge.push_recv(config_payload());
        settle().await;

        assert!(signal_waiter.try_recv().is_err());
        assert_eq!(session.router().pending_waiters(), 1);
    }

    #[test]
    fn session_options_defaults() {
        let options = SessionOptions::default();
        assert!(options.disconnect_wait_timeout.is_none());
        assert!(options.auto_get_config);
    }
}
