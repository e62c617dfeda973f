//! loralink-test-harness: Test utilities and a scriptable mock bridge
//! for loralink.
//!
//! This crate provides [`MockBridge`] for deterministic testing of the
//! session engine without a real radio peripheral: invocations are
//! recorded for inspection, failures can be scripted, and inbound
//! events are pushed by the test.

pub mod mock_bridge;

pub use mock_bridge::{BridgeInvocation, MockBridge};
