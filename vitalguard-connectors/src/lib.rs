//! Transport and alerting collaborators for the VitalGuard monitor
//!
//! ## Overview
//!
//! `vitalguard-core` produces one status line per second and, in external
//! banding mode, asks for a temperature label. This crate supplies the
//! host-side pieces around it:
//!
//! ```text
//!  ┌───────────┐  ChannelSink   ┌───────────────┐  MQTT (QoS 1, TLS)
//!  │  Monitor  │ ─────────────▶ │ MqttPublisher │ ───────────────────┐
//!  │  (core)   │ ◀───────────── │               │                    ▼
//!  └───────────┘ ChannelLabel-  └───────────────┘            ┌───────────────┐
//!                Source                                      │ MqttSubscriber│
//!                                                            └───────┬───────┘
//!                        ┌─────────────────┐   payloads              ▼
//!                        │ DashboardClient │ ◀──────────────  ┌─────────────┐
//!                        │  (HTTP /update) │                  │ AlertBridge │ ─▶ Notifier
//!                        └────────┬────────┘                  └─────────────┘
//!                                 ▼
//!                        ┌─────────────────┐
//!                        │ DashboardState  │  lamps + buzzer
//!                        └─────────────────┘
//! ```
//!
//! | Module        | Role                                             | Feature |
//! |---------------|--------------------------------------------------|---------|
//! | [`payload`]   | Lenient status payload parsing                   | always  |
//! | [`alert`]     | Duplicate suppression and alert messages         | always  |
//! | [`bridge`]    | Payload → dashboard → alert pipeline             | always  |
//! | [`dashboard`] | Display state, request routing, lamps and buzzer | always  |
//! | [`sink`]      | `StatusSink` over a tokio channel                | `std`   |
//! | [`label`]     | `LabelSource` over a tokio channel pair          | `std`   |
//! | [`mqtt`]      | Publisher and subscriber on `rumqttc`            | `mqtt`  |
//! | [`http`]      | Dashboard push on `ureq`                         | `http`  |
//!
//! ## Failure policy
//!
//! Nothing in this crate stops the pipeline on a single failure. A dropped
//! status line, an unreachable dashboard or a refused alert is logged
//! (via `log`) and counted; the next line is handled normally. Reconnects
//! back off exponentially (MQTT) or linearly (dashboard).
//!
//! ## Security
//!
//! - Broker credentials come from `VITALGUARD_MQTT_*` environment variables,
//!   never from source.
//! - TLS is on by default for MQTT.
//!
//! ## Example
//!
//! ```no_run
//! use vitalguard_connectors::{AlertBridge, AlertConfig, DashboardState, LogNotifier};
//!
//! let mut bridge = AlertBridge::new(DashboardState::new(0), LogNotifier, AlertConfig::default());
//! bridge.handle_payload(b"CRITICAL,bpm=75.0,temp=37.0,tilt=0", 0);
//! assert_eq!(bridge.stats().alerts_sent, 1);
//! ```

pub mod alert;
pub mod bridge;
pub mod dashboard;
pub mod payload;

#[cfg(feature = "std")]
pub mod label;
#[cfg(feature = "std")]
pub mod sink;

#[cfg(feature = "mqtt")]
pub mod mqtt;

#[cfg(feature = "http")]
pub mod http;

// Re-export common types
pub use alert::{AlertConfig, AlertGate, AlertMessage, LogNotifier, Notifier};
pub use bridge::{AlertBridge, BridgeOutcome, BridgeStats, DashboardPush};
pub use dashboard::{DashboardState, Lamps, Reply, Snapshot};
pub use payload::{parse_payload, StatusReport, TiltPosition};

#[cfg(feature = "std")]
pub use label::{label_channel, ChannelLabelSource, LabelEndpoint, LabelRequest};
#[cfg(feature = "std")]
pub use sink::{ChannelSink, Outbound};

#[cfg(feature = "mqtt")]
pub use mqtt::{MqttConfig, MqttError, MqttPublisher, MqttSubscriber};

#[cfg(feature = "http")]
pub use http::{DashboardClient, DashboardConfig, HttpError};

use thiserror::Error;

/// Common connector errors
#[derive(Debug, Error)]
pub enum ConnectorError {
    #[error("Not connected")]
    NotConnected,

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Async message transport
#[cfg(feature = "std")]
#[async_trait::async_trait]
pub trait AsyncConnector: Send {
    type Error;

    /// Send one payload to `topic`
    async fn send(&mut self, topic: &str, data: &[u8]) -> Result<(), Self::Error>;

    /// Check if connected
    fn is_connected(&self) -> bool;

    /// Get connection statistics
    fn stats(&self) -> ConnectionStats;
}

/// Connection statistics common to all connectors
#[derive(Debug, Default, Clone)]
pub struct ConnectionStats {
    /// Total messages sent successfully
    pub messages_sent: u64,
    /// Total messages failed to send
    pub messages_failed: u64,
    /// Total bytes sent
    pub bytes_sent: u64,
    /// Number of reconnections
    pub reconnections: u32,
    /// Last error message
    pub last_error: Option<String>,
}
