//! Alert bridge
//!
//! Subscribes to status payloads and, for each one:
//!
//! 1. parses it (see [`parse_payload`](crate::payload::parse_payload)),
//! 2. forwards it to the dashboard,
//! 3. runs the alert gate and notifies on escalation.
//!
//! A dashboard or notifier failure is logged and never stops the bridge;
//! the next payload is handled normally.
//!
//! One clock drives the bridge: the timestamp given to
//! [`handle_payload`](AlertBridge::handle_payload) feeds both the alert gate
//! and the dashboard, so ages and suppression windows agree.

use vitalguard_core::Timestamp;
#[cfg(feature = "std")]
use vitalguard_core::TimeSource;

use crate::alert::{AlertConfig, AlertGate, AlertMessage, Notifier};
use crate::payload::{parse_payload, StatusReport};
use crate::ConnectorError;

/// Something that displays the latest status
pub trait DashboardPush {
    /// Show `report`, received at `now_ms` on the bridge clock
    fn push(&mut self, report: &StatusReport, now_ms: Timestamp) -> Result<(), ConnectorError>;
}

/// What happened to one payload
#[derive(Debug, Clone, PartialEq)]
pub enum BridgeOutcome {
    /// Not an actionable status
    Ignored,
    /// Parsed and forwarded
    Forwarded {
        report: StatusReport,
        /// Dashboard accepted the update
        displayed: bool,
        /// An alert was sent
        alerted: bool,
    },
}

/// Running totals
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BridgeStats {
    pub received: u64,
    pub ignored: u64,
    pub dashboard_failures: u64,
    pub alerts_sent: u64,
    pub alerts_failed: u64,
}

/// Payload → dashboard + alerts
pub struct AlertBridge<D, N> {
    dashboard: D,
    notifier: N,
    gate: AlertGate,
    stats: BridgeStats,
}

impl<D: DashboardPush, N: Notifier> AlertBridge<D, N> {
    pub fn new(dashboard: D, notifier: N, config: AlertConfig) -> Self {
        Self {
            dashboard,
            notifier,
            gate: AlertGate::new(config),
            stats: BridgeStats::default(),
        }
    }

    /// Handle one raw payload received at `now_ms`
    pub fn handle_payload(&mut self, payload: &[u8], now_ms: Timestamp) -> BridgeOutcome {
        self.stats.received += 1;

        let Some(report) = parse_payload(payload) else {
            self.stats.ignored += 1;
            let preview = &payload[..payload.len().min(80)];
            log::info!("ignored payload: {:?}", String::from_utf8_lossy(preview));
            return BridgeOutcome::Ignored;
        };

        log::info!(
            "{} bpm={:?} temp={:?} tilt={:?}",
            report.status,
            report.bpm,
            report.temp,
            report.tilt.as_ref().map(|t| t.as_str())
        );

        let displayed = match self.dashboard.push(&report, now_ms) {
            Ok(()) => true,
            Err(e) => {
                self.stats.dashboard_failures += 1;
                log::warn!("dashboard update failed: {}", e);
                false
            }
        };

        let mut alerted = false;
        if self.gate.check(report.status, now_ms) {
            let message = AlertMessage::now(&report);
            match self.notifier.notify(&message) {
                Ok(()) => {
                    self.stats.alerts_sent += 1;
                    alerted = true;
                }
                Err(e) => {
                    self.stats.alerts_failed += 1;
                    log::error!("alert delivery failed: {}", e);
                }
            }
        }

        BridgeOutcome::Forwarded {
            report,
            displayed,
            alerted,
        }
    }

    /// Handle payloads until the channel closes
    ///
    /// Every push and notification runs on the calling task. Use this only
    /// with a non-blocking dashboard and notifier, such as [`DashboardState`];
    /// a `DashboardClient` blocks on I/O and retry sleeps and belongs on
    /// [`run_blocking`](Self::run_blocking).
    ///
    /// [`DashboardState`]: crate::dashboard::DashboardState
    #[cfg(feature = "std")]
    pub async fn run<C: TimeSource>(
        &mut self,
        mut payloads: tokio::sync::mpsc::Receiver<Vec<u8>>,
        clock: &C,
    ) -> BridgeStats {
        while let Some(payload) = payloads.recv().await {
            self.handle_payload(&payload, clock.now());
        }
        log::info!("payload channel closed, bridge stopping");
        self.stats
    }

    /// Same as [`run`](Self::run) for blocking collaborators
    ///
    /// Call from a plain thread or `tokio::task::spawn_blocking`, never from
    /// inside an async task.
    #[cfg(feature = "std")]
    pub fn run_blocking<C: TimeSource>(
        &mut self,
        mut payloads: tokio::sync::mpsc::Receiver<Vec<u8>>,
        clock: &C,
    ) -> BridgeStats {
        while let Some(payload) = payloads.blocking_recv() {
            self.handle_payload(&payload, clock.now());
        }
        log::info!("payload channel closed, bridge stopping");
        self.stats
    }

    pub fn stats(&self) -> BridgeStats {
        self.stats
    }

    pub fn dashboard(&self) -> &D {
        &self.dashboard
    }

    pub fn dashboard_mut(&mut self) -> &mut D {
        &mut self.dashboard
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }
}
