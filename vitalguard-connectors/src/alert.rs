//! Alert gate and messages
//!
//! Caregivers are alerted when a patient enters WARNING or CRITICAL. The
//! same level is not repeated within the suppression window; any
//! non-alerting status resets the gate so the next escalation alerts at
//! once.
//!
//! ```text
//! status   N  W  W  W ... W  N  W  C  C
//! alert       ✓  ·  ·     ✓     ✓  ✓  ·
//!             |<-- 60 s -->|
//! ```

use std::time::Duration;

use vitalguard_core::{Band, Timestamp};

use crate::payload::StatusReport;
use crate::ConnectorError;

/// Default duplicate-suppression window
pub const DEFAULT_SUPPRESS: Duration = Duration::from_secs(60);

/// Which levels alert and how often
#[derive(Debug, Clone, PartialEq)]
pub struct AlertConfig {
    /// Levels that trigger an alert
    pub levels: Vec<Band>,
    /// Same-level repeats inside this window are dropped
    pub suppress_for: Duration,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            levels: vec![Band::Warning, Band::Critical],
            suppress_for: DEFAULT_SUPPRESS,
        }
    }
}

/// Duplicate suppression state
#[derive(Debug, Clone)]
pub struct AlertGate {
    config: AlertConfig,
    last: Option<(Band, Timestamp)>,
}

impl AlertGate {
    pub fn new(config: AlertConfig) -> Self {
        Self { config, last: None }
    }

    /// Decide whether `level` seen at `now_ms` should alert
    pub fn check(&mut self, level: Band, now_ms: Timestamp) -> bool {
        if !self.config.levels.contains(&level) {
            self.last = Some((level, now_ms));
            return false;
        }

        if let Some((last_level, at)) = self.last {
            let window = self.config.suppress_for.as_millis() as u64;
            if last_level == level && now_ms.saturating_sub(at) < window {
                log::debug!("suppressing repeated {} alert", level);
                return false;
            }
        }

        self.last = Some((level, now_ms));
        true
    }

    pub fn config(&self) -> &AlertConfig {
        &self.config
    }
}

impl Default for AlertGate {
    fn default() -> Self {
        Self::new(AlertConfig::default())
    }
}

/// Rendered alert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertMessage {
    pub subject: String,
    pub body: String,
}

fn or_dash<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_owned(), |v| v.to_string())
}

impl AlertMessage {
    /// Build the message for `report`, stamped with `time`
    pub fn new(report: &StatusReport, time: &str) -> Self {
        let level = report.status.as_str().to_ascii_lowercase();
        let body = format!(
            "Status: {}\nBPM: {}\nTemp: {}\nTilt: {}\nTime: {}",
            level,
            or_dash(report.bpm),
            or_dash(report.temp),
            or_dash(report.tilt.as_ref()),
            time,
        );

        Self {
            subject: format!("PATIENT STATUS: {}", report.status.as_str()),
            body,
        }
    }

    /// Message stamped with the local wall-clock time
    pub fn now(report: &StatusReport) -> Self {
        let time = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        Self::new(report, &time)
    }
}

/// Delivers alerts to people (email, pager, ...)
pub trait Notifier {
    fn notify(&mut self, message: &AlertMessage) -> Result<(), ConnectorError>;
}

/// Notifier that only writes the alert to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&mut self, message: &AlertMessage) -> Result<(), ConnectorError> {
        log::warn!("{}\n{}", message.subject, message.body);
        Ok(())
    }
}
