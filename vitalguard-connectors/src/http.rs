//! Dashboard HTTP client
//!
//! Pushes each bridged status to the bedside display with a plain GET:
//!
//! ```text
//! GET <base>/update?level=warning&bpm=110&temp=25.5&tilt=declined
//! ```
//!
//! Absent vitals are left out of the query so the display keeps showing
//! the previous values. Transport failures (refused, timed out, DNS) are
//! retried up to `attempts` times with a linear backoff of
//! `backoff_step × attempt`; an HTTP error status is final.
//!
//! The client is blocking (`ureq`); a failed push can hold the caller for
//! the whole retry budget, so the bridge should run on its own thread or
//! blocking task.
//!
//! ## Example
//!
//! ```no_run
//! use vitalguard_connectors::http::{DashboardClient, DashboardConfig};
//! use vitalguard_connectors::payload::parse_payload;
//!
//! let client = DashboardClient::new(DashboardConfig::new("http://192.168.1.50:8080"))?;
//! if let Some(report) = parse_payload(b"WARNING,bpm=110.0,temp=25.0,tilt=0") {
//!     client.update(&report)?;
//! }
//! # Ok::<(), vitalguard_connectors::http::HttpError>(())
//! ```

use std::sync::Mutex;
use std::time::Duration;

use thiserror::Error;
use vitalguard_core::Timestamp;

use crate::bridge::DashboardPush;
use crate::payload::StatusReport;
use crate::{ConnectionStats, ConnectorError};

/// HTTP-specific errors
#[derive(Debug, Error)]
pub enum HttpError {
    /// Network or request error
    #[error("Request failed: {0}")]
    Request(String),

    /// Server returned error status
    #[error("Server error {status}: {message}")]
    ServerError { status: u16, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<HttpError> for ConnectorError {
    fn from(e: HttpError) -> Self {
        match e {
            HttpError::Config(reason) => ConnectorError::Config(reason),
            other => ConnectorError::Protocol(other.to_string()),
        }
    }
}

/// Display endpoint settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    /// e.g. `http://192.168.1.50:8080`, no trailing path
    pub base_url: String,
    /// Tries per update, at least one
    pub attempts: u32,
    /// Per-request timeout
    pub timeout: Duration,
    /// Wait after failed attempt `n` is `backoff_step × n`
    pub backoff_step: Duration,
    pub user_agent: String,
}

impl DashboardConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            attempts: 3,
            timeout: Duration::from_secs(5),
            backoff_step: Duration::from_millis(500),
            user_agent: format!("VitalGuard/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    pub fn attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    pub fn backoff_step(mut self, step: Duration) -> Self {
        self.backoff_step = step;
        self
    }

    /// Wait after failed attempt `attempt` (1-based)
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.backoff_step * attempt
    }
}

/// Query parameters for one report
pub fn query_pairs(report: &StatusReport) -> Vec<(&'static str, String)> {
    let mut pairs = vec![("level", report.status.as_str().to_ascii_lowercase())];
    if let Some(bpm) = report.bpm {
        pairs.push(("bpm", bpm.to_string()));
    }
    if let Some(temp) = report.temp {
        pairs.push(("temp", temp.to_string()));
    }
    if let Some(tilt) = &report.tilt {
        pairs.push(("tilt", tilt.as_str().to_owned()));
    }
    pairs
}

/// Blocking dashboard client using ureq
pub struct DashboardClient {
    config: DashboardConfig,
    agent: ureq::Agent,
    stats: Mutex<ConnectionStats>,
}

impl DashboardClient {
    pub fn new(config: DashboardConfig) -> Result<Self, HttpError> {
        if !config.base_url.starts_with("http://") && !config.base_url.starts_with("https://") {
            return Err(HttpError::Config("Base URL must start with http:// or https://".into()));
        }
        if config.attempts == 0 {
            return Err(HttpError::Config("at least one attempt is required".into()));
        }

        let agent = ureq::AgentBuilder::new()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build();

        Ok(Self {
            config,
            agent,
            stats: Mutex::new(ConnectionStats::default()),
        })
    }

    fn update_url(&self) -> String {
        format!("{}/update", self.config.base_url.trim_end_matches('/'))
    }

    /// Send one report; returns the display's reply text
    pub fn update(&self, report: &StatusReport) -> Result<String, HttpError> {
        let url = self.update_url();
        let pairs = query_pairs(report);
        let mut last_error = None;

        for attempt in 1..=self.config.attempts {
            let mut request = self.agent.get(&url);
            for (key, value) in &pairs {
                request = request.query(key, value);
            }

            match request.call() {
                Ok(response) => {
                    let text = response.into_string().unwrap_or_default();
                    log::info!("dashboard {:?} -> {:?}", pairs, text.chars().take(40).collect::<String>());
                    self.record(|s| s.messages_sent += 1);
                    return Ok(text);
                }
                Err(ureq::Error::Status(status, response)) => {
                    let message = response.into_string().unwrap_or_default();
                    self.record(|s| {
                        s.messages_failed += 1;
                        s.last_error = Some(format!("status {status}"));
                    });
                    return Err(HttpError::ServerError { status, message });
                }
                Err(ureq::Error::Transport(e)) => {
                    log::warn!("dashboard attempt {} failed: {}", attempt, e);
                    last_error = Some(HttpError::Request(e.to_string()));
                    if attempt < self.config.attempts {
                        std::thread::sleep(self.config.backoff(attempt));
                    }
                }
            }
        }

        let error = last_error.unwrap_or_else(|| HttpError::Request("no attempt made".into()));
        self.record(|s| {
            s.messages_failed += 1;
            s.last_error = Some(error.to_string());
        });
        Err(error)
    }

    fn record(&self, f: impl FnOnce(&mut ConnectionStats)) {
        match self.stats.lock() {
            Ok(mut stats) => f(&mut stats),
            Err(poisoned) => f(&mut poisoned.into_inner()),
        }
    }

    pub fn stats(&self) -> ConnectionStats {
        match self.stats.lock() {
            Ok(stats) => stats.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }
}

impl DashboardPush for DashboardClient {
    /// The dashboard stamps updates with its own clock
    fn push(&mut self, report: &StatusReport, _now_ms: Timestamp) -> Result<(), ConnectorError> {
        self.update(report).map(|_| ()).map_err(ConnectorError::from)
    }
}
