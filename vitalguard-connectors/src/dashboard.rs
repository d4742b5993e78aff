//! Dashboard state
//!
//! The bedside display keeps the latest level and vitals, answers the small
//! HTTP surface the bridge and the browser page use, and drives three lamps
//! and a buzzer:
//!
//! | Level    | Lamp   | Buzzer                    |
//! |----------|--------|---------------------------|
//! | normal   | green  | off                       |
//! | warning  | yellow | 200 ms chirp every 10 s   |
//! | critical | red    | on                        |
//!
//! Serving sockets and the HTML page is left to the embedding binary; this
//! module only maps request paths to replies.

use serde::Serialize;
use vitalguard_core::{Band, Timestamp};

use crate::bridge::DashboardPush;
use crate::payload::{parse_number, StatusReport, TiltPosition};
use crate::ConnectorError;

/// Warning chirp period
pub const WARNING_PERIOD_MS: u64 = 10_000;
/// Warning chirp length
pub const WARNING_PULSE_MS: u64 = 200;

const USAGE: &str = "usage: /status?level=normal|warning|critical";

/// Lamp outputs; exactly one is lit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lamps {
    pub red: bool,
    pub yellow: bool,
    pub green: bool,
}

/// JSON body of `/state`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub status: String,
    pub bpm: Option<f64>,
    pub temp: Option<f64>,
    pub tilt: Option<TiltPosition>,
    pub updated_ms: Timestamp,
    pub age_ms: u64,
}

/// Answer to one request path
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Json(Snapshot),
    Text(&'static str),
    NotFound,
}

impl Reply {
    /// Content type and body
    pub fn into_body(self) -> (&'static str, String) {
        match self {
            Self::Json(snapshot) => match serde_json::to_string(&snapshot) {
                Ok(body) => ("application/json", body),
                Err(e) => {
                    log::error!("snapshot serialization failed: {}", e);
                    ("text/plain", "error".to_owned())
                }
            },
            Self::Text(text) => ("text/plain", text.to_owned()),
            Self::NotFound => ("text/plain", "not found".to_owned()),
        }
    }
}

/// Latest displayed status
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardState {
    level: Band,
    bpm: Option<f64>,
    temp: Option<f64>,
    tilt: Option<TiltPosition>,
    updated_ms: Timestamp,
    last_warning: Option<Timestamp>,
}

fn display_level(word: &str) -> Option<Band> {
    match word.trim().to_ascii_lowercase().as_str() {
        "normal" => Some(Band::Normal),
        "warning" => Some(Band::Warning),
        "critical" => Some(Band::Critical),
        _ => None,
    }
}

/// Lowercased keys, trimmed values
fn query_pairs(path: &str) -> impl Iterator<Item = (String, &str)> {
    path.split_once('?')
        .map(|(_, query)| query)
        .unwrap_or("")
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .map(|(k, v)| (k.trim().to_ascii_lowercase(), v.trim()))
}

impl DashboardState {
    /// Normal, nothing reported yet
    pub fn new(now: Timestamp) -> Self {
        Self {
            level: Band::Normal,
            bpm: None,
            temp: None,
            tilt: None,
            updated_ms: now,
            last_warning: None,
        }
    }

    pub fn level(&self) -> Band {
        self.level
    }

    /// Switch the displayed level; UNKNOWN is refused
    pub fn set_level(&mut self, level: Band, now: Timestamp) -> bool {
        if level == Band::Unknown {
            return false;
        }
        if level != self.level {
            log::info!("display level {} -> {}", self.level, level);
        }
        self.level = level;
        self.updated_ms = now;
        true
    }

    /// Absent values keep what is shown
    pub fn update_metrics(
        &mut self,
        bpm: Option<f64>,
        temp: Option<f64>,
        tilt: Option<TiltPosition>,
        now: Timestamp,
    ) {
        if bpm.is_some() {
            self.bpm = bpm;
        }
        if temp.is_some() {
            self.temp = temp;
        }
        if tilt.is_some() {
            self.tilt = tilt;
        }
        self.updated_ms = now;
    }

    /// Apply a full report
    pub fn apply(&mut self, report: &StatusReport, now: Timestamp) {
        self.set_level(report.status, now);
        self.update_metrics(report.bpm, report.temp, report.tilt.clone(), now);
    }

    /// Apply `/update?level=&bpm=&temp=&tilt=`
    pub fn apply_query(&mut self, path: &str, now: Timestamp) {
        let (mut bpm, mut temp, mut tilt) = (None, None, None);
        for (key, value) in query_pairs(path) {
            match key.as_str() {
                "level" => {
                    if let Some(level) = display_level(value) {
                        self.set_level(level, now);
                    }
                }
                "bpm" => bpm = parse_number(value),
                "temp" => temp = parse_number(value),
                "tilt" => tilt = TiltPosition::normalize(value),
                _ => {}
            }
        }
        self.update_metrics(bpm, temp, tilt, now);
    }

    /// Map a request path to its reply
    pub fn route(&mut self, path: &str, now: Timestamp) -> Reply {
        if path.starts_with("/state") {
            Reply::Json(self.snapshot(now))
        } else if path.starts_with("/update") {
            self.apply_query(path, now);
            Reply::Text("ok")
        } else if path.starts_with("/status") {
            self.legacy_status(path, now)
        } else {
            Reply::NotFound
        }
    }

    /// `/status?level=<word>`
    fn legacy_status(&mut self, path: &str, now: Timestamp) -> Reply {
        let Some((_, rest)) = path.split_once("?level=") else {
            return Reply::Text(USAGE);
        };
        let word: String = rest.chars().take_while(char::is_ascii_alphabetic).collect();
        if word.is_empty() {
            return Reply::Text(USAGE);
        }
        match display_level(&word) {
            Some(level) => {
                self.set_level(level, now);
                Reply::Text("ok")
            }
            None => Reply::Text("bad level"),
        }
    }

    pub fn snapshot(&self, now: Timestamp) -> Snapshot {
        Snapshot {
            status: self.level.as_str().to_ascii_lowercase(),
            bpm: self.bpm,
            temp: self.temp,
            tilt: self.tilt.clone(),
            updated_ms: self.updated_ms,
            age_ms: now.saturating_sub(self.updated_ms),
        }
    }

    pub fn lamps(&self) -> Lamps {
        Lamps {
            red: self.level == Band::Critical,
            yellow: self.level == Band::Warning,
            green: self.level == Band::Normal,
        }
    }

    /// Buzzer output at `now`; call on every display loop pass
    pub fn buzzer(&mut self, now: Timestamp) -> bool {
        match self.level {
            Band::Critical => true,
            Band::Warning => {
                let since = match self.last_warning {
                    Some(at) if now.saturating_sub(at) < WARNING_PERIOD_MS => now.saturating_sub(at),
                    _ => {
                        self.last_warning = Some(now);
                        0
                    }
                };
                since < WARNING_PULSE_MS
            }
            _ => false,
        }
    }
}

impl DashboardPush for DashboardState {
    fn push(&mut self, report: &StatusReport, now_ms: Timestamp) -> Result<(), ConnectorError> {
        self.apply(report, now_ms);
        Ok(())
    }
}
