//! Status payload parsing
//!
//! Status lines reach the bridge from several publishers, not all of them
//! the monitor itself, so the parser is lenient. Accepted forms:
//!
//! ```text
//! warning,bpm=78,temp=36.6,tilt=inclined     comma / key=value
//! warning                                    bare status
//! "warning"                                  JSON string
//! {"status":"warning","bpm":78,"tilt":0}     JSON object
//! ```
//!
//! Only NORMAL, WARNING and CRITICAL are actionable statuses; anything else
//! (including the monitor's UNKNOWN placeholder) is ignored. Numeric fields
//! that do not parse are treated as absent rather than failing the payload.

use std::fmt;

use serde::Serialize;
use serde_json::Value;
use vitalguard_core::Band;

/// Tilt as reported to people
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub enum TiltPosition {
    /// Patient tilted over
    Inclined,
    /// Patient lying flat
    Declined,
    /// Something the publisher made up, kept verbatim (lowercased)
    Other(String),
}

const TRUTHY: &[&str] = &["1", "true", "on", "tilt", "tilted", "inclined", "high", "90"];
const FALSY: &[&str] = &["0", "false", "off", "flat", "level", "declined", "upright", "low"];

impl TiltPosition {
    /// Normalize a raw tilt word; `NA` and empty are absent
    pub fn normalize(raw: &str) -> Option<Self> {
        let word = raw.trim().to_ascii_lowercase();
        if word.is_empty() || word == "na" {
            return None;
        }
        if TRUTHY.contains(&word.as_str()) {
            Some(Self::Inclined)
        } else if FALSY.contains(&word.as_str()) {
            Some(Self::Declined)
        } else {
            Some(Self::Other(word))
        }
    }

    fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::String(s) => Self::normalize(s),
            other => Self::normalize(&other.to_string()),
        }
    }

    /// Display word
    pub fn as_str(&self) -> &str {
        match self {
            Self::Inclined => "inclined",
            Self::Declined => "declined",
            Self::Other(word) => word,
        }
    }
}

impl fmt::Display for TiltPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<TiltPosition> for String {
    fn from(tilt: TiltPosition) -> Self {
        tilt.as_str().to_owned()
    }
}

/// One parsed status update
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusReport {
    /// NORMAL, WARNING or CRITICAL
    pub status: Band,
    /// Heart rate, if reported
    pub bpm: Option<f64>,
    /// Temperature, if reported
    pub temp: Option<f64>,
    /// Tilt, if reported
    pub tilt: Option<TiltPosition>,
}

impl StatusReport {
    /// Report carrying only a status
    pub fn bare(status: Band) -> Self {
        Self {
            status,
            bpm: None,
            temp: None,
            tilt: None,
        }
    }
}

/// Parse an actionable status, case-insensitively
fn actionable(text: &str) -> Option<Band> {
    text.parse::<Band>()
        .ok()
        .filter(|band| *band != Band::Unknown)
}

/// Lenient number: absent on any failure
pub fn parse_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn number_from_json(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_number(s),
        _ => None,
    }
}

/// Parse a raw status payload
///
/// Returns `None` for anything that does not carry an actionable status.
pub fn parse_payload(payload: &[u8]) -> Option<StatusReport> {
    let text = std::str::from_utf8(payload).ok()?.trim();

    if text.contains(',') && text.contains('=') {
        return parse_fields(text);
    }

    if let Some(status) = actionable(text) {
        return Some(StatusReport::bare(status));
    }

    match serde_json::from_str::<Value>(text).ok()? {
        Value::String(s) => actionable(&s).map(StatusReport::bare),
        Value::Object(obj) => {
            let status = obj.get("status").and_then(Value::as_str).and_then(actionable)?;
            Some(StatusReport {
                status,
                bpm: number_from_json(obj.get("bpm")),
                temp: number_from_json(obj.get("temp")),
                tilt: obj.get("tilt").and_then(TiltPosition::from_json),
            })
        }
        _ => None,
    }
}

fn parse_fields(text: &str) -> Option<StatusReport> {
    let mut parts = text.split(',').map(str::trim);
    let status = actionable(parts.next()?)?;
    let mut report = StatusReport::bare(status);

    for part in parts {
        let Some((key, value)) = part.split_once('=') else {
            continue;
        };
        match key.trim().to_ascii_lowercase().as_str() {
            "bpm" => report.bpm = parse_number(value),
            "temp" => report.temp = parse_number(value),
            "tilt" => report.tilt = TiltPosition::normalize(value),
            _ => {}
        }
    }

    Some(report)
}
