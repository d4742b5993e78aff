//! Severity Bands and Worst-Signal-Wins Fusion
//!
//! ## Overview
//!
//! Every vital is reduced to one of four bands, and the overall patient
//! status is the most severe band among them:
//!
//! ```text
//! UNKNOWN < NORMAL < WARNING < CRITICAL
//! ```
//!
//! A single unsafe vital therefore dominates the report even when the others
//! look fine, while a missing vital (UNKNOWN) never outranks a real reading.
//!
//! ## Per-Vital Banding
//!
//! Continuous vitals use two nested inclusive ranges:
//!
//! ```text
//!   CRITICAL │ WARNING │    NORMAL    │ WARNING │ CRITICAL
//! ───────────┼─────────┼──────────────┼─────────┼───────────
//!         warn_min  normal_min    normal_max  warn_max
//! ```
//!
//! Tilt comes from a two-state switch and has no WARNING band: 90° is
//! CRITICAL, 0° is NORMAL, anything else is UNKNOWN.
//!
//! Absent and non-finite values are UNKNOWN. Defaulting a missing reading to
//! zero would band it as CRITICAL (or worse, NORMAL for tilt) and lie about
//! the patient.
//!
//! ## Usage Example
//!
//! ```rust
//! use vitalguard_core::band::{fuse, Band, BandThresholds};
//!
//! let heart_rate = BandThresholds::new(60.0, 100.0, 50.0, 120.0);
//! assert_eq!(heart_rate.band(Some(75.0)), Band::Normal);
//! assert_eq!(heart_rate.band(Some(110.0)), Band::Warning);
//! assert_eq!(heart_rate.band(Some(130.0)), Band::Critical);
//! assert_eq!(heart_rate.band(None), Band::Unknown);
//!
//! assert_eq!(fuse([Band::Normal, Band::Warning, Band::Unknown]), Band::Warning);
//! ```

use core::fmt;
use core::str::FromStr;

use crate::constants::{sensors, thresholds};
use crate::errors::MonitorError;
use crate::vitals::VitalsState;

/// Severity band of one vital or of the fused status
///
/// Variant order is severity order; `Ord` and `max` follow it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "UPPERCASE"))]
#[repr(u8)]
pub enum Band {
    /// No usable data
    #[default]
    Unknown = 0,
    /// Inside the normal range
    Normal = 1,
    /// Outside normal but inside the warning range
    Warning = 2,
    /// Outside every acceptable range
    Critical = 3,
}

impl Band {
    /// All bands, least to most severe
    pub const ALL: [Band; 4] = [Band::Unknown, Band::Normal, Band::Warning, Band::Critical];

    /// Numeric severity, 0 (UNKNOWN) to 3 (CRITICAL)
    pub const fn severity(self) -> u8 {
        self as u8
    }

    /// Wire name
    pub const fn as_str(self) -> &'static str {
        match self {
            Band::Unknown => "UNKNOWN",
            Band::Normal => "NORMAL",
            Band::Warning => "WARNING",
            Band::Critical => "CRITICAL",
        }
    }

    /// WARNING and CRITICAL warrant an alert
    pub const fn is_alert(self) -> bool {
        matches!(self, Band::Warning | Band::Critical)
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Band {
    type Err = MonitorError;

    /// Case-insensitive; surrounding whitespace and double quotes are ignored
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().trim_matches('"').trim();

        Band::ALL
            .iter()
            .copied()
            .find(|band| band.as_str().eq_ignore_ascii_case(name))
            .ok_or(MonitorError::UnknownBand)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Band {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{=str}", self.as_str())
    }
}

/// Fuse bands by taking the most severe; UNKNOWN for no input
pub fn fuse<I>(bands: I) -> Band
where
    I: IntoIterator<Item = Band>,
{
    bands.into_iter().max().unwrap_or(Band::Unknown)
}

/// Nested inclusive ranges for one continuous vital
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BandThresholds {
    /// Lower edge of NORMAL
    pub normal_min: f32,
    /// Upper edge of NORMAL
    pub normal_max: f32,
    /// Lower edge of WARNING
    pub warn_min: f32,
    /// Upper edge of WARNING
    pub warn_max: f32,
}

impl BandThresholds {
    /// Create thresholds; see [`validate`](Self::validate) for the nesting rules
    pub const fn new(normal_min: f32, normal_max: f32, warn_min: f32, warn_max: f32) -> Self {
        Self {
            normal_min,
            normal_max,
            warn_min,
            warn_max,
        }
    }

    /// Heart-rate defaults: normal [60, 100], warning [50, 120] bpm
    pub const fn heart_rate() -> Self {
        Self::new(
            thresholds::HR_NORMAL_MIN,
            thresholds::HR_NORMAL_MAX,
            thresholds::HR_WARN_MIN,
            thresholds::HR_WARN_MAX,
        )
    }

    /// Temperature defaults: normal [20, 28], warning [15, 32] °C
    pub const fn temperature() -> Self {
        Self::new(
            thresholds::TEMP_NORMAL_MIN,
            thresholds::TEMP_NORMAL_MAX,
            thresholds::TEMP_WARN_MIN,
            thresholds::TEMP_WARN_MAX,
        )
    }

    /// Band a reading
    pub fn band(&self, value: Option<f32>) -> Band {
        let Some(x) = value.filter(|v| v.is_finite()) else {
            return Band::Unknown;
        };

        if self.normal_min <= x && x <= self.normal_max {
            Band::Normal
        } else if self.warn_min <= x && x <= self.warn_max {
            Band::Warning
        } else {
            Band::Critical
        }
    }

    /// Ranges must be finite, ordered and nested (`warn ⊇ normal`)
    ///
    /// Nesting is what makes banding monotonic: moving away from the normal
    /// range can only raise severity.
    pub fn validate(&self) -> Result<(), MonitorError> {
        let all_finite = [self.normal_min, self.normal_max, self.warn_min, self.warn_max]
            .iter()
            .all(|v| v.is_finite());

        if !all_finite {
            return Err(MonitorError::InvalidConfig {
                reason: "band thresholds must be finite",
            });
        }
        if self.normal_min > self.normal_max || self.warn_min > self.warn_max {
            return Err(MonitorError::InvalidConfig {
                reason: "band range is inverted",
            });
        }
        if self.warn_min > self.normal_min || self.warn_max < self.normal_max {
            return Err(MonitorError::InvalidConfig {
                reason: "warning range must contain normal range",
            });
        }
        Ok(())
    }
}

/// Band the discrete tilt angle
///
/// Exact comparison is intended: the tilt sampler only ever publishes the
/// two constants.
pub fn tilt_band(tilt_degrees: Option<f32>) -> Band {
    match tilt_degrees {
        Some(d) if d == sensors::TILTED_DEGREES => Band::Critical,
        Some(d) if d == sensors::FLAT_DEGREES => Band::Normal,
        _ => Band::Unknown,
    }
}

/// Band of each vital before fusion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentBands {
    /// Heart-rate band
    pub heart_rate: Band,
    /// Temperature band (UNKNOWN when temperature is classified externally)
    pub temperature: Band,
    /// Tilt band
    pub tilt: Band,
}

impl ComponentBands {
    /// Worst of the three
    pub fn overall(&self) -> Band {
        fuse([self.heart_rate, self.temperature, self.tilt])
    }
}

/// Multi-signal classifier
///
/// Pure: reads the vitals, never mutates anything, and is total over every
/// combination of present and absent readings.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Classifier {
    /// Heart-rate bands
    pub heart_rate: BandThresholds,
    /// Temperature bands
    pub temperature: BandThresholds,
}

impl Classifier {
    /// Classifier with the given thresholds
    pub const fn new(heart_rate: BandThresholds, temperature: BandThresholds) -> Self {
        Self {
            heart_rate,
            temperature,
        }
    }

    /// Per-vital bands with temperature banded locally
    pub fn bands(&self, vitals: &VitalsState) -> ComponentBands {
        ComponentBands {
            heart_rate: self.heart_rate.band(vitals.heart_rate_bpm()),
            temperature: self.temperature.band(vitals.temperature_c()),
            tilt: tilt_band(vitals.tilt_degrees()),
        }
    }

    /// Overall status with all three vitals banded locally
    pub fn classify(&self, vitals: &VitalsState) -> Band {
        self.bands(vitals).overall()
    }

    /// Overall status when temperature was classified elsewhere
    ///
    /// `temperature_label` takes the place of the local temperature band.
    pub fn classify_with_label(&self, vitals: &VitalsState, temperature_label: Band) -> Band {
        let bands = ComponentBands {
            temperature: temperature_label,
            ..self.bands(vitals)
        };
        bands.overall()
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(BandThresholds::heart_rate(), BandThresholds::temperature())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn any_band() -> impl Strategy<Value = Band> {
        prop::sample::select(Band::ALL.to_vec())
    }

    #[test]
    fn severity_order() {
        assert!(Band::Unknown < Band::Normal);
        assert!(Band::Normal < Band::Warning);
        assert!(Band::Warning < Band::Critical);
        assert_eq!(Band::Critical.severity(), 3);
    }

    #[test]
    fn heart_rate_edges_inclusive() {
        let hr = BandThresholds::heart_rate();
        assert_eq!(hr.band(Some(60.0)), Band::Normal);
        assert_eq!(hr.band(Some(100.0)), Band::Normal);
        assert_eq!(hr.band(Some(50.0)), Band::Warning);
        assert_eq!(hr.band(Some(120.0)), Band::Warning);
        assert_eq!(hr.band(Some(49.9)), Band::Critical);
        assert_eq!(hr.band(Some(120.1)), Band::Critical);
    }

    #[test]
    fn temperature_bands() {
        let temp = BandThresholds::temperature();
        assert_eq!(temp.band(Some(24.0)), Band::Normal);
        assert_eq!(temp.band(Some(30.0)), Band::Warning);
        assert_eq!(temp.band(Some(37.0)), Band::Critical);
        assert_eq!(temp.band(Some(10.0)), Band::Critical);
    }

    #[test]
    fn missing_and_nan_are_unknown() {
        let hr = BandThresholds::heart_rate();
        assert_eq!(hr.band(None), Band::Unknown);
        assert_eq!(hr.band(Some(f32::NAN)), Band::Unknown);
        assert_eq!(hr.band(Some(f32::INFINITY)), Band::Unknown);
    }

    #[test]
    fn tilt_is_binary() {
        assert_eq!(tilt_band(Some(90.0)), Band::Critical);
        assert_eq!(tilt_band(Some(0.0)), Band::Normal);
        assert_eq!(tilt_band(Some(45.0)), Band::Unknown);
        assert_eq!(tilt_band(None), Band::Unknown);
    }

    #[test]
    fn fuse_examples() {
        assert_eq!(fuse([Band::Normal, Band::Warning, Band::Unknown]), Band::Warning);
        assert_eq!(fuse([Band::Unknown, Band::Unknown, Band::Unknown]), Band::Unknown);
        assert_eq!(fuse([Band::Unknown, Band::Normal, Band::Unknown]), Band::Normal);
        assert_eq!(fuse(core::iter::empty()), Band::Unknown);
    }

    #[test]
    fn parse_band_names() {
        assert_eq!("CRITICAL".parse::<Band>(), Ok(Band::Critical));
        assert_eq!(" warning\n".parse::<Band>(), Ok(Band::Warning));
        assert_eq!("\"normal\"".parse::<Band>(), Ok(Band::Normal));
        assert_eq!("Unknown".parse::<Band>(), Ok(Band::Unknown));
        assert_eq!("SEVERE".parse::<Band>(), Err(MonitorError::UnknownBand));
        assert_eq!("".parse::<Band>(), Err(MonitorError::UnknownBand));
    }

    #[test]
    fn display_round_trips_names() {
        for band in Band::ALL {
            assert_eq!(band.to_string().parse::<Band>(), Ok(band));
        }
    }

    #[test]
    fn threshold_validation() {
        assert!(BandThresholds::heart_rate().validate().is_ok());
        assert!(BandThresholds::temperature().validate().is_ok());

        let inverted = BandThresholds::new(100.0, 60.0, 50.0, 120.0);
        assert!(inverted.validate().is_err());

        let not_nested = BandThresholds::new(40.0, 100.0, 50.0, 120.0);
        assert!(not_nested.validate().is_err());

        let nan = BandThresholds::new(f32::NAN, 100.0, 50.0, 120.0);
        assert!(nan.validate().is_err());
    }

    #[test]
    fn alert_levels() {
        assert!(Band::Critical.is_alert());
        assert!(Band::Warning.is_alert());
        assert!(!Band::Normal.is_alert());
        assert!(!Band::Unknown.is_alert());
    }

    proptest! {
        #[test]
        fn fusion_is_max(a in any_band(), b in any_band(), c in any_band()) {
            let fused = fuse([a, b, c]);
            prop_assert_eq!(fused, a.max(b).max(c));
            prop_assert!(fused >= a && fused >= b && fused >= c);
            prop_assert!(fused == a || fused == b || fused == c);
        }

        #[test]
        fn heart_rate_monotonic_above_normal(h1 in 100.0f32..250.0, delta in 0.0f32..100.0) {
            let hr = BandThresholds::heart_rate();
            let h2 = h1 + delta;
            prop_assert!(hr.band(Some(h2)) >= hr.band(Some(h1)));
        }

        #[test]
        fn heart_rate_monotonic_below_normal(h1 in 0.0f32..60.0, delta in 0.0f32..60.0) {
            let hr = BandThresholds::heart_rate();
            let h2 = h1 - delta;
            prop_assert!(hr.band(Some(h2)) >= hr.band(Some(h1)));
        }

        #[test]
        fn present_value_never_unknown(x in -500.0f32..500.0) {
            prop_assert_ne!(BandThresholds::temperature().band(Some(x)), Band::Unknown);
        }
    }
}
