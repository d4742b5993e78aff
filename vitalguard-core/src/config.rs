//! Monitor Configuration
//!
//! Every tunable of the firmware lives here, grouped by the component that
//! consumes it. Defaults reproduce the reference build exactly (see
//! [`crate::constants`]), so `MonitorConfig::default()` is a working setup
//! for an RP2040 board with a pulse sensor, an LM35 and a ball tilt switch.
//!
//! ```rust
//! use vitalguard_core::config::{MonitorConfig, TemperatureBanding};
//!
//! let config = MonitorConfig::default()
//!     .with_emit_period_ms(500)
//!     .with_temperature_offset(2.5)
//!     .with_temperature_banding(TemperatureBanding::External { label_timeout_ms: 800 });
//!
//! assert!(config.validate().is_ok());
//! ```
//!
//! ## Temperature Banding
//!
//! Temperature can be banded in-process against the configured thresholds
//! (`Local`) or handed to an external classifier whose label replaces the
//! local temperature band (`External`). Heart rate and tilt are always
//! banded locally.

use crate::band::{BandThresholds, Classifier};
use crate::constants::{sensors, time};
use crate::errors::{MonitorError, MonitorResult};

/// Heart-rate sampler settings
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HeartRateConfig {
    /// Time between analog reads
    pub sample_period_ms: u64,
    /// EMA weight of the previous baseline, in [0, 1)
    pub smoothing: f32,
    /// Raw counts above baseline that start a beat
    pub peak_offset: f32,
    /// Lowest accepted instantaneous rate
    pub min_bpm: f32,
    /// Highest accepted instantaneous rate
    pub max_bpm: f32,
}

impl Default for HeartRateConfig {
    fn default() -> Self {
        Self {
            sample_period_ms: time::HR_SAMPLE_PERIOD_MS,
            smoothing: sensors::HR_BASELINE_SMOOTHING,
            peak_offset: sensors::HR_PEAK_OFFSET,
            min_bpm: sensors::HR_MIN_BPM,
            max_bpm: sensors::HR_MAX_BPM,
        }
    }
}

/// Temperature sampler settings
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TemperatureConfig {
    /// Pause between published samples
    pub period_ms: u64,
    /// Reads averaged per sample
    pub samples: u8,
    /// Suspension between reads of one burst
    pub sample_gap_ms: u64,
    /// ADC reference voltage
    pub reference_volts: f32,
    /// ADC full-scale count
    pub full_scale: f32,
    /// Sensor output per degree
    pub volts_per_c: f32,
    /// Clamp floor, before offset
    pub clamp_min_c: f32,
    /// Clamp ceiling, before offset
    pub clamp_max_c: f32,
    /// Calibration offset added after clamping
    pub offset_c: f32,
}

impl Default for TemperatureConfig {
    fn default() -> Self {
        Self {
            period_ms: time::TEMP_PERIOD_MS,
            samples: sensors::TEMP_SAMPLES,
            sample_gap_ms: time::TEMP_SAMPLE_GAP_MS,
            reference_volts: sensors::ADC_REFERENCE_VOLTS,
            full_scale: sensors::ADC_FULL_SCALE,
            volts_per_c: sensors::TEMP_VOLTS_PER_C,
            clamp_min_c: sensors::TEMP_CLAMP_MIN_C,
            clamp_max_c: sensors::TEMP_CLAMP_MAX_C,
            offset_c: sensors::TEMP_OFFSET_C,
        }
    }
}

/// Tilt sampler settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TiltConfig {
    /// Pause between votes
    pub period_ms: u64,
    /// Reads per vote
    pub samples: u8,
    /// Suspension between reads of one vote
    pub sample_gap_ms: u64,
    /// Reads that must say "tilted"
    pub majority: u8,
    /// Switch pulls the line low when tilted
    pub active_low: bool,
}

impl Default for TiltConfig {
    fn default() -> Self {
        Self {
            period_ms: time::TILT_PERIOD_MS,
            samples: sensors::TILT_SAMPLES,
            sample_gap_ms: time::TILT_SAMPLE_GAP_MS,
            majority: sensors::TILT_MAJORITY,
            active_low: true,
        }
    }
}

/// Start/stop button settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ButtonConfig {
    /// Required stable time before a level change counts
    pub debounce_ms: u64,
    /// Button pulls the line low when pressed
    pub active_low: bool,
}

impl Default for ButtonConfig {
    fn default() -> Self {
        Self {
            debounce_ms: time::DEBOUNCE_MS,
            active_low: true,
        }
    }
}

/// Main loop cadence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScheduleConfig {
    /// Button poll interval
    pub tick_ms: u64,
    /// Status emission interval
    pub emit_period_ms: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            tick_ms: time::SCHEDULER_TICK_MS,
            emit_period_ms: time::EMIT_PERIOD_MS,
        }
    }
}

/// Where the temperature band comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TemperatureBanding {
    /// Band temperature against the configured thresholds
    #[default]
    Local,
    /// Ask the label source; UNKNOWN if no answer within the timeout
    External {
        /// Bounded wait for the label
        label_timeout_ms: u64,
    },
}

impl TemperatureBanding {
    /// External banding with the default timeout
    pub const fn external() -> Self {
        TemperatureBanding::External {
            label_timeout_ms: time::LABEL_TIMEOUT_MS,
        }
    }
}

/// Complete monitor configuration
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MonitorConfig {
    /// Heart-rate sampler
    pub heart_rate: HeartRateConfig,
    /// Temperature sampler
    pub temperature: TemperatureConfig,
    /// Tilt sampler
    pub tilt: TiltConfig,
    /// Start/stop button
    pub button: ButtonConfig,
    /// Main loop cadence
    pub schedule: ScheduleConfig,
    /// Band thresholds
    pub classifier: Classifier,
    /// Local or external temperature banding
    pub temperature_banding: TemperatureBanding,
}

impl MonitorConfig {
    /// Set the status emission period
    pub fn with_emit_period_ms(mut self, ms: u64) -> Self {
        self.schedule.emit_period_ms = ms;
        self
    }

    /// Set the temperature calibration offset
    pub fn with_temperature_offset(mut self, offset_c: f32) -> Self {
        self.temperature.offset_c = offset_c;
        self
    }

    /// Set the heart-rate peak threshold above baseline
    pub fn with_peak_offset(mut self, peak_offset: f32) -> Self {
        self.heart_rate.peak_offset = peak_offset;
        self
    }

    /// Set tilt switch polarity
    pub fn with_tilt_active_low(mut self, active_low: bool) -> Self {
        self.tilt.active_low = active_low;
        self
    }

    /// Set button polarity
    pub fn with_button_active_low(mut self, active_low: bool) -> Self {
        self.button.active_low = active_low;
        self
    }

    /// Replace the band thresholds
    pub fn with_classifier(mut self, classifier: Classifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// Choose local or external temperature banding
    pub fn with_temperature_banding(mut self, banding: TemperatureBanding) -> Self {
        self.temperature_banding = banding;
        self
    }

    /// Check every constraint the monitor relies on
    pub fn validate(&self) -> MonitorResult<()> {
        let hr = &self.heart_rate;
        let temp = &self.temperature;
        let tilt = &self.tilt;

        require(hr.sample_period_ms > 0, "heart-rate period must be positive")?;
        require(
            (0.0..1.0).contains(&hr.smoothing),
            "heart-rate smoothing must be in [0, 1)",
        )?;
        require(
            hr.peak_offset.is_finite() && hr.peak_offset >= 0.0,
            "peak offset must be finite and non-negative",
        )?;
        require(
            hr.min_bpm > 0.0 && hr.min_bpm <= hr.max_bpm,
            "bpm plausibility range is invalid",
        )?;

        require(temp.period_ms > 0, "temperature period must be positive")?;
        require(temp.samples > 0, "temperature needs at least one sample")?;
        require(
            temp.reference_volts > 0.0 && temp.full_scale > 0.0 && temp.volts_per_c > 0.0,
            "temperature scaling must be positive",
        )?;
        require(
            temp.clamp_min_c <= temp.clamp_max_c,
            "temperature clamp is inverted",
        )?;
        require(temp.offset_c.is_finite(), "temperature offset must be finite")?;

        require(tilt.period_ms > 0, "tilt period must be positive")?;
        require(tilt.samples > 0, "tilt needs at least one sample")?;
        require(
            tilt.majority > 0 && tilt.majority <= tilt.samples,
            "tilt majority must be within sample count",
        )?;

        require(self.schedule.tick_ms > 0, "scheduler tick must be positive")?;
        require(self.schedule.emit_period_ms > 0, "emit period must be positive")?;

        if let TemperatureBanding::External { label_timeout_ms } = self.temperature_banding {
            require(label_timeout_ms > 0, "label timeout must be positive")?;
        }

        self.classifier.heart_rate.validate()?;
        self.classifier.temperature.validate()?;
        Ok(())
    }
}

fn require(condition: bool, reason: &'static str) -> MonitorResult<()> {
    if condition {
        Ok(())
    } else {
        Err(MonitorError::InvalidConfig { reason })
    }
}
