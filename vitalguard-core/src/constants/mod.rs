//! Constants for VitalGuard Core
//!
//! Centralized, documented defaults for the vitals monitor. Every value here
//! is the factory default of a field in [`crate::config::MonitorConfig`];
//! deployments override them through configuration, never by editing code.
//!
//! ## Organization
//!
//! Constants are grouped by domain:
//! - **Sensors**: ADC scaling, sensor transfer functions, sampling bursts
//! - **Time**: Task periods, scheduler tick, debounce and timeouts
//! - **Thresholds**: Clinical/demo bands used by the classifier
//!
//! ## Usage Guidelines
//!
//! 1. Always use these constants instead of magic numbers
//! 2. Use descriptive names that include units
//! 3. Keep related constants together

/// Sensor transfer functions and sampling bursts.
pub mod sensors;

/// Task periods, scheduler tick and timeouts.
pub mod time;

/// Band thresholds for heart rate and temperature.
pub mod thresholds;

pub use sensors::{
    ADC_FULL_SCALE, ADC_REFERENCE_VOLTS,
    HR_BASELINE_SMOOTHING, HR_PEAK_OFFSET, HR_MIN_BPM, HR_MAX_BPM, HR_WINDOW_LEN,
    TEMP_SAMPLES, TEMP_VOLTS_PER_C, TEMP_CLAMP_MIN_C, TEMP_CLAMP_MAX_C, TEMP_OFFSET_C,
    TILT_SAMPLES, TILT_MAJORITY, TILTED_DEGREES, FLAT_DEGREES,
};

pub use time::{
    HR_SAMPLE_PERIOD_MS, TEMP_PERIOD_MS, TEMP_SAMPLE_GAP_MS, TILT_PERIOD_MS,
    TILT_SAMPLE_GAP_MS, SCHEDULER_TICK_MS, EMIT_PERIOD_MS, DEBOUNCE_MS, LABEL_TIMEOUT_MS,
};
