//! Sensor Specifications and Sampling Parameters
//!
//! Transfer functions and burst sizes for the three patient sensors:
//! a pulse sensor on an analog line, an LM35-class analog thermometer and
//! a digital ball-type tilt switch.

// ===== ADC =====

/// ADC reference voltage (V).
///
/// RP2040-class boards expose a 3.3 V analog reference.
pub const ADC_REFERENCE_VOLTS: f32 = 3.3;

/// Full-scale value of a 16-bit scaled ADC read.
///
/// `read_u16()` style APIs scale the native 12-bit conversion to 0..=65535.
pub const ADC_FULL_SCALE: f32 = 65535.0;

// ===== HEART RATE =====

/// Weight of the previous baseline in the EMA update.
///
/// `baseline = α·baseline + (1-α)·raw`. At a 10 ms sampling period this
/// tracks DC drift over roughly 200 ms and ignores individual beats.
pub const HR_BASELINE_SMOOTHING: f32 = 0.95;

/// Raw counts above baseline that mark the start of a beat.
///
/// Depends on the sensor and on the patient; tune per deployment.
pub const HR_PEAK_OFFSET: f32 = 8000.0;

/// Lowest plausible heart rate (bpm). Slower intervals are treated as noise.
pub const HR_MIN_BPM: f32 = 40.0;

/// Highest plausible heart rate (bpm). Faster intervals are treated as noise.
pub const HR_MAX_BPM: f32 = 180.0;

/// Number of accepted beats averaged into the published heart rate.
pub const HR_WINDOW_LEN: usize = 5;

// ===== TEMPERATURE =====

/// Reads averaged per temperature sample (oversampling against quantization noise).
pub const TEMP_SAMPLES: u8 = 16;

/// LM35 transfer function: 10 mV per °C.
pub const TEMP_VOLTS_PER_C: f32 = 0.01;

/// Lower clamp applied before the calibration offset (°C).
pub const TEMP_CLAMP_MIN_C: f32 = -20.0;

/// Upper clamp applied before the calibration offset (°C).
pub const TEMP_CLAMP_MAX_C: f32 = 120.0;

/// Calibration offset added after clamping (°C).
///
/// Compensates the fixed bias of the reference build; change per sensor.
pub const TEMP_OFFSET_C: f32 = 5.0;

// ===== TILT =====

/// Digital reads per tilt vote.
pub const TILT_SAMPLES: u8 = 5;

/// Reads that must agree on "tilted" for the vote to pass.
pub const TILT_MAJORITY: u8 = 3;

/// Published angle when the switch reports tilted.
pub const TILTED_DEGREES: f32 = 90.0;

/// Published angle when the switch reports flat.
pub const FLAT_DEGREES: f32 = 0.0;
