//! Band Thresholds
//!
//! Inclusive ranges used by the classifier. A value inside the normal range
//! is NORMAL, inside the warning range WARNING, anywhere else CRITICAL.

// ===== HEART RATE (bpm) =====

pub const HR_NORMAL_MIN: f32 = 60.0;
pub const HR_NORMAL_MAX: f32 = 100.0;
pub const HR_WARN_MIN: f32 = 50.0;
pub const HR_WARN_MAX: f32 = 120.0;

// ===== TEMPERATURE (°C) =====
//
// Ambient profile: the reference build measures skin-adjacent air, so
// roughly 27-28 °C reads as NORMAL. Core-body deployments need their own bands.

pub const TEMP_NORMAL_MIN: f32 = 20.0;
pub const TEMP_NORMAL_MAX: f32 = 28.0;
pub const TEMP_WARN_MIN: f32 = 15.0;
pub const TEMP_WARN_MAX: f32 = 32.0;
