//! Shared Vitals State
//!
//! One record holds the latest value of every vital plus the last reported
//! status. It is owned by the [`Monitor`](crate::monitor::Monitor); samplers
//! never hold on to it.
//!
//! ## Single Writer per Field
//!
//! Each vital lives in its own [`VitalSlot`]. On every poll the monitor lends
//! a sampler `&mut` access to *its* slot only:
//!
//! ```text
//! monitor.vitals
//! ├── heart_rate   ◄── &mut  HeartRateSampler
//! ├── temperature  ◄── &mut  TemperatureSampler
//! ├── tilt         ◄── &mut  TiltSampler
//! └── last_status  ◄── monitor (after each emission)
//! ```
//!
//! The borrow checker proves that no sampler can write another sampler's
//! field and that no reader observes a half-written value, so there are no
//! locks, atomics or cells. Readers see whatever each slot held at the time
//! of the read: freshness is per field, there is no cross-field snapshot.

use crate::band::Band;

/// Which vital a slot or sampler carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Vital {
    /// Smoothed beats per minute
    HeartRate,
    /// Degrees Celsius, calibrated
    Temperature,
    /// Degrees, 0 (flat) or 90 (tilted)
    Tilt,
}

impl Vital {
    /// Status line field order
    pub const ALL: [Vital; 3] = [Vital::HeartRate, Vital::Temperature, Vital::Tilt];

    /// Key used in status lines
    pub const fn key(self) -> &'static str {
        match self {
            Vital::HeartRate => "bpm",
            Vital::Temperature => "temp",
            Vital::Tilt => "tilt",
        }
    }
}

/// Latest value of one vital; absent until the first valid sample
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VitalSlot {
    value: Option<f32>,
}

impl VitalSlot {
    /// Empty slot
    pub const fn new() -> Self {
        Self { value: None }
    }

    /// Replace the value
    #[inline]
    pub fn publish(&mut self, value: f32) {
        self.value = Some(value);
    }

    /// Current value
    #[inline]
    pub fn get(&self) -> Option<f32> {
        self.value
    }

    /// Whether a valid sample has ever been published
    #[inline]
    pub fn is_set(&self) -> bool {
        self.value.is_some()
    }
}

/// The shared vitals record
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VitalsState {
    pub(crate) heart_rate: VitalSlot,
    pub(crate) temperature: VitalSlot,
    pub(crate) tilt: VitalSlot,
    pub(crate) last_status: Band,
}

impl VitalsState {
    /// All vitals absent, status UNKNOWN
    pub const fn new() -> Self {
        Self {
            heart_rate: VitalSlot::new(),
            temperature: VitalSlot::new(),
            tilt: VitalSlot::new(),
            last_status: Band::Unknown,
        }
    }

    /// Build a state from explicit values
    ///
    /// Handy for classifying recorded data and for tests.
    pub fn from_values(
        heart_rate_bpm: Option<f32>,
        temperature_c: Option<f32>,
        tilt_degrees: Option<f32>,
    ) -> Self {
        Self {
            heart_rate: VitalSlot { value: heart_rate_bpm },
            temperature: VitalSlot { value: temperature_c },
            tilt: VitalSlot { value: tilt_degrees },
            last_status: Band::Unknown,
        }
    }

    /// Smoothed heart rate
    pub fn heart_rate_bpm(&self) -> Option<f32> {
        self.heart_rate.get()
    }

    /// Calibrated temperature
    pub fn temperature_c(&self) -> Option<f32> {
        self.temperature.get()
    }

    /// Tilt angle
    pub fn tilt_degrees(&self) -> Option<f32> {
        self.tilt.get()
    }

    /// Value of any vital
    pub fn get(&self, vital: Vital) -> Option<f32> {
        match vital {
            Vital::HeartRate => self.heart_rate.get(),
            Vital::Temperature => self.temperature.get(),
            Vital::Tilt => self.tilt.get(),
        }
    }

    /// Status of the last emission
    pub fn last_status(&self) -> Band {
        self.last_status
    }

    /// Record a new overall status, returning whether it changed
    pub(crate) fn record_status(&mut self, status: Band) -> bool {
        let changed = self.last_status != status;
        self.last_status = status;
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_absent() {
        let vitals = VitalsState::new();
        assert_eq!(vitals.heart_rate_bpm(), None);
        assert_eq!(vitals.temperature_c(), None);
        assert_eq!(vitals.tilt_degrees(), None);
        assert_eq!(vitals.last_status(), Band::Unknown);
    }

    #[test]
    fn slots_are_independent() {
        let mut vitals = VitalsState::new();
        vitals.temperature.publish(24.0);

        assert_eq!(vitals.get(Vital::Temperature), Some(24.0));
        assert!(!vitals.heart_rate.is_set());
        assert!(!vitals.tilt.is_set());
    }

    #[test]
    fn status_change_detection() {
        let mut vitals = VitalsState::new();
        assert!(vitals.record_status(Band::Normal));
        assert!(!vitals.record_status(Band::Normal));
        assert!(vitals.record_status(Band::Critical));
        assert_eq!(vitals.last_status(), Band::Critical);
    }

    #[test]
    fn status_keys() {
        assert_eq!(Vital::HeartRate.key(), "bpm");
        assert_eq!(Vital::Temperature.key(), "temp");
        assert_eq!(Vital::Tilt.key(), "tilt");
    }
}
