//! Temperature averaging
//!
//! Every period the sampler takes a burst of ADC reads (suspending between
//! them so the other tasks keep running), averages them to suppress
//! quantization noise, and converts the average through the LM35 transfer
//! function:
//!
//! ```text
//! volts = raw · V_ref / full_scale
//! °C    = clamp(volts / 0.01, -20, 120) + offset
//! ```
//!
//! The clamp keeps a shorted or floating sensor from producing absurd
//! values; it is applied before the calibration offset.

use crate::config::TemperatureConfig;
use crate::hal::AnalogInput;
use crate::time::{is_due, Timestamp};
use crate::vitals::VitalSlot;

use super::Sampler;

/// Convert an averaged raw reading to calibrated degrees Celsius
pub fn celsius_from_raw(raw_avg: f32, config: &TemperatureConfig) -> f32 {
    let volts = raw_avg * (config.reference_volts / config.full_scale);
    let celsius = volts / config.volts_per_c;
    celsius.clamp(config.clamp_min_c, config.clamp_max_c) + config.offset_c
}

/// Temperature task: oversampled burst every period
pub struct TemperatureSampler<A> {
    adc: A,
    config: TemperatureConfig,
    accumulator: u32,
    taken: u8,
    next_due: Timestamp,
}

impl<A: AnalogInput> TemperatureSampler<A> {
    /// Sampler that starts its first burst at its first poll
    pub fn new(adc: A, config: TemperatureConfig) -> Self {
        Self {
            adc,
            config,
            accumulator: 0,
            taken: 0,
            next_due: 0,
        }
    }

    /// Reads taken so far in the current burst
    pub fn burst_progress(&self) -> u8 {
        self.taken
    }
}

impl<A: AnalogInput> Sampler for TemperatureSampler<A> {
    fn poll(&mut self, now: Timestamp, slot: &mut VitalSlot) -> Timestamp {
        if !is_due(now, self.next_due) {
            return self.next_due;
        }

        self.accumulator += u32::from(self.adc.read_u16());
        self.taken += 1;

        if self.taken < self.config.samples {
            self.next_due = now + self.config.sample_gap_ms;
            return self.next_due;
        }

        let raw_avg = self.accumulator as f32 / f32::from(self.taken);
        let celsius = celsius_from_raw(raw_avg, &self.config);
        slot.publish(celsius);
        log_trace!("temperature {} C from raw {}", celsius, raw_avg);

        self.accumulator = 0;
        self.taken = 0;
        self.next_due = now + self.config.period_ms;
        self.next_due
    }

    fn next_wake(&self) -> Timestamp {
        self.next_due
    }
}
