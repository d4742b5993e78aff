//! Sensor signal generators
//!
//! Produce raw ADC counts the way the real front ends would: a pulse
//! sensor riding on a DC level, and an LM35 behind a 16-bit 3.3 V ADC.

use vitalguard_core::time::Timestamp;

use super::harness::TestRng;

/// Resting level of the pulse sensor
pub const PULSE_REST: f32 = 30_000.0;

/// Height of a beat above rest
pub const PULSE_AMPLITUDE: f32 = 15_000.0;

/// Duration of one beat above rest
pub const PULSE_WIDTH_MS: u64 = 50;

/// Square pulse train with additive noise
pub struct PulseWaveform {
    period_ms: f32,
    noise: f32,
    rng: TestRng,
}

impl PulseWaveform {
    /// Waveform beating at `bpm`, noise of `noise` raw counts peak
    pub fn new(bpm: f32, noise: f32, seed: u32) -> Self {
        Self {
            period_ms: 60_000.0 / bpm,
            noise,
            rng: TestRng::new(seed),
        }
    }

    pub fn sample(&mut self, now: Timestamp) -> u16 {
        let phase = now as f32 % self.period_ms;
        let level = if phase < PULSE_WIDTH_MS as f32 {
            PULSE_REST + PULSE_AMPLITUDE
        } else {
            PULSE_REST
        };
        let jitter = self.rng.gen_range(-self.noise, self.noise);
        (level + jitter).clamp(0.0, 65_535.0) as u16
    }
}

/// Raw count for a displayed temperature with the default +5 °C offset
pub fn lm35_raw(displayed_c: f32) -> u16 {
    let sensor_c = displayed_c - 5.0;
    (sensor_c * 0.01 / 3.3 * 65_535.0).round() as u16
}

/// LM35 reading with a few counts of quantization noise
pub struct NoisyThermometer {
    raw: u16,
    rng: TestRng,
}

impl NoisyThermometer {
    pub fn new(displayed_c: f32, seed: u32) -> Self {
        Self {
            raw: lm35_raw(displayed_c),
            rng: TestRng::new(seed),
        }
    }

    pub fn sample(&mut self) -> u16 {
        let jitter = (self.rng.next_u32() % 5) as i32 - 2;
        (i32::from(self.raw) + jitter).clamp(0, 65_535) as u16
    }
}
