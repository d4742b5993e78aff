//! Heart-rate peak detection
//!
//! The pulse sensor produces a noisy analog waveform riding on a slowly
//! drifting DC level. Beats are found relative to an exponential baseline:
//!
//! ```text
//!          ┌┐        ┌┐        ┌┐
//! raw   ───┘└────────┘└────────┘└──     peak: raw > baseline + offset
//! base  ~~~~~~~~~~~~~~~~~~~~~~~~~~~~    end:  raw < baseline
//!          |<-ibi->|
//! ```
//!
//! Each rising edge after the first yields an inter-beat interval and an
//! instantaneous rate `60000 / ibi`. Rates outside the plausible range are
//! dropped; accepted ones enter a five-entry rolling window whose mean is
//! published.

use crate::buffer::CircularBuffer;
use crate::config::HeartRateConfig;
use crate::constants::HR_WINDOW_LEN;
use crate::hal::AnalogInput;
use crate::time::{elapsed_ms, is_due, Timestamp};
use crate::vitals::VitalSlot;

use super::Sampler;

/// Rolling window of accepted instantaneous rates
pub type BpmWindow = CircularBuffer<f32, HR_WINDOW_LEN>;

/// Online beat detector
///
/// Pure state machine: feed it raw samples with timestamps, it returns the
/// new smoothed rate whenever an accepted beat changes it.
#[derive(Debug, Clone)]
pub struct HeartRateDetector {
    config: HeartRateConfig,
    baseline: Option<f32>,
    window: BpmWindow,
    in_peak: bool,
    last_peak: Option<Timestamp>,
}

impl HeartRateDetector {
    /// Detector with empty history
    pub fn new(config: HeartRateConfig) -> Self {
        Self {
            config,
            baseline: None,
            window: BpmWindow::new(),
            in_peak: false,
            last_peak: None,
        }
    }

    /// Process one raw sample
    ///
    /// Returns the mean of the window when this sample completed an accepted
    /// beat, `None` otherwise.
    pub fn update(&mut self, raw: f32, now: Timestamp) -> Option<f32> {
        let alpha = self.config.smoothing;
        let baseline = match self.baseline {
            Some(prev) => alpha * prev + (1.0 - alpha) * raw,
            None => raw,
        };
        self.baseline = Some(baseline);

        let mut published = None;

        if !self.in_peak && raw > baseline + self.config.peak_offset {
            self.in_peak = true;

            if let Some(last) = self.last_peak {
                published = self.accept_interval(elapsed_ms(last, now));
            }
            self.last_peak = Some(now);
        }

        if self.in_peak && raw < baseline {
            self.in_peak = false;
        }

        published
    }

    fn accept_interval(&mut self, ibi_ms: u64) -> Option<f32> {
        if ibi_ms == 0 {
            return None;
        }

        let bpm = 60_000.0 / ibi_ms as f32;
        if bpm < self.config.min_bpm || bpm > self.config.max_bpm {
            log_trace!("dropping implausible beat: {} bpm", bpm);
            return None;
        }

        self.window.push(bpm);
        self.window.mean()
    }

    /// Current baseline, `None` before the first sample
    pub fn baseline(&self) -> Option<f32> {
        self.baseline
    }

    /// Accepted rates, oldest first
    pub fn window(&self) -> &BpmWindow {
        &self.window
    }

    /// Mean of the window
    pub fn bpm(&self) -> Option<f32> {
        self.window.mean()
    }

    /// Whether the signal is currently inside a beat
    pub fn in_peak(&self) -> bool {
        self.in_peak
    }
}

/// Heart-rate task: one ADC read per period
pub struct HeartRateSampler<A> {
    adc: A,
    detector: HeartRateDetector,
    period_ms: u64,
    next_due: Timestamp,
}

impl<A: AnalogInput> HeartRateSampler<A> {
    /// Sampler that runs at its first poll
    pub fn new(adc: A, config: HeartRateConfig) -> Self {
        Self {
            adc,
            detector: HeartRateDetector::new(config),
            period_ms: config.sample_period_ms,
            next_due: 0,
        }
    }

    /// The underlying detector
    pub fn detector(&self) -> &HeartRateDetector {
        &self.detector
    }
}

impl<A: AnalogInput> Sampler for HeartRateSampler<A> {
    fn poll(&mut self, now: Timestamp, slot: &mut VitalSlot) -> Timestamp {
        if !is_due(now, self.next_due) {
            return self.next_due;
        }

        let raw = f32::from(self.adc.read_u16());
        if let Some(bpm) = self.detector.update(raw, now) {
            slot.publish(bpm);
        }

        self.next_due = now + self.period_ms;
        self.next_due
    }

    fn next_wake(&self) -> Timestamp {
        self.next_due
    }
}
