//! Deterministic harness for driving a monitor on virtual time

use std::rc::Rc;

use vitalguard_core::hal::{AnalogInput, DigitalInput};
use vitalguard_core::time::{MockClock, TimeSource, Timestamp};
use vitalguard_core::{LabelSource, Monitor, StatusSink};

use super::SharedLine;

/// Xorshift generator, reproducible across runs
pub struct TestRng {
    state: u32,
}

impl TestRng {
    pub fn new(seed: u32) -> Self {
        Self { state: seed.max(1) }
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 17;
        self.state ^= self.state << 5;
        self.state
    }

    pub fn next_f32(&mut self) -> f32 {
        (self.next_u32() >> 8) as f32 / 16_777_216.0
    }

    pub fn gen_range(&mut self, min: f32, max: f32) -> f32 {
        min + self.next_f32() * (max - min)
    }
}

/// A monitor, its clock and its button
pub struct Bench<H, T, D, S, L> {
    pub monitor: Monitor<H, T, D, SharedLine, S, L>,
    pub clock: Rc<MockClock>,
    pub button: SharedLine,
    /// Tilt switch, when the bench was built around a shared line
    pub tilt: Option<SharedLine>,
    pub steps: usize,
}

impl<H, T, D, S, L> Bench<H, T, D, S, L>
where
    H: AnalogInput,
    T: AnalogInput,
    D: DigitalInput,
    S: StatusSink,
    L: LabelSource,
{
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// Step until virtual time reaches `until`, jumping between wake-ups
    pub fn run_until(&mut self, until: Timestamp) {
        while self.clock.now() < until {
            let now = self.clock.now();
            let wake = self.monitor.step(now);
            assert!(wake > now, "monitor asked to wake at {wake} at {now}");
            self.clock.set(wake);
            self.steps += 1;
        }
    }

    pub fn run_for(&mut self, ms: u64) {
        let until = self.now() + ms;
        self.run_until(until);
    }

    /// Active-low button: hold it down, then let go
    pub fn press(&mut self, hold_ms: u64) {
        self.button.set_high(false);
        self.run_for(hold_ms);
        self.button.set_high(true);
        self.run_for(200);
    }
}
