//! Common test utilities for monitor integration tests
//!
//! This module provides:
//! - Hardware fakes driven by a shared virtual clock
//! - A recording status sink and a scripted label source
//! - Patient waveform generators and ready-made scenarios

#![allow(dead_code)]

use std::cell::Cell;
use std::rc::Rc;

use vitalguard_core::hal::{AnalogInput, DigitalInput};
use vitalguard_core::time::{MockClock, TimeSource, Timestamp};
use vitalguard_core::{Band, LabelError, LabelSource, SinkError, StatusLine, StatusSink};

pub mod generators;
pub mod harness;
pub mod scenarios;

/// Digital line the test can flip while the monitor owns a clone
#[derive(Clone)]
pub struct SharedLine(Rc<Cell<bool>>);

impl SharedLine {
    pub fn new(high: bool) -> Self {
        Self(Rc::new(Cell::new(high)))
    }

    pub fn set_high(&self, high: bool) {
        self.0.set(high);
    }
}

impl DigitalInput for SharedLine {
    fn is_high(&mut self) -> bool {
        self.0.get()
    }
}

/// ADC channel whose reading is a function of virtual time
pub struct ClockedAdc<F> {
    clock: Rc<MockClock>,
    signal: F,
}

impl<F: FnMut(Timestamp) -> u16> ClockedAdc<F> {
    pub fn new(clock: Rc<MockClock>, signal: F) -> Self {
        Self { clock, signal }
    }
}

impl<F: FnMut(Timestamp) -> u16> AnalogInput for ClockedAdc<F> {
    fn read_u16(&mut self) -> u16 {
        (self.signal)(self.clock.now())
    }
}

/// Boxed signal so scenarios can mix waveforms
pub type Signal = Box<dyn FnMut(Timestamp) -> u16>;

/// Sink that keeps every line with its emission time
pub struct RecordingSink {
    clock: Rc<MockClock>,
    pub lines: Vec<(Timestamp, StatusLine)>,
    pub notices: Vec<bool>,
}

impl RecordingSink {
    pub fn new(clock: Rc<MockClock>) -> Self {
        Self {
            clock,
            lines: Vec::new(),
            notices: Vec::new(),
        }
    }

    pub fn rendered(&self) -> Vec<String> {
        self.lines.iter().map(|(_, line)| line.to_string()).collect()
    }

    pub fn statuses(&self) -> Vec<Band> {
        self.lines.iter().map(|(_, line)| line.status).collect()
    }

    pub fn last(&self) -> Option<&StatusLine> {
        self.lines.last().map(|(_, line)| line)
    }
}

impl StatusSink for RecordingSink {
    fn emit(&mut self, line: &StatusLine) -> nb::Result<(), SinkError> {
        self.lines.push((self.clock.now(), *line));
        Ok(())
    }

    fn announce(&mut self, monitoring: bool) {
        self.notices.push(monitoring);
    }
}

/// Remote classifier stand-in
///
/// Answers every request with `label` once `latency_ms` has passed.
pub struct ScriptedLabels {
    clock: Rc<MockClock>,
    label: Option<Band>,
    latency_ms: u64,
    asked_at: Option<Timestamp>,
    pub requests: Vec<f32>,
}

impl ScriptedLabels {
    pub fn new(clock: Rc<MockClock>, label: Option<Band>, latency_ms: u64) -> Self {
        Self {
            clock,
            label,
            latency_ms,
            asked_at: None,
            requests: Vec::new(),
        }
    }
}

impl LabelSource for ScriptedLabels {
    fn request(&mut self, temperature_c: f32) -> Result<(), LabelError> {
        self.requests.push(temperature_c);
        self.asked_at = Some(self.clock.now());
        Ok(())
    }

    fn poll_label(&mut self) -> nb::Result<Band, LabelError> {
        let asked_at = self.asked_at.ok_or(nb::Error::Other(LabelError::Unavailable))?;
        match self.label {
            Some(label) if self.clock.now() >= asked_at + self.latency_ms => {
                self.asked_at = None;
                Ok(label)
            }
            _ => Err(nb::Error::WouldBlock),
        }
    }
}
