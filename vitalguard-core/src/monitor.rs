//! Cooperative Monitor Loop
//!
//! ## Overview
//!
//! One [`Monitor`] owns everything: the three samplers, the button, the
//! shared [`VitalsState`] and both collaborators. There are no threads and
//! no locks. Each call to [`Monitor::step`] runs whatever is due at `now`
//! up to its next suspension point and returns the earliest time anything
//! needs to run again:
//!
//! ```text
//! step(now)
//!   ├─ tick due?      read button → edge detector → toggle monitoring
//!   ├─ label pending? poll label source, or give up at the deadline
//!   ├─ emission due?  classify → format → hand to sink
//!   └─ samplers       heart rate, temperature, tilt (each only if due)
//!   → min(next wake of every part)
//! ```
//!
//! ## Shared State
//!
//! Each sampler is lent `&mut` access to its own [`VitalSlot`] only, for the
//! duration of one poll. The classifier and the emission step read the whole
//! record between polls. Single writer per field holds by construction.
//!
//! ## Emission
//!
//! The emission deadline advances by exactly one period each time it fires,
//! whether or not monitoring is active, so the cadence does not drift with
//! step latency. While temperature has never been sampled the placeholder
//! line `UNKNOWN,bpm=NA,temp=NA,tilt=NA` is sent instead of a classification.
//!
//! With [`TemperatureBanding::External`] the temperature is sent to the
//! [`LabelSource`] and the emission completes when the label arrives or its
//! timeout elapses, whichever comes first. Other tasks keep running while
//! the label is outstanding.
//!
//! [`VitalSlot`]: crate::vitals::VitalSlot

use crate::band::Band;
use crate::config::{MonitorConfig, TemperatureBanding};
use crate::debounce::EdgeDetector;
use crate::errors::MonitorResult;
use crate::hal::{read_active, AnalogInput, Delay, DigitalInput};
use crate::samplers::{HeartRateSampler, Sampler, TemperatureSampler, TiltSampler};
use crate::status::StatusLine;
use crate::time::{elapsed_ms, is_due, TimeSource, Timestamp};
use crate::traits::{LabelSource, NoLabels, StatusSink};
use crate::vitals::VitalsState;

/// Sensor lines handed to the monitor
#[derive(Debug)]
pub struct Peripherals<H, T, D, B> {
    /// Pulse sensor ADC channel
    pub heart_rate: H,
    /// Temperature sensor ADC channel
    pub temperature: T,
    /// Tilt switch line
    pub tilt: D,
    /// Start/stop button line
    pub button: B,
}

/// Emission counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonitorStats {
    /// Lines accepted by the sink
    pub emitted: u32,
    /// Lines the sink refused or failed
    pub dropped: u32,
    /// Labels that did not arrive in time
    pub label_timeouts: u32,
}

/// Outstanding label request
#[derive(Debug, Clone, Copy)]
struct PendingLabel {
    deadline: Timestamp,
    /// Temperature sent for classification; the emitted line reports it
    temperature: f32,
}

/// The vitals monitor
pub struct Monitor<H, T, D, B, S, L = NoLabels> {
    config: MonitorConfig,
    heart_rate: HeartRateSampler<H>,
    temperature: TemperatureSampler<T>,
    tilt: TiltSampler<D>,
    button: B,
    edge: EdgeDetector,
    vitals: VitalsState,
    monitoring: bool,
    next_tick: Timestamp,
    next_emission: Option<Timestamp>,
    pending: Option<PendingLabel>,
    sink: S,
    labels: L,
    stats: MonitorStats,
}

impl<H, T, D, B, S> Monitor<H, T, D, B, S, NoLabels>
where
    H: AnalogInput,
    T: AnalogInput,
    D: DigitalInput,
    B: DigitalInput,
    S: StatusSink,
{
    /// Monitor without an external temperature classifier
    pub fn without_labels(
        config: MonitorConfig,
        peripherals: Peripherals<H, T, D, B>,
        sink: S,
    ) -> MonitorResult<Self> {
        Self::new(config, peripherals, sink, NoLabels)
    }
}

impl<H, T, D, B, S, L> Monitor<H, T, D, B, S, L>
where
    H: AnalogInput,
    T: AnalogInput,
    D: DigitalInput,
    B: DigitalInput,
    S: StatusSink,
    L: LabelSource,
{
    /// Build a stopped monitor after validating `config`
    pub fn new(
        config: MonitorConfig,
        peripherals: Peripherals<H, T, D, B>,
        sink: S,
        labels: L,
    ) -> MonitorResult<Self> {
        config.validate()?;

        Ok(Self {
            config,
            heart_rate: HeartRateSampler::new(peripherals.heart_rate, config.heart_rate),
            temperature: TemperatureSampler::new(peripherals.temperature, config.temperature),
            tilt: TiltSampler::new(peripherals.tilt, config.tilt),
            button: peripherals.button,
            edge: EdgeDetector::new(config.button.debounce_ms),
            vitals: VitalsState::new(),
            monitoring: false,
            next_tick: 0,
            next_emission: None,
            pending: None,
            sink,
            labels,
            stats: MonitorStats::default(),
        })
    }

    /// Run everything due at `now`; returns the next wake-up time
    pub fn step(&mut self, now: Timestamp) -> Timestamp {
        if is_due(now, self.next_tick) {
            self.check_button(now);
            self.next_tick = now + self.config.schedule.tick_ms;
        }

        if self.pending.is_some() {
            self.poll_label(now);
        }

        let period = self.config.schedule.emit_period_ms;
        let deadline = *self.next_emission.get_or_insert(now + period);
        if is_due(now, deadline) {
            let mut next = deadline + period;
            if is_due(now, next) {
                // Fell more than a period behind; skip the missed emissions
                next = now + period;
            }
            self.next_emission = Some(next);

            if self.monitoring {
                self.begin_emission(now);
            }
        }

        let wakes = [
            self.heart_rate.poll(now, &mut self.vitals.heart_rate),
            self.temperature.poll(now, &mut self.vitals.temperature),
            self.tilt.poll(now, &mut self.vitals.tilt),
            self.next_tick,
            self.next_emission.unwrap_or(now + period),
        ];

        let next = wakes.iter().copied().min().unwrap_or(self.next_tick);
        match self.pending {
            Some(pending) => next.min(pending.deadline),
            None => next,
        }
    }

    /// Step forever, sleeping between wake-ups
    pub fn run<C, W>(&mut self, clock: &C, delay: &mut W) -> !
    where
        C: TimeSource,
        W: Delay,
    {
        log_info!("vitals monitor running");
        loop {
            let now = clock.now();
            let wake = self.step(now);
            let sleep = elapsed_ms(now, wake);
            if sleep > 0 {
                delay.delay_ms(u32::try_from(sleep).unwrap_or(u32::MAX));
            }
        }
    }

    fn check_button(&mut self, now: Timestamp) {
        let pressed = read_active(&mut self.button, self.config.button.active_low);
        if !self.edge.poll(pressed, now) {
            return;
        }

        self.monitoring = !self.monitoring;
        if self.monitoring {
            log_info!("Monitoring STARTED");
        } else {
            log_info!("Monitoring STOPPED");
        }
        self.sink.announce(self.monitoring);
    }

    fn begin_emission(&mut self, now: Timestamp) {
        let Some(temperature) = self.vitals.temperature_c() else {
            self.publish(StatusLine::placeholder());
            return;
        };

        match self.config.temperature_banding {
            TemperatureBanding::Local => {
                let status = self.config.classifier.classify(&self.vitals);
                self.publish(StatusLine::from_vitals(status, &self.vitals));
            }
            TemperatureBanding::External { label_timeout_ms } => {
                if self.pending.is_some() {
                    log_debug!("label still outstanding, skipping emission");
                    return;
                }
                match self.labels.request(temperature) {
                    Ok(()) => {
                        self.pending = Some(PendingLabel {
                            deadline: now + label_timeout_ms,
                            temperature,
                        });
                        self.poll_label(now);
                    }
                    Err(_e) => {
                        log_warn!("label request failed: {}", _e);
                        self.finish_with_label(Band::Unknown, temperature);
                    }
                }
            }
        }
    }

    fn poll_label(&mut self, now: Timestamp) {
        let Some(pending) = self.pending else {
            return;
        };

        let label = match self.labels.poll_label() {
            Ok(label) => label,
            Err(nb::Error::WouldBlock) => {
                if !is_due(now, pending.deadline) {
                    return;
                }
                log_warn!("no temperature label within timeout");
                self.stats.label_timeouts += 1;
                Band::Unknown
            }
            Err(nb::Error::Other(_e)) => {
                log_warn!("label source failed: {}", _e);
                Band::Unknown
            }
        };

        self.pending = None;
        if self.monitoring {
            self.finish_with_label(label, pending.temperature);
        }
    }

    fn finish_with_label(&mut self, label: Band, temperature: f32) {
        let status = self.config.classifier.classify_with_label(&self.vitals, label);
        let line = StatusLine::new(
            status,
            self.vitals.heart_rate_bpm(),
            Some(temperature),
            self.vitals.tilt_degrees(),
        );
        self.publish(line);
    }

    fn publish(&mut self, line: StatusLine) {
        log_info!("{}", line);

        match self.sink.emit(&line) {
            Ok(()) => self.stats.emitted += 1,
            Err(nb::Error::WouldBlock) => {
                log_warn!("status sink full, line dropped");
                self.stats.dropped += 1;
            }
            Err(nb::Error::Other(_e)) => {
                log_warn!("status sink failed: {}", _e);
                self.stats.dropped += 1;
            }
        }

        let _previous = self.vitals.last_status();
        if self.vitals.record_status(line.status) {
            log_debug!("status {} -> {}", _previous, line.status);
        }
    }

    /// Current vitals
    pub fn vitals(&self) -> &VitalsState {
        &self.vitals
    }

    /// Whether status lines are being emitted
    pub fn is_monitoring(&self) -> bool {
        self.monitoring
    }

    /// A label request is outstanding
    pub fn awaiting_label(&self) -> bool {
        self.pending.is_some()
    }

    /// Emission counters
    pub fn stats(&self) -> MonitorStats {
        self.stats
    }

    /// Active configuration
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// The status transport
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// The status transport, mutably
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// The label collaborator
    pub fn labels(&self) -> &L {
        &self.labels
    }
}
