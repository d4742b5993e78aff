//! Ready-made patients for end-to-end runs

use std::rc::Rc;

use vitalguard_core::time::MockClock;
use vitalguard_core::{LabelSource, Monitor, MonitorConfig, NoLabels, Peripherals};

use super::generators::{NoisyThermometer, PulseWaveform, PULSE_REST};
use super::harness::Bench;
use super::{ClockedAdc, RecordingSink, SharedLine, Signal};

/// What the sensors see
#[derive(Debug, Clone, Copy)]
pub struct Patient {
    /// Beats per minute, `None` for a sensor that picks up nothing
    pub bpm: Option<f32>,
    /// Displayed temperature
    pub temperature_c: f32,
    /// Lying tilted on the switch
    pub tilted: bool,
}

impl Patient {
    pub fn calm() -> Self {
        Self {
            bpm: Some(75.0),
            temperature_c: 24.0,
            tilted: false,
        }
    }

    pub fn feverish() -> Self {
        Self {
            temperature_c: 37.0,
            ..Self::calm()
        }
    }

    pub fn tachycardic() -> Self {
        Self {
            bpm: Some(110.0),
            ..Self::calm()
        }
    }

    pub fn fallen() -> Self {
        Self {
            tilted: true,
            ..Self::calm()
        }
    }

    pub fn detached() -> Self {
        Self {
            bpm: None,
            ..Self::calm()
        }
    }
}

pub type PatientBench<L> =
    Bench<ClockedAdc<Signal>, ClockedAdc<Signal>, SharedLine, RecordingSink, L>;

/// Bench with local temperature banding
pub fn bench(patient: Patient, config: MonitorConfig) -> PatientBench<NoLabels> {
    bench_with_labels(patient, config, |_| NoLabels)
}

/// Bench with a label source built on the shared clock
pub fn bench_with_labels<L, F>(patient: Patient, config: MonitorConfig, labels: F) -> PatientBench<L>
where
    L: LabelSource,
    F: FnOnce(Rc<MockClock>) -> L,
{
    let clock = Rc::new(MockClock::new(0));
    let button = SharedLine::new(true);

    let pulse: Signal = match patient.bpm {
        Some(bpm) => {
            let mut wave = PulseWaveform::new(bpm, 400.0, 7);
            Box::new(move |now| wave.sample(now))
        }
        None => Box::new(|_| PULSE_REST as u16),
    };
    let mut thermometer = NoisyThermometer::new(patient.temperature_c, 11);
    let thermo: Signal = Box::new(move |_| thermometer.sample());

    // Active-low switch: low when tilted
    let tilt = SharedLine::new(!patient.tilted);

    let peripherals = Peripherals {
        heart_rate: ClockedAdc::new(clock.clone(), pulse),
        temperature: ClockedAdc::new(clock.clone(), thermo),
        tilt: tilt.clone(),
        button: button.clone(),
    };

    let monitor = Monitor::new(
        config,
        peripherals,
        RecordingSink::new(clock.clone()),
        labels(clock.clone()),
    )
    .expect("valid config");

    Bench {
        monitor,
        clock,
        button,
        tilt: Some(tilt),
        steps: 0,
    }
}
