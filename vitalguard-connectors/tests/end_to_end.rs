//! Monitor → channel → bridge → dashboard, on virtual time
//!
//! The MQTT hop is replaced by draining the sink's channel straight into the
//! bridge, which is exactly what `MqttPublisher` and `MqttSubscriber` carry
//! byte for byte.

use std::cell::Cell;
use std::rc::Rc;

use vitalguard_connectors::{
    label_channel, AlertBridge, AlertConfig, AlertMessage, ChannelSink, ConnectorError,
    DashboardState, Notifier, Outbound,
};
use vitalguard_core::hal::{AnalogInput, DigitalInput};
use vitalguard_core::{
    Band, LabelSource, Monitor, MonitorConfig, Peripherals, TemperatureBanding, Timestamp,
};

/// LM35 counts for 24.0 °C displayed (19 °C at the sensor + 5 °C offset)
const RAW_24C: u16 = 3773;
/// LM35 counts for 37.0 °C displayed
const RAW_37C: u16 = 6355;
/// Flat pulse signal: no beats, BPM stays absent
const FLAT_PULSE: u16 = 30_000;

struct Fixed(u16);

impl AnalogInput for Fixed {
    fn read_u16(&mut self) -> u16 {
        self.0
    }
}

#[derive(Clone)]
struct Pin(Rc<Cell<bool>>);

impl DigitalInput for Pin {
    fn is_high(&mut self) -> bool {
        self.0.get()
    }
}

#[derive(Default)]
struct Outbox(Vec<AlertMessage>);

impl Notifier for Outbox {
    fn notify(&mut self, message: &AlertMessage) -> Result<(), ConnectorError> {
        self.0.push(message.clone());
        Ok(())
    }
}

type Rig<L> = Monitor<Fixed, Fixed, Pin, Pin, ChannelSink, L>;

fn rig<L: LabelSource>(
    raw_temp: u16,
    config: MonitorConfig,
    labels: L,
) -> (Rig<L>, Pin, tokio::sync::mpsc::Receiver<Outbound>) {
    let button = Pin(Rc::new(Cell::new(true)));
    let tilt = Pin(Rc::new(Cell::new(true)));
    let (sink, rx) = ChannelSink::new(64);
    let peripherals = Peripherals {
        heart_rate: Fixed(FLAT_PULSE),
        temperature: Fixed(raw_temp),
        tilt,
        button: button.clone(),
    };
    let monitor = Monitor::new(config, peripherals, sink, labels).unwrap();
    (monitor, button, rx)
}

/// Button held for the first 100 ms, then released
fn button_level(now: Timestamp) -> bool {
    now >= 100
}

fn drain(rx: &mut tokio::sync::mpsc::Receiver<Outbound>) -> Vec<Outbound> {
    let mut out = Vec::new();
    while let Ok(message) = rx.try_recv() {
        out.push(message);
    }
    out
}

fn bridge_all(messages: &[Outbound]) -> AlertBridge<DashboardState, Outbox> {
    let mut bridge = AlertBridge::new(DashboardState::new(0), Outbox::default(), AlertConfig::default());
    for (i, message) in messages.iter().enumerate() {
        bridge.handle_payload(message.payload().as_bytes(), i as u64 * 1_000);
    }
    bridge
}

#[test]
fn fever_reaches_dashboard_and_alerts_once() {
    let (mut monitor, button, mut rx) = rig(RAW_37C, MonitorConfig::default(), vitalguard_core::NoLabels);

    let mut now = 0;
    while now < 3_500 {
        button.0.set(button_level(now));
        now = monitor.step(now);
    }

    let messages = drain(&mut rx);
    assert_eq!(messages[0], Outbound::Notice(true));
    let lines: Vec<String> = messages[1..].iter().map(Outbound::payload).collect();
    assert_eq!(lines.len(), 3);
    assert!(lines.iter().all(|l| l == "CRITICAL,bpm=NA,temp=37.0,tilt=0"));

    let bridge = bridge_all(&messages);
    let stats = bridge.stats();
    assert_eq!(stats.received, 4);
    // "Monitoring STARTED" is not a status
    assert_eq!(stats.ignored, 1);
    assert_eq!(stats.alerts_sent, 1);

    let dashboard = bridge.dashboard();
    assert_eq!(dashboard.level(), Band::Critical);
    assert!(dashboard.lamps().red);
    let snapshot = dashboard.snapshot(0);
    assert_eq!(snapshot.temp, Some(37.0));
    assert_eq!(snapshot.bpm, None);
    assert_eq!(bridge.notifier().0[0].subject, "PATIENT STATUS: CRITICAL");
}

#[test]
fn calm_patient_stays_green() {
    let (mut monitor, button, mut rx) = rig(RAW_24C, MonitorConfig::default(), vitalguard_core::NoLabels);

    let mut now = 0;
    while now < 5_500 {
        button.0.set(button_level(now));
        now = monitor.step(now);
    }

    let bridge = bridge_all(&drain(&mut rx));
    assert_eq!(bridge.stats().received, 6);
    assert_eq!(bridge.stats().alerts_sent, 0);
    assert!(bridge.dashboard().lamps().green);
}

#[test]
fn full_channel_drops_lines_without_stalling() {
    let button = Pin(Rc::new(Cell::new(true)));
    let (sink, mut rx) = ChannelSink::new(1);
    let peripherals = Peripherals {
        heart_rate: Fixed(FLAT_PULSE),
        temperature: Fixed(RAW_24C),
        tilt: Pin(Rc::new(Cell::new(true))),
        button: button.clone(),
    };
    let mut monitor = Monitor::without_labels(MonitorConfig::default(), peripherals, sink).unwrap();

    let mut now = 0;
    while now < 4_500 {
        button.0.set(button_level(now));
        now = monitor.step(now);
    }

    // The start notice filled the only slot
    assert_eq!(drain(&mut rx), vec![Outbound::Notice(true)]);
    assert_eq!(monitor.stats().emitted, 0);
    assert_eq!(monitor.stats().dropped, 4);

    // Space again: the next emission goes through
    while now < 5_500 {
        now = monitor.step(now);
    }
    assert_eq!(drain(&mut rx).len(), 1);
    assert_eq!(monitor.stats().emitted, 1);
    assert!(!monitor.sink().is_closed());
}

#[tokio::test]
async fn remote_classifier_labels_temperature() {
    let (labels, endpoint) = label_channel(4);
    let classifier = tokio::spawn(endpoint.serve(|temperature| {
        (if temperature > 23.5 { "warning" } else { "normal" }).to_owned()
    }));

    let config = MonitorConfig::default().with_temperature_banding(TemperatureBanding::external());
    let (mut monitor, button, mut rx) = rig(RAW_24C, config, labels);

    let mut now = 0;
    while now < 3_500 {
        button.0.set(button_level(now));
        now = monitor.step(now);
        tokio::task::yield_now().await;
    }

    let messages = drain(&mut rx);
    let statuses: Vec<Band> = messages
        .iter()
        .filter_map(|m| match m {
            Outbound::Status(line) => Some(line.status),
            Outbound::Notice(_) => None,
        })
        .collect();
    assert_eq!(statuses, vec![Band::Warning; 3]);
    assert_eq!(monitor.stats().label_timeouts, 0);

    let bridge = bridge_all(&messages);
    assert_eq!(bridge.dashboard().level(), Band::Warning);
    assert_eq!(bridge.stats().alerts_sent, 1);

    drop(monitor);
    assert_eq!(classifier.await.unwrap(), 3);
}
