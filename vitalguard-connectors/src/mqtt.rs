//! MQTT status transport
//!
//! The monitor publishes every status line to one topic (default
//! `project/status`) on a TLS broker; the alert bridge subscribes to the same
//! topic. Both sides use `rumqttc`:
//!
//! ```text
//! Monitor ─▶ ChannelSink ─▶ MqttPublisher ─▶ broker ─▶ MqttSubscriber ─▶ AlertBridge
//!                              ▲                            │
//!                         EventLoopDriver              (own event loop)
//! ```
//!
//! Lines are published at QoS 1 (at least once). Connection loss is retried
//! with exponential backoff from 1 s up to 30 s; lines produced while the
//! broker is away queue in the client up to its capacity.
//!
//! ## Example
//!
//! ```no_run
//! use vitalguard_connectors::{mqtt::{MqttConfig, MqttPublisher}, ChannelSink};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = MqttConfig::from_env()?;
//! let (mut publisher, driver) = MqttPublisher::connect(&config)?;
//! tokio::spawn(driver.run());
//!
//! let (sink, lines) = ChannelSink::new(16);
//! // hand `sink` to the monitor thread, then:
//! publisher.forward(lines).await;
//! # drop(sink);
//! # Ok(())
//! # }
//! ```

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Packet, QoS, Transport};
use thiserror::Error;
use tokio::sync::mpsc;

use crate::sink::Outbound;
use crate::{AsyncConnector, ConnectionStats};

/// Default TLS port
pub const DEFAULT_PORT: u16 = 8883;
/// Default status topic
pub const DEFAULT_TOPIC: &str = "project/status";

const ENV_PREFIX: &str = "VITALGUARD_MQTT_";

/// MQTT-specific errors
#[derive(Debug, Error)]
pub enum MqttError {
    /// Missing or invalid setting
    #[error("Configuration error: {0}")]
    Config(String),

    /// Request could not be queued in the client
    #[error("Client error: {0}")]
    Client(#[from] rumqttc::ClientError),

    /// Broker connection failed
    #[error("Connection error: {0}")]
    Connection(String),
}

/// Broker settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MqttConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub topic: String,
    pub client_id: String,
    pub keep_alive: Duration,
    pub tls: bool,
    /// Requests buffered in the client while the broker is away
    pub capacity: usize,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: DEFAULT_PORT,
            username: None,
            password: None,
            topic: DEFAULT_TOPIC.to_owned(),
            client_id: default_client_id("vitalguard"),
            keep_alive: Duration::from_secs(60),
            tls: true,
            capacity: 32,
        }
    }
}

fn default_client_id(prefix: &str) -> String {
    let millis = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    format!("{}-{}", prefix, millis)
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl MqttConfig {
    /// Config for `host` with every other setting at its default
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Self::default()
        }
    }

    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    pub fn topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = topic.into();
        self
    }

    pub fn client_id(mut self, id: impl Into<String>) -> Self {
        self.client_id = id.into();
        self
    }

    pub fn tls(mut self, enabled: bool) -> Self {
        self.tls = enabled;
        self
    }

    /// Read `VITALGUARD_MQTT_{HOST,PORT,USER,PASS,TOPIC,CLIENT_ID,TLS}`
    pub fn from_env() -> Result<Self, MqttError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) over any key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, MqttError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{ENV_PREFIX}{name}")).filter(|v| !v.trim().is_empty());

        let host = var("HOST").ok_or_else(|| MqttError::Config(format!("{ENV_PREFIX}HOST is not set")))?;
        let mut config = Self::new(host.trim());

        if let Some(port) = var("PORT") {
            config.port = port
                .trim()
                .parse()
                .map_err(|_| MqttError::Config(format!("invalid port {port:?}")))?;
        }
        config.username = var("USER");
        config.password = var("PASS");
        if let Some(topic) = var("TOPIC") {
            config.topic = topic;
        }
        if let Some(id) = var("CLIENT_ID") {
            config.client_id = id;
        }
        if let Some(tls) = var("TLS") {
            config.tls = parse_flag(&tls).ok_or_else(|| MqttError::Config(format!("invalid TLS flag {tls:?}")))?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), MqttError> {
        if self.host.trim().is_empty() {
            return Err(MqttError::Config("broker host is empty".into()));
        }
        if self.topic.is_empty() || self.topic.contains(['+', '#']) {
            return Err(MqttError::Config(format!("invalid publish topic {:?}", self.topic)));
        }
        if self.username.is_some() != self.password.is_some() {
            return Err(MqttError::Config("username and password must be set together".into()));
        }
        if self.client_id.is_empty() {
            return Err(MqttError::Config("client id is empty".into()));
        }
        Ok(())
    }

    /// `rumqttc` options for this config
    pub fn mqtt_options(&self) -> MqttOptions {
        let mut options = MqttOptions::new(self.client_id.clone(), self.host.clone(), self.port);
        options.set_keep_alive(self.keep_alive);
        if let (Some(user), Some(pass)) = (&self.username, &self.password) {
            options.set_credentials(user.clone(), pass.clone());
        }
        if self.tls {
            options.set_transport(Transport::tls_with_default_config());
        }
        options
    }
}

/// Reconnect delay: doubles from 1 s, capped at 30 s
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    current: Duration,
}

impl Backoff {
    pub const INITIAL: Duration = Duration::from_secs(1);
    pub const MAX: Duration = Duration::from_secs(30);

    pub fn new() -> Self {
        Self { current: Self::INITIAL }
    }

    /// Delay to wait now; the following one is longer
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = (self.current * 2).min(Self::MAX);
        delay
    }

    pub fn reset(&mut self) {
        self.current = Self::INITIAL;
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new()
    }
}

/// Drives the publisher's connection; spawn [`run`](Self::run) on the runtime
pub struct EventLoopDriver {
    eventloop: EventLoop,
    connected: Arc<AtomicBool>,
    reconnections: Arc<AtomicU32>,
}

impl EventLoopDriver {
    pub async fn run(mut self) {
        let mut backoff = Backoff::new();
        loop {
            match self.eventloop.poll().await {
                Ok(Event::Incoming(Packet::ConnAck(_))) => {
                    if self.connected.swap(true, Ordering::Relaxed) {
                        continue;
                    }
                    log::info!("connected to MQTT broker");
                    backoff.reset();
                }
                Ok(Event::Incoming(Packet::PubAck(ack))) => {
                    log::trace!("publish {} acknowledged", ack.pkid);
                }
                Ok(_) => {}
                Err(e) => {
                    if self.connected.swap(false, Ordering::Relaxed) {
                        self.reconnections.fetch_add(1, Ordering::Relaxed);
                    }
                    let delay = backoff.next_delay();
                    log::warn!("MQTT connection error: {}; retrying in {:?}", e, delay);
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

/// Publishes status lines
pub struct MqttPublisher {
    client: AsyncClient,
    topic: String,
    connected: Arc<AtomicBool>,
    reconnections: Arc<AtomicU32>,
    stats: ConnectionStats,
}

impl MqttPublisher {
    /// Create the client; nothing is sent until the driver runs
    pub fn connect(config: &MqttConfig) -> Result<(Self, EventLoopDriver), MqttError> {
        config.validate()?;
        let (client, eventloop) = AsyncClient::new(config.mqtt_options(), config.capacity.max(1));
        let connected = Arc::new(AtomicBool::new(false));
        let reconnections = Arc::new(AtomicU32::new(0));

        let publisher = Self {
            client,
            topic: config.topic.clone(),
            connected: Arc::clone(&connected),
            reconnections: Arc::clone(&reconnections),
            stats: ConnectionStats::default(),
        };
        let driver = EventLoopDriver {
            eventloop,
            connected,
            reconnections,
        };
        Ok((publisher, driver))
    }

    /// Queue one payload on the status topic
    pub async fn publish(&mut self, payload: &str) -> Result<(), MqttError> {
        let topic = self.topic.clone();
        self.send(&topic, payload.as_bytes()).await
    }

    /// Publish monitor output until the sink side is dropped
    ///
    /// Status lines are published; monitoring notices are only logged.
    pub async fn forward(&mut self, mut lines: mpsc::Receiver<Outbound>) -> ConnectionStats {
        while let Some(message) = lines.recv().await {
            match message {
                Outbound::Status(line) => {
                    let payload = line.to_string();
                    if let Err(e) = self.publish(&payload).await {
                        log::warn!("publish of {:?} failed: {}", payload, e);
                    }
                }
                Outbound::Notice(_) => log::info!("{}", message.payload()),
            }
        }
        log::info!("status channel closed, publisher stopping");
        self.stats()
    }

    pub async fn disconnect(&self) -> Result<(), MqttError> {
        self.client.disconnect().await.map_err(MqttError::from)
    }
}

#[async_trait::async_trait]
impl AsyncConnector for MqttPublisher {
    type Error = MqttError;

    async fn send(&mut self, topic: &str, data: &[u8]) -> Result<(), Self::Error> {
        match self
            .client
            .publish(topic, QoS::AtLeastOnce, false, data.to_vec())
            .await
        {
            Ok(()) => {
                self.stats.messages_sent += 1;
                self.stats.bytes_sent += data.len() as u64;
                Ok(())
            }
            Err(e) => {
                self.stats.messages_failed += 1;
                self.stats.last_error = Some(e.to_string());
                Err(e.into())
            }
        }
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }

    fn stats(&self) -> ConnectionStats {
        ConnectionStats {
            reconnections: self.reconnections.load(Ordering::Relaxed),
            ..self.stats.clone()
        }
    }
}

/// Receives raw payloads from the status topic
pub struct MqttSubscriber {
    client: AsyncClient,
    eventloop: EventLoop,
    topic: String,
    backoff: Backoff,
}

impl MqttSubscriber {
    pub fn connect(config: &MqttConfig) -> Result<Self, MqttError> {
        config.validate()?;
        let (client, eventloop) = AsyncClient::new(config.mqtt_options(), config.capacity.max(1));
        Ok(Self {
            client,
            eventloop,
            topic: config.topic.clone(),
            backoff: Backoff::new(),
        })
    }

    /// Wait for the next payload on the topic, reconnecting as needed
    pub async fn next_payload(&mut self) -> Vec<u8> {
        loop {
            match self.eventloop.poll().await {
                Ok(Event::Incoming(Packet::ConnAck(_))) => {
                    self.backoff.reset();
                    // Subscriptions do not survive a clean session
                    match self.client.subscribe(self.topic.clone(), QoS::AtLeastOnce).await {
                        Ok(()) => log::info!("subscribed to {}", self.topic),
                        Err(e) => log::error!("subscribe to {} failed: {}", self.topic, e),
                    }
                }
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    if publish.topic == self.topic {
                        return publish.payload.to_vec();
                    }
                    log::debug!("message on unexpected topic {}", publish.topic);
                }
                Ok(_) => {}
                Err(e) => {
                    let delay = self.backoff.next_delay();
                    log::warn!("MQTT connection error: {}; retrying in {:?}", e, delay);
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    /// Feed payloads into `tx` until its receiver is dropped
    pub async fn forward(mut self, tx: mpsc::Sender<Vec<u8>>) {
        loop {
            let payload = self.next_payload().await;
            if tx.send(payload).await.is_err() {
                log::info!("payload receiver gone, subscriber stopping");
                return;
            }
        }
    }
}
