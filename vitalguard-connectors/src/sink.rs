//! Channel-backed status sink
//!
//! Hands monitor output to an async task (usually [`MqttPublisher`]) over a
//! bounded `tokio` channel. The monitor side never blocks: a full channel
//! reports `WouldBlock` and the line is dropped by the monitor.
//!
//! [`MqttPublisher`]: crate::mqtt::MqttPublisher

use tokio::sync::mpsc::{self, error::TrySendError};
use vitalguard_core::{SinkError, StatusLine, StatusSink};

/// Message from the monitor to the transport task
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outbound {
    /// One emitted status line
    Status(StatusLine),
    /// Monitoring switched on (`true`) or off
    Notice(bool),
}

impl Outbound {
    /// Text as sent on the wire
    pub fn payload(&self) -> String {
        match self {
            Self::Status(line) => line.to_string(),
            Self::Notice(true) => "Monitoring STARTED".to_owned(),
            Self::Notice(false) => "Monitoring STOPPED".to_owned(),
        }
    }
}

/// [`StatusSink`] over a bounded channel
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::Sender<Outbound>,
}

impl ChannelSink {
    /// Sink plus the receiving end for the transport task
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<Outbound>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl StatusSink for ChannelSink {
    fn emit(&mut self, line: &StatusLine) -> nb::Result<(), SinkError> {
        self.tx.try_send(Outbound::Status(*line)).map_err(|e| match e {
            TrySendError::Full(_) => nb::Error::WouldBlock,
            TrySendError::Closed(_) => nb::Error::Other(SinkError::Disconnected),
        })
    }

    fn announce(&mut self, monitoring: bool) {
        if let Err(e) = self.tx.try_send(Outbound::Notice(monitoring)) {
            log::warn!("monitoring notice not queued: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vitalguard_core::Band;

    fn line(status: Band) -> StatusLine {
        StatusLine::new(status, Some(72.0), Some(24.0), Some(0.0))
    }

    #[test]
    fn lines_and_notices_arrive_in_order() {
        let (mut sink, mut rx) = ChannelSink::new(4);
        sink.announce(true);
        sink.emit(&line(Band::Normal)).unwrap();
        sink.announce(false);

        assert_eq!(rx.try_recv().unwrap().payload(), "Monitoring STARTED");
        assert_eq!(
            rx.try_recv().unwrap().payload(),
            "NORMAL,bpm=72.0,temp=24.0,tilt=0"
        );
        assert_eq!(rx.try_recv().unwrap(), Outbound::Notice(false));
    }

    #[test]
    fn full_channel_would_block() {
        let (mut sink, _rx) = ChannelSink::new(1);
        sink.emit(&line(Band::Normal)).unwrap();
        assert_eq!(sink.emit(&line(Band::Warning)), Err(nb::Error::WouldBlock));
    }

    #[test]
    fn closed_channel_disconnected() {
        let (mut sink, rx) = ChannelSink::new(1);
        drop(rx);
        assert!(sink.is_closed());
        assert_eq!(
            sink.emit(&line(Band::Normal)),
            Err(nb::Error::Other(SinkError::Disconnected))
        );
        // Announcing into a closed channel only logs
        sink.announce(true);
    }

    #[tokio::test]
    async fn receiver_task_sees_lines() {
        let (mut sink, mut rx) = ChannelSink::new(8);
        let reader = tokio::spawn(async move {
            let mut seen = Vec::new();
            while let Some(msg) = rx.recv().await {
                seen.push(msg.payload());
            }
            seen
        });

        sink.emit(&StatusLine::placeholder()).unwrap();
        drop(sink);

        let seen = reader.await.unwrap();
        assert_eq!(seen, vec!["UNKNOWN,bpm=NA,temp=NA,tilt=NA".to_owned()]);
    }
}
