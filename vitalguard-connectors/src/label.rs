//! Channel-backed temperature label source
//!
//! In external banding mode the monitor asks a remote classifier for the
//! temperature band. [`ChannelLabelSource`] is the monitor's end of a
//! request/answer channel pair; [`LabelEndpoint`] is the classifier's end.
//! Answers are free text and parsed with `Band::from_str`, so `"critical"`,
//! `"NORMAL\n"` and `"\"warning\""` are all accepted.
//!
//! Every request carries an id and the answer echoes it. Only the answer to
//! the latest request is accepted; answers to requests the monitor already
//! gave up on are dropped whenever they arrive.

use tokio::sync::mpsc::{self, error::TryRecvError};
use vitalguard_core::{Band, LabelError, LabelSource};

/// One temperature to classify
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelRequest {
    /// Echoed in the answer
    pub id: u32,
    pub temperature_c: f32,
}

/// Monitor side
#[derive(Debug)]
pub struct ChannelLabelSource {
    requests: mpsc::Sender<LabelRequest>,
    answers: mpsc::Receiver<(u32, String)>,
    next_id: u32,
    outstanding: Option<u32>,
}

/// Classifier side
#[derive(Debug)]
pub struct LabelEndpoint {
    requests: mpsc::Receiver<LabelRequest>,
    answers: mpsc::Sender<(u32, String)>,
}

/// Connected pair with room for `capacity` messages each way
pub fn label_channel(capacity: usize) -> (ChannelLabelSource, LabelEndpoint) {
    let capacity = capacity.max(1);
    let (req_tx, req_rx) = mpsc::channel(capacity);
    let (ans_tx, ans_rx) = mpsc::channel(capacity);
    (
        ChannelLabelSource {
            requests: req_tx,
            answers: ans_rx,
            next_id: 0,
            outstanding: None,
        },
        LabelEndpoint {
            requests: req_rx,
            answers: ans_tx,
        },
    )
}

impl ChannelLabelSource {
    /// Id of the request awaiting an answer
    pub fn outstanding(&self) -> Option<u32> {
        self.outstanding
    }
}

impl LabelSource for ChannelLabelSource {
    fn request(&mut self, temperature_c: f32) -> Result<(), LabelError> {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        self.outstanding = None;

        self.requests
            .try_send(LabelRequest { id, temperature_c })
            .map_err(|e| {
                log::warn!("label request not sent: {}", e);
                LabelError::Unavailable
            })?;
        self.outstanding = Some(id);
        Ok(())
    }

    fn poll_label(&mut self) -> nb::Result<Band, LabelError> {
        loop {
            match self.answers.try_recv() {
                Ok((id, text)) if Some(id) == self.outstanding => {
                    self.outstanding = None;
                    return text.parse::<Band>().map_err(|_| {
                        log::warn!("classifier answered {:?}", text);
                        nb::Error::Other(LabelError::Rejected)
                    });
                }
                Ok((id, _)) => log::debug!("dropped late answer to label request {}", id),
                Err(TryRecvError::Empty) => return Err(nb::Error::WouldBlock),
                Err(TryRecvError::Disconnected) => return Err(nb::Error::Other(LabelError::Unavailable)),
            }
        }
    }
}

impl LabelEndpoint {
    /// Next request to classify; `None` once the monitor is gone
    pub async fn next_request(&mut self) -> Option<LabelRequest> {
        self.requests.recv().await
    }

    /// Answer `request`
    pub async fn answer(&self, request: &LabelRequest, label: impl Into<String>) -> bool {
        self.answers.send((request.id, label.into())).await.is_ok()
    }

    /// Answer every request with `classify` until either side closes
    pub async fn serve<F>(mut self, mut classify: F) -> usize
    where
        F: FnMut(f32) -> String,
    {
        let mut served = 0;
        while let Some(request) = self.next_request().await {
            if !self.answer(&request, classify(request.temperature_c)).await {
                break;
            }
            served += 1;
        }
        served
    }
}
