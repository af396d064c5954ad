//! One-shot message channel between the extractor and the controller.
//!
//! Mirrors the runtime messaging of a browser extension: the sender posts a
//! message and may receive an acknowledgment; the receiver replies through
//! the envelope it was handed.

use crate::model::BundleInfo;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};

/// Messages the extractor can post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", content = "data", rename_all = "camelCase")]
pub enum RuntimeMessage {
    SendBundleInfo(BundleInfo),
}

/// Acknowledgment sent back by the receiver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    pub status: String,
}

impl Ack {
    pub fn received() -> Self {
        Self {
            status: "received".to_string(),
        }
    }
}

/// Why a message could not be delivered or acknowledged.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// Nobody is listening (the controller is gone).
    #[error("receiving end does not exist")]
    NoReceiver,
    /// The receiver took the message but dropped the reply port.
    #[error("message port closed before a response was received")]
    PortClosed,
}

/// A delivered message plus its reply port.
#[derive(Debug)]
pub struct Envelope {
    pub message: RuntimeMessage,
    reply: oneshot::Sender<Ack>,
}

impl Envelope {
    /// Acknowledge the message. A sender that stopped waiting is ignored.
    pub fn reply(self, ack: Ack) -> RuntimeMessage {
        let _ = self.reply.send(ack);
        self.message
    }
}

#[derive(Debug, Clone)]
pub struct MessageSender {
    tx: mpsc::Sender<Envelope>,
}

#[derive(Debug)]
pub struct MessageReceiver {
    rx: mpsc::Receiver<Envelope>,
}

/// Creates a connected sender/receiver pair.
pub fn channel() -> (MessageSender, MessageReceiver) {
    let (tx, rx) = mpsc::channel(4);
    (MessageSender { tx }, MessageReceiver { rx })
}

impl MessageSender {
    /// Posts `message` and waits for the acknowledgment.
    pub async fn send(&self, message: RuntimeMessage) -> Result<Ack, DeliveryError> {
        let (reply, ack_rx) = oneshot::channel();
        self.tx
            .send(Envelope { message, reply })
            .await
            .map_err(|_| DeliveryError::NoReceiver)?;
        ack_rx.await.map_err(|_| DeliveryError::PortClosed)
    }
}

impl MessageReceiver {
    /// Next message, or `None` once every sender is gone.
    pub async fn recv(&mut self) -> Option<Envelope> {
        self.rx.recv().await
    }
}
