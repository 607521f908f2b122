// ── Message channel ──
//
// In-process stand-in for the platform's bidirectional message channel.
// Frames cross as JSON text so both ends exercise the real wire codec;
// each endpoint sees `Open` first and `Close` once its peer is gone.

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::protocol::Message;

/// Lifecycle and payload events observed by one end of the channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    Open,
    Message(Message),
    Close,
}

#[derive(Debug)]
enum Frame {
    Open,
    Text(String),
    Close,
}

/// Cloneable sending half, handed to tasks that emit messages.
#[derive(Debug, Clone)]
pub struct Sender {
    tx: mpsc::UnboundedSender<Frame>,
}

impl Sender {
    pub fn send(&self, msg: &Message) -> Result<(), CoreError> {
        let text = msg.to_json()?;
        self.tx
            .send(Frame::Text(text))
            .map_err(|_| CoreError::ChannelClosed)
    }

    /// Send, logging instead of failing when the peer has gone away.
    pub fn emit(&self, msg: &Message) {
        if let Err(e) = self.send(msg) {
            debug!(key = msg.key(), error = %e, "dropping message");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// One end of a connected pair.
#[derive(Debug)]
pub struct Endpoint {
    sender: Sender,
    rx: mpsc::UnboundedReceiver<Frame>,
    closed: bool,
}

/// Build two connected endpoints. Each sees [`ChannelEvent::Open`] first.
pub fn pair() -> (Endpoint, Endpoint) {
    let (a_tx, a_rx) = mpsc::unbounded_channel();
    let (b_tx, b_rx) = mpsc::unbounded_channel();

    // Fresh channels with live receivers cannot reject a send.
    let _ = a_tx.send(Frame::Open);
    let _ = b_tx.send(Frame::Open);

    let a = Endpoint {
        sender: Sender { tx: b_tx },
        rx: a_rx,
        closed: false,
    };
    let b = Endpoint {
        sender: Sender { tx: a_tx },
        rx: b_rx,
        closed: false,
    };
    (a, b)
}

impl Endpoint {
    /// Handle for sending to the peer.
    pub fn sender(&self) -> Sender {
        self.sender.clone()
    }

    pub fn send(&self, msg: &Message) -> Result<(), CoreError> {
        self.sender.send(msg)
    }

    /// Next event. Undecodable frames are logged and skipped.
    /// Returns `Close` forever once the peer has closed or dropped.
    pub async fn recv(&mut self) -> ChannelEvent {
        loop {
            if self.closed {
                return ChannelEvent::Close;
            }
            let frame = self.rx.recv().await;
            if let Some(event) = self.accept(frame) {
                return event;
            }
        }
    }

    /// Non-blocking variant of [`recv`](Self::recv); `None` when nothing is queued.
    pub fn try_recv(&mut self) -> Option<ChannelEvent> {
        loop {
            if self.closed {
                return Some(ChannelEvent::Close);
            }
            let frame = match self.rx.try_recv() {
                Ok(frame) => Some(frame),
                Err(mpsc::error::TryRecvError::Empty) => return None,
                Err(mpsc::error::TryRecvError::Disconnected) => None,
            };
            if let Some(event) = self.accept(frame) {
                return Some(event);
            }
        }
    }

    /// Tell the peer we are gone.
    pub fn close(self) {
        let _ = self.sender.tx.send(Frame::Close);
    }

    fn accept(&mut self, frame: Option<Frame>) -> Option<ChannelEvent> {
        match frame {
            Some(Frame::Open) => Some(ChannelEvent::Open),
            Some(Frame::Text(text)) => match Message::from_json(&text) {
                Ok(msg) => Some(ChannelEvent::Message(msg)),
                Err(e) => {
                    warn!(error = %e, "skipping undecodable frame");
                    None
                }
            },
            Some(Frame::Close) | None => {
                self.closed = true;
                Some(ChannelEvent::Close)
            }
        }
    }
}
