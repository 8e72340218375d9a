use std::sync::atomic::{AtomicBool, Ordering};

use axum::extract::ws::Message;
use tokio::sync::mpsc::UnboundedSender;
use uuid::Uuid;

pub type ClientId = String;

/// A connected client.
///
/// The `closed` flag is the relay's own view of the connection, distinct
/// from the transport state: once it is set, the connection takes part in no
/// further subscription changes or deliveries, even if frames from it are
/// still queued somewhere.
#[derive(Debug)]
pub struct Client {
    pub id: ClientId,
    sender: UnboundedSender<Message>,
    closed: AtomicBool,
}

impl Client {
    pub fn new(sender: UnboundedSender<Message>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            sender,
            closed: AtomicBool::new(false),
        }
    }

    /// Best-effort send. Returns `false` without queueing anything if the
    /// client is already closed; a send that fails because the writer task
    /// is gone closes the client.
    pub fn send(&self, message: Message) -> bool {
        if self.is_closed() {
            return false;
        }
        if self.sender.send(message).is_err() {
            self.close();
            return false;
        }
        true
    }

    /// Marks the client closed and enqueues one transport close frame.
    /// Only the first call does anything.
    pub fn close(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            let _ = self.sender.send(Message::Close(None));
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}
