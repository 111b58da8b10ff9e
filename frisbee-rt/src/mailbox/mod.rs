//! Per-subscription mailboxes.
//!
//! One mailbox backs each fan-out subscription: the switch pushes payloads
//! in, the owning actor's connector takes them out. Unbounded, because an
//! actor that is Handling or AwaitingReply must be able to let inbound
//! envelopes queue without blocking the switch.

// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use thiserror::Error;
use tokio::sync::mpsc;

// Layer 3: Internal module imports
// (none)

/// Mailbox failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MailboxError {
    /// The receiving half is gone (its actor stopped).
    #[error("mailbox closed")]
    Closed,
}

/// The producing half of a mailbox.
#[derive(Debug)]
pub struct MailboxSender<T> {
    tx: mpsc::UnboundedSender<T>,
}

impl<T> Clone for MailboxSender<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<T> MailboxSender<T> {
    /// Enqueue one item; fails only when the receiver is gone.
    pub fn send(&self, item: T) -> Result<(), MailboxError> {
        self.tx.send(item).map_err(|_| MailboxError::Closed)
    }

    /// Whether the receiving half has been dropped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// The consuming half of a mailbox.
#[derive(Debug)]
pub struct MailboxReceiver<T> {
    rx: mpsc::UnboundedReceiver<T>,
}

impl<T> MailboxReceiver<T> {
    /// Wait for the next item; `None` once every sender is gone.
    pub async fn recv(&mut self) -> Option<T> {
        self.rx.recv().await
    }

    /// Non-blocking take, for draining in tests and shutdown paths.
    pub fn try_recv(&mut self) -> Option<T> {
        self.rx.try_recv().ok()
    }
}

/// Create a connected mailbox pair.
pub fn mailbox<T>() -> (MailboxSender<T>, MailboxReceiver<T>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (MailboxSender { tx }, MailboxReceiver { rx })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_send_and_receive_in_order() {
        let (tx, mut rx) = mailbox();

        tx.send(1).unwrap();
        tx.send(2).unwrap();
        tx.send(3).unwrap();

        assert_eq!(rx.recv().await, Some(1));
        assert_eq!(rx.recv().await, Some(2));
        assert_eq!(rx.recv().await, Some(3));
    }

    #[tokio::test]
    async fn test_send_after_receiver_dropped() {
        let (tx, rx) = mailbox();
        drop(rx);

        assert_eq!(tx.send(1), Err(MailboxError::Closed));
        assert!(tx.is_closed());
    }

    #[tokio::test]
    async fn test_recv_none_after_senders_dropped() {
        let (tx, mut rx) = mailbox::<u32>();
        drop(tx);

        assert_eq!(rx.recv().await, None);
    }
}
