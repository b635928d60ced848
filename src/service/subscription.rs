//! Subscriber handle

use async_broadcast::{Receiver, RecvError};
use bytes::Bytes;
use tokio_util::sync::CancellationToken;

use crate::registry::MountKey;

/// Read side of a mount's session
///
/// Yields chunks in the order the publisher wrote them. `recv` returns `None`
/// once the publisher's session has ended or the subscriber's own token is
/// cancelled.
///
/// Once `recv` observes cancellation the receiver is dropped, so the relay no
/// longer waits on this subscriber.
pub struct Subscription {
    mount: MountKey,
    session_id: u64,
    rx: Option<Receiver<Bytes>>,
    cancel: CancellationToken,
}

impl Subscription {
    pub(crate) fn new(
        mount: MountKey,
        session_id: u64,
        rx: Receiver<Bytes>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            mount,
            session_id,
            rx: Some(rx),
            cancel,
        }
    }

    /// Mount this subscription reads
    pub fn mount(&self) -> &MountKey {
        &self.mount
    }

    /// Session this subscription is attached to
    pub fn session_id(&self) -> u64 {
        self.session_id
    }

    /// Receive the next chunk, or `None` at end-of-stream
    pub async fn recv(&mut self) -> Option<Bytes> {
        loop {
            let rx = self.rx.as_mut()?;
            let received = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => None,
                received = rx.recv() => Some(received),
            };

            let Some(received) = received else {
                self.detach();
                return None;
            };

            match received {
                Ok(chunk) => return Some(chunk),
                Err(RecvError::Closed) => {
                    self.detach();
                    return None;
                }
                Err(RecvError::Overflowed(skipped)) => {
                    tracing::warn!(mount = %self.mount, skipped = skipped, "Subscriber lagged");
                }
            }
        }
    }

    /// Whether the stream has ended for this subscriber
    pub fn is_closed(&self) -> bool {
        self.rx.as_ref().map_or(true, Receiver::is_closed)
    }

    /// Take the underlying broadcast receiver, if still attached
    pub fn into_receiver(self) -> Option<Receiver<Bytes>> {
        self.rx
    }

    fn detach(&mut self) {
        if self.rx.take().is_some() {
            tracing::debug!(
                mount = %self.mount,
                session_id = self.session_id,
                "Subscriber detached"
            );
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("mount", &self.mount)
            .field("session_id", &self.session_id)
            .field("closed", &self.is_closed())
            .finish()
    }
}
