//! In-memory byte pipe between a publisher and its relay
//!
//! The publisher gets a [`PublisherSink`] (write half only); the relay owns
//! the read end. Writes wait once `capacity` bytes are buffered and unread,
//! which is how a stalled channel pushes back on the publisher.

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::io::{AsyncWrite, DuplexStream};

use crate::registry::MountKey;

/// Write destination handed to a publisher
///
/// Shutting the sink down (or dropping it) ends the stream: the relay reads
/// the remaining bytes, then sees end-of-file and frees the mount. Writes fail
/// with `BrokenPipe` once the relay has stopped.
#[derive(Debug)]
pub struct PublisherSink {
    mount: MountKey,
    inner: DuplexStream,
}

impl PublisherSink {
    /// Mount this sink publishes to
    pub fn mount(&self) -> &MountKey {
        &self.mount
    }
}

impl AsyncWrite for PublisherSink {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.get_mut().inner).poll_write(cx, buf)
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_shutdown(cx)
    }
}

/// Create a pipe for `mount`, returning the publisher's sink and the read end
pub fn pipe(mount: MountKey, capacity: usize) -> (PublisherSink, DuplexStream) {
    let (writer, reader) = tokio::io::duplex(capacity.max(1));
    (
        PublisherSink {
            mount,
            inner: writer,
        },
        reader,
    )
}
