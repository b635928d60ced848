//! Relay loop
//!
//! Pumps bytes from the publisher's pipe into the session channel until the
//! publisher closes, the pipe fails, or the session is cancelled.

use std::io;

use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::registry::SessionGuard;

use super::config::RelayConfig;
use super::race::{race, Outcome};

/// Why a relay stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayExit {
    /// Publisher closed its sink
    Eof,
    /// Reading the pipe failed
    ReadError(io::ErrorKind),
    /// The read task panicked or was aborted
    ReadTaskFailed,
    /// The session token was cancelled
    Cancelled,
    /// The session channel was closed underneath the relay
    ChannelClosed,
}

/// Result of one chunk read: the reader is handed back for the next read
type ReadResult<R> = (R, BytesMut, io::Result<usize>);

/// Background pump for one claimed mount
///
/// Only one read is ever outstanding. A read still pending when the idle
/// timeout fires is kept and awaited again on the next iteration, so bytes it
/// eventually returns are forwarded rather than lost.
pub struct StreamRelay<R> {
    guard: SessionGuard,
    reader: R,
    config: RelayConfig,
    cancel: CancellationToken,
}

impl<R> StreamRelay<R>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    /// Create a relay for a claimed session
    pub fn new(
        guard: SessionGuard,
        reader: R,
        config: RelayConfig,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            guard,
            reader,
            config,
            cancel,
        }
    }

    /// Run the relay on a new task
    pub fn spawn(self) -> JoinHandle<RelayExit> {
        tokio::spawn(self.run())
    }

    /// Run the relay to completion
    ///
    /// On return the session channel is closed and the mount is free.
    pub async fn run(self) -> RelayExit {
        let StreamRelay {
            guard,
            reader,
            config,
            cancel,
        } = self;
        let session = guard.session().clone();

        tracing::debug!(
            mount = %session.key(),
            session_id = session.id(),
            chunk_size = config.chunk_size,
            "Relay started"
        );

        let mut reader = Some(reader);
        let mut pending: Option<JoinHandle<ReadResult<R>>> = None;

        let exit = loop {
            if pending.is_none() {
                if let Some(r) = reader.take() {
                    pending = Some(spawn_read(r, config.chunk_size));
                }
            }
            let Some(handle) = pending.as_mut() else {
                break RelayExit::ReadTaskFailed;
            };

            let outcome = race(handle, config.idle_timeout, &cancel).await;
            match outcome {
                Outcome::Completed(joined) => {
                    pending = None;

                    let (r, buf, result) = match joined {
                        Ok(read) => read,
                        Err(e) => {
                            tracing::warn!(mount = %session.key(), error = %e, "Read task failed");
                            break RelayExit::ReadTaskFailed;
                        }
                    };

                    let n = match result {
                        // A non-empty buffer read returning 0 is end-of-file
                        Ok(0) => break RelayExit::Eof,
                        Ok(n) => n,
                        Err(e) => break RelayExit::ReadError(e.kind()),
                    };
                    reader = Some(r);

                    let chunk: Bytes = buf.freeze();
                    debug_assert_eq!(chunk.len(), n);

                    let delivered = tokio::select! {
                        biased;
                        _ = cancel.cancelled() => None,
                        sent = session.send(chunk) => Some(sent),
                    };

                    match delivered {
                        None => break RelayExit::Cancelled,
                        Some(false) => break RelayExit::ChannelClosed,
                        Some(true) => {
                            session.counters().record_chunk(n);
                            tracing::trace!(mount = %session.key(), bytes = n, "Chunk relayed");
                        }
                    }
                }
                Outcome::TimedOut => {
                    session.counters().record_idle_timeout();
                    tracing::trace!(mount = %session.key(), "Relay idle");
                }
                Outcome::Cancelled => {
                    if let Some(handle) = pending.take() {
                        handle.abort();
                    }
                    break RelayExit::Cancelled;
                }
            }
        };

        tracing::debug!(
            mount = %session.key(),
            session_id = session.id(),
            exit = ?exit,
            "Relay stopped"
        );

        guard.release();
        exit
    }
}

fn spawn_read<R>(mut reader: R, chunk_size: usize) -> JoinHandle<ReadResult<R>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buf = BytesMut::zeroed(chunk_size.max(1));
        let result = reader.read(&mut buf).await;
        if let Ok(n) = result {
            buf.truncate(n);
        }
        (reader, buf, result)
    })
}
