//! Per-connection handler.
//!
//! The controller streams packets without any length header, so chunk
//! boundaries are inferred from silence: bytes accumulate until the peer has
//! been quiet for longer than the flush threshold, then the whole buffer is
//! handed to the extractor as one chunk.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use bytes::BytesMut;
use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;
use uuid::Uuid;

use courtside_events::Shutdown;

use crate::config::ListenerConfig;
use crate::error::Result;
use crate::publisher::SnapshotPublisher;

pub(crate) struct Connection {
    id: Uuid,
    peer: SocketAddr,
    stream: TcpStream,
    config: ListenerConfig,
    publisher: Arc<SnapshotPublisher>,
    buffer: BytesMut,
}

impl Connection {
    pub(crate) fn new(
        id: Uuid,
        stream: TcpStream,
        peer: SocketAddr,
        config: ListenerConfig,
        publisher: Arc<SnapshotPublisher>,
    ) -> Self {
        Self {
            id,
            peer,
            stream,
            buffer: BytesMut::with_capacity(config.buffer_size),
            config,
            publisher,
        }
    }

    /// Handle the connection until the peer closes it, it fails, or shutdown.
    /// Whatever is still buffered at that point is flushed as a final chunk.
    pub(crate) async fn run(mut self, mut shutdown: Shutdown) {
        tracing::info!(connection_id = %self.id, peer = %self.peer, "Controller connected");

        if let Err(e) = self.read_loop(&mut shutdown).await {
            tracing::warn!(
                connection_id = %self.id,
                peer = %self.peer,
                error = %e,
                "Controller connection faulted"
            );
        }

        if !self.buffer.is_empty() {
            self.flush().await;
        }

        tracing::info!(connection_id = %self.id, peer = %self.peer, "Controller disconnected");
    }

    async fn read_loop(&mut self, shutdown: &mut Shutdown) -> Result<()> {
        let mut read_buf = vec![0u8; self.config.buffer_size.max(1)];
        let poll_delay = self.config.poll_delay;
        let flush_threshold = self.config.frame_flush_threshold;
        let mut last_received = Instant::now();

        loop {
            tokio::select! {
                read = self.stream.read(&mut read_buf) => {
                    let n = read?;
                    if n == 0 {
                        return Ok(());
                    }
                    self.buffer.extend_from_slice(&read_buf[..n]);
                    last_received = Instant::now();
                }
                _ = tokio::time::sleep(poll_delay) => {
                    if !self.buffer.is_empty() && last_received.elapsed() > flush_threshold {
                        self.flush().await;
                    }
                }
                _ = shutdown.triggered() => return Ok(()),
            }
        }
    }

    async fn flush(&mut self) {
        let chunk = self.buffer.split().freeze();
        let emitted = self.publisher.process_chunk(&chunk).await;
        tracing::trace!(
            connection_id = %self.id,
            bytes = chunk.len(),
            emitted,
            "Flushed controller chunk"
        );
    }
}
