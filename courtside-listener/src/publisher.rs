//! Chunk to snapshot pipeline shared by every connection handler

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;

use courtside_events::{publish_logged, Broadcaster, LiveMessage};
use courtside_parser::{extract_frames, MatchSnapshot};

/// Counters for one listener, shared with its connection handlers.
#[derive(Debug, Default)]
pub struct ListenerStats {
    connections_accepted: AtomicU64,
    chunks_processed: AtomicU64,
    snapshots_published: AtomicU64,
    publish_failures: AtomicU64,
    restarts: AtomicU64,
}

/// Point-in-time copy of [`ListenerStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListenerStatsSnapshot {
    pub connections_accepted: u64,
    pub chunks_processed: u64,
    pub snapshots_published: u64,
    pub publish_failures: u64,
    pub restarts: u64,
}

impl ListenerStats {
    pub(crate) fn record_connection(&self) {
        self.connections_accepted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_restart(&self) {
        self.restarts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> ListenerStatsSnapshot {
        ListenerStatsSnapshot {
            connections_accepted: self.connections_accepted.load(Ordering::Relaxed),
            chunks_processed: self.chunks_processed.load(Ordering::Relaxed),
            snapshots_published: self.snapshots_published.load(Ordering::Relaxed),
            publish_failures: self.publish_failures.load(Ordering::Relaxed),
            restarts: self.restarts.load(Ordering::Relaxed),
        }
    }
}

/// Turns buffered controller bytes into `Snapshot` publishes.
pub struct SnapshotPublisher {
    broadcaster: Arc<dyn Broadcaster>,
    stats: Arc<ListenerStats>,
}

impl SnapshotPublisher {
    pub fn new(broadcaster: Arc<dyn Broadcaster>, stats: Arc<ListenerStats>) -> Self {
        Self { broadcaster, stats }
    }

    /// Extract, decode and publish every frame in `chunk`.
    ///
    /// Returns the number of snapshots the broadcaster accepted. A failed
    /// publish is logged and the remaining frames are still sent.
    pub async fn process_chunk(&self, chunk: &[u8]) -> usize {
        self.stats.chunks_processed.fetch_add(1, Ordering::Relaxed);

        let text = String::from_utf8_lossy(chunk);
        let mut emitted = 0;

        for frame in extract_frames(&text) {
            let message = LiveMessage::Snapshot(MatchSnapshot::from(frame.as_str()));
            if publish_logged(self.broadcaster.as_ref(), message).await {
                self.stats.snapshots_published.fetch_add(1, Ordering::Relaxed);
                emitted += 1;
            } else {
                self.stats.publish_failures.fetch_add(1, Ordering::Relaxed);
            }
        }

        if emitted > 0 {
            tracing::debug!(emitted, bytes = chunk.len(), "Published controller frames");
        }

        emitted
    }
}
