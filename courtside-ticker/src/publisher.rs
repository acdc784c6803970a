//! Court-side publish helpers.
//!
//! Every send is fire-and-forget: failures are logged through
//! [`publish_logged`] and never reach the scheduler loop.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

use courtside_events::{
    publish_logged, AnnounceEvent, Broadcaster, LiveMessage, SceneEvent, ScoreEvent, SummaryEvent,
};

use crate::scene::SceneTracker;

/// Publishes court messages and applies scene switch suppression.
#[derive(Clone)]
pub struct CourtPublisher {
    broadcaster: Arc<dyn Broadcaster>,
    scenes: Arc<SceneTracker>,
    /// Per-court gate so the recorded scene and the broadcast order agree
    gates: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl CourtPublisher {
    pub fn new(broadcaster: Arc<dyn Broadcaster>) -> Self {
        Self {
            broadcaster,
            scenes: Arc::new(SceneTracker::new()),
            gates: Arc::new(DashMap::new()),
        }
    }

    /// Switch `court_id` to `scene` unless it is already there.
    ///
    /// Returns `true` when a `SceneSwitch` was sent.
    pub async fn switch_scene(&self, court_id: &str, scene: &str) -> bool {
        let gate = self.gate(court_id);
        let _guard = gate.lock().await;

        if !self.scenes.switch(court_id, scene) {
            tracing::trace!(court_id, scene, "Scene unchanged, switch suppressed");
            return false;
        }

        tracing::debug!(court_id, scene, "Scene switch");
        publish_logged(
            self.broadcaster.as_ref(),
            LiveMessage::SceneSwitch(SceneEvent::new(court_id, scene)),
        )
        .await;
        true
    }

    pub async fn score(&self, event: ScoreEvent) {
        publish_logged(self.broadcaster.as_ref(), LiveMessage::ScoreUpdate(event)).await;
    }

    pub async fn announce(&self, event: AnnounceEvent) {
        publish_logged(self.broadcaster.as_ref(), LiveMessage::AnnounceNext(event)).await;
    }

    pub async fn summary(&self, event: SummaryEvent) {
        publish_logged(self.broadcaster.as_ref(), LiveMessage::SummaryUpdate(event)).await;
    }

    fn gate(&self, court_id: &str) -> Arc<Mutex<()>> {
        Arc::clone(self.gates.entry(court_id.to_string()).or_default().value())
    }

    /// Last scene sent for `court_id`.
    pub fn current_scene(&self, court_id: &str) -> Option<String> {
        self.scenes.current(court_id)
    }
}
