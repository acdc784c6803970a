//! Ticker service: court schedulers plus the operator hold surface

use std::collections::BTreeMap;
use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;
use tokio::task::JoinHandle;

use courtside_events::{scenes, Broadcaster, ReadinessTracker, Shutdown};

use crate::config::TickerConfig;
use crate::error::Result;
use crate::hold::HoldRegistry;
use crate::publisher::CourtPublisher;
use crate::scheduler::{CourtScheduler, CourtStats, CourtStatsSnapshot};
use crate::script::{validate_all, CourtScript};
use crate::seed::seed_scripts;

/// Answer to an operator hold command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldAck {
    pub court_id: String,
    /// `false` when the court id was blank or has no script
    pub applied: bool,
    /// Reason now stored for the court, if any
    pub reason: Option<String>,
}

impl HoldAck {
    fn ignored(court_id: &str) -> Self {
        Self {
            court_id: court_id.trim().to_string(),
            applied: false,
            reason: None,
        }
    }
}

/// Owns the court scripts, the shared hold registry and the publish helper.
pub struct TickerService {
    config: TickerConfig,
    scripts: Vec<CourtScript>,
    holds: Arc<HoldRegistry>,
    publisher: CourtPublisher,
    readiness: Arc<ReadinessTracker>,
    stats: BTreeMap<String, Arc<CourtStats>>,
}

/// Running court schedulers returned by [`TickerService::start`]
pub struct TickerHandle {
    tasks: Vec<JoinHandle<()>>,
}

impl TickerHandle {
    pub fn court_count(&self) -> usize {
        self.tasks.len()
    }

    /// Wait for every court scheduler to stop.
    pub async fn join(self) {
        for result in join_all(self.tasks).await {
            if let Err(e) = result {
                tracing::error!(error = %e, "Court scheduler task panicked");
            }
        }
    }
}

impl TickerService {
    pub fn new(
        config: TickerConfig,
        scripts: Vec<CourtScript>,
        broadcaster: Arc<dyn Broadcaster>,
        readiness: Arc<ReadinessTracker>,
    ) -> Result<Self> {
        config.validate()?;
        validate_all(&scripts)?;

        let stats = scripts
            .iter()
            .map(|script| (script.court_id.clone(), Arc::new(CourtStats::default())))
            .collect();

        Ok(Self {
            config,
            scripts,
            holds: Arc::new(HoldRegistry::new()),
            publisher: CourtPublisher::new(broadcaster),
            readiness,
            stats,
        })
    }

    /// Service playing the built-in `C1` and `C2` scripts.
    pub fn with_seed_scripts(
        config: TickerConfig,
        broadcaster: Arc<dyn Broadcaster>,
        readiness: Arc<ReadinessTracker>,
    ) -> Result<Self> {
        Self::new(config, seed_scripts(), broadcaster, readiness)
    }

    /// Court ids with a script, sorted.
    pub fn courts(&self) -> Vec<String> {
        self.stats.keys().cloned().collect()
    }

    pub fn holds(&self) -> Arc<HoldRegistry> {
        Arc::clone(&self.holds)
    }

    /// Spawn one scheduler per court and mark the ticker started.
    pub fn start(&self, shutdown: Shutdown) -> TickerHandle {
        let tasks = self
            .scripts
            .iter()
            .map(|script| {
                let scheduler = CourtScheduler::new(
                    script.clone(),
                    self.config.timing(&script.court_id),
                    Arc::clone(&self.holds),
                    self.publisher.clone(),
                    self.court_stats_handle(&script.court_id),
                );
                tokio::spawn(scheduler.run(shutdown.clone()))
            })
            .collect::<Vec<_>>();

        self.readiness.mark_ticker_started();
        tracing::info!(courts = tasks.len(), "Ticker started");

        TickerHandle { tasks }
    }

    /// Hold a court and switch it to ADS right away.
    pub async fn set_hold(&self, court_id: &str, reason: &str) -> HoldAck {
        let court_id = court_id.trim();
        let Some(stats) = self.stats.get(court_id) else {
            tracing::debug!(court_id, "Hold ignored for unknown court");
            return HoldAck::ignored(court_id);
        };
        let Some(reason) = self.holds.set(court_id, reason) else {
            return HoldAck::ignored(court_id);
        };

        tracing::info!(court_id, reason = %reason, "Manual hold set");
        if self.publisher.switch_scene(court_id, scenes::ADS).await {
            stats.record_scene();
        }

        HoldAck {
            court_id: court_id.to_string(),
            applied: true,
            reason: Some(reason),
        }
    }

    /// Release a court and switch it back to LIVE right away.
    pub async fn clear_hold(&self, court_id: &str) -> HoldAck {
        let court_id = court_id.trim();
        let Some(stats) = self.stats.get(court_id) else {
            tracing::debug!(court_id, "Clear ignored for unknown court");
            return HoldAck::ignored(court_id);
        };
        if !self.holds.clear(court_id) {
            return HoldAck::ignored(court_id);
        }

        tracing::info!(court_id, "Manual hold cleared");
        if self.publisher.switch_scene(court_id, scenes::LIVE).await {
            stats.record_scene();
        }

        HoldAck {
            court_id: court_id.to_string(),
            applied: true,
            reason: None,
        }
    }

    pub fn court_stats(&self, court_id: &str) -> Option<CourtStatsSnapshot> {
        self.stats.get(court_id).map(|stats| stats.snapshot())
    }

    /// Diagnostics for every court, sorted by court id.
    pub fn stats(&self) -> Vec<(String, CourtStatsSnapshot)> {
        self.stats
            .iter()
            .map(|(court, stats)| (court.clone(), stats.snapshot()))
            .collect()
    }

    pub fn current_scene(&self, court_id: &str) -> Option<String> {
        self.publisher.current_scene(court_id)
    }

    fn court_stats_handle(&self, court_id: &str) -> Arc<CourtStats> {
        self.stats.get(court_id).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::ScriptStep;
    use courtside_events::{BroadcastHub, LiveMessage};

    fn service(hub: Arc<BroadcastHub>) -> TickerService {
        TickerService::new(
            TickerConfig::immediate(),
            vec![CourtScript::new("C1", vec![ScriptStep::scene(scenes::UPCOMING)])],
            hub,
            Arc::new(ReadinessTracker::new()),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_set_hold_emits_ads_once() {
        let hub = Arc::new(BroadcastHub::default());
        let mut rx = hub.subscribe();
        let service = service(hub);

        let ack = service.set_hold("C1", "").await;
        assert_eq!(
            ack,
            HoldAck {
                court_id: "C1".to_string(),
                applied: true,
                reason: Some("MANUAL".to_string()),
            }
        );
        service.set_hold("C1", "INJURY").await;

        match rx.try_recv() {
            Ok(LiveMessage::SceneSwitch(event)) => assert_eq!(event.scene, scenes::ADS),
            other => panic!("Expected SceneSwitch, got {:?}", other),
        }
        assert!(rx.try_recv().is_err());
        assert_eq!(service.holds().reason("C1").as_deref(), Some("INJURY"));
    }

    #[tokio::test]
    async fn test_clear_hold_emits_live() {
        let hub = Arc::new(BroadcastHub::default());
        let mut rx = hub.subscribe();
        let service = service(hub);

        service.set_hold("C1", "RAIN").await;
        let ack = service.clear_hold(" C1 ").await;
        assert!(ack.applied);
        assert_eq!(ack.court_id, "C1");
        assert!(!service.holds().is_held("C1"));

        let scenes_sent: Vec<String> = std::iter::from_fn(|| rx.try_recv().ok())
            .filter_map(|m| match m {
                LiveMessage::SceneSwitch(event) => Some(event.scene),
                _ => None,
            })
            .collect();
        assert_eq!(scenes_sent, vec![scenes::ADS, scenes::LIVE]);
        assert_eq!(service.court_stats("C1").unwrap().scenes_published, 2);
    }

    #[tokio::test]
    async fn test_unknown_and_blank_courts_are_ignored() {
        let hub = Arc::new(BroadcastHub::default());
        let service = service(hub.clone());

        assert!(!service.set_hold("", "INJURY").await.applied);
        assert!(!service.set_hold("C9", "INJURY").await.applied);
        assert!(!service.clear_hold("  ").await.applied);
        assert_eq!(hub.published_count(), 0);
        assert!(service.holds().held_courts().is_empty());
    }

    #[tokio::test]
    async fn test_start_marks_ticker_started() {
        let hub = Arc::new(BroadcastHub::default());
        let readiness = Arc::new(ReadinessTracker::new());
        let service = TickerService::with_seed_scripts(
            TickerConfig::immediate(),
            hub,
            Arc::clone(&readiness),
        )
        .unwrap();
        assert_eq!(service.courts(), vec!["C1", "C2"]);

        let (trigger, shutdown) = courtside_events::shutdown_channel();
        let handle = service.start(shutdown);
        assert_eq!(handle.court_count(), 2);
        assert!(readiness.ticker_started());

        trigger.trigger();
        handle.join().await;
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let result = TickerService::new(
            TickerConfig::immediate().with_hold_poll_interval(std::time::Duration::ZERO),
            vec![],
            Arc::new(BroadcastHub::default()),
            Arc::new(ReadinessTracker::new()),
        );
        assert!(result.is_err());
    }
}
