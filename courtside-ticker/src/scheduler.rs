//! Per-court script runner.
//!
//! One [`CourtScheduler`] walks one [`CourtScript`] step by step. Every wait
//! goes through the shared [`Shutdown`] handle, so cancellation lands at the
//! next suspension point. When the script runs out the court idles, either
//! re-emitting its last score each tick or just waiting for shutdown.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;

use courtside_events::{
    scenes, AnnounceEvent, FinishedMatch, ScoreEvent, Shutdown, SummaryEvent, UpcomingMatch,
};

use crate::breaks::{Break, BreakPolicy};
use crate::config::CourtTiming;
use crate::error::{Result, TickerError};
use crate::hold::HoldRegistry;
use crate::publisher::CourtPublisher;
use crate::script::{CourtScript, ScriptStep, StepAction};

/// Diagnostic counters for one court.
#[derive(Debug, Default)]
pub struct CourtStats {
    scores_published: AtomicU64,
    scenes_published: AtomicU64,
    holds_waited: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourtStatsSnapshot {
    pub scores_published: u64,
    pub scenes_published: u64,
    /// Score emissions that found the court held
    pub holds_waited: u64,
}

impl CourtStats {
    pub(crate) fn record_scene(&self) {
        self.scenes_published.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> CourtStatsSnapshot {
        CourtStatsSnapshot {
            scores_published: self.scores_published.load(Ordering::Relaxed),
            scenes_published: self.scenes_published.load(Ordering::Relaxed),
            holds_waited: self.holds_waited.load(Ordering::Relaxed),
        }
    }
}

/// State the scheduler owns for its court while running.
#[derive(Debug, Default)]
struct CourtState {
    finished: Vec<FinishedMatch>,
    upcoming: Vec<UpcomingMatch>,
    last_score: Option<ScoreEvent>,
    /// Last scene chosen by a `Scene` step
    script_scene: Option<String>,
}

impl CourtState {
    fn from_script(script: &CourtScript) -> Self {
        let start = Utc::now();
        Self {
            finished: script.finished.iter().map(|r| r.finished_at(start)).collect(),
            upcoming: script.upcoming.iter().map(UpcomingMatch::from).collect(),
            last_score: None,
            script_scene: None,
        }
    }
}

pub struct CourtScheduler {
    script: CourtScript,
    timing: CourtTiming,
    policy: BreakPolicy,
    holds: Arc<HoldRegistry>,
    publisher: CourtPublisher,
    stats: Arc<CourtStats>,
}

impl CourtScheduler {
    pub fn new(
        script: CourtScript,
        timing: CourtTiming,
        holds: Arc<HoldRegistry>,
        publisher: CourtPublisher,
        stats: Arc<CourtStats>,
    ) -> Self {
        let policy = BreakPolicy::new(timing.changeover_ads, timing.set_break_ads);
        Self {
            script,
            timing,
            policy,
            holds,
            publisher,
            stats,
        }
    }

    pub fn court_id(&self) -> &str {
        &self.script.court_id
    }

    /// Play the script, then idle until `shutdown` is triggered.
    pub async fn run(self, mut shutdown: Shutdown) {
        tracing::info!(
            court_id = %self.court_id(),
            steps = self.script.steps.len(),
            "Court scheduler starting"
        );

        let mut state = CourtState::from_script(&self.script);

        match self.play(&mut state, &mut shutdown).await {
            Ok(()) => {}
            Err(TickerError::Cancelled) => {}
            Err(e) => tracing::error!(court_id = %self.court_id(), error = %e, "Court script aborted"),
        }

        let stats = self.stats.snapshot();
        tracing::info!(
            court_id = %self.court_id(),
            scores = stats.scores_published,
            scenes = stats.scenes_published,
            holds = stats.holds_waited,
            "Court scheduler stopped"
        );
    }

    async fn play(&self, state: &mut CourtState, shutdown: &mut Shutdown) -> Result<()> {
        for (index, step) in self.script.steps.iter().enumerate() {
            if shutdown.is_triggered() {
                return Err(TickerError::Cancelled);
            }

            tracing::trace!(court_id = %self.court_id(), index, "Executing step");
            self.execute(step, state, shutdown).await?;
            self.pause(step.delay.resolve(&self.timing), shutdown).await?;
        }

        tracing::info!(court_id = %self.court_id(), "Script finished, idling");
        self.idle(state, shutdown).await
    }

    async fn execute(
        &self,
        step: &ScriptStep,
        state: &mut CourtState,
        shutdown: &mut Shutdown,
    ) -> Result<()> {
        match &step.action {
            StepAction::Score {
                match_id,
                player_a,
                player_b,
                score,
                game,
                simulated,
            } => {
                let event = ScoreEvent::new(match_id, self.court_id(), player_a, player_b, score);

                if *simulated {
                    // Simulated lines stay on the scripted scene, back from ADS if held.
                    if self.wait_for_hold_release(shutdown).await? {
                        if let Some(scene) = &state.script_scene {
                            self.switch_scene(scene).await;
                        }
                    }
                    self.publisher.score(event.clone()).await;
                    self.stats.scores_published.fetch_add(1, Ordering::Relaxed);
                } else {
                    self.emit_score(event.clone(), shutdown).await?;
                }
                state.last_score = Some(event);

                if let Some(game) = game {
                    if let Some(brk) = self.policy.after_game(game.games_in_set, game.set_finished) {
                        self.run_break(brk, shutdown).await?;
                    }
                }
            }
            StepAction::Scene { scene } => {
                self.switch_scene(scene).await;
                state.script_scene = Some(scene.clone());
            }
            StepAction::Announce { step, player, h2h } => {
                let event = match (player, h2h) {
                    (Some(card), _) => AnnounceEvent::player(self.court_id(), step, card.clone()),
                    (None, Some(record)) => {
                        AnnounceEvent::head_to_head(self.court_id(), step, record.clone())
                    }
                    (None, None) => AnnounceEvent::bare(self.court_id(), step),
                };
                self.publisher.announce(event).await;
            }
            StepAction::Summary => {
                let summary = SummaryEvent::new(
                    self.court_id(),
                    state.finished.clone(),
                    state.upcoming.clone(),
                );
                self.publisher.summary(summary).await;
            }
            StepAction::CompleteMatch { players, sets } => {
                state.finished.push(FinishedMatch {
                    players: players.clone(),
                    sets: sets.clone(),
                    completed_at: Utc::now(),
                });
                state.upcoming.retain(|m| &m.players != players);
                tracing::debug!(court_id = %self.court_id(), players = %players, "Match completed");
            }
            StepAction::Pause => {}
        }

        Ok(())
    }

    /// Hold-aware score emission: wait out any hold, go LIVE, publish.
    async fn emit_score(&self, event: ScoreEvent, shutdown: &mut Shutdown) -> Result<()> {
        loop {
            self.wait_for_hold_release(shutdown).await?;
            self.switch_scene(scenes::LIVE).await;
            // A hold set while LIVE was going out must win.
            if !self.holds.is_held(self.court_id()) {
                break;
            }
        }
        self.publisher.score(event).await;
        self.stats.scores_published.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Returns `true` when the court was held on entry.
    async fn wait_for_hold_release(&self, shutdown: &mut Shutdown) -> Result<bool> {
        let mut held = false;

        while let Some(reason) = self.holds.reason(self.court_id()) {
            if !held {
                tracing::info!(court_id = %self.court_id(), reason = %reason, "Court held, deferring score");
                self.stats.holds_waited.fetch_add(1, Ordering::Relaxed);
                held = true;
            }
            self.switch_scene(scenes::ADS).await;
            self.pause(self.timing.hold_poll, shutdown).await?;
        }

        if held {
            tracing::info!(court_id = %self.court_id(), "Hold released");
        }
        Ok(held)
    }

    async fn run_break(&self, brk: Break, shutdown: &mut Shutdown) -> Result<()> {
        tracing::debug!(
            court_id = %self.court_id(),
            kind = brk.kind(),
            duration_ms = brk.duration().as_millis() as u64,
            "Break"
        );

        self.pause(self.timing.pre_ads_delay, shutdown).await?;
        self.switch_scene(scenes::ADS).await;
        self.pause(brk.duration(), shutdown).await
    }

    async fn idle(&self, state: &CourtState, shutdown: &mut Shutdown) -> Result<()> {
        let heartbeat = match (&state.last_score, self.timing.idle_heartbeat) {
            (Some(score), true) => score,
            _ => {
                shutdown.triggered().await;
                return Err(TickerError::Cancelled);
            }
        };

        // A zero tick would spin; fall back to the hold poll interval.
        let interval = if self.timing.tick_interval.is_zero() {
            self.timing.hold_poll
        } else {
            self.timing.tick_interval
        };

        loop {
            self.pause(interval, shutdown).await?;
            self.emit_score(heartbeat.restamped(), shutdown).await?;
        }
    }

    async fn switch_scene(&self, scene: &str) {
        if self.publisher.switch_scene(self.court_id(), scene).await {
            self.stats.record_scene();
        }
    }

    async fn pause(&self, duration: Duration, shutdown: &mut Shutdown) -> Result<()> {
        if shutdown.sleep(duration).await {
            Ok(())
        } else {
            Err(TickerError::Cancelled)
        }
    }
}
