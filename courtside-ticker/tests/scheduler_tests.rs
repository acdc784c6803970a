//! Court scheduler runs against an in-process hub with millisecond timing

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::broadcast;

use courtside_events::{
    scenes, shutdown_channel, BroadcastHub, LiveMessage, ReadinessTracker, ShutdownTrigger,
};
use courtside_ticker::seed::court_one;
use courtside_ticker::{CourtScript, ScriptStep, StepDelay, TickerConfig, TickerHandle, TickerService};

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

struct Running {
    service: TickerService,
    viewer: broadcast::Receiver<LiveMessage>,
    trigger: ShutdownTrigger,
    handle: TickerHandle,
}

impl Running {
    fn start(config: TickerConfig, scripts: Vec<CourtScript>) -> Self {
        let hub = Arc::new(BroadcastHub::default());
        let viewer = hub.subscribe();
        let service =
            TickerService::new(config, scripts, hub, Arc::new(ReadinessTracker::new())).unwrap();

        let (trigger, shutdown) = shutdown_channel();
        let handle = service.start(shutdown);

        Self {
            service,
            viewer,
            trigger,
            handle,
        }
    }

    async fn next(&mut self) -> LiveMessage {
        tokio::time::timeout(RECV_TIMEOUT, self.viewer.recv())
            .await
            .expect("timed out waiting for a message")
            .unwrap()
    }

    /// Receive until a score line equal to `score` arrives, returning
    /// everything received before it.
    async fn until_score(&mut self, score: &str) -> Vec<LiveMessage> {
        let mut before = Vec::new();
        loop {
            match self.next().await {
                LiveMessage::ScoreUpdate(event) if event.score == score => return before,
                other => before.push(other),
            }
        }
    }

    /// Everything received within `window`.
    async fn collect_for(&mut self, window: Duration) -> Vec<LiveMessage> {
        let deadline = tokio::time::Instant::now() + window;
        let mut messages = Vec::new();
        while let Ok(Ok(message)) = tokio::time::timeout_at(deadline, self.viewer.recv()).await {
            messages.push(message);
        }
        messages
    }

    async fn stop(self) {
        self.trigger.trigger();
        tokio::time::timeout(RECV_TIMEOUT, self.handle.join())
            .await
            .expect("schedulers did not stop");
    }
}

fn scene_names(messages: &[LiveMessage]) -> Vec<String> {
    messages
        .iter()
        .filter_map(|m| match m {
            LiveMessage::SceneSwitch(event) => Some(event.scene.clone()),
            _ => None,
        })
        .collect()
}

fn score(court: &str, text: &str) -> ScriptStep {
    ScriptStep::score(format!("M-{court}"), "Player A", "Player B", text)
}

#[tokio::test]
async fn test_hold_blocks_next_score_until_cleared() {
    let config = TickerConfig::immediate().with_hold_poll_interval(Duration::from_millis(5));
    let script = CourtScript::new(
        "C1",
        vec![
            score("C1", "6-4 5-4 30-15").after(StepDelay::Fixed { ms: 150 }),
            score("C1", "6-4 5-4 40-15"),
        ],
    );
    let mut running = Running::start(config, vec![script]);

    running.until_score("6-4 5-4 30-15").await;
    let ack = running.service.set_hold("C1", "INJURY").await;
    assert!(ack.applied);
    assert_eq!(ack.reason.as_deref(), Some("INJURY"));

    let during_hold = running.collect_for(Duration::from_millis(500)).await;
    assert!(
        !during_hold.iter().any(|m| matches!(m, LiveMessage::ScoreUpdate(_))),
        "score published while held: {:?}",
        during_hold
    );
    assert!(scene_names(&during_hold).contains(&scenes::ADS.to_string()));
    assert_eq!(running.service.court_stats("C1").unwrap().holds_waited, 1);

    running.service.clear_hold("C1").await;
    let before_score = running.until_score("6-4 5-4 40-15").await;
    assert_eq!(scene_names(&before_score), vec![scenes::LIVE]);

    running.stop().await;
}

#[tokio::test]
async fn test_hold_defers_simulated_lines() {
    let config = TickerConfig::immediate().with_hold_poll_interval(Duration::from_millis(5));
    let script = CourtScript::new(
        "C1",
        vec![
            ScriptStep::scene(scenes::ANNOUNCE_SIM).after(StepDelay::Fixed { ms: 150 }),
            score("C1", "SIM 15-0").simulated(),
            score("C1", "SIM 30-0").simulated(),
        ],
    );
    let mut running = Running::start(config, vec![script]);

    match running.next().await {
        LiveMessage::SceneSwitch(event) => assert_eq!(event.scene, scenes::ANNOUNCE_SIM),
        other => panic!("Expected ANNOUNCE_SIM scene, got {:?}", other),
    }
    assert!(running.service.set_hold("C1", "INJURY").await.applied);

    let during_hold = running.collect_for(Duration::from_millis(400)).await;
    assert!(
        !during_hold.iter().any(|m| matches!(m, LiveMessage::ScoreUpdate(_))),
        "simulated score published while held: {:?}",
        during_hold
    );
    assert_eq!(scene_names(&during_hold), vec![scenes::ADS]);

    running.service.clear_hold("C1").await;
    let before_first = running.until_score("SIM 15-0").await;
    assert_eq!(scene_names(&before_first), vec![scenes::LIVE, scenes::ANNOUNCE_SIM]);

    let before_second = running.until_score("SIM 30-0").await;
    assert!(scene_names(&before_second).is_empty());

    running.stop().await;
}

#[tokio::test]
async fn test_changeover_break_runs_between_games() {
    let config = TickerConfig::immediate().with_changeover_ads(Duration::from_millis(80));
    let script = CourtScript::new(
        "C2",
        vec![
            score("C2", "2-1 0-0").ending_game(3, false),
            score("C2", "2-1 15-0"),
        ],
    );
    let mut running = Running::start(config, vec![script]);

    running.until_score("2-1 0-0").await;
    let ads_at = match running.next().await {
        LiveMessage::SceneSwitch(event) => {
            assert_eq!(event.scene, scenes::ADS);
            Instant::now()
        }
        other => panic!("Expected ADS scene, got {:?}", other),
    };

    let before_score = running.until_score("2-1 15-0").await;
    assert!(ads_at.elapsed() >= Duration::from_millis(60));
    assert_eq!(scene_names(&before_score), vec![scenes::LIVE]);

    running.stop().await;
}

#[tokio::test]
async fn test_set_break_applies_regardless_of_parity() {
    let config = TickerConfig::immediate()
        .with_changeover_ads(Duration::ZERO)
        .with_set_break_ads(Duration::from_millis(20));
    let script = CourtScript::new(
        "C1",
        vec![
            score("C1", "6-4 0-0").ending_game(10, true),
            score("C1", "6-4 1-0 0-0").ending_game(1, false),
            score("C1", "6-4 2-1 0-0").ending_game(3, false),
            score("C1", "6-4 2-1 15-0"),
        ],
    );
    let mut running = Running::start(config, vec![script]);

    let messages = running.until_score("6-4 2-1 15-0").await;
    assert_eq!(
        scene_names(&messages),
        vec![scenes::LIVE, scenes::ADS, scenes::LIVE],
        "only the set break shows ADS when changeovers are disabled"
    );

    running.stop().await;
}

#[tokio::test]
async fn test_courts_run_concurrently_and_in_order() {
    let config = TickerConfig::immediate().with_tick_interval(Duration::from_millis(2));
    let lines = ["0-0 15-0", "0-0 30-0", "0-0 40-0", "1-0 0-0", "1-0 15-0"];
    let scripts = ["C1", "C2"]
        .into_iter()
        .map(|court| CourtScript::new(court, lines.iter().map(|l| score(court, l)).collect()))
        .collect();
    let mut running = Running::start(config, scripts);

    let mut per_court: std::collections::HashMap<String, Vec<String>> = Default::default();
    while per_court.values().map(Vec::len).sum::<usize>() < 10 {
        if let LiveMessage::ScoreUpdate(event) = running.next().await {
            per_court.entry(event.court_id).or_default().push(event.score);
        }
    }

    for court in ["C1", "C2"] {
        assert_eq!(per_court[court], lines, "court {court} out of order");
    }
    assert_eq!(running.service.court_stats("C1").unwrap().scores_published, 5);

    running.stop().await;
}

#[tokio::test]
async fn test_seed_announcement_sequence() {
    let mut running = Running::start(TickerConfig::immediate(), vec![court_one()]);

    let messages = running.until_score("0-0 0-0").await;
    assert_eq!(
        scene_names(&messages),
        vec![
            scenes::LIVE,
            scenes::FINISHED,
            scenes::SUMMARY,
            scenes::ANNOUNCE_FED,
            scenes::ANNOUNCE_NAD,
            scenes::ANNOUNCE_H2H,
            scenes::ANNOUNCE_SIM,
            scenes::ADS,
            scenes::LIVE,
        ]
    );

    let steps: Vec<String> = messages
        .iter()
        .filter_map(|m| match m {
            LiveMessage::AnnounceNext(event) => Some(event.step.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(steps, vec!["FED", "NAD", "H2H", "SIM"]);

    let federer = messages.iter().find_map(|m| match m {
        LiveMessage::AnnounceNext(event) if event.step == "FED" => event.player.clone(),
        _ => None,
    });
    assert_eq!(federer.map(|card| card.name).as_deref(), Some("R. Federer"));

    let summary = messages
        .iter()
        .find_map(|m| match m {
            LiveMessage::SummaryUpdate(event) => Some(event.clone()),
            _ => None,
        })
        .expect("summary published");
    assert_eq!(summary.finished.len(), 3);
    assert!(summary
        .finished
        .windows(2)
        .all(|pair| pair[0].completed_at <= pair[1].completed_at));
    assert_eq!(summary.finished[2].players, "N. Djokovic vs C. Alcaraz");
    assert_eq!(summary.upcoming.len(), 2);

    running.stop().await;
}

#[tokio::test]
async fn test_idle_heartbeat_repeats_last_score() {
    let config = TickerConfig::immediate()
        .with_tick_interval(Duration::from_millis(10))
        .with_idle_heartbeat(true);
    let script = CourtScript::new("C1", vec![score("C1", "6-4 6-4 FINAL")]);
    let mut running = Running::start(config, vec![script]);

    let mut stamps = Vec::new();
    while stamps.len() < 3 {
        if let LiveMessage::ScoreUpdate(event) = running.next().await {
            assert_eq!(event.score, "6-4 6-4 FINAL");
            stamps.push(event.server_time_utc);
        }
    }
    assert!(stamps.windows(2).all(|pair| pair[0] <= pair[1]));

    running.stop().await;
}
