//! Court script model.
//!
//! A script is data: an ordered list of steps, each with the delay that
//! follows it. The scheduler walks the list once per court and never branches
//! on player names or scores, so scripts can be replaced from a JSON file.
//!
//! ```json
//! [{
//!   "court_id": "C1",
//!   "upcoming": [{ "court": "C1", "players": "R. Federer vs R. Nadal" }],
//!   "steps": [
//!     { "type": "score", "match_id": "M1", "player_a": "N. Djokovic",
//!       "player_b": "C. Alcaraz", "score": "6-4 3-2 0-0",
//!       "game": { "games_in_set": 5, "set_finished": false }, "delay": "tick" },
//!     { "type": "scene", "scene": "SUMMARY" },
//!     { "type": "summary", "delay": { "fixed": { "ms": 8000 } } }
//!   ]
//! }]
//! ```

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use courtside_events::duration::from_signed_millis;
use courtside_events::{FinishedMatch, H2HRecord, PlayerCard, UpcomingMatch};

use crate::config::CourtTiming;
use crate::error::{Result, TickerError};

/// Announcement step durations that a delay can refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnounceSlot {
    Fed,
    Nad,
    H2h,
    Ads,
}

/// Wait that follows a step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepDelay {
    /// The court's tick interval
    Tick,
    /// A fixed number of milliseconds; negative means none
    Fixed { ms: i64 },
    /// One of the configured announcement durations
    Announce(AnnounceSlot),
    #[default]
    None,
}

impl StepDelay {
    pub fn resolve(&self, timing: &CourtTiming) -> Duration {
        match self {
            StepDelay::Tick => timing.tick_interval,
            StepDelay::Fixed { ms } => from_signed_millis(*ms),
            StepDelay::Announce(slot) => timing.announce.get(*slot),
            StepDelay::None => Duration::ZERO,
        }
    }
}

/// Game bookkeeping attached to a score line that ends a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub games_in_set: u32,
    #[serde(default)]
    pub set_finished: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StepAction {
    /// Publish a score line. Regular scores wait out holds and switch the
    /// court to LIVE first; simulated ones publish under the current scene.
    Score {
        match_id: String,
        player_a: String,
        player_b: String,
        score: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        game: Option<GameState>,
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        simulated: bool,
    },
    Scene {
        scene: String,
    },
    Announce {
        step: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        player: Option<PlayerCard>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        h2h: Option<H2HRecord>,
    },
    /// Publish the court's finished and upcoming lists
    Summary,
    /// Record a result and drop the matching upcoming entry
    CompleteMatch {
        players: String,
        sets: Vec<String>,
    },
    /// Only wait
    Pause,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptStep {
    #[serde(flatten)]
    pub action: StepAction,
    #[serde(default)]
    pub delay: StepDelay,
}

impl ScriptStep {
    pub fn new(action: StepAction) -> Self {
        Self {
            action,
            delay: StepDelay::None,
        }
    }

    pub fn score(
        match_id: impl Into<String>,
        player_a: impl Into<String>,
        player_b: impl Into<String>,
        score: impl Into<String>,
    ) -> Self {
        Self {
            action: StepAction::Score {
                match_id: match_id.into(),
                player_a: player_a.into(),
                player_b: player_b.into(),
                score: score.into(),
                game: None,
                simulated: false,
            },
            delay: StepDelay::Tick,
        }
    }

    pub fn scene(scene: impl Into<String>) -> Self {
        Self::new(StepAction::Scene {
            scene: scene.into(),
        })
    }

    pub fn announce_player(step: impl Into<String>, card: PlayerCard) -> Self {
        Self::new(StepAction::Announce {
            step: step.into(),
            player: Some(card),
            h2h: None,
        })
    }

    pub fn announce_h2h(step: impl Into<String>, record: H2HRecord) -> Self {
        Self::new(StepAction::Announce {
            step: step.into(),
            player: None,
            h2h: Some(record),
        })
    }

    pub fn announce(step: impl Into<String>) -> Self {
        Self::new(StepAction::Announce {
            step: step.into(),
            player: None,
            h2h: None,
        })
    }

    pub fn summary() -> Self {
        Self::new(StepAction::Summary)
    }

    pub fn complete_match(players: impl Into<String>, sets: &[&str]) -> Self {
        Self::new(StepAction::CompleteMatch {
            players: players.into(),
            sets: sets.iter().map(|s| s.to_string()).collect(),
        })
    }

    pub fn pause(delay: StepDelay) -> Self {
        Self::new(StepAction::Pause).after(delay)
    }

    /// Replace the delay that follows this step.
    pub fn after(mut self, delay: StepDelay) -> Self {
        self.delay = delay;
        self
    }

    /// Mark a score step as ending a game. No effect on other steps.
    pub fn ending_game(mut self, games_in_set: u32, set_finished: bool) -> Self {
        if let StepAction::Score { game, .. } = &mut self.action {
            *game = Some(GameState {
                games_in_set,
                set_finished,
            });
        }
        self
    }

    /// Mark a score step as simulated. No effect on other steps.
    pub fn simulated(mut self) -> Self {
        if let StepAction::Score { simulated, .. } = &mut self.action {
            *simulated = true;
        }
        self
    }
}

/// One year; older results are clamped.
const MAX_MINUTES_AGO: i64 = 60 * 24 * 365;

/// A result already on the board when the script starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptedResult {
    pub players: String,
    pub sets: Vec<String>,
    /// How long before the script start the match ended
    #[serde(default)]
    pub minutes_ago: i64,
}

impl ScriptedResult {
    pub fn finished_at(&self, start: DateTime<Utc>) -> FinishedMatch {
        FinishedMatch {
            players: self.players.clone(),
            sets: self.sets.clone(),
            completed_at: start - chrono::Duration::minutes(self.minutes_ago.clamp(0, MAX_MINUTES_AGO)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptedFixture {
    pub court: String,
    pub players: String,
}

impl From<&ScriptedFixture> for UpcomingMatch {
    fn from(fixture: &ScriptedFixture) -> Self {
        UpcomingMatch {
            court: fixture.court.clone(),
            players: fixture.players.clone(),
        }
    }
}

/// Everything one court plays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourtScript {
    pub court_id: String,
    #[serde(default)]
    pub finished: Vec<ScriptedResult>,
    #[serde(default)]
    pub upcoming: Vec<ScriptedFixture>,
    pub steps: Vec<ScriptStep>,
}

impl CourtScript {
    pub fn new(court_id: impl Into<String>, steps: Vec<ScriptStep>) -> Self {
        Self {
            court_id: court_id.into(),
            finished: Vec::new(),
            upcoming: Vec::new(),
            steps,
        }
    }

    pub fn with_finished(mut self, players: &str, sets: &[&str], minutes_ago: i64) -> Self {
        self.finished.push(ScriptedResult {
            players: players.to_string(),
            sets: sets.iter().map(|s| s.to_string()).collect(),
            minutes_ago,
        });
        self
    }

    pub fn with_upcoming(mut self, court: &str, players: &str) -> Self {
        self.upcoming.push(ScriptedFixture {
            court: court.to_string(),
            players: players.to_string(),
        });
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.court_id.trim().is_empty() {
            return Err(TickerError::Script("Script has no court id".to_string()));
        }

        for (index, step) in self.steps.iter().enumerate() {
            match &step.action {
                StepAction::Announce {
                    player: Some(_),
                    h2h: Some(_),
                    ..
                } => {
                    return Err(TickerError::Script(format!(
                        "Court {} step {}: an announcement carries a player card or a head-to-head record, not both",
                        self.court_id, index
                    )));
                }
                StepAction::Scene { scene } if scene.trim().is_empty() => {
                    return Err(TickerError::Script(format!(
                        "Court {} step {}: empty scene name",
                        self.court_id, index
                    )));
                }
                _ => {}
            }
        }

        Ok(())
    }

    /// Parse a JSON array of scripts and validate each one.
    pub fn from_json(json: &str) -> Result<Vec<CourtScript>> {
        let scripts: Vec<CourtScript> = serde_json::from_str(json)?;
        validate_all(&scripts)?;
        Ok(scripts)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Vec<CourtScript>> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| TickerError::Script(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }
}

/// Validate each script and reject duplicate court ids.
pub fn validate_all(scripts: &[CourtScript]) -> Result<()> {
    let mut seen = HashSet::new();
    for script in scripts {
        script.validate()?;
        if !seen.insert(script.court_id.as_str()) {
            return Err(TickerError::Script(format!(
                "Court {} has more than one script",
                script.court_id
            )));
        }
    }
    Ok(())
}
