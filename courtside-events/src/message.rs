//! Messages pushed to viewers.
//!
//! Scheduler payloads keep PascalCase field names on the wire; the device
//! snapshot uses camelCase. Every scheduler payload is stamped with the server
//! time at construction, which viewers use to order duplicates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use courtside_parser::MatchSnapshot;

/// Scene names used by the scheduler. The set is open; viewers must accept
/// scenes they do not know.
pub mod scenes {
    pub const LIVE: &str = "LIVE";
    pub const ADS: &str = "ADS";
    pub const FINISHED: &str = "FINISHED";
    pub const UPCOMING: &str = "UPCOMING";
    pub const ANNOUNCE_FED: &str = "ANNOUNCE_FED";
    pub const ANNOUNCE_NAD: &str = "ANNOUNCE_NAD";
    pub const ANNOUNCE_H2H: &str = "ANNOUNCE_H2H";
    pub const ANNOUNCE_SIM: &str = "ANNOUNCE_SIM";
    pub const SUMMARY: &str = "SUMMARY";
}

/// Score line for one match on one court.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ScoreEvent {
    pub match_id: String,
    pub court_id: String,
    pub player_a: String,
    pub player_b: String,
    /// Free text, e.g. `"6-4 5-4 30-15"` or `"6-4 6-4 FINAL"`
    pub score: String,
    pub server_time_utc: DateTime<Utc>,
}

impl ScoreEvent {
    pub fn new(
        match_id: impl Into<String>,
        court_id: impl Into<String>,
        player_a: impl Into<String>,
        player_b: impl Into<String>,
        score: impl Into<String>,
    ) -> Self {
        Self {
            match_id: match_id.into(),
            court_id: court_id.into(),
            player_a: player_a.into(),
            player_b: player_b.into(),
            score: score.into(),
            server_time_utc: Utc::now(),
        }
    }

    /// Same score line with a fresh timestamp.
    pub fn restamped(&self) -> Self {
        Self {
            server_time_utc: Utc::now(),
            ..self.clone()
        }
    }
}

/// Presentation mode change for a court.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SceneEvent {
    pub court_id: String,
    pub scene: String,
    pub server_time_utc: DateTime<Utc>,
}

impl SceneEvent {
    pub fn new(court_id: impl Into<String>, scene: impl Into<String>) -> Self {
        Self {
            court_id: court_id.into(),
            scene: scene.into(),
            server_time_utc: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PlayerCard {
    pub name: String,
    pub country: String,
    pub rank: u32,
    pub age: u32,
    pub titles: u32,
}

/// Head-to-head record between two players.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct H2HRecord {
    pub player_a: String,
    pub player_b: String,
    pub wins_a: u32,
    pub wins_b: u32,
    pub last_meeting: String,
}

/// One step of an announcement sequence.
///
/// At most one of `player` and `h2h` is populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AnnounceEvent {
    pub court_id: String,
    pub step: String,
    pub player: Option<PlayerCard>,
    #[serde(rename = "H2H")]
    pub h2h: Option<H2HRecord>,
    pub server_time_utc: DateTime<Utc>,
}

impl AnnounceEvent {
    pub fn player(court_id: impl Into<String>, step: impl Into<String>, card: PlayerCard) -> Self {
        Self::build(court_id, step, Some(card), None)
    }

    pub fn head_to_head(
        court_id: impl Into<String>,
        step: impl Into<String>,
        record: H2HRecord,
    ) -> Self {
        Self::build(court_id, step, None, Some(record))
    }

    pub fn bare(court_id: impl Into<String>, step: impl Into<String>) -> Self {
        Self::build(court_id, step, None, None)
    }

    fn build(
        court_id: impl Into<String>,
        step: impl Into<String>,
        player: Option<PlayerCard>,
        h2h: Option<H2HRecord>,
    ) -> Self {
        Self {
            court_id: court_id.into(),
            step: step.into(),
            player,
            h2h,
            server_time_utc: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FinishedMatch {
    pub players: String,
    pub sets: Vec<String>,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpcomingMatch {
    pub court: String,
    pub players: String,
}

/// Results and schedule overview for a court.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SummaryEvent {
    pub court_id: String,
    /// Sorted ascending by `completed_at`
    pub finished: Vec<FinishedMatch>,
    pub upcoming: Vec<UpcomingMatch>,
    pub server_time_utc: DateTime<Utc>,
}

impl SummaryEvent {
    /// Build a summary; `finished` is sorted by completion time here.
    pub fn new(
        court_id: impl Into<String>,
        mut finished: Vec<FinishedMatch>,
        upcoming: Vec<UpcomingMatch>,
    ) -> Self {
        finished.sort_by_key(|m| m.completed_at);
        Self {
            court_id: court_id.into(),
            finished,
            upcoming,
            server_time_utc: Utc::now(),
        }
    }
}

/// Everything a viewer can receive, tagged by the method name viewers
/// subscribe to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", content = "payload")]
pub enum LiveMessage {
    ScoreUpdate(ScoreEvent),
    SceneSwitch(SceneEvent),
    AnnounceNext(AnnounceEvent),
    SummaryUpdate(SummaryEvent),
    Snapshot(MatchSnapshot),
}

impl LiveMessage {
    pub fn method(&self) -> &'static str {
        match self {
            LiveMessage::ScoreUpdate(_) => "ScoreUpdate",
            LiveMessage::SceneSwitch(_) => "SceneSwitch",
            LiveMessage::AnnounceNext(_) => "AnnounceNext",
            LiveMessage::SummaryUpdate(_) => "SummaryUpdate",
            LiveMessage::Snapshot(_) => "Snapshot",
        }
    }

    /// Court the message belongs to. Device snapshots carry no court.
    pub fn court_id(&self) -> Option<&str> {
        match self {
            LiveMessage::ScoreUpdate(e) => Some(&e.court_id),
            LiveMessage::SceneSwitch(e) => Some(&e.court_id),
            LiveMessage::AnnounceNext(e) => Some(&e.court_id),
            LiveMessage::SummaryUpdate(e) => Some(&e.court_id),
            LiveMessage::Snapshot(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_score_update_wire_shape() {
        let message = LiveMessage::ScoreUpdate(ScoreEvent::new(
            "M1",
            "C1",
            "N. Djokovic",
            "C. Alcaraz",
            "6-4 5-4 30-15",
        ));

        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["method"], "ScoreUpdate");
        assert_eq!(json["payload"]["MatchId"], "M1");
        assert_eq!(json["payload"]["CourtId"], "C1");
        assert_eq!(json["payload"]["Score"], "6-4 5-4 30-15");
        assert!(json["payload"]["ServerTimeUtc"].is_string());
    }

    #[test]
    fn test_announce_wire_shape() {
        let record = H2HRecord {
            player_a: "R. Federer".to_string(),
            player_b: "R. Nadal".to_string(),
            wins_a: 16,
            wins_b: 24,
            last_meeting: "2019 Wimbledon SF".to_string(),
        };
        let message = LiveMessage::AnnounceNext(AnnounceEvent::head_to_head("C1", "H2H", record));

        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["payload"]["Step"], "H2H");
        assert!(json["payload"]["Player"].is_null());
        assert_eq!(json["payload"]["H2H"]["WinsB"], 24);
    }

    #[test]
    fn test_snapshot_keeps_camel_case() {
        let message = LiveMessage::Snapshot(MatchSnapshot {
            team_a: "Sinner".to_string(),
            ..Default::default()
        });

        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["method"], "Snapshot");
        assert_eq!(json["payload"]["teamA"], "Sinner");
        assert_eq!(message.court_id(), None);
    }

    #[test]
    fn test_summary_sorted_by_completion() {
        let now = Utc::now();
        let finished = vec![
            FinishedMatch {
                players: "late".to_string(),
                sets: vec![],
                completed_at: now,
            },
            FinishedMatch {
                players: "early".to_string(),
                sets: vec![],
                completed_at: now - Duration::minutes(90),
            },
        ];

        let summary = SummaryEvent::new("C1", finished, vec![]);
        assert_eq!(summary.finished[0].players, "early");
        assert_eq!(summary.finished[1].players, "late");
    }

    #[test]
    fn test_message_round_trips() {
        let message = LiveMessage::SceneSwitch(SceneEvent::new("C2", scenes::LIVE));
        let json = serde_json::to_string(&message).unwrap();
        let back: LiveMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(back, message);
        assert_eq!(back.court_id(), Some("C2"));
    }
}
