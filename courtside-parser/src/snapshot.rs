//! Positional decoding of a single controller record.
//!
//! A frame is a fixed-width text record. Fields are located by character
//! offset; a frame shorter than a field's range yields an empty value for that
//! field instead of an error.

use serde::{Deserialize, Serialize};

/// `(start, len)` character ranges inside a frame.
mod layout {
    pub const PLAYER_A1: (usize, usize) = (10, 20);
    pub const PLAYER_B1: (usize, usize) = (30, 20);
    pub const PLAYER_A2: (usize, usize) = (50, 20);
    pub const PLAYER_B2: (usize, usize) = (70, 20);
    pub const MATCH_CLOCK: (usize, usize) = (213, 8);
    pub const BEST_OF: (usize, usize) = (303, 1);
    pub const POINTS_A: (usize, usize) = (340, 2);
    pub const POINTS_B: (usize, usize) = (342, 2);
    pub const SET1_A: (usize, usize) = (344, 2);
    pub const SET1_B: (usize, usize) = (346, 2);
    pub const SET2_A: (usize, usize) = (355, 2);
    pub const SET2_B: (usize, usize) = (357, 2);
    pub const SET3_A: (usize, usize) = (366, 2);
    pub const SET3_B: (usize, usize) = (368, 2);
    pub const SERVER: (usize, usize) = (399, 1);
}

/// Every field sliced out of one frame, trimmed but otherwise raw.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedFrame {
    pub raw: String,
    pub player_a1: String,
    pub player_a2: String,
    pub player_b1: String,
    pub player_b2: String,
    /// Normalized with [`map_point`]
    pub points_a: String,
    /// Normalized with [`map_point`]
    pub points_b: String,
    pub set1_a: String,
    pub set1_b: String,
    pub set2_a: String,
    pub set2_b: String,
    pub set3_a: String,
    pub set3_b: String,
    /// Normalized with [`normalize_server`]
    pub server: String,
    pub best_of: String,
    pub match_clock: String,
}

impl DecodedFrame {
    /// Slice a frame into its fields. Never fails.
    pub fn decode(frame: &str) -> Self {
        let field = |(start, len): (usize, usize)| slice(frame, start, len).trim().to_string();

        Self {
            raw: frame.to_string(),
            player_a1: field(layout::PLAYER_A1),
            player_b1: field(layout::PLAYER_B1),
            player_a2: field(layout::PLAYER_A2),
            player_b2: field(layout::PLAYER_B2),
            best_of: field(layout::BEST_OF),
            match_clock: field(layout::MATCH_CLOCK),
            points_a: map_point(slice(frame, layout::POINTS_A.0, layout::POINTS_A.1)),
            points_b: map_point(slice(frame, layout::POINTS_B.0, layout::POINTS_B.1)),
            set1_a: field(layout::SET1_A),
            set1_b: field(layout::SET1_B),
            set2_a: field(layout::SET2_A),
            set2_b: field(layout::SET2_B),
            set3_a: field(layout::SET3_A),
            set3_b: field(layout::SET3_B),
            server: normalize_server(slice(frame, layout::SERVER.0, layout::SERVER.1)),
        }
    }

    /// Side A display name, `"First / Second"` for doubles.
    pub fn team_a(&self) -> String {
        team_name(&self.player_a1, &self.player_a2)
    }

    /// Side B display name, `"First / Second"` for doubles.
    pub fn team_b(&self) -> String {
        team_name(&self.player_b1, &self.player_b2)
    }

    /// Non-empty set scores in set order, formatted `"A-B"`.
    pub fn sets(&self) -> Vec<String> {
        [
            (&self.set1_a, &self.set1_b),
            (&self.set2_a, &self.set2_b),
            (&self.set3_a, &self.set3_b),
        ]
        .into_iter()
        .filter_map(|(left, right)| score_pair(left, right))
        .collect()
    }

    /// Current game score as `"A-B"`, or empty when neither side has a value.
    pub fn points_display(&self) -> String {
        score_pair(&self.points_a, &self.points_b).unwrap_or_default()
    }

    /// Build the normalized snapshot for this frame.
    pub fn snapshot(&self) -> MatchSnapshot {
        MatchSnapshot {
            team_a: self.team_a(),
            team_b: self.team_b(),
            sets: self.sets(),
            points: self.points_display(),
            server: self.server.clone(),
            clock: self.match_clock.clone(),
        }
    }
}

/// Normalized match state decoded from one frame.
///
/// Serialized with camelCase keys, which is the shape viewers receive in a
/// `Snapshot` message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchSnapshot {
    pub team_a: String,
    pub team_b: String,
    pub sets: Vec<String>,
    pub points: String,
    pub server: String,
    pub clock: String,
}

impl From<&str> for MatchSnapshot {
    fn from(frame: &str) -> Self {
        DecodedFrame::decode(frame).snapshot()
    }
}

/// Normalize a point token from the controller.
///
/// ```
/// use courtside_parser::map_point;
///
/// assert_eq!(map_point("40"), "40");
/// assert_eq!(map_point("ad"), "Ad");
/// assert_eq!(map_point(" 0"), "0");
/// assert_eq!(map_point(""), "");
/// ```
pub fn map_point(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let normalized: String = trimmed
        .chars()
        .filter(|c| *c != ' ')
        .collect::<String>()
        .to_uppercase();

    match normalized.as_str() {
        "00" | "0" => "0".to_string(),
        "15" => "15".to_string(),
        "30" => "30".to_string(),
        "40" => "40".to_string(),
        "AD" | "A" | "41" | "45" => "Ad".to_string(),
        _ => trimmed.to_string(),
    }
}

/// Map the server indicator to a side: `1`/`A` is `A`, `2`/`B` is `B`.
/// Other tokens pass through trimmed.
pub fn normalize_server(raw: &str) -> String {
    match raw.trim() {
        "1" | "A" => "A".to_string(),
        "2" | "B" => "B".to_string(),
        token => token.to_string(),
    }
}

/// Character-based substring clamped to the source length.
fn slice(source: &str, start: usize, len: usize) -> &str {
    if len == 0 {
        return "";
    }

    let mut indices = source.char_indices().map(|(i, _)| i).chain(std::iter::once(source.len()));
    let Some(begin) = indices.nth(start) else {
        return "";
    };
    if begin == source.len() {
        return "";
    }
    let end = indices.nth(len - 1).unwrap_or(source.len());

    &source[begin..end]
}

fn team_name(first: &str, second: &str) -> String {
    if second.trim().is_empty() {
        first.to_string()
    } else {
        format!("{first} / {second}")
    }
}

fn score_pair(left: &str, right: &str) -> Option<String> {
    let left = left.trim();
    let right = right.trim();
    if left.is_empty() && right.is_empty() {
        None
    } else {
        Some(format!("{left}-{right}"))
    }
}
