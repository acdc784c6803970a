//! Break policy applied after each game

use std::time::Duration;

/// A break to run after a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Break {
    /// After a completed set
    SetBreak(Duration),
    /// After an odd game count greater than one
    Changeover(Duration),
}

impl Break {
    pub fn duration(&self) -> Duration {
        match self {
            Break::SetBreak(d) | Break::Changeover(d) => *d,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Break::SetBreak(_) => "set_break",
            Break::Changeover(_) => "changeover",
        }
    }
}

/// Decides which break, if any, follows a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakPolicy {
    pub changeover: Duration,
    pub set_break: Duration,
}

impl BreakPolicy {
    pub fn new(changeover: Duration, set_break: Duration) -> Self {
        Self {
            changeover,
            set_break,
        }
    }

    /// Break after a game that left `games_in_set` games played in the set.
    ///
    /// A finished set always means a set break regardless of parity. A
    /// configured duration of zero skips the break.
    pub fn after_game(&self, games_in_set: u32, set_finished: bool) -> Option<Break> {
        let candidate = if set_finished {
            Break::SetBreak(self.set_break)
        } else if games_in_set > 1 && games_in_set % 2 == 1 {
            Break::Changeover(self.changeover)
        } else {
            return None;
        };

        if candidate.duration().is_zero() {
            None
        } else {
            Some(candidate)
        }
    }
}
