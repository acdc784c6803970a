//! Process-wide startup flags for health reporting

use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;

/// Records whether the court scheduler and the broadcast surface finished
/// starting. Both flags only ever go from `false` to `true`.
#[derive(Debug, Default)]
pub struct ReadinessTracker {
    hub_ready: AtomicBool,
    ticker_started: AtomicBool,
}

/// Point-in-time view of [`ReadinessTracker`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadinessStatus {
    pub ticker_started: bool,
    pub hub_ready: bool,
    pub ready: bool,
}

impl ReadinessTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_hub_ready(&self) {
        self.hub_ready.store(true, Ordering::Release);
    }

    pub fn mark_ticker_started(&self) {
        self.ticker_started.store(true, Ordering::Release);
    }

    pub fn hub_ready(&self) -> bool {
        self.hub_ready.load(Ordering::Acquire)
    }

    pub fn ticker_started(&self) -> bool {
        self.ticker_started.load(Ordering::Acquire)
    }

    pub fn is_ready(&self) -> bool {
        self.hub_ready() && self.ticker_started()
    }

    pub fn status(&self) -> ReadinessStatus {
        let hub_ready = self.hub_ready();
        let ticker_started = self.ticker_started();
        ReadinessStatus {
            ticker_started,
            hub_ready,
            ready: hub_ready && ticker_started,
        }
    }
}
