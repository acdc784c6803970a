//! Ticker configuration

use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;

use courtside_events::duration::{millis, optional_millis};

use crate::error::{Result, TickerError};
use crate::script::AnnounceSlot;

/// Configuration for [`crate::TickerService`]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TickerConfig {
    /// Pause after each scripted score line
    /// Default: 2000 ms
    #[serde(rename = "tick_interval_ms", with = "millis")]
    pub tick_interval: Duration,

    /// Pause between a game ending and the ADS scene of a break
    /// Default: 5000 ms
    #[serde(rename = "pre_ads_delay_ms", with = "millis")]
    pub pre_ads_delay: Duration,

    /// Length of a changeover break; zero disables changeovers
    /// Default: 60 seconds
    #[serde(rename = "changeover_ads_ms", with = "millis")]
    pub changeover_ads: Duration,

    /// Length of a break after a completed set; zero disables set breaks
    /// Default: 120 seconds
    #[serde(rename = "set_break_ads_ms", with = "millis")]
    pub set_break_ads: Duration,

    /// Upper bound for one wait while a court is held
    /// Default: 600 seconds
    #[serde(rename = "manual_hold_max_poll_ms", with = "millis")]
    pub manual_hold_max_poll: Duration,

    /// How often a held court re-checks the hold
    /// Default: 1 second
    #[serde(rename = "hold_poll_interval_ms", with = "millis")]
    pub hold_poll_interval: Duration,

    /// Re-emit the last score every tick once a script has finished
    /// Default: true
    pub idle_heartbeat: bool,

    /// Per-court timing overrides keyed by court id
    pub courts: HashMap<String, CourtOverrides>,

    /// Durations of the announcement sequence steps
    pub announce: AnnounceDurations,
}

impl Default for TickerConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(2000),
            pre_ads_delay: Duration::from_millis(5000),
            changeover_ads: Duration::from_secs(60),
            set_break_ads: Duration::from_secs(120),
            manual_hold_max_poll: Duration::from_secs(600),
            hold_poll_interval: Duration::from_secs(1),
            idle_heartbeat: true,
            courts: HashMap::new(),
            announce: AnnounceDurations::default(),
        }
    }
}

/// Timing values one court may override. Unset fields inherit the global value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CourtOverrides {
    #[serde(rename = "tick_interval_ms", with = "optional_millis")]
    pub tick_interval: Option<Duration>,

    #[serde(rename = "pre_ads_delay_ms", with = "optional_millis")]
    pub pre_ads_delay: Option<Duration>,

    #[serde(rename = "changeover_ads_ms", with = "optional_millis")]
    pub changeover_ads: Option<Duration>,

    #[serde(rename = "set_break_ads_ms", with = "optional_millis")]
    pub set_break_ads: Option<Duration>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AnnounceDurations {
    /// Default: 5000 ms
    #[serde(rename = "fed_ms", with = "millis")]
    pub fed: Duration,

    /// Default: 5000 ms
    #[serde(rename = "nad_ms", with = "millis")]
    pub nad: Duration,

    /// Default: 6000 ms
    #[serde(rename = "h2h_ms", with = "millis")]
    pub h2h: Duration,

    /// Default: 5000 ms
    #[serde(rename = "ads_ms", with = "millis")]
    pub ads: Duration,
}

impl Default for AnnounceDurations {
    fn default() -> Self {
        Self {
            fed: Duration::from_millis(5000),
            nad: Duration::from_millis(5000),
            h2h: Duration::from_millis(6000),
            ads: Duration::from_millis(5000),
        }
    }
}

impl AnnounceDurations {
    pub fn get(&self, slot: AnnounceSlot) -> Duration {
        match slot {
            AnnounceSlot::Fed => self.fed,
            AnnounceSlot::Nad => self.nad,
            AnnounceSlot::H2h => self.h2h,
            AnnounceSlot::Ads => self.ads,
        }
    }
}

/// Timing in effect for one court after applying its overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourtTiming {
    pub tick_interval: Duration,
    pub pre_ads_delay: Duration,
    pub changeover_ads: Duration,
    pub set_break_ads: Duration,
    /// Sleep between hold checks
    pub hold_poll: Duration,
    pub idle_heartbeat: bool,
    pub announce: AnnounceDurations,
}

impl TickerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration with every delay set to zero and a 1 ms hold poll.
    pub fn immediate() -> Self {
        Self {
            tick_interval: Duration::ZERO,
            pre_ads_delay: Duration::ZERO,
            changeover_ads: Duration::ZERO,
            set_break_ads: Duration::ZERO,
            manual_hold_max_poll: Duration::from_secs(600),
            hold_poll_interval: Duration::from_millis(1),
            idle_heartbeat: false,
            courts: HashMap::new(),
            announce: AnnounceDurations {
                fed: Duration::ZERO,
                nad: Duration::ZERO,
                h2h: Duration::ZERO,
                ads: Duration::ZERO,
            },
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.hold_poll_interval.is_zero() {
            return Err(TickerError::Configuration(
                "Hold poll interval must be greater than 0".to_string(),
            ));
        }

        if self.manual_hold_max_poll.is_zero() {
            return Err(TickerError::Configuration(
                "Manual hold max poll must be greater than 0".to_string(),
            ));
        }

        if self.courts.keys().any(|court| court.trim().is_empty()) {
            return Err(TickerError::Configuration(
                "Court overrides must name a court".to_string(),
            ));
        }

        Ok(())
    }

    /// Resolve the timing for `court_id`.
    pub fn timing(&self, court_id: &str) -> CourtTiming {
        let overrides = self.courts.get(court_id).cloned().unwrap_or_default();

        CourtTiming {
            tick_interval: overrides.tick_interval.unwrap_or(self.tick_interval),
            pre_ads_delay: overrides.pre_ads_delay.unwrap_or(self.pre_ads_delay),
            changeover_ads: overrides.changeover_ads.unwrap_or(self.changeover_ads),
            set_break_ads: overrides.set_break_ads.unwrap_or(self.set_break_ads),
            hold_poll: self.hold_poll_interval.min(self.manual_hold_max_poll),
            idle_heartbeat: self.idle_heartbeat,
            announce: self.announce.clone(),
        }
    }

    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval;
        self
    }

    pub fn with_pre_ads_delay(mut self, delay: Duration) -> Self {
        self.pre_ads_delay = delay;
        self
    }

    pub fn with_changeover_ads(mut self, duration: Duration) -> Self {
        self.changeover_ads = duration;
        self
    }

    pub fn with_set_break_ads(mut self, duration: Duration) -> Self {
        self.set_break_ads = duration;
        self
    }

    pub fn with_hold_poll_interval(mut self, interval: Duration) -> Self {
        self.hold_poll_interval = interval;
        self
    }

    pub fn with_manual_hold_max_poll(mut self, max: Duration) -> Self {
        self.manual_hold_max_poll = max;
        self
    }

    pub fn with_idle_heartbeat(mut self, enabled: bool) -> Self {
        self.idle_heartbeat = enabled;
        self
    }

    pub fn with_court_overrides(
        mut self,
        court_id: impl Into<String>,
        overrides: CourtOverrides,
    ) -> Self {
        self.courts.insert(court_id.into(), overrides);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TickerConfig::default();

        assert_eq!(config.tick_interval, Duration::from_secs(2));
        assert_eq!(config.pre_ads_delay, Duration::from_secs(5));
        assert_eq!(config.changeover_ads, Duration::from_secs(60));
        assert_eq!(config.set_break_ads, Duration::from_secs(120));
        assert_eq!(config.announce.get(AnnounceSlot::H2h), Duration::from_secs(6));
        assert!(config.idle_heartbeat);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_court_overrides_apply_per_court() {
        let config = TickerConfig::new().with_court_overrides(
            "C2",
            CourtOverrides {
                changeover_ads: Some(Duration::from_secs(45)),
                ..Default::default()
            },
        );

        let c2 = config.timing("C2");
        assert_eq!(c2.changeover_ads, Duration::from_secs(45));
        assert_eq!(c2.set_break_ads, Duration::from_secs(120));

        let c1 = config.timing("C1");
        assert_eq!(c1.changeover_ads, Duration::from_secs(60));
    }

    #[test]
    fn test_hold_poll_is_bounded_by_max() {
        let config = TickerConfig::new()
            .with_hold_poll_interval(Duration::from_secs(30))
            .with_manual_hold_max_poll(Duration::from_secs(10));

        assert_eq!(config.timing("C1").hold_poll, Duration::from_secs(10));
    }

    #[test]
    fn test_validation() {
        assert!(TickerConfig::new()
            .with_hold_poll_interval(Duration::ZERO)
            .validate()
            .is_err());
        assert!(TickerConfig::new()
            .with_court_overrides(" ", CourtOverrides::default())
            .validate()
            .is_err());
        assert!(TickerConfig::immediate().validate().is_ok());
    }

    #[test]
    fn test_deserialize_file_values() {
        let config: TickerConfig = serde_json::from_str(
            r#"{
                "tick_interval_ms": 1500,
                "changeover_ads_ms": -1,
                "courts": { "C2": { "pre_ads_delay_ms": 0, "changeover_ads_ms": 45000 } },
                "announce": { "h2h_ms": 8000 }
            }"#,
        )
        .unwrap();

        assert_eq!(config.tick_interval, Duration::from_millis(1500));
        assert_eq!(config.changeover_ads, Duration::ZERO);
        assert_eq!(config.announce.h2h, Duration::from_secs(8));
        assert_eq!(config.announce.fed, Duration::from_secs(5));

        let c2 = config.timing("C2");
        assert_eq!(c2.pre_ads_delay, Duration::ZERO);
        assert_eq!(c2.changeover_ads, Duration::from_secs(45));
        assert_eq!(c2.tick_interval, Duration::from_millis(1500));
    }
}
