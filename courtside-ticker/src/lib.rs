//! # courtside-ticker
//!
//! Plays a data-driven script per court: score lines, scene switches,
//! announcement steps and summaries, each followed by a configured delay.
//! Courts run concurrently and share nothing except the [`HoldRegistry`],
//! through which an operator can park a court on ADS until released.
//!
//! ```rust
//! use std::sync::Arc;
//! use courtside_events::{shutdown_channel, BroadcastHub, ReadinessTracker};
//! use courtside_ticker::{TickerConfig, TickerService};
//!
//! # tokio_test::block_on(async {
//! let hub = Arc::new(BroadcastHub::default());
//! let ticker = TickerService::with_seed_scripts(
//!     TickerConfig::default(),
//!     hub.clone(),
//!     Arc::new(ReadinessTracker::new()),
//! )
//! .unwrap();
//!
//! let (trigger, shutdown) = shutdown_channel();
//! let handle = ticker.start(shutdown);
//!
//! let ack = ticker.set_hold("C1", "INJURY").await;
//! assert!(ack.applied);
//!
//! trigger.trigger();
//! handle.join().await;
//! # });
//! ```

pub mod breaks;
pub mod config;
pub mod error;
pub mod hold;
pub mod publisher;
pub mod scene;
pub mod scheduler;
pub mod script;
pub mod seed;
pub mod service;

pub use breaks::{Break, BreakPolicy};
pub use config::{AnnounceDurations, CourtOverrides, CourtTiming, TickerConfig};
pub use error::{Result, TickerError};
pub use hold::{HoldRegistry, DEFAULT_HOLD_REASON};
pub use publisher::CourtPublisher;
pub use scene::SceneTracker;
pub use scheduler::{CourtScheduler, CourtStats, CourtStatsSnapshot};
pub use script::{
    AnnounceSlot, CourtScript, GameState, ScriptStep, ScriptedFixture, ScriptedResult, StepAction,
    StepDelay,
};
pub use service::{HoldAck, TickerHandle, TickerService};
