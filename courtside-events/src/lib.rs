//! # courtside-events
//!
//! Shared vocabulary of the courtside workspace: the messages pushed to
//! viewers, the [`Broadcaster`] seam both producers publish through, and the
//! process lifecycle primitives (shutdown signal, readiness flags, logging).
//!
//! Producers never know how many viewers exist. They hand a [`LiveMessage`] to
//! a [`Broadcaster`] and move on; delivery to whoever is subscribed at that
//! moment is the broadcaster's concern.
//!
//! ```rust
//! use courtside_events::{BroadcastHub, Broadcaster, LiveMessage, SceneEvent, scenes};
//!
//! # tokio_test::block_on(async {
//! let hub = BroadcastHub::default();
//! let mut viewer = hub.subscribe();
//!
//! hub.publish(LiveMessage::SceneSwitch(SceneEvent::new("C1", scenes::ADS)))
//!     .await
//!     .unwrap();
//!
//! let received = viewer.recv().await.unwrap();
//! assert_eq!(received.method(), "SceneSwitch");
//! # });
//! ```

pub mod broadcast;
pub mod duration;
pub mod error;
pub mod logging;
pub mod message;
pub mod readiness;
pub mod shutdown;

pub use broadcast::{publish_logged, BroadcastHub, Broadcaster, HubConfig};
pub use error::{PublishError, PublishResult};
pub use message::{
    scenes, AnnounceEvent, FinishedMatch, H2HRecord, LiveMessage, PlayerCard, SceneEvent,
    ScoreEvent, SummaryEvent, UpcomingMatch,
};
pub use readiness::{ReadinessStatus, ReadinessTracker};
pub use shutdown::{shutdown_channel, Shutdown, ShutdownTrigger};

pub use courtside_parser::MatchSnapshot;
