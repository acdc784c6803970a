//! # courtside-listener
//!
//! Accepts TCP connections from the scoreboard controller, frames its byte
//! stream by quiet period, and publishes a `Snapshot` message for every
//! decoded record.
//!
//! The listener supervises its own socket: bind or accept failures are logged
//! and the whole listen cycle restarts after `reconnect_delay`. Only the
//! shared [`courtside_events::Shutdown`] signal ends it.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use courtside_events::{shutdown_channel, BroadcastHub};
//! use courtside_listener::{DeviceListener, ListenerConfig};
//!
//! # async fn example() {
//! let hub = Arc::new(BroadcastHub::default());
//! let listener = DeviceListener::new(ListenerConfig::default(), hub.clone());
//!
//! let (trigger, shutdown) = shutdown_channel();
//! tokio::spawn(async move { listener.run(shutdown).await });
//!
//! // ... later
//! trigger.trigger();
//! # }
//! ```

pub mod config;
mod connection;
pub mod error;
pub mod listener;
pub mod publisher;

pub use config::ListenerConfig;
pub use error::{ListenerError, Result};
pub use listener::{DeviceListener, ListenerState};
pub use publisher::{ListenerStats, ListenerStatsSnapshot, SnapshotPublisher};
