//! Listener configuration

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use serde::Deserialize;

use courtside_events::duration::millis;

use crate::error::{ListenerError, Result};

/// Configuration for [`crate::DeviceListener`]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Address to bind; anything unparsable falls back to `0.0.0.0`
    /// Default: "0.0.0.0"
    pub bind_address: String,

    /// Port the controller connects to (0 picks an ephemeral port)
    /// Default: 33211
    pub port: u16,

    /// Size of a single socket read
    /// Default: 8192
    pub buffer_size: usize,

    /// Quiet period after which buffered bytes are treated as one chunk
    /// Default: 180 ms
    #[serde(rename = "frame_flush_threshold_ms", with = "millis")]
    pub frame_flush_threshold: Duration,

    /// How long a handler waits for data before checking the quiet period
    /// Default: 10 ms
    #[serde(rename = "poll_delay_ms", with = "millis")]
    pub poll_delay: Duration,

    /// Backoff before rebinding after the listen socket fails
    /// Default: 5 seconds
    #[serde(rename = "reconnect_delay_ms", with = "millis")]
    pub reconnect_delay: Duration,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 33211,
            buffer_size: 8192,
            frame_flush_threshold: Duration::from_millis(180),
            poll_delay: Duration::from_millis(10),
            reconnect_delay: Duration::from_secs(5),
        }
    }
}

impl ListenerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Socket address to bind.
    pub fn socket_addr(&self) -> SocketAddr {
        let ip = self.bind_address.trim().parse::<IpAddr>().unwrap_or_else(|_| {
            tracing::warn!(
                bind_address = %self.bind_address,
                "Unparsable bind address, listening on all interfaces"
            );
            IpAddr::V4(Ipv4Addr::UNSPECIFIED)
        });
        SocketAddr::new(ip, self.port)
    }

    pub fn validate(&self) -> Result<()> {
        if self.buffer_size == 0 {
            return Err(ListenerError::Configuration(
                "Buffer size must be greater than 0".to_string(),
            ));
        }

        if self.poll_delay.is_zero() {
            return Err(ListenerError::Configuration(
                "Poll delay must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    pub fn with_bind_address(mut self, address: impl Into<String>) -> Self {
        self.bind_address = address.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size;
        self
    }

    pub fn with_flush_threshold(mut self, threshold: Duration) -> Self {
        self.frame_flush_threshold = threshold;
        self
    }

    pub fn with_poll_delay(mut self, delay: Duration) -> Self {
        self.poll_delay = delay;
        self
    }

    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }
}
