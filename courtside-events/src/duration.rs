//! Serde helpers for durations written as whole milliseconds.
//!
//! Values are signed on the way in; zero or negative means "no delay".
//!
//! ```rust
//! use std::time::Duration;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Timing {
//!     #[serde(with = "courtside_events::duration::millis")]
//!     pause_ms: Duration,
//! }
//!
//! let timing: Timing = serde_json::from_str(r#"{"pause_ms": -5}"#).unwrap();
//! assert_eq!(timing.pause_ms, Duration::ZERO);
//! ```

use std::time::Duration;

/// Convert signed milliseconds, clamping negatives to zero.
pub fn from_signed_millis(ms: i64) -> Duration {
    u64::try_from(ms).map(Duration::from_millis).unwrap_or(Duration::ZERO)
}

fn to_millis(duration: &Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

pub mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(super::to_millis(duration))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        i64::deserialize(deserializer).map(super::from_signed_millis)
    }
}

pub mod optional_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        duration: &Option<Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match duration {
            Some(d) => serializer.serialize_some(&super::to_millis(d)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<i64>::deserialize(deserializer)?.map(super::from_signed_millis))
    }
}
