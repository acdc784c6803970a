//! # courtside-parser
//!
//! Decoding of the telemetry stream emitted by the scoreboard controller.
//!
//! The controller streams text that contains zero or more CDATA envelopes, each
//! holding zero or more `<Packet>` elements whose body is a base64 encoded,
//! fixed-width positional record. This crate is split in two pure stages:
//!
//! - [`frame`]: scans a chunk of text and lazily yields every decodable packet
//!   as a raw frame string.
//! - [`snapshot`]: slices a raw frame at fixed character offsets and normalizes
//!   the values into a [`MatchSnapshot`].
//!
//! Neither stage performs I/O and neither ever fails outward: corrupt packets
//! are skipped and short frames decode to empty fields.
//!
//! ## Usage
//!
//! ```rust
//! use courtside_parser::{extract_frames, DecodedFrame};
//!
//! let chunk = "<Packet>aGVsbG8=</Packet>";
//! for frame in extract_frames(chunk) {
//!     let snapshot = DecodedFrame::decode(&frame).snapshot();
//!     println!("{} vs {}", snapshot.team_a, snapshot.team_b);
//! }
//! ```

pub mod error;
pub mod frame;
pub mod snapshot;

pub use error::{ParseError, ParseResult};
pub use frame::{extract_frames, Frames};
pub use snapshot::{map_point, normalize_server, DecodedFrame, MatchSnapshot};
