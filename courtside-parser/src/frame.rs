//! Packet extraction from raw controller text.
//!
//! The controller wraps each record as `<Packet>BASE64</Packet>`, optionally
//! inside one or more `<![CDATA[ ... ]]>` envelopes. When at least one
//! non-blank envelope is present only envelope contents are scanned; packets
//! sitting outside every envelope are ignored in that case.
//!
//! Extraction is lazy and side-effect free: [`Frames`] borrows the input and
//! can be cloned or recreated to replay the same sequence.

use std::iter::Peekable;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::error::{ParseError, ParseResult};

const ENVELOPE_OPEN: &str = "<![CDATA[";
/// `]>>` is what some controller firmware writes in place of `]]>`.
const ENVELOPE_CLOSE: [&str; 2] = ["]]>", "]>>"];
const PACKET_OPEN: &str = "<Packet>";
const PACKET_CLOSE: &str = "</Packet>";

/// Scan `text` for packets and yield each successfully decoded frame.
///
/// Packets with a blank body, invalid base64 or non UTF-8 content are skipped.
pub fn extract_frames(text: &str) -> Frames<'_> {
    let mut envelopes = Envelopes::new(text).peekable();
    let source = if envelopes.peek().is_some() {
        Source::Enveloped {
            envelopes,
            current: None,
        }
    } else {
        Source::Plain(Packets::new(text))
    };

    Frames { source }
}

/// Decode one packet body into frame text.
///
/// ASCII whitespace inside the body is ignored, matching how the controller
/// sometimes line-wraps long payloads.
pub fn decode_payload(raw: &str) -> ParseResult<String> {
    let compact: String = raw.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    if compact.is_empty() {
        return Err(ParseError::EmptyPayload);
    }

    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| ParseError::InvalidBase64(e.to_string()))?;
    let text = String::from_utf8(bytes).map_err(|e| ParseError::InvalidUtf8(e.to_string()))?;

    if text.is_empty() {
        return Err(ParseError::EmptyPayload);
    }

    Ok(text)
}

/// Lazy sequence of decoded frames produced by [`extract_frames`].
#[derive(Debug, Clone)]
pub struct Frames<'a> {
    source: Source<'a>,
}

#[derive(Debug, Clone)]
enum Source<'a> {
    Plain(Packets<'a>),
    Enveloped {
        envelopes: Peekable<Envelopes<'a>>,
        current: Option<Packets<'a>>,
    },
}

impl<'a> Iterator for Frames<'a> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        match &mut self.source {
            Source::Plain(packets) => next_frame(packets),
            Source::Enveloped { envelopes, current } => loop {
                if let Some(packets) = current.as_mut() {
                    if let Some(frame) = next_frame(packets) {
                        return Some(frame);
                    }
                }
                *current = Some(Packets::new(envelopes.next()?));
            },
        }
    }
}

fn next_frame(packets: &mut Packets<'_>) -> Option<String> {
    packets.find_map(|raw| decode_payload(raw.trim()).ok())
}

/// Non-blank CDATA section bodies, in order of appearance.
#[derive(Debug, Clone)]
struct Envelopes<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Envelopes<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }
}

impl<'a> Iterator for Envelopes<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        loop {
            let rest = &self.text[self.pos..];
            let start = rest.find(ENVELOPE_OPEN)? + ENVELOPE_OPEN.len();
            let close = ENVELOPE_CLOSE
                .iter()
                .filter_map(|marker| rest[start..].find(marker).map(|at| (at, marker.len())))
                .min_by_key(|(at, _)| *at);
            let (len, close_len) = match close {
                Some(found) => found,
                None => {
                    self.pos = self.text.len();
                    return None;
                }
            };

            let inner = &rest[start..start + len];
            self.pos += start + len + close_len;

            if !inner.trim().is_empty() {
                return Some(inner);
            }
        }
    }
}

/// Raw `<Packet>` bodies. A body runs up to the next `<`, which must open the
/// closing tag; anything else is not a packet.
#[derive(Debug, Clone)]
struct Packets<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Packets<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }
}

impl<'a> Iterator for Packets<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        loop {
            let open = self.text[self.pos..].find(PACKET_OPEN)?;
            let body_start = self.pos + open + PACKET_OPEN.len();
            let body = &self.text[body_start..];

            let Some(end) = body.find('<') else {
                self.pos = self.text.len();
                return None;
            };

            if end > 0 && body[end..].starts_with(PACKET_CLOSE) {
                self.pos = body_start + end + PACKET_CLOSE.len();
                return Some(&body[..end]);
            }

            self.pos = body_start + end;
        }
    }
}
