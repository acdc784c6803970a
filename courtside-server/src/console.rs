//! Operator console on stdin.
//!
//! ```text
//! hold <court> [reason...]
//! clear <court>
//! status
//! ```
//!
//! Replies go to stderr so stdout stays a clean viewer feed.

use std::sync::Arc;

use serde_json::json;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use courtside_events::{ReadinessTracker, Shutdown};
use courtside_listener::DeviceListener;
use courtside_ticker::TickerService;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Hold { court_id: String, reason: String },
    Clear { court_id: String },
    Status,
    Help,
    Unknown(String),
}

impl Command {
    /// Parse one console line. Blank lines yield `None`.
    pub fn parse(line: &str) -> Option<Self> {
        let mut words = line.split_whitespace();
        let verb = words.next()?;

        let command = match verb.to_ascii_lowercase().as_str() {
            "hold" => match words.next() {
                Some(court) => Command::Hold {
                    court_id: court.to_string(),
                    reason: words.collect::<Vec<_>>().join(" "),
                },
                None => Command::Unknown(line.trim().to_string()),
            },
            "clear" => match words.next() {
                Some(court) => Command::Clear {
                    court_id: court.to_string(),
                },
                None => Command::Unknown(line.trim().to_string()),
            },
            "status" => Command::Status,
            "help" | "?" => Command::Help,
            _ => Command::Unknown(line.trim().to_string()),
        };
        Some(command)
    }
}

/// What the console can reach. Either producer may be disabled.
pub struct Console {
    pub ticker: Option<Arc<TickerService>>,
    pub listener: Option<Arc<DeviceListener>>,
    pub readiness: Arc<ReadinessTracker>,
}

impl Console {
    /// Read commands from `input` until end of input or shutdown.
    pub async fn run<R: AsyncBufRead + Unpin>(&self, input: R, mut shutdown: Shutdown) {
        let mut lines = input.lines();

        loop {
            tokio::select! {
                line = lines.next_line() => match line {
                    Ok(Some(line)) => {
                        if let Some(command) = Command::parse(&line) {
                            eprintln!("{}", self.execute(command).await);
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        tracing::warn!(error = %e, "Console input failed");
                        break;
                    }
                },
                _ = shutdown.triggered() => break,
            }
        }

        tracing::debug!("Console stopped");
    }

    /// Run one command and render the reply.
    pub async fn execute(&self, command: Command) -> String {
        match command {
            Command::Hold { court_id, reason } => match &self.ticker {
                Some(ticker) => render(&ticker.set_hold(&court_id, &reason).await),
                None => "ticker disabled".to_string(),
            },
            Command::Clear { court_id } => match &self.ticker {
                Some(ticker) => render(&ticker.clear_hold(&court_id).await),
                None => "ticker disabled".to_string(),
            },
            Command::Status => self.status(),
            Command::Help => "commands: hold <court> [reason], clear <court>, status".to_string(),
            Command::Unknown(line) => format!("unknown command: {line}"),
        }
    }

    fn status(&self) -> String {
        let ticker = self.ticker.as_ref().map(|ticker| {
            let courts: serde_json::Map<String, serde_json::Value> = ticker
                .stats()
                .into_iter()
                .map(|(court, stats)| {
                    let entry = json!({
                        "scene": ticker.current_scene(&court),
                        "hold": ticker.holds().reason(&court),
                        "stats": stats,
                    });
                    (court, entry)
                })
                .collect();
            serde_json::Value::Object(courts)
        });

        let listener = self.listener.as_ref().map(|listener| {
            json!({
                "state": format!("{:?}", listener.state()),
                "stats": listener.stats(),
            })
        });

        json!({
            "readiness": self.readiness.status(),
            "courts": ticker,
            "listener": listener,
        })
        .to_string()
    }
}

fn render<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| format!("unrenderable reply: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use courtside_events::{shutdown_channel, BroadcastHub};
    use courtside_ticker::{CourtScript, TickerConfig};
    use rstest::rstest;

    #[rstest]
    #[case("hold C1 INJURY", Some(Command::Hold { court_id: "C1".into(), reason: "INJURY".into() }))]
    #[case("HOLD C2 rain  delay", Some(Command::Hold { court_id: "C2".into(), reason: "rain delay".into() }))]
    #[case("hold C1", Some(Command::Hold { court_id: "C1".into(), reason: String::new() }))]
    #[case("clear C1", Some(Command::Clear { court_id: "C1".into() }))]
    #[case("  status ", Some(Command::Status))]
    #[case("hold", Some(Command::Unknown("hold".into())))]
    #[case("dance", Some(Command::Unknown("dance".into())))]
    #[case("   ", None)]
    fn test_parse(#[case] line: &str, #[case] expected: Option<Command>) {
        assert_eq!(Command::parse(line), expected);
    }

    fn console() -> Console {
        let readiness = Arc::new(ReadinessTracker::new());
        let ticker = TickerService::new(
            TickerConfig::immediate(),
            vec![CourtScript::new("C1", vec![])],
            Arc::new(BroadcastHub::default()),
            Arc::clone(&readiness),
        )
        .unwrap();

        Console {
            ticker: Some(Arc::new(ticker)),
            listener: None,
            readiness,
        }
    }

    #[tokio::test]
    async fn test_hold_and_status_replies() {
        let console = console();

        let reply = console.execute(Command::parse("hold C1").unwrap()).await;
        let ack: serde_json::Value = serde_json::from_str(&reply).unwrap();
        assert_eq!(ack["applied"], true);
        assert_eq!(ack["reason"], "MANUAL");

        let status: serde_json::Value = serde_json::from_str(&console.status()).unwrap();
        assert_eq!(status["courts"]["C1"]["hold"], "MANUAL");
        assert_eq!(status["courts"]["C1"]["scene"], "ADS");
        assert_eq!(status["readiness"]["ready"], false);
        assert!(status["listener"].is_null());
    }

    #[tokio::test]
    async fn test_run_consumes_input_until_eof() {
        let console = console();
        let (_trigger, shutdown) = shutdown_channel();

        console
            .run(&b"hold C1 WEATHER\nclear C1\n"[..], shutdown)
            .await;

        let ticker = console.ticker.as_ref().unwrap();
        assert!(!ticker.holds().is_held("C1"));
        assert_eq!(ticker.current_scene("C1").as_deref(), Some("LIVE"));
    }
}
