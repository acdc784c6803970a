//! Viewer feed: every broadcast message as one JSON line on stdout

use std::io::Write;

use tokio::sync::broadcast::{self, error::RecvError};

use courtside_events::{LiveMessage, Shutdown};

/// Forward hub messages to `out` until shutdown or the hub closes.
pub async fn run<W: Write>(
    mut messages: broadcast::Receiver<LiveMessage>,
    mut out: W,
    mut shutdown: Shutdown,
) {
    loop {
        tokio::select! {
            received = messages.recv() => match received {
                Ok(message) => {
                    if let Err(e) = write_line(&mut out, &message) {
                        tracing::warn!(error = %e, "Failed to write viewer feed");
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Viewer feed lagging, messages skipped");
                }
                Err(RecvError::Closed) => break,
            },
            _ = shutdown.triggered() => break,
        }
    }

    tracing::debug!("Viewer feed stopped");
}

fn write_line<W: Write>(out: &mut W, message: &LiveMessage) -> std::io::Result<()> {
    serde_json::to_writer(&mut *out, message)?;
    out.write_all(b"\n")?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use courtside_events::{scenes, shutdown_channel, BroadcastHub, Broadcaster, SceneEvent};

    #[tokio::test]
    async fn test_messages_become_json_lines() {
        let hub = BroadcastHub::default();
        let rx = hub.subscribe();
        let (trigger, shutdown) = shutdown_channel();

        hub.publish(LiveMessage::SceneSwitch(SceneEvent::new("C1", scenes::ADS)))
            .await
            .unwrap();
        hub.publish(LiveMessage::SceneSwitch(SceneEvent::new("C1", scenes::LIVE)))
            .await
            .unwrap();
        drop(hub);

        let mut out = Vec::new();
        run(rx, &mut out, shutdown).await;
        drop(trigger);

        let text = String::from_utf8(out).unwrap();
        let lines: Vec<serde_json::Value> = text
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["method"], "SceneSwitch");
        assert_eq!(lines[1]["payload"]["Scene"], "LIVE");
    }
}
