//! Command line arguments and the optional JSON configuration file

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use tracing::info;

use courtside_events::HubConfig;
use courtside_listener::ListenerConfig;
use courtside_ticker::TickerConfig;

/// Courtside live-state server
///
/// Listens for the scoreboard controller feed, plays the scripted court
/// ticker, and writes every broadcast message to stdout as one JSON line.
/// Operator commands are read from stdin.
#[derive(Parser, Debug, Default)]
#[command(name = "courtside")]
#[command(about = "Live match state ingestion and broadcast")]
#[command(version)]
pub struct Args {
    /// JSON configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// JSON court script file replacing the built-in scripts
    #[arg(short, long)]
    pub script: Option<PathBuf>,

    /// Device listener port, overriding the configuration file
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Logging mode (silent, development, debug, json); falls back to COURTSIDE_LOG_MODE
    #[arg(long)]
    pub log_mode: Option<String>,

    /// Do not run the court ticker
    #[arg(long)]
    pub no_ticker: bool,

    /// Do not run the device listener
    #[arg(long)]
    pub no_listener: bool,
}

/// Everything the process needs, as loaded from the configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listener: ListenerConfig,
    pub ticker: TickerConfig,
    pub hub: HubConfig,
    pub script_path: Option<PathBuf>,
    /// Not read from the file; set by `--no-ticker`
    #[serde(skip)]
    pub ticker_enabled: bool,
    /// Not read from the file; set by `--no-listener`
    #[serde(skip)]
    pub listener_enabled: bool,
}

impl ServerConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Invalid configuration file")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file {}", path.display()))?;
        Self::from_json(&json)
    }

    /// Load the file named by `args` (if any) and apply command line overrides.
    pub fn from_args(args: &Args) -> Result<Self> {
        let mut config = match &args.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply_args(args);
        config.validate()?;
        Ok(config)
    }

    pub fn apply_args(&mut self, args: &Args) {
        if let Some(port) = args.port {
            self.listener.port = port;
        }
        if let Some(script) = &args.script {
            self.script_path = Some(script.clone());
        }
        self.ticker_enabled = !args.no_ticker;
        self.listener_enabled = !args.no_listener;
    }

    pub fn validate(&self) -> Result<()> {
        if !self.ticker_enabled && !self.listener_enabled {
            anyhow::bail!("Nothing to run: both the ticker and the listener are disabled");
        }
        if self.listener_enabled {
            self.listener.validate()?;
        }
        if self.ticker_enabled {
            self.ticker.validate()?;
        }
        if self.hub.capacity == 0 {
            anyhow::bail!("Hub capacity must be greater than 0");
        }
        Ok(())
    }

    pub fn print_summary(&self) {
        info!("Configuration:");
        if self.listener_enabled {
            info!("  Listener: {}", self.listener.socket_addr());
            info!(
                "  Flush threshold: {}ms, poll delay: {}ms, reconnect delay: {}ms",
                self.listener.frame_flush_threshold.as_millis(),
                self.listener.poll_delay.as_millis(),
                self.listener.reconnect_delay.as_millis()
            );
        } else {
            info!("  Listener: disabled");
        }
        if self.ticker_enabled {
            info!("  Tick interval: {}ms", self.ticker.tick_interval.as_millis());
            match &self.script_path {
                Some(path) => info!("  Scripts: {}", path.display()),
                None => info!("  Scripts: built-in"),
            }
        } else {
            info!("  Ticker: disabled");
        }
        info!("  Hub capacity: {}", self.hub.capacity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_defaults_without_file() {
        let config = ServerConfig::from_args(&Args::default()).unwrap();
        assert_eq!(config.listener.port, 33211);
        assert_eq!(config.hub.capacity, 1024);
        assert!(config.ticker_enabled);
        assert!(config.listener_enabled);
        assert_eq!(config.script_path, None);
    }

    #[test]
    fn test_file_values_and_overrides() {
        let mut config = ServerConfig::from_json(
            r#"{
                "listener": { "port": 40000, "frame_flush_threshold_ms": 250 },
                "ticker": { "tick_interval_ms": 1000, "courts": { "C2": { "changeover_ads_ms": 45000 } } },
                "hub": { "capacity": 64 },
                "script_path": "courts.json"
            }"#,
        )
        .unwrap();
        assert_eq!(config.listener.port, 40000);
        assert_eq!(config.ticker.timing("C2").changeover_ads, Duration::from_secs(45));
        assert_eq!(config.hub.capacity, 64);

        let args = Args::parse_from(["courtside", "--port", "41000", "--script", "other.json", "--no-ticker"]);
        config.apply_args(&args);
        assert_eq!(config.listener.port, 41000);
        assert_eq!(config.script_path, Some(PathBuf::from("other.json")));
        assert!(!config.ticker_enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_nothing_enabled_is_rejected() {
        let args = Args::parse_from(["courtside", "--no-ticker", "--no-listener"]);
        assert!(ServerConfig::from_args(&args).is_err());
    }

    #[test]
    fn test_invalid_file_is_reported() {
        assert!(ServerConfig::from_json("{ \"listener\": 5 }").is_err());
        assert!(ServerConfig::load(Path::new("/nonexistent/courtside.json")).is_err());
    }
}
