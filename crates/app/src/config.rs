//! Runtime configuration for the headless binary

use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::Level;

/// Where the compressed mask is persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadTarget {
    /// Write into a local directory
    LocalDir(PathBuf),
    /// Send to a WebSocket upload server
    Remote(String),
}

impl UploadTarget {
    /// `MASKPAINT_UPLOAD_URL` selects a remote server; otherwise `fallback_dir`
    pub fn from_env(fallback_dir: PathBuf) -> Self {
        Self::resolve(std::env::var("MASKPAINT_UPLOAD_URL").ok(), fallback_dir)
    }

    fn resolve(url: Option<String>, fallback_dir: PathBuf) -> Self {
        match url {
            Some(url) if url.starts_with("ws://") || url.starts_with("wss://") => Self::Remote(url),
            _ => Self::LocalDir(fallback_dir),
        }
    }
}

/// Parse the log level from `MASKPAINT_LOG`, INFO when unset or unknown
pub fn log_level_from_env() -> Level {
    parse_level(std::env::var("MASKPAINT_LOG").ok().as_deref())
}

fn parse_level(value: Option<&str>) -> Level {
    match value.map(str::to_ascii_lowercase).as_deref() {
        Some("trace") => Level::TRACE,
        Some("debug") => Level::DEBUG,
        Some("warn") => Level::WARN,
        Some("error") => Level::ERROR,
        Some("info") | _ => Level::INFO,
    }
}

/// Simulated clock for script replay: each command advances time by `step`
#[derive(Debug, Clone, Copy)]
pub struct ReplayClock {
    start: Instant,
    elapsed: Duration,
    step: Duration,
}

impl ReplayClock {
    pub fn new(step: Duration) -> Self {
        Self {
            start: Instant::now(),
            elapsed: Duration::ZERO,
            step,
        }
    }

    pub fn now(&self) -> Instant {
        self.start + self.elapsed
    }

    /// Advance by one step
    pub fn tick(&mut self) -> Instant {
        self.advance(self.step)
    }

    pub fn advance(&mut self, by: Duration) -> Instant {
        self.elapsed += by;
        self.now()
    }
}
