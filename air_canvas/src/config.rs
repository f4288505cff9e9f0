//! Application configuration: where landmarks come from, plus the session
//! settings, optionally overridden from a JSON file.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::session::SessionConfig;

/// Where landmark frames come from.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum SourceChoice {
    /// Keyboard + mouse simulated hand.
    #[default]
    Sim,
    /// External detector process started from this shell command.
    Detector(String),
    /// Detector output piped into our stdin.
    Stdin,
}

/// Configuration for the full application.
#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub session:        SessionConfig,
    pub source:         SourceChoice,
    /// Detector hands scoring below this are ignored.
    pub min_confidence: f32,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            session:        SessionConfig::default(),
            source:         SourceChoice::Sim,
            min_confidence: 0.5,
        }
    }
}

/// Parse a (possibly partial) session config; absent fields keep their
/// defaults.
pub fn parse_session_config(json: &str) -> Result<SessionConfig> {
    serde_json::from_str(json).context("invalid session config")
}

pub fn load_session_config(path: &Path) -> Result<SessionConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let cfg = parse_session_config(&text)
        .with_context(|| format!("in {}", path.display()))?;
    info!("loaded config from {}", path.display());
    Ok(cfg)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
