//! Application configuration.
//!
//! One TOML document covers the data directory, round timing and scoring,
//! the weak-citation thresholds, and the optional article-body sources.
//! Values outside their sensible ranges are clamped on load rather than
//! rejected, so a hand-edited config never refuses to start a session.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use jobun_core::ledger::WeakConfig;
use jobun_core::round::RoundConfig;

/// Top-level jobun configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizConfig {
    /// Directory holding the ledger document and session history.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Countdown, scoring, and penalty settings for every round.
    #[serde(default)]
    pub round: RoundConfig,
    /// Thresholds for the weak-citation query.
    #[serde(default)]
    pub weak: WeakConfig,
    /// Window for the recently-missed session mode, in days.
    #[serde(default = "default_missed_days")]
    pub recently_missed_days: u32,
    /// Rounds per session when the caller does not say otherwise.
    #[serde(default = "default_question_count")]
    pub default_question_count: usize,
    /// Directory of per-law provision-body JSON documents.
    #[serde(default)]
    pub bodies_dir: Option<PathBuf>,
    /// Base URL of a remote article-body service.
    #[serde(default)]
    pub article_api_url: Option<String>,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./jobun-data")
}
fn default_missed_days() -> u32 {
    7
}
fn default_question_count() -> usize {
    10
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            round: RoundConfig::default(),
            weak: WeakConfig::default(),
            recently_missed_days: default_missed_days(),
            default_question_count: default_question_count(),
            bodies_dir: None,
            article_api_url: None,
        }
    }
}

impl QuizConfig {
    /// Location of the ledger document inside the data directory.
    pub fn ledger_path(&self) -> PathBuf {
        self.data_dir.join("ledger.json")
    }

    /// Location of saved session reports.
    pub fn sessions_dir(&self) -> PathBuf {
        self.data_dir.join("sessions")
    }

    /// Pulls out-of-range values back into their valid ranges.
    fn clamp(mut self) -> Self {
        if self.round.countdown_ticks == 0 {
            self.round.countdown_ticks = 1;
        }
        self.weak.accuracy_threshold = self.weak.accuracy_threshold.clamp(0.0, 100.0);
        if self.weak.min_attempts == 0 {
            self.weak.min_attempts = 1;
        }
        if self.recently_missed_days == 0 {
            self.recently_missed_days = 1;
        }
        if self.default_question_count == 0 {
            self.default_question_count = default_question_count();
        }
        self
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `jobun.toml` in the current directory
/// 2. `~/.config/jobun/config.toml`
///
/// Environment variable override: `JOBUN_DATA_DIR` replaces the data
/// directory wherever the config came from.
pub fn load_config() -> Result<QuizConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<QuizConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("jobun.toml");
        if local.exists() {
            Some(local)
        } else if let Some(home) = dirs_path() {
            let global = home.join("config.toml");
            if global.exists() {
                Some(global)
            } else {
                None
            }
        } else {
            None
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<QuizConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => QuizConfig::default(),
    };

    if let Ok(dir) = std::env::var("JOBUN_DATA_DIR") {
        if !dir.is_empty() {
            config.data_dir = PathBuf::from(dir);
        }
    }

    Ok(config.clamp())
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("jobun"))
}
