//! Session report archive.
//!
//! Finished sessions land as one JSON document each under the sessions
//! directory; listing walks the directory and orders reports newest first.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use jobun_core::report::SessionReport;

/// Directory-backed archive of session reports.
pub struct SessionHistory {
    dir: PathBuf,
}

impl SessionHistory {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Appends one report to the archive and returns where it was written.
    pub fn append(&self, report: &SessionReport) -> Result<PathBuf> {
        let name = format!(
            "session-{}-{}.json",
            report.started_at.format("%Y%m%dT%H%M%S"),
            report.id
        );
        let path = self.dir.join(name);
        report
            .save_json(&path)
            .with_context(|| format!("failed to archive session report {}", report.id))?;
        Ok(path)
    }

    /// Loads up to `limit` reports, most recent session first. An absent
    /// directory is an empty archive; files that fail to parse are skipped
    /// with a warning so one bad document cannot hide the rest.
    pub fn recent(&self, limit: usize) -> Result<Vec<SessionReport>> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("failed to read session archive {}", self.dir.display())
                })
            }
        };

        let mut reports: Vec<SessionReport> = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().map_or(true, |ext| ext != "json") {
                continue;
            }
            match SessionReport::load_json(&path) {
                Ok(report) => reports.push(report),
                Err(error) => {
                    tracing::warn!(path = %path.display(), %error, "skipping unreadable report");
                }
            }
        }

        reports.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        reports.truncate(limit);
        Ok(reports)
    }
}
