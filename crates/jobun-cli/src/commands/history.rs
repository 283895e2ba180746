//! The `jobun history` command.

use std::path::PathBuf;

use anyhow::Result;

use jobun_store::config::load_config_from;
use jobun_store::history::SessionHistory;

pub fn execute(limit: usize, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let history = SessionHistory::new(config.sessions_dir());

    let reports = history.recent(limit)?;
    if reports.is_empty() {
        println!("No sessions recorded yet.");
        return Ok(());
    }

    for report in &reports {
        println!(
            "## {} ({} round(s))\n",
            report.started_at.format("%Y-%m-%d %H:%M"),
            report.results.len()
        );
        println!("{}", report.to_markdown());
    }

    Ok(())
}
