//! The `jobun extract` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};

use jobun_core::extract::extract;
use jobun_core::model::CitationSet;

pub fn execute(paths: Vec<PathBuf>, format: String) -> Result<()> {
    anyhow::ensure!(!paths.is_empty(), "no corpus files given");

    let set = extract_from_files(&paths)?;
    match format.as_str() {
        "table" => print_table(&set),
        "json" => {
            let json = serde_json::to_string_pretty(set.citations())?;
            println!("{json}");
        }
        other => anyhow::bail!("unknown format '{other}' (expected table or json)"),
    }
    Ok(())
}

/// Reads every corpus file and mines the joined text.
pub fn extract_from_files(paths: &[PathBuf]) -> Result<CitationSet> {
    let mut blocks = Vec::with_capacity(paths.len());
    for path in paths {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read corpus file {}", path.display()))?;
        blocks.push(text);
    }
    Ok(extract(blocks))
}

fn print_table(set: &CitationSet) {
    let mut table = Table::new();
    table.set_header(vec!["Law", "Article", "Paragraph", "Citation"]);
    for citation in set.iter() {
        table.add_row(vec![
            Cell::new(&citation.law_name),
            Cell::new(&citation.article_number),
            Cell::new(
                citation
                    .paragraph
                    .map(|p| p.to_string())
                    .unwrap_or_else(|| "-".to_owned()),
            ),
            Cell::new(citation.to_string()),
        ]);
    }
    println!("{table}");
    println!("{} citation(s) found", set.len());
}
