//! jobun CLI — timed recall drills for statute citations.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "jobun", version, about = "Timed recall drills for statute citations")]
struct Cli {
    /// Verbose logging (repeat for debug output)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Mine citations out of text files
    Extract {
        /// Corpus text files to scan
        paths: Vec<PathBuf>,

        /// Output format: table, json
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// Run an interactive recall session
    Drill {
        /// Corpus text files to scan
        paths: Vec<PathBuf>,

        /// Restrict to these laws (repeatable)
        #[arg(long = "law")]
        laws: Vec<String>,

        /// Drill only weak citations
        #[arg(long, conflicts_with_all = ["fresh_only", "missed_within", "article"])]
        weak_only: bool,

        /// Drill only citations without a paragraph index
        #[arg(long, conflicts_with_all = ["missed_within", "article"])]
        fresh_only: bool,

        /// Drill citations missed within the last N days
        #[arg(long, value_name = "DAYS", conflicts_with = "article")]
        missed_within: Option<u32>,

        /// Drill one citation, e.g. "民法413条の2"
        #[arg(long)]
        article: Option<String>,

        /// Number of rounds (default from config)
        #[arg(long)]
        count: Option<usize>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show the per-citation performance ledger
    Stats {
        /// Restrict to one law
        #[arg(long)]
        law: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List recent session reports
    History {
        /// How many sessions to show
        #[arg(long, default_value = "5")]
        limit: usize,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create a starter config and sample corpus
    Init,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "jobun=info",
        1 => "jobun=debug",
        _ => "jobun=trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(level.parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Extract { paths, format } => commands::extract::execute(paths, format),
        Commands::Drill {
            paths,
            laws,
            weak_only,
            fresh_only,
            missed_within,
            article,
            count,
            config,
        } => {
            commands::drill::execute(
                paths,
                laws,
                weak_only,
                fresh_only,
                missed_within,
                article,
                count,
                config,
            )
            .await
        }
        Commands::Stats { law, config } => commands::stats::execute(law, config).await,
        Commands::History { limit, config } => commands::history::execute(limit, config),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
