use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};

use oneview_watch::app::{extract_local, run_check, run_feed};
use oneview_watch::config::{SourceConfig, WatchConfig, log_path};
use oneview_watch::extract::{MatchMode, MatchRule};
use oneview_watch::logging::init_logging;
use oneview_watch::output::FileStateStore;
use oneview_watch::source::HttpFetcher;
use oneview_watch::version::{ChangeSignal, Selection};

#[derive(Parser)]
#[command(name = "oneview-watch")]
#[command(version, about = "Detects the latest published HPE OneView release")]
struct Cli {
    /// JSON configuration file (defaults to the user config, then built-in sources)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Also write JSON logs to a file; `--log-file=PATH` picks the path
    #[arg(long, global = true, require_equals = true)]
    log_file: Option<Option<PathBuf>>,

    /// Debug-level logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Store the latest version in a text file when it changes (default)
    Check {
        /// State file, overrides the configured path
        #[arg(long)]
        state: Option<PathBuf>,
    },
    /// Regenerate the RSS feed for the latest version
    Feed {
        /// Feed file, overrides the configured path
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Run the extractor on a local file and print the ranking
    Extract {
        file: PathBuf,
        /// Treat the file as plain text instead of HTML
        #[arg(long)]
        text: bool,
        /// Only accept versions directly preceded by this phrase
        #[arg(long)]
        anchor: Option<String>,
        /// Comma-separated major versions to accept
        #[arg(long, value_delimiter = ',')]
        allow: Vec<u32>,
        /// Version-shape regex override
        #[arg(long)]
        pattern: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_file = cli
        .log_file
        .clone()
        .map(|path| path.unwrap_or_else(log_path));
    let _guard = init_logging(cli.verbose, log_file.as_deref())?;

    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?
        .block_on(run(cli))
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = WatchConfig::discover(cli.config.as_deref())?;

    match cli.command.unwrap_or(Command::Check { state: None }) {
        Command::Check { state } => {
            if let Some(path) = state {
                config.state.path = path;
            }
            let fetcher = HttpFetcher::new(&config.fetch).context("failed to create HTTP client")?;
            let store = FileStateStore::new(&config.state.path);

            let (selection, signal) = run_check(&fetcher, &config, &store).await?;
            match signal {
                ChangeSignal::NewVersion { current, .. } => {
                    println!("New version detected: {}", current);
                }
                ChangeSignal::Unchanged { current } => println!("No new version ({}).", current),
            }
            print_release_date(&selection);
        }
        Command::Feed { output } => {
            if let Some(path) = output {
                config.feed.path = path;
            }
            let fetcher = HttpFetcher::new(&config.fetch).context("failed to create HTTP client")?;

            let selection = run_feed(&fetcher, &config, Utc::now()).await?;
            println!("Detected latest version: {}", selection.latest);
            print_release_date(&selection);
        }
        Command::Extract {
            file,
            text,
            anchor,
            allow,
            pattern,
        } => {
            let content = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read {:?}", file))?;
            let rule = MatchRule::compile(&SourceConfig {
                url: file.display().to_string(),
                mode: if anchor.is_some() {
                    MatchMode::Anchored
                } else {
                    MatchMode::ContextFree
                },
                pattern,
                anchor,
                major_allowlist: (!allow.is_empty()).then_some(allow),
            })?;

            let selection = extract_local(&content, !text, &rule, config.rendering)?;
            for key in &selection.ranking {
                println!("{}", key.render(config.rendering));
            }
            println!("Detected latest version: {}", selection.latest);
            print_release_date(&selection);
        }
    }

    Ok(())
}

fn print_release_date(selection: &Selection) {
    if let Some(date) = selection.release_date {
        println!("Release date: {}", date.format("%B %-d, %Y"));
    }
}
