//! One run: fetch every source, extract, select, then report
//!
//! Sources are consulted sequentially. A failing source is recorded and
//! skipped after a short pause; only an empty aggregate aborts the run.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::sleep;
use tracing::{info, warn};

use crate::config::WatchConfig;
use crate::extract::{DateMatcher, MatchRule, extract, html_to_text};
use crate::output::{FeedItem, write_feed};
use crate::source::PageFetcher;
use crate::version::detector::{ChangeSignal, StateStore, detect_change};
use crate::version::error::{SelectError, WatchError};
use crate::version::key::RenderStyle;
use crate::version::selector::{
    Selection, SourceOutcome, SourceReport, select_from_reports,
};

/// Fetch and extract every source, in order
pub async fn collect_reports<F: PageFetcher + ?Sized>(
    fetcher: &F,
    rules: &[(String, MatchRule)],
    failure_delay: Duration,
) -> Vec<SourceReport> {
    let dates = DateMatcher::new();
    let mut reports = Vec::with_capacity(rules.len());

    for (url, rule) in rules {
        let outcome = match fetcher.fetch_page(url).await {
            Ok(html) => {
                let text = html_to_text(&html);
                let result = extract(&text, rule, &dates);
                if result.is_empty() {
                    info!("No versions found at {}", url);
                    SourceOutcome::Empty
                } else {
                    info!("Found {} versions at {}", result.versions.len(), url);
                    SourceOutcome::Matched(result)
                }
            }
            Err(e) => {
                warn!("Failed to fetch {}: {}", url, e);
                sleep(failure_delay).await;
                SourceOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        };
        reports.push(SourceReport::new(url, outcome));
    }

    reports
}

/// Latest version across all configured sources
pub async fn detect_latest<F: PageFetcher + ?Sized>(
    fetcher: &F,
    config: &WatchConfig,
) -> Result<Selection, WatchError> {
    let rules = config.rules()?;
    let failure_delay = Duration::from_millis(config.fetch.failure_delay_ms);

    let reports = collect_reports(fetcher, &rules, failure_delay).await;
    let selection = select_from_reports(&reports, config.rendering)?;

    info!(
        "Latest version {} (release date {:?})",
        selection.latest, selection.release_date
    );
    Ok(selection)
}

/// Text mode: select, then record the version if it changed
pub async fn run_check<F, S>(
    fetcher: &F,
    config: &WatchConfig,
    store: &S,
) -> Result<(Selection, ChangeSignal), WatchError>
where
    F: PageFetcher + ?Sized,
    S: StateStore + ?Sized,
{
    let selection = detect_latest(fetcher, config).await?;
    let signal = detect_change(store, &selection.latest)?;
    Ok((selection, signal))
}

/// Feed mode: select, then regenerate the feed document
pub async fn run_feed<F: PageFetcher + ?Sized>(
    fetcher: &F,
    config: &WatchConfig,
    now: DateTime<Utc>,
) -> Result<Selection, WatchError> {
    let selection = detect_latest(fetcher, config).await?;
    let item = FeedItem {
        version: selection.latest.clone(),
        release_date: selection.release_date,
    };
    write_feed(&config.feed.path, &config.feed, &item, now)?;
    Ok(selection)
}

/// Run one rule over local content, bypassing the network
pub fn extract_local(
    content: &str,
    is_html: bool,
    rule: &MatchRule,
    style: RenderStyle,
) -> Result<Selection, SelectError> {
    let text = if is_html {
        html_to_text(content)
    } else {
        content.to_string()
    };
    let result = extract(&text, rule, &DateMatcher::new());
    let report = SourceReport::new("local", SourceOutcome::Matched(result));
    select_from_reports(&[report], style)
}
