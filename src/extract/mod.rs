//! Extraction layer
//! - html.rs: HTML to visible text
//! - pattern.rs: version matching rules (context-free / anchored / allowlist)
//! - date.rs: release date detection

pub mod date;
pub mod html;
pub mod pattern;

use std::collections::BTreeSet;

use chrono::NaiveDate;

pub use date::DateMatcher;
pub use html::html_to_text;
pub use pattern::{MatchMode, MatchRule};

/// Versions and release date found in one corpus
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionResult {
    pub versions: BTreeSet<String>,
    /// First date on the page; not tied to any particular version
    pub release_date: Option<NaiveDate>,
}

impl ExtractionResult {
    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }
}

/// Run a rule and the date matcher over already flattened text
pub fn extract(text: &str, rule: &MatchRule, dates: &DateMatcher) -> ExtractionResult {
    ExtractionResult {
        versions: rule.find_versions(text),
        release_date: dates.first_date(text),
    }
}
