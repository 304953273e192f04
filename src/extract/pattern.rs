//! Version pattern matching over flattened page text
//!
//! Two modes are supported:
//! - Context-free: any `NN.NN[.NN]` token anywhere in the text
//! - Anchored: only tokens directly preceded by a phrase such as `HPE OneView`
//!
//! Either mode can be narrowed with a major-version allowlist, which drops
//! page numbers, years and section numbers that happen to look like versions.

use std::collections::BTreeSet;

use regex::Regex;
use serde::Deserialize;

use crate::config::SourceConfig;
use crate::version::error::ConfigError;
use crate::version::key::VersionKey;

/// 1-2 digit groups: `11.01`, `10.2`, `8.60.02`
pub const VERSION_SHAPE: &str = r"\d{1,2}\.\d{1,2}(?:\.\d{1,2})?";

const VERSION_GROUP: &str = "version";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MatchMode {
    #[default]
    ContextFree,
    Anchored,
}

/// Compiled matching rule for one source
#[derive(Debug, Clone)]
pub struct MatchRule {
    regex: Regex,
    major_allowlist: Option<BTreeSet<u32>>,
}

impl MatchRule {
    /// Build a rule from its configuration.
    ///
    /// A custom `pattern` only describes the version shape; the anchor and the
    /// word boundaries are added around it.
    pub fn compile(source: &SourceConfig) -> Result<Self, ConfigError> {
        let shape = source.pattern.as_deref().unwrap_or(VERSION_SHAPE);

        let expression = match source.mode {
            MatchMode::ContextFree => {
                format!(r"\b(?P<{VERSION_GROUP}>(?:{shape}))\b")
            }
            MatchMode::Anchored => {
                let anchor = source
                    .anchor
                    .as_deref()
                    .map(anchor_expression)
                    .filter(|a| !a.is_empty())
                    .ok_or_else(|| {
                        ConfigError::Invalid(format!(
                            "anchored source {} has no anchor phrase",
                            source.url
                        ))
                    })?;
                format!(r"(?i:{anchor})\s+(?P<{VERSION_GROUP}>(?:{shape}))\b")
            }
        };

        if matches!(&source.major_allowlist, Some(list) if list.is_empty()) {
            return Err(ConfigError::Invalid(format!(
                "source {} has an empty major allowlist",
                source.url
            )));
        }

        Ok(Self {
            regex: Regex::new(&expression)?,
            major_allowlist: source
                .major_allowlist
                .as_ref()
                .map(|list| list.iter().copied().collect()),
        })
    }

    /// Context-free rule with the default shape
    pub fn context_free() -> Self {
        Self {
            regex: Regex::new(&format!(r"\b(?P<{VERSION_GROUP}>(?:{VERSION_SHAPE}))\b"))
                .expect("built-in version pattern is valid"),
            major_allowlist: None,
        }
    }

    /// All distinct version tokens accepted by this rule
    pub fn find_versions(&self, text: &str) -> BTreeSet<String> {
        self.regex
            .captures_iter(text)
            .filter_map(|caps| caps.name(VERSION_GROUP))
            .map(|m| m.as_str())
            .filter(|version| self.major_allowed(version))
            .map(str::to_string)
            .collect()
    }

    fn major_allowed(&self, version: &str) -> bool {
        let Some(allowlist) = &self.major_allowlist else {
            return true;
        };
        version
            .parse::<VersionKey>()
            .is_ok_and(|key| allowlist.contains(&key.major()))
    }
}

/// Escape the anchor literally, but let any run of whitespace match any other
fn anchor_expression(anchor: &str) -> String {
    anchor
        .split_whitespace()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s+")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn versions(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn anchored(anchor: &str, allowlist: Option<Vec<u32>>) -> MatchRule {
        MatchRule::compile(&SourceConfig {
            mode: MatchMode::Anchored,
            anchor: Some(anchor.to_string()),
            major_allowlist: allowlist,
            ..SourceConfig::context_free("https://example.com")
        })
        .unwrap()
    }

    #[rstest]
    #[case("Release Notes 11.01, Support Matrix 10.90", &["10.90", "11.01"])]
    #[case("Composer2 Version 11.01.00 available", &["11.01.00"])]
    #[case("firmware 8.60.02 and 8.60.02 again", &["8.60.02"])]
    #[case("build 123.45 and v2024.1", &[])]
    #[case("no digits here", &[])]
    fn context_free_finds_version_shapes(#[case] text: &str, #[case] expected: &[&str]) {
        assert_eq!(MatchRule::context_free().find_versions(text), versions(expected));
    }

    #[test]
    fn anchored_ignores_unrelated_numbers() {
        let rule = anchored("HPE OneView", None);
        let found = rule.find_versions("HPE OneView 11.01 release notes, page 42");
        assert_eq!(found, versions(&["11.01"]));
    }

    #[test]
    fn anchored_is_case_insensitive_and_whitespace_tolerant() {
        let rule = anchored("HPE OneView", None);
        let found = rule.find_versions("hpe  oneview\n10.90 and HPE OneView 9.30");
        assert_eq!(found, versions(&["10.90", "9.30"]));
    }

    #[test]
    fn anchored_requires_phrase_directly_before_version() {
        let rule = anchored("OneView", None);
        let found = rule.find_versions("OneView release 11.01");
        assert!(found.is_empty());
    }

    #[test]
    fn anchor_with_regex_metacharacters_is_literal() {
        let rule = anchored("OneView (Synergy)", None);
        assert_eq!(
            rule.find_versions("OneView (Synergy) 10.20 / OneView Synergy 9.99"),
            versions(&["10.20"])
        );
    }

    #[test]
    fn allowlist_drops_other_majors() {
        let rule = MatchRule::compile(&SourceConfig {
            major_allowlist: Some((6..=11).collect()),
            ..SourceConfig::context_free("https://example.com")
        })
        .unwrap();

        let found = rule.find_versions("Section 99.12 covers OneView 11.01");
        assert_eq!(found, versions(&["11.01"]));
    }

    #[test]
    fn custom_pattern_replaces_shape() {
        let rule = MatchRule::compile(&SourceConfig {
            pattern: Some(r"\d{1,2}\.\d{2}".to_string()),
            ..SourceConfig::context_free("https://example.com")
        })
        .unwrap();

        assert_eq!(rule.find_versions("11.01 and 10.2"), versions(&["11.01"]));
    }

    #[test]
    fn compile_rejects_anchored_without_anchor() {
        let result = MatchRule::compile(&SourceConfig {
            mode: MatchMode::Anchored,
            anchor: Some("   ".to_string()),
            ..SourceConfig::context_free("https://example.com")
        });
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn compile_rejects_invalid_pattern() {
        let result = MatchRule::compile(&SourceConfig {
            pattern: Some(r"\d{1,2".to_string()),
            ..SourceConfig::context_free("https://example.com")
        });
        assert!(matches!(result, Err(ConfigError::Pattern(_))));
    }

    #[test]
    fn compile_rejects_empty_allowlist() {
        let result = MatchRule::compile(&SourceConfig {
            major_allowlist: Some(vec![]),
            ..SourceConfig::context_free("https://example.com")
        });
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }
}
