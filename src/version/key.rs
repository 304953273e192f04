//! Canonical comparable form of a dotted version string

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// How a [`VersionKey`] is turned back into text.
///
/// Zero-padded variants (`11.01` and `11.1`) share one key, so the text that is
/// reported and stored is always re-rendered from the key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RenderStyle {
    /// Segments after the first are at least two digits wide: `11.01`, `8.60.02`
    #[default]
    Padded,
    /// Plain integers: `11.1`, `8.60.2`
    Plain,
}

/// Integer tuple compared lexicographically, most significant segment first
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VersionKey(Vec<u32>);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("not a dotted numeric version: {0:?}")]
pub struct ParseKeyError(String);

impl VersionKey {
    pub fn new(segments: Vec<u32>) -> Self {
        Self(segments)
    }

    pub fn segments(&self) -> &[u32] {
        &self.0
    }

    /// Leading segment, used for the major-version allowlist
    pub fn major(&self) -> u32 {
        self.0.first().copied().unwrap_or_default()
    }

    pub fn render(&self, style: RenderStyle) -> String {
        self.0
            .iter()
            .enumerate()
            .map(|(i, segment)| match style {
                RenderStyle::Padded if i > 0 => format!("{:02}", segment),
                _ => segment.to_string(),
            })
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl FromStr for VersionKey {
    type Err = ParseKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split('.')
            .map(|segment| {
                if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(ParseKeyError(s.to_string()));
                }
                segment.parse().map_err(|_| ParseKeyError(s.to_string()))
            })
            .collect::<Result<Vec<u32>, _>>()
            .map(Self)
    }
}

impl fmt::Display for VersionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(RenderStyle::Plain))
    }
}
