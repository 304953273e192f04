use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info};

use crate::extract::pattern::{MatchMode, MatchRule};
use crate::version::error::ConfigError;
use crate::version::key::RenderStyle;

// =============================================================================
// Fetch-related constants
// =============================================================================

/// Per-request timeout in milliseconds (hpe.com is slow to answer)
pub const REQUEST_TIMEOUT_MS: u64 = 45_000;

/// Maximum number of retries for a single request
pub const MAX_RETRIES: u32 = 6;

/// Base of the exponential backoff in milliseconds (1.5s, 3s, 6s, ...)
pub const BACKOFF_FACTOR_MS: u64 = 1_500;

/// Upper bound for a single backoff wait in milliseconds
pub const MAX_BACKOFF_MS: u64 = 120_000;

/// Statuses that are retried before giving up on a source
pub const RETRY_ON_STATUS: &[u16] = &[429, 500, 502, 503, 504];

/// Pause after a failed source before moving to the next one
pub const FAILURE_DELAY_MS: u64 = 1_000;

// =============================================================================
// Output defaults
// =============================================================================

pub const DEFAULT_STATE_FILE: &str = "latest_oneview.txt";
pub const DEFAULT_FEED_FILE: &str = "oneview.xml";

const APP_DIR: &str = "oneview-watch";

/// PSNow OneView documentation quick links (lists every 11.x document)
const PSNOW_DOCS_URL: &str =
    "https://www.hpe.com/psnow/resources/ebooks/a00113372en_us_v9/s_syn_doc-sm_rn.html";

/// HPE Synergy "What's New"
const SYNERGY_WHATS_NEW_URL: &str =
    "https://support.hpe.com/docs/display/public/synergy-sw-release/Whats_New.html";

/// HPE Synergy Composer2 release page
const COMPOSER2_RELEASE_URL: &str = "https://support.hpe.com/connect/s/softwaredetails?language=en_US&softwareId=MTX_b19804771921492fb5e98cda72&tab=releaseNotes";

/// Top-level configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct WatchConfig {
    pub sources: Vec<SourceConfig>,
    pub fetch: FetchConfig,
    pub state: StateConfig,
    pub feed: FeedConfig,
    pub rendering: RenderStyle,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            sources: vec![
                SourceConfig::context_free(PSNOW_DOCS_URL),
                SourceConfig::context_free(SYNERGY_WHATS_NEW_URL),
                SourceConfig::context_free(COMPOSER2_RELEASE_URL),
            ],
            fetch: FetchConfig::default(),
            state: StateConfig::default(),
            feed: FeedConfig::default(),
            rendering: RenderStyle::default(),
        }
    }
}

/// One page to poll and the rule used to pull versions out of it
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SourceConfig {
    pub url: String,
    #[serde(default)]
    pub mode: MatchMode,
    /// Overrides the version-shape regex
    #[serde(default)]
    pub pattern: Option<String>,
    /// Literal phrase that must precede the version in `anchored` mode
    #[serde(default)]
    pub anchor: Option<String>,
    #[serde(default)]
    pub major_allowlist: Option<Vec<u32>>,
}

impl SourceConfig {
    pub fn context_free(url: &str) -> Self {
        Self {
            url: url.to_string(),
            mode: MatchMode::ContextFree,
            pattern: None,
            anchor: None,
            major_allowlist: None,
        }
    }
}

/// HTTP behaviour
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct FetchConfig {
    pub timeout_ms: u64,
    pub max_retries: u32,
    pub backoff_factor_ms: u64,
    pub max_backoff_ms: u64,
    pub retry_on_status: Vec<u16>,
    pub respect_retry_after: bool,
    pub failure_delay_ms: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_ms: REQUEST_TIMEOUT_MS,
            max_retries: MAX_RETRIES,
            backoff_factor_ms: BACKOFF_FACTOR_MS,
            max_backoff_ms: MAX_BACKOFF_MS,
            retry_on_status: RETRY_ON_STATUS.to_vec(),
            respect_retry_after: true,
            failure_delay_ms: FAILURE_DELAY_MS,
        }
    }
}

/// Text-mode output
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct StateConfig {
    pub path: PathBuf,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_STATE_FILE),
        }
    }
}

/// Feed-mode output and channel metadata
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct FeedConfig {
    pub path: PathBuf,
    pub title: String,
    pub link: String,
    pub description: String,
    /// Product name used in item titles and descriptions
    pub product: String,
    /// Prefix of the item guid (`<prefix>-<version>`)
    pub guid_prefix: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_FEED_FILE),
            title: "HPE OneView Latest Version".to_string(),
            link: "https://www.hpe.com".to_string(),
            description: "Daily feed of the newest HPE OneView release.".to_string(),
            product: "HPE OneView".to_string(),
            guid_prefix: "oneview".to_string(),
        }
    }
}

impl WatchConfig {
    /// Read a JSON configuration file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        info!("Loading configuration from {:?}", path);
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve the configuration to use for this run.
    ///
    /// An explicit path must exist. Otherwise the user config file is used
    /// when present, falling back to the built-in HPE sources.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let default_path = config_path();
        if default_path.is_file() {
            return Self::load(&default_path);
        }

        debug!("No config file at {:?}, using built-in sources", default_path);
        Ok(Self::default())
    }

    /// Compile every source into a match rule, failing on the first bad one
    pub fn rules(&self) -> Result<Vec<(String, MatchRule)>, ConfigError> {
        self.sources
            .iter()
            .map(|source| Ok((source.url.clone(), MatchRule::compile(source)?)))
            .collect()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.sources.is_empty() {
            return Err(ConfigError::Invalid("no sources configured".to_string()));
        }
        self.rules().map(|_| ())
    }
}

/// Returns the path to the configuration file.
/// Uses $XDG_CONFIG_HOME/oneview-watch/config.json if XDG_CONFIG_HOME is set,
/// otherwise falls back to ~/.config/oneview-watch/config.json.
pub fn config_path() -> PathBuf {
    base_dir_with_env(
        std::env::var("XDG_CONFIG_HOME").ok(),
        dirs::home_dir(),
        ".config",
    )
    .join("config.json")
}

/// Returns the path to the data directory, used for log files.
pub fn data_dir() -> PathBuf {
    base_dir_with_env(
        std::env::var("XDG_DATA_HOME").ok(),
        dirs::home_dir(),
        ".local/share",
    )
}

/// Returns the default path of the log file.
pub fn log_path() -> PathBuf {
    data_dir().join("oneview-watch.log")
}

fn base_dir_with_env(
    xdg_home: Option<String>,
    home_dir: Option<PathBuf>,
    home_relative: &str,
) -> PathBuf {
    let base = xdg_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(home_relative)))
        .unwrap_or_else(|| PathBuf::from("."));

    base.join(APP_DIR)
}
