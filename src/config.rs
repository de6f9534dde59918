use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use shorts_core::{ClassifierKind, KeywordClassifier};
use std::path::{Path, PathBuf};

/// Configuration for the K-pop shorts toolkit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Input and output file locations
    pub paths: PathsConfig,

    /// Challenge classification settings
    pub classifier: ClassifierConfig,

    /// YouTube Data API settings
    pub youtube: YouTubeConfig,

    /// Wikipedia fetch settings
    pub wiki: WikiConfig,
}

/// Data files. Relative file names are resolved against `data_dir`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PathsConfig {
    /// Base directory for every data file below
    pub data_dir: PathBuf,

    /// Idol roster CSV
    pub roster: PathBuf,

    /// Group CSV with korean names and channel ids
    pub groups: PathBuf,

    /// Dataset written by the shorts fetcher
    pub raw_dataset: PathBuf,

    /// Dataset with title hashtags merged, input of the split
    pub dataset: PathBuf,

    /// Challenge partition output
    pub challenge_output: PathBuf,

    /// Non-challenge partition output
    pub non_challenge_output: PathBuf,

    /// Directory for wiki intros and raw HTML dumps
    pub wiki_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Strategy used by `split`
    pub strategy: ClassifierKind,

    /// Keyword for the keyword strategy
    pub keyword: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct YouTubeConfig {
    /// API key (also read from YOUTUBE_API_KEY)
    pub api_key: Option<String>,

    /// API base URL
    pub api_base: String,

    /// Shorts published before this date are ignored
    pub min_upload_date: NaiveDate,

    /// Results per playlist page (1-50)
    pub page_size: u32,

    /// Pause after each video-details page and each channel search, in milliseconds
    pub request_delay_ms: u64,

    /// HTTP timeout in seconds
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WikiConfig {
    /// Article base URL, the page title is appended
    pub base_url: String,

    /// Pause between groups in milliseconds
    pub request_delay_ms: u64,

    /// HTTP timeout in seconds
    pub timeout_seconds: u64,

    /// Dump the fetched HTML next to the intro file
    pub save_raw_html: bool,

    /// Name of the intro JSON file inside `paths.wiki_dir`
    pub info_file: String,
}

impl PathsConfig {
    pub fn resolve(&self, file: &Path) -> PathBuf {
        self.data_dir.join(file)
    }

    pub fn roster_path(&self) -> PathBuf {
        self.resolve(&self.roster)
    }

    pub fn groups_path(&self) -> PathBuf {
        self.resolve(&self.groups)
    }

    pub fn raw_dataset_path(&self) -> PathBuf {
        self.resolve(&self.raw_dataset)
    }

    pub fn dataset_path(&self) -> PathBuf {
        self.resolve(&self.dataset)
    }

    pub fn challenge_path(&self) -> PathBuf {
        self.resolve(&self.challenge_output)
    }

    pub fn non_challenge_path(&self) -> PathBuf {
        self.resolve(&self.non_challenge_output)
    }

    pub fn wiki_path(&self) -> PathBuf {
        self.resolve(&self.wiki_dir)
    }
}

impl Config {
    /// Default search locations, in order
    pub const SEARCH_PATHS: [&'static str; 2] = ["kpop-shorts.toml", "config/kpop-shorts.toml"];

    /// Load configuration from the first readable search path, falling back
    /// to defaults. Environment overrides are applied either way.
    pub fn load() -> Result<Self> {
        for path in &Self::SEARCH_PATHS {
            if let Ok(config_str) = std::fs::read_to_string(path) {
                match toml::from_str::<Config>(&config_str) {
                    Ok(mut config) => {
                        tracing::info!("📄 Loaded configuration from: {}", path);
                        config.apply_env();
                        return Ok(config);
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse config file {}: {}", path, e);
                    }
                }
            }
        }

        Self::from_env()
    }

    /// Load configuration from an explicit file. Missing or invalid files are errors.
    pub fn load_from(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read config file {}", path.display()))?;
        let mut config: Config = toml::from_str(&config_str)
            .with_context(|| format!("Cannot parse config file {}", path.display()))?;

        tracing::info!("📄 Loaded configuration from: {}", path.display());
        config.apply_env();
        Ok(config)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env();
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(api_key) = std::env::var("YOUTUBE_API_KEY") {
            if !api_key.trim().is_empty() {
                self.youtube.api_key = Some(api_key);
            }
        }

        if let Ok(data_dir) = std::env::var("KPOP_SHORTS_DATA_DIR") {
            self.paths.data_dir = PathBuf::from(data_dir);
        }

        if let Ok(strategy) = std::env::var("KPOP_SHORTS_STRATEGY") {
            match strategy.parse() {
                Ok(kind) => self.classifier.strategy = kind,
                Err(e) => tracing::warn!("Ignoring KPOP_SHORTS_STRATEGY: {}", e),
            }
        }

        if let Ok(keyword) = std::env::var("KPOP_SHORTS_KEYWORD") {
            self.classifier.keyword = keyword;
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let config_str = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, config_str)?;
        tracing::info!("💾 Configuration saved to: {}", path.display());
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.classifier.keyword.trim().is_empty() {
            return Err(anyhow!("classifier.keyword must not be empty"));
        }

        if !(1..=50).contains(&self.youtube.page_size) {
            return Err(anyhow!("youtube.page_size must be between 1 and 50"));
        }

        if self.youtube.timeout_seconds == 0 || self.wiki.timeout_seconds == 0 {
            return Err(anyhow!("HTTP timeouts must be greater than 0"));
        }

        if self.wiki.info_file.trim().is_empty() {
            return Err(anyhow!("wiki.info_file must not be empty"));
        }

        tracing::debug!("✅ Configuration validation passed");
        Ok(())
    }

    /// API key for commands that call the YouTube Data API
    pub fn require_api_key(&self) -> Result<&str> {
        self.youtube
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| anyhow!("YouTube API key missing: set YOUTUBE_API_KEY or youtube.api_key"))
    }

    /// Get runtime configuration summary
    pub fn summary(&self) -> String {
        format!(
            "K-pop Shorts Configuration:\n\
            - Data Directory: {}\n\
            - Roster: {}\n\
            - Dataset: {}\n\
            - Strategy: {}\n\
            - Keyword: {}\n\
            - Min Upload Date: {}\n\
            - API Key Set: {}",
            self.paths.data_dir.display(),
            self.paths.roster_path().display(),
            self.paths.dataset_path().display(),
            self.classifier.strategy,
            self.classifier.keyword,
            self.youtube.min_upload_date,
            self.youtube.api_key.is_some()
        )
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            roster: PathBuf::from("kpop-idol.csv"),
            groups: PathBuf::from("kpop-group.csv"),
            raw_dataset: PathBuf::from("kpop_shorts_data.json"),
            dataset: PathBuf::from("kpop_shorts_data_hashtag_processed.json"),
            challenge_output: PathBuf::from("kpop-challenge-shorts.json"),
            non_challenge_output: PathBuf::from("kpop-non-challenge-shorts.json"),
            wiki_dir: PathBuf::from("wikipedia_data"),
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            strategy: ClassifierKind::default(),
            keyword: KeywordClassifier::DEFAULT_KEYWORD.to_string(),
        }
    }
}

impl Default for YouTubeConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: "https://www.googleapis.com/youtube/v3".to_string(),
            min_upload_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or(NaiveDate::MIN),
            page_size: 50,
            request_delay_ms: 500,
            timeout_seconds: 30,
        }
    }
}

impl Default for WikiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://en.wikipedia.org/wiki/".to_string(),
            request_delay_ms: 1000,
            timeout_seconds: 30,
            save_raw_html: true,
            info_file: "kpop_group_info.json".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            paths: PathsConfig::default(),
            classifier: ClassifierConfig::default(),
            youtube: YouTubeConfig::default(),
            wiki: WikiConfig::default(),
        }
    }
}

/// Configuration builder for programmatic config creation
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_data_dir(mut self, dir: PathBuf) -> Self {
        self.config.paths.data_dir = dir;
        self
    }

    pub fn with_strategy(mut self, strategy: ClassifierKind) -> Self {
        self.config.classifier.strategy = strategy;
        self
    }

    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.config.classifier.keyword = keyword.into();
        self
    }

    pub fn with_api_key(mut self, api_key: String) -> Self {
        self.config.youtube.api_key = Some(api_key);
        self
    }

    pub fn with_min_upload_date(mut self, date: NaiveDate) -> Self {
        self.config.youtube.min_upload_date = date;
        self
    }

    pub fn without_delays(mut self) -> Self {
        self.config.youtube.request_delay_ms = 0;
        self.config.wiki.request_delay_ms = 0;
        self
    }

    pub fn save_raw_html(mut self, enable: bool) -> Self {
        self.config.wiki.save_raw_html = enable;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_paths_resolve_under_data_dir() {
        let config = Config::default();
        assert_eq!(
            config.paths.dataset_path(),
            PathBuf::from("./data/kpop_shorts_data_hashtag_processed.json")
        );
        assert_eq!(config.paths.wiki_path(), PathBuf::from("./data/wikipedia_data"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_absolute_file_ignores_data_dir() {
        let mut paths = PathsConfig::default();
        paths.roster = PathBuf::from("/tmp/roster.csv");
        assert_eq!(paths.roster_path(), PathBuf::from("/tmp/roster.csv"));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("conf").join("kpop-shorts.toml");

        let config = ConfigBuilder::new()
            .with_strategy(ClassifierKind::Keyword)
            .with_keyword("dance")
            .with_min_upload_date(NaiveDate::from_ymd_opt(2023, 6, 1).unwrap())
            .build();
        config.save(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.classifier, config.classifier);
        assert_eq!(loaded.youtube.min_upload_date, config.youtube.min_upload_date);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: Config = toml::from_str("[classifier]\nstrategy = \"global\"\n").unwrap();
        assert_eq!(config.classifier.strategy, ClassifierKind::Global);
        assert_eq!(config.classifier.keyword, "challenge");
        assert_eq!(config.youtube.page_size, 50);
    }

    #[test]
    fn test_load_from_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        assert!(Config::load_from(&dir.path().join("absent.toml")).is_err());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.youtube.page_size = 0;
        assert!(config.validate().is_err());

        let config = ConfigBuilder::new().with_keyword("  ").build();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_require_api_key() {
        let mut config = Config::default();
        config.youtube.api_key = None;
        assert!(config.require_api_key().is_err());

        let config = ConfigBuilder::new().with_api_key("key".to_string()).build();
        assert_eq!(config.require_api_key().unwrap(), "key");
    }
}
