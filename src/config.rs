use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::panel::{PanelEntry, PanelRegistry};
use crate::transcript::{Cadence, DEFAULT_CADENCE};

/// Configuration for the transcript tool
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// User-editable transcript settings
    pub transcript: TranscriptSettings,

    /// Caption source settings
    pub source: SourceConfig,

    /// Output and logging settings
    pub output: OutputConfig,

    /// URLs shown by open transcript panels
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub panels: Vec<PanelEntry>,
}

/// The three user-facing settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TranscriptSettings {
    /// Fragments per timestamp
    pub timestamp_mod: u32,

    /// Caption language code
    pub lang: String,

    /// Country code sent with caption requests
    pub country: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// HTTP request timeout in seconds
    pub request_timeout_seconds: u64,

    /// User agent for page and caption requests
    pub user_agent: String,

    /// Site root for watch pages
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Log level
    pub log_level: String,

    /// How `blocks` prints when `--json` is not given
    pub default_format: OutputFormat,
}

/// Printed form of grouped blocks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// `[label](jump url) quote` lines
    #[default]
    Text,
    /// Pretty JSON array of block views
    Json,
}

/// A loaded configuration and where it came from
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,
    /// File the configuration was read from; `None` when built from the environment
    pub path: Option<PathBuf>,
    /// Files that existed but could not be parsed, with the parse error
    pub skipped: Vec<(PathBuf, String)>,
}

impl LoadedConfig {
    /// File that edits should be written back to
    pub fn save_path(&self) -> PathBuf {
        self.path.clone().unwrap_or_else(Config::default_path)
    }
}

impl Default for TranscriptSettings {
    fn default() -> Self {
        Self {
            timestamp_mod: DEFAULT_CADENCE,
            lang: "en".to_string(),
            country: "EN".to_string(),
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            request_timeout_seconds: 30,
            user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            base_url: "https://www.youtube.com".to_string(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            default_format: OutputFormat::default(),
        }
    }
}

impl TranscriptSettings {
    /// Validated cadence, falling back to the default for a stored zero
    pub fn cadence(&self) -> Cadence {
        Cadence::new(self.timestamp_mod as i64).unwrap_or_else(|_| {
            warn!("Stored timestampMod {} is invalid, using {}", self.timestamp_mod, DEFAULT_CADENCE);
            Cadence::default()
        })
    }

    /// Read a setting by its key
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "timestampMod" => Some(self.timestamp_mod.to_string()),
            "lang" => Some(self.lang.clone()),
            "country" => Some(self.country.clone()),
            _ => None,
        }
    }

    /// Update a setting from user input.
    ///
    /// Cadence input that is not a positive integer falls back to the default.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let value = value.trim();
        match key {
            "timestampMod" => {
                self.timestamp_mod = match value.parse::<i64>().map(Cadence::new) {
                    Ok(Ok(cadence)) => u32::from(cadence),
                    _ => {
                        warn!("Invalid timestampMod '{}', falling back to {}", value, DEFAULT_CADENCE);
                        DEFAULT_CADENCE
                    }
                };
            }
            "lang" => self.lang = value.to_string(),
            "country" => self.country = value.to_string(),
            other => return Err(anyhow!("Unknown setting: {}", other)),
        }
        Ok(())
    }
}

impl Config {
    /// Load configuration from the first readable config file
    pub fn load() -> Result<Self> {
        Ok(Self::locate(&Self::search_paths())?.config)
    }

    /// Load from the first of `paths` that parses, remembering which file was used.
    ///
    /// Does not log: callers may run this before a subscriber is installed.
    pub fn locate(paths: &[PathBuf]) -> Result<LoadedConfig> {
        let mut skipped = Vec::new();

        for path in paths {
            let Ok(config_str) = std::fs::read_to_string(path) else {
                continue;
            };
            match toml::from_str(&config_str) {
                Ok(config) => {
                    return Ok(LoadedConfig {
                        config,
                        path: Some(path.clone()),
                        skipped,
                    })
                }
                Err(e) => skipped.push((path.clone(), e.to_string())),
            }
        }

        Ok(LoadedConfig {
            config: Self::from_env()?,
            path: None,
            skipped,
        })
    }

    /// Load configuration from a specific file
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let config_str = std::fs::read_to_string(path)
            .map_err(|e| anyhow!("Cannot read config {}: {}", path.display(), e))?;
        Ok(toml::from_str(&config_str)?)
    }

    /// Load a specific file, starting from defaults when it does not exist yet
    pub fn load_from_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(config_str) => Ok(toml::from_str(&config_str)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(anyhow!("Cannot read config {}: {}", path.display(), e)),
        }
    }

    /// Locations searched by `load`, in order
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from("ytranscript.toml"),
            PathBuf::from("config/ytranscript.toml"),
        ];
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("ytranscript").join("config.toml"));
        }
        paths
    }

    /// Default user config file location
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .map(|dir| dir.join("ytranscript").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("ytranscript.toml"))
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(cadence) = std::env::var("YTRANSCRIPT_TIMESTAMP_MOD") {
            config.transcript.set("timestampMod", &cadence)?;
        }

        if let Ok(lang) = std::env::var("YTRANSCRIPT_LANG") {
            config.transcript.lang = lang;
        }

        if let Ok(country) = std::env::var("YTRANSCRIPT_COUNTRY") {
            config.transcript.country = country;
        }

        if let Ok(log_level) = std::env::var("YTRANSCRIPT_LOG_LEVEL") {
            config.output.log_level = log_level;
        }

        Ok(config)
    }

    /// Save configuration to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let config_str = toml::to_string_pretty(self)?;
        std::fs::write(path, config_str)?;
        info!("💾 Configuration saved to: {}", path.display());
        Ok(())
    }

    /// Registry restored from the persisted panel entries
    pub fn panel_registry(&self) -> PanelRegistry {
        PanelRegistry::from_entries(self.panels.clone())
    }

    /// Persist the registry's open panels
    pub fn store_panels(&mut self, registry: &PanelRegistry) {
        self.panels = registry.entries().to_vec();
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.transcript.timestamp_mod == 0 {
            return Err(anyhow!("timestampMod must be greater than 0"));
        }

        if self.transcript.lang.trim().is_empty() {
            return Err(anyhow!("lang must not be empty"));
        }

        if self.transcript.country.trim().is_empty() {
            return Err(anyhow!("country must not be empty"));
        }

        if self.source.request_timeout_seconds == 0 {
            return Err(anyhow!("request_timeout_seconds must be greater than 0"));
        }

        Ok(())
    }

    /// Get runtime configuration summary
    pub fn summary(&self) -> String {
        format!(
            "Transcript Configuration:\n\
            - Timestamp every: {} lines\n\
            - Language: {}\n\
            - Country: {}\n\
            - Source: {} (timeout {}s)\n\
            - Block output: {:?}\n\
            - Open panels: {}",
            self.transcript.timestamp_mod,
            self.transcript.lang,
            self.transcript.country,
            self.source.base_url,
            self.source.request_timeout_seconds,
            self.output.default_format,
            self.panels.len()
        )
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

    pub fn with_cadence(mut self, cadence: Cadence) -> Self {
        self.config.transcript.timestamp_mod = cadence.into();
        self
    }

    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.config.transcript.lang = lang.into();
        self
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.config.transcript.country = country.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.source.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.config.source.request_timeout_seconds = seconds;
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
