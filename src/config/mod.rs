use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::transcript::ReflowOptions;

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Upstream HTTP settings
    pub fetch: FetchConfig,

    /// Paragraph grouping
    pub formatting: FormattingConfig,

    /// Title, duration and chapter enrichment
    pub metadata: MetadataConfig,

    /// HTTP service settings
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// User agent sent with every upstream request
    pub user_agent: String,

    /// Accept-Language header; determines the language of track names
    pub accept_language: String,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FormattingConfig {
    /// Sentences after which a paragraph is closed
    pub sentences_per_paragraph: usize,

    /// Characters after which a paragraph is closed
    pub paragraph_char_budget: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataConfig {
    /// Fetch metadata unless a request opts out
    pub enabled: bool,

    /// yt-dlp executable used for metadata lookups
    pub yt_dlp_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,

    /// Upper bound for a whole transcript request
    pub request_timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept_language: "en-US".to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl Default for FormattingConfig {
    fn default() -> Self {
        let options = ReflowOptions::default();
        Self {
            sentences_per_paragraph: options.sentences_per_paragraph,
            paragraph_char_budget: options.paragraph_char_budget,
        }
    }
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            yt_dlp_path: "yt-dlp".to_string(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            request_timeout_secs: 60,
        }
    }
}

impl Config {
    /// Load configuration from file or create default
    ///
    /// An explicit path wins over the lookup order.
    pub async fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::config_path()?,
        };

        if config_path.exists() {
            let content = fs_err::read_to_string(&config_path)
                .context("Failed to read config file")?;

            let config: Config = serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse config file {}", config_path.display()))?;

            config.validate()?;
            tracing::debug!("Loaded configuration from {}", config_path.display());
            Ok(config)
        } else {
            let config = Self::default();
            config.save_to(&config_path).await?;
            tracing::info!("Wrote default configuration to {}", config_path.display());
            Ok(config)
        }
    }

    /// Save configuration to the given file
    pub async fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs_err::create_dir_all(parent)?;
            }
        }

        let content = serde_yaml::to_string(self)
            .context("Failed to serialize config")?;

        fs_err::write(config_path, content)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Get configuration file path
    pub fn config_path() -> Result<PathBuf> {
        // First try current directory for easy testing
        let local_config = PathBuf::from("config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?;

        Ok(config_dir.join("tubescribe").join("config.yaml"))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.fetch.user_agent.trim().is_empty() {
            anyhow::bail!("fetch.user_agent must not be empty");
        }

        if self.fetch.request_timeout_secs == 0 {
            anyhow::bail!("fetch.request_timeout_secs must be greater than zero");
        }

        if self.formatting.sentences_per_paragraph == 0 {
            anyhow::bail!("formatting.sentences_per_paragraph must be greater than zero");
        }

        if self.formatting.paragraph_char_budget == 0 {
            anyhow::bail!("formatting.paragraph_char_budget must be greater than zero");
        }

        if self.server.request_timeout_secs == 0 {
            anyhow::bail!("server.request_timeout_secs must be greater than zero");
        }

        Ok(())
    }

    /// Display current configuration
    pub fn display(&self) {
        println!("Current Configuration:");
        println!("  User Agent: {}", self.fetch.user_agent);
        println!("  Accept-Language: {}", self.fetch.accept_language);
        println!("  Request Timeout: {}s", self.fetch.request_timeout_secs);
        println!("  Sentences per Paragraph: {}", self.formatting.sentences_per_paragraph);
        println!("  Paragraph Character Budget: {}", self.formatting.paragraph_char_budget);
        println!("  Metadata: {}", if self.metadata.enabled { "enabled" } else { "disabled" });
        println!("  yt-dlp: {}", self.metadata.yt_dlp_path);
        println!("  Server: {}:{}", self.server.host, self.server.port);
        println!("  Server Timeout: {}s", self.server.request_timeout_secs);
    }

    /// Paragraph thresholds for reflow
    pub fn reflow_options(&self) -> ReflowOptions {
        ReflowOptions {
            sentences_per_paragraph: self.formatting.sentences_per_paragraph,
            paragraph_char_budget: self.formatting.paragraph_char_budget,
        }
    }
}
