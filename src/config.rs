//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.prisma.toml` files.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE: &str = ".prisma.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Follower attribution settings.
    #[serde(default)]
    pub attribution: AttributionConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,

    /// Model settings.
    #[serde(default)]
    pub model: ModelConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Directory holding scraped/classified JSONL files and analytics exports.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Directory reports are written to.
    #[serde(default = "default_reports_dir")]
    pub reports_dir: PathBuf,

    /// Creator name; inferred from the analytics file name when unset.
    #[serde(default)]
    pub author: Option<String>,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            reports_dir: default_reports_dir(),
            author: None,
            verbose: false,
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_reports_dir() -> PathBuf {
    PathBuf::from("reports")
}

/// Follower attribution settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributionConfig {
    /// Days after the publish date credited to a post (window is inclusive).
    #[serde(default = "default_window_days")]
    pub window_days: u32,
}

impl Default for AttributionConfig {
    fn default() -> Self {
        Self {
            window_days: default_window_days(),
        }
    }
}

fn default_window_days() -> u32 {
    3
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Rows in the "Top Posts by Follower Gain" table.
    #[serde(default = "default_top_posts")]
    pub top_posts: usize,

    /// Rows in each of the top/bottom outlier tables.
    #[serde(default = "default_outliers")]
    pub outliers: usize,

    /// Render SVG charts next to the document.
    #[serde(default = "default_true")]
    pub charts: bool,

    /// Call the LLM for the winning formula section.
    #[serde(default = "default_true")]
    pub synthesis: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_posts: default_top_posts(),
            outliers: default_outliers(),
            charts: true,
            synthesis: true,
        }
    }
}

fn default_top_posts() -> usize {
    10
}

fn default_outliers() -> usize {
    3
}

fn default_true() -> bool {
    true
}

/// LLM model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Default model name.
    #[serde(default = "default_model")]
    pub name: String,

    /// Ollama API URL.
    #[serde(default = "default_ollama_url")]
    pub ollama_url: String,

    /// Temperature for generation.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Pause between classification calls, in milliseconds.
    #[serde(default = "default_rate_limit_delay")]
    pub rate_limit_delay_ms: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: default_model(),
            ollama_url: default_ollama_url(),
            temperature: default_temperature(),
            timeout_seconds: default_timeout(),
            rate_limit_delay_ms: default_rate_limit_delay(),
        }
    }
}

fn default_model() -> String {
    "llama3.2:latest".to_string()
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_temperature() -> f32 {
    0.3
}

fn default_timeout() -> u64 {
    300
}

fn default_rate_limit_delay() -> u64 {
    1500
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// when they were given explicitly.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref dir) = args.data_dir {
            self.general.data_dir = dir.clone();
        }
        if let Some(ref dir) = args.reports_dir {
            self.general.reports_dir = dir.clone();
        }
        if let Some(ref author) = args.author {
            self.general.author = Some(author.clone());
        }
        if args.verbose {
            self.general.verbose = true;
        }

        if let Some(ref model) = args.model {
            self.model.name = model.clone();
        }
        if let Some(ref url) = args.ollama_url {
            self.model.ollama_url = url.clone();
        }
        if let Some(timeout) = args.timeout {
            self.model.timeout_seconds = timeout;
        }
    }

    /// Log level after merging: `--quiet` wins, then `verbose` from either
    /// the file or the command line.
    pub fn log_level(&self, quiet: bool) -> tracing::Level {
        if quiet {
            tracing::Level::ERROR
        } else if self.general.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
