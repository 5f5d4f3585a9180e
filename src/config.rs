//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.culturemap.toml` files.

use crate::chart::{ChartFrame, PieFrame};
use crate::session::DEFAULT_SESSION_FILE;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name.
pub const CONFIG_FILE: &str = ".culturemap.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Chart geometry settings.
    #[serde(default)]
    pub charts: ChartsConfig,

    /// Region browser settings.
    #[serde(default)]
    pub regions: RegionsConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,

    /// Session settings.
    #[serde(default)]
    pub session: SessionConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Dataset path or URL.
    #[serde(default = "default_dataset")]
    pub dataset: String,

    /// Directory for charts and reports.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,

    /// HTTP timeout for remote datasets, in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            dataset: default_dataset(),
            output_dir: default_output_dir(),
            verbose: false,
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_dataset() -> String {
    "data/locais.json".to_string()
}

fn default_output_dir() -> String {
    "culturemap_output".to_string()
}

fn default_timeout() -> u64 {
    30
}

/// Chart geometry settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartsConfig {
    #[serde(default = "default_width")]
    pub width: f64,

    #[serde(default = "default_height")]
    pub height: f64,

    #[serde(default = "default_padding")]
    pub padding: f64,

    /// Pie viewbox size; the center sits at half of it.
    #[serde(default = "default_pie_viewbox")]
    pub pie_viewbox: f64,

    #[serde(default = "default_pie_radius")]
    pub pie_radius: f64,
}

impl Default for ChartsConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            padding: default_padding(),
            pie_viewbox: default_pie_viewbox(),
            pie_radius: default_pie_radius(),
        }
    }
}

fn default_width() -> f64 {
    600.0
}

fn default_height() -> f64 {
    350.0
}

fn default_padding() -> f64 {
    60.0
}

fn default_pie_viewbox() -> f64 {
    100.0
}

fn default_pie_radius() -> f64 {
    40.0
}

impl ChartsConfig {
    pub fn frame(&self) -> ChartFrame {
        ChartFrame {
            width: self.width,
            height: self.height,
            padding: self.padding,
        }
    }

    pub fn pie_frame(&self) -> PieFrame {
        PieFrame {
            center: self.pie_viewbox / 2.0,
            radius: self.pie_radius,
        }
    }
}

/// Region browser settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionsConfig {
    #[serde(default = "default_per_page")]
    pub per_page: usize,
}

impl Default for RegionsConfig {
    fn default() -> Self {
        Self {
            per_page: default_per_page(),
        }
    }
}

fn default_per_page() -> usize {
    crate::analysis::DEFAULT_PAGE_SIZE
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Number of places in the attendance ranking.
    #[serde(default = "default_top_places")]
    pub top_places: usize,

    /// Embed charts in HTML and list series in Markdown.
    #[serde(default = "default_true")]
    pub include_charts: bool,

    /// Refuse to generate reports without a signed-in session.
    #[serde(default = "default_true")]
    pub require_session: bool,

    /// Only administrators may generate reports.
    #[serde(default)]
    pub require_admin: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_places: default_top_places(),
            include_charts: true,
            require_session: true,
            require_admin: false,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_top_places() -> usize {
    10
}

/// Session file settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_session_path")]
    pub path: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            path: default_session_path(),
        }
    }
}

fn default_session_path() -> String {
    DEFAULT_SESSION_FILE.to_string()
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
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load `.culturemap.toml` from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence, but only when explicitly provided.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref data) = args.data {
            self.general.dataset = data.clone();
        }

        if let Some(timeout) = args.timeout {
            self.general.timeout_seconds = timeout;
        }

        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
