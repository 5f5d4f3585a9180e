//! Loading the venue dataset from a file or an HTTP URL.
//!
//! The dataset is either a bare JSON array of places or the envelope
//! `{ "data": [...] }` served by the dashboard's static file. Places that
//! fail to deserialize are skipped with a warning rather than failing the
//! whole load.

use crate::models::PlaceRecord;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can occur while loading a dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// The dataset file could not be read.
    #[error("Failed to read dataset {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// HTTP request for a remote dataset failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("Server returned status {status} for {url}")]
    Status { url: String, status: u16 },

    /// The payload is not valid JSON.
    #[error("Invalid dataset JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Valid JSON, but neither an array nor a `data` envelope.
    #[error("Dataset must be an array of places or an object with a 'data' array")]
    UnsupportedShape,
}

/// Where a dataset comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetSource {
    File(PathBuf),
    Url(String),
}

impl DatasetSource {
    /// Interpret a CLI/config value: `http(s)://` means a URL, anything else a path.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            DatasetSource::Url(trimmed.to_string())
        } else {
            DatasetSource::File(PathBuf::from(trimmed))
        }
    }
}

impl fmt::Display for DatasetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetSource::File(path) => write!(f, "{}", path.display()),
            DatasetSource::Url(url) => write!(f, "{}", url),
        }
    }
}

/// Options for loading a dataset.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Show a spinner while downloading.
    pub show_progress: bool,
    /// HTTP request timeout.
    pub timeout: Duration,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            show_progress: true,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Load and parse a dataset.
pub async fn load_places(
    source: &DatasetSource,
    options: &LoadOptions,
) -> Result<Vec<PlaceRecord>, DatasetError> {
    info!("Loading dataset from: {}", source);

    let content = match source {
        DatasetSource::File(path) => {
            tokio::fs::read_to_string(path)
                .await
                .map_err(|source| DatasetError::Io {
                    path: path.display().to_string(),
                    source,
                })?
        }
        DatasetSource::Url(url) => fetch(url, options).await?,
    };

    let places = parse_places(&content)?;
    info!("Loaded {} places", places.len());
    Ok(places)
}

async fn fetch(url: &str, options: &LoadOptions) -> Result<String, DatasetError> {
    let spinner = if options.show_progress {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(format!("Downloading {}", url));
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    } else {
        None
    };

    let client = reqwest::Client::builder().timeout(options.timeout).build()?;
    let response = client.get(url).send().await?;

    let status = response.status();
    if !status.is_success() {
        if let Some(pb) = spinner {
            pb.abandon_with_message("Download failed");
        }
        return Err(DatasetError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response.text().await?;
    debug!("Downloaded {} bytes", body.len());

    if let Some(pb) = spinner {
        pb.finish_with_message("Download complete");
    }

    Ok(body)
}

/// Parse dataset JSON, skipping malformed places.
pub fn parse_places(json: &str) -> Result<Vec<PlaceRecord>, DatasetError> {
    let value: Value = serde_json::from_str(json)?;

    let records = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(items)) => items,
            _ => return Err(DatasetError::UnsupportedShape),
        },
        _ => return Err(DatasetError::UnsupportedShape),
    };

    let mut places = Vec::with_capacity(records.len());
    for (index, record) in records.into_iter().enumerate() {
        match serde_json::from_value::<PlaceRecord>(record) {
            Ok(place) => places.push(place),
            Err(e) => warn!("Skipping malformed place #{}: {}", index + 1, e),
        }
    }

    Ok(places)
}
