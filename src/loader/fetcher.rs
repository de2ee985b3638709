//! Data sources and the loader that reads them.

use super::payload::{check_status, parse_payload};
use super::LoadFailure;
use crate::models::Dataset;
use indicatif::{ProgressBar, ProgressStyle};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info};

/// Where the rows come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    /// HTTP GET against the spreadsheet script.
    Remote { url: String },
    /// A JSON export saved on disk.
    File { path: PathBuf },
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Remote { url } => write!(f, "{}", url),
            DataSource::File { path } => write!(f, "{}", path.display()),
        }
    }
}

/// Settings for the HTTP client.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    pub timeout_seconds: u64,
    pub user_agent: String,
    /// Show a spinner while loading.
    pub show_progress: bool,
    /// Honour the system proxy settings.
    pub use_proxy: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            user_agent: format!("surveydash/{}", env!("CARGO_PKG_VERSION")),
            show_progress: false,
            use_proxy: true,
        }
    }
}

impl From<&crate::config::SourceConfig> for LoaderConfig {
    fn from(config: &crate::config::SourceConfig) -> Self {
        Self {
            timeout_seconds: config.timeout_seconds,
            user_agent: config.user_agent.clone(),
            show_progress: false,
            use_proxy: true,
        }
    }
}

/// Loads a dataset once per run.
pub struct DataLoader {
    config: LoaderConfig,
    http_client: reqwest::Client,
}

impl DataLoader {
    /// Create a loader with its HTTP client.
    pub fn new(config: LoaderConfig) -> Result<Self, LoadFailure> {
        let mut builder = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(config.user_agent.clone());
        if !config.use_proxy {
            builder = builder.no_proxy();
        }

        let http_client = builder
            .build()
            .map_err(|e| LoadFailure::Transport(format!("cannot create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// Load the dataset, logging the failure before handing it back.
    pub async fn load(&self, source: &DataSource) -> Result<Dataset, LoadFailure> {
        info!("Loading survey data from {}", source);

        let spinner = self.spinner(source);
        let result = match source {
            DataSource::Remote { url } => self.fetch_remote(url).await,
            DataSource::File { path } => read_file(path).await,
        };

        if let Some(pb) = spinner {
            pb.finish_and_clear();
        }

        match &result {
            Ok(dataset) => info!("Loaded {} rows", dataset.len()),
            Err(e) => error!("Dashboard data failed to load: {}", e),
        }

        result
    }

    async fn fetch_remote(&self, url: &str) -> Result<Dataset, LoadFailure> {
        let response = self.http_client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                LoadFailure::Transport(format!(
                    "request timed out after {}s",
                    self.config.timeout_seconds
                ))
            } else if e.is_connect() {
                LoadFailure::Transport(format!("cannot connect to {}", url))
            } else {
                LoadFailure::Transport(e.to_string())
            }
        })?;

        check_status(response.status())?;

        let body = response
            .text()
            .await
            .map_err(|e| LoadFailure::Transport(format!("failed to read body: {}", e)))?;

        parse_payload(&body)
    }

    fn spinner(&self, source: &DataSource) -> Option<ProgressBar> {
        if !self.config.show_progress {
            return None;
        }

        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(format!("Loading dashboard data from {}", source));
        pb.enable_steady_tick(Duration::from_millis(100));
        Some(pb)
    }
}

async fn read_file(path: &Path) -> Result<Dataset, LoadFailure> {
    let body = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| LoadFailure::File {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

    parse_payload(&body)
}
