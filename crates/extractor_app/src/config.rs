//! Worker configuration, read from a RON file.
//!
//! Every field has a default, so a missing file simply means "run with defaults".

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context};
use engine_logging::LogDestination;
use extractor_engine::{
    WorkerSettings, DEFAULT_IDLE_BACKOFF, DEFAULT_MAX_ABANDONED_STAGES, DEFAULT_SUPPORTED_MARKER,
};
use log::LevelFilter;
use serde::Deserialize;

const CONFIG_FILENAME: &str = "extractor.ron";
const CONFIG_ENV: &str = "EXTRACTOR_CONFIG";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtractorConfig {
    /// Spool directory holding `*.job` files.
    pub queue_dir: PathBuf,
    /// Attachments below this root keep their relative layout under `output_root`.
    pub input_root: Option<PathBuf>,
    pub output_root: PathBuf,
    pub supported_marker: String,
    pub idle_backoff_secs: u64,
    pub stage_timeout_secs: Option<u64>,
    pub max_abandoned_stages: usize,
    pub log_destination: LogDestination,
    pub log_file: PathBuf,
    pub log_level: String,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            queue_dir: PathBuf::from("./queue"),
            input_root: None,
            output_root: PathBuf::from("./text"),
            supported_marker: DEFAULT_SUPPORTED_MARKER.to_string(),
            idle_backoff_secs: DEFAULT_IDLE_BACKOFF.as_secs(),
            stage_timeout_secs: None,
            max_abandoned_stages: DEFAULT_MAX_ABANDONED_STAGES,
            log_destination: LogDestination::Terminal,
            log_file: PathBuf::from("./extractor.log"),
            log_level: "info".to_string(),
        }
    }
}

/// `$EXTRACTOR_CONFIG`, or `./extractor.ron`.
pub fn config_path() -> PathBuf {
    std::env::var_os(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILENAME))
}

impl ExtractorConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => {
                return Err(err).with_context(|| format!("reading config file {:?}", path));
            }
        };
        Self::parse(&content).with_context(|| format!("loading config file {:?}", path))
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let config: Self = ron::from_str(content).context("invalid RON")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.supported_marker.is_empty() {
            bail!("supported_marker must not be empty");
        }
        if self.idle_backoff_secs == 0 {
            bail!("idle_backoff_secs must be at least 1");
        }
        if self.stage_timeout_secs == Some(0) {
            bail!("stage_timeout_secs must be at least 1 when set");
        }
        if self.max_abandoned_stages == 0 {
            bail!("max_abandoned_stages must be at least 1");
        }
        self.level_filter()?;
        Ok(())
    }

    pub fn level_filter(&self) -> anyhow::Result<LevelFilter> {
        LevelFilter::from_str(&self.log_level)
            .map_err(|_| anyhow::anyhow!("unknown log level {:?}", self.log_level))
    }

    pub fn worker_settings(&self) -> WorkerSettings {
        WorkerSettings {
            supported_marker: self.supported_marker.clone(),
            stage_timeout: self.stage_timeout_secs.map(Duration::from_secs),
            max_abandoned_stages: self.max_abandoned_stages,
            idle_backoff: Duration::from_secs(self.idle_backoff_secs),
        }
    }
}
