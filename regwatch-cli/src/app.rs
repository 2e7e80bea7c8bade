use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use regwatch_core::{
    config::EngineConfig,
    model::{SourceId, Sources, VehicleRecord},
    plugin::{PluginRegistry, SchedulePlugin},
};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use regwatch_provider_file as file;
use regwatch_provider_http as http;
use regwatch_provider_lto as lto;

use crate::cli::GlobalArgs;

const DEFAULT_CONFIG_FILE: &str = "regwatch.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct AppConfig {
    pub(crate) engine: EngineConfig,
    pub(crate) schedule: ScheduleConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub(crate) struct ScheduleConfig {
    pub(crate) source: String,
    pub(crate) path: Option<PathBuf>,
    pub(crate) url: Option<String>,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            source: Sources::Lto.to_string(),
            path: None,
            url: None,
        }
    }
}

impl AppConfig {
    /// Read the config file and apply command line overrides.
    ///
    /// An explicitly named file must exist; the default file is optional.
    pub(crate) fn resolve(args: &GlobalArgs) -> Result<Self> {
        let mut config = match &args.config {
            Some(path) => Self::read(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
                Self::read(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };

        if let Some(source) = &args.source {
            config.schedule.source.clone_from(source);
        }
        if let Some(path) = &args.schedule_file {
            config.schedule.path = Some(path.clone());
        }
        if let Some(url) = &args.schedule_url {
            config.schedule.url = Some(url.clone());
        }
        if let Some(days) = args.threshold_days {
            config.engine.expiring_soon_threshold_days = days;
        }

        debug!(?config, "configuration resolved");
        Ok(config)
    }

    fn read(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))
    }

    pub(crate) fn source_id(&self) -> SourceId {
        SourceId(self.schedule.source.trim().to_ascii_lowercase())
    }

    /// Registry holding every source this configuration can reach.
    pub(crate) fn registry(&self) -> Result<PluginRegistry> {
        let mut plugins: Vec<SchedulePlugin> = vec![lto::plugin()];

        if let Some(path) = &self.schedule.path {
            plugins.push(file::plugin(path.clone()));
        }
        if let Some(url) = &self.schedule.url {
            let client = Client::builder().user_agent("regwatch/0.1").build()?;
            plugins.push(http::plugin(client, url.clone()));
        }

        let requested = self.source_id();
        if requested == SourceId::from(Sources::File) && self.schedule.path.is_none() {
            bail!("the file schedule source needs --schedule-file or [schedule].path");
        }
        if requested == SourceId::from(Sources::Http) && self.schedule.url.is_none() {
            bail!("the http schedule source needs --schedule-url or [schedule].url");
        }

        Ok(PluginRegistry::new(plugins))
    }
}

/// Read a JSON array of vehicle records.
pub(crate) fn load_records(path: &Path) -> Result<Vec<VehicleRecord>> {
    let raw =
        fs::read_to_string(path).with_context(|| format!("reading records {}", path.display()))?;
    let records: Vec<VehicleRecord> = serde_json::from_str(&raw)
        .with_context(|| format!("parsing records {}", path.display()))?;
    debug!(count = records.len(), path = %path.display(), "records loaded");
    Ok(records)
}
