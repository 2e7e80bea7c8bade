//! Schedule source reading a complete renewal table from a local file.
//!
//! The format follows the extension: `.toml` files hold `[[rows]]` tables,
//! `.json` files hold `{"rows": [...]}`. Each row has `digits`, `month` and
//! `week`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::fs;
use tracing::info;

use regwatch_core::{
    model::{SourceId, SourceMeta, Sources},
    plugin::SchedulePlugin,
    ports::{PortError, SchedulePort},
    schedule::{RenewalScheduleTable, ScheduleDocument},
};

/// Schedule port reading a TOML or JSON document from disk.
pub struct FileSchedulePort {
    path: PathBuf,
    meta: SourceMeta,
}

impl FileSchedulePort {
    /// Create a new schedule port for the given file.
    #[must_use]
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        let path = path.into();
        Self {
            meta: source_meta(&path),
            path,
        }
    }
}

#[async_trait]
impl SchedulePort for FileSchedulePort {
    fn source(&self) -> &SourceMeta {
        &self.meta
    }

    async fn load(&self) -> Result<RenewalScheduleTable, PortError> {
        let raw = fs::read_to_string(&self.path).await?;
        let document = decode(&self.path, &raw)?;
        let table = RenewalScheduleTable::try_from(&document)?;

        info!(
            path = %self.path.display(),
            name = document.name.as_deref().unwrap_or("unnamed"),
            "schedule file loaded"
        );
        Ok(table)
    }
}

/// Decode a schedule document, choosing the format from the file extension.
///
/// # Errors
///
/// Returns [`PortError::UnsupportedFormat`] for extensions other than `toml`
/// and `json`, and [`PortError::Decode`] when the content does not parse.
pub fn decode(path: &Path, raw: &str) -> Result<ScheduleDocument, PortError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "toml" => toml::from_str(raw).map_err(|err| PortError::Decode(err.to_string())),
        "json" => serde_json::from_str(raw).map_err(|err| PortError::Decode(err.to_string())),
        _ => Err(PortError::UnsupportedFormat(path.display().to_string())),
    }
}

/// Build the plugin bundle for a schedule file.
#[must_use]
pub fn plugin<P: Into<PathBuf>>(path: P) -> SchedulePlugin {
    SchedulePlugin::new(Arc::new(FileSchedulePort::new(path)))
}

fn source_meta(path: &Path) -> SourceMeta {
    SourceMeta {
        id: SourceId::from(Sources::File),
        name: format!("Schedule file {}", path.display()),
    }
}
