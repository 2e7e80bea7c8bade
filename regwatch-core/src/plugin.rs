//! Registry for all schedule source plugins.

use std::collections::HashMap;
use std::sync::Arc;

use crate::model::{SourceId, SourceMeta};
use crate::ports::{PortError, SchedulePort};

/// A schedule source bundled with its metadata.
pub struct SchedulePlugin {
    /// Static metadata describing the source.
    pub meta: SourceMeta,
    /// Implementation loading the table.
    pub schedule_port: Arc<dyn SchedulePort>,
}

impl SchedulePlugin {
    /// Wrap a port, copying its metadata.
    #[must_use]
    pub fn new(schedule_port: Arc<dyn SchedulePort>) -> Self {
        Self {
            meta: schedule_port.source().clone(),
            schedule_port,
        }
    }
}

/// Registry that resolves plugins by source identifier.
pub struct PluginRegistry {
    plugins: HashMap<SourceId, SchedulePlugin>,
}

impl PluginRegistry {
    /// Build a registry from the provided plugin list.
    #[must_use]
    pub fn new(plugins: Vec<SchedulePlugin>) -> Self {
        let plugins_map = plugins
            .into_iter()
            .map(|plugin| (plugin.meta.id.clone(), plugin))
            .collect();
        Self {
            plugins: plugins_map,
        }
    }

    /// Metadata for all registered sources, sorted by id.
    #[must_use]
    pub fn sources(&self) -> Vec<SourceMeta> {
        let mut sources = self
            .plugins
            .values()
            .map(|plugin| plugin.meta.clone())
            .collect::<Vec<_>>();
        sources.sort_by(|left, right| left.id.0.cmp(&right.id.0));
        sources
    }

    /// Look up the plugin for the given source.
    ///
    /// # Errors
    ///
    /// Returns [`PortError::UnsupportedSource`] when no plugin is registered.
    pub fn plugin(&self, source: &SourceId) -> Result<&SchedulePlugin, PortError> {
        self.plugins
            .get(source)
            .ok_or_else(|| PortError::UnsupportedSource(source.0.clone()))
    }
}
