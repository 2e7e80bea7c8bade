//! Schedule source fetching a complete renewal table from an HTTP endpoint.
//!
//! The endpoint answers `GET` with a JSON body of the form
//! `{"name": "...", "rows": [{"digits": "00", "month": 10, "week": 4}, ...]}`.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info};

use regwatch_core::{
    model::{SourceId, SourceMeta, Sources},
    plugin::SchedulePlugin,
    ports::{PortError, SchedulePort},
    schedule::{RenewalScheduleTable, ScheduleDocument},
};

/// Schedule port downloading the table from a URL.
pub struct HttpSchedulePort {
    client: Client,
    url: String,
    meta: SourceMeta,
}

impl HttpSchedulePort {
    /// Create a new schedule port bound to the given HTTP client and URL.
    #[must_use]
    pub fn new<U: Into<String>>(client: Client, url: U) -> Self {
        let url = url.into();
        Self {
            client,
            meta: source_meta(&url),
            url,
        }
    }
}

#[async_trait]
impl SchedulePort for HttpSchedulePort {
    fn source(&self) -> &SourceMeta {
        &self.meta
    }

    async fn load(&self) -> Result<RenewalScheduleTable, PortError> {
        let response = self.client.get(&self.url).send().await?.error_for_status()?;
        debug!(url = %self.url, status = %response.status(), "schedule response received");
        let document = parse_document(&response.text().await?)?;
        let table = RenewalScheduleTable::try_from(&document)?;

        info!(
            url = %self.url,
            name = document.name.as_deref().unwrap_or("unnamed"),
            "remote schedule loaded"
        );
        Ok(table)
    }
}

/// Decode a schedule document from a response body.
///
/// # Errors
///
/// Returns [`PortError::Decode`] when the body is not a schedule document.
pub fn parse_document(body: &str) -> Result<ScheduleDocument, PortError> {
    serde_json::from_str(body).map_err(|err| PortError::Decode(err.to_string()))
}

/// Build the plugin bundle for a remote schedule.
#[must_use]
pub fn plugin<U: Into<String>>(client: Client, url: U) -> SchedulePlugin {
    SchedulePlugin::new(Arc::new(HttpSchedulePort::new(client, url)))
}

fn source_meta(url: &str) -> SourceMeta {
    SourceMeta {
        id: SourceId::from(Sources::Http),
        name: format!("Remote schedule {url}"),
    }
}
