//! High-level service facade used by detail views, listings and dashboards.

use std::sync::Arc;

use chrono::{Month, NaiveDate};
use tracing::info;

use crate::aggregate::{RegistrationSummary, aggregate};
use crate::config::EngineConfig;
use crate::engine::{EngineError, EvaluatedRecord, evaluate};
use crate::model::{ExpirationInfo, RegistrationStatus, SourceId, VehicleRecord};
use crate::plate::{InvalidPlateFormat, parse_coding_digits};
use crate::plugin::PluginRegistry;
use crate::ports::PortError;
use crate::schedule::{RenewalScheduleTable, ScheduleEntry};

/// Public entry point for deriving registration expirations.
///
/// Every query takes `today` explicitly; callers capture it once per view so a
/// response never mixes two evaluation dates.
#[derive(Debug, Clone)]
pub struct RegistrationService {
    table: Arc<RenewalScheduleTable>,
    config: EngineConfig,
}

impl RegistrationService {
    /// Create a service bound to an already loaded table.
    #[must_use]
    pub fn new(table: Arc<RenewalScheduleTable>, config: EngineConfig) -> Self {
        Self { table, config }
    }

    /// Load the table from a registered source and create a service around it.
    ///
    /// # Errors
    ///
    /// Returns a [`PortError`] if the source is unsupported or fails to load.
    pub async fn load(
        registry: &PluginRegistry,
        source: &SourceId,
        config: EngineConfig,
    ) -> Result<Self, PortError> {
        let plugin = registry.plugin(source)?;
        let table = plugin.schedule_port.load().await?;
        info!(source = %source, name = %plugin.meta.name, "renewal schedule loaded");
        Ok(Self::new(Arc::new(table), config))
    }

    /// Schedule table in use.
    #[must_use]
    pub fn table(&self) -> &RenewalScheduleTable {
        &self.table
    }

    /// Engine configuration in use.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Schedule entry a plate is assigned to.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidPlateFormat`] when the plate has no coding digits.
    pub fn schedule_for(&self, plate_number: &str) -> Result<&ScheduleEntry, InvalidPlateFormat> {
        let digits = parse_coding_digits(plate_number)?;
        Ok(self.table.lookup(digits))
    }

    /// Expiration details for a single record.
    ///
    /// # Errors
    ///
    /// Returns an [`EngineError`] when the record cannot be evaluated.
    pub fn expiration_info(
        &self,
        record: &VehicleRecord,
        today: NaiveDate,
    ) -> Result<ExpirationInfo, EngineError> {
        evaluate(record, today, &self.table, &self.config)
    }

    /// Expiration details for every record, in input order.
    #[must_use]
    pub fn evaluate_all(
        &self,
        records: &[VehicleRecord],
        today: NaiveDate,
    ) -> Vec<Result<ExpirationInfo, EngineError>> {
        records
            .iter()
            .map(|record| self.expiration_info(record, today))
            .collect()
    }

    /// Month and status counts for a batch of records.
    #[must_use]
    pub fn aggregate(&self, records: &[VehicleRecord], today: NaiveDate) -> RegistrationSummary {
        aggregate(records, today, &self.table, &self.config)
    }

    /// Records whose derived status equals `status`.
    #[must_use]
    pub fn with_status<'rec>(
        &self,
        records: &'rec [VehicleRecord],
        today: NaiveDate,
        status: RegistrationStatus,
    ) -> Vec<EvaluatedRecord<'rec>> {
        self.evaluated(records, today)
            .filter(|evaluated| evaluated.info.status == status)
            .collect()
    }

    /// Records assigned to renew in `month`.
    #[must_use]
    pub fn due_in_month<'rec>(
        &self,
        records: &'rec [VehicleRecord],
        today: NaiveDate,
        month: Month,
    ) -> Vec<EvaluatedRecord<'rec>> {
        self.evaluated(records, today)
            .filter(|evaluated| evaluated.info.assigned_month == month)
            .collect()
    }

    /// Unexpired records expiring within `within_days`, soonest first.
    #[must_use]
    pub fn upcoming<'rec>(
        &self,
        records: &'rec [VehicleRecord],
        today: NaiveDate,
        within_days: u32,
    ) -> Vec<EvaluatedRecord<'rec>> {
        let horizon = i64::from(within_days);
        let mut upcoming = self
            .evaluated(records, today)
            .filter(|evaluated| {
                !evaluated.info.is_expired && evaluated.info.days_until_expiration <= horizon
            })
            .collect::<Vec<_>>();
        upcoming.sort_by(|left, right| {
            left.info
                .expiration_date
                .cmp(&right.info.expiration_date)
                .then_with(|| left.record.plate_number.cmp(&right.record.plate_number))
        });
        upcoming
    }

    fn evaluated<'rec>(
        &self,
        records: &'rec [VehicleRecord],
        today: NaiveDate,
    ) -> impl Iterator<Item = EvaluatedRecord<'rec>> {
        records.iter().filter_map(move |record| {
            self.expiration_info(record, today)
                .ok()
                .map(|info| EvaluatedRecord { record, info })
        })
    }
}
