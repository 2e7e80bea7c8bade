//! Month and status counts over a batch of records, for dashboards and reports.

use std::collections::BTreeMap;

use chrono::{Month, NaiveDate};
use serde::Serialize;
use tracing::debug;

use crate::config::EngineConfig;
use crate::engine::evaluate;
use crate::model::{ExpirationInfo, RegistrationStatus, VehicleRecord};
use crate::schedule::RenewalScheduleTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
/// Bucket of the flattened summary mapping.
pub enum SummaryKey {
    /// Assigned renewal month, 1 through 12.
    Month(u32),
    /// Derived registration status.
    Status(RegistrationStatus),
    /// Records whose plate could not be evaluated.
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
/// Counts of a batch of records by assigned month and derived status.
///
/// Every evaluable record lands in exactly one month bucket and one status
/// bucket; every other record is counted in `unknown`.
pub struct RegistrationSummary {
    /// Records per assigned month number.
    pub by_month: BTreeMap<u32, usize>,
    /// Records per status.
    pub by_status: BTreeMap<RegistrationStatus, usize>,
    /// Records per assigned month number, split by status.
    pub by_month_and_status: BTreeMap<u32, BTreeMap<RegistrationStatus, usize>>,
    /// Records that could not be evaluated.
    pub unknown: usize,
}

impl RegistrationSummary {
    fn record(&mut self, info: &ExpirationInfo) {
        let month = info.assigned_month.number_from_month();
        *self.by_month.entry(month).or_default() += 1;
        *self.by_status.entry(info.status).or_default() += 1;
        *self
            .by_month_and_status
            .entry(month)
            .or_default()
            .entry(info.status)
            .or_default() += 1;
    }

    /// Records that were evaluated successfully.
    #[must_use]
    pub fn known(&self) -> usize {
        self.by_month.values().sum()
    }

    /// All records seen, evaluated or not.
    #[must_use]
    pub fn total(&self) -> usize {
        self.known() + self.unknown
    }

    /// Records assigned to `month`.
    #[must_use]
    pub fn month_count(&self, month: Month) -> usize {
        self.by_month
            .get(&month.number_from_month())
            .copied()
            .unwrap_or_default()
    }

    /// Records with `status`.
    #[must_use]
    pub fn status_count(&self, status: RegistrationStatus) -> usize {
        self.by_status.get(&status).copied().unwrap_or_default()
    }

    /// Flattened mapping over month, status and unknown buckets.
    ///
    /// Every month and status appears, with zero counts where nothing matched.
    #[must_use]
    pub fn counts(&self) -> BTreeMap<SummaryKey, usize> {
        let months = (1..=12).map(|month| {
            let count = self.by_month.get(&month).copied().unwrap_or_default();
            (SummaryKey::Month(month), count)
        });
        let statuses = RegistrationStatus::ALL
            .into_iter()
            .map(|status| (SummaryKey::Status(status), self.status_count(status)));

        months
            .chain(statuses)
            .chain([(SummaryKey::Unknown, self.unknown)])
            .collect()
    }
}

/// Fold a batch of records into month and status counts as of `today`.
///
/// `today` is shared by every record so the whole batch describes one instant.
/// Records that fail evaluation are counted as unknown and never abort the fold.
#[must_use]
pub fn aggregate(
    records: &[VehicleRecord],
    today: NaiveDate,
    table: &RenewalScheduleTable,
    config: &EngineConfig,
) -> RegistrationSummary {
    let summary = records
        .iter()
        .fold(RegistrationSummary::default(), |mut summary, record| {
            match evaluate(record, today, table, config) {
                Ok(info) => summary.record(&info),
                Err(err) => {
                    debug!(plate = %record.plate_number, %err, "counting record as unknown");
                    summary.unknown += 1;
                }
            }
            summary
        });

    debug!(
        %today,
        total = summary.total(),
        unknown = summary.unknown,
        "aggregated registration statuses"
    );
    summary
}
