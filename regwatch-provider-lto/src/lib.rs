//! Schedule source for the Land Transportation Office staggered renewal scheme.
//!
//! The last plate digit selects the month (1 through 9 for January through
//! September, 0 for October) and the second-to-last digit selects the week
//! (1-3 first, 4-6 second, 7-8 third, 9 and 0 last week).

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Month;
use tracing::debug;

use regwatch_core::{
    model::{RenewalWeek, SourceId, SourceMeta, Sources},
    plate::CodingDigits,
    plugin::SchedulePlugin,
    ports::{PortError, SchedulePort},
    schedule::{RenewalScheduleTable, ScheduleEntry, ScheduleError},
};

/// Renewal month indexed by the last plate digit.
const MONTH_BY_LAST_DIGIT: [Month; 10] = [
    Month::October,
    Month::January,
    Month::February,
    Month::March,
    Month::April,
    Month::May,
    Month::June,
    Month::July,
    Month::August,
    Month::September,
];

/// Renewal week indexed by the second-to-last plate digit.
const WEEK_BY_SECOND_TO_LAST_DIGIT: [RenewalWeek; 10] = [
    RenewalWeek::Fourth,
    RenewalWeek::First,
    RenewalWeek::First,
    RenewalWeek::First,
    RenewalWeek::Second,
    RenewalWeek::Second,
    RenewalWeek::Second,
    RenewalWeek::Third,
    RenewalWeek::Third,
    RenewalWeek::Fourth,
];

/// Schedule port serving the built-in LTO table.
pub struct LtoSchedulePort {
    meta: SourceMeta,
}

impl LtoSchedulePort {
    /// Create a new schedule port.
    #[must_use]
    pub fn new() -> Self {
        Self { meta: source_meta() }
    }
}

impl Default for LtoSchedulePort {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SchedulePort for LtoSchedulePort {
    fn source(&self) -> &SourceMeta {
        &self.meta
    }

    async fn load(&self) -> Result<RenewalScheduleTable, PortError> {
        let table = table()?;
        debug!(entries = table.entries().len(), "built LTO renewal schedule");
        Ok(table)
    }
}

/// Build the LTO renewal schedule.
///
/// # Errors
///
/// Returns a [`ScheduleError`] if the lookup arrays stop covering every
/// coding digit pair.
pub fn table() -> Result<RenewalScheduleTable, ScheduleError> {
    let entries = (0_u8..)
        .zip(WEEK_BY_SECOND_TO_LAST_DIGIT)
        .flat_map(|(tens, week)| {
            (0_u8..)
                .zip(MONTH_BY_LAST_DIGIT)
                .filter_map(move |(ones, month)| {
                    CodingDigits::new(tens, ones).map(|coding_digits| ScheduleEntry {
                        coding_digits,
                        month,
                        week,
                    })
                })
        });
    RenewalScheduleTable::from_entries(entries)
}

/// Build the plugin bundle for the LTO source.
#[must_use]
pub fn plugin() -> SchedulePlugin {
    SchedulePlugin::new(Arc::new(LtoSchedulePort::new()))
}

fn source_meta() -> SourceMeta {
    SourceMeta {
        id: SourceId::from(Sources::Lto),
        name: String::from("Land Transportation Office staggered renewal"),
    }
}
