//! Immutable lookup table from coding digits to a renewal month and week.

use std::collections::BTreeMap;

use chrono::{Datelike, Month, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::model::RenewalWeek;
use crate::plate::{CodingDigits, MalformedCodingDigits};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
/// Reasons a set of schedule rows cannot form a complete table.
pub enum ScheduleError {
    /// Row key is not two digits.
    #[error("Malformed schedule row: {0}")]
    MalformedDigits(#[from] MalformedCodingDigits),
    /// Month outside 1 through 12.
    #[error("Invalid month {month} for coding digits {digits}")]
    InvalidMonth {
        /// Row key.
        digits: CodingDigits,
        /// Offending value.
        month: u32,
    },
    /// Week outside 1 through 4.
    #[error("Invalid week {week} for coding digits {digits}")]
    InvalidWeek {
        /// Row key.
        digits: CodingDigits,
        /// Offending value.
        week: u8,
    },
    /// The same coding digits appear twice.
    #[error("Duplicate schedule entry for coding digits {0}")]
    Duplicate(CodingDigits),
    /// No row for these coding digits.
    #[error("Missing schedule entry for coding digits {0}")]
    Missing(CodingDigits),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Renewal month and week assigned to one pair of coding digits.
pub struct ScheduleEntry {
    /// Lookup key.
    pub coding_digits: CodingDigits,
    /// Month the registration falls due in.
    pub month: Month,
    /// Week of `month` the registration falls due in.
    pub week: RenewalWeek,
}

impl ScheduleEntry {
    /// Concrete renewal window of this entry in the given year.
    ///
    /// Returns `None` only when the year lies outside chrono's calendar.
    #[must_use]
    pub fn window(&self, year: i32) -> Option<RenewalWindow> {
        let month = self.month.number_from_month();
        let first_of_month = NaiveDate::from_ymd_opt(year, month, 1)?;
        let days_in_month = first_of_month
            .checked_add_months(Months::new(1))?
            .pred_opt()?
            .day();

        Some(RenewalWindow {
            start: first_of_month.with_day(self.week.first_day())?,
            end: first_of_month.with_day(self.week.last_day(days_in_month))?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Inclusive start/end of a renewal window in a specific year.
pub struct RenewalWindow {
    /// First day of the window (inclusive).
    pub start: NaiveDate,
    /// Last day of the window (inclusive); the registration expires here.
    pub end: NaiveDate,
}

impl RenewalWindow {
    /// Check whether `date` falls inside the window.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Serialized form of one schedule entry, as found in files and HTTP bodies.
pub struct ScheduleRow {
    /// Two coding digits, e.g. `"07"`.
    pub digits: String,
    /// Month number, 1 through 12.
    pub month: u32,
    /// Week number, 1 through 4.
    pub week: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
/// Serialized schedule: an optional label and one row per coding digit pair.
pub struct ScheduleDocument {
    /// Free-form label, e.g. the issuing authority and effective year.
    #[serde(default)]
    pub name: Option<String>,
    /// Schedule rows in any order.
    #[serde(default)]
    pub rows: Vec<ScheduleRow>,
}

impl TryFrom<&ScheduleRow> for ScheduleEntry {
    type Error = ScheduleError;

    fn try_from(row: &ScheduleRow) -> Result<Self, Self::Error> {
        let coding_digits = row.digits.trim().parse::<CodingDigits>()?;
        let month = u8::try_from(row.month)
            .ok()
            .and_then(|number| Month::try_from(number).ok())
            .ok_or(ScheduleError::InvalidMonth {
                digits: coding_digits,
                month: row.month,
            })?;
        let week = RenewalWeek::from_number(row.week).ok_or(ScheduleError::InvalidWeek {
            digits: coding_digits,
            week: row.week,
        })?;

        Ok(Self {
            coding_digits,
            month,
            week,
        })
    }
}

impl From<&ScheduleEntry> for ScheduleRow {
    fn from(entry: &ScheduleEntry) -> Self {
        Self {
            digits: entry.coding_digits.to_string(),
            month: entry.month.number_from_month(),
            week: entry.week.number(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Complete renewal schedule covering every coding digit pair.
///
/// Built once per process by a schedule source and shared read-only afterwards.
pub struct RenewalScheduleTable {
    entries: Vec<ScheduleEntry>,
}

impl RenewalScheduleTable {
    /// Build a table from entries covering `00` through `99` exactly once.
    ///
    /// # Errors
    ///
    /// Returns [`ScheduleError::Duplicate`] or [`ScheduleError::Missing`] when
    /// the entries are not a total mapping.
    pub fn from_entries<I>(entries: I) -> Result<Self, ScheduleError>
    where
        I: IntoIterator<Item = ScheduleEntry>,
    {
        let mut by_digits = BTreeMap::new();
        for entry in entries {
            if by_digits.insert(entry.coding_digits, entry).is_some() {
                return Err(ScheduleError::Duplicate(entry.coding_digits));
            }
        }

        if let Some(missing) = CodingDigits::all().find(|digits| !by_digits.contains_key(digits)) {
            return Err(ScheduleError::Missing(missing));
        }

        Ok(Self {
            entries: by_digits.into_values().collect(),
        })
    }

    /// Build a table from serialized rows.
    ///
    /// # Errors
    ///
    /// Returns a [`ScheduleError`] for the first malformed row or when the rows
    /// do not cover every coding digit pair exactly once.
    pub fn from_rows(rows: &[ScheduleRow]) -> Result<Self, ScheduleError> {
        let entries = rows
            .iter()
            .map(ScheduleEntry::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_entries(entries)
    }

    /// Schedule entry for the given coding digits.
    #[must_use]
    #[expect(
        clippy::indexing_slicing,
        reason = "entries holds one slot per CodingDigits index"
    )]
    pub fn lookup(&self, digits: CodingDigits) -> &ScheduleEntry {
        &self.entries[digits.index()]
    }

    /// All entries in coding digit order.
    #[must_use]
    pub fn entries(&self) -> &[ScheduleEntry] {
        &self.entries
    }

    /// Serialized form of the table.
    #[must_use]
    pub fn to_document(&self, name: Option<String>) -> ScheduleDocument {
        ScheduleDocument {
            name,
            rows: self.entries.iter().map(ScheduleRow::from).collect(),
        }
    }
}

impl TryFrom<&ScheduleDocument> for RenewalScheduleTable {
    type Error = ScheduleError;

    fn try_from(document: &ScheduleDocument) -> Result<Self, Self::Error> {
        Self::from_rows(&document.rows)
    }
}
