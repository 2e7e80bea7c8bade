//! Expiration date of the current registration cycle.

use chrono::{Datelike, Months, NaiveDate};

use crate::config::EngineConfig;
use crate::model::{PlateType, VehicleRecord};
use crate::plate::CodingDigits;
use crate::schedule::{RenewalWindow, ScheduleEntry};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
/// Failures while placing a renewal window on the calendar.
pub enum ExpirationError {
    /// The window would fall outside the range chrono can represent.
    #[error("Renewal window for coding digits {digits} is out of range around year {year}")]
    DateOutOfRange {
        /// Schedule key of the record.
        digits: CodingDigits,
        /// Year the window was requested for.
        year: i32,
    },
}

/// Compute the date the current registration cycle expires on.
///
/// A cycle always ends on the last day of the assigned window:
///
/// * With a recorded renewal, a renewal made before that year's window pays for
///   the window still ahead in the same year; a renewal made during or after
///   the window runs until the window of the following year.
/// * Without a renewal, the window of `today`'s year applies, or next year's
///   once this year's window has ended.
/// * A [`PlateType::New`] plate that was never renewed expires at the first
///   window ending on or after its issuance date plus
///   [`EngineConfig::new_plate_initial_term_years`]. When the issuance date is
///   not tracked, the plate is treated like a [`PlateType::Old`] one.
///
/// # Errors
///
/// Returns [`ExpirationError::DateOutOfRange`] when a date cannot be
/// represented.
pub fn compute_expiration(
    record: &VehicleRecord,
    entry: &ScheduleEntry,
    today: NaiveDate,
    config: &EngineConfig,
) -> Result<NaiveDate, ExpirationError> {
    let first_cycle_issuance = match record.plate_type {
        PlateType::New if record.last_renewal_date.is_none() => record.issued_on,
        PlateType::New | PlateType::Old => None,
    };

    if let Some(issued_on) = first_cycle_issuance {
        return first_cycle_expiration(entry, issued_on, config.new_plate_initial_term_years);
    }

    match record.last_renewal_date {
        Some(renewed_on) => expiration_after_renewal(entry, renewed_on),
        None => next_window_end(entry, today),
    }
}

fn window(entry: &ScheduleEntry, year: i32) -> Result<RenewalWindow, ExpirationError> {
    entry.window(year).ok_or(ExpirationError::DateOutOfRange {
        digits: entry.coding_digits,
        year,
    })
}

fn expiration_after_renewal(
    entry: &ScheduleEntry,
    renewed_on: NaiveDate,
) -> Result<NaiveDate, ExpirationError> {
    let year = renewed_on.year();
    let same_year = window(entry, year)?;
    if renewed_on < same_year.start {
        Ok(same_year.end)
    } else {
        Ok(window(entry, year + 1)?.end)
    }
}

/// End of the first window that has not ended before `anchor`.
fn next_window_end(entry: &ScheduleEntry, anchor: NaiveDate) -> Result<NaiveDate, ExpirationError> {
    let year = anchor.year();
    let current = window(entry, year)?;
    if current.end < anchor {
        Ok(window(entry, year + 1)?.end)
    } else {
        Ok(current.end)
    }
}

fn first_cycle_expiration(
    entry: &ScheduleEntry,
    issued_on: NaiveDate,
    term_years: u32,
) -> Result<NaiveDate, ExpirationError> {
    let anchor = issued_on
        .checked_add_months(Months::new(term_years.saturating_mul(12)))
        .ok_or(ExpirationError::DateOutOfRange {
            digits: entry.coding_digits,
            year: issued_on.year(),
        })?;
    next_window_end(entry, anchor)
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Month};

    use super::*;
    use crate::model::RenewalWeek;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
    }

    fn march_third_week() -> ScheduleEntry {
        ScheduleEntry {
            coding_digits: "23".parse().expect("digits"),
            month: Month::March,
            week: RenewalWeek::Third,
        }
    }

    fn expire(record: &VehicleRecord, today: NaiveDate) -> NaiveDate {
        compute_expiration(record, &march_third_week(), today, &EngineConfig::default())
            .expect("expiration computes")
    }

    #[test]
    fn no_history_uses_current_year_window() {
        let record = VehicleRecord::new("ABC123", PlateType::Old);
        assert_eq!(expire(&record, date(2025, 1, 15)), date(2025, 3, 21));
        assert_eq!(expire(&record, date(2025, 3, 21)), date(2025, 3, 21));
    }

    #[test]
    fn no_history_rolls_over_once_window_passed() {
        let record = VehicleRecord::new("ABC123", PlateType::Old);
        assert_eq!(expire(&record, date(2025, 3, 22)), date(2026, 3, 21));
        assert_eq!(expire(&record, date(2025, 11, 2)), date(2026, 3, 21));
    }

    #[test]
    fn renewal_in_or_after_window_runs_to_next_year() {
        let today = date(2025, 6, 1);
        let in_window =
            VehicleRecord::new("ABC123", PlateType::Old).with_last_renewal(date(2024, 3, 18));
        assert_eq!(expire(&in_window, today), date(2025, 3, 21));

        let late =
            VehicleRecord::new("ABC123", PlateType::Old).with_last_renewal(date(2024, 9, 30));
        assert_eq!(expire(&late, today), date(2025, 3, 21));

        let window_start =
            VehicleRecord::new("ABC123", PlateType::Old).with_last_renewal(date(2024, 3, 15));
        assert_eq!(expire(&window_start, today), date(2025, 3, 21));
    }

    #[test]
    fn renewal_before_window_covers_same_year() {
        let record =
            VehicleRecord::new("ABC123", PlateType::Old).with_last_renewal(date(2024, 1, 20));
        assert_eq!(expire(&record, date(2024, 2, 1)), date(2024, 3, 21));
    }

    #[test]
    fn renewal_result_does_not_depend_on_today() {
        let record =
            VehicleRecord::new("ABC123", PlateType::Old).with_last_renewal(date(2023, 4, 2));
        assert_eq!(expire(&record, date(2020, 1, 1)), date(2024, 3, 21));
        assert_eq!(expire(&record, date(2030, 1, 1)), date(2024, 3, 21));
    }

    #[test]
    fn new_plate_first_cycle_anchors_to_issuance() {
        let record = VehicleRecord::new("NEW 1023", PlateType::New).with_issuance(date(2023, 5, 10));
        // 2023-05-10 + 3 years = 2026-05-10, after the 2026 window.
        assert_eq!(expire(&record, date(2024, 1, 1)), date(2027, 3, 21));

        let early = VehicleRecord::new("NEW 1023", PlateType::New).with_issuance(date(2023, 2, 1));
        assert_eq!(expire(&early, date(2024, 1, 1)), date(2026, 3, 21));
    }

    #[test]
    fn new_plate_respects_configured_term() {
        let record = VehicleRecord::new("NEW 1023", PlateType::New).with_issuance(date(2023, 2, 1));
        let config = EngineConfig {
            new_plate_initial_term_years: 1,
            ..EngineConfig::default()
        };
        let expiration =
            compute_expiration(&record, &march_third_week(), date(2023, 6, 1), &config)
                .expect("expiration computes");
        assert_eq!(expiration, date(2024, 3, 21));
    }

    #[test]
    fn new_plate_reverts_to_schedule_after_first_renewal() {
        let record = VehicleRecord::new("NEW 1023", PlateType::New)
            .with_issuance(date(2020, 5, 10))
            .with_last_renewal(date(2023, 3, 16));
        assert_eq!(expire(&record, date(2023, 6, 1)), date(2024, 3, 21));
    }

    #[test]
    fn new_plate_without_issuance_falls_back_to_old_rules() {
        let today = date(2025, 7, 1);
        let new_plate = VehicleRecord::new("NEW 1023", PlateType::New);
        let old_plate = VehicleRecord::new("NEW 1023", PlateType::Old);
        assert_eq!(expire(&new_plate, today), expire(&old_plate, today));
    }

    #[test]
    fn expiration_always_lands_inside_the_window() {
        let entry = march_third_week();
        let config = EngineConfig::default();
        let mut today = date(2023, 1, 1);
        while today < date(2026, 1, 1) {
            let records = [
                VehicleRecord::new("ABC123", PlateType::Old),
                VehicleRecord::new("ABC123", PlateType::Old).with_last_renewal(today),
                VehicleRecord::new("ABC123", PlateType::New).with_issuance(today),
            ];
            for record in &records {
                let expiration =
                    compute_expiration(record, &entry, today, &config).expect("computes");
                let window = entry.window(expiration.year()).expect("window");
                assert!(window.contains(expiration), "{record:?} on {today}: {expiration}");
            }
            today = today + Duration::days(11);
        }
    }
}
