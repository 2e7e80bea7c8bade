//! Single-record evaluation: plate parsing, schedule lookup, dating and classification.

use chrono::NaiveDate;

use crate::config::EngineConfig;
use crate::expiration::{ExpirationError, compute_expiration};
use crate::model::{ExpirationInfo, VehicleRecord};
use crate::plate::{InvalidPlateFormat, parse_coding_digits};
use crate::schedule::RenewalScheduleTable;
use crate::status::{classify, days_until};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
/// Reasons a record has no derivable expiration.
pub enum EngineError {
    /// Plate identifier has no usable coding digits.
    #[error(transparent)]
    InvalidPlateFormat(#[from] InvalidPlateFormat),
    /// Expiration date could not be placed on the calendar.
    #[error(transparent)]
    Expiration(#[from] ExpirationError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A record paired with the expiration details derived for it.
pub struct EvaluatedRecord<'rec> {
    /// Source record.
    pub record: &'rec VehicleRecord,
    /// Derived details.
    pub info: ExpirationInfo,
}

/// Derive the expiration details of one record as of `today`.
///
/// # Errors
///
/// Returns [`EngineError::InvalidPlateFormat`] when the plate cannot be keyed
/// into the schedule and [`EngineError::Expiration`] when the date falls
/// outside chrono's calendar.
pub fn evaluate(
    record: &VehicleRecord,
    today: NaiveDate,
    table: &RenewalScheduleTable,
    config: &EngineConfig,
) -> Result<ExpirationInfo, EngineError> {
    let coding_digits = parse_coding_digits(&record.plate_number)?;
    let entry = table.lookup(coding_digits);
    let expiration_date = compute_expiration(record, entry, today, config)?;

    Ok(ExpirationInfo {
        coding_digits,
        assigned_month: entry.month,
        assigned_week: entry.week,
        expiration_date,
        is_expired: expiration_date < today,
        days_until_expiration: days_until(expiration_date, today),
        status: classify(expiration_date, today, config.expiring_soon_threshold_days),
    })
}

#[cfg(test)]
mod tests {
    use chrono::Month;

    use super::*;
    use crate::model::{PlateType, RegistrationStatus};
    use crate::schedule::tests::sample_table;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
    }

    #[test]
    fn evaluates_a_never_renewed_plate() {
        let table = sample_table();
        let record = VehicleRecord::new("ABC 1234", PlateType::Old);

        let info = evaluate(&record, date(2025, 2, 1), &table, &EngineConfig::default())
            .expect("plate evaluates");

        assert_eq!(info.coding_digits.to_string(), "34");
        assert_eq!(info.assigned_month, Month::April);
        assert_eq!(info.expiration_date, date(2025, 4, 14));
        assert!(!info.is_expired);
        assert_eq!(info.days_until_expiration, 72);
        assert_eq!(info.status, RegistrationStatus::Active);
    }

    #[test]
    fn expired_flag_matches_status() {
        let table = sample_table();
        let record =
            VehicleRecord::new("ABC 1234", PlateType::Old).with_last_renewal(date(2023, 4, 10));

        let info = evaluate(&record, date(2025, 2, 1), &table, &EngineConfig::default())
            .expect("plate evaluates");

        assert_eq!(info.expiration_date, date(2024, 4, 14));
        assert!(info.is_expired);
        assert!(info.days_until_expiration < 0);
        assert_eq!(info.status, RegistrationStatus::Expired);
    }

    #[test]
    fn unparsable_plate_is_reported() {
        let table = sample_table();
        let record = VehicleRecord::new("NOPLATE", PlateType::Old);

        let err = evaluate(&record, date(2025, 2, 1), &table, &EngineConfig::default())
            .expect_err("plate must be rejected");

        assert!(matches!(err, EngineError::InvalidPlateFormat(_)));
    }
}
