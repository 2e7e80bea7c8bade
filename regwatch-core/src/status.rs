//! Classification of an expiration date relative to the evaluation date.

use chrono::NaiveDate;

use crate::model::RegistrationStatus;

/// Signed number of days from `today` to `expiration_date`.
#[must_use]
pub fn days_until(expiration_date: NaiveDate, today: NaiveDate) -> i64 {
    (expiration_date - today).num_days()
}

/// Derive the registration status.
///
/// `Expired` once the expiration date is in the past, `ExpiringSoon` from
/// `threshold_days` before expiration up to and including the expiration day,
/// `Active` before that.
#[must_use]
pub fn classify(
    expiration_date: NaiveDate,
    today: NaiveDate,
    threshold_days: u32,
) -> RegistrationStatus {
    let remaining = days_until(expiration_date, today);
    if remaining < 0 {
        RegistrationStatus::Expired
    } else if remaining <= i64::from(threshold_days) {
        RegistrationStatus::ExpiringSoon
    } else {
        RegistrationStatus::Active
    }
}
