//! End-to-end behaviour of the expiration engine through its public API.

use std::sync::Arc;

use chrono::{Datelike, Duration, Month, NaiveDate};
use regwatch_core::{
    CodingDigits, EngineConfig, PlateType, RegistrationService, RegistrationStatus,
    RenewalScheduleTable, ScheduleRow, SummaryKey, VehicleRecord, parse_coding_digits,
};

use async_trait as _;
use reqwest as _;
use serde as _;
use serde_json as _;
use thiserror as _;
use tokio as _;
use tracing as _;

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
}

/// Rotating schedule: month cycles through all twelve, week through all four.
fn rotating_table() -> RenewalScheduleTable {
    let rows = CodingDigits::all()
        .map(|digits| {
            let index = u32::try_from(digits.index()).expect("small index");
            ScheduleRow {
                digits: digits.to_string(),
                month: index % 12 + 1,
                week: u8::try_from(index / 12 % 4 + 1).expect("week fits"),
            }
        })
        .collect::<Vec<_>>();
    RenewalScheduleTable::from_rows(&rows).expect("rotating table is total")
}

/// Rotating schedule with `23` pinned to the third week of March.
fn table_with_march_third_week_for_23() -> RenewalScheduleTable {
    let mut document = rotating_table().to_document(Some("fixture".to_owned()));
    for row in &mut document.rows {
        if row.digits == "23" {
            row.month = 3;
            row.week = 3;
        }
    }
    RenewalScheduleTable::try_from(&document).expect("patched table is total")
}

fn service(table: RenewalScheduleTable) -> RegistrationService {
    RegistrationService::new(Arc::new(table), EngineConfig::default())
}

#[test]
fn abc123_in_january_expires_in_third_week_of_march() {
    let svc = service(table_with_march_third_week_for_23());
    let record = VehicleRecord::new("ABC123", PlateType::Old);
    let today = date(2025, 1, 12);

    let info = svc.expiration_info(&record, today).expect("record evaluates");

    assert_eq!(info.coding_digits.to_string(), "23");
    assert_eq!(info.assigned_month, Month::March);
    assert!((15..=21).contains(&info.expiration_date.day()));
    assert_eq!(info.expiration_date.year(), 2025);
    assert!(info.days_until_expiration > 30);
    assert_eq!(info.status, RegistrationStatus::Active);
    assert!(!info.is_expired);
}

#[test]
fn abc123_after_the_window_moves_to_next_year() {
    let svc = service(table_with_march_third_week_for_23());
    let record = VehicleRecord::new("ABC123", PlateType::Old);

    let info = svc
        .expiration_info(&record, date(2025, 4, 2))
        .expect("record evaluates");

    assert_eq!(info.expiration_date, date(2026, 3, 21));
}

#[test]
fn parse_and_lookup_are_deterministic() {
    let svc = service(rotating_table());
    for plate in ["ABC123", "XYZ 9", "NAB-4500", "Q 77", "MOTO 10"] {
        let digits = parse_coding_digits(plate).expect("plate parses");
        let entry = *svc.table().lookup(digits);
        for _ in 0..10 {
            assert_eq!(parse_coding_digits(plate), Ok(digits));
            assert_eq!(*svc.table().lookup(digits), entry);
            assert_eq!(svc.schedule_for(plate), Ok(&entry));
        }
    }
}

#[test]
fn every_expiration_lands_in_its_window() {
    let svc = service(rotating_table());
    let mut today = date(2023, 1, 1);
    let last = date(2025, 12, 31);

    while today <= last {
        for digits in CodingDigits::all() {
            let plate = format!("TST {digits}");
            let records = [
                VehicleRecord::new(plate.clone(), PlateType::Old),
                VehicleRecord::new(plate.clone(), PlateType::Old)
                    .with_last_renewal(today - Duration::days(200)),
                VehicleRecord::new(plate.clone(), PlateType::New).with_issuance(today),
            ];
            for record in &records {
                let info = svc.expiration_info(record, today).expect("record evaluates");
                let entry = svc.table().lookup(digits);
                let window = entry
                    .window(info.expiration_date.year())
                    .expect("window exists");

                assert_eq!(info.assigned_month, entry.month);
                assert_eq!(info.assigned_week, entry.week);
                assert!(
                    window.contains(info.expiration_date),
                    "{plate} on {today}: {} outside {window:?}",
                    info.expiration_date
                );
                assert_eq!(info.is_expired, info.expiration_date < today);
            }
        }
        today = today + Duration::days(37);
    }
}

#[test]
fn status_moves_forward_only_as_days_pass() {
    let svc = service(rotating_table());
    let record = VehicleRecord::new("ABC 45", PlateType::Old).with_last_renewal(date(2024, 2, 1));
    let mut previous = RegistrationStatus::Active;
    let mut today = date(2024, 1, 1);

    while today < date(2026, 6, 1) {
        let status = svc
            .expiration_info(&record, today)
            .expect("record evaluates")
            .status;
        assert!(status >= previous, "{today}: {previous:?} -> {status:?}");
        previous = status;
        today = today + Duration::days(1);
    }
    assert_eq!(previous, RegistrationStatus::Expired);
}

#[test]
fn aggregation_counts_one_unknown_among_ten() {
    let svc = service(rotating_table());
    let today = date(2025, 8, 20);
    let mut records = (0..9)
        .map(|index| {
            VehicleRecord::new(format!("FLT {}", index * 11 + 3), PlateType::Old)
                .with_last_renewal(date(2024, 1 + index, 10))
        })
        .collect::<Vec<_>>();
    records.insert(4, VehicleRecord::new("UNREADABLE", PlateType::Old));

    let summary = svc.aggregate(&records, today);
    let counts = summary.counts();

    assert_eq!(counts.get(&SummaryKey::Unknown), Some(&1));
    let month_total = (1..=12)
        .filter_map(|month| counts.get(&SummaryKey::Month(month)))
        .sum::<usize>();
    let status_total = RegistrationStatus::ALL
        .into_iter()
        .filter_map(|status| counts.get(&SummaryKey::Status(status)))
        .sum::<usize>();
    assert_eq!(month_total, 9);
    assert_eq!(status_total, 9);
    assert_eq!(summary.total(), records.len());
}

#[test]
fn aggregation_matches_individual_evaluation() {
    let svc = service(rotating_table());
    let today = date(2025, 3, 3);
    let records = CodingDigits::all()
        .map(|digits| VehicleRecord::new(format!("ALL {digits}"), PlateType::Old))
        .collect::<Vec<_>>();

    let summary = svc.aggregate(&records, today);

    for status in RegistrationStatus::ALL {
        let expected = svc.with_status(&records, today, status).len();
        assert_eq!(summary.status_count(status), expected, "{status}");
    }
    assert_eq!(summary.known(), CodingDigits::COUNT);
}
