use std::cmp::Ordering;
use std::io::{self, Write};

use chrono::{Month, NaiveDate};
use regwatch_core::{
    aggregate::RegistrationSummary,
    engine::{EngineError, EvaluatedRecord},
    model::{ExpirationInfo, RegistrationStatus, SourceMeta, VehicleRecord},
    schedule::RenewalScheduleTable,
};
use serde::Serialize;

const UNKNOWN_BADGE: &str = "Unknown";

/// One line of the status listing, also used for JSON output.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StatusRow<'rec> {
    pub(crate) plate_number: &'rec str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) expiration: Option<ExpirationInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) error: Option<String>,
}

impl<'rec> StatusRow<'rec> {
    pub(crate) fn new(
        record: &'rec VehicleRecord,
        result: Result<ExpirationInfo, EngineError>,
    ) -> Self {
        match result {
            Ok(info) => Self {
                plate_number: &record.plate_number,
                expiration: Some(info),
                error: None,
            },
            Err(err) => Self {
                plate_number: &record.plate_number,
                expiration: None,
                error: Some(err.to_string()),
            },
        }
    }
}

pub(crate) fn status_table<W: Write>(out: &mut W, rows: &[StatusRow<'_>]) -> io::Result<()> {
    writeln!(
        out,
        "{:<14} {:<6} {:<10} {:<10} {:<12} {:<16} {}",
        "Plate", "Code", "Month", "Week", "Expires", "Remaining", "Status"
    )?;
    for row in rows {
        match &row.expiration {
            Some(info) => writeln!(
                out,
                "{:<14} {:<6} {:<10} {:<10} {:<12} {:<16} {}",
                row.plate_number,
                info.coding_digits.to_string(),
                info.assigned_month.name(),
                info.assigned_week.to_string(),
                info.expiration_date.format("%Y-%m-%d").to_string(),
                countdown(info.days_until_expiration),
                info.status
            )?,
            None => writeln!(
                out,
                "{:<14} {:<6} {:<10} {:<10} {:<12} {:<16} {} ({})",
                row.plate_number,
                "-",
                "-",
                "-",
                "-",
                "-",
                UNKNOWN_BADGE,
                row.error.as_deref().unwrap_or("not evaluated")
            )?,
        }
    }
    Ok(())
}

pub(crate) fn lookup_detail<W: Write>(
    out: &mut W,
    plate: &str,
    info: &ExpirationInfo,
) -> io::Result<()> {
    writeln!(out, "Plate:          {plate}")?;
    writeln!(out, "Coding digits:  {}", info.coding_digits)?;
    writeln!(
        out,
        "Renewal window: {} of {}",
        info.assigned_week,
        info.assigned_month.name()
    )?;
    writeln!(
        out,
        "Expires:        {} ({})",
        info.expiration_date.format("%Y-%m-%d"),
        countdown(info.days_until_expiration)
    )?;
    writeln!(out, "Status:         {}", info.status)
}

pub(crate) fn dashboard<W: Write>(
    out: &mut W,
    summary: &RegistrationSummary,
    today: NaiveDate,
) -> io::Result<()> {
    writeln!(
        out,
        "Registrations as of {} ({} records)",
        today.format("%Y-%m-%d"),
        summary.total()
    )?;
    writeln!(out)?;
    writeln!(
        out,
        "{:<10} {:>7} {:>14} {:>8} {:>6}",
        "Month", "Active", "Expiring Soon", "Expired", "Total"
    )?;

    for month_number in 1..=12_u32 {
        let cells = summary.by_month_and_status.get(&month_number);
        let cell = |status: RegistrationStatus| {
            cells
                .and_then(|by_status| by_status.get(&status))
                .copied()
                .unwrap_or_default()
        };
        let name = u8::try_from(month_number)
            .ok()
            .and_then(|number| Month::try_from(number).ok())
            .map_or("?", |month| month.name());
        writeln!(
            out,
            "{:<10} {:>7} {:>14} {:>8} {:>6}",
            name,
            cell(RegistrationStatus::Active),
            cell(RegistrationStatus::ExpiringSoon),
            cell(RegistrationStatus::Expired),
            summary.by_month.get(&month_number).copied().unwrap_or_default()
        )?;
    }

    writeln!(
        out,
        "{:<10} {:>7} {:>14} {:>8} {:>6}",
        "All",
        summary.status_count(RegistrationStatus::Active),
        summary.status_count(RegistrationStatus::ExpiringSoon),
        summary.status_count(RegistrationStatus::Expired),
        summary.known()
    )?;
    writeln!(out)?;
    writeln!(out, "{UNKNOWN_BADGE} plates: {}", summary.unknown)
}

pub(crate) fn upcoming<W: Write>(out: &mut W, evaluated: &[EvaluatedRecord<'_>]) -> io::Result<()> {
    if evaluated.is_empty() {
        return writeln!(out, "No registrations expire in this range.");
    }
    for entry in evaluated {
        writeln!(
            out,
            "{:<12} {:<16} {:<14} {}",
            entry.info.expiration_date.format("%Y-%m-%d").to_string(),
            countdown(entry.info.days_until_expiration),
            entry.record.plate_number,
            entry.record.vehicle_type.as_deref().unwrap_or("")
        )?;
    }
    Ok(())
}

pub(crate) fn schedule<W: Write>(out: &mut W, table: &RenewalScheduleTable) -> io::Result<()> {
    writeln!(out, "{:<6} {:<10} {}", "Code", "Month", "Week")?;
    for entry in table.entries() {
        writeln!(
            out,
            "{:<6} {:<10} {}",
            entry.coding_digits.to_string(),
            entry.month.name(),
            entry.week
        )?;
    }
    Ok(())
}

pub(crate) fn sources<W: Write>(
    out: &mut W,
    sources: &[SourceMeta],
    active: &str,
) -> io::Result<()> {
    for meta in sources {
        let marker = if meta.id.0 == active { "*" } else { " " };
        writeln!(out, "{marker} {:<6} {}", meta.id, meta.name)?;
    }
    Ok(())
}

pub(crate) fn json<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)
}

/// Days left before expiration, or days overdue after it.
fn countdown(days_until_expiration: i64) -> String {
    let days = days_until_expiration.unsigned_abs();
    let unit = if days == 1 { "day" } else { "days" };
    match days_until_expiration.cmp(&0) {
        Ordering::Equal => "due today".to_owned(),
        Ordering::Greater => format!("{days} {unit} left"),
        Ordering::Less => format!("{days} {unit} overdue"),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use regwatch_core::{
        config::EngineConfig, model::PlateType, plate::InvalidPlateFormat,
        service::RegistrationService,
    };

    use super::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
    }

    fn service() -> RegistrationService {
        let table = regwatch_provider_lto::table().expect("LTO table is total");
        RegistrationService::new(Arc::new(table), EngineConfig::default())
    }

    fn render<F>(write: F) -> String
    where
        F: FnOnce(&mut Vec<u8>) -> io::Result<()>,
    {
        let mut buffer = Vec::new();
        write(&mut buffer).expect("render succeeds");
        String::from_utf8(buffer).expect("utf-8 output")
    }

    #[test]
    fn status_listing_marks_unknown_plates() {
        let svc = service();
        let today = date(2025, 2, 20);
        let records = [
            VehicleRecord::new("ABC 123", PlateType::Old),
            VehicleRecord::new("NOPLATE", PlateType::Old),
        ];
        let rows = records
            .iter()
            .map(|record| StatusRow::new(record, svc.expiration_info(record, today)))
            .collect::<Vec<_>>();

        let text = render(|out| status_table(out, &rows));

        let lines = text.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 3);
        let known = lines.get(1).expect("known row");
        assert!(known.contains("March"), "{known}");
        assert!(known.contains("2025-03-07"), "{known}");
        assert!(known.contains("15 days left"), "{known}");
        assert!(known.contains("Expiring Soon"), "{known}");
        let unknown = lines.get(2).expect("unknown row");
        assert!(unknown.contains("Unknown (Invalid plate format"), "{unknown}");
    }

    #[test]
    fn dashboard_totals_rows() {
        let svc = service();
        let today = date(2025, 2, 20);
        let records = [
            VehicleRecord::new("ABC 123", PlateType::Old),
            VehicleRecord::new("ABC 124", PlateType::Old),
            VehicleRecord::new("NOPLATE", PlateType::Old),
        ];
        let summary = svc.aggregate(&records, today);

        let text = render(|out| dashboard(out, &summary, today));

        assert!(text.contains("(3 records)"), "{text}");
        assert!(text.contains("Unknown plates: 1"), "{text}");
        let march = text
            .lines()
            .find(|line| line.starts_with("March"))
            .expect("March row");
        assert!(march.ends_with(" 1"), "{march}");
    }

    #[test]
    fn countdown_labels() {
        assert_eq!(countdown(0), "due today");
        assert_eq!(countdown(1), "1 day left");
        assert_eq!(countdown(45), "45 days left");
        assert_eq!(countdown(-1), "1 day overdue");
        assert_eq!(countdown(-10), "10 days overdue");
    }

    #[test]
    fn json_output_skips_missing_fields() {
        let record = VehicleRecord::new("NOPLATE", PlateType::Old);
        let row = StatusRow::new(
            &record,
            Err(EngineError::InvalidPlateFormat(
                InvalidPlateFormat::NoNumericSuffix("NOPLATE".to_owned()),
            )),
        );

        let text = render(|out| json(out, &[row]));

        assert!(text.contains("\"plateNumber\": \"NOPLATE\""), "{text}");
        assert!(text.contains("\"error\""), "{text}");
        assert!(!text.contains("\"expiration\""), "{text}");
    }
}
