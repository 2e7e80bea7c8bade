//! Command line reports for regwatch: per-plate lookups, fleet status listings,
//! dashboards and upcoming renewals.

mod app;
mod cli;
mod report;

use std::io::{self, Write};

use anyhow::Result;
use chrono::{Local, Month, NaiveDate};
use clap::Parser;
use regwatch_core::{
    engine::EvaluatedRecord,
    model::{RegistrationStatus, VehicleRecord},
    service::RegistrationService,
};
use tracing::{debug, level_filters::LevelFilter};
use tracing_subscriber::EnvFilter;

use crate::app::{AppConfig, load_records};
use crate::cli::{Cli, Command, OutputFormat};
use crate::report::StatusRow;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.global.verbose);

    let config = AppConfig::resolve(&cli.global)?;
    let registry = config.registry()?;
    let format = cli.global.format;
    // One evaluation date for the whole run.
    let today = cli
        .global
        .as_of
        .unwrap_or_else(|| Local::now().date_naive());
    debug!(%today, "evaluation date");

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if let Command::Sources = cli.command {
        let sources = registry.sources();
        match format {
            OutputFormat::Table => report::sources(&mut out, &sources, &config.source_id().0)?,
            OutputFormat::Json => report::json(&mut out, &sources)?,
        }
        return Ok(());
    }

    let service = RegistrationService::load(&registry, &config.source_id(), config.engine).await?;

    match cli.command {
        Command::Status {
            records,
            status,
            month,
        } => {
            let records = load_records(&records)?;
            let month = month.map(Month::try_from).transpose()?;
            let rows = status_rows(&service, &records, today, status.map(Into::into), month);
            match format {
                OutputFormat::Table => report::status_table(&mut out, &rows)?,
                OutputFormat::Json => report::json(&mut out, &rows)?,
            }
        }
        Command::Lookup {
            plate,
            kind,
            renewed,
            issued,
        } => {
            let mut record = VehicleRecord::new(plate, kind.into());
            if let Some(date) = renewed {
                record = record.with_last_renewal(date);
            }
            if let Some(date) = issued {
                record = record.with_issuance(date);
            }
            let info = service.expiration_info(&record, today)?;
            match format {
                OutputFormat::Table => {
                    report::lookup_detail(&mut out, &record.plate_number, &info)?;
                }
                OutputFormat::Json => report::json(&mut out, &info)?,
            }
        }
        Command::Dashboard { records } => {
            let records = load_records(&records)?;
            let summary = service.aggregate(&records, today);
            match format {
                OutputFormat::Table => report::dashboard(&mut out, &summary, today)?,
                OutputFormat::Json => report::json(&mut out, &summary)?,
            }
        }
        Command::Upcoming { records, days } => {
            let records = load_records(&records)?;
            let upcoming = service.upcoming(&records, today, days);
            match format {
                OutputFormat::Table => report::upcoming(&mut out, &upcoming)?,
                OutputFormat::Json => {
                    let rows = upcoming.into_iter().map(evaluated_row).collect::<Vec<_>>();
                    report::json(&mut out, &rows)?;
                }
            }
        }
        Command::Schedule => match format {
            OutputFormat::Table => report::schedule(&mut out, service.table())?,
            OutputFormat::Json => {
                let document = service.table().to_document(Some(config.source_id().0));
                report::json(&mut out, &document)?;
            }
        },
        Command::Sources => {}
    }

    out.flush()?;
    Ok(())
}

/// Rows for the status listing.
///
/// Without filters every record is listed, unknown plates included. Filters
/// only ever match records that could be evaluated.
fn status_rows<'rec>(
    service: &RegistrationService,
    records: &'rec [VehicleRecord],
    today: NaiveDate,
    status: Option<RegistrationStatus>,
    month: Option<Month>,
) -> Vec<StatusRow<'rec>> {
    let filtered = match (status, month) {
        (None, None) => {
            return records
                .iter()
                .zip(service.evaluate_all(records, today))
                .map(|(record, result)| StatusRow::new(record, result))
                .collect();
        }
        (Some(status), None) => service.with_status(records, today, status),
        (None, Some(month)) => service.due_in_month(records, today, month),
        (Some(status), Some(month)) => service
            .with_status(records, today, status)
            .into_iter()
            .filter(|evaluated| evaluated.info.assigned_month == month)
            .collect(),
    };
    filtered.into_iter().map(evaluated_row).collect()
}

fn evaluated_row(evaluated: EvaluatedRecord<'_>) -> StatusRow<'_> {
    StatusRow::new(evaluated.record, Ok(evaluated.info))
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let filter = EnvFilter::builder()
        .with_default_directive(default_level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}
