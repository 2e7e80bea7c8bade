use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use regwatch_core::model::{PlateType, RegistrationStatus};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum StatusFilter {
    Active,
    ExpiringSoon,
    Expired,
}

impl From<StatusFilter> for RegistrationStatus {
    fn from(filter: StatusFilter) -> Self {
        match filter {
            StatusFilter::Active => RegistrationStatus::Active,
            StatusFilter::ExpiringSoon => RegistrationStatus::ExpiringSoon,
            StatusFilter::Expired => RegistrationStatus::Expired,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum PlateKind {
    #[default]
    Old,
    New,
}

impl From<PlateKind> for PlateType {
    fn from(kind: PlateKind) -> Self {
        match kind {
            PlateKind::Old => PlateType::Old,
            PlateKind::New => PlateType::New,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "regwatch")]
#[command(version)]
#[command(about = "Vehicle registration renewal windows and expiration status")]
pub(crate) struct Cli {
    #[command(flatten)]
    pub(crate) global: GlobalArgs,

    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Debug, Args)]
pub(crate) struct GlobalArgs {
    /// Config file (defaults to ./regwatch.toml when present)
    #[arg(long, global = true)]
    pub(crate) config: Option<PathBuf>,

    /// Schedule source id: lto, file or http
    #[arg(long, global = true)]
    pub(crate) source: Option<String>,

    /// Schedule file for the file source
    #[arg(long, global = true)]
    pub(crate) schedule_file: Option<PathBuf>,

    /// Schedule URL for the http source
    #[arg(long, global = true)]
    pub(crate) schedule_url: Option<String>,

    /// Days before expiration that count as expiring soon
    #[arg(long, global = true)]
    pub(crate) threshold_days: Option<u32>,

    /// Evaluate as of this date instead of today (YYYY-MM-DD)
    #[arg(long, global = true)]
    pub(crate) as_of: Option<NaiveDate>,

    /// Output format
    #[arg(long, value_enum, global = true, default_value_t)]
    pub(crate) format: OutputFormat,

    /// Debug logging on stderr
    #[arg(long, short, global = true)]
    pub(crate) verbose: bool,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// List every record with its renewal window and status
    Status {
        /// JSON file holding an array of vehicle records
        records: PathBuf,

        /// Only show records with this status
        #[arg(long, value_enum)]
        status: Option<StatusFilter>,

        /// Only show records due in this month (1-12)
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=12))]
        month: Option<u8>,
    },
    /// Show the renewal window and status of a single plate
    Lookup {
        /// Plate number, e.g. "ABC 1234"
        plate: String,

        /// Plate kind
        #[arg(long, value_enum, default_value_t)]
        kind: PlateKind,

        /// Last renewal date (YYYY-MM-DD)
        #[arg(long)]
        renewed: Option<NaiveDate>,

        /// Plate issuance date (YYYY-MM-DD), used for new plates
        #[arg(long)]
        issued: Option<NaiveDate>,
    },
    /// Count records per renewal month and status
    Dashboard {
        /// JSON file holding an array of vehicle records
        records: PathBuf,
    },
    /// List registrations expiring within the given horizon
    Upcoming {
        /// JSON file holding an array of vehicle records
        records: PathBuf,

        /// Horizon in days
        #[arg(long, default_value_t = 60)]
        days: u32,
    },
    /// Print the loaded renewal schedule
    Schedule,
    /// List the configured schedule sources
    Sources,
}
