//! Domain data structures for vehicle records, renewal windows and derived status.

use std::fmt;

use chrono::{DateTime, Month, NaiveDate, NaiveDateTime};
use serde::de::{self, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::plate::CodingDigits;

/// Textual date layouts accepted for record dates, tried in order.
const RECORD_DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
/// Timestamp layouts without an offset, as emitted by most SQL drivers.
const RECORD_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Built-in schedule sources shipped with regwatch.
pub enum Sources {
    /// Published Land Transportation Office staggered scheme.
    Lto,
    /// Table read from a local TOML or JSON file.
    File,
    /// Table fetched from an HTTP endpoint.
    Http,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Identifier for a schedule source known to regwatch.
pub struct SourceId(pub String);

impl fmt::Display for Sources {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slug = match self {
            Sources::Lto => "lto",
            Sources::File => "file",
            Sources::Http => "http",
        };
        write!(formatter, "{slug}")
    }
}

impl From<Sources> for SourceId {
    fn from(source: Sources) -> Self {
        SourceId(source.to_string())
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Metadata describing a schedule source.
pub struct SourceMeta {
    /// Unique identifier.
    pub id: SourceId,
    /// Human-friendly description, e.g. the issuing authority.
    pub name: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Kind of plate a vehicle carries.
pub enum PlateType {
    /// Legacy plate: the coding-digit schedule applies from the first cycle.
    #[default]
    #[serde(alias = "Old", alias = "OLD")]
    Old,
    /// Newly issued plate: the first cycle is anchored to the issuance date.
    #[serde(alias = "New", alias = "NEW")]
    New,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Vehicle record as handed over by the storage layer.
///
/// Only `plate_number`, `plate_type`, `last_renewal_date` and `issued_on` take
/// part in the date math. Unparsable dates in serialized input are read as
/// absent.
pub struct VehicleRecord {
    /// Plate identifier as printed, e.g. `ABC 1234`.
    pub plate_number: String,
    /// Legacy or newly issued plate.
    #[serde(default)]
    pub plate_type: PlateType,
    /// Most recent confirmed renewal.
    #[serde(default, deserialize_with = "lenient_date")]
    pub last_renewal_date: Option<NaiveDate>,
    /// Issuance date of the plate, when tracked.
    #[serde(default, deserialize_with = "lenient_date")]
    pub issued_on: Option<NaiveDate>,
    /// Registration classification (private, for hire, government, ...).
    #[serde(default)]
    pub classification: Option<String>,
    /// Body type (car, motorcycle, truck, ...).
    #[serde(default)]
    pub vehicle_type: Option<String>,
}

impl VehicleRecord {
    /// Record with no renewal history and no descriptive fields.
    #[must_use]
    pub fn new<P: Into<String>>(plate_number: P, plate_type: PlateType) -> Self {
        Self {
            plate_number: plate_number.into(),
            plate_type,
            last_renewal_date: None,
            issued_on: None,
            classification: None,
            vehicle_type: None,
        }
    }

    /// Set the most recent renewal date.
    #[must_use]
    pub fn with_last_renewal(mut self, date: NaiveDate) -> Self {
        self.last_renewal_date = Some(date);
        self
    }

    /// Set the plate issuance date.
    #[must_use]
    pub fn with_issuance(mut self, date: NaiveDate) -> Self {
        self.issued_on = Some(date);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Week of the assigned month in which a registration falls due.
pub enum RenewalWeek {
    /// Days 1 to 7.
    First,
    /// Days 8 to 14.
    Second,
    /// Days 15 to 21.
    Third,
    /// Day 22 to the end of the month.
    Fourth,
}

impl RenewalWeek {
    /// All weeks in calendar order.
    pub const ALL: [RenewalWeek; 4] = [
        RenewalWeek::First,
        RenewalWeek::Second,
        RenewalWeek::Third,
        RenewalWeek::Fourth,
    ];

    /// Week from its ordinal, 1 through 4.
    #[must_use]
    pub fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(RenewalWeek::First),
            2 => Some(RenewalWeek::Second),
            3 => Some(RenewalWeek::Third),
            4 => Some(RenewalWeek::Fourth),
            _ => None,
        }
    }

    /// Ordinal of the week, 1 through 4.
    #[must_use]
    pub fn number(self) -> u8 {
        match self {
            RenewalWeek::First => 1,
            RenewalWeek::Second => 2,
            RenewalWeek::Third => 3,
            RenewalWeek::Fourth => 4,
        }
    }

    /// First day of the month covered by this week.
    #[must_use]
    pub fn first_day(self) -> u32 {
        match self {
            RenewalWeek::First => 1,
            RenewalWeek::Second => 8,
            RenewalWeek::Third => 15,
            RenewalWeek::Fourth => 22,
        }
    }

    /// Last day of the month covered by this week, given the month's length.
    #[must_use]
    pub fn last_day(self, days_in_month: u32) -> u32 {
        match self {
            RenewalWeek::First => 7,
            RenewalWeek::Second => 14,
            RenewalWeek::Third => 21,
            RenewalWeek::Fourth => days_in_month,
        }
    }
}

impl fmt::Display for RenewalWeek {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RenewalWeek::First => "1st week",
            RenewalWeek::Second => "2nd week",
            RenewalWeek::Third => "3rd week",
            RenewalWeek::Fourth => "last week",
        };
        formatter.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
/// Registration status, ordered the way it progresses as time advances.
pub enum RegistrationStatus {
    /// More than the threshold remains before expiration.
    Active,
    /// Expiration is today or within the threshold.
    ExpiringSoon,
    /// Expiration date lies in the past.
    Expired,
}

impl RegistrationStatus {
    /// All statuses in progression order.
    pub const ALL: [RegistrationStatus; 3] = [
        RegistrationStatus::Active,
        RegistrationStatus::ExpiringSoon,
        RegistrationStatus::Expired,
    ];
}

impl fmt::Display for RegistrationStatus {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RegistrationStatus::Active => "Active",
            RegistrationStatus::ExpiringSoon => "Expiring Soon",
            RegistrationStatus::Expired => "Expired",
        };
        formatter.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Expiration details derived for one record at one point in time.
pub struct ExpirationInfo {
    /// Digits the schedule was looked up with.
    pub coding_digits: CodingDigits,
    /// Month the registration falls due in.
    pub assigned_month: Month,
    /// Week of `assigned_month` the registration falls due in.
    pub assigned_week: RenewalWeek,
    /// Last valid day of the current cycle.
    pub expiration_date: NaiveDate,
    /// `expiration_date` lies before the evaluation date.
    pub is_expired: bool,
    /// Signed day count from the evaluation date to `expiration_date`.
    pub days_until_expiration: i64,
    /// Derived status.
    pub status: RegistrationStatus,
}

/// Parse a record date leniently, returning `None` for anything unrecognized.
#[must_use]
pub fn parse_record_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    RECORD_DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(trimmed)
                .ok()
                .map(|timestamp| timestamp.date_naive())
        })
        .or_else(|| {
            RECORD_DATETIME_FORMATS
                .iter()
                .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
                .map(|timestamp| timestamp.date())
        })
}

fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_option(LenientDateVisitor)
}

struct LenientDateVisitor;

impl<'de> Visitor<'de> for LenientDateVisitor {
    type Value = Option<NaiveDate>;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a date string or null")
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_any(self)
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
        let parsed = parse_record_date(value);
        if parsed.is_none() && !value.trim().is_empty() {
            warn!(value, "discarding unparsable record date");
        }
        Ok(parsed)
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
        warn!(value, "discarding numeric record date");
        Ok(None)
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
        warn!(value, "discarding numeric record date");
        Ok(None)
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
        warn!(value, "discarding numeric record date");
        Ok(None)
    }

    fn visit_bool<E: de::Error>(self, value: bool) -> Result<Self::Value, E> {
        warn!(value, "discarding boolean record date");
        Ok(None)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        while seq.next_element::<IgnoredAny>()?.is_some() {}
        warn!("discarding list-valued record date");
        Ok(None)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
        warn!("discarding object-valued record date");
        Ok(None)
    }
}
