#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Occurrence record, type, status and severity definitions.
//!
//! Occurrences are safety incidents reported by the upstream detection
//! pipeline. The upstream feed carries free-form `tipoOcorrencia` and
//! `status` strings; this crate maps them onto closed enums with explicit
//! default arms so that unknown values never reach the aggregation engine
//! as errors.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Timestamp of an occurrence as it appears on the wire.
///
/// The backend normally sends ISO-8601 strings, but some fallback payloads
/// carry epoch milliseconds as a JSON number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawTimestamp {
    /// Epoch milliseconds.
    EpochMillis(i64),
    /// ISO-8601 text.
    Text(String),
}

impl RawTimestamp {
    /// Resolves the raw value to an instant. Returns `None` when the value
    /// cannot be interpreted as a point in time.
    #[must_use]
    pub fn instant(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::EpochMillis(millis) => DateTime::from_timestamp_millis(*millis),
            Self::Text(text) => parse_timestamp(text),
        }
    }
}

impl From<DateTime<Utc>> for RawTimestamp {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Text(value.to_rfc3339())
    }
}

impl From<&str> for RawTimestamp {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Parses an ISO-8601 timestamp string.
///
/// Accepts RFC 3339 with an explicit offset, naive date-times with optional
/// fractional seconds (interpreted as UTC), and bare dates (midnight UTC).
#[must_use]
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }
    None
}

/// A single occurrence as delivered by the data source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccurrenceRecord {
    /// Short human-readable title.
    #[serde(rename = "titulo", alias = "title")]
    pub title: String,
    /// Upstream type code (e.g. `"FURTO"`), kept verbatim.
    #[serde(rename = "tipoOcorrencia", alias = "occurrenceType")]
    pub occurrence_type: String,
    /// Upstream status string, kept verbatim.
    pub status: String,
    /// When the occurrence was detected.
    #[serde(rename = "data", alias = "timestamp")]
    pub timestamp: RawTimestamp,
}

impl OccurrenceRecord {
    /// Creates a record from its parts.
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        occurrence_type: impl Into<String>,
        status: impl Into<String>,
        timestamp: impl Into<RawTimestamp>,
    ) -> Self {
        Self {
            title: title.into(),
            occurrence_type: occurrence_type.into(),
            status: status.into(),
            timestamp: timestamp.into(),
        }
    }

    /// The parsed timestamp, or `None` if it is malformed.
    #[must_use]
    pub fn instant(&self) -> Option<DateTime<Utc>> {
        self.timestamp.instant()
    }

    /// The known type of this occurrence, if the code is recognized.
    #[must_use]
    pub fn known_type(&self) -> Option<OccurrenceType> {
        OccurrenceType::from_code(&self.occurrence_type)
    }

    /// Severity inferred from the occurrence type.
    #[must_use]
    pub fn severity(&self) -> Severity {
        Severity::for_type_code(&self.occurrence_type)
    }
}

/// Risk tier inferred from the occurrence type.
///
/// The time-series feed has no severity field, so this is always derived.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(ascii_case_insensitive)]
pub enum Severity {
    #[strum(to_string = "LOW", serialize = "BAIXA")]
    Low,
    #[strum(to_string = "MEDIUM", serialize = "MEDIA")]
    Medium,
    #[strum(to_string = "HIGH", serialize = "ALTA")]
    High,
    #[strum(to_string = "CRITICAL", serialize = "CRITICA")]
    Critical,
}

impl Severity {
    /// Severity for a raw type code. Unknown codes are [`Self::Low`].
    #[must_use]
    pub fn for_type_code(code: &str) -> Self {
        OccurrenceType::from_code(code).map_or(Self::Low, OccurrenceType::severity)
    }

    /// All severities in ascending order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Low, Self::Medium, Self::High, Self::Critical]
    }
}

/// Occurrence types known to the upstream system.
///
/// `Display` yields the upstream code; English names are accepted when
/// parsing.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OccurrenceType {
    /// Harassment reported on a vehicle or platform
    #[serde(rename = "ASSEDIO")]
    #[strum(to_string = "ASSEDIO", serialize = "HARASSMENT")]
    Harassment,
    /// Violent incident
    #[serde(rename = "VIOLENCIA")]
    #[strum(to_string = "VIOLENCIA", serialize = "VIOLENCE")]
    Violence,
    /// Theft of property or equipment
    #[serde(rename = "FURTO")]
    #[strum(to_string = "FURTO", serialize = "THEFT")]
    Theft,
    /// Damage to property
    #[serde(rename = "VANDALISMO")]
    #[strum(to_string = "VANDALISMO", serialize = "VANDALISM")]
    Vandalism,
    /// Suspicious behavior
    #[serde(rename = "SUSPEITA")]
    #[strum(to_string = "SUSPEITA", serialize = "SUSPICIOUS")]
    Suspicious,
    /// Physical aggression
    #[serde(rename = "AGRESSAO")]
    #[strum(to_string = "AGRESSAO", serialize = "AGGRESSION")]
    Aggression,
    /// Unauthorized street vendor
    #[serde(rename = "VENDEDOR_AMBULANTE")]
    #[strum(to_string = "VENDEDOR_AMBULANTE", serialize = "UNAUTHORIZED_VENDOR")]
    UnauthorizedVendor,
    /// Unattended or suspicious object
    #[serde(rename = "OBJETOS_SUSPEITOS")]
    #[strum(to_string = "OBJETOS_SUSPEITOS", serialize = "SUSPICIOUS_OBJECT")]
    SuspiciousObject,
    /// Disturbance of the peace
    #[serde(rename = "PERTURBACAO")]
    #[strum(to_string = "PERTURBACAO", serialize = "DISTURBANCE")]
    Disturbance,
    /// Accident
    #[serde(rename = "ACIDENTE")]
    #[strum(to_string = "ACIDENTE", serialize = "ACCIDENT")]
    Accident,
    /// Equipment or system failure
    #[serde(rename = "FALHA_TECNICA")]
    #[strum(to_string = "FALHA_TECNICA", serialize = "TECHNICAL_FAILURE")]
    TechnicalFailure,
    /// Generic incident
    #[serde(rename = "INCIDENTE")]
    #[strum(to_string = "INCIDENTE", serialize = "INCIDENT")]
    Incident,
    /// Anything else
    #[serde(rename = "OUTROS")]
    #[strum(to_string = "OUTROS", serialize = "OTHER")]
    Other,
}

impl OccurrenceType {
    /// Parses an upstream type code. Matching is exact; returns `None` for
    /// codes outside the known set, including differently cased ones.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        code.parse().ok()
    }

    /// Returns the inferred severity for this type.
    #[must_use]
    pub const fn severity(self) -> Severity {
        match self {
            Self::Violence => Severity::Critical,
            Self::Harassment => Severity::High,
            Self::Theft | Self::Suspicious => Severity::Medium,
            Self::Vandalism
            | Self::Aggression
            | Self::UnauthorizedVendor
            | Self::SuspiciousObject
            | Self::Disturbance
            | Self::Accident
            | Self::TechnicalFailure
            | Self::Incident
            | Self::Other => Severity::Low,
        }
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Harassment,
            Self::Violence,
            Self::Theft,
            Self::Vandalism,
            Self::Suspicious,
            Self::Aggression,
            Self::UnauthorizedVendor,
            Self::SuspiciousObject,
            Self::Disturbance,
            Self::Accident,
            Self::TechnicalFailure,
            Self::Incident,
            Self::Other,
        ]
    }
}

/// Canonical occurrence status used by the by-status chart.
///
/// `Display` yields the upstream code.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum OccurrenceStatus {
    #[serde(rename = "ABERTO")]
    #[strum(to_string = "ABERTO", serialize = "OPEN")]
    Open,
    #[serde(rename = "EM_ANDAMENTO")]
    #[strum(to_string = "EM_ANDAMENTO", serialize = "IN_PROGRESS")]
    InProgress,
    #[serde(rename = "RESOLVIDO")]
    #[strum(
        to_string = "RESOLVIDO",
        serialize = "RESOLVED",
        serialize = "CONCLUIDO",
        serialize = "COMPLETED"
    )]
    Resolved,
    #[serde(rename = "FECHADO")]
    #[strum(to_string = "FECHADO", serialize = "CLOSED")]
    Closed,
}

impl OccurrenceStatus {
    /// Maps a raw upstream status through the normalization table.
    ///
    /// Matching is exact. Returns `None` for statuses outside the table
    /// (`"aberto"` included); the by-status chart drops those records.
    #[must_use]
    pub fn from_raw(raw: &str) -> Option<Self> {
        raw.parse().ok()
    }

    /// All statuses in chart order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Open, Self::InProgress, Self::Resolved, Self::Closed]
    }
}

/// Coarse status classes used by the statistics panel.
///
/// Unlike [`OccurrenceStatus::from_raw`], classification is total: every
/// status string lands in exactly one class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum StatisticsBucket {
    Resolved,
    InProgress,
    Open,
}

impl StatisticsBucket {
    /// Classifies a raw status string.
    ///
    /// The status is lowercased and inner whitespace/hyphens become
    /// underscores before lookup. Anything unrecognized is [`Self::Open`].
    #[must_use]
    pub fn classify(raw: &str) -> Self {
        let normalized = normalize_status(raw);
        match normalized.as_str() {
            "resolvido" | "resolvida" | "resolved" | "concluido" | "concluida" | "completed"
            | "complete" | "done" | "solucionado" => Self::Resolved,
            "em_andamento" | "andamento" | "em_progresso" | "em_analise" | "in_progress"
            | "progress" | "ongoing" | "processing" => Self::InProgress,
            _ => Self::Open,
        }
    }
}

fn normalize_status(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .split(|c: char| c.is_whitespace() || c == '-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

/// Formats an enum-style code for display (`"VENDEDOR_AMBULANTE"` becomes
/// `"Vendedor Ambulante"`).
#[must_use]
pub fn display_label(code: &str) -> String {
    code.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let lower = word.to_lowercase();
            let mut chars = lower.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect::<String>()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}
