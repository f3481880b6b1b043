//! Diesel models mapping to the database schema.
//!
//! These types mirror the tables defined in the embedded migrations and in
//! [`crate::schema`] for use with Diesel’s Queryable/Insertable APIs:
//! - [`crate::schema::daily_report`]: one row per published calendar date
//! - [`crate::schema::observation`]: per-date, per-species sighting counts
//! - species catalog tables live in [`species`]
//!
//! Dates are stored as `YYYY-MM-DD` text and timestamps as RFC3339 UTC text.
//! See migrations for constraints and triggers (`updated_at` triggers, `ON DELETE
//! CASCADE` from observation to daily_report, `ON DELETE RESTRICT` to species).

pub mod species;

use std::{fmt, str::FromStr};

use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::*;

/// Outcome of one day's tours as published by the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    /// Tours ran; the detail column lists sightings.
    Ok,
    /// Tours were cancelled. Never carries observations.
    BadWeather,
}

impl ReportStatus {
    /// Lowercase storage/canonical name.
    pub fn as_str(self) -> &'static str {
        match self {
            ReportStatus::Ok => "ok",
            ReportStatus::BadWeather => "bad_weather",
        }
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ok" => Ok(ReportStatus::Ok),
            "bad_weather" => Ok(ReportStatus::BadWeather),
            other => anyhow::bail!("unknown report status: {other}"),
        }
    }
}

/// A row in [`crate::schema::daily_report`].
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Identifiable, Selectable)]
#[diesel(table_name = daily_report, primary_key(report_date))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct DailyReportRow {
    /// Calendar date, `YYYY-MM-DD` (primary key).
    pub report_date: String,
    /// Number of tours run that day.
    pub tours: i32,
    /// "ok" | "bad_weather".
    pub status: String,
    /// When this content was fetched (RFC3339 UTC).
    pub fetched_at: String,
    /// Page the row was read from.
    pub source_url: String,
    /// Hyphenated UUID fingerprint of the canonical form.
    pub checksum: String,
    /// Optimistic concurrency counter; bumped on every content change.
    pub version: i32,
    /// Row creation timestamp (RFC3339 UTC).
    pub created_at: String,
    /// Row update timestamp (maintained by trigger on UPDATE).
    pub updated_at: String,
}

/// Insertable/changeset form of [`DailyReportRow`] used by the snapshot store.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = daily_report)]
pub struct NewDailyReport<'a> {
    /// Calendar date, `YYYY-MM-DD`.
    pub report_date: &'a str,
    /// Number of tours run that day.
    pub tours: i32,
    /// "ok" | "bad_weather".
    pub status: &'a str,
    /// RFC3339 UTC fetch timestamp.
    pub fetched_at: &'a str,
    /// Source page URL.
    pub source_url: &'a str,
    /// Hyphenated UUID fingerprint.
    pub checksum: &'a str,
}

/// A row in [`crate::schema::observation`].
#[derive(Debug, Clone, PartialEq, Eq, Queryable, Identifiable, Selectable)]
#[diesel(table_name = observation, primary_key(report_date, species_id))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ObservationRow {
    /// FK to [`DailyReportRow::report_date`].
    pub report_date: String,
    /// FK to [`species::SpeciesRow::id`].
    pub species_id: String,
    /// Individuals counted.
    pub individuals: i32,
}

/// Insertable form of [`ObservationRow`].
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = observation)]
pub struct NewObservation<'a> {
    /// FK to the parent day.
    pub report_date: &'a str,
    /// FK to the species catalog.
    pub species_id: &'a str,
    /// Individuals counted.
    pub individuals: i32,
}
