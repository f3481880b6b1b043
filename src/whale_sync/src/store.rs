//! Write side of the per-day snapshot (SQLite).
//!
//! A day is one `daily_report` row plus its full set of `observation` rows.
//! Children are never patched: every content change deletes the day's
//! observations and inserts the new set, inside the same `BEGIN IMMEDIATE`
//! transaction as the parent upsert.

use anyhow::Context;
use chrono::{DateTime, NaiveDate, Utc};
use diesel::{prelude::*, upsert::excluded};
use uuid::Uuid;

use crate::{
    models::{NewDailyReport, NewObservation},
    report::{ParsedObservation, ParsedReport},
    schema::{daily_report, observation},
};

/// Result type used by the snapshot store.
pub type StoreResult<T> = anyhow::Result<T>;

/// Storage date key, `YYYY-MM-DD`.
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Format a UTC datetime as an RFC-3339 string with millisecond precision.
pub fn to_rfc3339_millis(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// Portable surface, SQLite implementation below.
pub trait SnapshotStore {
    /// Checksum stored for `date`, if a row exists.
    ///
    /// A stored value that is not a UUID reads as `Some(Uuid::nil())` so the
    /// day counts as changed and gets rewritten.
    fn stored_checksum(&self, conn: &mut SqliteConnection, date: NaiveDate) -> StoreResult<Option<Uuid>>;

    /// Inserts or updates the parent row; bumps `version` on update.
    fn upsert_day(
        &self,
        conn: &mut SqliteConnection,
        report: &ParsedReport,
        checksum: Uuid,
        fetched_at: DateTime<Utc>,
    ) -> StoreResult<()>;

    /// Deletes every observation for `date`, then inserts `observations`.
    fn replace_observations(
        &self,
        conn: &mut SqliteConnection,
        date: NaiveDate,
        observations: &[ParsedObservation],
    ) -> StoreResult<usize>;

    /// Parent upsert then observation replace, atomically.
    fn write_snapshot(
        &self,
        conn: &mut SqliteConnection,
        report: &ParsedReport,
        checksum: Uuid,
        fetched_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        conn.immediate_transaction::<_, anyhow::Error, _>(|conn| {
            self.upsert_day(conn, report, checksum, fetched_at)?;
            self.replace_observations(conn, report.date(), report.observations())?;
            Ok(())
        })
    }
}

/// Snapshot store backed by the diesel schema in [`crate::schema`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteSnapshotStore;

impl SqliteSnapshotStore {
    /// Creates the store.
    pub fn new() -> Self {
        Self
    }
}

impl SnapshotStore for SqliteSnapshotStore {
    fn stored_checksum(&self, conn: &mut SqliteConnection, date: NaiveDate) -> StoreResult<Option<Uuid>> {
        let key = date_key(date);
        let stored: Option<String> = daily_report::table
            .filter(daily_report::report_date.eq(&key))
            .select(daily_report::checksum)
            .first(conn)
            .optional()
            .with_context(|| format!("read checksum for {key}"))?;

        Ok(stored.map(|s| {
            Uuid::parse_str(&s).unwrap_or_else(|_| {
                tracing::warn!(date = %key, checksum = %s, "stored checksum is not a uuid");
                Uuid::nil()
            })
        }))
    }

    fn upsert_day(
        &self,
        conn: &mut SqliteConnection,
        report: &ParsedReport,
        checksum: Uuid,
        fetched_at: DateTime<Utc>,
    ) -> StoreResult<()> {
        let key = date_key(report.date());
        let fetched_at = to_rfc3339_millis(fetched_at);
        let checksum = checksum.hyphenated().to_string();
        let tours = i32::try_from(report.tours()).context("tour count out of range")?;

        let row = NewDailyReport {
            report_date: &key,
            tours,
            status: report.status().as_str(),
            fetched_at: &fetched_at,
            source_url: report.source_url(),
            checksum: &checksum,
        };

        // INSERT .. ON CONFLICT (report_date) DO UPDATE .. version = version + 1
        diesel::insert_into(daily_report::table)
            .values(&row)
            .on_conflict(daily_report::report_date)
            .do_update()
            .set((
                daily_report::tours.eq(excluded(daily_report::tours)),
                daily_report::status.eq(excluded(daily_report::status)),
                daily_report::fetched_at.eq(excluded(daily_report::fetched_at)),
                daily_report::source_url.eq(excluded(daily_report::source_url)),
                daily_report::checksum.eq(excluded(daily_report::checksum)),
                daily_report::version.eq(daily_report::version + 1),
            ))
            .execute(conn)
            .with_context(|| format!("upsert daily_report {key}"))?;
        Ok(())
    }

    fn replace_observations(
        &self,
        conn: &mut SqliteConnection,
        date: NaiveDate,
        observations: &[ParsedObservation],
    ) -> StoreResult<usize> {
        let key = date_key(date);
        diesel::delete(observation::table.filter(observation::report_date.eq(&key)))
            .execute(conn)
            .with_context(|| format!("clear observations for {key}"))?;

        if observations.is_empty() {
            return Ok(0);
        }

        let rows = observations
            .iter()
            .map(|o| {
                Ok(NewObservation {
                    report_date: &key,
                    species_id: &o.species_id,
                    individuals: i32::try_from(o.individuals)
                        .with_context(|| format!("count out of range for {}", o.species_id))?,
                })
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        diesel::insert_into(observation::table)
            .values(&rows)
            .execute(conn)
            .with_context(|| format!("insert observations for {key}"))
    }
}
