//! Ingest orchestration: fetch, parse, then write only the days that changed.
//!
//! For every parsed day the orchestrator derives a checksum from the canonical
//! form and compares it with the stored one. Equal checksums mean no writes at
//! all, so re-ingesting an unchanged page touches nothing (not even
//! `fetched_at`). Changed or new days are written in their own
//! `BEGIN IMMEDIATE` transaction; a failing day rolls back alone and the rest
//! of the run continues.

use std::{fmt, sync::Arc, time::Instant};

use chrono::{DateTime, NaiveDate, Utc};
use diesel::SqliteConnection;
use sighting_source::{FetchError, PageFetcher};
use tracing::{debug, info, warn};

use crate::{
    checksum::checksum,
    parse::{ParseStats, WhaleCountParser},
    report::ParsedReport,
    species::AliasIndex,
    store::{SnapshotStore, SqliteSnapshotStore},
};

/// What one run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestSummary {
    /// URL that was fetched.
    pub source_url: String,
    /// Reports parsed from the page.
    pub parsed: usize,
    /// Days whose checksum matched the stored one.
    pub unchanged: usize,
    /// Days inserted or rewritten.
    pub written: usize,
    /// Days whose write failed and rolled back.
    pub failed: usize,
    /// Rows and segments the parser dropped.
    pub parse_stats: ParseStats,
}

impl fmt::Display for IngestSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: parsed={} written={} unchanged={} failed={} rows_skipped={} segments_dropped={}",
            self.source_url,
            self.parsed,
            self.written,
            self.unchanged,
            self.failed,
            self.parse_stats.rows_skipped(),
            self.parse_stats.segments_dropped(),
        )
    }
}

/// A day whose write failed.
#[derive(Debug)]
pub struct DateFailure {
    /// Calendar date of the failed day.
    pub date: NaiveDate,
    /// Underlying storage error.
    pub error: anyhow::Error,
}

impl fmt::Display for DateFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {:#}", self.date, self.error)
    }
}

/// Errors that end an ingest run.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// The page could not be fetched; nothing was written.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// One or more changed days failed to persist. Every other day was still
    /// attempted; `summary` covers the whole run.
    #[error("{failed} of {attempted} changed days failed to persist", failed = .failures.len())]
    Persist {
        /// Days that needed a write.
        attempted: usize,
        /// Days whose write rolled back.
        failures: Vec<DateFailure>,
        /// Counts for the run, including the successful days.
        summary: IngestSummary,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DayOutcome {
    Unchanged,
    Written,
}

/// Runs fetch → parse → per-day compare-and-write.
pub struct Ingestor<S = SqliteSnapshotStore> {
    fetcher: Arc<dyn PageFetcher>,
    parser: WhaleCountParser,
    store: S,
    default_url: String,
}

impl Ingestor<SqliteSnapshotStore> {
    /// Creates an ingestor writing through [`SqliteSnapshotStore`].
    pub fn new(fetcher: Arc<dyn PageFetcher>, index: Arc<AliasIndex>, default_url: impl Into<String>) -> Self {
        Self::with_store(fetcher, index, SqliteSnapshotStore::new(), default_url)
    }
}

impl<S: SnapshotStore> Ingestor<S> {
    /// Creates an ingestor with a custom store.
    pub fn with_store(
        fetcher: Arc<dyn PageFetcher>,
        index: Arc<AliasIndex>,
        store: S,
        default_url: impl Into<String>,
    ) -> Self {
        Self {
            fetcher,
            parser: WhaleCountParser::new(index),
            store,
            default_url: default_url.into(),
        }
    }

    /// URL used by [`Ingestor::ingest`].
    pub fn default_url(&self) -> &str {
        &self.default_url
    }

    /// Ingests the default source.
    pub async fn ingest(&self, conn: &mut SqliteConnection) -> Result<IngestSummary, IngestError> {
        self.ingest_url(conn, &self.default_url).await
    }

    /// Ingests `url`.
    ///
    /// A fetch failure is returned as-is before anything is written. A page
    /// without a counts table completes with an empty summary.
    pub async fn ingest_url(&self, conn: &mut SqliteConnection, url: &str) -> Result<IngestSummary, IngestError> {
        let started = Instant::now();
        info!(url, "ingest started");

        let doc = self.fetcher.fetch(url).await?;
        let (reports, parse_stats) = self.parser.parse_html(&doc.html, url);

        let mut summary = IngestSummary {
            source_url: url.to_string(),
            parsed: reports.len(),
            parse_stats,
            ..Default::default()
        };
        if reports.is_empty() {
            info!(url, "no reports parsed; nothing to write");
            return Ok(summary);
        }

        let fetched_at = Utc::now();
        let mut failures = Vec::new();
        for report in &reports {
            match self.sync_day(conn, report, fetched_at) {
                Ok(DayOutcome::Unchanged) => summary.unchanged += 1,
                Ok(DayOutcome::Written) => summary.written += 1,
                Err(error) => {
                    warn!(date = %report.date(), error = ?error, "day failed to persist");
                    failures.push(DateFailure {
                        date: report.date(),
                        error,
                    });
                }
            }
        }
        summary.failed = failures.len();

        info!(
            url,
            parsed = summary.parsed,
            written = summary.written,
            unchanged = summary.unchanged,
            failed = summary.failed,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "ingest finished"
        );

        if failures.is_empty() {
            Ok(summary)
        } else {
            Err(IngestError::Persist {
                attempted: summary.written + failures.len(),
                failures,
                summary,
            })
        }
    }

    /// Compare-and-write for one day, all inside one immediate transaction.
    fn sync_day(
        &self,
        conn: &mut SqliteConnection,
        report: &ParsedReport,
        fetched_at: DateTime<Utc>,
    ) -> anyhow::Result<DayOutcome> {
        let new_checksum = checksum(report.canonical());
        conn.immediate_transaction::<_, anyhow::Error, _>(|conn| {
            if self.store.stored_checksum(conn, report.date())? == Some(new_checksum) {
                debug!(date = %report.date(), "unchanged");
                return Ok(DayOutcome::Unchanged);
            }
            self.store.upsert_day(conn, report, new_checksum, fetched_at)?;
            let n = self
                .store
                .replace_observations(conn, report.date(), report.observations())?;
            info!(
                date = %report.date(),
                status = %report.status(),
                observations = n,
                checksum = %new_checksum,
                "day written"
            );
            Ok(DayOutcome::Written)
        })
    }
}
