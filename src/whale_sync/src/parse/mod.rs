//! Table extraction and row parsing for the whale count page.
//!
//! [`WhaleCountParser`] turns a fetched page into one [`ParsedReport`] per
//! data row. Nothing below the page level is an error: a missing table yields
//! no reports, and malformed rows or observation segments are dropped and
//! counted in [`ParseStats`].

pub mod observations;
pub mod row;
pub mod table;

use std::{collections::BTreeSet, sync::Arc};

use scraper::Html;
use sighting_source::Document;

use crate::{
    models::ReportStatus,
    report::ParsedReport,
    species::AliasIndex,
};

/// Counts of what a parse dropped. Diagnostic only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseStats {
    /// Whether a counts table was found at all.
    pub table_found: bool,
    /// Data rows seen in the table.
    pub rows_seen: usize,
    /// Rows with fewer than three cells.
    pub short_rows: usize,
    /// Rows whose date did not parse.
    pub bad_dates: usize,
    /// Rows whose tour count did not parse.
    pub bad_tours: usize,
    /// Observation segments that were not `<count> <label>`.
    pub malformed_segments: usize,
    /// Observation segments whose label did not resolve.
    pub unresolved_labels: usize,
    /// Distinct unresolved labels, normalized.
    pub unresolved: BTreeSet<String>,
}

impl ParseStats {
    /// Rows skipped for any reason.
    pub fn rows_skipped(&self) -> usize {
        self.short_rows + self.bad_dates + self.bad_tours
    }

    /// Observation segments dropped for any reason.
    pub fn segments_dropped(&self) -> usize {
        self.malformed_segments + self.unresolved_labels
    }
}

/// Parser for the "Recent Counts" table.
#[derive(Clone)]
pub struct WhaleCountParser {
    index: Arc<AliasIndex>,
}

impl WhaleCountParser {
    /// Creates a parser resolving labels through `index`.
    pub fn new(index: Arc<AliasIndex>) -> Self {
        Self { index }
    }

    /// The alias index this parser resolves through.
    pub fn index(&self) -> &Arc<AliasIndex> {
        &self.index
    }

    /// Parses a fetched page; reports carry the requested URL as their source.
    pub fn parse(&self, doc: &Document) -> Vec<ParsedReport> {
        self.parse_html(&doc.html, &doc.url).0
    }

    /// Parses raw HTML, returning the reports and what was dropped.
    pub fn parse_html(&self, html: &str, source_url: &str) -> (Vec<ParsedReport>, ParseStats) {
        let doc = Html::parse_document(html);
        let mut stats = ParseStats::default();

        let Some(table) = table::find_counts_table(&doc) else {
            tracing::info!(source_url, "no counts table on page");
            return (Vec::new(), stats);
        };
        stats.table_found = true;

        let mut reports = Vec::new();
        for cells in table::data_rows(table) {
            stats.rows_seen += 1;
            let [date, tours, detail, ..] = cells.as_slice() else {
                stats.short_rows += 1;
                continue;
            };
            let Some(date) = row::parse_date(date) else {
                tracing::debug!(date = %date, "skipping row with bad date");
                stats.bad_dates += 1;
                continue;
            };
            let Some(tours) = row::parse_tours(tours) else {
                tracing::debug!(%date, tours = %tours, "skipping row with bad tour count");
                stats.bad_tours += 1;
                continue;
            };

            let status = row::parse_status(detail);
            let observations = match status {
                ReportStatus::BadWeather => Vec::new(),
                ReportStatus::Ok => observations::parse_observations(detail, &self.index, &mut stats),
            };
            reports.push(ParsedReport::new(date, tours, status, observations, source_url));
        }

        tracing::info!(
            source_url,
            reports = reports.len(),
            rows_skipped = stats.rows_skipped(),
            segments_dropped = stats.segments_dropped(),
            unresolved = ?stats.unresolved,
            "parsed counts table"
        );
        (reports, stats)
    }
}
