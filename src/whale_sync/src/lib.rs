//! Whale count ingestion: fetch the daily sightings page, parse the counts
//! table, resolve species labels, and keep a per-day snapshot in SQLite that
//! only changes when the published content does.
//!
//! Flow: [`sighting_source::PageFetcher`] → [`parse::WhaleCountParser`] (labels
//! resolved through [`species::AliasIndex`]) → [`report::ParsedReport`] →
//! [`checksum::checksum`] → [`ingest::Ingestor`] → [`store::SnapshotStore`].

#![deny(missing_docs)]

pub mod checksum;
pub mod config;
pub mod db;
pub mod ingest;
pub mod models;
pub mod normalize;
pub mod parse;
pub mod report;
pub mod schedule;
/// Diesel table definitions for the embedded migrations.
#[allow(missing_docs)]
pub mod schema;
pub mod species;
pub mod store;
