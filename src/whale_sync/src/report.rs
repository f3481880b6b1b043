//! Parsed per-day reports and their canonical form.
//!
//! A [`ParsedReport`] is built once per table row and never mutated. Building it
//! sorts observations by species id and renders the canonical JSON string that
//! [`crate::checksum`] fingerprints, so two rows with the same content always
//! produce the same checksum no matter how the source ordered the sightings.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::ReportStatus;

/// One resolved sighting: a catalog species and how many were counted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParsedObservation {
    /// Catalog id, as produced by the alias index.
    pub species_id: String,
    /// Individuals counted.
    pub individuals: u32,
}

impl ParsedObservation {
    /// Convenience constructor.
    pub fn new(species_id: impl Into<String>, individuals: u32) -> Self {
        Self {
            species_id: species_id.into(),
            individuals,
        }
    }
}

/// One calendar day read from the source table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedReport {
    date: NaiveDate,
    tours: u32,
    status: ReportStatus,
    observations: Vec<ParsedObservation>,
    source_url: String,
    canonical: String,
}

#[derive(Serialize)]
struct CanonicalObservation<'a> {
    #[serde(rename = "speciesId")]
    species_id: &'a str,
    count: u32,
}

// Field order here is the key order of the canonical JSON.
#[derive(Serialize)]
struct Canonical<'a> {
    date: String,
    tours: u32,
    status: &'static str,
    observations: Vec<CanonicalObservation<'a>>,
}

impl ParsedReport {
    /// Builds a report, sorting observations and rendering the canonical string.
    ///
    /// Observations naming the same species are merged by summing their counts.
    /// A [`ReportStatus::BadWeather`] report always ends up with no observations.
    pub fn new(
        date: NaiveDate,
        tours: u32,
        status: ReportStatus,
        observations: impl IntoIterator<Item = ParsedObservation>,
        source_url: impl Into<String>,
    ) -> Self {
        let observations = match status {
            ReportStatus::BadWeather => Vec::new(),
            ReportStatus::Ok => merge_sorted(observations),
        };
        let canonical = render_canonical(date, tours, status, &observations);
        Self {
            date,
            tours,
            status,
            observations,
            source_url: source_url.into(),
            canonical,
        }
    }

    /// Calendar date of the row.
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Tours run that day.
    pub fn tours(&self) -> u32 {
        self.tours
    }

    /// Row status.
    pub fn status(&self) -> ReportStatus {
        self.status
    }

    /// Observations sorted ascending by species id.
    pub fn observations(&self) -> &[ParsedObservation] {
        &self.observations
    }

    /// Page the row came from.
    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    /// Deterministic serialization used for change detection.
    pub fn canonical(&self) -> &str {
        &self.canonical
    }
}

fn merge_sorted(observations: impl IntoIterator<Item = ParsedObservation>) -> Vec<ParsedObservation> {
    let mut by_species: BTreeMap<String, u32> = BTreeMap::new();
    for o in observations {
        let total = by_species.entry(o.species_id).or_insert(0);
        *total = total.saturating_add(o.individuals);
    }
    by_species
        .into_iter()
        .map(|(species_id, individuals)| ParsedObservation {
            species_id,
            individuals,
        })
        .collect()
}

fn render_canonical(
    date: NaiveDate,
    tours: u32,
    status: ReportStatus,
    observations: &[ParsedObservation],
) -> String {
    let doc = Canonical {
        date: date.format("%Y-%m-%d").to_string(),
        tours,
        status: status.as_str(),
        observations: observations
            .iter()
            .map(|o| CanonicalObservation {
                species_id: &o.species_id,
                count: o.individuals,
            })
            .collect(),
    };
    serde_json::to_string(&doc).unwrap_or_else(|_| {
        let obs: Vec<String> = observations
            .iter()
            .map(|o| format!("{}={}", o.species_id, o.individuals))
            .collect();
        format!("{}|{}|{}|{}", doc.date, tours, status, obs.join(","))
    })
}
