//! Species catalog models.
//!
//! These types mirror the catalog tables and are used to load the alias index
//! and to seed/sync the catalog:
//! - [`crate::schema::species`]: species registry (id, group, names)
//! - [`crate::schema::species_alias`]: free-text labels that resolve to a species
//!
//! The ingest path only ever reads these tables.

use std::{fmt, str::FromStr};

use diesel::prelude::*;
use serde::{Deserialize, Serialize};

/// Sighting group tag of a species.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SightingGroup {
    /// Whales.
    Whale,
    /// Dolphins.
    Dolphin,
    /// Sharks.
    Shark,
    /// Fish (e.g. ocean sunfish).
    Fish,
    /// Anything else.
    Other,
}

impl SightingGroup {
    /// Lowercase storage name.
    pub fn as_str(self) -> &'static str {
        match self {
            SightingGroup::Whale => "whale",
            SightingGroup::Dolphin => "dolphin",
            SightingGroup::Shark => "shark",
            SightingGroup::Fish => "fish",
            SightingGroup::Other => "other",
        }
    }
}

impl fmt::Display for SightingGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SightingGroup {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "whale" => Ok(SightingGroup::Whale),
            "dolphin" => Ok(SightingGroup::Dolphin),
            "shark" => Ok(SightingGroup::Shark),
            "fish" => Ok(SightingGroup::Fish),
            "other" => Ok(SightingGroup::Other),
            other => anyhow::bail!("unknown sighting group: {other}"),
        }
    }
}

/// A species with its aliases, as the alias index consumes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Species {
    /// Stable identifier (e.g. "humpback-whale").
    pub id: String,
    /// Group tag.
    pub group: SightingGroup,
    /// Display name.
    pub common_name: String,
    /// Scientific name, if known.
    pub binomial_name: Option<String>,
    /// Free-text labels resolving to this species.
    pub aliases: Vec<String>,
}

// ----------------------- species ------------------------

/// A row in [`crate::schema::species`](crate::schema::species).
#[derive(Debug, Queryable, Identifiable, Selectable)]
#[diesel(table_name = crate::schema::species)]
#[diesel(primary_key(id))]
pub struct SpeciesRow {
    /// Species id (primary key), e.g. "fin-whale".
    pub id: String,
    /// Group tag: "whale" | "dolphin" | "shark" | "fish" | "other".
    pub grp: String,
    /// Display name.
    pub common_name: String,
    /// Scientific name.
    pub binomial_name: Option<String>,
    /// Row creation timestamp.
    pub created_at: String,
    /// Row update timestamp.
    pub updated_at: String,
}

/// Insertable/changeset form of [`SpeciesRow`].
#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = crate::schema::species)]
#[diesel(treat_none_as_null = true)]
pub struct NewSpecies<'a> {
    /// Species id.
    pub id: &'a str,
    /// Group tag.
    pub grp: &'a str,
    /// Display name.
    pub common_name: &'a str,
    /// Scientific name.
    pub binomial_name: Option<&'a str>,
}

// -------------------- species_alias ---------------------
// Composite PK => must declare both columns.

/// A row in [`crate::schema::species_alias`](crate::schema::species_alias).
#[derive(Debug, Queryable, Identifiable, Selectable)]
#[diesel(table_name = crate::schema::species_alias)]
#[diesel(primary_key(species_id, alias))]
pub struct SpeciesAliasRow {
    /// Foreign key to [`SpeciesRow::id`].
    pub species_id: String,
    /// Alias text as entered in the catalog (not normalized).
    pub alias: String,
}

/// Insertable form of [`SpeciesAliasRow`].
#[derive(Debug, Insertable)]
#[diesel(table_name = crate::schema::species_alias)]
pub struct NewSpeciesAlias<'a> {
    /// Foreign key to [`SpeciesRow::id`].
    pub species_id: &'a str,
    /// Alias text.
    pub alias: &'a str,
}
