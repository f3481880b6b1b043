//! Species catalog configuration: parsing, normalization, and loading.
//!
//! The catalog is a TOML document keyed by species id:
//!
//! ```toml
//! [species.humpback-whale]
//! group = "whale"
//! common_name = "Humpback Whale"
//! binomial_name = "Megaptera novaeangliae"
//! aliases = ["humpback", "humpback whale", "humpbacks"]
//! ```
//!
//! Key behaviors:
//! - Ids are trimmed and lowercased; collisions after normalization are errors.
//! - Aliases are trimmed, blank ones dropped, and duplicates (compared by their
//!   [`normalize`](crate::normalize::normalize)d key) removed while preserving order.
//! - An alias key claimed by two species is reported, not rejected; the alias
//!   index keeps whichever species it reads last.
//!
//! Entrypoints:
//! - Parse + normalize from a TOML string: [`load_catalog_str`]
//! - Parse + normalize from a file path: [`load_catalog_path`]

use std::collections::{HashMap, HashSet};

use anyhow::{Context, bail};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use toml::from_str;

use crate::{
    models::species::{SightingGroup, Species},
    normalize::normalize,
};

/// Top-level catalog mapping species ids to their configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SpeciesCatalog {
    /// Map of species id -> configuration.
    pub species: IndexMap<String, SpeciesCfg>,
}

/// Configuration payload for one species.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SpeciesCfg {
    /// Group tag.
    pub group: SightingGroup,
    /// Display name.
    pub common_name: String,
    /// Scientific name.
    pub binomial_name: Option<String>,
    /// Free-text labels that should resolve to this species.
    #[serde(default)]
    pub aliases: Vec<String>,
}

/// Summary of changes performed during normalization.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct NormalizationReport {
    /// Number of species ids that changed when lowercasing/trimming.
    pub ids_renamed: usize,
    /// Blank aliases removed.
    pub blank_aliases_dropped: usize,
    /// Aliases removed because another alias of the same species normalizes to the same key.
    pub aliases_deduped: usize,
    /// Normalized alias keys listed under more than one species.
    pub aliases_shared: Vec<String>,
}

/// Normalize a catalog in-place.
///
/// Errors:
/// - Empty or duplicate species ids after normalization
/// - Empty common names after trimming
pub fn normalize_catalog(cat: &mut SpeciesCatalog) -> anyhow::Result<NormalizationReport> {
    let mut report = NormalizationReport::default();
    let mut rebuilt: IndexMap<String, SpeciesCfg> = IndexMap::new();
    let mut owners: HashMap<String, String> = HashMap::new();

    for (raw_id, mut cfg) in std::mem::take(&mut cat.species) {
        let id = raw_id.trim().to_lowercase();
        if id.is_empty() {
            bail!("species id cannot be empty after trimming");
        }
        if id != raw_id {
            report.ids_renamed += 1;
        }
        if rebuilt.contains_key(&id) {
            bail!("duplicate species id after normalization: {id}");
        }

        cfg.common_name = cfg.common_name.trim().to_string();
        if cfg.common_name.is_empty() {
            bail!("species {id}: common_name cannot be empty");
        }
        cfg.binomial_name = cfg
            .binomial_name
            .map(|b| b.trim().to_string())
            .filter(|b| !b.is_empty());

        let mut seen = HashSet::new();
        let mut aliases = Vec::with_capacity(cfg.aliases.len());
        for alias in std::mem::take(&mut cfg.aliases) {
            let alias = alias.trim().to_string();
            if alias.is_empty() {
                report.blank_aliases_dropped += 1;
                continue;
            }
            let key = normalize(&alias);
            if !seen.insert(key.clone()) {
                report.aliases_deduped += 1;
                continue;
            }
            if let Some(prev) = owners.insert(key.clone(), id.clone()) {
                if prev != id {
                    report.aliases_shared.push(key);
                }
            }
            aliases.push(alias);
        }
        cfg.aliases = aliases;
        rebuilt.insert(id, cfg);
    }

    cat.species = rebuilt;
    Ok(report)
}

impl SpeciesCatalog {
    /// Flattens the catalog into [`Species`] values in file order.
    pub fn to_species(&self) -> Vec<Species> {
        self.species
            .iter()
            .map(|(id, cfg)| Species {
                id: id.clone(),
                group: cfg.group,
                common_name: cfg.common_name.clone(),
                binomial_name: cfg.binomial_name.clone(),
                aliases: cfg.aliases.clone(),
            })
            .collect()
    }
}

/// Parse and normalize a catalog from a TOML string.
pub fn load_catalog_str(toml_str: &str) -> anyhow::Result<SpeciesCatalog> {
    let mut cat: SpeciesCatalog = from_str(toml_str).context("failed to parse species catalog TOML")?;
    let report = normalize_catalog(&mut cat).context("normalize species catalog")?;
    if !report.aliases_shared.is_empty() {
        tracing::warn!(aliases = ?report.aliases_shared, "aliases listed under more than one species");
    }
    Ok(cat)
}

/// Read a catalog TOML file from disk, parse, and normalize it.
pub fn load_catalog_path(path: impl AsRef<std::path::Path>) -> anyhow::Result<SpeciesCatalog> {
    let text = std::fs::read_to_string(path.as_ref())
        .with_context(|| format!("read species catalog {}", path.as_ref().display()))?;
    load_catalog_str(&text)
}
