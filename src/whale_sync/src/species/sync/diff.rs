use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
};

use crate::models::species::Species;

/// What needs to change to make DB == TOML.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpeciesDiff {
    /// Species that are new or whose group/names changed.
    pub species_upsert: BTreeMap<String, Species>,
    /// Species whose alias set changed: id -> full new alias list.
    pub aliases_replace: BTreeMap<String, Vec<String>>,
    /// Species present in the DB but absent from the catalog (prune only).
    pub species_delete: BTreeSet<String>,
}

impl SpeciesDiff {
    /// True if there is nothing to upsert or delete.
    pub fn is_noop(&self) -> bool {
        self.species_upsert.is_empty()
            && self.aliases_replace.is_empty()
            && self.species_delete.is_empty()
    }
}

impl fmt::Display for SpeciesDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut wrote_any = false;
        let mut section = |title: &str,
                           body: &mut dyn FnMut(&mut fmt::Formatter<'_>) -> fmt::Result|
         -> fmt::Result {
            if wrote_any {
                writeln!(f)?;
            }
            writeln!(f, "{title}")?;
            writeln!(f, "{}", "-".repeat(title.len()))?;
            body(f)?;
            wrote_any = true;
            Ok(())
        };

        if !self.species_upsert.is_empty() {
            section("Species (UPSERT)", &mut |f| {
                for (id, s) in &self.species_upsert {
                    writeln!(f, "+ {id}  [{}] \"{}\"", s.group, s.common_name)?;
                }
                Ok(())
            })?;
        }
        if !self.aliases_replace.is_empty() {
            section("Aliases (REPLACE)", &mut |f| {
                for (id, aliases) in &self.aliases_replace {
                    writeln!(f, "~ {id}: {}", aliases.join(", "))?;
                }
                Ok(())
            })?;
        }
        if !self.species_delete.is_empty() {
            section("Species (DELETE)", &mut |f| {
                for id in &self.species_delete {
                    writeln!(f, "- {id}")?;
                }
                Ok(())
            })?;
        }

        if !wrote_any {
            write!(f, "No changes")
        } else {
            Ok(())
        }
    }
}

fn same_row(a: &Species, b: &Species) -> bool {
    a.group == b.group && a.common_name == b.common_name && a.binomial_name == b.binomial_name
}

fn alias_set(s: &Species) -> BTreeSet<&str> {
    s.aliases.iter().map(String::as_str).collect()
}

/// Compares the wanted catalog with the current DB contents.
pub fn make_diff(
    wanted: &BTreeMap<String, Species>,
    current: &BTreeMap<String, Species>,
    prune: bool,
) -> SpeciesDiff {
    let mut d = SpeciesDiff::default();

    for (id, want) in wanted {
        match current.get(id) {
            Some(have) => {
                if !same_row(want, have) {
                    d.species_upsert.insert(id.clone(), want.clone());
                }
                if alias_set(want) != alias_set(have) {
                    d.aliases_replace.insert(id.clone(), want.aliases.clone());
                }
            }
            None => {
                d.species_upsert.insert(id.clone(), want.clone());
                if !want.aliases.is_empty() {
                    d.aliases_replace.insert(id.clone(), want.aliases.clone());
                }
            }
        }
    }

    if prune {
        d.species_delete = current
            .keys()
            .filter(|id| !wanted.contains_key(*id))
            .cloned()
            .collect();
    }

    d
}
