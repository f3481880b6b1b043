//! Species catalog reads and upsert statements.
use std::collections::BTreeMap;

use anyhow::Context;
use diesel::prelude::*;
use diesel::{ExpressionMethods, RunQueryDsl, SqliteConnection, insert_into};

use crate::models::species::{NewSpecies, NewSpeciesAlias, Species, SpeciesRow};
use crate::schema::{species, species_alias};

/// Loads every species with its aliases, ordered by id (aliases by text).
pub fn load_species(conn: &mut SqliteConnection) -> anyhow::Result<Vec<Species>> {
    let rows: Vec<SpeciesRow> = species::table
        .select(SpeciesRow::as_select())
        .order(species::id.asc())
        .load(conn)?;

    let alias_rows: Vec<(String, String)> = species_alias::table
        .select((species_alias::species_id, species_alias::alias))
        .order((species_alias::species_id.asc(), species_alias::alias.asc()))
        .load(conn)?;

    let mut aliases: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (sid, alias) in alias_rows {
        aliases.entry(sid).or_default().push(alias);
    }

    rows.into_iter()
        .map(|r| {
            let group = r
                .grp
                .parse()
                .with_context(|| format!("species {} has bad group {:?}", r.id, r.grp))?;
            Ok(Species {
                aliases: aliases.remove(&r.id).unwrap_or_default(),
                id: r.id,
                group,
                common_name: r.common_name,
                binomial_name: r.binomial_name,
            })
        })
        .collect()
}

/// upsert one species row (aliases untouched)
pub fn upsert_species(conn: &mut SqliteConnection, s: &Species) -> anyhow::Result<usize> {
    let row = NewSpecies {
        id: &s.id,
        grp: s.group.as_str(),
        common_name: &s.common_name,
        binomial_name: s.binomial_name.as_deref(),
    };
    let n = insert_into(species::table)
        .values(&row)
        .on_conflict(species::id)
        .do_update()
        .set(&row)
        .execute(conn)?;
    Ok(n)
}

/// Replace the alias set of one species.
pub fn replace_aliases(
    conn: &mut SqliteConnection,
    species_id: &str,
    aliases: &[String],
) -> anyhow::Result<usize> {
    diesel::delete(species_alias::table.filter(species_alias::species_id.eq(species_id)))
        .execute(conn)?;
    if aliases.is_empty() {
        return Ok(0);
    }
    let rows: Vec<NewSpeciesAlias<'_>> = aliases
        .iter()
        .map(|a| NewSpeciesAlias {
            species_id,
            alias: a,
        })
        .collect();
    let n = insert_into(species_alias::table).values(&rows).execute(conn)?;
    Ok(n)
}

/// Delete one species. `ON DELETE RESTRICT` from `observation` blocks species
/// that have recorded sightings; aliases cascade.
pub fn delete_species(conn: &mut SqliteConnection, species_id: &str) -> diesel::QueryResult<usize> {
    diesel::delete(species::table.filter(species::id.eq(species_id))).execute(conn)
}
