use diesel::prelude::*;

use crate::species::repo::{delete_species, replace_aliases, upsert_species};
use crate::species::sync::diff::SpeciesDiff;

/// Apply the diff inside the current transaction.
/// Note: species rows go first so alias FKs resolve; deletes go last.
pub fn apply_diff(conn: &mut SqliteConnection, diff: &SpeciesDiff) -> anyhow::Result<()> {
    for s in diff.species_upsert.values() {
        upsert_species(conn, s)?;
    }
    for (id, aliases) in &diff.aliases_replace {
        replace_aliases(conn, id, aliases)?;
    }
    for id in &diff.species_delete {
        delete_species(conn, id)?;
    }
    Ok(())
}
