//! Species catalog synchronization (species rows + alias sets).
//!
//! ## What this does
//! - Takes a [`SpeciesCatalog`] (TOML) and **normalizes** it.
//! - Computes a **diff** between the catalog (desired) and the DB (current).
//! - Applies the diff with UPSERTs (idempotent) and optional **prune** deletes.
//!
//! ## Transactions & consistency
//! Everything runs inside a single **`BEGIN IMMEDIATE`** transaction via
//! `SqliteConnection::immediate_transaction`, so either the whole diff lands or
//! none of it. Pruning a species that still has observations fails on the
//! `ON DELETE RESTRICT` foreign key and rolls the whole sync back.
//!
//! ## Dry-run
//! When `SyncOptions::dry_run` is `true`, we return the [`SpeciesDiff`] and do
//! **not** write anything.
//!
//! The alias index is not touched here; callers reload it after a real sync.

mod apply;
mod diff;

use std::collections::BTreeMap;

use diesel::SqliteConnection;
use diesel::prelude::*;

pub use diff::SpeciesDiff;

use crate::species::{
    config::{SpeciesCatalog, normalize_catalog},
    repo::load_species,
};

/// Options for catalog synchronization.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncOptions {
    /// If true, compute the diff only.
    pub dry_run: bool,
    /// If true, delete species from the DB that are not present in the catalog.
    pub prune: bool,
}

/// Sync the species catalog into SQLite and return what changed (or would change).
pub fn sync_species(
    conn: &mut SqliteConnection,
    mut cat: SpeciesCatalog,
    opt: SyncOptions,
) -> anyhow::Result<SpeciesDiff> {
    normalize_catalog(&mut cat)?;
    let wanted: BTreeMap<String, _> = cat
        .to_species()
        .into_iter()
        .map(|s| (s.id.clone(), s))
        .collect();

    conn.immediate_transaction::<_, anyhow::Error, _>(|conn| {
        let current: BTreeMap<String, _> = load_species(conn)?
            .into_iter()
            .map(|s| (s.id.clone(), s))
            .collect();

        let diff = diff::make_diff(&wanted, &current, opt.prune);
        if !opt.dry_run && !diff.is_noop() {
            apply::apply_diff(conn, &diff)?;
        }
        Ok(diff)
    })
}
