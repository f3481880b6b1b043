//! Lock-free, read-mostly alias index: normalized label -> species id.
//!
//! Readers call [`AliasIndex::resolve`], which loads an `Arc<HashMap<..>>`
//! snapshot with no locking. Writers call [`AliasIndex::rebuild`] (or
//! [`AliasIndex::refresh`] to read the catalog from SQLite first), which builds
//! a complete new map off to the side and swaps it in with one atomic store.
//!
//! Implementation notes:
//! - Uses `arc-swap` for atomic pointer swaps + cheap reads (no RwLock).
//! - Starts empty; until the first rebuild every lookup misses.
//! - Each `resolve` loads the published map once, so a lookup never mixes two
//!   generations.

use std::{collections::HashMap, sync::Arc};

use arc_swap::ArcSwap;
use diesel::SqliteConnection;

use crate::{models::species::Species, normalize::normalize, species::repo};

/// Snapshot type held inside the index.
pub type AliasMap = HashMap<String, String>;

/// Alias index shared by every parser in the process.
pub struct AliasIndex {
    map: ArcSwap<AliasMap>,
}

impl Default for AliasIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl AliasIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self {
            map: ArcSwap::from_pointee(AliasMap::new()),
        }
    }

    /// Creates an index already populated from `species`.
    pub fn from_species<'a>(species: impl IntoIterator<Item = &'a Species>) -> Self {
        let index = Self::new();
        index.rebuild(species);
        index
    }

    /// Builds a fresh map from `species` and publishes it, replacing the old one.
    ///
    /// Blank aliases are skipped. When two species share an alias the one read
    /// last wins. Returns the number of keys in the published map.
    pub fn rebuild<'a>(&self, species: impl IntoIterator<Item = &'a Species>) -> usize {
        let mut next = AliasMap::new();
        for s in species {
            for alias in &s.aliases {
                let key = normalize(alias);
                if key.is_empty() {
                    continue;
                }
                next.insert(key, s.id.clone());
            }
        }
        let len = next.len();
        self.map.store(Arc::new(next));
        len
    }

    /// Reads the whole species catalog from the database and rebuilds.
    ///
    /// Call this at startup and after the catalog changes. Safe to call while
    /// other threads resolve; they see either the old or the new map.
    pub fn refresh(&self, conn: &mut SqliteConnection) -> anyhow::Result<usize> {
        let species = repo::load_species(conn)?;
        let len = self.rebuild(&species);
        tracing::info!(species = species.len(), aliases = len, "alias index reloaded");
        Ok(len)
    }

    /// Resolves a raw label to a species id.
    ///
    /// The label is normalized first. A miss is retried once with a trailing
    /// `s` removed so plural labels match singular aliases. `None` is an
    /// ordinary outcome for labels the catalog does not know.
    pub fn resolve(&self, raw_label: &str) -> Option<String> {
        let key = normalize(raw_label);
        if key.is_empty() {
            return None;
        }
        let snap = self.map.load();
        if let Some(id) = snap.get(&key) {
            return Some(id.clone());
        }
        key.strip_suffix('s')
            .filter(|singular| !singular.is_empty())
            .and_then(|singular| snap.get(singular))
            .cloned()
    }

    /// Number of alias keys in the current snapshot.
    pub fn len(&self) -> usize {
        self.map.load().len()
    }

    /// True when nothing has been published yet (or the catalog is empty).
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns an `Arc` snapshot (if a caller needs to iterate or inspect).
    pub fn snapshot(&self) -> Arc<AliasMap> {
        self.map.load_full()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::species::SightingGroup;

    fn sp(id: &str, aliases: &[&str]) -> Species {
        Species {
            id: id.to_string(),
            group: SightingGroup::Whale,
            common_name: id.to_string(),
            binomial_name: None,
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
        }
    }

    #[test]
    fn empty_until_rebuilt() {
        let idx = AliasIndex::new();
        assert!(idx.is_empty());
        assert_eq!(idx.resolve("humpback whale"), None);
    }

    #[test]
    fn resolves_messy_plural_labels() {
        let idx = AliasIndex::from_species(&[sp("humpback-whale", &["humpback whale"])]);
        assert_eq!(idx.resolve("  Humpback   Whales ").as_deref(), Some("humpback-whale"));
        assert_eq!(idx.resolve("HUMPBACK WHALE").as_deref(), Some("humpback-whale"));
        assert_eq!(idx.resolve("blue whale"), None);
        assert_eq!(idx.resolve("   "), None);
    }

    #[test]
    fn exact_alias_beats_plural_fallback() {
        let idx = AliasIndex::from_species(&[sp("a", &["mako"]), sp("b", &["makos"])]);
        assert_eq!(idx.resolve("makos").as_deref(), Some("b"));
    }

    #[test]
    fn blank_aliases_are_skipped_and_last_write_wins() {
        let idx = AliasIndex::from_species(&[sp("first", &["", "  ", "shared"]), sp("second", &["Shared"])]);
        assert_eq!(idx.len(), 1);
        assert_eq!(idx.resolve("shared").as_deref(), Some("second"));
    }

    #[test]
    fn rebuild_replaces_whole_map() {
        let idx = AliasIndex::from_species(&[sp("gray-whale", &["gray"])]);
        let old = idx.snapshot();

        idx.rebuild(&[sp("blue-whale", &["blue"])]);
        assert_eq!(idx.resolve("gray"), None);
        assert_eq!(idx.resolve("blue").as_deref(), Some("blue-whale"));

        // A reader holding the old snapshot keeps a consistent view.
        assert_eq!(old.get("gray").map(String::as_str), Some("gray-whale"));
        assert!(!old.contains_key("blue"));
    }

    #[test]
    fn concurrent_readers_never_see_a_partial_map() {
        let a: Vec<Species> = (0..50).map(|i| sp("a", &[format!("alias {i}").as_str()])).collect();
        let b: Vec<Species> = (0..50).map(|i| sp("b", &[format!("alias {i}").as_str()])).collect();
        let idx = Arc::new(AliasIndex::from_species(&a));

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let idx = Arc::clone(&idx);
                std::thread::spawn(move || {
                    for _ in 0..500 {
                        let snap = idx.snapshot();
                        assert_eq!(snap.len(), 50);
                        let first = snap.get("alias 0").cloned();
                        assert!(snap.values().all(|v| Some(v) == first.as_ref()));
                    }
                })
            })
            .collect();

        for i in 0..100 {
            idx.rebuild(if i % 2 == 0 { &b } else { &a });
        }
        for r in readers {
            r.join().unwrap();
        }
    }
}
