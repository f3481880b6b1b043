//! Species subsystem.
//!
//! Groups the TOML catalog model, the DB repository helpers, catalog sync and
//! the in-memory [`AliasIndex`] used to resolve table labels to species ids.
//! See [`crate::species::config`] for the TOML model and helpers.

mod index;
pub mod config;
pub mod repo;
pub mod sync;

pub use index::{AliasIndex, AliasMap};
