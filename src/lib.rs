//! Dalil - Arabic-aware fuzzy search for recitation catalogs.
//!
//! Backend library that locates a named entity (a reciter, a chapter) from
//! an imprecise, variably spelled, possibly diacritized Arabic or mixed
//! Arabic/Latin query against a small in-memory catalog.

// Normalization comes first: everything else compares canonical forms.
pub mod normalize;
pub mod cache;
pub mod matcher;
pub mod search;
pub mod catalog;
pub mod error;

pub use cache::{NormalizationCache, NormalizedForm};
pub use catalog::{Catalog, Chapter, Reciter};
pub use error::DalilError;
pub use matcher::MatchOptions;
pub use normalize::{normalize, spaceless};
pub use search::{MatchedVariant, ScoredHit, SearchEngine, Searchable};

/// One-shot search with default options and a throwaway cache.
///
/// Hold a [`SearchEngine`] instead when searching the same catalog
/// repeatedly, so normalized forms are reused across calls.
pub fn fuzzy_search<'a, T: Searchable>(items: &'a [T], query: &str) -> Vec<&'a T> {
    SearchEngine::new().search(items, query)
}
