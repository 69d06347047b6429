//! Query orchestration: normalization, two-variant matching, merge, rank.

use crate::cache::NormalizationCache;
use crate::matcher::{self, MatchOptions, Pattern};
use serde::{Deserialize, Serialize};

/// Anything with a searchable display name. Implementors keep full
/// ownership of their records; the engine never copies or mutates them.
pub trait Searchable {
    fn name(&self) -> &str;
}

impl Searchable for String {
    fn name(&self) -> &str {
        self
    }
}

impl Searchable for &str {
    fn name(&self) -> &str {
        self
    }
}

/// Which derived form produced the winning score for an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchedVariant {
    Canonical,
    Spaceless,
}

/// A matching entity together with its normalized cost (0.0 is best).
#[derive(Debug, Clone, Copy)]
pub struct ScoredHit<'a, T> {
    pub item: &'a T,
    pub score: f64,
    pub variant: MatchedVariant,
}

/// The fuzzy search engine: a normalization cache plus matcher defaults.
///
/// Searching is read-only over its inputs; the cache behind its lock is
/// the only shared mutable state, so one engine can serve concurrent
/// callers.
pub struct SearchEngine {
    cache: NormalizationCache,
    options: MatchOptions,
}

impl SearchEngine {
    pub fn new() -> Self {
        Self::with_options(MatchOptions::default())
    }

    pub fn with_options(options: MatchOptions) -> Self {
        Self {
            cache: NormalizationCache::default(),
            options,
        }
    }

    /// Build an engine around an existing cache, e.g. one sized for a
    /// known catalog.
    pub fn with_cache(cache: NormalizationCache, options: MatchOptions) -> Self {
        Self { cache, options }
    }

    pub fn options(&self) -> MatchOptions {
        self.options
    }

    /// Canonical form of `text`, going through the cache.
    pub fn normalize_text(&self, text: &str) -> String {
        self.cache.get_or_derive(text).canonical.clone()
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn cache_stats(&self) -> (usize, usize) {
        self.cache.stats()
    }

    /// Search with the engine's default options, returning matching
    /// entities best-first.
    pub fn search<'a, T: Searchable>(&self, items: &'a [T], query: &str) -> Vec<&'a T> {
        self.search_scored(items, query, &self.options)
            .into_iter()
            .map(|hit| hit.item)
            .collect()
    }

    /// Search with the default options but an overridden threshold.
    pub fn search_with_threshold<'a, T: Searchable>(
        &self,
        items: &'a [T],
        query: &str,
        threshold: f64,
    ) -> Vec<&'a T> {
        let options = MatchOptions {
            threshold,
            ..self.options
        };
        self.search_scored(items, query, &options)
            .into_iter()
            .map(|hit| hit.item)
            .collect()
    }

    /// Scored search: every matching entity with its best score across
    /// both variants, sorted ascending by score with catalog order
    /// breaking ties.
    pub fn search_scored<'a, T: Searchable>(
        &self,
        items: &'a [T],
        query: &str,
        options: &MatchOptions,
    ) -> Vec<ScoredHit<'a, T>> {
        let q = self.cache.get_or_derive(query);

        // A query that normalizes away entirely is a no-op filter.
        if q.canonical.is_empty() {
            return items
                .iter()
                .map(|item| ScoredHit {
                    item,
                    score: 0.0,
                    variant: MatchedVariant::Canonical,
                })
                .collect();
        }

        let canonical = Pattern::new(&q.canonical);
        let query_spaceless =
            (q.spaceless != q.canonical).then(|| Pattern::new(&q.spaceless));

        let mut hits: Vec<(usize, f64, MatchedVariant)> = Vec::new();
        for (index, item) in items.iter().enumerate() {
            let form = self.cache.get_or_derive(item.name());

            let mut best: Option<(f64, MatchedVariant)> = None;
            if let Some(score) = matcher::score(&canonical, &form.canonical, options) {
                best = Some((score, MatchedVariant::Canonical));
            }
            // The spaceless pairing bridges run-together and spaced
            // spellings of the same compound name, in either direction.
            if query_spaceless.is_some() || form.spaceless != form.canonical {
                let pattern = query_spaceless.as_ref().unwrap_or(&canonical);
                if let Some(score) = matcher::score(pattern, &form.spaceless, options) {
                    if best.map_or(true, |(b, _)| score < b) {
                        best = Some((score, MatchedVariant::Spaceless));
                    }
                }
            }

            if let Some((score, variant)) = best {
                hits.push((index, score, variant));
            }
        }

        hits.sort_by(|a, b| a.1.total_cmp(&b.1));
        tracing::debug!(
            query,
            candidates = items.len(),
            hits = hits.len(),
            "search complete"
        );
        hits.into_iter()
            .map(|(index, score, variant)| ScoredHit {
                item: &items[index],
                score,
                variant,
            })
            .collect()
    }
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(items: &[&str], query: &str) -> Vec<String> {
        SearchEngine::new()
            .search(&items.iter().map(|s| s.to_string()).collect::<Vec<_>>(), query)
            .into_iter()
            .cloned()
            .collect()
    }

    #[test]
    fn empty_query_returns_everything_in_order() {
        let engine = SearchEngine::new();
        let items = ["البقره", "الفاتحه", "يس"];
        assert_eq!(engine.search(&items, ""), vec![&items[0], &items[1], &items[2]]);
        assert_eq!(engine.search(&items, "   \t"), vec![&items[0], &items[1], &items[2]]);
        // Diacritics-only input also normalizes away.
        assert_eq!(engine.search(&items, "\u{064B}\u{064C}").len(), 3);
    }

    #[test]
    fn no_match_returns_empty() {
        assert!(names(&["عبد الباسط", "المنشاوي"], "xyz123unrelated").is_empty());
    }

    #[test]
    fn single_letter_query_matches_nothing() {
        assert!(names(&["عبد الباسط", "المنشاوي"], "ع").is_empty());
    }

    #[test]
    fn spacing_conventions_are_equivalent() {
        assert_eq!(names(&["عبد الباسط"], "عبدالباسط"), vec!["عبد الباسط"]);
        assert_eq!(names(&["عبدالباسط"], "عبد الباسط"), vec!["عبدالباسط"]);
    }

    #[test]
    fn exact_name_ranks_first() {
        let items = ["عبد الباسط عبد الصمد", "محمد صديق المنشاوي", "محمود خليل الحصري"];
        let results = names(&items, "محمد صديق المنشاوي");
        assert_eq!(results[0], "محمد صديق المنشاوي");
    }

    #[test]
    fn entities_never_appear_twice() {
        // Both variants match this entity; the merge keeps one hit.
        let engine = SearchEngine::new();
        let items = ["عبد الباسط".to_string()];
        let hits = engine.search_scored(&items, "عبدالباسط", &engine.options());
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].variant, MatchedVariant::Spaceless);
    }

    #[test]
    fn keeps_best_score_across_variants() {
        let engine = SearchEngine::new();
        let items = ["عبد الباسط".to_string()];
        // Spaceless pairing is exact; canonical pairing costs one edit.
        let hits = engine.search_scored(&items, "عبدالباسط", &engine.options());
        assert!(hits[0].score < 0.01);
    }

    #[test]
    fn threshold_widening_yields_superset() {
        let engine = SearchEngine::new();
        let items = ["سعيد".to_string(), "سعد".to_string()];
        let strict = engine.search_with_threshold(&items, "سعد", 0.2);
        let loose = engine.search_with_threshold(&items, "سعد", 0.5);
        assert_eq!(strict.len(), 1);
        assert_eq!(loose.len(), 2);
        for item in &strict {
            assert!(loose.iter().any(|other| std::ptr::eq(*other, *item)));
        }
    }

    #[test]
    fn results_are_the_original_objects() {
        let engine = SearchEngine::new();
        let items = ["محمد صديق المنشاوي".to_string()];
        let results = engine.search(&items, "المنشاوي");
        assert_eq!(results.len(), 1);
        assert!(std::ptr::eq(results[0], &items[0]));
    }

    #[test]
    fn one_letter_typo_still_finds_the_name() {
        let results = names(
            &["عبد الباسط عبد الصمد", "محمد صديق المنشاوي"],
            "عبض الباسط",
        );
        assert_eq!(results, vec!["عبد الباسط عبد الصمد"]);
    }

    #[test]
    fn diacritized_query_matches_bare_name() {
        assert_eq!(names(&["محمد"], "مُحَمَّد"), vec!["محمد"]);
    }

    #[test]
    fn latin_queries_are_case_folded() {
        assert_eq!(names(&["Mishary Rashid Alafasy"], "MISHARY"), vec!["Mishary Rashid Alafasy"]);
    }

    #[test]
    fn tie_scores_keep_catalog_order() {
        let engine = SearchEngine::new();
        let items = ["يس مجود".to_string(), "يس مرتل".to_string()];
        let results = engine.search(&items, "يس");
        assert_eq!(results.len(), 2);
        assert!(std::ptr::eq(results[0], &items[0]));
        assert!(std::ptr::eq(results[1], &items[1]));
    }
}
