//! Bounded approximate matching.
//!
//! Scores a normalized query against a normalized candidate, allowing the
//! query to appear anywhere in the candidate with a bounded number of
//! edits. Patterns that fit in a machine word run a Wu–Manber bit-parallel
//! automaton; longer patterns fall back to a semi-global restricted
//! Damerau–Levenshtein with the same contract.

use std::collections::HashMap;

const WORD_BITS: usize = u64::BITS as usize;

/// Score assigned to an exact substring hit that is not whole-string
/// equality. Smaller than any reachable error cost (1/64 at minimum), so a
/// full-name match still ranks strictly ahead of a containing name.
const SUBSTRING_SCORE: f64 = 0.001;

/// Matcher knobs.
#[derive(Debug, Clone, Copy)]
pub struct MatchOptions {
    /// Maximum acceptable normalized cost. 0.0 accepts only exact
    /// occurrences of the query; 1.0 accepts anything.
    pub threshold: f64,
    /// How far past the pattern length the candidate scan extends, in
    /// normalized characters. Bounds the gap span for long compound names.
    pub distance: usize,
    /// Queries shorter than this many normalized characters never match.
    pub min_match_len: usize,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            threshold: 0.35,
            distance: 200,
            min_match_len: 2,
        }
    }
}

/// A query prepared once and scored against many candidates.
pub struct Pattern {
    chars: Vec<char>,
    masks: HashMap<char, u64>,
}

impl Pattern {
    pub fn new(text: &str) -> Self {
        let chars: Vec<char> = text.chars().collect();
        let mut masks = HashMap::with_capacity(chars.len());
        if chars.len() <= WORD_BITS {
            for (i, &c) in chars.iter().enumerate() {
                *masks.entry(c).or_insert(0u64) |= 1 << i;
            }
        }
        Self { chars, masks }
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }
}

/// Score `candidate` against a prepared pattern.
///
/// Returns the normalized cost in `[0, 1]` (0.0 is a perfect whole-string
/// match), or `None` when the candidate does not match within
/// `options.threshold`. Never panics, for any input.
pub fn score(pattern: &Pattern, candidate: &str, options: &MatchOptions) -> Option<f64> {
    let m = pattern.len();
    if m == 0 || m < options.min_match_len {
        return None;
    }
    let text: Vec<char> = candidate.chars().collect();
    if text.is_empty() {
        return None;
    }
    if text == pattern.chars {
        return Some(0.0);
    }

    // Matches only count inside the distance budget.
    let scan = text.len().min(options.distance.saturating_add(m));
    let budget = max_errors(m, options.threshold);

    let errors = if m <= WORD_BITS {
        bitap_errors(pattern, &text[..scan], budget)
    } else {
        semi_global_errors(&pattern.chars, &text[..scan], budget)
    };

    match errors {
        // Acceptance is decided on the raw error count, so a substring hit
        // passes even at threshold 0.0; the constant only orders it after
        // whole-string equality.
        Some(0) => Some(SUBSTRING_SCORE),
        Some(e) => {
            let cost = e as f64 / m as f64;
            (cost <= options.threshold).then_some(cost)
        }
        None if options.threshold >= 1.0 => Some(1.0),
        None => None,
    }
}

/// Largest edit count whose normalized cost can still pass the threshold,
/// bounded so the automaton states stay inside one machine word.
fn max_errors(m: usize, threshold: f64) -> usize {
    let k = (threshold.clamp(0.0, 1.0) * m as f64).floor() as usize;
    k.min(m - 1).min(WORD_BITS - 1)
}

/// Wu–Manber bit-parallel search. Bit `i` of `r[d]` means "the first
/// `i + 1` pattern characters match a suffix of the scanned text with at
/// most `d` errors"; the pattern is accepted at the first level whose
/// final bit lights up.
fn bitap_errors(pattern: &Pattern, text: &[char], budget: usize) -> Option<usize> {
    let m = pattern.chars.len();
    let accept = 1u64 << (m - 1);
    // Seed level d with the states reachable through d leading deletions.
    let mut r: Vec<u64> = (0..=budget).map(|d| (1u64 << d) - 1).collect();
    let mut best: Option<usize> = None;

    for &c in text {
        let mask = pattern.masks.get(&c).copied().unwrap_or(0);
        let mut prev_old = r[0];
        r[0] = ((r[0] << 1) | 1) & mask;
        let mut prev_new = r[0];
        for d in 1..=budget {
            let old = r[d];
            r[d] = (((old << 1) | 1) & mask)  // match
                | ((prev_old << 1) | 1)       // substitution
                | ((prev_new << 1) | 1)       // deletion
                | prev_old;                   // insertion
            prev_old = old;
            prev_new = r[d];
        }
        for (d, level) in r.iter().enumerate() {
            if level & accept != 0 {
                if best.map_or(true, |b| d < b) {
                    best = Some(d);
                }
                break;
            }
        }
        if best == Some(0) {
            break;
        }
    }
    best
}

/// Semi-global restricted Damerau–Levenshtein for patterns too long for
/// the automaton: leading and trailing candidate text is free, so the
/// result is the cheapest alignment of the whole pattern against any
/// substring of the candidate.
fn semi_global_errors(pattern: &[char], text: &[char], budget: usize) -> Option<usize> {
    let n = text.len();
    let mut prev_prev = vec![usize::MAX; n + 1];
    let mut prev: Vec<usize> = vec![0; n + 1];
    let mut current = vec![0usize; n + 1];

    for i in 1..=pattern.len() {
        current[0] = i;
        for j in 1..=n {
            let substitution_cost = if pattern[i - 1] == text[j - 1] { 0 } else { 1 };
            current[j] = (prev[j] + 1)         // deletion
                .min(current[j - 1] + 1)       // insertion
                .min(prev[j - 1] + substitution_cost);
            if i > 1 && j > 1 && pattern[i - 1] == text[j - 2] && pattern[i - 2] == text[j - 1] {
                // transposition
                current[j] = current[j].min(prev_prev[j - 2] + 1);
            }
        }
        [prev_prev, prev, current] = [prev, current, prev_prev];
    }

    let errors = prev.iter().copied().min().unwrap_or(usize::MAX);
    (errors <= budget).then_some(errors)
}
