//! Lexical fuzzy ranking.
//!
//! Scores are integers in 0..=100 built from normalized Levenshtein ratios.
//! The weighted ratio picks the best of a plain ratio, token-order-insensitive
//! ratios and (for strings of very different length) substring ratios, with
//! the indirect ones scaled down so an exact match always wins.

use super::Ranker;
use crate::error::Result;
use std::collections::BTreeSet;

const UNBASE_SCALE: f64 = 0.95;
const PARTIAL_SCALE: f64 = 0.90;
const LONG_PARTIAL_SCALE: f64 = 0.60;

/// Ranks captions by weighted fuzzy ratio, highest first.
#[derive(Debug, Clone, Copy, Default)]
pub struct FuzzyRanker;

impl FuzzyRanker {
    pub fn new() -> Self {
        Self
    }
}

impl Ranker for FuzzyRanker {
    fn rank<'a>(&self, query: &str, candidates: &[&'a str], limit: usize) -> Result<Vec<&'a str>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let query = preprocess(query);
        let mut scored: Vec<(u8, &'a str)> = candidates
            .iter()
            .map(|&candidate| (processed_weighted_ratio(&query, &preprocess(candidate)), candidate))
            .collect();

        // Stable: equal scores keep candidate order.
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        scored.truncate(limit);

        Ok(scored.into_iter().map(|(_, caption)| caption).collect())
    }
}

/// Lowercase, turn every non-alphanumeric character into a space, trim.
pub fn preprocess(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .to_lowercase()
        .trim()
        .to_string()
}

/// Similarity of two raw strings, 0..=100.
///
/// This is normalized Levenshtein distance, which counts a substitution as one
/// edit. fuzzywuzzy's `ratio` is an insertion/deletion ratio where a
/// substitution costs two, so scores here run lower for strings that differ by
/// replaced characters ("kitten" vs "sitting": 57 here, 62 there).
pub fn ratio(a: &str, b: &str) -> u8 {
    if a.is_empty() && b.is_empty() {
        return 100;
    }
    to_score(strsim::normalized_levenshtein(a, b))
}

/// Best ratio of the shorter string against every equally long window of the longer.
pub fn partial_ratio(a: &str, b: &str) -> u8 {
    let (short, long) = if a.chars().count() <= b.chars().count() {
        (a, b)
    } else {
        (b, a)
    };

    let short_len = short.chars().count();
    if short_len == 0 {
        return if long.is_empty() { 100 } else { 0 };
    }

    let long_chars: Vec<char> = long.chars().collect();
    let mut best = 0u8;
    for start in 0..=(long_chars.len() - short_len) {
        let window: String = long_chars[start..start + short_len].iter().collect();
        best = best.max(ratio(short, &window));
        if best == 100 {
            break;
        }
    }
    best
}

fn sorted_tokens(text: &str) -> String {
    let mut tokens: Vec<&str> = text.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// Ratio after sorting the words of both strings.
pub fn token_sort_ratio(a: &str, b: &str) -> u8 {
    ratio(&sorted_tokens(a), &sorted_tokens(b))
}

fn partial_token_sort_ratio(a: &str, b: &str) -> u8 {
    partial_ratio(&sorted_tokens(a), &sorted_tokens(b))
}

/// Compare the shared words against each side's full word set.
fn token_set_with(a: &str, b: &str, scorer: fn(&str, &str) -> u8) -> u8 {
    let tokens_a: BTreeSet<&str> = a.split_whitespace().collect();
    let tokens_b: BTreeSet<&str> = b.split_whitespace().collect();

    let join = |set: Vec<&str>| set.join(" ");
    let intersection = join(tokens_a.intersection(&tokens_b).copied().collect());
    let diff_ab = join(tokens_a.difference(&tokens_b).copied().collect());
    let diff_ba = join(tokens_b.difference(&tokens_a).copied().collect());

    let combine = |diff: &str| format!("{} {}", intersection, diff).trim().to_string();
    let combined_ab = combine(&diff_ab);
    let combined_ba = combine(&diff_ba);

    [
        scorer(&intersection, &combined_ab),
        scorer(&intersection, &combined_ba),
        scorer(&combined_ab, &combined_ba),
    ]
    .into_iter()
    .max()
    .unwrap_or(0)
}

/// Ratio of the shared words against each side's full word set.
pub fn token_set_ratio(a: &str, b: &str) -> u8 {
    if a.split_whitespace().next().is_none() || b.split_whitespace().next().is_none() {
        return 0;
    }
    token_set_with(a, b, ratio)
}

fn partial_token_set_ratio(a: &str, b: &str) -> u8 {
    if a.split_whitespace().next().is_none() || b.split_whitespace().next().is_none() {
        return 0;
    }
    token_set_with(a, b, partial_ratio)
}

/// Weighted combination of the ratios above, after preprocessing both strings.
pub fn weighted_ratio(a: &str, b: &str) -> u8 {
    processed_weighted_ratio(&preprocess(a), &preprocess(b))
}

fn processed_weighted_ratio(a: &str, b: &str) -> u8 {
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let len_a = a.chars().count() as f64;
    let len_b = b.chars().count() as f64;
    let len_ratio = len_a.max(len_b) / len_a.min(len_b);

    let base = ratio(a, b) as f64;

    if len_ratio < 1.5 {
        let tsor = token_sort_ratio(a, b) as f64 * UNBASE_SCALE;
        let tser = token_set_ratio(a, b) as f64 * UNBASE_SCALE;
        return round_score(base.max(tsor).max(tser));
    }

    let partial_scale = if len_ratio > 8.0 {
        LONG_PARTIAL_SCALE
    } else {
        PARTIAL_SCALE
    };

    let partial = partial_ratio(a, b) as f64 * partial_scale;
    let ptsor = partial_token_sort_ratio(a, b) as f64 * UNBASE_SCALE * partial_scale;
    let ptser = partial_token_set_ratio(a, b) as f64 * UNBASE_SCALE * partial_scale;

    round_score(base.max(partial).max(ptsor).max(ptser))
}

fn to_score(similarity: f64) -> u8 {
    round_score(similarity * 100.0)
}

fn round_score(score: f64) -> u8 {
    score.round().clamp(0.0, 100.0) as u8
}
