//! Embedding-based semantic ranking.
//!
//! The distance is a one-directional, greedy variant of word mover's
//! distance. Each in-vocabulary query word, in order, takes the closest
//! candidate word nobody has taken yet. The summed distances are divided by
//! the number of query words, so swapping query and candidate generally
//! changes the result.

use super::Ranker;
use crate::embedding::{tokenize, VocabularyIndex};
use crate::error::{Result, ScoperError};
use std::sync::Arc;

/// Ranks captions by greedy semantic distance, closest first.
#[derive(Debug, Clone)]
pub struct SemanticRanker {
    vocabulary: Arc<VocabularyIndex>,
}

impl SemanticRanker {
    pub fn new(vocabulary: Arc<VocabularyIndex>) -> Self {
        Self { vocabulary }
    }
}

impl Ranker for SemanticRanker {
    fn rank<'a>(&self, query: &str, candidates: &[&'a str], limit: usize) -> Result<Vec<&'a str>> {
        let query_tokens = query_tokens(query)?;
        if limit == 0 {
            return Ok(Vec::new());
        }

        let mut scored: Vec<(f64, &'a str)> = candidates
            .iter()
            .map(|&candidate| {
                let distance = token_distance(&self.vocabulary, &query_tokens, &tokenize(candidate));
                (distance, candidate)
            })
            .collect();

        // Stable: equal distances keep candidate order.
        scored.sort_by(|a, b| a.0.total_cmp(&b.0));
        scored.truncate(limit);

        Ok(scored.into_iter().map(|(_, caption)| caption).collect())
    }
}

fn query_tokens(query: &str) -> Result<Vec<&str>> {
    let tokens = tokenize(query);
    if tokens.is_empty() {
        return Err(ScoperError::InvalidQuery(format!(
            "{:?} contains no words to compare",
            query
        )));
    }
    Ok(tokens)
}

/// Greedy asymmetric distance from `query` to `candidate`. Lower is closer.
pub fn semantic_distance(vocabulary: &VocabularyIndex, query: &str, candidate: &str) -> Result<f64> {
    let query_tokens = query_tokens(query)?;
    Ok(token_distance(vocabulary, &query_tokens, &tokenize(candidate)))
}

fn token_distance(vocabulary: &VocabularyIndex, query: &[&str], candidate: &[&str]) -> f64 {
    let mut used = vec![false; candidate.len()];
    let mut total = 0.0f64;

    for &word_q in query.iter().filter(|w| vocabulary.contains(w)) {
        let mut closest: Option<(usize, f64)> = None;

        for (idx, &word_c) in candidate.iter().enumerate() {
            if used[idx] {
                continue;
            }
            let Some(similarity) = vocabulary.similarity(word_q, word_c) else {
                continue;
            };
            let distance = 1.0 - similarity as f64;
            if closest.map_or(true, |(_, best)| distance < best) {
                closest = Some((idx, distance));
            }
        }

        if let Some((idx, distance)) = closest {
            used[idx] = true;
            total += distance;
        }
    }

    total / query.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Hand-placed 2D vectors: animals cluster, vehicles cluster.
    fn vocabulary() -> Arc<VocabularyIndex> {
        let entries = [
            ("cat", [1.0, 0.0]),
            ("kitten", [0.9, 0.1]),
            ("dog", [0.8, 0.6]),
            ("car", [0.0, 1.0]),
            ("truck", [0.1, 0.9]),
        ];
        Arc::new(
            VocabularyIndex::from_vectors(
                entries
                    .iter()
                    .map(|(token, v)| (token.to_string(), v.to_vec())),
            )
            .unwrap(),
        )
    }

    #[test]
    fn test_identical_text_has_zero_distance() {
        let vocab = vocabulary();
        let d = semantic_distance(&vocab, "cat car", "cat car").unwrap();
        assert!(d.abs() < 1e-6);
    }

    #[test]
    fn test_distance_is_asymmetric() {
        let vocab = vocabulary();
        let forward = semantic_distance(&vocab, "cat", "dog cat").unwrap();
        let backward = semantic_distance(&vocab, "dog cat", "cat").unwrap();

        assert!(forward.abs() < 1e-6);
        // dog takes cat first, then cat finds nothing left; divided by two words.
        assert!((backward - (1.0 - 0.8) / 2.0).abs() < 1e-6);
        assert!((forward - backward).abs() > 1e-3);
    }

    #[test]
    fn test_greedy_assignment_is_order_dependent() {
        let vocab = vocabulary();
        // "kitten" grabs "cat" before "cat" can, leaving "cat" with "dog".
        let greedy = semantic_distance(&vocab, "kitten cat", "cat dog").unwrap();
        let swapped = semantic_distance(&vocab, "cat kitten", "cat dog").unwrap();
        assert!((greedy - swapped).abs() > 1e-6);
    }

    #[test]
    fn test_out_of_vocabulary_words_count_in_divisor_only() {
        let vocab = vocabulary();
        let d = semantic_distance(&vocab, "cat zzz", "cat").unwrap();
        assert!(d.abs() < 1e-6);

        let with_oov = semantic_distance(&vocab, "dog zzz", "cat").unwrap();
        let without = semantic_distance(&vocab, "dog", "cat").unwrap();
        assert!((with_oov - without / 2.0).abs() < 1e-6);

        // No in-vocabulary candidate words: nothing is added.
        assert_eq!(semantic_distance(&vocab, "cat", "qqq www").unwrap(), 0.0);
    }

    #[test]
    fn test_empty_query_rejected() {
        let vocab = vocabulary();
        for query in ["", "   ", "42 !!"] {
            assert!(matches!(
                semantic_distance(&vocab, query, "cat"),
                Err(ScoperError::InvalidQuery(_))
            ));
            assert!(matches!(
                SemanticRanker::new(vocab.clone()).rank(query, &[], 5),
                Err(ScoperError::InvalidQuery(_))
            ));
        }
    }

    #[test]
    fn test_rank_orders_by_distance() {
        let ranker = SemanticRanker::new(vocabulary());
        let corpus = ["truck car", "kitten", "dog"];

        let ranked = ranker.rank("cat", &corpus, 3).unwrap();
        assert_eq!(ranked, vec!["kitten", "dog", "truck car"]);

        let top = ranker.rank("cat", &corpus, 1).unwrap();
        assert_eq!(top, vec!["kitten"]);

        assert!(ranker.rank("cat", &corpus, 0).unwrap().is_empty());
    }

    #[test]
    fn test_asymmetry_under_trained_model() {
        let corpus: Vec<Vec<String>> = [
            "the cat sat on the mat",
            "the dog sat on the rug",
            "a car drove down the road",
        ]
        .iter()
        .map(|l| l.split_whitespace().map(String::from).collect())
        .collect();

        let trainer = crate::embedding::Word2VecTrainer {
            dimensions: 16,
            window: 2,
            negative: 3,
            epochs: 10,
            learning_rate: 0.05,
            sample: 0.0,
            seed: 3,
        };
        let vocab = trainer.train(&corpus).unwrap();

        let forward = semantic_distance(&vocab, "cat", "road cat").unwrap();
        let backward = semantic_distance(&vocab, "road cat", "cat").unwrap();
        assert!((forward - backward).abs() > 1e-6);
    }
}
