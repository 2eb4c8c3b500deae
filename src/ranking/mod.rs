//! Caption ranking strategies.
//!
//! Each [`SearchMode`] maps to one [`Ranker`]. Rankers only see caption
//! text; mapping captions back to timestamps is the orchestrator's job.

pub mod fuzzy;
pub mod semantic;

pub use fuzzy::FuzzyRanker;
pub use semantic::{semantic_distance, SemanticRanker};

use crate::embedding::VocabularyIndex;
use crate::error::{Result, ScoperError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Trait for caption ranking strategies.
pub trait Ranker: Send + Sync {
    /// Return at most `limit` candidates, most relevant first.
    ///
    /// Every returned caption is one of `candidates`.
    fn rank<'a>(&self, query: &str, candidates: &[&'a str], limit: usize) -> Result<Vec<&'a str>>;
}

/// How captions are compared to the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SearchMode {
    /// Lexical fuzzy matching; works for any language.
    #[serde(alias = "F", alias = "fuzzy")]
    Fuzzy,
    /// Word-embedding distance; only meaningful for the model's language.
    #[serde(alias = "S", alias = "semantic")]
    Semantic,
}

impl SearchMode {
    /// Build the ranker for this mode.
    pub fn ranker(self, vocabulary: &Arc<VocabularyIndex>) -> Box<dyn Ranker> {
        match self {
            SearchMode::Fuzzy => Box::new(FuzzyRanker::new()),
            SearchMode::Semantic => Box::new(SemanticRanker::new(Arc::clone(vocabulary))),
        }
    }
}

impl std::str::FromStr for SearchMode {
    type Err = ScoperError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "FUZZY" | "F" => Ok(SearchMode::Fuzzy),
            "SEMANTIC" | "S" => Ok(SearchMode::Semantic),
            _ => Err(ScoperError::UnknownMode(s.to_string())),
        }
    }
}

impl std::fmt::Display for SearchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchMode::Fuzzy => write!(f, "FUZZY"),
            SearchMode::Semantic => write!(f, "SEMANTIC"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_mode_from_str() {
        assert_eq!("FUZZY".parse::<SearchMode>().unwrap(), SearchMode::Fuzzy);
        assert_eq!("f".parse::<SearchMode>().unwrap(), SearchMode::Fuzzy);
        assert_eq!("Semantic".parse::<SearchMode>().unwrap(), SearchMode::Semantic);
        assert_eq!("S".parse::<SearchMode>().unwrap(), SearchMode::Semantic);

        let err = "BOGUS".parse::<SearchMode>().unwrap_err();
        assert!(matches!(err, ScoperError::UnknownMode(ref m) if m == "BOGUS"));
        assert!("".parse::<SearchMode>().is_err());
    }

    #[test]
    fn test_search_mode_display_round_trips() {
        for mode in [SearchMode::Fuzzy, SearchMode::Semantic] {
            assert_eq!(mode.to_string().parse::<SearchMode>().unwrap(), mode);
        }
    }

    #[test]
    fn test_ranker_dispatch() {
        let vocabulary = Arc::new(
            VocabularyIndex::from_vectors(vec![
                ("apple".to_string(), vec![1.0, 0.0]),
                ("watch".to_string(), vec![0.0, 1.0]),
            ])
            .unwrap(),
        );
        let corpus = ["apple watch review", "intro"];

        for mode in [SearchMode::Fuzzy, SearchMode::Semantic] {
            let ranked = mode.ranker(&vocabulary).rank("apple watch", &corpus, 1).unwrap();
            assert_eq!(ranked, vec!["apple watch review"], "{}", mode);
        }

        let empty = SearchMode::Semantic.ranker(&vocabulary).rank("  ", &corpus, 1);
        assert!(matches!(empty, Err(ScoperError::InvalidQuery(_))));
        assert!(SearchMode::Fuzzy.ranker(&vocabulary).rank("  ", &corpus, 1).is_ok());
    }
}
