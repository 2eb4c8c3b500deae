//! Word embeddings for semantic caption search.
//!
//! The model is built once at startup, either by training skip-gram vectors
//! on a reference corpus or by loading pretrained vectors, and is read-only
//! afterwards. [`VocabularyIndex`] is the only way to reach it: a token is
//! in the vocabulary exactly when it has a vector.

mod corpus;
mod pretrained;
mod word2vec;

pub use corpus::{builtin_sentences, read_sentences, tokenize, CorpusSource};
pub use pretrained::{load_vectors, parse_vectors};
pub use word2vec::Word2VecTrainer;

use crate::config::EmbeddingSettings;
use crate::error::{Result, ScoperError};
use std::collections::HashMap;
use tracing::{info, instrument};

/// Token vocabulary and the vectors behind it.
#[derive(Debug, Clone)]
pub struct VocabularyIndex {
    index: HashMap<String, usize>,
    vectors: Vec<f32>,
    dimensions: usize,
}

impl VocabularyIndex {
    /// Build an index from (token, vector) pairs. All vectors must share one length.
    pub fn from_vectors<I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, Vec<f32>)>,
    {
        let mut index = HashMap::new();
        let mut vectors = Vec::new();
        let mut dimensions = None;

        for (token, vector) in entries {
            let dims = *dimensions.get_or_insert(vector.len());
            if vector.len() != dims || dims == 0 {
                return Err(ScoperError::Embedding(format!(
                    "Vector for {:?} has {} dimensions, expected {}",
                    token,
                    vector.len(),
                    dims
                )));
            }
            if index.contains_key(&token) {
                continue;
            }
            index.insert(token, index.len());
            vectors.extend_from_slice(&vector);
        }

        let dimensions = dimensions
            .ok_or_else(|| ScoperError::Embedding("Vocabulary is empty".to_string()))?;

        Ok(Self {
            index,
            vectors,
            dimensions,
        })
    }

    /// Whether the token has a vector.
    pub fn contains(&self, token: &str) -> bool {
        self.index.contains_key(token)
    }

    /// The token's vector, if it is in the vocabulary.
    pub fn vector_of(&self, token: &str) -> Option<&[f32]> {
        let row = *self.index.get(token)?;
        Some(&self.vectors[row * self.dimensions..(row + 1) * self.dimensions])
    }

    /// Cosine similarity of two in-vocabulary tokens.
    pub fn similarity(&self, a: &str, b: &str) -> Option<f32> {
        Some(cosine_similarity(self.vector_of(a)?, self.vector_of(b)?))
    }

    /// Number of tokens.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Vector length.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// Build the vocabulary index from the configured source.
#[instrument(skip(source, settings), fields(source = %source))]
pub fn bootstrap(source: &CorpusSource, settings: &EmbeddingSettings) -> Result<VocabularyIndex> {
    let index = match source {
        CorpusSource::Builtin => Word2VecTrainer::from_settings(settings).train(&builtin_sentences())?,
        CorpusSource::File(path) => {
            let sentences = read_sentences(path)?;
            Word2VecTrainer::from_settings(settings).train(&sentences)?
        }
        CorpusSource::Pretrained(path) => load_vectors(path)?,
    };

    info!("Vocabulary ready: {} tokens", index.len());
    Ok(index)
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (dot_product / (norm_a * norm_b)).clamp(-1.0, 1.0)
}
