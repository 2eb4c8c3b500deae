//! Skip-gram word2vec with negative sampling.
//!
//! Every token that occurs at least once gets a vector. Frequent words are
//! randomly downsampled each epoch, so function words like "the" stop
//! dominating every context window. Training is single-threaded and fully
//! determined by the seed, so the same corpus and settings always produce the
//! same model.

use super::VocabularyIndex;
use crate::config::EmbeddingSettings;
use crate::error::{Result, ScoperError};
use rand::distributions::{Distribution, WeightedIndex};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;
use tracing::{debug, info};

const MIN_LEARNING_RATE: f32 = 0.0001;
const UNIGRAM_POWER: f64 = 0.75;
const MAX_EXP: f32 = 6.0;

/// Word2vec trainer configuration.
#[derive(Debug, Clone)]
pub struct Word2VecTrainer {
    pub dimensions: usize,
    pub window: usize,
    pub negative: usize,
    pub epochs: usize,
    pub learning_rate: f32,
    pub sample: f64,
    pub seed: u64,
}

impl Default for Word2VecTrainer {
    fn default() -> Self {
        Self::from_settings(&EmbeddingSettings::default())
    }
}

/// Token table sorted by descending frequency.
struct Vocab {
    words: Vec<String>,
    counts: Vec<u64>,
    index: HashMap<String, usize>,
}

impl Vocab {
    fn build(sentences: &[Vec<String>]) -> Self {
        let mut counts: HashMap<&str, u64> = HashMap::new();
        for token in sentences.iter().flatten() {
            *counts.entry(token.as_str()).or_insert(0) += 1;
        }

        let mut sorted: Vec<(&str, u64)> = counts.into_iter().collect();
        sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

        let words: Vec<String> = sorted.iter().map(|(w, _)| w.to_string()).collect();
        let counts = sorted.iter().map(|(_, c)| *c).collect();
        let index = words
            .iter()
            .enumerate()
            .map(|(i, w)| (w.clone(), i))
            .collect();

        Self {
            words,
            counts,
            index,
        }
    }

    fn len(&self) -> usize {
        self.words.len()
    }
}

impl Word2VecTrainer {
    pub fn from_settings(settings: &EmbeddingSettings) -> Self {
        Self {
            dimensions: settings.dimensions,
            window: settings.window,
            negative: settings.negative,
            epochs: settings.epochs,
            learning_rate: settings.learning_rate,
            sample: settings.sample,
            seed: settings.seed,
        }
    }

    fn validate(&self) -> Result<()> {
        if self.dimensions == 0 {
            return Err(ScoperError::Config("embedding.dimensions must be > 0".to_string()));
        }
        if self.window == 0 {
            return Err(ScoperError::Config("embedding.window must be > 0".to_string()));
        }
        if self.epochs == 0 {
            return Err(ScoperError::Config("embedding.epochs must be > 0".to_string()));
        }
        if !(self.learning_rate > 0.0) {
            return Err(ScoperError::Config("embedding.learning_rate must be > 0".to_string()));
        }
        if !(self.sample >= 0.0) {
            return Err(ScoperError::Config("embedding.sample must be >= 0".to_string()));
        }
        Ok(())
    }

    /// Train word vectors over tokenized sentences.
    pub fn train(&self, sentences: &[Vec<String>]) -> Result<VocabularyIndex> {
        self.validate()?;

        let vocab = Vocab::build(sentences);
        if vocab.len() == 0 {
            return Err(ScoperError::Embedding("Cannot train on an empty corpus".to_string()));
        }

        let encoded: Vec<Vec<usize>> = sentences
            .iter()
            .map(|s| s.iter().map(|w| vocab.index[w.as_str()]).collect())
            .collect();
        let corpus_words: usize = encoded.iter().map(Vec::len).sum();

        info!(
            "Training word2vec on {} sentences ({} tokens, {} distinct, {} dims)",
            encoded.len(),
            corpus_words,
            vocab.len(),
            self.dimensions
        );

        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let noise = WeightedIndex::new(vocab.counts.iter().map(|&c| (c as f64).powf(UNIGRAM_POWER)))
            .map_err(|e| ScoperError::Embedding(format!("Bad noise distribution: {}", e)))?;

        let dim = self.dimensions;
        let scale = 0.5 / dim as f32;
        let mut input: Vec<f32> = (0..vocab.len() * dim)
            .map(|_| rng.gen_range(-scale..scale))
            .collect();
        let mut output = vec![0.0f32; vocab.len() * dim];
        let mut gradient = vec![0.0f32; dim];

        let total = (self.epochs * corpus_words).max(1) as f32;
        let threshold = self.sample * corpus_words as f64;
        let mut processed = 0usize;

        for epoch in 0..self.epochs {
            for full in &encoded {
                let sentence: Vec<usize> = full
                    .iter()
                    .copied()
                    .filter(|&w| keep_token(vocab.counts[w], threshold, &mut rng))
                    .collect();
                // Dropped tokens still advance the learning rate schedule.
                processed += full.len() - sentence.len();

                for (pos, &center) in sentence.iter().enumerate() {
                    let progress = processed as f32 / total;
                    let lr = (self.learning_rate * (1.0 - progress)).max(MIN_LEARNING_RATE);
                    processed += 1;

                    let reduced = rng.gen_range(0..self.window);
                    let span = self.window - reduced;
                    let start = pos.saturating_sub(span);
                    let end = (pos + span + 1).min(sentence.len());

                    for (ctx_pos, &context) in sentence.iter().enumerate().take(end).skip(start) {
                        if ctx_pos == pos {
                            continue;
                        }
                        self.train_pair(
                            context,
                            center,
                            lr,
                            &mut input,
                            &mut output,
                            &mut gradient,
                            &noise,
                            &mut rng,
                        );
                    }
                }
            }
            debug!("Finished epoch {}/{}", epoch + 1, self.epochs);
        }

        let vectors = vocab
            .words
            .into_iter()
            .enumerate()
            .map(|(i, word)| (word, input[i * dim..(i + 1) * dim].to_vec()));

        VocabularyIndex::from_vectors(vectors)
    }

    /// One negative-sampling update: `context` predicts `center`.
    #[allow(clippy::too_many_arguments)]
    fn train_pair(
        &self,
        context: usize,
        center: usize,
        lr: f32,
        input: &mut [f32],
        output: &mut [f32],
        gradient: &mut [f32],
        noise: &WeightedIndex<f64>,
        rng: &mut ChaCha8Rng,
    ) {
        let dim = self.dimensions;
        let l1 = context * dim;
        gradient.iter_mut().for_each(|g| *g = 0.0);

        for d in 0..=self.negative {
            let (target, label) = if d == 0 {
                (center, 1.0f32)
            } else {
                let sampled = noise.sample(&mut *rng);
                if sampled == center {
                    continue;
                }
                (sampled, 0.0f32)
            };

            let l2 = target * dim;
            let dot: f32 = (0..dim).map(|k| input[l1 + k] * output[l2 + k]).sum();
            let g = (label - sigmoid(dot)) * lr;

            for k in 0..dim {
                gradient[k] += g * output[l2 + k];
                output[l2 + k] += g * input[l1 + k];
            }
        }

        for k in 0..dim {
            input[l1 + k] += gradient[k];
        }
    }
}

/// Whether one occurrence of a word seen `count` times survives downsampling.
///
/// Words rarer than `threshold` are always kept. A `threshold` of zero
/// disables downsampling.
fn keep_token(count: u64, threshold: f64, rng: &mut ChaCha8Rng) -> bool {
    if threshold <= 0.0 {
        return true;
    }
    let ratio = count as f64 / threshold;
    let keep = (ratio.sqrt() + 1.0) / ratio;
    keep >= 1.0 || rng.gen::<f64>() < keep
}

fn sigmoid(x: f32) -> f32 {
    let x = x.clamp(-MAX_EXP, MAX_EXP);
    1.0 / (1.0 + (-x).exp())
}
