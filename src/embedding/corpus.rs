//! Reference corpora and tokenization.

use crate::config::{CorpusKind, Settings};
use crate::error::{Result, ScoperError};
use regex::Regex;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Small English reference corpus compiled into the binary.
const BUILTIN_CORPUS: &str = include_str!("../../assets/reference_corpus.txt");

/// Where the embedding model is bootstrapped from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorpusSource {
    /// The built-in reference corpus.
    Builtin,
    /// A text file with one sentence per line.
    File(PathBuf),
    /// Pretrained vectors in word2vec text format.
    Pretrained(PathBuf),
}

impl CorpusSource {
    /// Resolve the corpus source from the settings.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let path = || {
            settings.corpus_path().ok_or_else(|| {
                ScoperError::Config(format!(
                    "embedding.corpus = \"{}\" requires embedding.corpus_path",
                    settings.embedding.corpus
                ))
            })
        };

        match settings.embedding.corpus {
            CorpusKind::Builtin => Ok(CorpusSource::Builtin),
            CorpusKind::File => Ok(CorpusSource::File(path()?)),
            CorpusKind::Pretrained => Ok(CorpusSource::Pretrained(path()?)),
        }
    }
}

impl std::fmt::Display for CorpusSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CorpusSource::Builtin => write!(f, "built-in corpus"),
            CorpusSource::File(p) => write!(f, "corpus {}", p.display()),
            CorpusSource::Pretrained(p) => write!(f, "pretrained vectors {}", p.display()),
        }
    }
}

fn token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Runs of word characters, excluding digits.
    RE.get_or_init(|| Regex::new(r"[\w&&\D]+").expect("Invalid regex"))
}

/// Split text into alphabetic tokens, in order. Case is preserved.
pub fn tokenize(text: &str) -> Vec<&str> {
    token_regex().find_iter(text).map(|m| m.as_str()).collect()
}

/// Tokenize and lowercase one corpus sentence.
fn sentence_tokens(line: &str) -> Vec<String> {
    tokenize(line).into_iter().map(str::to_lowercase).collect()
}

/// Sentences of the built-in corpus.
pub fn builtin_sentences() -> Vec<Vec<String>> {
    parse_sentences(BUILTIN_CORPUS.lines())
}

/// Read a line-oriented corpus file.
pub fn read_sentences(path: &Path) -> Result<Vec<Vec<String>>> {
    let file = std::fs::File::open(path).map_err(|e| {
        ScoperError::Config(format!("Cannot open corpus {}: {}", path.display(), e))
    })?;

    let lines = BufReader::new(file).lines().collect::<std::io::Result<Vec<_>>>()?;
    let sentences = parse_sentences(lines.iter().map(String::as_str));

    if sentences.is_empty() {
        return Err(ScoperError::Embedding(format!(
            "Corpus {} contains no words",
            path.display()
        )));
    }

    Ok(sentences)
}

fn parse_sentences<'a>(lines: impl Iterator<Item = &'a str>) -> Vec<Vec<String>> {
    lines
        .map(sentence_tokens)
        .filter(|tokens| !tokens.is_empty())
        .collect()
}
