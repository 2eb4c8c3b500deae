//! Loader for pretrained vectors in word2vec text format.
//!
//! ```text
//! 3 4
//! cat 0.1 0.2 0.3 0.4
//! dog 0.1 0.2 0.3 0.5
//! car -0.4 0.0 0.9 0.1
//! ```
//!
//! The `<count> <dims>` header is optional. Tokens are lowercased; when two
//! entries collapse to the same token the first one is kept.

use super::VocabularyIndex;
use crate::error::{Result, ScoperError};
use std::collections::HashSet;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{info, warn};

/// Load word vectors from a file.
pub fn load_vectors(path: &Path) -> Result<VocabularyIndex> {
    let file = std::fs::File::open(path).map_err(|e| {
        ScoperError::Config(format!("Cannot open vectors {}: {}", path.display(), e))
    })?;

    let index = parse_vectors(BufReader::new(file))?;
    info!(
        "Loaded {} pretrained vectors ({} dims) from {}",
        index.len(),
        index.dimensions(),
        path.display()
    );
    Ok(index)
}

/// Parse word2vec text format from any reader.
pub fn parse_vectors<R: BufRead>(reader: R) -> Result<VocabularyIndex> {
    let mut vectors = Vec::new();
    let mut seen = HashSet::new();
    let mut dims: Option<usize> = None;

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let mut fields = line.split_whitespace();
        let Some(token) = fields.next() else {
            continue;
        };
        let values: Vec<&str> = fields.collect();

        if line_no == 0 && values.len() == 1 && is_header(token, values[0]) {
            dims = values[0].parse().ok();
            continue;
        }

        let vector = values
            .iter()
            .map(|v| v.parse::<f32>())
            .collect::<std::result::Result<Vec<f32>, _>>()
            .map_err(|e| {
                ScoperError::Embedding(format!("Line {}: bad vector value: {}", line_no + 1, e))
            })?;

        match dims {
            Some(d) if d != vector.len() => {
                return Err(ScoperError::Embedding(format!(
                    "Line {}: expected {} dimensions, found {}",
                    line_no + 1,
                    d,
                    vector.len()
                )));
            }
            None => dims = Some(vector.len()),
            _ => {}
        }

        let token = token.to_lowercase();
        if seen.insert(token.clone()) {
            vectors.push((token, vector));
        } else {
            warn!("Duplicate token {:?} on line {}, keeping the first", token, line_no + 1);
        }
    }

    VocabularyIndex::from_vectors(vectors)
}

fn is_header(first: &str, second: &str) -> bool {
    first.parse::<usize>().is_ok() && second.parse::<usize>().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_parse_with_header() {
        let text = "3 2\ncat 1.0 0.0\nDog 0.8 0.6\ncar -1.0 0.0\n";
        let index = parse_vectors(Cursor::new(text)).unwrap();

        assert_eq!(index.len(), 3);
        assert_eq!(index.dimensions(), 2);
        assert!(index.contains("dog"));
        assert!((index.similarity("cat", "dog").unwrap() - 0.8).abs() < 1e-6);
        assert!((index.similarity("cat", "car").unwrap() + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_parse_without_header_keeps_first_duplicate() {
        let text = "cat 1.0 0.0\nCAT 0.0 1.0\n";
        let index = parse_vectors(Cursor::new(text)).unwrap();

        assert_eq!(index.len(), 1);
        assert_eq!(index.vector_of("cat"), Some(&[1.0, 0.0][..]));
    }

    #[test]
    fn test_parse_rejects_ragged_rows() {
        let text = "cat 1.0 0.0\ndog 1.0\n";
        assert!(matches!(
            parse_vectors(Cursor::new(text)),
            Err(ScoperError::Embedding(_))
        ));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let text = "cat 1.0 zero\n";
        assert!(parse_vectors(Cursor::new(text)).is_err());
    }
}
