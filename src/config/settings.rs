//! Configuration settings for Scoper.

use crate::ranking::SearchMode;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub captions: CaptionSettings,
    pub search: SearchSettings,
    pub embedding: EmbeddingSettings,
    pub server: ServerSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
        }
    }
}

/// Caption fetching settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptionSettings {
    /// Preferred caption languages, in priority order.
    pub languages: Vec<String>,
    /// Timeout for each HTTP request to the caption service.
    pub timeout_seconds: u64,
    /// User agent sent with caption requests.
    pub user_agent: String,
}

impl Default for CaptionSettings {
    fn default() -> Self {
        Self {
            languages: vec!["en".to_string()],
            timeout_seconds: 30,
            user_agent: concat!("scoper/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Search defaults used when a request does not specify them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Default ranking mode.
    pub mode: SearchMode,
    /// Default number of results.
    pub limit: i64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            mode: SearchMode::Fuzzy,
            limit: 10,
        }
    }
}

/// Where the embedding model comes from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CorpusKind {
    /// Small English reference corpus shipped with the binary.
    #[default]
    Builtin,
    /// Line-oriented text file, one sentence per line.
    File,
    /// Pretrained vectors in word2vec text format.
    Pretrained,
}

impl std::str::FromStr for CorpusKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "builtin" | "small" => Ok(CorpusKind::Builtin),
            "file" | "large" => Ok(CorpusKind::File),
            "pretrained" | "vectors" => Ok(CorpusKind::Pretrained),
            _ => Err(format!("Unknown corpus kind: {}", s)),
        }
    }
}

impl std::fmt::Display for CorpusKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CorpusKind::Builtin => write!(f, "builtin"),
            CorpusKind::File => write!(f, "file"),
            CorpusKind::Pretrained => write!(f, "pretrained"),
        }
    }
}

/// Embedding model bootstrap settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Corpus kind (builtin, file, pretrained).
    pub corpus: CorpusKind,
    /// Path to the corpus or vector file (for file and pretrained).
    pub corpus_path: Option<String>,
    /// Embedding dimensions.
    pub dimensions: usize,
    /// Context window on each side of the center word.
    pub window: usize,
    /// Negative samples per positive pair.
    pub negative: usize,
    /// Passes over the corpus.
    pub epochs: usize,
    /// Initial learning rate.
    pub learning_rate: f32,
    /// Downsampling threshold for frequent words (0 disables it).
    pub sample: f64,
    /// Seed for weight initialization and sampling.
    pub seed: u64,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            corpus: CorpusKind::Builtin,
            corpus_path: None,
            dimensions: 100,
            window: 5,
            negative: 5,
            epochs: 10,
            learning_rate: 0.05,
            sample: 1e-3,
            seed: 1,
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Host to bind to.
    pub host: String,
    /// Port to bind to.
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
        }
    }
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::ScoperError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("scoper")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded corpus path, if one is configured.
    pub fn corpus_path(&self) -> Option<PathBuf> {
        self.embedding
            .corpus_path
            .as_deref()
            .map(Self::expand_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_from(Some(&dir.path().join("nope.toml"))).unwrap();

        assert_eq!(settings.captions.languages, vec!["en".to_string()]);
        assert_eq!(settings.search.mode, SearchMode::Fuzzy);
        assert_eq!(settings.embedding.corpus, CorpusKind::Builtin);
        assert_eq!(settings.server.port, 5000);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[search]
mode = "SEMANTIC"
limit = 3

[embedding]
corpus = "file"
corpus_path = "~/corpus.txt"
"#,
        )
        .unwrap();

        let settings = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(settings.search.mode, SearchMode::Semantic);
        assert_eq!(settings.search.limit, 3);
        assert_eq!(settings.embedding.corpus, CorpusKind::File);
        assert_eq!(settings.embedding.window, 5);
        assert_eq!(settings.embedding.sample, 1e-3);
        assert!(settings.corpus_path().is_some());
        assert!(!settings.corpus_path().unwrap().starts_with("~"));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut settings = Settings::default();
        settings.captions.languages = vec!["de".to_string(), "en".to_string()];
        settings.save_to(&path).unwrap();

        let reloaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(reloaded.captions.languages, settings.captions.languages);
    }

    #[test]
    fn test_corpus_kind_from_str() {
        assert_eq!("builtin".parse::<CorpusKind>().unwrap(), CorpusKind::Builtin);
        assert_eq!("Pretrained".parse::<CorpusKind>().unwrap(), CorpusKind::Pretrained);
        assert!("brown".parse::<CorpusKind>().is_err());
    }
}
