//! CLI Common Utilities
//!
//! Shared initialization for CLI commands: configuration, the documentation
//! index and the blob store backing internal media references.

use std::path::Path;
use std::sync::Arc;
use tracing::debug;

use crate::config::{Config, ConfigLoader};
use crate::docs::{Corpus, DocumentationIndex};
use crate::media::{FsBlobStore, MemoryBlobStore, SharedBlobStore};
use crate::types::Result;

/// Command execution context
#[derive(Debug, Clone)]
pub struct CommandContext {
    /// Loaded configuration
    pub config: Config,
    /// Shared read-only documentation index
    pub index: Arc<DocumentationIndex>,
}

impl CommandContext {
    /// Load configuration (explicit file, or the layered sources) and the corpus
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let config = match config_path {
            Some(path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load()?,
        };

        let corpus = match &config.docs.corpus_path {
            Some(path) => Corpus::load(path)?,
            None => Corpus::builtin()?,
        };
        debug!(
            version = %corpus.version,
            articles = corpus.article_count(),
            "Documentation corpus loaded"
        );

        Ok(Self {
            index: Arc::new(DocumentationIndex::new(corpus)),
            config,
        })
    }

    /// Filesystem store when `media.storage_root` is set, otherwise an empty store
    pub fn blob_store(&self) -> SharedBlobStore {
        match &self.config.media.storage_root {
            Some(root) => Arc::new(FsBlobStore::new(root)),
            None => Arc::new(MemoryBlobStore::new()),
        }
    }
}

/// Output format shared by commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn parse(s: &str) -> std::result::Result<Self, String> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid format '{}'. Valid values: text, json", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_output_format_parse() {
        assert_eq!(OutputFormat::parse("JSON").unwrap(), OutputFormat::Json);
        assert_eq!(OutputFormat::parse("text").unwrap(), OutputFormat::Text);
        assert!(OutputFormat::parse("yaml").is_err());
    }

    #[test]
    fn test_load_with_external_corpus() {
        let dir = TempDir::new().unwrap();
        let corpus_path = dir.path().join("corpus.yaml");
        std::fs::write(
            &corpus_path,
            "version: \"9\"\nsections:\n  - id: s\n    title: S\n    articles:\n      - {id: a, title: A, content: body}\n",
        )
        .unwrap();
        let config_path = dir.path().join("config.toml");
        std::fs::write(
            &config_path,
            format!("[docs]\ncorpus_path = {:?}\n", corpus_path.display().to_string()),
        )
        .unwrap();

        let ctx = CommandContext::load(Some(&config_path)).unwrap();
        assert_eq!(ctx.index.corpus().version, "9");
    }
}
