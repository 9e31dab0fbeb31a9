//! Documentation corpus
//!
//! Versioned, read-only list of sections and articles. The built-in corpus is
//! embedded at compile time; deployments may point `docs.corpus_path` at their
//! own YAML file with the same shape.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

use crate::types::{BugsightError, Result};

const BUILTIN_CORPUS: &str = include_str!("corpus.yaml");

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocArticle {
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocSection {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub articles: Vec<DocArticle>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Corpus {
    pub version: String,
    pub sections: Vec<DocSection>,
}

impl Corpus {
    /// The corpus shipped with the binary
    pub fn builtin() -> Result<Self> {
        Self::from_yaml(BUILTIN_CORPUS)
    }

    pub fn from_yaml(source: &str) -> Result<Self> {
        let corpus: Corpus = serde_yaml::from_str(source)?;
        corpus.check_ids()?;
        Ok(corpus)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        let corpus = Self::from_yaml(&source)?;
        info!(
            path = %path.display(),
            version = %corpus.version,
            sections = corpus.sections.len(),
            "Loaded documentation corpus"
        );
        Ok(corpus)
    }

    pub fn article_count(&self) -> usize {
        self.sections.iter().map(|s| s.articles.len()).sum()
    }

    /// Section ids must be unique; article ids must be unique within a section.
    fn check_ids(&self) -> Result<()> {
        let mut sections = HashSet::new();
        for section in &self.sections {
            if !sections.insert(section.id.as_str()) {
                return Err(BugsightError::Corpus(format!(
                    "duplicate section id '{}'",
                    section.id
                )));
            }

            let mut articles = HashSet::new();
            for article in &section.articles {
                if !articles.insert(article.id.as_str()) {
                    return Err(BugsightError::Corpus(format!(
                        "duplicate article id '{}' in section '{}'",
                        article.id, section.id
                    )));
                }
            }
        }
        Ok(())
    }
}
