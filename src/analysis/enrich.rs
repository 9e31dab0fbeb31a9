//! Documentation citation enrichment
//!
//! The model cites articles by id only. Each citation is looked up again
//! through the search index to recover canonical titles and an excerpt; a
//! citation that cannot be matched keeps readable titles derived from its ids.

use serde::Deserialize;
use tracing::{debug, instrument};

use crate::docs::DocumentationIndex;
use crate::types::DocReference;

/// Citation as returned by the model
#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct CitedDoc {
    pub section_id: String,
    pub article_id: String,
    pub relevance: String,
}

#[instrument(level = "debug", skip_all, fields(citations = cited.len()))]
pub fn enrich_references(index: &DocumentationIndex, cited: &[CitedDoc]) -> Vec<DocReference> {
    cited.iter().map(|doc| enrich_one(index, doc)).collect()
}

fn enrich_one(index: &DocumentationIndex, doc: &CitedDoc) -> DocReference {
    let query = format!("{} {}", doc.section_id, doc.article_id);
    let matched = index
        .search(&query)
        .into_iter()
        .find(|hit| hit.section_id == doc.section_id && hit.article_id == doc.article_id);

    match matched {
        Some(hit) => DocReference {
            section_id: hit.section_id,
            section_title: hit.section_title,
            article_id: hit.article_id,
            article_title: hit.article_title,
            relevance: doc.relevance.clone(),
            excerpt: Some(hit.excerpt),
        },
        None => {
            debug!(section = %doc.section_id, article = %doc.article_id, "Citation not found in corpus");
            DocReference {
                section_id: doc.section_id.clone(),
                section_title: title_from_id(&doc.section_id),
                article_id: doc.article_id.clone(),
                article_title: title_from_id(&doc.article_id),
                relevance: doc.relevance.clone(),
                excerpt: None,
            }
        }
    }
}

/// `"login-troubleshooting"` → `"Login Troubleshooting"`
pub fn title_from_id(id: &str) -> String {
    id.split('-')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
