//! Keyword-weighted documentation search
//!
//! Relevance per article is `10 × title hits + 5 × tag hits + 1 × content hits`,
//! counting each query term once per field. Matching is case-insensitive
//! substring matching. Ties keep corpus order.

use serde::Serialize;
use tracing::{debug, instrument};

use super::corpus::{Corpus, DocArticle, DocSection};
use crate::constants::search;

/// Ranked search result
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    pub section_id: String,
    pub section_title: String,
    pub article_id: String,
    pub article_title: String,
    pub relevance: u32,
    pub excerpt: String,
}

/// Pre-folded copy of an article so queries don't re-lowercase the corpus
struct IndexedArticle {
    section: usize,
    article: usize,
    title: Vec<char>,
    tags: Vec<Vec<char>>,
    content: Vec<char>,
    folded_content: Vec<char>,
}

/// In-memory, read-only search index over a [`Corpus`].
///
/// Built once at startup and shared by reference (`Arc<DocumentationIndex>`);
/// safe for concurrent readers.
pub struct DocumentationIndex {
    corpus: Corpus,
    entries: Vec<IndexedArticle>,
}

impl std::fmt::Debug for DocumentationIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentationIndex")
            .field("version", &self.corpus.version)
            .field("articles", &self.entries.len())
            .finish()
    }
}

impl DocumentationIndex {
    pub fn new(corpus: Corpus) -> Self {
        let mut entries = Vec::with_capacity(corpus.article_count());
        for (section_idx, section) in corpus.sections.iter().enumerate() {
            for (article_idx, article) in section.articles.iter().enumerate() {
                entries.push(IndexedArticle {
                    section: section_idx,
                    article: article_idx,
                    title: fold(&article.title),
                    tags: article.tags.iter().map(|t| fold(t)).collect(),
                    content: article.content.chars().collect(),
                    folded_content: fold(&article.content),
                });
            }
        }

        Self { corpus, entries }
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn sections(&self) -> &[DocSection] {
        &self.corpus.sections
    }

    /// Direct lookup by ids
    pub fn article(&self, section_id: &str, article_id: &str) -> Option<(&DocSection, &DocArticle)> {
        let section = self.corpus.sections.iter().find(|s| s.id == section_id)?;
        let article = section.articles.iter().find(|a| a.id == article_id)?;
        Some((section, article))
    }

    /// Rank articles against a whitespace-separated query.
    ///
    /// Terms of two characters or fewer are ignored. Returns at most five hits,
    /// highest relevance first; articles scoring zero are never returned.
    #[instrument(skip(self), level = "debug")]
    pub fn search(&self, query: &str) -> Vec<SearchHit> {
        let terms: Vec<Vec<char>> = query
            .split_whitespace()
            .filter(|t| t.chars().count() > search::MIN_TERM_LEN)
            .map(fold)
            .collect();

        if terms.is_empty() {
            debug!("No usable search terms");
            return Vec::new();
        }

        let mut scored: Vec<(&IndexedArticle, u32)> = self
            .entries
            .iter()
            .map(|entry| (entry, score(entry, &terms)))
            .filter(|(_, relevance)| *relevance > 0)
            .collect();

        // sort_by is stable: equal scores keep corpus order
        scored.sort_by(|a, b| b.1.cmp(&a.1));

        let hits: Vec<SearchHit> = scored
            .into_iter()
            .take(search::MAX_HITS)
            .map(|(entry, relevance)| {
                let section = &self.corpus.sections[entry.section];
                let article = &section.articles[entry.article];
                SearchHit {
                    section_id: section.id.clone(),
                    section_title: section.title.clone(),
                    article_id: article.id.clone(),
                    article_title: article.title.clone(),
                    relevance,
                    excerpt: excerpt(entry, &terms),
                }
            })
            .collect();

        debug!(terms = terms.len(), hits = hits.len(), "Documentation search complete");
        hits
    }
}

fn score(entry: &IndexedArticle, terms: &[Vec<char>]) -> u32 {
    terms
        .iter()
        .map(|term| {
            let mut relevance = 0;
            if contains(&entry.title, term) {
                relevance += search::TITLE_WEIGHT;
            }
            if entry.tags.iter().any(|tag| contains(tag, term)) {
                relevance += search::TAG_WEIGHT;
            }
            if contains(&entry.folded_content, term) {
                relevance += search::CONTENT_WEIGHT;
            }
            relevance
        })
        .sum()
}

/// Window around the first term that occurs in the content, or the opening
/// characters when none does.
fn excerpt(entry: &IndexedArticle, terms: &[Vec<char>]) -> String {
    let content = &entry.content;

    for term in terms {
        if let Some(pos) = find(&entry.folded_content, term) {
            let start = pos.saturating_sub(search::EXCERPT_BEFORE);
            let end = (pos + search::EXCERPT_AFTER).min(content.len());
            let window: String = content[start..end].iter().collect();
            return format!("...{}...", window.trim());
        }
    }

    let head: String = content.iter().take(search::EXCERPT_FALLBACK_LEN).collect();
    format!("{}...", head)
}

/// Lowercase char-for-char so folded offsets line up with the original text
pub(crate) fn fold(s: &str) -> Vec<char> {
    s.chars()
        .map(|c| c.to_lowercase().next().unwrap_or(c))
        .collect()
}

fn find(haystack: &[char], needle: &[char]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    if needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn contains(haystack: &[char], needle: &[char]) -> bool {
    find(haystack, needle).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> DocumentationIndex {
        let corpus = Corpus::from_yaml(
            r#"
version: "test"
sections:
  - id: alpha
    title: Alpha
    articles:
      - id: content-only
        title: General Notes
        tags: [misc]
        content: The widget sometimes fails to render on slow devices.
      - id: title-match
        title: Widget Rendering
        tags: [ui]
        content: Rendering pipeline overview.
  - id: beta
    title: Beta
    articles:
      - id: tagged
        title: Tagged Article
        tags: [widget]
        content: Nothing relevant here.
      - id: unrelated
        title: Unrelated
        tags: []
        content: Completely different topic.
"#,
        )
        .unwrap();
        DocumentationIndex::new(corpus)
    }

    #[test]
    fn test_title_match_outranks_content_match() {
        let index = fixture();
        let hits = index.search("widget");

        let ids: Vec<&str> = hits.iter().map(|h| h.article_id.as_str()).collect();
        assert_eq!(ids, vec!["title-match", "tagged", "content-only"]);
        assert_eq!(hits[0].relevance, 10);
        assert_eq!(hits[1].relevance, 5);
        assert_eq!(hits[2].relevance, 1);
    }

    #[test]
    fn test_weights_accumulate_per_term() {
        let index = fixture();
        // "widget" hits title (10), "rendering" hits title (10) and content (1)
        let hits = index.search("Widget RENDERING");
        assert_eq!(hits[0].article_id, "title-match");
        assert_eq!(hits[0].relevance, 21);
    }

    #[test]
    fn test_short_terms_ignored() {
        let index = fixture();
        assert!(index.search("ui of").is_empty());
        assert!(index.search("   ").is_empty());
    }

    #[test]
    fn test_zero_relevance_excluded() {
        let index = fixture();
        let hits = index.search("nonexistentterm");
        assert!(hits.is_empty());
    }

    #[test]
    fn test_ties_keep_corpus_order() {
        let index = fixture();
        // each term matches the content of exactly one article
        let hits = index.search("different pipeline");
        let ids: Vec<&str> = hits.iter().map(|h| h.article_id.as_str()).collect();
        assert_eq!(ids, vec!["title-match", "unrelated"]);
    }

    #[test]
    fn test_excerpt_window_around_term() {
        let index = fixture();
        let hits = index.search("slow");
        assert_eq!(hits.len(), 1);
        assert_eq!(
            hits[0].excerpt,
            "...The widget sometimes fails to render on slow devices...."
        );
    }

    #[test]
    fn test_excerpt_fallback_without_content_match() {
        let index = fixture();
        let hits = index.search("tagged");
        assert_eq!(hits[0].article_id, "tagged");
        assert_eq!(hits[0].excerpt, "Nothing relevant here....");
    }

    #[test]
    fn test_excerpt_is_bounded() {
        let long = "x".repeat(400);
        let corpus = Corpus::from_yaml(&format!(
            "version: \"1\"\nsections:\n  - id: s\n    title: S\n    articles:\n      - id: a\n        title: A\n        content: \"{long} needle {long}\"\n"
        ))
        .unwrap();
        let index = DocumentationIndex::new(corpus);

        let hits = index.search("needle");
        let excerpt = &hits[0].excerpt;
        assert!(excerpt.starts_with("..."));
        assert!(excerpt.ends_with("..."));
        assert!(excerpt.contains("needle"));
        assert_eq!(excerpt.chars().count(), 150 + 6);

        let fallback = index.search("aaa");
        assert!(fallback.is_empty());
    }

    #[test]
    fn test_at_most_five_hits() {
        let index = DocumentationIndex::new(Corpus::builtin().unwrap());
        let hits = index.search("the and for with page");
        assert!(hits.len() <= 5);
    }

    #[test]
    fn test_article_lookup() {
        let index = fixture();
        let (section, article) = index.article("beta", "tagged").unwrap();
        assert_eq!(section.title, "Beta");
        assert_eq!(article.title, "Tagged Article");
        assert!(index.article("beta", "missing").is_none());
    }
}
