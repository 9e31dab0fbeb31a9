//! Documentation context for bug analysis prompts
//!
//! Derives topic tags from the bug's page path, category and description via
//! fixed rule tables, searches the index with them, and renders the matching
//! articles in full. When nothing matches, the whole corpus is rendered so the
//! model always has some grounding.

use std::sync::Arc;
use tracing::{debug, info, instrument};

use super::index::{DocumentationIndex, SearchHit};
use crate::types::BugCategory;

/// Page path fragment → topic tag
const PAGE_RULES: &[(&[&str], &str)] = &[
    (&["/admin"], "admin"),
    (&["/dashboard"], "dashboard"),
    (&["/course"], "course"),
    (&["/profile"], "profile"),
    (&["/roster"], "roster"),
    (&["/quiz"], "quiz"),
    (&["/login", "/register"], "authentication"),
];

/// Description vocabulary → topic tag
const DESCRIPTION_RULES: &[(&[&str], &str)] = &[
    (
        &["login", "log in", "sign in", "password", "logout", "session"],
        "authentication",
    ),
    (&["track", "habit", "check-in", "check in", "streak"], "tracking"),
    (
        &["video", "image", "photo", "upload", "screenshot", "recording"],
        "media",
    ),
    (
        &["payment", "pay ", "charge", "checkout", "refund", "card"],
        "payment",
    ),
    (&["referral", "invite", "refer "], "referral"),
    (&["bug", "report", "crash", "error"], "bug"),
];

fn category_tag(category: BugCategory) -> &'static str {
    match category {
        BugCategory::Ui => "interface",
        BugCategory::Functionality => "functionality",
        BugCategory::Performance => "performance",
        BugCategory::Data => "data",
        BugCategory::Other => "troubleshooting",
    }
}

/// Builds the documentation context string for one bug report
#[derive(Debug, Clone)]
pub struct ContextBuilder {
    index: Arc<DocumentationIndex>,
}

impl ContextBuilder {
    pub fn new(index: Arc<DocumentationIndex>) -> Self {
        Self { index }
    }

    /// Topic tags for a bug, deduplicated, in rule order (page, category, description)
    pub fn keywords(page_url: &str, category: BugCategory, description: &str) -> Vec<&'static str> {
        let mut tags: Vec<&'static str> = Vec::new();
        let mut push = |tag: &'static str| {
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        };

        let page = page_url.to_lowercase();
        for (fragments, tag) in PAGE_RULES {
            if fragments.iter().any(|f| page.contains(*f)) {
                push(*tag);
            }
        }

        push(category_tag(category));

        let text = description.to_lowercase();
        for (terms, tag) in DESCRIPTION_RULES {
            if terms.iter().any(|t| text.contains(*t)) {
                push(*tag);
            }
        }

        tags
    }

    #[instrument(skip(self, description), fields(category = %category))]
    pub fn build(&self, page_url: &str, category: BugCategory, description: &str) -> String {
        let query = Self::keywords(page_url, category, description).join(" ");
        let hits = self.index.search(&query);

        if hits.is_empty() {
            info!(query = %query, "No documentation matched, using full corpus");
            return self.render_all();
        }

        debug!(query = %query, hits = hits.len(), "Documentation context selected");
        self.render_hits(&hits)
    }

    fn render_hits(&self, hits: &[SearchHit]) -> String {
        let mut context = String::from("# Relevant Documentation\n\n");
        for hit in hits {
            let Some((section, article)) = self.index.article(&hit.section_id, &hit.article_id)
            else {
                continue;
            };
            context.push_str(&format!(
                "## {}\n### {}\n{}\n\n",
                section.title, article.title, article.content
            ));
        }
        context
    }

    fn render_all(&self) -> String {
        let mut context = String::from("# Platform Documentation\n\n");
        for section in self.index.sections() {
            context.push_str(&format!("## {}\n\n", section.title));
            for article in &section.articles {
                context.push_str(&format!("### {}\n{}\n\n", article.title, article.content));
            }
        }
        context
    }
}
