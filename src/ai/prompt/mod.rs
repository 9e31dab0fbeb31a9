//! Prompt Builder System
//!
//! Standardized prompt construction for model calls, plus the fixed system
//! prompts and user prompts used by the bug analysis pipeline.

use crate::types::{BugReport, Result, ScreenshotAnalysis, VideoAnalysis};

/// Prompt section types
#[derive(Debug, Clone)]
pub enum PromptSection {
    /// Role definition with expertise area
    Role { expertise: String, task: String },
    /// Numbered objectives
    Objectives(Vec<String>),
    /// Ordered key-value pairs
    Context(Vec<(String, String)>),
    /// Raw text section with optional header
    Text {
        header: Option<String>,
        content: String,
    },
    /// Code block with language
    Code { language: String, content: String },
}

/// Prompt builder for consistent prompt construction
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    sections: Vec<PromptSection>,
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a role definition section
    pub fn role(mut self, expertise: &str, task: &str) -> Self {
        self.sections.push(PromptSection::Role {
            expertise: expertise.to_string(),
            task: task.to_string(),
        });
        self
    }

    /// Add objectives section
    pub fn objectives(mut self, objectives: Vec<&str>) -> Self {
        self.sections.push(PromptSection::Objectives(
            objectives.into_iter().map(String::from).collect(),
        ));
        self
    }

    /// Add a context item, appending to the first context section
    pub fn context_item(mut self, key: &str, value: &str) -> Self {
        let item = (key.to_string(), value.to_string());
        match self.sections.iter_mut().find_map(|s| match s {
            PromptSection::Context(items) => Some(items),
            _ => None,
        }) {
            Some(items) => items.push(item),
            None => self.sections.push(PromptSection::Context(vec![item])),
        }
        self
    }

    /// Add text section
    pub fn text(mut self, content: &str) -> Self {
        self.sections.push(PromptSection::Text {
            header: None,
            content: content.to_string(),
        });
        self
    }

    /// Add text section with header
    pub fn section(mut self, header: &str, content: &str) -> Self {
        self.sections.push(PromptSection::Text {
            header: Some(header.to_string()),
            content: content.to_string(),
        });
        self
    }

    /// Add code block
    pub fn code(mut self, language: &str, content: &str) -> Self {
        self.sections.push(PromptSection::Code {
            language: language.to_string(),
            content: content.to_string(),
        });
        self
    }

    /// Build the final prompt string
    pub fn build(self) -> String {
        let mut prompt = String::new();

        for section in self.sections {
            match section {
                PromptSection::Role { expertise, task } => {
                    prompt.push_str(&format!(
                        "You are an expert {} specializing in {}.\n\n",
                        expertise, task
                    ));
                }
                PromptSection::Objectives(objectives) => {
                    for (i, obj) in objectives.iter().enumerate() {
                        prompt.push_str(&format!("{}. {}\n", i + 1, obj));
                    }
                    prompt.push('\n');
                }
                PromptSection::Context(items) => {
                    for (key, value) in items {
                        prompt.push_str(&format!("**{}**: {}\n", key, value));
                    }
                    prompt.push('\n');
                }
                PromptSection::Text { header, content } => {
                    if let Some(h) = header {
                        prompt.push_str(&format!("# {}\n\n", h));
                    }
                    prompt.push_str(&content);
                    prompt.push_str("\n\n");
                }
                PromptSection::Code { language, content } => {
                    prompt.push_str(&format!("```{}\n", language));
                    prompt.push_str(&content);
                    prompt.push_str("\n```\n\n");
                }
            }
        }

        prompt.trim_end().to_string()
    }
}

// =============================================================================
// Bug analysis prompts
// =============================================================================

pub const SCREENSHOT_SYSTEM_PROMPT: &str = r#"You analyze screenshots attached to bug reports for a health-challenge web platform.
Describe what the screenshot shows and identify anything that looks broken.

Respond ONLY with valid JSON matching this shape:
{
  "description": "what the screenshot shows",
  "visibleErrors": ["error messages or broken states visible on screen"],
  "uiElements": ["notable UI elements on screen"],
  "potentialIssues": ["likely problems suggested by the screenshot"]
}"#;

pub const VIDEO_SYSTEM_PROMPT: &str = r#"You analyze screen recordings attached to bug reports for a health-challenge web platform.
Only the recording's reference is available; infer what you can from it and the report.

Respond ONLY with valid JSON matching this shape:
{
  "description": "what the recording shows",
  "reproductionSteps": ["ordered steps to reproduce the bug"],
  "userActions": ["actions the user takes"],
  "timestamps": [{"seconds": 0, "description": "notable moment"}],
  "errorMoments": [{"seconds": 0, "description": "moment the bug appears"}]
}"#;

pub const MASTER_SYSTEM_PROMPT: &str = r#"You are a senior support engineer diagnosing bug reports for a health-challenge web platform.
Use the platform documentation and any attachment analyses to find the most likely cause.

Respond ONLY with valid JSON matching this shape:
{
  "summary": "one or two sentence summary of the problem",
  "suggestedCause": "most likely root cause",
  "suggestedSolutions": [
    {
      "title": "short title",
      "description": "what to do and why",
      "steps": ["ordered steps"],
      "estimatedEffort": "quick | moderate | significant",
      "confidence": "low | medium | high"
    }
  ],
  "relatedDocs": [
    {"sectionId": "documentation section id", "articleId": "documentation article id", "relevance": "why this article applies"}
  ],
  "confidence": "low | medium | high"
}"#;

/// User prompts for each model call of an analysis
pub struct BugPrompts;

impl BugPrompts {
    fn bug_fields(builder: PromptBuilder, bug: &BugReport) -> PromptBuilder {
        builder
            .context_item("Title", &bug.title)
            .context_item("Description", &bug.description)
            .context_item("Severity", &bug.severity.to_string())
            .context_item("Category", &bug.category.to_string())
            .context_item("Page URL", &bug.page_url)
    }

    pub fn screenshot(bug: &BugReport) -> String {
        Self::bug_fields(
            PromptBuilder::new()
                .role("QA analyst", "visual bug triage")
                .text("Analyze the attached screenshot for this bug report."),
            bug,
        )
        .build()
    }

    pub fn video(bug: &BugReport) -> String {
        Self::bug_fields(
            PromptBuilder::new()
                .role("QA analyst", "reproducing bugs from screen recordings")
                .text("Analyze the screen recording referenced below for this bug report."),
            bug,
        )
        .build()
    }

    /// Documentation context, bug fields, attachment analyses, citation instruction
    pub fn master(
        bug: &BugReport,
        documentation: &str,
        screenshot: Option<&ScreenshotAnalysis>,
        video: Option<&VideoAnalysis>,
    ) -> Result<String> {
        let mut builder = PromptBuilder::new()
            .text(documentation)
            .section("Bug Report", "");
        builder = Self::bug_fields(builder, bug);

        if let Some(analysis) = screenshot {
            builder = builder
                .section("Screenshot Analysis", "")
                .code("json", &serde_json::to_string_pretty(analysis)?);
        }
        if let Some(analysis) = video {
            builder = builder
                .section("Video Analysis", "")
                .code("json", &serde_json::to_string_pretty(analysis)?);
        }

        Ok(builder
            .objectives(vec![
                "Identify the most likely cause of this bug",
                "Suggest concrete solutions with ordered steps",
                "Cite the documentation articles you relied on in relatedDocs using their section and article ids",
            ])
            .build())
    }
}
