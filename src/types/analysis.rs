//! Analysis output types
//!
//! `AnalysisResult` is the pipeline's only output. Every field except the
//! bookkeeping ones is optional so a partially failed run still produces a
//! well-formed record.

use serde::{Deserialize, Serialize};

/// Model self-reported certainty
///
/// Deserialization is case-insensitive; unrecognized values become `Low`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Confidence {
    #[default]
    Low,
    Medium,
    High,
}

impl From<String> for Confidence {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "high" => Confidence::High,
            "medium" | "moderate" => Confidence::Medium,
            _ => Confidence::Low,
        }
    }
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Confidence::Low => write!(f, "low"),
            Confidence::Medium => write!(f, "medium"),
            Confidence::High => write!(f, "high"),
        }
    }
}

/// Unrecognized or miscased values fall back like [`Confidence`], to `Moderate`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum EstimatedEffort {
    Quick,
    #[default]
    Moderate,
    Significant,
}

impl From<String> for EstimatedEffort {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "quick" | "low" | "small" => EstimatedEffort::Quick,
            "significant" | "high" | "large" => EstimatedEffort::Significant,
            _ => EstimatedEffort::Moderate,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct SuggestedSolution {
    pub title: String,
    pub description: String,
    pub steps: Vec<String>,
    pub estimated_effort: EstimatedEffort,
    pub confidence: Confidence,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ScreenshotAnalysis {
    pub description: String,
    pub visible_errors: Vec<String>,
    pub ui_elements: Vec<String>,
    pub potential_issues: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct VideoMoment {
    pub seconds: f64,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct VideoAnalysis {
    pub description: String,
    pub reproduction_steps: Vec<String>,
    pub user_actions: Vec<String>,
    pub timestamps: Vec<VideoMoment>,
    pub error_moments: Vec<VideoMoment>,
}

/// Documentation citation after enrichment against the corpus
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DocReference {
    pub section_id: String,
    pub section_title: String,
    pub article_id: String,
    pub article_title: String,
    /// Model-supplied rationale for the citation
    pub relevance: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub summary: String,
    pub suggested_cause: String,
    pub suggested_solutions: Vec<SuggestedSolution>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot_analysis: Option<ScreenshotAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_analysis: Option<VideoAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_docs: Option<Vec<DocReference>>,
    pub model_used: String,
    pub confidence: Confidence,
    pub processing_time_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalysisResult {
    pub fn is_degraded(&self) -> bool {
        self.error.is_some()
    }
}
