//! Fixed results for analyses that could not run or could not finish

use crate::types::{AnalysisResult, Confidence, EstimatedEffort, SuggestedSolution};

pub const NOT_CONFIGURED_SUMMARY: &str = "AI analysis not configured";
pub const FAILED_SUMMARY: &str = "Analysis failed";
pub const UNCONFIGURED_MODEL: &str = "none";

/// Result when gateway credentials are absent; no model call was made
pub fn not_configured(reason: &str, processing_time_ms: u64) -> AnalysisResult {
    AnalysisResult {
        summary: NOT_CONFIGURED_SUMMARY.to_string(),
        suggested_cause: "The model gateway credentials are missing, so the report was not analyzed."
            .to_string(),
        suggested_solutions: vec![SuggestedSolution {
            title: "Configure AI analysis".to_string(),
            description: "Provide the gateway account id, gateway id and model API key, then run the analysis again."
                .to_string(),
            steps: vec![
                "Set gateway.account_id (BUGSIGHT_GATEWAY__ACCOUNT_ID)".to_string(),
                "Set gateway.gateway_id (BUGSIGHT_GATEWAY__GATEWAY_ID)".to_string(),
                "Set gateway.api_key (BUGSIGHT_GATEWAY__API_KEY)".to_string(),
                "Re-run the analysis".to_string(),
            ],
            estimated_effort: EstimatedEffort::Quick,
            confidence: Confidence::High,
        }],
        screenshot_analysis: None,
        video_analysis: None,
        related_docs: None,
        model_used: UNCONFIGURED_MODEL.to_string(),
        confidence: Confidence::Low,
        processing_time_ms,
        error: Some(reason.to_string()),
    }
}

/// Result when any stage of a configured analysis failed
pub fn failed(error: &str, model: &str, processing_time_ms: u64) -> AnalysisResult {
    AnalysisResult {
        summary: FAILED_SUMMARY.to_string(),
        suggested_cause: "The automated analysis could not be completed.".to_string(),
        suggested_solutions: vec![SuggestedSolution {
            title: "Manual investigation required".to_string(),
            description: "Review the report and its attachments by hand.".to_string(),
            steps: vec![
                "Reproduce the issue on the reported page".to_string(),
                "Review the attached screenshot or recording".to_string(),
                "Check application logs around the time of the report".to_string(),
            ],
            estimated_effort: EstimatedEffort::Moderate,
            confidence: Confidence::Low,
        }],
        screenshot_analysis: None,
        video_analysis: None,
        related_docs: None,
        model_used: model.to_string(),
        confidence: Confidence::Low,
        processing_time_ms,
        error: Some(error.to_string()),
    }
}
