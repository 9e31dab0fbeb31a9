//! Core data types for the analysis pipeline

pub mod analysis;
pub mod error;
pub mod report;

pub use analysis::{
    AnalysisResult, Confidence, DocReference, EstimatedEffort, ScreenshotAnalysis,
    SuggestedSolution, VideoAnalysis, VideoMoment,
};
pub use error::{BugsightError, ErrorCategory, Result};
pub use report::{BugCategory, BugReport, Severity};
