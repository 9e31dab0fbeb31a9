//! Bug Analysis Orchestrator
//!
//! Runs one bug report through the pipeline:
//!
//! 1. Configuring: refuse early (no network) when gateway credentials are absent.
//! 2. Analyzing: screenshot and video sub-analyses run concurrently and are
//!    best-effort; then documentation context, the master call, parsing and
//!    citation enrichment.
//! 3. Finalizing: elapsed time is recorded and any failure becomes a
//!    low-confidence result.
//!
//! [`BugAnalyzer::analyze`] returns an [`AnalysisResult`] for every input.

mod degraded;
mod enrich;

pub use degraded::{FAILED_SUMMARY, NOT_CONFIGURED_SUMMARY};
pub use enrich::{CitedDoc, enrich_references, title_from_id};

use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, error, info, info_span, instrument, warn};
use uuid::Uuid;

use crate::ai::{
    BugPrompts, MASTER_SYSTEM_PROMPT, ModelClient, ModelGateway, ModelRequest, ResponseParser,
    SCREENSHOT_SYSTEM_PROMPT, SharedModelClient, VIDEO_SYSTEM_PROMPT, with_deadline,
};
use crate::config::{AnalysisConfig, Config};
use crate::docs::{ContextBuilder, DocumentationIndex};
use crate::media::{MediaResolver, SharedBlobStore};
use crate::types::{
    AnalysisResult, BugReport, BugsightError, Confidence, Result, ScreenshotAnalysis,
    SuggestedSolution, VideoAnalysis,
};

/// Per-call analysis switches
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzeOptions {
    pub include_screenshot: bool,
    pub include_video: bool,
    /// Overall time limit; `None` waits for the model indefinitely
    pub deadline: Option<Duration>,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            include_screenshot: true,
            include_video: true,
            deadline: None,
        }
    }
}

impl From<&AnalysisConfig> for AnalyzeOptions {
    fn from(config: &AnalysisConfig) -> Self {
        Self {
            include_screenshot: config.include_screenshot,
            include_video: config.include_video,
            deadline: config.deadline_secs.map(Duration::from_secs),
        }
    }
}

/// Shape the master call returns; every field may be missing
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelDiagnosis {
    #[serde(default)]
    summary: String,
    #[serde(default)]
    suggested_cause: String,
    #[serde(default)]
    suggested_solutions: Vec<SuggestedSolution>,
    #[serde(default)]
    related_docs: Vec<CitedDoc>,
    #[serde(default)]
    confidence: Confidence,
}

enum Backend {
    Ready(SharedModelClient),
    Unconfigured { reason: String },
}

pub struct BugAnalyzer {
    index: Arc<DocumentationIndex>,
    context: ContextBuilder,
    media: Arc<MediaResolver>,
    backend: Backend,
    parser: ResponseParser,
}

impl std::fmt::Debug for BugAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BugAnalyzer")
            .field("index", &self.index)
            .field("configured", &self.is_configured())
            .finish()
    }
}

impl BugAnalyzer {
    pub fn new(
        index: Arc<DocumentationIndex>,
        media: Arc<MediaResolver>,
        client: SharedModelClient,
    ) -> Self {
        Self::with_backend(index, media, Backend::Ready(client))
    }

    /// Analyzer that answers every call with the "not configured" result
    pub fn unconfigured(
        index: Arc<DocumentationIndex>,
        media: Arc<MediaResolver>,
        reason: impl Into<String>,
    ) -> Self {
        Self::with_backend(
            index,
            media,
            Backend::Unconfigured {
                reason: reason.into(),
            },
        )
    }

    fn with_backend(
        index: Arc<DocumentationIndex>,
        media: Arc<MediaResolver>,
        backend: Backend,
    ) -> Self {
        Self {
            context: ContextBuilder::new(Arc::clone(&index)),
            index,
            media,
            backend,
            parser: ResponseParser::new(),
        }
    }

    /// Build from loaded configuration.
    ///
    /// Missing gateway credentials do not fail construction; the analyzer is
    /// created unconfigured instead. Errors are limited to HTTP client setup.
    pub fn from_config(
        config: &Config,
        index: Arc<DocumentationIndex>,
        store: SharedBlobStore,
    ) -> Result<Self> {
        let media = Arc::new(MediaResolver::new(&config.media, store)?);

        match config.gateway.settings(&config.generation) {
            Ok(settings) => {
                let gateway = ModelGateway::new(settings)?;
                Ok(Self::new(index, media, Arc::new(gateway)))
            }
            Err(e @ BugsightError::ConfigurationMissing { .. }) => {
                warn!(error = %e, category = %e.category(), "Model gateway not configured");
                Ok(Self::unconfigured(index, media, e.to_string()))
            }
            Err(e) => Err(e),
        }
    }

    pub fn is_configured(&self) -> bool {
        matches!(self.backend, Backend::Ready(_))
    }

    /// Analyze a bug report. Never fails; problems are reported in the result.
    pub async fn analyze(&self, bug: &BugReport, options: &AnalyzeOptions) -> AnalysisResult {
        self.analyze_with_cancel(bug, options, CancellationToken::new())
            .await
    }

    /// [`analyze`](Self::analyze) with caller-driven cancellation
    pub async fn analyze_with_cancel(
        &self,
        bug: &BugReport,
        options: &AnalyzeOptions,
        cancel: CancellationToken,
    ) -> AnalysisResult {
        let correlation_id = Uuid::new_v4();
        let span = info_span!("bug_analysis", report_id = %bug.id, correlation_id = %correlation_id);

        async move {
            let started = Instant::now();

            let client = match &self.backend {
                Backend::Ready(client) => client,
                Backend::Unconfigured { reason } => {
                    warn!(reason = %reason, "Skipping analysis, gateway not configured");
                    return degraded::not_configured(reason, elapsed_ms(started));
                }
            };

            info!(
                severity = %bug.severity,
                category = %bug.category,
                screenshot = bug.screenshot_ref.is_some(),
                video = bug.video_ref.is_some(),
                "Analysis started"
            );

            let outcome = with_deadline(
                options.deadline,
                &cancel,
                self.run(client.as_ref(), bug, options),
                "bug analysis",
            )
            .await;

            let processing_time_ms = elapsed_ms(started);
            match outcome {
                Ok(mut result) => {
                    result.processing_time_ms = processing_time_ms;
                    info!(
                        confidence = %result.confidence,
                        solutions = result.suggested_solutions.len(),
                        processing_time_ms,
                        "Analysis complete"
                    );
                    result
                }
                Err(e) => {
                    error!(error = %e, category = %e.category(), processing_time_ms, "Analysis failed");
                    degraded::failed(&e.to_string(), client.model(), processing_time_ms)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn run(
        &self,
        client: &dyn ModelClient,
        bug: &BugReport,
        options: &AnalyzeOptions,
    ) -> Result<AnalysisResult> {
        let (screenshot_analysis, video_analysis) = tokio::join!(
            self.screenshot_analysis(client, bug, options),
            self.video_analysis(client, bug, options),
        );

        let documentation = self
            .context
            .build(&bug.page_url, bug.category, &bug.description);

        let prompt = BugPrompts::master(
            bug,
            &documentation,
            screenshot_analysis.as_ref(),
            video_analysis.as_ref(),
        )?;
        let text = client
            .generate(&ModelRequest::new(MASTER_SYSTEM_PROMPT, prompt))
            .await?;
        let diagnosis: ModelDiagnosis = self.parser.parse(&text)?;

        let related_docs = enrich_references(&self.index, &diagnosis.related_docs);

        Ok(AnalysisResult {
            summary: diagnosis.summary,
            suggested_cause: diagnosis.suggested_cause,
            suggested_solutions: diagnosis.suggested_solutions,
            screenshot_analysis,
            video_analysis,
            related_docs: (!related_docs.is_empty()).then_some(related_docs),
            model_used: client.model().to_string(),
            confidence: diagnosis.confidence,
            processing_time_ms: 0,
            error: None,
        })
    }

    #[instrument(skip_all)]
    async fn screenshot_analysis(
        &self,
        client: &dyn ModelClient,
        bug: &BugReport,
        options: &AnalyzeOptions,
    ) -> Option<ScreenshotAnalysis> {
        if !options.include_screenshot {
            return None;
        }
        let reference = non_blank(bug.screenshot_ref.as_deref())?;
        let image = self.media.resolve_image(reference).await?;

        let request =
            ModelRequest::new(SCREENSHOT_SYSTEM_PROMPT, BugPrompts::screenshot(bug)).with_image(image);
        self.sub_analysis(client, &request, "screenshot").await
    }

    #[instrument(skip_all)]
    async fn video_analysis(
        &self,
        client: &dyn ModelClient,
        bug: &BugReport,
        options: &AnalyzeOptions,
    ) -> Option<VideoAnalysis> {
        if !options.include_video {
            return None;
        }
        let reference = non_blank(bug.video_ref.as_deref())?;

        let request =
            ModelRequest::new(VIDEO_SYSTEM_PROMPT, BugPrompts::video(bug)).with_video_ref(reference);
        self.sub_analysis(client, &request, "video").await
    }

    /// Best-effort model call; every failure is logged and becomes `None`
    async fn sub_analysis<T: serde::de::DeserializeOwned>(
        &self,
        client: &dyn ModelClient,
        request: &ModelRequest,
        kind: &str,
    ) -> Option<T> {
        let outcome = match client.generate(request).await {
            Ok(text) => self.parser.parse::<T>(&text),
            Err(e) => Err(e),
        };

        match outcome {
            Ok(analysis) => Some(analysis),
            Err(e) => {
                warn!(kind, error = %e, category = %e.category(), "Sub-analysis skipped");
                None
            }
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
