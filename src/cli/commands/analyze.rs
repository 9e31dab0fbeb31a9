//! Analyze Command
//!
//! Run the analysis pipeline on a bug report stored as JSON.
//!
//! Usage:
//!   bugsight analyze report.json [--no-screenshot] [--no-video] [--deadline-secs N] [-f json]
//!
//! The result is always printed; a degraded result (not configured, failed,
//! timed out or cancelled) exits with [`DEGRADED_EXIT_CODE`].

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::analysis::{AnalyzeOptions, BugAnalyzer};
use crate::cli::ui::Output;
use crate::cli::util::{CommandContext, OutputFormat};
use crate::types::{AnalysisResult, BugReport, Result};

pub const DEGRADED_EXIT_CODE: u8 = 2;

/// Command-line overrides applied on top of `[analysis]` config
#[derive(Debug, Clone, Default)]
pub struct AnalyzeArgs {
    pub no_screenshot: bool,
    pub no_video: bool,
    pub deadline_secs: Option<u64>,
}

impl AnalyzeArgs {
    fn options(&self, ctx: &CommandContext) -> AnalyzeOptions {
        let mut options = AnalyzeOptions::from(&ctx.config.analysis);
        if self.no_screenshot {
            options.include_screenshot = false;
        }
        if self.no_video {
            options.include_video = false;
        }
        if let Some(secs) = self.deadline_secs {
            options.deadline = Some(Duration::from_secs(secs));
        }
        options
    }
}

pub fn read_report(path: &Path) -> Result<BugReport> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

pub async fn run(
    ctx: &CommandContext,
    report_path: &Path,
    args: &AnalyzeArgs,
    format: OutputFormat,
) -> Result<AnalysisResult> {
    let bug = read_report(report_path)?;
    let analyzer = BugAnalyzer::from_config(&ctx.config, Arc::clone(&ctx.index), ctx.blob_store())?;
    let options = args.options(ctx);

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    let watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling analysis");
            on_interrupt.cancel();
        }
    });

    info!(report = %report_path.display(), "Analyzing bug report");
    let result = analyzer.analyze_with_cancel(&bug, &options, cancel).await;
    watcher.abort();

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        OutputFormat::Text => Output::new().analysis(&result),
    }
    Ok(result)
}
