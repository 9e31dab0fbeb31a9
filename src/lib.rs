//! Bugsight - Automated Bug Report Analysis
//!
//! Diagnoses user-filed bug reports with a generative model, grounded in an
//! internal documentation corpus.
//!
//! ## Pipeline
//!
//! - **Documentation search**: keyword-weighted ranking over a static corpus
//! - **Context building**: topic tags from page, category and description
//! - **Media resolution**: internal blob store or direct fetch, base64 encoded
//! - **Model gateway**: primary endpoint with a single fallback substitution
//! - **Response parsing**: fence stripping plus truncated-JSON repair
//! - **Orchestration**: best-effort sub-analyses, citation enrichment, and a
//!   result for every input
//!
//! ## Quick Start
//!
//! ```ignore
//! use bugsight::{AnalyzeOptions, BugAnalyzer, ConfigLoader, Corpus, DocumentationIndex};
//! use bugsight::media::MemoryBlobStore;
//!
//! let config = ConfigLoader::load()?;
//! let index = Arc::new(DocumentationIndex::new(Corpus::builtin()?));
//! let analyzer = BugAnalyzer::from_config(&config, index, Arc::new(MemoryBlobStore::new()))?;
//! let result = analyzer.analyze(&bug, &AnalyzeOptions::default()).await;
//! ```
//!
//! ## Modules
//!
//! - [`docs`]: corpus, search index, context builder
//! - [`media`]: attachment resolution and blob stores
//! - [`ai`]: gateway, response parser, prompts
//! - [`analysis`]: the orchestrator
//! - [`config`]: layered configuration

pub mod ai;
pub mod analysis;
pub mod cli;
pub mod config;
pub mod constants;
pub mod docs;
pub mod media;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::{Config, ConfigLoader, GatewaySettings};

// Error Types
pub use types::error::{BugsightError, ErrorCategory, Result};

// Data model
pub use types::{
    AnalysisResult, BugCategory, BugReport, Confidence, DocReference, Severity,
    SuggestedSolution,
};

// =============================================================================
// Pipeline Re-exports
// =============================================================================

pub use analysis::{AnalyzeOptions, BugAnalyzer};
pub use docs::{ContextBuilder, Corpus, DocumentationIndex, SearchHit};
pub use media::{BlobStore, MediaResolver};

pub use ai::{ModelClient, ModelGateway, ModelRequest, ResponseParser};
