//! Model Integration Layer
//!
//! Request construction, the primary/fallback gateway, response parsing with
//! JSON repair, and deadline helpers.

pub mod gateway;
pub mod parser;
pub mod prompt;
pub mod timeout;

pub use gateway::{ModelClient, ModelGateway, ModelRequest, SharedModelClient};
pub use parser::{ResponseParser, ScanState, ScanSummary, repair, scan, strip_fences};
pub use prompt::{
    BugPrompts, MASTER_SYSTEM_PROMPT, PromptBuilder, PromptSection, SCREENSHOT_SYSTEM_PROMPT,
    VIDEO_SYSTEM_PROMPT,
};
pub use timeout::{with_deadline, with_timeout};
