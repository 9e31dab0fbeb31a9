//! Config Command
//!
//! Manage bugsight configuration.
//!
//! Usage:
//!   bugsight config show [-f json]
//!   bugsight config path
//!   bugsight config init [--force]

use crate::cli::ui::Output;
use crate::cli::util::{CommandContext, OutputFormat};
use crate::config::ConfigLoader;
use crate::types::Result;

/// Show the merged effective configuration (API key omitted)
pub fn show(ctx: &CommandContext, format: OutputFormat) -> Result<()> {
    let rendered = ConfigLoader::render(&ctx.config, format == OutputFormat::Json)?;
    println!("{}", rendered);

    if ctx.config.gateway.api_key.is_some() {
        Output::new().info("gateway.api_key is set (not shown)");
    }
    Ok(())
}

/// Show configuration paths
pub fn path() -> Result<()> {
    ConfigLoader::show_path();
    Ok(())
}

/// Initialize project configuration in the current directory
pub fn init(force: bool) -> Result<()> {
    let root = std::env::current_dir()?;
    let path = ConfigLoader::init_project(&root, force)?;

    let output = Output::new();
    output.success("Initialized project configuration");
    println!("  Config: {}", path.display());
    output.info("Set BUGSIGHT_GATEWAY__API_KEY in the environment rather than in this file");
    Ok(())
}
