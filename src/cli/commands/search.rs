//! Search Command
//!
//! Query the documentation index directly.

use crate::cli::ui::Output;
use crate::cli::util::{CommandContext, OutputFormat};
use crate::types::Result;

pub fn run(ctx: &CommandContext, terms: &[String], format: OutputFormat) -> Result<()> {
    let query = terms.join(" ");
    let hits = ctx.index.search(&query);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&hits)?),
        OutputFormat::Text => Output::new().hits(&hits),
    }
    Ok(())
}
