//! Context Command
//!
//! Print the documentation context that would accompany a bug report.

use crate::cli::util::CommandContext;
use crate::docs::ContextBuilder;
use crate::types::{BugCategory, Result};

pub fn run(
    ctx: &CommandContext,
    page_url: &str,
    category: BugCategory,
    description: &str,
) -> Result<()> {
    let tags = ContextBuilder::keywords(page_url, category, description);
    eprintln!("# keywords: {}", tags.join(" "));

    let context = ContextBuilder::new(ctx.index.clone()).build(page_url, category, description);
    println!("{}", context);
    Ok(())
}
