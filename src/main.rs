use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::runtime::Runtime;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bugsight::cli::commands::analyze::AnalyzeArgs;
use bugsight::cli::{CommandContext, OutputFormat};
use bugsight::types::BugCategory;

#[derive(Parser)]
#[command(name = "bugsight")]
#[command(version, about = "AI-assisted bug report analysis grounded in platform documentation")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Load this config file instead of the global/project layers
    #[arg(long, short, global = true, env = "BUGSIGHT_CONFIG")]
    config: Option<PathBuf>,

    #[arg(long, global = true)]
    verbose: bool,

    #[arg(long, short, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a bug report JSON file
    Analyze {
        #[arg(help = "Path to the bug report (JSON)")]
        report: PathBuf,
        #[arg(long, help = "Skip the screenshot sub-analysis")]
        no_screenshot: bool,
        #[arg(long, help = "Skip the video sub-analysis")]
        no_video: bool,
        #[arg(long, help = "Give up after this many seconds")]
        deadline_secs: Option<u64>,
        #[arg(
            short = 'f',
            long,
            default_value = "text",
            value_parser = OutputFormat::parse,
            help = "Output format: text, json"
        )]
        format: OutputFormat,
    },

    /// Search the documentation corpus
    Search {
        #[arg(required = true, help = "Search terms")]
        query: Vec<String>,
        #[arg(
            short = 'f',
            long,
            default_value = "text",
            value_parser = OutputFormat::parse,
            help = "Output format: text, json"
        )]
        format: OutputFormat,
    },

    /// Print the documentation context built for a bug
    Context {
        #[arg(long, default_value = "/")]
        page_url: String,
        #[arg(long, default_value = "other", help = "ui, functionality, performance, data, other")]
        category: BugCategory,
        #[arg(long, default_value = "")]
        description: String,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration (merged from all sources)
    Show {
        #[arg(
            short = 'f',
            long,
            default_value = "text",
            value_parser = OutputFormat::parse,
            help = "Output format: text (TOML), json"
        )]
        format: OutputFormat,
    },
    /// Show configuration file paths
    Path,
    /// Create .bugsight/config.toml in the current directory
    Init {
        #[arg(long, help = "Overwrite existing config")]
        force: bool,
    },
}

/// Set up panic handler for graceful error reporting
fn setup_panic_handler() {
    let default_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info| {
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        eprintln!("\n\x1b[1;31m━━━ PANIC ━━━\x1b[0m");
        eprintln!("\x1b[31mbugsight encountered an unexpected error:\x1b[0m");
        eprintln!("  {}", message);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "\x1b[90mLocation: {}:{}:{}\x1b[0m",
                location.file(),
                location.line(),
                location.column()
            );
        }
        eprintln!();

        // prints the backtrace when RUST_BACKTRACE=1
        default_hook(panic_info);
    }));
}

fn main() -> ExitCode {
    setup_panic_handler();

    match run_cli() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("\x1b[31mError:\x1b[0m {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Analyze {
            report,
            no_screenshot,
            no_video,
            deadline_secs,
            format,
        } => {
            let ctx = CommandContext::load(cli.config.as_deref())?;
            let args = AnalyzeArgs {
                no_screenshot,
                no_video,
                deadline_secs,
            };
            let rt = Runtime::new()?;
            let result = rt.block_on(bugsight::cli::commands::analyze::run(
                &ctx, &report, &args, format,
            ))?;
            if result.is_degraded() {
                return Ok(ExitCode::from(
                    bugsight::cli::commands::analyze::DEGRADED_EXIT_CODE,
                ));
            }
        }
        Commands::Search { query, format } => {
            let ctx = CommandContext::load(cli.config.as_deref())?;
            bugsight::cli::commands::search::run(&ctx, &query, format)?;
        }
        Commands::Context {
            page_url,
            category,
            description,
        } => {
            let ctx = CommandContext::load(cli.config.as_deref())?;
            bugsight::cli::commands::context::run(&ctx, &page_url, category, &description)?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { format } => {
                let ctx = CommandContext::load(cli.config.as_deref())?;
                bugsight::cli::commands::config::show(&ctx, format)?;
            }
            ConfigAction::Path => {
                bugsight::cli::commands::config::path()?;
            }
            ConfigAction::Init { force } => {
                bugsight::cli::commands::config::init(force)?;
            }
        },
    }

    Ok(ExitCode::SUCCESS)
}
