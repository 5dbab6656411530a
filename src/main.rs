use anyhow::Result;
use clap::Parser;
use fnctx::cli::{AppContext, Cli, Commands};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter
const LOG_ENV: &str = "FNCTX_LOG";

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Build a context once, pass everywhere
    let ctx = AppContext {
        quiet: cli.quiet,
        no_color: cli.no_color,
        verbose: cli.verbose,
    };

    init_tracing(&ctx);

    match cli.command {
        Commands::Analyze(args) => fnctx::core::command::run(args, &ctx),
        Commands::Init(args) => fnctx::infra::config::init(args, &ctx),
        Commands::Completions(args) => fnctx::completion::run(args, &ctx),
    }
}

/// Logs go to stderr; stdout carries only the rendered result.
fn init_tracing(ctx: &AppContext) {
    let filter = if ctx.verbose {
        EnvFilter::new("fnctx=debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(!ctx.no_color)
        .with_target(false)
        .try_init();
}
