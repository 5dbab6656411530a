use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::core::model::ContextDepth;
use crate::core::output::OutputFormat;

/// Shared application context for global flags
#[derive(Clone, Debug)]
pub struct AppContext {
    pub quiet: bool,    // global --quiet
    pub no_color: bool, // global --no-color
    pub verbose: bool,  // global --verbose
}

#[derive(Parser)]
#[command(name = "fnctx")]
#[command(
    about = "Find every call site of a function and extract the surrounding code for LLM workflows"
)]
#[command(version, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Suppress progress spinners and non-essential output
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Log debug details to stderr (overrides FNCTX_LOG)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Find call sites of one or more functions and extract their context
    Analyze(AnalyzeArgs),

    /// Initialize a fnctx.toml config file
    Init(InitArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Function names; more than one runs a batch analysis
    #[arg(value_name = "NAME", required = true)]
    pub names: Vec<String>,

    /// Root directory to search
    #[arg(short, long, default_value = ".")]
    pub path: PathBuf,

    /// How much context to extract per call site
    #[arg(short, long, value_enum)]
    pub depth: Option<DepthArg>,

    /// Line ceiling for logic depth before centered truncation
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub max_lines: Option<u64>,

    /// Output format
    #[arg(short, long, value_enum)]
    pub format: Option<FormatArg>,

    /// Include glob (repeatable); replaces the configured includes
    #[arg(long = "include", value_name = "GLOB")]
    pub include: Vec<String>,

    /// Exclude glob (repeatable); added to the configured excludes
    #[arg(long = "exclude", value_name = "GLOB")]
    pub exclude: Vec<String>,

    /// Write the rendered result to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Copy the rendered result to the clipboard
    #[arg(long)]
    pub clipboard: bool,

    /// Disable parsed-source caching
    #[arg(long)]
    pub no_cache: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DepthArg {
    /// The call-site line only
    Snippet,
    /// The enclosing function or method
    Logic,
    /// The whole file
    Module,
}

impl From<DepthArg> for ContextDepth {
    fn from(d: DepthArg) -> Self {
        match d {
            DepthArg::Snippet => ContextDepth::Snippet,
            DepthArg::Logic => ContextDepth::Logic,
            DepthArg::Module => ContextDepth::Module,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Markdown,
    Json,
    Plain,
}

impl From<FormatArg> for OutputFormat {
    fn from(f: FormatArg) -> Self {
        match f {
            FormatArg::Markdown => OutputFormat::Markdown,
            FormatArg::Json => OutputFormat::Json,
            FormatArg::Plain => OutputFormat::Plain,
        }
    }
}

#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Directory to initialize config in
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Overwrite existing config file
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[derive(Parser)]
pub struct CompletionsArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,

    /// Output directory; if omitted and --stdout not set, prints error
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Print completion script to stdout instead of a file
    #[arg(long)]
    pub stdout: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn analyze_parses_batch_and_flags() {
        let cli = Cli::try_parse_from([
            "fnctx", "analyze", "a", "b", "--depth", "snippet", "--max-lines", "20", "--exclude",
            "gen/**", "--quiet",
        ])
        .unwrap();
        assert!(cli.quiet);
        let Commands::Analyze(args) = cli.command else {
            panic!("expected analyze");
        };
        assert_eq!(args.names, vec!["a", "b"]);
        assert_eq!(args.depth, Some(DepthArg::Snippet));
        assert_eq!(args.max_lines, Some(20));
        assert_eq!(args.exclude, vec!["gen/**"]);
    }

    #[test]
    fn zero_max_lines_is_rejected() {
        assert!(Cli::try_parse_from(["fnctx", "analyze", "f", "--max-lines", "0"]).is_err());
    }
}
