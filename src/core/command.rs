//! `fnctx analyze`: config → discovery → analysis → rendering.

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::cli::{AnalyzeArgs, AppContext};
use crate::core::analyze::{Analyzer, AnalyzerOptions};
use crate::core::output::{OutputFormat, render_analysis, render_batch};
use crate::infra::cache::{MokaSourceCache, NoopSourceCache, SourceCache};
use crate::infra::config::{Config, load_config};
use crate::infra::walk::discover_files;

/// Effective settings after CLI flags override config values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub options: AnalyzerOptions,
    pub format: OutputFormat,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub cache_enabled: bool,
    pub cache_entries: u64,
}

impl Settings {
    /// CLI flags win over config; exclude globs accumulate.
    pub fn merge(config: &Config, args: &AnalyzeArgs) -> Self {
        let depth = args.depth.map(Into::into).unwrap_or(config.analysis.depth);
        let max_lines = args
            .max_lines
            .map(|n| usize::try_from(n).unwrap_or(usize::MAX))
            .unwrap_or(config.analysis.max_lines);

        let include = if args.include.is_empty() {
            config.discovery.include.clone()
        } else {
            args.include.clone()
        };

        let mut exclude = config.discovery.exclude.clone();
        exclude.extend(args.exclude.iter().cloned());

        Self {
            options: AnalyzerOptions { depth, max_lines },
            format: args.format.map(Into::into).unwrap_or(config.output.format),
            include,
            exclude,
            cache_enabled: config.cache.enabled && !args.no_cache,
            cache_entries: config.cache.max_entries,
        }
    }
}

pub fn run(args: AnalyzeArgs, ctx: &AppContext) -> Result<()> {
    let root = resolve_root(&args.path)?;
    let config = load_config(&root)
        .with_context(|| format!("Failed to load configuration from {}", root.display()))?;
    let settings = Settings::merge(&config, &args);

    // Discovery owns root validation and glob errors
    let files = discover_files(&root, &settings.include, &settings.exclude)?;
    let file_count = files.len();

    let cache: Arc<dyn SourceCache> = if settings.cache_enabled {
        Arc::new(MokaSourceCache::new(settings.cache_entries))
    } else {
        Arc::new(NoopSourceCache)
    };
    let analyzer = Analyzer::new(files, settings.options, cache)?;

    let progress = spinner(ctx, file_count);

    // One name renders a single result, several a batch
    let (rendered, matches, matched_files) = if let [name] = args.names.as_slice() {
        let result = analyzer.analyze(name);
        let files: std::collections::HashSet<&Path> =
            result.references().iter().map(|r| r.location.path()).collect();
        let rendered = render_analysis(&result, settings.format, &root)?;
        (rendered, result.count(), files.len())
    } else {
        let batch = analyzer.analyze_many(&args.names);
        let rendered = render_batch(&batch, settings.format, &root)?;
        (rendered, batch.total_matches(), batch.files_matched())
    };

    progress.finish_and_clear();

    // Write output
    match &args.output {
        Some(path) => {
            let path = expand_path(path);
            std::fs::write(&path, &rendered)
                .with_context(|| format!("Failed to write to {}", path.display()))?;
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(rendered.as_bytes())
                .and_then(|_| stdout.flush())
                .context("Failed to write to stdout")?;
        }
    }

    if args.clipboard {
        copy_to_clipboard(&rendered, ctx)?;
    }

    if !ctx.quiet {
        print_summary(ctx, &args.names, matches, matched_files, file_count);
    }

    Ok(())
}

/// Expand `~` and canonicalize without UNC prefixes on Windows.
fn resolve_root(path: &Path) -> Result<PathBuf> {
    let expanded = expand_path(path);
    dunce::canonicalize(&expanded)
        .with_context(|| format!("Root directory does not exist: {}", expanded.display()))
}

fn expand_path(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned())
}

/// Spinner on stderr while files are analyzed (hidden when quiet).
fn spinner(ctx: &AppContext, files: usize) -> ProgressBar {
    if ctx.quiet {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(format!("Analyzing {files} files"));
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

fn print_summary(ctx: &AppContext, names: &[String], matches: usize, files: usize, scanned: usize) {
    let subject = match names {
        [one] => format!("`{one}`"),
        many => format!("{} functions", many.len()),
    };
    let line = format!("{matches} references to {subject} in {files} of {scanned} files");

    if ctx.no_color {
        eprintln!("✓ {line}");
    } else if matches == 0 {
        eprintln!("{} {}", "✓".green(), line.yellow());
    } else {
        eprintln!("{} {line}", "✓".green());
    }
}

fn copy_to_clipboard(content: &str, ctx: &AppContext) -> Result<()> {
    use arboard::Clipboard;

    let mut clipboard = Clipboard::new().context("Failed to access clipboard")?;

    clipboard
        .set_text(content)
        .context("Failed to copy to clipboard")?;

    if !ctx.quiet {
        if ctx.no_color {
            eprintln!("✓ Copied to clipboard");
        } else {
            eprintln!("{} Copied to clipboard", "✓".green());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{DepthArg, FormatArg};
    use crate::core::model::ContextDepth;

    fn args() -> AnalyzeArgs {
        AnalyzeArgs {
            names: vec!["f".into()],
            path: PathBuf::from("."),
            depth: None,
            max_lines: None,
            format: None,
            include: vec![],
            exclude: vec![],
            output: None,
            clipboard: false,
            no_cache: false,
        }
    }

    #[test]
    fn config_values_apply_without_flags() {
        let mut config = Config::default();
        config.analysis.depth = ContextDepth::Module;
        config.analysis.max_lines = 7;
        config.output.format = OutputFormat::Plain;

        let s = Settings::merge(&config, &args());
        assert_eq!(s.options.depth, ContextDepth::Module);
        assert_eq!(s.options.max_lines, 7);
        assert_eq!(s.format, OutputFormat::Plain);
        assert_eq!(s.include, config.discovery.include);
        assert!(s.cache_enabled);
    }

    #[test]
    fn flags_override_config() {
        let mut a = args();
        a.depth = Some(DepthArg::Snippet);
        a.max_lines = Some(12);
        a.format = Some(FormatArg::Json);
        a.include = vec!["**/*.py".into()];
        a.exclude = vec!["gen/**".into()];
        a.no_cache = true;

        let config = Config::default();
        let s = Settings::merge(&config, &a);
        assert_eq!(s.options.depth, ContextDepth::Snippet);
        assert_eq!(s.options.max_lines, 12);
        assert_eq!(s.format, OutputFormat::Json);
        assert_eq!(s.include, vec!["**/*.py".to_string()]);
        assert_eq!(s.exclude.len(), config.discovery.exclude.len() + 1);
        assert!(s.exclude.contains(&"gen/**".to_string()));
        assert!(!s.cache_enabled);
    }

    #[test]
    fn missing_root_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(resolve_root(&dir.path().join("absent")).is_err());
    }
}
