use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use globset::Glob;
use serde::{Deserialize, Serialize};

use crate::cli::{AppContext, InitArgs};
use crate::core::context::DEFAULT_MAX_LINES;
use crate::core::model::ContextDepth;
use crate::core::output::OutputFormat;
use crate::infra::cache::DEFAULT_MAX_ENTRIES;
use crate::infra::walk::{default_exclude, default_include};

/// Config file names probed in the analysis root, in priority order
pub const CONFIG_FILES: &[&str] = &["fnctx.toml", ".fnctx.toml", "fnctx.yaml", "fnctx.json"];

/// Environment variable prefix (`FNCTX_ANALYSIS__MAX_LINES=40`)
pub const ENV_PREFIX: &str = "FNCTX";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config
{
    /// Reference extraction settings
    pub analysis: AnalysisConfig,

    /// Which files are analyzed
    pub discovery: DiscoveryConfig,

    /// Default rendering
    pub output: OutputConfig,

    /// Parsed-source memoization
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig
{
    pub depth: ContextDepth,
    pub max_lines: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig
{
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct OutputConfig
{
    pub format: OutputFormat,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig
{
    pub enabled: bool,
    pub max_entries: u64,
}

impl Default for AnalysisConfig
{
    fn default() -> Self
    {
        Self { depth: ContextDepth::Logic, max_lines: DEFAULT_MAX_LINES }
    }
}

impl Default for DiscoveryConfig
{
    fn default() -> Self
    {
        Self { include: default_include(), exclude: default_exclude() }
    }
}

impl Default for CacheConfig
{
    fn default() -> Self
    {
        Self { enabled: true, max_entries: DEFAULT_MAX_ENTRIES }
    }
}

impl Config
{
    /// Reject values no analysis can run with
    pub fn validate(&self) -> Result<()>
    {
        if self
            .analysis
            .max_lines
            == 0
        {
            bail!("analysis.max_lines must be at least 1");
        }

        if self
            .cache
            .enabled
            && self
                .cache
                .max_entries
                == 0
        {
            bail!("cache.max_entries must be at least 1 when the cache is enabled");
        }

        // Surface glob typos here rather than mid-walk
        for pattern in self
            .discovery
            .include
            .iter()
            .chain(&self.discovery.exclude)
        {
            Glob::new(pattern).with_context(|| format!("invalid glob `{pattern}` in [discovery]"))?;
        }

        Ok(())
    }
}

/// First existing config file in `dir`
pub fn find_config_file(dir: &Path) -> Option<PathBuf>
{
    CONFIG_FILES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.is_file())
}

/// Load config from `dir` plus `FNCTX_*` environment variables,
/// falling back to defaults for anything unset.
pub fn load_config(dir: &Path) -> Result<Config>
{
    let mut builder = config::Config::builder();

    // Load from the first config file found
    if let Some(path) = find_config_file(dir)
    {
        tracing::debug!(path = %path.display(), "loading config file");
        builder = builder.add_source(config::File::from(path.as_path()));
    }

    // Environment overrides, nested keys separated by "__"
    builder = builder.add_source(
        config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let cfg = builder
        .build()
        .context("Failed to load configuration")?;
    let parsed: Config = cfg
        .try_deserialize()
        .context("Failed to parse configuration")?;

    parsed.validate()?;
    Ok(parsed)
}

pub fn init(
    args: InitArgs,
    ctx: &AppContext,
) -> Result<()>
{
    let config_path = args
        .path
        .join(CONFIG_FILES[0]);

    if config_path.exists() && !args.force
    {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    let config = Config::default();
    let toml_string =
        toml::to_string_pretty(&config).context("Failed to serialize default config")?;

    std::fs::create_dir_all(&args.path).context("Failed to create config directory")?;
    std::fs::write(&config_path, toml_string).context("Failed to write config file")?;

    if !ctx.quiet
    {
        println!("Created config file at {}", config_path.display());
    }
    Ok(())
}
