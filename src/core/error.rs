//! Typed failures for loading one source file.
//!
//! None of these abort an analysis: the orchestrator logs them and
//! skips the file. They stay typed so callers can tell an unreadable
//! file from one that parsed but is empty.

use std::path::PathBuf;

/// Why a structural parse produced no usable tree
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseFailure
{
    /// The grammar could not be loaded into the parser
    #[error("grammar unavailable: {0}")]
    Grammar(String),

    /// The parser gave up without producing a tree
    #[error("parser produced no tree")]
    NoTree,

    /// The tree contains an ERROR or MISSING node
    #[error("syntax error at line {line}, column {column}")]
    Syntax
    {
        line: usize,
        column: usize,
    },
}

/// Failure to turn a path into a parsed source file
#[derive(Debug, thiserror::Error)]
pub enum SourceError
{
    /// Permissions, deleted mid-scan, and similar I/O problems
    #[error("failed to read {path}")]
    Read
    {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File content is not valid UTF-8
    #[error("{path} is not valid UTF-8")]
    Encoding
    {
        path: PathBuf,
    },

    /// File content does not parse for its language family
    #[error("failed to parse {path}")]
    Parse
    {
        path: PathBuf,
        #[source]
        failure: ParseFailure,
    },

    /// No language family handles this file extension
    #[error("unsupported file type: {path}")]
    Unsupported
    {
        path: PathBuf,
    },
}

impl SourceError
{
    /// Path of the file that failed
    pub fn path(&self) -> &std::path::Path
    {
        match self
        {
            SourceError::Read { path, .. }
            | SourceError::Encoding { path }
            | SourceError::Parse { path, .. }
            | SourceError::Unsupported { path } => path,
        }
    }
}

/// A function name that cannot be searched for
#[derive(Debug, thiserror::Error)]
pub enum TargetError
{
    /// Not an identifier in any supported language
    #[error("`{0}` is not a valid function name")]
    InvalidName(String),

    /// The line-scan pattern failed to compile
    #[error("failed to compile call pattern")]
    Pattern(#[from] regex::Error),
}
