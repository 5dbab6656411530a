//! **fnctx** - Find every call site of a function and extract its context for LLM workflows
//!
//! Tree-sitter call-site resolution for JavaScript/TypeScript, indentation-aware scanning
//! for Python, innermost-scope lookup and bounded context extraction, run in parallel
//! over a gitignore-aware file set.

/// Command-line interface with clap integration
pub mod cli;

/// Shell completion generation
pub mod completion;

/// Core pipeline - reference finding, scope resolution and context extraction
pub mod core {
    /// Shared value types (locations, scopes, references, results)
    pub mod model;
    pub use model::{
        AnalysisResult, BatchAnalysis, ContextDepth, Reference, ScopeInfo, SourceLocation,
    };

    /// Typed per-file load and parse failures
    pub mod error;
    pub use error::{ParseFailure, SourceError, TargetError};

    /// Extension-based language family detection
    pub mod language;
    pub use language::{LanguageFamily, detect_language_family};

    /// Lowered syntax tree and visitor for the structural family
    pub mod syntax;

    /// Parsed source files and per-family dispatch
    pub mod source;
    pub use source::{ParserRegistry, SourceFile};

    /// Call-site finder for both language families
    pub mod references;
    pub use references::CallTarget;

    /// Innermost enclosing scope lookup
    pub mod scope;

    /// Depth-based context extraction with centered truncation
    pub mod context;
    pub use context::{ContextExtractor, DEFAULT_MAX_LINES, SourceProvider};

    /// Parallel orchestrator over a discovered file list
    pub mod analyze;
    pub use analyze::{Analyzer, AnalyzerOptions};

    /// Markdown / JSON / plain rendering
    pub mod output;
    pub use output::OutputFormat;

    /// `fnctx analyze` command pipeline
    pub mod command;
    pub use command::run as analyze_run;
}

/// Language front ends - tree-sitter JS/TS lowering and the Python line scanner
pub mod parsers {
    /// JavaScript / TypeScript / TSX via tree-sitter
    pub mod javascript_parser;
    pub use javascript_parser::JavaScriptParser;

    /// Python headers and indentation
    pub mod python_parser;
    pub use python_parser::PythonParser;

    // Re-export common parser interface
    pub use crate::core::source::SourceParser;
}

/// Infrastructure - Configuration, I/O, discovery and caching
pub mod infra {
    /// Configuration management with TOML/YAML/JSON and env support
    pub mod config;
    pub use config::{Config, init as config_init, load_config};

    /// Memory-mapped file I/O for large files (>1MB threshold)
    pub mod io;
    pub use io::{FileContent, read_file_smart, read_source};

    /// CRLF/LF-robust line indexing
    pub mod line_index;
    pub use line_index::LineIndex;

    /// Gitignore-aware source discovery
    pub mod walk;
    pub use walk::{FileWalker, discover_files};

    /// Injected parsed-source cache (moka or no-op)
    pub mod cache;
    pub use cache::{MokaSourceCache, NoopSourceCache, SourceCache};
}

// Strategic re-exports for clean CLI interface
pub use cli::{AppContext, Cli, Commands};
pub use crate::core::analyze_run;
pub use infra::{Config, FileWalker, load_config};
pub use parsers::{JavaScriptParser, PythonParser, SourceParser};

// Core types for external consumers
pub use crate::core::{
    AnalysisResult, Analyzer, AnalyzerOptions, BatchAnalysis, ContextDepth, Reference, ScopeInfo,
    SourceLocation,
};
