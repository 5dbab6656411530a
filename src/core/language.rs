//! Extension-based language family detection.

use std::path::Path;

use serde::Serialize;

/// The two analyzable families plus everything else
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LanguageFamily
{
    /// Parsed into a full syntax tree (JavaScript, TypeScript)
    Structural,

    /// Scanned line by line using indentation (Python)
    Indentation,

    /// Not analyzed
    Unsupported,
}

impl LanguageFamily
{
    /// Line comment prefix used for truncation markers
    pub fn comment_prefix(self) -> &'static str
    {
        match self
        {
            LanguageFamily::Structural => "//",
            LanguageFamily::Indentation => "#",
            LanguageFamily::Unsupported => "//",
        }
    }

    /// True for families the analyzer can handle
    pub fn is_supported(self) -> bool
    {
        !matches!(self, LanguageFamily::Unsupported)
    }
}

/// Extensions handled by the structural family
pub const STRUCTURAL_EXTENSIONS: &[&str] = &["js", "jsx", "mjs", "cjs", "ts", "tsx", "mts", "cts"];

/// Extensions handled by the indentation-block family
pub const INDENTATION_EXTENSIONS: &[&str] = &["py", "pyw", "pyi"];

/// Map a path to its language family by extension
pub fn detect_language_family(path: &Path) -> LanguageFamily
{
    // Lowercase extension, or unsupported when there is none
    let Some(ext) = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
    else
    {
        return LanguageFamily::Unsupported;
    };

    if STRUCTURAL_EXTENSIONS.contains(&ext.as_str())
    {
        LanguageFamily::Structural
    }
    else if INDENTATION_EXTENSIONS.contains(&ext.as_str())
    {
        LanguageFamily::Indentation
    }
    else
    {
        LanguageFamily::Unsupported
    }
}

/// Code fence language tag for a path
pub fn fence_language(path: &Path) -> &'static str
{
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match ext.as_str()
    {
        "js" | "jsx" | "mjs" | "cjs" => "javascript",
        "ts" | "mts" | "cts" => "typescript",
        "tsx" => "tsx",
        "py" | "pyw" | "pyi" => "python",
        _ => "",
    }
}
