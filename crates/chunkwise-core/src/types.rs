use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;
use std::path::Path;
use std::str::FromStr;

/// Detected source language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Rust,
    Go,
    Python,
    JavaScript,
    TypeScript,
    Tsx,
    Java,
    Ruby,
    C,
    Cpp,
    Shell,
    Markdown,
    Yaml,
    Toml,
    Json,
    Html,
    Css,
    Swift,
    Kotlin,
    Scala,
    Haskell,
    Elixir,
    Lua,
    Php,
    R,
    Other,
}

impl Language {
    pub const ALL: &'static [Language] = &[
        Self::Rust,
        Self::Go,
        Self::Python,
        Self::JavaScript,
        Self::TypeScript,
        Self::Tsx,
        Self::Java,
        Self::Ruby,
        Self::C,
        Self::Cpp,
        Self::Shell,
        Self::Markdown,
        Self::Yaml,
        Self::Toml,
        Self::Json,
        Self::Html,
        Self::Css,
        Self::Swift,
        Self::Kotlin,
        Self::Scala,
        Self::Haskell,
        Self::Elixir,
        Self::Lua,
        Self::Php,
        Self::R,
        Self::Other,
    ];

    pub fn from_extension(ext: &str) -> Self {
        match ext {
            "rs" => Self::Rust,
            "go" => Self::Go,
            "py" | "pyi" => Self::Python,
            "js" | "mjs" | "cjs" | "jsx" => Self::JavaScript,
            "ts" | "mts" | "cts" => Self::TypeScript,
            "tsx" => Self::Tsx,
            "java" => Self::Java,
            "rb" => Self::Ruby,
            "c" | "h" => Self::C,
            "cpp" | "cc" | "cxx" | "hpp" | "hh" | "hxx" => Self::Cpp,
            "sh" | "bash" | "zsh" => Self::Shell,
            "md" | "mdx" => Self::Markdown,
            "yml" | "yaml" => Self::Yaml,
            "toml" => Self::Toml,
            "json" => Self::Json,
            "html" | "htm" => Self::Html,
            "css" => Self::Css,
            "swift" => Self::Swift,
            "kt" | "kts" => Self::Kotlin,
            "scala" | "sc" => Self::Scala,
            "hs" => Self::Haskell,
            "ex" | "exs" => Self::Elixir,
            "lua" => Self::Lua,
            "php" => Self::Php,
            "r" | "R" => Self::R,
            _ => Self::Other,
        }
    }

    /// Detect language from a file path by extracting its extension.
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_extension)
            .unwrap_or(Self::Other)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rust => "rust",
            Self::Go => "go",
            Self::Python => "python",
            Self::JavaScript => "javascript",
            Self::TypeScript => "typescript",
            Self::Tsx => "tsx",
            Self::Java => "java",
            Self::Ruby => "ruby",
            Self::C => "c",
            Self::Cpp => "cpp",
            Self::Shell => "shell",
            Self::Markdown => "markdown",
            Self::Yaml => "yaml",
            Self::Toml => "toml",
            Self::Json => "json",
            Self::Html => "html",
            Self::Css => "css",
            Self::Swift => "swift",
            Self::Kotlin => "kotlin",
            Self::Scala => "scala",
            Self::Haskell => "haskell",
            Self::Elixir => "elixir",
            Self::Lua => "lua",
            Self::Php => "php",
            Self::R => "r",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a language name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown language: {0}")]
pub struct UnknownLanguage(pub String);

impl FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|lang| lang.as_str() == lower)
            .ok_or_else(|| UnknownLanguage(s.to_string()))
    }
}

/// Error returned by [`SizeWindow::new`] when the bounds are inverted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid size window: min {min} exceeds max {max}")]
pub struct InvalidWindow {
    pub min: usize,
    pub max: usize,
}

/// Inclusive byte-size bounds a chunk should fall within.
///
/// `max` is a hard limit wherever a boundary can be found; `min` is advisory
/// and only steers where boundary search starts looking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawWindow")]
pub struct SizeWindow {
    min: usize,
    max: usize,
}

/// Unchecked wire form of [`SizeWindow`].
#[derive(Deserialize)]
struct RawWindow {
    min: usize,
    max: usize,
}

impl TryFrom<RawWindow> for SizeWindow {
    type Error = InvalidWindow;

    fn try_from(raw: RawWindow) -> Result<Self, Self::Error> {
        Self::new(raw.min, raw.max)
    }
}

impl SizeWindow {
    pub fn new(min: usize, max: usize) -> Result<Self, InvalidWindow> {
        if min > max {
            return Err(InvalidWindow { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> usize {
        self.min
    }

    pub fn max(&self) -> usize {
        self.max
    }

    /// True if a span of `len` bytes does not exceed `max`.
    pub fn fits(&self, len: usize) -> bool {
        len <= self.max
    }
}

impl fmt::Display for SizeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.min, self.max)
    }
}

/// Which chunker produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    TreeSitter,
    PlainText,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TreeSitter => "treesitter",
            Self::PlainText => "plaintext",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An emitted chunk, detached from the source buffer it was cut from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkRecord {
    pub index: usize,
    pub start_byte: usize,
    pub end_byte: usize,
    /// 1-based line of `start_byte`.
    pub start_line: u32,
    /// 1-based line of the last byte in the chunk.
    pub end_line: u32,
    pub backend: Backend,
    pub content: String,
}

impl ChunkRecord {
    pub fn len(&self) -> usize {
        self.end_byte - self.start_byte
    }

    pub fn is_empty(&self) -> bool {
        self.start_byte == self.end_byte
    }

    /// Build records for consecutive spans of `source`.
    ///
    /// Spans must be ordered and non-overlapping; line numbers are counted
    /// incrementally so the whole conversion is a single pass over `source`.
    pub fn from_spans<I>(source: &[u8], spans: I, backend: Backend) -> Vec<ChunkRecord>
    where
        I: IntoIterator<Item = Range<usize>>,
    {
        let mut records = Vec::new();
        let mut counted = 0;
        let mut line: u32 = 1;

        for (index, span) in spans.into_iter().enumerate() {
            line += count_newlines(&source[counted..span.start]);
            let start_line = line;
            let last = span.end.max(span.start + 1) - 1;
            let end_line = if span.is_empty() {
                start_line
            } else {
                start_line + count_newlines(&source[span.start..last])
            };
            line += count_newlines(&source[span.start..span.end]);
            counted = span.end;

            records.push(ChunkRecord {
                index,
                start_byte: span.start,
                end_byte: span.end,
                start_line,
                end_line,
                backend,
                content: String::from_utf8_lossy(&source[span]).into_owned(),
            });
        }

        records
    }
}

fn count_newlines(bytes: &[u8]) -> u32 {
    bytes.iter().filter(|&&b| b == b'\n').count() as u32
}
