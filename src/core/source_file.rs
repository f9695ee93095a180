//! Source file representation.

use std::path::{Path, PathBuf};

use super::{Error, Language, Result};

/// A decoded source file, immutable once fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Path relative to the repository root.
    pub path: PathBuf,
    /// Detected language.
    pub language: Language,
    /// Decoded UTF-8 text.
    pub content: String,
    /// Number of lines in `content`.
    pub line_count: usize,
}

impl SourceFile {
    /// Load a source file from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        Self::decode(path, bytes)
    }

    /// Detect the language and decode raw bytes as UTF-8.
    ///
    /// A leading byte-order mark is stripped. Invalid UTF-8 is an error: the
    /// caller records it as a skipped file rather than scoring mangled text.
    pub fn decode(path: impl Into<PathBuf>, bytes: Vec<u8>) -> Result<Self> {
        let path = path.into();
        let language =
            Language::detect(&path).ok_or_else(|| Error::UnsupportedLanguage { path: path.clone() })?;
        let mut content = String::from_utf8(bytes).map_err(|e| Error::Parse {
            path: path.clone(),
            message: format!("invalid UTF-8 at byte {}", e.utf8_error().valid_up_to()),
        })?;
        if content.starts_with('\u{feff}') {
            content.drain(..'\u{feff}'.len_utf8());
        }
        Ok(Self::from_content(path, language, content))
    }

    /// Create from existing content.
    pub fn from_content(
        path: impl Into<PathBuf>,
        language: Language,
        content: impl Into<String>,
    ) -> Self {
        let content = content.into();
        let line_count = content.lines().count();
        Self {
            path: path.into(),
            language,
            content,
            line_count,
        }
    }

    /// Path as a forward-slash string, used as a stable key in reports.
    pub fn key(&self) -> String {
        self.path.to_string_lossy().replace('\\', "/")
    }

    /// Whether the file has no non-whitespace content.
    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }
}
