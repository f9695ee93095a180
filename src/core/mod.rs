//! Core types and traits for code analysis.

mod analyzer;
mod content_source;
mod coverage;
mod error;
mod file_set;
mod language;
pub mod progress;
mod source_file;

pub use analyzer::{AnalysisContext, Analyzer};
pub use content_source::{
    CacheKey, CachedSource, ContentCache, ContentSource, FetchOutcome, FilesystemSource,
    MemoryCache, MemorySource, RawFile,
};
pub use coverage::{Coverage, FileWarning};
pub use error::{Error, Result};
pub use file_set::FileSet;
pub use language::Language;
pub use source_file::SourceFile;
