//! Coverage metadata: what was analyzed, what was skipped and why.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::Language;

/// A non-fatal problem with one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileWarning {
    pub path: String,
    pub reason: String,
}

/// Per-repository coverage report attached to every profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Coverage {
    /// Files delivered by the retrieval layer, including failed fetches.
    pub files_seen: usize,
    /// Files that reached a language analyzer.
    pub files_analyzed: usize,
    /// Files dropped by exclude patterns.
    pub excluded: usize,
    /// Files with no recognized extension.
    pub unsupported: usize,
    /// Unsupported files per extension (`""` for files without one).
    pub unsupported_extensions: BTreeMap<String, usize>,
    /// Files dropped by the per-language cap.
    pub truncated: BTreeMap<Language, usize>,
    /// Files not started before the run deadline.
    pub timed_out: usize,
    /// Files where structural parsing failed and patterns were used instead.
    pub fallbacks: usize,
    /// Unreadable, undecodable or oversized files.
    pub warnings: Vec<FileWarning>,
}

impl Coverage {
    /// Record a skipped file.
    pub fn warn(&mut self, path: &Path, reason: impl Into<String>) {
        let warning = FileWarning {
            path: path.to_string_lossy().replace('\\', "/"),
            reason: reason.into(),
        };
        tracing::warn!("skipping {}: {}", warning.path, warning.reason);
        self.warnings.push(warning);
    }

    /// Record a file with an unrecognized extension.
    pub fn unsupported(&mut self, path: &Path) {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        self.unsupported += 1;
        *self.unsupported_extensions.entry(ext).or_default() += 1;
    }

    /// Whether the profile was built from an incomplete batch.
    pub fn is_partial(&self) -> bool {
        self.timed_out > 0
    }

    /// Files that were skipped for any reason other than being unsupported or excluded.
    pub fn skipped(&self) -> usize {
        self.warnings.len() + self.timed_out + self.truncated.values().sum::<usize>()
    }

    /// Sort warnings by path so reports do not depend on scheduling.
    pub(crate) fn normalize(&mut self) {
        self.warnings
            .sort_by(|a, b| a.path.cmp(&b.path).then_with(|| a.reason.cmp(&b.reason)));
    }
}
