//! File set: the decoded, filtered batch handed to the language analyzers.

use std::collections::BTreeMap;
use std::path::Path;

use globset::{Glob, GlobSet, GlobSetBuilder};

use super::{ContentSource, Coverage, FetchOutcome, Language, Result, SourceFile};
use crate::config::Config;

/// A set of decoded source files for one repository.
///
/// Files are sorted by path, so the batch and its coverage do not depend on
/// the order the retrieval layer delivered them in.
#[derive(Debug, Clone, Default)]
pub struct FileSet {
    files: Vec<SourceFile>,
    coverage: Coverage,
}

impl FileSet {
    /// Fetch a repository and build its file set.
    pub fn from_source(source: &dyn ContentSource, config: &Config) -> Result<Self> {
        let outcomes = source.fetch()?;
        Self::from_outcomes(outcomes, config)
    }

    /// Build a file set from fetch outcomes.
    ///
    /// Exclude patterns are applied first, then language detection, then the
    /// size limit and decoding, then the per-language cap.
    pub fn from_outcomes(outcomes: Vec<FetchOutcome>, config: &Config) -> Result<Self> {
        let excludes = build_globset(&config.exclude_patterns)?;
        let mut coverage = Coverage {
            files_seen: outcomes.len(),
            ..Coverage::default()
        };
        let mut by_language: BTreeMap<Language, Vec<SourceFile>> = BTreeMap::new();

        for outcome in outcomes {
            let raw = match outcome {
                FetchOutcome::Fetched(raw) => raw,
                FetchOutcome::Failed { path, reason } => {
                    coverage.warn(&path, format!("fetch failed: {reason}"));
                    continue;
                }
            };

            if is_excluded(&excludes, &raw.path) {
                coverage.excluded += 1;
                continue;
            }

            let Some(language) = Language::detect(&raw.path) else {
                coverage.unsupported(&raw.path);
                continue;
            };

            if raw.size() > config.limits.max_file_bytes {
                coverage.warn(
                    &raw.path,
                    format!(
                        "{} bytes exceeds limit of {}",
                        raw.size(),
                        config.limits.max_file_bytes
                    ),
                );
                continue;
            }

            let path = raw.path.clone();
            match SourceFile::decode(raw.path, raw.bytes) {
                Ok(file) => by_language.entry(language).or_default().push(file),
                Err(e) => coverage.warn(&path, e.to_string()),
            }
        }

        let cap = config.limits.max_files_per_language;
        let mut files = Vec::new();
        for (language, mut group) in by_language {
            // Same path delivered twice: keep the copy that sorts first by
            // content, whatever the delivery order.
            group.sort_by(|a, b| a.path.cmp(&b.path).then_with(|| a.content.cmp(&b.content)));
            let mut unique: Vec<SourceFile> = Vec::with_capacity(group.len());
            for file in group {
                if unique.last().is_some_and(|kept| kept.path == file.path) {
                    coverage.warn(&file.path, "duplicate path");
                    continue;
                }
                unique.push(file);
            }
            let mut group = unique;
            if group.len() > cap {
                let dropped = group.len() - cap;
                tracing::warn!(
                    "{language}: keeping first {cap} files, dropping {dropped}"
                );
                coverage.truncated.insert(language, dropped);
                group.truncate(cap);
            }
            files.extend(group);
        }
        files.sort_by(|a, b| a.path.cmp(&b.path));
        coverage.normalize();

        Ok(Self { files, coverage })
    }

    /// Build a file set from already decoded files, applying no filters.
    pub fn from_files(mut files: Vec<SourceFile>) -> Self {
        files.sort_by(|a, b| a.path.cmp(&b.path));
        let coverage = Coverage {
            files_seen: files.len(),
            ..Coverage::default()
        };
        Self { files, coverage }
    }

    /// Get all files in the set.
    pub fn files(&self) -> &[SourceFile] {
        &self.files
    }

    /// Coverage collected while building the set.
    pub fn coverage(&self) -> &Coverage {
        &self.coverage
    }

    /// Take the coverage out, leaving an empty report.
    pub fn take_coverage(&mut self) -> Coverage {
        std::mem::take(&mut self.coverage)
    }

    /// Get the number of files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if the file set is empty.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Iterate over files.
    pub fn iter(&self) -> impl Iterator<Item = &SourceFile> {
        self.files.iter()
    }

    /// Filter files by language.
    pub fn filter_by_language(&self, lang: Language) -> Vec<&SourceFile> {
        self.files.iter().filter(|f| f.language == lang).collect()
    }

    /// Get files grouped by language, in canonical language order.
    pub fn group_by_language(&self) -> BTreeMap<Language, Vec<&SourceFile>> {
        let mut groups: BTreeMap<Language, Vec<&SourceFile>> = BTreeMap::new();
        for file in &self.files {
            groups.entry(file.language).or_default().push(file);
        }
        groups
    }

    /// File count per language.
    pub fn language_counts(&self) -> BTreeMap<Language, usize> {
        let mut counts = BTreeMap::new();
        for file in &self.files {
            *counts.entry(file.language).or_insert(0) += 1;
        }
        counts
    }
}

impl<'a> IntoIterator for &'a FileSet {
    type Item = &'a SourceFile;
    type IntoIter = std::slice::Iter<'a, SourceFile>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.iter()
    }
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern).map_err(|e| {
            super::Error::Config(format!("invalid exclude pattern {pattern:?}: {e}"))
        })?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| super::Error::Config(format!("invalid exclude patterns: {e}")))
}

fn is_excluded(excludes: &GlobSet, path: &Path) -> bool {
    let normalized = path.to_string_lossy().replace('\\', "/");
    excludes.is_match(normalized.as_str())
}
