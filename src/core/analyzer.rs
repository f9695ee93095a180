//! Repository-wide analyzer trait and its shared context.

use serde::Serialize;

use super::Result;
use crate::config::Config;
use crate::languages::AnalyzedFile;

/// Trait implemented by the cross-file analyzers.
///
/// Each one runs once per repository, after every file has been extracted.
pub trait Analyzer: Send + Sync {
    /// The report type produced by this analyzer.
    type Output: Serialize + Send;

    /// Unique identifier for this analyzer.
    fn name(&self) -> &'static str;

    /// Human-readable description.
    fn description(&self) -> &'static str;

    /// Run analysis over the whole repository.
    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Result<Self::Output>;

    /// Pick up thresholds from config.
    fn configure(&mut self, _config: &Config) -> Result<()> {
        Ok(())
    }
}

/// Context shared by all analyzers of one repository.
pub struct AnalysisContext<'a> {
    /// Every extracted file, in path order.
    pub files: &'a [AnalyzedFile<'a>],
    pub config: &'a Config,
    /// Progress callback: (done, total).
    pub on_progress: Option<Box<dyn Fn(usize, usize) + Send + Sync + 'a>>,
}

impl<'a> AnalysisContext<'a> {
    pub fn new(files: &'a [AnalyzedFile<'a>], config: &'a Config) -> Self {
        Self {
            files,
            config,
            on_progress: None,
        }
    }

    /// Add progress callback.
    pub fn with_progress<F>(mut self, f: F) -> Self
    where
        F: Fn(usize, usize) + Send + Sync + 'a,
    {
        self.on_progress = Some(Box::new(f));
        self
    }

    /// Report progress if callback is set.
    pub fn report_progress(&self, current: usize, total: usize) {
        if let Some(ref f) = self.on_progress {
            f(current, total);
        }
    }

    /// Number of non-test files, the denominator for density scores.
    pub fn production_files(&self) -> usize {
        self.files
            .iter()
            .filter(|f| !f.facts.tests.is_test_file)
            .count()
    }
}
