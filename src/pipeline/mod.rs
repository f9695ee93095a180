//! Analysis pipeline: fetch, extract per file, cross-file pass, aggregate.
//!
//! Per-file extraction runs on a bounded rayon pool and is folded into
//! worker-local batches, so the hot path takes no locks. The cross-file
//! analyzers only start once every file has been extracted or skipped.
//! A run deadline is checked before each file; files not started in time are
//! recorded in coverage and the profile is built from what finished.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::aggregate::{aggregate, RepositoryProfile};
use crate::analyzers;
use crate::config::Config;
use crate::core::{AnalysisContext, ContentSource, Error, FileSet, Result, SourceFile};
use crate::empathy::{self, EmpathyResult};
use crate::languages::{AnalyzedFile, AnalyzerFactory, FileFacts};
use crate::metrics::LanguageMetrics;

type ProgressFn<'a> = dyn Fn(usize, usize) + Send + Sync + 'a;

/// Both profiles and the comparison between them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comparison {
    pub reference: RepositoryProfile,
    pub candidate: RepositoryProfile,
    pub result: EmpathyResult,
}

/// Runs analysis with a validated configuration.
pub struct Pipeline<'a> {
    config: &'a Config,
    on_progress: Option<Box<ProgressFn<'a>>>,
    deadline: Option<Instant>,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            on_progress: None,
            deadline: None,
        }
    }

    /// Fixed deadline for extraction, overriding `runtime.timeout_secs`.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Progress callback: (files extracted, files in batch).
    pub fn with_progress<F>(mut self, f: F) -> Self
    where
        F: Fn(usize, usize) + Send + Sync + 'a,
    {
        self.on_progress = Some(Box::new(f));
        self
    }

    /// Fetch and profile one repository.
    pub fn profile_source(&self, source: &dyn ContentSource) -> Result<RepositoryProfile> {
        let start = Instant::now();
        let files = FileSet::from_source(source, self.config)?;
        debug!(
            repository = %source.repository_id(),
            files = files.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "fetched"
        );
        self.profile(source.repository_id(), files)
    }

    /// Profile an already built file set.
    pub fn profile(&self, name: impl Into<String>, mut files: FileSet) -> Result<RepositoryProfile> {
        let name = name.into();
        let start = Instant::now();
        let mut coverage = files.take_coverage();

        let batch = self.extract(files.files())?;
        coverage.files_analyzed = batch.files.len();
        coverage.timed_out = batch.timed_out;
        coverage.fallbacks = batch.fallbacks;
        if batch.timed_out > 0 {
            warn!(
                repository = %name,
                skipped = batch.timed_out,
                "deadline reached, profiling partial results"
            );
        }

        let language_metrics = self.score_languages(&batch.files);
        let ctx = AnalysisContext::new(&batch.files, self.config);
        let advanced = analyzers::analyze_repository(&ctx)?;
        let profile = aggregate(&name, language_metrics, advanced, coverage, &self.config.weights);

        info!(
            repository = %name,
            files = profile.total_files(),
            languages = profile.languages.len(),
            overall = %format!("{:.1}", profile.overall()),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "profile complete"
        );
        Ok(profile)
    }

    /// Profile two repositories and compare them.
    pub fn compare_sources(
        &self,
        reference: &dyn ContentSource,
        candidate: &dyn ContentSource,
    ) -> Result<Comparison> {
        let reference = self.profile_source(reference)?;
        let candidate = self.profile_source(candidate)?;
        self.compare(reference, candidate)
    }

    /// Compare two finished profiles.
    pub fn compare(
        &self,
        reference: RepositoryProfile,
        candidate: RepositoryProfile,
    ) -> Result<Comparison> {
        let result = empathy::compare(&reference, &candidate, self.config)?;
        info!(
            reference = %reference.name,
            candidate = %candidate.name,
            score = %format!("{:.1}", result.score),
            level = %result.level,
            "comparison complete"
        );
        Ok(Comparison {
            reference,
            candidate,
            result,
        })
    }

    fn extract<'f>(&self, files: &'f [SourceFile]) -> Result<Batch<'f>> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.runtime.worker_count())
            .build()
            .map_err(|e| Error::analysis(format!("failed to build worker pool: {e}")))?;

        let deadline = self.deadline.or(match self.config.runtime.timeout_secs {
            0 => None,
            secs => Some(Instant::now() + Duration::from_secs(secs)),
        });
        let expired = AtomicBool::new(false);
        let done = AtomicUsize::new(0);
        let total = files.len();

        let mut batch = pool.install(|| {
            files
                .par_iter()
                .fold(Batch::default, |mut batch, source| {
                    if is_expired(&expired, deadline) {
                        batch.timed_out += 1;
                        return batch;
                    }
                    let facts = AnalyzerFactory::resolve(source).extract(source);
                    if facts.fallback {
                        batch.fallbacks += 1;
                    }
                    batch.files.push(AnalyzedFile { source, facts });
                    let current = done.fetch_add(1, Ordering::Relaxed) + 1;
                    if let Some(ref f) = self.on_progress {
                        f(current, total);
                    }
                    batch
                })
                .reduce(Batch::default, Batch::merge)
        });
        batch.files.sort_by(|a, b| a.facts.path.cmp(&b.facts.path));
        Ok(batch)
    }

    fn score_languages(&self, files: &[AnalyzedFile<'_>]) -> Vec<LanguageMetrics> {
        let mut by_language: std::collections::BTreeMap<_, Vec<FileFacts>> = Default::default();
        for file in files {
            by_language
                .entry(file.facts.language)
                .or_default()
                .push(file.facts.clone());
        }
        by_language
            .into_iter()
            .map(|(language, facts)| {
                let metrics =
                    AnalyzerFactory::for_language(language).score(&facts, &self.config.thresholds);
                debug!(
                    language = %language,
                    files = metrics.file_count,
                    lines = metrics.line_count,
                    "language scored"
                );
                metrics
            })
            .collect()
    }
}

fn is_expired(expired: &AtomicBool, deadline: Option<Instant>) -> bool {
    if expired.load(Ordering::Relaxed) {
        return true;
    }
    match deadline {
        Some(deadline) if Instant::now() >= deadline => {
            expired.store(true, Ordering::Relaxed);
            true
        }
        _ => false,
    }
}

/// Worker-local extraction results.
#[derive(Default)]
struct Batch<'f> {
    files: Vec<AnalyzedFile<'f>>,
    timed_out: usize,
    fallbacks: usize,
}

impl<'f> Batch<'f> {
    fn merge(mut self, other: Self) -> Self {
        self.files.extend(other.files);
        self.timed_out += other.timed_out;
        self.fallbacks += other.fallbacks;
        self
    }
}

/// Profile one repository with the given configuration.
pub fn profile(source: &dyn ContentSource, config: &Config) -> Result<RepositoryProfile> {
    Pipeline::new(config).profile_source(source)
}

/// Profile two repositories and compare them.
pub fn compare(
    reference: &dyn ContentSource,
    candidate: &dyn ContentSource,
    config: &Config,
) -> Result<Comparison> {
    Pipeline::new(config).compare_sources(reference, candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Language, MemorySource};
    use crate::empathy::Level;
    use crate::metrics::Category;
    use std::sync::Arc;

    fn repo(id: &str) -> MemorySource {
        MemorySource::new(id)
            .with_file(
                "app/service.py",
                "\"\"\"Order service.\"\"\"\n\nfrom app import store\n\n\ndef total(items):\n    \"\"\"Sum item prices.\"\"\"\n    return sum(i.price for i in items)\n",
            )
            .with_file(
                "app/store.py",
                "\"\"\"Storage.\"\"\"\n\n\ndef load(path):\n    \"\"\"Load rows.\"\"\"\n    try:\n        with open(path) as fh:\n            return fh.readlines()\n    except OSError:\n        return []\n",
            )
            .with_file("web/site.css", ".header {\n  color: #333;\n}\n")
            .with_file("README.md", "# readme\n")
    }

    #[test]
    fn test_profile_counts_coverage() {
        let config = Config::default();
        let profile = profile(&repo("mem"), &config).unwrap();
        assert_eq!(profile.name, "mem");
        assert_eq!(profile.total_files(), 3);
        assert_eq!(profile.coverage.files_analyzed, 3);
        assert_eq!(profile.coverage.unsupported, 1);
        assert_eq!(profile.scores.len(), 11);
        assert_eq!(profile.primary_language(), Some(Language::Python));
    }

    #[test]
    fn test_identical_sources_score_full() {
        let config = Config::default();
        let comparison = compare(&repo("a"), &repo("b"), &config).unwrap();
        assert_eq!(comparison.result.score, 100.0);
        assert_eq!(comparison.result.level, Level::Excelente);
        for category in Category::ALL {
            assert_eq!(comparison.result.delta(category), 0.0);
        }
    }

    #[test]
    fn test_worker_count_does_not_change_profile() {
        let mut single = Config::default();
        single.runtime.workers = 1;
        let mut many = Config::default();
        many.runtime.workers = 4;
        let a = profile(&repo("mem"), &single).unwrap();
        let b = profile(&repo("mem"), &many).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_progress_reaches_total() {
        let config = Config::default();
        let last = Arc::new(AtomicUsize::new(0));
        let seen = last.clone();
        Pipeline::new(&config)
            .with_progress(move |done, _| {
                seen.fetch_max(done, Ordering::SeqCst);
            })
            .profile_source(&repo("mem"))
            .unwrap();
        assert_eq!(last.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_both_empty_fails() {
        let config = Config::default();
        let empty = MemorySource::new("empty");
        assert!(matches!(
            compare(&empty, &empty, &config),
            Err(Error::NoAnalyzableInput)
        ));
    }

    #[test]
    fn test_timed_out_profile_is_partial_but_comparable() {
        let config = Config::default();
        let late = Pipeline::new(&config)
            .with_deadline(Instant::now())
            .profile_source(&repo("late"))
            .unwrap();
        assert_eq!(late.coverage.timed_out, 3);
        assert_eq!(late.coverage.files_analyzed, 0);
        assert!(late.coverage.is_partial());
        assert!(late.is_empty());

        let pipeline = Pipeline::new(&config);
        let reference = pipeline.profile_source(&repo("ref")).unwrap();
        let comparison = pipeline.compare(reference, late).unwrap();
        let score = comparison.result.score;
        assert!(score.is_finite());
        assert!((0.0..=100.0).contains(&score));
        assert_eq!(comparison.result.level, Level::Deficiente);
    }

    #[test]
    fn test_duplicate_delivery_order_does_not_change_profile() {
        let config = Config::default();
        let clean = MemorySource::new("mem")
            .with_file("x.py", "x = 1\n")
            .with_file("x.py", "eval(user_input)\n");
        let risky = MemorySource::new("mem")
            .with_file("x.py", "eval(user_input)\n")
            .with_file("x.py", "x = 1\n");
        let a = profile(&clean, &config).unwrap();
        let b = profile(&risky, &config).unwrap();
        assert_eq!(
            a.scores.value(Category::Security),
            b.scores.value(Category::Security)
        );
        assert_eq!(a, b);
    }

    #[test]
    fn test_expired_deadline_skips_everything() {
        let expired = AtomicBool::new(false);
        assert!(!is_expired(&expired, None));
        assert!(is_expired(&expired, Some(Instant::now())));
        assert!(is_expired(&expired, None));
    }
}
