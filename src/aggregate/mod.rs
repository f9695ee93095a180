//! Metrics aggregation: per-language and repository-wide scores merged into
//! one eleven-category profile per repository.
//!
//! Base categories are averaged over languages weighted by file-count share.
//! Advanced categories are global and taken as they are. Duplication and
//! dependency health have no category of their own; they are blended into
//! modularity. Language importance multipliers are not applied here; they
//! only affect cross-repository comparison.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::CategoryWeights;
use crate::core::{Coverage, Language};
use crate::metrics::{AdvancedMetrics, Category, CategoryScore, CategoryScores, LanguageMetrics};

/// Share of modularity taken from the per-language score; the rest is split
/// evenly between duplication and dependency health.
const MODULARITY_BASE_SHARE: f64 = 0.7;
const MODULARITY_DUPLICATION_SHARE: f64 = 0.15;
const MODULARITY_DEPENDENCY_SHARE: f64 = 0.15;

/// How much of a repository one language makes up.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LanguageShare {
    pub files: usize,
    pub lines: usize,
    /// Fraction of the repository's analyzed files, in `[0, 1]`.
    pub share: f64,
}

/// Aggregated scores of one repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryProfile {
    /// Repository identifier, as reported by the content source.
    pub name: String,
    /// All eleven categories.
    pub scores: CategoryScores,
    pub weights: CategoryWeights,
    pub languages: BTreeMap<Language, LanguageShare>,
    /// Base scores per language, in language order.
    pub language_metrics: Vec<LanguageMetrics>,
    pub advanced: AdvancedMetrics,
    pub coverage: Coverage,
}

impl RepositoryProfile {
    /// Profile of a repository with nothing to analyze: every score is zero.
    pub fn empty(name: impl Into<String>, weights: CategoryWeights, coverage: Coverage) -> Self {
        Self {
            name: name.into(),
            scores: CategoryScores::zeros(&Category::ALL),
            weights,
            languages: BTreeMap::new(),
            language_metrics: Vec::new(),
            advanced: AdvancedMetrics::empty(),
            coverage,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.languages.is_empty()
    }

    pub fn total_files(&self) -> usize {
        self.languages.values().map(|l| l.files).sum()
    }

    pub fn total_lines(&self) -> usize {
        self.languages.values().map(|l| l.lines).sum()
    }

    /// Language with the most files; ties go to the earlier language.
    pub fn primary_language(&self) -> Option<Language> {
        self.languages
            .iter()
            .fold(None::<(Language, usize)>, |best, (lang, share)| match best {
                Some((_, files)) if files >= share.files => best,
                _ => Some((*lang, share.files)),
            })
            .map(|(lang, _)| lang)
    }

    /// The repository's own weighted score, independent of any comparison.
    pub fn overall(&self) -> f64 {
        Category::ALL
            .iter()
            .map(|c| self.scores.value(*c) * self.weights.get(*c))
            .sum()
    }

    pub fn share(&self, language: Language) -> f64 {
        self.languages.get(&language).map_or(0.0, |l| l.share)
    }
}

/// Merge per-language metrics and advanced metrics into a profile.
pub fn aggregate(
    name: impl Into<String>,
    mut language_metrics: Vec<LanguageMetrics>,
    advanced: AdvancedMetrics,
    coverage: Coverage,
    weights: &CategoryWeights,
) -> RepositoryProfile {
    language_metrics.retain(|m| m.file_count > 0);
    if language_metrics.is_empty() {
        return RepositoryProfile::empty(name, weights.clone(), coverage);
    }
    language_metrics.sort_by_key(|m| m.language);

    let total_files: usize = language_metrics.iter().map(|m| m.file_count).sum();
    let languages: BTreeMap<Language, LanguageShare> = language_metrics
        .iter()
        .map(|m| {
            let share = LanguageShare {
                files: m.file_count,
                lines: m.line_count,
                share: m.file_count as f64 / total_files as f64,
            };
            (m.language, share)
        })
        .collect();

    let mut scores = CategoryScores::new();
    for category in Category::BASE {
        scores.insert(merge_base(category, &language_metrics, &languages));
    }
    let modularity = blend_modularity(scores.get(Category::Modularity), &advanced);
    scores.insert(modularity);
    for category in Category::ADVANCED {
        match advanced.scores.get(category) {
            Some(score) => scores.insert(score.clone()),
            None => scores.insert(CategoryScore::zero(category)),
        }
    }

    RepositoryProfile {
        name: name.into(),
        scores,
        weights: weights.clone(),
        languages,
        language_metrics,
        advanced,
        coverage,
    }
}

/// Share-weighted average of one base category. Evidence is copied as is
/// for single-language repositories and prefixed by language otherwise.
fn merge_base(
    category: Category,
    metrics: &[LanguageMetrics],
    languages: &BTreeMap<Language, LanguageShare>,
) -> CategoryScore {
    let value: f64 = metrics
        .iter()
        .map(|m| m.scores.value(category) * languages[&m.language].share)
        .sum();
    let mut score = CategoryScore::new(category, value);
    let prefixed = metrics.len() > 1;
    for m in metrics {
        let Some(source) = m.scores.get(category) else {
            continue;
        };
        for (key, v) in &source.evidence {
            let key = if prefixed {
                format!("{}.{key}", m.language.key())
            } else {
                key.clone()
            };
            score = score.with_evidence(key, *v);
        }
    }
    score
}

fn blend_modularity(base: Option<&CategoryScore>, advanced: &AdvancedMetrics) -> CategoryScore {
    let base_value = base.map_or(0.0, CategoryScore::value);
    let value = MODULARITY_BASE_SHARE * base_value
        + MODULARITY_DUPLICATION_SHARE * advanced.duplication.score
        + MODULARITY_DEPENDENCY_SHARE * advanced.dependencies.score;
    let mut score = CategoryScore::new(Category::Modularity, value)
        .with_evidence("structure_score", base_value)
        .with_evidence("duplication_score", advanced.duplication.score)
        .with_evidence("duplication_percentage", advanced.duplication.percentage)
        .with_evidence("dependency_score", advanced.dependencies.score)
        .with_evidence("dependency_cycles", advanced.dependencies.cycles.len() as f64);
    if let Some(base) = base {
        for (key, v) in &base.evidence {
            score = score.with_evidence(key.clone(), *v);
        }
    }
    score
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(language: Language, files: usize, value: f64) -> LanguageMetrics {
        LanguageMetrics {
            language,
            file_count: files,
            line_count: files * 10,
            scores: Category::BASE
                .iter()
                .map(|c| CategoryScore::new(*c, value).with_evidence("files", files as f64))
                .collect(),
        }
    }

    fn advanced(value: f64) -> AdvancedMetrics {
        let mut advanced = AdvancedMetrics {
            scores: Category::ADVANCED
                .iter()
                .map(|c| CategoryScore::new(*c, value))
                .collect(),
            ..AdvancedMetrics::default()
        };
        advanced.duplication.score = value;
        advanced.dependencies.score = value;
        advanced
    }

    #[test]
    fn test_empty_profile_all_zero() {
        let profile = aggregate(
            "empty",
            Vec::new(),
            AdvancedMetrics::empty(),
            Coverage::default(),
            &CategoryWeights::default(),
        );
        assert!(profile.is_empty());
        assert_eq!(profile.scores.len(), 11);
        assert!(profile.scores.iter().all(|s| s.value() == 0.0));
        assert_eq!(profile.overall(), 0.0);
        assert_eq!(profile.primary_language(), None);
    }

    #[test]
    fn test_file_share_weighting() {
        let profile = aggregate(
            "mixed",
            vec![metrics(Language::Python, 3, 80.0), metrics(Language::Css, 1, 40.0)],
            advanced(90.0),
            Coverage::default(),
            &CategoryWeights::default(),
        );
        assert_eq!(profile.share(Language::Python), 0.75);
        assert_eq!(profile.scores.value(Category::Naming), 70.0);
        assert_eq!(profile.scores.value(Category::Patterns), 90.0);
        assert_eq!(profile.primary_language(), Some(Language::Python));
        let naming = profile.scores.get(Category::Naming).unwrap();
        assert_eq!(naming.evidence["python.files"], 3.0);
        assert_eq!(naming.evidence["css.files"], 1.0);
    }

    #[test]
    fn test_modularity_blends_duplication_and_dependencies() {
        let profile = aggregate(
            "repo",
            vec![metrics(Language::Go, 2, 100.0)],
            advanced(0.0),
            Coverage::default(),
            &CategoryWeights::default(),
        );
        assert!((profile.scores.value(Category::Modularity) - 70.0).abs() < 1e-9);
    }

    #[test]
    fn test_language_order_does_not_matter() {
        let a = aggregate(
            "repo",
            vec![metrics(Language::Go, 2, 60.0), metrics(Language::Ruby, 5, 30.0)],
            advanced(50.0),
            Coverage::default(),
            &CategoryWeights::default(),
        );
        let b = aggregate(
            "repo",
            vec![metrics(Language::Ruby, 5, 30.0), metrics(Language::Go, 2, 60.0)],
            advanced(50.0),
            Coverage::default(),
            &CategoryWeights::default(),
        );
        assert_eq!(a, b);
    }

    #[test]
    fn test_overall_identity_for_uniform_scores() {
        let profile = aggregate(
            "repo",
            vec![metrics(Language::Java, 1, 80.0)],
            advanced(80.0),
            Coverage::default(),
            &CategoryWeights::default(),
        );
        assert!((profile.overall() - 80.0).abs() < 1e-9);
    }
}
