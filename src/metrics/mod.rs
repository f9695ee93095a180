//! Metric primitives shared by every analyzer.
//!
//! A [`CategoryScore`] is always clamped to `[0, 100]` at construction, so no
//! analyzer can hand an unbounded or NaN value to the aggregator.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::analyzers::{
    CommentReport, DependencyReport, DuplicationReport, PatternReport, PerformanceReport,
};
use crate::core::Language;

/// Lowest category score.
pub const MIN_SCORE: f64 = 0.0;
/// Highest category score.
pub const MAX_SCORE: f64 = 100.0;

/// Clamp a raw value into `[0, 100]`. NaN maps to 0.
pub fn clamp_score(value: f64) -> f64 {
    if value.is_nan() {
        MIN_SCORE
    } else {
        value.clamp(MIN_SCORE, MAX_SCORE)
    }
}

/// The eleven fixed style and quality dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Naming,
    Documentation,
    Modularity,
    Complexity,
    ErrorHandling,
    Testing,
    Security,
    StyleConsistency,
    Patterns,
    Performance,
    Comments,
}

impl Category {
    /// All categories in report order.
    pub const ALL: [Category; 11] = [
        Self::Naming,
        Self::Documentation,
        Self::Modularity,
        Self::Complexity,
        Self::ErrorHandling,
        Self::Testing,
        Self::Security,
        Self::StyleConsistency,
        Self::Patterns,
        Self::Performance,
        Self::Comments,
    ];

    /// Categories every language analyzer produces.
    pub const BASE: [Category; 8] = [
        Self::Naming,
        Self::Documentation,
        Self::Modularity,
        Self::Complexity,
        Self::ErrorHandling,
        Self::Testing,
        Self::Security,
        Self::StyleConsistency,
    ];

    /// Categories computed once per repository.
    pub const ADVANCED: [Category; 3] = [Self::Patterns, Self::Performance, Self::Comments];

    /// Categories whose simultaneous excellence earns a bonus.
    pub const CRITICAL: [Category; 3] = [Self::Naming, Self::Documentation, Self::ErrorHandling];

    pub fn key(&self) -> &'static str {
        match self {
            Self::Naming => "naming",
            Self::Documentation => "documentation",
            Self::Modularity => "modularity",
            Self::Complexity => "complexity",
            Self::ErrorHandling => "error_handling",
            Self::Testing => "testing",
            Self::Security => "security",
            Self::StyleConsistency => "style_consistency",
            Self::Patterns => "patterns",
            Self::Performance => "performance",
            Self::Comments => "comments",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Naming => "Naming",
            Self::Documentation => "Documentation",
            Self::Modularity => "Modularity",
            Self::Complexity => "Complexity",
            Self::ErrorHandling => "Error handling",
            Self::Testing => "Testing",
            Self::Security => "Security",
            Self::StyleConsistency => "Style consistency",
            Self::Patterns => "Design patterns",
            Self::Performance => "Performance",
            Self::Comments => "Comments",
        }
    }

    pub fn is_base(&self) -> bool {
        Self::BASE.contains(self)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// One bounded category score plus the counts it was derived from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub category: Category,
    value: f64,
    /// Counts and ratios behind the value, for explainability.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub evidence: BTreeMap<String, f64>,
}

impl CategoryScore {
    /// Create a score, clamping the value.
    pub fn new(category: Category, value: f64) -> Self {
        Self {
            category,
            value: clamp_score(value),
            evidence: BTreeMap::new(),
        }
    }

    pub fn zero(category: Category) -> Self {
        Self::new(category, MIN_SCORE)
    }

    /// Attach one evidence entry. Non-finite values are recorded as 0.
    pub fn with_evidence(mut self, key: impl Into<String>, value: impl Into<f64>) -> Self {
        let value = value.into();
        self.evidence
            .insert(key.into(), if value.is_finite() { value } else { 0.0 });
        self
    }

    pub fn value(&self) -> f64 {
        self.value
    }
}

/// A set of category scores keyed by category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryScores(BTreeMap<Category, CategoryScore>);

impl CategoryScores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every category in `categories` at zero.
    pub fn zeros(categories: &[Category]) -> Self {
        let mut scores = Self::new();
        for category in categories {
            scores.insert(CategoryScore::zero(*category));
        }
        scores
    }

    pub fn insert(&mut self, score: CategoryScore) {
        self.0.insert(score.category, score);
    }

    /// Value for a category; categories that were not scored read as 0.
    pub fn value(&self, category: Category) -> f64 {
        self.0.get(&category).map(|s| s.value()).unwrap_or(MIN_SCORE)
    }

    pub fn get(&self, category: Category) -> Option<&CategoryScore> {
        self.0.get(&category)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CategoryScore> {
        self.0.values()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Mean over the given categories.
    pub fn mean(&self, categories: &[Category]) -> f64 {
        if categories.is_empty() {
            return 0.0;
        }
        categories.iter().map(|c| self.value(*c)).sum::<f64>() / categories.len() as f64
    }

    /// Population standard deviation over the given categories.
    pub fn std_dev(&self, categories: &[Category]) -> f64 {
        if categories.is_empty() {
            return 0.0;
        }
        let mean = self.mean(categories);
        let variance = categories
            .iter()
            .map(|c| (self.value(*c) - mean).powi(2))
            .sum::<f64>()
            / categories.len() as f64;
        variance.sqrt()
    }
}

impl FromIterator<CategoryScore> for CategoryScores {
    fn from_iter<I: IntoIterator<Item = CategoryScore>>(iter: I) -> Self {
        let mut scores = Self::new();
        for score in iter {
            scores.insert(score);
        }
        scores
    }
}

/// The eight base scores of one language in one repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageMetrics {
    pub language: Language,
    pub file_count: usize,
    pub line_count: usize,
    pub scores: CategoryScores,
}

/// Repository-wide results of the advanced analyzers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdvancedMetrics {
    /// Patterns, performance and comments scores.
    pub scores: CategoryScores,
    pub duplication: DuplicationReport,
    pub dependencies: DependencyReport,
    pub patterns: PatternReport,
    pub performance: PerformanceReport,
    pub comments: CommentReport,
}

impl AdvancedMetrics {
    /// Advanced metrics of a repository with nothing to analyze.
    pub fn empty() -> Self {
        Self {
            scores: CategoryScores::zeros(&Category::ADVANCED),
            ..Self::default()
        }
    }
}
