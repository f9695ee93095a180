//! Empathy scoring: how closely a candidate repository matches the style of
//! a reference repository.
//!
//! ```text
//! Si = 100 - |ref_i - cand_i|
//! B  = sum(min(100, Si * Ci) * Wi)       (weights sum to 1)
//! E  = clamp(B * L * F1..F6)
//! ```
//!
//! `Ci` rewards categories where both repositories are strong (or weak)
//! together and is applied per category before summation only. `L` is the
//! language overlap and `F1..F6` are the adjustment factors. The result is a
//! pure function of the two profiles.

mod factors;
mod recommendations;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::aggregate::RepositoryProfile;
use crate::config::Config;
use crate::core::{Error, Result};
use crate::metrics::{clamp_score, Category, MAX_SCORE};

pub use factors::{
    correlation, language_overlap, similarity, Factors, LanguageOverlap, LANGUAGE_FLOOR,
};
pub use recommendations::{recommend, Level, Priority, Recommendation, MIN_GAP};

/// Candidate scores at or above this are strengths.
pub const STRENGTH_THRESHOLD: f64 = 80.0;
/// Candidate scores below this are weaknesses.
pub const WEAKNESS_THRESHOLD: f64 = 60.0;

/// One category of the comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryComparison {
    pub category: Category,
    pub reference: f64,
    pub candidate: f64,
    /// `reference - candidate`; positive when the candidate falls short.
    pub delta: f64,
    /// `min(100, Si * Ci)`.
    pub similarity: f64,
    /// `Ci`.
    pub correlation: f64,
    pub weight: f64,
}

impl CategoryComparison {
    /// Contribution to the weighted base.
    pub fn contribution(&self) -> f64 {
        self.similarity * self.weight
    }
}

/// Outcome of comparing two profiles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmpathyResult {
    /// Final score `E`, in `[0, 100]`.
    pub score: f64,
    pub level: Level,
    pub description: String,
    pub verdict: String,
    /// Weighted base `B` before the language and adjustment factors.
    pub base_score: f64,
    pub language_overlap: LanguageOverlap,
    pub factors: Factors,
    /// All eleven categories, in category order.
    pub categories: Vec<CategoryComparison>,
    pub strengths: Vec<Category>,
    pub weaknesses: Vec<Category>,
    pub recommendations: Vec<Recommendation>,
}

impl EmpathyResult {
    pub fn comparison(&self, category: Category) -> Option<&CategoryComparison> {
        self.categories.iter().find(|c| c.category == category)
    }

    /// `reference - candidate` for one category, zero when absent.
    pub fn delta(&self, category: Category) -> f64 {
        self.comparison(category).map_or(0.0, |c| c.delta)
    }
}

/// Compare a candidate profile against a reference profile.
///
/// Fails only when neither repository had a single scorable file; an empty
/// side on its own yields a defined, very low score.
pub fn compare(
    reference: &RepositoryProfile,
    candidate: &RepositoryProfile,
    config: &Config,
) -> Result<EmpathyResult> {
    if reference.is_empty() && candidate.is_empty() {
        return Err(Error::NoAnalyzableInput);
    }

    let categories: Vec<CategoryComparison> = Category::ALL
        .iter()
        .map(|&category| {
            let r = reference.scores.value(category);
            let c = candidate.scores.value(category);
            let ci = correlation(r, c);
            CategoryComparison {
                category,
                reference: r,
                candidate: c,
                delta: r - c,
                similarity: (similarity(r, c) * ci).min(MAX_SCORE),
                correlation: ci,
                weight: config.weights.get(category),
            }
        })
        .collect();
    // Summed as a shortfall so that perfect agreement is exactly 100.
    let shortfall: f64 = categories
        .iter()
        .map(|c| (MAX_SCORE - c.similarity) * c.weight)
        .sum();
    let base_score = clamp_score(MAX_SCORE - shortfall);

    let overlap = language_overlap(reference, candidate, &config.languages);
    let factors = Factors::compute(reference, candidate);
    let score = clamp_score(base_score * overlap.factor * factors.product());
    let level = Level::from_score(score);

    debug!(
        base = base_score,
        language = overlap.factor,
        factors = factors.product(),
        score,
        "empathy computed"
    );

    let strengths = categories
        .iter()
        .filter(|c| c.candidate >= STRENGTH_THRESHOLD)
        .map(|c| c.category)
        .collect();
    let weaknesses = categories
        .iter()
        .filter(|c| c.candidate < WEAKNESS_THRESHOLD)
        .map(|c| c.category)
        .collect();
    let gaps: Vec<(Category, f64)> = categories.iter().map(|c| (c.category, c.delta)).collect();
    let recommendations = recommend(&gaps, config.thresholds.max_recommendations);

    Ok(EmpathyResult {
        score,
        level,
        description: level.description().to_string(),
        verdict: level.verdict().to_string(),
        base_score,
        language_overlap: overlap,
        factors,
        categories,
        strengths,
        weaknesses,
        recommendations,
    })
}
