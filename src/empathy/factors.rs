//! Correlation, language match and adjustment factors.
//!
//! Every factor is a multiplier centered at 1.0. Penalties are bounded below
//! and bonuses are small fixed steps, so the product of all six stays within
//! roughly `[0.72, 1.13]` and can never blow up the weighted base.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::aggregate::RepositoryProfile;
use crate::config::LanguagesConfig;
use crate::core::Language;
use crate::metrics::{Category, MAX_SCORE};

/// Correlation bonus table: (minimum of both scores, bonus).
const HIGH_BRACKETS: [(f64, f64); 2] = [(85.0, 1.05), (70.0, 1.03)];
/// Both repositories weak in the same way.
const LOW_CEILING: f64 = 30.0;
const LOW_MAX_DIFFERENCE: f64 = 10.0;
const LOW_BONUS: f64 = 1.02;

/// Language match floor for repositories sharing no language.
pub const LANGUAGE_FLOOR: f64 = 0.1;

/// Complexity difference tolerated before the penalty starts.
const COMPLEXITY_TOLERANCE: f64 = 10.0;
const COMPLEXITY_SLOPE: f64 = 300.0;
const COMPLEXITY_FLOOR: f64 = 0.85;

const CONSISTENCY_MAX_STD: f64 = 10.0;
const CONSISTENCY_MIN_MEAN: f64 = 50.0;
const CONSISTENCY_BONUS: f64 = 1.02;

const EXCELLENCE_THRESHOLD: f64 = 85.0;
const EXCELLENCE_BONUS: f64 = 1.03;

/// Anti-pattern penalty per excess instance (per ten files), and its floor.
const ANTI_PATTERN_STEP: f64 = 0.02;
const ANTI_PATTERN_FLOOR: f64 = 0.85;

const PATTERN_STEP: f64 = 0.01;
const MAX_PATTERN_BONUS: f64 = 0.05;

const BALANCE_MAX_CV: f64 = 0.15;
const BALANCE_MIN_MEAN: f64 = 50.0;
const BALANCE_BONUS: f64 = 1.02;

/// Bonus multiplier `Ci` for one category, from both raw scores.
pub fn correlation(reference: f64, candidate: f64) -> f64 {
    let low = reference.min(candidate);
    for (floor, bonus) in HIGH_BRACKETS {
        if low >= floor {
            return bonus;
        }
    }
    let high = reference.max(candidate);
    if high <= LOW_CEILING && high - low <= LOW_MAX_DIFFERENCE {
        return LOW_BONUS;
    }
    1.0
}

/// `Si = 100 - |reference - candidate|`.
pub fn similarity(reference: f64, candidate: f64) -> f64 {
    (MAX_SCORE - (reference - candidate).abs()).clamp(0.0, MAX_SCORE)
}

/// Languages of both repositories and the importance-weighted overlap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageOverlap {
    /// Language match factor `L`, in `[LANGUAGE_FLOOR, 1]`.
    pub factor: f64,
    /// Present in both repositories.
    pub shared: Vec<Language>,
    /// Present in the reference only.
    pub missing: Vec<Language>,
    /// Present in the candidate only.
    pub extra: Vec<Language>,
}

impl LanguageOverlap {
    /// Overlap as a percentage, for reports.
    pub fn percentage(&self) -> f64 {
        self.factor * 100.0
    }
}

/// Weighted Jaccard similarity of the file-share vectors. Each language's
/// terms are scaled by its importance multiplier.
pub fn language_overlap(
    reference: &RepositoryProfile,
    candidate: &RepositoryProfile,
    languages: &LanguagesConfig,
) -> LanguageOverlap {
    let all: BTreeSet<Language> = reference
        .languages
        .keys()
        .chain(candidate.languages.keys())
        .copied()
        .collect();

    let mut intersection = 0.0;
    let mut union = 0.0;
    let (mut shared, mut missing, mut extra) = (Vec::new(), Vec::new(), Vec::new());
    for language in all {
        let r = reference.share(language);
        let c = candidate.share(language);
        let weight = languages.importance(language);
        intersection += weight * r.min(c);
        union += weight * r.max(c);
        match (r > 0.0, c > 0.0) {
            (true, true) => shared.push(language),
            (true, false) => missing.push(language),
            (false, true) => extra.push(language),
            (false, false) => {}
        }
    }

    let factor = if union > 0.0 {
        (intersection / union).clamp(LANGUAGE_FLOOR, 1.0)
    } else {
        LANGUAGE_FLOOR
    };
    LanguageOverlap {
        factor,
        shared,
        missing,
        extra,
    }
}

/// The six adjustment factors, each centered at 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Factors {
    /// F1, at most 1.
    pub complexity: f64,
    /// F2, at least 1.
    pub consistency: f64,
    /// F3, at least 1.
    pub excellence: f64,
    /// F4, at most 1.
    pub anti_patterns: f64,
    /// F5, at least 1.
    pub patterns: f64,
    /// F6, at least 1.
    pub balance: f64,
}

impl Default for Factors {
    fn default() -> Self {
        Self {
            complexity: 1.0,
            consistency: 1.0,
            excellence: 1.0,
            anti_patterns: 1.0,
            patterns: 1.0,
            balance: 1.0,
        }
    }
}

impl Factors {
    pub fn compute(reference: &RepositoryProfile, candidate: &RepositoryProfile) -> Self {
        Self {
            complexity: complexity_penalty(
                reference.scores.value(Category::Complexity),
                candidate.scores.value(Category::Complexity),
            ),
            consistency: consistency_bonus(candidate),
            excellence: excellence_bonus(reference, candidate),
            anti_patterns: anti_pattern_penalty(reference, candidate),
            patterns: pattern_bonus(candidate),
            balance: balance_bonus(candidate),
        }
    }

    pub fn product(&self) -> f64 {
        self.complexity
            * self.consistency
            * self.excellence
            * self.anti_patterns
            * self.patterns
            * self.balance
    }
}

/// F1: shrinks as the complexity scores drift apart.
pub fn complexity_penalty(reference: f64, candidate: f64) -> f64 {
    let excess = ((reference - candidate).abs() - COMPLEXITY_TOLERANCE).max(0.0);
    (1.0 - excess / COMPLEXITY_SLOPE).max(COMPLEXITY_FLOOR)
}

/// F2: the candidate's base categories are uniformly decent.
pub fn consistency_bonus(candidate: &RepositoryProfile) -> f64 {
    let std = candidate.scores.std_dev(&Category::BASE);
    let mean = candidate.scores.mean(&Category::BASE);
    if std <= CONSISTENCY_MAX_STD && mean >= CONSISTENCY_MIN_MEAN {
        CONSISTENCY_BONUS
    } else {
        1.0
    }
}

/// F3: both repositories excel in every critical category.
pub fn excellence_bonus(reference: &RepositoryProfile, candidate: &RepositoryProfile) -> f64 {
    let excels = |p: &RepositoryProfile| {
        Category::CRITICAL
            .iter()
            .all(|c| p.scores.value(*c) > EXCELLENCE_THRESHOLD)
    };
    if excels(reference) && excels(candidate) {
        EXCELLENCE_BONUS
    } else {
        1.0
    }
}

/// Anti-pattern instances per ten production files.
fn anti_pattern_density(profile: &RepositoryProfile) -> f64 {
    let blocks = (profile.total_files() as f64 / 10.0).max(1.0);
    profile.advanced.patterns.anti_pattern_count() as f64 / blocks
}

/// F4: the candidate carries more anti-patterns than the reference.
pub fn anti_pattern_penalty(reference: &RepositoryProfile, candidate: &RepositoryProfile) -> f64 {
    let excess = (anti_pattern_density(candidate) - anti_pattern_density(reference)).max(0.0);
    (1.0 - ANTI_PATTERN_STEP * excess).max(ANTI_PATTERN_FLOOR)
}

/// F5: recognized design patterns in the candidate.
pub fn pattern_bonus(candidate: &RepositoryProfile) -> f64 {
    let patterns = candidate.advanced.patterns.distinct_patterns() as f64;
    1.0 + (PATTERN_STEP * patterns).min(MAX_PATTERN_BONUS)
}

/// F6: the candidate's eleven scores are evenly spread.
pub fn balance_bonus(candidate: &RepositoryProfile) -> f64 {
    let mean = candidate.scores.mean(&Category::ALL);
    if mean < BALANCE_MIN_MEAN {
        return 1.0;
    }
    let cv = candidate.scores.std_dev(&Category::ALL) / mean;
    if cv <= BALANCE_MAX_CV {
        BALANCE_BONUS
    } else {
        1.0
    }
}
