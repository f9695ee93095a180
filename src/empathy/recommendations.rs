//! Level bands and per-category advice.

use serde::{Deserialize, Serialize};

use crate::metrics::Category;

/// The five empathy bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Level {
    Excelente,
    Bueno,
    Aceptable,
    Regular,
    Deficiente,
}

impl Level {
    /// All bands, best first.
    pub const ALL: [Level; 5] = [
        Self::Excelente,
        Self::Bueno,
        Self::Aceptable,
        Self::Regular,
        Self::Deficiente,
    ];

    pub fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            Self::Excelente
        } else if score >= 75.0 {
            Self::Bueno
        } else if score >= 60.0 {
            Self::Aceptable
        } else if score >= 45.0 {
            Self::Regular
        } else {
            Self::Deficiente
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Excelente => "Excelente",
            Self::Bueno => "Bueno",
            Self::Aceptable => "Aceptable",
            Self::Regular => "Regular",
            Self::Deficiente => "Deficiente",
        }
    }

    /// Score range as shown in reports.
    pub fn range(&self) -> &'static str {
        match self {
            Self::Excelente => "90-100",
            Self::Bueno => "75-89",
            Self::Aceptable => "60-74",
            Self::Regular => "45-59",
            Self::Deficiente => "0-44",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Excelente => "The candidate writes code almost exactly the way the reference team does.",
            Self::Bueno => "The candidate's style is closely aligned, with a few visible differences.",
            Self::Aceptable => "The candidate shares the fundamentals but diverges in several areas.",
            Self::Regular => "The candidate's habits differ noticeably from the reference codebase.",
            Self::Deficiente => "The candidate's code has little in common with the reference style.",
        }
    }

    /// Hiring-style verdict.
    pub fn verdict(&self) -> &'static str {
        match self {
            Self::Excelente => "Strong fit: can contribute to the codebase immediately.",
            Self::Bueno => "Good fit: a short onboarding on team conventions is enough.",
            Self::Aceptable => "Possible fit: plan mentoring on the weaker categories.",
            Self::Regular => "Weak fit: significant adaptation would be required.",
            Self::Deficiente => "Poor fit: style and practices differ at a fundamental level.",
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    fn from_gap(gap: f64) -> Self {
        if gap >= 25.0 {
            Self::High
        } else if gap >= 10.0 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

/// Advice for one category where the candidate trails the reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub category: Category,
    /// Reference score minus candidate score.
    pub gap: f64,
    pub priority: Priority,
    pub title: String,
    pub description: String,
    pub tips: Vec<String>,
}

/// Smallest gap worth a recommendation.
pub const MIN_GAP: f64 = 5.0;

/// Recommendations for the largest positive gaps, biggest first, at most
/// `limit`. Ties keep category order.
pub fn recommend(gaps: &[(Category, f64)], limit: usize) -> Vec<Recommendation> {
    let mut ranked: Vec<(Category, f64)> = gaps
        .iter()
        .copied()
        .filter(|(_, gap)| *gap >= MIN_GAP)
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked
        .into_iter()
        .take(limit)
        .map(|(category, gap)| {
            let (title, description, tips) = advice(category);
            Recommendation {
                category,
                gap,
                priority: Priority::from_gap(gap),
                title: title.to_string(),
                description: description.to_string(),
                tips: tips.iter().map(|t| t.to_string()).collect(),
            }
        })
        .collect()
}

fn advice(category: Category) -> (&'static str, &'static str, &'static [&'static str]) {
    match category {
        Category::Naming => (
            "Adopt the team's naming conventions",
            "Identifiers do not follow the casing and length habits of the reference codebase.",
            &[
                "Use the language's idiomatic casing for functions, types and variables",
                "Prefer descriptive names over abbreviations and one-letter names",
            ],
        ),
        Category::Documentation => (
            "Document public interfaces",
            "Fewer public functions, classes and modules carry documentation than in the reference.",
            &[
                "Add a doc comment or docstring to every public symbol",
                "Start each module with a short summary of its purpose",
            ],
        ),
        Category::Modularity => (
            "Split large files and repeated code",
            "Files are larger, more duplicated or more entangled than in the reference.",
            &[
                "Keep files focused on one responsibility",
                "Extract repeated blocks into shared functions",
                "Break dependency cycles between modules",
            ],
        ),
        Category::Complexity => (
            "Reduce function complexity",
            "Functions branch and nest more deeply than the reference team's code.",
            &[
                "Use early returns to flatten nested conditionals",
                "Extract helper functions from long branches",
            ],
        ),
        Category::ErrorHandling => (
            "Handle failures explicitly",
            "Calls that can fail are checked or wrapped less often than in the reference.",
            &[
                "Wrap I/O, parsing and network calls in the language's error handling construct",
                "Validate inputs before using them",
            ],
        ),
        Category::Testing => (
            "Write more tests",
            "The test suite is thinner than the reference team's.",
            &[
                "Add a test file next to each module",
                "Assert on behavior, not only on absence of errors",
            ],
        ),
        Category::Security => (
            "Remove dangerous constructs",
            "Dynamic evaluation, unsafe deserialization, string-built queries or hardcoded secrets appear more often.",
            &[
                "Use parameterized queries",
                "Load secrets from the environment or a secret store",
                "Avoid eval and unsafe deserialization",
            ],
        ),
        Category::StyleConsistency => (
            "Keep formatting consistent",
            "Indentation, brace placement or line endings vary more than in the reference.",
            &[
                "Run the language's standard formatter",
                "Commit an editor configuration with the team's settings",
            ],
        ),
        Category::Patterns => (
            "Avoid structural anti-patterns",
            "The code shows more god classes, spaghetti functions or long parameter lists.",
            &[
                "Split classes with many methods by responsibility",
                "Group related parameters into a type",
                "Replace magic numbers with named constants",
            ],
        ),
        Category::Performance => (
            "Watch for costly loops",
            "More functions nest loops deeply, do I/O inside loops or build strings in loops.",
            &[
                "Batch I/O outside of loops",
                "Collect string parts and join them once",
            ],
        ),
        Category::Comments => (
            "Comment like the team does",
            "The ratio of comments to code is outside the range the reference keeps.",
            &[
                "Explain intent where the code is not self-explanatory",
                "Remove commented-out code and stale notes",
            ],
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_bands() {
        assert_eq!(Level::from_score(100.0), Level::Excelente);
        assert_eq!(Level::from_score(90.0), Level::Excelente);
        assert_eq!(Level::from_score(89.99), Level::Bueno);
        assert_eq!(Level::from_score(75.0), Level::Bueno);
        assert_eq!(Level::from_score(60.0), Level::Aceptable);
        assert_eq!(Level::from_score(45.0), Level::Regular);
        assert_eq!(Level::from_score(44.9), Level::Deficiente);
        assert_eq!(Level::from_score(0.0), Level::Deficiente);
    }

    #[test]
    fn test_every_level_has_text() {
        for level in Level::ALL {
            assert!(!level.description().is_empty());
            assert!(!level.verdict().is_empty());
            assert_eq!(level.to_string(), level.label());
        }
    }

    #[test]
    fn test_recommend_orders_and_caps() {
        let gaps = [
            (Category::Naming, 12.0),
            (Category::Testing, 40.0),
            (Category::Security, 3.0),
            (Category::Comments, -20.0),
            (Category::Complexity, 12.0),
        ];
        let recs = recommend(&gaps, 2);
        let order: Vec<_> = recs.iter().map(|r| r.category).collect();
        assert_eq!(order, [Category::Testing, Category::Naming]);
        assert_eq!(recs[0].priority, Priority::High);
        assert_eq!(recs[1].priority, Priority::Medium);
        assert!(!recs[0].tips.is_empty());
        assert_eq!(recommend(&gaps, 10).len(), 3);
    }

    #[test]
    fn test_every_category_has_advice() {
        for category in Category::ALL {
            let (title, description, tips) = advice(category);
            assert!(!title.is_empty() && !description.is_empty() && !tips.is_empty());
        }
    }
}
