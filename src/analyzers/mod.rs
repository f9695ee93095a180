//! Repository-wide analyzers.
//!
//! These run once per repository, after every file has been extracted, since
//! duplication and dependency detection need to see all files at once.

pub mod comments;
pub mod duplicates;
pub mod graph;
pub mod patterns;
pub mod performance;

use std::time::Instant;

use tracing::{debug, info};

use crate::core::{AnalysisContext, Analyzer, Result};
use crate::metrics::{AdvancedMetrics, Category, CategoryScore, CategoryScores};

pub use comments::CommentReport;
pub use duplicates::{DuplicationLevel, DuplicationReport};
pub use graph::DependencyReport;
pub use patterns::PatternReport;
pub use performance::PerformanceReport;

fn run<A: Analyzer>(mut analyzer: A, ctx: &AnalysisContext<'_>) -> Result<A::Output> {
    analyzer.configure(ctx.config)?;
    let start = Instant::now();
    let output = analyzer.analyze(ctx)?;
    debug!(
        analyzer = analyzer.name(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "{}",
        analyzer.description()
    );
    Ok(output)
}

/// Run all five analyzers and derive the three advanced category scores.
///
/// A repository without files gets all-zero scores.
pub fn analyze_repository(ctx: &AnalysisContext<'_>) -> Result<AdvancedMetrics> {
    if ctx.files.is_empty() {
        return Ok(AdvancedMetrics::empty());
    }
    let start = Instant::now();

    let ((duplication, dependencies), (patterns, (performance, comments))) = rayon::join(
        || {
            rayon::join(
                || run(duplicates::Analyzer::new(), ctx),
                || run(graph::Analyzer::new(), ctx),
            )
        },
        || {
            rayon::join(
                || run(patterns::Analyzer::new(), ctx),
                || {
                    rayon::join(
                        || run(performance::Analyzer::new(), ctx),
                        || run(comments::Analyzer::new(), ctx),
                    )
                },
            )
        },
    );
    let (duplication, dependencies) = (duplication?, dependencies?);
    let (patterns, performance, comments) = (patterns?, performance?, comments?);

    let scores: CategoryScores = [
        CategoryScore::new(Category::Patterns, patterns.score)
            .with_evidence("design_patterns", patterns.distinct_patterns() as f64)
            .with_evidence("anti_patterns", patterns.anti_pattern_count() as f64),
        CategoryScore::new(Category::Performance, performance.score)
            .with_evidence("functions", performance.functions as f64)
            .with_evidence("flagged_functions", performance.flagged_functions as f64),
        CategoryScore::new(Category::Comments, comments.score)
            .with_evidence("comment_ratio", comments.ratio)
            .with_evidence("markers", comments.marker_count() as f64),
    ]
    .into_iter()
    .collect();

    info!(
        files = ctx.files.len(),
        duplication = %format!("{:.1}%", duplication.percentage),
        cycles = dependencies.cycles.len(),
        anti_patterns = patterns.anti_pattern_count(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "cross-file analysis complete"
    );

    Ok(AdvancedMetrics {
        scores,
        duplication,
        dependencies,
        patterns,
        performance,
        comments,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::core::{Language, SourceFile};
    use crate::languages::{AnalyzedFile, AnalyzerFactory};

    #[test]
    fn test_empty_repository_is_all_zero() {
        let config = Config::default();
        let metrics = analyze_repository(&AnalysisContext::new(&[], &config)).unwrap();
        for category in Category::ADVANCED {
            assert_eq!(metrics.scores.value(category), 0.0);
        }
    }

    #[test]
    fn test_scores_cover_advanced_categories() {
        let sources = vec![
            SourceFile::from_content(
                "src/app.js",
                Language::JavaScript,
                "// Entry point\nimport { load } from './store';\n\nexport function main() {\n  return load();\n}\n",
            ),
            SourceFile::from_content("src/store.js", Language::JavaScript, "export function load() {\n  return [];\n}\n"),
        ];
        let files: Vec<AnalyzedFile<'_>> = sources
            .iter()
            .map(|source| AnalyzedFile {
                source,
                facts: AnalyzerFactory::resolve(source).extract(source),
            })
            .collect();
        let config = Config::default();
        let metrics = analyze_repository(&AnalysisContext::new(&files, &config)).unwrap();
        assert_eq!(metrics.scores.len(), 3);
        assert_eq!(metrics.dependencies.edges, 1);
        assert_eq!(metrics.scores.value(Category::Performance), 100.0);
        assert_eq!(metrics.scores.value(Category::Patterns), 100.0);
        assert!(metrics.scores.value(Category::Comments) > 0.0);
    }
}
