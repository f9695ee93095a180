//! Costly-operation signatures per function.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::{AnalysisContext, Analyzer as AnalyzerTrait, Result};
use crate::languages::facts::FunctionFacts;
use crate::metrics::clamp_score;

/// Loop depth that is still considered linear enough.
const MAX_LOOP_DEPTH: usize = 2;
/// Issues listed individually in the report.
const MAX_LISTED_ISSUES: usize = 20;

pub const NESTED_LOOPS: &str = "nested_loops";
pub const IO_IN_LOOP: &str = "io_in_loop";
pub const STRING_CONCAT_IN_LOOP: &str = "string_concat_in_loop";

/// Performance analyzer.
#[derive(Default)]
pub struct Analyzer;

impl Analyzer {
    pub fn new() -> Self {
        Self
    }
}

fn issues_of(function: &FunctionFacts) -> Vec<&'static str> {
    let mut kinds = Vec::new();
    if function.max_loop_depth > MAX_LOOP_DEPTH {
        kinds.push(NESTED_LOOPS);
    }
    if function.io_in_loop > 0 {
        kinds.push(IO_IN_LOOP);
    }
    if function.concat_in_loop > 0 {
        kinds.push(STRING_CONCAT_IN_LOOP);
    }
    kinds
}

impl AnalyzerTrait for Analyzer {
    type Output = PerformanceReport;

    fn name(&self) -> &'static str {
        "performance"
    }

    fn description(&self) -> &'static str {
        "Flag nested loops, I/O in loops and string building in loops"
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Result<Self::Output> {
        let mut report = PerformanceReport::default();
        for file in ctx.files.iter().filter(|f| !f.facts.tests.is_test_file) {
            for function in &file.facts.functions {
                report.functions += 1;
                let kinds = issues_of(function);
                if kinds.is_empty() {
                    continue;
                }
                report.flagged_functions += 1;
                for kind in kinds {
                    *report.issues.entry(kind.to_string()).or_insert(0) += 1;
                    if report.hotspots.len() < MAX_LISTED_ISSUES {
                        report.hotspots.push(PerformanceIssue {
                            path: file.facts.path.clone(),
                            function: function.name.clone(),
                            line: function.line,
                            kind: kind.to_string(),
                        });
                    }
                }
            }
        }

        report.density = if report.functions == 0 {
            0.0
        } else {
            report.flagged_functions as f64 / report.functions as f64
        };
        report.score = clamp_score(100.0 * (1.0 - report.density).powi(2));
        Ok(report)
    }
}

/// Repository performance summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    /// 0-100, lower as more functions are flagged.
    pub score: f64,
    /// Production functions examined.
    pub functions: usize,
    pub flagged_functions: usize,
    /// Flagged share of functions.
    pub density: f64,
    /// Issue counts by kind.
    pub issues: BTreeMap<String, usize>,
    /// First issues found, in path order.
    pub hotspots: Vec<PerformanceIssue>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformanceIssue {
    pub path: String,
    pub function: String,
    pub line: usize,
    pub kind: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::core::{Language, SourceFile};
    use crate::languages::{AnalyzedFile, AnalyzerFactory};

    const SLOW: &str = "\
def build_report(groups):
    report = \"\"
    for group in groups:
        for team in group.teams:
            for member in team.members:
                report += f\"{member.name}, \"
    return report

def export(rows, path):
    for row in rows:
        with open(path, \"a\") as out:
            out.write(row)

def fast(items):
    return [item.id for item in items]
";

    fn analyze(sources: &[SourceFile]) -> PerformanceReport {
        let files: Vec<AnalyzedFile<'_>> = sources
            .iter()
            .map(|source| AnalyzedFile {
                source,
                facts: AnalyzerFactory::resolve(source).extract(source),
            })
            .collect();
        let config = Config::default();
        let report = Analyzer::new().analyze(&AnalysisContext::new(&files, &config)).unwrap();
        report
    }

    #[test]
    fn test_flags_costly_functions() {
        let report = analyze(&[SourceFile::from_content("report.py", Language::Python, SLOW)]);
        assert_eq!(report.functions, 3);
        assert_eq!(report.flagged_functions, 2);
        assert_eq!(report.issues[NESTED_LOOPS], 1);
        assert_eq!(report.issues[STRING_CONCAT_IN_LOOP], 1);
        assert_eq!(report.issues[IO_IN_LOOP], 1);
        assert_eq!(report.hotspots[0].function, "build_report");
        assert!(report.score < 20.0);
    }

    #[test]
    fn test_no_functions_scores_full() {
        let report = analyze(&[SourceFile::from_content("style.css", Language::Css, ".a { color: red; }\n")]);
        assert_eq!(report.functions, 0);
        assert_eq!(report.score, 100.0);
    }

    #[test]
    fn test_issue_kinds() {
        let mut function = FunctionFacts::new("run", 1);
        assert!(issues_of(&function).is_empty());
        function.max_loop_depth = 3;
        function.io_in_loop = 1;
        assert_eq!(issues_of(&function), [NESTED_LOOPS, IO_IN_LOOP]);
    }
}
