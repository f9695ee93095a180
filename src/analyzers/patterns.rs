//! Design patterns and anti-patterns.
//!
//! Design pattern signatures are recognized per file during extraction; this
//! pass sums them and checks every class and function against the
//! configured anti-pattern thresholds.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::{Config, ThresholdsConfig};
use crate::core::{AnalysisContext, Analyzer as AnalyzerTrait, Result};
use crate::metrics::clamp_score;

/// Bonus per distinct design pattern, and its cap.
const PATTERN_BONUS: f64 = 5.0;
const MAX_PATTERN_BONUS: f64 = 20.0;

/// Base penalty of one god class, plus this much per method over the limit
/// and per 50 lines over the limit.
const GOD_CLASS_PENALTY: f64 = 10.0;
const GOD_CLASS_EXCESS_PENALTY: f64 = 0.5;
const SPAGHETTI_PENALTY: f64 = 6.0;
const LONG_PARAMETER_PENALTY: f64 = 3.0;
const MAGIC_NUMBER_PENALTY: f64 = 2.0;

/// Magic numbers a file may carry before it counts as an anti-pattern.
const MAGIC_NUMBERS_PER_FILE: usize = 5;

/// Penalties are spread over blocks of this many files, so a large
/// repository is not floored by a handful of findings.
const FILES_PER_PENALTY_BLOCK: f64 = 10.0;

pub const GOD_CLASS: &str = "god_class";
pub const SPAGHETTI_CODE: &str = "spaghetti_code";
pub const LONG_PARAMETER_LIST: &str = "long_parameter_list";
pub const MAGIC_NUMBERS: &str = "magic_numbers";

/// Pattern analyzer.
#[derive(Default)]
pub struct Analyzer {
    thresholds: ThresholdsConfig,
}

impl Analyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_thresholds(thresholds: ThresholdsConfig) -> Self {
        Self { thresholds }
    }

    fn god_class_penalty(&self, methods: usize, lines: usize) -> f64 {
        let t = &self.thresholds;
        let excess_methods = methods.saturating_sub(t.god_class_methods) as f64;
        let excess_lines = lines.saturating_sub(t.god_class_lines) as f64 / 50.0;
        GOD_CLASS_PENALTY + GOD_CLASS_EXCESS_PENALTY * (excess_methods + excess_lines)
    }
}

impl AnalyzerTrait for Analyzer {
    type Output = PatternReport;

    fn name(&self) -> &'static str {
        "patterns"
    }

    fn description(&self) -> &'static str {
        "Recognize design patterns and anti-patterns"
    }

    fn configure(&mut self, config: &Config) -> Result<()> {
        self.thresholds = config.thresholds.clone();
        Ok(())
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Result<Self::Output> {
        let t = &self.thresholds;
        let mut report = PatternReport::default();
        let mut penalty = 0.0;

        for file in ctx.files {
            let facts = &file.facts;
            for (pattern, n) in &facts.patterns {
                *report.design_patterns.entry(pattern.clone()).or_insert(0) += n;
            }
            if facts.tests.is_test_file {
                continue;
            }

            for class in &facts.classes {
                if class.methods > t.god_class_methods || class.lines > t.god_class_lines {
                    report.add(GOD_CLASS);
                    report
                        .god_classes
                        .push(format!("{}::{}", facts.path, class.name));
                    penalty += self.god_class_penalty(class.methods, class.lines);
                }
            }
            for function in &facts.functions {
                let tangled = function.lines > t.spaghetti_lines
                    || function.max_nesting > t.spaghetti_nesting;
                if tangled && function.early_returns == 0 {
                    report.add(SPAGHETTI_CODE);
                    penalty += SPAGHETTI_PENALTY;
                }
                if function.params > t.long_parameter_list {
                    report.add(LONG_PARAMETER_LIST);
                    penalty += LONG_PARAMETER_PENALTY;
                }
            }
            if facts.magic_numbers > MAGIC_NUMBERS_PER_FILE {
                report.add(MAGIC_NUMBERS);
                penalty += MAGIC_NUMBER_PENALTY;
            }
        }

        let blocks = (ctx.production_files() as f64 / FILES_PER_PENALTY_BLOCK).max(1.0);
        let bonus = (PATTERN_BONUS * report.design_patterns.len() as f64).min(MAX_PATTERN_BONUS);
        report.penalty = penalty / blocks;
        report.score = clamp_score(100.0 + bonus - report.penalty);
        Ok(report)
    }
}

/// Repository pattern summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatternReport {
    /// 0-100; bonus per distinct pattern, penalty per anti-pattern instance.
    pub score: f64,
    /// Files showing each design pattern.
    pub design_patterns: BTreeMap<String, usize>,
    /// Instances of each anti-pattern.
    pub anti_patterns: BTreeMap<String, usize>,
    /// `path::Class` of every god class.
    pub god_classes: Vec<String>,
    /// Penalty after spreading over the repository size.
    pub penalty: f64,
}

impl PatternReport {
    fn add(&mut self, anti_pattern: &str) {
        *self.anti_patterns.entry(anti_pattern.to_string()).or_insert(0) += 1;
    }

    pub fn distinct_patterns(&self) -> usize {
        self.design_patterns.len()
    }

    pub fn anti_pattern_count(&self) -> usize {
        self.anti_patterns.values().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Language, SourceFile};
    use crate::languages::facts::{ClassFacts, FileFacts, FunctionFacts};
    use crate::languages::AnalyzedFile;

    fn analyze(files: &[AnalyzedFile<'_>]) -> PatternReport {
        let config = Config::default();
        let mut analyzer = Analyzer::new();
        analyzer.configure(&config).unwrap();
        let report = analyzer.analyze(&AnalysisContext::new(files, &config)).unwrap();
        report
    }

    fn with_class<'a>(source: &'a SourceFile, methods: usize) -> AnalyzedFile<'a> {
        let mut facts = FileFacts::new(source);
        facts.classes.push(ClassFacts {
            name: "Manager".to_string(),
            line: 1,
            lines: methods * 4,
            methods,
        });
        AnalyzedFile { source, facts }
    }

    #[test]
    fn test_clean_file_scores_full() {
        let source = SourceFile::from_content("a.java", Language::Java, "");
        let report = analyze(&[with_class(&source, 5)]);
        assert_eq!(report.score, 100.0);
        assert_eq!(report.anti_pattern_count(), 0);
    }

    #[test]
    fn test_god_class_penalty_grows_with_methods() {
        let source = SourceFile::from_content("a.java", Language::Java, "");
        let mut previous = f64::MAX;
        for methods in [21, 30, 45, 60, 90] {
            let report = analyze(&[with_class(&source, methods)]);
            assert_eq!(report.anti_patterns[GOD_CLASS], 1);
            assert!(report.score < previous, "{methods}: {} !< {previous}", report.score);
            previous = report.score;
        }
        assert_eq!(analyze(&[with_class(&source, 40)]).god_classes, ["a.java::Manager"]);
    }

    #[test]
    fn test_spaghetti_needs_missing_early_returns() {
        let source = SourceFile::from_content("a.py", Language::Python, "");
        let mut facts = FileFacts::new(&source);
        let mut tangled = FunctionFacts::new("process", 1);
        tangled.max_nesting = 5;
        let mut guarded = tangled.clone();
        guarded.early_returns = 2;
        let mut wide = FunctionFacts::new("configure", 40);
        wide.params = 9;
        facts.functions = vec![tangled, guarded, wide];
        facts.magic_numbers = 12;
        let report = analyze(&[AnalyzedFile { source: &source, facts }]);
        assert_eq!(report.anti_patterns[SPAGHETTI_CODE], 1);
        assert_eq!(report.anti_patterns[LONG_PARAMETER_LIST], 1);
        assert_eq!(report.anti_patterns[MAGIC_NUMBERS], 1);
        assert_eq!(report.score, 100.0 - 6.0 - 3.0 - 2.0);
    }

    #[test]
    fn test_spaghetti_thresholds_are_exclusive() {
        let t = ThresholdsConfig::default();
        let source = SourceFile::from_content("a.py", Language::Python, "");
        let mut facts = FileFacts::new(&source);
        let mut at_limit = FunctionFacts::new("route", 1);
        at_limit.max_nesting = t.spaghetti_nesting;
        at_limit.lines = t.spaghetti_lines;
        let mut deeper = FunctionFacts::new("dispatch", 80);
        deeper.max_nesting = t.spaghetti_nesting + 1;
        facts.functions = vec![at_limit, deeper];
        let report = analyze(&[AnalyzedFile { source: &source, facts }]);
        assert_eq!(report.anti_patterns[SPAGHETTI_CODE], 1);
        assert_eq!(report.anti_pattern_count(), 1);
    }

    #[test]
    fn test_patterns_offset_penalties() {
        let source = SourceFile::from_content("a.java", Language::Java, "");
        let mut file = with_class(&source, 21);
        let plain = analyze(std::slice::from_ref(&file)).score;
        file.facts.add_pattern("singleton", 1);
        file.facts.add_pattern("builder", 1);
        let report = analyze(&[file]);
        assert_eq!(report.distinct_patterns(), 2);
        assert_eq!(report.score, plain + 10.0);
    }

    #[test]
    fn test_test_files_skip_anti_patterns() {
        let source = SourceFile::from_content("FooTest.java", Language::Java, "");
        let mut file = with_class(&source, 80);
        file.facts.tests.is_test_file = true;
        assert_eq!(analyze(&[file]).anti_pattern_count(), 0);
    }
}
