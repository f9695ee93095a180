//! Normalization of raw facts into the eight base category scores.
//!
//! Both analysis strategies end here, so a Python file parsed structurally and
//! a Ruby file matched by patterns are scored by identical formulas.

use std::collections::BTreeMap;

use super::facts::FileFacts;
use crate::config::ThresholdsConfig;
use crate::metrics::{Category, CategoryScore};

/// Score used when a language offers no evidence either way.
pub const NEUTRAL: f64 = 50.0;

fn ratio(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

/// Decay that stays flat near zero and saturates toward 0 for large inputs.
fn inverse_decay(excess: f64, scale: f64) -> f64 {
    1.0 / (1.0 + (excess.max(0.0) / scale).powi(2))
}

pub fn naming(files: &[FileFacts]) -> CategoryScore {
    let total: usize = files.iter().map(|f| f.naming.total).sum();
    let conventional: usize = files.iter().map(|f| f.naming.conventional).sum();
    let short: usize = files.iter().map(|f| f.naming.short).sum();
    let value = if total == 0 {
        NEUTRAL
    } else {
        100.0 * ratio(conventional, total) * (1.0 - 0.5 * ratio(short, total))
    };
    CategoryScore::new(Category::Naming, value)
        .with_evidence("identifiers", total as f64)
        .with_evidence("conventional", conventional as f64)
        .with_evidence("short", short as f64)
}

pub fn documentation(files: &[FileFacts]) -> CategoryScore {
    let public: usize = files.iter().map(|f| f.docs.public_symbols).sum();
    let documented: usize = files.iter().map(|f| f.docs.documented_symbols).sum();
    let module_docs = files.iter().filter(|f| f.docs.module_doc).count();
    let module_ratio = ratio(module_docs, files.len());
    let value = if public == 0 {
        100.0 * module_ratio
    } else {
        85.0 * ratio(documented, public) + 15.0 * module_ratio
    };
    CategoryScore::new(Category::Documentation, value)
        .with_evidence("public_symbols", public as f64)
        .with_evidence("documented_symbols", documented as f64)
        .with_evidence("module_docs", module_docs as f64)
}

/// Average file length above which modularity starts to decay.
const COMFORTABLE_FILE_LINES: f64 = 300.0;
/// Functions per file above which modularity starts to decay.
const COMFORTABLE_FUNCTIONS: f64 = 20.0;
/// Classes per file above which modularity starts to decay.
const COMFORTABLE_CLASSES: f64 = 3.0;

pub fn modularity(files: &[FileFacts], thresholds: &ThresholdsConfig) -> CategoryScore {
    if files.is_empty() {
        return CategoryScore::zero(Category::Modularity);
    }
    let count = files.len() as f64;
    let lines: usize = files.iter().map(|f| f.lines.total).sum();
    let functions: usize = files.iter().map(|f| f.functions.len()).sum();
    let classes: usize = files.iter().map(|f| f.classes.len()).sum();
    let monolithic = files
        .iter()
        .filter(|f| f.lines.total > thresholds.monolithic_file_lines)
        .count();

    let avg_lines = lines as f64 / count;
    let per_file = |n: usize, comfortable: f64| {
        let avg = n as f64 / count;
        if avg <= comfortable {
            1.0
        } else {
            comfortable / avg
        }
    };
    let value = 100.0
        * (0.4 * (1.0 - ratio(monolithic, files.len()))
            + 0.3 * per_file(lines, COMFORTABLE_FILE_LINES)
            + 0.2 * per_file(functions, COMFORTABLE_FUNCTIONS)
            + 0.1 * per_file(classes, COMFORTABLE_CLASSES));
    CategoryScore::new(Category::Modularity, value)
        .with_evidence("files", count)
        .with_evidence("avg_file_lines", avg_lines)
        .with_evidence("functions_per_file", functions as f64 / count)
        .with_evidence("monolithic_files", monolithic as f64)
}

/// Nesting depth that is free of penalty.
const FREE_NESTING: f64 = 2.0;

pub fn complexity(files: &[FileFacts], thresholds: &ThresholdsConfig) -> CategoryScore {
    let functions: Vec<_> = files.iter().flat_map(|f| &f.functions).collect();
    if functions.is_empty() {
        return CategoryScore::new(Category::Complexity, 100.0).with_evidence("functions", 0.0);
    }
    let n = functions.len() as f64;
    let avg_complexity = functions.iter().map(|f| f.complexity() as f64).sum::<f64>() / n;
    let avg_nesting = functions.iter().map(|f| f.max_nesting as f64).sum::<f64>() / n;
    let effective = avg_complexity + 2.0 * (avg_nesting - FREE_NESTING).max(0.0);
    let value = 100.0 * inverse_decay(effective - 1.0, thresholds.complexity_per_function);
    CategoryScore::new(Category::Complexity, value)
        .with_evidence("functions", n)
        .with_evidence("avg_complexity", avg_complexity)
        .with_evidence("avg_nesting", avg_nesting)
}

/// Score when nothing risky was found and nothing was checked.
const NO_RISK: f64 = 70.0;

pub fn error_handling(files: &[FileFacts]) -> CategoryScore {
    let risk: usize = files.iter().map(|f| f.errors.risk).sum();
    let guarded: usize = files.iter().map(|f| f.errors.guarded).sum();
    let checks: usize = files.iter().map(|f| f.errors.checks).sum();
    let value = match (risk, checks) {
        (0, 0) => NO_RISK,
        (0, _) => 100.0,
        _ => 100.0 * ratio(guarded + checks, risk).min(1.0),
    };
    CategoryScore::new(Category::ErrorHandling, value)
        .with_evidence("risk_constructs", risk as f64)
        .with_evidence("guarded", guarded as f64)
        .with_evidence("checks", checks as f64)
}

/// Share of test files that earns full presence credit.
const TEST_FILE_TARGET: f64 = 0.25;

pub fn testing(files: &[FileFacts]) -> CategoryScore {
    let test_files = files.iter().filter(|f| f.tests.is_test_file).count();
    let test_functions: usize = files.iter().map(|f| f.tests.test_functions).sum();
    let assertions: usize = files.iter().map(|f| f.tests.assertions).sum();
    let production_functions: usize = files
        .iter()
        .filter(|f| !f.tests.is_test_file)
        .map(|f| f.functions.len())
        .sum();

    let presence = (ratio(test_files, files.len()) / TEST_FILE_TARGET).min(1.0);
    let coverage = if test_functions == 0 {
        0.0
    } else {
        (test_functions as f64 / (production_functions as f64 * 0.5).max(1.0)).min(1.0)
    };
    let density = ratio(assertions, test_functions).min(1.0);
    let value = 100.0 * (0.4 * presence + 0.35 * coverage + 0.25 * density);
    CategoryScore::new(Category::Testing, value)
        .with_evidence("test_files", test_files as f64)
        .with_evidence("test_functions", test_functions as f64)
        .with_evidence("assertions", assertions as f64)
}

pub fn security(files: &[FileFacts]) -> CategoryScore {
    let mut kinds: BTreeMap<&str, usize> = BTreeMap::new();
    for file in files {
        for (kind, n) in &file.security {
            *kinds.entry(kind.as_str()).or_insert(0) += n;
        }
    }
    let dangerous: usize = kinds.values().sum();
    let density = ratio(dangerous, files.len());
    let value = if files.is_empty() {
        0.0
    } else {
        100.0 / (1.0 + 2.0 * density)
    };
    let mut score = CategoryScore::new(Category::Security, value)
        .with_evidence("dangerous_constructs", dangerous as f64);
    for (kind, n) in kinds {
        score = score.with_evidence(kind, n as f64);
    }
    score
}

fn modal_share<T: Ord + Copy>(values: impl Iterator<Item = T>) -> f64 {
    let mut counts: BTreeMap<T, usize> = BTreeMap::new();
    let mut total = 0;
    for v in values {
        *counts.entry(v).or_insert(0) += 1;
        total += 1;
    }
    if total == 0 {
        return 1.0;
    }
    counts.values().copied().max().unwrap_or(0) as f64 / total as f64
}

pub fn style_consistency(files: &[FileFacts]) -> CategoryScore {
    if files.is_empty() {
        return CategoryScore::zero(Category::StyleConsistency);
    }
    // Indentation width variance across files.
    let units: Vec<f64> = files
        .iter()
        .filter_map(|f| f.style.indent_unit)
        .map(|u| u as f64)
        .collect();
    let indent = if units.is_empty() {
        1.0
    } else {
        let mean = units.iter().sum::<f64>() / units.len() as f64;
        let variance = units.iter().map(|u| (u - mean).powi(2)).sum::<f64>() / units.len() as f64;
        1.0 / (1.0 + variance / 4.0)
    };

    // Tabs versus spaces, within and across files.
    let tabs: usize = files.iter().map(|f| f.style.tab_lines).sum();
    let spaces: usize = files.iter().map(|f| f.style.space_lines).sum();
    let whitespace = if tabs + spaces == 0 {
        1.0
    } else {
        tabs.max(spaces) as f64 / (tabs + spaces) as f64
    };

    let same: usize = files.iter().map(|f| f.style.brace_same_line).sum();
    let next: usize = files.iter().map(|f| f.style.brace_next_line).sum();
    let braces = if same + next == 0 {
        1.0
    } else {
        same.max(next) as f64 / (same + next) as f64
    };

    let endings = modal_share(files.iter().map(|f| f.style.crlf));
    let code_lines: usize = files.iter().map(|f| f.lines.code).sum();
    let trailing: usize = files.iter().map(|f| f.style.trailing_whitespace).sum();
    let clean = 1.0 - ratio(trailing, code_lines.max(1)).min(1.0);

    let value =
        100.0 * (0.35 * indent + 0.2 * whitespace + 0.25 * braces + 0.1 * endings + 0.1 * clean);
    CategoryScore::new(Category::StyleConsistency, value)
        .with_evidence("indent_consistency", indent)
        .with_evidence("whitespace_consistency", whitespace)
        .with_evidence("brace_consistency", braces)
        .with_evidence("line_ending_consistency", endings)
}
