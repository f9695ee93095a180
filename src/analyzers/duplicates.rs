//! Exact-match clone detection over fixed-size line windows.
//!
//! Every file contributes the hashes of its normalized code lines (computed
//! during extraction). Consecutive runs of `window` line hashes are hashed
//! again with xxh3; a window hash seen twice or more anywhere in the
//! repository marks its lines as duplicated.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::xxh3_64;

use crate::config::Config;
use crate::core::{AnalysisContext, Analyzer as AnalyzerTrait, Result};
use crate::metrics::clamp_score;

/// Score points lost per percent of duplicated lines.
const PENALTY_SCALE: f64 = 2.0;

/// Duplication analyzer.
pub struct Analyzer {
    window: usize,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer {
    pub fn new() -> Self {
        Self { window: 5 }
    }

    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window.max(2);
        self
    }
}

impl AnalyzerTrait for Analyzer {
    type Output = DuplicationReport;

    fn name(&self) -> &'static str {
        "duplication"
    }

    fn description(&self) -> &'static str {
        "Find code blocks repeated verbatim across the repository"
    }

    fn configure(&mut self, config: &Config) -> Result<()> {
        self.window = config.thresholds.duplication_window.max(2);
        Ok(())
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Result<Self::Output> {
        // Window hashes per file, in path order.
        let windows: Vec<Vec<u64>> = ctx
            .files
            .iter()
            .map(|f| window_hashes(&f.facts.fingerprints, self.window))
            .collect();

        let mut occurrences: HashMap<u64, usize> = HashMap::new();
        for hash in windows.iter().flatten() {
            *occurrences.entry(*hash).or_insert(0) += 1;
        }

        let mut seen: HashSet<u64> = HashSet::new();
        let mut total_lines = 0;
        let mut duplicated_lines = 0;
        let mut files_with_duplicates = 0;
        let mut per_file: BTreeMap<String, FileDuplication> = BTreeMap::new();

        for (i, (file, hashes)) in ctx.files.iter().zip(&windows).enumerate() {
            let lines = file.facts.fingerprints.len();
            total_lines += lines;

            // Lines covered by a repeated window, and the subset covered by a
            // repeat of a window already seen earlier in path order.
            let mut in_clone = vec![false; lines];
            let mut in_copy = vec![false; lines];
            for (start, hash) in hashes.iter().enumerate() {
                if occurrences[hash] < 2 {
                    continue;
                }
                let first = seen.insert(*hash);
                for line in start..start + self.window {
                    in_clone[line] = true;
                    if !first {
                        in_copy[line] = true;
                    }
                }
            }

            let cloned = in_clone.iter().filter(|&&b| b).count();
            duplicated_lines += in_copy.iter().filter(|&&b| b).count();
            if cloned > 0 {
                files_with_duplicates += 1;
                per_file.insert(
                    file.facts.path.clone(),
                    FileDuplication {
                        path: file.facts.path.clone(),
                        duplicated_lines: cloned,
                        percentage: 100.0 * cloned as f64 / lines as f64,
                    },
                );
            }
            ctx.report_progress(i + 1, ctx.files.len());
        }

        let blocks = occurrences.values().filter(|&&n| n >= 2).count();
        let percentage = if total_lines == 0 {
            0.0
        } else {
            100.0 * duplicated_lines as f64 / total_lines as f64
        };
        let most_duplicated = per_file
            .into_values()
            .fold(None::<FileDuplication>, |best, f| match best {
                Some(b) if b.duplicated_lines >= f.duplicated_lines => Some(b),
                _ => Some(f),
            });

        Ok(DuplicationReport {
            score: clamp_score(100.0 - percentage * PENALTY_SCALE),
            window: self.window,
            lines: total_lines,
            duplicated_lines,
            percentage,
            duplicated_blocks: blocks,
            files_with_duplicates,
            level: DuplicationLevel::from_percentage(percentage),
            most_duplicated,
        })
    }
}

/// Hash of every run of `window` consecutive line hashes.
fn window_hashes(lines: &[u64], window: usize) -> Vec<u64> {
    lines
        .windows(window)
        .map(|run| {
            let bytes: Vec<u8> = run.iter().flat_map(|h| h.to_le_bytes()).collect();
            xxh3_64(&bytes)
        })
        .collect()
}

/// Repository duplication summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DuplicationReport {
    /// 0-100, higher means less duplication.
    pub score: f64,
    pub window: usize,
    /// Code lines eligible for windowing.
    pub lines: usize,
    /// Lines repeating a block that appeared earlier.
    pub duplicated_lines: usize,
    /// `duplicated_lines` as a percentage of `lines`.
    pub percentage: f64,
    /// Distinct window hashes occurring at least twice.
    pub duplicated_blocks: usize,
    pub files_with_duplicates: usize,
    pub level: DuplicationLevel,
    pub most_duplicated: Option<FileDuplication>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileDuplication {
    pub path: String,
    /// Lines of this file inside any repeated block.
    pub duplicated_lines: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DuplicationLevel {
    #[default]
    Excelente,
    Bueno,
    Moderado,
    Alto,
}

impl DuplicationLevel {
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage < 5.0 {
            Self::Excelente
        } else if percentage < 15.0 {
            Self::Bueno
        } else if percentage < 25.0 {
            Self::Moderado
        } else {
            Self::Alto
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Excelente => "very little duplication",
            Self::Bueno => "duplication within acceptable limits",
            Self::Moderado => "moderate duplication, consider refactoring",
            Self::Alto => "high duplication, refactoring recommended",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Language, SourceFile};
    use crate::languages::{AnalyzedFile, AnalyzerFactory};

    const MODULE: &str = "\
def load(path):
    with open(path) as handle:
        data = handle.read()
    rows = data.splitlines()
    header = rows[0]
    return header, rows
";

    const OTHER: &str = "\
def total(items):
    result = 0
    for item in items:
        result += item.price
    tax = result * rate
    return result + tax
";

    fn analyze(sources: &[SourceFile]) -> DuplicationReport {
        let files: Vec<AnalyzedFile<'_>> = sources
            .iter()
            .map(|source| AnalyzedFile {
                source,
                facts: AnalyzerFactory::resolve(source).extract(source),
            })
            .collect();
        let config = Config::default();
        let ctx = AnalysisContext::new(&files, &config);
        Analyzer::new().analyze(&ctx).unwrap()
    }

    fn py(path: &str, content: &str) -> SourceFile {
        SourceFile::from_content(path, Language::Python, content)
    }

    #[test]
    fn test_unique_files_score_full() {
        let report = analyze(&[py("a.py", MODULE), py("b.py", OTHER)]);
        assert_eq!(report.duplicated_lines, 0);
        assert_eq!(report.score, 100.0);
        assert_eq!(report.level, DuplicationLevel::Excelente);
        assert!(report.most_duplicated.is_none());
    }

    #[test]
    fn test_verbatim_copy_lowers_score() {
        let clean = analyze(&[py("a.py", MODULE), py("b.py", OTHER)]);
        let copied = analyze(&[py("a.py", MODULE), py("b.py", OTHER), py("c.py", MODULE)]);
        assert!(copied.score < clean.score);
        assert_eq!(copied.duplicated_lines, 6);
        assert_eq!(copied.files_with_duplicates, 2);
        assert_eq!(copied.level, DuplicationLevel::Alto);
        let most = copied.most_duplicated.unwrap();
        assert_eq!(most.path, "a.py");
        assert_eq!(most.percentage, 100.0);
    }

    #[test]
    fn test_whitespace_and_comments_ignored() {
        let reformatted = MODULE.replace("    rows", "    # split\n    rows    ");
        let report = analyze(&[py("a.py", MODULE), py("b.py", &reformatted)]);
        assert_eq!(report.duplicated_lines, 6);
    }

    #[test]
    fn test_files_shorter_than_window() {
        let report = analyze(&[py("a.py", "x = 1\n"), py("b.py", "x = 1\n")]);
        assert_eq!(report.lines, 2);
        assert_eq!(report.duplicated_blocks, 0);
        assert_eq!(report.score, 100.0);
    }

    #[test]
    fn test_levels() {
        assert_eq!(DuplicationLevel::from_percentage(4.9), DuplicationLevel::Excelente);
        assert_eq!(DuplicationLevel::from_percentage(5.0), DuplicationLevel::Bueno);
        assert_eq!(DuplicationLevel::from_percentage(20.0), DuplicationLevel::Moderado);
        assert_eq!(DuplicationLevel::from_percentage(25.0), DuplicationLevel::Alto);
    }
}
