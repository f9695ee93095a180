//! Comment density and work markers.
//!
//! The comment ratio is scored against a target band: sparse commenting and
//! code buried in comments both lose points. Doc lines belong to the
//! documentation category and are not counted here. TODO-style markers are
//! reported as evidence only.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::{AnalysisContext, Analyzer as AnalyzerTrait, Result};
use crate::metrics::clamp_score;

/// Comment lines per code line that score full marks.
const TARGET_LOW: f64 = 0.10;
const TARGET_HIGH: f64 = 0.30;
/// Score of a repository with no comments at all.
const UNCOMMENTED: f64 = 40.0;

/// Comment analyzer.
#[derive(Default)]
pub struct Analyzer;

impl Analyzer {
    pub fn new() -> Self {
        Self
    }
}

/// Score of a comment-to-code ratio.
pub fn band_score(ratio: f64) -> f64 {
    let value = if ratio < TARGET_LOW {
        UNCOMMENTED + (100.0 - UNCOMMENTED) * ratio / TARGET_LOW
    } else if ratio <= TARGET_HIGH {
        100.0
    } else {
        100.0 * TARGET_HIGH / ratio
    };
    clamp_score(value)
}

impl AnalyzerTrait for Analyzer {
    type Output = CommentReport;

    fn name(&self) -> &'static str {
        "comments"
    }

    fn description(&self) -> &'static str {
        "Measure comment density and count TODO/FIXME markers"
    }

    fn analyze(&self, ctx: &AnalysisContext<'_>) -> Result<Self::Output> {
        let mut report = CommentReport::default();
        for file in ctx.files {
            report.comment_lines += file.facts.lines.comment;
            report.code_lines += file.facts.lines.code;
            for (marker, n) in &file.facts.markers {
                *report.markers.entry(marker.clone()).or_insert(0) += n;
                if *n > 0 {
                    *report.files_with_markers.entry(file.facts.path.clone()).or_insert(0) += n;
                }
            }
        }
        // Comments with no code at all are as excessive as comments over a
        // single line of code.
        report.ratio = report.comment_lines as f64 / report.code_lines.max(1) as f64;
        report.score = if report.code_lines == 0 && report.comment_lines == 0 {
            0.0
        } else {
            band_score(report.ratio)
        };
        Ok(report)
    }
}

/// Repository comment summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommentReport {
    /// 0-100, full marks inside the target band.
    pub score: f64,
    pub comment_lines: usize,
    pub code_lines: usize,
    /// Comment lines per code line.
    pub ratio: f64,
    /// TODO, FIXME, HACK, XXX and BUG counts.
    pub markers: BTreeMap<String, usize>,
    /// Marker count per file.
    pub files_with_markers: BTreeMap<String, usize>,
}

impl CommentReport {
    pub fn marker_count(&self) -> usize {
        self.markers.values().sum()
    }

    /// Comment ratio as a percentage, for reports.
    pub fn percentage(&self) -> f64 {
        self.ratio * 100.0
    }
}
