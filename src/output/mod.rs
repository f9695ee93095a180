//! Output formatters for profiles and comparisons.
//!
//! JSON is the full output contract. Markdown and text are summaries of the
//! same data for people.

use std::io::Write;

use colored::{ColoredString, Colorize};
use serde::Serialize;

use crate::aggregate::RepositoryProfile;
use crate::config::OutputFormat;
use crate::core::{Coverage, Language, Result};
use crate::empathy::{EmpathyResult, Level};
use crate::metrics::Category;
use crate::pipeline::Comparison;

/// Output format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Format {
    Json,
    Markdown,
    #[default]
    Text,
}

impl From<OutputFormat> for Format {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Json => Self::Json,
            OutputFormat::Markdown => Self::Markdown,
            OutputFormat::Text => Self::Text,
        }
    }
}

impl Format {
    pub fn write_comparison<W: Write>(&self, comparison: &Comparison, writer: &mut W) -> Result<()> {
        match self {
            Self::Json => write_json(comparison, writer),
            Self::Markdown => comparison_markdown(comparison, writer),
            Self::Text => comparison_text(comparison, writer),
        }
    }

    pub fn write_profile<W: Write>(&self, profile: &RepositoryProfile, writer: &mut W) -> Result<()> {
        match self {
            Self::Json => write_json(profile, writer),
            Self::Markdown => profile_markdown(profile, writer),
            Self::Text => profile_text(profile, writer),
        }
    }

    /// The language detection table.
    pub fn write_languages<W: Write>(&self, writer: &mut W) -> Result<()> {
        let rows: Vec<LanguageRow> = Language::ALL
            .iter()
            .map(|lang| LanguageRow {
                language: lang.display_name(),
                key: lang.key(),
                extensions: lang.extensions().to_vec(),
            })
            .collect();
        match self {
            Self::Json => write_json(&rows, writer),
            Self::Markdown => {
                let body: Vec<Vec<String>> = rows
                    .iter()
                    .map(|r| vec![r.language.to_string(), r.key.to_string(), dotted(&r.extensions)])
                    .collect();
                write_table(&["Language", "Key", "Extensions"], &body, writer)
            }
            Self::Text => {
                for row in &rows {
                    writeln!(writer, "{:<12} {}", row.language, dotted(&row.extensions))?;
                }
                Ok(())
            }
        }
    }
}

#[derive(Serialize)]
struct LanguageRow {
    language: &'static str,
    key: &'static str,
    extensions: Vec<&'static str>,
}

fn dotted(extensions: &[&str]) -> String {
    extensions
        .iter()
        .map(|e| format!(".{e}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn write_json<T: Serialize, W: Write>(data: &T, writer: &mut W) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, data)?;
    writeln!(writer)?;
    Ok(())
}

fn write_table<W: Write>(headers: &[&str], rows: &[Vec<String>], writer: &mut W) -> Result<()> {
    write!(writer, "|")?;
    for header in headers {
        write!(writer, " {header} |")?;
    }
    writeln!(writer)?;

    write!(writer, "|")?;
    for _ in headers {
        write!(writer, " --- |")?;
    }
    writeln!(writer)?;

    for row in rows {
        write!(writer, "|")?;
        for cell in row {
            write!(writer, " {cell} |")?;
        }
        writeln!(writer)?;
    }
    writeln!(writer)?;
    Ok(())
}

fn signed(delta: f64) -> String {
    if delta > 0.0 {
        format!("+{delta:.1}")
    } else {
        format!("{delta:.1}")
    }
}

fn language_list(languages: &[Language]) -> String {
    if languages.is_empty() {
        return "-".to_string();
    }
    languages
        .iter()
        .map(|l| l.display_name())
        .collect::<Vec<_>>()
        .join(", ")
}

fn category_list(categories: &[Category]) -> String {
    if categories.is_empty() {
        return "-".to_string();
    }
    categories
        .iter()
        .map(|c| c.display_name())
        .collect::<Vec<_>>()
        .join(", ")
}

fn coverage_line(coverage: &Coverage) -> String {
    let mut line = format!(
        "{} analyzed, {} unsupported, {} excluded, {} skipped",
        coverage.files_analyzed,
        coverage.unsupported,
        coverage.excluded,
        coverage.skipped()
    );
    if coverage.fallbacks > 0 {
        line.push_str(&format!(", {} parsed by pattern fallback", coverage.fallbacks));
    }
    if coverage.is_partial() {
        line.push_str(&format!(" (partial: {} files timed out)", coverage.timed_out));
    }
    line
}

fn comparison_markdown<W: Write>(comparison: &Comparison, writer: &mut W) -> Result<()> {
    let Comparison {
        reference,
        candidate,
        result,
    } = comparison;

    writeln!(writer, "# Code Empathy Report\n")?;
    writeln!(writer, "**Reference**: {}\n", reference.name)?;
    writeln!(writer, "**Candidate**: {}\n", candidate.name)?;
    writeln!(
        writer,
        "**Empathy score**: {:.1} / 100 ({}, {})\n",
        result.score,
        result.level,
        result.level.range()
    )?;
    writeln!(writer, "{}\n", result.description)?;
    writeln!(writer, "> {}\n", result.verdict)?;

    writeln!(writer, "## Categories\n")?;
    let rows: Vec<Vec<String>> = result
        .categories
        .iter()
        .map(|c| {
            vec![
                c.category.display_name().to_string(),
                format!("{:.1}", c.reference),
                format!("{:.1}", c.candidate),
                signed(c.delta),
                format!("{:.1}", c.similarity),
                format!("{:.2}", c.weight),
            ]
        })
        .collect();
    write_table(
        &["Category", "Reference", "Candidate", "Delta", "Similarity", "Weight"],
        &rows,
        writer,
    )?;

    writeln!(writer, "## Factors\n")?;
    let overlap = &result.language_overlap;
    let f = &result.factors;
    let rows = vec![
        vec!["Weighted base".to_string(), format!("{:.2}", result.base_score)],
        vec!["Language match".to_string(), format!("{:.3}", overlap.factor)],
        vec!["Complexity".to_string(), format!("{:.3}", f.complexity)],
        vec!["Consistency".to_string(), format!("{:.3}", f.consistency)],
        vec!["Excellence".to_string(), format!("{:.3}", f.excellence)],
        vec!["Anti-patterns".to_string(), format!("{:.3}", f.anti_patterns)],
        vec!["Design patterns".to_string(), format!("{:.3}", f.patterns)],
        vec!["Balance".to_string(), format!("{:.3}", f.balance)],
    ];
    write_table(&["Factor", "Value"], &rows, writer)?;

    writeln!(writer, "## Languages\n")?;
    writeln!(writer, "- Shared: {}", language_list(&overlap.shared))?;
    writeln!(writer, "- Missing from candidate: {}", language_list(&overlap.missing))?;
    writeln!(writer, "- Candidate only: {}\n", language_list(&overlap.extra))?;

    writeln!(writer, "## Strengths and weaknesses\n")?;
    writeln!(writer, "- Strengths: {}", category_list(&result.strengths))?;
    writeln!(writer, "- Weaknesses: {}\n", category_list(&result.weaknesses))?;

    writeln!(writer, "## Recommendations\n")?;
    if result.recommendations.is_empty() {
        writeln!(writer, "_No items_\n")?;
    }
    for rec in &result.recommendations {
        writeln!(
            writer,
            "### {} ({} priority, gap {:.1})\n",
            rec.title,
            rec.priority.label(),
            rec.gap
        )?;
        writeln!(writer, "{}\n", rec.description)?;
        for tip in &rec.tips {
            writeln!(writer, "- {tip}")?;
        }
        writeln!(writer)?;
    }

    writeln!(writer, "## Coverage\n")?;
    writeln!(writer, "- Reference: {}", coverage_line(&reference.coverage))?;
    writeln!(writer, "- Candidate: {}", coverage_line(&candidate.coverage))?;
    Ok(())
}

fn profile_markdown<W: Write>(profile: &RepositoryProfile, writer: &mut W) -> Result<()> {
    writeln!(writer, "# Profile: {}\n", profile.name)?;
    writeln!(writer, "**Overall**: {:.1} / 100\n", profile.overall())?;

    writeln!(writer, "## Categories\n")?;
    let rows: Vec<Vec<String>> = profile
        .scores
        .iter()
        .map(|s| {
            let evidence = s
                .evidence
                .iter()
                .map(|(k, v)| format!("{k}={}", compact(*v)))
                .collect::<Vec<_>>()
                .join(", ");
            vec![
                s.category.display_name().to_string(),
                format!("{:.1}", s.value()),
                evidence,
            ]
        })
        .collect();
    write_table(&["Category", "Score", "Evidence"], &rows, writer)?;

    writeln!(writer, "## Languages\n")?;
    let rows: Vec<Vec<String>> = profile
        .languages
        .iter()
        .map(|(lang, share)| {
            vec![
                lang.display_name().to_string(),
                share.files.to_string(),
                share.lines.to_string(),
                format!("{:.1}%", share.share * 100.0),
            ]
        })
        .collect();
    write_table(&["Language", "Files", "Lines", "Share"], &rows, writer)?;

    let advanced = &profile.advanced;
    writeln!(writer, "## Repository analysis\n")?;
    writeln!(
        writer,
        "- Duplication: {:.1}% ({})",
        advanced.duplication.percentage,
        advanced.duplication.level.description()
    )?;
    writeln!(
        writer,
        "- Dependencies: {} modules, {} edges, {} cycles",
        advanced.dependencies.nodes,
        advanced.dependencies.edges,
        advanced.dependencies.cycles.len()
    )?;
    writeln!(
        writer,
        "- Anti-patterns: {}, design patterns: {}",
        advanced.patterns.anti_pattern_count(),
        advanced.patterns.distinct_patterns()
    )?;
    writeln!(
        writer,
        "- Performance issues: {} in {} functions",
        advanced.performance.flagged_functions, advanced.performance.functions
    )?;
    writeln!(
        writer,
        "- Comment ratio: {:.1}%, markers: {}\n",
        advanced.comments.percentage(),
        advanced.comments.marker_count()
    )?;

    writeln!(writer, "## Coverage\n")?;
    writeln!(writer, "{}", coverage_line(&profile.coverage))?;
    Ok(())
}

fn compact(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{value:.2}")
    }
}

fn paint_level(level: Level) -> ColoredString {
    let label = level.label().bold();
    match level {
        Level::Excelente => label.green(),
        Level::Bueno => label.bright_green(),
        Level::Aceptable => label.yellow(),
        Level::Regular => label.bright_red(),
        Level::Deficiente => label.red(),
    }
}

fn paint_score(value: f64) -> ColoredString {
    let text = format!("{value:>5.1}");
    if value >= 80.0 {
        text.green()
    } else if value >= 60.0 {
        text.yellow()
    } else {
        text.red()
    }
}

fn paint_delta(delta: f64) -> ColoredString {
    let text = format!("{:>6}", signed(delta));
    if delta >= 5.0 {
        text.red()
    } else if delta <= -5.0 {
        text.cyan()
    } else {
        text.normal()
    }
}

fn comparison_text<W: Write>(comparison: &Comparison, writer: &mut W) -> Result<()> {
    let Comparison {
        reference,
        candidate,
        result,
    } = comparison;

    writeln!(writer, "{} {}", "Reference:".bold(), reference.name)?;
    writeln!(writer, "{} {}", "Candidate:".bold(), candidate.name)?;
    writeln!(writer)?;
    write_headline(result, writer)?;
    writeln!(writer)?;

    writeln!(
        writer,
        "  {:<20} {:>5} {:>5} {:>6}",
        "Category", "Ref", "Cand", "Delta"
    )?;
    for c in &result.categories {
        writeln!(
            writer,
            "  {:<20} {:>5.1} {} {}",
            c.category.display_name(),
            c.reference,
            paint_score(c.candidate),
            paint_delta(c.delta)
        )?;
    }
    writeln!(writer)?;

    let overlap = &result.language_overlap;
    writeln!(
        writer,
        "Language match: {:.0}% (shared: {}; missing: {})",
        overlap.percentage(),
        language_list(&overlap.shared),
        language_list(&overlap.missing)
    )?;
    writeln!(
        writer,
        "Base {:.1} x language {:.2} x factors {:.3}",
        result.base_score,
        overlap.factor,
        result.factors.product()
    )?;
    writeln!(writer, "Strengths:  {}", category_list(&result.strengths))?;
    writeln!(writer, "Weaknesses: {}", category_list(&result.weaknesses))?;

    if !result.recommendations.is_empty() {
        writeln!(writer)?;
        writeln!(writer, "{}", "Recommendations".bold())?;
        for (i, rec) in result.recommendations.iter().enumerate() {
            writeln!(
                writer,
                "  {}. {} [{}, gap {:.1}]",
                i + 1,
                rec.title,
                rec.priority.label(),
                rec.gap
            )?;
            for tip in &rec.tips {
                writeln!(writer, "     - {tip}")?;
            }
        }
    }

    writeln!(writer)?;
    writeln!(writer, "Reference coverage: {}", coverage_line(&reference.coverage))?;
    writeln!(writer, "Candidate coverage: {}", coverage_line(&candidate.coverage))?;
    Ok(())
}

fn write_headline<W: Write>(result: &EmpathyResult, writer: &mut W) -> Result<()> {
    writeln!(
        writer,
        "Empathy: {} / 100  {}",
        format!("{:.1}", result.score).bold(),
        paint_level(result.level)
    )?;
    writeln!(writer, "{}", result.description)?;
    writeln!(writer, "{}", result.verdict.italic())?;
    Ok(())
}

fn profile_text<W: Write>(profile: &RepositoryProfile, writer: &mut W) -> Result<()> {
    writeln!(writer, "{} {}", "Profile:".bold(), profile.name)?;
    writeln!(writer, "Overall: {:.1} / 100", profile.overall())?;
    writeln!(writer)?;
    for score in profile.scores.iter() {
        writeln!(
            writer,
            "  {:<20} {}",
            score.category.display_name(),
            paint_score(score.value())
        )?;
    }
    writeln!(writer)?;
    for (lang, share) in &profile.languages {
        writeln!(
            writer,
            "  {:<12} {:>5} files {:>7} lines {:>5.1}%",
            lang.display_name(),
            share.files,
            share.lines,
            share.share * 100.0
        )?;
    }
    writeln!(writer)?;
    writeln!(writer, "Coverage: {}", coverage_line(&profile.coverage))?;
    Ok(())
}
