//! Per-language analyzers behind one contract.
//!
//! Every variant turns a file into [`FileFacts`] and a batch of facts into
//! the eight base [`CategoryScore`]s. Python is parsed with tree-sitter; the
//! other eleven languages use ordered pattern rules from [`pattern`]. Both
//! strategies are normalized by the same formulas in [`scoring`].

pub mod facts;
pub mod pattern;
pub mod scoring;
pub mod text;

mod cpp;
mod csharp;
mod css;
mod go;
mod html;
mod java;
mod javascript;
mod php;
mod python;
mod ruby;
mod swift;
mod typescript;

use std::path::Path;

use once_cell::sync::Lazy;

pub use facts::{AnalyzedFile, FileFacts};

use crate::config::ThresholdsConfig;
use crate::core::{FileSet, Language, SourceFile};
use crate::metrics::{CategoryScore, CategoryScores, LanguageMetrics};

/// Capability shared by every language variant.
///
/// Only [`language`](Self::language) and [`extract`](Self::extract) are
/// required; the scoring methods default to the shared formulas and a variant
/// overrides one only when its language carries extra signal.
pub trait LanguageAnalyzer: Send + Sync {
    fn language(&self) -> Language;

    /// Extract raw facts from one file. Never fails: malformed input yields
    /// partial facts.
    fn extract(&self, file: &SourceFile) -> FileFacts;

    fn naming(&self, files: &[FileFacts], _thresholds: &ThresholdsConfig) -> CategoryScore {
        scoring::naming(files)
    }

    fn documentation(&self, files: &[FileFacts], _thresholds: &ThresholdsConfig) -> CategoryScore {
        scoring::documentation(files)
    }

    fn modularity(&self, files: &[FileFacts], thresholds: &ThresholdsConfig) -> CategoryScore {
        scoring::modularity(files, thresholds)
    }

    fn complexity(&self, files: &[FileFacts], thresholds: &ThresholdsConfig) -> CategoryScore {
        scoring::complexity(files, thresholds)
    }

    fn error_handling(&self, files: &[FileFacts], _thresholds: &ThresholdsConfig) -> CategoryScore {
        scoring::error_handling(files)
    }

    fn testing(&self, files: &[FileFacts], _thresholds: &ThresholdsConfig) -> CategoryScore {
        scoring::testing(files)
    }

    fn security(&self, files: &[FileFacts], _thresholds: &ThresholdsConfig) -> CategoryScore {
        scoring::security(files)
    }

    fn style_consistency(&self, files: &[FileFacts], _thresholds: &ThresholdsConfig) -> CategoryScore {
        scoring::style_consistency(files)
    }

    /// The eight base scores for a batch of this language's files.
    fn score(&self, files: &[FileFacts], thresholds: &ThresholdsConfig) -> LanguageMetrics {
        let scores: CategoryScores = [
            self.naming(files, thresholds),
            self.documentation(files, thresholds),
            self.modularity(files, thresholds),
            self.complexity(files, thresholds),
            self.error_handling(files, thresholds),
            self.testing(files, thresholds),
            self.security(files, thresholds),
            self.style_consistency(files, thresholds),
        ]
        .into_iter()
        .collect();
        LanguageMetrics {
            language: self.language(),
            file_count: files.len(),
            line_count: files.iter().map(|f| f.lines.total).sum(),
            scores,
        }
    }
}

/// Dispatch table in [`Language::ALL`] order.
static ANALYZERS: Lazy<Vec<Box<dyn LanguageAnalyzer>>> = Lazy::new(|| {
    vec![
        Box::new(python::Python::new()),
        Box::new(javascript::JavaScript),
        Box::new(typescript::TypeScript),
        Box::new(java::Java),
        Box::new(go::Go),
        Box::new(csharp::CSharp),
        Box::new(cpp::Cpp),
        Box::new(php::Php),
        Box::new(ruby::Ruby),
        Box::new(swift::Swift),
        Box::new(html::Html),
        Box::new(css::Css),
    ]
});

/// Maps files to their language analyzer. Holds no state beyond the static
/// dispatch table.
pub struct AnalyzerFactory;

impl AnalyzerFactory {
    /// Analyzer for a language.
    pub fn for_language(lang: Language) -> &'static dyn LanguageAnalyzer {
        ANALYZERS[lang as usize].as_ref()
    }

    /// Analyzer for a loaded file.
    pub fn resolve(file: &SourceFile) -> &'static dyn LanguageAnalyzer {
        Self::for_language(file.language)
    }

    /// Analyzer for a path, by case-insensitive extension.
    pub fn resolve_path(path: &Path) -> Option<&'static dyn LanguageAnalyzer> {
        Language::detect(path).map(Self::for_language)
    }

    pub fn supported_languages() -> &'static [Language] {
        &Language::ALL
    }

    /// Every recognized extension, without the leading dot.
    pub fn supported_extensions() -> Vec<&'static str> {
        Language::ALL
            .iter()
            .flat_map(|lang| lang.extensions().iter().copied())
            .collect()
    }

    /// Language with the most files; ties go to the earlier language.
    pub fn primary_language(files: &FileSet) -> Option<Language> {
        files
            .language_counts()
            .into_iter()
            .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(&a.0)))
            .map(|(lang, _)| lang)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_matches_language_order() {
        for lang in Language::ALL {
            assert_eq!(AnalyzerFactory::for_language(lang).language(), lang);
        }
    }

    #[test]
    fn test_resolve_path_case_insensitive() {
        let analyzer = AnalyzerFactory::resolve_path(Path::new("src/App.TSX")).unwrap();
        assert_eq!(analyzer.language(), Language::TypeScript);
        assert!(AnalyzerFactory::resolve_path(Path::new("Makefile")).is_none());
        assert!(AnalyzerFactory::resolve_path(Path::new("main.rs")).is_none());
    }

    #[test]
    fn test_supported_extensions() {
        let exts = AnalyzerFactory::supported_extensions();
        for ext in ["py", "mjs", "hh", "phtml", "gemspec", "xhtml", "less"] {
            assert!(exts.contains(&ext), "{ext}");
        }
        assert_eq!(AnalyzerFactory::supported_languages().len(), 12);
    }

    #[test]
    fn test_primary_language_tie_breaks_by_order() {
        let files = FileSet::from_files(vec![
            SourceFile::from_content("a.rb", Language::Ruby, "x = 1\n"),
            SourceFile::from_content("b.go", Language::Go, "package b\n"),
        ]);
        assert_eq!(AnalyzerFactory::primary_language(&files), Some(Language::Go));
        assert_eq!(AnalyzerFactory::primary_language(&FileSet::default()), None);
    }

    #[test]
    fn test_every_variant_survives_garbage() {
        let garbage = "}{)(\"'\n/* <<<\n\t\t:::\n\"\"\"\n=begin\n<?php {{\n";
        let thresholds = ThresholdsConfig::default();
        for lang in Language::ALL {
            let path = format!("garbage.{}", lang.extensions()[0]);
            let file = SourceFile::from_content(path, lang, garbage);
            let analyzer = AnalyzerFactory::resolve(&file);
            let facts = analyzer.extract(&file);
            let metrics = analyzer.score(&[facts], &thresholds);
            assert_eq!(metrics.scores.len(), 8);
            for score in metrics.scores.iter() {
                assert!((0.0..=100.0).contains(&score.value()), "{lang:?} {score:?}");
            }
        }
    }

    #[test]
    fn test_empty_batch_scores_are_bounded() {
        let thresholds = ThresholdsConfig::default();
        for lang in Language::ALL {
            let metrics = AnalyzerFactory::for_language(lang).score(&[], &thresholds);
            assert_eq!(metrics.file_count, 0);
            for score in metrics.scores.iter() {
                assert!((0.0..=100.0).contains(&score.value()));
            }
        }
    }
}
