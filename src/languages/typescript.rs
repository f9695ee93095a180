//! TypeScript: the JavaScript rules plus type declarations and annotation
//! coverage. Explicit types act as documentation and as input validation.

use once_cell::sync::Lazy;
use regex::Regex;

use super::facts::{FileFacts, TypeFacts};
use super::javascript::ecmascript_rules;
use super::pattern::{self, re, Danger, LanguageRules, Visibility};
use super::text::{self, Classified};
use super::{scoring, LanguageAnalyzer};
use crate::config::ThresholdsConfig;
use crate::core::{Language, SourceFile};
use crate::metrics::{Category, CategoryScore};

static RULES: Lazy<LanguageRules> = Lazy::new(|| {
    let mut rules = ecmascript_rules(Language::TypeScript);
    rules.classes.push(re(
        r"^\s*(?:export\s+)?(?:declare\s+)?(?:const\s+)?(?:interface|enum|type)\s+(?P<name>\w+)",
    ));
    rules.visibility = Visibility::Unmarked(Some(re(r"^\s*(?:private|protected)\b")));
    rules.with_dangers(vec![
        Danger::code("any_type", r":\s*any\b|\bas\s+any\b|<any>"),
    ])
});

static PARAMS: Lazy<Regex> = Lazy::new(|| {
    re(r"(?:\bfunction\s*\*?\s*[\w$]*|\b(?:const|let|var)\s+[\w$]+\s*=\s*(?:async\s*)?)\s*(?:<[^>]*>)?\s*\((?P<params>[^)]*)\)(?P<ret>\s*:\s*[\w$<\[{])?")
});
static VARIABLE: Lazy<Regex> = Lazy::new(|| re(r"\b(?:const|let|var)\s+[\w$]+\s*(?P<typed>:)?"));

/// Share of parameters, variables and function returns with explicit types.
pub(crate) fn type_facts(classified: &Classified) -> TypeFacts {
    let mut types = TypeFacts::default();
    for (code, kind) in classified.code.iter().zip(&classified.kinds) {
        if *kind != text::LineKind::Code {
            continue;
        }
        for caps in PARAMS.captures_iter(code) {
            let params = caps.name("params").map_or("", |p| p.as_str());
            if !params.trim().is_empty() {
                for param in params.split(',').filter(|p| !p.trim().is_empty()) {
                    types.annotatable += 1;
                    if param.contains(':') {
                        types.annotated += 1;
                    }
                }
            }
            types.annotatable += 1;
            if caps.name("ret").is_some() {
                types.annotated += 1;
            }
        }
        for caps in VARIABLE.captures_iter(code) {
            types.annotatable += 1;
            if caps.name("typed").is_some() {
                types.annotated += 1;
            }
        }
    }
    types
}

fn coverage(files: &[FileFacts]) -> f64 {
    let (annotatable, annotated) = files
        .iter()
        .filter_map(|f| f.types)
        .fold((0, 0), |(a, b), t| (a + t.annotatable, b + t.annotated));
    TypeFacts {
        annotatable,
        annotated,
    }
    .coverage()
}

/// Coverage above which types count as documentation.
const DOCUMENTING_COVERAGE: f64 = 0.7;

pub struct TypeScript;

impl LanguageAnalyzer for TypeScript {
    fn language(&self) -> Language {
        Language::TypeScript
    }

    fn extract(&self, file: &SourceFile) -> FileFacts {
        let classified = text::classify(&file.content, &RULES.syntax);
        let mut facts = pattern::extract_classified(file, &RULES, &classified);
        facts.types = Some(type_facts(&classified));
        facts
    }

    fn documentation(&self, files: &[FileFacts], _thresholds: &ThresholdsConfig) -> CategoryScore {
        let base = scoring::documentation(files);
        let coverage = coverage(files);
        let bonus = if coverage > DOCUMENTING_COVERAGE { 20.0 } else { 0.0 };
        CategoryScore::new(Category::Documentation, base.value() + bonus)
            .with_evidence("type_coverage", coverage)
            .with_evidence("base", base.value())
    }

    fn security(&self, files: &[FileFacts], _thresholds: &ThresholdsConfig) -> CategoryScore {
        let base = scoring::security(files);
        let coverage = coverage(files);
        let mut score = CategoryScore::new(Category::Security, base.value() + coverage * 20.0)
            .with_evidence("type_coverage", coverage);
        score.evidence.extend(base.evidence);
        score
    }
}
