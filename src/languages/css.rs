use once_cell::sync::Lazy;
use regex::Regex;

use super::facts::{FileFacts, NamingFacts};
use super::pattern::{self, re, BlockStyle, Danger, LanguageRules};
use super::text::{self, Case, CommentSyntax};
use super::LanguageAnalyzer;
use crate::config::ThresholdsConfig;
use crate::core::{Language, SourceFile};
use crate::metrics::CategoryScore;

const SYNTAX: CommentSyntax = CommentSyntax {
    line: &[],
    doc_line: &[],
    ..CommentSyntax::C_LIKE
};

const SELECTOR_CASES: &[Case] = &[Case::Kebab, Case::Camel];

static RULES: Lazy<LanguageRules> = Lazy::new(|| {
    LanguageRules {
        imports: vec![re(
            r#"^\s*@(?:import|use|forward)\s+(?:url\()?\s*["']?(?P<target>[^"')\s;]+)"#,
        )],
        ..LanguageRules::base(Language::Css, SYNTAX, BlockStyle::Flat)
    }
    .with_dangers(vec![
        Danger::code("expression", r"(?i)\bexpression\s*\("),
        Danger::raw("javascript_url", r#"(?i)\burl\s*\(\s*["']?\s*javascript:"#),
        Danger::raw("insecure_import", r#"(?i)@import\s+(?:url\()?\s*["']?http://"#),
    ])
});

static SELECTOR_NAME: Lazy<Regex> = Lazy::new(|| re(r"[.#](?P<name>-?[A-Za-z_][\w-]*)"));

/// Selector text of a code line: everything before `{`, or the whole line
/// when a selector list continues on the next line. Property lines have none.
fn selector_text(code: &str) -> Option<&str> {
    let trimmed = code.trim();
    if trimmed.starts_with('@') {
        return None;
    }
    match trimmed.find('{') {
        Some(pos) => Some(&trimmed[..pos]),
        None if trimmed.ends_with(',') => Some(trimmed),
        None => None,
    }
}

/// Class and id names from selectors only, so hex colors in property values
/// are never mistaken for names.
fn selector_naming(code: &[String]) -> NamingFacts {
    let mut naming = NamingFacts::default();
    for selector in code.iter().filter_map(|line| selector_text(line)) {
        for caps in SELECTOR_NAME.captures_iter(selector) {
            let name = &caps["name"];
            naming.total += 1;
            if text::matches_any(name, SELECTOR_CASES) {
                naming.conventional += 1;
            }
            if text::is_short(name) {
                naming.short += 1;
            }
        }
    }
    naming
}

pub struct Css;

impl LanguageAnalyzer for Css {
    fn language(&self) -> Language {
        Language::Css
    }

    fn extract(&self, file: &SourceFile) -> FileFacts {
        let classified = text::classify(&file.content, &RULES.syntax);
        let mut facts = pattern::extract_classified(file, &RULES, &classified);
        facts.naming = selector_naming(&classified.code);
        facts.docs.module_doc = facts.lines.comment + facts.lines.doc > 0;
        facts
    }

    fn testing(&self, _files: &[FileFacts], _thresholds: &ThresholdsConfig) -> CategoryScore {
        super::html::neutral_testing()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHEET: &str = "\
/* Layout */\n\
@import url(\"reset.css\");\n\
\n\
.nav-bar, #mainHeader {\n\
  color: #fff;\n\
  margin: 0 auto;\n\
}\n\
\n\
.nav-bar__item--active:hover > a {\n\
  border: 1px solid #ccc;\n\
}\n\
\n\
.Bad_Name { color: red; }\n";

    fn facts(src: &str) -> FileFacts {
        Css.extract(&SourceFile::from_content("main.css", Language::Css, src))
    }

    #[test]
    fn test_selector_naming_skips_colors() {
        let facts = facts(SHEET);
        assert_eq!(facts.naming.total, 4);
        assert_eq!(facts.naming.conventional, 3);
    }

    #[test]
    fn test_imports_and_layout() {
        let facts = facts(SHEET);
        assert_eq!(facts.imports, ["reset.css"]);
        assert_eq!(facts.style.brace_same_line, 2);
        assert!(facts.docs.module_doc);
        assert!(facts.functions.is_empty());
    }

    #[test]
    fn test_dangerous_values() {
        let src = ".x {\n  background: url(\"javascript:alert(1)\");\n  width: expression(document.body.clientWidth);\n}\n";
        let facts = facts(src);
        assert_eq!(facts.security.get("javascript_url"), Some(&1));
        assert_eq!(facts.security.get("expression"), Some(&1));
    }

    #[test]
    fn test_selector_list_across_lines() {
        let facts = facts("h1,\n.page-title,\n.pageSubtitle {\n  margin: 0;\n}\n");
        assert_eq!(facts.naming.total, 2);
        assert_eq!(facts.naming.conventional, 2);
    }
}
