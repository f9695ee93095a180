//! HTML: naming from `id` and `class` values, documentation from comments.

use once_cell::sync::Lazy;

use super::facts::FileFacts;
use super::pattern::{self, re, BlockStyle, Danger, LanguageRules};
use super::text::{Case, CommentSyntax};
use super::LanguageAnalyzer;
use crate::config::ThresholdsConfig;
use crate::core::{Language, SourceFile};
use crate::metrics::{Category, CategoryScore};

/// Attribute values stay in the code text, so no quote handling.
const SYNTAX: CommentSyntax = CommentSyntax {
    line: &[],
    doc_line: &[],
    block: &[("<!--", "-->")],
    doc_block: &[],
    quotes: &[],
    multiline_strings: &[],
    docstrings: false,
    block_at_line_start: false,
};

static RULES: Lazy<LanguageRules> = Lazy::new(|| {
    LanguageRules {
        variables: vec![re(r#"\b(?:id|class)\s*=\s*["'](?P<name>[^"']+)["']"#)],
        variable_case: &[Case::Kebab, Case::Camel],
        imports: vec![
            re(r#"<script\b[^>]*\bsrc\s*=\s*["'](?P<target>[^"']+)["']"#),
            re(r#"<link\b[^>]*\bhref\s*=\s*["'](?P<target>[^"']+)["']"#),
        ],
        ..LanguageRules::base(Language::Html, SYNTAX, BlockStyle::Flat)
    }
    .with_dangers(vec![
        Danger::code("javascript_url", r#"(?i)\b(?:href|src)\s*=\s*["']?\s*javascript:"#),
        Danger::code("inline_event_handler", r"(?i)\bon(?:click|load|error|mouseover|submit|change|focus|blur)\s*="),
        Danger::code("insecure_form", r#"(?i)<form\b[^>]*\baction\s*=\s*["']?http://"#),
    ])
});

/// Markup carries no test suites; testing is scored neutral.
pub(super) fn neutral_testing() -> CategoryScore {
    CategoryScore::new(Category::Testing, super::scoring::NEUTRAL)
}

pub struct Html;

impl LanguageAnalyzer for Html {
    fn language(&self) -> Language {
        Language::Html
    }

    fn extract(&self, file: &SourceFile) -> FileFacts {
        let mut facts = pattern::extract(file, &RULES);
        facts.docs.module_doc = facts.lines.comment + facts.lines.doc > 0;
        facts
    }

    fn testing(&self, _files: &[FileFacts], _thresholds: &ThresholdsConfig) -> CategoryScore {
        neutral_testing()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = "\
<!DOCTYPE html>\n\
<!-- Landing page -->\n\
<html>\n\
  <head>\n\
    <link rel=\"stylesheet\" href=\"styles/main.css\">\n\
    <script src=\"app.js\"></script>\n\
  </head>\n\
  <body>\n\
    <nav id=\"mainNav\" class=\"nav-bar nav-bar--dark\">\n\
      <a href=\"javascript:void(0)\" onclick=\"go()\">Go</a>\n\
      <div class=\"Bad_Name\"></div>\n\
    </nav>\n\
  </body>\n\
</html>\n";

    fn facts(src: &str) -> FileFacts {
        Html.extract(&SourceFile::from_content("index.html", Language::Html, src))
    }

    #[test]
    fn test_attribute_naming() {
        let facts = facts(PAGE);
        assert_eq!(facts.naming.total, 4);
        assert_eq!(facts.naming.conventional, 3);
        assert!(facts.functions.is_empty());
        assert_eq!(facts.magic_numbers, 0);
    }

    #[test]
    fn test_assets_and_dangers() {
        let facts = facts(PAGE);
        assert_eq!(facts.imports, ["styles/main.css", "app.js"]);
        assert_eq!(facts.security.get("javascript_url"), Some(&1));
        assert_eq!(facts.security.get("inline_event_handler"), Some(&1));
        assert!(!facts.security.contains_key("hardcoded_secret"));
    }

    #[test]
    fn test_comments_count_as_documentation() {
        assert!(facts(PAGE).docs.module_doc);
        assert!(!facts("<p>plain</p>\n").docs.module_doc);
    }

    #[test]
    fn test_testing_is_neutral() {
        let files = vec![facts(PAGE)];
        let score = Html.testing(&files, &ThresholdsConfig::default());
        assert_eq!(score.value(), super::super::scoring::NEUTRAL);
    }
}
