//! Pure text helpers shared by every language variant: comment and string
//! stripping, naming conventions, indentation and layout statistics.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use xxhash_rust::xxh3::xxh3_64;

use super::facts::{LineCounts, StyleFacts};

/// Comment and string syntax of a language.
#[derive(Debug, Clone, Copy)]
pub struct CommentSyntax {
    /// Line comment openers, e.g. `//`, `#`.
    pub line: &'static [&'static str],
    /// Line comment openers that mark documentation, e.g. `///`.
    pub doc_line: &'static [&'static str],
    /// Block comment delimiters.
    pub block: &'static [(&'static str, &'static str)],
    /// Block comment delimiters that mark documentation, e.g. `/** */`.
    pub doc_block: &'static [(&'static str, &'static str)],
    /// Single-line string quotes.
    pub quotes: &'static [char],
    /// Multi-line string delimiters, e.g. triple quotes or backticks.
    pub multiline_strings: &'static [&'static str],
    /// A multi-line string that opens a statement is documentation (docstrings).
    pub docstrings: bool,
    /// Block comments that only open at the start of a line (`=begin`).
    pub block_at_line_start: bool,
}

impl CommentSyntax {
    /// C-family syntax: `//`, `/* */`, `/** */`.
    pub const C_LIKE: CommentSyntax = CommentSyntax {
        line: &["//"],
        doc_line: &["///"],
        block: &[("/*", "*/")],
        doc_block: &[("/**", "*/")],
        quotes: &['"', '\''],
        multiline_strings: &[],
        docstrings: false,
        block_at_line_start: false,
    };
}

/// Classification of one source line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Blank,
    Code,
    Comment,
    Doc,
}

/// A file split into per-line code and comment text.
#[derive(Debug, Clone, Default)]
pub struct Classified {
    pub kinds: Vec<LineKind>,
    /// Code with comments removed and string contents emptied.
    pub code: Vec<String>,
    /// Comment text found on each line.
    pub comments: Vec<String>,
}

impl Classified {
    pub fn line_counts(&self) -> LineCounts {
        let mut counts = LineCounts {
            total: self.kinds.len(),
            ..LineCounts::default()
        };
        for kind in &self.kinds {
            match kind {
                LineKind::Blank => counts.blank += 1,
                LineKind::Code => counts.code += 1,
                LineKind::Comment => counts.comment += 1,
                LineKind::Doc => counts.doc += 1,
            }
        }
        counts
    }

    /// Index of the previous non-blank line before `index`, skipping lines
    /// for which `skip` returns true.
    pub fn previous_significant(&self, index: usize, skip: impl Fn(&str) -> bool) -> Option<usize> {
        (0..index).rev().find(|&i| {
            self.kinds[i] != LineKind::Blank && !(self.kinds[i] == LineKind::Code && skip(&self.code[i]))
        })
    }

    /// Index of the next non-blank line after `index`.
    pub fn next_significant(&self, index: usize) -> Option<usize> {
        (index + 1..self.kinds.len()).find(|&i| self.kinds[i] != LineKind::Blank)
    }

    /// Whether the file opens with documentation (or, when allowed, a comment).
    pub fn has_header_doc(&self, comments_count: bool) -> bool {
        let first = self.kinds.iter().enumerate().find(|(i, kind)| {
            **kind != LineKind::Blank && !self.comments[*i].trim_start().starts_with("#!")
        });
        match first {
            Some((_, LineKind::Doc)) => true,
            Some((_, LineKind::Comment)) => comments_count,
            _ => false,
        }
    }
}

#[derive(Clone, Copy)]
enum State {
    Normal,
    Block { end: &'static str, doc: bool },
    Multiline { delim: &'static str, doc: bool },
}

/// Split content into code, comment and doc lines.
///
/// Never fails: unterminated strings end at the line break and unterminated
/// block comments run to the end of the file.
pub fn classify(content: &str, syntax: &CommentSyntax) -> Classified {
    let mut out = Classified::default();
    let mut state = State::Normal;

    for line in content.lines() {
        let mut code = String::new();
        let mut comment = String::new();
        let mut has_code = false;
        let mut has_comment = false;
        let mut has_doc = false;
        let mut rest = line;

        while !rest.is_empty() {
            match state {
                State::Block { end, doc } => {
                    if doc {
                        has_doc = true;
                    } else {
                        has_comment = true;
                    }
                    if let Some(pos) = rest.find(end) {
                        comment.push_str(&rest[..pos]);
                        rest = &rest[pos + end.len()..];
                        state = State::Normal;
                    } else {
                        comment.push_str(rest);
                        rest = "";
                    }
                }
                State::Multiline { delim, doc } => {
                    if doc {
                        has_doc = true;
                    } else {
                        has_code = true;
                    }
                    if let Some(pos) = rest.find(delim) {
                        if !doc {
                            code.push_str(delim);
                        }
                        rest = &rest[pos + delim.len()..];
                        state = State::Normal;
                    } else {
                        rest = "";
                    }
                }
                State::Normal => {
                    let at_line_start = code.trim().is_empty() && !has_doc;
                    if let Some((open, end, doc)) = block_opener(rest, syntax, at_line_start) {
                        if doc {
                            has_doc = true;
                        } else {
                            has_comment = true;
                        }
                        rest = &rest[open.len()..];
                        state = State::Block { end, doc };
                        continue;
                    }
                    if let Some(doc) = line_comment(rest, syntax) {
                        if doc {
                            has_doc = true;
                        } else {
                            has_comment = true;
                        }
                        comment.push_str(rest);
                        rest = "";
                        continue;
                    }
                    if let Some(delim) = syntax
                        .multiline_strings
                        .iter()
                        .copied()
                        .find(|d| rest.starts_with(d))
                    {
                        let doc = syntax.docstrings && code.trim().is_empty();
                        if !doc {
                            code.push_str(delim);
                            has_code = true;
                        } else {
                            has_doc = true;
                        }
                        rest = &rest[delim.len()..];
                        state = State::Multiline { delim, doc };
                        continue;
                    }
                    let mut chars = rest.chars();
                    let Some(c) = chars.next() else { break };
                    if syntax.quotes.contains(&c) {
                        has_code = true;
                        rest = skip_string(&rest[c.len_utf8()..], c);
                        code.push(c);
                        code.push(c);
                        continue;
                    }
                    if !c.is_whitespace() {
                        has_code = true;
                    }
                    code.push(c);
                    rest = chars.as_str();
                }
            }
        }

        let kind = if has_code {
            LineKind::Code
        } else if has_doc {
            LineKind::Doc
        } else if has_comment {
            LineKind::Comment
        } else {
            LineKind::Blank
        };
        out.kinds.push(kind);
        out.code.push(code);
        out.comments.push(comment);
    }
    out
}

fn block_opener(
    rest: &str,
    syntax: &CommentSyntax,
    at_line_start: bool,
) -> Option<(&'static str, &'static str, bool)> {
    if syntax.block_at_line_start && !at_line_start {
        return None;
    }
    for (open, end) in syntax.doc_block {
        // `/**/` is an empty block comment, not documentation.
        if rest.starts_with(open) && !rest[open.len()..].starts_with('/') {
            return Some((*open, *end, true));
        }
    }
    syntax
        .block
        .iter()
        .find(|(open, _)| rest.starts_with(open))
        .map(|(open, end)| (*open, *end, false))
}

fn line_comment(rest: &str, syntax: &CommentSyntax) -> Option<bool> {
    if let Some(d) = syntax.doc_line.iter().find(|d| rest.starts_with(*d)) {
        // `////` separators are plain comments.
        if !rest[d.len()..].starts_with(&d[d.len() - 1..]) {
            return Some(true);
        }
    }
    syntax
        .line
        .iter()
        .any(|l| rest.starts_with(l))
        .then_some(false)
}

/// Skip past the closing quote, honoring backslash escapes. Returns the
/// remainder after the string, or `""` if unterminated on this line.
fn skip_string(rest: &str, quote: char) -> &str {
    let mut escaped = false;
    for (i, c) in rest.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == quote {
            return &rest[i + c.len_utf8()..];
        }
    }
    ""
}

/// Identifier casing conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Case {
    /// `snake_case`
    Snake,
    /// `camelCase`
    Camel,
    /// `PascalCase`
    Pascal,
    /// `SCREAMING_SNAKE`
    ScreamingSnake,
    /// `kebab-case` (BEM separators allowed)
    Kebab,
}

/// Names that are short by convention and never penalized.
const SHORT_ALLOWED: &[&str] = &[
    "i", "j", "k", "n", "x", "y", "z", "e", "_", "id", "db", "io", "ok", "fn", "el", "ui", "os",
];

fn trim_affixes(name: &str) -> &str {
    name.trim_start_matches(['_', '$', '@'])
        .trim_end_matches(['_', '?', '!'])
}

/// Whether `name` follows `case`. Leading underscores, sigils and Ruby's
/// `?`/`!` suffixes are ignored.
pub fn matches_case(name: &str, case: Case) -> bool {
    let core = trim_affixes(name);
    let Some(first) = core.chars().next() else {
        return false;
    };
    match case {
        Case::Snake => {
            first.is_ascii_lowercase()
                && core
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
                && !core.contains("__")
        }
        Case::Camel => first.is_ascii_lowercase() && core.chars().all(|c| c.is_ascii_alphanumeric()),
        Case::Pascal => first.is_ascii_uppercase() && core.chars().all(|c| c.is_ascii_alphanumeric()),
        Case::ScreamingSnake => {
            first.is_ascii_uppercase()
                && core
                    .chars()
                    .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
        }
        Case::Kebab => {
            first.is_ascii_lowercase()
                && core
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
                && !core.contains("---")
        }
    }
}

/// Whether `name` follows any of `cases`.
pub fn matches_any(name: &str, cases: &[Case]) -> bool {
    cases.iter().any(|case| matches_case(name, *case))
}

/// Too short to be descriptive.
pub fn is_short(name: &str) -> bool {
    let core = trim_affixes(name);
    core.chars().count() < 3 && !SHORT_ALLOWED.contains(&core.to_ascii_lowercase().as_str())
}

/// Leading indentation width, tabs counted as four columns.
pub fn indentation(line: &str) -> usize {
    line.chars()
        .take_while(|c| c.is_whitespace())
        .map(|c| if c == '\t' { 4 } else { 1 })
        .sum()
}

/// Indentation and layout statistics for one file.
pub fn style_facts(content: &str, classified: &Classified) -> StyleFacts {
    let mut facts = StyleFacts {
        crlf: content.contains("\r\n"),
        ..StyleFacts::default()
    };
    let mut deltas: BTreeMap<usize, usize> = BTreeMap::new();
    let mut previous_indent = 0usize;

    for (i, raw) in content.lines().enumerate() {
        if raw.ends_with(' ') || raw.ends_with('\t') {
            facts.trailing_whitespace += 1;
        }
        if classified.kinds.get(i) != Some(&LineKind::Code) {
            continue;
        }
        if raw.starts_with('\t') {
            facts.tab_lines += 1;
        } else if raw.starts_with(' ') {
            facts.space_lines += 1;
        }
        let indent = indentation(raw);
        if indent > previous_indent {
            *deltas.entry(indent - previous_indent).or_insert(0) += 1;
        }
        previous_indent = indent;

        let code = classified.code[i].trim();
        if code == "{" {
            facts.brace_next_line += 1;
        } else if code.ends_with('{') {
            facts.brace_same_line += 1;
        }
    }

    // Most frequent step; ties go to the smaller width.
    facts.indent_unit = deltas
        .iter()
        .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
        .map(|(width, _)| *width);
    facts
}

static MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(TODO|FIXME|HACK|XXX|BUG)\b").expect("valid regex"));

/// Count TODO-style markers in comment text.
pub fn count_markers(classified: &Classified) -> BTreeMap<String, usize> {
    let mut markers = BTreeMap::new();
    for comment in &classified.comments {
        for m in MARKER.find_iter(comment) {
            *markers.entry(m.as_str().to_string()).or_insert(0) += 1;
        }
    }
    markers
}

static NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|[^\w.])(\d+(?:\.\d+)?)\b").expect("valid regex"));
static CONSTANT_DECL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:const|final|static\s+readonly|define|enum)\b|^\s*[A-Z][A-Z0-9_]*\s*[:=]")
        .expect("valid regex")
});

/// Numeric literals other than 0, 1 and 2 outside constant declarations.
pub fn count_magic_numbers(classified: &Classified) -> usize {
    classified
        .code
        .iter()
        .zip(&classified.kinds)
        .filter(|(code, kind)| **kind == LineKind::Code && !CONSTANT_DECL.is_match(code))
        .map(|(code, _)| {
            NUMBER
                .captures_iter(code)
                .filter(|c| !matches!(&c[1], "0" | "1" | "2" | "0.0" | "1.0"))
                .count()
        })
        .sum()
}

/// Hash of every code line with whitespace collapsed, in file order.
///
/// Lines with no alphanumeric character (lone braces, `end`-less closers)
/// carry no clone signal and are left out.
pub fn line_fingerprints(classified: &Classified) -> Vec<u64> {
    classified
        .code
        .iter()
        .zip(&classified.kinds)
        .filter(|(code, kind)| **kind == LineKind::Code && code.chars().any(char::is_alphanumeric))
        .map(|(code, _)| {
            let normalized = code.split_whitespace().collect::<Vec<_>>().join(" ");
            xxh3_64(normalized.as_bytes())
        })
        .collect()
}

/// Count parameters in a comma-separated parameter list.
pub fn count_params(params: &str) -> usize {
    let trimmed = params.trim();
    if trimmed.is_empty() || trimmed == "void" {
        return 0;
    }
    let mut depth = 0i32;
    let mut count = 1;
    for c in trimmed.chars() {
        match c {
            '(' | '<' | '[' | '{' => depth += 1,
            ')' | '>' | ']' | '}' => depth -= 1,
            ',' if depth == 0 => count += 1,
            _ => {}
        }
    }
    if trimmed.ends_with(',') {
        count -= 1;
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    const PY: CommentSyntax = CommentSyntax {
        line: &["#"],
        doc_line: &[],
        block: &[],
        doc_block: &[],
        quotes: &['"', '\''],
        multiline_strings: &["\"\"\"", "'''"],
        docstrings: true,
        block_at_line_start: false,
    };

    #[test]
    fn test_classify_c_like() {
        let src = "/** Doc. */\nint x = 1; // trailing\n\n/* block\n still */\nchar *s = \"// not a comment\";\n";
        let c = classify(src, &CommentSyntax::C_LIKE);
        assert_eq!(
            c.kinds,
            vec![
                LineKind::Doc,
                LineKind::Code,
                LineKind::Blank,
                LineKind::Comment,
                LineKind::Comment,
                LineKind::Code,
            ]
        );
        assert!(!c.code[5].contains("not a comment"));
        assert!(c.comments[1].contains("trailing"));
    }

    #[test]
    fn test_classify_python_docstrings() {
        let src = "\"\"\"Module doc.\"\"\"\n\ndef f():\n    \"\"\"\n    Multi.\n    \"\"\"\n    x = \"\"\"not doc\"\"\"\n    # note\n    return x\n";
        let c = classify(src, &PY);
        assert_eq!(c.kinds[0], LineKind::Doc);
        assert_eq!(c.kinds[3], LineKind::Doc);
        assert_eq!(c.kinds[4], LineKind::Doc);
        assert_eq!(c.kinds[5], LineKind::Doc);
        assert_eq!(c.kinds[6], LineKind::Code);
        assert_eq!(c.kinds[7], LineKind::Comment);
        assert!(c.has_header_doc(false));
        let counts = c.line_counts();
        assert_eq!(counts.doc, 4);
        assert_eq!(counts.comment, 1);
        assert_eq!(counts.code, 3);
    }

    #[test]
    fn test_classify_never_panics_on_unterminated_input() {
        let c = classify("/* open\nx = \"open\n", &CommentSyntax::C_LIKE);
        assert_eq!(c.kinds.len(), 2);
        let c = classify("s = \"\"\"open\n", &PY);
        assert_eq!(c.kinds.len(), 1);
    }

    #[test]
    fn test_empty_block_comment_not_doc() {
        let c = classify("/**/ int x;", &CommentSyntax::C_LIKE);
        assert_eq!(c.kinds[0], LineKind::Code);
    }

    #[test]
    fn test_cases() {
        assert!(matches_case("load_config", Case::Snake));
        assert!(matches_case("__init__", Case::Snake));
        assert!(matches_case("valid?", Case::Snake));
        assert!(!matches_case("loadConfig", Case::Snake));
        assert!(matches_case("loadConfig", Case::Camel));
        assert!(matches_case("HttpServer", Case::Pascal));
        assert!(!matches_case("http_server", Case::Pascal));
        assert!(matches_case("MAX_RETRIES", Case::ScreamingSnake));
        assert!(matches_case("nav-bar__item--active", Case::Kebab));
        assert!(matches_case("$userName", Case::Camel));
        assert!(!matches_case("", Case::Camel));
    }

    #[test]
    fn test_short_names() {
        assert!(is_short("ab"));
        assert!(!is_short("i"));
        assert!(!is_short("id"));
        assert!(!is_short("name"));
        assert!(is_short("_q"));
    }

    #[test]
    fn test_style_facts() {
        let src = "fn a() {\n    if x {\n        y();\n    }\n}\nfn b()\n{\n    z(); \n}\n";
        let c = classify(src, &CommentSyntax::C_LIKE);
        let style = style_facts(src, &c);
        assert_eq!(style.indent_unit, Some(4));
        assert_eq!(style.brace_same_line, 2);
        assert_eq!(style.brace_next_line, 1);
        assert_eq!(style.trailing_whitespace, 1);
        assert!(!style.crlf);
    }

    #[test]
    fn test_markers_only_in_comments() {
        let src = "// TODO: fix\nlet todo = \"TODO\"; // FIXME later\n";
        let c = classify(src, &CommentSyntax::C_LIKE);
        let markers = count_markers(&c);
        assert_eq!(markers["TODO"], 1);
        assert_eq!(markers["FIXME"], 1);
    }

    #[test]
    fn test_magic_numbers() {
        let src = "const LIMIT = 42;\nif (x > 17) { y = 0; }\nz = items[1] * 3.5;\n";
        let c = classify(src, &CommentSyntax::C_LIKE);
        assert_eq!(count_magic_numbers(&c), 2);
    }

    #[test]
    fn test_fingerprints_ignore_layout_and_comments() {
        let a = classify("int x = 1;\n// note\n}\n    return   x;\n", &CommentSyntax::C_LIKE);
        let b = classify("int x = 1;\n\nreturn x; // done\n", &CommentSyntax::C_LIKE);
        assert_eq!(line_fingerprints(&a).len(), 2);
        assert_eq!(line_fingerprints(&a), line_fingerprints(&b));
    }

    #[test]
    fn test_count_params() {
        assert_eq!(count_params(""), 0);
        assert_eq!(count_params("void"), 0);
        assert_eq!(count_params("a, b"), 2);
        assert_eq!(count_params("Map<String, Integer> m, int n"), 2);
        assert_eq!(count_params("a,"), 1);
    }
}
