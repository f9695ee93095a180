//! JavaScript rules, also the base of the TypeScript variant.

use once_cell::sync::Lazy;

use super::facts::FileFacts;
use super::pattern::{self, re, BlockStyle, Danger, LanguageRules};
use super::text::{Case, CommentSyntax};
use super::LanguageAnalyzer;
use crate::core::{Language, SourceFile};

pub(super) const SYNTAX: CommentSyntax = CommentSyntax {
    multiline_strings: &["`"],
    doc_line: &[],
    ..CommentSyntax::C_LIKE
};

pub(super) const KEYWORDS: &[&str] = &[
    "if", "else", "for", "while", "do", "switch", "case", "catch", "return", "throw", "new",
    "typeof", "await", "yield", "try", "finally", "delete", "void", "super", "import",
];

/// Rules shared by JavaScript and TypeScript.
pub(super) fn ecmascript_rules(language: Language) -> LanguageRules {
    LanguageRules {
        functions: vec![
            re(r"^\s*(?:export\s+)?(?:default\s+)?(?:async\s+)?function\s*\*?\s*(?P<name>[\w$]+)\s*(?:<[^>]*>)?\s*\((?P<params>[^)]*)"),
            re(r"^\s*(?:export\s+)?(?:const|let|var)\s+(?P<name>[\w$]+)\s*(?::[^=]+)?=\s*(?:async\s+)?function\b\s*\*?\s*[\w$]*\s*\((?P<params>[^)]*)"),
            re(r"^\s*(?:export\s+)?(?:const|let|var)\s+(?P<name>[\w$]+)\s*(?::[^=]+)?=\s*(?:async\s+)?\((?P<params>[^)]*)\)\s*(?::\s*[^=]+?)?\s*=>"),
            re(r"^\s*(?:export\s+)?(?:const|let|var)\s+(?P<name>[\w$]+)\s*=\s*(?:async\s+)?(?P<params>[\w$]+)\s*=>"),
            re(r"^\s*(?:(?:public|private|protected|static|readonly|async|abstract|override|get|set)\s+)*\*?(?P<name>#?[\w$]+)\s*(?:<[^>]*>)?\s*\((?P<params>[^()]*)\)\s*(?::\s*[^{]+)?\{"),
        ],
        classes: vec![re(r"^\s*(?:export\s+)?(?:default\s+)?(?:abstract\s+)?class\s+(?P<name>[\w$]+)")],
        variables: vec![re(r"\b(?:const|let|var)\s+(?P<name>[\w$]+)")],
        function_case: &[Case::Camel, Case::Pascal],
        class_case: &[Case::Pascal],
        variable_case: &[Case::Camel, Case::Pascal],
        keywords: KEYWORDS,
        branch: Some(re(r"\b(?:if|for|while|case|catch)\b|&&|\|\||\?\?|\s\?\s")),
        control: Some(re(r"\b(?:if|else|switch|try|catch|finally)\b")),
        loops: Some(re(r"\b(?:for|while|do)\b|\.(?:forEach|map|filter|reduce)\s*\(")),
        exits: Some(re(r"\b(?:return|throw)\b")),
        guard: Some(re(r"\btry\b")),
        risk: Some(re(r"\b(?:fetch|axios(?:\.\w+)?|JSON\.parse|readFileSync|readFile|writeFileSync|writeFile|parseInt|parseFloat)\s*\(|\.(?:query|send|connect|request)\s*\(")),
        checks: Some(re(r"\bthrow\b|\.catch\s*\(|\bif\s*\(\s*!?\s*(?:err|error)\b|\btypeof\s+[\w$.]+\s*[!=]==|[!=]==?\s*(?:null|undefined)\b|\binstanceof\b")),
        test_path: Some(re(r"(?i)\.(?:test|spec)\.m?[jt]sx?$|(?:^|/)(?:__tests__|tests?)/")),
        test_function: Some(re(r#"\b(?:it|test)\s*\(\s*["'`]"#)),
        assertion: Some(re(r"\bexpect\s*\(|\bassert(?:\.\w+)?\s*\(|\.should\b")),
        io: Some(re(r"\b(?:fetch|axios|readFileSync|readFile|writeFileSync|writeFile|appendFileSync)\s*\(|\.(?:query|send|request)\s*\(")),
        concat: Some(re(r#"\+=\s*["'`]|[\w$]+\s*=\s*[\w$]+\s*\+\s*["'`]"#)),
        imports: vec![
            re(r#"^\s*import\s+(?:[^'"]*\s+from\s+)?["'](?P<target>[^"']+)["']"#),
            re(r#"\brequire\s*\(\s*["'](?P<target>[^"']+)["']\s*\)"#),
            re(r#"^\s*export\s+[^'"]*\s+from\s+["'](?P<target>[^"']+)["']"#),
        ],
        ..LanguageRules::base(language, SYNTAX, BlockStyle::Braces)
    }
    .with_dangers(vec![
        Danger::code("eval", r"\beval\s*\("),
        Danger::code("dynamic_code", r#"\bnew\s+Function\s*\(|\bset(?:Timeout|Interval)\s*\(\s*["']"#),
        Danger::code("xss", r"\.(?:innerHTML|outerHTML)\s*=|\bdocument\.write\s*\(|\bdangerouslySetInnerHTML\b"),
        Danger::code("command_injection", r"\bchild_process\.exec\s*\(|\bexecSync\s*\("),
    ])
}

static RULES: Lazy<LanguageRules> = Lazy::new(|| ecmascript_rules(Language::JavaScript));

pub struct JavaScript;

impl LanguageAnalyzer for JavaScript {
    fn language(&self) -> Language {
        Language::JavaScript
    }

    fn extract(&self, file: &SourceFile) -> FileFacts {
        pattern::extract(file, &RULES)
    }
}
