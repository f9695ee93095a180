use once_cell::sync::Lazy;

use super::facts::FileFacts;
use super::pattern::{self, re, BlockStyle, Danger, LanguageRules, Visibility};
use super::text::{Case, CommentSyntax};
use super::LanguageAnalyzer;
use crate::core::{Language, SourceFile};

const SYNTAX: CommentSyntax = CommentSyntax {
    doc_line: &[],
    doc_block: &[],
    quotes: &['"', '\''],
    multiline_strings: &["`"],
    ..CommentSyntax::C_LIKE
};

const KEYWORDS: &[&str] = &[
    "if", "else", "for", "switch", "case", "select", "return", "go", "defer", "range",
];

static RULES: Lazy<LanguageRules> = Lazy::new(|| {
    LanguageRules {
        functions: vec![
            re(r"^\s*func\s+\(\s*\w*\s*\*?(?P<receiver>\w+)(?:\[[^\]]*\])?\s*\)\s*(?P<name>\w+)\s*(?:\[[^\]]*\])?\s*\((?P<params>[^)]*)"),
            re(r"^\s*func\s+(?P<name>\w+)\s*(?:\[[^\]]*\])?\s*\((?P<params>[^)]*)"),
        ],
        classes: vec![re(r"^\s*type\s+(?P<name>\w+)\s*(?:\[[^\]]*\])?\s+(?:struct|interface)\b")],
        variables: vec![
            re(r"^\s*(?P<name>[a-zA-Z_]\w*(?:\s*,\s*[a-zA-Z_]\w*)*)\s*:="),
            re(r"^\s*(?:var|const)\s+(?P<name>[a-zA-Z_]\w*)"),
        ],
        function_case: &[Case::Camel, Case::Pascal],
        class_case: &[Case::Pascal, Case::Camel],
        variable_case: &[Case::Camel],
        visibility: Visibility::Capitalized,
        // Go doc comments are plain `//` comments directly above the symbol.
        comments_document: true,
        keywords: KEYWORDS,
        branch: Some(re(r"\b(?:if|for|case|select)\b|&&|\|\|")),
        control: Some(re(r"\b(?:if|else|switch|select|case|default)\b")),
        loops: Some(re(r"\bfor\b")),
        exits: Some(re(r"\b(?:return|panic)\b")),
        risk: Some(re(r"\b(?:os\.(?:Open|Create|ReadFile|WriteFile)|ioutil\.\w+|io\.ReadAll|http\.(?:Get|Post|NewRequest)|json\.(?:Unmarshal|Marshal)|strconv\.(?:Atoi|Parse\w+)|sql\.Open)\s*\(|\.(?:Query|QueryRow|Exec|Do|Dial|Scan)\s*\(")),
        checks: Some(re(r"\bif\s+(?:[^{]*;\s*)?err\s*!=\s*nil\b|\berrors\.(?:Is|As)\s*\(|\bif\s+!ok\b")),
        test_path: Some(re(r"_test\.go$")),
        test_function: Some(re(r"^\s*func\s+(?:Test|Benchmark|Fuzz)\w*\s*\(")),
        assertion: Some(re(r"\bt\.(?:Error|Errorf|Fatal|Fatalf|Fail)\s*\(|\b(?:assert|require)\.\w+\s*\(")),
        io: Some(re(r"\b(?:os\.(?:Open|Create|ReadFile|WriteFile)|http\.(?:Get|Post)|fmt\.Print\w*)\s*\(|\.(?:Query|QueryRow|Exec|Do|Write|Read)\s*\(")),
        concat: Some(re(r#"\+=\s*["`]|\b\w+\s*=\s*\w+\s*\+\s*["`]"#)),
        imports: vec![
            re(r#"^\s*import\s+(?:\w+\s+)?"(?P<target>[^"]+)""#),
            re(r#"^\s*(?:[\w.]+\s+)?"(?P<target>[^"]+)"\s*$"#),
        ],
        ..LanguageRules::base(Language::Go, SYNTAX, BlockStyle::Braces)
    }
    .with_dangers(vec![
        Danger::code("unsafe_pointer", r"\bunsafe\.Pointer\b"),
        Danger::code("command_injection", r"\bexec\.Command\s*\(\s*(?:\w+\s*,|\w+\s*\.\.\.)"),
        Danger::code("weak_crypto", r"\b(?:md5|sha1|des)\.New\b|\bmath/rand\b"),
        Danger::raw("tls_skip_verify", r"InsecureSkipVerify:\s*true"),
    ])
});

pub struct Go;

impl LanguageAnalyzer for Go {
    fn language(&self) -> Language {
        Language::Go
    }

    fn extract(&self, file: &SourceFile) -> FileFacts {
        pattern::extract(file, &RULES)
    }
}
