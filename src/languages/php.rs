use once_cell::sync::Lazy;

use super::facts::FileFacts;
use super::pattern::{self, re, BlockStyle, Danger, LanguageRules, Visibility};
use super::text::{Case, CommentSyntax};
use super::LanguageAnalyzer;
use crate::core::{Language, SourceFile};

const SYNTAX: CommentSyntax = CommentSyntax {
    line: &["//", "#"],
    doc_line: &[],
    ..CommentSyntax::C_LIKE
};

const KEYWORDS: &[&str] = &[
    "if", "else", "elseif", "for", "foreach", "while", "do", "switch", "case", "catch", "return",
    "throw", "new", "try", "finally", "echo", "print", "include", "require", "use", "namespace",
    "fn", "match", "this",
];

static RULES: Lazy<LanguageRules> = Lazy::new(|| {
    LanguageRules {
        functions: vec![re(
            r"^\s*(?:(?:public|private|protected|static|final|abstract)\s+)*function\s+&?(?P<name>\w+)\s*\((?P<params>[^)]*)",
        )],
        classes: vec![re(
            r"^\s*(?:(?:abstract|final|readonly)\s+)*(?:class|interface|trait|enum)\s+(?P<name>\w+)",
        )],
        variables: vec![re(r"\$(?P<name>[a-zA-Z_]\w*)\s*=[^=>]")],
        function_case: &[Case::Camel, Case::Snake],
        class_case: &[Case::Pascal],
        variable_case: &[Case::Camel, Case::Snake],
        visibility: Visibility::Unmarked(Some(re(r"\b(?:private|protected)\b"))),
        keywords: KEYWORDS,
        branch: Some(re(r"\b(?:if|elseif|for|foreach|while|case|catch|and|or)\b|&&|\|\||\?\?|\s\?\s")),
        control: Some(re(r"\b(?:if|else|elseif|switch|try|catch|finally)\b")),
        loops: Some(re(r"\b(?:for|foreach|while|do)\b")),
        exits: Some(re(r"\b(?:return|throw|exit|die)\b")),
        guard: Some(re(r"\btry\b")),
        risk: Some(re(r"\b(?:file_get_contents|file_put_contents|fopen|fread|fwrite|curl_exec|json_decode|unserialize|mysqli_query|mysql_query)\s*\(|->(?:query|prepare|execute|request)\s*\(")),
        checks: Some(re(r"\bthrow\s+new\b|\b(?:isset|empty|is_null|is_numeric|is_array|is_string|filter_var)\s*\(|[!=]==?\s*null\b|\binstanceof\b")),
        test_path: Some(re(r"(?:^|/)tests?/|Test\.php$")),
        test_function: Some(re(r"^\s*(?:public\s+)?function\s+test\w*\s*\(")),
        assertion: Some(re(r"\$this->assert\w+\s*\(|\bself::assert\w+\s*\(|\bexpect\s*\(")),
        io: Some(re(r"\b(?:file_get_contents|file_put_contents|fopen|fread|fwrite|curl_exec|mysqli_query|echo|print)\b|->(?:query|execute)\s*\(")),
        concat: Some(re(r#"\.=\s*["'$]"#)),
        imports: vec![
            re(r"^\s*use\s+(?P<target>[\w\\]+)"),
            re(r#"^\s*(?:require|include)(?:_once)?\s*\(?\s*["'](?P<target>[^"']+)["']"#),
        ],
        ..LanguageRules::base(Language::Php, SYNTAX, BlockStyle::Braces)
    }
    .with_dangers(vec![
        Danger::code("eval", r"\beval\s*\("),
        Danger::code("command_injection", r"\b(?:exec|shell_exec|system|passthru|proc_open|popen)\s*\("),
        Danger::code("unsafe_deserialization", r"\bunserialize\s*\("),
        Danger::code("file_inclusion", r"\b(?:include|require)(?:_once)?\s*\(?\s*\$"),
        Danger::code("xss", r"\b(?:echo|print)\s+\$_(?:GET|POST|REQUEST|COOKIE)\b"),
    ])
});

pub struct Php;

impl LanguageAnalyzer for Php {
    fn language(&self) -> Language {
        Language::Php
    }

    fn extract(&self, file: &SourceFile) -> FileFacts {
        pattern::extract(file, &RULES)
    }
}
