use once_cell::sync::Lazy;

use super::facts::FileFacts;
use super::pattern::{self, re, BlockStyle, Danger, LanguageRules, Visibility};
use super::text::{Case, CommentSyntax};
use super::LanguageAnalyzer;
use crate::core::{Language, SourceFile};

const SYNTAX: CommentSyntax = CommentSyntax {
    quotes: &['"'],
    multiline_strings: &["\"\"\""],
    ..CommentSyntax::C_LIKE
};

const KEYWORDS: &[&str] = &[
    "if", "else", "for", "while", "repeat", "switch", "case", "catch", "return", "throw", "guard",
    "defer", "do", "try", "await", "let", "var", "import", "where", "in",
];

const MODIFIERS: &str =
    r"(?:(?:public|private|fileprivate|internal|open|static|class|final|override|mutating|nonmutating|convenience|required|@\w+(?:\([^)]*\))?)\s+)*";

static RULES: Lazy<LanguageRules> = Lazy::new(|| {
    LanguageRules {
        functions: vec![
            re(&format!(
                r"^\s*{MODIFIERS}func\s+(?P<name>\w+)\s*(?:<[^>]*>)?\s*\((?P<params>[^)]*)"
            )),
            re(&format!(r"^\s*{MODIFIERS}(?P<name>init)\??\s*\((?P<params>[^)]*)")),
        ],
        classes: vec![re(&format!(
            r"^\s*{MODIFIERS}(?:class|struct|enum|protocol|extension|actor)\s+(?P<name>\w+)\s*(?:<[^>]*>)?\s*(?::|\{{|$|where\b)"
        ))],
        variables: vec![re(r"\b(?:let|var)\s+(?P<name>\w+)")],
        function_case: &[Case::Camel],
        class_case: &[Case::Pascal],
        variable_case: &[Case::Camel],
        visibility: Visibility::Unmarked(Some(re(r"\b(?:private|fileprivate)\b"))),
        keywords: KEYWORDS,
        branch: Some(re(r"\b(?:if|guard|for|while|case|catch)\b|&&|\|\||\?\?|\s\?\s")),
        control: Some(re(r"\b(?:if|else|guard|switch|do|catch|defer)\b")),
        loops: Some(re(r"\b(?:for|while|repeat)\b|\.forEach\s*\{")),
        exits: Some(re(r"\b(?:return|throw)\b")),
        guard: Some(re(r"\bdo\b")),
        risk: Some(re(r"\btry\s|\bURLSession\.shared\.\w+\s*\(")),
        checks: Some(re(r"\b(?:guard|throw|precondition|assert)\b|\btry\?|[!=]=\s*nil\b|\bif\s+let\b")),
        test_path: Some(re(r"Tests?\.swift$|(?:^|/)\w*Tests/")),
        test_function: Some(re(r"^\s*func\s+test\w*\s*\(|^\s*@Test\b")),
        assertion: Some(re(r"\bXCTAssert\w*\s*\(|#expect\s*\(")),
        io: Some(re(r"\b(?:print|URLSession\.\w+|FileManager\.\w+)\b|\.(?:write|dataTask)\s*\(")),
        concat: Some(re(r#"\+=\s*"|\b\w+\s*=\s*\w+\s*\+\s*""#)),
        imports: vec![re(
            r"^\s*(?:@testable\s+)?import\s+(?:(?:class|struct|func|enum|protocol)\s+)?(?P<target>[\w.]+)",
        )],
        ..LanguageRules::base(Language::Swift, SYNTAX, BlockStyle::Braces)
    }
    .with_dangers(vec![
        Danger::code("force_try", r"\btry!"),
        Danger::code("force_cast", r"\bas!"),
        Danger::code("unsafe_pointer", r"\bUnsafe(?:Mutable)?(?:Raw)?(?:Buffer)?Pointer\b"),
    ])
});

pub struct Swift;

impl LanguageAnalyzer for Swift {
    fn language(&self) -> Language {
        Language::Swift
    }

    fn extract(&self, file: &SourceFile) -> FileFacts {
        pattern::extract(file, &RULES)
    }
}
