use once_cell::sync::Lazy;

use super::facts::FileFacts;
use super::pattern::{self, re, BlockStyle, Danger, LanguageRules, Visibility};
use super::text::{Case, CommentSyntax};
use super::LanguageAnalyzer;
use crate::core::{Language, SourceFile};

const SYNTAX: CommentSyntax = CommentSyntax {
    doc_line: &["///", "//!"],
    doc_block: &[("/**", "*/"), ("/*!", "*/")],
    ..CommentSyntax::C_LIKE
};

const KEYWORDS: &[&str] = &[
    "if", "else", "for", "while", "do", "switch", "case", "catch", "return", "throw", "new",
    "delete", "try", "sizeof", "static_assert", "using", "namespace", "template", "typedef",
    "goto", "co_return", "co_await",
];

static RULES: Lazy<LanguageRules> = Lazy::new(|| {
    LanguageRules {
        functions: vec![re(
            r"^\s*(?:(?:static|inline|virtual|explicit|constexpr|extern|friend)\s+)*[\w:<>,*&\s]+?[\s*&]+(?:(?:\w+::)*(?P<receiver>\w+)::)?(?P<name>~?\w+)\s*\((?P<params>[^)]*)\)?\s*(?:const\s*)?(?:noexcept\s*)?(?:override\s*)?(?:final\s*)?(?:->\s*[\w:<>]+\s*)?(?:\{|$|:)",
        )],
        classes: vec![re(
            r"^\s*(?:template\s*<[^>]*>\s*)?(?:class|struct|union|enum\s+class|enum)\s+(?:\w+\s+)?(?P<name>\w+)(?:\s*final)?\s*(?::|\{|$)",
        )],
        variables: vec![re(
            r"^\s*(?:(?:const|static|constexpr)\s+)*(?:auto|int|long|double|float|bool|char|size_t|unsigned|std::\w+(?:<[^;=]*>)?|[A-Z]\w*(?:<[^;=]*>)?)[\s*&]+(?P<name>[a-zA-Z_]\w*)\s*(?:=|;|\{)",
        )],
        function_case: &[Case::Snake, Case::Camel, Case::Pascal],
        class_case: &[Case::Pascal, Case::Snake],
        variable_case: &[Case::Snake, Case::Camel],
        visibility: Visibility::Unmarked(Some(re(r"^\s*static\b"))),
        keywords: KEYWORDS,
        branch: Some(re(r"\b(?:if|for|while|case|catch)\b|&&|\|\||\s\?\s")),
        control: Some(re(r"\b(?:if|else|switch|try|catch)\b")),
        loops: Some(re(r"\b(?:for|while|do)\b")),
        exits: Some(re(r"\b(?:return|throw)\b")),
        guard: Some(re(r"\btry\b")),
        risk: Some(re(r"\b(?:fopen|fread|fwrite|malloc|calloc|realloc|stoi|stol|stod|atoi|atof|socket|connect|recv|send)\s*\(|\bstd::(?:ifstream|ofstream|fstream)\b|\.open\s*\(")),
        checks: Some(re(r"\bthrow\b|[!=]=\s*(?:nullptr|NULL)\b|\bassert\s*\(|\bif\s*\(\s*!\s*\w+\s*\)|\.is_open\s*\(|\bstatic_assert\b")),
        test_path: Some(re(r"(?:^|/)tests?/|_test\.(?:cpp|cc|cxx)$|Test\.(?:cpp|cc|cxx)$")),
        test_function: Some(re(r"^\s*(?:TEST|TEST_F|TEST_P|TEST_CASE|BOOST_AUTO_TEST_CASE)\s*\(")),
        assertion: Some(re(r"\b(?:EXPECT|ASSERT|REQUIRE|CHECK)(?:_\w+)?\s*\(|\bassert\s*\(")),
        io: Some(re(r"\b(?:fopen|fread|fwrite|fprintf|printf|getline|recv|send)\s*\(|\bstd::(?:cout|cin|cerr)\b|\.(?:read|write|open)\s*\(")),
        concat: Some(re(r#"\+=\s*["']|\b\w+\s*=\s*\w+\s*\+\s*["']"#)),
        imports: vec![re(r#"^\s*#\s*include\s*[<"](?P<target>[^>"]+)[>"]"#)],
        ..LanguageRules::base(Language::Cpp, SYNTAX, BlockStyle::Braces)
    }
    .with_dangers(vec![
        Danger::code("buffer_overflow", r"\b(?:strcpy|strcat|sprintf|gets|scanf)\s*\("),
        Danger::code("command_injection", r"\b(?:system|popen)\s*\("),
        Danger::code("unsafe_cast", r"\breinterpret_cast\b"),
    ])
});

pub struct Cpp;

impl LanguageAnalyzer for Cpp {
    fn language(&self) -> Language {
        Language::Cpp
    }

    fn extract(&self, file: &SourceFile) -> FileFacts {
        pattern::extract(file, &RULES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WIDGET: &str = "\
#include <vector>\n\
#include \"widget.h\"\n\
\n\
/// A widget.\n\
class Widget : public Base {\n\
public:\n\
    int size() const { return items_.size(); }\n\
private:\n\
    std::vector<int> items_;\n\
};\n\
\n\
int Widget::compute(int a, int b) {\n\
    for (int i = 0; i < a; ++i) {\n\
        for (int j = 0; j < b; ++j) {\n\
            total += i * j;\n\
        }\n\
    }\n\
    return total;\n\
}\n";

    fn facts(path: &str, src: &str) -> FileFacts {
        Cpp.extract(&SourceFile::from_content(path, Language::Cpp, src))
    }

    #[test]
    fn test_out_of_line_methods() {
        let facts = facts("widget.cpp", WIDGET);
        assert_eq!(facts.classes[0].name, "Widget");
        assert_eq!(facts.classes[0].methods, 2);
        let compute = &facts.functions[1];
        assert_eq!(compute.name, "compute");
        assert_eq!(compute.params, 2);
        assert_eq!(compute.max_loop_depth, 2);
        assert_eq!(facts.imports, ["vector", "widget.h"]);
        assert_eq!(facts.docs.public_symbols, 3);
        assert_eq!(facts.docs.documented_symbols, 1);
    }

    #[test]
    fn test_unsafe_c_calls() {
        let src = "void copy(char *dst, const char *src) {\n    strcpy(dst, src);\n    system(cmd);\n}\n";
        let facts = facts("copy.c.cpp", src);
        assert_eq!(facts.security.get("buffer_overflow"), Some(&1));
        assert_eq!(facts.security.get("command_injection"), Some(&1));
    }

    #[test]
    fn test_gtest_cases() {
        let src = "TEST(Widget, Size) {\n    EXPECT_EQ(w.size(), 0);\n    ASSERT_TRUE(ok);\n}\n";
        let facts = facts("tests/widget_test.cpp", src);
        assert!(facts.tests.is_test_file);
        assert_eq!(facts.tests.test_functions, 1);
        assert_eq!(facts.tests.assertions, 2);
    }
}
