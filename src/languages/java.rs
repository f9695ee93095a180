use once_cell::sync::Lazy;

use super::facts::FileFacts;
use super::pattern::{self, re, BlockStyle, Danger, LanguageRules, Visibility};
use super::text::{Case, CommentSyntax};
use super::LanguageAnalyzer;
use crate::core::{Language, SourceFile};

const KEYWORDS: &[&str] = &[
    "if", "else", "for", "while", "do", "switch", "case", "catch", "return", "throw", "new",
    "try", "finally", "synchronized", "assert", "super", "this",
];

static RULES: Lazy<LanguageRules> = Lazy::new(|| {
    LanguageRules {
        functions: vec![re(
            r"^\s*(?:@\w+\s+)*(?:(?:public|private|protected|static|final|abstract|synchronized|native|default)\s+)*(?:<[^>]+>\s+)?[\w<>\[\],.?\s]+?\s+(?P<name>\w+)\s*\((?P<params>[^)]*)\)?\s*(?:throws\s+[\w.,\s]+)?\s*(?:\{|$)",
        )],
        classes: vec![re(
            r"^\s*(?:(?:public|private|protected|static|final|abstract|sealed)\s+)*(?:class|interface|enum|record)\s+(?P<name>\w+)",
        )],
        variables: vec![re(
            r"^\s*(?:(?:private|protected|public|static|final)\s+)*(?:[A-Z][\w<>\[\],?\s]*|int|long|double|float|boolean|char|byte|short|var)\s+(?P<name>[a-zA-Z_]\w*)\s*(?:=|;)",
        )],
        function_case: &[Case::Camel],
        class_case: &[Case::Pascal],
        variable_case: &[Case::Camel],
        visibility: Visibility::Marked(re(r"\b(?:public|protected)\b")),
        keywords: KEYWORDS,
        branch: Some(re(r"\b(?:if|for|while|case|catch)\b|&&|\|\||\s\?\s")),
        control: Some(re(r"\b(?:if|else|switch|try|catch|finally|synchronized)\b")),
        loops: Some(re(r"\b(?:for|while|do)\b|\.forEach\s*\(")),
        exits: Some(re(r"\b(?:return|throw)\b")),
        guard: Some(re(r"\btry\b")),
        risk: Some(re(r"\bnew\s+(?:File(?:Input|Output)Stream|FileReader|FileWriter|Socket|URL)\s*\(|\b(?:Files\.\w+|Integer\.parseInt|Long\.parseLong|Double\.parseDouble|Class\.forName)\s*\(|\.(?:executeQuery|executeUpdate|execute|openConnection|connect|readLine|getConnection)\s*\(")),
        checks: Some(re(r"\bthrow\s+new\b|\bObjects\.requireNonNull\s*\(|[!=]=\s*null\b|\binstanceof\b|\bOptional\.")),
        test_path: Some(re(r"(?:^|/)src/test/|(?:Test|Tests|IT)\.java$")),
        test_function: Some(re(r"^\s*@(?:Test|ParameterizedTest|RepeatedTest)\b")),
        assertion: Some(re(r"\bassert\w*\s*\(|\bverify\s*\(|\bassertThat\s*\(")),
        io: Some(re(r"\bnew\s+(?:File\w*|Socket|URL)\s*\(|\bFiles\.\w+\s*\(|\.(?:executeQuery|executeUpdate|execute|readLine|write|openConnection)\s*\(|\bSystem\.out\.print")),
        concat: Some(re(r#"\+=\s*["']|\b\w+\s*=\s*\w+\s*\+\s*["']"#)),
        imports: vec![re(r"^\s*import\s+(?:static\s+)?(?P<target>[\w.]+(?:\.\*)?)\s*;")],
        ..LanguageRules::base(Language::Java, CommentSyntax::C_LIKE, BlockStyle::Braces)
    }
    .with_dangers(vec![
        Danger::code("command_injection", r"\bRuntime\.getRuntime\(\)\.exec\s*\(|\bnew\s+ProcessBuilder\s*\("),
        Danger::code("unsafe_deserialization", r"\bnew\s+ObjectInputStream\s*\(|\.readObject\s*\("),
        Danger::code("reflection", r"\bClass\.forName\s*\(|\.setAccessible\s*\(\s*true"),
        Danger::code("weak_crypto", r#"MessageDigest\.getInstance\s*\(\s*""\s*\)|\bDES\b|\bnew\s+Random\s*\("#),
    ])
});

pub struct Java;

impl LanguageAnalyzer for Java {
    fn language(&self) -> Language {
        Language::Java
    }

    fn extract(&self, file: &SourceFile) -> FileFacts {
        pattern::extract(file, &RULES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn facts(path: &str, src: &str) -> FileFacts {
        Java.extract(&SourceFile::from_content(path, Language::Java, src))
    }

    #[test]
    fn test_class_with_methods() {
        let src = "\
package com.acme;\n\
\n\
import java.util.List;\n\
\n\
/** Orders. */\n\
public class OrderService {\n\
    private final List<String> orders;\n\
\n\
    /** Count. */\n\
    public int count() {\n\
        return orders.size();\n\
    }\n\
\n\
    private void reset(int a, String b) throws IOException {\n\
        for (String o : orders) {\n\
            if (o == null) {\n\
                throw new IllegalStateException();\n\
            }\n\
        }\n\
    }\n\
}\n";
        let facts = facts("src/main/java/OrderService.java", src);
        assert_eq!(facts.classes.len(), 1);
        assert_eq!(facts.classes[0].methods, 2);
        assert_eq!(facts.functions[1].name, "reset");
        assert_eq!(facts.functions[1].params, 2);
        assert_eq!(facts.functions[1].max_nesting, 2);
        // OrderService and count are public; reset is private.
        assert_eq!(facts.docs.public_symbols, 2);
        assert_eq!(facts.docs.documented_symbols, 2);
        assert_eq!(facts.imports, ["java.util.List"]);
        assert!(!facts.tests.is_test_file);
    }

    #[test]
    fn test_junit_tests() {
        let src = "class OrderServiceTest {\n    @Test\n    void countsOrders() {\n        assertEquals(1, service.count());\n        assertTrue(ok);\n    }\n}\n";
        let facts = facts("src/test/java/OrderServiceTest.java", src);
        assert!(facts.tests.is_test_file);
        assert_eq!(facts.tests.test_functions, 1);
        assert_eq!(facts.tests.assertions, 2);
    }

    #[test]
    fn test_deserialization_flagged() {
        let src = "class A {\n    Object load(InputStream in) {\n        return new ObjectInputStream(in).readObject();\n    }\n}\n";
        let facts = facts("A.java", src);
        assert_eq!(facts.security.get("unsafe_deserialization"), Some(&2));
    }
}
