use once_cell::sync::Lazy;

use super::facts::FileFacts;
use super::pattern::{self, re, BlockStyle, Danger, LanguageRules, Visibility};
use super::text::{Case, CommentSyntax};
use super::LanguageAnalyzer;
use crate::core::{Language, SourceFile};

const SYNTAX: CommentSyntax = CommentSyntax {
    multiline_strings: &["\"\"\""],
    ..CommentSyntax::C_LIKE
};

const KEYWORDS: &[&str] = &[
    "if", "else", "for", "foreach", "while", "do", "switch", "case", "catch", "return", "throw",
    "new", "try", "finally", "using", "lock", "await", "yield", "base", "this", "nameof", "typeof",
];

static RULES: Lazy<LanguageRules> = Lazy::new(|| {
    LanguageRules {
        functions: vec![re(
            r"^\s*(?:\[[^\]]*\]\s*)*(?:(?:public|private|protected|internal|static|virtual|override|abstract|sealed|async|extern|partial|new|unsafe)\s+)*[\w<>\[\],.?()\s]+?\s+(?P<name>\w+)\s*(?:<[^>]+>)?\s*\((?P<params>[^)]*)\)?\s*(?:where\s+[^{]+)?(?:\{|=>|$)",
        )],
        classes: vec![re(
            r"^\s*(?:(?:public|private|protected|internal|static|abstract|sealed|partial|readonly)\s+)*(?:class|interface|struct|enum|record)\s+(?P<name>\w+)",
        )],
        variables: vec![re(
            r"^\s*(?:var|int|long|double|float|bool|string|decimal|char|byte|object|[A-Z][\w<>\[\],?]*)\s+(?P<name>[a-zA-Z_]\w*)\s*(?:=|;)",
        )],
        function_case: &[Case::Pascal],
        class_case: &[Case::Pascal],
        variable_case: &[Case::Camel, Case::Pascal],
        visibility: Visibility::Marked(re(r"\b(?:public|protected|internal)\b")),
        keywords: KEYWORDS,
        branch: Some(re(r"\b(?:if|for|foreach|while|case|catch)\b|&&|\|\||\?\?|\s\?\s")),
        control: Some(re(r"\b(?:if|else|switch|try|catch|finally|using|lock)\b")),
        loops: Some(re(r"\b(?:for|foreach|while|do)\b")),
        exits: Some(re(r"\b(?:return|throw)\b")),
        guard: Some(re(r"\btry\b")),
        risk: Some(re(r"\b(?:File\.\w+|Directory\.\w+|int\.Parse|long\.Parse|double\.Parse|Convert\.To\w+|JsonSerializer\.Deserialize|JsonConvert\.DeserializeObject)\s*[(<]|\.(?:GetAsync|PostAsync|SendAsync|ExecuteReader|ExecuteNonQuery|ExecuteScalar|Open|ReadToEnd)\s*\(")),
        checks: Some(re(r"\bthrow\s+new\b|\bArgumentNullException\.ThrowIfNull\s*\(|[!=]=\s*null\b|\bis\s+(?:not\s+)?null\b|\bTryParse\s*\(|\bstring\.IsNullOrEmpty\s*\(")),
        test_path: Some(re(r"(?:Tests?|Spec)\.cs$|(?:^|/)[\w.]*Tests?/")),
        test_function: Some(re(r"^\s*\[(?:Test|Fact|Theory|TestMethod|TestCase)\b")),
        assertion: Some(re(r"\bAssert\.\w+\s*\(|\.Should\(\)")),
        io: Some(re(r"\b(?:File|Directory|Console)\.\w+\s*\(|\.(?:GetAsync|PostAsync|SendAsync|ExecuteReader|ExecuteNonQuery|ExecuteScalar|ReadToEnd|Write|WriteLine)\s*\(")),
        concat: Some(re(r#"\+=\s*\$?["']|\b\w+\s*=\s*\w+\s*\+\s*\$?["']"#)),
        imports: vec![re(r"^\s*using\s+(?:static\s+)?(?P<target>[A-Z][\w.]*)\s*;")],
        ..LanguageRules::base(Language::CSharp, SYNTAX, BlockStyle::Braces)
    }
    .with_dangers(vec![
        Danger::code("unsafe_deserialization", r"\bBinaryFormatter\b|\bTypeNameHandling\.(?:All|Auto|Objects)\b"),
        Danger::code("command_injection", r"\bProcess\.Start\s*\("),
        Danger::code("unsafe_code", r"\bunsafe\s*\{|\bunsafe\s+\w"),
        Danger::code("dynamic_sql", r#"\bnew\s+SqlCommand\s*\(\s*\$""#),
    ])
});

pub struct CSharp;

impl LanguageAnalyzer for CSharp {
    fn language(&self) -> Language {
        Language::CSharp
    }

    fn extract(&self, file: &SourceFile) -> FileFacts {
        pattern::extract(file, &RULES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn facts(path: &str, src: &str) -> FileFacts {
        CSharp.extract(&SourceFile::from_content(path, Language::CSharp, src))
    }

    #[test]
    fn test_allman_braces_and_xml_docs() {
        let src = "\
using System.IO;\n\
\n\
namespace Acme\n\
{\n\
    /// <summary>Reads files.</summary>\n\
    public class FileReader\n\
    {\n\
        /// <summary>Load.</summary>\n\
        public string Load(string path)\n\
        {\n\
            try\n\
            {\n\
                return File.ReadAllText(path);\n\
            }\n\
            catch (IOException)\n\
            {\n\
                return null;\n\
            }\n\
        }\n\
    }\n\
}\n";
        let facts = facts("FileReader.cs", src);
        assert_eq!(facts.classes[0].name, "FileReader");
        assert_eq!(facts.classes[0].methods, 1);
        assert_eq!(facts.functions[0].name, "Load");
        assert_eq!(facts.docs.public_symbols, 2);
        assert_eq!(facts.docs.documented_symbols, 2);
        assert_eq!(facts.errors.risk, 1);
        assert_eq!(facts.errors.guarded, 1);
        assert_eq!(facts.style.brace_next_line, 5);
        assert_eq!(facts.imports, ["System.IO"]);
        assert_eq!(facts.naming.conventional, facts.naming.total);
    }

    #[test]
    fn test_xunit_facts() {
        let src = "public class LoaderTests\n{\n    [Fact]\n    public void LoadsFile()\n    {\n        Assert.Equal(1, 1);\n    }\n}\n";
        let facts = facts("tests/LoaderTests.cs", src);
        assert!(facts.tests.is_test_file);
        assert_eq!(facts.tests.test_functions, 1);
        assert_eq!(facts.tests.assertions, 1);
    }
}
