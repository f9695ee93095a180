//! Python: structural analysis over the tree-sitter syntax tree, with the
//! pattern rules as fallback when the file does not parse cleanly.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;
use tree_sitter::Node;

use super::facts::{ClassFacts, FileFacts, FunctionFacts, NamingFacts};
use super::pattern::{self, re, BlockStyle, Danger, DocPosition, LanguageRules, SECRET, SQL_CONCAT};
use super::text::{self, Case, Classified, CommentSyntax};
use super::LanguageAnalyzer;
use crate::core::{Language, SourceFile};
use crate::parser::{ParseResult, Parser};

const SYNTAX: CommentSyntax = CommentSyntax {
    line: &["#"],
    doc_line: &[],
    block: &[],
    doc_block: &[],
    quotes: &['"', '\''],
    multiline_strings: &["\"\"\"", "'''"],
    docstrings: true,
    block_at_line_start: false,
};

const KEYWORDS: &[&str] = &[
    "if", "elif", "else", "for", "while", "try", "except", "finally", "with", "return", "raise",
    "yield", "import", "from", "pass", "lambda", "assert", "del", "global", "nonlocal", "await",
    "match", "case", "print", "self", "cls",
];

const FUNCTION_CASES: &[Case] = &[Case::Snake];
const CLASS_CASES: &[Case] = &[Case::Pascal];
const VARIABLE_CASES: &[Case] = &[Case::Snake, Case::ScreamingSnake];

const RISK: &str = r"^(?:open|int|float|input|urlopen|requests\.\w+|httpx\.\w+|json\.loads?|yaml\.(?:safe_)?load|pickle\.loads?|subprocess\.\w+|urllib\.request\.\w+|socket\.\w+|os\.(?:remove|rename|makedirs|mkdir|listdir)|shutil\.\w+)$|\.(?:read|write|connect|execute|executemany|fetchall|fetchone|urlopen)$";
const IO: &str = r"^(?:print|open|input|urlopen|requests\.\w+|httpx\.\w+)$|\.(?:read|readline|readlines|write|execute|fetchall|fetchone|send|recv|commit)$";

static RISK_CALL: Lazy<Regex> = Lazy::new(|| re(RISK));
static IO_CALL: Lazy<Regex> = Lazy::new(|| re(IO));
static IS_NONE: Lazy<Regex> = Lazy::new(|| re(r"\bis\s+(?:not\s+)?None\b"));
static TEST_PATH: Lazy<Regex> = Lazy::new(|| re(r"(?:^|/)test_[^/]*\.py$|_test\.py$|(?:^|/)tests?/"));
static ASSERT_CALL: Lazy<Regex> = Lazy::new(|| re(r"^self\.assert\w+$|^pytest\.raises$"));

/// Pattern rules used when the tree has syntax errors.
static FALLBACK: Lazy<LanguageRules> = Lazy::new(|| {
    LanguageRules {
        functions: vec![re(r"^\s*(?:async\s+)?def\s+(?P<name>\w+)\s*\((?P<params>[^)]*)")],
        classes: vec![re(r"^\s*class\s+(?P<name>\w+)")],
        variables: vec![re(r"^\s*(?P<name>[A-Za-z_]\w*(?:\s*,\s*[A-Za-z_]\w*)*)\s*(?::[^=]+)?=[^=]")],
        function_case: FUNCTION_CASES,
        class_case: CLASS_CASES,
        variable_case: VARIABLE_CASES,
        doc_position: DocPosition::After,
        keywords: KEYWORDS,
        branch: Some(re(r"\b(?:if|elif|for|while|except|and|or)\b")),
        control: Some(re(r"^\s*(?:if|elif|else|try|except|finally|with|match|case)\b")),
        loops: Some(re(r"^\s*(?:async\s+)?(?:for|while)\b")),
        exits: Some(re(r"\b(?:return|raise)\b")),
        guard: Some(re(r"^\s*try\b")),
        risk: Some(re(r"\b(?:open|requests\.\w+|json\.loads?|subprocess\.\w+|urlopen)\s*\(|\.(?:read|write|connect|execute)\s*\(")),
        checks: Some(re(r"\b(?:raise|assert|isinstance)\b|\bis\s+(?:not\s+)?None\b")),
        test_path: Some(TEST_PATH.clone()),
        test_function: Some(re(r"^\s*(?:async\s+)?def\s+test\w*")),
        assertion: Some(re(r"\bassert\b|\bself\.assert\w+\s*\(|\bpytest\.raises\b")),
        io: Some(re(r"\b(?:print|open|input|urlopen|requests\.\w+)\s*\(|\.(?:read|write|execute|send|recv)\s*\(")),
        concat: Some(re(r#"\+=\s*[fFrRbB]?["']"#)),
        imports: vec![
            re(r"^\s*import\s+(?P<target>[\w.]+)"),
            re(r"^\s*from\s+(?P<target>\.*[\w.]*)\s+import\b"),
        ],
        ..LanguageRules::base(Language::Python, SYNTAX, BlockStyle::Indentation)
    }
    .with_dangers(vec![
        Danger::code("eval", r"\b(?:eval|exec)\s*\("),
        Danger::code("command_injection", r"\bos\.(?:system|popen)\s*\(|\bshell\s*=\s*True\b"),
        Danger::code("unsafe_deserialization", r"\b(?:pickle|marshal)\.loads?\s*\("),
        Danger::code("weak_crypto", r"\bhashlib\.(?:md5|sha1)\s*\("),
    ])
});

/// Python analyzer. Holds the parser pool shared by every worker.
pub struct Python {
    parser: Parser,
}

impl Python {
    pub fn new() -> Self {
        Self {
            parser: Parser::new(),
        }
    }
}

impl Default for Python {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageAnalyzer for Python {
    fn language(&self) -> Language {
        Language::Python
    }

    fn extract(&self, file: &SourceFile) -> FileFacts {
        let classified = text::classify(&file.content, &SYNTAX);
        match self.parser.parse_source(file) {
            Ok(tree) if !tree.has_errors() => structural(file, &tree, &classified),
            Ok(_) => {
                warn!(path = %file.key(), "syntax errors, using pattern rules");
                fallback(file, &classified)
            }
            Err(e) => {
                warn!(path = %file.key(), error = %e, "parse failed, using pattern rules");
                fallback(file, &classified)
            }
        }
    }
}

fn fallback(file: &SourceFile, classified: &Classified) -> FileFacts {
    let mut facts = pattern::extract_classified(file, &FALLBACK, classified);
    facts.fallback = true;
    facts
}

/// Lexical context of a node during the walk.
#[derive(Debug, Clone, Copy, Default)]
struct Scope {
    /// Innermost enclosing function.
    function: Option<usize>,
    /// Class whose body directly holds this node.
    class: Option<usize>,
    /// Control blocks between the function and this node.
    nesting: usize,
    loops: usize,
    /// Inside the body of a `try`.
    guarded: bool,
}

struct Walker<'a> {
    tree: &'a ParseResult,
    facts: FileFacts,
    names: Vec<(String, &'static [Case])>,
    variables: BTreeSet<String>,
}

impl<'a> Walker<'a> {
    fn text(&self, node: Node<'_>) -> &'a str {
        self.tree.node_text(&node)
    }

    fn field_text(&self, node: Node<'_>, field: &str) -> &'a str {
        node.child_by_field_name(field).map_or("", |n| self.text(n))
    }

    fn function_mut(&mut self, scope: &Scope) -> Option<&mut FunctionFacts> {
        scope.function.map(|f| &mut self.facts.functions[f])
    }

    /// Whether a definition's body opens with a string literal.
    fn has_docstring(node: Node<'_>) -> bool {
        let Some(body) = node.child_by_field_name("body") else {
            return false;
        };
        let mut cursor = body.walk();
        let first = body
            .named_children(&mut cursor)
            .find(|child| child.kind() != "comment");
        first.is_some_and(is_docstring)
    }

    fn symbol(&mut self, name: &str, node: Node<'_>) {
        if !name.starts_with('_') {
            self.facts.docs.public_symbols += 1;
            if Self::has_docstring(node) {
                self.facts.docs.documented_symbols += 1;
            }
        }
    }

    fn walk(mut self) -> FileFacts {
        let root = self.tree.root_node();
        let mut stack = vec![(root, Scope::default())];
        while let Some((node, scope)) = stack.pop() {
            let inner = self.visit(node, scope);
            let guarded_body = (node.kind() == "try_statement")
                .then(|| node.child_by_field_name("body"))
                .flatten()
                .map(|body| body.id());
            let mut cursor = node.walk();
            let children: Vec<Node<'_>> = node.named_children(&mut cursor).collect();
            for child in children.into_iter().rev() {
                let mut scope = inner;
                if Some(child.id()) == guarded_body {
                    scope.guarded = true;
                }
                stack.push((child, scope));
            }
        }
        self.finish()
    }

    /// Record one node; returns the scope its children see.
    fn visit(&mut self, node: Node<'_>, scope: Scope) -> Scope {
        match node.kind() {
            "function_definition" => self.function(node, scope),
            "class_definition" => self.class(node),
            kind @ ("if_statement" | "for_statement" | "while_statement" | "try_statement"
            | "with_statement" | "match_statement") => {
                let is_loop = matches!(kind, "for_statement" | "while_statement");
                let inner = Scope {
                    nesting: scope.nesting + 1,
                    loops: scope.loops + usize::from(is_loop),
                    ..scope
                };
                let branches = usize::from(matches!(kind, "if_statement" | "for_statement" | "while_statement"));
                if let Some(f) = self.function_mut(&scope) {
                    f.branches += branches;
                    f.max_nesting = f.max_nesting.max(inner.nesting);
                    f.max_loop_depth = f.max_loop_depth.max(inner.loops);
                }
                inner
            }
            "elif_clause" | "except_clause" | "case_clause" | "conditional_expression"
            | "boolean_operator" | "for_in_clause" | "if_clause" => {
                if let Some(f) = self.function_mut(&scope) {
                    f.branches += 1;
                }
                scope
            }
            kind @ ("return_statement" | "raise_statement") => {
                if kind == "raise_statement" {
                    self.facts.errors.checks += 1;
                }
                if scope.nesting > 0 {
                    if let Some(f) = self.function_mut(&scope) {
                        f.early_returns += 1;
                    }
                }
                scope
            }
            "assert_statement" => {
                self.facts.errors.checks += 1;
                self.facts.tests.assertions += 1;
                scope
            }
            "comparison_operator" => {
                if IS_NONE.is_match(self.text(node)) {
                    self.facts.errors.checks += 1;
                }
                scope
            }
            "call" => {
                self.call(node, scope);
                scope
            }
            "augmented_assignment" => {
                let is_concat = self.field_text(node, "operator") == "+="
                    && node
                        .child_by_field_name("right")
                        .is_some_and(|r| matches!(r.kind(), "string" | "concatenated_string"));
                if is_concat && scope.loops > 0 {
                    if let Some(f) = self.function_mut(&scope) {
                        f.concat_in_loop += 1;
                    }
                }
                scope
            }
            "assignment" => {
                if let Some(left) = node.child_by_field_name("left") {
                    self.targets(left);
                }
                scope
            }
            "import_statement" => {
                let mut cursor = node.walk();
                for name in node.children_by_field_name("name", &mut cursor) {
                    let target = match name.kind() {
                        "aliased_import" => self.field_text(name, "name"),
                        _ => self.text(name),
                    };
                    self.facts.imports.push(target.to_string());
                }
                scope
            }
            "import_from_statement" => {
                let module = self.field_text(node, "module_name");
                if !module.is_empty() {
                    self.facts.imports.push(module.to_string());
                }
                scope
            }
            _ => scope,
        }
    }

    fn function(&mut self, node: Node<'_>, scope: Scope) -> Scope {
        let name = self.field_text(node, "name");
        let mut facts = FunctionFacts::new(name, node.start_position().row + 1);
        facts.lines = node.end_position().row - node.start_position().row + 1;
        facts.params = node
            .child_by_field_name("parameters")
            .map_or(0, |p| self.count_params(p));
        if let Some(class) = scope.class {
            self.facts.classes[class].methods += 1;
        }
        if name.starts_with("test") {
            self.facts.tests.test_functions += 1;
        }
        self.names.push((name.to_string(), FUNCTION_CASES));
        self.symbol(name, node);
        self.facts.functions.push(facts);
        Scope {
            function: Some(self.facts.functions.len() - 1),
            ..Scope::default()
        }
    }

    fn class(&mut self, node: Node<'_>) -> Scope {
        let name = self.field_text(node, "name");
        self.facts.classes.push(ClassFacts {
            name: name.to_string(),
            line: node.start_position().row + 1,
            lines: node.end_position().row - node.start_position().row + 1,
            methods: 0,
        });
        self.names.push((name.to_string(), CLASS_CASES));
        self.symbol(name, node);
        Scope {
            class: Some(self.facts.classes.len() - 1),
            ..Scope::default()
        }
    }

    /// Parameters other than the `self`/`cls` receiver and bare separators.
    fn count_params(&self, params: Node<'_>) -> usize {
        let mut cursor = params.walk();
        params
            .named_children(&mut cursor)
            .enumerate()
            .filter(|(i, p)| {
                !matches!(p.kind(), "keyword_separator" | "positional_separator" | "comment")
                    && !(*i == 0 && matches!(self.text(*p), "self" | "cls"))
            })
            .count()
    }

    /// Plain names bound by an assignment target.
    fn targets(&mut self, left: Node<'_>) {
        match left.kind() {
            "identifier" => {
                self.variables.insert(self.text(left).to_string());
            }
            "pattern_list" | "tuple_pattern" | "list_pattern" => {
                let mut cursor = left.walk();
                let children: Vec<Node<'_>> = left.named_children(&mut cursor).collect();
                for child in children {
                    self.targets(child);
                }
            }
            _ => {}
        }
    }

    fn call(&mut self, node: Node<'_>, scope: Scope) {
        let callee = self.field_text(node, "function");
        if RISK_CALL.is_match(callee) {
            self.facts.errors.risk += 1;
            if scope.guarded {
                self.facts.errors.guarded += 1;
            }
        }
        if callee == "isinstance" {
            self.facts.errors.checks += 1;
        }
        if ASSERT_CALL.is_match(callee) {
            self.facts.tests.assertions += 1;
        }
        if scope.loops > 0 && IO_CALL.is_match(callee) {
            if let Some(f) = self.function_mut(&scope) {
                f.io_in_loop += 1;
            }
        }
        let args = self.field_text(node, "arguments");
        if let Some(kind) = dangerous_call(callee, args) {
            self.facts.add_security(kind, 1);
        }
    }

    fn finish(mut self) -> FileFacts {
        let mut naming = NamingFacts::default();
        let variables = std::mem::take(&mut self.variables);
        let names = self
            .names
            .iter()
            .map(|(name, cases)| (name.as_str(), *cases))
            .chain(
                variables
                    .iter()
                    .filter(|v| !KEYWORDS.contains(&v.as_str()))
                    .map(|v| (v.as_str(), VARIABLE_CASES)),
            );
        for (name, cases) in names {
            naming.total += 1;
            if text::matches_any(name, cases) {
                naming.conventional += 1;
            }
            if text::is_short(name) {
                naming.short += 1;
            }
        }
        self.facts.naming = naming;
        self.facts
    }
}

fn is_docstring(statement: Node<'_>) -> bool {
    statement.kind() == "expression_statement"
        && statement
            .named_child(0)
            .is_some_and(|expr| matches!(expr.kind(), "string" | "concatenated_string"))
}

/// Kind of dangerous construct a call is, if any.
fn dangerous_call(callee: &str, args: &str) -> Option<&'static str> {
    match callee {
        "eval" | "exec" => Some("eval"),
        "os.system" | "os.popen" => Some("command_injection"),
        c if c.starts_with("subprocess.") && args.contains("shell=True") => Some("command_injection"),
        "pickle.load" | "pickle.loads" | "marshal.load" | "marshal.loads" => Some("unsafe_deserialization"),
        "yaml.load" if !args.contains("Loader") => Some("unsafe_deserialization"),
        "hashlib.md5" | "hashlib.sha1" => Some("weak_crypto"),
        _ => None,
    }
}

fn structural(file: &SourceFile, tree: &ParseResult, classified: &Classified) -> FileFacts {
    let raw: Vec<&str> = file.content.lines().collect();
    let mut facts = FileFacts::new(file);
    facts.lines = classified.line_counts();
    facts.style = text::style_facts(&file.content, classified);
    facts.markers = text::count_markers(classified);
    facts.fingerprints = text::line_fingerprints(classified);
    facts.magic_numbers = text::count_magic_numbers(classified);
    facts.tests.is_test_file = TEST_PATH.is_match(&file.key());

    let root = tree.root_node();
    let mut cursor = root.walk();
    facts.docs.module_doc = root
        .named_children(&mut cursor)
        .find(|child| child.kind() != "comment")
        .is_some_and(is_docstring);

    let walker = Walker {
        tree,
        facts,
        names: Vec::new(),
        variables: BTreeSet::new(),
    };
    let mut facts = walker.walk();
    pattern::security(&mut facts, &[SECRET.clone(), SQL_CONCAT.clone()], classified, &raw);
    pattern::detect_patterns(&mut facts, &classified.code.join("\n"));
    facts
}

#[cfg(test)]
mod tests {
    use super::*;

    const SERVICE: &str = r#""""Order service."""

import json
import os.path as osp
from .models import Order

MAX_RETRIES = 3


class OrderService:
    """Loads and totals orders."""

    def __init__(self, store):
        self.store = store

    def load(self, path, strict=False):
        """Load orders from disk."""
        try:
            with open(path) as fh:
                data = json.load(fh)
        except OSError:
            raise ValueError("unreadable")
        if data is None:
            return []
        return data

    def totals(self, orders):
        out = ""
        for order in orders:
            for line in order.lines:
                if line.qty > 0 and line.price:
                    out += "x"
                    print(line)
        return out


def _helper(x, y):
    return x + y
"#;

    fn facts(path: &str, src: &str) -> FileFacts {
        Python::new().extract(&SourceFile::from_content(path, Language::Python, src))
    }

    #[test]
    fn test_structure() {
        let facts = facts("app/service.py", SERVICE);
        assert!(!facts.fallback);
        assert_eq!(facts.classes.len(), 1);
        assert_eq!(facts.classes[0].methods, 3);
        let names: Vec<_> = facts.functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["__init__", "load", "totals", "_helper"]);
        assert_eq!(facts.functions[1].params, 2);
        assert_eq!(facts.functions[3].params, 2);
    }

    #[test]
    fn test_docstrings() {
        let facts = facts("app/service.py", SERVICE);
        assert!(facts.docs.module_doc);
        // OrderService, load, totals
        assert_eq!(facts.docs.public_symbols, 3);
        assert_eq!(facts.docs.documented_symbols, 2);
        assert_eq!(facts.lines.doc, 3);
    }

    #[test]
    fn test_error_handling() {
        let facts = facts("app/service.py", SERVICE);
        // open and json.load inside the try body
        assert_eq!(facts.errors.risk, 2);
        assert_eq!(facts.errors.guarded, 2);
        // raise and `is None`
        assert_eq!(facts.errors.checks, 2);
        let load = &facts.functions[1];
        assert_eq!(load.early_returns, 2);
        assert_eq!(load.max_nesting, 2);
    }

    #[test]
    fn test_loops() {
        let facts = facts("app/service.py", SERVICE);
        let totals = &facts.functions[2];
        assert_eq!(totals.max_loop_depth, 2);
        assert_eq!(totals.max_nesting, 3);
        // for, for, if, and
        assert_eq!(totals.branches, 4);
        assert_eq!(totals.concat_in_loop, 1);
        assert_eq!(totals.io_in_loop, 1);
    }

    #[test]
    fn test_naming_and_imports() {
        let facts = facts("app/service.py", SERVICE);
        assert_eq!(facts.imports, ["json", "os.path", ".models"]);
        // OrderService, __init__, load, totals, _helper, MAX_RETRIES, data, out
        assert_eq!(facts.naming.total, 8);
        assert_eq!(facts.naming.conventional, 8);
    }

    #[test]
    fn test_syntax_errors_fall_back() {
        let src = "def broken(:\n    return 1\n\ndef fine(a):\n    return a\n";
        let facts = facts("broken.py", src);
        assert!(facts.fallback);
        assert!(facts.functions.iter().any(|f| f.name == "fine"));
    }

    #[test]
    fn test_pytest_file() {
        let src = "import pytest\n\n\ndef test_total():\n    assert total([1]) == 1\n    with pytest.raises(ValueError):\n        total(None)\n";
        let facts = facts("tests/test_total.py", src);
        assert!(facts.tests.is_test_file);
        assert_eq!(facts.tests.test_functions, 1);
        assert_eq!(facts.tests.assertions, 2);
    }

    #[test]
    fn test_dangerous_calls() {
        let src = "import os, pickle, subprocess\n\nos.system(cmd)\nobj = pickle.loads(blob)\nsubprocess.run(cmd, shell=True)\nsubprocess.run(['ls'])\nresult = eval(expr)\npassword = \"hunter2secret\"\n";
        let facts = facts("x.py", src);
        assert_eq!(facts.security.get("command_injection"), Some(&2));
        assert_eq!(facts.security.get("unsafe_deserialization"), Some(&1));
        assert_eq!(facts.security.get("eval"), Some(&1));
        assert_eq!(facts.security.get("hardcoded_secret"), Some(&1));
    }
}
