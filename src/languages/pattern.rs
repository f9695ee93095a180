//! Ordered regular-expression extraction, shared by the eleven variants that
//! have no structural parser.
//!
//! Each variant supplies a [`LanguageRules`] table. Matching runs on code with
//! comments removed and string contents emptied, so keywords inside strings
//! and comments do not count. Only secrets, SQL and import targets are matched
//! against the raw line, since they live inside string literals.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;

use super::facts::{ClassFacts, ErrorFacts, FileFacts, FunctionFacts, NamingFacts};
use super::text::{self, Case, Classified, CommentSyntax, LineKind};
use crate::core::{Language, SourceFile};

/// Compile a literal pattern from a rule table.
pub(crate) fn re(pattern: &str) -> Regex {
    Regex::new(pattern).expect("valid regex")
}

/// How a language delimits blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockStyle {
    /// `{ ... }`
    Braces,
    /// `def ... end`
    Keywords,
    /// Trailing `:` and indentation.
    Indentation,
    /// Markup: no executable blocks.
    Flat,
}

/// How a language marks public symbols.
#[derive(Debug, Clone)]
pub enum Visibility {
    /// Public only when the declaration line matches (`public`, `export`).
    Marked(Regex),
    /// Public unless the line matches or the name starts with `_`.
    Unmarked(Option<Regex>),
    /// Exported names start with an uppercase letter.
    Capitalized,
}

/// Where documentation sits relative to the symbol it documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocPosition {
    Before,
    After,
}

/// A dangerous construct signature.
#[derive(Debug, Clone)]
pub struct Danger {
    pub kind: &'static str,
    pub regex: Regex,
    /// Match against the raw line instead of stripped code.
    pub raw: bool,
}

impl Danger {
    pub fn code(kind: &'static str, pattern: &str) -> Self {
        Self {
            kind,
            regex: re(pattern),
            raw: false,
        }
    }

    pub fn raw(kind: &'static str, pattern: &str) -> Self {
        Self {
            kind,
            regex: re(pattern),
            raw: true,
        }
    }
}

/// Per-language rule table.
#[derive(Debug, Clone)]
pub struct LanguageRules {
    pub language: Language,
    pub syntax: CommentSyntax,
    pub blocks: BlockStyle,
    /// Function declarations; groups `name`, optional `params` and `receiver`.
    pub functions: Vec<Regex>,
    /// Class-like declarations; group `name`.
    pub classes: Vec<Regex>,
    /// Variable declarations; group `name` (may hold several names separated by
    /// spaces or commas).
    pub variables: Vec<Regex>,
    pub function_case: &'static [Case],
    pub class_case: &'static [Case],
    pub variable_case: &'static [Case],
    pub visibility: Visibility,
    pub doc_position: DocPosition,
    /// Plain comments directly before a symbol count as its documentation.
    pub comments_document: bool,
    /// Words that can never name a function.
    pub keywords: &'static [&'static str],
    /// Branching and looping constructs, counted per match.
    pub branch: Option<Regex>,
    /// Lines whose block is a control block.
    pub control: Option<Regex>,
    pub loops: Option<Regex>,
    /// Early exits: return, throw, raise.
    pub exits: Option<Regex>,
    /// Lines whose block guards its body (`try`).
    pub guard: Option<Regex>,
    pub risk: Option<Regex>,
    pub checks: Option<Regex>,
    pub test_path: Option<Regex>,
    pub test_function: Option<Regex>,
    pub assertion: Option<Regex>,
    pub dangerous: Vec<Danger>,
    pub io: Option<Regex>,
    pub concat: Option<Regex>,
    /// Import statements; group `target`, matched on raw lines.
    pub imports: Vec<Regex>,
    /// Block openers for [`BlockStyle::Keywords`].
    pub openers: Option<Regex>,
    /// Block closers for [`BlockStyle::Keywords`].
    pub closers: Option<Regex>,
}

pub(crate) static SECRET: Lazy<Danger> = Lazy::new(|| {
    Danger::raw(
        "hardcoded_secret",
        r#"(?i)\b[\w$]*(?:password|passwd|secret|api_?key|access_?token|private_?key)\w*["']?\s*(?:=|:|=>)\s*["'][^"'\s]{4,}["']"#,
    )
});

pub(crate) static SQL_CONCAT: Lazy<Danger> = Lazy::new(|| {
    Danger::raw(
        "sql_injection",
        r#"(?i)(?:["'][^"']*\b(?:select\s.+\sfrom|insert\s+into|update\s+\w+\s+set|delete\s+from)\b[^"']*["']\s*(?:\+|\.|%|\.format\b))|(?:\bf["'][^"']*\b(?:select|insert|update|delete)\b[^"']*\{)|(?:\$\{[^}]+\}[^`]*\b(?:from|where)\b)|(?:`[^`]*\b(?:select|insert|update|delete)\b[^`]*\$\{)"#,
    )
});

impl LanguageRules {
    /// Rules with nothing but syntax; variants fill in the rest.
    pub fn base(language: Language, syntax: CommentSyntax, blocks: BlockStyle) -> Self {
        let dangerous = if language.is_markup() {
            Vec::new()
        } else {
            vec![SECRET.clone(), SQL_CONCAT.clone()]
        };
        Self {
            language,
            syntax,
            blocks,
            functions: Vec::new(),
            classes: Vec::new(),
            variables: Vec::new(),
            function_case: &[],
            class_case: &[],
            variable_case: &[],
            visibility: Visibility::Unmarked(None),
            doc_position: DocPosition::Before,
            comments_document: false,
            keywords: &[],
            branch: None,
            control: None,
            loops: None,
            exits: None,
            guard: None,
            risk: None,
            checks: None,
            test_path: None,
            test_function: None,
            assertion: None,
            dangerous,
            io: None,
            concat: None,
            imports: Vec::new(),
            openers: None,
            closers: None,
        }
    }

    /// Add language-specific dangerous constructs to the shared ones.
    pub fn with_dangers(mut self, dangers: Vec<Danger>) -> Self {
        self.dangerous.extend(dangers);
        self
    }

    fn is_public(&self, name: &str, line: &str) -> bool {
        match &self.visibility {
            Visibility::Marked(marker) => marker.is_match(line),
            Visibility::Unmarked(private) => {
                !name.starts_with('_')
                    && !name.starts_with('#')
                    && !private.as_ref().is_some_and(|p| p.is_match(line))
            }
            Visibility::Capitalized => name.chars().next().is_some_and(|c| c.is_uppercase()),
        }
    }

    fn is_keyword(&self, word: &str) -> bool {
        self.keywords.contains(&word)
    }
}

fn count(regex: &Option<Regex>, text: &str) -> usize {
    regex.as_ref().map_or(0, |r| r.find_iter(text).count())
}

fn matches(regex: &Option<Regex>, text: &str) -> bool {
    regex.as_ref().is_some_and(|r| r.is_match(text))
}

/// A declared function or class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Decl {
    Function {
        name: String,
        params: usize,
        receiver: Option<String>,
    },
    Class {
        name: String,
    },
}

impl Decl {
    fn name(&self) -> &str {
        match self {
            Self::Function { name, .. } | Self::Class { name } => name,
        }
    }
}

/// Find the declaration on a code line, if any.
pub(crate) fn declaration(rules: &LanguageRules, code: &str) -> Option<Decl> {
    let first_word = code
        .split(|c: char| !c.is_alphanumeric() && c != '_')
        .find(|w| !w.is_empty())
        .unwrap_or("");
    if rules.is_keyword(first_word) {
        return None;
    }
    for class in &rules.classes {
        if let Some(caps) = class.captures(code) {
            if let Some(name) = caps.name("name") {
                return Some(Decl::Class {
                    name: name.as_str().to_string(),
                });
            }
        }
    }
    for function in &rules.functions {
        let Some(caps) = function.captures(code) else {
            continue;
        };
        let Some(name) = caps.name("name") else {
            continue;
        };
        let name = name.as_str().rsplit("::").next().unwrap_or_default();
        if name.is_empty() || rules.is_keyword(name) {
            continue;
        }
        return Some(Decl::Function {
            name: name.to_string(),
            params: caps
                .name("params")
                .map_or(0, |p| text::count_params(p.as_str())),
            receiver: caps.name("receiver").map(|r| r.as_str().to_string()),
        });
    }
    None
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameKind {
    Function(usize),
    Class(usize),
    Loop,
    Control,
    Other,
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    kind: FrameKind,
    indent: usize,
    guard: bool,
}

/// Functions, classes and error-handling counts recovered from block layout.
#[derive(Debug, Default)]
pub(crate) struct Structure {
    pub functions: Vec<FunctionFacts>,
    pub classes: Vec<ClassFacts>,
    pub errors: ErrorFacts,
    /// (0-indexed line, declaration)
    pub decls: Vec<(usize, Decl)>,
}

/// Lines a pending declaration waits for its block to open.
const PENDING_LINES: usize = 4;

struct Scanner<'r> {
    rules: &'r LanguageRules,
    stack: Vec<Frame>,
    pending: Option<(FrameKind, usize)>,
    /// Previous code line, for blocks opened on their own line.
    previous: String,
    out: Structure,
}

impl<'r> Scanner<'r> {
    fn new(rules: &'r LanguageRules) -> Self {
        Self {
            rules,
            stack: Vec::new(),
            pending: None,
            previous: String::new(),
            out: Structure::default(),
        }
    }

    fn innermost_function(&self) -> Option<(usize, usize)> {
        self.stack
            .iter()
            .enumerate()
            .rev()
            .find_map(|(pos, frame)| match frame.kind {
                FrameKind::Function(f) => Some((f, pos)),
                _ => None,
            })
    }

    fn depths(&self, from: usize) -> (usize, usize) {
        let frames = &self.stack[from..];
        let control = frames
            .iter()
            .filter(|f| matches!(f.kind, FrameKind::Loop | FrameKind::Control))
            .count();
        let loops = frames.iter().filter(|f| f.kind == FrameKind::Loop).count();
        (control, loops)
    }

    fn declare(&mut self, line: usize, decl: Decl) {
        let kind = match &decl {
            Decl::Function { name, params, .. } => {
                let mut facts = FunctionFacts::new(name.clone(), line + 1);
                facts.params = *params;
                let owner = self.stack.iter().rev().find_map(|f| match f.kind {
                    FrameKind::Function(_) => Some(None),
                    FrameKind::Class(c) => Some(Some(c)),
                    _ => None,
                });
                if let Some(Some(class)) = owner {
                    self.out.classes[class].methods += 1;
                }
                self.out.functions.push(facts);
                FrameKind::Function(self.out.functions.len() - 1)
            }
            Decl::Class { name } => {
                self.out.classes.push(ClassFacts {
                    name: name.clone(),
                    line: line + 1,
                    lines: 1,
                    methods: 0,
                });
                FrameKind::Class(self.out.classes.len() - 1)
            }
        };
        self.out.decls.push((line, decl));
        self.pending = Some((kind, line));
    }

    fn push(&mut self, kind: FrameKind, indent: usize, guard: bool) {
        self.stack.push(Frame {
            kind,
            indent,
            guard,
        });
        if let Some((f, pos)) = self.innermost_function() {
            let (control, loops) = self.depths(pos + 1);
            let facts = &mut self.out.functions[f];
            facts.max_nesting = facts.max_nesting.max(control);
            facts.max_loop_depth = facts.max_loop_depth.max(loops);
        }
    }

    fn pop(&mut self, end: usize) {
        let Some(frame) = self.stack.pop() else {
            return;
        };
        match frame.kind {
            FrameKind::Function(f) => {
                let facts = &mut self.out.functions[f];
                facts.lines = (end + 1).saturating_sub(facts.line) + 1;
            }
            FrameKind::Class(c) => {
                let facts = &mut self.out.classes[c];
                facts.lines = (end + 1).saturating_sub(facts.line) + 1;
            }
            _ => {}
        }
    }

    /// Per-line counts that depend on the enclosing blocks.
    fn observe(&mut self, code: &str) {
        let risk = count(&self.rules.risk, code);
        self.out.errors.risk += risk;
        if self.stack.iter().any(|f| f.guard) {
            self.out.errors.guarded += risk;
        }
        self.out.errors.checks += count(&self.rules.checks, code);

        let Some((f, pos)) = self.innermost_function() else {
            return;
        };
        let (control, loops) = self.depths(pos + 1);
        let branches = count(&self.rules.branch, code);
        let facts = &mut self.out.functions[f];
        facts.branches += branches;
        if control > 0 && matches(&self.rules.exits, code) {
            facts.early_returns += 1;
        }
        if loops > 0 {
            if matches(&self.rules.io, code) {
                facts.io_in_loop += 1;
            }
            if matches(&self.rules.concat, code) {
                facts.concat_in_loop += 1;
            }
        }
    }

    fn open_kind(&mut self, code: &str) -> (FrameKind, bool) {
        if let Some((kind, _)) = self.pending.take() {
            return (kind, false);
        }
        if matches(&self.rules.loops, code) {
            (FrameKind::Loop, false)
        } else if matches(&self.rules.guard, code) {
            (FrameKind::Control, true)
        } else if matches(&self.rules.control, code) {
            (FrameKind::Control, false)
        } else {
            (FrameKind::Other, false)
        }
    }

    fn expire_pending(&mut self, line: usize) {
        if let Some((_, declared)) = self.pending {
            if line > declared + PENDING_LINES {
                self.pending = None;
            }
        }
    }

    fn braces(&mut self, i: usize, code: &str) {
        let previous = std::mem::take(&mut self.previous);
        // Allman style: a lone `{` opens the block of the line above.
        let context = if code.trim_start().starts_with('{') {
            previous.as_str()
        } else {
            code
        };
        let mut first_open = true;
        for c in code.chars() {
            match c {
                '{' => {
                    let (kind, guard) = if first_open {
                        self.open_kind(context)
                    } else if let Some((kind, _)) = self.pending.take() {
                        (kind, false)
                    } else {
                        (FrameKind::Other, false)
                    };
                    first_open = false;
                    self.push(kind, 0, guard);
                }
                '}' => self.pop(i),
                _ => {}
            }
        }
        if code.trim_end().ends_with(';') {
            self.pending = None;
        }
    }

    fn keywords(&mut self, i: usize, code: &str) {
        if matches(&self.rules.closers, code) {
            self.pop(i);
        }
        if matches(&self.rules.openers, code) || self.pending.is_some_and(|(_, l)| l == i) {
            let trimmed = code.trim_end();
            // One-line `def x; end`
            if trimmed.ends_with(" end") || trimmed.ends_with(";end") {
                self.pending = None;
                return;
            }
            let (kind, guard) = self.open_kind(code);
            self.push(kind, 0, guard);
        }
    }

    fn indentation(&mut self, code: &str, indent: usize) {
        if code.trim_end().ends_with(':') {
            let (kind, guard) = self.open_kind(code);
            self.push(kind, indent, guard);
        }
    }

    fn scan(mut self, classified: &Classified, raw: &[&str]) -> Structure {
        let mut last_code = 0usize;
        for (i, code) in classified.code.iter().enumerate() {
            if classified.kinds[i] != LineKind::Code {
                continue;
            }
            self.expire_pending(i);
            let indent = raw.get(i).map_or(0, |l| text::indentation(l));
            if self.rules.blocks == BlockStyle::Indentation {
                // Close finished blocks before attributing this line.
                while self.stack.last().is_some_and(|f| f.indent >= indent) {
                    self.pop(last_code);
                }
            }
            if let Some(decl) = declaration(self.rules, code) {
                self.declare(i, decl);
            } else {
                self.observe(code);
            }
            match self.rules.blocks {
                BlockStyle::Braces => self.braces(i, code),
                BlockStyle::Keywords => self.keywords(i, code),
                BlockStyle::Indentation => self.indentation(code, indent),
                BlockStyle::Flat => {}
            }
            self.previous.clone_from(code);
            last_code = i;
        }
        while !self.stack.is_empty() {
            self.pop(last_code);
        }

        // Receiver methods (Go) belong to the type they are declared on.
        let receivers: Vec<String> = self
            .out
            .decls
            .iter()
            .filter_map(|(_, d)| match d {
                Decl::Function {
                    receiver: Some(r), ..
                } => Some(r.clone()),
                _ => None,
            })
            .collect();
        for receiver in receivers {
            if let Some(class) = self.out.classes.iter_mut().find(|c| c.name == receiver) {
                class.methods += 1;
            }
        }
        self.out
    }
}

/// Recover functions, classes and error-handling counts from block layout.
pub(crate) fn scan(rules: &LanguageRules, classified: &Classified, raw: &[&str]) -> Structure {
    Scanner::new(rules).scan(classified, raw)
}

fn record_name(naming: &mut NamingFacts, name: &str, cases: &[Case]) {
    naming.total += 1;
    if text::matches_any(name, cases) {
        naming.conventional += 1;
    }
    if text::is_short(name) {
        naming.short += 1;
    }
}

/// Naming facts from declarations plus declared variables.
pub(crate) fn naming(
    rules: &LanguageRules,
    decls: &[(usize, Decl)],
    lines: &[String],
) -> NamingFacts {
    let mut naming = NamingFacts::default();
    for (_, decl) in decls {
        match decl {
            Decl::Function { name, .. } => record_name(&mut naming, name, rules.function_case),
            Decl::Class { name } => record_name(&mut naming, name, rules.class_case),
        }
    }
    let mut variables = BTreeSet::new();
    for line in lines {
        for regex in &rules.variables {
            for caps in regex.captures_iter(line) {
                if let Some(m) = caps.name("name") {
                    variables.extend(
                        m.as_str()
                            .split(|c: char| c.is_whitespace() || c == ',')
                            .filter(|n| !n.is_empty())
                            .map(str::to_string),
                    );
                }
            }
        }
    }
    let mut variable_cases = rules.variable_case.to_vec();
    variable_cases.push(Case::ScreamingSnake);
    for variable in &variables {
        if rules.is_keyword(variable) {
            continue;
        }
        record_name(&mut naming, variable, &variable_cases);
    }
    naming
}

/// Whether the declaration on `line` is documented.
pub(crate) fn is_documented(rules: &LanguageRules, classified: &Classified, line: usize) -> bool {
    let doc_kind = |i: usize| match classified.kinds[i] {
        LineKind::Doc => true,
        LineKind::Comment => rules.comments_document,
        _ => false,
    };
    match rules.doc_position {
        DocPosition::Before => classified
            .previous_significant(line, |code| {
                let t = code.trim_start();
                t.starts_with('@') || t.starts_with("#[") || (t.starts_with('[') && t.trim_end().ends_with(']'))
            })
            .is_some_and(doc_kind),
        DocPosition::After => classified.next_significant(line).is_some_and(doc_kind),
    }
}

static SINGLETON: Lazy<Regex> = Lazy::new(|| {
    re(r"(?i)\bget_?instance\s*\(|\bshared(?:_?instance)?\s*[:=]|\b_instance\s*[:=]|\bstatic\s+(?:readonly\s+|final\s+)?[\w<>]*\s*_?instance\b|@@instance\b")
});
static FACTORY_NAME: Lazy<Regex> =
    Lazy::new(|| re(r"(?i)factory|^create_?[a-z0-9]|^make_?[a-z0-9]"));
static INSTANTIATION: Lazy<Regex> =
    Lazy::new(|| re(r"\bnew\s+[A-Z]\w*|\breturn\s+[A-Z]\w*\s*\("));
static OBSERVER_REGISTER: Lazy<Regex> = Lazy::new(|| {
    re(r"(?i)\b(?:subscribe|add_?(?:event_?)?listener|add_?observer|register_?(?:observer|listener|handler|callback)|attach)\s*\(")
});
static OBSERVER_NOTIFY: Lazy<Regex> = Lazy::new(|| {
    re(r"(?i)\b(?:notify\w*|emit|dispatch(?:_?event)?|publish|trigger|fire_?event)\s*\(")
});
static BUILDER_CLASS: Lazy<Regex> = Lazy::new(|| re(r"(?i)\b(?:class|struct)\s+\w*builder\b"));
static RETURN_SELF: Lazy<Regex> =
    Lazy::new(|| re(r"(?m)\breturn\s+(?:self|this|\$this)\s*;?\s*$"));
static DECORATOR: Lazy<Regex> = Lazy::new(|| {
    re(r"(?i)\bclass\s+\w*decorator\b|functools\.wraps|\bdef\s+\w+\s*\(\s*(?:func|fn|f|wrapped)\s*\)")
});
static STRATEGY: Lazy<Regex> =
    Lazy::new(|| re(r"(?i)\b(?:class|interface|protocol|trait)\s+\w*strategy\b"));

/// Design pattern signatures, at most one of each kind per file.
pub(crate) fn detect_patterns(facts: &mut FileFacts, code: &str) {
    if SINGLETON.is_match(code) {
        facts.add_pattern("singleton", 1);
    }
    let factory_fn = facts.functions.iter().any(|f| FACTORY_NAME.is_match(&f.name));
    let factory_class = facts.classes.iter().any(|c| c.name.to_lowercase().contains("factory"));
    if (factory_fn || factory_class) && INSTANTIATION.is_match(code) {
        facts.add_pattern("factory", 1);
    }
    if OBSERVER_REGISTER.is_match(code) && OBSERVER_NOTIFY.is_match(code) {
        facts.add_pattern("observer", 1);
    }
    if BUILDER_CLASS.is_match(code) || RETURN_SELF.find_iter(code).count() >= 2 {
        facts.add_pattern("builder", 1);
    }
    if DECORATOR.is_match(code) {
        facts.add_pattern("decorator", 1);
    }
    if STRATEGY.is_match(code) {
        facts.add_pattern("strategy", 1);
    }
}

/// Count dangerous constructs on code lines.
pub(crate) fn security(facts: &mut FileFacts, dangers: &[Danger], classified: &Classified, raw: &[&str]) {
    for danger in dangers {
        let mut hits = 0;
        for (i, kind) in classified.kinds.iter().enumerate() {
            if *kind != LineKind::Code {
                continue;
            }
            let line = if danger.raw {
                raw.get(i).copied().unwrap_or_default()
            } else {
                classified.code[i].as_str()
            };
            hits += danger.regex.find_iter(line).count();
        }
        facts.add_security(danger.kind, hits);
    }
}

/// Import targets, matched on raw code lines.
pub(crate) fn imports(rules: &LanguageRules, classified: &Classified, raw: &[&str]) -> Vec<String> {
    let mut targets = Vec::new();
    for (i, kind) in classified.kinds.iter().enumerate() {
        if *kind != LineKind::Code {
            continue;
        }
        let line = raw.get(i).copied().unwrap_or_default();
        for regex in &rules.imports {
            for caps in regex.captures_iter(line) {
                if let Some(target) = caps.name("target") {
                    let target = target.as_str().trim();
                    if !target.is_empty() {
                        targets.push(target.to_string());
                    }
                }
            }
        }
    }
    targets
}

/// Extract facts from a classified file with the pattern strategy.
pub fn extract_classified(file: &SourceFile, rules: &LanguageRules, classified: &Classified) -> FileFacts {
    let raw: Vec<&str> = file.content.lines().collect();
    let mut facts = FileFacts::new(file);
    facts.lines = classified.line_counts();
    facts.style = text::style_facts(&file.content, classified);
    facts.markers = text::count_markers(classified);
    facts.fingerprints = text::line_fingerprints(classified);
    if !rules.language.is_markup() {
        facts.magic_numbers = text::count_magic_numbers(classified);
    }

    let structure = scan(rules, classified, &raw);
    facts.naming = naming(rules, &structure.decls, &classified.code);
    for (line, decl) in &structure.decls {
        if rules.is_public(decl.name(), &classified.code[*line]) {
            facts.docs.public_symbols += 1;
            if is_documented(rules, classified, *line) {
                facts.docs.documented_symbols += 1;
            }
        }
    }
    facts.docs.module_doc = classified.has_header_doc(rules.comments_document || rules.doc_position == DocPosition::Before);
    facts.functions = structure.functions;
    facts.classes = structure.classes;
    facts.errors = structure.errors;

    facts.tests.is_test_file = matches(&rules.test_path, &file.key());
    let code_text = classified.code.join("\n");
    facts.tests.test_functions = classified
        .code
        .iter()
        .filter(|line| matches(&rules.test_function, line))
        .count();
    facts.tests.assertions = count(&rules.assertion, &code_text);

    security(&mut facts, &rules.dangerous, classified, &raw);
    facts.imports = imports(rules, classified, &raw);
    if !rules.language.is_markup() {
        detect_patterns(&mut facts, &code_text);
    }
    facts
}

/// Extract facts from a file with the pattern strategy.
pub fn extract(file: &SourceFile, rules: &LanguageRules) -> FileFacts {
    let classified = text::classify(&file.content, &rules.syntax);
    extract_classified(file, rules, &classified)
}
