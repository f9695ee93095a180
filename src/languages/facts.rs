//! Raw per-file signals, extracted before any normalization.
//!
//! Extraction is the only per-file work; every score is computed from these
//! counts afterwards, so both analysis strategies feed the same formulas.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::{Language, SourceFile};

/// Line classification. Doc lines (docstrings, `///`, `/** */`) are counted
/// separately from both code and comments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineCounts {
    pub total: usize,
    pub code: usize,
    pub comment: usize,
    pub doc: usize,
    pub blank: usize,
}

/// Declared identifiers checked against the language's conventions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamingFacts {
    pub total: usize,
    pub conventional: usize,
    /// Shorter than three characters and not a common counter.
    pub short: usize,
}

impl NamingFacts {
    pub fn add(&mut self, other: &NamingFacts) {
        self.total += other.total;
        self.conventional += other.conventional;
        self.short += other.short;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocFacts {
    pub public_symbols: usize,
    pub documented_symbols: usize,
    pub module_doc: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionFacts {
    pub name: String,
    /// 1-indexed start line.
    pub line: usize,
    pub lines: usize,
    pub params: usize,
    /// Branching and looping constructs.
    pub branches: usize,
    /// Deepest control-block nesting inside the body.
    pub max_nesting: usize,
    /// Returns or raises inside a nested block.
    pub early_returns: usize,
    /// Deepest loop-inside-loop nesting.
    pub max_loop_depth: usize,
    pub io_in_loop: usize,
    pub concat_in_loop: usize,
}

impl FunctionFacts {
    pub fn new(name: impl Into<String>, line: usize) -> Self {
        Self {
            name: name.into(),
            line,
            lines: 1,
            params: 0,
            branches: 0,
            max_nesting: 0,
            early_returns: 0,
            max_loop_depth: 0,
            io_in_loop: 0,
            concat_in_loop: 0,
        }
    }

    /// Cyclomatic complexity proxy.
    pub fn complexity(&self) -> usize {
        self.branches + 1
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassFacts {
    pub name: String,
    pub line: usize,
    pub lines: usize,
    pub methods: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorFacts {
    /// Calls that can fail: I/O, parsing, network, subprocess.
    pub risk: usize,
    /// Risk constructs wrapped in an error-handling construct.
    pub guarded: usize,
    /// Explicit checks: `if err != nil`, raise/throw after validation.
    pub checks: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestFacts {
    pub is_test_file: bool,
    pub test_functions: usize,
    pub assertions: usize,
}

/// Indentation and layout habits of one file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleFacts {
    /// Most common indentation step in spaces (tabs count as one step of 0).
    pub indent_unit: Option<usize>,
    pub tab_lines: usize,
    pub space_lines: usize,
    /// Opening braces at the end of a statement line.
    pub brace_same_line: usize,
    /// Opening braces alone on their own line.
    pub brace_next_line: usize,
    pub crlf: bool,
    pub trailing_whitespace: usize,
}

/// Type annotation coverage for gradually typed languages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeFacts {
    pub annotatable: usize,
    pub annotated: usize,
}

impl TypeFacts {
    pub fn coverage(&self) -> f64 {
        if self.annotatable == 0 {
            0.0
        } else {
            (self.annotated as f64 / self.annotatable as f64).min(1.0)
        }
    }
}

/// Everything extracted from one file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileFacts {
    pub path: String,
    pub language: Language,
    pub lines: LineCounts,
    pub naming: NamingFacts,
    pub docs: DocFacts,
    pub functions: Vec<FunctionFacts>,
    pub classes: Vec<ClassFacts>,
    pub errors: ErrorFacts,
    pub tests: TestFacts,
    /// Dangerous construct counts by kind.
    pub security: BTreeMap<String, usize>,
    pub style: StyleFacts,
    /// Raw import targets, as written.
    pub imports: Vec<String>,
    /// TODO/FIXME style markers by marker.
    pub markers: BTreeMap<String, usize>,
    /// Design pattern signatures found, by pattern.
    pub patterns: BTreeMap<String, usize>,
    pub magic_numbers: usize,
    pub types: Option<TypeFacts>,
    /// Structural parsing failed and the pattern strategy was used.
    pub fallback: bool,
    /// Normalized code line hashes for clone detection.
    #[serde(skip)]
    pub fingerprints: Vec<u64>,
}

impl FileFacts {
    /// Empty facts for a file, ready to be filled in by an extractor.
    pub fn new(file: &SourceFile) -> Self {
        Self {
            path: file.key(),
            language: file.language,
            lines: LineCounts::default(),
            naming: NamingFacts::default(),
            docs: DocFacts::default(),
            functions: Vec::new(),
            classes: Vec::new(),
            errors: ErrorFacts::default(),
            tests: TestFacts::default(),
            security: BTreeMap::new(),
            style: StyleFacts::default(),
            imports: Vec::new(),
            markers: BTreeMap::new(),
            patterns: BTreeMap::new(),
            magic_numbers: 0,
            types: None,
            fallback: false,
            fingerprints: Vec::new(),
        }
    }

    pub fn dangerous_constructs(&self) -> usize {
        self.security.values().sum()
    }

    pub fn add_security(&mut self, kind: &str, count: usize) {
        if count > 0 {
            *self.security.entry(kind.to_string()).or_insert(0) += count;
        }
    }

    pub fn add_pattern(&mut self, pattern: &str, count: usize) {
        if count > 0 {
            *self.patterns.entry(pattern.to_string()).or_insert(0) += count;
        }
    }
}

/// A source file together with the facts extracted from it.
#[derive(Debug, Clone)]
pub struct AnalyzedFile<'a> {
    pub source: &'a SourceFile,
    pub facts: FileFacts,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_coverage_bounded() {
        let types = TypeFacts {
            annotatable: 4,
            annotated: 6,
        };
        assert_eq!(types.coverage(), 1.0);
        assert_eq!(TypeFacts::default().coverage(), 0.0);
    }

    #[test]
    fn test_zero_counts_not_recorded() {
        let file = SourceFile::from_content("a.js", Language::JavaScript, "");
        let mut facts = FileFacts::new(&file);
        facts.add_security("eval", 0);
        facts.add_security("eval", 2);
        facts.add_pattern("singleton", 0);
        assert_eq!(facts.dangerous_constructs(), 2);
        assert!(facts.patterns.is_empty());
    }
}
