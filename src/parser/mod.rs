//! Tree-sitter parser pool for the structural analysis strategy.
//!
//! Only Python has a grammar; every other language is analyzed with pattern
//! rules. Parsers are not `Sync`, so each worker checks one out of the pool
//! and returns it when the parse finishes.

use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tree_sitter::{Language as TsLanguage, Node, Parser as TsParser, Tree};

use crate::core::{Error, Language, Result, SourceFile};

/// Thread-safe pool of parsers.
pub struct Parser {
    idle: Mutex<Vec<TsParser>>,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    pub fn new() -> Self {
        Self {
            idle: Mutex::new(Vec::new()),
        }
    }

    /// Whether a grammar exists for the language.
    pub fn supports(lang: Language) -> bool {
        get_tree_sitter_language(lang).is_ok()
    }

    /// Parse source content.
    pub fn parse_source(&self, file: &SourceFile) -> Result<ParseResult> {
        self.parse(&file.content, file.language, &file.path)
    }

    /// Parse content with explicit language.
    pub fn parse(&self, content: &str, lang: Language, path: &Path) -> Result<ParseResult> {
        let mut parser = self.checkout(lang, path)?;
        let tree = parser.parse(content, None);
        self.idle.lock().push(parser);

        let tree = tree.ok_or_else(|| Error::Parse {
            path: path.to_path_buf(),
            message: "parser produced no tree".to_string(),
        })?;
        Ok(ParseResult {
            tree,
            source: content.to_string(),
            language: lang,
            path: path.to_path_buf(),
        })
    }

    fn checkout(&self, lang: Language, path: &Path) -> Result<TsParser> {
        let ts_lang = get_tree_sitter_language(lang)?;
        if let Some(parser) = self.idle.lock().pop() {
            return Ok(parser);
        }
        let mut parser = TsParser::new();
        parser
            .set_language(&ts_lang)
            .map_err(|e| Error::Parse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        Ok(parser)
    }
}

/// Result of parsing a source file.
#[derive(Debug, Clone)]
pub struct ParseResult {
    pub tree: Tree,
    pub source: String,
    pub language: Language,
    pub path: PathBuf,
}

impl ParseResult {
    pub fn root_node(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// Get text for a node.
    pub fn node_text(&self, node: &Node<'_>) -> &str {
        node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }

    /// Whether the tree contains syntax errors or missing nodes.
    pub fn has_errors(&self) -> bool {
        self.root_node().has_error()
    }
}

/// Get the tree-sitter grammar for a language.
pub fn get_tree_sitter_language(lang: Language) -> Result<TsLanguage> {
    match lang {
        Language::Python => Ok(tree_sitter_python::LANGUAGE.into()),
        _ => Err(Error::UnsupportedLanguage {
            path: PathBuf::from(format!("*.{}", lang.extensions()[0])),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_python() {
        let parser = Parser::new();
        let file = SourceFile::from_content("a.py", Language::Python, "def f():\n    return 1\n");
        let result = parser.parse_source(&file).unwrap();
        assert_eq!(result.root_node().kind(), "module");
        assert!(!result.has_errors());
    }

    #[test]
    fn test_parse_reports_syntax_errors() {
        let parser = Parser::new();
        let file = SourceFile::from_content("a.py", Language::Python, "def f(:\n  return\n");
        let result = parser.parse_source(&file).unwrap();
        assert!(result.has_errors());
    }

    #[test]
    fn test_only_python_has_a_grammar() {
        assert!(Parser::supports(Language::Python));
        assert!(!Parser::supports(Language::Ruby));
        let parser = Parser::new();
        let file = SourceFile::from_content("a.rb", Language::Ruby, "def x; end\n");
        assert!(parser.parse_source(&file).is_err());
    }

    #[test]
    fn test_parsers_are_reused() {
        let parser = Parser::new();
        for _ in 0..3 {
            parser.parse("x = 1\n", Language::Python, Path::new("a.py")).unwrap();
        }
        assert_eq!(parser.idle.lock().len(), 1);
    }
}
