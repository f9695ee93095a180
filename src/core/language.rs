//! Language detection and enumeration.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Supported languages. The declaration order is the canonical ordering used
/// for deterministic reports and for breaking primary-language ties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    JavaScript,
    TypeScript,
    Java,
    Go,
    CSharp,
    Cpp,
    Php,
    Ruby,
    Swift,
    Html,
    Css,
}

impl Language {
    /// Every supported language, in canonical order.
    pub const ALL: [Language; 12] = [
        Self::Python,
        Self::JavaScript,
        Self::TypeScript,
        Self::Java,
        Self::Go,
        Self::CSharp,
        Self::Cpp,
        Self::Php,
        Self::Ruby,
        Self::Swift,
        Self::Html,
        Self::Css,
    ];

    /// Detect language from file path based on extension.
    pub fn detect(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?;
        Self::from_extension(extension)
    }

    /// Get language from file extension (without the leading dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "py" => Some(Self::Python),
            "js" | "jsx" | "mjs" => Some(Self::JavaScript),
            "ts" | "tsx" => Some(Self::TypeScript),
            "java" => Some(Self::Java),
            "go" => Some(Self::Go),
            "cs" => Some(Self::CSharp),
            "cpp" | "cc" | "cxx" | "hpp" | "h" | "hh" => Some(Self::Cpp),
            "php" | "php3" | "php4" | "php5" | "phtml" => Some(Self::Php),
            "rb" | "rake" | "gemspec" => Some(Self::Ruby),
            "swift" => Some(Self::Swift),
            "html" | "htm" | "xhtml" => Some(Self::Html),
            "css" | "scss" | "sass" | "less" => Some(Self::Css),
            _ => None,
        }
    }

    /// Parse a language from its configuration key or display name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "python" => Some(Self::Python),
            "javascript" | "js" => Some(Self::JavaScript),
            "typescript" | "ts" => Some(Self::TypeScript),
            "java" => Some(Self::Java),
            "go" | "golang" => Some(Self::Go),
            "csharp" | "c#" => Some(Self::CSharp),
            "cpp" | "c++" => Some(Self::Cpp),
            "php" => Some(Self::Php),
            "ruby" => Some(Self::Ruby),
            "swift" => Some(Self::Swift),
            "html" => Some(Self::Html),
            "css" => Some(Self::Css),
            _ => None,
        }
    }

    /// Configuration key (matches the serde representation).
    pub fn key(&self) -> &'static str {
        match self {
            Self::Python => "python",
            Self::JavaScript => "javascript",
            Self::TypeScript => "typescript",
            Self::Java => "java",
            Self::Go => "go",
            Self::CSharp => "csharp",
            Self::Cpp => "cpp",
            Self::Php => "php",
            Self::Ruby => "ruby",
            Self::Swift => "swift",
            Self::Html => "html",
            Self::Css => "css",
        }
    }

    /// Get the display name for the language.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Python => "Python",
            Self::JavaScript => "JavaScript",
            Self::TypeScript => "TypeScript",
            Self::Java => "Java",
            Self::Go => "Go",
            Self::CSharp => "C#",
            Self::Cpp => "C++",
            Self::Php => "PHP",
            Self::Ruby => "Ruby",
            Self::Swift => "Swift",
            Self::Html => "HTML",
            Self::Css => "CSS",
        }
    }

    /// Extensions recognized for this language (without the leading dot).
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Self::Python => &["py"],
            Self::JavaScript => &["js", "jsx", "mjs"],
            Self::TypeScript => &["ts", "tsx"],
            Self::Java => &["java"],
            Self::Go => &["go"],
            Self::CSharp => &["cs"],
            Self::Cpp => &["cpp", "cc", "cxx", "hpp", "h", "hh"],
            Self::Php => &["php", "php3", "php4", "php5", "phtml"],
            Self::Ruby => &["rb", "rake", "gemspec"],
            Self::Swift => &["swift"],
            Self::Html => &["html", "htm", "xhtml"],
            Self::Css => &["css", "scss", "sass", "less"],
        }
    }

    /// Check if the language supports classes/OOP constructs.
    pub fn supports_classes(&self) -> bool {
        !matches!(self, Self::Go | Self::Html | Self::Css)
    }

    /// Markup and stylesheet languages have no functions, branches or calls.
    pub fn is_markup(&self) -> bool {
        matches!(self, Self::Html | Self::Css)
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_language() {
        assert_eq!(Language::detect(Path::new("main.py")), Some(Language::Python));
        assert_eq!(
            Language::detect(Path::new("app.mjs")),
            Some(Language::JavaScript)
        );
        assert_eq!(
            Language::detect(Path::new("component.tsx")),
            Some(Language::TypeScript)
        );
        assert_eq!(Language::detect(Path::new("Main.java")), Some(Language::Java));
        assert_eq!(Language::detect(Path::new("main.go")), Some(Language::Go));
        assert_eq!(
            Language::detect(Path::new("Program.cs")),
            Some(Language::CSharp)
        );
        assert_eq!(Language::detect(Path::new("util.h")), Some(Language::Cpp));
        assert_eq!(Language::detect(Path::new("view.phtml")), Some(Language::Php));
        assert_eq!(
            Language::detect(Path::new("app.gemspec")),
            Some(Language::Ruby)
        );
        assert_eq!(Language::detect(Path::new("App.swift")), Some(Language::Swift));
        assert_eq!(Language::detect(Path::new("index.xhtml")), Some(Language::Html));
        assert_eq!(Language::detect(Path::new("site.less")), Some(Language::Css));
        assert_eq!(Language::detect(Path::new("README.md")), None);
        assert_eq!(Language::detect(Path::new("Makefile")), None);
    }

    #[test]
    fn test_from_extension_is_case_insensitive() {
        assert_eq!(Language::from_extension("PY"), Some(Language::Python));
        assert_eq!(Language::from_extension("Hpp"), Some(Language::Cpp));
        assert_eq!(Language::from_extension("rs"), None);
    }

    #[test]
    fn test_extension_table_round_trips() {
        for lang in Language::ALL {
            for ext in lang.extensions() {
                assert_eq!(Language::from_extension(ext), Some(lang), "{ext}");
            }
        }
    }

    #[test]
    fn test_from_name_accepts_keys_and_aliases() {
        for lang in Language::ALL {
            assert_eq!(Language::from_name(lang.key()), Some(lang));
        }
        assert_eq!(Language::from_name("C#"), Some(Language::CSharp));
        assert_eq!(Language::from_name("c++"), Some(Language::Cpp));
        assert_eq!(Language::from_name("cobol"), None);
    }

    #[test]
    fn test_display_name() {
        assert_eq!(Language::Python.display_name(), "Python");
        assert_eq!(Language::Cpp.display_name(), "C++");
        assert_eq!(Language::CSharp.display_name(), "C#");
    }

    #[test]
    fn test_supports_classes() {
        assert!(Language::Java.supports_classes());
        assert!(Language::Python.supports_classes());
        assert!(!Language::Go.supports_classes());
        assert!(!Language::Css.supports_classes());
    }
}
