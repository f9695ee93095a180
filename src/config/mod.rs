//! Configuration loading and validation.
//!
//! Configuration is read once, validated once, and then passed around as an
//! immutable `&Config`. Sources are layered with figment: built-in defaults,
//! then `empathizer.toml` (or an explicit file), then `EMPATHIZER_` env vars.

use std::collections::BTreeMap;
use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::core::{Error, Language, Result};
use crate::metrics::Category;

/// Tolerance for the weight-sum invariant.
pub const WEIGHT_EPSILON: f64 = 1e-6;

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Exclude patterns (glob), applied before language detection.
    #[serde(rename = "exclude")]
    pub exclude_patterns: Vec<String>,
    /// Category weights for the empathy formula.
    pub weights: CategoryWeights,
    /// Per-language settings.
    pub languages: LanguagesConfig,
    /// File count and size limits.
    pub limits: LimitsConfig,
    /// Worker pool and timeout.
    pub runtime: RuntimeConfig,
    /// Detector thresholds.
    pub thresholds: ThresholdsConfig,
    /// Output configuration.
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration from an explicit file path.
    ///
    /// Errors if the file does not exist. Use this for explicit `--config` flags.
    /// Env vars with `EMPATHIZER_` prefix override file values.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::Config(format!(
                "config file not found: {}",
                path.display()
            )));
        }
        let config: Self = Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file_exact(path))
            .merge(Env::prefixed("EMPATHIZER_").split("__"))
            .extract()
            .map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from directory, looking for empathizer.toml or
    /// .empathizer/empathizer.toml.
    ///
    /// Missing files are silently skipped (defaults are used).
    pub fn load_default(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let config: Self = Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(dir.join("empathizer.toml")))
            .merge(Toml::file(dir.join(".empathizer/empathizer.toml")))
            .merge(Env::prefixed("EMPATHIZER_").split("__"))
            .extract()
            .map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Default config file content.
    pub fn default_toml() -> &'static str {
        include_str!("default_config.toml")
    }

    /// Check every invariant the scoring core relies on.
    pub fn validate(&self) -> Result<()> {
        self.weights.validate()?;
        self.languages.validate()?;
        if self.limits.max_files_per_language == 0 {
            return Err(Error::config("limits.max_files_per_language must be at least 1"));
        }
        if self.thresholds.duplication_window < 2 {
            return Err(Error::config("thresholds.duplication_window must be at least 2"));
        }
        if self.thresholds.god_class_methods == 0 || self.thresholds.spaghetti_lines == 0 {
            return Err(Error::config("anti-pattern thresholds must be positive"));
        }
        if !(self.thresholds.complexity_per_function > 0.0) {
            return Err(Error::config("thresholds.complexity_per_function must be positive"));
        }
        for pattern in &self.exclude_patterns {
            globset::Glob::new(pattern)
                .map_err(|e| Error::Config(format!("invalid exclude pattern {pattern:?}: {e}")))?;
        }
        Ok(())
    }
}

/// The eleven category weights. They must sum to 1.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CategoryWeights {
    pub naming: f64,
    pub documentation: f64,
    pub modularity: f64,
    pub complexity: f64,
    pub error_handling: f64,
    pub testing: f64,
    pub security: f64,
    pub style_consistency: f64,
    pub patterns: f64,
    pub performance: f64,
    pub comments: f64,
}

impl Default for CategoryWeights {
    fn default() -> Self {
        Self {
            naming: 0.12,
            documentation: 0.12,
            modularity: 0.10,
            complexity: 0.12,
            error_handling: 0.10,
            testing: 0.09,
            security: 0.09,
            style_consistency: 0.08,
            patterns: 0.06,
            performance: 0.06,
            comments: 0.06,
        }
    }
}

impl CategoryWeights {
    /// Weight for one category.
    pub fn get(&self, category: Category) -> f64 {
        match category {
            Category::Naming => self.naming,
            Category::Documentation => self.documentation,
            Category::Modularity => self.modularity,
            Category::Complexity => self.complexity,
            Category::ErrorHandling => self.error_handling,
            Category::Testing => self.testing,
            Category::Security => self.security,
            Category::StyleConsistency => self.style_consistency,
            Category::Patterns => self.patterns,
            Category::Performance => self.performance,
            Category::Comments => self.comments,
        }
    }

    pub fn sum(&self) -> f64 {
        Category::ALL.iter().map(|c| self.get(*c)).sum()
    }

    fn validate(&self) -> Result<()> {
        for category in Category::ALL {
            let w = self.get(category);
            if !w.is_finite() || w < 0.0 {
                return Err(Error::Config(format!(
                    "weight for {} must be a non-negative number, got {w}",
                    category.key()
                )));
            }
        }
        let sum = self.sum();
        if (sum - 1.0).abs() > WEIGHT_EPSILON {
            return Err(Error::Config(format!(
                "category weights must sum to 1.0, got {sum:.6}"
            )));
        }
        Ok(())
    }
}

/// Per-language configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LanguagesConfig {
    /// How heavily alignment in a language counts in cross-repository
    /// comparison. Languages not listed use 1.0.
    pub importance_multiplier: BTreeMap<String, f64>,
}

impl LanguagesConfig {
    /// Multiplier for a language.
    pub fn importance(&self, language: Language) -> f64 {
        self.importance_multiplier
            .iter()
            .find(|(name, _)| Language::from_name(name) == Some(language))
            .map(|(_, m)| *m)
            .unwrap_or(1.0)
    }

    fn validate(&self) -> Result<()> {
        for (name, multiplier) in &self.importance_multiplier {
            if Language::from_name(name).is_none() {
                return Err(Error::Config(format!(
                    "unknown language in languages.importance_multiplier: {name}"
                )));
            }
            if !multiplier.is_finite() || *multiplier <= 0.0 {
                return Err(Error::Config(format!(
                    "importance multiplier for {name} must be positive, got {multiplier}"
                )));
            }
        }
        Ok(())
    }
}

/// File count and size limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Files kept per language after lexicographic ordering by path.
    pub max_files_per_language: usize,
    /// Larger files are skipped with a warning (likely generated or minified).
    pub max_file_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_files_per_language: 500,
            max_file_bytes: 1024 * 1024,
        }
    }
}

/// Worker pool and cancellation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Worker threads; 0 means one per available CPU.
    pub workers: usize,
    /// Per-run timeout in seconds; files not started by then are skipped.
    /// 0 disables the timeout.
    pub timeout_secs: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            workers: 0,
            timeout_secs: 300,
        }
    }
}

impl RuntimeConfig {
    /// Effective worker count.
    pub fn worker_count(&self) -> usize {
        if self.workers > 0 {
            self.workers
        } else {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        }
    }
}

/// Detector thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdsConfig {
    /// Lines per duplication window.
    pub duplication_window: usize,
    /// Methods above which a class is a god class.
    pub god_class_methods: usize,
    /// Lines above which a class is a god class.
    pub god_class_lines: usize,
    /// Function length above which a function without early returns is spaghetti.
    pub spaghetti_lines: usize,
    /// Nesting depth above which a function without early returns is spaghetti.
    pub spaghetti_nesting: usize,
    /// Parameters above which a signature is a long parameter list.
    pub long_parameter_list: usize,
    /// Lines above which a file counts as monolithic.
    pub monolithic_file_lines: usize,
    /// Average branches per function beyond which complexity scores decay.
    pub complexity_per_function: f64,
    /// Maximum recommendations in a result.
    pub max_recommendations: usize,
}

impl Default for ThresholdsConfig {
    fn default() -> Self {
        Self {
            duplication_window: 5,
            god_class_methods: 20,
            god_class_lines: 500,
            spaghetti_lines: 50,
            spaghetti_nesting: 4,
            long_parameter_list: 6,
            monolithic_file_lines: 500,
            complexity_per_function: 10.0,
            max_recommendations: 5,
        }
    }
}

/// Output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format.
    pub format: OutputFormat,
    /// Color output.
    pub color: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            color: true,
        }
    }
}

/// Output format.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// JSON format.
    Json,
    /// Markdown format.
    Markdown,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "md" | "markdown" => Ok(Self::Markdown),
            _ => Err(format!("Unknown format: {s}. Use 'text', 'json', or 'md'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.limits.max_files_per_language, 500);
        assert_eq!(config.thresholds.duplication_window, 5);
    }

    #[test]
    fn test_default_weights_sum_to_one() {
        let weights = CategoryWeights::default();
        assert!((weights.sum() - 1.0).abs() < WEIGHT_EPSILON);
    }

    #[test]
    fn test_weights_not_summing_to_one_rejected() {
        let mut config = Config::default();
        config.weights.naming = 0.5;
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("sum to 1.0"), "{err}");
    }

    #[test]
    fn test_negative_weight_rejected() {
        let mut config = Config::default();
        config.weights.naming = -0.12;
        config.weights.documentation = 0.36;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_multiplier_must_be_positive() {
        let mut config = Config::default();
        config
            .languages
            .importance_multiplier
            .insert("python".to_string(), 0.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unknown_language_multiplier_rejected() {
        let mut config = Config::default();
        config
            .languages
            .importance_multiplier
            .insert("cobol".to_string(), 2.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_importance_defaults_to_one() {
        let mut languages = LanguagesConfig::default();
        languages
            .importance_multiplier
            .insert("TypeScript".to_string(), 1.5);
        assert_eq!(languages.importance(Language::TypeScript), 1.5);
        assert_eq!(languages.importance(Language::Go), 1.0);
    }

    #[test]
    fn test_invalid_exclude_glob_rejected() {
        let config = Config {
            exclude_patterns: vec!["src/[".to_string()],
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("md".parse::<OutputFormat>().unwrap(), OutputFormat::Markdown);
        assert_eq!("TEXT".parse::<OutputFormat>().unwrap(), OutputFormat::Text);
        assert!("unknown".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_config_from_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "empathizer.toml",
                "exclude = [\"vendor/**\"]\n[limits]\nmax_files_per_language = 50\n[languages.importance_multiplier]\npython = 2.0",
            )?;
            let config = Config::from_file("empathizer.toml").unwrap();
            assert_eq!(config.limits.max_files_per_language, 50);
            assert_eq!(config.exclude_patterns, vec!["vendor/**".to_string()]);
            assert_eq!(config.languages.importance(Language::Python), 2.0);
            Ok(())
        });
    }

    #[test]
    fn test_config_from_file_validates_weights() {
        Jail::expect_with(|jail| {
            jail.create_file("empathizer.toml", "[weights]\nnaming = 0.9")?;
            let result = Config::from_file("empathizer.toml");
            assert!(result.is_err());
            Ok(())
        });
    }

    #[test]
    fn test_config_load_default_dot_dir() {
        Jail::expect_with(|jail| {
            std::fs::create_dir(jail.directory().join(".empathizer")).unwrap();
            jail.create_file(
                ".empathizer/empathizer.toml",
                "[thresholds]\ngod_class_methods = 30",
            )?;
            let config = Config::load_default(".").unwrap();
            assert_eq!(config.thresholds.god_class_methods, 30);
            Ok(())
        });
    }

    #[test]
    fn test_config_load_default_no_file() {
        Jail::expect_with(|_jail| {
            let config = Config::load_default(".").unwrap();
            assert_eq!(config.runtime.timeout_secs, 300);
            Ok(())
        });
    }

    #[test]
    fn test_from_file_errors_on_missing_file() {
        let result = Config::from_file("/nonexistent/path/empathizer.toml");
        let err = result.unwrap_err().to_string();
        assert!(err.contains("not found"), "expected 'not found' in: {err}");
    }

    #[test]
    fn test_env_var_overrides_file_value() {
        Jail::expect_with(|jail| {
            jail.create_file("empathizer.toml", "[runtime]\nworkers = 2")?;
            jail.set_env("EMPATHIZER_RUNTIME__WORKERS", "6");
            let config = Config::from_file("empathizer.toml").unwrap();
            assert_eq!(config.runtime.workers, 6);
            Ok(())
        });
    }

    #[test]
    fn test_default_toml_parses_and_validates() {
        Jail::expect_with(|jail| {
            jail.create_file("empathizer.toml", Config::default_toml())?;
            let config = Config::from_file("empathizer.toml").unwrap();
            assert_eq!(config.weights, CategoryWeights::default());
            Ok(())
        });
    }

    #[test]
    fn test_worker_count_never_zero() {
        let runtime = RuntimeConfig::default();
        assert!(runtime.worker_count() >= 1);
        let runtime = RuntimeConfig {
            workers: 3,
            ..RuntimeConfig::default()
        };
        assert_eq!(runtime.worker_count(), 3);
    }
}
