//! Empathizer - measure how closely a candidate codebase matches the
//! engineering style of a reference codebase.
//!
//! Each repository is reduced to a profile of eleven category scores
//! (naming, documentation, modularity, complexity, error handling, testing,
//! security, style consistency, design patterns, performance, comments). Two
//! profiles are then compared into a single 0-100 empathy score.
//!
//! # Supported Languages
//!
//! Python, JavaScript, TypeScript, Java, Go, C#, C++, PHP, Ruby, Swift, HTML, CSS
//!
//! # Example
//!
//! ```no_run
//! use empathizer::config::Config;
//! use empathizer::core::FilesystemSource;
//! use empathizer::pipeline;
//!
//! let config = Config::default();
//! let comparison = pipeline::compare(
//!     &FilesystemSource::new("team-repo"),
//!     &FilesystemSource::new("candidate-repo"),
//!     &config,
//! )
//! .unwrap();
//! println!("{:.1} ({})", comparison.result.score, comparison.result.level);
//! ```

pub mod aggregate;
pub mod analyzers;
pub mod cli;
pub mod config;
pub mod core;
pub mod empathy;
pub mod languages;
pub mod metrics;
pub mod output;
pub mod parser;
pub mod pipeline;

pub use aggregate::RepositoryProfile;
pub use core::{AnalysisContext, Analyzer, Error, Result};
pub use empathy::{EmpathyResult, Level};
pub use pipeline::{Comparison, Pipeline};
