//! CLI implementation using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::Config;
use crate::core::{Error, Result};
use crate::output::Format;

/// Empathizer - Score how closely a candidate codebase matches a reference codebase's style.
#[derive(Parser)]
#[command(name = "empathizer")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output format (default: from configuration, else text)
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<OutputFormat>,

    /// Configuration file path
    #[arg(short, long, global = true, env = "EMPATHIZER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Number of parallel workers (default: number of CPUs)
    #[arg(short = 'j', long, global = true)]
    pub jobs: Option<usize>,

    /// Per-run timeout in seconds (0 disables)
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Compare a candidate repository against a reference repository
    #[command(alias = "cmp")]
    Compare(CompareArgs),

    /// Profile a single repository
    Profile(ProfileArgs),

    /// List supported languages and extensions
    #[command(alias = "langs")]
    Languages,

    /// Print the default configuration
    InitConfig,
}

#[derive(Args)]
pub struct CompareArgs {
    /// Reference repository (the team's codebase)
    pub reference: PathBuf,

    /// Candidate repository (the code being evaluated)
    pub candidate: PathBuf,

    /// Exit with an error when the empathy score is below this value
    #[arg(long, value_parser = parse_score)]
    pub fail_under: Option<f64>,
}

#[derive(Args)]
pub struct ProfileArgs {
    /// Repository to analyze
    #[arg(default_value = ".")]
    pub path: PathBuf,
}

/// Output format.
#[derive(Clone, Copy, Debug, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    #[value(alias = "md")]
    Markdown,
    Text,
}

impl From<OutputFormat> for Format {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Json => Format::Json,
            OutputFormat::Markdown => Format::Markdown,
            OutputFormat::Text => Format::Text,
        }
    }
}

fn parse_score(s: &str) -> std::result::Result<f64, String> {
    let value: f64 = s.parse().map_err(|_| format!("`{s}` is not a number"))?;
    if (0.0..=100.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{value} is not in 0..=100"))
    }
}

impl Cli {
    /// Load configuration and apply command-line overrides.
    ///
    /// An explicit `--config` file must exist; otherwise `empathizer.toml` is
    /// looked up in `dir`.
    pub fn load_config(&self, dir: &std::path::Path) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::load_default(dir)?,
        };
        if let Some(jobs) = self.jobs {
            if jobs == 0 {
                return Err(Error::InvalidArgument("--jobs must be at least 1".into()));
            }
            config.runtime.workers = jobs;
        }
        if let Some(timeout) = self.timeout {
            config.runtime.timeout_secs = timeout;
        }
        if self.no_color {
            config.output.color = false;
        }
        config.validate()?;
        Ok(config)
    }

    /// Effective output format.
    pub fn output_format(&self, config: &Config) -> Format {
        self.format
            .map(Format::from)
            .unwrap_or_else(|| config.output.format.into())
    }
}
