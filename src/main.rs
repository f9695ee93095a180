//! Empathizer CLI - compare the engineering style of two codebases.

use std::io::{stdout, Write};
use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use empathizer::cli::{Cli, Command, CompareArgs};
use empathizer::config::Config;
use empathizer::core::{progress, CachedSource, Error, FilesystemSource, MemoryCache};
use empathizer::output::Format;
use empathizer::pipeline::Pipeline;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("empathizer={default_level}"))),
        )
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> empathizer::core::Result<()> {
    match &cli.command {
        Command::Languages => {
            let config = cli.load_config(Path::new("."))?;
            cli.output_format(&config).write_languages(&mut stdout())?;
        }
        Command::InitConfig => {
            let mut out = stdout();
            out.write_all(Config::default_toml().as_bytes())?;
        }
        Command::Profile(args) => {
            let config = cli.load_config(&args.path)?;
            apply_color(&config);
            let source = FilesystemSource::new(&args.path);
            let bar = progress::create_progress("profile", 0);
            let profile = Pipeline::new(&config)
                .with_progress(progress::callback(&bar))
                .profile_source(&source)?;
            bar.finish_and_clear();
            cli.output_format(&config)
                .write_profile(&profile, &mut stdout())?;
        }
        Command::Compare(args) => {
            let config = cli.load_config(&args.reference)?;
            apply_color(&config);
            compare(args, &config, cli.output_format(&config))?;
        }
    }
    Ok(())
}

fn compare(args: &CompareArgs, config: &Config, format: Format) -> empathizer::core::Result<()> {
    // Comparing a checkout against itself reads it once.
    let cache = MemoryCache::new();

    let bar = progress::create_progress("reference", 0);
    let reference = Pipeline::new(config)
        .with_progress(progress::callback(&bar))
        .profile_source(&CachedSource::new(FilesystemSource::new(&args.reference), &cache))?;
    bar.finish_and_clear();

    let bar = progress::create_progress("candidate", 0);
    let candidate = Pipeline::new(config)
        .with_progress(progress::callback(&bar))
        .profile_source(&CachedSource::new(FilesystemSource::new(&args.candidate), &cache))?;
    bar.finish_and_clear();

    let comparison = Pipeline::new(config).compare(reference, candidate)?;
    format.write_comparison(&comparison, &mut stdout())?;

    if let Some(minimum) = args.fail_under {
        if comparison.result.score < minimum {
            return Err(Error::threshold_violation(
                format!(
                    "empathy score {:.1} is below {minimum:.1}",
                    comparison.result.score
                ),
                comparison.result.score,
            ));
        }
    }
    Ok(())
}

fn apply_color(config: &Config) {
    use std::io::IsTerminal;
    if !config.output.color || !stdout().is_terminal() {
        colored::control::set_override(false);
    }
}
