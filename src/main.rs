use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};

use apicov::config::Config;
use apicov::coverage::{diff, evaluate, parse_coverage, render_failures, render_markdown, Enforcement};
use apicov::emit_badges;

const CONFIG_FILE: &str = "apicov.toml";

#[derive(Parser)]
#[command(name = "apicov")]
#[command(about = "API coverage diff reports and per-module badges")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file (default: apicov.toml, if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Print progress details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare PR coverage against main and print a Markdown report
    Compare {
        /// Coverage report of the pull request
        pr: PathBuf,

        /// Coverage report of the main branch
        main: PathBuf,

        /// Report format: json or lcov
        #[arg(long)]
        format: Option<String>,

        /// Minimum overall PR coverage
        #[arg(long)]
        threshold: Option<f64>,

        /// Exit non-zero when overall PR coverage is below the threshold
        #[arg(long)]
        fail_under_threshold: bool,

        /// Exit non-zero when any module lost coverage
        #[arg(long)]
        fail_on_regression: bool,

        /// Also write the Markdown report to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write one shield badge JSON per module
    Badges {
        /// Coverage report to summarize
        coverage: PathBuf,

        /// Branch name used in badge file names
        branch: String,

        /// Report format: json or lcov
        #[arg(long)]
        format: Option<String>,

        /// Directory for badge files
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let config = match cli.config {
        Some(ref path) => Config::load(path)
            .with_context(|| format!("Could not load {}", path.display()))?,
        None => Config::load_or_default(Path::new(CONFIG_FILE))?,
    };

    match cli.command {
        Commands::Compare {
            pr,
            main,
            format,
            threshold,
            fail_under_threshold,
            fail_on_regression,
            output,
        } => {
            let enforcement = Enforcement {
                fail_under_threshold: fail_under_threshold || config.compare.fail_under_threshold,
                fail_on_regression: fail_on_regression || config.compare.fail_on_regression,
            };
            let options = CompareOptions {
                format: format.unwrap_or_else(|| config.coverage.format.clone()),
                threshold: threshold.unwrap_or(config.compare.threshold),
                enforcement,
                output,
                verbose: cli.verbose,
            };
            cmd_compare(&config, &pr, &main, &options)
        }
        Commands::Badges {
            coverage,
            branch,
            format,
            output_dir,
        } => {
            let format = format.unwrap_or_else(|| config.coverage.format.clone());
            let output_dir = output_dir.unwrap_or_else(|| config.badges.output_dir.clone());
            cmd_badges(&config, &coverage, &branch, &format, &output_dir, cli.verbose)
        }
    }
}

struct CompareOptions {
    format: String,
    threshold: f64,
    enforcement: Enforcement,
    output: Option<PathBuf>,
    verbose: bool,
}

fn cmd_compare(config: &Config, pr_path: &Path, main_path: &Path, options: &CompareOptions) -> Result<()> {
    // Both inputs are loaded before anything is printed
    let pr = parse_coverage(pr_path, &options.format)?;
    let main = parse_coverage(main_path, &options.format)?;

    let report = diff(&pr, &main, &config.coverage.root_prefix);
    let verdict = evaluate(&report, options.threshold, &options.enforcement);

    let mut markdown = render_markdown(&report);
    markdown.push_str(&render_failures(&verdict));
    print!("{}", markdown);

    if let Some(ref output) = options.output {
        fs::write(output, &markdown)
            .with_context(|| format!("Failed to write report to {}", output.display()))?;
    }

    if options.verbose {
        eprintln!();
        verdict.print_summary();
    }

    if !verdict.passed() {
        std::process::exit(1);
    }

    Ok(())
}

fn cmd_badges(
    config: &Config,
    coverage_path: &Path,
    branch: &str,
    format: &str,
    output_dir: &Path,
    verbose: bool,
) -> Result<()> {
    let report = parse_coverage(coverage_path, format)?;

    let written = emit_badges(
        &report,
        &config.coverage.root_prefix,
        &config.badges.modules,
        branch,
        output_dir,
    )?;

    if verbose {
        for path in &written {
            eprintln!("{} {}", "✓".green(), path.display().to_string().cyan());
        }
    }

    Ok(())
}
