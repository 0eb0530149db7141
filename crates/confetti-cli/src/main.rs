//! # confetti-cli
//!
//! Command-line interface for the Confetti configuration language.
//!
//! Parses `.conf` files and prints their canonical directive tree, validates
//! whole directories of files, or dumps the raw token stream for debugging.

mod config;
mod errors;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use colored::*;
use confetti::{Lexer, ParseError, Token};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use config::Config;
use errors::enhance_error;

#[derive(Parser)]
#[command(name = "confetti")]
#[command(about = "Confetti configuration reader", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log parser activity to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Parse a file and print its canonical directive tree")]
    Parse {
        /// File to parse (`-` for stdin)
        file: PathBuf,
    },
    #[command(about = "Validate files or directories of files")]
    Check {
        /// Files or directories to check
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    #[command(about = "Print the token stream of a file")]
    Tokens {
        /// File to tokenize (`-` for stdin)
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(Path::new(".")).unwrap_or_else(|e| {
        eprintln!("{} Failed to load config: {:#}", "⚠".yellow().bold(), e);
        Config::default()
    });
    config.merge_cli_args(cli.verbose, cli.no_color);

    init_logging(&config);

    if !config.colored {
        colored::control::set_override(false);
    }

    let ok = match cli.command {
        Commands::Parse { file } => parse_file(&file)?,
        Commands::Check { paths } => check_paths(&paths, &config)?,
        Commands::Tokens { file } => dump_tokens(&file)?,
    };

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}

fn init_logging(config: &Config) {
    let default_level = if config.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(config.colored)
        .init();
}

fn read_input(path: &Path) -> Result<Vec<u8>> {
    if path == Path::new("-") {
        let mut buf = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buf)
            .context("Failed to read standard input")?;
        return Ok(buf);
    }

    fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn report(err: &ParseError, path: &Path, input: &[u8]) {
    let source = String::from_utf8_lossy(input).into_owned();
    enhance_error(err, Some(path.display().to_string()), Some(source)).display();
}

fn parse_file(path: &Path) -> Result<bool> {
    let input = read_input(path)?;

    match confetti::parse_bytes(&input) {
        Ok(unit) => {
            debug!(file = %path.display(), directives = unit.len(), "parsed");
            print!("{}", unit.render());
            Ok(true)
        }
        Err(e) => {
            report(&e, path, &input);
            Ok(false)
        }
    }
}

/// Expands directories into the files with the configured extension, sorted.
fn collect_files(paths: &[PathBuf], extension: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_dir() {
            let mut found: Vec<PathBuf> = fs::read_dir(path)
                .with_context(|| format!("Failed to list {}", path.display()))?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == extension))
                .collect();
            found.sort();
            info!(dir = %path.display(), files = found.len(), "scanned directory");
            files.extend(found);
        } else {
            files.push(path.clone());
        }
    }

    Ok(files)
}

fn check_paths(paths: &[PathBuf], config: &Config) -> Result<bool> {
    let files = collect_files(paths, &config.extension)?;

    if files.is_empty() {
        bail!("No .{} files found", config.extension);
    }

    let mut failed = 0;

    for file in &files {
        let input = read_input(file)?;

        match confetti::parse_bytes(&input) {
            Ok(unit) => {
                println!("{} {} {}", "ok".green().bold(), file.display(), format!("({} directives)", unit.len()).dimmed());
            }
            Err(e) => {
                println!("{} {}", "error".red().bold(), file.display());
                report(&e, file, &input);
                failed += 1;
            }
        }
    }

    println!();
    if failed == 0 {
        println!("{} {}", "Passed".green().bold(), format!("{} files", files.len()).dimmed());
    } else {
        println!("{} {}", "Failed".red().bold(), format!("{} of {} files", failed, files.len()).dimmed());
    }

    Ok(failed == 0)
}

fn dump_tokens(path: &Path) -> Result<bool> {
    let input = read_input(path)?;

    for result in Lexer::from_bytes(&input) {
        match result {
            Ok(st) => {
                let kind = match &st.token {
                    Token::Argument(value) => format!("argument {:?}", value),
                    Token::Comment(value) => format!("comment {:?}", value),
                    other => other.display_name(),
                };
                println!("{:>4}:{:<4} {}", st.span.line, st.span.col, kind);
            }
            Err(e) => {
                report(&ParseError::from(e), path, &input);
                return Ok(false);
            }
        }
    }

    Ok(true)
}
