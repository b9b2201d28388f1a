//! dbtok: The dbasic token dumper.
//!
//! Usage:
//!   dbtok [options] FILE
//!
//! Scans a program, following `INCLUDE "file"` statements, and prints the
//! token stream one token per line.

use clap::Parser as ClapParser;
use dbasic_diagnostics::messages::INCLUDE_NOT_FOUND;
use dbasic_diagnostics::PassError;
use dbasic_options::{LiteralOverflow, ScanOptions};
use dbasic_scanner::{FileSource, IncludeStatus, Keyword, ParseContext, Token, TokenKind};
use std::process;
use std::sync::Once;
use tracing::debug;

#[derive(ClapParser, Debug)]
#[command(name = "dbtok", about = "dbtok - Tokenize a dbasic program")]
struct Cli {
    /// Program file to scan.
    #[arg(value_name = "FILE")]
    file: String,

    /// Add a directory to the include search path.
    #[arg(short = 'I', long = "include", value_name = "DIR")]
    include_dirs: Vec<String>,

    /// Path to a dbasic.json options file.
    #[arg(short = 'c', long)]
    config: Option<String>,

    /// Reject numeric literals that do not fit in a VM word.
    #[arg(long = "strict-literals")]
    strict_literals: bool,

    /// List the files included by the program.
    #[arg(long = "list-files")]
    list_files: bool,
}

// ANSI color codes
const RED: &str = "\x1b[31m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

static TRACING_INIT: Once = Once::new();

/// Install the log subscriber. Does nothing unless `RUST_LOG` is set.
fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true).with_writer(std::io::stderr))
                .with(filter)
                .init();
        }
    });
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let exit_code = run_scan(&cli);
    process::exit(exit_code);
}

fn run_scan(cli: &Cli) -> i32 {
    let options = match build_options(cli) {
        Ok(options) => options,
        Err(msg) => {
            print_error(&msg);
            return 1;
        }
    };
    debug!(?options, "scan options");

    let source = match FileSource::open(&cli.file) {
        Ok(source) => source,
        Err(e) => {
            print_error(&format!("cannot open {}: {}", cli.file, e));
            return 1;
        }
    };

    let mut ctx = ParseContext::new(source, options);
    match ctx.run_pass(collect_tokens) {
        Ok(tokens) => {
            for token in &tokens {
                println!("{}", token);
            }
            if cli.list_files {
                for name in ctx.included_files() {
                    println!("{}", name);
                }
            }
            0
        }
        // The diagnostic has already been written to stderr.
        Err(_) => 1,
    }
}

/// Options from the config file (if any), then the command line. The
/// program's own directory is searched after any `-I` directories.
fn build_options(cli: &Cli) -> Result<ScanOptions, String> {
    let mut options = match cli.config {
        Some(ref path) => {
            ScanOptions::load(path).map_err(|e| format!("Failed to read {}: {}", path, e))?
        }
        None => ScanOptions::default(),
    };

    for dir in &cli.include_dirs {
        options = options.with_include_path(dir.as_str());
    }
    let program_dir = dbasic_path::get_directory_path(&cli.file);
    if !program_dir.is_empty() {
        options = options.with_include_path(program_dir);
    }
    if cli.strict_literals {
        options = options.with_literal_overflow(LiteralOverflow::Error);
    }
    Ok(options)
}

/// Scan every line of the program, opening include files as their
/// `INCLUDE` statements are reached. `INCLUDE` lines themselves and the
/// text after `REM` are not part of the output.
fn collect_tokens(ctx: &mut ParseContext) -> Result<Vec<Token>, PassError> {
    let mut tokens = Vec::new();
    while ctx.get_line()? {
        let first = ctx.get_token()?;
        if first.is_keyword(Keyword::Include) {
            let name = ctx.fetch_and_require(TokenKind::String)?;
            ctx.fetch_and_require(TokenKind::Eol)?;
            if ctx.push_include(&name.text) == IncludeStatus::NotFound {
                return Err(ctx.error(&INCLUDE_NOT_FOUND, &[&name.text]));
            }
            continue;
        }
        if first.is_keyword(Keyword::Rem) {
            tokens.push(first);
            tokens.push(Token::new(TokenKind::Eol, ctx.line_text().len()));
            continue;
        }

        let mut token = first;
        loop {
            let kind = token.kind;
            tokens.push(token);
            if kind == TokenKind::Eol {
                break;
            }
            token = ctx.get_token()?;
        }
    }
    tokens.push(Token::new(TokenKind::Eof, 0));
    Ok(tokens)
}

fn print_error(msg: &str) {
    if atty_is_terminal() {
        eprintln!("{}{}error{}: {}", BOLD, RED, RESET, msg);
    } else {
        eprintln!("error: {}", msg);
    }
}

fn atty_is_terminal() -> bool {
    #[cfg(unix)]
    {
        unsafe { libc::isatty(2) != 0 }
    }
    #[cfg(not(unix))]
    {
        true
    }
}
