// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Command-line interface for ffbookmarks.
//!
//! This binary provides the `ffbookmarks` command for converting Firefox
//! bookmark backups to Netscape bookmark HTML.

use ffbookmarks::{loader, renderer};
use lexopt::prelude::*;
use log::{LevelFilter, debug};
use snafu::{ensure, prelude::*};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Where to write the converted document.
#[derive(Clone)]
enum OutputTarget {
    /// Write to the given file.
    File(PathBuf),
    /// Write to stdout.
    Stdout,
}

#[allow(clippy::struct_excessive_bools)]
struct Cli {
    input: PathBuf,
    output: Option<OutputTarget>,
    json: bool,
    quiet: bool,
    dry_run: bool,
    verbose: bool,
}

#[derive(Debug, Snafu)]
enum Error {
    #[snafu(display("failed to parse arguments: {source}"))]
    ParseArgs { source: lexopt::Error },

    #[snafu(display("output {} would overwrite the input file", path.display()))]
    OutputIsInput { path: PathBuf },

    #[snafu(display("{source}"))]
    Load { source: loader::LoadError },

    #[snafu(display("failed to create output file {}: {source}", path.display()))]
    CreateOutput {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("failed to write {}: {source}", path.display()))]
    WriteFile {
        path: PathBuf,
        source: std::io::Error,
    },
}

fn print_help() {
    println!(
        "\
{name} {version}
Convert Firefox bookmark backups to HTML

Usage: {name} [OPTIONS] <INPUT>

Arguments:
  <INPUT>  Firefox bookmark backup (.jsonlz4) or JSON bookmark file (.json)

Options:
  -o, --output <OUTPUT>  Output file, or - for stdout
                         (default: INPUT with .html extension, .json with --json)
      --json             Write the decoded JSON document instead of HTML
  -n, --dry-run          Load the input and report what would be written
  -q, --quiet            Suppress progress messages
  -v, --verbose          Print debug logging (RUST_LOG overrides)
  -h, --help             Print help
  -V, --version          Print version",
        name = env!("CARGO_PKG_NAME"),
        version = env!("CARGO_PKG_VERSION"),
    );
}

fn parse_args() -> Result<Cli, lexopt::Error> {
    let mut input: Option<PathBuf> = None;
    let mut output: Option<OutputTarget> = None;
    let mut json = false;
    let mut quiet = false;
    let mut dry_run = false;
    let mut verbose = false;

    let mut parser = lexopt::Parser::from_env();
    while let Some(arg) = parser.next()? {
        match arg {
            Short('o') | Long("output") => {
                let val: PathBuf = parser.value()?.parse()?;
                output = Some(if val == Path::new("-") {
                    OutputTarget::Stdout
                } else {
                    OutputTarget::File(val)
                });
            }
            Long("json") => json = true,
            Short('n') | Long("dry-run") => dry_run = true,
            Short('q') | Long("quiet") => quiet = true,
            Short('v') | Long("verbose") => verbose = true,
            Short('h') | Long("help") => {
                print_help();
                std::process::exit(0);
            }
            Short('V') | Long("version") => {
                println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            Value(val) if input.is_none() => input = Some(val.parse()?),
            _ => return Err(arg.unexpected()),
        }
    }

    Ok(Cli {
        input: input.ok_or("missing required argument: <INPUT>")?,
        output,
        json,
        quiet,
        dry_run,
        verbose,
    })
}

fn init_logging(verbose: bool) {
    let default_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };

    env_logger::Builder::new()
        .filter_level(default_level)
        .parse_env("RUST_LOG")
        .format_timestamp(None)
        .init();
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let program = std::env::args_os().next().map_or_else(
                || env!("CARGO_PKG_NAME").to_owned(),
                |arg| arg.to_string_lossy().into_owned(),
            );
            eprintln!("{program}: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Error> {
    let cli = parse_args().context(ParseArgsSnafu)?;
    init_logging(cli.verbose);

    let payload = loader::read_payload(&cli.input).context(LoadSnafu)?;
    progress(&cli, &format!("Processing {}: {}", payload.format, cli.input.display()));

    let output = resolve_output(&cli);
    if let OutputTarget::File(path) = &output {
        ensure!(!same_file(path, &cli.input), OutputIsInputSnafu { path });
    }

    if cli.json {
        progress(&cli, "Writing JSON document...");
        if cli.dry_run {
            dry_run_report(&output, &format!("{} bytes of JSON", payload.json.len()));
            return Ok(());
        }
        write_output(&output, |out| out.write_all(&payload.json))?;
    } else {
        let tree = payload.parse_tree().context(LoadSnafu)?;
        progress(&cli, "Converting bookmarks to HTML format...");
        if cli.dry_run {
            let stats = tree.stats();
            dry_run_report(
                &output,
                &format!("{} bookmarks in {} folders", stats.bookmarks, stats.folders),
            );
            return Ok(());
        }
        write_output(&output, |out| renderer::write_html(&tree, out))?;
    }

    if let OutputTarget::File(path) = &output {
        progress(
            &cli,
            &format!("Successfully converted bookmarks to: {}", path.display()),
        );
    }
    Ok(())
}

fn progress(cli: &Cli, message: &str) {
    if !cli.quiet {
        eprintln!("{message}");
    }
}

/// Picks the output target, defaulting to the input path with a new extension.
fn resolve_output(cli: &Cli) -> OutputTarget {
    cli.output.clone().unwrap_or_else(|| {
        let extension = if cli.json { "json" } else { "html" };
        OutputTarget::File(cli.input.with_extension(extension))
    })
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

fn dry_run_report(output: &OutputTarget, summary: &str) {
    match output {
        OutputTarget::File(path) => eprintln!("Would write {} ({summary})", path.display()),
        OutputTarget::Stdout => eprintln!("Would output to stdout ({summary})"),
    }
}

/// Runs `write` against the output target.
///
/// Files are written to a temporary sibling and renamed into place only
/// after everything has been flushed, so a failed conversion leaves no
/// partial output behind.
fn write_output<F>(output: &OutputTarget, write: F) -> Result<(), Error>
where
    F: FnOnce(&mut dyn Write) -> io::Result<()>,
{
    match output {
        OutputTarget::Stdout => {
            let stdout = io::stdout();
            let mut out = BufWriter::new(stdout.lock());
            write(&mut out)
                .and_then(|()| out.flush())
                .context(WriteFileSnafu { path: "<stdout>" })
        }
        OutputTarget::File(path) => {
            let dir = match path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent,
                _ => Path::new("."),
            };

            let mut tmp = tempfile::Builder::new()
                .prefix(".ffbookmarks-")
                .suffix(".tmp")
                .tempfile_in(dir)
                .context(CreateOutputSnafu { path })?;
            debug!("writing to temporary file {}", tmp.path().display());

            {
                let mut out = BufWriter::new(tmp.as_file_mut());
                write(&mut out)
                    .and_then(|()| out.flush())
                    .context(WriteFileSnafu { path })?;
            }

            tmp.persist(path)
                .map_err(|err| err.error)
                .context(WriteFileSnafu { path })?;
            debug!("renamed output into place at {}", path.display());
            Ok(())
        }
    }
}
