#![warn(clippy::expect_used)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::panic)]

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{crate_version, Parser};
use flachtex_core::{expand_with, Error, FileSystemFinder, Options, Structure, TraceableString};
use flachtex_rules::{rule_set, RuleOptions};
use log::debug;
use std::io::Write;
use std::path::Path;
use std::process::ExitCode;

#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Parser)]
#[clap(
    version = crate_version!(),
    about = "Flattens a multi-file LaTeX document into a single string while \
             keeping, for every character, the file and byte offset it came from"
)]
#[remain::sorted]
struct Opts {
    #[clap(
        long,
        help = "Attach the raw file contents to the JSON output under a `sources` field"
    )]
    attach: bool,
    #[clap(long, help = "Substitute commands of the `changes` package")]
    changes: bool,
    #[clap(
        long = "changes_prefix",
        help = "Also match the `\\ch`-prefixed spellings of the `changes` commands"
    )]
    changes_prefix: bool,
    #[clap(
        long,
        visible_alias = "remove_comments",
        help = "Remove LaTeX line comments"
    )]
    comments: bool,
    #[clap(long, help = "Substitute user-defined `\\newcommand` macros")]
    newcommand: bool,
    #[clap(value_name = "PATH", help = "Path to the root .tex file")]
    path: String,
    #[clap(
        long = "to_json",
        help = "Emit a JSON envelope instead of the raw flat text"
    )]
    to_json: bool,
    #[clap(long, help = "Remove `\\todo` commands")]
    todos: bool,
}

fn main() -> ExitCode {
    env_logger::init();

    let opts = match Opts::try_parse() {
        Ok(opts) => opts,
        Err(error) => {
            error.print().ok();
            let code = match error.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 3,
            };
            return ExitCode::from(code);
        }
    };

    match run(&opts) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::from(exit_code(&error))
        }
    }
}

fn run(opts: &Opts) -> Result<()> {
    let finder = FileSystemFinder::for_root(Path::new(&opts.path));
    let rules = rule_set(RuleOptions {
        changes: opts.changes,
        changes_prefixed: opts.changes_prefix,
        todos: opts.todos,
        newcommand: opts.newcommand,
    });
    let options = Options {
        remove_comments: opts.comments,
    };
    let (document, structure) = expand_with(&opts.path, &finder, &rules, options)
        .with_context(|| format!("failed to flatten `{}`", opts.path))?;
    debug!(
        "flattened {} sources into {} bytes",
        structure.len(),
        document.len()
    );

    let stdout = std::io::stdout();
    let mut stdout = stdout.lock();
    if opts.to_json {
        writeln!(stdout, "{}", envelope(&document, &structure, opts.attach))?;
    } else {
        write!(stdout, "{document}")?;
    }
    Ok(())
}

fn envelope(document: &TraceableString, structure: &Structure, attach: bool) -> serde_json::Value {
    let mut envelope = document.to_json();
    if attach {
        if let Some(object) = envelope.as_object_mut() {
            object.insert(
                "sources".to_owned(),
                serde_json::json!(structure.contents()),
            );
        }
    }
    envelope
}

/// 1 for missing files and I/O, 2 for structural errors in the document.
/// Malformed arguments exit 3 before we get here.
fn exit_code(error: &anyhow::Error) -> u8 {
    match error.downcast_ref::<Error>() {
        Some(Error::ImportCycle { .. } | Error::OverlappingMatches { .. } | Error::SkipMismatch { .. }) => 2,
        _ => 1,
    }
}
