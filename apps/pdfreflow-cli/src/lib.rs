//! Shared plumbing for the `pdf-margin` and `pdf-columns` binaries
//!
//! Both tools log to stderr through tracing, print user-facing errors to
//! stdout, and exit with status 1 on any failure.

use clap::error::ErrorKind;
use clap::Parser;
use pdfreflow_core::ReflowError;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the stderr log subscriber, honouring `RUST_LOG`
pub fn init_tracing() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(std::io::stderr().is_terminal())
                .with_writer(std::io::stderr),
        )
        .try_init()?;
    Ok(())
}

/// Parse arguments, exiting 0 for `--help`/`--version` and 1 for anything
/// clap rejects (clap itself would use 2)
pub fn parse_args<T: Parser>() -> Result<T, ExitCode> {
    parse_args_from(std::env::args_os())
}

pub fn parse_args_from<T, I, A>(args: I) -> Result<T, ExitCode>
where
    T: Parser,
    I: IntoIterator<Item = A>,
    A: Into<std::ffi::OsString> + Clone,
{
    T::try_parse_from(args).map_err(|err| {
        let _ = err.print();
        match err.kind() {
            ErrorKind::DisplayHelp
            | ErrorKind::DisplayVersion
            | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => ExitCode::SUCCESS,
            _ => ExitCode::FAILURE,
        }
    })
}

/// Map a run result onto the two user-facing failure tiers
pub fn report_outcome<T>(input: &Path, result: Result<T, ReflowError>) -> ExitCode {
    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            println!("{}", failure_message(input, &err));
            tracing::debug!("{:?}", err);
            ExitCode::FAILURE
        }
    }
}

pub fn failure_message(input: &Path, err: &ReflowError) -> String {
    if err.is_not_found() {
        format!("Error: input file '{}' not found.", input.display())
    } else {
        format!("Unexpected error: {}", err)
    }
}

/// Only `.pdf` inputs are accepted (case-sensitive)
pub fn has_pdf_suffix(input: &Path) -> bool {
    input.to_string_lossy().ends_with(".pdf")
}

/// `paper.pdf` -> `paper_converted.pdf`
pub fn converted_output_path(input: &Path) -> PathBuf {
    let text = input.to_string_lossy();
    match text.strip_suffix(".pdf") {
        Some(stem) => PathBuf::from(format!("{}_converted.pdf", stem)),
        None => PathBuf::from(format!("{}_converted.pdf", text)),
    }
}
