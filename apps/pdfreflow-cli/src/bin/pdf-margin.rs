//! Fix page height and add a right margin
//!
//! Pages taller than the target height lose their bottom part.

use clap::Parser;
use pdfreflow_core::{fix_height_with_margin_file, MarginOptions, A4_HEIGHT, DEFAULT_MARGIN};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "pdf-margin")]
#[command(
    version,
    about = "Resize every page to a fixed height and add a blank right margin"
)]
struct Args {
    /// Input PDF file
    input: PathBuf,

    /// Output PDF file
    #[arg(long, default_value = "output.pdf")]
    output: PathBuf,

    /// Width added on the right of every page, in points
    #[arg(long, default_value_t = DEFAULT_MARGIN)]
    margin: f64,

    /// Height of every output page, in points
    #[arg(long, default_value_t = A4_HEIGHT)]
    height: f64,
}

fn main() -> ExitCode {
    let args: Args = match pdfreflow_cli::parse_args() {
        Ok(args) => args,
        Err(code) => return code,
    };

    if let Err(e) = pdfreflow_cli::init_tracing() {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let options = MarginOptions::new()
        .margin(args.margin)
        .target_height(args.height);

    let result = fix_height_with_margin_file(&args.input, &args.output, &options);
    pdfreflow_cli::report_outcome(&args.input, result)
}
